//! In-memory event capture for logging assertions
//!
//! One capture is installed per test binary and shared by every test in it,
//! so lookups are keyed by `op` plus the `namespace` field. Tests pick a
//! namespace nobody else in the binary uses.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;
use valpop_core_types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_EVENT, FIELD_NAMESPACE, FIELD_OP,
};

/// One recorded event, every field rendered as text.
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: Option<String>,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn op(&self) -> Option<&str> {
        self.field(FIELD_OP)
    }

    /// Lifecycle marker (`start`, `end`, `end_error`), absent on plain events.
    pub fn event(&self) -> Option<&str> {
        self.field(FIELD_EVENT)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.field(FIELD_NAMESPACE)
    }
}

#[derive(Default)]
struct Fields(HashMap<String, String>);

impl Fields {
    fn put(&mut self, field: &Field, value: String) {
        self.0.insert(field.name().to_string(), value);
    }
}

impl Visit for Fields {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.put(field, format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.to_string());
    }
}

struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = Fields::default();
        event.record(&mut fields);
        let mut fields = fields.0;
        let message = fields.remove("message");

        if let Ok(mut events) = self.events.lock() {
            events.push(CapturedEvent {
                level: *event.metadata().level(),
                message,
                fields,
            });
        }
    }
}

/// Read side of the shared capture.
#[derive(Clone)]
pub struct TestCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl TestCapture {
    /// Every event recorded so far, across all tests in the binary.
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events tagged with `op` for `namespace`, in emission order.
    pub fn events_for(&self, op: &str, namespace: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.op() == Some(op) && e.namespace() == Some(namespace))
            .collect()
    }

    /// First `start` event of `op` on `namespace`.
    pub fn started(&self, op: &str, namespace: &str) -> Option<CapturedEvent> {
        self.lifecycle(op, namespace, EVENT_START)
    }

    /// First successful `end` event of `op` on `namespace`.
    pub fn ended(&self, op: &str, namespace: &str) -> Option<CapturedEvent> {
        self.lifecycle(op, namespace, EVENT_END)
    }

    /// First `end_error` event of `op` on `namespace`.
    pub fn failed(&self, op: &str, namespace: &str) -> Option<CapturedEvent> {
        self.lifecycle(op, namespace, EVENT_END_ERROR)
    }

    /// Non-lifecycle events on `namespace` carrying `message`.
    pub fn messages(&self, namespace: &str, message: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.namespace() == Some(namespace) && e.message.as_deref() == Some(message))
            .collect()
    }

    fn lifecycle(&self, op: &str, namespace: &str, event: &str) -> Option<CapturedEvent> {
        self.events_for(op, namespace)
            .into_iter()
            .find(|e| e.event() == Some(event))
    }
}

static CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture as the global subscriber on first call and return it.
///
/// # Example
///
/// ```
/// use valpop_core::logging_facility::test_capture::init_test_capture;
/// use valpop_core::{log_op_end, log_op_start};
///
/// let capture = init_test_capture();
/// log_op_start!("collect", namespace = "doc-app", generation_count = 3u64);
/// log_op_end!("collect", duration_ms = 4u64, namespace = "doc-app", item_count = 1u64);
///
/// assert_eq!(
///     capture.started("collect", "doc-app").and_then(|e| e.field("generation_count").map(String::from)),
///     Some("3".to_string())
/// );
/// assert!(capture.ended("collect", "doc-app").is_some());
/// assert!(capture.failed("collect", "doc-app").is_none());
/// ```
pub fn init_test_capture() -> TestCapture {
    CAPTURE
        .get_or_init(|| {
            let events = Arc::new(Mutex::new(Vec::new()));
            let layer = CaptureLayer {
                events: events.clone(),
            };
            tracing_subscriber::registry().with(layer).init();
            TestCapture { events }
        })
        .clone()
}
