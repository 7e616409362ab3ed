use crate::model::GenerationId;
use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// This taxonomy provides a stable, structured classification of all errors
/// in valpop. Each kind maps to a stable error code that can be used for
/// programmatic error handling, testing, and operator-facing reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Backend
    /// Backend unreachable or rejected an operation
    Adapter,

    // Publish
    /// Unreadable file or directory under the source tree
    Traversal,

    // Listing / policy computation
    /// Malformed generation id, key layout, or manifest payload
    Decode,
    /// Invalid retention configuration, rejected before any adapter call
    PolicyViolation,

    // Structural/Validation
    InvalidInput,
    NotFound,

    // Integration/IO
    Io,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::Adapter => "ERR_ADAPTER",
            ExErrorKind::Traversal => "ERR_TRAVERSAL",
            ExErrorKind::Decode => "ERR_DECODE",
            ExErrorKind::PolicyViolation => "ERR_POLICY_VIOLATION",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries the classification used for programmatic handling plus the
/// operation context (namespace, generation, path) the error surfaced in.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    namespace: Option<String>,
    generation: Option<GenerationId>,
    path: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            namespace: None,
            generation: None,
            path: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add namespace context
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Add generation context
    pub fn with_generation(mut self, generation: GenerationId) -> Self {
        self.generation = Some(generation);
        self
    }

    /// Add relative path (or backend key) context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the namespace context, if any
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Get the generation context, if any
    pub fn generation(&self) -> Option<GenerationId> {
        self.generation
    }

    /// Get the path context, if any
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }

    /// Re-tag the operation while keeping the original error as source.
    ///
    /// Used by orchestration layers so a failure reports the command that
    /// was running as well as the primitive that failed.
    pub fn in_op(self, op: impl Into<String>) -> Self {
        let mut outer = ExError::new(self.kind).with_op(op);
        outer.namespace = self.namespace.clone();
        outer.generation = self.generation;
        outer.path = self.path.clone();
        outer.message = self.message.clone();
        outer.with_source(self)
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(namespace) = &self.namespace {
            write!(f, " (namespace: {})", namespace)?;
        }
        if let Some(generation) = self.generation {
            write!(f, " (generation: {})", generation)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Typed errors raised by model validation and decoding
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValpopError {
    /// Namespace is empty or contains a reserved separator
    #[error("Invalid namespace '{namespace}': {reason}")]
    InvalidNamespace { namespace: String, reason: String },

    /// Relative path is empty, absolute, or escapes the root
    #[error("Invalid relative path '{path}': {reason}")]
    InvalidRelativePath { path: String, reason: String },

    /// A key segment expected to hold a generation id is not an integer
    #[error("Malformed generation id '{raw}'")]
    MalformedGenerationId { raw: String },

    /// A backend key does not follow the expected layout
    #[error("Malformed key '{key}': {reason}")]
    MalformedKey { key: String, reason: String },

    /// A manifest payload could not be decoded
    #[error("Malformed manifest for generation {generation}: {reason}")]
    MalformedManifest {
        generation: GenerationId,
        reason: String,
    },

    /// Retention setting out of range
    #[error("Invalid retention setting {field}={value}: {reason}")]
    InvalidRetention {
        field: String,
        value: i64,
        reason: String,
    },
}

impl From<ValpopError> for ExError {
    fn from(err: ValpopError) -> Self {
        let message = err.to_string();
        match err {
            ValpopError::InvalidNamespace { namespace, .. } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_op("validate_namespace")
                    .with_namespace(namespace)
                    .with_message(message)
            }
            ValpopError::InvalidRelativePath { path, .. } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_op("validate_relative_path")
                    .with_path(path)
                    .with_message(message)
            }
            ValpopError::MalformedGenerationId { .. } => ExError::new(ExErrorKind::Decode)
                .with_op("parse_generation")
                .with_message(message),
            ValpopError::MalformedKey { key, .. } => ExError::new(ExErrorKind::Decode)
                .with_op("parse_key")
                .with_path(key)
                .with_message(message),
            ValpopError::MalformedManifest { generation, .. } => {
                ExError::new(ExErrorKind::Decode)
                    .with_op("decode_manifest")
                    .with_generation(generation)
                    .with_message(message)
            }
            ValpopError::InvalidRetention { .. } => {
                ExError::new(ExErrorKind::PolicyViolation)
                    .with_op("validate_retention")
                    .with_message(message)
            }
        }
    }
}
