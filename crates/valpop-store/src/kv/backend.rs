use crate::errors::Result;

/// Key-value primitives the key-value adapter is built on.
pub trait KvBackend {
    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Delete every listed key. Missing keys are ignored.
    fn delete_many(&self, keys: &[String]) -> Result<()>;

    /// Keys starting with `prefix`, in ascending byte order.
    fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}

impl<B: KvBackend + ?Sized> KvBackend for &B {
    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn delete_many(&self, keys: &[String]) -> Result<()> {
        (**self).delete_many(keys)
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        (**self).scan_prefix(prefix)
    }
}
