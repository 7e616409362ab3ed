use crate::errors::Result;

/// Object primitives the object-store adapter is built on.
pub trait ObjectBackend {
    /// Write `contents` under `key`, replacing any previous object.
    /// Readers see either the old or the new object, never a partial one.
    fn put_object(&self, key: &str, contents: &[u8]) -> Result<()>;

    fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Keys starting with `prefix`, sorted.
    fn list_objects(&self, prefix: &str) -> Result<Vec<String>>;

    /// Remove `key`. A missing object is not an error.
    fn remove_object(&self, key: &str) -> Result<()>;
}

impl<B: ObjectBackend + ?Sized> ObjectBackend for &B {
    fn put_object(&self, key: &str, contents: &[u8]) -> Result<()> {
        (**self).put_object(key, contents)
    }

    fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get_object(key)
    }

    fn list_objects(&self, prefix: &str) -> Result<Vec<String>> {
        (**self).list_objects(prefix)
    }

    fn remove_object(&self, key: &str) -> Result<()> {
        (**self).remove_object(key)
    }
}
