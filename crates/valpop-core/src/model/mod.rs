pub mod generation;
pub mod item;
pub mod manifest;
pub mod namespace;
pub mod path;

pub use generation::GenerationId;
pub use item::ItemKey;
pub use manifest::Manifest;
pub use namespace::Namespace;
pub use path::RelativePath;
