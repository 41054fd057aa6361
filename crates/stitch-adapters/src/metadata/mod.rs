//! Entity metadata adapters.

mod manifest;

pub use manifest::{EntityManifest, TomlMetadataSource};
