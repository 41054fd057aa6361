//! Template libraries.
//!
//! The built-in set always exists. An override directory is layered on top
//! when one is configured, or when `$STITCH_TEMPLATES_DIR` points at one.

mod builtin;
mod directory;

pub use builtin::BuiltinTemplateLibrary;
pub use directory::DirectoryTemplateLibrary;

use std::path::{Path, PathBuf};
use tracing::debug;

use stitch_core::{application::ports::TemplateLibrary, error::StitchResult};

/// Environment variable naming an override directory.
pub const TEMPLATES_DIR_ENV: &str = "STITCH_TEMPLATES_DIR";

/// Pick the library for a run: `configured` first, then the environment,
/// else the built-in set alone.
pub fn open_library(configured: Option<&Path>) -> StitchResult<Box<dyn TemplateLibrary>> {
    let dir = configured
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(TEMPLATES_DIR_ENV).map(PathBuf::from));

    match dir {
        Some(dir) => {
            debug!(path = %dir.display(), "using template override directory");
            Ok(Box::new(DirectoryTemplateLibrary::load(dir)?))
        }
        None => Ok(Box::new(BuiltinTemplateLibrary::new())),
    }
}
