//! User template overrides read from a directory.
//!
//! # Directory layout expected
//!
//! ```text
//! stitch-templates/
//! ├── server/
//! │   └── forms/
//! │       └── class.tpl        ← overrides id `server/forms/class`
//! └── html/
//!     └── list.tpl             ← overrides id `html/list`
//! ```
//!
//! A file's id is its path relative to the root, `/`-separated, without the
//! `.tpl` extension. Ids the directory does not provide fall back to the
//! built-in set, so an override directory only needs the files it changes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use stitch_core::{
    application::{ApplicationError, ports::TemplateLibrary},
    domain::TemplateId,
    error::StitchResult,
};

use super::BuiltinTemplateLibrary;

const EXTENSION: &str = "tpl";

pub struct DirectoryTemplateLibrary {
    root: PathBuf,
    overrides: HashMap<String, String>,
    fallback: BuiltinTemplateLibrary,
}

impl DirectoryTemplateLibrary {
    /// Read every `.tpl` file under `root`.
    ///
    /// # Errors
    ///
    /// `ApplicationError::FilesystemError` when `root` is missing or a file
    /// under it cannot be read. Files with other extensions are ignored.
    #[instrument(fields(root = %root.as_ref().display()), skip_all)]
    pub fn load(root: impl AsRef<Path>) -> StitchResult<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(fs_error(&root, "template directory not found"));
        }

        let mut overrides = HashMap::new();
        for entry in WalkDir::new(&root).min_depth(1) {
            let entry = entry.map_err(|e| fs_error(&root, &format!("directory walk error: {e}")))?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(EXTENSION)
            {
                continue;
            }

            let Some(id) = template_id(&root, path) else {
                warn!(path = %path.display(), "skipping template with a non UTF-8 path");
                continue;
            };
            let body = std::fs::read_to_string(path)
                .map_err(|e| fs_error(path, &format!("failed to read template: {e}")))?;
            debug!(%id, "template override loaded");
            overrides.insert(id, body);
        }

        info!(count = overrides.len(), "template overrides loaded");
        Ok(Self {
            root,
            overrides,
            fallback: BuiltinTemplateLibrary::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ids this directory overrides, sorted.
    pub fn overridden(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self.overrides.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl TemplateLibrary for DirectoryTemplateLibrary {
    fn load_template(&self, id: &TemplateId) -> StitchResult<String> {
        match self.overrides.get(id.as_str()) {
            Some(body) => Ok(body.clone()),
            None => self.fallback.load_template(id),
        }
    }
}

fn template_id(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?.with_extension("");
    let parts: Option<Vec<&str>> = relative.components().map(|c| c.as_os_str().to_str()).collect();
    Some(parts?.join("/"))
}

fn fs_error(path: &Path, reason: &str) -> stitch_core::error::StitchError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn overrides_win_and_the_rest_falls_back() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("server/forms")).unwrap();
        std::fs::write(
            dir.path().join("server/forms/class.tpl"),
            "class $ModelClass$Form(forms.ModelForm):\n    pass\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("README.md"), "ignored").unwrap();

        let library = DirectoryTemplateLibrary::load(dir.path()).unwrap();
        assert_eq!(library.overridden(), vec!["server/forms/class"]);

        let class = library
            .load_template(&TemplateId::new("server/forms/class"))
            .unwrap();
        assert!(class.contains("forms.ModelForm"));

        let imports = library
            .load_template(&TemplateId::new("server/forms/imports"))
            .unwrap();
        assert!(imports.contains("from core.forms import BaseForm"));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(DirectoryTemplateLibrary::load(dir.path().join("nope")).is_err());
    }
}
