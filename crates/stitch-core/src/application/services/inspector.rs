//! Read-only predicates over target files.
//!
//! A project tree is naturally sparse: most targets do not exist yet on a
//! first run. None of these predicates fail. Missing files are `false`,
//! unreadable files are `false` plus a warning.

use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

use crate::application::ports::Filesystem;
use crate::domain::is_locked_text;
use crate::error::StitchResult;

/// What a target file looks like before generation touches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Absent,
    Present,
    Locked,
}

impl FileState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Present => "present",
            Self::Locked => "locked",
        }
    }
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct ArtifactStateInspector<'a> {
    filesystem: &'a dyn Filesystem,
}

impl<'a> ArtifactStateInspector<'a> {
    pub fn new(filesystem: &'a dyn Filesystem) -> Self {
        Self { filesystem }
    }

    /// Current text of `path`: `Ok(None)` when it is missing, `Err` when it
    /// exists but cannot be read. Merging goes through this, so an unreadable
    /// file is never mistaken for an absent one.
    pub fn load(&self, path: &Path) -> StitchResult<Option<String>> {
        if !self.filesystem.exists(path) {
            debug!(path = %path.display(), "Target absent");
            return Ok(None);
        }
        self.filesystem.read_to_string(path).map(Some)
    }

    /// Current text of `path`, or `None` when it is missing or unreadable.
    pub fn read(&self, path: &Path) -> Option<String> {
        match self.load(path) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Target unreadable");
                None
            }
        }
    }

    pub fn exists(&self, path: &Path) -> bool {
        self.filesystem.exists(path)
    }

    pub fn is_locked(&self, path: &Path) -> bool {
        self.read(path).is_some_and(|text| is_locked_text(&text))
    }

    pub fn contains(&self, path: &Path, needle: &str) -> bool {
        self.read(path).is_some_and(|text| text.contains(needle))
    }

    pub fn state(&self, path: &Path) -> FileState {
        match self.read(path) {
            None => FileState::Absent,
            Some(text) if is_locked_text(&text) => FileState::Locked,
            Some(_) => FileState::Present,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ApplicationError;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// Files by path; `None` content means present but unreadable.
    struct Files(HashMap<PathBuf, Option<String>>);

    impl Filesystem for Files {
        fn read_to_string(&self, path: &Path) -> StitchResult<String> {
            match self.0.get(path) {
                Some(Some(text)) => Ok(text.clone()),
                _ => Err(ApplicationError::FilesystemError {
                    path: path.to_path_buf(),
                    reason: "permission denied".into(),
                }
                .into()),
            }
        }
        fn write_file(&self, _: &Path, _: &str) -> StitchResult<()> {
            Ok(())
        }
        fn create_dir_all(&self, _: &Path) -> StitchResult<()> {
            Ok(())
        }
        fn exists(&self, path: &Path) -> bool {
            self.0.contains_key(path)
        }
    }

    fn files() -> Files {
        let mut map = HashMap::new();
        map.insert(PathBuf::from("urls.py"), Some("urlpatterns = [\n]\n".to_string()));
        map.insert(PathBuf::from("views.py"), Some("#FileLocked\nclass A: pass\n".to_string()));
        map.insert(PathBuf::from("secret.py"), None);
        Files(map)
    }

    #[test]
    fn predicates_on_present_file() {
        let fs = files();
        let inspector = ArtifactStateInspector::new(&fs);
        let path = Path::new("urls.py");
        assert!(inspector.exists(path));
        assert!(!inspector.is_locked(path));
        assert!(inspector.contains(path, "urlpatterns = ["));
        assert!(!inspector.contains(path, "invoice-list"));
        assert_eq!(inspector.state(path), FileState::Present);
    }

    #[test]
    fn lock_sentinel_anywhere_locks() {
        let fs = files();
        let inspector = ArtifactStateInspector::new(&fs);
        assert!(inspector.is_locked(Path::new("views.py")));
        assert_eq!(inspector.state(Path::new("views.py")), FileState::Locked);
    }

    #[test]
    fn missing_and_unreadable_are_false() {
        let fs = files();
        let inspector = ArtifactStateInspector::new(&fs);
        for path in ["nope.py", "secret.py"] {
            let path = Path::new(path);
            assert!(!inspector.is_locked(path));
            assert!(!inspector.contains(path, ""));
            assert_eq!(inspector.read(path), None);
        }
        assert!(inspector.exists(Path::new("secret.py")));
    }

    #[test]
    fn load_tells_absent_from_unreadable() {
        let fs = files();
        let inspector = ArtifactStateInspector::new(&fs);
        assert_eq!(inspector.load(Path::new("nope.py")).unwrap(), None);
        assert!(inspector.load(Path::new("secret.py")).is_err());
        assert_eq!(
            inspector.load(Path::new("urls.py")).unwrap().as_deref(),
            Some("urlpatterns = [\n]\n")
        );
    }
}
