//! Web framework detection by filesystem inspection

use crate::error::GeneratorError;
use crate::fs::FileSystem;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Root-level files probed for a Flask app, in priority order.
pub const FLASK_STARTUP_CANDIDATES: [&str; 4] =
    ["application.py", "app.py", "index.py", "server.py"];

/// Outcome of framework detection. Exactly one variant is active per
/// invocation; selection order is Django, then Flask, then the configured
/// default app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "framework", rename_all = "snake_case")]
pub enum DetectedApp {
    None,
    Django {
        entry_module: String,
    },
    Flask {
        main_file: String,
        entry_module: String,
    },
    DefaultApp {
        path: PathBuf,
        module: String,
    },
}

impl DetectedApp {
    /// Entry module handed to command synthesis, if any.
    pub fn entry_module(&self) -> Option<&str> {
        match self {
            DetectedApp::None => None,
            DetectedApp::Django { entry_module } => Some(entry_module),
            DetectedApp::Flask { entry_module, .. } => Some(entry_module),
            DetectedApp::DefaultApp { module, .. } => {
                (!module.is_empty()).then_some(module.as_str())
            }
        }
    }

    /// Variant name used in log metadata.
    pub fn kind(&self) -> &'static str {
        match self {
            DetectedApp::None => "",
            DetectedApp::Django { .. } => "Django",
            DetectedApp::Flask { .. } => "Flask",
            DetectedApp::DefaultApp { .. } => "Default",
        }
    }
}

/// Inspects the source tree for a known web framework.
pub struct AppTypeDetector<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> AppTypeDetector<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    /// Runs the Django check, then the Flask check. `excluded_dir_name` is
    /// the virtual-environment directory, which must not be scanned.
    ///
    /// An unreadable directory listing aborts the whole generation.
    pub fn detect(
        &self,
        app_root: &Path,
        excluded_dir_name: &str,
    ) -> Result<DetectedApp, GeneratorError> {
        if let Some(app) = self.detect_django(app_root, excluded_dir_name)? {
            info!("Detected Django app");
            return Ok(app);
        }
        if let Some(app) = self.detect_flask(app_root) {
            info!("Detected Flask app");
            return Ok(app);
        }
        Ok(DetectedApp::None)
    }

    /// A Django app has `wsgi.py` inside one of the root's immediate
    /// subdirectories. Entries are sorted by name so detection is
    /// deterministic across platforms.
    fn detect_django(
        &self,
        app_root: &Path,
        excluded_dir_name: &str,
    ) -> Result<Option<DetectedApp>, GeneratorError> {
        let mut entries = self.read_dir(app_root)?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        for entry in entries
            .iter()
            .filter(|e| e.is_dir() && e.file_name() != excluded_dir_name)
        {
            let sub_entries = self.read_dir(entry.path())?;
            if sub_entries
                .iter()
                .any(|f| f.is_file() && f.file_name() == "wsgi.py")
            {
                return Ok(Some(DetectedApp::Django {
                    entry_module: format!("{}.wsgi", entry.file_name()),
                }));
            }
        }
        Ok(None)
    }

    /// A Flask app has one of the candidate files at the root. The module
    /// reference points at the conventional `app` object.
    fn detect_flask(&self, app_root: &Path) -> Option<DetectedApp> {
        for file in FLASK_STARTUP_CANDIDATES {
            let full_path = app_root.join(file);
            if self.fs.is_file(&full_path) {
                info!(path = %full_path.display(), "Using file as the startup module");
                let module = file.trim_end_matches(".py");
                return Some(DetectedApp::Flask {
                    main_file: file.to_string(),
                    entry_module: format!("{}:app", module),
                });
            }
        }
        None
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<crate::fs::DirEntry>, GeneratorError> {
        self.fs
            .read_dir(path)
            .map_err(|source| GeneratorError::UnreadableDirectory {
                path: path.to_path_buf(),
                source,
            })
    }
}
