//! Dependency-environment resolution
//!
//! Decides how the app's installed packages become visible to the
//! interpreter: through a virtual environment directory (possibly extracted
//! from a compressed archive first) and/or a flat package directory. The
//! virtual environment is never activated; only its `site-packages` path is
//! appended to `PYTHONPATH`, because activation scripts carry absolute
//! paths from the build image that do not exist in the runtime image.

use crate::config::{effective_name, ScriptConfig, DEFAULT_PACKAGES_DIR, PTH_FILE_NAME};
use crate::error::GeneratorError;
use crate::fs::FileSystem;
use crate::manifest::BuildManifest;
use crate::script::Statement;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Shell command substitution that yields the interpreter's
/// `major.minor` version at container start.
const PYTHON_VERSION_PROBE: &str =
    "$(python -c \"import sys; print(str(sys.version_info.major) + '.' + str(sys.version_info.minor))\")";

/// How a compressed virtual environment is unpacked, if at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionAction {
    None,
    Zip { archive: String, target: String },
    TarGz { archive: String, target: String },
}

/// Resolved environment decision: which directories ended up in use and
/// whether an archive gets extracted. A plan never both ignores and
/// extracts an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentPlan {
    pub virtual_env_dir: Option<PathBuf>,
    pub package_dir: Option<PathBuf>,
    pub extraction: ExtractionAction,
}

pub struct EnvironmentResolver<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> EnvironmentResolver<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    /// Produces the environment plan and the setup statements, in the
    /// order they must appear in the script. Both the virtual-environment
    /// branch and the package-directory branch may fire in one invocation.
    pub fn resolve(
        &self,
        config: &ScriptConfig,
        manifest: &BuildManifest,
    ) -> Result<(EnvironmentPlan, Vec<Statement>), GeneratorError> {
        let mut statements = Vec::new();
        let mut plan = EnvironmentPlan {
            virtual_env_dir: None,
            package_dir: None,
            extraction: ExtractionAction::None,
        };

        let virtual_env_name = effective_name(
            &manifest.virtual_env_name,
            config.virtual_env_name.as_deref(),
        );
        let mut package_dir_name =
            effective_name(&manifest.package_dir, config.package_directory.as_deref());

        if let Some(name) = &virtual_env_name {
            let virtual_env_dir = config.app_path.join(name);

            // A compressed environment mounted by a zip driver must not be
            // extracted again; the skip flag covers that case.
            if manifest.compressed_virtual_env_file.is_empty()
                || config.skip_virtual_env_extraction
            {
                if self.fs.exists(&virtual_env_dir) {
                    statements.extend(virtual_env_path_statements(name, &virtual_env_dir));
                    plan.virtual_env_dir = Some(virtual_env_dir);
                } else {
                    // The default site can still run, so warn instead of
                    // failing.
                    warn!(dir = %virtual_env_dir.display(), "Virtual environment directory not found");
                    statements.push(Statement::Echo(format!(
                        "WARNING: Could not find virtual environment directory '{}'.",
                        virtual_env_dir.display()
                    )));
                    package_dir_name = Some(DEFAULT_PACKAGES_DIR.to_string());
                }
            } else {
                let archive = manifest.compressed_virtual_env_file.clone();
                let target = format!("/{}", name);

                if archive.ends_with(".zip") {
                    statements.push(Statement::Echo(
                        "Found virtual environment .zip archive.".to_string(),
                    ));
                    statements.push(Statement::Assign {
                        name: "extractionCommand".to_string(),
                        value: format!("\"unzip -q {} -d {}\"", archive, target),
                    });
                    plan.extraction = ExtractionAction::Zip {
                        archive,
                        target: target.clone(),
                    };
                } else if archive.ends_with(".tar.gz") {
                    statements.push(Statement::Echo(
                        "Found virtual environment .tar.gz archive.".to_string(),
                    ));
                    statements.push(Statement::Assign {
                        name: "extractionCommand".to_string(),
                        value: format!("\"tar -xzf {} -C {}\"", archive, target),
                    });
                    plan.extraction = ExtractionAction::TarGz {
                        archive,
                        target: target.clone(),
                    };
                } else {
                    return Err(GeneratorError::UnsupportedArchive(archive));
                }

                statements.push(Statement::Echo(format!(
                    "Removing existing virtual environment directory '{}'...",
                    target
                )));
                statements.push(Statement::Run(format!("rm -fr {}", target)));
                statements.push(Statement::Run(format!("mkdir -p {}", target)));
                statements.push(Statement::Echo(format!(
                    "Extracting to directory '{}'...",
                    target
                )));
                statements.push(Statement::Run("$extractionCommand".to_string()));
                statements.extend(virtual_env_path_statements(name, Path::new(&target)));
                plan.virtual_env_dir = Some(PathBuf::from(target));
            }
        }

        if let Some(name) = &package_dir_name {
            let package_dir = config.app_path.join(name);
            if self.fs.exists(&package_dir) {
                let dir = package_dir.display();
                statements.push(Statement::Echo(format!("Using package directory '{}'", dir)));
                statements.push(Statement::Assign {
                    name: "SITE_PACKAGE_PYTHON_VERSION".to_string(),
                    value: PYTHON_VERSION_PROBE.to_string(),
                });
                statements.push(Statement::Assign {
                    name: "SITE_PACKAGES_PATH".to_string(),
                    value: "$HOME\"/.local/lib/python\"$SITE_PACKAGE_PYTHON_VERSION\"/site-packages\""
                        .to_string(),
                });
                statements.push(Statement::Run("mkdir -p $SITE_PACKAGES_PATH".to_string()));
                statements.push(Statement::Run(format!(
                    "echo \"{}\" > $SITE_PACKAGES_PATH\"/{}\"",
                    dir, PTH_FILE_NAME
                )));
                statements.push(Statement::Assign {
                    name: "PATH".to_string(),
                    value: format!("\"{}/bin:$PATH\"", dir),
                });
                statements.push(Statement::Echo("\"Updated PATH to '$PATH'\"".to_string()));
                plan.package_dir = Some(package_dir);
            } else {
                warn!(dir = %package_dir.display(), "Package directory not found");
                statements.push(Statement::Echo(format!(
                    "WARNING: Could not find package directory '{}'.",
                    package_dir.display()
                )));
            }
        }

        Ok((plan, statements))
    }
}

/// Statements that expose a virtual environment's `site-packages` to the
/// interpreter without activating it.
fn virtual_env_path_statements(name: &str, dir: &Path) -> Vec<Statement> {
    vec![
        Statement::Assign {
            name: "PYTHON_VERSION".to_string(),
            value: PYTHON_VERSION_PROBE.to_string(),
        },
        Statement::Echo(format!(
            "Using packages from virtual environment '{}' located at '{}'.",
            name,
            dir.display()
        )),
        Statement::Export {
            name: "PYTHONPATH".to_string(),
            value: format!(
                "$PYTHONPATH:\"{}/lib/python$PYTHON_VERSION/site-packages\"",
                dir.display()
            ),
        },
        Statement::Echo("\"Updated PYTHONPATH to '$PYTHONPATH'\"".to_string()),
    ]
}
