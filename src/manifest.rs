//! Build manifest loading
//!
//! The build step leaves a small TOML manifest next to the app describing
//! how the dependency environment was packaged. Its values take precedence
//! over command-line flags. The manifest is loaded once by the caller and
//! passed by value to every component that needs it.

use crate::error::GeneratorError;
use crate::fs::FileSystem;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// File name the build step uses for the manifest.
pub const BUILD_MANIFEST_FILE_NAME: &str = "startgen-manifest.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct BuildManifest {
    /// Startup file recorded by the build. Written by the build side for
    /// other runtime families; unused by the Python generator.
    pub startup_file_name: String,
    pub virtual_env_name: String,
    pub package_dir: String,
    pub compressed_virtual_env_file: String,
}

impl BuildManifest {
    /// Loads the manifest for an app.
    ///
    /// With an explicit manifest directory, a missing directory or missing
    /// manifest file is a fatal configuration error. Without one, the
    /// manifest is looked up in the app root and absence yields an empty
    /// manifest.
    pub fn load(
        fs: &dyn FileSystem,
        manifest_dir: Option<&Path>,
        app_path: &Path,
    ) -> Result<Self, GeneratorError> {
        let manifest_file = match manifest_dir {
            Some(dir) => {
                let dir = fs
                    .canonicalize(dir)
                    .map_err(|_| GeneratorError::InvalidManifestDir(dir.to_path_buf()))?;
                let file = dir.join(BUILD_MANIFEST_FILE_NAME);
                if !fs.is_file(&file) {
                    return Err(GeneratorError::ManifestNotFound {
                        name: BUILD_MANIFEST_FILE_NAME.to_string(),
                        dir,
                    });
                }
                file
            }
            None => {
                let file = app_path.join(BUILD_MANIFEST_FILE_NAME);
                if !fs.is_file(&file) {
                    debug!(path = %file.display(), "No build manifest found");
                    return Ok(Self::default());
                }
                file
            }
        };

        info!(path = %manifest_file.display(), "Found build manifest file, deserializing it");
        let content = fs
            .read_to_string(&manifest_file)
            .map_err(|_| GeneratorError::InvalidManifestDir(manifest_file.clone()))?;

        toml::from_str(&content).map_err(|source| GeneratorError::ManifestParse {
            path: manifest_file,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use std::path::PathBuf;

    const APP: &str = "/srv/app";

    fn mock_app() -> MockFileSystem {
        let fs = MockFileSystem::with_root(PathBuf::from(APP));
        fs.add_dir(APP);
        fs
    }

    #[test]
    fn test_absent_manifest_in_app_root_yields_default() {
        let fs = mock_app();

        let manifest = BuildManifest::load(&fs, None, Path::new(APP)).unwrap();
        assert_eq!(manifest, BuildManifest::default());
    }

    #[test]
    fn test_manifest_loaded_from_app_root() {
        let fs = mock_app();
        fs.add_file(
            format!("{}/{}", APP, BUILD_MANIFEST_FILE_NAME),
            "VirtualEnvName = \"antenv\"\nPackageDir = \"__pycache_site__\"\n",
        );

        let manifest = BuildManifest::load(&fs, None, Path::new(APP)).unwrap();
        assert_eq!(manifest.virtual_env_name, "antenv");
        assert_eq!(manifest.package_dir, "__pycache_site__");
        assert_eq!(manifest.compressed_virtual_env_file, "");
    }

    #[test]
    fn test_explicit_manifest_dir() {
        let fs = mock_app();
        fs.add_dir("/out");
        fs.add_file(
            format!("/out/{}", BUILD_MANIFEST_FILE_NAME),
            "CompressedVirtualEnvFile = \"antenv.tar.gz\"\n",
        );

        let manifest = BuildManifest::load(&fs, Some(Path::new("/out")), Path::new(APP)).unwrap();
        assert_eq!(manifest.compressed_virtual_env_file, "antenv.tar.gz");
    }

    #[test]
    fn test_invalid_manifest_dir_is_fatal() {
        let fs = mock_app();

        let err = BuildManifest::load(&fs, Some(Path::new("/nope")), Path::new(APP)).unwrap_err();
        assert!(matches!(err, GeneratorError::InvalidManifestDir(_)));
    }

    #[test]
    fn test_manifest_missing_in_explicit_dir_is_fatal() {
        let fs = mock_app();
        fs.add_dir("/out");

        let err = BuildManifest::load(&fs, Some(Path::new("/out")), Path::new(APP)).unwrap_err();
        assert!(matches!(err, GeneratorError::ManifestNotFound { .. }));
    }

    #[test]
    fn test_undeserializable_manifest_is_fatal() {
        let fs = mock_app();
        fs.add_file(
            format!("{}/{}", APP, BUILD_MANIFEST_FILE_NAME),
            "VirtualEnvName = [not toml",
        );

        let err = BuildManifest::load(&fs, None, Path::new(APP)).unwrap_err();
        assert!(matches!(err, GeneratorError::ManifestParse { .. }));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let fs = mock_app();
        fs.add_file(
            format!("{}/{}", APP, BUILD_MANIFEST_FILE_NAME),
            "VirtualEnvName = \"antenv\"\nOperationID = \"abc123\"\n",
        );

        let manifest = BuildManifest::load(&fs, None, Path::new(APP)).unwrap();
        assert_eq!(manifest.virtual_env_name, "antenv");
    }
}
