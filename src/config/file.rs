//! Config file lookup through the package's `rosdoc2` export

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::package::{Export, PackageMetadata};

/// Export tag naming a user-supplied configuration file.
pub const ROSDOC2_EXPORT_TAG: &str = "rosdoc2";

/// Error type for configuration file loading
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The export points at a file that does not exist
    #[error("rosdoc2 config file '{config_file}', from '{package_file}', does not exist")]
    MissingConfigFile {
        config_file: PathBuf,
        package_file: PathBuf,
    },
    /// IO error reading the file
    #[error("failed to read config file '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Find the `rosdoc2` export among `exports`.
///
/// Every export is scanned and the last match wins. Packages should declare
/// at most one, so more than one is reported as a warning.
pub fn find_config_export(exports: &[Export]) -> Option<&Export> {
    let matches = config_exports(exports);

    if matches.len() > 1 {
        warn!(
            count = matches.len(),
            "multiple '{ROSDOC2_EXPORT_TAG}' exports found, using the last one"
        );
    }

    matches.last().copied()
}

/// All `rosdoc2` exports among `exports`, in declaration order.
pub fn config_exports(exports: &[Export]) -> Vec<&Export> {
    exports
        .iter()
        .filter(|e| e.tagname == ROSDOC2_EXPORT_TAG)
        .collect()
}

/// Resolve an export's content against the descriptor's directory.
pub fn resolve_config_path(package_file: &Path, export: &Export) -> PathBuf {
    let base = package_file.parent().unwrap_or_else(|| Path::new(""));
    base.join(&export.content)
}

/// Resolve `export` and fail if the file it names does not exist.
pub fn ensure_config_exists<P: PackageMetadata + ?Sized>(
    package: &P,
    export: &Export,
) -> Result<PathBuf, ConfigError> {
    let path = resolve_config_path(package.filename(), export);

    if !path.exists() {
        return Err(ConfigError::MissingConfigFile {
            config_file: path,
            package_file: package.filename().to_path_buf(),
        });
    }
    Ok(path)
}

/// Read the configuration file referenced by `export`.
///
/// Returns the resolved path together with the file's contents.
pub fn load_config_text<P: PackageMetadata + ?Sized>(
    package: &P,
    export: &Export,
) -> Result<(PathBuf, String), ConfigError> {
    let path = ensure_config_exists(package, export)?;

    let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    Ok((path, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::PackageManifest;
    use tempfile::TempDir;

    fn package_in(dir: &Path, exports: Vec<Export>) -> PackageManifest {
        PackageManifest {
            name: "bar".to_string(),
            version: None,
            description: None,
            exports,
            filename: dir.join("package.xml"),
        }
    }

    #[test]
    fn test_find_config_export_none() {
        let exports = vec![Export::new("build_type", "ament_python")];
        assert_eq!(find_config_export(&exports), None);
    }

    #[test]
    fn test_find_config_export_single() {
        let exports = vec![
            Export::new("build_type", "ament_python"),
            Export::new(ROSDOC2_EXPORT_TAG, "docs/config.yaml"),
        ];
        let found = find_config_export(&exports).unwrap();
        assert_eq!(found.content, "docs/config.yaml");
    }

    #[test]
    fn test_find_config_export_last_wins() {
        let exports = vec![
            Export::new(ROSDOC2_EXPORT_TAG, "first.yaml"),
            Export::new("build_type", "ament_python"),
            Export::new(ROSDOC2_EXPORT_TAG, "second.yaml"),
        ];
        let found = find_config_export(&exports).unwrap();
        assert_eq!(found.content, "second.yaml");
    }

    #[test]
    fn test_config_exports_keeps_order() {
        let exports = vec![
            Export::new(ROSDOC2_EXPORT_TAG, "first.yaml"),
            Export::new("build_type", "ament_python"),
            Export::new(ROSDOC2_EXPORT_TAG, "second.yaml"),
        ];
        let contents: Vec<_> = config_exports(&exports)
            .iter()
            .map(|e| e.content.as_str())
            .collect();
        assert_eq!(contents, vec!["first.yaml", "second.yaml"]);
    }

    #[test]
    fn test_ensure_config_exists() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("rosdoc2.yaml"), "").unwrap();
        let present = Export::new(ROSDOC2_EXPORT_TAG, "rosdoc2.yaml");
        let absent = Export::new(ROSDOC2_EXPORT_TAG, "absent.yaml");
        let pkg = package_in(dir.path(), vec![present.clone(), absent.clone()]);

        assert_eq!(
            ensure_config_exists(&pkg, &present).unwrap(),
            dir.path().join("rosdoc2.yaml")
        );
        assert!(matches!(
            ensure_config_exists(&pkg, &absent),
            Err(ConfigError::MissingConfigFile { .. })
        ));
    }

    #[test]
    fn test_resolve_relative_to_descriptor() {
        let export = Export::new(ROSDOC2_EXPORT_TAG, "docs/config.yaml");
        let path = resolve_config_path(Path::new("/ws/bar/package.xml"), &export);
        assert_eq!(path, PathBuf::from("/ws/bar/docs/config.yaml"));
    }

    #[test]
    fn test_resolve_bare_descriptor_name() {
        let export = Export::new(ROSDOC2_EXPORT_TAG, "rosdoc2.yaml");
        let path = resolve_config_path(Path::new("package.xml"), &export);
        assert_eq!(path, PathBuf::from("rosdoc2.yaml"));
    }

    #[test]
    fn test_load_config_text_verbatim() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        let content = "## custom\ntype: 'rosdoc2 config'\nversion: 1\n";
        fs::write(dir.path().join("docs/config.yaml"), content).unwrap();

        let export = Export::new(ROSDOC2_EXPORT_TAG, "docs/config.yaml");
        let pkg = package_in(dir.path(), vec![export.clone()]);

        let (path, text) = load_config_text(&pkg, &export).unwrap();
        assert_eq!(text, content);
        assert!(path.ends_with("docs/config.yaml"));
    }

    #[test]
    fn test_load_config_text_missing_file() {
        let dir = TempDir::new().unwrap();
        let export = Export::new(ROSDOC2_EXPORT_TAG, "docs/missing.yaml");
        let pkg = package_in(dir.path(), vec![export.clone()]);

        let err = load_config_text(&pkg, &export).unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, ConfigError::MissingConfigFile { .. }));
        assert!(message.contains("missing.yaml"));
        assert!(message.contains("package.xml"));
    }
}
