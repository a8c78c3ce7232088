//! Build context handed to the configuration parser.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::package::{PackageError, PackageMetadata};

/// Source identifier used when no user configuration file was found.
pub const DEFAULT_CONFIG_SOURCE: &str = "<default config>";

/// Tool options passed through from the command line, opaque to this crate.
pub type ToolOptions = BTreeMap<String, String>;

/// Where the configuration text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Rendered from the built-in default template
    Default,
    /// Read from a file referenced by the package's `rosdoc2` export
    File(PathBuf),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Default => f.write_str(DEFAULT_CONFIG_SOURCE),
            ConfigSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// State of a single package's documentation build.
///
/// The configuration source, package and tool options are fixed at
/// construction. The python source override and the force-run flags start
/// unset and are filled in from the configuration's `settings` block.
#[derive(Debug)]
pub struct BuildContext<'a, P: PackageMetadata + ?Sized> {
    source: ConfigSource,
    package: &'a P,
    tool_options: ToolOptions,
    build_type: String,
    python_source: Option<String>,
    always_run_doxygen: bool,
    always_run_sphinx_apidoc: bool,
}

impl<'a, P: PackageMetadata + ?Sized> BuildContext<'a, P> {
    /// Fails only when the package's build type cannot be derived.
    pub fn new(
        source: ConfigSource,
        package: &'a P,
        tool_options: ToolOptions,
    ) -> Result<Self, PackageError> {
        let build_type = package.build_type()?;

        Ok(Self {
            source,
            package,
            tool_options,
            build_type,
            python_source: None,
            always_run_doxygen: false,
            always_run_sphinx_apidoc: false,
        })
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    /// The configuration file path, or `<default config>`.
    pub fn configuration_file_path(&self) -> String {
        self.source.to_string()
    }

    pub fn package(&self) -> &'a P {
        self.package
    }

    pub fn tool_options(&self) -> &ToolOptions {
        &self.tool_options
    }

    pub fn build_type(&self) -> &str {
        &self.build_type
    }

    pub fn python_source(&self) -> Option<&str> {
        self.python_source.as_deref()
    }

    pub fn always_run_doxygen(&self) -> bool {
        self.always_run_doxygen
    }

    pub fn always_run_sphinx_apidoc(&self) -> bool {
        self.always_run_sphinx_apidoc
    }

    /// Override where the package's Python modules live. Not validated.
    pub fn add_python_source(&mut self, python_source: impl Into<String>) {
        self.python_source = Some(python_source.into());
    }

    pub fn add_always_run_doxygen(&mut self, always_run_doxygen: bool) {
        self.always_run_doxygen = always_run_doxygen;
    }

    pub fn add_always_run_sphinx_apidoc(&mut self, always_run_sphinx_apidoc: bool) {
        self.always_run_sphinx_apidoc = always_run_sphinx_apidoc;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{Export, PackageManifest};
    use std::path::Path;

    fn package(exports: Vec<Export>) -> PackageManifest {
        PackageManifest {
            name: "foo".to_string(),
            version: None,
            description: None,
            exports,
            filename: PathBuf::from("/ws/foo/package.xml"),
        }
    }

    #[test]
    fn test_new_context_defaults() {
        let pkg = package(vec![Export::new("build_type", "ament_python")]);
        let ctx = BuildContext::new(ConfigSource::Default, &pkg, ToolOptions::new()).unwrap();

        assert_eq!(ctx.configuration_file_path(), DEFAULT_CONFIG_SOURCE);
        assert_eq!(ctx.build_type(), "ament_python");
        assert_eq!(ctx.python_source(), None);
        assert!(!ctx.always_run_doxygen());
        assert!(!ctx.always_run_sphinx_apidoc());
        assert_eq!(ctx.package().name, "foo");
    }

    #[test]
    fn test_file_source_path() {
        let pkg = package(vec![]);
        let source = ConfigSource::File(PathBuf::from("/ws/foo/docs/config.yaml"));
        let ctx = BuildContext::new(source, &pkg, ToolOptions::new()).unwrap();

        assert!(Path::new(&ctx.configuration_file_path()).ends_with("docs/config.yaml"));
    }

    #[test]
    fn test_new_fails_on_ambiguous_build_type() {
        let pkg = package(vec![
            Export::new("build_type", "ament_cmake"),
            Export::new("build_type", "cmake"),
        ]);
        let result = BuildContext::new(ConfigSource::Default, &pkg, ToolOptions::new());

        assert!(matches!(result, Err(PackageError::AmbiguousBuildType { .. })));
    }

    #[test]
    fn test_tool_options_kept() {
        let pkg = package(vec![]);
        let mut options = ToolOptions::new();
        options.insert("output_directory".to_string(), "docs_output".to_string());
        let ctx = BuildContext::new(ConfigSource::Default, &pkg, options).unwrap();

        assert_eq!(
            ctx.tool_options().get("output_directory").map(String::as_str),
            Some("docs_output")
        );
    }

    #[test]
    fn test_flag_setters_last_write_wins() {
        let pkg = package(vec![]);
        let mut ctx = BuildContext::new(ConfigSource::Default, &pkg, ToolOptions::new()).unwrap();

        ctx.add_always_run_doxygen(true);
        ctx.add_always_run_doxygen(true);
        assert!(ctx.always_run_doxygen());

        ctx.add_always_run_doxygen(false);
        assert!(!ctx.always_run_doxygen());

        ctx.add_always_run_sphinx_apidoc(true);
        assert!(ctx.always_run_sphinx_apidoc());
    }

    #[test]
    fn test_add_python_source_unvalidated() {
        let pkg = package(vec![]);
        let mut ctx = BuildContext::new(ConfigSource::Default, &pkg, ToolOptions::new()).unwrap();

        ctx.add_python_source("does/not/exist");
        assert_eq!(ctx.python_source(), Some("does/not/exist"));
    }
}
