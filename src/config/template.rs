//! Default configuration template and `--init` file generation

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::package::PackageMetadata;

/// File name written by `--init`.
pub const DEFAULT_CONFIG_FILE_NAME: &str = "rosdoc2.yaml";

/// Attic `type` every configuration file must declare.
pub const CONFIG_TYPE: &str = "rosdoc2 config";

/// Substitution values for a configuration template.
pub type FormatMap = BTreeMap<&'static str, String>;

/// Version 1 of the configuration, as generated for packages without one.
///
/// Placeholders use `{key}`; literal braces are doubled.
pub const DEFAULT_CONFIG_V1: &str = r#"## Default configuration, generated by rosdoc2.

## This 'attic section' self-documents this file's type and version.
type: 'rosdoc2 config'
version: 1

---

settings:
    ## If this is true, a standard index page is generated in the output directory.
    ## It uses the package information from the 'package.xml' to show details
    ## about the package, creates a table of contents for the various builders
    ## that were run, and may contain links to things like build farm jobs for
    ## this package or links to other versions of this package.

    ## If false, you can still include content that would have been in the index
    ## into one of your '.rst' files from your Sphinx project, using the
    ## '.. include::' directive in Sphinx.

    ## If this is not specified explicitly, it defaults to 'true'.
    generate_package_index: true

    ## Where the Python modules of this package live, relative to 'package.xml'.
    ## Only needed when the standard Python package layout cannot be assumed
    ## for the 'sphinx-apidoc' invocation.
    python_source: '{package_name}'

    ## If true, run 'doxygen' and the 'breathe'/'exhale' Sphinx extensions
    ## regardless of build type, e.g. for C/C++ API docs in a package that is
    ## not 'ament_cmake' or 'cmake'.
    run_doxygen: false

    ## If true, run 'sphinx-apidoc' regardless of build type, e.g. for Python
    ## API docs in a package that is not 'ament_python'.
    run_sphinx_apidoc: false
builders:
    ## Each stanza is a separate build step performed by a specific builder.
    ## The key of each stanza names the builder; it must be one of the
    ## available builders ('doxygen', 'sphinx').
    ## Required keys in the stanza's settings are:
    ##  * 'output_dir' - output subdirectory for the builder, relative to --output-directory
    ##  * 'name' - used when referencing the built docs from the index.

    - doxygen: {{
        name: '{package_name} Public C/C++ API',
        output_dir: 'generated/doxygen'
    }}
    - sphinx: {{
        name: '{package_name}',
        ## This path is relative to output staging.
        doxygen_xml_directory: 'generated/doxygen/xml',
        output_dir: ''
    }}
"#;

/// Error type for template rendering.
///
/// Any of these means the template and the substitution map disagree, which
/// is a defect in this crate rather than in user input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template placeholder '{{{0}}}' has no substitution value")]
    MissingKey(String),
    #[error("unmatched '{brace}' at byte {offset} in template")]
    UnmatchedBrace { brace: char, offset: usize },
}

/// Known configuration schema versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSchema {
    V1,
}

impl ConfigSchema {
    pub const CURRENT: ConfigSchema = ConfigSchema::V1;

    /// Schema for an attic `version` value.
    pub fn from_version(version: u64) -> Option<Self> {
        match version {
            1 => Some(ConfigSchema::V1),
            _ => None,
        }
    }

    pub fn version(self) -> u64 {
        match self {
            ConfigSchema::V1 => 1,
        }
    }

    /// Unrendered default configuration for this schema.
    pub fn template(self) -> &'static str {
        match self {
            ConfigSchema::V1 => DEFAULT_CONFIG_V1,
        }
    }

    /// Default configuration for this schema, filled from `values`.
    pub fn render(self, values: &FormatMap) -> Result<String, TemplateError> {
        render_template(self.template(), values)
    }
}

/// Substitution values derived from a package.
pub fn format_map_from_package<P: PackageMetadata + ?Sized>(package: &P) -> FormatMap {
    let mut values = FormatMap::new();
    values.insert("package_name", package.name().to_string());
    values.insert(
        "package_version",
        package.version().unwrap_or_default().to_string(),
    );
    values.insert(
        "package_description",
        package.description().unwrap_or_default().to_string(),
    );
    values
}

/// Default configuration for `package` under the current schema.
pub fn render_default_config<P: PackageMetadata + ?Sized>(
    package: &P,
) -> Result<String, TemplateError> {
    ConfigSchema::CURRENT.render(&format_map_from_package(package))
}

/// Replace `{key}` placeholders with values from `values`.
///
/// `{{` and `}}` produce literal braces. Unknown keys and stray braces are
/// errors.
pub fn render_template(template: &str, values: &FormatMap) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match c {
            '{' if chars.peek().is_some_and(|&(_, next)| next == '{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek().is_some_and(|&(_, next)| next == '}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let start = offset + 1;
                let end = template[start..]
                    .find('}')
                    .map(|i| start + i)
                    .ok_or(TemplateError::UnmatchedBrace { brace: '{', offset })?;
                let key = &template[start..end];
                let value = values
                    .get(key)
                    .ok_or_else(|| TemplateError::MissingKey(key.to_string()))?;
                out.push_str(value);
                while chars.peek().is_some_and(|&(i, _)| i <= end) {
                    chars.next();
                }
            }
            '}' => return Err(TemplateError::UnmatchedBrace { brace: '}', offset }),
            _ => out.push(c),
        }
    }

    Ok(out)
}

/// Write the rendered default configuration into `dir`.
///
/// Returns an error if the file already exists.
pub fn generate_default_config_file_in<P: PackageMetadata + ?Sized>(
    dir: &Path,
    package: &P,
) -> io::Result<PathBuf> {
    let path = dir.join(DEFAULT_CONFIG_FILE_NAME);

    if path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{DEFAULT_CONFIG_FILE_NAME} already exists"),
        ));
    }

    let content = render_default_config(package).map_err(io::Error::other)?;
    fs::write(&path, content)?;
    Ok(path)
}
