//! YAML schema definitions for rosdoc2 configuration files

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

/// First document of a configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct Attic {
    #[serde(rename = "type")]
    pub config_type: String,
    pub version: u64,
}

/// Second document of a configuration file
///
/// The outer `Option` records whether a key is present. A present but empty
/// key (`settings:` with nothing under it) is `Some(None)`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigBody {
    #[serde(default, deserialize_with = "present")]
    pub settings: Option<Option<SettingsSection>>,
    #[serde(default, deserialize_with = "present")]
    pub builders: Option<Option<Vec<BTreeMap<String, Value>>>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// `settings:` block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsSection {
    /// Generate the standard package index page (default: true)
    #[serde(default = "default_true")]
    pub generate_package_index: bool,

    /// Location of the Python modules, relative to package.xml
    #[serde(default)]
    pub python_source: Option<String>,

    /// Run doxygen regardless of build type
    #[serde(default, alias = "always_run_doxygen")]
    pub run_doxygen: Option<bool>,

    /// Run sphinx-apidoc regardless of build type
    #[serde(default, alias = "always_run_sphinx_apidoc")]
    pub run_sphinx_apidoc: Option<bool>,
}

impl Default for SettingsSection {
    fn default() -> Self {
        Self {
            generate_package_index: true,
            python_source: None,
            run_doxygen: None,
            run_sphinx_apidoc: None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Builders a stanza may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuilderKind {
    Doxygen,
    Sphinx,
}

impl BuilderKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "doxygen" => Some(BuilderKind::Doxygen),
            "sphinx" => Some(BuilderKind::Sphinx),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BuilderKind::Doxygen => "doxygen",
            BuilderKind::Sphinx => "sphinx",
        }
    }
}

impl fmt::Display for BuilderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validated builder stanza.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuilderSettings {
    pub builder: BuilderKind,
    /// Label used when linking the output from the package index
    pub name: String,
    /// Output subdirectory, relative to the output directory
    pub output_dir: String,
    /// Builder-specific keys, e.g. `doxygen_xml_directory`
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}
