//! Parsing configuration text into builder settings

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_yaml::Value;
use thiserror::Error;
use tracing::debug;

use crate::context::BuildContext;
use crate::package::PackageMetadata;

use super::merge::SettingsDelta;
use super::schema::{Attic, BuilderKind, BuilderSettings, ConfigBody, SettingsSection};
use super::template::{ConfigSchema, CONFIG_TYPE};

/// Error type for configuration parsing.
///
/// `origin` is the configuration source identifier: a file path or
/// `<default config>`.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid YAML in '{origin}'")]
    Yaml {
        origin: String,
        #[source]
        error: serde_yaml::Error,
    },
    #[error(
        "expected exactly two YAML documents (attic section and settings) in '{origin}', found {found}"
    )]
    DocumentCount { origin: String, found: usize },
    #[error("'{origin}' has type '{found}', expected 'rosdoc2 config'")]
    WrongType { origin: String, found: String },
    #[error("'{origin}' has unsupported config version {version}")]
    UnsupportedVersion { origin: String, version: u64 },
    #[error("'{origin}' is missing the '{section}' section")]
    MissingSection {
        origin: String,
        section: &'static str,
    },
    #[error("builder entry {index} in '{origin}': {message}")]
    InvalidBuilder {
        origin: String,
        index: usize,
        message: String,
    },
}

/// Result of parsing a configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedConfig {
    pub schema: ConfigSchema,
    pub settings: SettingsSection,
    /// Values the build context should take on from `settings`
    pub delta: SettingsDelta,
    /// Builder stanzas in declaration order
    pub builders: Vec<BuilderSettings>,
}

/// Parse configuration `text` for the package in `context`.
///
/// The context is only read; its flags are updated by applying the returned
/// [`SettingsDelta`].
pub fn parse_config<P: PackageMetadata + ?Sized>(
    text: &str,
    context: &BuildContext<'_, P>,
) -> Result<ParsedConfig, ParseError> {
    let origin = context.configuration_file_path();
    let yaml_err = |error| ParseError::Yaml {
        origin: origin.clone(),
        error,
    };

    let documents = serde_yaml::Deserializer::from_str(text)
        .map(Value::deserialize)
        .collect::<Result<Vec<_>, _>>()
        .map_err(yaml_err)?;

    let [attic, body]: [Value; 2] =
        documents
            .try_into()
            .map_err(|docs: Vec<Value>| ParseError::DocumentCount {
                origin: origin.clone(),
                found: docs.len(),
            })?;

    let attic: Attic = serde_yaml::from_value(attic).map_err(yaml_err)?;
    if attic.config_type != CONFIG_TYPE {
        return Err(ParseError::WrongType {
            origin: origin.clone(),
            found: attic.config_type,
        });
    }
    let schema =
        ConfigSchema::from_version(attic.version).ok_or_else(|| ParseError::UnsupportedVersion {
            origin: origin.clone(),
            version: attic.version,
        })?;

    let body: ConfigBody = serde_yaml::from_value(body).map_err(yaml_err)?;
    // An empty section is kept as its defaults; only an absent key is an error.
    let settings = body
        .settings
        .ok_or_else(|| ParseError::MissingSection {
            origin: origin.clone(),
            section: "settings",
        })?
        .unwrap_or_default();
    let stanzas = body
        .builders
        .ok_or_else(|| ParseError::MissingSection {
            origin: origin.clone(),
            section: "builders",
        })?
        .unwrap_or_default();

    let builders = stanzas
        .into_iter()
        .enumerate()
        .map(|(index, stanza)| {
            parse_builder(stanza).map_err(|message| ParseError::InvalidBuilder {
                origin: origin.clone(),
                index,
                message,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        package = context.package().name(),
        build_type = context.build_type(),
        schema_version = schema.version(),
        builders = builders.len(),
        "parsed configuration from {origin}"
    );

    Ok(ParsedConfig {
        schema,
        delta: SettingsDelta::from_settings(&settings),
        settings,
        builders,
    })
}

fn parse_builder(stanza: BTreeMap<String, Value>) -> Result<BuilderSettings, String> {
    if stanza.len() != 1 {
        return Err(format!(
            "expected a single builder name per entry, found {}",
            stanza.len()
        ));
    }
    let Some((builder_name, value)) = stanza.into_iter().next() else {
        return Err("empty builder entry".to_string());
    };

    let builder = BuilderKind::from_name(&builder_name)
        .ok_or_else(|| format!("unknown builder '{builder_name}'"))?;

    let Value::Mapping(mapping) = value else {
        return Err(format!("settings for builder '{builder}' must be a mapping"));
    };

    let mut extra = BTreeMap::new();
    for (key, value) in mapping {
        let Value::String(key) = key else {
            return Err(format!("builder '{builder}' has a non-string key"));
        };
        extra.insert(key, value);
    }

    let name = take_string(&mut extra, "name", builder)?;
    let output_dir = take_string(&mut extra, "output_dir", builder)?;

    Ok(BuilderSettings {
        builder,
        name,
        output_dir,
        extra,
    })
}

fn take_string(
    entries: &mut BTreeMap<String, Value>,
    key: &str,
    builder: BuilderKind,
) -> Result<String, String> {
    match entries.remove(key) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(format!("'{key}' of builder '{builder}' must be a string")),
        None => Err(format!("builder '{builder}' is missing required key '{key}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::template::render_default_config;
    use crate::context::{ConfigSource, ToolOptions};
    use crate::package::PackageManifest;
    use std::path::PathBuf;

    fn package() -> PackageManifest {
        PackageManifest {
            name: "foo".to_string(),
            version: None,
            description: None,
            exports: vec![],
            filename: PathBuf::from("/ws/foo/package.xml"),
        }
    }

    fn parse(text: &str) -> Result<ParsedConfig, ParseError> {
        let pkg = package();
        let ctx = BuildContext::new(ConfigSource::Default, &pkg, ToolOptions::new()).unwrap();
        parse_config(text, &ctx)
    }

    #[test]
    fn test_parse_default_config() {
        let text = render_default_config(&package()).unwrap();
        let parsed = parse(&text).unwrap();

        assert_eq!(parsed.schema, ConfigSchema::V1);
        assert!(parsed.settings.generate_package_index);
        assert_eq!(parsed.settings.python_source.as_deref(), Some("foo"));
        assert_eq!(parsed.delta.always_run_doxygen, Some(false));
        assert_eq!(parsed.delta.always_run_sphinx_apidoc, Some(false));

        assert_eq!(parsed.builders.len(), 2);
        let doxygen = &parsed.builders[0];
        assert_eq!(doxygen.builder, BuilderKind::Doxygen);
        assert_eq!(doxygen.name, "foo Public C/C++ API");
        assert_eq!(doxygen.output_dir, "generated/doxygen");
        assert!(doxygen.extra.is_empty());

        let sphinx = &parsed.builders[1];
        assert_eq!(sphinx.builder, BuilderKind::Sphinx);
        assert_eq!(sphinx.name, "foo");
        assert_eq!(sphinx.output_dir, "");
        assert_eq!(
            sphinx.extra.get("doxygen_xml_directory"),
            Some(&Value::String("generated/doxygen/xml".to_string()))
        );
    }

    #[test]
    fn test_parse_always_run_aliases() {
        let text = r#"
type: 'rosdoc2 config'
version: 1
---
settings:
    always_run_doxygen: true
    always_run_sphinx_apidoc: true
builders: []
"#;
        let parsed = parse(text).unwrap();

        assert_eq!(parsed.delta.always_run_doxygen, Some(true));
        assert_eq!(parsed.delta.always_run_sphinx_apidoc, Some(true));
        assert_eq!(parsed.delta.python_source, None);
        assert!(parsed.builders.is_empty());
    }

    #[test]
    fn test_parse_single_document() {
        let err = parse("type: 'rosdoc2 config'\nversion: 1\n").unwrap_err();
        assert!(matches!(err, ParseError::DocumentCount { found: 1, .. }));
        assert!(err.to_string().contains("<default config>"));
    }

    #[test]
    fn test_parse_wrong_type() {
        let text = "type: 'something else'\nversion: 1\n---\nsettings: {}\nbuilders: []\n";
        let err = parse(text).unwrap_err();
        assert!(matches!(err, ParseError::WrongType { .. }));
    }

    #[test]
    fn test_parse_unsupported_version() {
        let text = "type: 'rosdoc2 config'\nversion: 2\n---\nsettings: {}\nbuilders: []\n";
        let err = parse(text).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedVersion { version: 2, .. }));
    }

    #[test]
    fn test_parse_missing_builders() {
        let text = "type: 'rosdoc2 config'\nversion: 1\n---\nsettings: {}\n";
        let err = parse(text).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingSection {
                section: "builders",
                ..
            }
        ));
    }

    #[test]
    fn test_parse_missing_settings() {
        let text = "type: 'rosdoc2 config'\nversion: 1\n---\nbuilders: []\n";
        let err = parse(text).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingSection {
                section: "settings",
                ..
            }
        ));
    }

    #[test]
    fn test_parse_empty_sections_use_defaults() {
        let text = "type: 'rosdoc2 config'\nversion: 1\n---\nsettings:\nbuilders:\n";
        let parsed = parse(text).unwrap();

        assert_eq!(parsed.settings, SettingsSection::default());
        assert!(parsed.delta.is_empty());
        assert!(parsed.builders.is_empty());
    }

    #[test]
    fn test_parse_unknown_builder() {
        let text = r#"
type: 'rosdoc2 config'
version: 1
---
settings: {}
builders:
    - javadoc: {name: 'x', output_dir: 'y'}
"#;
        let err = parse(text).unwrap_err();
        assert!(matches!(err, ParseError::InvalidBuilder { index: 0, .. }));
        assert!(err.to_string().contains("unknown builder 'javadoc'"));
    }

    #[test]
    fn test_parse_builder_missing_output_dir() {
        let text = r#"
type: 'rosdoc2 config'
version: 1
---
settings: {}
builders:
    - sphinx: {name: 'foo'}
"#;
        let err = parse(text).unwrap_err();
        assert!(err.to_string().contains("missing required key 'output_dir'"));
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let err = parse("type: [unclosed\n---\n").unwrap_err();
        assert!(matches!(err, ParseError::Yaml { .. }));
    }
}
