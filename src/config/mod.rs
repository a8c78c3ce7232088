//! Configuration support for rosdoc2 settings.
//!
//! This module provides:
//! - Locating a user config file through the package's `rosdoc2` export
//! - The versioned default configuration template and `--init`
//! - YAML schema types and the configuration parser
//! - Merging parsed settings back into the build context

mod file;
mod merge;
mod parse;
mod schema;
mod template;

pub use file::{
    config_exports, ensure_config_exists, find_config_export, load_config_text,
    resolve_config_path, ConfigError, ROSDOC2_EXPORT_TAG,
};
pub use merge::{apply_settings_delta, SettingsDelta};
pub use parse::{parse_config, ParseError, ParsedConfig};
pub use schema::{Attic, BuilderKind, BuilderSettings, ConfigBody, SettingsSection};
pub use template::{
    format_map_from_package, generate_default_config_file_in, render_default_config,
    render_template, ConfigSchema, FormatMap, TemplateError, CONFIG_TYPE,
    DEFAULT_CONFIG_FILE_NAME, DEFAULT_CONFIG_V1,
};
