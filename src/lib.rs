//! Resolve the documentation build settings rosdoc2 uses for a ROS package.
//!
//! A package either points at its own configuration file through a
//! `<rosdoc2>` export in its `package.xml`, or gets the default
//! configuration rendered for it. The chosen text is parsed into per-builder
//! settings and a [`BuildContext`] carrying the package-wide flags.

pub mod colors;
pub mod config;
pub mod context;
pub mod inspect;
pub mod package;

pub use colors::{should_use_colors, Colors};
pub use config::{
    apply_settings_delta, find_config_export, generate_default_config_file_in, load_config_text,
    parse_config, render_default_config, BuilderKind, BuilderSettings, ConfigError, ConfigSchema,
    ParseError, ParsedConfig, SettingsDelta, SettingsSection, TemplateError,
    DEFAULT_CONFIG_FILE_NAME, ROSDOC2_EXPORT_TAG,
};
pub use context::{BuildContext, ConfigSource, ToolOptions, DEFAULT_CONFIG_SOURCE};
pub use inspect::{
    inspect_package_for_settings, resolve_config_text, InspectError, InspectedSettings,
    ResolvedConfig,
};
pub use package::{find_package_xml, Export, PackageError, PackageManifest, PackageMetadata};
