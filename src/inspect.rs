//! Settings inspection: decide which configuration a package uses and parse it.

use thiserror::Error;
use tracing::{debug, info};

use crate::config::{
    apply_settings_delta, config_exports, ensure_config_exists, find_config_export,
    load_config_text, parse_config, render_default_config, BuilderSettings, ConfigError,
    ParseError, SettingsSection, TemplateError,
};
use crate::context::{BuildContext, ConfigSource, ToolOptions};
use crate::package::{PackageError, PackageMetadata};

/// Error type for settings inspection. Nothing is retried or recovered.
#[derive(Debug, Error)]
pub enum InspectError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Default template and substitution map disagree
    #[error("failed to render default config: {0}")]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Package(#[from] PackageError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Configuration text chosen for a package, and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub text: String,
    pub source: ConfigSource,
}

/// Settings for one package's documentation build.
#[derive(Debug)]
pub struct InspectedSettings<'a, P: PackageMetadata + ?Sized> {
    /// Build context with the configuration's settings applied
    pub context: BuildContext<'a, P>,
    pub settings: SettingsSection,
    pub builders: Vec<BuilderSettings>,
}

/// Pick the configuration text for `package`.
///
/// Uses the file named by the package's last `rosdoc2` export if there is
/// one, otherwise the default configuration rendered for the package. Every
/// `rosdoc2` export must name an existing file, not only the one that is read.
pub fn resolve_config_text<P: PackageMetadata + ?Sized>(
    package: &P,
) -> Result<ResolvedConfig, InspectError> {
    if let Some(export) = find_config_export(package.exports()) {
        for referenced in config_exports(package.exports()) {
            ensure_config_exists(package, referenced)?;
        }
        let (path, text) = load_config_text(package, export)?;
        info!(package = package.name(), "using config file {}", path.display());
        return Ok(ResolvedConfig {
            text,
            source: ConfigSource::File(path),
        });
    }

    debug!(package = package.name(), "no rosdoc2 export, using default config");
    Ok(ResolvedConfig {
        text: render_default_config(package)?,
        source: ConfigSource::Default,
    })
}

/// Inspect `package` for its documentation build settings.
pub fn inspect_package_for_settings<P: PackageMetadata + ?Sized>(
    package: &P,
    tool_options: ToolOptions,
) -> Result<InspectedSettings<'_, P>, InspectError> {
    let resolved = resolve_config_text(package)?;
    let mut context = BuildContext::new(resolved.source, package, tool_options)?;

    let parsed = parse_config(&resolved.text, &context)?;
    if parsed.delta.is_empty() {
        debug!(package = package.name(), "configuration sets no build context overrides");
    } else {
        apply_settings_delta(&mut context, &parsed.delta);
    }

    Ok(InspectedSettings {
        context,
        settings: parsed.settings,
        builders: parsed.builders,
    })
}
