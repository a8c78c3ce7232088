//! Merging parsed settings back into the build context
//!
//! The parser never mutates the context. It returns a [`SettingsDelta`] that
//! is applied here, so only values present in the configuration change.

use crate::context::BuildContext;
use crate::package::PackageMetadata;

use super::schema::SettingsSection;

/// Build context values taken from a `settings:` block.
///
/// `None` means "not specified" and leaves the context untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsDelta {
    pub python_source: Option<String>,
    pub always_run_doxygen: Option<bool>,
    pub always_run_sphinx_apidoc: Option<bool>,
}

impl SettingsDelta {
    pub fn from_settings(settings: &SettingsSection) -> Self {
        Self {
            python_source: settings.python_source.clone(),
            always_run_doxygen: settings.run_doxygen,
            always_run_sphinx_apidoc: settings.run_sphinx_apidoc,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.python_source.is_none()
            && self.always_run_doxygen.is_none()
            && self.always_run_sphinx_apidoc.is_none()
    }
}

/// Apply every value present in `delta` through the context's setters.
pub fn apply_settings_delta<P: PackageMetadata + ?Sized>(
    context: &mut BuildContext<'_, P>,
    delta: &SettingsDelta,
) {
    if let Some(python_source) = &delta.python_source {
        context.add_python_source(python_source.clone());
    }
    if let Some(flag) = delta.always_run_doxygen {
        context.add_always_run_doxygen(flag);
    }
    if let Some(flag) = delta.always_run_sphinx_apidoc {
        context.add_always_run_sphinx_apidoc(flag);
    }
}
