//! Runtime feature flag handling.
//!
//! A feature is live only when its `use_*` flag is set *and* its
//! configuration section is present; either alone is not enough.

use fantasma_config::AppConfig;
use std::sync::Arc;

/// Check if a feature is enabled at runtime based on configuration.
pub fn is_feature_enabled<T>(
    _config: &Arc<AppConfig>,
    use_feature: bool,
    feature_config: Option<&T>,
) -> bool {
    use_feature && feature_config.is_some()
}

/// Check if the Google Calendar feature is enabled at runtime.
pub fn is_gcal_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config, config.use_gcal, config.gcal.as_ref())
}

/// Check if the notification feature is enabled at runtime.
pub fn is_notify_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config, config.use_notify, config.notify.as_ref())
}
