// --- File: crates/fantasma_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Weekly Schedule Config ---
/// Open interval for one weekday, hours on a 24-hour clock in the
/// business time zone. Invariant: `start_hour < end_hour`.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct DayHoursConfig {
    pub start_hour: u32,
    pub end_hour: u32,
}

/// Static weekly business hours. A missing day is closed.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    #[serde(default)]
    pub sunday: Option<DayHoursConfig>,
    #[serde(default)]
    pub monday: Option<DayHoursConfig>,
    #[serde(default)]
    pub tuesday: Option<DayHoursConfig>,
    #[serde(default)]
    pub wednesday: Option<DayHoursConfig>,
    #[serde(default)]
    pub thursday: Option<DayHoursConfig>,
    #[serde(default)]
    pub friday: Option<DayHoursConfig>,
    #[serde(default)]
    pub saturday: Option<DayHoursConfig>,
    /// Candidate start-time granularity in minutes, measured from the
    /// day's opening hour. Fixed per deployment, never per session kind.
    #[serde(default = "default_slot_step")]
    pub slot_step_minutes: u32,
}

fn default_slot_step() -> u32 {
    30
}

impl Default for ScheduleConfig {
    // Deployment hours: weekday evenings, Saturday mornings, closed Sunday.
    fn default() -> Self {
        let evenings = Some(DayHoursConfig {
            start_hour: 15,
            end_hour: 20,
        });
        ScheduleConfig {
            sunday: None,
            monday: evenings,
            tuesday: evenings,
            wednesday: evenings,
            thursday: evenings,
            friday: evenings,
            saturday: Some(DayHoursConfig {
                start_hour: 9,
                end_hour: 14,
            }),
            slot_step_minutes: default_slot_step(),
        }
    }
}

// --- Google Calendar Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GcalConfig {
    pub key_path: Option<String>,
    pub calendar_id: Option<String>,
    /// IANA time zone of the business (e.g. "America/New_York").
    pub time_zone: Option<String>,
}

// --- Notification Config ---
// Holds non-secret notification config. Secrets arrive via env overrides
// (FANTASMA__NOTIFY__AUTH_TOKEN, FANTASMA__NOTIFY__SENDGRID_API_KEY).
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NotifyConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    /// Owner phone that receives the booking SMS alert.
    pub alert_phone: String,
    pub alert_email: Option<String>,
    pub email_from: Option<String>,
    pub sendgrid_api_key: Option<String>,
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_gcal: bool,
    #[serde(default)]
    pub use_notify: bool,

    /// Weekly business hours; defaults to the standard deployment hours.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub gcal: Option<GcalConfig>,
    #[serde(default)]
    pub notify: Option<NotifyConfig>,
}
