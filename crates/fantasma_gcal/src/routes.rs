// --- File: crates/fantasma_gcal/src/routes.rs ---

use crate::handlers::{book_slot_handler, get_availability_handler, GcalState};
use crate::logic::WeeklySchedule;
use axum::{
    routing::{get, post},
    Router,
};
use chrono_tz::Tz;
use fantasma_common::services::{BoxedError, CalendarService, NotificationService};
use fantasma_common::{internal_error, FantasmaError};
use fantasma_config::AppConfig;
use std::str::FromStr;
use std::sync::Arc;

/// Creates the router for the booking feature. The calendar and
/// notification services are injected so callers (and tests) choose the
/// backing implementation.
pub fn routes(
    config: Arc<AppConfig>,
    calendar: Arc<dyn CalendarService<Error = BoxedError>>,
    notifier: Option<Arc<dyn NotificationService<Error = BoxedError>>>,
) -> Result<Router, FantasmaError> {
    let gcal_config = config
        .gcal
        .as_ref()
        .ok_or_else(|| internal_error("GCal config missing"))?;
    let calendar_id = gcal_config
        .calendar_id
        .clone()
        .ok_or_else(|| internal_error("GCal calendar_id missing"))?;
    let time_zone = gcal_config
        .time_zone
        .as_deref()
        .map(Tz::from_str)
        .transpose()
        .map_err(|e| internal_error(format!("Invalid gcal.time_zone: {}", e)))?
        .unwrap_or(Tz::America__New_York);
    let schedule = Arc::new(WeeklySchedule::from_config(&config.schedule)?);

    let state = Arc::new(GcalState {
        config,
        schedule,
        time_zone,
        calendar_id,
        calendar,
        notifier,
    });

    Ok(Router::new()
        .route("/availability", get(get_availability_handler))
        .route("/book", post(book_slot_handler))
        .with_state(state))
}
