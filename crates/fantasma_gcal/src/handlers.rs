// File: crates/fantasma_gcal/src/handlers.rs
use crate::logic::{
    compute_slots, format_date_pretty, format_time_12, format_time_24, local_instant,
    minute_of_day, overlaps, parse_clock_time, parse_iso_date, resolve_session_kind, slot_window,
    validate_slot, AvailabilityQuery, AvailabilityResponse, BookingConfirmation, BookingRequest,
    BookingResponse, SessionKind, WeeklySchedule,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{Datelike, Utc};
use chrono_tz::Tz;
use fantasma_common::services::{
    BoxedError, CalendarEvent, CalendarService, NotificationService,
};
use fantasma_common::{
    conflict, error_response, external_service_error, internal_error, invalid_input,
    validation_error,
};
use fantasma_config::AppConfig;
use std::sync::Arc;
use tracing::{error, info, warn};

// Shared state for the booking routes. The calendar is held behind the
// service trait so the commit flow can be exercised against a mock.
#[derive(Clone)]
pub struct GcalState {
    pub config: Arc<AppConfig>,
    pub schedule: Arc<WeeklySchedule>,
    pub time_zone: Tz,
    pub calendar_id: String,
    pub calendar: Arc<dyn CalendarService<Error = BoxedError>>,
    pub notifier: Option<Arc<dyn NotificationService<Error = BoxedError>>>,
}

/// Handler to get available time slots for a date.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/availability",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Open start times for the date", body = AvailabilityResponse),
        (status = 400, description = "Bad request (invalid date or session type)"),
        (status = 502, description = "Calendar availability could not be fetched")
    ),
    tag = "Booking"
))]
pub async fn get_availability_handler(
    State(state): State<Arc<GcalState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, (StatusCode, String)> {
    let kind = resolve_session_kind(query.session_type.as_deref()).map_err(error_response)?;
    let date = parse_iso_date(&query.date).map_err(error_response)?;

    let tz = state.time_zone;
    let now = Utc::now();
    let today = now.with_timezone(&tz).date_naive();

    let empty = |date: String| {
        Json(AvailabilityResponse {
            date,
            session_type: kind,
            slots: Vec::new(),
        })
    };

    // Closed day and past date are valid business outcomes, answered
    // without touching the calendar.
    let Some(hours) = state.schedule.hours_for(date.weekday()) else {
        return Ok(empty(query.date));
    };
    if date < today {
        return Ok(empty(query.date));
    }

    // Free/busy window covering exactly this day's open hours.
    let window_start = local_instant(date, hours.open_minute(), tz)
        .ok_or_else(|| error_response(internal_error("Opening time does not exist on this date")))?;
    let window_end = local_instant(date, hours.close_minute(), tz)
        .ok_or_else(|| error_response(internal_error("Closing time does not exist on this date")))?;

    let busy_periods = state
        .calendar
        .get_busy_times(&state.calendar_id, window_start, window_end)
        .await
        .map_err(|e| {
            error!("Error fetching calendar free/busy: {}", e);
            error_response(external_service_error(
                "google_calendar",
                "Failed to fetch availability.",
            ))
        })?;

    let slots: Vec<String> = compute_slots(date, kind, &state.schedule, tz, now, &busy_periods)
        .into_iter()
        .map(format_time_24)
        .collect();

    info!(
        "Availability {} ({}): {} open slots",
        query.date,
        kind.as_str(),
        slots.len()
    );

    Ok(Json(AvailabilityResponse {
        date: query.date,
        session_type: kind,
        slots,
    }))
}

/// Handler to book a time slot.
///
/// Order is load-bearing: validate, re-fetch busy intervals for exactly
/// the requested span, overlap-check against that fresh read, then the
/// single insert write. A concurrent commit landing between the fresh
/// read and the write is not detected; the external calendar offers no
/// test-and-set, so that window is accepted and kept minimal rather than
/// papered over with retries that could double-book.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/book",
    request_body = BookingRequest,
    responses(
        (status = 200, description = "Booking confirmed", body = BookingResponse),
        (status = 400, description = "Missing/invalid fields or time outside available hours"),
        (status = 409, description = "Slot no longer available"),
        (status = 502, description = "Calendar could not be reached")
    ),
    tag = "Booking"
))]
pub async fn book_slot_handler(
    State(state): State<Arc<GcalState>>,
    Json(payload): Json<BookingRequest>,
) -> Result<Json<BookingResponse>, (StatusCode, String)> {
    // --- Validate required fields (before any external call) ---
    let (Some(name), Some(email), Some(phone), Some(session_type), Some(date_str), Some(time_str)) = (
        trimmed(&payload.name),
        trimmed(&payload.email),
        trimmed(&payload.phone),
        trimmed(&payload.session_type),
        trimmed(&payload.date),
        trimmed(&payload.time),
    ) else {
        return Err(error_response(invalid_input("All fields are required.")));
    };

    let kind = SessionKind::parse(session_type)
        .ok_or_else(|| error_response(invalid_input("Invalid session type.")))?;
    let date = parse_iso_date(date_str).map_err(error_response)?;
    let time = parse_clock_time(time_str).map_err(error_response)?;

    // --- Validate against the weekly schedule (no busy consultation) ---
    let Some(hours) = state.schedule.hours_for(date.weekday()) else {
        return Err(error_response(validation_error(
            "No availability on this day.",
        )));
    };
    validate_slot(
        hours,
        state.schedule.slot_step_minutes,
        minute_of_day(time),
        kind.duration_minutes(),
    )
    .map_err(error_response)?;

    let (slot_start, slot_end) =
        slot_window(date, time, kind.duration_minutes(), state.time_zone).map_err(error_response)?;

    // --- Freshness check: re-fetch busy intervals for exactly this span ---
    let busy_periods = state
        .calendar
        .get_busy_times(&state.calendar_id, slot_start, slot_end)
        .await
        .map_err(|e| {
            error!("Error checking slot availability: {}", e);
            error_response(external_service_error(
                "google_calendar",
                "Failed to check slot availability.",
            ))
        })?;

    if busy_periods
        .iter()
        .any(|(busy_start, busy_end)| overlaps(slot_start, slot_end, *busy_start, *busy_end))
    {
        return Err(error_response(conflict(
            "This time slot is no longer available.",
        )));
    }

    // --- Commit: the single calendar write ---
    let event = CalendarEvent {
        start_time: slot_start.to_rfc3339(),
        end_time: slot_end.to_rfc3339(),
        summary: format!("Fantasma Training - {} - {}", kind.label(), name),
        description: Some(format!(
            "Session Type: {}\nName: {}\nEmail: {}\nPhone: {}\n\nBooked via the Fantasma website",
            kind.label(),
            name,
            email,
            phone
        )),
        // Tangerine, so bookings stand out on the shared calendar
        color_id: Some("6".to_string()),
    };

    let created = state
        .calendar
        .create_event(&state.calendar_id, event)
        .await
        .map_err(|e| {
            error!("Error creating booking event: {}", e);
            error_response(external_service_error(
                "google_calendar",
                "Failed to create booking.",
            ))
        })?;

    info!("Booked {} for {} on {}: event {:?}", kind.as_str(), name, date_str, created.event_id);

    let pretty_date = format_date_pretty(date);
    let pretty_time = format_time_12(time);

    // --- Best-effort notification: never affects the booking result ---
    send_booking_alerts(&state, kind, name, email, phone, &pretty_date, &pretty_time).await;

    Ok(Json(BookingResponse {
        success: true,
        booking: BookingConfirmation {
            session_type: kind.label().to_string(),
            date: pretty_date,
            time: pretty_time,
            duration: kind.duration_label().to_string(),
        },
    }))
}

async fn send_booking_alerts(
    state: &GcalState,
    kind: SessionKind,
    name: &str,
    email: &str,
    phone: &str,
    pretty_date: &str,
    pretty_time: &str,
) {
    let (Some(notifier), Some(notify_config)) = (&state.notifier, state.config.notify.as_ref())
    else {
        return;
    };

    let sms_text = format!(
        "New Booking: {} - {} - {} at {}",
        kind.label(),
        name,
        pretty_date,
        pretty_time
    );
    if let Err(e) = notifier.send_sms(&notify_config.alert_phone, &sms_text).await {
        warn!("Booking SMS alert failed: {}", e);
    }

    if let Some(alert_email) = notify_config.alert_email.as_deref() {
        let subject = format!("Fantasma Booking: {} - {} at {}", name, pretty_date, pretty_time);
        let body = format!(
            "New booking from the website:\n\nName: {}\nEmail: {}\nPhone: {}\nSession: {}\nDate: {}\nTime: {}\nDuration: {}",
            name,
            email,
            phone,
            kind.label(),
            pretty_date,
            pretty_time,
            kind.duration_label()
        );
        if let Err(e) = notifier.send_email(alert_email, &subject, &body, false).await {
            warn!("Booking email alert failed: {}", e);
        }
    }
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
