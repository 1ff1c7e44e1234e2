// --- File: crates/fantasma_gcal/src/logic.rs ---
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use fantasma_common::{invalid_input, validation_error, FantasmaError};
use fantasma_config::ScheduleConfig;
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

// --- Schedule Model ---

/// Open interval for one weekday, in whole hours of the business's local
/// clock. Invariant: `start_hour < end_hour <= 24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayHours {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl DayHours {
    pub fn open_minute(&self) -> u32 {
        self.start_hour * 60
    }

    pub fn close_minute(&self) -> u32 {
        self.end_hour * 60
    }
}

/// Static weekly business hours plus the candidate step size.
/// Built once from configuration; read-only afterwards.
#[derive(Debug, Clone)]
pub struct WeeklySchedule {
    // Index 0 = Sunday, matching the configuration order.
    days: [Option<DayHours>; 7],
    pub slot_step_minutes: u32,
}

impl WeeklySchedule {
    pub fn from_config(config: &ScheduleConfig) -> Result<Self, FantasmaError> {
        if config.slot_step_minutes == 0 {
            return Err(FantasmaError::Internal(
                "schedule: slot_step_minutes must be positive".to_string(),
            ));
        }
        let raw = [
            config.sunday,
            config.monday,
            config.tuesday,
            config.wednesday,
            config.thursday,
            config.friday,
            config.saturday,
        ];
        let mut days = [None; 7];
        for (i, entry) in raw.iter().enumerate() {
            if let Some(hours) = entry {
                if hours.start_hour >= hours.end_hour || hours.end_hour > 24 {
                    return Err(FantasmaError::Internal(format!(
                        "schedule: invalid hours {}-{} for weekday {}",
                        hours.start_hour, hours.end_hour, i
                    )));
                }
                days[i] = Some(DayHours {
                    start_hour: hours.start_hour,
                    end_hour: hours.end_hour,
                });
            }
        }
        Ok(WeeklySchedule {
            days,
            slot_step_minutes: config.slot_step_minutes,
        })
    }

    /// Returns the open hours for a weekday, or `None` when closed.
    pub fn hours_for(&self, weekday: Weekday) -> Option<&DayHours> {
        self.days[weekday.num_days_from_sunday() as usize].as_ref()
    }
}

// --- Session Kinds ---

/// The bookable session types and their fixed durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub enum SessionKind {
    #[default]
    #[serde(rename = "1-on-1")]
    OneOnOne,
    #[serde(rename = "small-group")]
    SmallGroup,
}

impl SessionKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "1-on-1" => Some(SessionKind::OneOnOne),
            "small-group" => Some(SessionKind::SmallGroup),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionKind::OneOnOne => "1-on-1",
            SessionKind::SmallGroup => "small-group",
        }
    }

    pub fn duration_minutes(self) -> u32 {
        match self {
            SessionKind::OneOnOne => 60,
            SessionKind::SmallGroup => 90,
        }
    }

    pub fn duration(self) -> Duration {
        Duration::minutes(self.duration_minutes() as i64)
    }

    /// Human-readable session label used in event summaries and alerts.
    pub fn label(self) -> &'static str {
        match self {
            SessionKind::OneOnOne => "1-on-1 Training",
            SessionKind::SmallGroup => "Small Group Training",
        }
    }

    pub fn duration_label(self) -> &'static str {
        match self {
            SessionKind::OneOnOne => "1 hour",
            SessionKind::SmallGroup => "1.5 hours",
        }
    }
}

// --- Data Structures ---

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct AvailabilityQuery {
    /// Date in YYYY-MM-DD format
    pub date: String,

    /// Session type ("1-on-1" or "small-group"); defaults to "1-on-1"
    #[serde(rename = "sessionType")]
    pub session_type: Option<String>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AvailabilityResponse {
    pub date: String,
    #[serde(rename = "sessionType")]
    pub session_type: SessionKind,
    /// Open start times as local "HH:MM", ascending
    pub slots: Vec<String>,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BookingRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, rename = "sessionType")]
    pub session_type: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BookingConfirmation {
    #[serde(rename = "sessionType")]
    pub session_type: String,
    /// Display date, e.g. "January 7, 2030"
    pub date: String,
    /// Display time, e.g. "4:00 PM"
    pub time: String,
    pub duration: String,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BookingResponse {
    pub success: bool,
    pub booking: BookingConfirmation,
}

// --- Input Parsing ---

pub fn parse_iso_date(value: &str) -> Result<NaiveDate, FantasmaError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| invalid_input("Invalid date format. Use YYYY-MM-DD."))
}

pub fn parse_clock_time(value: &str) -> Result<NaiveTime, FantasmaError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| invalid_input("Invalid time format. Use HH:MM."))
}

/// Resolves an optional session-type parameter, defaulting to 1-on-1.
pub fn resolve_session_kind(value: Option<&str>) -> Result<SessionKind, FantasmaError> {
    match value {
        None => Ok(SessionKind::default()),
        Some(raw) => SessionKind::parse(raw)
            .ok_or_else(|| invalid_input("Invalid session type. Use \"1-on-1\" or \"small-group\".")),
    }
}

// --- Availability Logic ---

/// Half-open interval overlap: touching endpoints do not overlap.
pub fn overlaps(
    slot_start: DateTime<Utc>,
    slot_end: DateTime<Utc>,
    busy_start: DateTime<Utc>,
    busy_end: DateTime<Utc>,
) -> bool {
    slot_start < busy_end && slot_end > busy_start
}

/// Resolves a local wall-clock minute-of-day on `date` to an absolute
/// instant. Minutes past 24:00 roll into the next day (a slot may end
/// exactly at a midnight close). On a DST-ambiguous wall time the
/// earlier reading wins; a nonexistent wall time yields `None`.
pub fn local_instant(date: NaiveDate, minute_of_day: u32, tz: Tz) -> Option<DateTime<Utc>> {
    let (date, minute) = if minute_of_day >= 24 * 60 {
        (date.succ_opt()?, minute_of_day - 24 * 60)
    } else {
        (date, minute_of_day)
    };
    let time = NaiveTime::from_num_seconds_from_midnight_opt(minute * 60, 0)?;
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Enumerates the open start times for one day's hours: candidates step
/// from opening in `step_minutes` increments while the full duration
/// still fits, today's already-started candidates are dropped (a slot
/// starting exactly now is considered passed), and any candidate whose
/// span overlaps a busy interval is removed. Pure function of its
/// inputs; ascending order falls out of the enumeration.
#[allow(clippy::too_many_arguments)]
pub fn available_start_times(
    date: NaiveDate,
    duration_minutes: u32,
    hours: &DayHours,
    step_minutes: u32,
    tz: Tz,
    now: DateTime<Utc>,
    busy_periods: &[(DateTime<Utc>, DateTime<Utc>)],
) -> Vec<NaiveTime> {
    let now_local = now.with_timezone(&tz);
    let today = now_local.date_naive();
    if date < today {
        // Past dates never have slots.
        return Vec::new();
    }
    let is_today = date == today;
    let now_minute = now_local.hour() * 60 + now_local.minute();

    let close = hours.close_minute();
    let mut slots = Vec::new();
    let mut minute = hours.open_minute();
    while minute + duration_minutes <= close {
        if is_today && minute <= now_minute {
            minute += step_minutes;
            continue;
        }
        let span = (
            local_instant(date, minute, tz),
            local_instant(date, minute + duration_minutes, tz),
        );
        if let (Some(slot_start), Some(slot_end)) = span {
            let taken = busy_periods
                .iter()
                .any(|(busy_start, busy_end)| overlaps(slot_start, slot_end, *busy_start, *busy_end));
            if !taken {
                if let Some(time) = NaiveTime::from_num_seconds_from_midnight_opt(minute * 60, 0) {
                    slots.push(time);
                }
            }
        }
        minute += step_minutes;
    }
    slots
}

/// Computes the bookable start times for `date`, consulting the weekly
/// schedule for that weekday. A closed day is an empty list, not an
/// error.
pub fn compute_slots(
    date: NaiveDate,
    kind: SessionKind,
    schedule: &WeeklySchedule,
    tz: Tz,
    now: DateTime<Utc>,
    busy_periods: &[(DateTime<Utc>, DateTime<Utc>)],
) -> Vec<NaiveTime> {
    let Some(hours) = schedule.hours_for(date.weekday()) else {
        return Vec::new();
    };
    available_start_times(
        date,
        kind.duration_minutes(),
        hours,
        schedule.slot_step_minutes,
        tz,
        now,
        busy_periods,
    )
}

// --- Booking Validation ---

/// Checks that a requested start time is a member of the candidate set
/// the calculator would enumerate for these hours: within bounds, full
/// duration before close, and aligned to the step measured from opening.
/// Does not consult busy intervals.
pub fn validate_slot(
    hours: &DayHours,
    step_minutes: u32,
    start_minute: u32,
    duration_minutes: u32,
) -> Result<(), FantasmaError> {
    let open = hours.open_minute();
    if start_minute < open {
        return Err(validation_error("Time is outside available hours."));
    }
    if start_minute + duration_minutes > hours.close_minute() {
        return Err(validation_error("Time is outside available hours."));
    }
    if (start_minute - open) % step_minutes != 0 {
        return Err(validation_error("Time is outside available hours."));
    }
    Ok(())
}

/// The absolute `[start, end)` span of a requested slot in the business
/// time zone.
pub fn slot_window(
    date: NaiveDate,
    start: NaiveTime,
    duration_minutes: u32,
    tz: Tz,
) -> Result<(DateTime<Utc>, DateTime<Utc>), FantasmaError> {
    let start_minute = minute_of_day(start);
    let slot_start = local_instant(date, start_minute, tz)
        .ok_or_else(|| validation_error("Requested time does not exist on this date."))?;
    let slot_end = local_instant(date, start_minute + duration_minutes, tz)
        .ok_or_else(|| validation_error("Requested time does not exist on this date."))?;
    Ok((slot_start, slot_end))
}

// --- Display Formatting ---

pub fn format_time_24(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

pub fn format_time_12(time: NaiveTime) -> String {
    let (is_pm, hour) = time.hour12();
    format!(
        "{}:{:02} {}",
        hour,
        time.minute(),
        if is_pm { "PM" } else { "AM" }
    )
}

pub fn format_date_pretty(date: NaiveDate) -> String {
    format!("{} {}, {}", date.format("%B"), date.day(), date.year())
}
