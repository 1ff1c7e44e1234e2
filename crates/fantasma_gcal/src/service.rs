// --- File: crates/fantasma_gcal/src/service.rs ---
//! Google Calendar service implementation.
//!
//! Implements the `CalendarService` trait over the Google Calendar API:
//! a free/busy query for availability checks and a single events.insert
//! for the commit write. The service performs no availability checking
//! of its own; the committer owns the fetch-then-write ordering.

use chrono::{DateTime, Utc};
use fantasma_common::services::{
    BoxFuture, CalendarEvent, CalendarEventResult, CalendarService,
};
use google_calendar3::api::{Event, EventDateTime, FreeBusyRequest, FreeBusyRequestItem};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::auth::HubType;

/// Errors that can occur when interacting with Google Calendar.
#[derive(Error, Debug)]
pub enum GcalServiceError {
    #[error("Google API Error: {0}")]
    ApiError(#[from] google_calendar3::Error),
    #[error("Failed to parse time: {0}")]
    TimeParseError(String),
    #[error("Calendar error: {0}")]
    CalendarError(String),
}

/// Google Calendar service implementation.
pub struct GoogleCalendarService {
    calendar_hub: Arc<HubType>,
}

impl GoogleCalendarService {
    /// Create a new Google Calendar service.
    pub fn new(calendar_hub: Arc<HubType>) -> Self {
        Self { calendar_hub }
    }
}

impl CalendarService for GoogleCalendarService {
    type Error = GcalServiceError;

    /// Retrieves busy periods for the calendar within `[start_time, end_time)`,
    /// sorted chronologically. Entries with a missing start or end are
    /// skipped with a log line rather than failing the whole query.
    fn get_busy_times(
        &self,
        calendar_id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<(DateTime<Utc>, DateTime<Utc>)>, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let req = FreeBusyRequest {
                time_min: Some(start_time),
                time_max: Some(end_time),
                time_zone: Some("UTC".to_string()),
                items: Some(vec![FreeBusyRequestItem {
                    id: Some(calendar_id.to_string()),
                    ..Default::default()
                }]),
                ..Default::default()
            };

            let (_response, freebusy_response) = calendar_hub.freebusy().query(req).doit().await?;

            let mut busy_periods = Vec::new();

            if let Some(calendars) = freebusy_response.calendars {
                if let Some(cal_info) = calendars.get(&calendar_id) {
                    if let Some(busy_times) = &cal_info.busy {
                        for period in busy_times {
                            if let (Some(start_dt), Some(end_dt)) = (period.start, period.end) {
                                busy_periods.push((start_dt, end_dt));
                            } else {
                                info!(
                                    "Skipping busy period with missing start/end: {:?}",
                                    period
                                );
                            }
                        }
                    }
                }
            }
            busy_periods.sort_by_key(|k| k.0);
            Ok(busy_periods)
        })
    }

    /// Creates the booking event. This is the single non-idempotent write
    /// of the commit path; callers must have completed their freshness
    /// check before invoking it.
    fn create_event(
        &self,
        calendar_id: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, CalendarEventResult, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let start_dt = DateTime::parse_from_rfc3339(&event.start_time)
                .map_err(|e| GcalServiceError::TimeParseError(format!("Invalid start_time: {}", e)))?
                .with_timezone(&Utc);
            let end_dt = DateTime::parse_from_rfc3339(&event.end_time)
                .map_err(|e| GcalServiceError::TimeParseError(format!("Invalid end_time: {}", e)))?
                .with_timezone(&Utc);

            if end_dt <= start_dt {
                return Err(GcalServiceError::CalendarError(
                    "End time must be after start time".to_string(),
                ));
            }

            let new_event = Event {
                summary: Some(event.summary),
                description: event.description,
                color_id: event.color_id,
                start: Some(EventDateTime {
                    date_time: Some(start_dt),
                    time_zone: Some("UTC".to_string()),
                    ..Default::default()
                }),
                end: Some(EventDateTime {
                    date_time: Some(end_dt),
                    time_zone: Some("UTC".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            };

            let (_response, created_event) = calendar_hub
                .events()
                .insert(new_event, &calendar_id)
                .doit()
                .await?;

            Ok(CalendarEventResult {
                event_id: created_event.id,
                status: created_event
                    .status
                    .unwrap_or_else(|| "confirmed".to_string()),
            })
        })
    }
}

/// Mock implementation of CalendarService for testing.
#[cfg(test)]
pub mod mock {
    use super::*;
    use fantasma_common::services::BoxedError;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory calendar for tests: seeded busy periods plus everything
    /// booked through it. Counts free/busy queries so tests can assert
    /// which paths touched the calendar at all.
    pub struct MockCalendarService {
        busy: Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>,
        created: Mutex<Vec<CalendarEvent>>,
        busy_queries: AtomicUsize,
        unavailable: AtomicBool,
        fail_create: AtomicBool,
    }

    impl Default for MockCalendarService {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockCalendarService {
        pub fn new() -> Self {
            Self {
                busy: Mutex::new(Vec::new()),
                created: Mutex::new(Vec::new()),
                busy_queries: AtomicUsize::new(0),
                unavailable: AtomicBool::new(false),
                fail_create: AtomicBool::new(false),
            }
        }

        /// Registers a busy period, as if another caller booked it.
        pub fn seed_busy(&self, start: DateTime<Utc>, end: DateTime<Utc>) {
            self.busy.lock().unwrap().push((start, end));
        }

        /// Makes every subsequent call fail, simulating an outage.
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        /// Fails only the insert write, leaving free/busy reads working.
        pub fn set_fail_create(&self, fail: bool) {
            self.fail_create.store(fail, Ordering::SeqCst);
        }

        pub fn busy_query_count(&self) -> usize {
            self.busy_queries.load(Ordering::SeqCst)
        }

        pub fn created_events(&self) -> Vec<CalendarEvent> {
            self.created.lock().unwrap().clone()
        }

        fn outage_error() -> BoxedError {
            BoxedError(Box::new(GcalServiceError::CalendarError(
                "calendar unavailable".to_string(),
            )))
        }
    }

    impl CalendarService for MockCalendarService {
        type Error = BoxedError;

        fn get_busy_times(
            &self,
            _calendar_id: &str,
            start_time: DateTime<Utc>,
            end_time: DateTime<Utc>,
        ) -> BoxFuture<'_, Vec<(DateTime<Utc>, DateTime<Utc>)>, Self::Error> {
            self.busy_queries.fetch_add(1, Ordering::SeqCst);

            Box::pin(async move {
                if self.unavailable.load(Ordering::SeqCst) {
                    return Err(Self::outage_error());
                }

                let mut busy_times: Vec<(DateTime<Utc>, DateTime<Utc>)> = self
                    .busy
                    .lock()
                    .unwrap()
                    .iter()
                    .copied()
                    .collect();

                // Booked events count as busy too.
                for event in self.created.lock().unwrap().iter() {
                    let event_start = DateTime::parse_from_rfc3339(&event.start_time)
                        .map_err(|e| BoxedError(Box::new(GcalServiceError::TimeParseError(e.to_string()))))?
                        .with_timezone(&Utc);
                    let event_end = DateTime::parse_from_rfc3339(&event.end_time)
                        .map_err(|e| BoxedError(Box::new(GcalServiceError::TimeParseError(e.to_string()))))?
                        .with_timezone(&Utc);
                    busy_times.push((event_start, event_end));
                }

                busy_times.retain(|(busy_start, busy_end)| {
                    *busy_start < end_time && *busy_end > start_time
                });
                busy_times.sort_by_key(|k| k.0);
                Ok(busy_times)
            })
        }

        fn create_event(
            &self,
            _calendar_id: &str,
            event: CalendarEvent,
        ) -> BoxFuture<'_, CalendarEventResult, Self::Error> {
            Box::pin(async move {
                if self.unavailable.load(Ordering::SeqCst) || self.fail_create.load(Ordering::SeqCst)
                {
                    return Err(Self::outage_error());
                }

                self.created.lock().unwrap().push(event);

                Ok(CalendarEventResult {
                    event_id: Some(format!("mock-event-{}", uuid::Uuid::new_v4())),
                    status: "confirmed".to_string(),
                })
            })
        }
    }
}
