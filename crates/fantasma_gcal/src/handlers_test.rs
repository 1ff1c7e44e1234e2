#[cfg(test)]
mod tests {
    use crate::handlers::{book_slot_handler, get_availability_handler, GcalState};
    use crate::logic::{AvailabilityQuery, BookingRequest, WeeklySchedule};
    use crate::service::mock::MockCalendarService;
    use axum::extract::{Query, State};
    use axum::http::StatusCode;
    use axum::Json;
    use chrono::{DateTime, TimeZone, Utc};
    use chrono_tz::Tz;
    use fantasma_common::services::{
        BoxFuture, BoxedError, NotificationResult, NotificationService,
    };
    use fantasma_config::{AppConfig, GcalConfig, NotifyConfig, ScheduleConfig, ServerConfig};
    use std::sync::{Arc, Mutex};

    fn tz() -> Tz {
        chrono_tz::America::New_York
    }

    fn local_utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        tz().with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn notify_config() -> NotifyConfig {
        NotifyConfig {
            account_sid: "ACtest".to_string(),
            auth_token: "token".to_string(),
            from_number: "+15550001111".to_string(),
            alert_phone: "+15550002222".to_string(),
            alert_email: Some("owner@example.com".to_string()),
            email_from: Some("noreply@example.com".to_string()),
            sendgrid_api_key: Some("SG.test".to_string()),
        }
    }

    fn test_state(
        calendar: Arc<MockCalendarService>,
        notifier: Option<Arc<dyn NotificationService<Error = BoxedError>>>,
    ) -> Arc<GcalState> {
        let with_notify = notifier.is_some();
        let config = Arc::new(AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8086,
            },
            use_gcal: true,
            use_notify: with_notify,
            schedule: ScheduleConfig::default(),
            gcal: Some(GcalConfig {
                key_path: None,
                calendar_id: Some("primary".to_string()),
                time_zone: Some("America/New_York".to_string()),
            }),
            notify: with_notify.then(notify_config),
        });
        let schedule = Arc::new(WeeklySchedule::from_config(&config.schedule).unwrap());
        Arc::new(GcalState {
            config,
            schedule,
            time_zone: tz(),
            calendar_id: "primary".to_string(),
            calendar,
            notifier,
        })
    }

    fn availability_query(date: &str, session_type: Option<&str>) -> Query<AvailabilityQuery> {
        Query(AvailabilityQuery {
            date: date.to_string(),
            session_type: session_type.map(str::to_string),
        })
    }

    fn booking_request(date: &str, time: &str, session_type: &str) -> BookingRequest {
        BookingRequest {
            name: Some("Jamie Ortega".to_string()),
            email: Some("jamie@example.com".to_string()),
            phone: Some("555-010-2030".to_string()),
            session_type: Some(session_type.to_string()),
            date: Some(date.to_string()),
            time: Some(time.to_string()),
        }
    }

    /// Notifier that records every alert, or fails them all.
    struct RecordingNotifier {
        fail: bool,
        sms: Mutex<Vec<(String, String)>>,
        emails: Mutex<Vec<(String, String, String)>>,
    }

    impl RecordingNotifier {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                sms: Mutex::new(Vec::new()),
                emails: Mutex::new(Vec::new()),
            }
        }
    }

    impl NotificationService for RecordingNotifier {
        type Error = BoxedError;

        fn send_email(
            &self,
            to: &str,
            subject: &str,
            body: &str,
            _is_html: bool,
        ) -> BoxFuture<'_, NotificationResult, Self::Error> {
            let to = to.to_string();
            let subject = subject.to_string();
            let body = body.to_string();
            Box::pin(async move {
                if self.fail {
                    return Err(BoxedError(Box::new(std::io::Error::other(
                        "mail gateway down",
                    ))));
                }
                self.emails.lock().unwrap().push((to, subject, body));
                Ok(NotificationResult {
                    id: "email-1".to_string(),
                    status: "accepted".to_string(),
                })
            })
        }

        fn send_sms(&self, to: &str, body: &str) -> BoxFuture<'_, NotificationResult, Self::Error> {
            let to = to.to_string();
            let body = body.to_string();
            Box::pin(async move {
                if self.fail {
                    return Err(BoxedError(Box::new(std::io::Error::other(
                        "sms gateway down",
                    ))));
                }
                self.sms.lock().unwrap().push((to, body));
                Ok(NotificationResult {
                    id: "sms-1".to_string(),
                    status: "queued".to_string(),
                })
            })
        }
    }

    // --- Availability handler ---

    #[tokio::test]
    async fn closed_day_answers_empty_without_touching_the_calendar() {
        let mock = Arc::new(MockCalendarService::new());
        let state = test_state(mock.clone(), None);

        let response = get_availability_handler(
            State(state),
            availability_query("2030-01-06", None), // Sunday
        )
        .await
        .unwrap();

        assert!(response.0.slots.is_empty());
        assert_eq!(mock.busy_query_count(), 0);
    }

    #[tokio::test]
    async fn past_date_answers_empty_without_touching_the_calendar() {
        let mock = Arc::new(MockCalendarService::new());
        let state = test_state(mock.clone(), None);

        let response = get_availability_handler(
            State(state),
            availability_query("2020-01-06", None), // a Monday, long gone
        )
        .await
        .unwrap();

        assert!(response.0.slots.is_empty());
        assert_eq!(mock.busy_query_count(), 0);
    }

    #[tokio::test]
    async fn free_monday_lists_every_candidate() {
        let mock = Arc::new(MockCalendarService::new());
        let state = test_state(mock.clone(), None);

        let response = get_availability_handler(
            State(state),
            availability_query("2030-01-07", Some("1-on-1")),
        )
        .await
        .unwrap();

        assert_eq!(
            response.0.slots,
            vec!["15:00", "15:30", "16:00", "16:30", "17:00", "17:30", "18:00", "18:30", "19:00"]
        );
        assert_eq!(mock.busy_query_count(), 1);
    }

    #[tokio::test]
    async fn busy_interval_removes_overlapping_slots() {
        let mock = Arc::new(MockCalendarService::new());
        mock.seed_busy(
            local_utc(2030, 1, 7, 17, 0),
            local_utc(2030, 1, 7, 18, 0),
        );
        let state = test_state(mock, None);

        let response =
            get_availability_handler(State(state), availability_query("2030-01-07", None))
                .await
                .unwrap();

        assert_eq!(
            response.0.slots,
            vec!["15:00", "15:30", "16:00", "18:00", "18:30", "19:00"]
        );
    }

    #[tokio::test]
    async fn malformed_inputs_are_client_errors() {
        let mock = Arc::new(MockCalendarService::new());
        let state = test_state(mock.clone(), None);

        let (status, _) =
            get_availability_handler(State(state.clone()), availability_query("01/07/2030", None))
                .await
                .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, message) = get_availability_handler(
            State(state),
            availability_query("2030-01-07", Some("mega-group")),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message.contains("Invalid session type"));

        assert_eq!(mock.busy_query_count(), 0);
    }

    #[tokio::test]
    async fn upstream_outage_is_reported_not_masked_as_empty() {
        let mock = Arc::new(MockCalendarService::new());
        mock.set_unavailable(true);
        let state = test_state(mock, None);

        let (status, message) =
            get_availability_handler(State(state), availability_query("2030-01-07", None))
                .await
                .unwrap_err();

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(message, "Failed to fetch availability.");
    }

    // --- Booking handler ---

    #[tokio::test]
    async fn free_slot_commits_one_calendar_write() {
        let mock = Arc::new(MockCalendarService::new());
        let state = test_state(mock.clone(), None);

        let response = book_slot_handler(
            State(state),
            Json(booking_request("2030-01-07", "16:00", "1-on-1")),
        )
        .await
        .unwrap();

        assert!(response.0.success);
        assert_eq!(response.0.booking.session_type, "1-on-1 Training");
        assert_eq!(response.0.booking.date, "January 7, 2030");
        assert_eq!(response.0.booking.time, "4:00 PM");
        assert_eq!(response.0.booking.duration, "1 hour");

        let created = mock.created_events();
        assert_eq!(created.len(), 1);
        assert_eq!(
            created[0].summary,
            "Fantasma Training - 1-on-1 Training - Jamie Ortega"
        );
        // 16:00 in January Eastern time is 21:00 UTC.
        let start = DateTime::parse_from_rfc3339(&created[0].start_time)
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(start, Utc.with_ymd_and_hms(2030, 1, 7, 21, 0, 0).unwrap());
        assert_eq!(created[0].color_id.as_deref(), Some("6"));
    }

    #[tokio::test]
    async fn conflict_found_by_fresh_fetch_prevents_the_write() {
        let mock = Arc::new(MockCalendarService::new());
        // The slot was free when the calculator advertised it, but a
        // competing booking landed before this commit's fresh fetch.
        mock.seed_busy(
            local_utc(2030, 1, 7, 16, 0),
            local_utc(2030, 1, 7, 17, 0),
        );
        let state = test_state(mock.clone(), None);

        let (status, message) = book_slot_handler(
            State(state),
            Json(booking_request("2030-01-07", "16:00", "1-on-1")),
        )
        .await
        .unwrap_err();

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(message, "This time slot is no longer available.");
        assert!(mock.created_events().is_empty());
    }

    #[tokio::test]
    async fn busy_interval_touching_the_slot_does_not_conflict() {
        let mock = Arc::new(MockCalendarService::new());
        mock.seed_busy(
            local_utc(2030, 1, 7, 15, 0),
            local_utc(2030, 1, 7, 16, 0),
        );
        let state = test_state(mock.clone(), None);

        let response = book_slot_handler(
            State(state),
            Json(booking_request("2030-01-07", "16:00", "1-on-1")),
        )
        .await
        .unwrap();

        assert!(response.0.success);
        assert_eq!(mock.created_events().len(), 1);
    }

    #[tokio::test]
    async fn out_of_hours_requests_make_no_external_calls() {
        let mock = Arc::new(MockCalendarService::new());
        let state = test_state(mock.clone(), None);

        // 19:30 + 60 min would run past the 20:00 close.
        let (status, message) = book_slot_handler(
            State(state.clone()),
            Json(booking_request("2030-01-07", "19:30", "1-on-1")),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Time is outside available hours.");

        // Off the 30-minute grid.
        let (status, _) = book_slot_handler(
            State(state.clone()),
            Json(booking_request("2030-01-07", "15:15", "1-on-1")),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Closed day.
        let (status, message) = book_slot_handler(
            State(state),
            Json(booking_request("2030-01-06", "16:00", "1-on-1")),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "No availability on this day.");

        assert_eq!(mock.busy_query_count(), 0);
        assert!(mock.created_events().is_empty());
    }

    #[tokio::test]
    async fn missing_contact_fields_are_rejected_before_validation() {
        let mock = Arc::new(MockCalendarService::new());
        let state = test_state(mock.clone(), None);

        let mut request = booking_request("2030-01-07", "16:00", "1-on-1");
        request.phone = Some("   ".to_string());

        let (status, message) = book_slot_handler(State(state), Json(request))
            .await
            .unwrap_err();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "All fields are required.");
        assert_eq!(mock.busy_query_count(), 0);
    }

    #[tokio::test]
    async fn unknown_session_type_is_rejected() {
        let mock = Arc::new(MockCalendarService::new());
        let state = test_state(mock, None);

        let (status, message) = book_slot_handler(
            State(state),
            Json(booking_request("2030-01-07", "16:00", "2-on-2")),
        )
        .await
        .unwrap_err();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Invalid session type.");
    }

    #[tokio::test]
    async fn failed_write_is_an_upstream_error() {
        let mock = Arc::new(MockCalendarService::new());
        mock.set_fail_create(true);
        let state = test_state(mock.clone(), None);

        let (status, message) = book_slot_handler(
            State(state),
            Json(booking_request("2030-01-07", "16:00", "1-on-1")),
        )
        .await
        .unwrap_err();

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(message, "Failed to create booking.");
        // The fresh fetch ran; only the write failed.
        assert_eq!(mock.busy_query_count(), 1);
        assert!(mock.created_events().is_empty());
    }

    // --- Notification behavior ---

    #[tokio::test]
    async fn successful_booking_sends_sms_and_email_alerts() {
        let mock = Arc::new(MockCalendarService::new());
        let notifier = Arc::new(RecordingNotifier::new(false));
        let state = test_state(
            mock,
            Some(notifier.clone() as Arc<dyn NotificationService<Error = BoxedError>>),
        );

        let response = book_slot_handler(
            State(state),
            Json(booking_request("2030-01-07", "16:00", "small-group")),
        )
        .await
        .unwrap();
        assert!(response.0.success);

        let sms = notifier.sms.lock().unwrap();
        assert_eq!(sms.len(), 1);
        assert_eq!(sms[0].0, "+15550002222");
        assert_eq!(
            sms[0].1,
            "New Booking: Small Group Training - Jamie Ortega - January 7, 2030 at 4:00 PM"
        );

        let emails = notifier.emails.lock().unwrap();
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].0, "owner@example.com");
        assert_eq!(
            emails[0].1,
            "Fantasma Booking: Jamie Ortega - January 7, 2030 at 4:00 PM"
        );
        assert!(emails[0].2.contains("Session: Small Group Training"));
        assert!(emails[0].2.contains("Duration: 1.5 hours"));
    }

    #[tokio::test]
    async fn notification_failure_never_fails_the_booking() {
        let mock = Arc::new(MockCalendarService::new());
        let notifier = Arc::new(RecordingNotifier::new(true));
        let state = test_state(
            mock.clone(),
            Some(notifier as Arc<dyn NotificationService<Error = BoxedError>>),
        );

        let response = book_slot_handler(
            State(state),
            Json(booking_request("2030-01-07", "16:00", "1-on-1")),
        )
        .await
        .unwrap();

        assert!(response.0.success);
        assert_eq!(mock.created_events().len(), 1);
    }
}
