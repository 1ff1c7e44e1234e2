// --- File: crates/services/fantasma_backend/src/service_factory.rs ---
//! Service factory implementation.
//!
//! Builds the calendar and notification services from runtime
//! configuration, erased behind the shared service traits so the routers
//! never see a concrete backend.

use fantasma_common::services::{
    BoxedCalendarService, BoxedError, BoxedNotificationService, CalendarService,
    NotificationService, ServiceFactory,
};
use fantasma_common::{is_gcal_enabled, is_notify_enabled};
use fantasma_config::AppConfig;
use fantasma_gcal::auth::create_calendar_hub;
use fantasma_gcal::service::GoogleCalendarService;
use fantasma_notify::TwilioNotificationService;
use std::sync::Arc;
use tracing::{error, info};

/// Service factory for the backend binary.
pub struct FantasmaServiceFactory {
    calendar_service: Option<Arc<dyn CalendarService<Error = BoxedError>>>,
    notification_service: Option<Arc<dyn NotificationService<Error = BoxedError>>>,
}

impl FantasmaServiceFactory {
    /// Create a new service factory from runtime configuration.
    pub async fn new(config: Arc<AppConfig>) -> Self {
        let mut factory = Self {
            calendar_service: None,
            notification_service: None,
        };

        if is_gcal_enabled(&config) {
            info!("Initializing Google Calendar service...");
            match create_calendar_hub(config.gcal.as_ref().unwrap()).await {
                Ok(hub) => {
                    let service = GoogleCalendarService::new(Arc::new(hub));
                    factory.calendar_service = Some(Arc::new(BoxedCalendarService(service)));
                    info!("Google Calendar service initialized.");
                }
                Err(e) => {
                    error!(
                        "Failed to initialize Google Calendar service: {}. Booking routes disabled.",
                        e
                    );
                }
            }
        } else {
            info!("GCal disabled via runtime config or missing gcal config section.");
        }

        if is_notify_enabled(&config) {
            let service = TwilioNotificationService::new(config.clone());
            factory.notification_service = Some(Arc::new(BoxedNotificationService(service)));
            info!("Notification service initialized.");
        } else {
            info!("Notifications disabled; bookings will commit without alerts.");
        }

        factory
    }
}

impl ServiceFactory for FantasmaServiceFactory {
    fn calendar_service(&self) -> Option<Arc<dyn CalendarService<Error = BoxedError>>> {
        self.calendar_service.clone()
    }

    fn notification_service(&self) -> Option<Arc<dyn NotificationService<Error = BoxedError>>> {
        self.notification_service.clone()
    }
}
