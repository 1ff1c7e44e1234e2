// File: crates/fantasma_gcal/src/doc.rs

#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::logic::{
    AvailabilityResponse, BookingConfirmation, BookingRequest, BookingResponse, SessionKind,
};

#[utoipa::path(
    get,
    path = "/availability",
    params(
        ("date" = String, Query, description = "Date in YYYY-MM-DD format", example = "2030-01-07", format = "date"),
        ("sessionType" = Option<String>, Query, description = "Session type, \"1-on-1\" or \"small-group\"", example = "1-on-1")
    ),
    responses(
        (status = 200, description = "Open start times for the date", body = AvailabilityResponse,
         example = json!({
             "date": "2030-01-07",
             "sessionType": "1-on-1",
             "slots": ["15:00", "15:30", "16:00"]
         })
        ),
        (status = 400, description = "Invalid date or session type", body = String),
        (status = 502, description = "Failed to fetch availability", body = String)
    )
)]
fn doc_get_availability_handler() {}

#[utoipa::path(
    post,
    path = "/book",
    request_body(content = BookingRequest, example = json!({
        "name": "Jamie Ortega",
        "email": "jamie@example.com",
        "phone": "555-010-2030",
        "sessionType": "1-on-1",
        "date": "2030-01-07",
        "time": "16:00"
    })),
    responses(
        (status = 200, description = "Booking confirmed", body = BookingResponse,
         example = json!({
             "success": true,
             "booking": {
                 "sessionType": "1-on-1 Training",
                 "date": "January 7, 2030",
                 "time": "4:00 PM",
                 "duration": "1 hour"
             }
         })
        ),
        (status = 400, description = "Missing/invalid fields or time outside available hours", body = String),
        (status = 409, description = "Slot no longer available",
         example = json!("This time slot is no longer available.")
        ),
        (status = 502, description = "Calendar could not be reached", body = String)
    )
)]
fn doc_book_slot_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(doc_get_availability_handler, doc_book_slot_handler),
    components(
        schemas(
            SessionKind,
            AvailabilityResponse,
            BookingRequest,
            BookingConfirmation,
            BookingResponse
        )
    ),
    tags(
        (name = "Booking", description = "Fantasma training session booking API")
    ),
    servers(
        (url = "/api", description = "Main API prefix")
    )
)]
pub struct GcalApiDoc;
