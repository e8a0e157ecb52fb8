use std::error::Error;

use slotbook_core::errors::{BookingError, BookingResult};

#[test]
fn test_booking_error_display() {
    let not_found = BookingError::NotFound("Booking not found".to_string());
    let validation = BookingError::Validation("Invalid input".to_string());
    let slot_taken = BookingError::SlotTaken("2026-09-07 10:00".to_string());
    let database = BookingError::Database(eyre::eyre!("Database connection failed"));
    let internal = BookingError::Internal(Box::new(std::io::Error::new(
        std::io::ErrorKind::Other,
        "Internal error",
    )));

    assert_eq!(
        not_found.to_string(),
        "Resource not found: Booking not found"
    );
    assert_eq!(validation.to_string(), "Validation error: Invalid input");
    assert_eq!(slot_taken.to_string(), "Slot taken: 2026-09-07 10:00");
    assert!(database.to_string().contains("Database error:"));
    assert!(internal.to_string().contains("Internal server error:"));
}

#[test]
fn test_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::Other, "IO error");
    let booking_error = BookingError::Internal(Box::new(io_error));

    assert!(booking_error.source().is_some());
}

#[test]
fn test_booking_result() {
    let result: BookingResult<i32> = Ok(42);
    assert_eq!(result.unwrap(), 42);

    let result: BookingResult<i32> = Err(BookingError::NotFound("Not found".to_string()));
    assert!(result.is_err());
}

#[test]
fn test_from_eyre_report() {
    let report = eyre::eyre!("connection reset");
    let booking_error: BookingError = report.into();

    assert!(matches!(booking_error, BookingError::Database(_)));
}
