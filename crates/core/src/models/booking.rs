use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{BookingError, BookingResult};
use crate::models::settings::ShopSettings;
use crate::scheduling::occupancy::occupied_minutes;
use crate::scheduling::time::format_minutes;

/// Lifecycle of a booking.
///
/// Only `Pending` and `Approved` occupy calendar time. `Completed` is
/// historical: it no longer blocks new slots but still shows as booked in the
/// admin day view. The remaining states are terminal and inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Approved,
    Completed,
    Rejected,
    CancelledByClient,
    CancelledByAdmin,
}

impl BookingStatus {
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Rejected | Self::CancelledByClient | Self::CancelledByAdmin
        )
    }

    /// Legal transitions of the booking state machine. No transition leaves
    /// a terminal state.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved)
                | (Self::Pending, Self::Rejected)
                | (Self::Pending, Self::CancelledByClient)
                | (Self::Approved, Self::Completed)
                | (Self::Approved, Self::CancelledByClient)
                | (Self::Approved, Self::CancelledByAdmin)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::CancelledByClient => "cancelled_by_client",
            Self::CancelledByAdmin => "cancelled_by_admin",
        }
    }

    pub fn parse(s: &str) -> BookingResult<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "completed" => Ok(Self::Completed),
            "rejected" => Ok(Self::Rejected),
            "cancelled_by_client" => Ok(Self::CancelledByClient),
            "cancelled_by_admin" => Ok(Self::CancelledByAdmin),
            other => Err(BookingError::Validation(format!(
                "Unknown booking status '{other}'"
            ))),
        }
    }
}

/// How a booking's occupied span is determined: either a value stored at
/// admission time, or derived from the nominal duration on demand. Resolved
/// once at the data-access boundary so downstream logic never sees a null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "minutes", rename_all = "snake_case")]
pub enum Occupancy {
    Stored(u16),
    Derived,
}

impl Occupancy {
    pub fn from_stored(stored: Option<u16>) -> Self {
        match stored {
            Some(minutes) => Self::Stored(minutes),
            None => Self::Derived,
        }
    }

    pub fn resolve(self, duration_minutes: u16, settings: &ShopSettings) -> u16 {
        match self {
            Self::Stored(minutes) => minutes,
            Self::Derived => occupied_minutes(duration_minutes, settings),
        }
    }
}

/// Longest service duration accepted at the booking and availability
/// surfaces, in minutes. One calendar day.
pub const MAX_SERVICE_MINUTES: u16 = 24 * 60;

/// The reservable unit: one client, one date, one start time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub client_id: i64,
    pub date: NaiveDate,
    pub start_minute: u16,
    pub duration_minutes: u16,
    pub occupancy: Occupancy,
    pub service_code: Option<String>,
    pub service_name: String,
    pub price_text: String,
    pub client_name: String,
    pub phone: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// The half-open interval this booking actually reserves on the calendar.
    pub fn occupied_interval(&self, settings: &ShopSettings) -> (u16, u16) {
        let occupy = self.occupancy.resolve(self.duration_minutes, settings);
        (self.start_minute, self.start_minute.saturating_add(occupy))
    }
}

/// Admission request as submitted by the booking surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub client_id: i64,
    pub date: NaiveDate,
    pub start_time: String,
    pub duration_minutes: u16,
    pub service_code: Option<String>,
    pub service_name: String,
    pub price_text: String,
    pub client_name: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub date: NaiveDate,
    pub start_time: String,
    /// Nominal end of the service, as shown to clients. The occupied span may
    /// be longer for short services.
    pub end_time: String,
    pub duration_minutes: u16,
    pub service_name: String,
    pub price_text: String,
    pub client_name: String,
    pub status: BookingStatus,
}

impl From<&Booking> for BookingResponse {
    fn from(b: &Booking) -> Self {
        Self {
            id: b.id,
            date: b.date,
            start_time: format_minutes(b.start_minute),
            end_time: format_minutes(b.start_minute.saturating_add(b.duration_minutes)),
            duration_minutes: b.duration_minutes,
            service_name: b.service_name.clone(),
            price_text: b.price_text.clone(),
            client_name: b.client_name.clone(),
            status: b.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelBookingRequest {
    pub client_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreeSlotsResponse {
    pub date: NaiveDate,
    pub duration_minutes: u16,
    pub starts: Vec<String>,
}
