use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{BookingError, BookingResult};

/// Reminder offsets scheduled for each admitted booking: kind label and
/// minutes before the appointment start.
pub const REMINDER_OFFSETS: [(&str, i64); 2] = [("2h", 120), ("30m", 30)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderStatus {
    Pending,
    Sent,
    Canceled,
    Failed,
}

impl ReminderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Canceled => "canceled",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> BookingResult<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "sent" => Ok(Self::Sent),
            "canceled" => Ok(Self::Canceled),
            "failed" => Ok(Self::Failed),
            other => Err(BookingError::Validation(format!(
                "Unknown reminder status '{other}'"
            ))),
        }
    }
}

/// A due-queue entry tied to a booking. Delivery is handled by an external
/// poller; this core only creates entries and invalidates them on
/// cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub remind_at: DateTime<Utc>,
    pub kind: String,
    pub status: ReminderStatus,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}
