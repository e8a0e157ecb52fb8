pub mod availability;
pub mod booking;
pub mod schedule;
pub mod settings;
