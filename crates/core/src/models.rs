pub mod booking;
pub mod reminder;
pub mod schedule;
pub mod settings;
