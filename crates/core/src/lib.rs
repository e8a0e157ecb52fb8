//! # Slotbook Core
//!
//! Domain types and the scheduling engine for the Slotbook booking service:
//! resolving a day's effective working window, deriving occupied time spans,
//! generating offerable start times and detecting booking conflicts.
//!
//! Everything in this crate is pure: configuration, clock readings and the
//! set of existing bookings are passed in explicitly, so the same logic is
//! exercised identically by the HTTP handlers, the storage layer and tests.

pub mod errors;
pub mod models;
pub mod scheduling;
