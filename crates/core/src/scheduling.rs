//! The scheduling engine: calendar resolution, occupancy derivation, slot
//! candidate generation and conflict detection. All functions are pure over
//! explicitly passed configuration and booking sets.

pub mod admission;
pub mod calendar;
pub mod conflict;
pub mod occupancy;
pub mod slots;
pub mod time;
