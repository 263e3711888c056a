//! Data models for condominium-management entities.
//!
//! This module contains the data structures returned by the REST API:
//!
//! - `Statistics`: dashboard counters, scoped or cross-condominium
//! - `Report`, `ReportStatus`: resident-filed occurrences
//! - `Delivery`: front-desk package queue
//! - `Reservation`: shared-space bookings
//! - `User`, `UserRole`: resident and staff roster
//! - `Announcement`: administration notices

pub mod announcement;
pub mod delivery;
pub mod person;
pub mod report;
pub mod reservation;
pub mod statistics;

pub use announcement::Announcement;
pub use delivery::Delivery;
pub use person::{User, UserRole};
pub use report::{Report, ReportStatus};
pub use reservation::Reservation;
pub use statistics::Statistics;
