//! REST API client module for the condominium backend.
//!
//! This module provides the `ApiClient` for fetching dashboard data:
//! statistics, reports, deliveries, reservations, users and announcements.
//!
//! The API uses JWT bearer token authentication; token issuance is handled
//! by the backend and supplied to the client, never stored here.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
