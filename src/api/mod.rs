//! REST API client module for the attendance backend.
//!
//! This module provides the `ApiClient` for fetching attendance records
//! and archived dates, and for exchanging credentials for a session token
//! with the backend's identity endpoint.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
