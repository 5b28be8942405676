//! REST API client module for the threat-monitoring backend.
//!
//! This module provides the `ApiClient` for communicating with the
//! monitoring API to fetch identity, scan, threat, and source data.
//!
//! The API uses JWT bearer token authentication obtained through
//! the `/users/login` credential exchange.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
