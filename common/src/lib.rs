//! Common types and utilities for the Trion backend
//!
//! This library contains shared types, utilities, and abstractions used across
//! the account service and the API gateway. It provides a unified approach to
//! error handling, database access, time, and the user account model.

pub mod clock;
pub mod db;
pub mod error;
pub mod model;

/// Re-export important types
pub use error::{Error, Result, ErrorExt};
pub use clock::{Clock, ManualClock, SystemClock};

// Re-export utoipa for use in model ToSchema derives
#[cfg(feature = "utoipa")]
pub use utoipa;
