//! API handlers
//!
//! This module contains all the API endpoint handlers organized by resource.
//! Each handler follows a consistent pattern:
//! - Extract state and the JSON body using Axum extractors
//! - Call the matching account service method
//! - Map the result to the `{ ok, ... }` envelope

pub mod health;
pub mod request;
pub mod response;
pub mod rewards;
pub mod users;

// Re-export the response module for easy access
pub use response::{ErrorResponse, MessageResponse, SpinResponse, UserResponse};
