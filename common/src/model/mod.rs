//! Domain models for the Trion backend

pub mod user;
