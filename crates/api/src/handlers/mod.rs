//! HTTP handlers.

pub mod analysis;
