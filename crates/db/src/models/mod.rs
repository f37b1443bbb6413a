//! Row types and DTOs for the finsight schema.

pub mod analysis;
pub mod owner;
pub mod status;
