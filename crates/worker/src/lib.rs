//! Background Executor: claims queued analysis jobs from Postgres and
//! drives them through the running → completed/failed lifecycle.

pub mod config;
pub mod executor;
