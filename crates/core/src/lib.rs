//! Domain types and pure logic for the finsight analysis service.
//!
//! No I/O lives here: this crate defines the error taxonomy, shared type
//! aliases, and the document/query rules that the api and worker crates
//! apply.

pub mod document;
pub mod error;
pub mod types;
