//! Domain types and pure logic shared across the postpilot backend.
//!
//! Nothing in this crate touches the network or the database. The two
//! substantial pieces are [`merge`] (profile blob merging for advertiser
//! sync) and [`template`] (placeholder rendering for content generation);
//! the rest is shared vocabulary.

pub mod channels;
pub mod error;
pub mod merge;
pub mod roles;
pub mod template;
pub mod types;

pub use error::CoreError;
