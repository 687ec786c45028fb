//! Periodic maintenance tasks.
//!
//! Every submodule exposes one long-running async function meant for
//! `tokio::spawn`, and each loop watches a [`CancellationToken`] so the
//! server can shut it down cleanly.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod proposal_expiry;
pub mod retention;
pub mod trends_refresh;
