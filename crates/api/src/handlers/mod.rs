//! HTTP handler modules, one per resource.

pub mod advertisers;
pub mod auth;
pub mod contents;
pub mod jobs;
pub mod notifications;
pub mod proposals;
pub mod public_proposals;
pub mod templates;
pub mod topics;
pub mod trends;
