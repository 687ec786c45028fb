//! Row structs and request/response DTOs, one module per table.

pub mod advertiser;
pub mod content;
pub mod event;
pub mod job;
pub mod notification;
pub mod proposal;
pub mod role;
pub mod session;
pub mod status;
pub mod template;
pub mod topic;
pub mod trend;
pub mod user;
