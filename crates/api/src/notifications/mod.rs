//! In-app notification delivery.
//!
//! The [`NotificationRouter`] subscribes to the event bus and turns each
//! platform event into a notification row (and, when SMTP is configured,
//! an email) for the user the event concerns.

pub mod router;

pub use router::NotificationRouter;
