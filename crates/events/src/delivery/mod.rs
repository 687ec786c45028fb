//! Outbound delivery for notifications.
//!
//! Email is the only external channel; the notification router uses it
//! for events the owning marketer should hear about without the app open.

pub mod email;
