//! Event bus and notification infrastructure.
//!
//! Building blocks for the platform-wide event system:
//!
//! - [`EventBus`] -- in-process publish/subscribe hub on top of a
//!   `tokio::sync::broadcast` channel.
//! - [`PlatformEvent`] -- the canonical domain event envelope.
//! - [`EventPersistence`] -- background service that writes each event
//!   durably into the `events` table.
//! - [`delivery`] -- email delivery used by the notification router.

pub mod bus;
pub mod delivery;
pub mod names;
pub mod persistence;

pub use bus::{EventBus, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery};
pub use persistence::EventPersistence;
