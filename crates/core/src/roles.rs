//! Role name constants matching the `roles` seed data.

use crate::types::DbId;

/// Full platform access: user management, trend refresh, all tenants.
pub const ROLE_ADMIN: &str = "admin";

/// Standard account: manages its own advertisers and their content.
pub const ROLE_MARKETER: &str = "marketer";

/// Seed id of the admin role.
pub const ROLE_ADMIN_ID: DbId = 1;

/// Seed id of the marketer role.
pub const ROLE_MARKETER_ID: DbId = 2;
