//! Event type names. Must match the `event_types` seed rows.

pub const ADVERTISER_SYNCED: &str = "advertiser.synced";
pub const ADVERTISER_SYNC_FAILED: &str = "advertiser.sync_failed";
pub const CONTENT_BULK_GENERATED: &str = "content.bulk_generated";
pub const PROPOSAL_APPROVED: &str = "proposal.approved";
pub const PROPOSAL_REJECTED: &str = "proposal.rejected";
pub const PROPOSAL_EXPIRED: &str = "proposal.expired";
pub const TRENDS_REFRESHED: &str = "trends.refreshed";
