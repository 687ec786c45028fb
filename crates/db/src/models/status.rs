//! Status enums backing the SMALLINT lookup tables.
//!
//! Discriminants follow the 1-based seed order of the matching
//! `*_statuses` table, so a cast is all it takes to bind one.

/// Raw status id as stored in the database (SMALLSERIAL).
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// The id to bind in queries.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Map a raw status ID back onto the enum.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Advertiser profile sync state.
    SyncStatus {
        /// Never synced (or manually reset).
        Idle = 1,
        Syncing = 2,
        Completed = 3,
        Failed = 4,
    }
}

define_status_enum! {
    /// Content draft lifecycle.
    ContentStatus {
        Draft = 1,
        Scheduled = 2,
        Approved = 3,
        Published = 4,
        Failed = 5,
    }
}

impl ContentStatus {
    /// Canonical lowercase name used in the status-transition API.
    pub fn as_str(self) -> &'static str {
        match self {
            ContentStatus::Draft => "draft",
            ContentStatus::Scheduled => "scheduled",
            ContentStatus::Approved => "approved",
            ContentStatus::Published => "published",
            ContentStatus::Failed => "failed",
        }
    }

    /// Parse a status name from a transition request body.
    pub fn parse_name(name: &str) -> Option<Self> {
        match name {
            "draft" => Some(ContentStatus::Draft),
            "scheduled" => Some(ContentStatus::Scheduled),
            "approved" => Some(ContentStatus::Approved),
            "published" => Some(ContentStatus::Published),
            "failed" => Some(ContentStatus::Failed),
            _ => None,
        }
    }

    /// Whether a manual transition from `self` to `target` is allowed.
    ///
    /// `published` is terminal. `failed` is written by the system on a
    /// publish error; the only way out is back to `draft` for a re-edit.
    pub fn can_transition_to(self, target: ContentStatus) -> bool {
        use ContentStatus::*;
        matches!(
            (self, target),
            (Draft, Scheduled)
                | (Draft, Approved)
                | (Scheduled, Draft)
                | (Scheduled, Approved)
                | (Scheduled, Published)
                | (Approved, Draft)
                | (Approved, Scheduled)
                | (Approved, Published)
                | (Failed, Draft)
        )
    }
}

define_status_enum! {
    /// Monthly planning topic lifecycle.
    TopicStatus {
        Draft = 1,
        /// Attached to a live proposal, awaiting the client's decision.
        Proposed = 2,
        Approved = 3,
        Rejected = 4,
    }
}

define_status_enum! {
    /// Shareable proposal link lifecycle.
    ProposalStatus {
        Pending = 1,
        Approved = 2,
        Rejected = 3,
        Expired = 4,
        Revoked = 5,
    }
}

impl TopicStatus {
    /// Lowercase name shown on the public proposal page.
    pub fn as_str(self) -> &'static str {
        match self {
            TopicStatus::Draft => "draft",
            TopicStatus::Proposed => "proposed",
            TopicStatus::Approved => "approved",
            TopicStatus::Rejected => "rejected",
        }
    }
}

impl ProposalStatus {
    /// Lowercase name shown on the public proposal page.
    pub fn as_str(self) -> &'static str {
        match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::Approved => "approved",
            ProposalStatus::Rejected => "rejected",
            ProposalStatus::Expired => "expired",
            ProposalStatus::Revoked => "revoked",
        }
    }
}

define_status_enum! {
    /// Job queue lifecycle.
    JobStatus {
        Pending = 1,
        Running = 2,
        Completed = 3,
        Failed = 4,
        Cancelled = 5,
    }
}
