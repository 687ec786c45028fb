//! Repository layer: one unit struct per table, static async methods.
//!
//! Repositories return `sqlx::Error` unmodified; mapping to domain errors
//! happens at the API boundary.

pub mod advertiser_repo;
pub mod content_repo;
pub mod event_repo;
pub mod job_repo;
pub mod notification_repo;
pub mod proposal_repo;
pub mod role_repo;
pub mod session_repo;
pub mod template_repo;
pub mod topic_repo;
pub mod trend_repo;
pub mod user_repo;

pub use advertiser_repo::AdvertiserRepo;
pub use content_repo::ContentRepo;
pub use event_repo::EventRepo;
pub use job_repo::JobRepo;
pub use notification_repo::NotificationRepo;
pub use proposal_repo::ProposalRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use template_repo::TemplateRepo;
pub use topic_repo::TopicRepo;
pub use trend_repo::TrendRepo;
pub use user_repo::UserRepo;
