//! Message counter repository.

pub mod models;
pub mod queries;

pub use models::UserStat;
pub use queries::StatsRepository;
