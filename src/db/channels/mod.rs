//! Channel repository for tracking enablement.
//!
//! Handles the per-channel enable flag and channels added to the
//! allow-list at runtime.

pub mod models;
pub mod queries;

pub use models::{ChannelState, EligibleChannel};
pub use queries::ChannelRepository;
