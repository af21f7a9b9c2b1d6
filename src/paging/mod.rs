//! Incremental list pagination.

pub mod accumulator;
pub mod refresh;
pub mod trigger;

use std::time::Duration;

use crate::api::ResourceKind;

pub use accumulator::Accumulator;
pub use refresh::{MutationKind, NotificationKind, RefreshCoordinator, RefreshTarget};
pub use trigger::{ScrollTrigger, TriggerConfig, Viewport};

/// Why a page is being fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    /// Next page, to be appended.
    Append,
    /// Page one, replacing everything held (initial load or refresh).
    Refresh,
}

/// A page fetch to be run by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub kind: ResourceKind,
    pub page_index: u32,
    pub page_size: u32,
    /// Generation of the list when the request was issued.
    pub generation: u64,
    pub purpose: Purpose,
    /// Wait before sending.
    pub delay: Duration,
}
