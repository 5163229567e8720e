//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of a cache.
//!
//! # Tasks
//! - Reclamation: removes stale cache entries at the configured sweep interval

mod reaper;

pub(crate) use reaper::{spawn_reaper_task, ReaperHandle};
