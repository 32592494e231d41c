//! Background Tasks Module
//!
//! Contains background tasks that run periodically next to a shared cache.
//!
//! # Tasks
//! - Weight trim: evicts victims until the cache is back under a weight budget

mod trim;

pub use trim::spawn_trim_task;
