//! Background Tasks Module
//!
//! Optional tasks an owner can run alongside its caches.
//!
//! # Tasks
//! - TTL Sweep: Removes expired entries at a fixed interval

mod sweep;

pub use sweep::{spawn_sweep_task, Sweep};
