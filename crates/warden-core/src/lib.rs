//! Duty lifecycle core for warden
//!
//! This crate is the heart of warden, containing:
//! - The `Duty` entity (one shift, three fixed sub-task windows)
//! - The `DutyManager` coordinator (Empty -> Active -> Empty, one slot
//!   system-wide)
//! - Core events emitted toward a boundary layer

mod duty;
mod events;
mod manager;

pub use duty::*;
pub use events::*;
pub use manager::*;
