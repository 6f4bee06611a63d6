//! Input integration: turns sampled time, cursor and key state into camera motion.
//!
//! # Invariants
//! - The controller reaches the platform only through [`InputSource`] and [`Clock`].
//! - Orientation stays unit length and its vertical component never passes the pitch limit.

mod clock;
mod controller;
mod key;
mod source;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{ControlStep, ControllerConfig, MovementController};
pub use key::{CursorMode, Key, KeyBindings};
pub use source::{InputSource, PolledInput};
