//! Repeating physical alert while a call-like notification is shown.

mod action;
mod repeater;

pub use action::{AlertAction, Vibration};
pub use repeater::{CancelFlag, CancellableRepeater, RepeaterState};
