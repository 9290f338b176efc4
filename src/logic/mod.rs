pub mod decision;
pub mod trigger;

pub use trigger::{TriggerService, TriggerSettings};
