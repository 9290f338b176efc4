pub mod decision;
pub mod duration;

pub use decision::*;
pub use duration::*;
