pub mod chart;
pub mod options;
pub mod payload;
pub mod signals;

pub use chart::*;
pub use options::*;
pub use payload::*;
pub use signals::*;
