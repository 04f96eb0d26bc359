pub mod chart;
pub mod freshness;
pub mod indicators;
pub mod market;

pub use chart::*;
pub use freshness::*;
pub use indicators::*;
pub use market::*;
