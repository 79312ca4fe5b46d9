mod models;
mod stats;

pub use models::*;
pub use stats::*;
