mod account;
pub mod dto;
mod health;
pub mod response;
mod router;
mod stats;
pub mod validation;

pub use router::{AppState, create_router};
