mod error;
pub mod films;
pub mod models;
pub mod password;
mod server;
pub mod services;
pub mod state;
pub mod users;
pub(crate) mod utils;
pub mod validation;

pub use error::ApiError;
pub use server::{open_store, router, run};
