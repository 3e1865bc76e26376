//! Cart

pub mod models;
pub mod state;
pub mod status;
pub mod store;
