pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod progress;
pub mod session;
pub mod state;
pub mod store;
pub mod utils;
pub mod view_model;

pub use error::{Error, Result};
