//! HTTP handlers
//!
//! Handlers stay thin: they extract parameters, call into the services and
//! hand the result to [`crate::web::responses::handle_result`].

pub mod browse;
pub mod catalog;
pub mod health;
