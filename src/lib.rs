//! Library exports for the website tracker
//!
//! The server side (record file, handlers, routes) and the client side
//! (HTTP client, data cache, local access counts) live in the same crate.

pub mod cache;
pub mod client;
pub mod config;
pub mod count_store;
pub mod credentials;
pub mod database;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod model;
pub mod route;
pub mod validation;
pub mod verifier;
