//! Library surface of the floodwatch backend.
//!
//! The binary (`main.rs`) only wires the pieces together; everything with
//! behavior lives here so integration tests can build the router against
//! their own store.

pub mod config;
pub mod error;
pub mod models;
pub mod repo;
pub mod routes;
pub mod schema;
pub mod seed;

pub use config::Config;
pub use error::ApiError;
