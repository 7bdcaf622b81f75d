//! Data models for the Clientes roster application.
//!
//! These models match the frontend TypeScript interfaces exactly for seamless interoperability.

mod client;
mod datastore;

pub use client::*;
pub use datastore::*;
