//! Storefront cart service: authorization-scoped cart CRUD and transactional
//! checkout over PostgreSQL, plus the client wrapper consumed by the UI.

pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod state;
pub mod web;
