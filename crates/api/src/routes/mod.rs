//! HTTP route handlers

pub mod admin;
pub mod predictions;
pub mod schema;
