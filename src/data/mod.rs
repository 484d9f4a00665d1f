//! Data layer module
//!
//! Handles all data persistence:
//! - Users (identity store)
//! - Posts (post store)
//! - Sessions

mod database;
mod models;

pub use database::Database;
pub use models::*;

#[cfg(test)]
mod database_test;
