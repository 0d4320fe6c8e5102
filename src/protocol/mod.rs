//! Wire types for the licensing service.

pub mod models;
