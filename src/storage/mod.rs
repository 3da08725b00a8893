mod assets;
mod counters;
pub mod db;
mod history;
pub mod models;
mod reports;
mod tables;

pub use db::{Database, DatabaseError, PurgeStats};
pub use tables::*;
