// Domain module - Records, configuration and errors
pub mod config;
pub mod error;
pub mod student;
