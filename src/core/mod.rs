// Core module - Student operations and the storage seam they run against
pub mod operations;
pub mod repository;

pub use operations::{Report, StudentOperation};
pub use repository::{RowOutcome, StudentRepository};
