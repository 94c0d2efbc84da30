//! Students Library
//!
//! Create, read, update and delete rows of a PostgreSQL `students` table,
//! one parameterized statement per invocation.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;

pub use crate::core::{Report, RowOutcome, StudentOperation, StudentRepository};
pub use domain::config::{ConnectionSettings, StudentsConfig};
pub use domain::error::{StudentsError, StudentsResult};
pub use domain::student::{NewStudent, Student, StudentId};
pub use infrastructure::postgres::PgStudentRepository;
