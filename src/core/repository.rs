use crate::domain::error::StudentsResult;
use crate::domain::student::{NewStudent, Student, StudentId};
use async_trait::async_trait;

/// Result of a statement that addresses a single row by id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    /// Exactly one row matched and was changed
    Applied,
    /// No row has the requested id
    NotFound,
}

impl RowOutcome {
    /// Map a `rows_affected` count onto an outcome
    pub fn from_rows_affected(rows: u64) -> Self {
        if rows == 0 {
            Self::NotFound
        } else {
            Self::Applied
        }
    }
}

/// Storage seam for the `students` table.
///
/// Each method issues exactly one statement.
#[async_trait]
pub trait StudentRepository: Send {
    /// All rows ordered by `student_id` ascending
    async fn list(&mut self) -> StudentsResult<Vec<Student>>;

    /// Insert a row and return it with its database-assigned id
    async fn insert(&mut self, student: &NewStudent) -> StudentsResult<Student>;

    /// Set the email of the row with `id`
    async fn update_email(&mut self, id: StudentId, email: &str) -> StudentsResult<RowOutcome>;

    /// Remove the row with `id`
    async fn delete(&mut self, id: StudentId) -> StudentsResult<RowOutcome>;
}
