use crate::domain::error::{StudentsError, StudentsResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Primary key of the `students` table (`serial`, i.e. `int4`)
pub type StudentId = i32;

/// Accepted textual form of `enrollment_date`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One row of the `students` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Student {
    pub student_id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub enrollment_date: NaiveDate,
}

/// Validated payload for inserting a student; the database assigns the id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub enrollment_date: NaiveDate,
}

impl NewStudent {
    /// Build a new student, rejecting empty text fields
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        enrollment_date: NaiveDate,
    ) -> StudentsResult<Self> {
        Ok(Self {
            first_name: required("first_name", first_name.into())?,
            last_name: required("last_name", last_name.into())?,
            email: required("email", email.into())?,
            enrollment_date,
        })
    }
}

/// Reject a text value that is empty once surrounding whitespace is removed.
/// The value itself is kept as given.
pub fn required(field: &str, value: String) -> StudentsResult<String> {
    if value.trim().is_empty() {
        return Err(StudentsError::InvalidArguments(format!("{field} must not be empty")));
    }
    Ok(value)
}

/// Parse an enrollment date in `YYYY-MM-DD` form.
///
/// Used directly as a clap value parser, hence the `String` error.
pub fn parse_enrollment_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|e| format!("enrollment_date must be YYYY-MM-DD ({e})"))
}
