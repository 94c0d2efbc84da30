use crate::core::repository::{RowOutcome, StudentRepository};
use crate::domain::error::StudentsResult;
use crate::domain::student::{NewStudent, Student, StudentId};
use tracing::debug;

/// A single CRUD request against the `students` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentOperation {
    List,
    Add(NewStudent),
    UpdateEmail { student_id: StudentId, email: String },
    Delete { student_id: StudentId },
}

/// What an operation produced, ready to be rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Listed(Vec<Student>),
    Added(Student),
    EmailUpdated(StudentId),
    Deleted(StudentId),
    /// The addressed row does not exist; reported, not fatal
    NotFound(StudentId),
}

impl StudentOperation {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Add(_) => "add",
            Self::UpdateEmail { .. } => "update-email",
            Self::Delete { .. } => "delete",
        }
    }

    /// Run the operation against `repo`
    pub async fn execute<R>(self, repo: &mut R) -> StudentsResult<Report>
    where
        R: StudentRepository + ?Sized,
    {
        debug!(operation = self.name(), "executing operation");

        let report = match self {
            Self::List => {
                let students = repo.list().await?;
                debug!(count = students.len(), "listed students");
                Report::Listed(students)
            }
            Self::Add(new_student) => {
                let student = repo.insert(&new_student).await?;
                debug!(student_id = student.student_id, "inserted student");
                Report::Added(student)
            }
            Self::UpdateEmail { student_id, email } => {
                match repo.update_email(student_id, &email).await? {
                    RowOutcome::Applied => Report::EmailUpdated(student_id),
                    RowOutcome::NotFound => Report::NotFound(student_id),
                }
            }
            Self::Delete { student_id } => match repo.delete(student_id).await? {
                RowOutcome::Applied => Report::Deleted(student_id),
                RowOutcome::NotFound => Report::NotFound(student_id),
            },
        };

        Ok(report)
    }
}
