// PostgreSQL module - Connection provider and repository for the students table
use crate::core::repository::{RowOutcome, StudentRepository};
use crate::domain::config::ConnectionSettings;
use crate::domain::error::{StudentsError, StudentsResult};
use crate::domain::student::{NewStudent, Student, StudentId};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use tracing::{debug, info};

const APPLICATION_NAME: &str = "students";

const SELECT_ALL: &str = "SELECT student_id, first_name, last_name, email, enrollment_date \
     FROM students ORDER BY student_id";

const INSERT: &str = "INSERT INTO students (first_name, last_name, email, enrollment_date) \
     VALUES ($1, $2, $3, $4) \
     RETURNING student_id, first_name, last_name, email, enrollment_date";

const UPDATE_EMAIL: &str = "UPDATE students SET email = $1 WHERE student_id = $2";

const DELETE: &str = "DELETE FROM students WHERE student_id = $1";

/// Build driver options from resolved settings
pub fn connect_options(settings: &ConnectionSettings) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .database(&settings.dbname)
        .username(&settings.user)
        .password(&settings.password)
        .application_name(APPLICATION_NAME)
}

/// Student repository over a single PostgreSQL connection
pub struct PgStudentRepository {
    conn: PgConnection,
}

impl PgStudentRepository {
    /// Open the connection, bounded by the configured connect timeout
    pub async fn connect(settings: &ConnectionSettings) -> StudentsResult<Self> {
        debug!(
            host = %settings.host,
            port = settings.port,
            database = %settings.dbname,
            user = %settings.user,
            "connecting to PostgreSQL"
        );

        let options = connect_options(settings);
        let conn = tokio::time::timeout(settings.connect_timeout, PgConnection::connect_with(&options))
            .await
            .map_err(|_| StudentsError::ConnectTimeout {
                seconds: settings.connect_timeout.as_secs(),
            })??;

        info!(host = %settings.host, database = %settings.dbname, "connected");
        Ok(Self { conn })
    }

    /// Close the connection gracefully
    pub async fn close(self) -> StudentsResult<()> {
        self.conn.close().await?;
        debug!("connection closed");
        Ok(())
    }
}

#[async_trait]
impl StudentRepository for PgStudentRepository {
    async fn list(&mut self) -> StudentsResult<Vec<Student>> {
        let students = sqlx::query_as::<_, Student>(SELECT_ALL)
            .fetch_all(&mut self.conn)
            .await?;
        Ok(students)
    }

    async fn insert(&mut self, student: &NewStudent) -> StudentsResult<Student> {
        let created = sqlx::query_as::<_, Student>(INSERT)
            .bind(&student.first_name)
            .bind(&student.last_name)
            .bind(&student.email)
            .bind(student.enrollment_date)
            .fetch_one(&mut self.conn)
            .await?;
        Ok(created)
    }

    async fn update_email(&mut self, id: StudentId, email: &str) -> StudentsResult<RowOutcome> {
        let result = sqlx::query(UPDATE_EMAIL)
            .bind(email)
            .bind(id)
            .execute(&mut self.conn)
            .await?;
        debug!(student_id = id, rows = result.rows_affected(), "email update executed");
        Ok(RowOutcome::from_rows_affected(result.rows_affected()))
    }

    async fn delete(&mut self, id: StudentId) -> StudentsResult<RowOutcome> {
        let result = sqlx::query(DELETE).bind(id).execute(&mut self.conn).await?;
        debug!(student_id = id, rows = result.rows_affected(), "delete executed");
        Ok(RowOutcome::from_rows_affected(result.rows_affected()))
    }
}
