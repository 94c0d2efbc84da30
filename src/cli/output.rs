use crate::cli::args::OutputFormat;
use crate::core::operations::Report;
use crate::domain::config::ConnectionSettings;
use crate::domain::student::{Student, StudentId, DATE_FORMAT};
use std::io::{self, Write};
use std::path::Path;
use tabled::{Table, Tabled};

/// Output writer trait for different formats
pub trait OutputWriter {
    fn write_report(&self, report: &Report) -> Result<(), OutputError>;
    fn write_settings(&self, settings: &ConnectionSettings, source: Option<&Path>) -> Result<(), OutputError>;
    fn write_message(&self, message: &str) -> Result<(), OutputError>;
    fn write_error(&self, error: &str) -> Result<(), OutputError>;
}

/// Output formatting errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl From<OutputError> for crate::domain::error::StudentsError {
    fn from(err: OutputError) -> Self {
        Self::Output(err.to_string())
    }
}

/// Console output writer
pub struct ConsoleWriter {
    format: OutputFormat,
}

impl ConsoleWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    fn print(&self, content: &str) -> Result<(), OutputError> {
        if content.is_empty() {
            return Ok(());
        }
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", content)?;
        stdout.flush()?;
        Ok(())
    }
}

impl OutputWriter for ConsoleWriter {
    fn write_report(&self, report: &Report) -> Result<(), OutputError> {
        self.print(&render_report(self.format, report)?)
    }

    fn write_settings(&self, settings: &ConnectionSettings, source: Option<&Path>) -> Result<(), OutputError> {
        self.print(&render_settings(self.format, settings, source)?)
    }

    fn write_message(&self, message: &str) -> Result<(), OutputError> {
        self.print(&render_message(self.format, message, "info")?)
    }

    fn write_error(&self, error: &str) -> Result<(), OutputError> {
        let content = match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "error": error,
                    "level": "error"
                });
                serde_json::to_string_pretty(&output)?
            }
            _ => format!("Error: {}", error),
        };
        let mut stderr = io::stderr().lock();
        writeln!(stderr, "{}", content)?;
        Ok(())
    }
}

/// Render an operation report in `format`
pub fn render_report(format: OutputFormat, report: &Report) -> Result<String, OutputError> {
    match report {
        Report::Listed(students) => render_students(format, students),
        Report::Added(student) => match format {
            OutputFormat::Text => Ok(format!("Added student with ID {}", student.student_id)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(student)?),
            _ => render_students(format, std::slice::from_ref(student)),
        },
        Report::EmailUpdated(id) => render_outcome(format, *id, "updated", &format!("Updated email for student {}", id)),
        Report::Deleted(id) => render_outcome(format, *id, "deleted", &format!("Deleted student {}", id)),
        Report::NotFound(id) => render_outcome(format, *id, "not_found", &not_found_message(*id)),
    }
}

pub fn not_found_message(id: StudentId) -> String {
    format!("No student found with id {}", id)
}

/// Render rows; an empty slice renders to an empty string except in JSON
/// (`[]`) and CSV (header only).
pub fn render_students(format: OutputFormat, students: &[Student]) -> Result<String, OutputError> {
    let content = match format {
        OutputFormat::Text => students
            .iter()
            .map(student_line)
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Json => serde_json::to_string_pretty(students)?,
        OutputFormat::Table => {
            if students.is_empty() {
                String::new()
            } else {
                let rows: Vec<StudentTableRow> = students.iter().map(StudentTableRow::from).collect();
                Table::new(rows).to_string()
            }
        }
        OutputFormat::Csv => {
            let mut csv = String::from(CSV_HEADER);
            for student in students {
                csv.push('\n');
                csv.push_str(&csv_row(student));
            }
            csv
        }
    };
    Ok(content)
}

/// `<id> <first_name> <last_name> <email> <YYYY-MM-DD>`
pub fn student_line(student: &Student) -> String {
    format!(
        "{} {} {} {} {}",
        student.student_id,
        student.first_name,
        student.last_name,
        student.email,
        student.enrollment_date.format(DATE_FORMAT)
    )
}

const CSV_HEADER: &str = "student_id,first_name,last_name,email,enrollment_date";

fn csv_row(student: &Student) -> String {
    format!(
        "{},{},{},{},{}",
        student.student_id,
        csv_field(&student.first_name),
        csv_field(&student.last_name),
        csv_field(&student.email),
        student.enrollment_date.format(DATE_FORMAT)
    )
}

/// Quote a CSV field when it contains a separator, quote or line break
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn render_outcome(format: OutputFormat, id: StudentId, status: &str, message: &str) -> Result<String, OutputError> {
    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "student_id": id,
                "status": status,
                "message": message,
            });
            Ok(serde_json::to_string_pretty(&output)?)
        }
        _ => Ok(message.to_string()),
    }
}

fn render_message(format: OutputFormat, message: &str, level: &str) -> Result<String, OutputError> {
    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "message": message,
                "level": level
            });
            Ok(serde_json::to_string_pretty(&output)?)
        }
        _ => Ok(message.to_string()),
    }
}

/// Render connection settings with the password masked
pub fn render_settings(
    format: OutputFormat,
    settings: &ConnectionSettings,
    source: Option<&Path>,
) -> Result<String, OutputError> {
    let source = source
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(environment only)".to_string());
    let timeout = settings.connect_timeout.as_secs();

    let content = match format {
        OutputFormat::Text => [
            "Students CLI Configuration:".to_string(),
            format!("  Source: {}", source),
            format!("  Host: {}", settings.host),
            format!("  Port: {}", settings.port),
            format!("  Database: {}", settings.dbname),
            format!("  User: {}", settings.user),
            "  Password: ********".to_string(),
            format!("  Connect timeout: {}s", timeout),
        ]
        .join("\n"),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "source": source,
                "host": settings.host,
                "port": settings.port,
                "database": settings.dbname,
                "user": settings.user,
                "password": "********",
                "connect_timeout_secs": timeout,
            });
            serde_json::to_string_pretty(&output)?
        }
        OutputFormat::Table => Table::new([SettingsTableRow {
            host: settings.host.clone(),
            port: settings.port,
            database: settings.dbname.clone(),
            user: settings.user.clone(),
            source,
        }])
        .to_string(),
        OutputFormat::Csv => format!(
            "host,port,database,user,connect_timeout_secs,source\n{},{},{},{},{},{}",
            csv_field(&settings.host),
            settings.port,
            csv_field(&settings.dbname),
            csv_field(&settings.user),
            timeout,
            csv_field(&source)
        ),
    };
    Ok(content)
}

/// Table row for a student
#[derive(Tabled)]
struct StudentTableRow {
    id: StudentId,
    first_name: String,
    last_name: String,
    email: String,
    enrolled: String,
}

impl From<&Student> for StudentTableRow {
    fn from(student: &Student) -> Self {
        Self {
            id: student.student_id,
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
            email: student.email.clone(),
            enrolled: student.enrollment_date.format(DATE_FORMAT).to_string(),
        }
    }
}

/// Table row for connection settings
#[derive(Tabled)]
struct SettingsTableRow {
    host: String,
    port: u16,
    database: String,
    user: String,
    source: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use std::time::Duration;

    fn alice() -> Student {
        Student {
            student_id: 1,
            first_name: "Alice".to_string(),
            last_name: "Johnson".to_string(),
            email: "alice.johnson@example.com".to_string(),
            enrollment_date: NaiveDate::from_ymd_opt(2024, 9, 3).unwrap(),
        }
    }

    fn bob() -> Student {
        Student {
            student_id: 2,
            first_name: "Bob".to_string(),
            last_name: "Smith, Jr.".to_string(),
            email: "bob@example.com".to_string(),
            enrollment_date: NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
        }
    }

    #[test]
    fn test_text_list_one_line_per_row() {
        let text = render_students(OutputFormat::Text, &[alice(), bob()]).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "1 Alice Johnson alice.johnson@example.com 2024-09-03");
        assert_eq!(lines[1], "2 Bob Smith, Jr. bob@example.com 2023-01-15");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_empty_list_renders() {
        assert_eq!(render_students(OutputFormat::Text, &[]).unwrap(), "");
        assert_eq!(render_students(OutputFormat::Table, &[]).unwrap(), "");
        assert_eq!(render_students(OutputFormat::Json, &[]).unwrap(), "[]");
        assert_eq!(render_students(OutputFormat::Csv, &[]).unwrap(), CSV_HEADER);
    }

    #[test]
    fn test_json_list_round_trips() {
        let json = render_students(OutputFormat::Json, &[alice()]).unwrap();
        let parsed: Vec<Student> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec![alice()]);
        assert!(json.contains("\"enrollment_date\": \"2024-09-03\""));
    }

    #[test]
    fn test_csv_quotes_commas() {
        let csv = render_students(OutputFormat::Csv, &[bob()]).unwrap();
        assert_eq!(
            csv,
            "student_id,first_name,last_name,email,enrollment_date\n2,Bob,\"Smith, Jr.\",bob@example.com,2023-01-15"
        );
    }

    #[test]
    fn test_table_contains_headers_and_values() {
        let table = render_students(OutputFormat::Table, &[alice()]).unwrap();
        assert!(table.contains("first_name"));
        assert!(table.contains("alice.johnson@example.com"));
        assert!(table.contains("2024-09-03"));
    }

    #[test]
    fn test_report_messages() {
        assert_eq!(
            render_report(OutputFormat::Text, &Report::Added(alice())).unwrap(),
            "Added student with ID 1"
        );
        assert_eq!(
            render_report(OutputFormat::Text, &Report::EmailUpdated(4)).unwrap(),
            "Updated email for student 4"
        );
        assert_eq!(render_report(OutputFormat::Text, &Report::Deleted(4)).unwrap(), "Deleted student 4");
        assert_eq!(
            render_report(OutputFormat::Text, &Report::NotFound(99)).unwrap(),
            "No student found with id 99"
        );
    }

    #[test]
    fn test_json_outcome_has_status() {
        let json = render_report(OutputFormat::Json, &Report::NotFound(99)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "not_found");
        assert_eq!(value["student_id"], 99);
    }

    #[test]
    fn test_settings_never_show_password() {
        let settings = ConnectionSettings {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "university".to_string(),
            user: "postgres".to_string(),
            password: "hunter2".to_string(),
            connect_timeout: Duration::from_secs(10),
        };
        for format in [OutputFormat::Text, OutputFormat::Json, OutputFormat::Table, OutputFormat::Csv] {
            let rendered = render_settings(format, &settings, None).unwrap();
            assert!(!rendered.contains("hunter2"), "{format}");
            assert!(rendered.contains("university"), "{format}");
        }
    }

    proptest! {
        #[test]
        fn prop_csv_field_round_trips(value in "[a-zA-Z0-9 ,\"]{0,24}") {
            let field = csv_field(&value);
            let decoded = if field.starts_with('"') {
                field[1..field.len() - 1].replace("\"\"", "\"")
            } else {
                field.clone()
            };
            prop_assert_eq!(decoded, value);
        }
    }
}
