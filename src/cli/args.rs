use crate::core::operations::StudentOperation;
use crate::domain::error::{StudentsError, StudentsResult};
use crate::domain::student::{parse_enrollment_date, required, NewStudent, StudentId};
use chrono::NaiveDate;
use clap::error::ErrorKind;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Command line arguments for the students CLI
#[derive(Parser, Debug)]
#[command(
    name = "students",
    version = env!("CARGO_PKG_VERSION"),
    about = "CRUD operations on the PostgreSQL students table",
    long_about = "List, add, update and delete rows of the PostgreSQL `students` table. \
                  Connection settings come from PGHOST, PGPORT, PGDATABASE, PGUSER and PGPASSWORD \
                  (a .env file is honoured) or from a TOML configuration file."
)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List all students ordered by id
    List,
    /// Add a student
    Add(AddArgs),
    /// Update a student's email
    UpdateEmail(UpdateEmailArgs),
    /// Delete a student by id
    Delete(DeleteArgs),
    /// Configuration management commands
    Config(ConfigArgs),
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// Table output
    Table,
    /// CSV output
    Csv,
}

#[derive(ClapArgs, Debug)]
pub struct AddArgs {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Enrollment date, YYYY-MM-DD
    #[arg(value_parser = parse_enrollment_date)]
    pub enrollment_date: NaiveDate,
}

#[derive(ClapArgs, Debug)]
pub struct UpdateEmailArgs {
    #[arg(allow_negative_numbers = true)]
    pub student_id: StudentId,
    pub new_email: String,
}

#[derive(ClapArgs, Debug)]
pub struct DeleteArgs {
    #[arg(allow_negative_numbers = true)]
    pub student_id: StudentId,
}

/// Configuration management arguments
#[derive(ClapArgs, Debug)]
pub struct ConfigArgs {
    /// Configuration subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the resolved connection settings (password masked)
    Show,
    /// Write a starter configuration file
    Init {
        /// Output file path (defaults to ~/.config/students/config.toml)
        #[arg(long, value_name = "FILE")]
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

impl TryFrom<Command> for StudentOperation {
    type Error = StudentsError;

    /// Convert a table command into its operation, validating text fields
    fn try_from(command: Command) -> StudentsResult<Self> {
        let operation = match command {
            Command::List => StudentOperation::List,
            Command::Add(args) => StudentOperation::Add(NewStudent::new(
                args.first_name,
                args.last_name,
                args.email,
                args.enrollment_date,
            )?),
            Command::UpdateEmail(args) => StudentOperation::UpdateEmail {
                student_id: args.student_id,
                email: required("new_email", args.new_email)?,
            },
            Command::Delete(args) => StudentOperation::Delete {
                student_id: args.student_id,
            },
            Command::Config(_) => {
                return Err(StudentsError::InvalidCommand(
                    "config is not a table operation".to_string(),
                ))
            }
        };
        Ok(operation)
    }
}

/// Map a clap failure onto the error taxonomy.
///
/// Returns `None` for help and version requests, which are not failures.
pub fn classify_parse_error(err: &clap::Error) -> Option<StudentsError> {
    let rendered = err.to_string();
    let message = rendered.trim().trim_start_matches("error: ").to_string();

    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => None,
        ErrorKind::InvalidSubcommand
        | ErrorKind::MissingSubcommand
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            Some(StudentsError::InvalidCommand(message))
        }
        _ => Some(StudentsError::InvalidArguments(message)),
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Text
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("students").chain(argv.iter().copied()))
    }

    fn parse_err(argv: &[&str]) -> StudentsError {
        let err = parse(argv).unwrap_err();
        classify_parse_error(&err).expect("expected a failure, not help")
    }

    #[test]
    fn test_parse_add() {
        let args = parse(&["add", "Alice", "Johnson", "alice.johnson@example.com", "2024-09-03"]).unwrap();
        let Command::Add(add) = args.command else {
            panic!("expected add");
        };
        assert_eq!(add.first_name, "Alice");
        assert_eq!(add.enrollment_date, NaiveDate::from_ymd_opt(2024, 9, 3).unwrap());
    }

    #[test]
    fn test_parse_update_email_and_delete() {
        let args = parse(&["update-email", "7", "new@example.com"]).unwrap();
        assert!(matches!(
            args.command,
            Command::UpdateEmail(UpdateEmailArgs { student_id: 7, .. })
        ));

        let args = parse(&["delete", "42"]).unwrap();
        assert!(matches!(args.command, Command::Delete(DeleteArgs { student_id: 42 })));
    }

    #[test]
    fn test_negative_ids_are_integers() {
        let args = parse(&["delete", "-5"]).unwrap();
        assert!(matches!(args.command, Command::Delete(DeleteArgs { student_id: -5 })));

        let args = parse(&["update-email", "-1", "x@example.com"]).unwrap();
        let Command::UpdateEmail(update) = args.command else {
            panic!("expected update-email");
        };
        assert_eq!(update.student_id, -1);
        assert_eq!(update.new_email, "x@example.com");

        let args = parse(&["-v", "delete", "-5"]).unwrap();
        assert!(args.verbose);
    }

    #[test]
    fn test_ids_beyond_int4_are_invalid_arguments() {
        let err = parse_err(&["delete", "3000000000"]);
        assert!(matches!(err, StudentsError::InvalidArguments(_)));
    }

    #[test]
    fn test_global_flags_after_command() {
        let args = parse(&["list", "--output", "json", "-v"]).unwrap();
        assert_eq!(args.output, OutputFormat::Json);
        assert!(args.verbose);
        assert!(matches!(args.command, Command::List));
    }

    #[test]
    fn test_unknown_command_is_invalid_command() {
        let err = parse_err(&["enroll"]);
        assert!(matches!(err, StudentsError::InvalidCommand(_)));
        assert!(err.to_string().contains("enroll"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_missing_command_is_invalid_command() {
        assert!(matches!(parse_err(&[]), StudentsError::InvalidCommand(_)));
        assert!(matches!(parse_err(&["--verbose"]), StudentsError::InvalidCommand(_)));
    }

    #[test]
    fn test_wrong_arity_is_invalid_arguments() {
        assert!(matches!(
            parse_err(&["add", "Alice", "Johnson"]),
            StudentsError::InvalidArguments(_)
        ));
        assert!(matches!(parse_err(&["delete"]), StudentsError::InvalidArguments(_)));
        assert!(matches!(parse_err(&["delete", "1", "2"]), StudentsError::InvalidArguments(_)));
        assert!(matches!(parse_err(&["list", "extra"]), StudentsError::InvalidArguments(_)));
    }

    #[test]
    fn test_unparsable_values_are_invalid_arguments() {
        let err = parse_err(&["add", "Alice", "Johnson", "a@example.com", "2024-13-40"]);
        assert!(matches!(err, StudentsError::InvalidArguments(_)));
        assert!(err.to_string().contains("YYYY-MM-DD"));

        let err = parse_err(&["update-email", "seven", "a@example.com"]);
        assert!(matches!(err, StudentsError::InvalidArguments(_)));

        let err = parse_err(&["delete", "1.5"]);
        assert!(matches!(err, StudentsError::InvalidArguments(_)));
    }

    #[test]
    fn test_help_is_not_a_failure() {
        let err = parse(&["--help"]).unwrap_err();
        assert!(classify_parse_error(&err).is_none());
        let err = parse(&["--version"]).unwrap_err();
        assert!(classify_parse_error(&err).is_none());
    }

    #[test]
    fn test_operation_rejects_blank_email() {
        let args = parse(&["update-email", "3", " "]).unwrap();
        let err = StudentOperation::try_from(args.command).unwrap_err();
        assert!(matches!(err, StudentsError::InvalidArguments(_)));
    }

    #[test]
    fn test_operation_from_commands() {
        let op = StudentOperation::try_from(parse(&["delete", "5"]).unwrap().command).unwrap();
        assert_eq!(op, StudentOperation::Delete { student_id: 5 });

        let op = StudentOperation::try_from(parse(&["list"]).unwrap().command).unwrap();
        assert_eq!(op, StudentOperation::List);

        let err = StudentOperation::try_from(parse(&["config", "show"]).unwrap().command).unwrap_err();
        assert!(matches!(err, StudentsError::InvalidCommand(_)));
    }
}
