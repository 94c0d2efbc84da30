// Students CLI - CRUD operations on the PostgreSQL students table
use clap::Parser;
use std::process::ExitCode;
use students::cli::args::{classify_parse_error, Args};
use students::cli::commands::execute_command;
use students::cli::output::{ConsoleWriter, OutputWriter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // A missing .env file is fine; variables already set are never overridden.
    let _ = dotenvy::dotenv();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => match classify_parse_error(&err) {
            Some(error) => {
                eprintln!("Error: {}", error);
                return ExitCode::from(error.exit_code());
            }
            None => err.exit(),
        },
    };

    let writer = ConsoleWriter::new(args.output);
    match execute_command(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if writer.write_error(&e.to_string()).is_err() {
                eprintln!("Error: {}", e);
            }
            ExitCode::from(e.exit_code())
        }
    }
}
