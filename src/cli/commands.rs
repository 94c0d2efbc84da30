use crate::cli::args::{Args, Command, ConfigArgs, ConfigCommand};
use crate::cli::output::{ConsoleWriter, OutputWriter};
use crate::core::operations::{Report, StudentOperation};
use crate::domain::config::{ConnectionSettings, GlobalConfig};
use crate::domain::error::StudentsResult;
use crate::infrastructure::config::{ConfigManager, LoadedConfig};
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::postgres::PgStudentRepository;
use std::path::Path;
use tracing::{info, warn};

/// Execute CLI command
pub async fn execute_command(args: Args) -> StudentsResult<()> {
    execute_with_manager(args, &ConfigManager::new()).await
}

/// Execute CLI command with a caller-supplied configuration manager
pub async fn execute_with_manager(args: Args, config_manager: &ConfigManager) -> StudentsResult<()> {
    let Args {
        verbose,
        quiet,
        config,
        output,
        command,
    } = args;
    let writer = ConsoleWriter::new(output);

    match command {
        Command::Config(config_args) => {
            execute_config_command(config_args, &writer, config_manager, config.as_deref(), verbose, quiet)
        }
        command => {
            // Arguments are validated before configuration is read or a
            // connection is opened.
            let operation = StudentOperation::try_from(command)?;
            let loaded = load_config(config_manager, config.as_deref(), verbose, quiet)?;
            let settings = loaded.config.database.resolve()?;
            execute_operation(operation, &writer, &settings).await
        }
    }
}

/// Load configuration and start logging according to it
fn load_config(
    config_manager: &ConfigManager,
    explicit: Option<&Path>,
    verbose: bool,
    quiet: bool,
) -> StudentsResult<LoadedConfig> {
    let loaded = config_manager.load(explicit)?;
    if !quiet {
        init_logging(&loaded.config.global.log_level, verbose)?;
    }
    Ok(loaded)
}

/// Open the connection, run one operation, close the connection, render.
///
/// The connection is closed whether or not the operation succeeded.
async fn execute_operation(
    operation: StudentOperation,
    writer: &ConsoleWriter,
    settings: &ConnectionSettings,
) -> StudentsResult<()> {
    let mut repo = PgStudentRepository::connect(settings).await?;
    let result = operation.execute(&mut repo).await;

    if let Err(e) = repo.close().await {
        warn!(error = %e, "failed to close database connection cleanly");
    }

    let report = result?;
    match &report {
        Report::Listed(students) if students.is_empty() => info!("No students found"),
        Report::NotFound(student_id) => info!(student_id, "no row matched"),
        _ => {}
    }

    writer.write_report(&report)?;
    Ok(())
}

fn execute_config_command(
    args: ConfigArgs,
    writer: &ConsoleWriter,
    config_manager: &ConfigManager,
    explicit: Option<&Path>,
    verbose: bool,
    quiet: bool,
) -> StudentsResult<()> {
    match args.command {
        ConfigCommand::Show => {
            let loaded = load_config(config_manager, explicit, verbose, quiet)?;
            let settings = loaded.config.database.resolve()?;
            writer.write_settings(&settings, loaded.source.as_deref())?;
            Ok(())
        }
        ConfigCommand::Init { path, force } => {
            if !quiet {
                init_logging(&GlobalConfig::default().log_level, verbose)?;
            }
            let written = config_manager.init_config(path.as_deref(), force)?;
            info!(path = %written.display(), "configuration file written");
            writer.write_message(&format!("Configuration written to {}", written.display()))?;
            Ok(())
        }
    }
}
