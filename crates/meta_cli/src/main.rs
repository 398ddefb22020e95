//! Metamodel CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Validation failure
//! - 4: Build failure

use std::process::ExitCode;

use clap::Parser;
use meta_loader::LoaderError;
use meta_model::ModelError;
use meta_validate::ValidationError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
    pub const BUILD_FAILURE: u8 = 4;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{},meta_loader=info,meta_validate=info", default_level))
    });
    // Logging may already be initialized
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let result = match cli.command {
        Commands::Validate(args) => commands::validate::execute(args).await,
        Commands::Inspect(args) => commands::inspect::execute(args).await,
        Commands::List(args) => commands::list::execute(args).await,
        Commands::Factories(args) => commands::factories::execute(args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    if e.downcast_ref::<ValidationError>().is_some() {
        return ExitCodes::VALIDATION_FAILURE;
    }
    if let Some(error) = e.downcast_ref::<LoaderError>() {
        return match error {
            LoaderError::ClassNotFound(_)
            | LoaderError::InvalidDocument { .. }
            | LoaderError::Io(_)
            | LoaderError::Model(_) => ExitCodes::INVALID_ARGS,
            _ => ExitCodes::BUILD_FAILURE,
        };
    }
    if e.downcast_ref::<ModelError>().is_some() {
        return ExitCodes::INVALID_ARGS;
    }

    let msg = e.to_string().to_lowercase();
    if msg.contains("validation") {
        ExitCodes::VALIDATION_FAILURE
    } else if msg.contains("argument") || msg.contains("not found") {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_error() {
        let validation = anyhow::Error::new(ValidationError::Failed {
            errors: 1,
            warnings: 0,
        });
        assert_eq!(categorize_error(&validation), ExitCodes::VALIDATION_FAILURE);

        let incomplete = anyhow::Error::new(LoaderError::MetaModelIncomplete {
            failures: vec![("shop.Broken".to_string(), "boom".to_string())],
        });
        assert_eq!(categorize_error(&incomplete), ExitCodes::BUILD_FAILURE);

        let missing = anyhow::Error::new(LoaderError::ClassNotFound("shop.Missing".to_string()));
        assert_eq!(categorize_error(&missing), ExitCodes::INVALID_ARGS);

        assert_eq!(
            categorize_error(&anyhow::anyhow!("something else")),
            ExitCodes::GENERAL_ERROR
        );
    }
}
