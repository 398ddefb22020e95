//! Validate command - Build a metamodel and check it.

use anyhow::Result;
use clap::Args;
use tracing::info;

use meta_validate::Validator;

use super::{build_metamodel, print_structured, DomainArgs, OutputFormat};

#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub domain: DomainArgs,

    /// Disable a validation rule (repeatable)
    #[arg(long = "disable", value_name = "RULE")]
    pub disabled_rules: Vec<String>,

    /// Treat warnings as failures
    #[arg(long)]
    pub fail_on_warnings: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

pub async fn execute(args: ValidateArgs) -> Result<()> {
    info!("Validating domain: {:?}", args.domain.domain);

    let mut config = args.domain.metamodel_config()?.validation;
    config.disabled_rules.extend(args.disabled_rules.iter().cloned());
    config.fail_on_warnings |= args.fail_on_warnings;
    let validator = Validator::from_config(&config)?;

    let (_loader, snapshot) = build_metamodel(&args.domain).await?;
    let report = validator.validate(&snapshot);

    match args.format {
        OutputFormat::Text => print!("{}", report.report()),
        format => print_structured(&report, format)?,
    }

    report.into_result()?;
    Ok(())
}
