//! CLI command definitions.
//!
//! Every subcommand reads a directory of domain documents, builds the
//! metamodel on a blocking worker and reports on it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;

use meta_facets::ProgrammingModel;
use meta_loader::{DomainSource, LoaderError, MetaModelSnapshot, SpecificationLoader};
use meta_model::MetaModelConfig;

pub mod factories;
pub mod inspect;
pub mod list;
pub mod validate;

/// meta - metamodel facet engine
#[derive(Parser)]
#[command(name = "meta")]
#[command(version, about = "meta - build and validate metamodels of domain classes")]
#[command(long_about = r#"
meta reads class descriptors from YAML domain documents, introspects them
through the facet programming model and reports on the resulting metamodel.

COMMANDS:
  validate   → Build the metamodel and run the validation rules
  inspect    → Show the specification of one class
  list       → List every specification in the metamodel
  factories  → List the facet factories in registration order

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Validation failure
  4 - Build failure
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the metamodel and validate it
    Validate(validate::ValidateArgs),

    /// Describe the specification of one class
    Inspect(inspect::InspectArgs),

    /// List the specifications of a domain
    List(list::ListArgs),

    /// List the registered facet factories
    Factories(factories::FactoriesArgs),
}

/// Output format of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

/// Options shared by commands that build a metamodel.
#[derive(Args, Debug, Clone)]
pub struct DomainArgs {
    /// Directory (or single file) of YAML domain documents
    #[arg(short, long, default_value = ".")]
    pub domain: PathBuf,

    /// Metamodel configuration file (YAML or TOML)
    #[arg(short, long, env = "META_CONFIG")]
    pub config: Option<PathBuf>,

    /// Introspect classes in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Worker threads for parallel introspection
    #[arg(long)]
    pub threads: Option<usize>,
}

impl DomainArgs {
    /// The configuration file, with command-line overrides applied.
    pub fn metamodel_config(&self) -> Result<MetaModelConfig> {
        let mut config = match &self.config {
            Some(path) => MetaModelConfig::from_file(path)
                .with_context(|| format!("Failed to read config {:?}", path))?,
            None => MetaModelConfig::default(),
        };
        if self.parallel {
            config = config.parallel(true);
        }
        if let Some(threads) = self.threads {
            config = config.worker_threads(threads);
        }
        Ok(config)
    }
}

/// Load the domain and build its metamodel off the async runtime.
pub async fn build_metamodel(args: &DomainArgs) -> Result<(SpecificationLoader, MetaModelSnapshot)> {
    let config = args.metamodel_config()?;
    let domain = args.domain.clone();
    info!("Building metamodel from {:?}", domain);

    tokio::task::spawn_blocking(move || -> Result<_> {
        let universe = DomainSource::new(&domain).load()?;
        let loader = SpecificationLoader::new(universe, ProgrammingModel::standard(), config)?;
        match loader.create_meta_model() {
            Ok(snapshot) => Ok((loader, snapshot)),
            Err(e) => {
                for (class, message) in e.failures() {
                    eprintln!("  {}: {}", class, message);
                }
                Err(e.into())
            }
        }
    })
    .await
    .context("Metamodel build task failed")?
}

/// Print `value` in a machine-readable format.
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
        OutputFormat::Text => anyhow::bail!("text output has no structured form"),
    }
    Ok(())
}

/// Map a missing class to the loader's own error so the exit code reflects it.
pub fn class_not_found(name: &str) -> anyhow::Error {
    LoaderError::ClassNotFound(name.to_string()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    pub(crate) fn domain_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("shop.yaml"),
            r#"
classes:
  - name: shop.Customer
    sort: entity
    methods:
      - name: title
        returns: String
      - name: getName
        returns: String
      - name: setName
        parameters:
          - name: name
            type: String
      - name: placeOrder
"#,
        )
        .unwrap();
        dir
    }

    fn args(dir: &TempDir) -> DomainArgs {
        DomainArgs {
            domain: dir.path().to_path_buf(),
            config: None,
            parallel: true,
            threads: Some(2),
        }
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["meta", "inspect", "--domain", "model", "shop.Customer", "--format", "json"]).unwrap();
        assert!(matches!(cli.command, Commands::Inspect(_)));
    }

    #[test]
    fn test_overrides_apply() {
        let dir = domain_dir();
        let config = args(&dir).metamodel_config().unwrap();
        assert!(config.parallelize_introspection);
        assert_eq!(config.worker_threads, Some(2));
    }

    #[tokio::test]
    async fn test_build_metamodel() {
        let dir = domain_dir();
        let (loader, snapshot) = build_metamodel(&args(&dir)).await.unwrap();

        assert!(snapshot.contains("shop.Customer"));
        assert_eq!(loader.stats().failed, 0);
    }

    #[tokio::test]
    async fn test_build_metamodel_missing_domain() {
        let args = DomainArgs {
            domain: PathBuf::from("/nonexistent/domain"),
            config: None,
            parallel: false,
            threads: None,
        };
        let err = build_metamodel(&args).await.unwrap_err();
        assert!(err.downcast_ref::<LoaderError>().is_some());
    }
}
