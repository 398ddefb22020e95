//! List command - Summarize every specification of a domain.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tracing::info;

use meta_loader::{LoaderStats, MetaModelSnapshot};
use meta_model::BeanSort;

use super::{build_metamodel, print_structured, DomainArgs, OutputFormat};

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub domain: DomainArgs,

    /// Include built-in value types
    #[arg(long)]
    pub all: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// One line of the listing.
#[derive(Debug, Serialize)]
pub struct SpecSummary {
    pub name: String,
    pub logical_type_name: String,
    pub sort: BeanSort,
    pub properties: usize,
    pub collections: usize,
    pub actions: usize,
}

#[derive(Debug, Serialize)]
struct Listing {
    stats: LoaderStats,
    specifications: Vec<SpecSummary>,
}

pub async fn execute(args: ListArgs) -> Result<()> {
    info!("Listing domain: {:?}", args.domain.domain);

    let (loader, snapshot) = build_metamodel(&args.domain).await?;
    let listing = Listing {
        stats: loader.stats(),
        specifications: summarize(&snapshot, args.all),
    };

    match args.format {
        OutputFormat::Text => {
            for spec in &listing.specifications {
                println!(
                    "{:<40} {:<10} {:>3} properties {:>3} collections {:>3} actions",
                    spec.name, spec.sort, spec.properties, spec.collections, spec.actions
                );
            }
            println!();
            println!(
                "{} specifications, {} builds (generation {})",
                listing.stats.ready, listing.stats.builds, listing.stats.generation
            );
        }
        format => print_structured(&listing, format)?,
    }
    Ok(())
}

fn summarize(snapshot: &MetaModelSnapshot, all: bool) -> Vec<SpecSummary> {
    snapshot
        .specifications()
        .iter()
        .filter(|spec| all || spec.sort() != BeanSort::Value)
        .map(|spec| SpecSummary {
            name: spec.name().to_string(),
            logical_type_name: spec.logical_type_name(),
            sort: spec.sort(),
            properties: spec.properties().len(),
            collections: spec.collections().len(),
            actions: spec.actions().len(),
        })
        .collect()
}
