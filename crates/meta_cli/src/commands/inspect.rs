//! Inspect command - Describe the specification of one class.

use anyhow::Result;
use clap::Args;
use tracing::info;

use meta_model::{Facet, SpecDescription};

use super::{build_metamodel, class_not_found, print_structured, DomainArgs, OutputFormat};

#[derive(Args)]
pub struct InspectArgs {
    /// Fully qualified class name
    pub class: String,

    #[command(flatten)]
    pub domain: DomainArgs,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

pub async fn execute(args: InspectArgs) -> Result<()> {
    info!("Inspecting class: {}", args.class);

    let (_loader, snapshot) = build_metamodel(&args.domain).await?;
    let spec = snapshot
        .get(&args.class)
        .ok_or_else(|| class_not_found(&args.class))?;
    let description = spec.describe();

    match args.format {
        OutputFormat::Text => print!("{}", render(&description)),
        format => print_structured(&description, format)?,
    }
    Ok(())
}

fn render_facet(facet: &Facet) -> String {
    let value = serde_json::to_string(&facet.value).unwrap_or_default();
    format!("{} = {} [{:?}, {}]", facet.facet_type, value, facet.precedence, facet.source)
}

/// Plain-text rendering of a description.
fn render(description: &SpecDescription) -> String {
    let mut out = format!(
        "{} ({}, {})\n",
        description.name, description.logical_type_name, description.sort
    );
    if let Some(superclass) = &description.superclass {
        out.push_str(&format!("  extends {}\n", superclass));
    }
    for facet in &description.facets {
        out.push_str(&format!("  {}\n", render_facet(facet)));
    }
    for member in &description.members {
        out.push_str(&format!("  {} {}: {}", member.kind, member.id, member.type_name));
        if let Some(mixin) = &member.mixed_in_from {
            out.push_str(&format!(" (from {})", mixin));
        }
        out.push('\n');
        for facet in &member.facets {
            out.push_str(&format!("    {}\n", render_facet(facet)));
        }
        for parameter in &member.parameters {
            out.push_str(&format!(
                "    [{}] {}: {}\n",
                parameter.index, parameter.name, parameter.type_name
            ));
        }
    }
    for method in &description.orphaned_methods {
        out.push_str(&format!("  orphaned {}\n", method));
    }
    out
}
