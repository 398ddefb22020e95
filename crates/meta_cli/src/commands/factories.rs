//! Factories command - Show the programming model.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use meta_facets::ProgrammingModel;

use super::{print_structured, OutputFormat};

#[derive(Args)]
pub struct FactoriesArgs {
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct FactoryRow {
    name: String,
    feature_types: Vec<&'static str>,
}

fn rows(model: &ProgrammingModel) -> Vec<FactoryRow> {
    model
        .names()
        .into_iter()
        .filter_map(|name| model.get(name))
        .map(|factory| FactoryRow {
            name: factory.name().to_string(),
            feature_types: factory.feature_types().iter().map(|t| t.as_str()).collect(),
        })
        .collect()
}

pub async fn execute(args: FactoriesArgs) -> Result<()> {
    let rows = rows(&ProgrammingModel::standard());
    match args.format {
        OutputFormat::Text => {
            for (i, row) in rows.iter().enumerate() {
                println!("{:>3}. {:<32} {}", i + 1, row.name, row.feature_types.join(", "));
            }
        }
        format => print_structured(&rows, format)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_follow_registration_order() {
        let rows = rows(&ProgrammingModel::standard());
        assert_eq!(rows.len(), meta_facets::STANDARD_FACTORIES.len());
        assert_eq!(rows[0].name, "named-inferred");
        assert!(rows.iter().any(|r| r.name == "title-method" && r.feature_types == vec!["object"]));
    }
}
