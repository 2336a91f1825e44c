//! Catalog command - inspect cataloged releases

use crate::cli::args::{CatalogAction, CatalogArgs, OutputFormat};
use crate::config::Config;
use crate::dependency::{Catalog, DependencyDescriptor};
use crate::error::BuildpackResult;
use console::style;

/// Execute the catalog command
pub fn execute(args: CatalogArgs, config: &Config) -> BuildpackResult<()> {
    match args.action {
        CatalogAction::List { catalog, format } => {
            let path = catalog.unwrap_or_else(|| config.catalog.path.clone());
            let catalog = Catalog::load(&path)?;
            list(&catalog, format)
        }
    }
}

fn list(catalog: &Catalog, format: OutputFormat) -> BuildpackResult<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&catalog.dependencies)?),
        OutputFormat::Table if catalog.dependencies.is_empty() => {
            println!("No dependencies in catalog.");
        }
        OutputFormat::Table => print_table(catalog),
    }
    Ok(())
}

fn print_table(catalog: &Catalog) {
    println!(
        "{:<12} {:<10} {:<20} {:<12} {}",
        "ID", "VERSION", "CHECKSUM", "LICENSES", "STACKS"
    );
    println!("{}", "-".repeat(72));

    for dependency in &catalog.dependencies {
        let version = if catalog.default_version.as_deref() == Some(dependency.version.as_str()) {
            style(format!("{} *", dependency.version)).green().to_string()
        } else {
            dependency.version.clone()
        };

        println!(
            "{:<12} {:<10} {:<20} {:<12} {}",
            dependency.id,
            version,
            short_checksum(dependency),
            dependency.licenses.join(","),
            dependency.stacks.join(",")
        );
    }

    println!();
    println!("Total: {} version(s)", catalog.dependencies.len());
}

fn short_checksum(dependency: &DependencyDescriptor) -> String {
    let prefix: String = dependency.checksum_hex().chars().take(12).collect();
    format!("sha256:{}", prefix)
}
