//! Build command - install the selected Composer version into its layer

use crate::build::{self, BuildContext, BuildResult};
use crate::cli::args::BuildArgs;
use crate::config::Config;
use crate::dependency::{Catalog, CatalogDependencyManager};
use crate::error::BuildpackResult;
use crate::plan::{BuildPlan, BuildPlanEntry};
use crate::retrieval::HttpTransport;
use console::style;
use std::time::Duration;
use tracing::debug;

/// Version source for a version requested through the environment
pub const ENV_VERSION_SOURCE: &str = "BP_COMPOSER_VERSION";

/// Execute the build command
pub fn execute(args: BuildArgs, config: &Config) -> BuildpackResult<()> {
    let settings = &config.build;

    let mut plan = BuildPlan::load(&args.plan)?;
    if let Some(version) = args.requested_version.filter(|v| !v.trim().is_empty()) {
        debug!("{} requests composer {}", ENV_VERSION_SOURCE, version);
        plan.entries.push(BuildPlanEntry::versioned(
            &settings.dependency,
            version.trim(),
            ENV_VERSION_SOURCE,
        ));
    }

    let catalog_path = args.catalog.unwrap_or_else(|| config.catalog.path.clone());
    let catalog = Catalog::load(&catalog_path)?;

    let transport = HttpTransport::new(Duration::from_secs(config.upstream.timeout_secs));
    let mut manager = CatalogDependencyManager::new(&settings.dependency, catalog, &transport);
    if let Some(cnb) = args.cnb {
        manager = manager.with_offline_dir(cnb.join("dependencies"));
    }

    let context = BuildContext {
        layers_dir: args.layers,
        stack: args.stack.unwrap_or_else(|| settings.stack.clone()),
        plan,
    };

    let result = build::build(settings, &context, &manager)?;
    print_summary(&result);
    Ok(())
}

fn print_summary(result: &BuildResult) {
    let marker = if result.decision.is_reuse() {
        style("↺").cyan()
    } else {
        style("✓").green()
    };

    println!("{} composer {} ({})", marker, result.version, result.decision);
    println!("  checksum: {}", result.checksum);
    println!("  layer:    {}", result.layer_path.display());
    println!("  binary:   {}", result.binary.display());
    println!(
        "  flags:    build={} launch={} cache={}",
        result.flags.build, result.flags.launch, result.flags.cache
    );
    for entry in &result.launch_bom {
        println!("  launch bom: {} {} [{}]", entry.name, entry.version, entry.purl);
    }
    for entry in &result.build_bom {
        println!("  build bom:  {} {} [{}]", entry.name, entry.version, entry.purl);
    }
}
