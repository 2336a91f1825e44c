//! Build step: resolve, decide, install
//!
//! One invocation owns one layer. The flow is:
//!
//! 1. rank the plan entries and pick the effective version requirement
//! 2. OR-merge the layer flags requested by every entry
//! 3. resolve the requirement to a catalog descriptor
//! 4. compare its checksum with the layer record and reuse or rebuild
//!
//! The record is rewritten only after a successful install, so a failed
//! rebuild leaves no record behind.

use crate::cache::{CacheDecision, CacheRecord};
use crate::config::schema::BuildConfig;
use crate::dependency::{BomEntry, DependencyManager};
use crate::error::BuildpackResult;
use crate::layer::{self, Layer, LayerFlags};
use crate::plan::{BuildPlan, EntryResolver};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Inputs supplied by the platform for one build
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub layers_dir: PathBuf,
    pub stack: String,
    pub plan: BuildPlan,
}

/// Summary of what the build did
#[derive(Debug, Clone, Serialize)]
pub struct BuildResult {
    pub decision: CacheDecision,
    pub flags: LayerFlags,
    pub checksum: String,
    pub version: String,
    pub layer_path: PathBuf,
    pub binary: PathBuf,
    pub launch_bom: Vec<BomEntry>,
    pub build_bom: Vec<BomEntry>,
}

pub fn build(
    settings: &BuildConfig,
    context: &BuildContext,
    manager: &dyn DependencyManager,
) -> BuildpackResult<BuildResult> {
    let resolver = EntryResolver::new(settings.priorities.clone());
    let (requirement, _) = resolver.resolve(&settings.dependency, &context.plan.entries)?;
    let flags = resolver.merge_layer_flags(&settings.dependency, &context.plan.entries);

    let descriptor = manager.resolve(&requirement, &context.stack)?;

    let layer = Layer::new(&context.layers_dir, &settings.layer);
    let previous = CacheRecord::load(&layer);
    let decision = CacheDecision::decide(&descriptor.checksum, previous.as_ref());
    info!("Layer {}: {}", layer.name, decision);

    let binary = match (&decision, previous) {
        (CacheDecision::Reuse, Some(record)) => {
            record.with_flags(flags).save(&layer)?;
            layer.bin_dir().join(descriptor.artifact_name())
        }
        _ => {
            layer.reset()?;
            let binary = layer::install(manager, &descriptor, &layer)?;
            CacheRecord::new(&descriptor.checksum, flags, layer.path.clone()).save(&layer)?;
            binary
        }
    };

    let bom = descriptor.bom_entry();
    Ok(BuildResult {
        decision,
        flags,
        checksum: descriptor.checksum.clone(),
        version: descriptor.version.clone(),
        layer_path: layer.path.clone(),
        binary,
        launch_bom: if flags.launch { vec![bom.clone()] } else { Vec::new() },
        build_bom: if flags.build { vec![bom] } else { Vec::new() },
    })
}
