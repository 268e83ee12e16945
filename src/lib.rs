pub mod conductor;
pub mod config;
pub mod error;
pub mod executor;
pub mod planner;
pub mod sandbox;
pub mod spec;

use std::path::Path;

use tracing::info;

pub use error::{HexmakeError, Result};

/// Run a full build: parse + validate the spec, plan the requested
/// targets, clean the scratch area, and execute the plan. Returns
/// `Ok(true)` on full success, `Ok(false)` if planning succeeded but one
/// or more tasks failed during execution.
pub fn build(workspace_root: &Path, targets: &[String], jobs: usize) -> Result<bool> {
    let spec_path = workspace_root.join("Hexmake");
    let parsed = spec::Spec::from_file(&spec_path)?;

    if let Err(issues) = spec::validate(&parsed) {
        return Err(HexmakeError::SpecValidation(issues.join("; ")));
    }

    let nodes = planner::plan(&parsed, targets)?;
    info!(tasks = nodes.len(), "planned build");

    let out_root = workspace_root.join("out");
    let sandbox_mgr = sandbox::SandboxManager::new(&out_root);
    sandbox_mgr.clean()?;

    let conductor = conductor::Conductor::new(workspace_root, &sandbox_mgr, jobs);
    Ok(conductor.run(&nodes))
}
