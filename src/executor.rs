//! Runs one rule inside a fresh sandbox: stages inputs, creates output
//! parent directories, runs commands through a shell, and publishes
//! outputs back into the real `out/` tree.

use std::path::Path;
use std::process::Command;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{HexmakeError, Result};
use crate::sandbox::SandboxManager;
use crate::spec::Rule;

pub struct RuleExecutor<'a> {
    workspace_root: &'a Path,
    sandbox_mgr: &'a SandboxManager,
}

impl<'a> RuleExecutor<'a> {
    pub fn new(workspace_root: &'a Path, sandbox_mgr: &'a SandboxManager) -> Self {
        Self {
            workspace_root,
            sandbox_mgr,
        }
    }

    /// Execute `rule` end to end. On any failure the sandbox directory is
    /// deliberately left on disk for inspection; there is no retry.
    pub fn run(&self, rule: &Rule) -> Result<()> {
        let sandbox = self.sandbox_mgr.make_build_dir()?;

        self.stage_inputs(rule, &sandbox)?;
        self.prepare_output_parents(rule, &sandbox)?;
        self.run_commands(rule, &sandbox)?;
        self.publish_outputs(rule, &sandbox)?;

        Ok(())
    }

    fn stage_inputs(&self, rule: &Rule, sandbox: &Path) -> Result<()> {
        for input in &rule.inputs {
            let src = self.workspace_root.join(input);
            if !src.exists() {
                return Err(HexmakeError::MissingInput { path: src });
            }

            if src.is_dir() {
                for entry in WalkDir::new(&src) {
                    let entry = entry.map_err(std::io::Error::from)?;
                    let rel = entry.path().strip_prefix(&src).unwrap();
                    let dest = sandbox.join(input).join(rel);
                    if entry.file_type().is_dir() {
                        std::fs::create_dir_all(&dest)?;
                    } else {
                        if let Some(parent) = dest.parent() {
                            std::fs::create_dir_all(parent)?;
                        }
                        std::fs::copy(entry.path(), &dest)?;
                    }
                }
            } else {
                let dest = sandbox.join(input);
                if let Some(parent) = dest.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::copy(&src, &dest)?;
            }
        }
        Ok(())
    }

    fn prepare_output_parents(&self, rule: &Rule, sandbox: &Path) -> Result<()> {
        for output in &rule.outputs {
            if let Some(parent) = Path::new(output).parent() {
                std::fs::create_dir_all(sandbox.join(parent))?;
            }
        }
        Ok(())
    }

    fn run_commands(&self, rule: &Rule, sandbox: &Path) -> Result<()> {
        for command in &rule.commands {
            println!("{command}");

            let status = Command::new("sh")
                .arg("-c")
                .arg(command)
                .current_dir(sandbox)
                .status()?;

            let code = status.code().unwrap_or(-1);
            if !status.success() {
                eprintln!("command failed with exit code {code}: {command}");
                eprintln!("sandbox: {}", sandbox.display());
                return Err(HexmakeError::CommandFailed {
                    command: command.clone(),
                    code,
                    sandbox: sandbox.to_path_buf(),
                });
            }
        }
        Ok(())
    }

    fn publish_outputs(&self, rule: &Rule, sandbox: &Path) -> Result<()> {
        for output in &rule.outputs {
            let sandbox_path = sandbox.join(output);
            if !sandbox_path.exists() {
                return Err(HexmakeError::MissingDeclaredOutput {
                    path: sandbox_path,
                    sandbox: sandbox.to_path_buf(),
                });
            }

            // `output` is always "out/...": the real destination lives
            // directly under the workspace root, not under `out_root` twice.
            let dest = self.workspace_root.join(output);
            if dest.exists() {
                if dest.is_dir() {
                    std::fs::remove_dir_all(&dest)?;
                } else {
                    std::fs::remove_file(&dest)?;
                }
            }
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(&sandbox_path, &dest)?;
            debug!("published {}", dest.display());
        }
        Ok(())
    }
}
