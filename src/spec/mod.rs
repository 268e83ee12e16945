//! The `Hexmake` build spec: its on-disk JSON schema, the in-memory `Spec`/
//! `Rule` data model, and the structural validator that runs before planning.

pub mod path;

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{HexmakeError, Result};
pub use path::ArtifactPath;

/// One build rule: a set of outputs produced by running `commands` in order,
/// given `inputs` staged into a fresh sandbox.
#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    pub outputs: Vec<String>,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub commands: Vec<String>,
}

impl Rule {
    pub fn outputs(&self) -> impl Iterator<Item = ArtifactPath> + '_ {
        self.outputs.iter().map(|s| ArtifactPath::new(s.as_str()))
    }

    pub fn inputs(&self) -> impl Iterator<Item = ArtifactPath> + '_ {
        self.inputs.iter().map(|s| ArtifactPath::new(s.as_str()))
    }

    /// Identity used to deduplicate a rule's `TaskNode` across the outputs
    /// that reference it. The first declared output is stable for this
    /// purpose because a rule's `outputs` list is immutable once parsed and
    /// every output maps back to exactly this rule (enforced by
    /// `RulesByOutput`).
    pub fn identity(&self) -> &str {
        &self.outputs[0]
    }
}

/// The parsed `Hexmake` file.
#[derive(Debug, Clone, Deserialize)]
pub struct Spec {
    /// Environment variable names reserved for a future cache-key scheme.
    /// Parsed and retained, never read by the planner/conductor/executor.
    #[serde(default)]
    pub environ: Vec<String>,
    pub rules: Vec<Rule>,
}

impl Spec {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

/// A mapping from output path to the owning rule's identity, for rules that
/// are well-formed and declare nonempty `outputs`. Building this mapping
/// also detects `DuplicateOutput`.
pub struct RulesByOutput<'a> {
    by_output: HashMap<ArtifactPath, &'a Rule>,
}

impl<'a> RulesByOutput<'a> {
    pub fn build(spec: &'a Spec) -> Result<Self> {
        let mut by_output: HashMap<ArtifactPath, &'a Rule> = HashMap::new();
        for rule in &spec.rules {
            for output in rule.outputs() {
                if let Some(existing) = by_output.get(&output) {
                    if !std::ptr::eq(*existing, rule) {
                        return Err(HexmakeError::DuplicateOutput(output.to_string()));
                    }
                    continue;
                }
                by_output.insert(output, rule);
            }
        }
        Ok(Self { by_output })
    }

    pub fn get(&self, output: &ArtifactPath) -> Option<&'a Rule> {
        self.by_output.get(output).copied()
    }
}

/// A structural issue found by `validate`. `hard` issues reject the spec
/// outright (`HexmakeError::SpecValidation`); soft issues are logged as
/// warnings and do not block planning.
pub struct ValidationIssue {
    pub message: String,
    pub hard: bool,
}

/// Structural checks over a parsed spec, run once before planning begins.
/// Named as an unimplemented placeholder in the design notes this tool was
/// built from; implemented here so malformed specs fail fast with every
/// problem reported at once, rather than surfacing one at a time as the
/// planner or executor happens to trip over them.
pub fn validate(spec: &Spec) -> std::result::Result<(), Vec<String>> {
    let mut issues = Vec::new();

    for (idx, rule) in spec.rules.iter().enumerate() {
        if rule.outputs.is_empty() {
            issues.push(ValidationIssue {
                message: format!("rule #{idx} has no outputs"),
                hard: true,
            });
            continue;
        }

        for output in &rule.outputs {
            if !ArtifactPath::new(output.as_str()).is_output() {
                issues.push(ValidationIssue {
                    message: format!(
                        "rule producing '{output}' declares an output not under '{}/' ",
                        path::OUTPUT_ROOT
                    ),
                    hard: true,
                });
            }
        }

        if rule.commands.is_empty() && rule.inputs.is_empty() {
            issues.push(ValidationIssue {
                message: format!(
                    "rule producing '{}' has no inputs and no commands",
                    rule.outputs[0]
                ),
                hard: false,
            });
        }
    }

    for issue in &issues {
        if issue.hard {
            tracing::error!("{}", issue.message);
        } else {
            tracing::warn!("{}", issue.message);
        }
    }

    let hard_messages: Vec<String> = issues
        .iter()
        .filter(|i| i.hard)
        .map(|i| i.message.clone())
        .collect();

    if hard_messages.is_empty() {
        Ok(())
    } else {
        Err(hard_messages)
    }
}
