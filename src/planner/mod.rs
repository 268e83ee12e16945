//! The build planner — turns a parsed `Spec` plus a set of requested output
//! paths into the minimal set of `TaskNode`s needed to produce them, wired
//! with dependency edges.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::error::{HexmakeError, Result};
use crate::spec::{ArtifactPath, Rule, RulesByOutput, Spec};

/// A vertex in the build graph, wrapping one `Rule`.
///
/// `dependencies`/`reverse_dependencies` are built single-threaded during
/// planning and are read-only for the remainder of the run; only
/// `pending_count` is mutated (atomically) once the conductor starts
/// dispatching work.
pub struct TaskNode {
    pub payload: Rule,
    dependencies: RwLock<Vec<Arc<TaskNode>>>,
    reverse_dependencies: RwLock<Vec<Arc<TaskNode>>>,
    pending_count: AtomicUsize,
}

impl TaskNode {
    fn new(payload: Rule) -> Self {
        Self {
            payload,
            dependencies: RwLock::new(Vec::new()),
            reverse_dependencies: RwLock::new(Vec::new()),
            pending_count: AtomicUsize::new(0),
        }
    }

    /// Insert `other` into this node's dependencies if not already present.
    /// Idempotent: a duplicate `add_dependency` call is a no-op. Called only
    /// during graph construction, which is single-threaded.
    fn add_dependency(self: &Arc<Self>, other: &Arc<TaskNode>) {
        let mut deps = self.dependencies.write().unwrap();
        if deps.iter().any(|d| Arc::ptr_eq(d, other)) {
            return;
        }
        deps.push(Arc::clone(other));
        drop(deps);

        other
            .reverse_dependencies
            .write()
            .unwrap()
            .push(Arc::clone(self));
        self.pending_count.fetch_add(1, Ordering::SeqCst);
    }

    /// Atomically decrement the pending-dependency count and return the new
    /// value. Called from worker threads during execution.
    pub fn dependency_finished(&self) -> usize {
        self.pending_count.fetch_sub(1, Ordering::SeqCst) - 1
    }

    pub fn pending_count(&self) -> usize {
        self.pending_count.load(Ordering::SeqCst)
    }

    pub fn dependencies(&self) -> Vec<Arc<TaskNode>> {
        self.dependencies.read().unwrap().clone()
    }

    pub fn reverse_dependencies(&self) -> Vec<Arc<TaskNode>> {
        self.reverse_dependencies.read().unwrap().clone()
    }

    /// A stable label for diagnostics: the rule's first declared output.
    pub fn label(&self) -> &str {
        self.payload.identity()
    }
}

impl std::fmt::Debug for TaskNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskNode").field("label", &self.label()).finish()
    }
}

/// Plan the minimal task graph needed to build `targets` out of `spec`.
///
/// Returns the created `TaskNode`s in creation order, which is a pure
/// function of `(spec, targets)`: identical inputs always yield an
/// identical sequence and identical dependency/reverse-dependency orderings.
pub fn plan(spec: &Spec, targets: &[String]) -> Result<Vec<Arc<TaskNode>>> {
    let rules_by_output = RulesByOutput::build(spec)?;

    let mut task_for_rule: HashMap<String, Arc<TaskNode>> = HashMap::new();
    let mut order: Vec<Arc<TaskNode>> = Vec::new();
    let mut on_stack: Vec<String> = Vec::new();

    for target in targets {
        ensure_task(
            &ArtifactPath::new(target.as_str()),
            &rules_by_output,
            &mut task_for_rule,
            &mut order,
            &mut on_stack,
        )?;
    }

    Ok(order)
}

fn ensure_task(
    target: &ArtifactPath,
    rules_by_output: &RulesByOutput,
    task_for_rule: &mut HashMap<String, Arc<TaskNode>>,
    order: &mut Vec<Arc<TaskNode>>,
    on_stack: &mut Vec<String>,
) -> Result<Option<Arc<TaskNode>>> {
    if !target.is_output() {
        debug!("source leaf, no task: {}", target);
        return Ok(None);
    }

    let rule = rules_by_output
        .get(target)
        .ok_or_else(|| HexmakeError::UnknownOutput(target.to_string()))?;
    let identity = rule.identity().to_string();

    if on_stack.contains(&identity) {
        let mut cycle = on_stack.clone();
        cycle.push(identity);
        return Err(HexmakeError::CycleDetected(cycle));
    }

    if let Some(existing) = task_for_rule.get(&identity) {
        return Ok(Some(Arc::clone(existing)));
    }

    on_stack.push(identity.clone());

    let node = Arc::new(TaskNode::new(rule.clone()));
    task_for_rule.insert(identity.clone(), Arc::clone(&node));
    order.push(Arc::clone(&node));

    for input in rule.inputs() {
        if let Some(dep) =
            ensure_task(&input, rules_by_output, task_for_rule, order, on_stack)?
        {
            node.add_dependency(&dep);
        }
    }

    on_stack.pop();

    Ok(Some(node))
}
