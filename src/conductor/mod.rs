//! Runs a planned task graph with bounded parallelism: a worker pool pulls
//! ready tasks off a blocking queue, dependency-driven readiness feeds new
//! tasks back onto that queue as each task completes, and the whole run
//! aborts promptly (but does not kill in-flight work) on the first failure.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use tracing::{error, info};

use crate::executor::RuleExecutor;
use crate::planner::TaskNode;
use crate::sandbox::SandboxManager;

enum Item {
    Task(Arc<TaskNode>),
    Shutdown,
}

/// A blocking FIFO shared between the conductor and its workers.
struct ReadyQueue {
    items: Mutex<VecDeque<Item>>,
    condvar: Condvar,
}

impl ReadyQueue {
    fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            condvar: Condvar::new(),
        }
    }

    fn push(&self, item: Item) {
        self.items.lock().unwrap().push_back(item);
        self.condvar.notify_one();
    }

    fn pop(&self) -> Item {
        let mut items = self.items.lock().unwrap();
        loop {
            if let Some(item) = items.pop_front() {
                return item;
            }
            items = self.condvar.wait(items).unwrap();
        }
    }
}

/// A classic counting semaphore, used here purely to let the main thread
/// count task completions without polling.
struct CompletionSignal {
    permits: Mutex<usize>,
    condvar: Condvar,
}

impl CompletionSignal {
    fn new() -> Self {
        Self {
            permits: Mutex::new(0),
            condvar: Condvar::new(),
        }
    }

    fn release(&self) {
        let mut permits = self.permits.lock().unwrap();
        *permits += 1;
        self.condvar.notify_one();
    }

    fn acquire(&self) {
        let mut permits = self.permits.lock().unwrap();
        while *permits == 0 {
            permits = self.condvar.wait(permits).unwrap();
        }
        *permits -= 1;
    }
}

pub struct Conductor<'a> {
    workspace_root: &'a Path,
    sandbox_mgr: &'a SandboxManager,
    jobs: usize,
}

impl<'a> Conductor<'a> {
    pub fn new(workspace_root: &'a Path, sandbox_mgr: &'a SandboxManager, jobs: usize) -> Self {
        Self {
            workspace_root,
            sandbox_mgr,
            jobs: jobs.max(1),
        }
    }

    /// Run every node in `nodes` to completion or first failure. Returns
    /// `true` iff every task succeeded.
    pub fn run(&self, nodes: &[Arc<TaskNode>]) -> bool {
        if nodes.is_empty() {
            return true;
        }

        let queue = Arc::new(ReadyQueue::new());
        let completion = Arc::new(CompletionSignal::new());
        let any_failed = Arc::new(AtomicBool::new(false));

        for node in nodes {
            if node.pending_count() == 0 {
                queue.push(Item::Task(Arc::clone(node)));
            }
        }

        std::thread::scope(|scope| {
            for worker_id in 0..self.jobs {
                let queue = Arc::clone(&queue);
                let completion = Arc::clone(&completion);
                let any_failed = Arc::clone(&any_failed);
                scope.spawn(move || {
                    self.worker_loop(worker_id, &queue, &completion, &any_failed);
                });
            }

            for _ in 0..nodes.len() {
                completion.acquire();
                if any_failed.load(Ordering::SeqCst) {
                    break;
                }
            }

            if !any_failed.load(Ordering::SeqCst) {
                queue.push(Item::Shutdown);
            }
        });

        !any_failed.load(Ordering::SeqCst)
    }

    fn worker_loop(
        &self,
        worker_id: usize,
        queue: &ReadyQueue,
        completion: &CompletionSignal,
        any_failed: &AtomicBool,
    ) {
        loop {
            match queue.pop() {
                Item::Shutdown => {
                    queue.push(Item::Shutdown);
                    return;
                }
                Item::Task(node) => {
                    // Once a failure has been recorded, no task is dispatched
                    // off the ready queue anymore — only the subprocess(es)
                    // already running past this point finish naturally.
                    if any_failed.load(Ordering::SeqCst) {
                        queue.push(Item::Shutdown);
                        return;
                    }

                    let label = node.label().to_string();
                    info!(worker = worker_id, task = %label, "running");

                    let executor = RuleExecutor::new(self.workspace_root, self.sandbox_mgr);
                    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                        executor.run(&node.payload)
                    }));

                    match result {
                        Ok(Ok(())) => {
                            completion.release();
                            for dependent in node.reverse_dependencies() {
                                if dependent.dependency_finished() == 0 {
                                    queue.push(Item::Task(dependent));
                                }
                            }
                        }
                        Ok(Err(e)) => {
                            error!(task = %label, error = %e, "task failed");
                            any_failed.store(true, Ordering::SeqCst);
                            queue.push(Item::Shutdown);
                            completion.release();
                            return;
                        }
                        Err(_) => {
                            error!(task = %label, "task panicked");
                            any_failed.store(true, Ordering::SeqCst);
                            queue.push(Item::Shutdown);
                            completion.release();
                            return;
                        }
                    }
                }
            }
        }
    }
}
