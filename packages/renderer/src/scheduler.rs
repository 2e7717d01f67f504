use crate::external::{Diagnostic, ExternalRenderer, RenderedMarkup};
use notedown_parser::DiagramKind;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// One render request payload for the external renderer.
#[derive(Debug, Clone)]
pub enum RenderJob {
    Diagram { kind: DiagramKind, source: String },
    Math { source: String },
}

impl RenderJob {
    pub fn source(&self) -> &str {
        match self {
            RenderJob::Diagram { source, .. } | RenderJob::Math { source } => source,
        }
    }
}

/// Completion message sent back by a render task.
#[derive(Debug)]
pub struct RenderCompletion {
    pub node_id: String,
    pub generation: u64,
    pub content_hash: u32,
    pub job: RenderJob,
    pub result: Result<RenderedMarkup, Diagnostic>,
}

/// Asynchronous, cancellable render requests for diagram/math nodes.
///
/// Each node carries a generation counter: a new request supersedes any
/// in-flight one, and completions whose generation (or content hash) no
/// longer matches are dropped before they reach the cache. Keystroke
/// handling therefore never waits on the external renderer.
pub struct RenderScheduler {
    renderer: Arc<dyn ExternalRenderer>,
    generations: HashMap<String, u64>,
    tx: mpsc::UnboundedSender<RenderCompletion>,
    rx: mpsc::UnboundedReceiver<RenderCompletion>,
}

impl RenderScheduler {
    pub fn new(renderer: Arc<dyn ExternalRenderer>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            renderer,
            generations: HashMap::new(),
            tx,
            rx,
        }
    }

    /// Issue a render request for a node, superseding any in-flight one.
    pub fn request(&mut self, node_id: &str, content_hash: u32, job: RenderJob) {
        let generation = self
            .generations
            .entry(node_id.to_string())
            .and_modify(|g| *g += 1)
            .or_insert(1);
        let generation = *generation;

        debug!(node_id, generation, "scheduling external render");

        let renderer = self.renderer.clone();
        let tx = self.tx.clone();
        let node_id = node_id.to_string();

        let run = move || {
            let result = match &job {
                RenderJob::Diagram { kind, source } => renderer.render_diagram(*kind, source),
                RenderJob::Math { source } => renderer.render_math(source),
            };
            let _ = tx.send(RenderCompletion {
                node_id,
                generation,
                content_hash,
                job,
                result,
            });
        };

        // Off the edit-handling path when a runtime is available; inline
        // otherwise (headless/CLI callers without an executor).
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(run);
            }
            Err(_) => run(),
        }
    }

    /// Next settled completion, if any. Non-blocking.
    pub fn try_recv(&mut self) -> Option<RenderCompletion> {
        self.rx.try_recv().ok()
    }

    /// Whether a completion's generation is still the latest for its node.
    pub fn is_current(&self, node_id: &str, generation: u64) -> bool {
        self.generations.get(node_id) == Some(&generation)
    }

    /// Drop generation tracking for a removed node; any in-flight result
    /// for it becomes stale.
    pub fn forget(&mut self, node_id: &str) {
        self.generations.remove(node_id);
    }

    pub fn clear(&mut self) {
        self.generations.clear();
        while self.rx.try_recv().is_ok() {}
    }
}
