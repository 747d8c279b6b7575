use std::sync::{Arc, Mutex, MutexGuard};

use crate::render::renderer::RenderedNode;

/// Lock a mutex, recovering the data if another holder panicked.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResultRegion {
    nodes: Vec<RenderedNode>,
}

impl ResultRegion {
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn append(&mut self, node: RenderedNode) {
        self.nodes.push(node);
    }

    pub fn nodes(&self) -> &[RenderedNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct LoadingIndicator {
    visible: bool,
}

impl LoadingIndicator {
    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ErrorRegion {
    text: String,
}

impl ErrorRegion {
    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// The three display regions inside one upload form.
///
/// Clones share the same regions, so the page can keep a handle while the
/// form's handler writes to them.
#[derive(Debug, Default, Clone)]
pub struct FormRegions {
    pub result: Arc<Mutex<ResultRegion>>,
    pub loading: Arc<Mutex<LoadingIndicator>>,
    pub error: Arc<Mutex<ErrorRegion>>,
}

/// Point-in-time copy of a form's regions.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSnapshot {
    pub result: Vec<RenderedNode>,
    pub loading_visible: bool,
    pub error_text: String,
}

impl FormRegions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loading_visible(&self) -> bool {
        lock(&self.loading).is_visible()
    }

    pub fn error_text(&self) -> String {
        lock(&self.error).text().to_string()
    }

    pub fn result_nodes(&self) -> Vec<RenderedNode> {
        lock(&self.result).nodes().to_vec()
    }

    pub fn snapshot(&self) -> RegionSnapshot {
        RegionSnapshot {
            result: self.result_nodes(),
            loading_visible: self.loading_visible(),
            error_text: self.error_text(),
        }
    }
}
