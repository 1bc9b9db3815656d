//! Persisted dashboard layout.
//!
//! The layout is loaded once when a dashboard mounts and saved on every
//! change, always through a [`LayoutStore`].

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::{Path, PathBuf};

/// Widgets every dashboard starts with, in default order.
pub const DEFAULT_WIDGETS: [&str; 6] = [
    "total-items",
    "total-value",
    "average-value",
    "items-by-status",
    "trend",
    "recent-items",
];

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetSize {
    Small,
    #[default]
    Medium,
    Large,
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetLayout {
    pub id: String,
    #[serde(default)]
    pub size: WidgetSize,
    #[serde(default)]
    pub hidden: bool,
}

impl WidgetLayout {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            size: WidgetSize::default(),
            hidden: false,
        }
    }
}

/// Widget order and sizes for one dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardLayout {
    pub widgets: Vec<WidgetLayout>,
}

impl Default for DashboardLayout {
    fn default() -> Self {
        Self {
            widgets: DEFAULT_WIDGETS.iter().map(|id| WidgetLayout::new(*id)).collect(),
        }
    }
}

impl DashboardLayout {
    pub fn widget(&self, id: &str) -> Option<&WidgetLayout> {
        self.widgets.iter().find(|w| w.id == id)
    }

    pub fn order(&self) -> Vec<&str> {
        self.widgets.iter().map(|w| w.id.as_str()).collect()
    }

    pub fn visible_widgets(&self) -> impl Iterator<Item = &WidgetLayout> {
        self.widgets.iter().filter(|w| !w.hidden)
    }

    /// Move a widget to `index` (clamped). Returns `false` if unknown.
    pub fn move_widget(&mut self, id: &str, index: usize) -> bool {
        let Some(from) = self.widgets.iter().position(|w| w.id == id) else {
            return false;
        };
        let widget = self.widgets.remove(from);
        let to = index.min(self.widgets.len());
        self.widgets.insert(to, widget);
        true
    }

    pub fn resize(&mut self, id: &str, size: WidgetSize) -> bool {
        match self.widgets.iter_mut().find(|w| w.id == id) {
            Some(widget) => {
                widget.size = size;
                true
            }
            None => false,
        }
    }

    pub fn set_hidden(&mut self, id: &str, hidden: bool) -> bool {
        match self.widgets.iter_mut().find(|w| w.id == id) {
            Some(widget) => {
                widget.hidden = hidden;
                true
            }
            None => false,
        }
    }

    /// Drop duplicate and unknown widgets, append missing defaults.
    pub fn normalize(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.widgets
            .retain(|w| DEFAULT_WIDGETS.contains(&w.id.as_str()) && seen.insert(w.id.clone()));
        for id in DEFAULT_WIDGETS {
            if !seen.contains(id) {
                self.widgets.push(WidgetLayout::new(id));
            }
        }
    }
}

// ============================================================================
// STORES
// ============================================================================

/// Load/save boundary for layout state.
pub trait LayoutStore {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<DashboardLayout>, LayoutError>;
    fn save(&self, layout: &DashboardLayout) -> Result<(), LayoutError>;
}

/// Layout on mount: the stored one, normalized, or the default. Store
/// failures fall back to the default.
pub fn load_or_default(store: &dyn LayoutStore) -> DashboardLayout {
    match store.load() {
        Ok(Some(mut layout)) => {
            layout.normalize();
            layout
        }
        Ok(None) => DashboardLayout::default(),
        Err(err) => {
            tracing::warn!(%err, "Failed to load dashboard layout, using default");
            DashboardLayout::default()
        }
    }
}

/// JSON file store.
#[derive(Debug, Clone)]
pub struct FileLayoutStore {
    path: PathBuf,
}

impl FileLayoutStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LayoutStore for FileLayoutStore {
    fn load(&self) -> Result<Option<DashboardLayout>, LayoutError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let layout = serde_json::from_str::<DashboardLayout>(&contents)?;
        Ok(Some(layout))
    }

    fn save(&self, layout: &DashboardLayout) -> Result<(), LayoutError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(layout)?;
        std::fs::write(&self.path, contents)?;
        tracing::debug!(path = %self.path.display(), "Dashboard layout saved");
        Ok(())
    }
}

/// In-memory store for tests and embedders without storage.
#[derive(Debug, Default)]
pub struct MemoryLayoutStore {
    saved: RefCell<Option<DashboardLayout>>,
}

impl LayoutStore for MemoryLayoutStore {
    fn load(&self) -> Result<Option<DashboardLayout>, LayoutError> {
        Ok(self.saved.borrow().clone())
    }

    fn save(&self, layout: &DashboardLayout) -> Result<(), LayoutError> {
        *self.saved.borrow_mut() = Some(layout.clone());
        Ok(())
    }
}
