//! The element a map is drawn into

use std::sync::Mutex;

/// The surface hosting a map. When the native library cannot be loaded the
/// adapter puts explanatory text here instead of leaving it blank.
pub trait MapContainer: Send + Sync {
    fn show_placeholder(&self, text: &str);

    fn clear_placeholder(&self);
}

/// Container that just remembers what it was asked to show
#[derive(Debug, Default)]
pub struct HeadlessContainer {
    placeholder: Mutex<Option<String>>,
}

impl HeadlessContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn placeholder(&self) -> Option<String> {
        self.placeholder.lock().ok().and_then(|p| p.clone())
    }
}

impl MapContainer for HeadlessContainer {
    fn show_placeholder(&self, text: &str) {
        if let Ok(mut placeholder) = self.placeholder.lock() {
            *placeholder = Some(text.to_string());
        }
    }

    fn clear_placeholder(&self) {
        if let Ok(mut placeholder) = self.placeholder.lock() {
            *placeholder = None;
        }
    }
}
