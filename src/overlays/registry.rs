use crate::{core::types::OverlayId, prelude::HashMap};

/// Wrappers that own native resources implement this so the registry can
/// tear them down before forgetting them.
pub(crate) trait Destroy {
    /// Unhooks native listeners, detaches and releases the native object,
    /// clears the tag and nulls the id.
    fn destroy(&mut self);
}

/// One map's overlays of a single kind, keyed by the caller's id
pub(crate) struct OverlayRegistry<W> {
    overlays: HashMap<OverlayId, W>,
}

impl<W: Destroy> OverlayRegistry<W> {
    pub fn new() -> Self {
        Self {
            overlays: HashMap::default(),
        }
    }

    /// Adds a wrapper. The caller must have destroyed any previous wrapper
    /// under the same id.
    pub fn insert(&mut self, id: OverlayId, wrapper: W) -> &mut W {
        debug_assert!(
            !self.overlays.contains_key(&id),
            "overlay {} registered twice",
            id
        );
        self.overlays.entry(id).or_insert(wrapper)
    }

    pub fn get(&self, id: &OverlayId) -> Option<&W> {
        self.overlays.get(id)
    }

    pub fn get_mut(&mut self, id: &OverlayId) -> Option<&mut W> {
        self.overlays.get_mut(id)
    }

    pub fn contains(&self, id: &OverlayId) -> bool {
        self.overlays.contains_key(id)
    }

    /// Destroys the wrapper and removes it. Returns false for an unknown id.
    pub fn destroy(&mut self, id: &OverlayId) -> bool {
        match self.overlays.get_mut(id) {
            Some(wrapper) => {
                wrapper.destroy();
                self.overlays.remove(id);
                true
            }
            None => false,
        }
    }

    pub fn destroy_all(&mut self) {
        for wrapper in self.overlays.values_mut() {
            wrapper.destroy();
        }
        self.overlays.clear();
    }

    pub fn ids(&self) -> Vec<OverlayId> {
        self.overlays.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }
}

impl<W: Destroy> Default for OverlayRegistry<W> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    struct Counted {
        id: Option<OverlayId>,
        destroyed: Arc<AtomicUsize>,
    }

    impl Destroy for Counted {
        fn destroy(&mut self) {
            self.id = None;
            self.destroyed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn counted(id: &str, counter: &Arc<AtomicUsize>) -> Counted {
        Counted {
            id: Some(OverlayId::from(id)),
            destroyed: counter.clone(),
        }
    }

    #[test]
    fn test_destroy_removes_and_tears_down() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut registry = OverlayRegistry::new();
        registry.insert(OverlayId::from("a"), counted("a", &counter));
        registry.insert(OverlayId::from("b"), counted("b", &counter));

        assert!(registry.destroy(&OverlayId::from("a")));
        assert!(!registry.destroy(&OverlayId::from("a")));
        assert!(!registry.contains(&OverlayId::from("a")));
        assert_eq!(registry.len(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(registry.get(&OverlayId::from("b")).unwrap().id.is_some());
    }

    #[test]
    fn test_destroy_all() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut registry = OverlayRegistry::new();
        for id in ["a", "b", "c"] {
            registry.insert(OverlayId::from(id), counted(id, &counter));
        }

        registry.destroy_all();
        assert!(registry.is_empty());
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }
}
