//! Per-surface, per-kind identifier registry.

use crate::id::OverlayId;
use fmap_core::{MapError, OverlayHandle, OverlayKind};
use std::collections::HashMap;
use tracing::debug;

/// A controller that owns one native overlay.
pub trait OverlayController {
    /// Namespace the controller's identifiers live in.
    const KIND: OverlayKind;

    /// Handle of the wrapped native overlay.
    fn handle(&self) -> OverlayHandle;

    /// Detach the native overlay from the map. Consumes the controller, so
    /// it can only happen once.
    fn dispose(self);
}

/// Maps minted identifiers to overlay controllers of one kind.
///
/// Identifiers come from a monotonic counter and are never handed out twice,
/// even after the overlay they named has been removed.
pub struct IdentifierRegistry<C> {
    next_sequence: u64,
    entries: HashMap<OverlayId, C>,
}

impl<C: OverlayController> IdentifierRegistry<C> {
    pub fn new() -> Self {
        Self {
            next_sequence: 0,
            entries: HashMap::new(),
        }
    }

    /// Register a controller under a fresh identifier.
    pub fn insert(&mut self, controller: C) -> OverlayId {
        let id = OverlayId::mint(C::KIND, self.next_sequence);
        self.next_sequence += 1;
        debug!("Registered {} {} -> {}", C::KIND, id, controller.handle());
        self.entries.insert(id.clone(), controller);
        id
    }

    pub fn lookup(&self, id: &str) -> Result<&C, MapError> {
        self.entries.get(id).ok_or_else(|| not_found::<C>(id))
    }

    pub fn lookup_mut(&mut self, id: &str) -> Result<&mut C, MapError> {
        self.entries.get_mut(id).ok_or_else(|| not_found::<C>(id))
    }

    /// Unregister and hand back the controller for disposal.
    pub fn remove(&mut self, id: &str) -> Result<C, MapError> {
        self.entries.remove(id).ok_or_else(|| not_found::<C>(id))
    }

    /// Identifier of the controller wrapping `handle`.
    pub fn id_for_handle(&self, handle: OverlayHandle) -> Option<&OverlayId> {
        self.entries
            .iter()
            .find(|(_, controller)| controller.handle() == handle)
            .map(|(id, _)| id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of live overlays.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Live identifiers in mint order.
    pub fn ids(&self) -> Vec<OverlayId> {
        let mut ids: Vec<_> = self.entries.keys().cloned().collect();
        ids.sort_by_key(|id| sequence_of(id));
        ids
    }

    /// Remove every entry, leaving the counter untouched.
    pub fn drain(&mut self) -> Vec<(OverlayId, C)> {
        self.entries.drain().collect()
    }
}

impl<C: OverlayController> Default for IdentifierRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found<C: OverlayController>(id: &str) -> MapError {
    MapError::NotFound {
        kind: C::KIND,
        id: id.to_string(),
    }
}

fn sequence_of(id: &OverlayId) -> u64 {
    id.as_str()
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .parse()
        .unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashSet;
    use std::rc::Rc;

    struct FakeMarker {
        handle: OverlayHandle,
        disposed: Rc<Cell<u32>>,
    }

    impl OverlayController for FakeMarker {
        const KIND: OverlayKind = OverlayKind::Marker;

        fn handle(&self) -> OverlayHandle {
            self.handle
        }

        fn dispose(self) {
            self.disposed.set(self.disposed.get() + 1);
        }
    }

    fn fake(handle: u64, disposed: &Rc<Cell<u32>>) -> FakeMarker {
        FakeMarker {
            handle: OverlayHandle(handle),
            disposed: disposed.clone(),
        }
    }

    #[test]
    fn test_ids_are_sequential() {
        let disposed = Rc::new(Cell::new(0));
        let mut registry = IdentifierRegistry::new();
        assert_eq!(registry.insert(fake(1, &disposed)), "m0");
        assert_eq!(registry.insert(fake(2, &disposed)), "m1");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_remove_then_lookup_fails() {
        let disposed = Rc::new(Cell::new(0));
        let mut registry = IdentifierRegistry::new();
        let id = registry.insert(fake(1, &disposed));

        registry.remove(id.as_str()).unwrap().dispose();
        assert_eq!(disposed.get(), 1);
        assert!(matches!(
            registry.lookup(id.as_str()),
            Err(MapError::NotFound { kind: OverlayKind::Marker, .. })
        ));
        assert!(registry.remove(id.as_str()).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_ids_never_reused() {
        let disposed = Rc::new(Cell::new(0));
        let mut registry = IdentifierRegistry::new();
        let mut seen = HashSet::new();
        for round in 0..50u64 {
            let id = registry.insert(fake(round, &disposed));
            assert!(seen.insert(id.clone()), "identifier {id} handed out twice");
            if round % 3 != 0 {
                registry.remove(id.as_str()).unwrap().dispose();
            }
        }
        assert_eq!(registry.len(), 17);
        assert_eq!(disposed.get(), 33);
    }

    #[test]
    fn test_lookup_by_handle() {
        let disposed = Rc::new(Cell::new(0));
        let mut registry = IdentifierRegistry::new();
        registry.insert(fake(10, &disposed));
        let second = registry.insert(fake(11, &disposed));
        assert_eq!(registry.id_for_handle(OverlayHandle(11)), Some(&second));
        assert_eq!(registry.id_for_handle(OverlayHandle(99)), None);
    }

    #[test]
    fn test_ids_in_mint_order() {
        let disposed = Rc::new(Cell::new(0));
        let mut registry = IdentifierRegistry::new();
        for handle in 0..12 {
            registry.insert(fake(handle, &disposed));
        }
        registry.remove("m3").unwrap();
        let ids = registry.ids();
        assert_eq!(ids.len(), 11);
        assert_eq!(ids[0], "m0");
        assert_eq!(ids[3], "m4");
        assert_eq!(ids[10], "m11");
    }
}
