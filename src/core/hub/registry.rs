//=========================================================================
// Observer Registry
//=========================================================================
//
// Index-stable arena of non-owning observer references.
//
// Architecture:
//   slots: Vec<Slot>       slot index + generation → Weak<observer>
//   free:  Vec<u32>        reusable slot indices
//   order: Vec<Handle>     live handles in registration order
//
// A handle stays valid until its entry is removed. Removing bumps the
// slot generation, so a stale handle never aliases a later registration.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::ptr;
use std::rc::Weak;

//=== Internal Dependencies ===============================================

use crate::core::observer::StateObserver;

//=== ObserverHandle ======================================================

/// Key identifying one registration with a [`StateHub`].
///
/// Registering the same observer twice yields two distinct handles.
///
/// [`StateHub`]: super::StateHub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverHandle {
    slot: u32,
    generation: u32,
}

/// Non-owning reference held by the registry.
pub(crate) type ObserverRef = Weak<RefCell<dyn StateObserver>>;

struct Slot {
    generation: u32,
    entry: Option<ObserverRef>,
}

//=== ObserverRegistry ====================================================

pub(crate) struct ObserverRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    order: Vec<ObserverHandle>,
}

impl ObserverRegistry {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            order: Vec::new(),
        }
    }

    //--- Mutation ---------------------------------------------------------

    /// Appends an entry at the end of the registration order.
    pub(crate) fn insert(&mut self, observer: ObserverRef) -> ObserverHandle {
        let slot = match self.free.pop() {
            Some(index) => {
                self.slots[index as usize].entry = Some(observer);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    entry: Some(observer),
                });
                (self.slots.len() - 1) as u32
            }
        };

        let handle = ObserverHandle {
            slot,
            generation: self.slots[slot as usize].generation,
        };
        self.order.push(handle);
        handle
    }

    /// Removes the entry behind `handle`. Returns false for stale handles.
    pub(crate) fn remove(&mut self, handle: ObserverHandle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.slot as usize) else {
            return false;
        };
        if slot.generation != handle.generation || slot.entry.is_none() {
            return false;
        }

        slot.entry = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.slot);

        if let Some(pos) = self.order.iter().position(|&h| h == handle) {
            self.order.remove(pos);
        }
        true
    }

    /// Removes entries whose observer has been dropped.
    pub(crate) fn prune_dropped(&mut self) -> usize {
        let dead: Vec<ObserverHandle> = self
            .order
            .iter()
            .copied()
            .filter(|&h| self.get(h).is_some_and(|w| w.strong_count() == 0))
            .collect();

        for &handle in &dead {
            self.remove(handle);
        }
        dead.len()
    }

    //--- Queries ----------------------------------------------------------

    pub(crate) fn get(&self, handle: ObserverHandle) -> Option<&ObserverRef> {
        self.slots
            .get(handle.slot as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.entry.as_ref())
    }

    pub(crate) fn contains(&self, handle: ObserverHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Finds the earliest registration pointing at the observer at `target`.
    pub(crate) fn find_first<T: ?Sized>(&self, target: *const T) -> Option<ObserverHandle> {
        self.order.iter().copied().find(|&handle| {
            self.get(handle)
                .and_then(Weak::upgrade)
                .is_some_and(|rc| ptr::addr_eq(std::rc::Rc::as_ptr(&rc), target))
        })
    }

    /// Copies the live entries in registration order.
    pub(crate) fn snapshot(&self) -> Vec<(ObserverHandle, ObserverRef)> {
        self.order
            .iter()
            .filter_map(|&handle| self.get(handle).map(|w| (handle, w.clone())))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    struct Quiet;

    impl StateObserver for Quiet {}

    fn observer() -> Rc<RefCell<dyn StateObserver>> {
        Rc::new(RefCell::new(Quiet))
    }

    #[test]
    fn insert_preserves_registration_order() {
        let mut registry = ObserverRegistry::new();
        let a = observer();
        let b = observer();

        let ha = registry.insert(Rc::downgrade(&a));
        let hb = registry.insert(Rc::downgrade(&b));

        let order: Vec<ObserverHandle> = registry.snapshot().into_iter().map(|(h, _)| h).collect();
        assert_eq!(order, vec![ha, hb]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn removed_handle_is_stale_after_slot_reuse() {
        let mut registry = ObserverRegistry::new();
        let a = observer();
        let b = observer();

        let ha = registry.insert(Rc::downgrade(&a));
        assert!(registry.remove(ha));

        let hb = registry.insert(Rc::downgrade(&b));
        assert_eq!(hb.slot, ha.slot);
        assert_ne!(hb, ha);

        assert!(!registry.contains(ha));
        assert!(!registry.remove(ha));
        assert!(registry.contains(hb));
    }

    #[test]
    fn reused_slot_goes_to_end_of_order() {
        let mut registry = ObserverRegistry::new();
        let a = observer();
        let b = observer();
        let c = observer();

        let ha = registry.insert(Rc::downgrade(&a));
        let hb = registry.insert(Rc::downgrade(&b));
        registry.remove(ha);
        let hc = registry.insert(Rc::downgrade(&c));

        let order: Vec<ObserverHandle> = registry.snapshot().into_iter().map(|(h, _)| h).collect();
        assert_eq!(order, vec![hb, hc]);
    }

    #[test]
    fn find_first_returns_earliest_duplicate() {
        let mut registry = ObserverRegistry::new();
        let a = observer();
        let b = observer();

        let first = registry.insert(Rc::downgrade(&a));
        registry.insert(Rc::downgrade(&b));
        registry.insert(Rc::downgrade(&a));

        assert_eq!(registry.find_first(Rc::as_ptr(&a)), Some(first));
        assert_eq!(registry.find_first(Rc::as_ptr(&observer())), None);
    }

    #[test]
    fn prune_removes_dropped_observers() {
        let mut registry = ObserverRegistry::new();
        let a = observer();
        let b = observer();

        registry.insert(Rc::downgrade(&a));
        let hb = registry.insert(Rc::downgrade(&b));
        drop(a);

        assert_eq!(registry.prune_dropped(), 1);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(hb));
    }
}
