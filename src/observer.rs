//! Synchronous listener registry.
//!
//! Callbacks run on the caller's thread, in registration order, once per
//! [`Listeners::notify`] call. Each registration gets its own [`ListenerId`];
//! removing an id that is not (or no longer) registered does nothing.

use std::fmt;

/// Handle returned by a registration, used to unregister later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub struct Listeners<T: Copy> {
    next_id: u64,
    entries: Vec<(ListenerId, Box<dyn FnMut(T)>)>,
}

impl<T: Copy> Listeners<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, listener: impl FnMut(T) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(listener)));
        id
    }

    /// Returns `true` if a listener was actually removed.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(existing, _)| *existing != id);
        self.entries.len() != before
    }

    pub fn notify(&mut self, value: T) {
        for (_, listener) in self.entries.iter_mut() {
            listener(value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Copy> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("registered", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn notifies_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::new();

        for tag in ["a", "b", "c"] {
            let log = Rc::clone(&log);
            listeners.add(move |v: u32| log.borrow_mut().push((tag, v)));
        }
        listeners.notify(7);

        assert_eq!(*log.borrow(), vec![("a", 7), ("b", 7), ("c", 7)]);
    }

    #[test]
    fn removal_is_idempotent() {
        let hits = Rc::new(RefCell::new(0));
        let mut listeners = Listeners::new();
        let id = {
            let hits = Rc::clone(&hits);
            listeners.add(move |_: ()| *hits.borrow_mut() += 1)
        };

        assert!(listeners.remove(id));
        assert!(!listeners.remove(id));
        listeners.notify(());

        assert_eq!(*hits.borrow(), 0);
        assert!(listeners.is_empty());
    }

    #[test]
    fn same_closure_registered_twice_gets_distinct_ids() {
        let mut listeners = Listeners::new();
        let a = listeners.add(|_: u8| {});
        let b = listeners.add(|_: u8| {});

        assert_ne!(a, b);
        assert_eq!(listeners.len(), 2);
        listeners.remove(a);
        assert_eq!(listeners.len(), 1);
    }
}
