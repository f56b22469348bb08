//! Scoped registrations
//!
//! Everything a session attaches to the outside world (event listeners,
//! an immersive display session) is recorded here and released in reverse
//! order on teardown, or on drop if teardown never ran.

/// A resource that can be detached exactly once
pub trait Release {
    fn release(self);
}

struct Entry {
    name: &'static str,
    release: Box<dyn FnOnce()>,
}

#[derive(Default)]
pub struct Registrations {
    entries: Vec<Entry>,
}

impl std::fmt::Debug for Registrations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| e.name))
            .finish()
    }
}

impl Registrations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `release` at teardown
    pub fn on_release(&mut self, name: &'static str, release: impl FnOnce() + 'static) {
        self.entries.push(Entry {
            name,
            release: Box::new(release),
        });
    }

    /// Keep a guard alive until teardown
    pub fn hold<R: Release + 'static>(&mut self, name: &'static str, guard: R) {
        self.on_release(name, move || guard.release());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Release everything, newest first. Returns how many were released.
    pub fn release_all(&mut self) -> usize {
        let count = self.entries.len();
        while let Some(entry) = self.entries.pop() {
            log::debug!("Releasing {}", entry.name);
            (entry.release)();
        }
        count
    }
}

impl Drop for Registrations {
    fn drop(&mut self) {
        self.release_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Guard {
        id: u32,
        log: Rc<RefCell<Vec<u32>>>,
    }

    impl Release for Guard {
        fn release(self) {
            self.log.borrow_mut().push(self.id);
        }
    }

    #[test]
    fn test_releases_in_reverse_order_once() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut regs = Registrations::new();
        for id in 1..=3 {
            regs.hold("guard", Guard { id, log: log.clone() });
        }
        assert_eq!(regs.release_all(), 3);
        assert_eq!(regs.release_all(), 0);
        assert_eq!(*log.borrow(), vec![3, 2, 1]);
    }

    #[test]
    fn test_drop_releases_leftovers() {
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let mut regs = Registrations::new();
            let l = log.clone();
            regs.on_release("closure", move || l.borrow_mut().push(9));
        }
        assert_eq!(*log.borrow(), vec![9]);
    }
}
