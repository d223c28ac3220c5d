use std::rc::{Rc, Weak};

/// Registered observers of one kind, held weakly.
///
/// Removal during a dispatch is staged in `just_removed` so the active
/// snapshot can drop the observer before its next callback.
pub(crate) struct ListenerList<L: ?Sized> {
    entries: Vec<Weak<L>>,
    just_removed: Vec<Weak<L>>,
    depth: usize,
}

impl<L: ?Sized> Default for ListenerList<L> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            just_removed: Vec::new(),
            depth: 0,
        }
    }
}

impl<L: ?Sized> ListenerList<L> {
    pub(crate) fn add(&mut self, listener: &Rc<L>) {
        self.entries.retain(|w| w.strong_count() > 0);
        let weak = Rc::downgrade(listener);
        self.just_removed.retain(|w| !Weak::ptr_eq(w, &weak));
        self.entries.push(weak);
    }

    pub(crate) fn remove(&mut self, listener: &Rc<L>) {
        let weak = Rc::downgrade(listener);
        if let Some(idx) = self.entries.iter().position(|w| Weak::ptr_eq(w, &weak)) {
            self.entries.remove(idx);
        }
        if self.depth > 0 {
            self.just_removed.push(weak);
        }
    }

    /// Live observers, in registration order.
    pub(crate) fn live(&self) -> Vec<Rc<L>> {
        self.entries.iter().filter_map(Weak::upgrade).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.iter().filter(|w| w.strong_count() > 0).count()
    }

    pub(crate) fn begin_dispatch(&mut self) -> Vec<Option<Rc<L>>> {
        if self.depth == 0 {
            self.just_removed.clear();
        }
        self.depth += 1;
        self.entries.iter().map(Weak::upgrade).collect()
    }

    /// Drops snapshot entries removed since the dispatch began.
    pub(crate) fn check_for_removal(&self, snapshot: &mut [Option<Rc<L>>]) {
        if self.just_removed.is_empty() {
            return;
        }
        for slot in snapshot.iter_mut() {
            let removed = slot.as_ref().is_some_and(|rc| {
                let weak = Rc::downgrade(rc);
                self.just_removed.iter().any(|w| Weak::ptr_eq(w, &weak))
            });
            if removed {
                *slot = None;
            }
        }
    }

    pub(crate) fn end_dispatch(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 {
            self.just_removed.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Named {
        fn name(&self) -> &str;
    }

    struct Tag(&'static str);

    impl Named for Tag {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_dead_listeners_are_skipped() {
        let mut list: ListenerList<dyn Named> = ListenerList::default();
        let a: Rc<dyn Named> = Rc::new(Tag("a"));
        {
            let b: Rc<dyn Named> = Rc::new(Tag("b"));
            list.add(&b);
        }
        list.add(&a);
        assert_eq!(list.len(), 1);
        let names: Vec<_> = list.live().iter().map(|l| l.name().to_string()).collect();
        assert_eq!(names, vec!["a"]);
    }

    #[test]
    fn test_removal_during_dispatch_clears_snapshot() {
        let mut list: ListenerList<dyn Named> = ListenerList::default();
        let a: Rc<dyn Named> = Rc::new(Tag("a"));
        let b: Rc<dyn Named> = Rc::new(Tag("b"));
        list.add(&a);
        list.add(&b);

        let mut snapshot = list.begin_dispatch();
        list.remove(&b);
        list.check_for_removal(&mut snapshot);
        assert!(snapshot[0].is_some());
        assert!(snapshot[1].is_none());
        list.end_dispatch();

        assert_eq!(list.len(), 1);
        // staging is reset once the dispatch ends
        let snapshot = list.begin_dispatch();
        assert_eq!(snapshot.len(), 1);
        list.end_dispatch();
    }

    #[test]
    fn test_readd_during_dispatch_unstages() {
        let mut list: ListenerList<dyn Named> = ListenerList::default();
        let a: Rc<dyn Named> = Rc::new(Tag("a"));
        list.add(&a);
        let mut snapshot = list.begin_dispatch();
        list.remove(&a);
        list.add(&a);
        list.check_for_removal(&mut snapshot);
        assert!(snapshot[0].is_some());
        list.end_dispatch();
    }
}
