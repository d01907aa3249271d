//! Update callback queue.

use std::cell::RefCell;

use crate::transition::Transition;

/// Ordered list of transitions whose update callback is due.
///
/// A transition appears at most once. [`drain`](Self::drain) hands back
/// every entry and leaves the queue empty before any callback runs, so a
/// callback that schedules more work lands in the next flush.
#[derive(Debug, Default)]
pub(crate) struct UpdateCallbackQueue {
    entries: RefCell<Vec<Transition>>,
}

impl UpdateCallbackQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends `transition` unless it is already queued.
    pub(crate) fn push(&self, transition: &Transition) -> bool {
        let mut entries = self.entries.borrow_mut();
        if entries.contains(transition) {
            return false;
        }
        entries.push(transition.clone());
        true
    }

    /// Empties the queue, returning its entries in append order.
    pub(crate) fn drain(&self) -> Vec<Transition> {
        std::mem::take(&mut *self.entries.borrow_mut())
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Weak;

    use super::*;
    use crate::event_loop::EventLoop;
    use crate::transition::UpdateCallback;

    fn transition(el: &EventLoop, id: u64) -> Transition {
        Transition::new(id, el, Weak::new(), UpdateCallback::noop(), Vec::new())
    }

    #[test]
    fn test_drain_preserves_order_and_empties() {
        let el = EventLoop::default();
        let queue = UpdateCallbackQueue::new();
        let (a, b, c) = (transition(&el, 1), transition(&el, 2), transition(&el, 3));

        assert!(queue.push(&a));
        assert!(queue.push(&b));
        assert!(queue.push(&c));
        assert_eq!(queue.len(), 3);

        let ids: Vec<_> = queue.drain().iter().map(Transition::id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(queue.len(), 0);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_push_dedupes_by_identity() {
        let el = EventLoop::default();
        let queue = UpdateCallbackQueue::new();
        let a = transition(&el, 1);
        let same_id = transition(&el, 1);

        assert!(queue.push(&a));
        assert!(!queue.push(&a.clone()));
        assert!(queue.push(&same_id));
        assert_eq!(queue.len(), 2);
    }
}
