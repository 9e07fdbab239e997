use crate::error::{Empty, Full};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// Fixed-capacity FIFO shared between the controller and the runways.
///
/// Every operation takes the lock once and releases it before returning, so
/// callers never observe the size outside `[0, capacity]`. Each successful
/// add or remove publishes the new length on a watch channel.
pub struct BoundedContainer<T> {
    items: Mutex<VecDeque<T>>,
    capacity: usize,
    len_tx: watch::Sender<usize>,
}

impl<T> BoundedContainer<T> {
    pub fn new(capacity: usize) -> BoundedContainer<T> {
        let (len_tx, _) = watch::channel(0);
        BoundedContainer {
            items: Mutex::new(VecDeque::new()),
            capacity,
            len_tx,
        }
    }

    fn items(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, len: usize) {
        self.len_tx.send_replace(len);
    }

    pub fn add(&self, item: T) -> Result<(), Full<T>> {
        let mut items = self.items();
        if items.len() >= self.capacity {
            return Err(Full(item));
        }
        items.push_back(item);
        self.publish(items.len());
        Ok(())
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn remove(&self) -> Result<T, Empty> {
        let mut items = self.items();
        let item = items.pop_front().ok_or(Empty)?;
        self.publish(items.len());
        Ok(item)
    }

    /// Removes the earliest item accepted by `eligible`, all under one lock.
    pub fn remove_first(&self, mut eligible: impl FnMut(&T) -> bool) -> Option<T> {
        let mut items = self.items();
        let idx = items.iter().position(|item| eligible(item))?;
        let item = items.remove(idx);
        self.publish(items.len());
        item
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Receiver that wakes on every change in length.
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.len_tx.subscribe()
    }
}

impl<T: Clone> BoundedContainer<T> {
    /// Copies the contents in queue order. The lock is held only for the copy.
    pub fn snapshot(&self) -> Vec<T> {
        self.items().iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_add_until_full() {
        let holding = BoundedContainer::new(2);
        assert!(holding.is_empty());
        holding.add(1).unwrap();
        holding.add(2).unwrap();
        assert!(holding.is_full());
        let Err(Full(rejected)) = holding.add(3) else {
            panic!("third add should be rejected");
        };
        assert_eq!(rejected, 3);
        assert_eq!(holding.snapshot(), vec![1, 2]);
    }

    #[test]
    fn test_large_capacity_is_not_preallocated() {
        let holding = BoundedContainer::<u8>::new(usize::MAX / 4);
        holding.add(1).unwrap();
        assert_eq!(holding.len(), 1);
        assert!(!holding.is_full());
    }

    #[test]
    fn test_remove_is_fifo() {
        let holding = BoundedContainer::new(3);
        holding.add("a").unwrap();
        holding.add("b").unwrap();
        assert_eq!(holding.remove(), Ok("a"));
        assert_eq!(holding.remove(), Ok("b"));
        assert_eq!(holding.remove(), Err(Empty));
    }

    #[test]
    fn test_remove_first_skips_ineligible() {
        let holding = BoundedContainer::new(4);
        for n in [1, 2, 3, 4] {
            holding.add(n).unwrap();
        }
        assert_eq!(holding.remove_first(|n| n % 2 == 0), Some(2));
        assert_eq!(holding.remove_first(|n| *n > 10), None);
        assert_eq!(holding.snapshot(), vec![1, 3, 4]);
    }

    #[test]
    fn test_subscribe_sees_length_changes() {
        let holding = BoundedContainer::new(2);
        let mut rx = holding.subscribe();
        holding.add(7).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 1);
        holding.remove().unwrap();
        assert_eq!(*rx.borrow_and_update(), 0);
    }

    #[test]
    fn test_concurrent_removers_never_share_items() {
        use std::sync::Arc;
        use std::thread;

        let holding = Arc::new(BoundedContainer::new(1000));
        for n in 0..1000 {
            holding.add(n).unwrap();
        }
        let handles = (0..8)
            .map(|_| {
                let holding = holding.clone();
                thread::spawn(move || {
                    let mut taken = vec![];
                    while let Ok(n) = holding.remove() {
                        taken.push(n);
                    }
                    taken
                })
            })
            .collect::<Vec<_>>();

        let mut all = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect::<Vec<_>>();
        all.sort();
        assert_eq!(all, (0..1000).collect::<Vec<_>>());
    }

    proptest! {
        #[test]
        fn test_size_stays_within_capacity(
            capacity in 1..8usize,
            ops in prop::collection::vec(any::<bool>(), 0..200)
        ) {
            let holding = BoundedContainer::new(capacity);
            let mut expected = 0usize;
            for add in ops {
                if add {
                    let accepted = holding.add(()).is_ok();
                    prop_assert_eq!(accepted, expected < capacity);
                    if accepted { expected += 1; }
                } else {
                    let removed = holding.remove().is_ok();
                    prop_assert_eq!(removed, expected > 0);
                    if removed { expected -= 1; }
                }
                prop_assert!(holding.len() <= capacity);
                prop_assert_eq!(holding.len(), expected);
                prop_assert_eq!(holding.is_full(), expected == capacity);
                prop_assert_eq!(holding.is_empty(), expected == 0);
            }
        }
    }
}
