//! # Turn Scheduler
//!
//! Decides who acts next. Entities wait in FIFO queues keyed by an integer
//! turn key; [`Scheduler::next`] always serves the smallest key first.
//!
//! The key for a newly added entity is the current time plus the number of
//! distinct keys already scheduled. That is the whole initiative system:
//! actor speed does not enter into it.

use crate::{DelverError, DelverResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

/// Time-ordered multi-queue of schedulable entities.
///
/// # Examples
///
/// ```
/// use delver::Scheduler;
///
/// let mut scheduler = Scheduler::new();
/// scheduler.add(1u32).unwrap();
/// scheduler.add(2u32).unwrap();
///
/// assert_eq!(scheduler.next().unwrap(), 1);
/// assert_eq!(scheduler.current_time(), 0);
/// assert_eq!(scheduler.next().unwrap(), 2);
/// assert_eq!(scheduler.current_time(), 1);
/// assert!(scheduler.next().is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scheduler<T> {
    time: u64,
    queues: BTreeMap<u64, VecDeque<T>>,
}

impl<T> Scheduler<T>
where
    T: PartialEq + fmt::Debug,
{
    /// Creates an empty schedule at time zero.
    pub fn new() -> Self {
        Self {
            time: 0,
            queues: BTreeMap::new(),
        }
    }

    /// Schedules `entity` and returns the key it was placed under.
    ///
    /// Scheduling an entity that is already waiting is a bug in the caller and
    /// fails with [`DelverError::AlreadyScheduled`].
    pub fn add(&mut self, entity: T) -> DelverResult<u64> {
        if self.contains(&entity) {
            return Err(DelverError::AlreadyScheduled(format!("{:?}", entity)));
        }

        let key = self.time + self.queues.len() as u64;
        self.queues.entry(key).or_default().push_back(entity);
        Ok(key)
    }

    /// Unschedules `entity`, pruning its key if the queue empties.
    ///
    /// Returns false when the entity was not scheduled.
    pub fn remove(&mut self, entity: &T) -> bool {
        let found = self.queues.iter_mut().find_map(|(key, queue)| {
            queue
                .iter()
                .position(|queued| queued == entity)
                .map(|index| (*key, index))
        });

        let Some((key, index)) = found else {
            return false;
        };

        if let Some(queue) = self.queues.get_mut(&key) {
            queue.remove(index);
            if queue.is_empty() {
                self.queues.remove(&key);
            }
        }
        true
    }

    /// Takes the first entity of the earliest key and advances time to that key.
    ///
    /// Fails with [`DelverError::EmptySchedule`] when nothing is scheduled.
    pub fn next(&mut self) -> DelverResult<T> {
        let mut entry = self
            .queues
            .first_entry()
            .ok_or(DelverError::EmptySchedule)?;
        let key = *entry.key();

        let entity = entry.get_mut().pop_front().ok_or_else(|| {
            DelverError::InvalidState(format!("empty queue left at key {}", key))
        })?;
        if entry.get().is_empty() {
            entry.remove();
        }

        self.time = key;
        Ok(entity)
    }

    /// The key of the last entity served.
    pub fn current_time(&self) -> u64 {
        self.time
    }

    /// Clears every queue and rewinds time to zero.
    pub fn reset(&mut self) {
        self.time = 0;
        self.queues.clear();
    }

    /// Whether `entity` is waiting anywhere in the schedule.
    pub fn contains(&self, entity: &T) -> bool {
        self.queues.values().any(|queue| queue.contains(entity))
    }

    /// Total number of scheduled entities.
    pub fn len(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }

    /// Whether nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }

    /// Scheduled keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = u64> + '_ {
        self.queues.keys().copied()
    }

    /// Every scheduled entity in the order it would be served.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.queues.values().flat_map(|queue| queue.iter())
    }
}

impl<T> Default for Scheduler<T>
where
    T: PartialEq + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_formula() {
        let mut scheduler = Scheduler::new();
        assert_eq!(scheduler.add('a').unwrap(), 0);
        assert_eq!(scheduler.add('b').unwrap(), 1);
        assert_eq!(scheduler.add('c').unwrap(), 2);

        // Serving 'a' advances time to 0 and prunes key 0; two keys remain.
        assert_eq!(scheduler.next().unwrap(), 'a');
        assert_eq!(scheduler.add('a').unwrap(), 2);
        assert_eq!(scheduler.keys().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_fifo_within_key() {
        let mut scheduler = Scheduler::new();
        scheduler.add(1).unwrap(); // key 0
        scheduler.add(2).unwrap(); // key 1
        scheduler.next().unwrap(); // time 0, keys {1}
        scheduler.add(3).unwrap(); // key 0 + 1 = 1, shares with 2

        assert_eq!(scheduler.keys().collect::<Vec<_>>(), vec![1]);
        assert_eq!(scheduler.next().unwrap(), 2);
        assert_eq!(scheduler.next().unwrap(), 3);
        assert_eq!(scheduler.current_time(), 1);
    }

    #[test]
    fn test_remove_prunes_empty_keys() {
        let mut scheduler = Scheduler::new();
        scheduler.add("kobold").unwrap();
        scheduler.add("rat").unwrap();
        assert!(scheduler.remove(&"kobold"));
        assert_eq!(scheduler.keys().collect::<Vec<_>>(), vec![1]);
        assert!(!scheduler.contains(&"kobold"));
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut scheduler = Scheduler::new();
        scheduler.add(7).unwrap();
        assert!(!scheduler.remove(&8));
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_double_add_is_rejected() {
        let mut scheduler = Scheduler::new();
        scheduler.add(7).unwrap();
        assert!(matches!(
            scheduler.add(7),
            Err(DelverError::AlreadyScheduled(_))
        ));
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_next_on_empty_schedule() {
        let mut scheduler: Scheduler<u32> = Scheduler::new();
        assert!(matches!(scheduler.next(), Err(DelverError::EmptySchedule)));
    }

    #[test]
    fn test_reset() {
        let mut scheduler = Scheduler::new();
        scheduler.add(1).unwrap();
        scheduler.add(2).unwrap();
        scheduler.next().unwrap();
        scheduler.next().unwrap();
        assert_eq!(scheduler.current_time(), 1);

        scheduler.add(3).unwrap();
        scheduler.reset();
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.current_time(), 0);
    }

    #[test]
    fn test_requeue_cycle_alternates() {
        let mut scheduler = Scheduler::new();
        scheduler.add("player").unwrap();
        scheduler.add("monster").unwrap();

        let mut order = Vec::new();
        for _ in 0..6 {
            let next = scheduler.next().unwrap();
            order.push(next);
            scheduler.add(next).unwrap();
        }
        assert_eq!(
            order,
            vec!["player", "monster", "player", "monster", "player", "monster"]
        );
    }

    #[test]
    fn test_iter_in_service_order() {
        let mut scheduler = Scheduler::new();
        scheduler.add(10).unwrap();
        scheduler.add(20).unwrap();
        scheduler.add(30).unwrap();
        assert_eq!(scheduler.iter().copied().collect::<Vec<_>>(), vec![10, 20, 30]);
    }
}
