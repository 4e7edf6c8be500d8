//! Keyed storage for budget trackers.
//!
//! The map itself sits behind one lock and each tracker behind its own,
//! so work on one entity never blocks another.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use delvers_core::error::TurnError;
use delvers_core::sync;

/// Trackers of one kind, keyed by entity id.
#[derive(Debug)]
pub struct BudgetRegistry<T> {
    entity: &'static str,
    entries: RwLock<BTreeMap<String, Arc<RwLock<T>>>>,
}

impl<T> BudgetRegistry<T> {
    /// An empty registry. `entity` names the tracked kind in errors.
    #[must_use]
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// The tracker for `id`, if one exists.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<RwLock<T>>> {
        sync::read(&self.entries).get(id).cloned()
    }

    /// The tracker for `id`, created with `create` when missing.
    pub fn get_or_insert_with(&self, id: &str, create: impl FnOnce() -> T) -> Arc<RwLock<T>> {
        if let Some(existing) = self.get(id) {
            return existing;
        }
        let mut entries = sync::write(&self.entries);
        Arc::clone(
            entries
                .entry(id.to_owned())
                .or_insert_with(|| Arc::new(RwLock::new(create()))),
        )
    }

    /// Stores `tracker` under `id` unless the id is taken. The check and
    /// the insert share one write lock.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::Validation` if a tracker already exists for `id`.
    pub fn try_insert(&self, id: impl Into<String>, tracker: T) -> Result<(), TurnError> {
        let id = id.into();
        let mut entries = sync::write(&self.entries);
        if entries.contains_key(&id) {
            return Err(TurnError::Validation(format!(
                "{} {id} already exists",
                self.entity
            )));
        }
        entries.insert(id, Arc::new(RwLock::new(tracker)));
        Ok(())
    }

    /// Removes the tracker for `id`. Returns whether one existed.
    pub fn remove(&self, id: &str) -> bool {
        sync::write(&self.entries).remove(id).is_some()
    }

    /// Tracked ids in sorted order.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        sync::read(&self.entries).keys().cloned().collect()
    }

    /// Number of trackers.
    #[must_use]
    pub fn len(&self) -> usize {
        sync::read(&self.entries).len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs `f` on the tracker for `id` under its read lock.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::NotFound` if no tracker exists for `id`.
    pub fn read<R>(&self, id: &str, f: impl FnOnce(&T) -> R) -> Result<R, TurnError> {
        let tracker = self.get(id).ok_or_else(|| TurnError::not_found(self.entity, id))?;
        let guard = sync::read(tracker.as_ref());
        Ok(f(&*guard))
    }

    /// Runs `f` on the tracker for `id` under its write lock.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::NotFound` if no tracker exists for `id`.
    pub fn write<R>(&self, id: &str, f: impl FnOnce(&mut T) -> R) -> Result<R, TurnError> {
        let tracker = self.get(id).ok_or_else(|| TurnError::not_found(self.entity, id))?;
        let mut guard = sync::write(tracker.as_ref());
        Ok(f(&mut *guard))
    }

    /// Maps every tracker through `f`, in id order.
    pub fn map_all<R>(&self, mut f: impl FnMut(&T) -> R) -> Vec<R> {
        let trackers: Vec<Arc<RwLock<T>>> = sync::read(&self.entries).values().cloned().collect();
        trackers
            .iter()
            .map(|tracker| {
                let guard = sync::read(tracker.as_ref());
                f(&*guard)
            })
            .collect()
    }

    /// Runs `f` on every tracker under its write lock, in id order.
    pub fn write_all(&self, mut f: impl FnMut(&mut T)) {
        let trackers: Vec<Arc<RwLock<T>>> = sync::read(&self.entries).values().cloned().collect();
        for tracker in &trackers {
            let mut guard = sync::write(tracker.as_ref());
            f(&mut *guard);
        }
    }
}
