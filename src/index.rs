use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::record::{LiveQueryRecord, RecordHandle};
use crate::schema::ExecutableSchema;

struct IndexInner<S: ExecutableSchema> {
    by_id: HashMap<Arc<str>, HashSet<RecordHandle<S>>>,
    by_record: HashMap<u64, HashSet<Arc<str>>>,
}

impl<S: ExecutableSchema> Default for IndexInner<S> {
    fn default() -> Self {
        Self {
            by_id: HashMap::new(),
            by_record: HashMap::new(),
        }
    }
}

/// The identifier index / tracker (component C, spec.md §4.3).
///
/// Bidirectional mapping between resource identifiers and the records
/// that depend on them, kept mutually consistent on every mutation.
/// Guarded by a plain `Mutex` rather than `RwLock`: every mutating
/// operation touches both sides of the mapping together, and no lock
/// guard is ever held across an `.await` point, so there is nothing an
/// async-aware lock would buy here.
pub struct Index<S: ExecutableSchema> {
    inner: Mutex<IndexInner<S>>,
}

impl<S: ExecutableSchema> Index<S> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(IndexInner::default()),
        }
    }

    /// Associate `record` with exactly `identifiers`, superseding any
    /// prior association for that record (spec.md §4.3: `register` calls
    /// `clear` first).
    pub fn register(&self, record: &Arc<LiveQueryRecord<S>>, identifiers: HashSet<Arc<str>>) {
        let mut inner = self.inner.lock().unwrap();
        Self::clear_locked(&mut inner, record.id);

        let handle = RecordHandle(record.clone());
        for id in &identifiers {
            inner.by_id.entry(id.clone()).or_default().insert(handle.clone());
        }
        inner.by_record.insert(record.id, identifiers.clone());
        drop(inner);

        *record.identifiers.lock().unwrap() = identifiers;
    }

    /// Remove `record` from every bucket it currently appears in.
    pub fn clear(&self, record: &Arc<LiveQueryRecord<S>>) {
        let mut inner = self.inner.lock().unwrap();
        Self::clear_locked(&mut inner, record.id);
        drop(inner);

        record.identifiers.lock().unwrap().clear();
    }

    fn clear_locked(inner: &mut IndexInner<S>, record_id: u64) {
        let Some(ids) = inner.by_record.remove(&record_id) else {
            return;
        };
        for id in ids {
            if let Some(set) = inner.by_id.get_mut(&id) {
                set.retain(|handle| handle.0.id != record_id);
                if set.is_empty() {
                    inner.by_id.remove(&id);
                }
            }
        }
    }

    /// The (possibly empty) set of records currently associated with
    /// `identifier`.
    pub fn lookup(&self, identifier: &str) -> Vec<Arc<LiveQueryRecord<S>>> {
        let inner = self.inner.lock().unwrap();
        inner.by_id.get(identifier).map(|set| set.iter().map(|handle| handle.0.clone()).collect()).unwrap_or_default()
    }

    /// Number of distinct identifiers currently tracked. Exposed for
    /// tests asserting empty-bucket cleanup (spec.md §4.3).
    #[cfg(test)]
    pub(crate) fn tracked_identifier_count(&self) -> usize {
        self.inner.lock().unwrap().by_id.len()
    }
}

impl<S: ExecutableSchema> Default for Index<S> {
    fn default() -> Self {
        Self::new()
    }
}
