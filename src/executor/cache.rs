//! Bounded per-worker cache of loaded case resources.
//!
//! An LRU shape (a `HashMap` plus an access-order list) over case input
//! resources. No TTL here — re-loads are idempotent, so eviction alone is
//! sufficient; there is no staleness concern to expire against.

use std::collections::HashMap;
use std::collections::VecDeque;

use crate::model::CaseInput;
use crate::registry::RegistryError;

/// LRU cache of `CaseInput`s keyed by `caseId`, private to one worker.
pub struct CaseInputCache {
    capacity: usize,
    entries: HashMap<String, CaseInput>,
    order: VecDeque<String>,
}

impl CaseInputCache {
    pub fn new(capacity: usize) -> Self {
        CaseInputCache {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Return the cached input for `case_id`, or invoke `load` to populate
    /// it, evicting the least-recently-used entry first if at capacity.
    pub fn get_or_load(
        &mut self,
        case_id: &str,
        load: impl FnOnce() -> Result<CaseInput, RegistryError>,
    ) -> Result<CaseInput, RegistryError> {
        if let Some(input) = self.entries.get(case_id).cloned() {
            self.touch(case_id);
            return Ok(input);
        }

        let input = load()?;
        self.insert(case_id.to_string(), input.clone());
        Ok(input)
    }

    fn touch(&mut self, case_id: &str) {
        if let Some(pos) = self.order.iter().position(|id| id == case_id) {
            self.order.remove(pos);
        }
        self.order.push_back(case_id.to_string());
    }

    fn insert(&mut self, case_id: String, input: CaseInput) {
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&case_id) {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.order.push_back(case_id.clone());
        self.entries.insert(case_id, input);
    }

    /// Drop the least-recently-used entry, freeing memory ahead of a new
    /// load. No-op if the cache is empty.
    pub fn evict_oldest(&mut self) {
        if let Some(oldest) = self.order.pop_front() {
            self.entries.remove(&oldest);
        }
    }

    /// True if `case_id` is already cached, i.e. loading it would not
    /// require a new resource load.
    pub fn contains(&self, case_id: &str) -> bool {
        self.entries.contains_key(case_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
