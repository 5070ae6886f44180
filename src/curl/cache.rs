use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::config::DEFAULT_CACHE_CAPACITY;
use crate::request::ApiRequest;

/// Parse results keyed by the raw input.
///
/// Eviction is first-in first-out: once the cache holds `capacity` entries,
/// inserting a new key drops the oldest inserted one. Lookups do not refresh
/// an entry's position.
#[derive(Debug, Clone)]
pub struct ParseCache {
    capacity: usize,
    entries: HashMap<String, ApiRequest>,
    order: VecDeque<String>,
}

impl Default for ParseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl ParseCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, input: &str) -> bool {
        self.entries.contains_key(input)
    }

    /// A copy of the cached request carrying a fresh id.
    pub fn get(&self, input: &str) -> Option<ApiRequest> {
        self.entries.get(input).map(ApiRequest::with_fresh_id)
    }

    pub fn insert(&mut self, input: &str, request: &ApiRequest) {
        if self.capacity == 0 {
            return;
        }
        if let Some(existing) = self.entries.get_mut(input) {
            *existing = request.clone();
            return;
        }

        while self.entries.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    debug!(key = %oldest, "evicting cached curl parse");
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }

        self.order.push_back(input.to_string());
        self.entries.insert(input.to_string(), request.clone());
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}
