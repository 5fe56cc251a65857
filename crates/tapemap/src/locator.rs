//! Target position lookup.

use log::warn;
use nalgebra::Point2;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;

/// Resolves a symbolic target id to a position in map pixels.
///
/// Implementations must never return a torn read: when a lookup races an
/// update they either wait or report "not found".
pub trait TargetLocator: Send + Sync {
    fn locate(&self, target: &str) -> Option<Point2<f32>>;

    /// Replace the known positions with a fresh report from the tracker.
    fn update(&self, tags: Vec<(String, Point2<f32>)>);
}

/// Lookup table fed by the tag tracker.
///
/// Each update replaces the whole table. Lookups wait at most
/// `lock_timeout` for a concurrent update and otherwise report "not found".
#[derive(Debug)]
pub struct TagTable {
    tags: RwLock<HashMap<String, Point2<f32>>>,
    lock_timeout: Duration,
}

impl TagTable {
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            tags: RwLock::new(HashMap::new()),
            lock_timeout,
        }
    }

    pub fn len(&self) -> usize {
        self.tags.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TagTable {
    fn default() -> Self {
        Self::new(Duration::from_millis(10))
    }
}

impl TargetLocator for TagTable {
    fn locate(&self, target: &str) -> Option<Point2<f32>> {
        let Some(tags) = self.tags.try_read_for(self.lock_timeout) else {
            warn!("tag table busy; treating {target:?} as not found");
            return None;
        };
        tags.get(target).copied()
    }

    fn update(&self, tags: Vec<(String, Point2<f32>)>) {
        let fresh: HashMap<_, _> = tags.into_iter().collect();
        *self.tags.write() = fresh;
    }
}
