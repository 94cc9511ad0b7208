//! Nearest-timestamp lookups
//!
//! Marker timestamps are resolved to audio sample indices by nearest match
//! against the (sorted) sample timeline. Markers are independent, so large
//! batches are spread over a fixed-size rayon pool; results are identical to
//! the inline path.

use rayon::prelude::*;

use rootstar_speech_core::config::SyncConfig;
use rootstar_speech_core::error::{SyncError, SyncResult};

/// Below this many targets the lookup always runs inline
const PARALLEL_THRESHOLD: usize = 64;

/// Index of the element of sorted `timestamps` closest to `target`.
///
/// Ties resolve to the lowest index. Returns `None` for an empty timeline.
#[must_use]
pub fn nearest_index(timestamps: &[f64], target: f64) -> Option<usize> {
    if timestamps.is_empty() {
        return None;
    }
    let upper = timestamps.partition_point(|&t| t < target);
    let mut best = if upper == 0 {
        0
    } else if upper == timestamps.len() {
        upper - 1
    } else if target - timestamps[upper - 1] <= timestamps[upper] - target {
        upper - 1
    } else {
        upper
    };
    // Step back over repeated timestamps so the first occurrence wins
    while best > 0 && timestamps[best - 1] == timestamps[best] {
        best -= 1;
    }
    Some(best)
}

/// Index of the element of unsorted `values` closest to `target`.
///
/// Linear scan; the earliest index wins a tie. Returns `None` when empty.
#[must_use]
pub fn closest_index(values: &[f64], target: f64) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &v)| {
            let distance = (v - target).abs();
            match best {
                Some((_, d)) if d <= distance => best,
                _ => Some((i, distance)),
            }
        })
        .map(|(i, _)| i)
}

/// Resolves batches of timestamps to sample indices.
#[derive(Clone, Copy, Debug)]
pub struct NearestIndexResolver {
    workers: usize,
}

impl NearestIndexResolver {
    /// Create a resolver using `config.lookup_workers` threads
    #[must_use]
    pub fn new(config: &SyncConfig) -> Self {
        Self::with_workers(config.lookup_workers)
    }

    /// Create a resolver with an explicit worker count (0 or 1 runs inline)
    #[must_use]
    pub fn with_workers(workers: usize) -> Self {
        Self { workers }
    }

    /// Configured worker count
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Nearest index in sorted `timestamps` for every target, in target order.
    ///
    /// An empty timeline resolves every target to index 0.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::WorkerPool`] if the thread pool cannot be built.
    pub fn resolve(&self, timestamps: &[f64], targets: &[f64]) -> SyncResult<Vec<usize>> {
        let lookup = |&target: &f64| nearest_index(timestamps, target).unwrap_or(0);

        if self.workers <= 1 || targets.len() < PARALLEL_THRESHOLD {
            return Ok(targets.iter().map(lookup).collect());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|e| SyncError::WorkerPool {
                reason: e.to_string(),
            })?;
        Ok(pool.install(|| targets.par_iter().map(lookup).collect()))
    }
}

impl Default for NearestIndexResolver {
    fn default() -> Self {
        Self::new(&SyncConfig::default())
    }
}
