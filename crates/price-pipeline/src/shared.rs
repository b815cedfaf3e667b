//! Shared pipeline handle with atomic replacement

use crate::pipeline::PredictionPipeline;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

/// Process-wide reference to the live pipeline.
///
/// Requests take a cheap `Arc` clone and work on that snapshot; a reload
/// builds a whole new pipeline and swaps the reference. A live pipeline is
/// never mutated.
#[derive(Debug)]
pub struct SharedPipeline {
    current: RwLock<Arc<PredictionPipeline>>,
}

impl SharedPipeline {
    pub fn new(pipeline: PredictionPipeline) -> Self {
        Self {
            current: RwLock::new(Arc::new(pipeline)),
        }
    }

    /// Snapshot of the live pipeline
    pub fn current(&self) -> Arc<PredictionPipeline> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replace the live pipeline, returning the previous one
    pub fn swap(&self, next: PredictionPipeline) -> Arc<PredictionPipeline> {
        let next = Arc::new(next);
        info!("Swapping in pipeline bundle={}", next.metadata().name);

        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}
