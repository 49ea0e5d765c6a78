//! Progress-callback trait for per-chunk generation events.
//!
//! Inject an [`Arc<dyn GenerationProgressCallback>`] via
//! [`crate::config::GenerationConfigBuilder::progress_callback`] to receive
//! real-time events as the pipeline processes each chunk.
//!
//! # Why callbacks instead of a global logger?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a terminal progress bar, a WebSocket, or a test recorder
//! without the library knowing anything about how the host application
//! communicates. There is no process-wide mutable logging state — tests
//! assert on an injected recorder instead. The trait is `Send + Sync` so it
//! works when chunks are processed concurrently.

use std::sync::Arc;

/// Called by the generation pipeline as it processes each chunk.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. With `concurrency > 1` the per-chunk methods may be
/// called from different tasks; implementations must synchronise their own
/// shared state.
pub trait GenerationProgressCallback: Send + Sync {
    /// Called once before any chunk is sent to the LLM.
    fn on_generation_start(&self, total_chunks: usize) {
        let _ = total_chunks;
    }

    /// Called just before the LLM request is sent for a chunk (1-indexed).
    fn on_chunk_start(&self, chunk_num: usize, total_chunks: usize) {
        let _ = (chunk_num, total_chunks);
    }

    /// Called when a chunk produced its cards. `card_count` is the number of
    /// valid cards the chunk contributed (possibly fewer than its quota).
    fn on_chunk_complete(&self, chunk_num: usize, total_chunks: usize, card_count: usize) {
        let _ = (chunk_num, total_chunks, card_count);
    }

    /// Called when a chunk's LLM call failed after all retries.
    fn on_chunk_error(&self, chunk_num: usize, total_chunks: usize, error: &str) {
        let _ = (chunk_num, total_chunks, error);
    }

    /// Called once after all chunks have been attempted. `card_count` is the
    /// total number of flashcards in the final output.
    fn on_generation_complete(&self, total_chunks: usize, card_count: usize) {
        let _ = (total_chunks, card_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl GenerationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::GenerationConfig`].
pub type ProgressCallback = Arc<dyn GenerationProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        final_cards: AtomicUsize,
    }

    impl GenerationProgressCallback for TrackingCallback {
        fn on_chunk_start(&self, _chunk_num: usize, _total: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_chunk_complete(&self, _chunk_num: usize, _total: usize, _cards: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_chunk_error(&self, _chunk_num: usize, _total: usize, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_generation_complete(&self, _total: usize, card_count: usize) {
            self.final_cards.store(card_count, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_generation_start(3);
        cb.on_chunk_start(1, 3);
        cb.on_chunk_complete(1, 3, 4);
        cb.on_chunk_error(2, 3, "timeout");
        cb.on_generation_complete(3, 4);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            starts: AtomicUsize::new(0),
            completes: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
            final_cards: AtomicUsize::new(0),
        };

        tracker.on_generation_start(2);
        tracker.on_chunk_start(1, 2);
        tracker.on_chunk_complete(1, 2, 5);
        tracker.on_chunk_start(2, 2);
        tracker.on_chunk_error(2, 2, "HTTP 503");
        tracker.on_generation_complete(2, 5);

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.final_cards.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn GenerationProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_generation_start(10);
        cb.on_chunk_complete(1, 10, 3);
    }
}
