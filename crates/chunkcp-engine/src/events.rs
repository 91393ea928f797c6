//! Ready-made transfer observers

use chunkcp_types::{ChunkDigest, ChunkResult, TransferObserver, TransferOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Observer that forwards every event to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl TransferObserver for TracingObserver {
    fn on_chunk_verified(&self, offset: u64, _bytes: usize, digest: ChunkDigest) {
        debug!("position = {}, hash = {}", offset / 1024, digest);
    }

    fn on_chunk_retry(&self, offset: u64, attempt: u32) {
        debug!("Retrying chunk at {} (attempt {})", offset, attempt);
    }

    fn on_chunk_unresolved(&self, result: &ChunkResult) {
        warn!("Chunk at {} left unverified", result.offset);
    }

    fn on_transfer_completed(&self, elapsed: Duration) {
        info!("transfer completed in {:.3} seconds", elapsed.as_secs_f64());
    }

    fn on_complete(&self, outcome: &TransferOutcome) {
        if outcome.success {
            info!("successful file transfer ({} bytes)", outcome.file_size);
        } else {
            warn!("checksums don't match");
        }
    }
}

/// A transfer event in owned form
#[derive(Debug, Clone)]
pub enum TransferEvent {
    /// See [`TransferObserver::on_chunk_verified`]
    ChunkVerified {
        /// Chunk offset
        offset: u64,
        /// Bytes in the chunk
        bytes: usize,
        /// Fast digest of the chunk
        digest: ChunkDigest,
    },
    /// See [`TransferObserver::on_chunk_retry`]
    ChunkRetry {
        /// Chunk offset
        offset: u64,
        /// Retry number, starting at 1
        attempt: u32,
    },
    /// See [`TransferObserver::on_chunk_unresolved`]
    ChunkUnresolved(ChunkResult),
    /// See [`TransferObserver::on_transfer_completed`]
    TransferCompleted(Duration),
    /// See [`TransferObserver::on_complete`]
    Complete(Box<TransferOutcome>),
}

/// Observer that sends events down an unbounded channel
///
/// Sending never blocks a worker. Events are dropped silently once the
/// receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: mpsc::UnboundedSender<TransferEvent>,
}

impl ChannelObserver {
    /// Create an observer and the receiving end of its channel
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TransferEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    fn send(&self, event: TransferEvent) {
        let _ = self.sender.send(event);
    }
}

impl TransferObserver for ChannelObserver {
    fn on_chunk_verified(&self, offset: u64, bytes: usize, digest: ChunkDigest) {
        self.send(TransferEvent::ChunkVerified {
            offset,
            bytes,
            digest,
        });
    }

    fn on_chunk_retry(&self, offset: u64, attempt: u32) {
        self.send(TransferEvent::ChunkRetry { offset, attempt });
    }

    fn on_chunk_unresolved(&self, result: &ChunkResult) {
        self.send(TransferEvent::ChunkUnresolved(*result));
    }

    fn on_transfer_completed(&self, elapsed: Duration) {
        self.send(TransferEvent::TransferCompleted(elapsed));
    }

    fn on_complete(&self, outcome: &TransferOutcome) {
        self.send(TransferEvent::Complete(Box::new(outcome.clone())));
    }
}

/// Observer that forwards every event to several others in order
#[derive(Clone, Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn TransferObserver>>,
}

impl CompositeObserver {
    /// Create an empty composite
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer
    pub fn with(mut self, observer: Arc<dyn TransferObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Number of observers
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Whether no observer is registered
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl TransferObserver for CompositeObserver {
    fn on_chunk_verified(&self, offset: u64, bytes: usize, digest: ChunkDigest) {
        for observer in &self.observers {
            observer.on_chunk_verified(offset, bytes, digest);
        }
    }

    fn on_chunk_retry(&self, offset: u64, attempt: u32) {
        for observer in &self.observers {
            observer.on_chunk_retry(offset, attempt);
        }
    }

    fn on_chunk_unresolved(&self, result: &ChunkResult) {
        for observer in &self.observers {
            observer.on_chunk_unresolved(result);
        }
    }

    fn on_transfer_completed(&self, elapsed: Duration) {
        for observer in &self.observers {
            observer.on_transfer_completed(elapsed);
        }
    }

    fn on_complete(&self, outcome: &TransferOutcome) {
        for observer in &self.observers {
            observer.on_complete(outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_observer_forwards_in_order() {
        let (observer, mut receiver) = ChannelObserver::new();

        observer.on_chunk_retry(0, 1);
        observer.on_chunk_verified(0, 8, ChunkDigest(7));
        observer.on_transfer_completed(Duration::from_millis(5));

        assert!(matches!(
            receiver.recv().await,
            Some(TransferEvent::ChunkRetry { offset: 0, attempt: 1 })
        ));
        assert!(matches!(
            receiver.recv().await,
            Some(TransferEvent::ChunkVerified { offset: 0, bytes: 8, digest: ChunkDigest(7) })
        ));
        assert!(matches!(
            receiver.recv().await,
            Some(TransferEvent::TransferCompleted(_))
        ));
    }

    #[test]
    fn test_channel_observer_survives_closed_receiver() {
        let (observer, receiver) = ChannelObserver::new();
        drop(receiver);
        observer.on_chunk_retry(0, 1);
    }

    #[tokio::test]
    async fn test_composite_fans_out() {
        let (first, mut first_rx) = ChannelObserver::new();
        let (second, mut second_rx) = ChannelObserver::new();
        let composite = CompositeObserver::new()
            .with(Arc::new(first))
            .with(Arc::new(TracingObserver))
            .with(Arc::new(second));
        assert_eq!(composite.len(), 3);

        composite.on_chunk_retry(64, 2);

        assert!(matches!(
            first_rx.recv().await,
            Some(TransferEvent::ChunkRetry { offset: 64, attempt: 2 })
        ));
        assert!(matches!(
            second_rx.recv().await,
            Some(TransferEvent::ChunkRetry { offset: 64, attempt: 2 })
        ));
    }
}
