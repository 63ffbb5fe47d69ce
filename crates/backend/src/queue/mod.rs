//! Bounded handoff between the HTTP handlers and the batch worker.

pub mod worker;

pub use worker::BatchWorker;

use tokio::sync::mpsc;

use common::protocol::PaymentRequest;
use common::ServiceError;

/// Cloneable sending side of the payment queue.
///
/// Enqueueing never waits: a full queue is surfaced to the caller as a 503
/// instead of back-pressuring the request handler.
#[derive(Debug, Clone)]
pub struct PaymentQueue {
    tx: mpsc::Sender<PaymentRequest>,
    capacity: usize,
}

impl PaymentQueue {
    /// Create a queue with the given capacity, returning the sender half and
    /// the receiver for the worker.
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<PaymentRequest>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx, capacity }, rx)
    }

    /// Enqueue a payment for async processing.
    ///
    /// # Errors
    ///
    /// [`ServiceError::QueueFull`] when the queue is at capacity;
    /// [`ServiceError::Internal`] if the worker has shut down.
    pub fn enqueue(&self, request: PaymentRequest) -> Result<(), ServiceError> {
        self.tx.try_send(request).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => ServiceError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => {
                ServiceError::Internal("payment worker is gone".into())
            }
        })
    }

    /// Number of payments currently waiting.
    pub fn depth(&self) -> usize {
        self.capacity - self.tx.capacity()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn request() -> PaymentRequest {
        PaymentRequest {
            correlation_id: Uuid::new_v4(),
            amount_cents: 100,
        }
    }

    #[tokio::test]
    async fn enqueue_and_depth() {
        let (queue, mut rx) = PaymentQueue::bounded(4);
        assert_eq!(queue.depth(), 0);
        queue.enqueue(request()).unwrap();
        queue.enqueue(request()).unwrap();
        assert_eq!(queue.depth(), 2);
        assert_eq!(queue.capacity(), 4);

        rx.recv().await.unwrap();
        assert_eq!(queue.depth(), 1);
    }

    #[tokio::test]
    async fn full_queue_is_reported() {
        let (queue, _rx) = PaymentQueue::bounded(1);
        queue.enqueue(request()).unwrap();
        let err = queue.enqueue(request()).unwrap_err();
        assert!(matches!(err, ServiceError::QueueFull));
    }

    #[tokio::test]
    async fn closed_queue_is_internal_error() {
        let (queue, rx) = PaymentQueue::bounded(1);
        drop(rx);
        let err = queue.enqueue(request()).unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)));
    }
}
