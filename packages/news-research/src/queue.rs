//! Queue seam between pipeline stages.
//!
//! Production deploys put a managed queue here; in-process runs and tests use
//! [`MemoryQueue`]. Visibility timeouts, redrive and dead-lettering are queue
//! infrastructure concerns and deliberately absent from the trait.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::Result;

/// FIFO handoff between stages.
#[async_trait]
pub trait Queue<T: Send + 'static>: Send + Sync {
    /// Enqueue one message.
    async fn send(&self, message: T) -> Result<()>;

    /// Dequeue up to `max` messages; empty vec when the queue is drained.
    async fn recv_batch(&self, max: usize) -> Result<Vec<T>>;
}

/// In-process queue for tests and single-node runs.
pub struct MemoryQueue<T> {
    messages: Mutex<VecDeque<T>>,
}

impl<T> Default for MemoryQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MemoryQueue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(VecDeque::new()),
        }
    }

    /// Number of queued messages.
    pub fn len(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<T: Send + 'static> Queue<T> for MemoryQueue<T> {
    async fn send(&self, message: T) -> Result<()> {
        self.messages.lock().unwrap().push_back(message);
        Ok(())
    }

    async fn recv_batch(&self, max: usize) -> Result<Vec<T>> {
        let mut messages = self.messages.lock().unwrap();
        let take = max.min(messages.len());
        Ok(messages.drain(..take).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fifo_order_and_batching() {
        let queue = MemoryQueue::new();
        for i in 0..5 {
            queue.send(i).await.unwrap();
        }

        assert_eq!(queue.recv_batch(2).await.unwrap(), vec![0, 1]);
        assert_eq!(queue.recv_batch(10).await.unwrap(), vec![2, 3, 4]);
        assert!(queue.recv_batch(1).await.unwrap().is_empty());
    }
}
