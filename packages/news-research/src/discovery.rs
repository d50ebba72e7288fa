//! Discovery stage: fan issuer names out onto the issuer queue.

use tracing::info;

use crate::error::Result;
use crate::queue::Queue;
use crate::types::IssuerRequest;

/// Enqueue one research request per issuer name, returning the count.
///
/// Blank names are skipped; everything else gets the default request shape.
pub async fn enqueue_issuers(
    issuer_names: &[String],
    queue: &dyn Queue<IssuerRequest>,
) -> Result<usize> {
    let mut enqueued = 0;
    for name in issuer_names {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        queue.send(IssuerRequest::new(name)).await?;
        enqueued += 1;
    }
    info!(enqueued, "issuer discovery complete");
    Ok(enqueued)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::MemoryQueue;

    #[tokio::test]
    async fn test_blank_names_skipped() {
        let queue = MemoryQueue::new();
        let names = vec!["Acme".to_string(), "  ".to_string(), "Globex".to_string()];
        assert_eq!(enqueue_issuers(&names, &queue).await.unwrap(), 2);

        let requests = queue.recv_batch(10).await.unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].issuer_name, "Acme");
        assert_eq!(requests[0].number_of_articles, 10);
        assert!(requests[1].want_summary);
    }
}
