//! Cancellation-aware execution of I/O futures.

use crate::error::{GatewayError, GatewayResult};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Drive `fut` to completion unless `token` fires first.
///
/// An already-cancelled token wins without polling `fut`, so no partial work
/// is started on behalf of a caller that has gone away.
pub async fn with_cancellation<F, T>(token: &CancellationToken, fut: F) -> GatewayResult<T>
where
    F: Future<Output = GatewayResult<T>>,
{
    tokio::select! {
        biased;
        () = token.cancelled() => Err(GatewayError::Cancelled),
        result = fut => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_completes_when_not_cancelled() {
        let token = CancellationToken::new();
        let result = with_cancellation(&token, async { Ok::<_, GatewayError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_wins() {
        let token = CancellationToken::new();
        token.cancel();
        let polled = AtomicBool::new(false);
        let result = with_cancellation(&token, async {
            polled.store(true, Ordering::SeqCst);
            Ok::<_, GatewayError>(())
        })
        .await;
        assert!(matches!(result, Err(GatewayError::Cancelled)));
        assert!(!polled.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_wait() {
        let token = CancellationToken::new();
        let child = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            child.cancel();
        });

        let result = with_cancellation(&token, async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, GatewayError>(())
        })
        .await;
        assert!(matches!(result, Err(GatewayError::Cancelled)));
    }
}
