use std::future::Future;
use std::time::Duration;

use crate::error::{CoreError, CoreResult};

/// Default per-request budget shared by every orchestrated operation.
pub const DEFAULT_REQUEST_BUDGET: Duration = Duration::from_secs(5);

/// Run `fut` to completion or fail with [`CoreError::Timeout`] once `budget`
/// elapses. Dropping the inner future cancels in-flight I/O; side effects
/// already performed are not rolled back.
pub async fn within<T, F>(budget: Duration, fut: F) -> CoreResult<T>
where
    F: Future<Output = CoreResult<T>>,
{
    tokio::time::timeout(budget, fut)
        .await
        .map_err(|_| CoreError::Timeout(budget))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn slow_operations_time_out() {
        let result: CoreResult<()> = within(Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok(())
        })
        .await;
        assert!(matches!(
            result,
            Err(CoreError::Timeout(d)) if d == Duration::from_millis(50)
        ));
    }

    #[tokio::test]
    async fn inner_errors_pass_through() {
        let result: CoreResult<()> =
            within(Duration::from_secs(1), async { Err(CoreError::NotFound) })
                .await;
        assert!(matches!(result, Err(CoreError::NotFound)));
    }
}
