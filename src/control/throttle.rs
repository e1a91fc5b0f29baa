use std::time::Duration;

/// Suspends the calling control flow for `duration`.
///
/// Awaited inline by the scheduler loop, so consecutive throttles serialize:
/// a pass that throttles `n` contenders takes at least `n * duration`.
pub async fn throttle(duration: Duration) {
    if duration.is_zero() {
        return;
    }
    tokio::time::sleep(duration).await;
}
