use std::time::Duration;

use futures::stream::{self, BoxStream, StreamExt};

/// Delay before each message of a replayed session appears.
pub const REVEAL_INTERVAL: Duration = Duration::from_millis(600);

/// When each of `count` items becomes visible, relative to the start.
pub fn reveal_schedule(count: usize, interval: Duration) -> Vec<Duration> {
    let mut at = Duration::ZERO;
    (0..count)
        .map(|_| {
            at = at.saturating_add(interval);
            at
        })
        .collect()
}

/// Yields the items one at a time, waiting `interval` before each.
///
/// Pacing is purely visual; the items are already stored.
pub fn paced<T>(items: Vec<T>, interval: Duration) -> BoxStream<'static, T>
where
    T: Send + 'static,
{
    stream::iter(items)
        .then(move |item| async move {
            tokio::time::sleep(interval).await;
            item
        })
        .boxed()
}
