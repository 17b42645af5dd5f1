use std::future::Future;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::{sleep_until, Instant};

/// Run `f` over every item with bounded concurrency, releasing item `i` no
/// earlier than `i * interval` after the batch starts.
///
/// Every item runs to completion; one failure never cancels its siblings.
/// Results come back in completion order, not input order.
pub async fn run_staggered<T, R, F, Fut>(
    items: Vec<T>,
    interval: Duration,
    max_concurrency: usize,
    f: F,
) -> Vec<R>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = R>,
{
    let started = Instant::now();
    let f = &f;

    stream::iter(items.into_iter().enumerate())
        .map(|(index, item)| async move {
            let offset = interval * index as u32;
            if !offset.is_zero() {
                sleep_until(started + offset).await;
            }
            f(item).await
        })
        .buffer_unordered(max_concurrency.max(1))
        .collect()
        .await
}
