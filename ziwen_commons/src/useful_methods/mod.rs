mod split_msg;

use std::{fmt::Display, future::Future, time::Duration};

pub use split_msg::SplitOverLengthTokens;

/// Longest body Reddit accepts for a single comment or private message, in bytes.
pub const REDDIT_TEXT_LIMIT: usize = 10000;

/// Run `attempt` up to `tries` times, sleeping `delay` after each failure.
/// Every failure is logged at `warn`. Returns the last error if none succeed.
///
/// # Panics
/// Panics if `tries` is 0.
pub async fn with_retries<T, E, F, Fut>(
    what: &str,
    tries: u8,
    delay: Duration,
    mut attempt: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    assert!(tries > 0, "Must try at least once");
    let mut looped: u8 = 0;
    loop {
        looped += 1;
        match attempt().await {
            Ok(x) => return Ok(x),
            Err(e) => {
                log::warn!("Attempt {looped}/{tries} to {what} failed: {e}");
                if looped >= tries {
                    return Err(e);
                }
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Split `text` into pieces that each fit into one Reddit comment.
#[must_use]
pub fn split_for_reddit(text: &str) -> Vec<&str> {
    SplitOverLengthTokens::new(text, REDDIT_TEXT_LIMIT).collect()
}
