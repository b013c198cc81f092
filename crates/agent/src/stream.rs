//! Paced reveal of a completed answer.
//!
//! The answer is already fully computed when streaming starts; the stream
//! exists purely to emulate incremental generation for a live-updating
//! display. Each item is the answer truncated at the next word boundary —
//! built by appending `" " + token` to the previous item, so every item
//! carries a single leading space.
//!
//! The stream is pull-based: the pacing delay runs inside `poll_next`, so a
//! consumer that stops polling (or drops the stream) abandons the remaining
//! tokens and delays with nothing to clean up.

use std::time::Duration;

use futures::Stream;

/// Stream a completed answer as progressively-growing prefixes.
///
/// Yields exactly one item per whitespace-delimited token (consecutive
/// whitespace collapses; an empty or all-whitespace answer yields nothing).
/// The first item is available immediately; each later item becomes ready
/// one `pacing` interval after its predecessor. Every call produces a fresh,
/// independent sequence.
pub fn reveal(answer: &str, pacing: Duration) -> impl Stream<Item = String> + Send + use<> {
    let tokens: Vec<String> = answer.split_whitespace().map(str::to_owned).collect();

    futures::stream::unfold(
        (tokens.into_iter(), String::new(), true),
        move |(mut tokens, mut shown, first)| async move {
            let token = tokens.next()?;
            if !first {
                tokio::time::sleep(pacing).await;
            }
            shown.push(' ');
            shown.push_str(&token);
            Some((shown.clone(), (tokens, shown, false)))
        },
    )
}
