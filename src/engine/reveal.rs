//! Character-by-character reveal

use std::str::Chars;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Successive prefixes of a reply, each one character longer
///
/// Steps by Unicode scalar value, so multi-byte text never splits inside a
/// character.
pub struct Reveal<'a> {
    chars: Chars<'a>,
    revealed: String,
}

impl<'a> Reveal<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars(),
            revealed: String::with_capacity(text.len()),
        }
    }
}

impl Iterator for Reveal<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let ch = self.chars.next()?;
        self.revealed.push(ch);
        Some(self.revealed.clone())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chars.size_hint()
    }
}

/// How a reveal loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Every character was written
    Completed { chars: usize },
    /// The token fired before the end
    Cancelled { chars: usize },
    /// The writer refused a step
    Aborted { chars: usize },
}

/// Feed `write` one prefix per `interval` until the text is fully shown
///
/// Each step waits first, then writes. `write` returns `false` to stop.
pub async fn run<F>(
    text: &str,
    interval: Duration,
    cancel: &CancellationToken,
    mut write: F,
) -> RevealOutcome
where
    F: FnMut(String) -> bool,
{
    let mut chars = 0;
    for prefix in Reveal::new(text) {
        tokio::select! {
            () = cancel.cancelled() => return RevealOutcome::Cancelled { chars },
            () = tokio::time::sleep(interval) => {}
        }
        if !write(prefix) {
            return RevealOutcome::Aborted { chars };
        }
        chars += 1;
    }
    RevealOutcome::Completed { chars }
}
