//! Typewriter reveal animation for transcription text.
//!
//! Reveals the text one character per tick as a cooperative timer loop. The
//! caller drives the animation from its render loop, plays a keystroke sound
//! for each newly revealed character, and can cancel the sequence at any
//! point (e.g. when the user resets mid-animation).

use std::time::{Duration, Instant};

/// Cancellable per-character reveal of a fixed text.
pub struct TypewriterAnimation {
    chars: Vec<char>,
    revealed: usize,
    interval: Duration,
    last_tick: Instant,
    cancelled: bool,
}

impl TypewriterAnimation {
    /// Creates an animation revealing `text` one character per `interval`.
    pub fn new(text: &str, interval: Duration) -> Self {
        Self {
            chars: text.chars().collect(),
            revealed: 0,
            interval,
            last_tick: Instant::now(),
            cancelled: false,
        }
    }

    /// Advances the animation if the interval has elapsed.
    ///
    /// Returns the newly revealed character so the caller can fire one
    /// keystroke sound per reveal. Returns `None` when the interval has not
    /// elapsed yet, the text is fully revealed, or the animation was
    /// cancelled.
    pub fn advance(&mut self) -> Option<char> {
        if self.cancelled || self.is_complete() {
            return None;
        }
        if self.last_tick.elapsed() < self.interval {
            return None;
        }

        let ch = self.chars[self.revealed];
        self.revealed += 1;
        self.last_tick = Instant::now();
        Some(ch)
    }

    /// The currently visible portion of the text.
    pub fn visible(&self) -> String {
        self.chars[..self.revealed].iter().collect()
    }

    /// Whether every character has been revealed.
    pub fn is_complete(&self) -> bool {
        self.revealed >= self.chars.len()
    }

    /// Stops the animation; no further characters are revealed.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// Whether the animation was cancelled before completion.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Reveals the remaining text immediately (skip animation).
    pub fn finish(&mut self) {
        self.revealed = self.chars.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reveals_characters_in_order() {
        let mut anim = TypewriterAnimation::new("abc", Duration::ZERO);
        assert_eq!(anim.advance(), Some('a'));
        assert_eq!(anim.advance(), Some('b'));
        assert_eq!(anim.visible(), "ab");
        assert_eq!(anim.advance(), Some('c'));
        assert!(anim.is_complete());
        assert_eq!(anim.advance(), None);
        assert_eq!(anim.visible(), "abc");
    }

    #[test]
    fn test_respects_interval() {
        let mut anim = TypewriterAnimation::new("xy", Duration::from_secs(3600));
        // Interval has not elapsed, nothing is revealed
        assert_eq!(anim.advance(), None);
        assert_eq!(anim.visible(), "");
    }

    #[test]
    fn test_cancel_stops_reveal() {
        let mut anim = TypewriterAnimation::new("hello", Duration::ZERO);
        anim.advance();
        anim.cancel();
        assert!(anim.is_cancelled());
        assert_eq!(anim.advance(), None);
        assert_eq!(anim.visible(), "h");
        assert!(!anim.is_complete());
    }

    #[test]
    fn test_finish_reveals_everything() {
        let mut anim = TypewriterAnimation::new("done", Duration::from_secs(3600));
        anim.finish();
        assert!(anim.is_complete());
        assert_eq!(anim.visible(), "done");
    }

    #[test]
    fn test_empty_text_completes_immediately() {
        let mut anim = TypewriterAnimation::new("", Duration::ZERO);
        assert!(anim.is_complete());
        assert_eq!(anim.advance(), None);
    }

    #[test]
    fn test_multibyte_characters_reveal_whole() {
        let mut anim = TypewriterAnimation::new("héllo", Duration::ZERO);
        anim.advance();
        assert_eq!(anim.advance(), Some('é'));
        assert_eq!(anim.visible(), "hé");
    }
}
