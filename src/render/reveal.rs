//! Lazy character-by-character reveal of a string.

/// One step of a [`Reveal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub ch: char,
    /// `true` on the last character.
    pub done: bool,
}

/// Restartable left-to-right walk over the `char`s of a text.
///
/// Works on Unicode scalar values, not grapheme clusters.  Dropping the
/// value is all it takes to cancel a reveal.
#[derive(Debug, Clone)]
pub struct Reveal {
    chars: Vec<char>,
    pos: usize,
}

impl Reveal {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    /// Next character to show, or `None` once everything is revealed.
    pub fn next_chunk(&mut self) -> Option<Chunk> {
        let ch = *self.chars.get(self.pos)?;
        self.pos += 1;
        Some(Chunk {
            ch,
            done: self.pos == self.chars.len(),
        })
    }

    pub fn is_done(&self) -> bool {
        self.pos >= self.chars.len()
    }

    /// Text revealed so far.
    pub fn revealed(&self) -> String {
        self.chars[..self.pos].iter().collect()
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_every_prefix_in_order() {
        let mut r = Reveal::new("abc");
        let mut seen = Vec::new();
        while r.next_chunk().is_some() {
            seen.push(r.revealed());
        }
        assert_eq!(seen, ["a", "ab", "abc"]);
        assert!(r.is_done());
    }

    #[test]
    fn done_flag_marks_last_char() {
        let mut r = Reveal::new("hi");
        assert_eq!(r.next_chunk(), Some(Chunk { ch: 'h', done: false }));
        assert_eq!(r.next_chunk(), Some(Chunk { ch: 'i', done: true }));
        assert_eq!(r.next_chunk(), None);
    }

    #[test]
    fn empty_text_is_done_immediately() {
        let mut r = Reveal::new("");
        assert!(r.is_done());
        assert_eq!(r.next_chunk(), None);
    }

    #[test]
    fn steps_over_chars_not_bytes() {
        let mut r = Reveal::new("héllo 🦖");
        let mut chars = String::new();
        while let Some(chunk) = r.next_chunk() {
            chars.push(chunk.ch);
        }
        assert_eq!(chars, "héllo 🦖");
        assert_eq!(r.revealed(), "héllo 🦖");
    }
}
