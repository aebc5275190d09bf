//! Whitespace tokenizer over a raw input line
//!
//! `InputCursor` wraps the argument portion of an input line and a byte
//! offset. Every read mutates the offset; callers that need look-ahead use
//! `save`/`restore` for manual backtracking. Tokens are maximal runs of
//! non-whitespace characters; there is no quoting or escaping.

use crate::error::{ResolveError, ResolveResult};

/// Cursor over a raw input string
#[derive(Debug, Clone)]
pub struct InputCursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> InputCursor<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Current byte offset, for error reporting
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Save the cursor offset for manual backtracking
    pub fn save(&self) -> usize {
        self.pos
    }

    /// Restore a previously saved offset
    pub fn restore(&mut self, pos: usize) {
        debug_assert!(pos <= self.input.len());
        self.pos = pos;
    }

    /// True iff a non-whitespace character remains past the cursor
    pub fn can_read(&self) -> bool {
        self.input[self.pos..].chars().any(|c| !c.is_whitespace())
    }

    /// Advance past consecutive whitespace
    pub fn skip_space(&mut self) {
        let rest = &self.input[self.pos..];
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
    }

    /// Read the next whitespace-delimited token and advance past it
    pub fn read_token(&mut self) -> ResolveResult<&'a str> {
        self.skip_space();
        if self.pos >= self.input.len() {
            return Err(ResolveError::EndOfInput { position: self.pos });
        }
        let rest = &self.input[self.pos..];
        let end = rest
            .char_indices()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        self.pos += end;
        Ok(&rest[..end])
    }

    /// Read everything from the cursor to the end of the line
    pub fn read_remainder(&mut self) -> ResolveResult<&'a str> {
        self.skip_space();
        if self.pos >= self.input.len() {
            return Err(ResolveError::EndOfInput { position: self.pos });
        }
        let rest = &self.input[self.pos..];
        self.pos = self.input.len();
        Ok(rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_tokens_in_order() {
        let mut cur = InputCursor::new("give 5 apples");
        assert_eq!(cur.read_token().unwrap(), "give");
        assert_eq!(cur.read_token().unwrap(), "5");
        assert_eq!(cur.read_token().unwrap(), "apples");
        assert!(!cur.can_read());
    }

    #[test]
    fn test_end_of_input() {
        let mut cur = InputCursor::new("   ");
        assert!(!cur.can_read());
        assert!(matches!(
            cur.read_token(),
            Err(ResolveError::EndOfInput { .. })
        ));
    }

    #[test]
    fn test_read_remainder() {
        let mut cur = InputCursor::new("say hello there world");
        assert_eq!(cur.read_token().unwrap(), "say");
        assert_eq!(cur.read_remainder().unwrap(), "hello there world");
        assert!(!cur.can_read());
        assert!(matches!(
            cur.read_remainder(),
            Err(ResolveError::EndOfInput { .. })
        ));
    }

    #[test]
    fn test_skip_space_between_tokens() {
        let mut cur = InputCursor::new("a    b");
        assert_eq!(cur.read_token().unwrap(), "a");
        cur.skip_space();
        assert_eq!(cur.position(), 5);
        assert_eq!(cur.read_token().unwrap(), "b");
    }

    #[test]
    fn test_save_restore() {
        let mut cur = InputCursor::new("one two");
        let mark = cur.save();
        assert_eq!(cur.read_token().unwrap(), "one");
        cur.restore(mark);
        assert_eq!(cur.read_token().unwrap(), "one");
    }

    #[test]
    fn test_position_tracks_reads() {
        let mut cur = InputCursor::new("ab cd");
        assert_eq!(cur.position(), 0);
        cur.read_token().unwrap();
        assert_eq!(cur.position(), 2);
        cur.read_token().unwrap();
        assert_eq!(cur.position(), 5);
    }
}
