//! A seekable character cursor with line/column bookkeeping.
//!
//! Every parallel parse stack repositions the input independently before
//! acting, so the reader must support cheap absolute seeking over the
//! whole input. The full text is held in memory; a single mark (set at
//! construction) anchors line/column recomputation for backward seeks.
//! Seeking before the mark is a contract violation.

use crate::error::ReaderError;
use crate::source::{FilePos, FileRange};

#[derive(Debug, Clone, Copy)]
struct Pos {
    offset: usize,
    line: u32,
    col: u32,
}

impl Pos {
    const START: Self = Self {
        offset: 0,
        line: 1,
        col: 1,
    };

    fn advance(&mut self, ch: char) {
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        self.offset += ch.len_utf8();
    }

    const fn to_file_pos(self) -> FilePos {
        FilePos::new(self.offset, self.line, self.col)
    }

    const fn assign(pos: FilePos) -> Self {
        Self {
            offset: pos.offset,
            line: pos.line,
            col: pos.col,
        }
    }
}

/// A reader over in-memory source text that tracks the current line and
/// column and supports absolute repositioning.
///
/// # Examples
///
/// ```
/// use parlay::reader::ParserReader;
///
/// let mut reader = ParserReader::new("ab\ncd");
/// assert_eq!(reader.read(), Some('a'));
/// assert_eq!(reader.read(), Some('b'));
/// assert_eq!(reader.read(), Some('\n'));
/// assert_eq!(reader.line(), 2);
/// assert_eq!(reader.col(), 1);
///
/// reader.seek_to(1).unwrap();
/// assert_eq!(reader.read(), Some('b'));
/// ```
#[derive(Debug)]
pub struct ParserReader {
    text: String,
    current: Pos,
    mark: Pos,
}

impl ParserReader {
    /// Create a reader over the given text, with the mark set at the start
    /// so any already-read position remains reachable.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            current: Pos::START,
            mark: Pos::START,
        }
    }

    /// Total length of the input in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Bytes left between the cursor and the end of input.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.text.len() - self.current.offset
    }

    #[must_use]
    pub fn at_end(&self) -> bool {
        self.current.offset == self.text.len()
    }

    /// Current byte offset from the start of the input.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.current.offset
    }

    /// Current 1-based line number.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.current.line
    }

    /// Current 1-based column number.
    #[must_use]
    pub const fn col(&self) -> u32 {
        self.current.col
    }

    /// The current position as a [`FilePos`].
    #[must_use]
    pub const fn pos(&self) -> FilePos {
        self.current.to_file_pos()
    }

    /// The range from `start` to the current position.
    #[must_use]
    pub fn range_from(&self, start: FilePos) -> FileRange {
        FileRange::new(start, self.pos())
    }

    /// The unread remainder of the input. Regex-style matchers run
    /// directly against this view; it does not move the cursor.
    #[must_use]
    pub fn tail(&self) -> &str {
        &self.text[self.current.offset..]
    }

    /// Read one character and advance, or `None` at end of input.
    pub fn read(&mut self) -> Option<char> {
        let ch = self.text[self.current.offset..].chars().next()?;
        self.current.advance(ch);
        Some(ch)
    }

    /// Look at the next character without advancing.
    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.text[self.current.offset..].chars().next()
    }

    /// Move the mark to the current position. Backward seeks are only
    /// allowed to or after the mark.
    pub fn mark(&mut self) {
        self.mark = self.current;
    }

    /// Jump back to the mark.
    pub fn reset(&mut self) {
        self.current = self.mark;
    }

    /// Seek to an absolute byte offset, recomputing line and column.
    ///
    /// Forward seeks scan the skipped text; backward seeks within the
    /// current line adjust the column directly, and otherwise rescan from
    /// the mark.
    pub fn seek_to(&mut self, offset: usize) -> Result<(), ReaderError> {
        if offset > self.text.len() {
            return Err(ReaderError::SeekPastEnd {
                target: offset,
                len: self.text.len(),
            });
        }
        if !self.text.is_char_boundary(offset) {
            return Err(ReaderError::InvalidPosition { offset });
        }
        if offset == self.current.offset {
            return Ok(());
        }
        if offset > self.current.offset {
            self.scan_forward(offset);
            return Ok(());
        }
        if offset == self.mark.offset {
            self.reset();
            return Ok(());
        }
        if offset > self.mark.offset {
            let skipped = &self.text[offset..self.current.offset];
            if skipped.contains('\n') {
                // Rescan from the mark to recover the line number.
                self.current = self.mark;
                self.scan_forward(offset);
            } else {
                self.current.col -= u32::try_from(skipped.chars().count()).unwrap_or(u32::MAX);
                self.current.offset = offset;
            }
            return Ok(());
        }
        Err(ReaderError::SeekBeforeMark {
            target: offset,
            mark: self.mark.offset,
        })
    }

    /// Seek to a position whose line/column information is trusted to be
    /// correct for its offset (it came from this reader earlier). Backward
    /// moves then skip the rescan entirely.
    pub fn seek(&mut self, pos: FilePos) -> Result<(), ReaderError> {
        if pos.offset > self.text.len() {
            return Err(ReaderError::SeekPastEnd {
                target: pos.offset,
                len: self.text.len(),
            });
        }
        if !self.text.is_char_boundary(pos.offset) {
            return Err(ReaderError::InvalidPosition { offset: pos.offset });
        }
        if pos.offset == self.current.offset {
            Ok(())
        } else if pos.offset == self.mark.offset {
            self.reset();
            Ok(())
        } else if pos.offset > self.current.offset {
            self.scan_forward(pos.offset);
            Ok(())
        } else if pos.offset > self.mark.offset {
            self.current = Pos::assign(pos);
            Ok(())
        } else {
            Err(ReaderError::SeekBeforeMark {
                target: pos.offset,
                mark: self.mark.offset,
            })
        }
    }

    /// Read exactly `bytes` bytes forward and return them.
    pub fn read_string(&mut self, bytes: usize) -> Result<String, ReaderError> {
        if self.remaining() < bytes {
            return Err(ReaderError::Overrun { pos: self.pos() });
        }
        let target = self.current.offset + bytes;
        if !self.text.is_char_boundary(target) {
            return Err(ReaderError::InvalidPosition { offset: target });
        }
        let out = self.text[self.current.offset..target].to_string();
        self.scan_forward(target);
        Ok(out)
    }

    fn scan_forward(&mut self, target: usize) {
        while self.current.offset < target {
            let Some(ch) = self.text[self.current.offset..].chars().next() else {
                break;
            };
            self.current.advance(ch);
        }
    }
}
