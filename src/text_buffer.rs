use crate::error::AppError;

/// Bounded text with a logical cursor `0 <= cursor <= len`.
///
/// Capacity is enforced at the edit boundary: printable input beyond it is
/// dropped while deletion and cursor movement keep working.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextBuffer {
    chars: Vec<char>,
    cursor: usize,
    capacity: usize,
}

impl TextBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            chars: Vec::new(),
            cursor: 0,
            capacity,
        }
    }

    /// Pre-filled buffer with the cursor at the end. Text past capacity is cut.
    pub fn with_text(text: &str, capacity: usize) -> Result<Self, AppError> {
        let mut chars = Vec::new();
        let count = text.chars().count().min(capacity);
        chars.try_reserve_exact(count)?;
        chars.extend(text.chars().take(count));
        Ok(Self {
            cursor: chars.len(),
            chars,
            capacity,
        })
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.chars.len() >= self.capacity
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    /// Insert at the cursor and advance it. Returns false once full.
    pub fn insert(&mut self, c: char) -> Result<bool, AppError> {
        if self.is_full() {
            return Ok(false);
        }
        self.chars.try_reserve(1)?;
        self.chars.insert(self.cursor, c);
        self.cursor += 1;
        Ok(true)
    }

    /// Remove the character before the cursor.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.chars.remove(self.cursor);
        true
    }

    pub fn move_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn move_right(&mut self) -> bool {
        if self.cursor >= self.chars.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Screen `(row, col)` of the cursor when the text is wrapped at `width`
    /// columns, with the row held inside `height`.
    ///
    /// Walks the logical cursor forward through the wrap, so the result only
    /// depends on the cursor's place in the text, not on any earlier layout.
    pub fn cursor_position(&self, width: u16, height: u16) -> (u16, u16) {
        let width = width.max(1);
        let (mut row, mut col) = (0u16, 0u16);
        for _ in 0..self.cursor {
            col += 1;
            if col >= width {
                col = 0;
                row = row.saturating_add(1);
            }
        }
        (row.min(height.saturating_sub(1)), col)
    }

    /// The text cut into rows of at most `width` characters
    pub fn wrapped_lines(&self, width: u16) -> Vec<String> {
        let width = width.max(1) as usize;
        self.chars
            .chunks(width)
            .map(|chunk| chunk.iter().collect())
            .collect()
    }
}
