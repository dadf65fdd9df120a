use std::cmp;

#[derive(Clone, Debug, PartialEq)]
pub enum EditOperation {
    InsertChar { line: usize, col: usize, ch: char },
    DeleteChar { line: usize, col: usize, ch: char },
    InsertNewline { line: usize, col: usize },
    DeleteNewline { line: usize, col: usize, next_line: String },
}

/// Text buffer behind a form field. Holds cursor, scroll and undo history;
/// the text itself is written back to planner state after every edit.
#[derive(Debug, Clone)]
pub struct Editor {
    pub lines: Vec<String>,
    pub cursor_line: usize,
    pub cursor_col: usize,
    pub scroll_offset: usize, // Vertical scroll (line offset)
    pub scroll_col: usize,    // Horizontal scroll (column offset)
    pub undo_stack: Vec<EditOperation>,
    pub max_history: usize,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_line: 0,
            cursor_col: 0,
            scroll_offset: 0,
            scroll_col: 0,
            undo_stack: Vec::new(),
            max_history: 100,
        }
    }

    /// Load text and place the cursor at its end.
    /// Splits on '\n' so a trailing newline keeps its empty last line.
    pub fn from_string(content: &str) -> Self {
        let lines: Vec<String> = content.split('\n').map(str::to_string).collect();
        let cursor_line = lines.len().saturating_sub(1);
        // chars().count() for UTF-8 safe column
        let cursor_col = lines.last().map(|l| l.chars().count()).unwrap_or(0);
        Self {
            lines,
            cursor_line,
            cursor_col,
            ..Self::new()
        }
    }

    fn ensure_cursor_valid(&mut self) {
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        if self.cursor_line >= self.lines.len() {
            self.cursor_line = self.lines.len() - 1;
        }
        let len = self.current_line_len();
        self.cursor_col = cmp::min(self.cursor_col, len);
    }

    fn current_line_len(&self) -> usize {
        self.lines
            .get(self.cursor_line)
            .map(|l| l.chars().count())
            .unwrap_or(0)
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' {
            self.insert_newline();
            return;
        }
        self.ensure_cursor_valid();
        let op = EditOperation::InsertChar {
            line: self.cursor_line,
            col: self.cursor_col,
            ch,
        };
        let line = &mut self.lines[self.cursor_line];
        let mut chars: Vec<char> = line.chars().collect();
        chars.insert(self.cursor_col, ch);
        *line = chars.into_iter().collect();
        self.cursor_col += 1;
        self.add_to_undo(op);
    }

    /// Backspace: delete before the cursor, merging lines at column 0
    pub fn delete_char(&mut self) {
        self.ensure_cursor_valid();
        if self.cursor_col > 0 {
            let line = &mut self.lines[self.cursor_line];
            let mut chars: Vec<char> = line.chars().collect();
            let ch = chars.remove(self.cursor_col - 1);
            *line = chars.into_iter().collect();
            self.cursor_col -= 1;
            self.add_to_undo(EditOperation::DeleteChar {
                line: self.cursor_line,
                col: self.cursor_col,
                ch,
            });
        } else if self.cursor_line > 0 {
            let current_line = self.lines.remove(self.cursor_line);
            self.cursor_line -= 1;
            let prev_line = &mut self.lines[self.cursor_line];
            self.cursor_col = prev_line.chars().count();
            prev_line.push_str(&current_line);
            self.add_to_undo(EditOperation::DeleteNewline {
                line: self.cursor_line,
                col: self.cursor_col,
                next_line: current_line,
            });
        }
    }

    /// Delete key: delete under the cursor, pulling the next line up at line end
    pub fn delete_forward(&mut self) {
        self.ensure_cursor_valid();
        if self.cursor_col < self.current_line_len() {
            self.cursor_col += 1;
            self.delete_char();
        } else if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.cursor_col = 0;
            self.delete_char();
        }
    }

    pub fn insert_newline(&mut self) {
        self.ensure_cursor_valid();
        let op = EditOperation::InsertNewline {
            line: self.cursor_line,
            col: self.cursor_col,
        };
        let line = &mut self.lines[self.cursor_line];
        let mut chars: Vec<char> = line.chars().collect();
        let remainder: String = chars.split_off(self.cursor_col).into_iter().collect();
        *line = chars.into_iter().collect();
        self.lines.insert(self.cursor_line + 1, remainder);
        self.cursor_line += 1;
        self.cursor_col = 0;
        self.add_to_undo(op);
    }

    pub fn move_cursor_up(&mut self) {
        if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = cmp::min(self.cursor_col, self.current_line_len());
        }
    }

    pub fn move_cursor_down(&mut self) {
        if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.cursor_col = cmp::min(self.cursor_col, self.current_line_len());
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = self.current_line_len();
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_col < self.current_line_len() {
            self.cursor_col += 1;
        } else if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.cursor_col = 0;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_col = self.current_line_len();
    }

    fn add_to_undo(&mut self, op: EditOperation) {
        self.undo_stack.push(op);
        if self.undo_stack.len() > self.max_history {
            self.undo_stack.remove(0);
        }
    }

    /// Revert the last edit. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(op) = self.undo_stack.pop() else {
            return false;
        };
        match op {
            EditOperation::InsertChar { line, col, .. } => {
                if let Some(line_str) = self.lines.get_mut(line) {
                    let mut chars: Vec<char> = line_str.chars().collect();
                    if col < chars.len() {
                        chars.remove(col);
                        *line_str = chars.into_iter().collect();
                    }
                }
                self.cursor_line = line;
                self.cursor_col = col;
            }
            EditOperation::DeleteChar { line, col, ch } => {
                if let Some(line_str) = self.lines.get_mut(line) {
                    let mut chars: Vec<char> = line_str.chars().collect();
                    if col <= chars.len() {
                        chars.insert(col, ch);
                        *line_str = chars.into_iter().collect();
                    }
                }
                self.cursor_line = line;
                self.cursor_col = col + 1;
            }
            EditOperation::InsertNewline { line, col } => {
                if line + 1 < self.lines.len() {
                    let next_line = self.lines.remove(line + 1);
                    if let Some(line_str) = self.lines.get_mut(line) {
                        line_str.push_str(&next_line);
                    }
                }
                self.cursor_line = line;
                self.cursor_col = col;
            }
            EditOperation::DeleteNewline { line, col, next_line } => {
                if let Some(line_str) = self.lines.get_mut(line) {
                    let mut chars: Vec<char> = line_str.chars().collect();
                    let split = cmp::min(col, chars.len());
                    chars.truncate(split);
                    *line_str = chars.into_iter().collect();
                    self.lines.insert(line + 1, next_line);
                }
                self.cursor_line = line + 1;
                self.cursor_col = 0;
            }
        }
        self.ensure_cursor_valid();
        true
    }

    pub fn update_scroll(&mut self, viewport_height: usize) {
        if viewport_height == 0 {
            return;
        }
        if self.cursor_line < self.scroll_offset {
            self.scroll_offset = self.cursor_line;
        } else if self.cursor_line >= self.scroll_offset + viewport_height {
            self.scroll_offset = self.cursor_line + 1 - viewport_height;
        }
    }

    /// viewport_width is the content width, borders already removed
    pub fn update_horizontal_scroll(&mut self, viewport_width: usize) {
        if viewport_width == 0 {
            return;
        }
        if self.cursor_col < self.scroll_col {
            self.scroll_col = self.cursor_col;
        } else if self.cursor_col >= self.scroll_col + viewport_width {
            self.scroll_col = self.cursor_col + 1 - viewport_width;
        }
    }

    /// Lines inside the viewport, horizontally scrolled and clipped
    pub fn visible_lines(&self, viewport_height: usize, viewport_width: usize) -> Vec<String> {
        let start = cmp::min(self.scroll_offset, self.lines.len());
        let end = cmp::min(start + viewport_height, self.lines.len());
        self.lines[start..end]
            .iter()
            .map(|line| line.chars().skip(self.scroll_col).take(viewport_width).collect())
            .collect()
    }

    /// Cursor position relative to the viewport's top-left, if visible
    pub fn cursor_offset(&self, viewport_height: usize, viewport_width: usize) -> Option<(u16, u16)> {
        if self.cursor_line < self.scroll_offset || self.cursor_col < self.scroll_col {
            return None;
        }
        let row = self.cursor_line - self.scroll_offset;
        let col = self.cursor_col - self.scroll_col;
        if row >= viewport_height || col > viewport_width {
            return None;
        }
        Some((col as u16, row as u16))
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(editor: &mut Editor, text: &str) {
        for ch in text.chars() {
            editor.insert_char(ch);
        }
    }

    #[test]
    fn test_from_string_keeps_trailing_newline() {
        let editor = Editor::from_string("Ch1\n");
        assert_eq!(editor.lines, vec!["Ch1", ""]);
        assert_eq!(editor.text(), "Ch1\n");
        assert_eq!((editor.cursor_line, editor.cursor_col), (1, 0));
    }

    #[test]
    fn test_typing_and_newlines() {
        let mut editor = Editor::new();
        type_str(&mut editor, "Ch1\nCh2");
        assert_eq!(editor.text(), "Ch1\nCh2");
        assert_eq!((editor.cursor_line, editor.cursor_col), (1, 3));
    }

    #[test]
    fn test_backspace_merges_lines() {
        let mut editor = Editor::from_string("ab\ncd");
        editor.move_cursor_home();
        editor.delete_char();
        assert_eq!(editor.text(), "abcd");
        assert_eq!((editor.cursor_line, editor.cursor_col), (0, 2));
    }

    #[test]
    fn test_delete_forward() {
        let mut editor = Editor::from_string("ab\ncd");
        editor.move_cursor_up();
        editor.move_cursor_end();
        editor.delete_forward();
        assert_eq!(editor.text(), "abcd");
        editor.move_cursor_home();
        editor.delete_forward();
        assert_eq!(editor.text(), "bcd");
    }

    #[test]
    fn test_multibyte_characters() {
        let mut editor = Editor::new();
        type_str(&mut editor, "Kapitel ü");
        editor.delete_char();
        type_str(&mut editor, "ö");
        assert_eq!(editor.text(), "Kapitel ö");
    }

    #[test]
    fn test_undo_reverts_each_operation() {
        let mut editor = Editor::new();
        type_str(&mut editor, "ab\nc");
        editor.delete_char();
        editor.delete_char(); // merges "" back into "ab"
        assert_eq!(editor.text(), "ab");

        assert!(editor.undo());
        assert_eq!(editor.text(), "ab\n");
        assert!(editor.undo());
        assert_eq!(editor.text(), "ab\nc");
        while editor.undo() {}
        assert_eq!(editor.text(), "");
    }

    #[test]
    fn test_scroll_follows_cursor() {
        let mut editor = Editor::from_string("1\n2\n3\n4\n5");
        editor.update_scroll(2);
        assert_eq!(editor.scroll_offset, 3);
        assert_eq!(editor.visible_lines(2, 10), vec!["4", "5"]);

        editor.cursor_line = 0;
        editor.update_scroll(2);
        assert_eq!(editor.scroll_offset, 0);
    }

    #[test]
    fn test_horizontal_scroll_and_cursor_offset() {
        let mut editor = Editor::from_string("abcdefgh");
        editor.update_horizontal_scroll(4);
        assert_eq!(editor.scroll_col, 5);
        assert_eq!(editor.visible_lines(1, 4), vec!["fgh"]);
        assert_eq!(editor.cursor_offset(1, 4), Some((3, 0)));
    }
}
