//! In-memory editor surface for tests and the demo binary.

use std::collections::HashMap;

use super::{DecorationKind, EditorSurface, Selection, TextRange};

/// A self-contained [`EditorSurface`] over a plain `String`.
///
/// Besides implementing the surface trait, it tracks which events a real
/// editor would have fired ([`take_changes`](MemorySurface::take_changes))
/// so a host can forward them to the controller, and offers the cursor
/// primitives the demo binary needs (horizontal/vertical movement,
/// backward deletion).
///
/// # Example
///
/// ```
/// use modalkeys::surface::{EditorSurface, MemorySurface, Selection};
///
/// let mut surface = MemorySurface::new("notes.txt", "hello world");
/// surface.set_selections(vec![Selection::cursor(6)]);
/// surface.insert_text("big ");
/// assert_eq!(surface.text(), "hello big world");
/// ```
#[derive(Debug)]
pub struct MemorySurface {
    id: String,
    text: String,
    selections: Vec<Selection>,
    visible: Option<Vec<TextRange>>,
    decorations: HashMap<DecorationKind, Vec<TextRange>>,
    reveal_count: usize,
    text_changed: bool,
    selection_changed: bool,
}

impl MemorySurface {
    /// Creates a surface with a single cursor at offset 0.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            selections: vec![Selection::cursor(0)],
            visible: None,
            decorations: HashMap::new(),
            reveal_count: 0,
            text_changed: false,
            selection_changed: false,
        }
    }

    /// Restricts the visible portion of the document. By default the whole
    /// document is visible.
    pub fn set_visible_ranges(&mut self, ranges: Vec<TextRange>) {
        self.visible = Some(ranges);
    }

    /// Current decorations for one channel.
    pub fn decorations(&self, kind: DecorationKind) -> &[TextRange] {
        self.decorations.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// How many times the primary selection was revealed.
    pub fn reveal_count(&self) -> usize {
        self.reveal_count
    }

    /// The primary selection.
    pub fn primary(&self) -> Selection {
        self.selections[0]
    }

    /// Drains the pending change notifications: `(text_changed,
    /// selection_changed)`. A host forwards these to
    /// `Controller::on_text_changed` / `on_selection_changed` the way a
    /// real editor delivers its change events.
    pub fn take_changes(&mut self) -> (bool, bool) {
        let changes = (self.text_changed, self.selection_changed);
        self.text_changed = false;
        self.selection_changed = false;
        changes
    }

    /// Moves every cursor `delta` bytes horizontally (clamped to char
    /// boundaries), extending the selection when `extend` is set.
    pub fn move_horizontal(&mut self, delta: isize, extend: bool) {
        let text = self.text.clone();
        let moved = self
            .selections
            .iter()
            .map(|sel| {
                let active = step_offset(&text, sel.active, delta);
                if extend {
                    Selection::new(sel.anchor, active)
                } else {
                    Selection::cursor(active)
                }
            })
            .collect();
        self.set_selections(moved);
    }

    /// Moves every cursor one line up (`-1`) or down (`1`), keeping the
    /// column where the line is long enough.
    pub fn move_vertical(&mut self, delta: isize, extend: bool) {
        let text = self.text.clone();
        let moved = self
            .selections
            .iter()
            .map(|sel| {
                let active = step_line(&text, sel.active, delta);
                if extend {
                    Selection::new(sel.anchor, active)
                } else {
                    Selection::cursor(active)
                }
            })
            .collect();
        self.set_selections(moved);
    }

    /// Deletes the character before every cursor, or the selected text if a
    /// selection is active.
    pub fn delete_backward(&mut self) {
        let mut ordered: Vec<Selection> = self.selections.clone();
        ordered.sort_by_key(|s| std::cmp::Reverse(s.start()));

        let mut result = Vec::with_capacity(ordered.len());
        for sel in ordered {
            let range = if sel.is_empty() {
                let start = step_offset(&self.text, sel.active, -1);
                TextRange::new(start, sel.active)
            } else {
                sel.range()
            };
            self.text.replace_range(range.start..range.end, "");
            result.push(Selection::cursor(range.start));
        }

        result.reverse();
        self.text_changed = true;
        self.set_selections(result);
    }
}

impl EditorSurface for MemorySurface {
    fn document_id(&self) -> &str {
        &self.id
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn selections(&self) -> &[Selection] {
        &self.selections
    }

    fn set_selections(&mut self, selections: Vec<Selection>) {
        if selections.is_empty() {
            return;
        }
        if selections != self.selections {
            self.selection_changed = true;
        }
        self.selections = selections;
    }

    fn visible_ranges(&self) -> Vec<TextRange> {
        match &self.visible {
            Some(ranges) => ranges.clone(),
            None => vec![TextRange::new(0, self.text.len())],
        }
    }

    fn set_decorations(&mut self, kind: DecorationKind, ranges: Vec<TextRange>) {
        self.decorations.insert(kind, ranges);
    }

    fn reveal_primary(&mut self) {
        self.reveal_count += 1;
    }

    fn insert_text(&mut self, text: &str) {
        let mut ordered: Vec<Selection> = self.selections.clone();
        ordered.sort_by_key(|s| std::cmp::Reverse(s.start()));

        let mut result = Vec::with_capacity(ordered.len());
        for sel in ordered {
            let range = sel.range();
            self.text.replace_range(range.start..range.end, text);
            result.push(Selection::cursor(range.start + text.len()));
        }

        result.reverse();
        self.text_changed = true;
        self.set_selections(result);
    }

    fn replace_range(&mut self, range: TextRange, text: &str) {
        let start = range.start.min(self.text.len());
        let end = range.end.min(self.text.len()).max(start);
        self.text.replace_range(start..end, text);
        self.text_changed = true;

        let removed = end - start;
        let landing = start + text.len();
        let remap = |offset: usize| {
            if offset <= start {
                offset
            } else if offset >= end {
                offset - removed + text.len()
            } else {
                landing
            }
        };
        let remapped = self
            .selections
            .iter()
            .map(|sel| Selection::new(remap(sel.anchor), remap(sel.active)))
            .collect();
        self.set_selections(remapped);
    }
}

/// Steps `offset` by `delta` characters, staying on char boundaries and
/// inside the text.
fn step_offset(text: &str, offset: usize, delta: isize) -> usize {
    let mut offset = offset.min(text.len());
    if delta >= 0 {
        for _ in 0..delta {
            match text[offset..].chars().next() {
                Some(c) => offset += c.len_utf8(),
                None => break,
            }
        }
    } else {
        for _ in 0..delta.unsigned_abs() {
            match text[..offset].chars().next_back() {
                Some(c) => offset -= c.len_utf8(),
                None => break,
            }
        }
    }
    offset
}

/// Moves `offset` to the same column on an adjacent line.
fn step_line(text: &str, offset: usize, delta: isize) -> usize {
    let offset = offset.min(text.len());
    let line_start = text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = offset - line_start;

    let target_start = if delta < 0 {
        if line_start == 0 {
            return offset;
        }
        text[..line_start - 1].rfind('\n').map(|i| i + 1).unwrap_or(0)
    } else {
        match text[offset..].find('\n') {
            Some(i) => offset + i + 1,
            None => return offset,
        }
    };

    let target_len = text[target_start..]
        .find('\n')
        .unwrap_or(text.len() - target_start);
    target_start + column.min(target_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_text_at_cursor() {
        let mut surface = MemorySurface::new("doc", "abcdef");
        surface.set_selections(vec![Selection::cursor(3)]);
        surface.insert_text("XY");
        assert_eq!(surface.text(), "abcXYdef");
        assert_eq!(surface.primary(), Selection::cursor(5));
    }

    #[test]
    fn test_insert_text_replaces_selection() {
        let mut surface = MemorySurface::new("doc", "abcdef");
        surface.set_selections(vec![Selection::new(1, 4)]);
        surface.insert_text("-");
        assert_eq!(surface.text(), "a-ef");
    }

    #[test]
    fn test_insert_text_multi_cursor() {
        let mut surface = MemorySurface::new("doc", "a b c");
        surface.set_selections(vec![Selection::cursor(1), Selection::cursor(3)]);
        surface.insert_text("!");
        assert_eq!(surface.text(), "a! b! c");
    }

    #[test]
    fn test_delete_backward() {
        let mut surface = MemorySurface::new("doc", "abc");
        surface.set_selections(vec![Selection::cursor(2)]);
        surface.delete_backward();
        assert_eq!(surface.text(), "ac");
        assert_eq!(surface.primary(), Selection::cursor(1));
    }

    #[test]
    fn test_replace_range_remaps_selections() {
        let mut surface = MemorySurface::new("doc", "one two three");
        surface.set_selections(vec![Selection::cursor(8)]);
        surface.replace_range(TextRange::new(4, 8), "");
        assert_eq!(surface.text(), "one three");
        assert_eq!(surface.primary(), Selection::cursor(4));
    }

    #[test]
    fn test_change_tracking() {
        let mut surface = MemorySurface::new("doc", "abc");
        assert_eq!(surface.take_changes(), (false, false));

        surface.set_selections(vec![Selection::cursor(1)]);
        assert_eq!(surface.take_changes(), (false, true));

        surface.insert_text("x");
        let (text, _) = surface.take_changes();
        assert!(text);
    }

    #[test]
    fn test_vertical_movement_keeps_column() {
        let mut surface = MemorySurface::new("doc", "alpha\nbeta\ngamma");
        surface.set_selections(vec![Selection::cursor(3)]);
        surface.move_vertical(1, false);
        assert_eq!(surface.primary(), Selection::cursor(9)); // "beta" col 3
        surface.move_vertical(1, false);
        assert_eq!(surface.primary(), Selection::cursor(14)); // "gamma" col 3
    }

    #[test]
    fn test_whole_document_visible_by_default() {
        let surface = MemorySurface::new("doc", "hello");
        assert_eq!(surface.visible_ranges(), vec![TextRange::new(0, 5)]);
    }
}
