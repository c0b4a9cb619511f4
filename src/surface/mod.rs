//! The editor-surface seam.
//!
//! The controller core never owns document text, cursors, or the viewport.
//! It reads selections and text from an [`EditorSurface`], and asks the
//! surface to move selections, paint decorations, and scroll the primary
//! selection into view. A real editor implements this trait as an adapter;
//! tests and the demo binary use [`memory::MemorySurface`].
//!
//! All positions are byte offsets into the document text, which keeps the
//! search arithmetic flat: a match is `[offset, offset + pattern_len)`.

pub mod memory;

pub use memory::MemorySurface;

/// Half-open byte range into the document text.
///
/// # Example
///
/// ```
/// use modalkeys::surface::TextRange;
///
/// let range = TextRange::new(4, 7);
/// assert_eq!(range.len(), 3);
/// assert!(!range.is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    /// Creates a range; `start` and `end` are byte offsets, `end` exclusive.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// True if `offset` falls inside the range.
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

/// A selection with an anchor and an active end.
///
/// The active end is the one that moves; the anchor stays put when the
/// selection extends. A cursor is a selection whose ends coincide. Backward
/// selections (active before anchor) are legal and meaningful: after a
/// backward search the active end sits at the match start so the next
/// search continues from there.
///
/// # Example
///
/// ```
/// use modalkeys::surface::Selection;
///
/// let cursor = Selection::cursor(10);
/// assert!(cursor.is_empty());
///
/// let sel = Selection::new(10, 4);
/// assert_eq!(sel.start(), 4);
/// assert_eq!(sel.end(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: usize,
    pub active: usize,
}

impl Selection {
    pub fn new(anchor: usize, active: usize) -> Self {
        Self { anchor, active }
    }

    /// An empty selection (a plain cursor) at `offset`.
    pub fn cursor(offset: usize) -> Self {
        Self {
            anchor: offset,
            active: offset,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.active
    }

    /// The lower end, regardless of direction.
    pub fn start(&self) -> usize {
        self.anchor.min(self.active)
    }

    /// The upper end, regardless of direction.
    pub fn end(&self) -> usize {
        self.anchor.max(self.active)
    }

    /// The covered text as a range.
    pub fn range(&self) -> TextRange {
        TextRange::new(self.start(), self.end())
    }

    /// Collapses the selection onto its active end.
    pub fn collapsed(&self) -> Self {
        Self::cursor(self.active)
    }
}

/// Decoration channels the controller paints into.
///
/// Primary marks the matches the cursors landed on, secondary marks other
/// visible occurrences of the pattern, and bookmark marks bookmarked
/// positions. How each channel is colored is the presentation layer's
/// business (see [`crate::theme`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecorationKind {
    PrimaryMatch,
    SecondaryMatch,
    Bookmark,
}

/// What the controller core needs from the editor it is embedded in.
///
/// Implementations own the document and the cursor primitives; the core
/// only reads them and requests changes. Methods are expected to be cheap
/// and synchronous.
pub trait EditorSurface {
    /// Stable identity of the focused document. Used as the key for
    /// per-document mode memory.
    fn document_id(&self) -> &str;

    /// The full document text.
    fn text(&self) -> &str;

    /// Current selections, primary first. Never empty for a focused editor.
    fn selections(&self) -> &[Selection];

    /// Replaces all selections. The surface may merge overlapping
    /// selections; the core does not rely on the count being preserved.
    fn set_selections(&mut self, selections: Vec<Selection>);

    /// The currently visible portions of the document.
    fn visible_ranges(&self) -> Vec<TextRange>;

    /// Replaces the decoration set for one channel.
    fn set_decorations(&mut self, kind: DecorationKind, ranges: Vec<TextRange>);

    /// Scrolls the primary selection into view.
    fn reveal_primary(&mut self);

    /// Inserts `text` at every cursor, replacing any selected text.
    /// Used by quick snippets; the surface owns the actual mutation.
    fn insert_text(&mut self, text: &str);

    /// Replaces one byte range with `text`. This is the generic mutation
    /// primitive host-side commands build their edits from.
    fn replace_range(&mut self, range: TextRange, text: &str);
}
