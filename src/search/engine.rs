//! Incremental multi-cursor search.
//!
//! The search runs one find per cursor, so multiple cursors each travel to
//! their own next match. Matching is literal (no regular expressions) over
//! byte offsets; overlapping results are not deduplicated, so cursors can
//! merge when their matches coincide.

use tracing::debug;

use super::offset::{unposition_delta, MatchOffset};
use crate::error::{Error, Result};
use crate::surface::{DecorationKind, EditorSurface, Selection, TextRange};

fn default_offset() -> String {
    "inclusive".to_string()
}

/// Parameters a `search` binding may carry. All fields are optional in
/// binding data; absent fields take the defaults below.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchArgs {
    /// Search towards the start of the document.
    pub backwards: bool,
    /// Match case exactly; the default folds both sides to lower case.
    pub case_sensitive: bool,
    /// Continue from the opposite end of the document when no match
    /// remains in the search direction.
    pub wrap_around: bool,
    /// Accept automatically once the pattern reaches this length.
    pub accept_after: Option<usize>,
    /// Extend from the pre-search anchor instead of selecting the match.
    pub select_till_match: bool,
    /// Cursor placement rule name, validated at accept time.
    pub offset: String,
}

impl Default for SearchArgs {
    fn default() -> Self {
        Self {
            backwards: false,
            case_sensitive: false,
            wrap_around: false,
            accept_after: None,
            select_till_match: false,
            offset: default_offset(),
        }
    }
}

/// A search in progress, or the remembered parameters of the last accepted
/// one. Kept after accept so next/previous match can re-run it.
#[derive(Debug, Clone)]
pub struct SearchState {
    pub args: SearchArgs,
    pub pattern: String,
    /// Selections as they were when the search started; restored on cancel
    /// and used as the origin while the pattern is being typed.
    pub start_selections: Vec<Selection>,
    /// Length the last accept positioned with.
    pub match_length: usize,
    /// Whether the cursor currently rests at the match start; drives the
    /// exact inverse shift before a re-run.
    pub at_start: bool,
    /// One-shot user-facing note from the last find (wrap or miss).
    pub info: Option<String>,
    /// True once decorations have been painted and may need clearing.
    pub changed: bool,
}

impl SearchState {
    /// Opens a new search from the surface's current selections.
    pub fn begin(args: SearchArgs, surface: &dyn EditorSurface) -> Self {
        Self {
            args,
            pattern: String::new(),
            start_selections: surface.selections().to_vec(),
            match_length: 0,
            at_start: false,
            info: None,
            changed: false,
        }
    }

    /// Finds the next match for every selection in `from` and applies the
    /// results to the surface.
    ///
    /// An empty pattern restores the start selections and clears all match
    /// decorations. Otherwise each cursor finds its nearest match in the
    /// search direction (retrying from the document boundary when
    /// `wrap_around` is set), the matches become the new selections, and
    /// visible non-current matches get the secondary decoration. A miss
    /// leaves that cursor in place and reports "Pattern not found".
    pub fn highlight_matches(&mut self, surface: &mut dyn EditorSurface, from: &[Selection]) {
        self.info = None;
        if self.pattern.is_empty() {
            surface.set_selections(self.start_selections.clone());
            surface.set_decorations(DecorationKind::PrimaryMatch, Vec::new());
            surface.set_decorations(DecorationKind::SecondaryMatch, Vec::new());
            return;
        }

        let doc = if self.args.case_sensitive {
            surface.text().to_string()
        } else {
            surface.text().to_lowercase()
        };
        let target = if self.args.case_sensitive {
            self.pattern.clone()
        } else {
            self.pattern.to_lowercase()
        };
        let backwards = self.args.backwards;

        let mut primary_ranges: Vec<TextRange> = Vec::new();
        let selections: Vec<Selection> = from
            .iter()
            .map(|sel| {
                let start_offs = sel.active;
                let mut found = if backwards {
                    last_index_of(&doc, &target, start_offs.saturating_sub(1))
                } else {
                    index_of(&doc, &target, start_offs)
                };
                if found.is_none() {
                    if self.args.wrap_around {
                        found = if backwards {
                            last_index_of(&doc, &target, doc.len())
                        } else {
                            index_of(&doc, &target, 0)
                        };
                    }
                    match found {
                        None => {
                            self.info = Some("Pattern not found".to_string());
                            return *sel;
                        }
                        Some(_) => {
                            let limit = |bw: bool| if bw { "TOP" } else { "BOTTOM" };
                            self.info = Some(format!(
                                "Search hit {} continuing at {}",
                                limit(backwards),
                                limit(!backwards)
                            ));
                        }
                    }
                }
                let offs = found.unwrap_or_default();
                // The match range is measured in the searched text, whose
                // byte length can differ from the pattern's after case
                // folding.
                let (start, end) = (offs, offs + target.len());
                primary_ranges.push(TextRange::new(start, end));

                let (active, anchor) = if backwards { (start, end) } else { (end, start) };
                let anchor = if self.args.select_till_match {
                    sel.anchor
                } else {
                    anchor
                };
                Selection::new(anchor, active)
            })
            .collect();

        surface.set_selections(selections);
        surface.reveal_primary();

        // Mark every other match inside the visible ranges, skipping the
        // current matches so the two decoration layers never overlap. A
        // match flush against a range start is not scanned.
        let mut other_ranges: Vec<TextRange> = Vec::new();
        for range in surface.visible_ranges() {
            // Host-supplied endpoints may land mid-character; pull them
            // back onto boundaries before slicing.
            let mut end = range.end.min(doc.len());
            while !doc.is_char_boundary(end) {
                end -= 1;
            }
            let mut start = range.start.min(end);
            while !doc.is_char_boundary(start) {
                start -= 1;
            }
            let text = &doc[start..end];
            let base = start;

            let mut offset = index_of(text, &target, 0);
            while let Some(o) = offset {
                if o == 0 {
                    break;
                }
                let found = TextRange::new(base + o, base + o + target.len());
                if !primary_ranges.contains(&found) {
                    other_ranges.push(found);
                }
                offset = index_of(text, &target, o + 1);
            }
        }

        debug!(
            pattern = %self.pattern,
            matches = primary_ranges.len(),
            others = other_ranges.len(),
            "search updated"
        );
        surface.set_decorations(DecorationKind::PrimaryMatch, primary_ranges);
        surface.set_decorations(DecorationKind::SecondaryMatch, other_ranges);
        self.changed = true;
    }

    /// Applies the offset policy after a match of `len` bytes was reached
    /// travelling in direction `forward`, and records where the cursor
    /// ended up relative to the match.
    pub fn position(
        &mut self,
        surface: &mut dyn EditorSurface,
        len: usize,
        forward: bool,
    ) -> Result<()> {
        let policy: MatchOffset = self
            .args
            .offset
            .parse()
            .map_err(|()| Error::BadOffset(self.args.offset.clone()))?;
        let (delta, at_start) = policy.position_delta(len, forward);
        self.at_start = at_start;
        self.shift_selections(surface, delta);
        Ok(())
    }

    /// Undoes the last positioning shift where it moved the cursor in the
    /// direction of the upcoming search, restoring the raw match boundary.
    pub fn unposition(&mut self, surface: &mut dyn EditorSurface, forward: bool) {
        let delta = unposition_delta(self.match_length, self.at_start, forward);
        self.shift_selections(surface, delta);
    }

    /// Finalizes the search at match length `len`: remembers the length
    /// and positions the cursor per the offset policy.
    pub fn accept(&mut self, surface: &mut dyn EditorSurface, len: usize) -> Result<()> {
        self.match_length = len;
        let forward = !self.args.backwards;
        self.position(surface, len, forward)
    }

    /// Re-runs the accepted search from the current selections, travelling
    /// in the configured direction.
    pub fn next_match(&mut self, surface: &mut dyn EditorSurface) -> Result<()> {
        if self.pattern.is_empty() {
            return Ok(());
        }
        let forward = !self.args.backwards;
        self.unposition(surface, forward);
        let from = surface.selections().to_vec();
        self.highlight_matches(surface, &from);
        self.position(surface, self.match_length, forward)?;
        surface.reveal_primary();
        Ok(())
    }

    /// Like [`next_match`](SearchState::next_match) with the direction
    /// flipped for this one run.
    pub fn previous_match(&mut self, surface: &mut dyn EditorSurface) -> Result<()> {
        if self.pattern.is_empty() {
            return Ok(());
        }
        self.args.backwards = !self.args.backwards;
        let result = self.next_match(surface);
        self.args.backwards = !self.args.backwards;
        result
    }

    fn shift_selections(&self, surface: &mut dyn EditorSurface, delta: isize) {
        if delta == 0 {
            return;
        }
        let len = surface.text().len();
        let selections: Vec<Selection> = surface
            .selections()
            .iter()
            .map(|sel| {
                let moved = sel.active.saturating_add_signed(delta).min(len);
                let anchor = if self.args.select_till_match {
                    sel.anchor
                } else {
                    moved
                };
                Selection::new(anchor, moved)
            })
            .collect();
        surface.set_selections(selections);
    }
}

/// First occurrence of `needle` at or after byte `from`. Out-of-range
/// `from` values clamp, and mid-character values round forward to the next
/// boundary.
pub(crate) fn index_of(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let mut from = from.min(haystack.len());
    while !haystack.is_char_boundary(from) {
        from += 1;
    }
    haystack[from..].find(needle).map(|i| i + from)
}

/// Last occurrence of `needle` starting at or before byte `from`.
pub(crate) fn last_index_of(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let mut i = from.min(haystack.len());
    loop {
        if haystack.is_char_boundary(i) && haystack[i..].starts_with(needle) {
            return Some(i);
        }
        if i == 0 {
            return None;
        }
        i -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;

    fn state(surface: &MemorySurface, args: SearchArgs) -> SearchState {
        SearchState::begin(args, surface)
    }

    #[test]
    fn test_index_of_matches_js_clamping() {
        assert_eq!(index_of("abcabc", "bc", 0), Some(1));
        assert_eq!(index_of("abcabc", "bc", 2), Some(4));
        assert_eq!(index_of("abcabc", "bc", 99), None);
        assert_eq!(last_index_of("abcabc", "abc", 99), Some(3));
        assert_eq!(last_index_of("abcabc", "abc", 2), Some(0));
        assert_eq!(last_index_of("abcabc", "zz", 99), None);
        // A match exactly at the probe position counts.
        assert_eq!(last_index_of("abcabc", "abc", 3), Some(3));
    }

    #[test]
    fn test_forward_search_selects_match() {
        let mut surface = MemorySurface::new("doc", "one two three two");
        let mut search = state(&surface, SearchArgs::default());
        search.pattern = "two".to_string();
        let from = surface.selections().to_vec();
        search.highlight_matches(&mut surface, &from);

        let sel = surface.primary();
        assert_eq!((sel.anchor, sel.active), (4, 7));
        assert!(search.info.is_none());
    }

    #[test]
    fn test_backward_search_flips_anchor_and_active() {
        let mut surface = MemorySurface::new("doc", "one two three");
        surface.set_selections(vec![Selection::cursor(13)]);
        let mut search = state(
            &surface,
            SearchArgs {
                backwards: true,
                ..SearchArgs::default()
            },
        );
        search.pattern = "two".to_string();
        let from = surface.selections().to_vec();
        search.highlight_matches(&mut surface, &from);

        let sel = surface.primary();
        assert_eq!((sel.anchor, sel.active), (7, 4));
    }

    #[test]
    fn test_miss_without_wrap_reports_and_stays() {
        let mut surface = MemorySurface::new("doc", "alpha beta");
        surface.set_selections(vec![Selection::cursor(6)]);
        let mut search = state(&surface, SearchArgs::default());
        search.pattern = "alpha".to_string();
        let from = surface.selections().to_vec();
        search.highlight_matches(&mut surface, &from);

        assert_eq!(surface.primary(), Selection::cursor(6));
        assert_eq!(search.info.as_deref(), Some("Pattern not found"));
    }

    #[test]
    fn test_wraparound_reports_boundary() {
        let mut surface = MemorySurface::new("doc", "alpha beta");
        surface.set_selections(vec![Selection::cursor(6)]);
        let mut search = state(
            &surface,
            SearchArgs {
                wrap_around: true,
                ..SearchArgs::default()
            },
        );
        search.pattern = "alpha".to_string();
        let from = surface.selections().to_vec();
        search.highlight_matches(&mut surface, &from);

        assert_eq!(surface.primary().range(), TextRange::new(0, 5));
        assert_eq!(
            search.info.as_deref(),
            Some("Search hit BOTTOM continuing at TOP")
        );
    }

    #[test]
    fn test_case_insensitive_by_default() {
        let mut surface = MemorySurface::new("doc", "say Hello there");
        let mut search = state(&surface, SearchArgs::default());
        search.pattern = "hello".to_string();
        let from = surface.selections().to_vec();
        search.highlight_matches(&mut surface, &from);
        assert_eq!(surface.primary().range(), TextRange::new(4, 9));
    }

    #[test]
    fn test_select_till_match_pins_anchor() {
        let mut surface = MemorySurface::new("doc", "one two three");
        surface.set_selections(vec![Selection::new(0, 2)]);
        let mut search = state(
            &surface,
            SearchArgs {
                select_till_match: true,
                ..SearchArgs::default()
            },
        );
        search.pattern = "three".to_string();
        let from = surface.selections().to_vec();
        search.highlight_matches(&mut surface, &from);

        let sel = surface.primary();
        assert_eq!(sel.anchor, 0);
        assert_eq!(sel.active, 13);
    }

    #[test]
    fn test_each_cursor_finds_its_own_match() {
        let mut surface = MemorySurface::new("doc", "ab x ab y ab");
        surface.set_selections(vec![Selection::cursor(0), Selection::cursor(6)]);
        let mut search = state(&surface, SearchArgs::default());
        search.pattern = "ab".to_string();
        let from = surface.selections().to_vec();
        search.highlight_matches(&mut surface, &from);

        let sels = surface.selections().to_vec();
        assert_eq!(sels.len(), 2);
        assert_eq!(sels[0].range(), TextRange::new(0, 2));
        assert_eq!(sels[1].range(), TextRange::new(10, 12));
    }

    #[test]
    fn test_empty_pattern_restores_start() {
        let mut surface = MemorySurface::new("doc", "one two");
        surface.set_selections(vec![Selection::cursor(3)]);
        let mut search = state(&surface, SearchArgs::default());
        search.pattern = "two".to_string();
        let from = surface.selections().to_vec();
        search.highlight_matches(&mut surface, &from);
        assert_ne!(surface.primary(), Selection::cursor(3));

        search.pattern.clear();
        let from = surface.selections().to_vec();
        search.highlight_matches(&mut surface, &from);
        assert_eq!(surface.primary(), Selection::cursor(3));
        assert!(surface.decorations(DecorationKind::PrimaryMatch).is_empty());
    }

    #[test]
    fn test_secondary_marks_visible_non_current_matches() {
        let mut surface = MemorySurface::new("doc", "x ab ab ab");
        surface.set_visible_ranges(vec![TextRange::new(0, 10)]);
        let mut search = state(&surface, SearchArgs::default());
        search.pattern = "ab".to_string();
        let from = surface.selections().to_vec();
        search.highlight_matches(&mut surface, &from);

        // Current match at 2..4; the rest are marked as other matches.
        assert_eq!(
            surface.decorations(DecorationKind::PrimaryMatch),
            &[TextRange::new(2, 4)]
        );
        assert_eq!(
            surface.decorations(DecorationKind::SecondaryMatch),
            &[TextRange::new(5, 7), TextRange::new(8, 10)]
        );
    }

    #[test]
    fn test_secondary_scan_skips_range_initial_match() {
        // A match flush against the start of a visible range ends the
        // scan for that range before it marks anything.
        let mut surface = MemorySurface::new("doc", "ab ab ab");
        surface.set_selections(vec![Selection::cursor(3)]);
        surface.set_visible_ranges(vec![TextRange::new(0, 8)]);
        let mut search = state(&surface, SearchArgs::default());
        search.pattern = "ab".to_string();
        let from = surface.selections().to_vec();
        search.highlight_matches(&mut surface, &from);

        assert!(surface
            .decorations(DecorationKind::SecondaryMatch)
            .is_empty());
    }

    #[test]
    fn test_visible_range_endpoints_mid_character_are_clamped() {
        // End offset 9 splits the trailing two-byte character.
        let mut surface = MemorySurface::new("doc", "x ab ab é");
        surface.set_visible_ranges(vec![TextRange::new(0, 9)]);
        let mut search = state(&surface, SearchArgs::default());
        search.pattern = "ab".to_string();
        let from = surface.selections().to_vec();
        search.highlight_matches(&mut surface, &from);

        assert_eq!(
            surface.decorations(DecorationKind::SecondaryMatch),
            &[TextRange::new(5, 7)]
        );
    }

    #[test]
    fn test_accept_then_next_match_advances() {
        let mut surface = MemorySurface::new("doc", "go go go");
        let mut search = state(&surface, SearchArgs::default());
        search.pattern = "go".to_string();
        let from = surface.selections().to_vec();
        search.highlight_matches(&mut surface, &from);
        search.accept(&mut surface, 2).unwrap();
        assert_eq!(surface.primary().active, 2);

        search.next_match(&mut surface).unwrap();
        assert_eq!(surface.primary().range(), TextRange::new(3, 5));
    }

    #[test]
    fn test_next_then_previous_returns() {
        let mut surface = MemorySurface::new("doc", "go go go");
        let mut search = state(&surface, SearchArgs::default());
        search.pattern = "go".to_string();
        let from = surface.selections().to_vec();
        search.highlight_matches(&mut surface, &from);
        search.accept(&mut surface, 2).unwrap();

        search.next_match(&mut surface).unwrap();
        let advanced = surface.primary();
        search.previous_match(&mut surface).unwrap();
        assert_eq!(surface.primary().range(), TextRange::new(0, 2));
        assert_ne!(surface.primary(), advanced);
    }

    #[test]
    fn test_bad_offset_is_reported() {
        let mut surface = MemorySurface::new("doc", "go go");
        let mut search = state(
            &surface,
            SearchArgs {
                offset: "sideways".to_string(),
                ..SearchArgs::default()
            },
        );
        search.pattern = "go".to_string();
        let err = search.accept(&mut surface, 2).unwrap_err();
        assert!(matches!(err, Error::BadOffset(ref o) if o == "sideways"));
    }

    #[test]
    fn test_exclusive_offset_round_trips() {
        let mut surface = MemorySurface::new("doc", "two two");
        let mut search = state(
            &surface,
            SearchArgs {
                offset: "exclusive".to_string(),
                ..SearchArgs::default()
            },
        );
        search.pattern = "two".to_string();
        let from = surface.selections().to_vec();
        search.highlight_matches(&mut surface, &from);
        search.accept(&mut surface, 3).unwrap();
        // Exclusive forward lands before the match.
        assert_eq!(surface.primary().active, 0);
        assert!(search.at_start);

        // The next search first restores the raw boundary, so the same
        // match is not found twice.
        search.next_match(&mut surface).unwrap();
        assert_eq!(surface.primary().active, 4);
        assert!(search.info.is_none());
    }
}
