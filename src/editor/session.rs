//! The per-controller session state container.
//!
//! Everything the command surface mutates lives here: the active mode and
//! visual overlay, per-document mode memory, the sentence recorder, the
//! search state, bookmarks, quick snippets, and the user-facing message.
//! The session is constructed when a controller is created and dropped
//! with it; there is no global state, so tests run independent sessions
//! side by side.

use std::collections::HashMap;

use super::marks::BookmarkSet;
use super::mode::{Mode, ModeMemory};
use super::repeat::SentenceRecorder;
use crate::search::SearchState;

/// Represents a message to display to the user.
#[derive(Debug, Clone)]
pub struct Message {
    pub text: String,
    pub level: MessageLevel,
}

/// Message severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

pub struct Session {
    mode: Mode,
    visual: bool,
    key_capture: bool,
    doc_modes: ModeMemory,
    pub recorder: SentenceRecorder,
    /// Present from the first search on; the parameters of an accepted
    /// search stay available for next/previous match.
    pub search: Option<SearchState>,
    /// Mode to restore when the search is accepted or cancelled.
    pub search_prior_mode: Mode,
    pub bookmarks: BookmarkSet,
    /// Quick snippets by slot number.
    pub snippets: HashMap<usize, String>,
    message: Option<Message>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            mode: Mode::Normal,
            visual: false,
            key_capture: true,
            doc_modes: ModeMemory::new(),
            recorder: SentenceRecorder::new(),
            search: None,
            search_prior_mode: Mode::Normal,
            bookmarks: BookmarkSet::new(),
            snippets: HashMap::new(),
            message: None,
        }
    }

    /// The active mode. Never `Visual`; see [`Session::visual`].
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// The visual overlay flag. True only while the mode is Normal.
    pub fn visual(&self) -> bool {
        self.visual
    }

    pub fn set_visual(&mut self, visual: bool) {
        self.visual = visual;
    }

    /// Whether raw keys are routed to the dispatcher. Off in insert mode,
    /// where typing edits the document instead.
    pub fn key_capture(&self) -> bool {
        self.key_capture
    }

    pub fn set_key_capture(&mut self, capture: bool) {
        self.key_capture = capture;
    }

    /// Records the effective mode (Visual when the overlay is set) for a
    /// document, for restoration when focus returns to it.
    pub fn record_document_mode(&mut self, document: &str, mode: Mode) {
        self.doc_modes.record(document, mode);
    }

    pub fn lookup_document_mode(&self, document: &str) -> Option<&Mode> {
        self.doc_modes.lookup(document)
    }

    /// Drops the mode memory of a closed document.
    pub fn forget_document(&mut self, document: &str) {
        self.doc_modes.evict(document);
    }

    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    pub fn set_message(&mut self, text: String, level: MessageLevel) {
        self.message = Some(Message { text, level });
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_in_normal() {
        let session = Session::new();
        assert_eq!(session.mode(), &Mode::Normal);
        assert!(!session.visual());
        assert!(session.key_capture());
        assert!(session.search.is_none());
    }

    #[test]
    fn test_document_mode_round_trip() {
        let mut session = Session::new();
        session.record_document_mode("a.txt", Mode::Insert);
        assert_eq!(session.lookup_document_mode("a.txt"), Some(&Mode::Insert));
        session.forget_document("a.txt");
        assert_eq!(session.lookup_document_mode("a.txt"), None);
    }
}
