//! Word and sentence recording for the repeat commands.
//!
//! Completed key sequences are remembered as *words*: a word that
//! establishes a selection is a noun, a word that mutates the document is a
//! verb, and the most recent (noun, verb) pair forms the *sentence* that
//! "repeat last change" replays. The recorder assembles sentences by
//! watching the text-changed and selection-changed signals the host editor
//! delivers between keystrokes.

use serde_json::json;

use super::controller::names;
use super::mode::Mode;
use crate::error::{Error, Result};
use crate::input::dispatcher::Invocation;

/// Storage of one word: either raw keys still being collected, or a
/// resolved command used when the word is reconstructed purely as a replay
/// of a stored action. Once a word is resolved, no further raw keys may be
/// appended to it.
#[derive(Debug, Clone, PartialEq)]
pub enum WordSeq {
    Raw(Vec<String>),
    Resolved(Invocation),
}

/// One completed (or in-progress) key sequence or resolved command, tagged
/// with the mode it was issued in.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyWord {
    pub seq: WordSeq,
    pub mode: Mode,
}

impl KeyWord {
    /// A fresh, empty raw-sequence word. The first appended key stamps the
    /// word's mode.
    pub fn empty() -> Self {
        Self {
            seq: WordSeq::Raw(Vec::new()),
            mode: Mode::Normal,
        }
    }

    /// A word that replays a resolved command instead of raw keys.
    pub fn resolved(invocation: Invocation, mode: Mode) -> Self {
        Self {
            seq: WordSeq::Resolved(invocation),
            mode,
        }
    }

    /// Appends a raw key. Errors if the word was finalized as a resolved
    /// command; the first key of a fresh word stamps the word's mode.
    pub fn push_key(&mut self, key: &str, mode: &Mode) -> Result<()> {
        match &mut self.seq {
            WordSeq::Resolved(_) => Err(Error::FinalizedWord),
            WordSeq::Raw(seq) => {
                if seq.is_empty() {
                    self.mode = mode.clone();
                }
                seq.push(key.to_string());
                Ok(())
            }
        }
    }

    /// The keys joined for status display; empty for resolved commands.
    pub fn key_text(&self) -> String {
        match &self.seq {
            WordSeq::Raw(seq) => seq.concat(),
            WordSeq::Resolved(_) => String::new(),
        }
    }

    /// True for a raw word with no keys yet.
    pub fn is_empty(&self) -> bool {
        matches!(&self.seq, WordSeq::Raw(seq) if seq.is_empty())
    }
}

impl Default for KeyWord {
    fn default() -> Self {
        Self::empty()
    }
}

/// The (noun, verb) pair the repeat commands draw from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeySentence {
    /// The most recent selection-establishing word.
    pub noun: Option<KeyWord>,
    /// The most recent mutation word.
    pub verb: Option<KeyWord>,
}

/// The synthetic noun used once text has been mutated: the prior selection
/// is presumed consumed, so the next noun defaults to collapsing stray
/// cursors unless an explicit selection event supersedes it.
fn collapse_selections_word(mode: Mode) -> KeyWord {
    KeyWord::resolved(
        Invocation::new(names::CANCEL_MULTIPLE_SELECTIONS, json!(null)),
        mode,
    )
}

/// Tracks words, sentences, and the change flags that drive them.
///
/// The flags are set asynchronously by the host (text-changed and
/// selection-changed events) and consumed at the start of the next
/// keystroke; `replaying` makes a repeat command's own effects invisible to
/// the bookkeeping so a replay never becomes the new "last change".
#[derive(Debug, Default)]
pub struct SentenceRecorder {
    text_changed: bool,
    selection_changed: bool,
    selection_used: bool,
    ignore_changed_text: bool,
    replaying: bool,
    pub last_sentence: KeySentence,
    pub pending_sentence: KeySentence,
    pub last_word: KeyWord,
    pub current_word: KeyWord,
}

impl SentenceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host signal: document text changed outside an explicit repeat.
    pub fn observe_text_changed(&mut self) {
        self.text_changed = true;
    }

    /// Host signal: selections changed; `any_selected` is true when any
    /// resulting selection is non-empty. Ignored while a text change is
    /// already pending or the one-shot ignore override is set.
    pub fn observe_selection_changed(&mut self, any_selected: bool) {
        if !self.text_changed && !self.ignore_changed_text {
            self.selection_changed = true;
            self.selection_used = any_selected;
        }
    }

    /// Forces the next action to be treated as a document-mutating change.
    pub fn touch(&mut self) {
        self.text_changed = true;
    }

    /// Suppresses change treatment for the next action (e.g. undo).
    pub fn untouch(&mut self) {
        self.ignore_changed_text = true;
    }

    pub fn is_replaying(&self) -> bool {
        self.replaying
    }

    /// Marks the start of a repeat command so the replayed action does not
    /// corrupt the state it is replaying.
    pub fn begin_replay(&mut self) {
        self.replaying = true;
    }

    /// Per-keystroke bookkeeping, run before the key is dispatched.
    ///
    /// Commits the pending sentence when text changed (the finished verb is
    /// `last_word`), or re-points the pending noun when only the selection
    /// changed. During a replay the flags are consumed without effect.
    pub fn commit_pending(&mut self) {
        if !self.replaying {
            if self.text_changed && !self.ignore_changed_text {
                self.last_sentence = KeySentence {
                    noun: self.pending_sentence.noun.clone(),
                    verb: Some(self.last_word.clone()),
                };
                self.pending_sentence = KeySentence {
                    noun: Some(collapse_selections_word(Mode::Normal)),
                    verb: None,
                };
                self.text_changed = false;
            }
            if self.selection_changed && !self.ignore_changed_text {
                self.pending_sentence = KeySentence {
                    noun: Some(if self.selection_used {
                        self.last_word.clone()
                    } else {
                        collapse_selections_word(self.last_word.mode.clone())
                    }),
                    verb: None,
                };
                self.selection_changed = false;
            }
            self.ignore_changed_text = false;
        } else {
            self.replaying = false;
            self.selection_changed = false;
            self.selection_used = false;
            self.text_changed = false;
        }
    }

    /// Appends the just-typed key to the word in progress.
    pub fn push_key(&mut self, key: &str, mode: &Mode) -> Result<()> {
        self.current_word.push_key(key, mode)
    }

    /// Promotes the finished word to `last_word` and starts a fresh one.
    pub fn promote_current(&mut self) {
        self.last_word = std::mem::take(&mut self.current_word);
    }

    /// Abandons the word in progress (normal-mode entry does this).
    pub fn reset_current(&mut self) {
        self.current_word = KeyWord::empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed_word(keys: &[&str], mode: Mode) -> KeyWord {
        let mut word = KeyWord::empty();
        for key in keys {
            word.push_key(key, &mode).unwrap();
        }
        word
    }

    #[test]
    fn test_first_key_stamps_mode() {
        let word = typed_word(&["d", "w"], Mode::Visual);
        assert_eq!(word.mode, Mode::Visual);
        assert_eq!(word.key_text(), "dw");
    }

    #[test]
    fn test_resolved_word_rejects_keys() {
        let mut word = KeyWord::resolved(
            Invocation::new(names::CANCEL_MULTIPLE_SELECTIONS, json!(null)),
            Mode::Normal,
        );
        assert!(matches!(
            word.push_key("x", &Mode::Normal),
            Err(Error::FinalizedWord)
        ));
    }

    #[test]
    fn test_text_change_commits_sentence() {
        let mut recorder = SentenceRecorder::new();
        recorder.current_word = typed_word(&["d", "w"], Mode::Normal);
        recorder.promote_current();
        recorder.observe_text_changed();
        recorder.commit_pending();

        let verb = recorder.last_sentence.verb.as_ref().unwrap();
        assert_eq!(verb.key_text(), "dw");
        // The next noun defaults to collapsing secondary selections.
        let noun = recorder.pending_sentence.noun.as_ref().unwrap();
        assert!(matches!(&noun.seq, WordSeq::Resolved(inv)
            if inv.command == names::CANCEL_MULTIPLE_SELECTIONS));
    }

    #[test]
    fn test_selection_change_sets_noun() {
        let mut recorder = SentenceRecorder::new();
        recorder.current_word = typed_word(&["v", "w"], Mode::Normal);
        recorder.promote_current();
        recorder.observe_selection_changed(true);
        recorder.commit_pending();

        let noun = recorder.pending_sentence.noun.as_ref().unwrap();
        assert_eq!(noun.key_text(), "vw");
    }

    #[test]
    fn test_replay_consumes_flags_without_commit() {
        let mut recorder = SentenceRecorder::new();
        recorder.begin_replay();
        recorder.observe_text_changed();
        recorder.commit_pending();

        assert!(!recorder.is_replaying());
        assert_eq!(recorder.last_sentence, KeySentence::default());

        // Flags were consumed; the next keystroke commits nothing.
        recorder.commit_pending();
        assert_eq!(recorder.last_sentence, KeySentence::default());
    }

    #[test]
    fn test_untouch_suppresses_one_change() {
        let mut recorder = SentenceRecorder::new();
        recorder.untouch();
        recorder.observe_text_changed();
        recorder.commit_pending();
        assert!(recorder.last_sentence.verb.is_none());
    }
}
