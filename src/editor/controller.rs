//! The command surface and keystroke pipeline.
//!
//! A [`Controller`] owns an editor surface, a key dispatcher, and one
//! [`Session`]. The host feeds it keystrokes and text/selection change
//! notifications; it decides which mode each key is interpreted in, keeps
//! the repeat recorder consistent, and drives the search engine. Every
//! operation is reachable both as a typed method and by name through
//! [`Controller::execute`], which is what key bindings resolve to.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace, warn};

use super::marks::Bookmark;
use super::mode::Mode;
use super::repeat::WordSeq;
use super::session::{MessageLevel, Session};
use crate::config::presets;
use crate::error::{Error, Result};
use crate::input::dispatcher::{Invocation, KeyDispatcher};
use crate::input::keymap::KeymapDispatcher;
use crate::search::{SearchArgs, SearchState};
use crate::surface::{DecorationKind, EditorSurface, Selection, TextRange};

/// Command names, as they appear in key binding files.
pub mod names {
    pub const ENTER_MODE: &str = "modalkeys.enterMode";
    pub const ENTER_NORMAL: &str = "modalkeys.enterNormal";
    pub const ENTER_INSERT: &str = "modalkeys.enterInsert";
    pub const TOGGLE_SELECTION: &str = "modalkeys.toggleSelection";
    pub const ENABLE_SELECTION: &str = "modalkeys.enableSelection";
    pub const CANCEL_SELECTION: &str = "modalkeys.cancelSelection";
    pub const CANCEL_MULTIPLE_SELECTIONS: &str = "modalkeys.cancelMultipleSelections";
    pub const SEARCH: &str = "modalkeys.search";
    pub const CANCEL_SEARCH: &str = "modalkeys.cancelSearch";
    pub const DELETE_CHAR_FROM_SEARCH: &str = "modalkeys.deleteCharFromSearch";
    pub const NEXT_MATCH: &str = "modalkeys.nextMatch";
    pub const PREVIOUS_MATCH: &str = "modalkeys.previousMatch";
    pub const TYPE_KEYS: &str = "modalkeys.typeKeys";
    pub const REPEAT_LAST_CHANGE: &str = "modalkeys.repeatLastChange";
    pub const REPEAT_LAST_USED_SELECTION: &str = "modalkeys.repeatLastUsedSelection";
    pub const TOUCH_DOCUMENT: &str = "modalkeys.touchDocument";
    pub const UNTOUCH_DOCUMENT: &str = "modalkeys.untouchDocument";
    pub const IMPORT_PRESETS: &str = "modalkeys.importPresets";
    pub const DEFINE_BOOKMARK: &str = "modalkeys.defineBookmark";
    pub const GOTO_BOOKMARK: &str = "modalkeys.gotoBookmark";
    pub const CLEAR_BOOKMARKS: &str = "modalkeys.clearBookmarks";
    pub const DEFINE_QUICK_SNIPPET: &str = "modalkeys.defineQuickSnippet";
    pub const INSERT_QUICK_SNIPPET: &str = "modalkeys.insertQuickSnippet";
}

/// Editor-owned commands the controller does not know about.
///
/// Key bindings are free to name commands the host editor implements
/// (deletion, movement, anything). When [`Controller::execute`] sees a
/// command outside its own surface it offers the invocation to the host;
/// returning `Ok(false)` means "not mine" and yields an unknown-command
/// error.
pub trait CommandHost {
    fn execute(&mut self, invocation: &Invocation, surface: &mut dyn EditorSurface)
        -> Result<bool>;
}

#[derive(Deserialize)]
struct TypeKeysArgs {
    keys: String,
    #[serde(default)]
    mode: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct BookmarkArgs {
    bookmark: Option<String>,
    select: bool,
}

#[derive(Deserialize)]
struct SnippetArgs {
    snippet: usize,
}

/// Bindings may omit `args` entirely; that reaches the command as JSON
/// null and means "all defaults".
fn args_or_default<T>(command: &'static str, args: &Value) -> Result<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    if args.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(args.clone()).map_err(|e| Error::invalid_args(command, e))
}

/// The modal-input controller.
///
/// # Example
///
/// ```
/// use modalkeys::editor::controller::Controller;
/// use modalkeys::editor::mode::Mode;
/// use modalkeys::input::keymap::{default_keymap, KeymapDispatcher};
/// use modalkeys::surface::MemorySurface;
///
/// let surface = MemorySurface::new("demo.txt", "hello world");
/// let dispatcher = Box::new(KeymapDispatcher::new(default_keymap()));
/// let mut controller = Controller::new(surface, dispatcher);
///
/// controller.on_key("i").unwrap();
/// assert_eq!(controller.mode(), &Mode::Insert);
/// ```
pub struct Controller<S: EditorSurface> {
    surface: S,
    dispatcher: Box<dyn KeyDispatcher>,
    session: Session,
    host: Option<Box<dyn CommandHost>>,
    mode_listener: Option<Box<dyn FnMut(&Mode)>>,
}

impl<S: EditorSurface> Controller<S> {
    pub fn new(surface: S, dispatcher: Box<dyn KeyDispatcher>) -> Self {
        Self {
            surface,
            dispatcher,
            session: Session::new(),
            host: None,
            mode_listener: None,
        }
    }

    /// Attaches a host for editor-owned commands.
    pub fn with_host(mut self, host: Box<dyn CommandHost>) -> Self {
        self.host = Some(host);
        self
    }

    /// Registers a callback invoked with the effective mode after every
    /// mode publication (context consumers, cursor styling).
    pub fn on_mode_change(mut self, listener: impl FnMut(&Mode) + 'static) -> Self {
        self.mode_listener = Some(Box::new(listener));
        self
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn mode(&self) -> &Mode {
        self.session.mode()
    }

    /// True while the dispatcher holds an incomplete key sequence.
    pub fn waiting_for_key(&self) -> bool {
        self.dispatcher.waiting_for_key()
    }

    /// Help text for the pending key sequence, if the bindings provide any.
    pub fn key_help(&self) -> Option<String> {
        self.dispatcher.help()
    }

    /// True iff the mode is Normal and either the visual flag is set or
    /// the surface reports a non-empty selection. The second condition
    /// exists because selections change asynchronously (mouse drags) with
    /// no mode-change event.
    pub fn is_selecting(&self) -> bool {
        self.session.mode() == &Mode::Normal
            && (self.session.visual()
                || self.surface.selections().iter().any(|s| !s.is_empty()))
    }

    /// The mode keys are dispatched under: Visual when a selection is
    /// live in Normal mode, the session mode otherwise.
    pub fn effective_mode(&self) -> Mode {
        if self.is_selecting() {
            Mode::Visual
        } else {
            self.session.mode().clone()
        }
    }

    // ---------------------------------------------------------------
    // Keystroke pipeline
    // ---------------------------------------------------------------

    /// Handles one typed key.
    ///
    /// Order matters: the recorder first consumes the change flags left
    /// over from the previous action, then the key joins the word in
    /// progress, then it is dispatched under the effective mode. A
    /// completed sequence promotes the word; a keystroke that did not
    /// touch the search state clears any stale match decorations.
    pub fn on_key(&mut self, key: &str) -> Result<()> {
        self.session.recorder.commit_pending();

        let mode = self.session.mode().clone();
        self.session.recorder.push_key(key, &mode)?;

        let effective = self.effective_mode();
        let (invocation, completed) = if effective == Mode::Search {
            // In search mode every key feeds the pattern.
            (
                Some(Invocation::new(names::SEARCH, Value::String(key.to_string()))),
                true,
            )
        } else {
            match self.dispatcher.handle_key(key, &effective) {
                Some(invocation) => (Some(invocation), true),
                None => (None, !self.dispatcher.waiting_for_key()),
            }
        };
        if let Some(invocation) = invocation {
            self.execute(&invocation)?;
        }
        if completed {
            self.session.recorder.promote_current();
        }

        let search_changed = self.session.search.as_ref().is_some_and(|s| s.changed);
        if !search_changed {
            self.surface
                .set_decorations(DecorationKind::PrimaryMatch, Vec::new());
            self.surface
                .set_decorations(DecorationKind::SecondaryMatch, Vec::new());
        }
        if let Some(search) = self.session.search.as_mut() {
            search.changed = false;
        }
        Ok(())
    }

    /// Host notification: document text changed.
    pub fn on_text_changed(&mut self) {
        self.session.recorder.observe_text_changed();
    }

    /// Host notification: selections changed (read back from the surface).
    pub fn on_selection_changed(&mut self) {
        let any_selected = self.surface.selections().iter().any(|s| !s.is_empty());
        self.session.recorder.observe_selection_changed(any_selected);
    }

    /// Host notification: a document was closed; its mode memory goes.
    pub fn on_document_closed(&mut self, document: &str) {
        self.session.forget_document(document);
    }

    /// Runs one key through an isolated dispatcher, for replay and
    /// programmatic key runs.
    fn replay_key(
        &mut self,
        dispatcher: &mut dyn KeyDispatcher,
        key: &str,
        mode: &Mode,
    ) -> Result<()> {
        let effective = if *mode == Mode::Normal && self.is_selecting() {
            Mode::Visual
        } else {
            mode.clone()
        };
        let invocation = if effective == Mode::Search {
            Some(Invocation::new(names::SEARCH, Value::String(key.to_string())))
        } else {
            dispatcher.handle_key(key, &effective)
        };
        if let Some(invocation) = invocation {
            self.execute(&invocation)?;
        }
        Ok(())
    }

    fn replay_word_keys(&mut self, keys: &[String], mode: &Mode) -> Result<()> {
        let mut isolated = self.dispatcher.isolated();
        for key in keys {
            self.replay_key(isolated.as_mut(), key, mode)?;
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Mode transitions
    // ---------------------------------------------------------------

    /// Switches to `target`, resolving the Visual pseudo-mode to Normal
    /// plus the visual flag. Enter hooks run only when the mode actually
    /// changed; the resulting effective mode is recorded against the
    /// active document.
    pub fn enter_mode(&mut self, target: Mode) {
        self.session.set_key_capture(target != Mode::Insert);
        let new_mode = if target == Mode::Visual {
            self.session.set_visual(true);
            Mode::Normal
        } else {
            self.session.set_visual(false);
            target
        };

        let old_mode = self.session.mode().clone();
        self.session.set_mode(new_mode.clone());
        let effective = if self.session.visual() {
            Mode::Visual
        } else {
            new_mode.clone()
        };
        self.session
            .record_document_mode(&self.surface.document_id().to_string(), effective);
        if new_mode != old_mode {
            debug!(from = old_mode.name(), to = new_mode.name(), "mode change");
            self.run_enter_hook(&new_mode, &old_mode);
        }
        self.publish_mode();
    }

    /// Restores the mode remembered for the focused document (Normal by
    /// default), re-deriving the visual flag, and re-runs the mode's own
    /// enter hook.
    pub fn restore_mode(&mut self) {
        let stored = self
            .session
            .lookup_document_mode(self.surface.document_id())
            .cloned()
            .unwrap_or(Mode::Normal);
        self.session.set_key_capture(stored != Mode::Insert);
        if stored == Mode::Visual {
            self.session.set_mode(Mode::Normal);
            self.session.set_visual(true);
        } else {
            self.session.set_mode(stored);
            self.session.set_visual(false);
        }
        let mode = self.session.mode().clone();
        self.run_enter_hook(&mode, &Mode::Normal);
        self.publish_mode();
    }

    fn run_enter_hook(&mut self, new_mode: &Mode, old_mode: &Mode) {
        match new_mode {
            Mode::Normal => {
                self.session.recorder.reset_current();
                self.dispatcher.reset();
            }
            Mode::Search => {
                self.session.search_prior_mode = old_mode.clone();
            }
            _ => {}
        }
    }

    fn publish_mode(&mut self) {
        let effective = if self.session.visual() {
            Mode::Visual
        } else {
            self.session.mode().clone()
        };
        if let Some(listener) = self.mode_listener.as_mut() {
            listener(&effective);
        }
    }

    // ---------------------------------------------------------------
    // Selection commands
    // ---------------------------------------------------------------

    /// Turns the visual overlay on, or back to plain Normal when a
    /// selection is already live.
    pub fn toggle_selection(&mut self) {
        if self.is_selecting() {
            self.enter_mode(Mode::Normal);
        } else {
            self.enter_mode(Mode::Visual);
        }
    }

    pub fn enable_selection(&mut self) {
        self.enter_mode(Mode::Visual);
    }

    /// Clears the selection entirely, leaving a single cursor.
    pub fn cancel_selection(&mut self) {
        if self.session.mode() == &Mode::Normal && self.session.visual() {
            let cursor = Selection::cursor(self.surface.selections()[0].active);
            self.surface.set_selections(vec![cursor]);
            self.enter_mode(Mode::Normal);
        }
    }

    /// Collapses every cursor to its active endpoint, preserving multiple
    /// cursors.
    pub fn cancel_multiple_selections(&mut self) {
        if self.is_selecting() {
            let collapsed: Vec<Selection> = self
                .surface
                .selections()
                .iter()
                .map(|sel| Selection::cursor(sel.active))
                .collect();
            self.surface.set_selections(collapsed);
            self.enter_mode(Mode::Normal);
        }
    }

    // ---------------------------------------------------------------
    // Search commands
    // ---------------------------------------------------------------

    /// Begins a search (object or null argument) or continues one (string
    /// argument: appended to the pattern, `"\n"` accepts).
    pub fn search(&mut self, args: &Value) -> Result<()> {
        match args {
            Value::String(text)
                if !text.is_empty()
                    && self.session.mode() == &Mode::Search
                    && self.session.search.is_some() =>
            {
                self.continue_search(text)
            }
            Value::Object(_) | Value::Null | Value::String(_) => self.begin_search(args),
            _ => Err(Error::invalid_args(names::SEARCH, args.to_string())),
        }
    }

    fn begin_search(&mut self, args: &Value) -> Result<()> {
        let parsed: SearchArgs = match args {
            Value::Object(_) => serde_json::from_value(args.clone())
                .map_err(|e| Error::invalid_args(names::SEARCH, e))?,
            _ => SearchArgs::default(),
        };
        self.enter_mode(Mode::Search);
        self.session.search = Some(SearchState::begin(parsed, &self.surface));
        Ok(())
    }

    fn continue_search(&mut self, text: &str) -> Result<()> {
        if text == "\n" {
            // The newline itself never joins the pattern; the accepted
            // length is one character short of it, measured in bytes so
            // it shifts byte-offset selections correctly.
            let len = self
                .session
                .search
                .as_ref()
                .map(|s| {
                    let last = s.pattern.chars().last().map_or(0, char::len_utf8);
                    s.pattern.len() - last
                })
                .unwrap_or(0);
            self.accept_search(len);
            return Ok(());
        }
        let Some(mut search) = self.session.search.take() else {
            return Ok(());
        };
        search.pattern.push_str(text);
        let from = search.start_selections.clone();
        search.highlight_matches(&mut self.surface, &from);
        // acceptAfter counts typed characters, not bytes.
        let auto_accept = search
            .args
            .accept_after
            .is_some_and(|limit| search.pattern.chars().count() >= limit);
        let len = search.pattern.len();
        self.session.search = Some(search);
        if auto_accept {
            self.accept_search(len);
        }
        Ok(())
    }

    /// Finalizes the search: restores the prior mode and positions the
    /// cursor per the offset policy. A bad offset policy reports and
    /// leaves the cursor on the match.
    fn accept_search(&mut self, len: usize) {
        let prior = self.session.search_prior_mode.clone();
        self.enter_mode(prior);
        if let Some(mut search) = self.session.search.take() {
            let placed = search.accept(&mut self.surface, len);
            self.session.search = Some(search);
            if let Err(err) = placed {
                self.session.set_message(err.to_string(), MessageLevel::Error);
            }
        }
    }

    /// Abandons the search, restoring the prior mode and the exact
    /// selections captured at search start. A no-op outside search mode.
    pub fn cancel_search(&mut self) {
        if self.session.mode() == &Mode::Search {
            let prior = self.session.search_prior_mode.clone();
            self.enter_mode(prior);
            if let Some(search) = self.session.search.as_ref() {
                let start = search.start_selections.clone();
                self.surface.set_selections(start);
                self.surface.reveal_primary();
            }
        }
    }

    /// Removes the last pattern character and recomputes; emptying the
    /// pattern restores the start selections.
    pub fn delete_char_from_search(&mut self) {
        if self.session.mode() != &Mode::Search {
            return;
        }
        let Some(mut search) = self.session.search.take() else {
            return;
        };
        if search.pattern.pop().is_some() {
            let from = search.start_selections.clone();
            search.highlight_matches(&mut self.surface, &from);
        }
        self.session.search = Some(search);
    }

    /// Steps every cursor to its next match of the accepted pattern.
    pub fn next_match(&mut self) {
        if let Some(mut search) = self.session.search.take() {
            let stepped = search.next_match(&mut self.surface);
            self.session.search = Some(search);
            if let Err(err) = stepped {
                self.session.set_message(err.to_string(), MessageLevel::Error);
            }
        }
    }

    /// Steps every cursor to its previous match; the stored direction is
    /// unaffected.
    pub fn previous_match(&mut self) {
        if let Some(mut search) = self.session.search.take() {
            let stepped = search.previous_match(&mut self.surface);
            self.session.search = Some(search);
            if let Err(err) = stepped {
                self.session.set_message(err.to_string(), MessageLevel::Error);
            }
        }
    }

    // ---------------------------------------------------------------
    // Repeat commands
    // ---------------------------------------------------------------

    /// Replays the remembered verb (the last mutation word) through an
    /// isolated dispatcher, in the mode it was typed in. The replay marks
    /// itself so it does not become the new last change.
    pub fn repeat_last_change(&mut self) -> Result<()> {
        self.session.recorder.begin_replay();
        let Some(verb) = self.session.recorder.last_sentence.verb.clone() else {
            return Ok(());
        };
        self.replay_word(verb.seq, verb.mode)
    }

    /// Replays the remembered noun (the last selection word).
    pub fn repeat_last_used_selection(&mut self) -> Result<()> {
        self.session.recorder.begin_replay();
        let Some(noun) = self.session.recorder.last_sentence.noun.clone() else {
            return Ok(());
        };
        self.replay_word(noun.seq, noun.mode)
    }

    fn replay_word(&mut self, seq: WordSeq, mode: Mode) -> Result<()> {
        match seq {
            WordSeq::Resolved(invocation) => self.execute(&invocation),
            WordSeq::Raw(keys) => {
                let start_mode = self.session.mode().clone();
                if start_mode != mode {
                    self.enter_mode(mode.clone());
                }
                self.replay_word_keys(&keys, &mode)?;
                // Chain repeats: the replayed word becomes the word in
                // progress, so the next commit re-promotes it.
                self.session.recorder.current_word = self.session.recorder.last_word.clone();
                if self.session.mode() != &start_mode {
                    self.enter_mode(start_mode);
                }
                Ok(())
            }
        }
    }

    /// Runs a string of keys through their bindings programmatically, in
    /// the requested mode (Normal by default), restoring the prior mode
    /// afterwards. Errors if `keys` is missing or not a string.
    pub fn type_keys(&mut self, args: &Value) -> Result<()> {
        let parsed: TypeKeysArgs = serde_json::from_value(args.clone())
            .map_err(|_| Error::invalid_args(names::TYPE_KEYS, args))?;
        let start_mode = self.session.mode().clone();
        let target = parsed
            .mode
            .as_deref()
            .map(Mode::from_name)
            .unwrap_or(Mode::Normal);
        if start_mode != target {
            self.enter_mode(target.clone());
        }
        let mut isolated = self.dispatcher.isolated();
        for ch in parsed.keys.chars() {
            self.replay_key(isolated.as_mut(), &ch.to_string(), &target)?;
        }
        if self.session.mode() != &start_mode {
            self.enter_mode(start_mode);
        }
        Ok(())
    }

    /// Forces the next action to count as a document-mutating change, for
    /// commands that repeat meaningfully without editing (e.g. sending
    /// text to a REPL).
    pub fn touch_document(&mut self) {
        self.session.recorder.touch();
    }

    /// Keeps the next action out of the repeat record (e.g. undo).
    pub fn untouch_document(&mut self) {
        self.session.recorder.untouch();
    }

    // ---------------------------------------------------------------
    // Bookmarks and quick snippets
    // ---------------------------------------------------------------

    /// Stores the primary cursor position under a bookmark label for the
    /// active document.
    pub fn define_bookmark(&mut self, args: &Value) -> Result<()> {
        let parsed: BookmarkArgs = args_or_default(names::DEFINE_BOOKMARK, args)?;
        let label = parsed.bookmark.unwrap_or_else(|| "default".to_string());
        let document = self.surface.document_id().to_string();
        let offset = self.surface.selections()[0].active;
        self.session
            .bookmarks
            .set(&label, &document, Bookmark::new(document.clone(), offset));
        self.refresh_bookmark_decorations();
        Ok(())
    }

    /// Jumps to a bookmark in the active document; with `select` the
    /// selection extends from the current position instead.
    pub fn goto_bookmark(&mut self, args: &Value) -> Result<()> {
        let parsed: BookmarkArgs = args_or_default(names::GOTO_BOOKMARK, args)?;
        let label = parsed.bookmark.unwrap_or_else(|| "default".to_string());
        let document = self.surface.document_id().to_string();
        let Some(mark) = self.session.bookmarks.get(&label, &document) else {
            self.session
                .set_message(format!("Bookmark '{label}' not set"), MessageLevel::Info);
            return Ok(());
        };
        let offset = mark.offset.min(self.surface.text().len());
        let selection = if parsed.select {
            Selection::new(self.surface.selections()[0].active, offset)
        } else {
            Selection::cursor(offset)
        };
        self.surface.set_selections(vec![selection]);
        self.surface.reveal_primary();
        Ok(())
    }

    /// Clears one bookmark label, or all of them when no label is given.
    pub fn clear_bookmarks(&mut self, args: &Value) -> Result<()> {
        let parsed: BookmarkArgs = args_or_default(names::CLEAR_BOOKMARKS, args)?;
        self.session.bookmarks.clear(parsed.bookmark.as_deref());
        self.refresh_bookmark_decorations();
        Ok(())
    }

    fn refresh_bookmark_decorations(&mut self) {
        let document = self.surface.document_id().to_string();
        let ranges: Vec<TextRange> = self
            .session
            .bookmarks
            .offsets_in(&document)
            .into_iter()
            .map(|offset| TextRange::new(offset, offset))
            .collect();
        self.surface.set_decorations(DecorationKind::Bookmark, ranges);
    }

    /// Stores the primary selection's text in a numbered snippet slot.
    pub fn define_quick_snippet(&mut self, args: &Value) -> Result<()> {
        let parsed: SnippetArgs = serde_json::from_value(args.clone())
            .map_err(|e| Error::invalid_args(names::DEFINE_QUICK_SNIPPET, e))?;
        let range = self.surface.selections()[0].range();
        if range.is_empty() {
            self.session
                .set_message("Nothing selected".to_string(), MessageLevel::Info);
            return Ok(());
        }
        let text = self.surface.text()[range.start..range.end].to_string();
        self.session.snippets.insert(parsed.snippet, text);
        Ok(())
    }

    /// Inserts a stored snippet at every cursor.
    pub fn insert_quick_snippet(&mut self, args: &Value) -> Result<()> {
        let parsed: SnippetArgs = serde_json::from_value(args.clone())
            .map_err(|e| Error::invalid_args(names::INSERT_QUICK_SNIPPET, e))?;
        match self.session.snippets.get(&parsed.snippet).cloned() {
            Some(text) => self.surface.insert_text(&text),
            None => self.session.set_message(
                format!("Snippet {} not defined", parsed.snippet),
                MessageLevel::Info,
            ),
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Preset import
    // ---------------------------------------------------------------

    /// Replaces the live key bindings with the ones in a preset file.
    /// Failures leave the current bindings untouched and report a
    /// warning.
    pub fn import_presets(&mut self, path: &Path) {
        match presets::load_keybindings(path) {
            Ok(keymap) => {
                self.dispatcher = Box::new(KeymapDispatcher::new(keymap));
                self.session
                    .set_message("Keybindings imported".to_string(), MessageLevel::Info);
            }
            Err(err) => {
                warn!(error = %err, path = %path.display(), "preset import failed");
                self.session.set_message(
                    format!("Keybindings not imported: {err}"),
                    MessageLevel::Warning,
                );
            }
        }
    }

    // ---------------------------------------------------------------
    // Dispatch by name
    // ---------------------------------------------------------------

    /// Runs a command by name, the way key bindings invoke them. Commands
    /// outside the controller's surface are offered to the host.
    pub fn execute(&mut self, invocation: &Invocation) -> Result<()> {
        trace!(command = %invocation.command, "execute");
        match invocation.command.as_str() {
            names::ENTER_MODE => {
                let name = match &invocation.args {
                    Value::String(name) => name.clone(),
                    Value::Object(map) => map
                        .get("mode")
                        .and_then(Value::as_str)
                        .ok_or_else(|| {
                            Error::invalid_args(names::ENTER_MODE, "missing \"mode\"")
                        })?
                        .to_string(),
                    other => {
                        return Err(Error::invalid_args(names::ENTER_MODE, other));
                    }
                };
                self.enter_mode(Mode::from_name(&name));
                Ok(())
            }
            names::ENTER_NORMAL => {
                self.enter_mode(Mode::Normal);
                Ok(())
            }
            names::ENTER_INSERT => {
                self.enter_mode(Mode::Insert);
                Ok(())
            }
            names::TOGGLE_SELECTION => {
                self.toggle_selection();
                Ok(())
            }
            names::ENABLE_SELECTION => {
                self.enable_selection();
                Ok(())
            }
            names::CANCEL_SELECTION => {
                self.cancel_selection();
                Ok(())
            }
            names::CANCEL_MULTIPLE_SELECTIONS => {
                self.cancel_multiple_selections();
                Ok(())
            }
            names::SEARCH => self.search(&invocation.args),
            names::CANCEL_SEARCH => {
                self.cancel_search();
                Ok(())
            }
            names::DELETE_CHAR_FROM_SEARCH => {
                self.delete_char_from_search();
                Ok(())
            }
            names::NEXT_MATCH => {
                self.next_match();
                Ok(())
            }
            names::PREVIOUS_MATCH => {
                self.previous_match();
                Ok(())
            }
            names::TYPE_KEYS => self.type_keys(&invocation.args),
            names::REPEAT_LAST_CHANGE => self.repeat_last_change(),
            names::REPEAT_LAST_USED_SELECTION => self.repeat_last_used_selection(),
            names::TOUCH_DOCUMENT => {
                self.touch_document();
                Ok(())
            }
            names::UNTOUCH_DOCUMENT => {
                self.untouch_document();
                Ok(())
            }
            names::IMPORT_PRESETS => {
                let path = match &invocation.args {
                    Value::String(path) => PathBuf::from(path),
                    Value::Object(map) => map
                        .get("file")
                        .and_then(Value::as_str)
                        .map(PathBuf::from)
                        .ok_or_else(|| {
                            Error::invalid_args(names::IMPORT_PRESETS, "missing \"file\"")
                        })?,
                    other => {
                        return Err(Error::invalid_args(names::IMPORT_PRESETS, other));
                    }
                };
                self.import_presets(&path);
                Ok(())
            }
            names::DEFINE_BOOKMARK => self.define_bookmark(&invocation.args),
            names::GOTO_BOOKMARK => self.goto_bookmark(&invocation.args),
            names::CLEAR_BOOKMARKS => self.clear_bookmarks(&invocation.args),
            names::DEFINE_QUICK_SNIPPET => self.define_quick_snippet(&invocation.args),
            names::INSERT_QUICK_SNIPPET => self.insert_quick_snippet(&invocation.args),
            _ => {
                if let Some(host) = self.host.as_mut() {
                    if host.execute(invocation, &mut self.surface)? {
                        return Ok(());
                    }
                }
                Err(Error::UnknownCommand(invocation.command.clone()))
            }
        }
    }
}

impl Controller<crate::surface::MemorySurface> {
    /// Drains the in-memory surface's change flags into the recorder, the
    /// way a host editor delivers change events between keystrokes.
    pub fn pump_changes(&mut self) {
        let (text_changed, selection_changed) = self.surface.take_changes();
        if text_changed {
            self.on_text_changed();
        }
        if selection_changed {
            self.on_selection_changed();
        }
    }
}
