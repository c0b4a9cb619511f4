//! Tests for repeat-last-change and repeat-last-used-selection, exercising
//! the full pipeline: keystrokes resolve to host commands, the host edits
//! the surface, and the change events feed the sentence recorder.

use modalkeys::editor::controller::{names, CommandHost, Controller};
use modalkeys::editor::mode::Mode;
use modalkeys::input::dispatcher::Invocation;
use modalkeys::input::keymap::{Keymap, KeymapDispatcher};
use modalkeys::surface::{EditorSurface, MemorySurface, Selection, TextRange};
use serde_json::json;

fn keymap() -> Keymap {
    Keymap::from_json(&json!({
        "normal": {
            "d": { "w": { "command": "edit.deleteWord" } },
            "x": { "command": "edit.deleteChar" },
            "v": { "command": names::TOGGLE_SELECTION },
            ".": { "command": names::REPEAT_LAST_CHANGE },
            "'": { "command": names::REPEAT_LAST_USED_SELECTION },
        },
        "visual": {
            "w": { "command": "select.word" },
            "x": { "command": "edit.deleteSelection" },
            ".": { "command": names::REPEAT_LAST_CHANGE },
            "'": { "command": names::REPEAT_LAST_USED_SELECTION },
        },
    }))
    .unwrap()
}

/// A host with just enough editing commands to form sentences.
struct EditHost;

impl EditHost {
    fn word_end(text: &str, from: usize) -> usize {
        let mut end = from;
        for ch in text[from..].chars() {
            if ch == ' ' {
                end += 1;
            } else {
                break;
            }
        }
        for ch in text[end..].chars() {
            if ch.is_alphanumeric() || ch == '_' {
                end += ch.len_utf8();
            } else {
                break;
            }
        }
        end
    }

    fn delete_word(surface: &mut dyn EditorSurface) {
        let text = surface.text().to_string();
        let from = surface.selections()[0].active;
        let mut end = Self::word_end(&text, from);
        // Take one trailing space along, like vim's dw.
        if text[end..].starts_with(' ') {
            end += 1;
        }
        surface.replace_range(TextRange::new(from, end), "");
    }

    fn delete_char(surface: &mut dyn EditorSurface) {
        let text = surface.text().to_string();
        let from = surface.selections()[0].active;
        if let Some(ch) = text[from..].chars().next() {
            surface.replace_range(TextRange::new(from, from + ch.len_utf8()), "");
        }
    }

    fn select_word(surface: &mut dyn EditorSurface) {
        let text = surface.text().to_string();
        let extended: Vec<Selection> = surface
            .selections()
            .iter()
            .map(|sel| Selection::new(sel.anchor, Self::word_end(&text, sel.active)))
            .collect();
        surface.set_selections(extended);
    }

    fn delete_selection(surface: &mut dyn EditorSurface) {
        let ranges: Vec<TextRange> = surface
            .selections()
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.range())
            .collect();
        for range in ranges.into_iter().rev() {
            surface.replace_range(range, "");
        }
    }
}

impl CommandHost for EditHost {
    fn execute(
        &mut self,
        invocation: &Invocation,
        surface: &mut dyn EditorSurface,
    ) -> modalkeys::Result<bool> {
        match invocation.command.as_str() {
            "edit.deleteWord" => Self::delete_word(surface),
            "edit.deleteChar" => Self::delete_char(surface),
            "select.word" => Self::select_word(surface),
            "edit.deleteSelection" => Self::delete_selection(surface),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

fn controller(text: &str) -> Controller<MemorySurface> {
    let surface = MemorySurface::new("doc.txt", text);
    Controller::new(surface, Box::new(KeymapDispatcher::new(keymap())))
        .with_host(Box::new(EditHost))
}

/// Types keys the way the demo's event loop does, draining change events
/// after every keystroke.
fn type_keys(c: &mut Controller<MemorySurface>, keys: &str) {
    for ch in keys.chars() {
        c.on_key(&ch.to_string()).unwrap();
        c.pump_changes();
    }
}

#[test]
fn test_dot_repeats_the_last_change() {
    let mut c = controller("one two three four");
    type_keys(&mut c, "dw");
    assert_eq!(c.surface().text(), "two three four");

    type_keys(&mut c, ".");
    assert_eq!(c.surface().text(), "three four");
    type_keys(&mut c, ".");
    assert_eq!(c.surface().text(), "four");
}

#[test]
fn test_repeat_does_not_become_the_new_last_change() {
    let mut c = controller("one two three");
    type_keys(&mut c, "dw.");

    // Two words are gone; the remembered verb is still "dw".
    assert_eq!(c.surface().text(), "three");
    let verb = c.session().recorder.last_sentence.verb.clone().unwrap();
    assert_eq!(verb.key_text(), "dw");
}

#[test]
fn test_multi_key_sequence_is_remembered_whole() {
    let mut c = controller("alpha beta");
    type_keys(&mut c, "dw");
    // A later single-key change replaces the verb.
    type_keys(&mut c, "x");
    type_keys(&mut c, ".");

    let verb = c.session().recorder.last_sentence.verb.clone().unwrap();
    assert_eq!(verb.key_text(), "x");
    // "beta" lost its first two characters: one to x, one to the repeat.
    assert_eq!(c.surface().text(), "ta");
}

#[test]
fn test_repeat_last_used_selection_reselects() {
    let mut c = controller("one two three");
    type_keys(&mut c, "vw");
    assert_eq!(c.surface().primary().range(), TextRange::new(0, 3));
    type_keys(&mut c, "x");
    assert_eq!(c.surface().text(), " two three");

    type_keys(&mut c, "'");
    // The selection word replays from the new cursor position.
    assert_eq!(c.surface().primary(), Selection::new(0, 4));
}

#[test]
fn test_type_keys_runs_bindings_programmatically() {
    let mut c = controller("one two three");
    c.execute(&Invocation::new(names::TYPE_KEYS, json!({ "keys": "dw" })))
        .unwrap();
    assert_eq!(c.surface().text(), "two three");
    assert_eq!(c.mode(), &Mode::Normal);
}

#[test]
fn test_touch_document_makes_a_non_edit_repeatable() {
    let mut c = controller("abc");
    // "z" is unbound and edits nothing; touchDocument still turns it into
    // the remembered verb.
    c.on_key("z").unwrap();
    c.pump_changes();
    c.touch_document();

    c.on_key(".").unwrap();
    let verb = c.session().recorder.last_sentence.verb.clone().unwrap();
    assert_eq!(verb.key_text(), "z");
}
