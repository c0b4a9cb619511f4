//! Tests for mode transitions, the visual overlay, and selection commands.

use modalkeys::editor::controller::{names, CommandHost, Controller};
use modalkeys::editor::mode::Mode;
use modalkeys::input::dispatcher::Invocation;
use modalkeys::input::keymap::{Keymap, KeymapDispatcher};
use modalkeys::surface::{EditorSurface, MemorySurface, Selection, TextRange};
use serde_json::json;

fn keymap() -> Keymap {
    Keymap::from_json(&json!({
        "normal": {
            "i": { "command": names::ENTER_INSERT },
            "v": { "command": names::TOGGLE_SELECTION },
            "x": { "command": "edit.deleteChar" },
            "\u{1b}": { "command": names::CANCEL_MULTIPLE_SELECTIONS },
        },
        "visual": {
            "v": { "command": names::CANCEL_SELECTION },
            "x": { "command": "edit.deleteSelection" },
            "\u{1b}": { "command": names::CANCEL_MULTIPLE_SELECTIONS },
        },
    }))
    .unwrap()
}

struct EditHost;

impl CommandHost for EditHost {
    fn execute(
        &mut self,
        invocation: &Invocation,
        surface: &mut dyn EditorSurface,
    ) -> modalkeys::Result<bool> {
        match invocation.command.as_str() {
            "edit.deleteChar" => {
                let from = surface.selections()[0].active;
                if let Some(ch) = surface.text()[from..].chars().next() {
                    surface.replace_range(TextRange::new(from, from + ch.len_utf8()), "");
                }
            }
            "edit.deleteSelection" => {
                let range = surface.selections()[0].range();
                surface.replace_range(range, "");
            }
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

#[test]
fn test_live_selection_switches_to_visual_bindings() {
    // A mouse-style selection, with no mode change at all, makes keys
    // resolve through the visual tree.
    let mut c = controller("one two");
    c.surface_mut().set_selections(vec![Selection::new(0, 3)]);
    assert_eq!(c.mode(), &Mode::Normal);
    assert_eq!(c.effective_mode(), Mode::Visual);

    c.on_key("x").unwrap();
    assert_eq!(c.surface().text(), " two");
}

#[test]
fn test_normal_bindings_without_selection() {
    let mut c = controller("one two");
    c.on_key("x").unwrap();
    assert_eq!(c.surface().text(), "ne two");
}

#[test]
fn test_toggle_selection_round_trip() {
    let mut c = controller("hello");
    c.on_key("v").unwrap();
    assert!(c.session().visual());
    assert_eq!(c.mode(), &Mode::Normal);

    // v again leaves visual.
    c.on_key("v").unwrap();
    assert!(!c.session().visual());
}

#[test]
fn test_cancel_selection_collapses_to_one_cursor() {
    let mut c = controller("one two three");
    c.on_key("v").unwrap();
    c.surface_mut()
        .set_selections(vec![Selection::new(0, 3), Selection::new(4, 7)]);

    c.on_key("v").unwrap(); // cancelSelection in the visual tree
    assert_eq!(c.surface().selections(), &[Selection::cursor(3)]);
    assert!(!c.session().visual());
}

#[test]
fn test_cancel_multiple_selections_keeps_the_cursors() {
    let mut c = controller("one two three");
    c.surface_mut()
        .set_selections(vec![Selection::new(0, 3), Selection::new(4, 7)]);

    c.on_key("\u{1b}").unwrap();
    assert_eq!(
        c.surface().selections(),
        &[Selection::cursor(3), Selection::cursor(7)]
    );
    assert_eq!(c.effective_mode(), Mode::Normal);
}

#[test]
fn test_insert_mode_suspends_key_capture() {
    let mut c = controller("hello");
    c.on_key("i").unwrap();
    assert_eq!(c.mode(), &Mode::Insert);
    assert!(!c.session().key_capture());

    c.enter_mode(Mode::Normal);
    assert!(c.session().key_capture());
}

#[test]
fn test_document_mode_is_restored() {
    let mut c = controller("hello");
    c.on_key("i").unwrap();

    // Focus moves away and comes back: the stored mode wins.
    c.session_mut().set_mode(Mode::Normal);
    c.session_mut().set_key_capture(true);
    c.restore_mode();
    assert_eq!(c.mode(), &Mode::Insert);
    assert!(!c.session().key_capture());
}

#[test]
fn test_closed_document_forgets_its_mode() {
    let mut c = controller("hello");
    c.on_key("i").unwrap();
    c.on_document_closed("doc.txt");

    c.session_mut().set_mode(Mode::Normal);
    c.restore_mode();
    assert_eq!(c.mode(), &Mode::Normal);
}

#[test]
fn test_enter_mode_accepts_custom_names() {
    let mut c = controller("hello");
    c.execute(&Invocation::new(names::ENTER_MODE, json!({ "mode": "select" })))
        .unwrap();
    assert_eq!(c.mode(), &Mode::Custom("select".to_string()));

    c.execute(&Invocation::new(names::ENTER_MODE, json!("normal")))
        .unwrap();
    assert_eq!(c.mode(), &Mode::Normal);
}
