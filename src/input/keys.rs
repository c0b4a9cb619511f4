//! Terminal key events to controller key strings.
//!
//! The controller consumes keys as strings: printable characters as
//! themselves, Enter as `"\n"`, Escape as the escape character. Keys with
//! no sensible string form (arrows, backspace) are reported as distinct
//! variants so the binary can route them itself, the way an editor binds
//! them outside the type handler.

use termion::event::Key;

/// One decoded key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPress {
    /// A key with a string form, routed through the controller.
    Text(String),
    Backspace,
    Left,
    Right,
    Up,
    Down,
    /// Ctrl-C, the demo's quit chord.
    Quit,
    /// Anything else; ignored.
    Other,
}

/// Decodes a termion key event.
pub fn decode(key: Key) -> KeyPress {
    match key {
        Key::Char(c) => KeyPress::Text(c.to_string()),
        Key::Esc => KeyPress::Text("\u{1b}".to_string()),
        Key::Backspace => KeyPress::Backspace,
        Key::Left => KeyPress::Left,
        Key::Right => KeyPress::Right,
        Key::Up => KeyPress::Up,
        Key::Down => KeyPress::Down,
        Key::Ctrl('c') => KeyPress::Quit,
        _ => KeyPress::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printable_and_enter() {
        assert_eq!(decode(Key::Char('a')), KeyPress::Text("a".to_string()));
        assert_eq!(decode(Key::Char('\n')), KeyPress::Text("\n".to_string()));
    }

    #[test]
    fn test_escape_has_string_form() {
        assert_eq!(decode(Key::Esc), KeyPress::Text("\u{1b}".to_string()));
    }

    #[test]
    fn test_special_keys() {
        assert_eq!(decode(Key::Backspace), KeyPress::Backspace);
        assert_eq!(decode(Key::Ctrl('c')), KeyPress::Quit);
        assert_eq!(decode(Key::F(5)), KeyPress::Other);
    }
}
