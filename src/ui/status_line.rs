//! Status text computation.
//!
//! The main status area shows the effective mode, or the live search
//! parameters while searching (`SEARCH [B|F][S]: pattern`). The secondary
//! area shows the key sequence in progress plus any binding help; the
//! search engine's one-shot info message ("Pattern not found", wraparound
//! notices) appears there only while nothing else is pending, and is
//! consumed otherwise.

use crate::editor::controller::Controller;
use crate::editor::mode::Mode;
use crate::surface::EditorSurface;

/// Text for the two status areas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusText {
    pub main: String,
    pub secondary: String,
}

/// Computes the status text from the controller state.
///
/// Takes the controller mutably because displaying the search info message
/// while other text is pending consumes it.
pub fn status_text<S: EditorSurface>(controller: &mut Controller<S>) -> StatusText {
    let main = if controller.mode() == &Mode::Search {
        let (backwards, case_sensitive, pattern) = controller
            .session()
            .search
            .as_ref()
            .map(|s| (s.args.backwards, s.args.case_sensitive, s.pattern.clone()))
            .unwrap_or_default();
        format!(
            "SEARCH [{}{}]: {}",
            if backwards { "B" } else { "F" },
            if case_sensitive { "S" } else { "" },
            pattern
        )
    } else {
        controller.effective_mode().to_string()
    };

    let mut secondary = format!(
        " {}",
        controller.session().recorder.current_word.key_text()
    );
    if let Some(help) = controller.key_help() {
        secondary = format!("{secondary}    {help}");
    }
    if let Some(search) = controller.session_mut().search.as_mut() {
        if let Some(info) = search.info.clone() {
            if secondary.trim().is_empty() {
                secondary = info;
            } else {
                search.info = None;
            }
        }
    }

    StatusText { main, secondary }
}
