use anyhow::{Context, Result};
use clap::Parser;
use ratatui::{backend::TermionBackend, Terminal};
use std::io::{self, Write};
use std::path::PathBuf;
use termion::input::TermRead;
use termion::raw::IntoRawMode;
use termion::screen::IntoAlternateScreen;

use modalkeys::config::{presets, Config};
use modalkeys::editor::controller::{names, CommandHost, Controller};
use modalkeys::editor::mode::Mode;
use modalkeys::input::dispatcher::Invocation;
use modalkeys::input::keymap::{Keymap, KeymapDispatcher};
use modalkeys::input::keys::{decode, KeyPress};
use modalkeys::surface::{EditorSurface, MemorySurface, TextRange};
use modalkeys::theme::DecorationStyles;
use modalkeys::ui::UI;

/// modalkeys - modal key handling in a demo text editor
#[derive(Parser)]
#[command(name = "modalkeys")]
#[command(version)]
#[command(about = "Modal key handling demo editor", long_about = None)]
struct Cli {
    /// Text file to open (omit for a sample document)
    file: Option<PathBuf>,

    /// Keybindings preset file (overrides the config)
    #[arg(short, long)]
    keybindings: Option<PathBuf>,
}

/// Set up a panic hook that restores the terminal before displaying panic information.
///
/// This ensures that panics are visible even when the terminal is in raw mode with alternate screen.
/// Without this, panic messages would be hidden or garbled, making debugging very difficult.
fn setup_panic_hook() {
    use std::panic;

    // Take the default panic hook so we can call it after restoration
    let default_panic = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        // Restore terminal to normal state
        // Use stderr to avoid interfering with stdout pipes
        use std::io::Write;

        // Exit alternate screen
        let _ = write!(io::stderr(), "{}", termion::screen::ToMainScreen);
        // Show cursor
        let _ = write!(io::stderr(), "{}", termion::cursor::Show);
        // Ensure output is flushed
        let _ = io::stderr().flush();

        // Call the default panic handler to print the panic message and backtrace
        default_panic(panic_info);
    }));
}

/// Routes tracing output to a file when `MODALKEYS_LOG` is set. Logging to
/// the terminal would garble the alternate screen.
fn setup_logging() {
    if let Ok(filter) = std::env::var("MODALKEYS_LOG") {
        if let Ok(file) = std::fs::File::create("modalkeys.log") {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
                .with_writer(file)
                .with_ansi(false)
                .try_init();
        }
    }
}

const SAMPLE_TEXT: &str = "\
The quick brown fox jumps over the lazy dog.
Pack my box with five dozen liquor jugs.
How vexingly quick daft zebras jump!
Sphinx of black quartz, judge my vow.
";

/// The demo's bindings: mode switching, search, repeat, and bookmarks from
/// the library plus a few editing verbs handled by [`DemoHost`].
fn demo_keymap() -> Keymap {
    let spec = serde_json::json!({
        "normal": {
            "i": { "command": names::ENTER_INSERT },
            "v": { "command": names::TOGGLE_SELECTION },
            "/": { "command": names::SEARCH, "args": { "wrapAround": true } },
            "?": { "command": names::SEARCH,
                   "args": { "backwards": true, "wrapAround": true } },
            "n": { "command": names::NEXT_MATCH },
            "N": { "command": names::PREVIOUS_MATCH },
            ".": { "command": names::REPEAT_LAST_CHANGE },
            "'": { "command": names::REPEAT_LAST_USED_SELECTION },
            "m": { "command": names::DEFINE_BOOKMARK },
            "`": { "command": names::GOTO_BOOKMARK },
            "\u{1b}": { "command": names::CANCEL_MULTIPLE_SELECTIONS },
            "x": { "command": "edit.deleteChar" },
            "d": { "w": { "command": "edit.deleteWord" } },
        },
        "visual": {
            "v": { "command": names::CANCEL_SELECTION },
            "n": { "command": names::NEXT_MATCH },
            "N": { "command": names::PREVIOUS_MATCH },
            "x": { "command": "edit.deleteSelection" },
            "\u{1b}": { "command": names::CANCEL_SELECTION },
        },
    });
    Keymap::from_json(&spec).expect("demo keymap is well-formed")
}

/// Editing verbs the demo wires in beneath the controller.
struct DemoHost;

impl DemoHost {
    fn delete_char(&self, surface: &mut dyn EditorSurface) {
        let text = surface.text().to_string();
        let mut selections = surface.selections().to_vec();
        // Highest offsets first so earlier edits do not shift later ones.
        selections.sort_by(|a, b| b.active.cmp(&a.active));
        for sel in selections {
            if let Some(ch) = text[sel.active..].chars().next() {
                if ch != '\n' {
                    surface.replace_range(
                        TextRange::new(sel.active, sel.active + ch.len_utf8()),
                        "",
                    );
                }
            }
        }
    }

    fn delete_word(&self, surface: &mut dyn EditorSurface) {
        let text = surface.text().to_string();
        let mut selections = surface.selections().to_vec();
        selections.sort_by(|a, b| b.active.cmp(&a.active));
        for sel in selections {
            let mut end = sel.active;
            for ch in text[sel.active..].chars() {
                if ch.is_alphanumeric() || ch == '_' {
                    end += ch.len_utf8();
                } else {
                    break;
                }
            }
            for ch in text[end..].chars() {
                if ch == ' ' || ch == '\t' {
                    end += ch.len_utf8();
                } else {
                    break;
                }
            }
            if end > sel.active {
                surface.replace_range(TextRange::new(sel.active, end), "");
            }
        }
    }

    fn delete_selection(&self, surface: &mut dyn EditorSurface) {
        let mut ranges: Vec<TextRange> = surface
            .selections()
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.range())
            .collect();
        ranges.sort_by(|a, b| b.start.cmp(&a.start));
        for range in ranges {
            surface.replace_range(range, "");
        }
    }
}

impl CommandHost for DemoHost {
    fn execute(
        &mut self,
        invocation: &Invocation,
        surface: &mut dyn EditorSurface,
    ) -> modalkeys::Result<bool> {
        match invocation.command.as_str() {
            "edit.deleteChar" => self.delete_char(surface),
            "edit.deleteWord" => self.delete_word(surface),
            "edit.deleteSelection" => self.delete_selection(surface),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

fn main() -> Result<()> {
    // Set up panic hook to restore terminal before showing panic info
    // This ensures panics are visible when terminal is in raw mode
    setup_panic_hook();
    setup_logging();

    let cli = Cli::parse();
    let config = Config::load();

    // Load the document BEFORE terminal setup so errors print normally
    let (text, name) = match &cli.file {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            (text, path.display().to_string())
        }
        None => (SAMPLE_TEXT.to_string(), "sample.txt".to_string()),
    };

    // CLI keybindings override the config
    let keymap = match cli.keybindings.as_ref().or(config.keybindings_file.as_ref()) {
        Some(path) => presets::load_keybindings(path)
            .with_context(|| format!("Failed to load keybindings from {}", path.display()))?,
        None => demo_keymap(),
    };

    let surface = MemorySurface::new(name, text);
    let mut controller = Controller::new(surface, Box::new(KeymapDispatcher::new(keymap)))
        .with_host(Box::new(DemoHost));

    // Setup terminal
    let stdout = io::stdout()
        .into_raw_mode()
        .context("Failed to enable raw mode")?;
    let stdout = stdout
        .into_alternate_screen()
        .context("Failed to enter alternate screen")?;

    let backend = TermionBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let ui = UI::new(DecorationStyles::from_config(&config));

    // Main event loop
    let result = run_event_loop(&mut terminal, &ui, &mut controller);

    // Cleanup
    // Termion handles cleanup automatically through Drop guards
    // But we still want to show the cursor before exiting
    write!(terminal.backend_mut(), "{}", termion::cursor::Show)?;
    terminal.backend_mut().flush()?;

    result
}

fn run_event_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    ui: &UI,
    controller: &mut Controller<MemorySurface>,
) -> Result<()> {
    ui.render(terminal, controller)?;

    for key in io::stdin().keys() {
        let key = key?;
        controller.session_mut().clear_message();

        match decode(key) {
            KeyPress::Quit => break,
            KeyPress::Text(text) if controller.mode() == &Mode::Search => {
                // Escape leaves the search; everything else edits the pattern.
                if text == "\u{1b}" {
                    controller.cancel_search();
                } else {
                    controller.on_key(&text)?;
                }
            }
            KeyPress::Text(text) if !controller.session().key_capture() => {
                // Insert mode: keys change the document instead of running
                // bindings.
                if text == "\u{1b}" {
                    controller.enter_mode(Mode::Normal);
                } else {
                    controller.surface_mut().insert_text(&text);
                }
            }
            KeyPress::Text(text) => controller.on_key(&text)?,
            KeyPress::Backspace if controller.mode() == &Mode::Search => {
                controller.delete_char_from_search();
            }
            KeyPress::Backspace if !controller.session().key_capture() => {
                controller.surface_mut().delete_backward();
            }
            KeyPress::Backspace => {}
            KeyPress::Left => {
                let extend = controller.is_selecting();
                controller.surface_mut().move_horizontal(-1, extend);
            }
            KeyPress::Right => {
                let extend = controller.is_selecting();
                controller.surface_mut().move_horizontal(1, extend);
            }
            KeyPress::Up => {
                let extend = controller.is_selecting();
                controller.surface_mut().move_vertical(-1, extend);
            }
            KeyPress::Down => {
                let extend = controller.is_selecting();
                controller.surface_mut().move_vertical(1, extend);
            }
            KeyPress::Other => {}
        }

        controller.pump_changes();
        ui.render(terminal, controller)?;
    }

    Ok(())
}
