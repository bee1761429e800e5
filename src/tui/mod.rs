pub mod render;
pub mod state;

use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use futures_util::StreamExt;
use ratatui::prelude::*;
use state::AppState;
use std::io::stdout;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Commands the TUI sends to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiCommand {
    Quit,
    SetSearch(String),
    CycleCategory,
    CycleSort,
    ToggleView,
    ClearFilters,
    Move(Movement),
    /// Size of the product area: visible lines and grid columns.
    Viewport { rows: usize, columns: usize },
    OpenSelected,
    AddToCart,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum InputMode {
    Browse,
    /// Editing the search query; holds the edit buffer.
    Search(String),
}

/// Run the TUI. Reads state from `state_rx`, sends commands on `cmd_tx`.
pub async fn run_tui(
    state_rx: watch::Receiver<AppState>,
    cmd_tx: mpsc::Sender<TuiCommand>,
) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = tui_loop(&mut terminal, state_rx, cmd_tx).await;

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn tui_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    mut state_rx: watch::Receiver<AppState>,
    cmd_tx: mpsc::Sender<TuiCommand>,
) -> Result<()> {
    let mut events = EventStream::new();
    let mut spinner = tokio::time::interval(Duration::from_millis(100));
    spinner.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut spinner_frame: u8 = 0;
    let mut mode = InputMode::Browse;
    let mut last_viewport: Option<(usize, usize)> = None;

    loop {
        let state = state_rx.borrow_and_update().clone();
        if state.exit_requested {
            return Ok(());
        }

        let size = terminal.size()?;
        let viewport = render::catalog_viewport(
            Rect::new(0, 0, size.width, size.height),
            state.view.view_mode,
        );
        if last_viewport != Some(viewport) {
            last_viewport = Some(viewport);
            let (rows, columns) = viewport;
            if cmd_tx.send(TuiCommand::Viewport { rows, columns }).await.is_err() {
                return Ok(());
            }
        }

        let search_input = match &mode {
            InputMode::Search(buffer) => Some(buffer.as_str()),
            InputMode::Browse => None,
        };
        terminal.draw(|f| render::draw(f, &state, search_input, spinner_frame))?;

        tokio::select! {
            _ = spinner.tick() => {
                spinner_frame = spinner_frame.wrapping_add(1);
            }
            changed = state_rx.changed() => {
                // Engine gone.
                if changed.is_err() {
                    return Ok(());
                }
            }
            event = events.next() => {
                match event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        let Some(cmd) = handle_key(&mut mode, key, &state.view.search_query) else {
                            continue;
                        };
                        let quit = cmd == TuiCommand::Quit;
                        if cmd_tx.send(cmd).await.is_err() || quit {
                            return Ok(());
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => return Ok(()),
                }
            }
        }
    }
}

/// Map a key press to an engine command, updating the input mode.
fn handle_key(mode: &mut InputMode, key: KeyEvent, current_query: &str) -> Option<TuiCommand> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(TuiCommand::Quit);
    }

    if let InputMode::Search(buffer) = mode {
        return match key.code {
            KeyCode::Char(c) => {
                buffer.push(c);
                Some(TuiCommand::SetSearch(buffer.clone()))
            }
            KeyCode::Backspace => {
                buffer.pop();
                Some(TuiCommand::SetSearch(buffer.clone()))
            }
            KeyCode::Enter | KeyCode::Esc => {
                *mode = InputMode::Browse;
                None
            }
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('q') => Some(TuiCommand::Quit),
        KeyCode::Char('/') => {
            *mode = InputMode::Search(current_query.to_string());
            None
        }
        KeyCode::Char('c') => Some(TuiCommand::CycleCategory),
        KeyCode::Char('s') => Some(TuiCommand::CycleSort),
        KeyCode::Char('v') => Some(TuiCommand::ToggleView),
        KeyCode::Char('x') => Some(TuiCommand::ClearFilters),
        KeyCode::Char('a') => Some(TuiCommand::AddToCart),
        KeyCode::Char('j') | KeyCode::Down => Some(TuiCommand::Move(Movement::Down)),
        KeyCode::Char('k') | KeyCode::Up => Some(TuiCommand::Move(Movement::Up)),
        KeyCode::Char('h') | KeyCode::Left => Some(TuiCommand::Move(Movement::Left)),
        KeyCode::Char('l') | KeyCode::Right => Some(TuiCommand::Move(Movement::Right)),
        KeyCode::Char('g') | KeyCode::Home => Some(TuiCommand::Move(Movement::Top)),
        KeyCode::Char('G') | KeyCode::End => Some(TuiCommand::Move(Movement::Bottom)),
        KeyCode::PageUp => Some(TuiCommand::Move(Movement::PageUp)),
        KeyCode::PageDown => Some(TuiCommand::Move(Movement::PageDown)),
        KeyCode::Enter => Some(TuiCommand::OpenSelected),
        KeyCode::Esc => Some(TuiCommand::Back),
        _ => None,
    }
}
