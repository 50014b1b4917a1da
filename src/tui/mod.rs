//! Terminal UI for Crossword Arena

mod input;
mod ui;

pub use input::{Action, action_for, advance, first_open, move_cursor, next_clue};
pub use ui::{View, draw};

use crate::session::ArenaClient;
use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use crossword_arena_core::{Entry, Transition};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// Log file used while the terminal is taken over.
pub const LOG_FILE: &str = "crossword_arena_tui.log";

/// How the terminal client takes part in the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Enters letters, starts and resets.
    Player,
    /// Only watches.
    Spectator,
}

/// Routes logs to [`LOG_FILE`] so they do not draw over the UI.
pub fn init_file_logging() -> Result<()> {
    let log_file = std::fs::File::create(LOG_FILE)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(crate::DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

/// Runs the terminal client until the user quits.
#[instrument(skip(client))]
pub async fn run(client: ArenaClient, role: Role, replicated: bool) -> Result<()> {
    info!("Starting Crossword Arena TUI");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = event_loop(&mut terminal, &client, role, replicated).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "TUI loop error");
    }
    res
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    client: &ArenaClient,
    role: Role,
    replicated: bool,
) -> Result<()> {
    let mut cursor = first_open(&client.current_state().grid).unwrap_or((0, 0));

    loop {
        let view = View {
            state: client.current_state(),
            cursor,
            active_cell: client.active_cell(),
            selected_clue: client.selected_clue(),
            connected: client.is_connected(),
            replicated,
            ai_thinking: client.ai_pending(),
            spectator: role == Role::Spectator,
        };
        terminal.draw(|f| draw(f, &view))?;

        if !event::poll(Duration::from_millis(100))? {
            tokio::task::yield_now().await;
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        let Some(action) = action_for(key) else {
            continue;
        };
        debug!(?action, "Key action");

        if action == Action::Quit {
            info!("User quit");
            return Ok(());
        }
        if role == Role::Spectator {
            continue;
        }

        match action {
            Action::Move(code) => {
                cursor = move_cursor(&view.state.grid, cursor, code);
                client.click_cell(cursor.0, cursor.1);
            }
            Action::Letter(c) => {
                if let Some(Transition::Applied) = client.input_char(c) {
                    step_forward(client, &mut cursor);
                }
            }
            Action::Erase => {
                client.input_letter(Entry::Erase);
            }
            Action::NextClue => {
                let state = client.current_state();
                if let Some(id) = next_clue(&state.words, client.selected_clue()) {
                    if let Some(word) = state.word(id) {
                        cursor = (word.row, word.col);
                        client.click_cell(word.row, word.col);
                    }
                    client.select_clue(id);
                }
            }
            Action::Start => {
                client.start();
                cursor = first_open(&client.current_state().grid).unwrap_or((0, 0));
            }
            Action::Reset => {
                client.reset();
            }
            Action::Quit => {}
        }
    }
}

/// After a letter lands, moves to the next cell of the selected word.
fn step_forward(client: &ArenaClient, cursor: &mut (usize, usize)) {
    let state = client.current_state();
    let Some(id) = client.selected_clue() else {
        return;
    };
    let next = state
        .word(id)
        .zip(client.active_cell())
        .and_then(|(word, cell)| advance(word, cell));
    if let Some((row, col)) = next
        && client.click_cell(row, col)
    {
        // Crossing cells select the lower id; stay on the word being typed.
        client.select_clue(id);
        *cursor = (row, col);
    }
}
