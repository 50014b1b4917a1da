//! UI rendering using ratatui.

use crossword_arena_core::{Cell, Direction as WordDirection, Sender, SessionState, Status, Turn, WordId};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

/// Everything one frame shows.
#[derive(Debug, Clone)]
pub struct View {
    /// Session document.
    pub state: SessionState,
    /// Keyboard cursor.
    pub cursor: (usize, usize),
    /// Cell receiving letters.
    pub active_cell: Option<(usize, usize)>,
    /// Highlighted clue.
    pub selected_clue: Option<WordId>,
    /// Replication reachable.
    pub connected: bool,
    /// Replication configured at all.
    pub replicated: bool,
    /// AI move scheduled.
    pub ai_thinking: bool,
    /// Viewer never drives the game.
    pub spectator: bool,
}

/// Draws the main UI.
pub fn draw(f: &mut Frame, view: &View) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title = Paragraph::new("Crossword Battle Arena")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(view.state.grid.cols() as u16 * 3 + 2), Constraint::Min(0)])
        .split(rows[1]);

    render_grid(f, columns[0], view);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(view.state.words.len() as u16 + 2),
            Constraint::Min(0),
        ])
        .split(columns[1]);

    render_scores(f, side[0], view);
    render_clues(f, side[1], view);
    render_chat(f, side[2], &view.state);

    let help = if view.spectator {
        "Spectating | Esc: Quit"
    } else {
        "Arrows: Move | a-z: Letter | Backspace: Erase | Tab: Clue | F2: Start | F5: Reset | Esc: Quit"
    };
    let help = Paragraph::new(help)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, rows[2]);
}

fn render_grid(f: &mut Frame, area: Rect, view: &View) {
    let highlighted = view
        .selected_clue
        .and_then(|id| view.state.word(id))
        .map(|w| w.cells().collect::<Vec<_>>())
        .unwrap_or_default();

    let lines: Vec<Line> = view
        .state
        .grid
        .cells()
        .iter()
        .enumerate()
        .map(|(row, cells)| {
            Line::from(
                cells
                    .iter()
                    .enumerate()
                    .map(|(col, cell)| {
                        let here = (row, col);
                        cell_span(
                            cell,
                            here == view.cursor,
                            Some(here) == view.active_cell,
                            highlighted.contains(&here),
                        )
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .collect();

    let grid = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Grid"));
    f.render_widget(grid, area);
}

fn cell_span(cell: &Cell, cursor: bool, active: bool, highlighted: bool) -> Span<'static> {
    if cell.blocked {
        return Span::styled("   ", Style::default().bg(Color::Black));
    }
    let text = match (cell.letter, cell.number) {
        (Some(letter), _) => format!(" {} ", letter),
        (None, Some(number)) => format!("{:<3}", number),
        (None, None) => " . ".to_string(),
    };
    let mut style = Style::default().fg(Color::Black).bg(Color::White);
    if highlighted {
        style = style.bg(Color::LightBlue);
    }
    if active {
        style = style.bg(Color::Yellow).add_modifier(Modifier::BOLD);
    }
    if cursor {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Span::styled(text, style)
}

fn render_scores(f: &mut Frame, area: Rect, view: &View) {
    let state = &view.state;
    let status = match (state.status, state.turn) {
        (Status::Waiting, _) => "Waiting - press F2 to start".to_string(),
        (Status::Finished, _) => {
            let verdict = match state.human_score.cmp(&state.ai_score) {
                std::cmp::Ordering::Greater => "You win!",
                std::cmp::Ordering::Less => "AI wins!",
                std::cmp::Ordering::Equal => "It's a tie!",
            };
            format!("Game over. {}", verdict)
        }
        (Status::Playing, Turn::Ai) if view.ai_thinking => "AI is thinking...".to_string(),
        (Status::Playing, turn) => format!("Turn: {}", turn),
    };
    let connection = match (view.replicated, view.connected) {
        (false, _) => Span::styled("local", Style::default().fg(Color::DarkGray)),
        (true, true) => Span::styled("connected", Style::default().fg(Color::Green)),
        (true, false) => Span::styled("offline", Style::default().fg(Color::Red)),
    };

    let text = vec![
        Line::from(vec![
            Span::raw(format!("You {}  AI {}  ", state.human_score, state.ai_score)),
            connection,
        ]),
        Line::from(Span::styled(status, Style::default().fg(Color::Yellow))),
    ];
    let scores = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Score"));
    f.render_widget(scores, area);
}

fn render_clues(f: &mut Frame, area: Rect, view: &View) {
    let items: Vec<ListItem> = view
        .state
        .words
        .iter()
        .map(|word| {
            let arrow = match word.direction {
                WordDirection::Across => "→",
                WordDirection::Down => "↓",
            };
            let mut style = Style::default();
            if word.solved {
                style = style.fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT);
            }
            if Some(word.id) == view.selected_clue {
                style = style.fg(Color::Cyan).add_modifier(Modifier::BOLD);
            }
            ListItem::new(format!("{} {} {} ({})", word.id, arrow, word.clue, word.len())).style(style)
        })
        .collect();

    let clues = List::new(items).block(Block::default().borders(Borders::ALL).title("Clues"));
    f.render_widget(clues, area);
}

fn render_chat(f: &mut Frame, area: Rect, state: &SessionState) {
    let visible = area.height.saturating_sub(2) as usize;
    let skip = state.chat.len().saturating_sub(visible);
    let lines: Vec<Line> = state
        .chat
        .iter()
        .skip(skip)
        .map(|message| {
            let color = match message.sender {
                Sender::System => Color::Gray,
                Sender::Human => Color::Green,
                Sender::Ai => Color::Magenta,
            };
            Line::from(vec![
                Span::styled(format!("{}: ", message.sender), Style::default().fg(color)),
                Span::raw(message.text.clone()),
            ])
        })
        .collect();

    let chat = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Chat"));
    f.render_widget(chat, area);
}
