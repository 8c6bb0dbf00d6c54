use std::io;
use std::sync::mpsc::{self, TryRecvError};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};

use jeopardy_terminal::category_fetch::SpringboardSource;
use jeopardy_terminal::config::AppConfig;
use jeopardy_terminal::logging::init_tracing;
use jeopardy_terminal::provider::spawn_session_provider;
use jeopardy_terminal::state::{
    AppState, Board, Clue, Delta, NUM_CATEGORIES, NUM_CLUES, NoticeLevel, ProviderCommand, Screen,
    Showing, apply_delta, provider_gone,
};

const TITLE_HEIGHT: u16 = 3;

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    notice_ttl: Duration,
    frame_area: Rect,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>, config: &AppConfig) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
            notice_ttl: config.notice_ttl(),
            frame_area: Rect::default(),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('n') | KeyCode::Char('r') => self.start_game(),
            KeyCode::Enter | KeyCode::Char(' ') => match self.state.screen {
                Screen::Start => self.start_game(),
                Screen::Board => {
                    self.state.reveal_cursor();
                }
                Screen::Loading => {}
            },
            KeyCode::Char('h') | KeyCode::Left => self.state.move_cursor(-1, 0),
            KeyCode::Char('l') | KeyCode::Right => self.state.move_cursor(1, 0),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_cursor(0, -1),
            KeyCode::Char('j') | KeyCode::Down => self.state.move_cursor(0, 1),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        if self.state.screen != Screen::Board || self.state.help_overlay {
            return;
        }
        let board_area = screen_chunks(self.frame_area)[2];
        let Some((category, clue)) = cell_at(board_area, mouse.column, mouse.row) else {
            return;
        };
        self.state.cursor.category = category;
        self.state.cursor.clue = clue;
        self.state.reveal_at(category, clue);
    }

    fn start_game(&mut self) {
        if !self.state.begin_build() {
            return;
        }
        let sent = self
            .cmd_tx
            .as_ref()
            .is_some_and(|tx| tx.send(ProviderCommand::BuildSession).is_ok());
        if !sent {
            self.cmd_tx = None;
            provider_gone(&mut self.state, &mut rand::thread_rng());
        }
    }
}

fn main() -> io::Result<()> {
    let config = AppConfig::load();
    if let Err(err) = init_tracing(&config) {
        eprintln!("warning: logging disabled: {err:#}");
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let source = SpringboardSource::new(config.api_base.clone(), config.request_timeout_secs);
    spawn_session_provider(source, config.category_pool, tx, cmd_rx);

    let mut app = App::new(Some(cmd_tx), &config);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        loop {
            match rx.try_recv() {
                Ok(delta) => apply_delta(&mut app.state, delta),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if app.state.building {
                        app.cmd_tx = None;
                        provider_gone(&mut app.state, &mut rand::thread_rng());
                    }
                    break;
                }
            }
        }

        app.state.expire_notice(Instant::now(), app.notice_ttl);

        app.frame_area = terminal.size()?;
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.on_key(key),
                Event::Mouse(mouse) => app.on_mouse(mouse),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn screen_chunks(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(area)
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = screen_chunks(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_notice(frame, chunks[1], &app.state);

    match (&app.state.screen, app.state.board.as_ref()) {
        (Screen::Board, Some(board)) => render_board(frame, chunks[2], board, &app.state),
        (Screen::Loading, _) => render_loading(frame, chunks[2]),
        _ => render_start(frame, chunks[2], &app.state),
    }

    let footer = Paragraph::new(footer_text(&app.state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let status = match state.screen {
        Screen::Start => "READY",
        Screen::Loading => "LOADING",
        Screen::Board => "PLAYING",
    };
    format!(" JEOPARDY! | {status}\n {}", state.logs.back().map(String::as_str).unwrap_or(""))
}

fn footer_text(state: &AppState) -> String {
    let start = if state.board.is_some() {
        "n Reset Game"
    } else {
        "n Start Game"
    };
    match state.screen {
        Screen::Board => format!(
            "←/→/↑/↓ Move | Enter/Space/Click Reveal | {start} | ? Help | q Quit"
        ),
        _ => format!("{start} | ? Help | q Quit"),
    }
}

fn render_notice(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(notice) = &state.notice else {
        return;
    };
    let style = match notice.level {
        NoticeLevel::Info => Style::default().fg(Color::Black).bg(Color::Cyan),
        NoticeLevel::Warning => Style::default().fg(Color::Black).bg(Color::Yellow),
    };
    let banner = Paragraph::new(format!("⚠ {}", notice.message))
        .alignment(Alignment::Center)
        .style(style);
    frame.render_widget(banner, area);
}

fn render_start(frame: &mut Frame, area: Rect, state: &AppState) {
    let label = if state.board.is_some() {
        "Reset Game"
    } else {
        "Start Game"
    };
    let button_area = centered_rect(30, 20, area);
    let button = Paragraph::new(format!("\n[ {label} ]\n\npress n or Enter"))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded));
    frame.render_widget(button, button_area);
}

fn render_loading(frame: &mut Frame, area: Rect) {
    let loader_area = centered_rect(30, 20, area);
    let loader = Paragraph::new("\nLoading categories...")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(loader, loader_area);
}

fn board_columns(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, NUM_CATEGORIES as u32); NUM_CATEGORIES])
        .split(area)
}

fn column_rows(column: Rect) -> std::rc::Rc<[Rect]> {
    let mut constraints = vec![Constraint::Length(TITLE_HEIGHT)];
    constraints.extend([Constraint::Ratio(1, NUM_CLUES as u32); NUM_CLUES]);
    Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(column)
}

/// Maps a terminal position to `(category, clue)`. Title cells and
/// positions outside the grid map to nothing.
fn cell_at(board_area: Rect, x: u16, y: u16) -> Option<(usize, usize)> {
    let columns = board_columns(board_area);
    let category = columns.iter().position(|col| contains(*col, x, y))?;
    let rows = column_rows(columns[category]);
    let row = rows.iter().position(|r| contains(*r, x, y))?;
    row.checked_sub(1).map(|clue| (category, clue))
}

fn contains(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn render_board(frame: &mut Frame, area: Rect, board: &Board, state: &AppState) {
    let columns = board_columns(area);
    for (cat_idx, category) in board.categories().iter().enumerate() {
        let rows = column_rows(columns[cat_idx]);

        let title = Paragraph::new(category.title().to_uppercase())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .style(Style::default().add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(title, rows[0]);

        for (clue_idx, clue) in category.clues().iter().enumerate() {
            let selected =
                state.cursor.category == cat_idx && state.cursor.clue == clue_idx;
            render_clue_cell(frame, rows[clue_idx + 1], clue, selected);
        }
    }
}

fn render_clue_cell(frame: &mut Frame, area: Rect, clue: &Clue, selected: bool) {
    let style = match clue.showing() {
        Showing::Hidden => Style::default().fg(Color::DarkGray),
        Showing::Question => Style::default().fg(Color::White),
        Showing::Answer => Style::default().fg(Color::White).bg(Color::Blue),
    };
    let border_style = if selected {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let border_type = if selected {
        BorderType::Thick
    } else {
        BorderType::Plain
    };
    let cell = Paragraph::new(clue.display_text())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(border_type)
                .border_style(border_style),
        );
    frame.render_widget(cell, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Jeopardy - Help",
        "",
        "Game:",
        "  n / r        Start or reset the game",
        "  ?            Toggle help",
        "  q / Esc      Quit",
        "",
        "Board:",
        "  ←/→/↑/↓      Move (or h/j/k/l)",
        "  Enter/Space  Reveal question, then answer",
        "  Click        Reveal the clicked cell",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
