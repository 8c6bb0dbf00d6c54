use std::collections::VecDeque;
use std::time::{Duration, Instant};

use rand::Rng;
use thiserror::Error;

use crate::session::{FallbackReason, SessionOutcome, fallback_session};

pub const NUM_CATEGORIES: usize = 6;
pub const NUM_CLUES: usize = 5;

pub const HIDDEN_TEXT: &str = "?";
pub const BUSY_NOTICE: &str = "Board is still loading";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Showing {
    Hidden,
    Question,
    Answer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clue {
    question: String,
    answer: String,
    showing: Showing,
}

impl Clue {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            showing: Showing::Hidden,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn showing(&self) -> Showing {
        self.showing
    }

    /// Advances one step and returns the text to display, or `None` once the
    /// answer is already up.
    pub fn reveal(&mut self) -> Option<&str> {
        match self.showing {
            Showing::Hidden => {
                self.showing = Showing::Question;
                Some(&self.question)
            }
            Showing::Question => {
                self.showing = Showing::Answer;
                Some(&self.answer)
            }
            Showing::Answer => None,
        }
    }

    pub fn display_text(&self) -> &str {
        match self.showing {
            Showing::Hidden => HIDDEN_TEXT,
            Showing::Question => &self.question,
            Showing::Answer => &self.answer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    title: String,
    clues: Vec<Clue>,
}

impl Category {
    pub fn new(title: impl Into<String>, clues: Vec<Clue>) -> Self {
        Self {
            title: title.into(),
            clues,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn clues(&self) -> &[Clue] {
        &self.clues
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardShapeError {
    #[error("expected {expected} categories, got {got}")]
    CategoryCount { expected: usize, got: usize },
    #[error("category {index} has {got} clues, expected {expected}")]
    ClueCount {
        index: usize,
        expected: usize,
        got: usize,
    },
}

/// The categories of one game. Columns are categories, rows are clues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    categories: Vec<Category>,
}

impl Board {
    pub fn new(categories: Vec<Category>) -> Result<Self, BoardShapeError> {
        if categories.len() != NUM_CATEGORIES {
            return Err(BoardShapeError::CategoryCount {
                expected: NUM_CATEGORIES,
                got: categories.len(),
            });
        }
        if let Some((index, category)) = categories
            .iter()
            .enumerate()
            .find(|(_, c)| c.clues.len() != NUM_CLUES)
        {
            return Err(BoardShapeError::ClueCount {
                index,
                expected: NUM_CLUES,
                got: category.clues.len(),
            });
        }
        Ok(Self { categories })
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn clue(&self, category: usize, clue: usize) -> Option<&Clue> {
        self.categories.get(category)?.clues.get(clue)
    }

    /// Bounds-checked reveal. Unknown coordinates and finished clues both
    /// yield `None` without touching the board.
    pub fn reveal(&mut self, category: usize, clue: usize) -> Option<&str> {
        self.categories
            .get_mut(category)?
            .clues
            .get_mut(clue)?
            .reveal()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
    pub shown_at: Instant,
}

impl Notice {
    pub fn new(message: impl Into<String>, level: NoticeLevel) -> Self {
        Self {
            message: message.into(),
            level,
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.shown_at) >= ttl
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Start,
    Loading,
    Board,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub category: usize,
    pub clue: usize,
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub board: Option<Board>,
    pub cursor: Cursor,
    pub building: bool,
    pub notice: Option<Notice>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Start,
            board: None,
            cursor: Cursor::default(),
            building: false,
            notice: None,
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 50;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Marks a build as started. Returns `false` if one is already running.
    pub fn begin_build(&mut self) -> bool {
        if self.building {
            self.show_notice(BUSY_NOTICE, NoticeLevel::Info);
            self.push_log(format!("[INFO] {BUSY_NOTICE}"));
            return false;
        }
        self.building = true;
        self.screen = Screen::Loading;
        self.board = None;
        self.cursor = Cursor::default();
        true
    }

    pub fn show_notice(&mut self, message: impl Into<String>, level: NoticeLevel) {
        self.notice = Some(Notice::new(message, level));
    }

    pub fn expire_notice(&mut self, now: Instant, ttl: Duration) {
        if self
            .notice
            .as_ref()
            .is_some_and(|notice| notice.is_expired(now, ttl))
        {
            self.notice = None;
        }
    }

    pub fn reveal_at(&mut self, category: usize, clue: usize) -> Option<String> {
        let text = self.board.as_mut()?.reveal(category, clue)?.to_string();
        tracing::debug!(category, clue, "clue revealed");
        Some(text)
    }

    pub fn reveal_cursor(&mut self) -> Option<String> {
        let Cursor { category, clue } = self.cursor;
        self.reveal_at(category, clue)
    }

    pub fn move_cursor(&mut self, d_category: isize, d_clue: isize) {
        self.cursor.category = step_clamped(self.cursor.category, d_category, NUM_CATEGORIES);
        self.cursor.clue = step_clamped(self.cursor.clue, d_clue, NUM_CLUES);
    }
}

fn step_clamped(value: usize, delta: isize, len: usize) -> usize {
    let max = len.saturating_sub(1);
    value.saturating_add_signed(delta).min(max)
}

/// The session provider stopped before answering. A pending build is
/// finished locally from the fallback pool.
pub fn provider_gone<R: Rng + ?Sized>(state: &mut AppState, rng: &mut R) {
    if !state.building {
        return;
    }
    tracing::warn!("session provider unavailable, building fallback board");
    let outcome = fallback_session(FallbackReason::SetupFailed, rng);
    apply_delta(state, Delta::SessionReady(outcome));
}

#[derive(Debug)]
pub enum Delta {
    SessionReady(SessionOutcome),
    Log(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderCommand {
    BuildSession,
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SessionReady(outcome) => {
            if let Some(reason) = outcome.fallback {
                state.show_notice(reason.notice(), NoticeLevel::Warning);
                state.push_log(format!("[WARN] {}", reason.notice()));
            } else {
                state.push_log("[INFO] Board loaded from API");
            }
            state.board = Some(outcome.board);
            state.cursor = Cursor::default();
            state.building = false;
            state.screen = Screen::Board;
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
