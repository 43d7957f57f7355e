//! UCI text protocol, engine side of the conversation.
//!
//! Outgoing lines are built from [`Command`]. Incoming lines go through
//! [`UciParser`], which only accepts them in the order a well-behaved engine
//! sends them: `uciok`, then `readyok`, then any number of `info` lines
//! followed by one `bestmove`.

use std::fmt;

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Uci,
    IsReady,
    SetOption { name: &'static str, value: String },
    PositionFen(String),
    GoDepth(u8),
    Quit,
}

impl Command {
    pub fn set_option(name: &'static str, value: impl ToString) -> Self {
        Command::SetOption {
            name,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Uci => write!(f, "uci"),
            Command::IsReady => write!(f, "isready"),
            Command::SetOption { name, value } => write!(f, "setoption name {name} value {value}"),
            Command::PositionFen(fen) => write!(f, "position fen {fen}"),
            Command::GoDepth(depth) => write!(f, "go depth {depth}"),
            Command::Quit => write!(f, "quit"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParserState {
    AwaitingUciOk,
    AwaitingReadyOk,
    AwaitingBestMove,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Score {
    Cp(i32),
    Mate(i32),
}

/// The parts of an `info` line worth logging.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchInfo {
    pub depth: Option<u32>,
    pub score: Option<Score>,
    pub nodes: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// `id`, `option`, `info string` and anything else with no effect.
    Ignored,
    UciOk,
    ReadyOk,
    Info(SearchInfo),
    /// The move token exactly as the engine wrote it.
    BestMove(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("unexpected '{line}' while {state:?}")]
    Unexpected { state: ParserState, line: String },

    #[error("bestmove line without a move")]
    EmptyBestMove,

    #[error("output after bestmove: '{0}'")]
    AfterBestMove(String),
}

#[derive(Debug)]
pub struct UciParser {
    state: ParserState,
}

impl Default for UciParser {
    fn default() -> Self {
        Self::new()
    }
}

impl UciParser {
    pub fn new() -> Self {
        Self {
            state: ParserState::AwaitingUciOk,
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn feed(&mut self, line: &str) -> Result<Event, ProtocolError> {
        let mut tokens = line.split_whitespace();
        let Some(head) = tokens.next() else {
            return Ok(Event::Ignored);
        };

        if self.state == ParserState::Finished {
            return Err(ProtocolError::AfterBestMove(line.trim().to_string()));
        }

        let unexpected = |state| ProtocolError::Unexpected {
            state,
            line: line.trim().to_string(),
        };

        match (self.state, head) {
            (ParserState::AwaitingUciOk, "uciok") => {
                self.state = ParserState::AwaitingReadyOk;
                Ok(Event::UciOk)
            }
            (ParserState::AwaitingReadyOk, "readyok") => {
                self.state = ParserState::AwaitingBestMove;
                Ok(Event::ReadyOk)
            }
            (ParserState::AwaitingBestMove, "bestmove") => {
                let mv = tokens.next().ok_or(ProtocolError::EmptyBestMove)?;
                self.state = ParserState::Finished;
                Ok(Event::BestMove(mv.to_string()))
            }
            (ParserState::AwaitingBestMove, "info") => Ok(parse_info(tokens)
                .map(Event::Info)
                .unwrap_or(Event::Ignored)),
            (state, "uciok" | "readyok" | "bestmove") => Err(unexpected(state)),
            _ => Ok(Event::Ignored),
        }
    }
}

/// Reads `depth`, `score` and `nodes` from the tokens after `info`.
/// Returns `None` for lines carrying none of them (`info string ...`, `currmove`).
fn parse_info<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Option<SearchInfo> {
    let mut info = SearchInfo::default();
    while let Some(key) = tokens.next() {
        match key {
            "string" => return None,
            "depth" => info.depth = tokens.next().and_then(|t| t.parse().ok()),
            "nodes" => info.nodes = tokens.next().and_then(|t| t.parse().ok()),
            "score" => {
                let kind = tokens.next();
                let value = tokens.next().and_then(|t| t.parse().ok());
                info.score = match (kind, value) {
                    (Some("cp"), Some(v)) => Some(Score::Cp(v)),
                    (Some("mate"), Some(v)) => Some(Score::Mate(v)),
                    _ => None,
                };
            }
            // The principal variation runs to the end of the line.
            "pv" => break,
            _ => {}
        }
    }
    if info == SearchInfo::default() {
        None
    } else {
        Some(info)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod protocol_tests;
