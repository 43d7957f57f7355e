//! External UCI engine adapter.
//!
//! Each request spawns a fresh engine process, performs the handshake,
//! configures strength and tablebases, searches to a fixed depth and
//! returns the engine's move after checking it against the legal move list.
//! The process never outlives the request.

mod engine;
mod error;
mod process;
pub mod protocol;

use std::fmt;

pub use engine::{EngineBinary, EngineConfig, ExternalEngine};
pub use error::{EngineError, Result};
pub use process::EngineProcess;
pub use protocol::{Command, ProtocolError};

/// Where a request is in its conversation with the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Spawned,
    Handshake,
    Configured,
    Searching,
    AwaitingResult,
    Resolved,
    TimedOut,
    Crashed,
    Rejected,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EngineState::Spawned => "spawned",
            EngineState::Handshake => "handshaking",
            EngineState::Configured => "configuring",
            EngineState::Searching => "starting the search",
            EngineState::AwaitingResult => "awaiting bestmove",
            EngineState::Resolved => "resolved",
            EngineState::TimedOut => "timed out",
            EngineState::Crashed => "crashed",
            EngineState::Rejected => "rejected",
        };
        f.write_str(s)
    }
}
