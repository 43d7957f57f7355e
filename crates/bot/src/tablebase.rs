//! Endgame lookups against a Lichess-style tablebase HTTP service.

use std::time::Duration;

use chess_core::{parse_uci_move, MoveDetail, Position};
use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;

use crate::selector::ENDGAME_PIECES;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TablebaseConfig {
    /// Service endpoint, e.g. `https://tablebase.lichess.ovh/standard`.
    /// Lookups are off while unset.
    pub url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for TablebaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: 5,
        }
    }
}

#[derive(Debug, Error)]
pub enum TablebaseError {
    #[error("bad tablebase url {url}: {reason}")]
    Url { url: String, reason: String },

    #[error("tablebase request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("tablebase suggested illegal move {mv} in {fen}")]
    IllegalMove { mv: String, fen: String },
}

/// One entry of the service's `moves` list.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TablebaseMove {
    pub uci: String,
    /// Win/draw/loss of the position after the move, for the side to move
    /// there. Lower is better for the mover.
    #[serde(default)]
    pub wdl: Option<i8>,
}

#[derive(Debug, Default, Deserialize)]
struct TablebaseReply {
    #[serde(default)]
    moves: Vec<TablebaseMove>,
}

/// The move leaving the opponent worst off. The service lists moves best
/// first, so ties keep that order.
pub fn strongest(moves: &[TablebaseMove]) -> Option<&TablebaseMove> {
    moves.iter().min_by_key(|m| m.wdl.unwrap_or(0))
}

#[derive(Clone, Debug)]
pub struct Tablebase {
    client: Client,
    endpoint: Url,
}

impl Tablebase {
    /// `None` when no url is configured.
    pub fn from_config(config: &TablebaseConfig) -> Result<Option<Self>, TablebaseError> {
        let Some(url) = &config.url else {
            return Ok(None);
        };
        let endpoint = Url::parse(url).map_err(|e| TablebaseError::Url {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        let mut builder = Client::builder().timeout(Duration::from_secs(config.timeout_secs.max(1)));
        // A local mirror is reached directly, whatever the proxy settings say.
        if matches!(endpoint.host_str(), Some("localhost" | "127.0.0.1" | "[::1]")) {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;
        Ok(Some(Self { client, endpoint }))
    }

    /// Best move for `pos`, or `None` when the position has too many pieces
    /// or the service knows no move.
    pub async fn lookup(&self, pos: &Position) -> Result<Option<MoveDetail>, TablebaseError> {
        if pos.piece_count() > ENDGAME_PIECES {
            return Ok(None);
        }
        let fen = pos.to_fen();
        let url = Url::parse_with_params(self.endpoint.as_str(), [("fen", fen.as_str())])
            .map_err(|e| TablebaseError::Url {
                url: self.endpoint.to_string(),
                reason: e.to_string(),
            })?;

        let reply: TablebaseReply = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let Some(best) = strongest(&reply.moves) else {
            tracing::debug!(%fen, "tablebase has no moves");
            return Ok(None);
        };
        tracing::debug!(%fen, mv = %best.uci, wdl = ?best.wdl, "tablebase move");
        parse_uci_move(pos, &best.uci)
            .and_then(|mv| pos.detail(mv))
            .map(Some)
            .ok_or_else(|| TablebaseError::IllegalMove {
                mv: best.uci.clone(),
                fen,
            })
    }
}

#[cfg(test)]
#[path = "tablebase_tests.rs"]
pub(crate) mod tablebase_tests;
