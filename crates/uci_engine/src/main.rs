use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use chess_bot::{fallback_move, Difficulty, MovePredictor, PredictError, PredictorConfig};
use chess_core::{position_from_uci_args, MoveHistory, Position};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_CONFIG: &str = "bot.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the protocol, so logs go to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config(config_arg(std::env::args().skip(1))?)?;
    let predictor = MovePredictor::new(config);

    let mut stdout = io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut pos = Position::startpos();
    let mut history = MoveHistory::new();
    let mut difficulty = Difficulty::Intermediate;

    while let Some(line) = lines.next_line().await? {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }

        match parts[0] {
            "uci" => {
                writeln!(stdout, "id name ChessBot {}", env!("CARGO_PKG_VERSION")).ok();
                writeln!(stdout, "id author ChessBot developers").ok();
                write!(
                    stdout,
                    "option name Difficulty type combo default {difficulty}"
                )
                .ok();
                for tier in Difficulty::ALL {
                    write!(stdout, " var {tier}").ok();
                }
                writeln!(stdout).ok();
                writeln!(stdout, "uciok").ok();
                stdout.flush().ok();
            }
            "isready" => {
                ensure_ready(&predictor).await;
                writeln!(stdout, "readyok").ok();
                stdout.flush().ok();
            }
            "setoption" => match parse_setoption(&parts[1..]) {
                Some((name, value)) if name.eq_ignore_ascii_case("Difficulty") => {
                    match value.parse::<Difficulty>() {
                        Ok(d) => {
                            difficulty = d;
                            tracing::info!(%difficulty, "difficulty set");
                        }
                        Err(e) => tracing::warn!(%value, error = %e, "ignoring difficulty"),
                    }
                }
                Some((name, _)) => tracing::debug!(%name, "ignoring unknown option"),
                None => tracing::warn!(%line, "malformed setoption"),
            },
            "ucinewgame" => {
                pos = Position::startpos();
                history = MoveHistory::new();
            }
            "position" => match position_from_uci_args(&parts[1..]) {
                Ok((p, h)) => {
                    pos = p;
                    history = h;
                }
                Err(e) => tracing::warn!(%line, error = %e, "rejected position"),
            },
            "go" => {
                ensure_ready(&predictor).await;
                let reply = match predictor
                    .predict_position(pos.clone(), history.clone(), difficulty)
                    .await
                {
                    Ok(prediction) => {
                        tracing::info!(
                            mv = %prediction.mv.san,
                            source = %prediction.source,
                            strategy = %prediction.strategy,
                            "bestmove"
                        );
                        prediction.mv.uci
                    }
                    Err(PredictError::NoLegalMove { .. }) => "0000".to_string(),
                    Err(e) => {
                        tracing::warn!(error = %e, "prediction failed, using fallback");
                        fallback_move(&pos).map_or_else(|| "0000".to_string(), |m| m.uci)
                    }
                };
                writeln!(stdout, "bestmove {reply}").ok();
                stdout.flush().ok();
            }
            "quit" => break,
            _ => {}
        }
    }

    predictor.shutdown().await;
    Ok(())
}

/// Path given with `--config`, or `None` to use the default file if present.
fn config_arg(mut args: impl Iterator<Item = String>) -> anyhow::Result<Option<PathBuf>> {
    let mut path = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => match args.next() {
                Some(p) => path = Some(PathBuf::from(p)),
                None => bail!("{arg} needs a path"),
            },
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(path)
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<PredictorConfig> {
    let path = match path {
        Some(p) => p,
        None if std::path::Path::new(DEFAULT_CONFIG).is_file() => PathBuf::from(DEFAULT_CONFIG),
        None => {
            tracing::warn!("no {DEFAULT_CONFIG} found, running with built-in defaults");
            return Ok(PredictorConfig::default());
        }
    };
    PredictorConfig::load(&path).with_context(|| format!("loading {}", path.display()))
}

async fn ensure_ready(predictor: &MovePredictor) {
    if predictor.is_ready().await {
        return;
    }
    if let Err(e) = predictor.preload().await {
        tracing::error!(error = %e, "preload failed");
    }
}

/// `name <words...> [value <words...>]` from a `setoption` line.
fn parse_setoption(args: &[&str]) -> Option<(String, String)> {
    let (&first, rest) = args.split_first()?;
    if first != "name" {
        return None;
    }
    let value_at = rest.iter().position(|&a| a == "value");
    let (name, value) = match value_at {
        Some(i) => (&rest[..i], &rest[i + 1..]),
        None => (rest, &rest[rest.len()..]),
    };
    if name.is_empty() {
        return None;
    }
    Some((name.join(" "), value.join(" ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setoption_parsing() {
        assert_eq!(
            parse_setoption(&["name", "Difficulty", "value", "master"]),
            Some(("Difficulty".to_string(), "master".to_string()))
        );
        assert_eq!(
            parse_setoption(&["name", "Clear", "Hash"]),
            Some(("Clear Hash".to_string(), String::new()))
        );
        assert_eq!(parse_setoption(&["value", "3"]), None);
        assert_eq!(parse_setoption(&["name"]), None);
    }

    #[test]
    fn test_config_argument() {
        let args = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter();
        assert_eq!(config_arg(args(&[])).unwrap(), None);
        assert_eq!(
            config_arg(args(&["--config", "x.toml"])).unwrap(),
            Some(PathBuf::from("x.toml"))
        );
        assert!(config_arg(args(&["--config"])).is_err());
        assert!(config_arg(args(&["--depth", "3"])).is_err());
    }
}
