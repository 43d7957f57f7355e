//! Runs the adapter against shell scripts that speak just enough UCI.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chess_core::Position;
use external_engine::{EngineBinary, EngineConfig, EngineError, EngineState, ExternalEngine};
use tokio::sync::Mutex;

// Writing a script while another test forks can leave it busy at exec time.
static SERIAL: Mutex<()> = Mutex::const_new(());

struct FakeEngine {
    dir: PathBuf,
}

impl FakeEngine {
    fn new(name: &str, body: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("fake_engine_{}_{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let script = format!(
            "#!/bin/sh\nLOG='{log}'\necho $$ > '{pid}'\n{body}",
            log = dir.join("log").display(),
            pid = dir.join("pid").display()
        );
        let path = dir.join("engine.sh");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        Self { dir }
    }

    fn engine(&self, timeout: Duration) -> ExternalEngine {
        let config = EngineConfig {
            binary: EngineBinary::everywhere(self.dir.join("engine.sh")),
            ..EngineConfig::default()
        };
        ExternalEngine::new(config).with_timeout(timeout)
    }

    fn log(&self) -> PathBuf {
        self.dir.join("log")
    }

    fn assert_dead(&self) {
        let pid = std::fs::read_to_string(self.dir.join("pid")).unwrap();
        let proc_dir = format!("/proc/{}", pid.trim());
        if Path::new("/proc/self").exists() {
            assert!(!Path::new(&proc_dir).exists(), "engine {} still alive", pid.trim());
        }
    }
}

impl Drop for FakeEngine {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

/// Logs every command to `$LOG` and runs `on_go` when asked to search.
fn responder(on_go: &str) -> String {
    format!(
        r#"while IFS= read -r line; do
  echo "$line" >> "$LOG"
  case "$line" in
    uci) echo "id name Fake"; echo "uciok" ;;
    isready) echo "readyok" ;;
    go*) {on_go} ;;
    quit) exit 0 ;;
  esac
done
"#
    )
}

#[tokio::test]
async fn test_engine_move_is_returned_after_ordered_handshake() {
    let _guard = SERIAL.lock().await;
    let fake = FakeEngine::new(
        "ok",
        &responder(
            r#"echo "info depth 1 score cp 20 pv e2e4"; echo "bestmove e2e4 ponder e7e5""#
        ),
    );

    let mv = fake
        .engine(Duration::from_secs(10))
        .best_move(&Position::startpos(), 1750, 3)
        .await
        .unwrap();
    assert_eq!(mv.san, "e4");

    let log = std::fs::read_to_string(fake.log()).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(
        &lines[..8],
        &[
            "uci",
            "isready",
            "setoption name Threads value 1",
            "setoption name Hash value 128",
            "position fen rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "setoption name UCI_LimitStrength value true",
            "setoption name UCI_Elo value 1750",
            "go depth 3",
        ]
    );
    fake.assert_dead();
}

#[tokio::test]
async fn test_silent_engine_times_out_and_is_killed() {
    let _guard = SERIAL.lock().await;
    let fake = FakeEngine::new("silent", "exec sleep 30\n");

    let started = std::time::Instant::now();
    let err = fake
        .engine(Duration::from_millis(500))
        .best_move(&Position::startpos(), 1750, 10)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Timeout(_)), "{err}");
    assert!(started.elapsed() < Duration::from_secs(10));
    fake.assert_dead();
}

#[tokio::test]
async fn test_illegal_bestmove_is_rejected() {
    let _guard = SERIAL.lock().await;
    let fake = FakeEngine::new(
        "illegal",
        &responder(r#"echo "bestmove e2e5""#),
    );

    let err = fake
        .engine(Duration::from_secs(10))
        .best_move(&Position::startpos(), 1750, 3)
        .await
        .unwrap_err();
    assert!(
        matches!(&err, EngineError::IllegalMove { mv, .. } if mv == "e2e5"),
        "{err}"
    );
    fake.assert_dead();
}

#[tokio::test]
async fn test_engine_leaving_after_its_answer_still_counts() {
    let _guard = SERIAL.lock().await;
    let fake = FakeEngine::new(
        "gone",
        &responder(r#"echo "bestmove d2d4"; exit 0"#),
    );

    let mv = fake
        .engine(Duration::from_secs(10))
        .best_move(&Position::startpos(), 1750, 3)
        .await
        .unwrap();
    assert_eq!(mv.uci, "d2d4");
    fake.assert_dead();
}

#[tokio::test]
async fn test_engine_hanging_after_its_answer_is_not_waited_on() {
    let _guard = SERIAL.lock().await;
    let fake = FakeEngine::new(
        "hang",
        &responder(r#"echo "bestmove g1f3"; sleep 30"#),
    );

    let started = std::time::Instant::now();
    let mv = fake
        .engine(Duration::from_secs(10))
        .best_move(&Position::startpos(), 1750, 3)
        .await
        .unwrap();
    assert_eq!(mv.uci, "g1f3");
    assert!(started.elapsed() < Duration::from_secs(5));
    fake.assert_dead();
}

#[tokio::test]
async fn test_engine_exiting_mid_search_is_a_crash() {
    let _guard = SERIAL.lock().await;
    let fake = FakeEngine::new("crash", &responder("exit 3"));

    let err = fake
        .engine(Duration::from_secs(10))
        .best_move(&Position::startpos(), 1750, 3)
        .await
        .unwrap_err();
    assert!(
        matches!(err, EngineError::Crashed(EngineState::AwaitingResult)),
        "{err}"
    );
    fake.assert_dead();
}

#[tokio::test]
async fn test_out_of_order_output_is_a_protocol_error() {
    let _guard = SERIAL.lock().await;
    let fake = FakeEngine::new(
        "garbled",
        "read -r line\necho \"bestmove e2e4\"\nexec sleep 30\n",
    );

    let err = fake
        .engine(Duration::from_secs(10))
        .best_move(&Position::startpos(), 1750, 3)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Protocol(_)), "{err}");
    fake.assert_dead();
}

#[tokio::test]
async fn test_non_executable_file_is_refused() {
    let _guard = SERIAL.lock().await;
    let fake = FakeEngine::new("noexec", "exit 0\n");
    let path = fake.dir.join("engine.sh");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

    let err = fake
        .engine(Duration::from_secs(10))
        .best_move(&Position::startpos(), 1750, 3)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Spawn { .. }), "{err}");
}
