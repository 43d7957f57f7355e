use super::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Answers one HTTP request with `body` and hands back the request line.
pub(crate) async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 8192];
        let mut read = 0;
        loop {
            let n = socket.read(&mut buf[read..]).await.unwrap();
            read += n;
            if n == 0 || buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        let request = String::from_utf8_lossy(&buf[..read])
            .lines()
            .next()
            .unwrap_or_default()
            .to_string();
        let reply = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(reply.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });
    (format!("http://{addr}/standard"), handle)
}

fn client(url: &str) -> Tablebase {
    Tablebase::from_config(&TablebaseConfig {
        url: Some(url.to_string()),
        timeout_secs: 5,
    })
    .unwrap()
    .unwrap()
}

const KQK: &str = "4k3/8/8/8/8/8/8/K2Q4 w - - 0 1";

fn tb_move(uci: &str, wdl: Option<i8>) -> TablebaseMove {
    TablebaseMove {
        uci: uci.to_string(),
        wdl,
    }
}

#[test]
fn test_strongest_leaves_the_opponent_worst_off() {
    let moves = [
        tb_move("a1a2", Some(0)),
        tb_move("d1d7", Some(-2)),
        tb_move("d1d8", Some(-2)),
        tb_move("d1h5", None),
    ];
    assert_eq!(strongest(&moves).unwrap().uci, "d1d7");
    assert_eq!(strongest(&[]), None);
}

#[test]
fn test_reply_ignores_unknown_fields() {
    let reply: TablebaseReply = serde_json::from_str(
        r#"{"category":"win","dtz":5,"moves":[{"uci":"d1d7","san":"Qd7+","wdl":-2,"category":"loss"}]}"#,
    )
    .unwrap();
    assert_eq!(reply.moves, vec![tb_move("d1d7", Some(-2))]);
}

#[test]
fn test_config() {
    assert!(Tablebase::from_config(&TablebaseConfig::default())
        .unwrap()
        .is_none());
    let err = Tablebase::from_config(&TablebaseConfig {
        url: Some("not a url".into()),
        timeout_secs: 5,
    })
    .unwrap_err();
    assert!(matches!(err, TablebaseError::Url { .. }), "{err}");
}

#[tokio::test]
async fn test_lookup_returns_the_strongest_legal_move() {
    let (url, server) = serve_once(
        "200 OK",
        r#"{"moves":[{"uci":"a1a2","wdl":0},{"uci":"d1d7","wdl":-2}]}"#,
    )
    .await;
    let pos = Position::from_fen(KQK).unwrap();
    let mv = client(&url).lookup(&pos).await.unwrap().unwrap();
    assert_eq!(mv.uci, "d1d7");

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /standard?fen=4k3%2F8%2F"), "{request}");
}

#[tokio::test]
async fn test_lookup_skips_crowded_boards() {
    // Nothing listens here; the piece count check answers first.
    let tablebase = client("http://127.0.0.1:9/standard");
    assert!(tablebase.lookup(&Position::startpos()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_lookup_without_moves() {
    let (url, _server) = serve_once("200 OK", r#"{"moves":[]}"#).await;
    let pos = Position::from_fen(KQK).unwrap();
    assert!(client(&url).lookup(&pos).await.unwrap().is_none());
}

#[tokio::test]
async fn test_lookup_rejects_illegal_moves() {
    let (url, _server) = serve_once("200 OK", r#"{"moves":[{"uci":"e2e4","wdl":-2}]}"#).await;
    let pos = Position::from_fen(KQK).unwrap();
    let err = client(&url).lookup(&pos).await.unwrap_err();
    assert!(matches!(err, TablebaseError::IllegalMove { .. }), "{err}");
}

#[tokio::test]
async fn test_lookup_reports_http_errors() {
    let (url, _server) = serve_once("500 Internal Server Error", "{}").await;
    let pos = Position::from_fen(KQK).unwrap();
    let err = client(&url).lookup(&pos).await.unwrap_err();
    assert!(matches!(err, TablebaseError::Request(_)), "{err}");
}
