use httpmock::prelude::*;
use roundkeeper::domain::model::NavigationMarker;
use roundkeeper::domain::ports::MarkerStore;
use roundkeeper::{
    FileMarkerStore, HoleCount, HoleEdit, HttpCourseCatalog, HttpRoundStore, Round, RoundSession,
    SchedulerConfig,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn fast_scheduler() -> SchedulerConfig {
    SchedulerConfig {
        debounce: Duration::from_millis(20),
        retry_delays: vec![Duration::from_millis(20)],
    }
}

fn mock_remote(server: &MockServer, round_id: &str) {
    server.mock(|when, then| {
        when.method(GET).path("/courses/pebble/holes");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([]));
    });
    server.mock(|when, then| {
        when.method(GET).path(format!("/rounds/{}/holes", round_id));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([]));
    });
    server.mock(|when, then| {
        when.method(PUT).path_contains(format!("/rounds/{}/", round_id));
        then.status(200);
    });
}

fn make_session(
    server: &MockServer,
    marker_dir: &TempDir,
    round_id: &str,
) -> RoundSession<HttpRoundStore, HttpCourseCatalog, FileMarkerStore> {
    let round = Round::new(round_id, "pebble", None, HoleCount::Eighteen);
    let store = Arc::new(HttpRoundStore::new(server.base_url()));
    let catalog = HttpCourseCatalog::new(server.base_url());
    let markers = FileMarkerStore::new(marker_dir.path().to_str().unwrap());
    RoundSession::new(round, store, catalog, markers, fast_scheduler())
}

async fn plant_marker(marker_dir: &TempDir, round_id: &str, hole: u8) {
    let store = FileMarkerStore::new(marker_dir.path().to_str().unwrap());
    let marker = NavigationMarker {
        round_id: round_id.to_string(),
        hole,
    };
    store
        .set(
            &format!("round/{}/marker", round_id),
            &serde_json::to_string(&marker).unwrap(),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_explicit_hole_always_beats_marker() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    mock_remote(&server, "r1");
    plant_marker(&temp_dir, "r1", 14).await;

    let mut session = make_session(&server, &temp_dir, "r1");
    // deep link 指定第 2 洞,標記寫著 14 也不理
    let hole = session.resume(Some(2)).await.unwrap();
    assert_eq!(hole, 2);
    assert_eq!(session.current_hole(), 2);
}

#[tokio::test]
async fn test_marker_restores_interrupted_round() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    mock_remote(&server, "r1");
    plant_marker(&temp_dir, "r1", 14).await;

    let mut session = make_session(&server, &temp_dir, "r1");
    assert_eq!(session.resume(None).await.unwrap(), 14);
}

#[tokio::test]
async fn test_round_with_no_marker_starts_at_hole_one() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    mock_remote(&server, "r1");

    let mut session = make_session(&server, &temp_dir, "r1");
    assert_eq!(session.resume(None).await.unwrap(), 1);
}

#[tokio::test]
async fn test_marker_survives_session_restart() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    mock_remote(&server, "r1");

    {
        let mut session = make_session(&server, &temp_dir, "r1");
        session.resume(None).await.unwrap();
        session.edit_hole(HoleEdit::Score("4".into())).await.unwrap();
        session.go_next().await.unwrap();
        session.go_next().await.unwrap();
        assert_eq!(session.current_hole(), 3);
        // session 直接丟掉,模擬 App 被殺
    }
    tokio::time::sleep(Duration::from_millis(150)).await;

    let mut session = make_session(&server, &temp_dir, "r1");
    assert_eq!(session.resume(None).await.unwrap(), 3);
}

#[tokio::test]
async fn test_finish_clears_marker_so_next_resume_starts_fresh() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    mock_remote(&server, "r1");
    plant_marker(&temp_dir, "r1", 9).await;

    let mut session = make_session(&server, &temp_dir, "r1");
    session.resume(None).await.unwrap();
    session.finish_round().await.unwrap();

    let markers = FileMarkerStore::new(temp_dir.path().to_str().unwrap());
    assert_eq!(markers.get("round/r1/marker").await.unwrap(), None);
}

#[tokio::test]
async fn test_marker_for_other_round_is_ignored() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    mock_remote(&server, "r1");
    // 同一個 key 位置塞別場球的標記
    let store = FileMarkerStore::new(temp_dir.path().to_str().unwrap());
    let foreign = NavigationMarker {
        round_id: "other-round".to_string(),
        hole: 11,
    };
    store
        .set("round/r1/marker", &serde_json::to_string(&foreign).unwrap())
        .await
        .unwrap();

    let mut session = make_session(&server, &temp_dir, "r1");
    assert_eq!(session.resume(None).await.unwrap(), 1);
}
