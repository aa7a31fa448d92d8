//! Integration tests for the SQLite store.

use parlor_store::{Store, StoreError};

async fn scratch_store() -> (Store, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Store::open(dir.path().join("games.db"))
        .await
        .expect("open store");
    (store, dir)
}

#[tokio::test]
async fn test_create_and_get_session() {
    let (store, _dir) = scratch_store().await;

    store.create_session("a1b2c3", "tictactoe").await.unwrap();
    let row = store.get_session("a1b2c3").await.unwrap();

    assert_eq!(row.code, "a1b2c3");
    assert_eq!(row.game_type, "tictactoe");
    assert_eq!(row.status, "waiting");
}

#[tokio::test]
async fn test_duplicate_code_is_a_conflict() {
    let (store, _dir) = scratch_store().await;

    store.create_session("a1b2c3", "tictactoe").await.unwrap();
    let err = store.create_session("a1b2c3", "tictactoe").await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict));
}

#[tokio::test]
async fn test_get_unknown_session_is_not_found() {
    let (store, _dir) = scratch_store().await;
    let err = store.get_session("ffffff").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound));
}

#[tokio::test]
async fn test_update_status_and_list_filter() {
    let (store, _dir) = scratch_store().await;

    store.create_session("aaaaaa", "tictactoe").await.unwrap();
    store.create_session("bbbbbb", "tictactoe").await.unwrap();
    store.update_session_status("aaaaaa", "playing").await.unwrap();

    let all = store.list_sessions(None).await.unwrap();
    assert_eq!(all.len(), 2);

    let playing = store.list_sessions(Some("playing")).await.unwrap();
    assert_eq!(playing.len(), 1);
    assert_eq!(playing[0].code, "aaaaaa");
}

#[tokio::test]
async fn test_match_state_upsert_round_trip() {
    let (store, _dir) = scratch_store().await;
    store.create_session("aaaaaa", "tictactoe").await.unwrap();

    store.save_match_state("aaaaaa", b"first").await.unwrap();
    store.save_match_state("aaaaaa", b"second").await.unwrap();

    let bytes = store.get_match_state("aaaaaa").await.unwrap();
    assert_eq!(bytes, b"second");
}

#[tokio::test]
async fn test_match_state_missing_is_not_found() {
    let (store, _dir) = scratch_store().await;
    store.create_session("aaaaaa", "tictactoe").await.unwrap();

    let err = store.get_match_state("aaaaaa").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound));
}

#[tokio::test]
async fn test_roster_round_trip() {
    let (store, _dir) = scratch_store().await;
    store.create_session("aaaaaa", "tictactoe").await.unwrap();

    store
        .save_roster("aaaaaa", r#"{"players":["alice"],"hostId":"alice"}"#)
        .await
        .unwrap();
    store
        .save_roster("aaaaaa", r#"{"players":["alice","bob"],"hostId":"alice"}"#)
        .await
        .unwrap();

    let roster = store.get_roster("aaaaaa").await.unwrap();
    assert!(roster.contains("bob"));
}

#[tokio::test]
async fn test_delete_session_is_idempotent() {
    let (store, _dir) = scratch_store().await;

    store.create_session("aaaaaa", "tictactoe").await.unwrap();
    store.save_match_state("aaaaaa", b"snapshot").await.unwrap();
    store
        .save_roster("aaaaaa", r#"{"players":[],"hostId":null}"#)
        .await
        .unwrap();

    store.delete_session("aaaaaa").await.unwrap();
    assert!(matches!(
        store.get_session("aaaaaa").await.unwrap_err(),
        StoreError::NotFound
    ));
    assert!(matches!(
        store.get_match_state("aaaaaa").await.unwrap_err(),
        StoreError::NotFound
    ));

    // A second delete of the same (now absent) session succeeds.
    store.delete_session("aaaaaa").await.unwrap();
}

#[tokio::test]
async fn test_rows_survive_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("games.db");

    {
        let store = Store::open(&path).await.unwrap();
        store.create_session("aaaaaa", "tictactoe").await.unwrap();
        store.save_match_state("aaaaaa", b"snapshot").await.unwrap();
    }

    let store = Store::open(&path).await.unwrap();
    let row = store.get_session("aaaaaa").await.unwrap();
    assert_eq!(row.game_type, "tictactoe");
    assert_eq!(store.get_match_state("aaaaaa").await.unwrap(), b"snapshot");
}
