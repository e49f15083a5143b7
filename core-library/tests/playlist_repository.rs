//! Playlist repository behaviour against an in-memory database.

use core_library::{
    create_test_pool, LibraryError, Playlist, PlaylistRepository, SqlitePlaylistRepository,
    SqliteTrackRepository, Track, TrackRepository,
};

struct Fixture {
    tracks: SqliteTrackRepository,
    playlists: SqlitePlaylistRepository,
}

async fn fixture() -> Fixture {
    let pool = create_test_pool().await.unwrap();
    Fixture {
        tracks: SqliteTrackRepository::new(pool.clone()),
        playlists: SqlitePlaylistRepository::new(pool),
    }
}

async fn upload(fixture: &Fixture, owner: &str, name: &str) -> Track {
    let track = Track::new(
        owner,
        name,
        format!("{}/processed/{}.mp3", owner, name),
        format!("{}/original/{}.mp3", owner, name),
    );
    fixture.tracks.insert(&track).await.unwrap();
    track
}

#[tokio::test]
async fn test_create_and_list_playlists() {
    let fx = fixture().await;
    let mut morning = Playlist::new("alice", "Morning");
    morning.created_at = 1;
    let mut evening = Playlist::new("alice", "Evening");
    evening.created_at = 2;
    fx.playlists.insert(&morning).await.unwrap();
    fx.playlists.insert(&evening).await.unwrap();
    fx.playlists
        .insert(&Playlist::new("bob", "Morning"))
        .await
        .unwrap();

    let names: Vec<String> = fx
        .playlists
        .query_by_owner("alice")
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Morning", "Evening"]);

    assert!(fx
        .playlists
        .find_for_owner(&morning.id, "bob")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_duplicate_name_is_rejected_per_owner() {
    let fx = fixture().await;
    fx.playlists
        .insert(&Playlist::new("alice", "Chill"))
        .await
        .unwrap();

    let err = fx
        .playlists
        .insert(&Playlist::new("alice", "  chill "))
        .await
        .unwrap_err();
    assert!(matches!(err, LibraryError::InvalidInput { .. }));
}

#[tokio::test]
async fn test_tracks_keep_insertion_order() {
    let fx = fixture().await;
    let playlist = Playlist::new("alice", "Mix");
    fx.playlists.insert(&playlist).await.unwrap();

    let a = upload(&fx, "alice", "a").await;
    let b = upload(&fx, "alice", "b").await;
    let c = upload(&fx, "alice", "c").await;

    assert_eq!(fx.playlists.add_track(&playlist.id, &b.id).await.unwrap(), 0);
    assert_eq!(fx.playlists.add_track(&playlist.id, &a.id).await.unwrap(), 1);
    assert_eq!(fx.playlists.add_track(&playlist.id, &c.id).await.unwrap(), 2);

    let order: Vec<String> = fx
        .playlists
        .get_tracks(&playlist.id)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(order, vec!["b", "a", "c"]);

    let stored = fx.playlists.find_by_id(&playlist.id).await.unwrap().unwrap();
    assert_eq!(stored.track_count, 3);
}

#[tokio::test]
async fn test_add_track_errors() {
    let fx = fixture().await;
    let playlist = Playlist::new("alice", "Mix");
    fx.playlists.insert(&playlist).await.unwrap();
    let song = upload(&fx, "alice", "song").await;

    let err = fx.playlists.add_track("missing", &song.id).await.unwrap_err();
    assert!(err.is_not_found());

    let err = fx
        .playlists
        .add_track(&playlist.id, "missing")
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    fx.playlists.add_track(&playlist.id, &song.id).await.unwrap();
    let err = fx
        .playlists
        .add_track(&playlist.id, &song.id)
        .await
        .unwrap_err();
    assert!(matches!(err, LibraryError::InvalidInput { .. }));
}

#[tokio::test]
async fn test_remove_track_closes_gap() {
    let fx = fixture().await;
    let playlist = Playlist::new("alice", "Mix");
    fx.playlists.insert(&playlist).await.unwrap();

    let mut ids = Vec::new();
    for name in ["a", "b", "c"] {
        let track = upload(&fx, "alice", name).await;
        fx.playlists.add_track(&playlist.id, &track.id).await.unwrap();
        ids.push(track.id);
    }

    assert!(fx.playlists.remove_track(&playlist.id, &ids[0]).await.unwrap());
    assert!(!fx.playlists.remove_track(&playlist.id, &ids[0]).await.unwrap());

    // Next append lands right after the remaining two.
    let d = upload(&fx, "alice", "d").await;
    assert_eq!(fx.playlists.add_track(&playlist.id, &d.id).await.unwrap(), 2);

    let order: Vec<String> = fx
        .playlists
        .get_tracks(&playlist.id)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(order, vec!["b", "c", "d"]);
}

#[tokio::test]
async fn test_deleting_track_removes_membership() {
    let fx = fixture().await;
    let playlist = Playlist::new("alice", "Mix");
    fx.playlists.insert(&playlist).await.unwrap();
    let song = upload(&fx, "alice", "song").await;
    fx.playlists.add_track(&playlist.id, &song.id).await.unwrap();

    assert!(fx.tracks.delete(&song.id, "alice").await.unwrap());
    assert!(fx.playlists.get_tracks(&playlist.id).await.unwrap().is_empty());
}
