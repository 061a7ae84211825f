mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{error_code, spawn_with};

/// Overlapping requests racing for one room: exactly one wins, whatever the
/// interleaving. Runs against a file database so the pool really has several
/// connections.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_overlapping_bookings_admit_exactly_one() {
    let path = std::env::temp_dir().join(format!("innkeep-race-{}.db", uuid::Uuid::now_v7()));
    let url = format!("sqlite://{}", path.display());

    let app = Arc::new(
        spawn_with(|settings| {
            settings.database.url = url;
            settings.database.max_connections = 4;
        })
        .await,
    );
    let room = app.room("Contested", "100.00").await;

    let attempts: Vec<_> = (0..12)
        .map(|hour| {
            let app = app.clone();
            let room = room.clone();
            tokio::spawn(async move {
                let check_in = format!("2030-02-01T{hour:02}:00:00Z");
                let check_out = format!("2030-02-02T{hour:02}:00:00Z");
                app.book(&room, &check_in, &check_out).await
            })
        })
        .collect();

    let mut created = 0;
    for attempt in attempts {
        let (status, body) = attempt.await.unwrap();
        match status {
            StatusCode::CREATED => created += 1,
            StatusCode::UNPROCESSABLE_ENTITY => assert_eq!(error_code(&body), "room_unavailable"),
            other => panic!("unexpected {other}: {body}"),
        }
    }
    assert_eq!(created, 1);

    let (_, detail) = app.get(&format!("/api/rooms/{room}")).await;
    assert_eq!(detail["bookings"].as_array().unwrap().len(), 1);

    drop(app);
    let _ = std::fs::remove_file(&path);
}
