use chrono::Utc;
use sqlx::PgPool;

use storyreel::projects::{NewProject, PgProjectStore, ProjectStatus, ProjectStore, Scene};
use storyreel::quota::{GenerationKind, PgQuotaStore, QuotaStore, Subscription};

#[sqlx::test]
#[ignore = "requires DATABASE_URL with Postgres server"]
async fn seeded_plans_resolve_with_their_limits(pool: PgPool) {
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    let store = PgQuotaStore::new(pool);
    let trial = store.plan("trial").await.unwrap().unwrap();
    assert_eq!(trial.video_generations_per_month, 2);
    assert_eq!(trial.comic_generations_per_month, 5);

    assert!(store.plan("no-such-plan").await.unwrap().is_none());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL with Postgres server"]
async fn subscription_roundtrip_and_counter_update(pool: PgPool) {
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    let store = PgQuotaStore::new(pool);
    let now = Utc::now();
    let subscription = Subscription::trial(42, "trial", now);
    let created = store.create_subscription(&subscription).await.unwrap();
    assert_eq!(created.user_id, 42);
    assert_eq!(created.video_generations_used, 0);

    let mut next = created;
    GenerationKind::Video.record_use(&mut next);
    let updated = store.update_subscription(&next).await.unwrap();
    assert_eq!(updated.video_generations_used, 1);
    assert_eq!(updated.comic_generations_used, 0);

    let fetched = store.subscription_for_user(42).await.unwrap().unwrap();
    assert_eq!(fetched.video_generations_used, 1);
    assert!(store.subscription_for_user(43).await.unwrap().is_none());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL with Postgres server"]
async fn project_roundtrip_preserves_scene_order(pool: PgPool) {
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    let store = PgProjectStore::new(pool);
    let scenes: Vec<Scene> = (1..=3)
        .map(|n| Scene {
            scene_number: n,
            image_url: format!("https://cdn/img-{n}.png"),
            narrator_text: format!("narration {n}"),
            dialogue: String::new(),
            sound_effect: "rain".into(),
            camera_angle: "close".into(),
            transition: "fade".into(),
            emotional_beat: "tense".into(),
            narration_audio_url: Some(format!("https://cdn/a-{n}.mp3")),
            dialogue_audio_url: None,
        })
        .collect();

    let created = store
        .create(&NewProject {
            user_id: 42,
            kind: GenerationKind::Comic,
            title: "Panels".into(),
            synopsis: "A heist.".into(),
            cover_image_url: "https://cdn/cover.png".into(),
            status: ProjectStatus::Completed,
            scenes: scenes.clone(),
        })
        .await
        .unwrap();
    assert_eq!(created.status, ProjectStatus::Completed);
    assert_eq!(created.scenes, scenes);

    let fetched = store.get(created.id, 42).await.unwrap().unwrap();
    assert_eq!(fetched.scenes, scenes);

    // Owner scoping: another user cannot see the project.
    assert!(store.get(created.id, 7).await.unwrap().is_none());

    let listed = store.list_for_user(42).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);
}
