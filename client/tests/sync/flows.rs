//! Fetch, gating, dedup, and derived-state flows.

use jiff::ToSpan;
use payloads::{CourseId, WorkoutId};
use reqwest::StatusCode;

use crate::support::spawn_app;

#[tokio::test]
async fn repeated_catalog_loads_dedup_within_window() {
    let app = spawn_app();

    app.client.load_catalog().await;
    app.client.load_catalog().await;
    assert_eq!(app.api.call_count("courses"), 1);

    // Outside the window the next read revalidates
    app.time.advance(61.seconds());
    app.client.load_catalog().await;
    assert_eq!(app.api.call_count("courses"), 2);
}

#[tokio::test]
async fn distinct_progress_keys_fetch_independently() {
    let app = spawn_app();
    app.login();

    app.client.load_course_progress(&CourseId::from("c1")).await;
    app.client.load_course_progress(&CourseId::from("c2")).await;
    app.client.load_course_progress(&CourseId::from("c1")).await;
    assert_eq!(app.api.call_count("course_progress"), 2);
}

#[tokio::test]
async fn guest_never_fetches_gated_resources() {
    let app = spawn_app();

    let progress =
        app.client.load_course_progress(&CourseId::from("c1")).await;
    assert_eq!(progress.data, None);
    assert_eq!(progress.error, None);
    assert!(!progress.is_loading);

    let user = app.client.load_current_user().await;
    assert_eq!(user.data, None);
    assert_eq!(user.error, None);
    assert!(!user.is_loading);

    assert_eq!(app.api.call_count("course_progress"), 0);
    assert_eq!(app.api.call_count("current_user"), 0);
}

#[tokio::test]
async fn workouts_wait_for_the_course_to_resolve() {
    let app = spawn_app();
    let c1 = CourseId::from("c1");

    // Dependent key is inactive before the course is cached
    let early = app.client.load_course_workouts(&c1).await;
    assert_eq!(early.data, None);
    assert!(!early.is_loading);
    assert_eq!(app.api.call_count("course_workouts"), 0);

    app.client.load_course(&c1).await;
    let workouts = app.client.load_course_workouts(&c1).await;
    assert_eq!(workouts.data.map(|w| w.len()), Some(2));
    assert_eq!(app.api.call_count("course_workouts"), 1);
}

#[tokio::test]
async fn course_detail_combines_course_workouts_and_progress() {
    let app = spawn_app();
    app.login();
    app.client.load_current_user().await;

    let detail = app.client.load_course_detail(&CourseId::from("c1")).await;

    assert_eq!(detail.stats.completed, 1);
    assert_eq!(detail.stats.total, 2);
    assert_eq!(detail.stats.percent, 50);
    assert_eq!(detail.next_workout, Some(WorkoutId::from("w2")));
    assert!(detail.is_enrolled);
    assert!(detail.progress.is_some());
}

#[tokio::test]
async fn untouched_course_reads_as_zero_progress() {
    let app = spawn_app();
    app.login();
    app.client.load_current_user().await;

    let detail = app.client.load_course_detail(&CourseId::from("c2")).await;

    assert_eq!(detail.stats.completed, 0);
    assert_eq!(detail.stats.total, 1);
    assert_eq!(detail.stats.percent, 0);
    assert_eq!(detail.next_workout, Some(WorkoutId::from("w3")));
    assert!(!detail.is_enrolled);
    // Fetched-but-absent progress, not an error
    assert!(detail.progress.is_none());
    assert!(detail.course.error.is_none());
}

#[tokio::test]
async fn missing_course_surfaces_a_blocking_error() {
    let app = spawn_app();

    let course = app.client.load_course(&CourseId::from("nope")).await;
    assert!(course.data.is_none());
    assert!(course.error.is_some());
    assert!(!course.is_loading);
}

#[tokio::test]
async fn progress_failure_degrades_without_blocking_the_page() {
    let app = spawn_app();
    app.login();
    app.api
        .fail_endpoint("course_progress", StatusCode::INTERNAL_SERVER_ERROR);

    let detail = app.client.load_course_detail(&CourseId::from("c1")).await;

    // The page still renders from the critical resources
    assert!(detail.course.data.is_some());
    assert_eq!(detail.workouts.len(), 2);
    assert!(detail.progress.is_none());
    assert_eq!(detail.stats.completed, 0);

    // The degraded record is cached as absent; recovery comes with the
    // next revalidation
    app.api.clear_failures();
    app.time.advance(31.seconds());
    let detail = app.client.load_course_detail(&CourseId::from("c1")).await;
    assert!(detail.progress.is_some());
}

#[tokio::test]
async fn workout_detail_carries_course_scoped_progress() {
    let app = spawn_app();
    app.login();

    let detail = app
        .client
        .load_workout_detail(
            Some(&CourseId::from("c1")),
            &WorkoutId::from("w1"),
        )
        .await;
    assert!(detail.workout.data.is_some());
    assert!(detail.is_completed);

    // Without a course scope the progress record is unreachable
    let detail = app
        .client
        .load_workout_detail(None, &WorkoutId::from("w1"))
        .await;
    assert!(detail.workout.data.is_some());
    assert!(detail.progress.is_none());
    assert!(!detail.is_completed);
}

#[tokio::test]
async fn enrolled_progress_skips_failing_courses() {
    let app = spawn_app();
    app.login();
    app.client.load_current_user().await;

    // c1 is enrolled and has progress; a second enrollment with failing
    // progress must not take the rest down
    app.client.enroll(&CourseId::from("c2")).await.unwrap();
    app.client.load_current_user().await;
    app.api
        .fail_endpoint("course_progress", StatusCode::BAD_GATEWAY);

    let progress = app.client.load_enrolled_progress().await;
    assert!(progress.is_empty());

    app.api.clear_failures();
    app.time.advance(31.seconds());
    let progress = app.client.load_enrolled_progress().await;
    // Only c1 has a record; c2 is fetched-absent
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0].course_id, CourseId::from("c1"));
}

#[tokio::test]
async fn logout_cleanup_drops_user_scoped_cache_only() {
    let app = spawn_app();
    app.login();
    app.client.load_catalog().await;
    app.client.load_current_user().await;
    app.client.load_course_progress(&CourseId::from("c1")).await;

    app.tokens.clear();
    app.client.logout_cleanup();

    // Gated keys read as inactive again; the public catalog survives
    let user = app.client.current_user();
    assert_eq!(user.data, None);
    assert!(!user.is_loading);
    let progress = app.client.course_progress(&CourseId::from("c1"));
    assert_eq!(progress.data, None);
    assert!(app.client.catalog().data.is_some());
}

#[tokio::test]
async fn next_workout_reads_are_idempotent() {
    let app = spawn_app();
    app.login();
    app.client.load_course_detail(&CourseId::from("c1")).await;

    let first = app.client.next_workout(&CourseId::from("c1"));
    let second = app.client.next_workout(&CourseId::from("c1"));
    assert_eq!(first, second);
    assert_eq!(first, Some(WorkoutId::from("w2")));
}
