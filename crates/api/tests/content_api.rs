//! HTTP-level tests for creator onboarding, ownership-gated series and
//! episode mutations, and the public catalog.

mod common;

use axum::http::StatusCode;
use chrono::Duration;
use common::{
    body_json, delete_auth, get, get_auth, patch_json_auth, post_json_auth, put_json_auth, TestApp,
};
use serde_json::json;
use streamshort_core::clock::Clock;
use streamshort_db::models::analytics::CreatorAnalytics;
use uuid::Uuid;

const OWNER: &str = "+15550001111";
const STRANGER: &str = "+15550002222";

async fn add_episode(
    app: &TestApp,
    token: &str,
    series_id: &str,
    number: i32,
) -> axum::response::Response {
    post_json_auth(
        app.app(),
        &format!("/api/content/series/{series_id}/episodes"),
        json!({
            "title": format!("Episode {number}"),
            "episode_number": number,
            "duration_seconds": 90,
        }),
        token,
    )
    .await
}

async fn episode_id(app: &TestApp, token: &str, series_id: &str, number: i32) -> String {
    let response = add_episode(app, token, series_id, number).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// Creator profile
// ---------------------------------------------------------------------------

#[tokio::test]
async fn onboarding_is_once_per_user() {
    let app = TestApp::new();
    let (token, creator_id) = app.creator(OWNER).await;

    let response = get_auth(app.app(), "/api/creators/profile", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let profile = body_json(response).await;
    assert_eq!(profile["id"], creator_id.as_str());
    assert_eq!(profile["kyc_status"], "pending");

    let response = post_json_auth(
        app.app(),
        "/api/creators/onboard",
        json!({ "display_name": "Again", "kyc_document_s3_path": "s3://kyc/2" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn onboarding_grants_creator_role_to_new_tokens() {
    let app = TestApp::new();
    let (token, _) = app.creator(OWNER).await;

    // The old token keeps the role it was issued with.
    let response = get_auth(app.app(), "/api/profile", &token).await;
    assert_eq!(body_json(response).await["role"], "user");

    let fresh = app.access_token(OWNER).await;
    let response = get_auth(app.app(), "/api/profile", &fresh).await;
    assert_eq!(body_json(response).await["role"], "creator");
}

#[tokio::test]
async fn onboarding_requires_name_and_kyc_document() {
    let app = TestApp::new();
    let token = app.access_token(OWNER).await;

    let response = post_json_auth(
        app.app(),
        "/api/creators/onboard",
        json!({ "display_name": "Name only" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "kyc_document_s3_path is required"
    );
}

#[tokio::test]
async fn new_kyc_document_resets_review() {
    let app = TestApp::new();
    let (token, _) = app.creator(OWNER).await;

    let response = put_json_auth(
        app.app(),
        "/api/creators/profile",
        json!({ "bio": "Short films" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["bio"], "Short films");
    assert_eq!(json["kyc_status"], "pending");

    let response = put_json_auth(
        app.app(),
        "/api/creators/profile",
        json!({ "kyc_document_s3_path": "s3://kyc/new.pdf" }),
        &token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["kyc_document_s3_path"], "s3://kyc/new.pdf");
    assert_eq!(json["kyc_status"], "pending");
}

#[tokio::test]
async fn profile_of_non_creator_is_not_found() {
    let app = TestApp::new();
    let token = app.access_token(OWNER).await;
    let response = get_auth(app.app(), "/api/creators/profile", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn creator_content_lists_drafts_and_unpublished_episodes() {
    let app = TestApp::new();
    let (token, _) = app.creator(OWNER).await;
    let (stranger, _) = app.creator(STRANGER).await;
    let older = app.series(&token, "Older").await;
    let newer = app.series(&token, "Newer").await;
    app.series(&stranger, "Not mine").await;
    episode_id(&app, &token, &older, 2).await;
    episode_id(&app, &token, &older, 1).await;

    let response = get_auth(app.app(), "/api/creators/content", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 2);
    let series = json["series"].as_array().unwrap();
    assert_eq!(series[0]["id"], newer.as_str());
    assert_eq!(series[1]["id"], older.as_str());
    assert_eq!(series[1]["status"], "draft");
    assert_eq!(series[1]["episode_count"], 2);
    assert_eq!(series[1]["episodes"][0]["episode_number"], 1);
    assert_eq!(series[1]["episodes"][0]["status"], "pending_upload");
    assert_eq!(series[0]["episode_count"], 0);
}

#[tokio::test]
async fn creator_content_requires_onboarding() {
    let app = TestApp::new();
    let token = app.access_token(OWNER).await;
    let response = get_auth(app.app(), "/api/creators/content", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(response).await["error"],
        "User must be onboarded as a creator first"
    );
}

#[tokio::test]
async fn malformed_path_and_query_are_validation_errors() {
    let app = TestApp::new();
    let (token, _) = app.creator(OWNER).await;

    let response = get(app.app(), "/content/series/not-a-uuid").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"].as_str().unwrap().starts_with("Invalid path parameter"));

    let response = get_auth(app.app(), "/api/creators/42/dashboard", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = get(app.app(), "/content/series?page=first").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"].as_str().unwrap().starts_with("Invalid query string"));
}

#[tokio::test]
async fn dashboard_sums_last_thirty_days_for_owner_only() {
    let app = TestApp::new();
    let (token, creator_id) = app.creator(OWNER).await;
    let (stranger, _) = app.creator(STRANGER).await;

    let id: Uuid = creator_id.parse().unwrap();
    let today = app.clock.now().date_naive();
    for (days_ago, views) in [(0, 10), (29, 5), (45, 1000)] {
        app.store.insert_analytics(CreatorAnalytics {
            creator_id: id,
            day: today - Duration::days(days_ago),
            views,
            watch_time_seconds: views * 60,
            earnings: views as f64 * 0.5,
        });
    }

    let uri = format!("/api/creators/{creator_id}/dashboard");
    let response = get_auth(app.app(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["views"], 15);
    assert_eq!(json["watch_time_seconds"], 900);
    assert_eq!(json["earnings"], 7.5);

    let foreign = get_auth(app.app(), &uri, &stranger).await;
    let missing = get_auth(
        app.app(),
        &format!("/api/creators/{}/dashboard", Uuid::new_v4()),
        &stranger,
    )
    .await;
    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(foreign).await, body_json(missing).await);
}

// ---------------------------------------------------------------------------
// Series ownership
// ---------------------------------------------------------------------------

#[tokio::test]
async fn series_requires_onboarded_creator() {
    let app = TestApp::new();
    let token = app.access_token(OWNER).await;

    let response = post_json_auth(
        app.app(),
        "/api/content/series",
        json!({ "title": "T", "synopsis": "S", "language": "en" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn new_series_starts_as_free_draft() {
    let app = TestApp::new();
    let (token, creator_id) = app.creator(OWNER).await;

    let response = post_json_auth(
        app.app(),
        "/api/content/series",
        json!({
            "title": "Night Shift",
            "synopsis": "S",
            "language": "en",
            "creator_id": Uuid::new_v4(),
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["status"], "draft");
    assert_eq!(json["price_type"], "free");
    assert_eq!(json["creator_id"], creator_id.as_str());
    assert!(json["published_at"].is_null());
}

#[tokio::test]
async fn foreign_series_update_looks_like_missing_series() {
    let app = TestApp::new();
    let (owner, _) = app.creator(OWNER).await;
    let (stranger, _) = app.creator(STRANGER).await;
    let series_id = app.series(&owner, "Mine").await;

    let foreign = put_json_auth(
        app.app(),
        &format!("/api/content/series/{series_id}"),
        json!({ "title": "Stolen" }),
        &stranger,
    )
    .await;
    let missing = put_json_auth(
        app.app(),
        &format!("/api/content/series/{}", Uuid::new_v4()),
        json!({ "title": "Stolen" }),
        &stranger,
    )
    .await;

    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let foreign = body_json(foreign).await;
    assert_eq!(foreign["error"], "Series not found or access denied");
    assert_eq!(foreign, body_json(missing).await);

    let response = put_json_auth(
        app.app(),
        &format!("/api/content/series/{series_id}"),
        json!({ "title": "Renamed" }),
        &owner,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["title"], "Renamed");
}

#[tokio::test]
async fn series_status_allow_list_and_published_at() {
    let app = TestApp::new();
    let (token, _) = app.creator(OWNER).await;
    let series_id = app.series(&token, "Mine").await;
    let uri = format!("/api/content/series/{series_id}/status");

    let response = patch_json_auth(app.app(), &uri, json!({ "status": "archived" }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = patch_json_auth(app.app(), &uri, json!({ "status": "Publish" }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "published");
    let published_at = json["published_at"].clone();
    assert!(published_at.is_string());

    let response = patch_json_auth(app.app(), &uri, json!({ "status": "draft" }), &token).await;
    let json = body_json(response).await;
    assert_eq!(json["status"], "draft");
    assert_eq!(json["published_at"], published_at);
}

#[tokio::test]
async fn series_update_validates_status_field() {
    let app = TestApp::new();
    let (token, _) = app.creator(OWNER).await;
    let series_id = app.series(&token, "Mine").await;

    let response = put_json_auth(
        app.app(),
        &format!("/api/content/series/{series_id}"),
        json!({ "status": "deleted" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json_auth(
        app.app(),
        &format!("/api/content/series/{series_id}"),
        json!({ "status": "published", "price_type": "subscription", "price_amount": 4.99 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "published");
    assert_eq!(json["price_type"], "subscription");
}

// ---------------------------------------------------------------------------
// Episodes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_episode_number_conflicts_within_series_only() {
    let app = TestApp::new();
    let (token, _) = app.creator(OWNER).await;
    let first = app.series(&token, "First").await;
    let second = app.series(&token, "Second").await;

    assert_eq!(add_episode(&app, &token, &first, 1).await.status(), StatusCode::CREATED);

    let response = add_episode(&app, &token, &first, 1).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await["error"],
        "Episode number already exists for this series"
    );

    assert_eq!(add_episode(&app, &token, &second, 1).await.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn episode_input_validated() {
    let app = TestApp::new();
    let (token, _) = app.creator(OWNER).await;
    let series_id = app.series(&token, "Mine").await;

    for body in [
        json!({ "title": "", "episode_number": 1, "duration_seconds": 10 }),
        json!({ "title": "T", "episode_number": 0, "duration_seconds": 10 }),
        json!({ "title": "T", "episode_number": 1, "duration_seconds": -5 }),
    ] {
        let response = post_json_auth(
            app.app(),
            &format!("/api/content/series/{series_id}/episodes"),
            body,
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn episode_update_checks_number_against_siblings() {
    let app = TestApp::new();
    let (token, _) = app.creator(OWNER).await;
    let series_id = app.series(&token, "Mine").await;
    let one = episode_id(&app, &token, &series_id, 1).await;
    episode_id(&app, &token, &series_id, 2).await;
    let uri = format!("/api/episodes/{one}");

    let response = put_json_auth(app.app(), &uri, json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No fields to update");

    // Keeping its own number is fine.
    let response = put_json_auth(
        app.app(),
        &uri,
        json!({ "episode_number": 1, "title": "Pilot" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["title"], "Pilot");

    let response = put_json_auth(app.app(), &uri, json!({ "episode_number": 2 }), &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn foreign_episode_mutations_look_like_missing_episode() {
    let app = TestApp::new();
    let (owner, _) = app.creator(OWNER).await;
    let (stranger, _) = app.creator(STRANGER).await;
    let series_id = app.series(&owner, "Mine").await;
    let episode = episode_id(&app, &owner, &series_id, 1).await;

    let foreign = delete_auth(app.app(), &format!("/api/episodes/{episode}"), &stranger).await;
    let missing = delete_auth(
        app.app(),
        &format!("/api/episodes/{}", Uuid::new_v4()),
        &stranger,
    )
    .await;
    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);
    let foreign = body_json(foreign).await;
    assert_eq!(foreign["error"], "Episode not found or access denied");
    assert_eq!(foreign, body_json(missing).await);

    let response = patch_json_auth(
        app.app(),
        &format!("/api/episodes/{episode}/status"),
        json!({ "status": "ready" }),
        &stranger,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Adding to someone else's series is also denied.
    let response = add_episode(&app, &stranger, &series_id, 2).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleted_episode_frees_its_number() {
    let app = TestApp::new();
    let (token, _) = app.creator(OWNER).await;
    let series_id = app.series(&token, "Mine").await;
    let episode = episode_id(&app, &token, &series_id, 1).await;

    let response = delete_auth(app.app(), &format!("/api/episodes/{episode}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete_auth(app.app(), &format!("/api/episodes/{episode}"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert_eq!(add_episode(&app, &token, &series_id, 1).await.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn episode_status_allow_list() {
    let app = TestApp::new();
    let (token, _) = app.creator(OWNER).await;
    let series_id = app.series(&token, "Mine").await;
    let episode = episode_id(&app, &token, &series_id, 1).await;
    let uri = format!("/api/episodes/{episode}/status");

    let response = patch_json_auth(app.app(), &uri, json!({ "status": "draft" }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    for status in ["queued_transcode", "READY", "publish"] {
        let response = patch_json_auth(app.app(), &uri, json!({ "status": status }), &token).await;
        assert_eq!(response.status(), StatusCode::OK, "status: {status}");
    }
    let response = patch_json_auth(app.app(), &uri, json!({ "status": "ready" }), &token).await;
    let json = body_json(response).await;
    assert_eq!(json["status"], "ready");
    assert!(json["published_at"].is_string());
}

// ---------------------------------------------------------------------------
// Public catalog
// ---------------------------------------------------------------------------

#[tokio::test]
async fn catalog_shows_only_published_content() {
    let app = TestApp::new();
    let (token, _) = app.creator(OWNER).await;
    let published = app.series(&token, "Live").await;
    let draft = app.series(&token, "Hidden").await;

    patch_json_auth(
        app.app(),
        &format!("/api/content/series/{published}/status"),
        json!({ "status": "published" }),
        &token,
    )
    .await;
    let live_episode = episode_id(&app, &token, &published, 1).await;
    episode_id(&app, &token, &published, 2).await;
    patch_json_auth(
        app.app(),
        &format!("/api/episodes/{live_episode}/status"),
        json!({ "status": "published" }),
        &token,
    )
    .await;

    let response = get(app.app(), "/content/series").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["items"][0]["id"], published.as_str());

    let response = get(app.app(), "/content/series?category=drama&language=en&per_page=500").await;
    let json = body_json(response).await;
    assert_eq!(json["per_page"], 100);
    assert_eq!(json["total"], 1);

    let response = get(app.app(), "/content/series?category=comedy").await;
    assert_eq!(body_json(response).await["total"], 0);

    let response = get(app.app(), &format!("/content/series/{published}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["title"], "Live");
    assert_eq!(json["episodes"].as_array().unwrap().len(), 1);

    let response = get(app.app(), &format!("/content/series/{published}/episodes")).await;
    let json = body_json(response).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["episodes"][0]["id"], live_episode.as_str());

    let response = get(app.app(), &format!("/content/series/{draft}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
