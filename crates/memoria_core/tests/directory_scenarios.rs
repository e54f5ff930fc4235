//! End-to-end scenarios for the paste directory over a real redb store.

mod support;

use chrono::{Duration, Utc};
use memoria_core::models::paste::{CreatePasteRequest, Privacy, UpdatePasteRequest};
use memoria_core::{AppError, ErrorKind, RequestContext};
use serde_json::json;
use support::setup_test_directory;

fn create_request(value: serde_json::Value) -> CreatePasteRequest {
    serde_json::from_value(value).expect("create request")
}

fn update_request(value: serde_json::Value) -> UpdatePasteRequest {
    serde_json::from_value(value).expect("update request")
}

#[tokio::test]
async fn private_paste_is_reachable_only_through_its_token() {
    let (directory, _temp) = setup_test_directory();
    let ctx = RequestContext::background();

    let created = directory
        .create(
            &ctx,
            create_request(json!({
                "title": "deploy notes",
                "content": "kubectl rollout restart",
                "syntax_highlight": "bash",
                "privacy": "private"
            })),
        )
        .await
        .expect("create");
    let token = created.private_access_token.clone().expect("token");
    assert!(!token.is_empty());
    assert_eq!(created.privacy, Privacy::Private);

    let err = directory
        .get_by_id(&ctx, &created.id, None)
        .await
        .expect_err("hidden by id");
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let view = directory
        .get_by_access_token(&ctx, &token, None)
        .await
        .expect("by token");
    assert_eq!(view.content, "kubectl rollout restart");

    let listed = directory.list_public(&ctx).await.expect("list");
    assert!(listed.iter().all(|summary| summary.id != created.id));
}

#[tokio::test]
async fn password_gate_hides_whether_a_password_was_sent() {
    let (directory, _temp) = setup_test_directory();
    let ctx = RequestContext::background();

    let created = directory
        .create(
            &ctx,
            create_request(json!({
                "title": "creds",
                "content": "db=prod",
                "syntax_highlight": "ini",
                "privacy": "public",
                "password": "secret123"
            })),
        )
        .await
        .expect("create");

    let missing = directory
        .get_by_id(&ctx, &created.id, None)
        .await
        .expect_err("missing password");
    let wrong = directory
        .get_by_id(&ctx, &created.id, Some("nope"))
        .await
        .expect_err("wrong password");
    assert_eq!(missing.kind(), ErrorKind::Unauthorized);
    assert_eq!(wrong.kind(), ErrorKind::Unauthorized);
    assert_eq!(missing.to_string(), wrong.to_string());

    let view = directory
        .get_by_id(&ctx, &created.id, Some("secret123"))
        .await
        .expect("correct password");
    assert!(view.has_password);
    let body = serde_json::to_value(&view).expect("json");
    assert!(body.get("password_hash").is_none());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn expiry_outranks_privacy_and_password() {
    let (directory, _temp) = setup_test_directory();
    let ctx = RequestContext::background();

    let expired_at = Utc::now() - Duration::minutes(10);
    let created = directory
        .create(
            &ctx,
            create_request(json!({
                "title": "old",
                "content": "gone",
                "syntax_highlight": "text",
                "privacy": "password",
                "password": "secret123",
                "expires_at": expired_at
            })),
        )
        .await
        .expect("create");

    for password in [None, Some("wrong"), Some("secret123")] {
        let err = directory
            .get_by_id(&ctx, &created.id, password)
            .await
            .expect_err("expired");
        assert!(matches!(err, AppError::NotFound), "password {:?}", password);
    }
}

#[tokio::test]
async fn stale_update_is_rejected_and_fresh_one_applies() {
    let (directory, _temp) = setup_test_directory();
    let ctx = RequestContext::background();

    let created = directory
        .create(
            &ctx,
            create_request(json!({
                "title": "draft",
                "content": "v1",
                "syntax_highlight": "markdown",
                "privacy": "public"
            })),
        )
        .await
        .expect("create");

    let first = directory
        .update(
            &ctx,
            &created.id,
            update_request(json!({ "content": "v2", "expected_version": 1 })),
        )
        .await
        .expect("first writer");
    assert_eq!(first.version, 2);

    let err = directory
        .update(
            &ctx,
            &created.id,
            update_request(json!({ "content": "v2-other", "expected_version": 1 })),
        )
        .await
        .expect_err("second writer");
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let retried = directory
        .update(
            &ctx,
            &created.id,
            update_request(json!({ "content": "v3", "expected_version": 2 })),
        )
        .await
        .expect("retry on fresh version");
    assert_eq!(retried.content, "v3");
    assert_eq!(retried.version, 3);
}

#[tokio::test]
async fn explicit_null_expiry_clears_it_and_missing_field_keeps_it() {
    let (directory, _temp) = setup_test_directory();
    let ctx = RequestContext::background();

    let expires_at = Utc::now() + Duration::days(1);
    let created = directory
        .create(
            &ctx,
            create_request(json!({
                "title": "temp",
                "content": "short lived",
                "syntax_highlight": "text",
                "privacy": "public",
                "expires_at": expires_at
            })),
        )
        .await
        .expect("create");
    assert!(created.expires_at.is_some());

    let kept = directory
        .update(&ctx, &created.id, update_request(json!({ "title": "renamed" })))
        .await
        .expect("keep expiry");
    assert_eq!(kept.expires_at, created.expires_at);

    let cleared = directory
        .update(&ctx, &created.id, update_request(json!({ "expires_at": null })))
        .await
        .expect("clear expiry");
    assert!(cleared.expires_at.is_none());
}

#[tokio::test]
async fn token_is_stable_across_privacy_round_trip() {
    let (directory, _temp) = setup_test_directory();
    let ctx = RequestContext::background();

    let created = directory
        .create(
            &ctx,
            create_request(json!({
                "title": "shared",
                "content": "link only",
                "syntax_highlight": "text",
                "privacy": "private"
            })),
        )
        .await
        .expect("create");
    let token = created.private_access_token.clone().expect("token");

    directory
        .update_by_access_token(&ctx, &token, update_request(json!({ "privacy": "public" })))
        .await
        .expect("public");
    let back = directory
        .update(&ctx, &created.id, update_request(json!({ "privacy": "private" })))
        .await
        .expect("private again");
    assert_eq!(back.private_access_token, Some(token.clone()));

    let summaries = directory
        .summaries_by_access_tokens(&ctx, &[token])
        .await
        .expect("summaries");
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].id, created.id);
}

#[tokio::test]
async fn deleted_paste_is_gone_everywhere() {
    let (directory, _temp) = setup_test_directory();
    let ctx = RequestContext::background();

    let created = directory
        .create(
            &ctx,
            create_request(json!({
                "title": "scratch",
                "content": "tmp",
                "syntax_highlight": "text",
                "privacy": "public"
            })),
        )
        .await
        .expect("create");

    assert_eq!(
        directory.delete(&ctx, &created.id).await.expect("delete"),
        created.id
    );
    assert_eq!(
        directory
            .delete(&ctx, &created.id)
            .await
            .expect_err("second delete")
            .kind(),
        ErrorKind::NotFound
    );
    assert!(directory.list_public(&ctx).await.expect("list").is_empty());
}

#[tokio::test]
async fn edits_are_gated_like_reads() {
    let (directory, _temp) = setup_test_directory();
    let ctx = RequestContext::background();

    let private = directory
        .create(
            &ctx,
            create_request(json!({
                "title": "hidden",
                "content": "PRIVATE-BODY",
                "syntax_highlight": "text",
                "privacy": "private"
            })),
        )
        .await
        .expect("create private");
    let gated = directory
        .create(
            &ctx,
            create_request(json!({
                "title": "gated",
                "content": "GATED-BODY",
                "syntax_highlight": "text",
                "privacy": "public",
                "password": "secret123"
            })),
        )
        .await
        .expect("create gated");

    let err = directory
        .update(&ctx, &private.id, update_request(json!({})))
        .await
        .expect_err("private by id");
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = directory
        .update(&ctx, &gated.id, update_request(json!({})))
        .await
        .expect_err("gated without password");
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    let renamed = directory
        .update(
            &ctx,
            &gated.id,
            update_request(json!({ "title": "renamed", "current_password": "secret123" })),
        )
        .await
        .expect("gated with password");
    assert_eq!(renamed.title, "renamed");
    assert_eq!(renamed.content, "GATED-BODY");
}
