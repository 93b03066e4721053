//! Override budget endpoint integration tests.

mod common;

use common::TestHarness;
use covolt_core::{MonthKey, ReservationPolicy};

#[tokio::test]
async fn fresh_budget_reports_full_allowance() {
    let harness = TestHarness::new();
    let user = harness.add_member(50.0);

    let response = harness
        .server
        .get(&format!("/v1/groups/{}/quota", harness.group_id))
        .add_header("authorization", TestHarness::auth_header(user))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["overrides_used"], 0);
    assert_eq!(body["overrides_remaining"], 3);
    assert_eq!(body["max_overrides_per_month"], 3);

    let month = MonthKey::current();
    assert_eq!(body["month"], month.to_string());
    assert_eq!(body["next_reset"], month.next_reset().to_rfc3339());
}

#[tokio::test]
async fn budget_reflects_spent_overrides() {
    let harness = TestHarness::new();
    let minority = harness.add_member(30.0);
    let majority = harness.add_member(70.0);

    harness.create_booking(minority, 2, 8, 10).await;
    harness.create_booking(majority, 2, 9, 11).await;

    let body = harness
        .server
        .get(&format!("/v1/groups/{}/quota", harness.group_id))
        .add_header("authorization", TestHarness::auth_header(majority))
        .await
        .json::<serde_json::Value>();

    assert_eq!(body["overrides_used"], 1);
    assert_eq!(body["overrides_remaining"], 2);

    // The overridden member spent nothing.
    let body = harness
        .server
        .get(&format!("/v1/groups/{}/quota", harness.group_id))
        .add_header("authorization", TestHarness::auth_header(minority))
        .await
        .json::<serde_json::Value>();

    assert_eq!(body["overrides_used"], 0);
}

#[tokio::test]
async fn custom_policy_changes_the_allowance() {
    let harness = TestHarness::with_policy(ReservationPolicy {
        max_overrides_per_month: 5,
        max_booking_days_per_month: 3,
    });
    let user = harness.add_member(50.0);

    let body = harness
        .server
        .get(&format!("/v1/groups/{}/quota", harness.group_id))
        .add_header("authorization", TestHarness::auth_header(user))
        .await
        .json::<serde_json::Value>();

    assert_eq!(body["overrides_remaining"], 5);
    assert_eq!(body["max_overrides_per_month"], 5);
}

#[tokio::test]
async fn quota_requires_auth() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get(&format!("/v1/groups/{}/quota", harness.group_id))
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn malformed_group_id_is_bad_request() {
    let harness = TestHarness::new();
    let user = harness.add_member(50.0);

    let response = harness
        .server
        .get("/v1/groups/not-a-uuid/quota")
        .add_header("authorization", TestHarness::auth_header(user))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "bad_request");
}
