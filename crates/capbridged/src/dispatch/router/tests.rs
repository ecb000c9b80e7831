//! Tests for method routing over the fixture capture.

use capbridge_wire::{ErrorObject, Request};
use rstest::{fixture, rstest};
use serde_json::{Map, Value, json};

use super::Router;
use crate::provider::snapshot::test_support::fixture_provider;
use crate::provider::{ReplayQueue, SnapshotProvider};

#[fixture]
fn router() -> Router {
    let queue = ReplayQueue::spawn(fixture_provider()).expect("spawn replay worker");
    Router::new(queue)
}

fn params(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

fn call(router: &Router, method: &str, value: Value) -> Result<Value, ErrorObject> {
    router
        .dispatch(Request::new("1", method, params(value)))
        .into_result()
}

fn event_ids(actions: &Value) -> Vec<u64> {
    actions
        .as_array()
        .expect("action array")
        .iter()
        .filter_map(|action| action["event_id"].as_u64())
        .collect()
}

#[rstest]
fn ping_answers_pong(router: Router) {
    let result = call(&router, "ping", json!({})).expect("ping");
    assert_eq!(result, json!({"status": "ok", "message": "pong"}));
}

#[rstest]
fn responses_echo_the_request_id(router: Router) {
    let response = router.dispatch(Request::new("req-42", "ping", Map::new()));
    assert_eq!(response.id.as_deref(), Some("req-42"));
}

#[rstest]
fn unknown_methods_are_rejected(router: Router) {
    let error = call(&router, "bogus", json!({})).expect_err("unknown method");
    assert_eq!(error.code, -32601);
    assert_eq!(error.message, "Method not found: bogus");
}

#[rstest]
fn capture_status_reports_the_loaded_capture(router: Router) {
    let status = call(&router, "get_capture_status", json!({})).expect("status");
    assert_eq!(status["loaded"], true);
    assert_eq!(status["api"], "Vulkan");
}

#[test]
fn capture_status_without_a_capture() {
    let queue = ReplayQueue::spawn(SnapshotProvider::new()).expect("spawn replay worker");
    let router = Router::new(queue);
    let status = call(&router, "get_capture_status", json!({})).expect("status");
    assert_eq!(status, json!({"loaded": false}));

    let error = call(&router, "get_draw_calls", json!({})).expect_err("no capture");
    assert_eq!(error.code, -32000);
    assert_eq!(error.message, "No capture loaded");
}

#[rstest]
fn marker_filter_keeps_the_matching_subtree(router: Router) {
    let result =
        call(&router, "get_draw_calls", json!({"marker_filter": "Main"})).expect("draw calls");
    assert_eq!(result["count"], 1);
    let pass = &result["actions"][0];
    assert_eq!(pass["name"], "Main Pass");
    assert_eq!(event_ids(&pass["children"]), [21, 22]);
}

#[rstest]
fn flags_filter_keeps_dispatches(router: Router) {
    let result = call(
        &router,
        "get_draw_calls",
        json!({"flags_filter": ["Dispatch"]}),
    )
    .expect("draw calls");
    let pass = &result["actions"][0];
    assert_eq!(pass["name"], "Main Pass");
    assert_eq!(event_ids(&pass["children"]), [22]);
    assert_eq!(result["count"], 1);
}

#[rstest]
fn negative_event_bounds_are_accepted(router: Router) {
    let unbounded = call(
        &router,
        "get_draw_calls",
        json!({"only_actions": true, "event_id_min": -1}),
    )
    .expect("negative minimum");
    assert_eq!(event_ids(&unbounded["actions"]), [11, 21, 22, 30, 40]);

    let empty = call(&router, "get_draw_calls", json!({"event_id_max": -1}))
        .expect("negative maximum");
    assert_eq!(empty["count"], json!(0));
}

#[rstest]
fn only_actions_flattens_markers(router: Router) {
    let result = call(
        &router,
        "get_draw_calls",
        json!({"only_actions": true, "marker_filter": "Main"}),
    )
    .expect("draw calls");
    assert_eq!(event_ids(&result["actions"]), [21, 22]);
}

#[rstest]
fn unknown_events_are_provider_errors(router: Router) {
    let error = call(&router, "get_draw_call_details", json!({"event_id": 999}))
        .expect_err("missing event");
    assert_eq!(error.code, -32000);
    assert_eq!(error.message, "Event ID 999 not found");
}

#[rstest]
fn draw_call_details_include_the_marker_path(router: Router) {
    let details =
        call(&router, "get_draw_call_details", json!({"event_id": 21})).expect("details");
    assert_eq!(details["num_indices"], 1200);
    assert_eq!(details["marker_path"], json!(["Main Pass"]));
}

#[rstest]
#[case::missing_shader_name("find_draws_by_shader", json!({}))]
#[case::missing_texture_name("find_draws_by_texture", json!({"stage": "pixel"}))]
#[case::wrong_event_type("get_pipeline_state", json!({"event_id": "twenty"}))]
#[case::bad_stage("get_shader_info", json!({"event_id": 21, "stage": "tess"}))]
fn bad_params_are_invalid_params(router: Router, #[case] method: &str, #[case] value: Value) {
    let error = call(&router, method, value).expect_err("invalid params");
    assert_eq!(error.code, -32602);
    assert!(error.message.starts_with(method), "{}", error.message);
}

#[rstest]
fn shader_search_matches_by_name(router: Router) {
    let result =
        call(&router, "find_draws_by_shader", json!({"shader_name": "gbuffer"})).expect("search");
    assert_eq!(result["count"], 1);
    assert_eq!(result["matches"][0]["event_id"], 21);
}

#[rstest]
fn resource_search_accepts_prefixed_ids(router: Router) {
    let result = call(
        &router,
        "find_draws_by_resource",
        json!({"resource_id": "ResourceId::300"}),
    )
    .expect("search");
    assert_eq!(event_ids(&result["matches"]), [11, 21]);
}

#[rstest]
fn frame_summary_counts_resources(router: Router) {
    let summary = call(&router, "get_frame_summary", json!({})).expect("summary");
    assert_eq!(summary["api"], "Vulkan");
    assert_eq!(summary["resource_counts"]["textures"], 3);
    assert_eq!(summary["resource_counts"]["buffers"], 2);
}

#[rstest]
fn timings_are_scoped_by_marker(router: Router) {
    let timings = call(&router, "get_action_timings", json!({"marker_filter": "Main"}))
        .expect("timings");
    assert_eq!(timings["available"], true);
    assert_eq!(timings["count"], 2);
}

#[test]
fn timings_without_counters_are_unavailable() {
    let document = r#"{"api": "D3D11", "actions": [{"event_id": 1, "action_id": 1, "name": "Draw", "flags": ["Drawcall"]}]}"#;
    let provider = SnapshotProvider::from_document("bare.rdc", document).expect("snapshot");
    let router = Router::new(ReplayQueue::spawn(provider).expect("spawn replay worker"));
    let timings = call(&router, "get_action_timings", json!({})).expect("timings");
    assert_eq!(timings["available"], false);
    assert_eq!(timings["count"], 0);
}

#[rstest]
fn out_of_range_mips_are_invalid_params(router: Router) {
    let error = call(
        &router,
        "get_texture_data",
        json!({"resource_id": 200, "mip": 5}),
    )
    .expect_err("bad mip");
    assert_eq!(error.code, -32602);
    assert_eq!(error.message, "Mip level 5 out of range (texture has 2)");
}

#[rstest]
fn shader_source_prefers_readable_targets(router: Router) {
    let source = call(
        &router,
        "get_shader_source",
        json!({"event_id": 21, "stage": "pixel"}),
    )
    .expect("source");
    assert_eq!(source["target"], "GLSL (SPIRV-Cross)");
}

#[rstest]
fn open_capture_reports_missing_files(router: Router) {
    let error = call(
        &router,
        "open_capture",
        json!({"capture_path": "/nonexistent/frame.rdc"}),
    )
    .expect_err("missing capture");
    assert_eq!(error.code, -32000);
}
