//! Integration tests for the request/assert orchestrator
//!
//! Requests go through an in-memory transport, so these tests pin down what
//! is sent and how responses turn into assertion results.


use apiprobe_core::checks::{CheckRunner, CheckSet, CheckStats, RecordCollector};
use apiprobe_core::http::{FilePart, Method, MultipartForm, RequestBody, RequestOption, TestCase};
use apiprobe_core::{predicates, Department, Guarded, Orchestrator, RunConfig};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use test_support::*;

fn orchestrator(transport: ScriptedTransport) -> Orchestrator<Arc<ScriptedTransport>> {
    Orchestrator::new(Arc::new(transport), RunConfig::default())
}

#[tokio::test]
async fn test_five_checks_two_failing() {
    let transport = Arc::new(ScriptedTransport::new([json_response(
        201,
        json!({"departmentId": "d-9", "name": "Engineering"}),
    )]));
    let orchestrator = Orchestrator::new(transport.clone(), RunConfig::default());
    let checks = CheckSet::new()
        .status(201)
        .check("should have departmentId", |r| predicates::is_exists(r, "departmentId"))
        .check("should echo name", |r| predicates::is_equal(r, "name", &json!("Engineering")))
        .check("should have createdAt", |r| predicates::is_exists(r, "createdAt"))
        .check("should be a list", |r| predicates::is_total_data_in_range(r, "[]", 1, 10));

    let result = orchestrator
        .test_post_json_assert(
            &TestCase::new("department", "post valid").bearer("t"),
            "/v1/department",
            &json!({"name": "Engineering"}),
            &checks,
        )
        .await
        .unwrap();

    assert!(!result.is_success);
    assert_eq!(result.failed_count(), 2);
    assert_eq!(result.failed_checks, vec!["should have createdAt", "should be a list"]);
    assert_eq!(transport.sent_count(), 1);
}

#[tokio::test]
async fn test_post_sends_json_and_headers() {
    let transport = Arc::new(ScriptedTransport::new([json_response(201, json!({}))]));
    let orchestrator = Orchestrator::new(transport.clone(), RunConfig::default());
    let payload = json!({"name": "Ops"});

    orchestrator
        .test_post_json_assert(
            &TestCase::new("department", "post").bearer("secret"),
            "v1/department",
            &payload,
            &CheckSet::new().status(201),
        )
        .await
        .unwrap();

    let sent = transport.sent();
    assert_eq!(sent[0].method, Method::Post);
    assert_eq!(sent[0].url.as_str(), "http://localhost:8080/v1/department");
    assert_eq!(sent[0].body, RequestBody::Json(payload));
    assert_eq!(
        sent[0].headers,
        vec![("Authorization".to_string(), "Bearer secret".to_string())]
    );
    assert!(!sent[0].omit_content_type);
}

#[tokio::test]
async fn test_no_content_type_option_is_forwarded() {
    let transport = Arc::new(ScriptedTransport::new([json_response(400, json!({}))]));
    let orchestrator = Orchestrator::new(transport.clone(), RunConfig::default());
    let case = TestCase::new("employee", "patch without content type").option(RequestOption::NoContentType);

    let result = orchestrator
        .test_patch_json_assert(&case, "/v1/employee/123", &json!({"name": "x"}), &CheckSet::new().status(400))
        .await
        .unwrap();

    assert!(result.is_success);
    assert!(transport.sent()[0].omit_content_type);
    assert_eq!(transport.sent()[0].method, Method::Patch);
}

#[tokio::test]
async fn test_transport_failure_is_failed_check_not_error() {
    let orchestrator = orchestrator(ScriptedTransport::default());
    let result = orchestrator
        .test_delete_assert(&TestCase::new("department", "delete"), "/v1/department/d-1", &CheckSet::new().status(200))
        .await
        .unwrap();

    assert!(!result.is_success);
    assert_eq!(result.failed_checks, vec!["should return 200"]);
    assert!(result.response.is_transport_failure());
}

#[tokio::test]
async fn test_no_retry_on_server_error() {
    let transport = Arc::new(ScriptedTransport::new([
        json_response(503, json!({"message": "unavailable"})),
        json_response(200, json!({})),
    ]));
    let orchestrator = Orchestrator::new(transport.clone(), RunConfig::default());

    let result = orchestrator
        .test_get_assert(&TestCase::new("user", "get"), "/v1/user", None, &CheckSet::new().status(200))
        .await
        .unwrap();

    assert!(!result.is_success);
    assert_eq!(transport.sent_count(), 1);
}

#[tokio::test]
async fn test_multipart_upload() {
    let transport = Arc::new(ScriptedTransport::new([json_response(
        200,
        json!({"uri": "https://cdn.example.com/abc.jpg"}),
    )]));
    let orchestrator = Orchestrator::new(transport.clone(), RunConfig::default());
    let form = MultipartForm::new().file(FilePart::new("file", "abc.jpg", vec![0xff, 0xd8]).content_type("image/jpeg"));
    let checks = CheckSet::new()
        .status(200)
        .check("should have uri", |r| predicates::is_exists(r, "uri"));

    let result = orchestrator
        .test_post_multipart_assert(&TestCase::new("file", "upload jpg"), "/v1/file", form.clone(), &checks)
        .await
        .unwrap();

    assert!(result.is_success);
    assert_eq!(transport.sent()[0].body, RequestBody::Multipart(form));
}

#[tokio::test]
async fn test_result_response_materialises_entity() {
    let orchestrator = orchestrator(ScriptedTransport::new([json_response(
        201,
        json!({"departmentId": "d-3", "name": "Finance"}),
    )]));
    let result = orchestrator
        .test_post_json_assert(
            &TestCase::new("department", "post"),
            "/v1/department",
            &json!({"name": "Finance"}),
            &CheckSet::new().status(201),
        )
        .await
        .unwrap();

    let department = Department::from_response(&result.response).unwrap();
    assert_eq!(department.department_id, "d-3");
}

#[tokio::test]
async fn test_records_carry_tags_and_verbose_request() {
    let collector = Arc::new(RecordCollector::default());
    let stats = Arc::new(CheckStats::new());
    let config = RunConfig {
        debug: true,
        ..RunConfig::default()
    };
    let orchestrator = Orchestrator::new(
        Arc::new(ScriptedTransport::new([json_response(200, json!([]))])),
        config,
    )
    .with_runner(CheckRunner::new().with_reporter(collector.clone()).with_reporter(stats.clone()));

    let case = TestCase::new("employee", "list").tag("mode", "functional");
    orchestrator
        .test_get_assert(&case, "/v1/employee", Some(&json!({"limit": 5})), &CheckSet::new().status(200))
        .await
        .unwrap();

    let record = &collector.records()[0];
    assert_eq!(record.feature, "employee");
    assert_eq!(record.case, "list");
    assert_eq!(record.tags["mode"], "functional");
    let request = record.request.as_ref().unwrap();
    assert_eq!(request.url, "http://localhost:8080/v1/employee?limit=5");
    assert!(record.response.is_some());
    assert_eq!(stats.snapshot().requests, 1);
}

#[tokio::test]
async fn test_pagination_windows_are_disjoint() {
    let transport = Arc::new(ScriptedTransport::new([department_page(0, 5), department_page(5, 5)]));
    let orchestrator = Orchestrator::new(transport.clone(), RunConfig::default());
    let checks = CheckSet::new()
        .status(200)
        .check("should have at most 5 items", |r| predicates::is_total_data_in_range(r, "[]", 0, 5));

    let first = orchestrator
        .test_get_assert(&TestCase::new("department", "page 1"), "/v1/department", Some(&json!({"limit": 5, "offset": 0})), &checks)
        .await
        .unwrap();
    let second = orchestrator
        .test_get_assert(&TestCase::new("department", "page 2"), "/v1/department", Some(&json!({"limit": 5, "offset": 5})), &checks)
        .await
        .unwrap();

    assert!(first.is_success && second.is_success);
    assert!(predicates::is_every_item_different(&first.response, &second.response, "[]departmentId"));
    assert!(!predicates::is_every_item_different(&first.response, &first.response, "[]departmentId"));
}
