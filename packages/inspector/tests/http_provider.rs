// ABOUTME: Integration tests for the HTTP provider against a mock API server
// ABOUTME: Verifies request shapes, credential headers, and status classification

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sbxray_inspector::{
    FileContent, HttpProvider, InspectorConfig, InspectorError, SandboxInspector, SandboxProvider,
    SandboxQuery, SandboxState,
};

fn provider_for(server: &MockServer) -> HttpProvider {
    let config = InspectorConfig {
        api_key: "sk_test".to_string(),
        api_url: server.uri(),
        default_timeout: Duration::from_secs(30),
    };
    HttpProvider::new(&config).unwrap()
}

fn sandbox_json(id: &str, state: &str) -> serde_json::Value {
    json!({
        "sandbox_id": id,
        "template_id": "base-template",
        "metadata": {"env": "ci"},
        "state": state,
        "started_at": "2026-08-24T10:00:00Z",
        "end_at": "2026-08-24T12:00:00Z",
        "cpu_count": 2,
        "memory_mb": 1024
    })
}

#[tokio::test]
async fn list_page_sends_credential_and_parses_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/sandboxes"))
        .and(header("X-API-Key", "sk_test"))
        .and(query_param("state", "running"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sandboxes": [sandbox_json("sbx_a", "running")],
            "has_more": true,
            "next_cursor": "cursor-1"
        })))
        .mount(&server)
        .await;

    let query = SandboxQuery {
        state: Some(SandboxState::Running),
        metadata: None,
    };
    let page = provider_for(&server)
        .list_page(Some(query), None)
        .await
        .unwrap();

    assert_eq!(page.sandboxes.len(), 1);
    assert_eq!(page.sandboxes[0].sandbox_id, "sbx_a");
    assert_eq!(page.sandboxes[0].state, SandboxState::Running);
    assert!(page.has_more);
    assert_eq!(page.next_cursor.as_deref(), Some("cursor-1"));
}

#[tokio::test]
async fn list_page_forwards_cursor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/sandboxes"))
        .and(query_param("cursor", "cursor-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sandboxes": [],
            "has_more": false
        })))
        .mount(&server)
        .await;

    let page = provider_for(&server)
        .list_page(None, Some("cursor-1".to_string()))
        .await
        .unwrap();
    assert!(!page.has_more);
    assert!(page.sandboxes.is_empty());
}

#[tokio::test]
async fn get_info_classifies_missing_sandbox_as_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/sandboxes/sbx_gone"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "sandbox not found"})),
        )
        .mount(&server)
        .await;

    let err = provider_for(&server).get_info("sbx_gone").await.unwrap_err();
    assert!(matches!(err, InspectorError::NotFound(_)));
}

#[tokio::test]
async fn get_metrics_passes_time_window() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/sandboxes/sbx_a/metrics"))
        .and(query_param("start", "2026-08-24T09:00:00+00:00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metrics": [{
                "cpu_count": 2,
                "cpu_used_pct": 12.5,
                "mem_total": 2147483648u64,
                "mem_used": 536870912u64,
                "disk_total": 10737418240u64,
                "disk_used": 1073741824u64,
                "timestamp": "2026-08-24T09:30:00Z"
            }]
        })))
        .mount(&server)
        .await;

    let start = "2026-08-24T09:00:00Z".parse().unwrap();
    let points = provider_for(&server)
        .get_metrics("sbx_a", Some(start), None)
        .await
        .unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].cpu_used_pct, 12.5);
    assert_eq!(points[0].mem_total, 2147483648);
}

#[tokio::test]
async fn run_command_posts_command_and_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/sandboxes/sbx_a/exec"))
        .and(body_partial_json(json!({"command": "ls -la", "timeout_secs": 30})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stdout": "total 0\n",
            "stderr": null,
            "exit_code": 0
        })))
        .mount(&server)
        .await;

    let output = provider_for(&server)
        .run_command("sbx_a", "ls -la", Duration::from_secs(30))
        .await
        .unwrap();
    assert_eq!(output.stdout.as_deref(), Some("total 0\n"));
    assert_eq!(output.exit_code, 0);
}

#[tokio::test]
async fn run_code_parses_execution_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/sandboxes/sbx_a/code"))
        .and(body_partial_json(json!({"language": "python"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stdout": ["hello\n"],
            "stderr": [],
            "error": "NameError: name 'x' is not defined",
            "results": []
        })))
        .mount(&server)
        .await;

    let output = provider_for(&server)
        .run_code("sbx_a", "print(x)", "python", Duration::from_secs(30))
        .await
        .unwrap();
    assert_eq!(output.stdout, vec!["hello\n".to_string()]);
    assert!(output.error.is_some());
}

#[tokio::test]
async fn read_file_distinguishes_text_from_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/sandboxes/sbx_a/files"))
        .and(query_param("path", "/etc/hostname"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/plain")
                .set_body_string("sbx-host\n"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/sandboxes/sbx_a/files"))
        .and(query_param("path", "/bin/blob"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/octet-stream")
                .set_body_bytes(vec![0u8, 1, 2, 255]),
        )
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let text = provider.read_file("sbx_a", "/etc/hostname").await.unwrap();
    assert_eq!(text, FileContent::Text("sbx-host\n".to_string()));

    let bytes = provider.read_file("sbx_a", "/bin/blob").await.unwrap();
    assert_eq!(bytes, FileContent::Bytes(vec![0, 1, 2, 255]));
}

#[tokio::test]
async fn write_file_puts_raw_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/sandboxes/sbx_a/files"))
        .and(query_param("path", "/tmp/out.txt"))
        .and(header("content-type", "application/octet-stream"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    provider_for(&server)
        .write_file("sbx_a", "/tmp/out.txt", b"payload")
        .await
        .unwrap();
}

#[tokio::test]
async fn terminate_not_found_surfaces_as_kill_false_through_the_facade() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/sandboxes/sbx_gone"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "already terminated"})),
        )
        .mount(&server)
        .await;

    let inspector = SandboxInspector::with_provider(
        std::sync::Arc::new(provider_for(&server)),
        Duration::from_secs(30),
    );
    assert!(!inspector.kill("sbx_gone").await.unwrap());
}

#[tokio::test]
async fn server_errors_classify_as_provider_failures() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/sandboxes/sbx_a"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "internal error"})),
        )
        .mount(&server)
        .await;

    let err = provider_for(&server).terminate("sbx_a").await.unwrap_err();
    match err {
        InspectorError::Provider(msg) => assert!(msg.contains("internal error")),
        other => panic!("expected provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn gateway_timeout_classifies_as_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/sandboxes/sbx_a/exec"))
        .respond_with(
            ResponseTemplate::new(504).set_body_json(json!({"message": "command deadline exceeded"})),
        )
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .run_command("sbx_a", "sleep 999", Duration::from_secs(1))
        .await
        .unwrap_err();
    assert!(err.is_timeout());
}
