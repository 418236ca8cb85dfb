//! Full report cycles against a stub XL Release server.

use std::time::Duration;

use release_monitor::client::{Credentials, XlrClient};
use release_monitor::config::{default_tag_groups, MonitorConfig};
use release_monitor::monitor::Monitor;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer, output_dir: &std::path::Path, keep_files: bool) -> MonitorConfig {
    MonitorConfig {
        server_url: server.uri(),
        credentials: Credentials {
            username: "monitor".to_string(),
            password: "secret".to_string(),
        },
        release_title: "R1".to_string(),
        output_dir: output_dir.to_path_buf(),
        keep_files,
        run_for: Duration::from_secs(3600),
        interval: Duration::from_secs(180),
        groups: default_tag_groups(),
    }
}

async fn setup() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200).append_header("set-cookie", "XSRF-TOKEN=t0k3n; Path=/"),
        )
        .mount(&server)
        .await;
    server
}

/// Every search the other groups issue comes back empty.
async fn mount_empty_searches(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/releases/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "cis": [] })))
        .with_priority(10)
        .mount(server)
        .await;
}

#[tokio::test]
async fn failed_release_group_renders_one_table() {
    let server = setup().await;
    mount_empty_searches(&server).await;

    let release_tag = json!({ "title": "R1", "tags": ["drb", "release"], "failed": true, "inProgress": false });
    Mock::given(method("POST"))
        .and(path("/releases/search"))
        .and(query_param("page", "0"))
        .and(body_partial_json(release_tag))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cis": [
                {
                    "id": "Applications/Folder1/Release1",
                    "title": "220519A00-Rollout KV",
                    "status": "FAILED",
                    "currentPhase": "PROD",
                },
                {
                    "id": "Applications/Folder1/Release2",
                    "title": "220519A00-Rollout DB",
                    "status": "FAILED",
                    "currentPhase": "PROD",
                },
            ]
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/releases/Release1/active-tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "Applications/Folder1/Release1/Phase1/Task1",
            "title": "Deploy to PROD",
            "status": "FAILED",
            "type": "xlrelease.ScriptTask",
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/releases/Release2/active-tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/phases/Applications/Folder1/Release1/Phase1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "Applications/Folder1/Release1/Phase1",
            "title": "PROD",
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = config(&server, dir.path(), false);
    let client = XlrClient::connect(config.server_url.clone(), config.credentials.clone())
        .await
        .expect("Failed to connect");
    let monitor = Monitor::new(client, &config);

    let written = monitor.generate_report().await.expect("Cycle failed");
    let markdown = std::fs::read_to_string(&written.latest_markdown).expect("Missing report");

    assert_eq!(written.latest_markdown, dir.path().join("R1_LATEST.md"));
    assert!(markdown.starts_with("# R1\n\n"));
    assert_eq!(markdown.lines().filter(|l| l.starts_with("|-")).count(), 1);
    let rows: Vec<&str> = markdown
        .lines()
        .filter(|l| l.starts_with("|  ["))
        .collect();
    assert_eq!(rows.len(), 2);
    for row in &rows {
        let status = row.split('|').nth(2).map(str::trim);
        assert_eq!(status, Some("failed"));
    }
    assert!(rows[0].contains("[Rollout KV]"));
    assert!(rows[0].contains("Deploy to PROD"));
    assert_eq!(markdown.matches("No releases found.").count(), 2);

    let html = std::fs::read_to_string(&written.latest_html).expect("Missing html report");
    assert!(html.starts_with(&markdown));
    assert!(html.contains("markdeep.min.js"));
    server.verify().await;
}

#[tokio::test]
async fn keeps_history_when_asked() {
    let server = setup().await;
    mount_empty_searches(&server).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = config(&server, dir.path(), true);
    let client = XlrClient::connect(config.server_url.clone(), config.credentials.clone())
        .await
        .expect("Failed to connect");
    let monitor = Monitor::new(client, &config);

    let written = monitor.generate_report().await.expect("Cycle failed");

    assert_eq!(written.history.len(), 2);
    for copy in &written.history {
        assert!(copy.exists());
        let name = copy.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("R1_2"), "unexpected history file {}", name);
    }
}

#[tokio::test]
async fn searches_every_group_in_report_order() {
    let server = setup().await;
    mount_empty_searches(&server).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = config(&server, dir.path(), false);
    let client = XlrClient::connect(config.server_url.clone(), config.credentials.clone())
        .await
        .expect("Failed to connect");
    let monitor = Monitor::new(client, &config);

    let report = monitor.build().await.expect("Cycle failed");

    let headings: Vec<&str> = report
        .markdown
        .lines()
        .filter(|l| l.starts_with("## "))
        .collect();
    assert_eq!(
        headings,
        vec![
            "## Failed items with tag: [release]",
            "## Failed items with tag: [applikationstests]",
            "## Failed items with tag: [rollout]",
        ]
    );
    let searches = server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == "/releases/search")
        .count();
    assert_eq!(searches, 3);
}
