//! Exit-status behaviour of the `nsql-to-excel` binary.

use std::path::Path;
use std::process::{Command, Output};

use nsql_query::testing::query_response;
use nsql_wsdl::testing::query_wsdl;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// `process::exit(-1)` as reported by the OS.
const FAILURE: i32 = if cfg!(unix) { 255 } else { -1 };

async fn run(args: Vec<String>) -> Output {
    tokio::task::spawn_blocking(move || {
        Command::new(env!("CARGO_BIN_EXE_nsql-to-excel"))
            .args(&args)
            .env_remove("NSQL_PPM_PASSWORD")
            .env("RUST_LOG", "off")
            .output()
            .unwrap()
    })
    .await
    .unwrap()
}

async fn query_server(records: &[&[(&str, &str)]]) -> MockServer {
    let server = MockServer::start().await;
    let endpoint = format!("{}/niku/xog", server.uri());
    Mock::given(method("GET"))
        .and(path("/niku/wsdl/Query/PRJ001"))
        .respond_with(ResponseTemplate::new(200).set_body_string(query_wsdl(
            "PRJ001",
            &endpoint,
            &[("Name", "string"), ("Cost", "decimal")],
        )))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/niku/xog"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(query_response("PRJ001", records)),
        )
        .mount(&server)
        .await;
    server
}

fn args(server: &MockServer, output: &Path) -> Vec<String> {
    vec![
        "-H".into(),
        server.uri(),
        "-u".into(),
        "admin".into(),
        "-p".into(),
        "s3cret".into(),
        "-c".into(),
        "PRJ001".into(),
        "-x".into(),
        output.display().to_string(),
    ]
}

#[tokio::test]
async fn test_success_exits_zero() {
    let server = query_server(&[&[("Name", "Acme"), ("Cost", "100")]]).await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("PRJ001.xlsx");

    let result = run(args(&server, &output)).await;

    assert_eq!(result.status.code(), Some(0));
    assert!(output.exists());
}

#[tokio::test]
async fn test_empty_result_exits_failure_without_output() {
    let server = query_server(&[]).await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("PRJ001.xlsx");

    let result = run(args(&server, &output)).await;

    assert_eq!(result.status.code(), Some(FAILURE));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_missing_required_flag_exits_failure() {
    let result = run(vec![
        "-H".into(),
        "ppm.example.com".into(),
        "-u".into(),
        "admin".into(),
    ])
    .await;

    assert_eq!(result.status.code(), Some(FAILURE));
    assert!(!result.stderr.is_empty());
}

#[tokio::test]
async fn test_empty_user_exits_failure() {
    let result = run(vec![
        "-H".into(),
        "ppm.example.com".into(),
        "-u".into(),
        "".into(),
        "-p".into(),
        "s3cret".into(),
        "-c".into(),
        "PRJ001".into(),
    ])
    .await;

    assert_eq!(result.status.code(), Some(FAILURE));
}

#[tokio::test]
async fn test_help_and_version_exit_zero() {
    let help = run(vec!["--help".into()]).await;
    assert_eq!(help.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&help.stdout).contains("--nsql-query-code"));

    let version = run(vec!["--version".into()]).await;
    assert_eq!(version.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&version.stdout).contains(env!("CARGO_PKG_VERSION")));
}
