//! Integration tests running the `scan` and `init` commands end to end, with the
//! GitHub API served by wiremock.

use repo_scout_lib::commands::TestHost;
use serde_json::json;
use std::path::Path;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_github() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .and(query_param("q", "topic:uml"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 1,
            "items": [{ "name": "one", "owner": { "login": "alice" } }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/alice/one/git/trees/HEAD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "truncated": false,
            "tree": [
                { "path": "README.md", "type": "blob" },
                { "path": "docs", "type": "tree" },
                { "path": "model", "type": "tree" },
                { "path": "model/system.uml", "type": "blob" }
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/alice/one/contents/README.md"))
        .respond_with(ResponseTemplate::new(200).set_body_string("The UML model describes the architecture."))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/alice/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "one" },
            { "name": "one-docs" }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/alice/one"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "size": 120,
            "stargazers_count": 6000,
            "default_branch": "main"
        })))
        .mount(&server)
        .await;

    server
}

fn arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[tokio::test]
async fn test_scan_writes_results() {
    let server = mock_github().await;
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("scout.toml");
    let output = dir.path().join("results.csv");
    let clones = dir.path().join("clones");

    let mut host = TestHost::new();
    repo_scout_lib::run(&mut host, ["repo-scout", "init", &arg(&config)]).await.unwrap();

    let result = repo_scout_lib::run(
        &mut host,
        [
            "repo-scout".to_string(),
            "scan".to_string(),
            "--count".to_string(),
            "1".to_string(),
            "--query".to_string(),
            "topic:uml".to_string(),
            "--config".to_string(),
            arg(&config),
            "--clone-dir".to_string(),
            arg(&clones),
            "--output".to_string(),
            arg(&output),
            "--api-url".to_string(),
            server.uri(),
            "--clone-url".to_string(),
            server.uri(),
        ],
    )
    .await;

    assert!(result.is_ok(), "scan should succeed: {result:?}, stderr: {}", host.error_text());
    assert_eq!(host.exit_code, None);

    let stdout = host.output_text();
    assert!(stdout.contains("alice/one"), "unexpected output: {stdout}");
    assert!(stdout.contains("Evaluated 1 repositories"));

    let csv = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "repo_name,repo_owner,doc_folder,model_files,keywords,owner_repos,stargazers,total_score,duration_ms");
    // doc_folder 1, model_files 1, keywords 1 (two matches), owner_repos 3, stargazers 2
    assert!(lines[1].starts_with("one,alice,1,1,1,3,2,8,"), "unexpected row: {}", lines[1]);

    let sorted = std::fs::read_to_string(dir.path().join("results_sorted.csv")).unwrap();
    assert_eq!(sorted, csv);
    assert!(stdout.contains("results_sorted.csv"));

    assert!(clones.exists());
    assert_eq!(std::fs::read_dir(&clones).unwrap().count(), 0);
}

#[tokio::test]
async fn test_scan_with_invalid_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("broken.toml");
    std::fs::write(&config, "rate_threshold = \"high\"\n").unwrap();

    let mut host = TestHost::new();
    let result = repo_scout_lib::run(
        &mut host,
        [
            "repo-scout".to_string(),
            "scan".to_string(),
            "--count".to_string(),
            "1".to_string(),
            "--config".to_string(),
            arg(&config),
            "--clone-dir".to_string(),
            arg(&dir.path().join("clones")),
            "--output".to_string(),
            arg(&dir.path().join("out.csv")),
        ],
    )
    .await;

    assert!(result.is_err());
    assert_eq!(host.exit_code, Some(1));
    assert!(host.error_text().contains("Scan failed"));
}

#[tokio::test]
async fn test_init_does_not_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("repo-scout.toml");
    std::fs::write(&config, "# mine").unwrap();

    let mut host = TestHost::new();
    let result = repo_scout_lib::run(&mut host, ["repo-scout", "init", &arg(&config)]).await;

    assert!(result.is_err());
    assert_eq!(std::fs::read_to_string(&config).unwrap(), "# mine");

    let mut host = TestHost::new();
    repo_scout_lib::run(&mut host, ["repo-scout", "init", "--force", &arg(&config)]).await.unwrap();
    assert!(std::fs::read_to_string(&config).unwrap().contains("rate_threshold"));
}
