use std::collections::BTreeSet;
use std::time::Duration;

use tempfile::TempDir;

use resultsnap_common::config::RunConfig;
use resultsnap_common::range::TicketRange;
use resultsnap_common::record::RecordStatus;
use resultsnap_core::Pipeline;
use resultsnap_core::report::{self, Report};
use resultsnap_core::staging::load_records;

use crate::support::spawn_result_server;

fn range() -> TicketRange {
    "110624861001-06".parse().unwrap()
}

/// Fetches six tickets from the mock server, half of them with results.
#[tokio::test]
async fn fetch_range_against_mock_server() {
    let server = spawn_result_server().await;
    let dir = TempDir::new().unwrap();

    let config = RunConfig::new(server.url(), range(), dir.path().join("results"))
        .with_max_workers(3)
        .with_refresh_interval(Some(Duration::from_millis(50)));
    let pipeline = Pipeline::with_http(config).unwrap();

    let report = pipeline.execute(None).await.unwrap();

    assert_eq!(report.output, dir.path().join("results.xlsx"));
    assert_eq!(report.staging, dir.path().join("results.ndjson"));
    assert_eq!(report.summary.total(), 6);
    assert_eq!(report.summary.saved, 3);
    assert_eq!(report.summary.no_result, 3);
    assert_eq!(report.summary.failed, 0);

    let tickets: BTreeSet<String> = report
        .records
        .iter()
        .map(|r| r.hallticket().to_string())
        .collect();
    assert_eq!(tickets, range().tickets().collect::<BTreeSet<_>>());

    let saved = report
        .records
        .iter()
        .find(|r| r.hallticket() == "110624861003")
        .unwrap();
    assert_eq!(saved.result.as_deref(), Some("PASSED"));
    assert_eq!(saved.marks.len(), 2);
    assert_eq!(saved.student.name.as_deref(), Some("STUDENT 110624861003"));

    let missing = report
        .records
        .iter()
        .find(|r| r.hallticket() == "110624861004")
        .unwrap();
    assert_eq!(missing.status, Some(RecordStatus::NoResult));
    assert!(missing.marks.is_empty());

    assert!(std::fs::read(&report.output).unwrap().starts_with(b"PK"));
    assert_eq!(load_records(&report.staging).unwrap().len(), 6);
}

#[tokio::test]
async fn requests_carry_search_form_and_headers() {
    let server = spawn_result_server().await;
    let dir = TempDir::new().unwrap();

    let config = RunConfig::new(server.url(), TicketRange::new(7, 7).unwrap(), dir.path().join("one.xlsx"))
        .with_refresh_interval(None);
    Pipeline::with_http(config).unwrap().execute(None).await.unwrap();

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let seen = &requests[0];
    assert_eq!(seen.form.get("mbstatus").map(String::as_str), Some("SEARCH"));
    assert_eq!(seen.form.get("htno").map(String::as_str), Some("7"));
    assert_eq!(seen.form.get("Submit.x").map(String::as_str), Some("25"));
    assert_eq!(seen.form.get("Submit.y").map(String::as_str), Some("8"));
    assert_eq!(seen.referer.as_deref(), Some(server.url().as_str()));
    assert_eq!(seen.user_agent.as_deref(), Some("Mozilla/5.0"));
}

/// Nothing listens on the port, so every ticket fails to fetch.
#[tokio::test]
async fn unreachable_server_yields_fetch_failed_placeholders() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dir = TempDir::new().unwrap();
    let config = RunConfig::new(
        format!("http://{addr}/results.jsp"),
        TicketRange::new(1, 4).unwrap(),
        dir.path().join("down.xlsx"),
    )
    .with_refresh_interval(None);

    let report = Pipeline::with_http(config).unwrap().execute(None).await.unwrap();

    assert_eq!(report.summary.failed, 4);
    assert_eq!(report.records.len(), 4);
    assert!(report
        .records
        .iter()
        .all(|r| r.status == Some(RecordStatus::FetchFailed)));
    assert!(report.output.exists());
}

/// The staging log of a run converts to the same report as the run produced.
#[tokio::test]
async fn staging_log_converts_like_the_run() {
    let server = spawn_result_server().await;
    let dir = TempDir::new().unwrap();

    let config = RunConfig::new(server.url(), range(), dir.path().join("run.xlsx"))
        .with_refresh_interval(None)
        .with_protect_password(Some("secret".to_string()));
    let run = Pipeline::with_http(config).unwrap().execute(None).await.unwrap();

    let converted = dir.path().join("converted.xlsx");
    let written = report::convert(&run.staging, &converted, Some("secret")).unwrap();
    assert_eq!(written, 6);
    assert!(std::fs::read(&converted).unwrap().starts_with(b"PK"));

    let rebuilt = Report::from_records(&load_records(&run.staging).unwrap()).unwrap();
    let original = Report::from_records(&run.records).unwrap();
    assert_eq!(rebuilt.results, original.results);
    assert_eq!(
        rebuilt.results.columns[..7],
        [
            "hallticket",
            "student.name",
            "student.father",
            "student.gender",
            "student.course",
            "result",
            "status"
        ]
    );
    assert_eq!(rebuilt.grades.columns, ["hallticket", "MATH101", "PHYS201"]);
    assert_eq!(rebuilt.grades.rows.len(), 3);
}
