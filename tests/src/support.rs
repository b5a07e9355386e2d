//! In-process stand-in for the result server.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Form, State};
use axum::http::{HeaderMap, header};
use axum::response::Html;
use axum::routing::post;
use axum::Router;

/// One request as the server saw it.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub form: HashMap<String, String>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Clone, Default)]
pub struct MockState {
    pub requests: Arc<Mutex<Vec<SeenRequest>>>,
}

pub struct MockServer {
    pub addr: SocketAddr,
    pub state: MockState,
}

impl MockServer {
    pub fn url(&self) -> String {
        format!("http://{}/results.jsp", self.addr)
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

/// Serves a result page for tickets ending in an odd digit and a
/// "no record" page for everything else.
pub async fn spawn_result_server() -> MockServer {
    let state = MockState::default();
    let app = Router::new()
        .route("/results.jsp", post(search))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockServer { addr, state }
}

async fn search(
    State(state): State<MockState>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Html<String> {
    let header_text = |name| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let ticket = form.get("htno").cloned().unwrap_or_default();
    state.requests.lock().unwrap().push(SeenRequest {
        referer: header_text(header::REFERER),
        user_agent: header_text(header::USER_AGENT),
        form,
    });

    let has_result = ticket
        .chars()
        .last()
        .and_then(|c| c.to_digit(10))
        .is_some_and(|d| d % 2 == 1);

    if has_result {
        Html(result_page(&ticket))
    } else {
        Html("<html><body><p>Hall ticket number not found</p></body></html>".to_string())
    }
}

pub fn result_page(ticket: &str) -> String {
    format!(
        r#"<html><body>
        <table id="AutoNumber3">
          <tr><td colspan="4"><b>Personal Details</b></td></tr>
          <tr><td>Hall Ticket No</td><td>{ticket}</td><td>Gender</td><td>MALE</td></tr>
          <tr><td>Name</td><td>STUDENT {ticket}</td><td>Father's Name</td><td>PARENT</td></tr>
          <tr><td>Course</td><td>B.SC (MPCS)</td></tr>
        </table>
        <table id="AutoNumber4">
          <tr><td colspan="4">Marks Details</td></tr>
          <tr><td>Sub Code</td><td>Subject Name</td><td>Credits</td><td>Grade</td></tr>
          <tr><td>MATH101</td><td>Mathematics</td><td>4</td><td>A</td></tr>
          <tr><td>PHYS201</td><td>Physics</td><td>3</td><td>B</td></tr>
        </table>
        <table id="AutoNumber5">
          <tr><td>Result</td></tr>
          <tr><td>SGPA</td><td>CGPA</td><td>Result</td></tr>
          <tr><td>8.2</td><td>8.0</td><td>PASSED</td></tr>
        </table>
        </body></html>"#
    )
}
