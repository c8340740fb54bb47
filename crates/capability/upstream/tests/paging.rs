use async_trait::async_trait;
use fleet_upstream::{
    PageFilter, TelemetryApi, TorCredentials, UpstreamError, UpstreamSession, fetch_all_pages,
};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;

/// 按顺序返回预设分页结果并记录请求体。
struct ScriptedApi {
    pages: Mutex<VecDeque<Result<Vec<Value>, UpstreamError>>>,
    bodies: Mutex<Vec<Value>>,
    login_result: Result<String, UpstreamError>,
}

impl ScriptedApi {
    fn new(pages: Vec<Result<Vec<Value>, UpstreamError>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            bodies: Mutex::new(Vec::new()),
            login_result: Ok("token-1".to_string()),
        }
    }

    fn requests(&self) -> Vec<Value> {
        self.bodies.lock().expect("lock").clone()
    }
}

#[async_trait]
impl TelemetryApi for ScriptedApi {
    async fn login(&self, _credentials: &TorCredentials) -> Result<String, UpstreamError> {
        self.login_result.clone()
    }

    async fn fetch_page(
        &self,
        _token: &str,
        _endpoint: &str,
        body: &Value,
    ) -> Result<Vec<Value>, UpstreamError> {
        self.bodies.lock().expect("lock").push(body.clone());
        self.pages
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

fn rows(count: usize) -> Vec<Value> {
    (0..count).map(|idx| json!({ "HWID": idx.to_string() })).collect()
}

#[tokio::test]
async fn pagination_stops_after_short_page() {
    let api = ScriptedApi::new(vec![Ok(rows(2)), Ok(rows(2)), Ok(rows(1)), Ok(rows(2))]);
    let fetch = fetch_all_pages(&api, "token", "/x", &PageFilter::fleet(), 2).await;
    assert_eq!(fetch.rows.len(), 5);
    assert_eq!(fetch.pages, 3);
    assert!(fetch.error.is_none());

    let requests = api.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0]["pageNo"], 1);
    assert_eq!(requests[2]["pageNo"], 3);
    assert_eq!(requests[0]["pageSize"], 2);
    assert_eq!(requests[0]["hardwareId"], "");
    assert_eq!(requests[0]["equipmentCode"], "");
}

#[tokio::test]
async fn pagination_stops_on_empty_page() {
    let api = ScriptedApi::new(vec![Ok(rows(2)), Ok(Vec::new())]);
    let fetch = fetch_all_pages(&api, "token", "/x", &PageFilter::fleet(), 2).await;
    assert_eq!(fetch.rows.len(), 2);
    assert_eq!(api.requests().len(), 2);
}

#[tokio::test]
async fn pagination_error_keeps_partial_rows() {
    let api = ScriptedApi::new(vec![
        Ok(rows(2)),
        Err(UpstreamError::Status(502)),
        Ok(rows(2)),
    ]);
    let fetch = fetch_all_pages(&api, "token", "/x", &PageFilter::fleet(), 2).await;
    assert_eq!(fetch.rows.len(), 2);
    assert!(matches!(fetch.error, Some(UpstreamError::Status(502))));
    assert!(!fetch.unauthorized());
    assert_eq!(api.requests().len(), 2);
}

#[tokio::test]
async fn pagination_reports_unauthorized() {
    let api = ScriptedApi::new(vec![Err(UpstreamError::Unauthorized)]);
    let fetch = fetch_all_pages(&api, "token", "/x", &PageFilter::fleet(), 2).await;
    assert!(fetch.rows.is_empty());
    assert!(fetch.unauthorized());
}

#[test]
fn history_filter_carries_range() {
    let filter = PageFilter::history(
        "123",
        "2024-01-01T00:00:00Z".to_string(),
        "2024-01-02T00:00:00Z".to_string(),
    );
    let body = filter.to_payload(4, 500);
    assert_eq!(body["hardwareId"], "123");
    assert_eq!(body["fromDate"], "2024-01-01T00:00:00Z");
    assert_eq!(body["toDate"], "2024-01-02T00:00:00Z");
    assert_eq!(body["pageNo"], 4);
}

#[tokio::test]
async fn session_tracks_login_and_invalidation() {
    let api = ScriptedApi::new(Vec::new());
    let credentials = TorCredentials::new("ops", "pw");
    let mut session = UpstreamSession::new();
    assert!(!session.is_authenticated());

    session.authenticate(&api, &credentials).await.expect("login");
    assert_eq!(session.token(), Some("token-1"));

    session.invalidate();
    assert!(!session.is_authenticated());

    let failing = ScriptedApi {
        login_result: Err(UpstreamError::MissingToken),
        ..ScriptedApi::new(Vec::new())
    };
    session.set_token("stale".to_string());
    let err = session
        .authenticate(&failing, &credentials)
        .await
        .expect_err("login fails");
    assert!(matches!(err, UpstreamError::MissingToken));
    assert!(!session.is_authenticated());
}

#[test]
fn credentials_debug_hides_password() {
    let credentials = TorCredentials::new("ops", "secret-pw");
    let rendered = format!("{credentials:?}");
    assert!(rendered.contains("ops"));
    assert!(!rendered.contains("secret-pw"));
}
