#![allow(dead_code)]

use async_trait::async_trait;
use fleet_upstream::{TelemetryApi, TorCredentials, UpstreamError};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// 可编排的上游：每个接口先消费脚本队列，队列为空时返回固定行。
#[derive(Default)]
pub struct FakeApi {
    logins: Mutex<VecDeque<Result<String, UpstreamError>>>,
    scripted: Mutex<HashMap<String, VecDeque<Result<Vec<Value>, UpstreamError>>>>,
    fixed: Mutex<HashMap<String, Vec<Value>>>,
    login_calls: AtomicUsize,
    requests: Mutex<Vec<(String, String, Value)>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_login(&self, result: Result<String, UpstreamError>) {
        self.logins.lock().unwrap().push_back(result);
    }

    pub fn push_page(&self, endpoint: &str, result: Result<Vec<Value>, UpstreamError>) {
        self.scripted
            .lock()
            .unwrap()
            .entry(endpoint.to_string())
            .or_default()
            .push_back(result);
    }

    pub fn set_rows(&self, endpoint: &str, rows: Vec<Value>) {
        self.fixed.lock().unwrap().insert(endpoint.to_string(), rows);
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    /// (token, endpoint, body)
    pub fn requests(&self) -> Vec<(String, String, Value)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TelemetryApi for FakeApi {
    async fn login(&self, _credentials: &TorCredentials) -> Result<String, UpstreamError> {
        let call = self.login_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.logins
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("token-{call}")))
    }

    async fn fetch_page(
        &self,
        token: &str,
        endpoint: &str,
        body: &Value,
    ) -> Result<Vec<Value>, UpstreamError> {
        self.requests
            .lock()
            .unwrap()
            .push((token.to_string(), endpoint.to_string(), body.clone()));
        let scripted = self
            .scripted
            .lock()
            .unwrap()
            .get_mut(endpoint)
            .and_then(|queue| queue.pop_front());
        if let Some(result) = scripted {
            return result;
        }
        // 固定行只在第一页返回
        let page_no = body["pageNo"].as_u64().unwrap_or(1);
        if page_no > 1 {
            return Ok(Vec::new());
        }
        Ok(self
            .fixed
            .lock()
            .unwrap()
            .get(endpoint)
            .cloned()
            .unwrap_or_default())
    }
}

pub fn credentials() -> TorCredentials {
    TorCredentials::new("tor-user", "tor-pass")
}
