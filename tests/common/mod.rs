//! Shared utilities for integration testing: a scriptable CRM backend.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crm_gateway::config::GatewayConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const API_KEY: &str = "test-api-key";
pub const SITE: &str = "demo-shop";

/// One request as the backend saw it.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or("")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn query(&self) -> Vec<(String, String)> {
        let query = self.target.split_once('?').map(|(_, q)| q).unwrap_or("");
        url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    pub fn query_value(&self, key: &str) -> Option<String> {
        self.query().into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn form(&self) -> Vec<(String, String)> {
        url::form_urlencoded::parse(self.body.as_bytes())
            .into_owned()
            .collect()
    }

    pub fn form_value(&self, key: &str) -> Option<String> {
        self.form().into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

/// Handle to a running mock backend.
#[derive(Clone)]
pub struct MockCrm {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    hits: Arc<AtomicUsize>,
}

impl MockCrm {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> CapturedRequest {
        self.requests().last().cloned().expect("no request captured")
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api/v5", self.addr)
    }
}

/// Start a mock backend answering every request with a fixed status and body.
pub async fn start_mock_backend(status: u16, body: &'static str) -> MockCrm {
    start_programmable_backend(move |_| async move { (status, body.to_string()) }).await
}

/// Start a programmable mock backend. `f` sees each captured request.
pub async fn start_programmable_backend<F, Fut>(f: F) -> MockCrm
where
    F: Fn(CapturedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let mock = MockCrm {
        addr,
        requests: Arc::new(Mutex::new(Vec::new())),
        hits: Arc::new(AtomicUsize::new(0)),
    };
    let f = Arc::new(f);
    let state = mock.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let state = state.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        state.hits.fetch_add(1, Ordering::SeqCst);
                        state.requests.lock().unwrap().push(request.clone());

                        let (status, body) = f(request).await;
                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_line(status),
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    mock
}

fn status_line(status: u16) -> &'static str {
    match status {
        200 => "200 OK",
        201 => "201 Created",
        400 => "400 Bad Request",
        401 => "401 Unauthorized",
        403 => "403 Forbidden",
        404 => "404 Not Found",
        429 => "429 Too Many Requests",
        500 => "500 Internal Server Error",
        502 => "502 Bad Gateway",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    }
}

async fn read_request(socket: &mut TcpStream) -> Option<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_end = (header_end + content_length).min(buf.len());
    let body = String::from_utf8_lossy(&buf[header_end..body_end]).to_string();

    Some(CapturedRequest {
        method,
        target,
        headers,
        body,
    })
}

/// Gateway config pointed at a mock backend, with rate limiting off and
/// immediate retries.
pub fn config_for(base_url: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.crm.api_key = API_KEY.to_string();
    config.crm.subdomain = "demo".to_string();
    config.crm.site = Some(SITE.to_string());
    config.crm.base_url = Some(base_url.to_string());
    config.rate_limit.enabled = false;
    config.retries.base_delay_ms = 0;
    config.timeouts.connect_secs = 2;
    config.timeouts.request_secs = 5;
    config.timeouts.call_secs = 10;
    config
}

pub const CUSTOMERS_BODY: &str = r#"{
    "success": true,
    "pagination": {"limit": 20, "totalCount": 1, "currentPage": 1, "totalPageCount": 1},
    "customers": [{
        "id": 42,
        "type": "customer",
        "isContact": false,
        "createdAt": "2023-01-21 10:15:00",
        "firstName": "Ivan",
        "email": "ivan@example.com",
        "phones": [{"number": "+79990000000"}]
    }]
}"#;

pub const ORDERS_BODY: &str = r#"{
    "success": true,
    "pagination": {"limit": 50, "totalCount": 1, "currentPage": 2, "totalPageCount": 2},
    "orders": [{
        "id": 7,
        "number": "A-7",
        "summ": 1500.0,
        "currency": "RUB",
        "createdAt": "2023-02-01 09:00:00",
        "statusUpdatedAt": "2023-02-02 11:30:00"
    }]
}"#;

pub const CREATED_BODY: &str = r#"{"success": true, "id": 101}"#;
