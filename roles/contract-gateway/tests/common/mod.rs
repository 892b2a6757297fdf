#![allow(dead_code)]

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{HeaderMap, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use url::Url;

use contract_gateway::config::{Mode, DEFAULT_USER_AGENT};
use contract_gateway::webhook::{WebhookClient, WebhookConfig};
use contract_gateway::AppState;

/// A request as seen by the stub webhook.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("recorded body is JSON")
    }

    pub fn form_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> =
            url::form_urlencoded::parse(&self.body).into_owned().collect();
        pairs.sort();
        pairs
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone)]
pub struct StubReply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    pub delay: Duration,
}

impl StubReply {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Webhook stand-in that answers every request with the same reply and
/// records what it received.
pub struct StubUpstream {
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubUpstream {
    pub async fn start(reply: StubReply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                let recorded = recorded.clone();
                let reply = reply.clone();

                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                        let recorded = recorded.clone();
                        let reply = reply.clone();
                        async move {
                            let method = req.method().to_string();
                            let uri = req.uri().to_string();
                            let headers = req.headers().clone();
                            let body = req.into_body().collect().await.unwrap().to_bytes();
                            recorded.lock().unwrap().push(RecordedRequest {
                                method,
                                uri,
                                headers,
                                body,
                            });

                            if !reply.delay.is_zero() {
                                tokio::time::sleep(reply.delay).await;
                            }

                            let mut response = Response::new(Full::new(Bytes::from(reply.body)));
                            *response.status_mut() = StatusCode::from_u16(reply.status).unwrap();
                            response
                                .headers_mut()
                                .insert(CONTENT_TYPE, reply.content_type.parse().unwrap());
                            Ok::<_, Infallible>(response)
                        }
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        Self {
            url: format!("http://{}/webhook/consultar-cotizacion", addr),
            requests,
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// An address nothing listens on.
pub async fn closed_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub fn webhook_config(url: &str, timeout: Duration) -> WebhookConfig {
    WebhookConfig {
        url: Url::parse(url).unwrap(),
        fetch_timeout: timeout,
        submit_timeout: timeout,
        user_agent: DEFAULT_USER_AGENT.to_string(),
        pool_idle_timeout: Duration::from_secs(30),
    }
}

/// Starts the gateway on an ephemeral port and returns its base URL.
pub async fn start_gateway(webhook_url: &str, timeout: Duration, mode: Mode) -> String {
    start_gateway_with_bundle(webhook_url, timeout, mode, None).await
}

pub async fn start_gateway_with_bundle(
    webhook_url: &str,
    timeout: Duration,
    mode: Mode,
    static_dir: Option<PathBuf>,
) -> String {
    let state = Arc::new(AppState {
        webhook: WebhookClient::new(webhook_config(webhook_url, timeout)).unwrap(),
        mode,
        static_dir,
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(contract_gateway::web::serve(listener, state));

    format!("http://{}", addr)
}

/// A throwaway bundle directory with `index.html` and one stylesheet.
pub async fn write_bundle(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "contract-gateway-bundle-{}-{}",
        tag,
        std::process::id()
    ));
    tokio::fs::create_dir_all(dir.join("assets")).await.unwrap();
    tokio::fs::write(dir.join("index.html"), "<html>bundle</html>").await.unwrap();
    tokio::fs::write(dir.join("assets/app.css"), "body{}").await.unwrap();
    dir
}
