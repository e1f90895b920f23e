//! Remote markdown rendering endpoint.
//!
//! [`Gateway`] is the seam between the orchestrator and the network.
//! [`HttpGateway`] is the production implementation: a sync `ureq` client
//! posting `{"text": ...}` to the GitHub markdown API.

use std::time::Duration;

use serde::Serialize;
use tracing::info;
use ureq::Agent;

use gitdown_config::{ApiConfig, DEFAULT_API_URL, DEFAULT_USER_AGENT};

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Markdown sent to the rendering endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderRequest {
    /// Markdown source, already shielded.
    pub text: String,
    /// Token for the `Authorization` header; never serialized into the body.
    #[serde(skip)]
    pub auth_token: Option<String>,
}

/// Raw response from the rendering endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResult {
    /// HTTP status code.
    pub status: u16,
    /// Response body, rendered HTML on success.
    pub body: String,
}

impl RenderResult {
    /// `true` for statuses in `[200, 300)`.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport for render requests.
///
/// Implementations return every HTTP status as a [`RenderResult`]; only
/// transport failures are errors.
pub trait Gateway: Send + Sync {
    /// Send one render request.
    fn post(&self, request: &RenderRequest) -> Result<RenderResult, ureq::Error>;
}

/// Create an agent that reports HTTP error statuses as responses.
fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// [`Gateway`] over HTTP.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use gitdown::HttpGateway;
///
/// let gateway = HttpGateway::new()
///     .url("https://github.example.com/api/v3/markdown")
///     .timeout(Duration::from_secs(10));
/// ```
pub struct HttpGateway {
    agent: Agent,
    url: String,
    user_agent: String,
}

impl Default for HttpGateway {
    fn default() -> Self {
        Self {
            agent: create_agent(Duration::from_secs(DEFAULT_TIMEOUT)),
            url: DEFAULT_API_URL.to_owned(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpGateway {
    /// Gateway for `https://api.github.com/markdown`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway built from the `[api]` config section.
    #[must_use]
    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new()
            .url(&config.url)
            .user_agent(&config.user_agent)
            .timeout(config.timeout())
    }

    /// Set the rendering endpoint.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the `User-Agent` header value.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the global request timeout.
    ///
    /// Replaces any agent installed with [`agent`](Self::agent).
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.agent = create_agent(timeout);
        self
    }

    /// Use a preconfigured agent (proxy, TLS, timeouts).
    ///
    /// The agent must be built with `http_status_as_error(false)` so that
    /// error statuses reach the orchestrator as responses.
    #[must_use]
    pub fn agent(mut self, agent: Agent) -> Self {
        self.agent = agent;
        self
    }
}

impl Gateway for HttpGateway {
    fn post(&self, request: &RenderRequest) -> Result<RenderResult, ureq::Error> {
        info!("Rendering {} bytes of markdown via {}", request.text.len(), self.url);

        let mut builder = self
            .agent
            .post(&self.url)
            .header("User-Agent", &self.user_agent);
        if let Some(token) = &request.auth_token {
            builder = builder.header("Authorization", &format!("token {token}"));
        }

        let response = builder.send_json(request)?;
        let status = response.status().as_u16();
        let body = response.into_body().read_to_string()?;

        Ok(RenderResult { status, body })
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread::{self, JoinHandle};

    use pretty_assertions::assert_eq;

    use super::*;

    /// Captured request: lowercased head and raw body.
    struct Captured {
        head: String,
        body: String,
    }

    fn read_request(stream: &TcpStream) -> Captured {
        let mut reader = BufReader::new(stream);
        let mut head = String::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
            head.push_str(&line.to_ascii_lowercase());
        }

        let header = |name: &str| {
            head.lines().find_map(|line| {
                let (key, value) = line.split_once(':')?;
                (key.trim() == name).then(|| value.trim().to_owned())
            })
        };

        let mut body = Vec::new();
        if let Some(len) = header("content-length") {
            body.resize(len.parse().unwrap(), 0);
            reader.read_exact(&mut body).unwrap();
        } else if header("transfer-encoding").as_deref() == Some("chunked") {
            loop {
                let mut size = String::new();
                reader.read_line(&mut size).unwrap();
                let size = usize::from_str_radix(size.trim(), 16).unwrap();
                let mut chunk = vec![0; size + 2];
                reader.read_exact(&mut chunk).unwrap();
                if size == 0 {
                    break;
                }
                body.extend_from_slice(&chunk[..size]);
            }
        }

        Captured {
            head,
            body: String::from_utf8(body).unwrap(),
        }
    }

    /// Serve one canned response on a loopback port.
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let captured = read_request(&stream);
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            captured
        });
        (format!("http://{addr}/markdown"), handle)
    }

    fn loopback_gateway(url: String) -> HttpGateway {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .proxy(None)
            .build()
            .into();
        HttpGateway::new().url(url).agent(agent)
    }

    #[test]
    fn test_post_sends_json_and_headers() {
        let (url, server) = serve_once("200 OK", "<h1>Hi</h1>\n");
        let gateway = loopback_gateway(url);

        let result = gateway
            .post(&RenderRequest {
                text: "# Hi".to_owned(),
                auth_token: Some("abc123".to_owned()),
            })
            .unwrap();
        let captured = server.join().unwrap();

        assert_eq!(
            result,
            RenderResult {
                status: 200,
                body: "<h1>Hi</h1>\n".to_owned(),
            }
        );
        assert!(captured.head.starts_with("post /markdown http/1.1"));
        assert!(captured.head.contains("user-agent: gitdown plugin"));
        assert!(captured.head.contains("authorization: token abc123"));
        assert!(!captured.head.contains("accept: text/html"));
        let json: serde_json::Value = serde_json::from_str(&captured.body).unwrap();
        assert_eq!(json, serde_json::json!({ "text": "# Hi" }));
    }

    #[test]
    fn test_post_without_token_omits_authorization() {
        let (url, server) = serve_once("200 OK", "<p>x</p>");
        let gateway = loopback_gateway(url).user_agent("docs-bot");

        gateway
            .post(&RenderRequest {
                text: "x".to_owned(),
                auth_token: None,
            })
            .unwrap();
        let captured = server.join().unwrap();

        assert!(!captured.head.contains("authorization:"));
        assert!(captured.head.contains("user-agent: docs-bot"));
    }

    #[test]
    fn test_post_returns_error_status_as_result() {
        let (url, server) = serve_once("422 Unprocessable Entity", "{\"message\":\"Invalid\"}");
        let gateway = loopback_gateway(url);

        let result = gateway
            .post(&RenderRequest {
                text: String::new(),
                auth_token: None,
            })
            .unwrap();
        server.join().unwrap();

        assert_eq!(result.status, 422);
        assert_eq!(result.body, "{\"message\":\"Invalid\"}");
        assert!(!result.is_success());
    }

    #[test]
    fn test_is_success_range() {
        let result = |status| RenderResult {
            status,
            body: String::new(),
        };

        assert!(result(200).is_success());
        assert!(result(299).is_success());
        assert!(!result(199).is_success());
        assert!(!result(300).is_success());
        assert!(!result(404).is_success());
    }
}
