// One-shot local listener that captures the OAuth redirect
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{TrackerError, TrackerResult};

const SUCCESS_HTML: &str =
    "<html><body><h1>Authorization code received!</h1><p>You can close this window.</p></body></html>";
const DENIED_HTML: &str =
    "<html><body><h1>Authorization failed</h1><p>You can close this window and retry.</p></body></html>";
const NOT_FOUND_HTML: &str = "<html><body><h1>Not found</h1></body></html>";
const MAX_HEADER_LINES: usize = 100;
const MAX_LINE_BYTES: u64 = 8 * 1024;
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// What a single inbound request to the listener amounted to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    Code(String),
    Denied(String),
    /// Wrong path or no `code` (favicon requests, probes); keep waiting
    Ignored,
}

pub struct CallbackListener {
    listener: TcpListener,
    callback_path: String,
}

impl CallbackListener {
    /// Bind to the host and port of the redirect URI
    pub async fn bind(redirect_uri: &str) -> TrackerResult<Self> {
        let url = Url::parse(redirect_uri)
            .map_err(|e| TrackerError::Config(format!("oauth.redirect_uri: {}", e)))?;
        let host = match url.host_str() {
            Some("localhost") | None => "127.0.0.1".to_string(),
            Some(host) => host.trim_start_matches('[').trim_end_matches(']').to_string(),
        };
        let port = url.port_or_known_default().unwrap_or(80);

        let listener = TcpListener::bind((host.as_str(), port)).await?;
        info!("👂 Waiting for OAuth redirect on {}:{}{}", host, port, url.path());

        Ok(Self {
            listener,
            callback_path: url.path().to_string(),
        })
    }

    pub fn local_port(&self) -> TrackerResult<u16> {
        Ok(self.listener.local_addr()?.port())
    }

    /// Serve requests on a background task until one carries a code (or an
    /// error). The result is handed back through the returned channel.
    pub fn spawn(self) -> oneshot::Receiver<TrackerResult<String>> {
        let (sender, receiver) = oneshot::channel();
        tokio::spawn(async move {
            let result = self.accept_until_code().await;
            let _ = sender.send(result);
        });
        receiver
    }

    /// Block until a code arrives or `timeout` elapses
    pub async fn wait(self, timeout: Duration) -> TrackerResult<String> {
        let receiver = self.spawn();
        match tokio::time::timeout(timeout, receiver).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(TrackerError::Io(std::io::Error::other(
                "callback listener stopped unexpectedly",
            ))),
            Err(_) => Err(TrackerError::AuthTimeout(timeout.as_secs())),
        }
    }

    async fn accept_until_code(self) -> TrackerResult<String> {
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (socket, peer) = accepted?;
                    debug!("Callback connection from {}", peer);
                    let outcome_tx = outcome_tx.clone();
                    let callback_path = self.callback_path.clone();
                    // Each connection on its own task, bounded by CONNECTION_TIMEOUT
                    tokio::spawn(async move {
                        let outcome =
                            tokio::time::timeout(CONNECTION_TIMEOUT, handle_connection(socket, &callback_path)).await;
                        let _ = outcome_tx.send((peer, outcome));
                    });
                }
                Some((peer, outcome)) = outcome_rx.recv() => match outcome {
                    Ok(Ok(CallbackOutcome::Code(code))) => return Ok(code),
                    Ok(Ok(CallbackOutcome::Denied(reason))) => return Err(TrackerError::AuthDenied(reason)),
                    Ok(Ok(CallbackOutcome::Ignored)) => {}
                    Ok(Err(e)) => warn!("⚠️ Bad callback request from {}: {}", peer, e),
                    Err(_) => debug!("Callback connection from {} timed out", peer),
                },
            }
        }
    }
}

async fn handle_connection(socket: TcpStream, callback_path: &str) -> TrackerResult<CallbackOutcome> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);
    let mut request_line = String::new();
    (&mut reader).take(MAX_LINE_BYTES).read_line(&mut request_line).await?;

    // Closing with unread input would reset the connection, so drain headers
    let mut header = String::new();
    for _ in 0..MAX_HEADER_LINES {
        header.clear();
        if (&mut reader).take(MAX_LINE_BYTES).read_line(&mut header).await? == 0 || header.trim().is_empty() {
            break;
        }
    }

    let mut parts = request_line.split_whitespace();
    let outcome = match (parts.next(), parts.next()) {
        (Some("GET"), Some(target)) => parse_callback_target(target, callback_path),
        _ => CallbackOutcome::Ignored,
    };

    let (status, body) = match &outcome {
        CallbackOutcome::Code(_) => ("200 OK", SUCCESS_HTML),
        CallbackOutcome::Denied(_) => ("400 Bad Request", DENIED_HTML),
        CallbackOutcome::Ignored => ("404 Not Found", NOT_FOUND_HTML),
    };
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let _ = writer.write_all(response.as_bytes()).await;
    let _ = writer.shutdown().await;

    Ok(outcome)
}

/// Interpret a request target such as `/callback?code=abc`.
pub fn parse_callback_target(target: &str, callback_path: &str) -> CallbackOutcome {
    let Ok(url) = Url::parse(&format!("http://127.0.0.1{}", target)) else {
        return CallbackOutcome::Ignored;
    };
    if url.path() != callback_path {
        return CallbackOutcome::Ignored;
    }

    let mut code = None;
    let mut error = None;
    let mut error_description = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" if !value.is_empty() => code = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            "error_description" => error_description = Some(value.into_owned()),
            _ => {}
        }
    }

    match (code, error) {
        (Some(code), _) => CallbackOutcome::Code(code),
        (None, Some(error)) => CallbackOutcome::Denied(match error_description {
            Some(description) => format!("{}: {}", error, description),
            None => error,
        }),
        (None, None) => CallbackOutcome::Ignored,
    }
}

/// Accept either a bare code or a pasted redirect URL and return the code.
pub fn extract_code(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if input.contains("://") || input.starts_with('/') || input.contains("code=") {
        let url = if input.contains("://") {
            Url::parse(input).ok()?
        } else {
            let query = input.split_once('?').map(|(_, q)| q).unwrap_or(input);
            Url::parse(&format!("http://127.0.0.1/?{}", query)).ok()?
        };
        return url
            .query_pairs()
            .find(|(key, value)| key == "code" && !value.is_empty())
            .map(|(_, value)| value.into_owned());
    }
    Some(input.to_string())
}
