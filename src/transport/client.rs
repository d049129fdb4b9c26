//! Authenticated HTTP client for the remote site.
//!
//! Every request carries the session cookie, never follows redirects and is
//! retried (send phase only) when it fails before the server answers.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue, LOCATION};
use reqwest::redirect::Policy;
use reqwest::{Client, Method, Response};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument, trace};
use url::Url;

use super::TransportError;
use super::constants::{
    CONNECT_TIMEOUT, DOWNLOAD_DEADLINE, DOWNLOAD_FIRST_BYTE_TIMEOUT, METADATA_TIMEOUT,
};
use super::retry::{RetryDecision, RetryPolicy, classify_error};
use crate::config::Config;
use crate::user_agent;

/// HTTP client bound to one session.
///
/// Created once per run and shared by reference, so connections are pooled
/// across the whole crawl.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    retry_policy: RetryPolicy,
}

impl HttpClient {
    /// Creates a client that sends `config`'s session cookie with every request.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Setup`] when the cookie cannot be expressed as
    /// a header value or the underlying client fails to build.
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        let mut cookie = HeaderValue::from_str(&config.cookie_header())
            .map_err(|_| TransportError::setup("session cookie contains invalid characters"))?;
        cookie.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, cookie);

        let client = Client::builder()
            .default_headers(headers)
            .redirect(Policy::none())
            .connect_timeout(CONNECT_TIMEOUT)
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .map_err(|e| TransportError::setup(e.to_string()))?;

        Ok(Self {
            client,
            retry_policy: RetryPolicy::default(),
        })
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Issues a metadata-sized request and returns the 2xx response.
    ///
    /// # Errors
    ///
    /// - [`TransportError::Redirect`] for any 3xx answer (never followed)
    /// - [`TransportError::HttpStatus`] for any other non-2xx answer
    /// - [`TransportError::Network`] / [`TransportError::Timeout`] once retries are exhausted
    #[instrument(skip(self), fields(method = %method, url = %url))]
    pub async fn fetch(&self, method: Method, url: &str) -> Result<Response, TransportError> {
        self.send(method, url, METADATA_TIMEOUT, None).await
    }

    /// Fetches an HTML page as text.
    ///
    /// # Errors
    ///
    /// Same as [`fetch`](Self::fetch), plus a network error if the body
    /// cannot be read.
    pub async fn get_text(&self, url: &str) -> Result<String, TransportError> {
        let response = self.fetch(Method::GET, url).await?;
        response
            .text()
            .await
            .map_err(|e| map_reqwest_error(url, e))
    }

    /// Issues a HEAD request, typically to read `Last-Modified`.
    ///
    /// # Errors
    ///
    /// Same as [`fetch`](Self::fetch).
    pub async fn head(&self, url: &str) -> Result<Response, TransportError> {
        self.fetch(Method::HEAD, url).await
    }

    /// Streams the body of `url` into `destination`, overwriting it in place.
    ///
    /// The destination is only opened once a 2xx response has arrived, so a
    /// refused request leaves an existing file untouched. A failure while
    /// streaming leaves whatever was written so far on disk.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Transport errors as for [`fetch`](Self::fetch) (with a 30s first-byte
    /// timeout and a 60s overall deadline), [`TransportError::Io`] when the
    /// file cannot be created, or [`TransportError::Incomplete`] when the
    /// body stream or a write fails part-way.
    #[instrument(skip(self), fields(url = %url, path = %destination.display()))]
    pub async fn download_to_path(
        &self,
        url: &str,
        destination: &Path,
    ) -> Result<u64, TransportError> {
        let response = self
            .send(
                Method::GET,
                url,
                DOWNLOAD_DEADLINE,
                Some(DOWNLOAD_FIRST_BYTE_TIMEOUT),
            )
            .await?;

        let file = File::create(destination)
            .await
            .map_err(|e| TransportError::io(destination, e))?;

        let bytes = stream_to_file(file, response, url, destination).await?;
        debug!(bytes, "body written");
        Ok(bytes)
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        timeout: Duration,
        first_byte_timeout: Option<Duration>,
    ) -> Result<Response, TransportError> {
        let parsed = Url::parse(url).map_err(|_| TransportError::invalid_url(url))?;
        let mut attempt = 1;

        loop {
            let request = self
                .client
                .request(method.clone(), parsed.clone())
                .timeout(timeout);

            let result = match first_byte_timeout {
                Some(limit) => match tokio::time::timeout(limit, request.send()).await {
                    Ok(sent) => sent.map_err(|e| map_reqwest_error(url, e)),
                    Err(_) => Err(TransportError::timeout(url)),
                },
                None => request.send().await.map_err(|e| map_reqwest_error(url, e)),
            };

            let error = match result {
                Ok(response) => return check_status(url, response),
                Err(error) => error,
            };

            match self.retry_policy.should_retry(classify_error(&error), attempt) {
                RetryDecision::Retry {
                    delay,
                    attempt: next,
                } => {
                    trace!(%error, attempt = next, "retrying request");
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt = next;
                }
                RetryDecision::DoNotRetry { reason } => {
                    trace!(%error, %reason, "request failed");
                    return Err(error);
                }
            }
        }
    }
}

fn check_status(url: &str, response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status.is_redirection() {
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        return Err(TransportError::redirect(url, status.as_u16(), location));
    }
    Err(TransportError::http_status(url, status.as_u16()))
}

fn map_reqwest_error(url: &str, error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::timeout(url)
    } else {
        TransportError::network(url, error)
    }
}

/// Copies the body into `file`.
///
/// On failure whatever was received so far is flushed to disk first, so the
/// byte count in [`TransportError::Incomplete`] matches the partial file.
async fn stream_to_file(
    file: File,
    response: Response,
    url: &str,
    path: &Path,
) -> Result<u64, TransportError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = match chunk_result {
            Ok(chunk) => chunk,
            Err(e) => {
                let source = map_reqwest_error(url, e);
                return Err(abandon(writer, path, bytes_written, source).await);
            }
        };
        if let Err(e) = writer.write_all(&chunk).await {
            return Err(abandon(writer, path, bytes_written, TransportError::io(path, e)).await);
        }
        bytes_written += chunk.len() as u64;
    }

    writer.flush().await.map_err(|e| {
        TransportError::incomplete(path, bytes_written, TransportError::io(path, e))
    })?;

    Ok(bytes_written)
}

async fn abandon(
    mut writer: BufWriter<File>,
    path: &Path,
    bytes_written: u64,
    source: TransportError,
) -> TransportError {
    if let Err(e) = writer.flush().await {
        debug!(error = %e, path = %path.display(), "could not flush partial download");
    }
    TransportError::incomplete(path, bytes_written, source)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use crate::test_support::raw_http::{RawReply, start_raw_server_or_skip};
    use crate::test_support::socket_guard::start_mock_server_or_skip;
    use tempfile::TempDir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpClient {
        let mut config = Config::new("tok123").unwrap();
        config.base_url = Url::parse(&server.uri()).unwrap();
        HttpClient::new(&config)
            .unwrap()
            .with_retry_policy(RetryPolicy::immediate(3))
    }

    #[tokio::test]
    async fn test_get_text_sends_session_cookie() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/my/"))
            .and(header("cookie", "MoodleSessionupblms=tok123"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let body = client
            .get_text(&format!("{}/my/", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_redirect_is_not_followed() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        let login = format!("{}/login/index.php", server.uri());
        Mock::given(method("GET"))
            .and(path("/my/"))
            .respond_with(ResponseTemplate::new(303).insert_header("Location", login.as_str()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/login/index.php"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.get_text(&format!("{}/my/", server.uri())).await;
        match result {
            Err(TransportError::Redirect {
                status, location, ..
            }) => {
                assert_eq!(status, 303);
                assert_eq!(location, login);
            }
            other => panic!("expected Redirect, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_status_is_not_retried() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/course/view.php"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client
            .get_text(&format!("{}/course/view.php?id=1", server.uri()))
            .await;
        assert!(matches!(
            result,
            Err(TransportError::HttpStatus { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_connection_refused_surfaces_network_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = Config::new("tok").unwrap();
        let client = HttpClient::new(&config)
            .unwrap()
            .with_retry_policy(RetryPolicy::immediate(3));

        let result = client
            .get_text(&format!("http://127.0.0.1:{port}/my/"))
            .await;
        assert!(
            matches!(result, Err(TransportError::Network { .. })),
            "expected Network error, got {result:?}"
        );
    }

    async fn attempts_until_failure(file_name: &str) -> Option<usize> {
        let server = start_raw_server_or_skip(|_| RawReply::Hangup).await?;
        let config = Config::new("tok").unwrap();
        let client = HttpClient::new(&config)
            .unwrap()
            .with_retry_policy(RetryPolicy::immediate(3));

        let result = client
            .get_text(&format!("{}/pluginfile.php/1/mod_folder/content/0/{file_name}", server.uri()))
            .await;
        assert!(
            matches!(result, Err(TransportError::Network { .. })),
            "expected Network error, got {result:?}"
        );
        Some(server.connections())
    }

    #[tokio::test]
    async fn test_dropped_connection_retried_three_times() {
        let Some(attempts) = attempts_until_failure("notes.pdf").await else {
            return;
        };
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn test_tls_words_in_url_do_not_stop_retries() {
        for name in ["tls_basics.pdf", "SSL-handshake.pdf", "certificate.txt"] {
            let Some(attempts) = attempts_until_failure(name).await else {
                return;
            };
            assert_eq!(attempts, 3, "{name} was not retried");
        }
    }

    #[tokio::test]
    async fn test_truncated_body_leaves_flushed_partial_file() {
        let Some(server) =
            start_raw_server_or_skip(|_| RawReply::truncated(100, b"abc")).await
        else {
            return;
        };
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("cut.pdf");
        let config = Config::new("tok").unwrap();
        let client = HttpClient::new(&config)
            .unwrap()
            .with_retry_policy(RetryPolicy::immediate(3));

        let result = client
            .download_to_path(&format!("{}/cut.pdf", server.uri()), &destination)
            .await;

        let Err(TransportError::Incomplete { bytes_written, .. }) = result else {
            panic!("expected Incomplete, got {result:?}");
        };
        assert_eq!(bytes_written, 3);
        assert_eq!(std::fs::read(&destination).unwrap(), b"abc");
        assert_eq!(server.connections(), 1);
    }

    #[tokio::test]
    async fn test_invalid_url_rejected_before_sending() {
        let config = Config::new("tok").unwrap();
        let client = HttpClient::new(&config).unwrap();
        let result = client.get_text("not a url").await;
        assert!(matches!(result, Err(TransportError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_head_returns_headers() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("HEAD"))
            .and(path("/pluginfile.php/1/mod_folder/content/0/a.pdf"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Last-Modified", "Fri, 05 Jan 2024 10:00:00 GMT"),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client
            .head(&format!(
                "{}/pluginfile.php/1/mod_folder/content/0/a.pdf",
                server.uri()
            ))
            .await
            .unwrap();
        assert_eq!(
            response.headers().get("last-modified").unwrap(),
            "Fri, 05 Jan 2024 10:00:00 GMT"
        );
    }

    #[tokio::test]
    async fn test_download_overwrites_destination() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("slides.pdf");
        std::fs::write(&destination, b"old content that is longer").unwrap();

        Mock::given(method("GET"))
            .and(path("/slides.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"new".to_vec()))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let bytes = client
            .download_to_path(&format!("{}/slides.pdf", server.uri()), &destination)
            .await
            .unwrap();
        assert_eq!(bytes, 3);
        assert_eq!(std::fs::read(&destination).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_failed_download_keeps_existing_file() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("slides.pdf");
        std::fs::write(&destination, b"keep me").unwrap();

        Mock::given(method("GET"))
            .and(path("/slides.pdf"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client
            .download_to_path(&format!("{}/slides.pdf", server.uri()), &destination)
            .await;
        assert!(matches!(
            result,
            Err(TransportError::HttpStatus { status: 404, .. })
        ));
        assert_eq!(std::fs::read(&destination).unwrap(), b"keep me");
    }

    #[tokio::test]
    async fn test_download_into_missing_directory_is_io_error() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("missing").join("a.pdf");

        Mock::given(method("GET"))
            .and(path("/a.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client
            .download_to_path(&format!("{}/a.pdf", server.uri()), &destination)
            .await;
        assert!(matches!(result, Err(TransportError::Io { .. })));
    }
}
