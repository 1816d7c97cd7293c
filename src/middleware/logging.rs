use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use percent_encoding::percent_decode_str;
use reqwest::{Request, Response, StatusCode};
use tower::{Layer, Service};

/// Query parameters that carry credentials or profile data.
const SENSITIVE_FIELDS: &[&str] = &["api_key", "token", "data", "emails", "phone_numbers"];

/// Profile updates carry every property in the query string.
const PERSON_PATH: &str = "/api/v1/person/";

/// Logs every Klaviyo request with its status and latency.
///
/// Credentials, profile identifiers and `$` profile fields in the query
/// string are replaced by `[REDACTED]`, as is every parameter sent to the
/// person endpoint. Successful calls log at `info` (or `debug` when verbose);
/// non-2xx responses and transport failures log at `warn`.
#[derive(Clone, Default)]
pub struct LoggingMiddleware {
    verbose: bool,
}

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self { verbose: false }
    }

    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }
}

impl<S> Layer<S> for LoggingMiddleware {
    type Service = LoggingMiddlewareService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoggingMiddlewareService {
            inner,
            verbose: self.verbose,
        }
    }
}

#[derive(Clone)]
pub struct LoggingMiddlewareService<S> {
    inner: S,
    verbose: bool,
}

impl<S> LoggingMiddlewareService<S> {
    fn redact_url(url: &str) -> String {
        let Some((base, query)) = url.split_once('?') else {
            return url.to_string();
        };

        let redact_all = base.contains(PERSON_PATH);
        let redacted: Vec<String> = query
            .split('&')
            .map(|param| match param.split_once('=') {
                Some((key, _)) if redact_all || Self::is_sensitive(key) => {
                    format!("{key}=[REDACTED]")
                }
                _ => param.to_string(),
            })
            .collect();

        format!("{}?{}", base, redacted.join("&"))
    }

    /// `key` as it appears on the wire, e.g. `%24email`.
    fn is_sensitive(key: &str) -> bool {
        let key = percent_decode_str(key).decode_utf8_lossy();
        key.starts_with('$') || SENSITIVE_FIELDS.iter().any(|s| key.eq_ignore_ascii_case(s))
    }

    fn log_outcome(
        method: &str,
        url: &str,
        status: StatusCode,
        elapsed: Duration,
        verbose: bool,
    ) {
        let reason = status.canonical_reason().unwrap_or("");
        if !status.is_success() {
            warn!(
                "[Klaviyo] {} {} -> {} {} ({:?})",
                method,
                url,
                status.as_u16(),
                reason,
                elapsed
            );
        } else if verbose {
            debug!(
                "[Klaviyo] {} {} -> {} {} ({:?})",
                method,
                url,
                status.as_u16(),
                reason,
                elapsed
            );
        } else {
            info!("[Klaviyo] {} {} -> {} ({:?})", method, url, status.as_u16(), elapsed);
        }
    }
}

impl<S> Service<Request> for LoggingMiddlewareService<S>
where
    S: Service<Request, Response = Response, Error = reqwest::Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = reqwest::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let method = req.method().to_string();
        let url = Self::redact_url(req.url().as_str());
        let verbose = self.verbose;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if verbose {
                debug!("[Klaviyo] >>> {} {}", method, url);
            }

            let start = Instant::now();
            match inner.call(req).await {
                Ok(response) => {
                    Self::log_outcome(&method, &url, response.status(), start.elapsed(), verbose);
                    Ok(response)
                }
                Err(e) => {
                    let kind = if e.is_timeout() { "timed out" } else { "failed" };
                    warn!(
                        "[Klaviyo] {} {} {} after {:?}: {}",
                        method,
                        url,
                        kind,
                        start.elapsed(),
                        e
                    );
                    Err(e)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Client;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[test]
    fn test_redact_url_no_query() {
        let url = "https://a.klaviyo.com/api/v2/lists";
        assert_eq!(LoggingMiddlewareService::<()>::redact_url(url), url);
    }

    #[test]
    fn test_redact_url_no_sensitive_params() {
        let url = "https://a.klaviyo.com/api/v2/group/XyZ123/members/all?marker=3456";
        let redacted = LoggingMiddlewareService::<()>::redact_url(url);
        assert_eq!(redacted, url);
    }

    #[test]
    fn test_redact_url_with_api_key() {
        let url = "https://a.klaviyo.com/api/v2/lists?api_key=pk_secret&marker=1";
        let redacted = LoggingMiddlewareService::<()>::redact_url(url);
        assert!(redacted.contains("api_key=[REDACTED]"));
        assert!(redacted.contains("marker=1"));
        assert!(!redacted.contains("pk_secret"));
    }

    #[test]
    fn test_redact_url_with_identify_data() {
        let url = "https://a.klaviyo.com/api/identify?data=eyJ0b2tlbiI6IkFiQzEyMyJ9";
        let redacted = LoggingMiddlewareService::<()>::redact_url(url);
        assert_eq!(redacted, "https://a.klaviyo.com/api/identify?data=[REDACTED]");
    }

    #[test]
    fn test_redact_url_with_member_emails() {
        let url = "https://a.klaviyo.com/api/v2/list/XyZ123/members?api_key=pk&emails=a%40example.com&emails=b%40example.com";
        let redacted = LoggingMiddlewareService::<()>::redact_url(url);
        assert!(!redacted.contains("example.com"));
        assert_eq!(redacted.matches("emails=[REDACTED]").count(), 2);
    }

    #[test]
    fn test_redact_url_profile_update() {
        let client = Client::new();
        let req = client
            .put("https://a.klaviyo.com/api/v1/person/01ABC")
            .query(&[
                ("api_key", "pk_secret"),
                ("$email", "dev@example.com"),
                ("$phone_number", "+16045550100"),
                ("LikesGold", "true"),
            ])
            .build()
            .unwrap();

        let redacted = LoggingMiddlewareService::<()>::redact_url(req.url().as_str());
        assert!(!redacted.contains("pk_secret"));
        assert!(!redacted.contains("example.com"));
        assert!(!redacted.contains("16045550100"));
        assert!(redacted.contains("%24email=[REDACTED]"));
        assert!(redacted.contains("LikesGold=[REDACTED]"));
    }

    #[test]
    fn test_redact_url_encoded_dollar_key_elsewhere() {
        let url = "https://a.klaviyo.com/api/v2/lists?%24email=dev%40example.com&marker=7";
        let redacted = LoggingMiddlewareService::<()>::redact_url(url);
        assert_eq!(
            redacted,
            "https://a.klaviyo.com/api/v2/lists?%24email=[REDACTED]&marker=7"
        );
    }

    #[tokio::test]
    async fn test_logging_middleware_passes_response_through() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await.unwrap();

            let response = "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
            socket.write_all(response.as_bytes()).await.unwrap();
        });

        let client = Client::builder().build().unwrap();
        let mut service = LoggingMiddleware::new().verbose().layer(client.clone());

        let url = format!("http://{}/api/v1/person/01ABC?api_key=pk_secret123", addr);
        let req = client.get(&url).build().unwrap();

        let response = service.call(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_logging_middleware_propagates_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::builder().build().unwrap();
        let mut service = LoggingMiddleware::new().layer(client.clone());

        let req = client
            .get(format!("http://{}/api/v2/lists", addr))
            .build()
            .unwrap();

        assert!(service.call(req).await.is_err());
    }
}
