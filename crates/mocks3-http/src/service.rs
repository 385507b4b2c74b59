//! The main S3 HTTP service implementing hyper's `Service` trait.
//!
//! [`S3HttpService`] ties together the middleware, routing, dispatch, and
//! response encoding into a single hyper-compatible service:
//!
//! 1. CORS preflight interception (`OPTIONS`)
//! 2. Time-skew guard (`x-amz-date`)
//! 3. Routing via [`S3Router`]
//! 4. Request body collection
//! 5. Operation dispatch to the [`S3Handler`]
//! 6. Common response headers (`x-amz-request-id`, `Server`, CORS)
//! 7. Error response formatting (status only for `HEAD`)

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime, Utc};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::service::Service;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use mocks3_model::clock::{Clock, SystemClock};
use mocks3_model::error::S3Error;
use mocks3_model::s3_error;

use crate::body::S3ResponseBody;
use crate::dispatch::{S3Handler, dispatch_operation};
use crate::response::error_to_response;
use crate::router::S3Router;

/// The format of the `x-amz-date` header.
const AMZ_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Configuration for the S3 HTTP service.
#[derive(Debug, Clone)]
pub struct S3HttpConfig {
    /// The base domain for virtual-hosted-style requests (e.g. `s3.localhost`).
    pub domain: String,
    /// Whether to enable virtual-hosted-style bucket addressing.
    pub virtual_hosting: bool,
    /// Maximum tolerated difference between `x-amz-date` and the server
    /// clock. `None` disables the check.
    pub skew_limit: Option<Duration>,
}

impl Default for S3HttpConfig {
    fn default() -> Self {
        Self {
            domain: "s3.localhost".to_owned(),
            virtual_hosting: false,
            skew_limit: Some(Duration::from_secs(15 * 60)),
        }
    }
}

/// The S3 HTTP service.
///
/// Processes requests through the full S3 lifecycle: middleware, routing,
/// dispatch to the handler, and response formatting.
pub struct S3HttpService<H: S3Handler> {
    handler: Arc<H>,
    router: S3Router,
    config: Arc<S3HttpConfig>,
    clock: Arc<dyn Clock>,
}

impl<H: S3Handler> std::fmt::Debug for S3HttpService<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3HttpService")
            .field("router", &self.router)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<H: S3Handler> S3HttpService<H> {
    /// Create a new service with the given handler and configuration,
    /// using the wall clock.
    #[must_use]
    pub fn new(handler: H, config: S3HttpConfig) -> Self {
        Self::with_clock(handler, config, Arc::new(SystemClock))
    }

    /// Create a new service with an explicit clock.
    ///
    /// Tests share one clock between the service and the engine so the
    /// time-skew guard and stored timestamps agree.
    #[must_use]
    pub fn with_clock(handler: H, config: S3HttpConfig, clock: Arc<dyn Clock>) -> Self {
        let router = S3Router::new(&config.domain, config.virtual_hosting);
        Self {
            handler: Arc::new(handler),
            router,
            config: Arc::new(config),
            clock,
        }
    }

    /// Process one request through the full S3 pipeline.
    ///
    /// This is the transport-independent entry point: the hyper `Service`
    /// impl and in-process tests both land here.
    pub async fn process<B>(&self, req: http::Request<B>) -> http::Response<S3ResponseBody>
    where
        B: http_body::Body,
        B::Error: std::fmt::Display,
    {
        let request_id = Uuid::new_v4().to_string();
        let head = req.method() == http::Method::HEAD;

        let mut response = self.process_request(req, &request_id).await;

        if head {
            strip_body(&mut response);
        }

        add_common_headers(response, &request_id)
    }

    /// Run the request pipeline, producing either a success response or a
    /// rendered error document.
    async fn process_request<B>(
        &self,
        req: http::Request<B>,
        request_id: &str,
    ) -> http::Response<S3ResponseBody>
    where
        B: http_body::Body,
        B::Error: std::fmt::Display,
    {
        let method = req.method().clone();
        let uri = req.uri().clone();
        debug!(%method, %uri, request_id, "processing S3 request");

        // 1. CORS preflight.
        if method == http::Method::OPTIONS {
            return cors_preflight_response();
        }

        // 2. Time-skew guard.
        if let Some(limit) = self.config.skew_limit {
            if let Err(err) = check_time_skew(req.headers(), self.clock.now(), limit) {
                warn!(%method, %uri, request_id, "request time too skewed");
                return error_to_response(&err, request_id);
            }
        }

        // 3. Route.
        let ctx = match self.router.resolve(&req) {
            Ok(ctx) => ctx,
            Err(err) => {
                warn!(%method, %uri, error = %err, request_id, "failed to route S3 request");
                return error_to_response(&err, request_id);
            }
        };

        info!(
            operation = %ctx.operation,
            bucket = ?ctx.bucket,
            key = ?ctx.key,
            request_id,
            "routed S3 request"
        );

        // 4. Collect body.
        let (parts, body) = req.into_parts();
        let body = match collect_body(body).await {
            Ok(body) => body,
            Err(err) => {
                error!(error = %err, request_id, "failed to collect request body");
                let s3_err = S3Error::internal_error("failed to read request body");
                return error_to_response(&s3_err, request_id);
            }
        };

        // 5. Dispatch.
        match dispatch_operation(self.handler.as_ref(), parts, body, ctx).await {
            Ok(response) => response,
            Err(err) => {
                debug!(error = %err, request_id, "S3 operation returned error");
                return error_to_response(&err, request_id);
            }
        }
    }

    /// Serve connections from the listener until the shutdown future
    /// completes, then drain in-flight requests.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from accepting connections.
    pub async fn serve_with_shutdown(
        self,
        listener: tokio::net::TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> std::io::Result<()> {
        let graceful = hyper_util::server::graceful::GracefulShutdown::new();
        let http = HttpConnBuilder::new(TokioExecutor::new());

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                result = listener.accept() => {
                    let (stream, peer_addr) = match result {
                        Ok(conn) => conn,
                        Err(e) => {
                            warn!(error = %e, "failed to accept connection");
                            continue;
                        }
                    };

                    let svc = self.clone();
                    let conn = http.serve_connection(TokioIo::new(stream), svc);
                    let conn = graceful.watch(conn.into_owned());

                    tokio::spawn(async move {
                        if let Err(e) = conn.await {
                            error!(peer_addr = %peer_addr, error = %e, "connection error");
                        }
                    });
                }

                () = &mut shutdown => {
                    info!("shutting down, draining connections");
                    break;
                }
            }
        }

        graceful.shutdown().await;
        Ok(())
    }

    /// Serve connections from the listener until the task is dropped.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from accepting connections.
    pub async fn serve(self, listener: tokio::net::TcpListener) -> std::io::Result<()> {
        self.serve_with_shutdown(listener, std::future::pending())
            .await
    }
}

impl<H: S3Handler> Clone for S3HttpService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            router: self.router.clone(),
            config: Arc::clone(&self.config),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<H: S3Handler> Service<http::Request<Incoming>> for S3HttpService<H> {
    type Response = http::Response<S3ResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let service = self.clone();
        Box::pin(async move { Ok(service.process(req).await) })
    }
}

/// Collect the full request body into `Bytes`.
async fn collect_body<B>(body: B) -> Result<Bytes, B::Error>
where
    B: http_body::Body,
{
    let collected = body.collect().await?;
    Ok(collected.to_bytes())
}

/// Check the `x-amz-date` header against the server clock.
///
/// A header that fails to parse is tolerated; only a successfully parsed
/// time outside the limit rejects the request.
fn check_time_skew(
    headers: &http::HeaderMap,
    now: DateTime<Utc>,
    limit: Duration,
) -> Result<(), S3Error> {
    let Some(raw) = headers.get("x-amz-date").and_then(|v| v.to_str().ok()) else {
        return Ok(());
    };

    let Ok(parsed) = NaiveDateTime::parse_from_str(raw, AMZ_DATE_FORMAT) else {
        return Ok(());
    };
    let request_time = parsed.and_utc();

    let limit = chrono::Duration::from_std(limit).unwrap_or(chrono::Duration::MAX);
    let skew = now.signed_duration_since(request_time);

    if skew < -limit || skew > limit {
        return Err(s3_error!(RequestTimeTooSkewed).with_resource(raw));
    }
    Ok(())
}

/// Drop the response body, keeping status and headers.
///
/// `HEAD` replies carry status and headers only, including for errors.
fn strip_body(response: &mut http::Response<S3ResponseBody>) {
    *response.body_mut() = S3ResponseBody::empty();
    response.headers_mut().remove(http::header::CONTENT_TYPE);
}

/// Produce a CORS preflight response.
fn cors_preflight_response() -> http::Response<S3ResponseBody> {
    let mut response = http::Response::new(S3ResponseBody::empty());
    *response.status_mut() = http::StatusCode::OK;
    response
}

/// Add the headers every S3 response carries.
fn add_common_headers(
    mut response: http::Response<S3ResponseBody>,
    request_id: &str,
) -> http::Response<S3ResponseBody> {
    let headers = response.headers_mut();

    if let Ok(hv) = http::header::HeaderValue::from_str(request_id) {
        headers.insert("x-amz-request-id", hv.clone());
        headers.insert("x-amz-id-2", hv);
    }

    headers.insert("Server", http::header::HeaderValue::from_static("AmazonS3"));

    // Permissive CORS on every response.
    headers.insert(
        "Access-Control-Allow-Origin",
        http::header::HeaderValue::from_static("*"),
    );
    headers.insert(
        "Access-Control-Allow-Methods",
        http::header::HeaderValue::from_static("GET, PUT, POST, DELETE, HEAD"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        http::header::HeaderValue::from_static(
            "Authorization, Content-Type, Content-MD5, Content-Length, x-amz-date, x-amz-meta-*",
        ),
    );
    headers.insert(
        "Access-Control-Expose-Headers",
        http::header::HeaderValue::from_static("Last-Modified, Content-Length, ETag"),
    );

    response
}
