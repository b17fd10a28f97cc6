//! Minimal tome example — buffered request logging around a raw hyper service.
//!
//! Run with:
//!   cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/
//!   curl http://localhost:3000/missing
//!
//! Every request prints exactly one JSON event to stdout. The classic
//! common-log line is wired in as well, but silenced for every request the
//! middleware already logged — delete the middleware and it comes back.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::Full;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{error, info};

use tome::silence::{AccessEntry, AccessLog, CommonLog};
use tome::{FieldSpec, FieldValue, RequestExt, RequestInfo, Settings, TagSpec};

type Body = Full<Bytes>;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = Settings::default()
        .request_fields(FieldSpec::entries([
            ("method", FieldValue::computed(|req: &RequestInfo| json!(req.method().as_str()))),
            ("path", FieldValue::computed(|req: &RequestInfo| json!(req.path()))),
        ]))
        .request_tags(["demo"].into_iter().collect::<TagSpec<_>>())
        .response_fields(FieldSpec::computed(|headers: &http::HeaderMap| {
            let content_type = headers
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");
            vec![("content_type".to_owned(), FieldValue::literal(content_type))]
        }));

    // The host "ships" a common logger; register silences it for requests the
    // middleware logs. Swap `Some(...)` for `None` to drop it entirely.
    let legacy: Box<dyn AccessLog> = Box::new(CommonLog::stdout());
    let (middleware, access_log) = tome::setup::register(handler, settings, Some(legacy));

    let middleware = Arc::new(middleware);
    let access_log: Option<Arc<dyn AccessLog>> = access_log.map(Arc::from);

    let listener = TcpListener::bind("0.0.0.0:3000").await.expect("bind failed");
    info!("tome demo listening on 0.0.0.0:3000");

    loop {
        let (stream, remote) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                error!("accept error: {e}");
                continue;
            }
        };

        let middleware = Arc::clone(&middleware);
        let access_log = access_log.clone();

        tokio::spawn(async move {
            let svc = service_fn(move |req: http::Request<hyper::body::Incoming>| {
                let middleware = Arc::clone(&middleware);
                let access_log = access_log.clone();
                async move {
                    // The access logger wraps the middleware the way a host's
                    // default logging middleware would sit outside it.
                    let method = req.method().clone();
                    let path = req.uri().path().to_owned();
                    let version = req.version();
                    let start = Instant::now();

                    let res = middleware.call(req).await;

                    if let Some(log) = &access_log {
                        log.log(&AccessEntry {
                            remote: Some(remote),
                            method: &method,
                            path: &path,
                            version,
                            status: res.status(),
                            elapsed: start.elapsed(),
                            extensions: res.extensions(),
                        });
                    }
                    Ok::<_, Infallible>(res)
                }
            });

            if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                .serve_connection(TokioIo::new(stream), svc)
                .await
            {
                error!(peer = %remote, "connection error: {e}");
            }
        });
    }
}

async fn handler(req: http::Request<hyper::body::Incoming>) -> http::Response<Body> {
    let logger = req.logger();

    match req.uri().path() {
        "/" => {
            logger.info("saying hello");
            response(200, "Hello world!\n")
        }
        path => {
            logger.warn(format!("no route for {path}"));
            response(404, "not found\n")
        }
    }
}

fn response(status: u16, body: &'static str) -> http::Response<Body> {
    http::Response::builder()
        .status(status)
        .header("content-type", "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .expect("static response parts are valid")
}
