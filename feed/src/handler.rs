use crate::config::Capabilities;
use crate::errors::{FeedError, Result};
use crate::metrics_defs::{FEED_ITEMS, FEED_REQUESTS};
use crate::model::{ErrorBody, FeedEnvelope, FeedItem, PingResponse};
use crate::normalize::normalize_page;
use crate::notion::RecordSource;
use crate::notion::types::Page;
use crate::params::FeedParams;
use chrono::{SecondsFormat, Utc};
use http::{Method, Request, Response, StatusCode};
use hyper::body::Bytes;
use shared::cors::CorsPolicy;
use shared::http::{empty_response, json_response};
use shared::{counter, histogram};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Paths answered by the feed. `/api/feed` is kept for clients of the serverless deployment.
pub const FEED_PATHS: &[&str] = &["/feed", "/feed/", "/api/feed", "/api/feed/"];

pub struct FeedHandler {
    source: Arc<dyn RecordSource>,
    capabilities: Capabilities,
    version: String,
    cors: CorsPolicy,
}

impl FeedHandler {
    pub fn new(
        source: Arc<dyn RecordSource>,
        capabilities: Capabilities,
        version: impl Into<String>,
    ) -> Self {
        FeedHandler {
            source,
            capabilities,
            version: version.into(),
            cors: CorsPolicy::permissive(),
        }
    }

    /// Answers one request. Only the method, path and query are read.
    ///
    /// Errors never escape: they become JSON bodies, and every response carries
    /// the CORS headers.
    pub async fn handle<B>(&self, request: &Request<B>) -> Response<Bytes> {
        let mut response = match self.respond(request).await {
            Ok(response) => response,
            Err(e) => self.error_response(&e),
        };

        self.cors.apply(response.headers_mut());
        counter!(FEED_REQUESTS, "status" => response.status().as_str().to_owned()).increment(1);
        response
    }

    async fn respond<B>(&self, request: &Request<B>) -> Result<Response<Bytes>> {
        if !FEED_PATHS.contains(&request.uri().path()) {
            return Ok(json_response(
                StatusCode::NOT_FOUND,
                &ErrorBody {
                    error: "Not found".into(),
                },
            )?);
        }

        match request.method() {
            &Method::OPTIONS => return Ok(empty_response(StatusCode::NO_CONTENT)),
            &Method::GET | &Method::HEAD => {}
            _ => {
                return Ok(json_response(
                    StatusCode::METHOD_NOT_ALLOWED,
                    &ErrorBody {
                        error: "Method not allowed".into(),
                    },
                )?);
            }
        }

        let params = FeedParams::from_query(request.uri().query());

        if params.ping && self.capabilities.ping {
            return Ok(json_response(StatusCode::OK, &self.ping())?);
        }

        let database_id = params
            .database_id
            .ok_or_else(|| FeedError::InvalidRequest("Missing database_id".into()))?;

        let pages = self.source.query(&database_id, &params.comptes).await?;
        let envelope = assemble(&pages, self.capabilities);
        histogram!(FEED_ITEMS).record(envelope.total as f64);

        Ok(json_response(StatusCode::OK, &envelope)?)
    }

    fn ping(&self) -> PingResponse {
        PingResponse {
            ok: true,
            endpoint: "feed",
            version: self.version.clone(),
            time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    fn error_response(&self, error: &FeedError) -> Response<Bytes> {
        let status = error.status();
        if status.is_server_error() {
            tracing::error!(error = %error, "feed request failed");
        } else {
            tracing::debug!(error = %error, "rejected feed request");
        }

        let body = ErrorBody {
            error: error.public_message(),
        };
        json_response(status, &body).unwrap_or_else(|_| empty_response(status))
    }
}

/// Normalizes the fetched rows and builds the response envelope.
///
/// Items without media are dropped. The rest are ordered newest first by
/// comparing dates as strings, so undated items come last. Ties keep Notion's order.
pub fn assemble(pages: &[Page], capabilities: Capabilities) -> FeedEnvelope {
    let mut items: Vec<FeedItem> = pages
        .iter()
        .map(normalize_page)
        .filter(|item| !item.files.is_empty())
        .collect();

    if !capabilities.format {
        for item in &mut items {
            item.format = None;
        }
    }

    items.sort_by(|a, b| b.date_key().cmp(a.date_key()));

    let comptes: BTreeSet<&str> = items
        .iter()
        .flat_map(|item| item.comptes.iter().map(String::as_str))
        .collect();
    let comptes = comptes.into_iter().map(String::from).collect();

    let formats = capabilities.format.then(|| {
        let formats: BTreeSet<&str> = items.iter().filter_map(|item| item.format.as_deref()).collect();
        formats.into_iter().map(String::from).collect()
    });

    FeedEnvelope {
        ok: true,
        total: items.len(),
        comptes,
        formats,
        items,
    }
}
