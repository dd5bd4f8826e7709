//! Request-time redirect resolution.
//!
//! # Responsibilities
//! - Normalize the inbound request path
//! - Look up an active rule for it (one read, never a write)
//! - On a hit, answer `301 Moved Permanently` before any content handler runs
//! - On a miss or a storage failure, hand the request on untouched

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use url::Url;

use crate::observability::metrics;
use crate::redirects::path::normalize;
use crate::redirects::rule::RedirectRule;
use crate::redirects::store::{RedirectStore, StoreError};

/// A resolved redirect for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub rule: RedirectRule,
    /// Absolute destination: site base URL followed by the rule's new path.
    pub location: String,
}

/// Decides, per request, whether to short-circuit with a redirect.
#[derive(Clone)]
pub struct RedirectResolver {
    store: Arc<dyn RedirectStore>,
    base_url: Arc<str>,
}

impl RedirectResolver {
    pub fn new(store: Arc<dyn RedirectStore>, base_url: &str) -> Self {
        Self {
            store,
            base_url: Arc::from(base_url.trim_end_matches('/')),
        }
    }

    /// Resolve a raw request path against the active rules.
    pub async fn resolve(&self, raw_path: &str) -> Result<Option<Redirect>, StoreError> {
        let path = normalize(raw_path);
        let rule = self.store.lookup_active(&path).await?;
        Ok(rule.map(|rule| Redirect {
            location: format!("{}{}", self.base_url, rule.new_path),
            rule,
        }))
    }
}

/// Middleware that answers matching requests with a permanent redirect.
pub async fn redirect_middleware(
    State(resolver): State<RedirectResolver>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    match resolver.resolve(&path).await {
        Ok(Some(redirect)) => match location_header(&redirect.location) {
            Some(location) => {
                tracing::info!(
                    path = %path,
                    rule_id = %redirect.rule.id,
                    location = %redirect.location,
                    "Redirecting"
                );
                metrics::record_lookup("hit");
                (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
            }
            None => {
                tracing::warn!(
                    rule_id = %redirect.rule.id,
                    location = %redirect.location,
                    "Redirect destination is not a valid Location header"
                );
                metrics::record_lookup("error");
                next.run(request).await
            }
        },
        Ok(None) => {
            metrics::record_lookup("miss");
            next.run(request).await
        }
        Err(e) => {
            tracing::error!(path = %path, error = %e, "Redirect lookup failed");
            metrics::record_lookup("error");
            next.run(request).await
        }
    }
}

/// Build a `Location` value, percent-encoding non-ASCII destinations.
fn location_header(location: &str) -> Option<HeaderValue> {
    if location.is_ascii() {
        return HeaderValue::from_str(location).ok();
    }
    let url = Url::parse(location).ok()?;
    HeaderValue::from_str(url.as_str()).ok()
}
