//! Controller API client.
//!
//! One authenticated `GET {endpoint}/api/v1/applications` per target per
//! cycle, bounded by a request timeout. No retries: a failed fetch is
//! reported and the next attempt happens on the next cycle.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use syncwatch_core::{RawAppRecord, TargetDescriptor};

use crate::error::{FetchError, FetchResult};

/// Source of application listings, one call per target per cycle.
///
/// [`HttpAppSource`] talks to real controllers; tests plug in scripted
/// sources.
pub trait AppSource: Send + Sync + 'static {
    fn fetch(
        &self,
        target: &TargetDescriptor,
    ) -> impl Future<Output = FetchResult<Vec<RawAppRecord>>> + Send;
}

/// HTTP(S) client for the controller REST API.
#[derive(Debug, Clone)]
pub struct HttpAppSource {
    client: reqwest::Client,
}

impl HttpAppSource {
    /// Build a client with the given per-request timeout.
    ///
    /// With `tls_verify == false` certificate and hostname checks are
    /// skipped, which is how self-signed in-cluster controllers are
    /// usually reached. The bearer token is still sent.
    pub fn new(timeout: Duration, tls_verify: bool) -> Result<Self, reqwest::Error> {
        if !tls_verify {
            warn!("TLS certificate verification disabled for controller endpoints");
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(!tls_verify)
            .user_agent(concat!("syncwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

impl AppSource for HttpAppSource {
    async fn fetch(&self, target: &TargetDescriptor) -> FetchResult<Vec<RawAppRecord>> {
        let url = target.applications_url();
        let transport = |source| FetchError::Transport {
            target: target.endpoint.clone(),
            source,
        };

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&target.credential)
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if !status.is_success() {
            debug!(%url, %status, "application listing non-2xx");
            return Err(FetchError::Status {
                target: target.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await.map_err(transport)?;
        let decode = |reason: String| FetchError::Decode {
            target: target.endpoint.clone(),
            reason,
        };
        let doc: Value = serde_json::from_slice(&body).map_err(|e| decode(e.to_string()))?;
        extract_items(doc).map_err(decode)
    }
}

/// Pull the `items` array out of a listing document.
///
/// A missing or `null` `items` means an empty listing.
fn extract_items(doc: Value) -> Result<Vec<RawAppRecord>, String> {
    match doc {
        Value::Object(mut map) => match map.remove("items") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(format!("`items` is {}, expected an array", kind(&other))),
        },
        other => Err(format!("expected a JSON object, got {}", kind(&other))),
    }
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
