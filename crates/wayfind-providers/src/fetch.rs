//! Low-level HTTP helpers shared by the provider adapters.

use std::time::Duration;

use reqwest::Url;

use crate::error::ProviderError;

/// Build the shared HTTP client every adapter clones.
///
/// Only the connect timeout is set here; per-call deadlines are enforced by
/// the engine.
///
/// # Errors
///
/// Returns [`ProviderError::Http`] if the TLS backend cannot be initialised.
pub fn build_http_client(
    user_agent: &str,
    connect_timeout_secs: u64,
) -> Result<reqwest::Client, ProviderError> {
    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .build()?;
    Ok(client)
}

/// Parse and normalise an adapter base URL. A trailing slash is stripped so
/// endpoint paths can be appended with `format!`.
pub(crate) fn parse_base_url(raw: &str) -> Result<String, ProviderError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| ProviderError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ProviderError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(trimmed.to_string())
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> Result<Url, ProviderError> {
    let joined = format!("{base_url}{path}");
    Url::parse(&joined).map_err(|e| ProviderError::InvalidBaseUrl {
        url: joined,
        reason: e.to_string(),
    })
}

/// Send a prepared request and parse the body as JSON.
///
/// Non-2xx responses carrying a recognisable error message become
/// [`ProviderError::Api`]; anything else becomes [`ProviderError::HttpStatus`].
/// Transport errors have their URL dropped and status errors have their
/// query string stripped, so credentials passed as parameters never reach
/// logs or result errors.
pub(crate) async fn fetch_json(
    provider: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<serde_json::Value, ProviderError> {
    let response = request.send().await.map_err(transport_error)?;
    let status = response.status();
    let url = redact_query(response.url());

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        if let Some(message) = extract_error_message(&body) {
            return Err(ProviderError::Api {
                provider,
                message: format!("HTTP {}: {message}", status.as_u16()),
            });
        }
        return Err(ProviderError::HttpStatus {
            status: status.as_u16(),
            url,
        });
    }

    let body = response.text().await.map_err(transport_error)?;
    serde_json::from_str(&body).map_err(|source| ProviderError::Deserialize {
        context: format!("{provider} response from {url}"),
        source,
    })
}

fn transport_error(err: reqwest::Error) -> ProviderError {
    ProviderError::Http(err.without_url())
}

fn redact_query(url: &Url) -> String {
    let mut clean = url.clone();
    clean.set_query(None);
    clean.to_string()
}

/// Pull a human-readable message out of an error body. Providers disagree on
/// the field name, so the usual suspects are tried in order.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    for key in ["error_message", "message", "error"] {
        match value.get(key) {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => {
                return Some(s.trim().to_string());
            }
            Some(serde_json::Value::Object(inner)) => {
                if let Some(s) = inner.get("message").and_then(serde_json::Value::as_str) {
                    return Some(s.trim().to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Read a float that may be encoded as a JSON number or a numeric string.
pub(crate) fn value_as_f64(value: &serde_json::Value) -> Option<f64> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Read a non-empty, trimmed string field.
pub(crate) fn str_field(value: &serde_json::Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
