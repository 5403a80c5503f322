//! Request helpers shared by the provider adapters.

use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ApiScheme;
use crate::error::ResolveError;

/// Build `{scheme}://{host}/{segments...}`, percent-encoding each segment.
///
/// `host` may carry a path prefix (e.g. `git.corp/gitlab`); segments are
/// appended after it.
pub(crate) fn api_url(
    scheme: ApiScheme,
    host: &str,
    segments: &[&str],
) -> Result<Url, ResolveError> {
    let base = format!("{}://{}", scheme.as_str(), host);
    let mut url = Url::parse(&base).map_err(|source| ResolveError::InvalidUrl {
        url: base.clone(),
        source,
    })?;

    match url.path_segments_mut() {
        Ok(mut path) => {
            path.pop_if_empty().extend(segments);
        }
        Err(()) => {
            return Err(ResolveError::InvalidUrl {
                url: base,
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            });
        }
    }

    Ok(url)
}

/// Send a prepared request, mapping connection failures.
pub(crate) async fn send(
    request: reqwest::RequestBuilder,
    url: &Url,
) -> Result<reqwest::Response, ResolveError> {
    request.send().await.map_err(|source| ResolveError::Transport {
        url: url.to_string(),
        source,
    })
}

pub(crate) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    url: &Url,
) -> Result<T, ResolveError> {
    response.json().await.map_err(|source| ResolveError::Decode {
        url: url.to_string(),
        source,
    })
}

/// Read the body as UTF-8 text, replacing invalid sequences.
pub(crate) async fn read_text(response: reqwest::Response, url: &Url) -> Result<String, ResolveError> {
    let bytes = response.bytes().await.map_err(|source| ResolveError::Transport {
        url: url.to_string(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Body of a failed response, empty when it cannot be read.
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    response.text().await.unwrap_or_default()
}
