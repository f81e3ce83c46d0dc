//! Turns task outputs into self-contained screenshots.
//!
//! Inline outputs decode locally. URL outputs are fetched directly first;
//! image hosts sometimes reject the direct fetch (cross-origin policy on the
//! CDN), in which case the same URL is retried once through a public relay
//! that fetches server-side and returns the bytes. The relay changes the
//! transport path only, never the bytes.

use std::future::Future;

use base64::Engine;

use crate::error::{Result, ScreenforgeError};
use crate::image::task::ImageOutput;
use crate::image::types::Screenshot;

/// Default relay endpoint: fetches an arbitrary URL server-side.
pub const DEFAULT_RELAY_URL: &str = "https://corsproxy.io/";

/// Resolves task outputs into fully materialized screenshots.
pub struct ImageResolver {
    client: reqwest::Client,
    relay_base: String,
}

impl ImageResolver {
    /// Creates a resolver sharing the given HTTP client.
    pub fn new(client: reqwest::Client, relay_base: impl Into<String>) -> Self {
        Self {
            client,
            relay_base: relay_base.into(),
        }
    }

    /// Resolves the first task output into a screenshot.
    ///
    /// Inline payloads never touch the network. URL payloads go through the
    /// direct-then-relay fallback chain; if both legs fail the error carries
    /// both causes.
    pub async fn resolve(&self, outputs: &[ImageOutput]) -> Result<Screenshot> {
        let output = outputs.first().ok_or_else(|| {
            ScreenforgeError::Validation("no image outputs to resolve".into())
        })?;

        match output {
            ImageOutput::Inline(b64) => decode_inline(b64),
            ImageOutput::Url(url) => self.fetch_with_fallback(url).await,
        }
    }

    async fn fetch_with_fallback(&self, url: &str) -> Result<Screenshot> {
        let relay = self.relay_url(url).map(|u| u.to_string());
        let bytes = run_fetch_chain(
            |target| async move { self.fetch(&target).await },
            url,
            relay,
        )
        .await?;
        Ok(Screenshot::from_bytes(bytes))
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "image/*")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ScreenforgeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Builds the relay request URL, percent-encoding the target.
    fn relay_url(&self, target: &str) -> Result<reqwest::Url> {
        let mut relay = reqwest::Url::parse(&self.relay_base)
            .map_err(|e| ScreenforgeError::InvalidRequest(format!("bad relay URL: {e}")))?;
        relay.query_pairs_mut().append_pair("url", target);
        Ok(relay)
    }
}

/// Runs the direct-then-relay fallback chain over a byte-fetching function.
///
/// The relay target is only consulted after the direct fetch fails, so a
/// misconfigured relay cannot break a working direct path. When both legs
/// fail, the error carries both causes.
pub(crate) async fn run_fetch_chain<F, Fut>(
    mut fetch: F,
    direct_url: &str,
    relay_url: Result<String>,
) -> Result<Vec<u8>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Vec<u8>>>,
{
    let direct_err = match fetch(direct_url.to_owned()).await {
        Ok(bytes) => return Ok(bytes),
        Err(e) => e,
    };

    tracing::warn!(url = %direct_url, error = %direct_err, "direct image fetch failed, trying relay");

    let relay_target = match relay_url {
        Ok(target) => target,
        Err(relay_err) => {
            return Err(ScreenforgeError::ImageFetch {
                direct: direct_err.to_string(),
                relay: relay_err.to_string(),
            })
        }
    };

    match fetch(relay_target).await {
        Ok(bytes) => Ok(bytes),
        Err(relay_err) => Err(ScreenforgeError::ImageFetch {
            direct: direct_err.to_string(),
            relay: relay_err.to_string(),
        }),
    }
}

/// Decodes a base64 payload into a screenshot, zero network calls.
fn decode_inline(b64: &str) -> Result<Screenshot> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|e| ScreenforgeError::Decode(e.to_string()))?;
    Ok(Screenshot::from_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::types::ImageFormat;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    const PNG_MAGIC: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    const DIRECT_URL: &str = "https://cdn.example.com/shot.png";
    const RELAY_TARGET: &str = "https://corsproxy.io/?url=https%3A%2F%2Fcdn.example.com%2Fshot.png";

    fn resolver() -> ImageResolver {
        ImageResolver::new(reqwest::Client::new(), DEFAULT_RELAY_URL)
    }

    fn forbidden() -> ScreenforgeError {
        ScreenforgeError::Api {
            status: 403,
            message: "cross-origin fetch rejected".into(),
        }
    }

    /// Runs the fetch chain over scripted responses, recording requested URLs.
    async fn run_chain(
        script: Vec<Result<Vec<u8>>>,
    ) -> (Result<Vec<u8>>, Vec<String>) {
        let mut script: VecDeque<_> = script.into();
        let urls = Rc::new(RefCell::new(Vec::new()));
        let urls_in_chain = Rc::clone(&urls);

        let result = run_fetch_chain(
            move |target| {
                urls_in_chain.borrow_mut().push(target);
                let next = script.pop_front().expect("fetched past end of script");
                async move { next }
            },
            DIRECT_URL,
            Ok(RELAY_TARGET.to_owned()),
        )
        .await;

        let urls = urls.borrow().clone();
        (result, urls)
    }

    #[tokio::test]
    async fn test_fetch_chain_direct_success_skips_relay() {
        let (result, urls) = run_chain(vec![Ok(PNG_MAGIC.to_vec())]).await;

        assert_eq!(result.unwrap(), PNG_MAGIC.to_vec());
        assert_eq!(urls, vec![DIRECT_URL.to_owned()]);
    }

    #[tokio::test]
    async fn test_fetch_chain_falls_back_to_relay() {
        let (result, urls) = run_chain(vec![Err(forbidden()), Ok(PNG_MAGIC.to_vec())]).await;

        // Same bytes as a successful direct fetch would have returned.
        assert_eq!(result.unwrap(), PNG_MAGIC.to_vec());
        assert_eq!(urls, vec![DIRECT_URL.to_owned(), RELAY_TARGET.to_owned()]);
    }

    #[tokio::test]
    async fn test_fetch_chain_reports_both_failures() {
        let (result, urls) = run_chain(vec![
            Err(forbidden()),
            Err(ScreenforgeError::Api {
                status: 502,
                message: "relay unavailable".into(),
            }),
        ])
        .await;

        match result.unwrap_err() {
            ScreenforgeError::ImageFetch { direct, relay } => {
                assert!(direct.contains("403"));
                assert!(relay.contains("502"));
            }
            other => panic!("expected ImageFetch, got {other:?}"),
        }
        assert_eq!(urls.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_chain_bad_relay_still_reports_direct_cause() {
        let result = run_fetch_chain(
            |_target| async move { Err(forbidden()) },
            DIRECT_URL,
            Err(ScreenforgeError::InvalidRequest("bad relay URL".into())),
        )
        .await;

        match result.unwrap_err() {
            ScreenforgeError::ImageFetch { direct, relay } => {
                assert!(direct.contains("403"));
                assert!(relay.contains("bad relay URL"));
            }
            other => panic!("expected ImageFetch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_inline_resolution_preserves_bytes() {
        let b64 = base64::engine::general_purpose::STANDARD.encode(PNG_MAGIC);
        let shot = resolver()
            .resolve(&[ImageOutput::Inline(b64)])
            .await
            .unwrap();
        assert_eq!(shot.data, PNG_MAGIC.to_vec());
        assert_eq!(shot.format, ImageFormat::Png);
    }

    #[tokio::test]
    async fn test_inline_resolution_rejects_garbage() {
        let err = resolver()
            .resolve(&[ImageOutput::Inline("not base64!!!".into())])
            .await
            .unwrap_err();
        assert!(matches!(err, ScreenforgeError::Decode(_)));
    }

    #[tokio::test]
    async fn test_empty_outputs_rejected() {
        let err = resolver().resolve(&[]).await.unwrap_err();
        assert!(matches!(err, ScreenforgeError::Validation(_)));
    }

    #[test]
    fn test_relay_url_encodes_target() {
        let url = resolver()
            .relay_url("https://cdn.example.com/a b.png?sig=x&y=1")
            .unwrap();
        assert!(url.as_str().starts_with("https://corsproxy.io/?url="));
        let query = url.query().unwrap();
        assert!(query.contains("cdn.example.com"));
        // The target's own query separators must be escaped.
        assert!(!query.contains("&y=1"));
    }

    #[test]
    fn test_bad_relay_base_is_invalid_request() {
        let resolver = ImageResolver::new(reqwest::Client::new(), "not a url");
        let err = resolver.relay_url("https://cdn.example.com/a.png").unwrap_err();
        assert!(matches!(err, ScreenforgeError::InvalidRequest(_)));
    }
}
