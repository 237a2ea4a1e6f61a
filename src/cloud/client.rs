//! Remote annotation transport.
//!
//! The client encodes a frame as JPEG, wraps it in an object-localization
//! request, and POSTs it with the service key as a query parameter. The
//! call runs synchronously on the analysis worker; the keep-only-latest
//! frame handoff means a slow round trip drops frames instead of queueing
//! them.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use url::Url;

use crate::cloud::parse::parse_annotations;
use crate::detect::Candidate;

/// Default annotation endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Default score floor for the cloud path. Deliberately higher than the
/// local floor: the remote service is queried less often and should not
/// contribute low-confidence noise.
pub const DEFAULT_MIN_SCORE: f32 = 0.45;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(12);
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(12);
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Configuration for the cloud annotation client.
#[derive(Clone, Debug)]
pub struct CloudConfig {
    pub endpoint: String,
    /// Service key, passed as a query parameter. An empty key disables the
    /// cloud call with a warning rather than erroring.
    pub api_key: String,
    pub jpeg_quality: u8,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

/// HTTP client for the remote object-localization service.
pub struct CloudClient {
    agent: ureq::Agent,
    endpoint: Url,
    api_key: String,
    jpeg_quality: u8,
}

impl CloudClient {
    pub fn new(config: CloudConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .with_context(|| format!("invalid annotation endpoint '{}'", config.endpoint))?;
        if config.jpeg_quality == 0 || config.jpeg_quality > 100 {
            return Err(anyhow!("jpeg quality must be in 1..=100"));
        }
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(config.connect_timeout)
            .timeout_read(config.read_timeout)
            .timeout_write(config.write_timeout)
            .build();
        Ok(Self {
            agent,
            endpoint,
            api_key: config.api_key,
            jpeg_quality: config.jpeg_quality,
        })
    }

    /// Submit one frame for object localization.
    ///
    /// Transport failures, timeouts, and non-success statuses degrade to an
    /// empty list; the next frame re-evaluates reachability independently.
    pub fn annotate(&self, pixels: &[u8], size: u32) -> Vec<Candidate> {
        if self.api_key.trim().is_empty() {
            log::warn!("annotation key missing; skipping cloud call");
            return Vec::new();
        }
        match self.try_annotate(pixels, size) {
            Ok(candidates) => candidates,
            Err(err) => {
                log::warn!("cloud annotation failed: {:#}", err);
                Vec::new()
            }
        }
    }

    fn try_annotate(&self, pixels: &[u8], size: u32) -> Result<Vec<Candidate>> {
        let jpeg = encode_jpeg(pixels, size, self.jpeg_quality)?;
        let request = serde_json::json!({
            "requests": [{
                "image": { "content": BASE64.encode(&jpeg) },
                "features": [{ "type": "OBJECT_LOCALIZATION" }],
            }]
        });

        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("key", &self.api_key);

        let response = self
            .agent
            .post(url.as_str())
            .set("Content-Type", "application/json; charset=utf-8")
            .send_string(&request.to_string())
            .context("submit annotation request")?;
        let body = response
            .into_string()
            .context("read annotation response")?;
        Ok(parse_annotations(&body))
    }
}

/// Encode a square RGB frame as JPEG for upload.
fn encode_jpeg(pixels: &[u8], size: u32, quality: u8) -> Result<Vec<u8>> {
    let expected = (size as usize)
        .checked_mul(size as usize)
        .and_then(|v| v.checked_mul(3))
        .ok_or_else(|| anyhow!("frame dimensions overflow"))?;
    if pixels.len() != expected {
        return Err(anyhow!(
            "expected {} RGB bytes for a {}x{} frame, got {}",
            expected,
            size,
            size,
            pixels.len()
        ));
    }
    let mut jpeg = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, quality);
    encoder
        .encode(pixels, size, size, image::ExtendedColorType::Rgb8)
        .context("encode frame as jpeg")?;
    Ok(jpeg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_endpoint_and_quality() {
        let bad_endpoint = CloudConfig {
            endpoint: "not a url".to_string(),
            ..CloudConfig::default()
        };
        assert!(CloudClient::new(bad_endpoint).is_err());

        let bad_quality = CloudConfig {
            jpeg_quality: 0,
            ..CloudConfig::default()
        };
        assert!(CloudClient::new(bad_quality).is_err());
    }

    #[test]
    fn blank_key_short_circuits_without_transport() {
        let client = CloudClient::new(CloudConfig::default()).unwrap();
        let pixels = vec![0u8; 8 * 8 * 3];
        assert!(client.annotate(&pixels, 8).is_empty());
    }

    #[test]
    fn encode_jpeg_produces_a_jpeg_stream() {
        let pixels = vec![128u8; 16 * 16 * 3];
        let jpeg = encode_jpeg(&pixels, 16, 80).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn encode_jpeg_rejects_wrong_buffer_length() {
        let err = encode_jpeg(&[0u8; 10], 16, 80).unwrap_err();
        assert!(err.to_string().contains("RGB bytes"));
    }
}
