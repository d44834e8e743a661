use crate::credentials::Credential;
use crate::http::http_client;
use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::png::PngEncoder;
use image::{GrayImage, ImageEncoder, Luma, RgbImage};
use serde_json::{json, Value};
use tracing::debug;

const ANNOTATE_URL: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Contrast factor applied before OCR
const CONTRAST: f64 = 2.0;

/// Full text found in one image, no retries
pub trait TextDetector: Send + Sync {
    fn detect_text(&self, png: &[u8]) -> Result<String>;
}

/// Remote text detection service
pub struct VisionOcrClient {
    token: String,
}

impl VisionOcrClient {
    pub fn connect(credential: &Credential) -> Result<Self> {
        let token = credential.bearer_token("text detection")?;
        Ok(Self { token })
    }
}

impl TextDetector for VisionOcrClient {
    fn detect_text(&self, png: &[u8]) -> Result<String> {
        let client = http_client()?;
        let body = json!({
            "requests": [{
                "image": { "content": STANDARD.encode(png) },
                "features": [{ "type": "TEXT_DETECTION" }]
            }]
        });
        let resp = client
            .post(ANNOTATE_URL)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .context("text detection request failed")?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            bail!("text detection returned {}: {}", status, text.trim());
        }
        let value: Value = resp.json().context("invalid text detection json")?;
        parse_annotation(&value)
    }
}

/// Description of the first text annotation; empty when nothing was read.
/// A service-side error message is a failure.
pub fn parse_annotation(body: &Value) -> Result<String> {
    let Some(first) = body
        .get("responses")
        .and_then(Value::as_array)
        .and_then(|r| r.first())
    else {
        return Ok(String::new());
    };
    if let Some(msg) = first
        .pointer("/error/message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
    {
        bail!("OCR error: {}", msg);
    }
    let text = first
        .get("textAnnotations")
        .and_then(Value::as_array)
        .and_then(|a| a.first())
        .and_then(|a| a.get("description"))
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim()
        .to_string();
    debug!("OCR text: '{}'", text);
    Ok(text)
}

/// Grayscale, then stretch contrast about the mean intensity
pub fn preprocess_for_ocr(image: &RgbImage) -> GrayImage {
    let gray = image::imageops::grayscale(image);
    let count = (gray.width() as u64 * gray.height() as u64).max(1);
    let mean = gray.pixels().map(|p| p[0] as u64).sum::<u64>() as f64 / count as f64;

    let mut out = gray;
    for p in out.pixels_mut() {
        let v = mean + CONTRAST * (p[0] as f64 - mean);
        *p = Luma([v.round().clamp(0.0, 255.0) as u8]);
    }
    out
}

pub fn encode_png(image: &GrayImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::L8,
        )
        .context("Failed to encode OCR tile as PNG")?;
    Ok(bytes)
}
