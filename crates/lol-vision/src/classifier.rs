use crate::credentials::Credential;
use crate::http::http_client;
use anyhow::{anyhow, bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Best label of one tile. `label: None` means the service saw nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: Option<String>,
    /// Percent, 0-100
    pub confidence: f64,
}

impl Classification {
    pub fn none() -> Self {
        Self {
            label: None,
            confidence: 0.0,
        }
    }
}

/// One remote image classification round trip, no retries
pub trait TileClassifier: Send + Sync {
    fn classify_once(&self, tile: &[u8]) -> Result<Classification>;
}

/// Fixed-delay retry bound for remote calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Run `call` until it succeeds or the attempts run out; the last
    /// failure is returned as-is.
    pub fn run<T>(&self, what: &str, mut call: impl FnMut() -> Result<T>) -> Result<T> {
        let attempts = self.attempts.max(1);
        let mut last_err = None;
        for attempt in 1..=attempts {
            match call() {
                Ok(value) => return Ok(value),
                Err(err) => {
                    warn!("{} attempt {}/{} failed: {:#}", what, attempt, attempts, err);
                    last_err = Some(err);
                    if attempt < attempts {
                        std::thread::sleep(self.delay);
                    }
                }
            }
        }
        Err(last_err.unwrap_or_else(|| anyhow!("{} failed", what)))
    }
}

/// `classify(tile)` with retries
pub fn classify(
    classifier: &dyn TileClassifier,
    tile: &[u8],
    policy: &RetryPolicy,
) -> Result<Classification> {
    policy.run("classification", || classifier.classify_once(tile))
}

/// Best (label, confidence) from a prediction response body.
/// Empty or label-less predictions are a confident "nothing".
pub fn parse_prediction(body: &Value) -> Classification {
    let Some(pred) = body
        .get("predictions")
        .and_then(Value::as_array)
        .and_then(|p| p.first())
    else {
        return Classification::none();
    };

    let non_empty = |keys: [&str; 2]| {
        keys.iter()
            .filter_map(|k| pred.get(*k).and_then(Value::as_array))
            .find(|a| !a.is_empty())
    };
    let (Some(names), Some(confs)) = (
        non_empty(["displayNames", "labels"]),
        non_empty(["confidences", "scores"]),
    ) else {
        return Classification::none();
    };

    let best = confs
        .iter()
        .enumerate()
        .filter_map(|(i, c)| c.as_f64().map(|c| (i, c)))
        .fold(None, |best: Option<(usize, f64)>, (i, c)| match best {
            Some((_, b)) if b >= c => best,
            _ => Some((i, c)),
        });

    match best.and_then(|(i, c)| names.get(i).map(|n| (n, c))) {
        Some((name, conf)) => Classification {
            label: Some(match name.as_str() {
                Some(s) => s.to_string(),
                None => name.to_string(),
            }),
            confidence: conf * 100.0,
        },
        None => Classification::none(),
    }
}

/// Identity of a deployed classifier endpoint, also its cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointKey {
    pub project: String,
    /// Lower-cased
    pub region: String,
    pub endpoint: String,
    pub explicit_credential: bool,
}

impl EndpointKey {
    pub fn new(project: &str, region: &str, endpoint: &str, credential: &Credential) -> Self {
        Self {
            project: project.trim().to_string(),
            region: region.trim().to_lowercase(),
            endpoint: endpoint.trim().to_string(),
            explicit_credential: credential.is_explicit(),
        }
    }

    pub fn predict_url(&self) -> String {
        format!(
            "https://{region}-aiplatform.googleapis.com/v1/projects/{project}/locations/{region}/endpoints/{endpoint}:predict",
            region = self.region,
            project = self.project,
            endpoint = self.endpoint
        )
    }
}

/// Remote image classification endpoint
pub struct VertexEndpoint {
    key: EndpointKey,
    token: String,
}

impl VertexEndpoint {
    pub fn connect(
        key: EndpointKey,
        credential: &Credential,
        service: &'static str,
    ) -> Result<Self> {
        let token = credential.bearer_token(service)?;
        info!("Connected {} endpoint {} in {}", service, key.endpoint, key.region);
        Ok(Self { key, token })
    }

    pub fn key(&self) -> &EndpointKey {
        &self.key
    }
}

impl TileClassifier for VertexEndpoint {
    fn classify_once(&self, tile: &[u8]) -> Result<Classification> {
        let client = http_client()?;
        let body = json!({ "instances": [{ "content": STANDARD.encode(tile) }] });
        let resp = client
            .post(self.key.predict_url())
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .context("prediction request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            bail!("prediction returned {}: {}", status, text.trim());
        }
        let value: Value = resp.json().context("invalid prediction json")?;
        let result = parse_prediction(&value);
        debug!("Prediction: {:?} ({:.1}%)", result.label, result.confidence);
        Ok(result)
    }
}

/// Endpoints already connected in this session.
///
/// Two callers racing on the same uncached key may both connect; the first
/// insert is kept and both get the same handle.
#[derive(Default)]
pub struct EndpointCache {
    endpoints: Mutex<HashMap<EndpointKey, Arc<VertexEndpoint>>>,
}

impl EndpointCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_connect(
        &self,
        key: EndpointKey,
        credential: &Credential,
        service: &'static str,
    ) -> Result<Arc<VertexEndpoint>> {
        if let Some(hit) = self.lookup(&key) {
            debug!("Reusing {} endpoint {}", service, key.endpoint);
            return Ok(hit);
        }
        let endpoint = Arc::new(VertexEndpoint::connect(key.clone(), credential, service)?);
        let mut map = self
            .endpoints
            .lock()
            .map_err(|_| anyhow!("endpoint cache poisoned"))?;
        Ok(map.entry(key).or_insert(endpoint).clone())
    }

    fn lookup(&self, key: &EndpointKey) -> Option<Arc<VertexEndpoint>> {
        self.endpoints.lock().ok()?.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.endpoints.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
