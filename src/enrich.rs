//! Project brief enrichment through a generative text service.
//!
//! Requests run on a worker thread. Each request is stamped with a
//! [`Ticket`]; a result is applied only if its ticket is still the latest one
//! and the project hub is still showing the same project.

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::config::EnrichmentSettings;
use crate::error::EnrichmentError;

const SYSTEM_PROMPT: &str = "You are a senior creative agency producer. Analyze the project brief \
and return JSON with an improved brief, a short list of concrete tasks, and recommended team \
members with a one-sentence justification each.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRecommendation {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub justification: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrichment {
    pub enriched_brief: String,
    #[serde(default)]
    pub suggested_tasks: Vec<String>,
    #[serde(default)]
    pub team_recommendations: Vec<TeamRecommendation>,
}

pub trait Enricher: Send + Sync {
    /// `context` is free text about the project (client, roster) that helps
    /// the service tailor its answer.
    fn enrich(&self, brief: &str, context: &str) -> Result<Enrichment, EnrichmentError>;
}

/// Client for the Gemini `generateContent` endpoint in JSON response mode.
pub struct GeminiEnricher {
    http: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiEnricher {
    pub fn new(settings: &EnrichmentSettings, api_key: impl Into<String>) -> Result<Self, EnrichmentError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: api_key.into(),
        })
    }

    /// Reads the key from the environment variable named in the settings.
    pub fn from_env(settings: &EnrichmentSettings) -> Result<Self, EnrichmentError> {
        let key = std::env::var(&settings.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| EnrichmentError::MissingApiKey(settings.api_key_env.clone()))?;
        Self::new(settings, key)
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl Enricher for GeminiEnricher {
    fn enrich(&self, brief: &str, context: &str) -> Result<Enrichment, EnrichmentError> {
        if brief.trim().is_empty() {
            return Err(EnrichmentError::EmptyBrief);
        }
        let body = json!({
            "contents": [{ "parts": [{ "text": format!("Project Brief: \"\"\"{brief}\"\"\"\n\n{context}") }] }],
            "systemInstruction": { "parts": [{ "text": SYSTEM_PROMPT }] },
            "generationConfig": { "responseMimeType": "application/json" },
        });
        let response = self
            .http
            .post(self.url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()?;
        if !response.status().is_success() {
            return Err(EnrichmentError::Status(response.status().as_u16()));
        }
        let root = response.json::<Value>()?;
        parse_enrichment_payload(&root)
    }
}

/// Pull the enrichment out of a `generateContent` response: the model's text
/// at `candidates[0].content.parts[0].text`, itself a JSON document.
pub fn parse_enrichment_payload(root: &Value) -> Result<Enrichment, EnrichmentError> {
    let text = root
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .ok_or_else(|| EnrichmentError::MalformedPayload("response carries no text".into()))?;
    let enrichment: Enrichment = serde_json::from_str(strip_code_fence(text))
        .map_err(|e| EnrichmentError::MalformedPayload(e.to_string()))?;
    if enrichment.enriched_brief.trim().is_empty() {
        return Err(EnrichmentError::MalformedPayload("enrichedBrief is empty".into()));
    }
    Ok(enrichment)
}

/// Models sometimes wrap JSON in a ```json fence even in JSON mode.
fn strip_code_fence(text: &str) -> &str {
    let t = text.trim();
    t.strip_prefix("```json")
        .or_else(|| t.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(t)
}

/// Identifies one enrichment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
    pub project_id: String,
}

/// Hands out tickets and decides whether a finished request is still wanted.
#[derive(Debug, Default)]
pub struct EnrichmentTracker {
    issued: u64,
    in_flight: Option<Ticket>,
}

impl EnrichmentTracker {
    pub fn begin(&mut self, project_id: impl Into<String>) -> Ticket {
        self.issued += 1;
        let ticket = Ticket {
            seq: self.issued,
            project_id: project_id.into(),
        };
        self.in_flight = Some(ticket.clone());
        ticket
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_busy_for(&self, project_id: &str) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|t| t.project_id == project_id)
    }

    /// Forget the in-flight request, e.g. when its hub is closed.
    pub fn cancel(&mut self) {
        self.in_flight = None;
    }

    /// Retires `ticket` and reports whether its result may be applied while
    /// `current_project` is on screen.
    pub fn accept(&mut self, ticket: &Ticket, current_project: Option<&str>) -> bool {
        let latest = self.in_flight.as_ref() == Some(ticket);
        if latest {
            self.in_flight = None;
        }
        let fresh = latest && current_project == Some(ticket.project_id.as_str());
        if !fresh {
            warn!(project = %ticket.project_id, "dropping stale enrichment result");
        }
        fresh
    }
}

pub type EnrichmentOutcome = (Ticket, Result<Enrichment, EnrichmentError>);

/// Run one request on a worker thread. The receiver yields exactly one outcome.
pub fn spawn_enrichment(
    enricher: Arc<dyn Enricher>,
    ticket: Ticket,
    brief: String,
    context: String,
) -> Receiver<EnrichmentOutcome> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        info!(project = %ticket.project_id, "enrichment request started");
        let result = enricher.enrich(&brief, &context);
        if let Err(e) = &result {
            error!(project = %ticket.project_id, "enrichment failed: {e}");
        }
        let _ = tx.send((ticket, result));
    });
    rx
}
