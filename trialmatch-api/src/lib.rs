//! HTTP gateway to the clinical trial matching backend.
//!
//! Every call is a single round trip: no retry, no caching, no request deduplication.
//! Builds for native targets and for `wasm32` (reqwest uses the browser fetch API there).

use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use trialmatch_core::{
    CustomMatchRequest, MatchError, Patient, PatientDetail, Stats, Trial, TrialMatch,
    ValidationReport,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Where the backend lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }
}

/// Typed client for the four dashboard endpoints plus trial and validation lookups.
#[derive(Debug, Clone)]
pub struct MatchClient {
    base_url: String,
    http: reqwest::Client,
}

impl MatchClient {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /api/stats`
    pub async fn fetch_stats(&self) -> Result<Stats, MatchError> {
        let body = self.get_json(&["api", "stats"]).await?;
        decode_stats(body)
    }

    /// `GET /api/patients`
    pub async fn fetch_patients(&self) -> Result<Vec<Patient>, MatchError> {
        let body = self.get_json(&["api", "patients"]).await?;
        let patients = decode_roster(body)?;
        log::info!("Loaded {} patients", patients.len());
        Ok(patients)
    }

    /// `GET /api/patients/{id}`
    pub async fn fetch_patient_detail(&self, patient_id: &str) -> Result<PatientDetail, MatchError> {
        let body = self.get_json(&["api", "patients", patient_id]).await?;
        let detail = decode_patient_detail(patient_id, body)?;
        log::info!(
            "Loaded patient {} with {} matches",
            detail.patient.id,
            detail.matches.len()
        );
        Ok(detail)
    }

    /// `POST /api/match-custom`
    pub async fn submit_custom_match(
        &self,
        request: &CustomMatchRequest,
    ) -> Result<Vec<TrialMatch>, MatchError> {
        let url = self.endpoint(&["api", "match-custom"])?;
        log::debug!("POST {url}");
        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(network_error)?;
        let body = read_json(response).await?;
        let matches = decode_custom_matches(body)?;
        log::info!("Custom profile matched {} trials", matches.len());
        Ok(matches)
    }

    /// `GET /api/trials/{nct_id}`
    pub async fn fetch_trial(&self, nct_id: &str) -> Result<Trial, MatchError> {
        let body = self.get_json(&["api", "trials", nct_id]).await?;
        decode_trial(body)
    }

    /// `GET /api/validation`. `None` when the backend has no report yet (HTTP 404).
    pub async fn fetch_validation(&self) -> Result<Option<ValidationReport>, MatchError> {
        match self.get_json(&["api", "validation"]).await {
            Ok(body) => decode_validation(body).map(Some),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Joins path segments onto the base URL, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, MatchError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| MatchError::Network(format!("Invalid base URL {}: {err}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| MatchError::Network(format!("Base URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json(&self, segments: &[&str]) -> Result<Value, MatchError> {
        let url = self.endpoint(segments)?;
        log::debug!("GET {url}");
        let response = self.http.get(url).send().await.map_err(network_error)?;
        read_json(response).await
    }
}

async fn read_json(response: reqwest::Response) -> Result<Value, MatchError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let err = backend_error(status, &body);
        log::warn!("{err}");
        return Err(err);
    }

    response
        .json::<Value>()
        .await
        .map_err(|err| MatchError::MalformedResponse(err.to_string()))
}

fn network_error(err: reqwest::Error) -> MatchError {
    log::warn!("Request failed: {err}");
    MatchError::Network(err.to_string())
}

/// Builds a backend error, lifting the `detail` (or `error`) string out of a JSON body.
pub fn backend_error(status: StatusCode, body: &str) -> MatchError {
    let detail = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        ["detail", "error", "message"]
            .iter()
            .find_map(|key| value.get(key).and_then(Value::as_str).map(str::to_string))
    });

    MatchError::Backend {
        status: status.as_u16(),
        detail,
    }
}

#[derive(Deserialize)]
struct RosterEnvelope {
    patients: Option<Vec<Patient>>,
}

#[derive(Deserialize)]
struct DetailEnvelope {
    patient: Option<Patient>,
    #[serde(default)]
    matches: Option<Vec<TrialMatch>>,
}

#[derive(Deserialize)]
struct MatchesEnvelope {
    matches: Option<Vec<TrialMatch>>,
}

#[derive(Deserialize)]
struct TrialEnvelope {
    trial: Option<Trial>,
}

fn decode<T: for<'de> Deserialize<'de>>(value: Value, what: &str) -> Result<T, MatchError> {
    serde_json::from_value(value)
        .map_err(|err| MatchError::MalformedResponse(format!("{what}: {err}")))
}

/// Decodes the `/api/stats` body. Absent fields stay `None`.
pub fn decode_stats(value: Value) -> Result<Stats, MatchError> {
    decode(value, "stats")
}

/// Decodes `{ patients: [...] }`, normalizing list fields of every patient.
pub fn decode_roster(value: Value) -> Result<Vec<Patient>, MatchError> {
    decode::<RosterEnvelope>(value, "roster")?
        .patients
        .ok_or_else(|| MatchError::MalformedResponse("response has no `patients`".into()))
}

/// Decodes `{ patient, matches }`. A missing or null `patient` is [`MatchError::MissingPatient`];
/// any other shape problem (a bad match entry included) stays `MalformedResponse`.
pub fn decode_patient_detail(patient_id: &str, value: Value) -> Result<PatientDetail, MatchError> {
    let envelope = decode::<DetailEnvelope>(value, "patient detail")?;
    let patient = envelope
        .patient
        .ok_or_else(|| MatchError::MissingPatient(patient_id.to_string()))?;

    Ok(PatientDetail {
        patient,
        matches: envelope.matches.unwrap_or_default(),
    })
}

/// Decodes `{ matches: [...] }`. Order is kept as ranked by the backend.
pub fn decode_custom_matches(value: Value) -> Result<Vec<TrialMatch>, MatchError> {
    decode::<MatchesEnvelope>(value, "custom match")?
        .matches
        .ok_or_else(|| MatchError::MalformedResponse("response has no `matches`".into()))
}

pub fn decode_trial(value: Value) -> Result<Trial, MatchError> {
    decode::<TrialEnvelope>(value, "trial")?
        .trial
        .ok_or_else(|| MatchError::MalformedResponse("response has no `trial`".into()))
}

pub fn decode_validation(value: Value) -> Result<ValidationReport, MatchError> {
    decode(value, "validation")
}
