use std::fs;

use reqwest::StatusCode;
use serde_json::Value;
use trialmatch_api::{
    backend_error, decode_custom_matches, decode_patient_detail, decode_roster, decode_stats,
    decode_trial, decode_validation, ApiConfig, MatchClient,
};
use trialmatch_core::{
    filter_roster, truncate_list, CustomMatchView, DetailDisplay, DetailView, MatchError,
    MatchOutcome, ScoreTier,
};

fn fixture(name: &str) -> Value {
    let path = format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"));
    let raw = fs::read_to_string(&path).expect("Không đọc được fixture");
    serde_json::from_str(&raw).expect("Fixture không hợp lệ")
}

#[test]
fn stats_decode_with_missing_fields() {
    let stats = decode_stats(fixture("stats.json")).expect("Không đọc được stats");
    assert_eq!(stats.total_patients, Some(50.0));
    assert_eq!(stats.speedup, Some(1200.0));
    assert_eq!(stats.avg_matches_per_patient, None);
}

#[test]
fn roster_normalizes_every_list_shape() {
    let patients = decode_roster(fixture("patients.json")).expect("Không đọc được roster");
    assert_eq!(patients.len(), 3);

    assert_eq!(
        patients[0].conditions,
        vec!["Type 2 Diabetes Mellitus", "Hypertension", "Hyperlipidemia"]
    );
    assert_eq!(patients[1].conditions, vec!["Prediabetes", "Obesity"]);
    assert_eq!(patients[1].medications, vec!["Sitagliptin", "Atorvastatin"]);
    assert_eq!(patients[2].conditions, vec!["Chronic Kidney Disease"]);
    assert!(patients[2].medications.is_empty());

    let ids: Vec<&str> = filter_roster(&patients, "p00")
        .into_iter()
        .map(|p| p.id.as_str())
        .collect();
    assert_eq!(ids, vec!["P001", "P002"]);
}

#[test]
fn roster_without_patients_key_is_malformed() {
    let err = decode_roster(serde_json::json!({})).unwrap_err();
    assert!(matches!(err, MatchError::MalformedResponse(_)));
}

#[test]
fn patient_detail_keeps_backend_ranking() {
    let detail = decode_patient_detail("P001", fixture("patient_detail.json"))
        .expect("Không đọc được chi tiết");

    assert_eq!(detail.patient.id, "P001");
    let ids: Vec<&str> = detail.matches.iter().map(|m| m.nct_id.as_str()).collect();
    assert_eq!(ids, vec!["NCT04512345", "NCT03998877"]);
    assert_eq!(detail.matches[0].tier(), ScoreTier::Excellent);
    assert_eq!(detail.matches[1].tier(), ScoreTier::Fair);

    let reasons: Vec<bool> = detail.matches[1]
        .decoded_reasons()
        .map(|reason| reason.is_positive)
        .collect();
    assert_eq!(reasons, vec![true, false]);

    let conditions = truncate_list(&detail.patient.conditions, 5);
    assert_eq!(conditions.shown.len(), 5);
    assert_eq!(conditions.more_label().as_deref(), Some("and 2 more"));
}

#[test]
fn patient_detail_without_patient_renders_not_found() {
    let result = decode_patient_detail("P404", fixture("patient_detail_missing.json"));
    assert_eq!(result, Err(MatchError::MissingPatient("P404".into())));

    let mut view = DetailView::default();
    let ticket = view.begin("P404");
    view.apply(&ticket, result);
    assert_eq!(view.display(), DetailDisplay::NotFound);
}

#[test]
fn bad_match_entry_is_an_error_not_a_missing_patient() {
    let body = serde_json::json!({
        "patient": {"id": "patient_0001", "age": 52, "gender": "female"},
        "matches": [{"nct_id": "NCT1", "title": "T", "score": null, "reasons": []}]
    });
    let result = decode_patient_detail("patient_0001", body);
    assert!(matches!(result, Err(MatchError::MalformedResponse(_))));

    let mut view = DetailView::default();
    let ticket = view.begin("patient_0001");
    view.apply(&ticket, result);
    assert!(matches!(view.display(), DetailDisplay::Error(_)));
    assert_ne!(view.display(), DetailDisplay::NotFound);
}

#[test]
fn empty_custom_match_is_not_an_error() {
    let mut view = CustomMatchView::default();
    let (ticket, request) = view.submit().expect("Form mặc định hợp lệ");

    let body = serde_json::to_value(&request).expect("Không serialize payload");
    assert_eq!(
        body,
        serde_json::json!({
            "age": 45,
            "gender": "male",
            "conditions": ["Type 2 Diabetes", "Hypertension"],
            "medications": ["Metformin", "Lisinopril"]
        })
    );

    view.apply(&ticket, decode_custom_matches(fixture("custom_match_empty.json")));
    assert_eq!(view.outcome(), MatchOutcome::NoMatches);
}

#[test]
fn trial_and_validation_decode() {
    let trial = decode_trial(fixture("trial.json")).expect("Không đọc được trial");
    assert_eq!(trial.status, "RECRUITING");
    assert_eq!(trial.age_range().as_deref(), Some("18-75 years"));
    assert_eq!(trial.url(), "https://clinicaltrials.gov/study/NCT04512345");

    let report = decode_validation(fixture("validation.json")).expect("Không đọc được validation");
    let strict = report.strict_heuristic.expect("Thiếu strict_heuristic");
    assert_eq!(strict.valid_matches, Some(166));
    assert_eq!(
        report.score_distribution.and_then(|d| d.avg_top_score),
        Some(71.8)
    );
}

#[test]
fn backend_error_lifts_detail() {
    let err = backend_error(StatusCode::NOT_FOUND, r#"{"detail": "Patient not found"}"#);
    assert!(err.is_not_found());
    assert_eq!(err.user_message("fallback"), "Patient not found");

    let err = backend_error(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
    assert_eq!(
        err,
        MatchError::Backend {
            status: 502,
            detail: None
        }
    );
}

#[test]
fn endpoints_are_joined_and_encoded() {
    let client = MatchClient::new(&ApiConfig::new("http://localhost:8000/"));
    assert_eq!(client.base_url(), "http://localhost:8000");

    let url = client
        .endpoint(&["api", "patients", "P 001/x"])
        .expect("URL hợp lệ");
    assert_eq!(url.as_str(), "http://localhost:8000/api/patients/P%20001%2Fx");

    let prefixed = MatchClient::new(&ApiConfig::new("http://example.org/matcher"));
    let url = prefixed.endpoint(&["api", "stats"]).expect("URL hợp lệ");
    assert_eq!(url.as_str(), "http://example.org/matcher/api/stats");
}
