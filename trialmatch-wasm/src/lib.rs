//! Bridge WASM <-> JavaScript trung lập framework cho bộ chuẩn hóa và trình bày kết quả ghép.

use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use trialmatch_core::{
    color_class, decode_reason as decode_reason_text, tier, CustomProfileForm, Gender, ListField,
    MatchError,
};
use wasm_bindgen::prelude::*;

#[derive(Deserialize, Default)]
struct JsProfileForm {
    #[serde(default)]
    age: Option<u32>,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    conditions: Option<String>,
    #[serde(default)]
    medications: Option<String>,
}

impl TryFrom<JsProfileForm> for CustomProfileForm {
    type Error = MatchError;

    fn try_from(form: JsProfileForm) -> Result<Self, Self::Error> {
        let mut base = CustomProfileForm::default();
        if let Some(age) = form.age {
            base.age = age.to_string();
        }
        if let Some(gender) = form.gender {
            base.gender = gender.parse::<Gender>()?;
        }
        if let Some(conditions) = form.conditions {
            base.conditions = conditions;
        }
        if let Some(medications) = form.medications {
            base.medications = medications;
        }
        Ok(base)
    }
}

/// Chuẩn hóa trường bệnh lý/thuốc ở bất kỳ dạng nào thành mảng chuỗi.
#[wasm_bindgen]
pub fn parse_list_field(value: JsValue) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let value = from_value::<Option<serde_json::Value>>(value)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được trường danh sách: {err}")))?;

    to_value(&ListField::from(value).parse())
        .map_err(|err| JsValue::from_str(&format!("Không serialize danh sách: {err}")))
}

#[wasm_bindgen]
pub fn score_tier(score: f64) -> String {
    tier(score).to_string()
}

#[wasm_bindgen]
pub fn score_color_class(score: f64) -> String {
    color_class(score).classes()
}

/// Trả về `{ is_positive, text }`.
#[wasm_bindgen]
pub fn decode_reason(reason: &str) -> Result<JsValue, JsValue> {
    to_value(&decode_reason_text(reason))
        .map_err(|err| JsValue::from_str(&format!("Không serialize lý do: {err}")))
}

/// Dựng payload `/api/match-custom` từ form; trường vắng mặt lấy giá trị mặc định.
#[wasm_bindgen]
pub fn build_custom_request(form: Option<JsValue>) -> Result<JsValue, JsValue> {
    let form = match form {
        Some(js_form) => from_value::<JsProfileForm>(js_form)
            .map_err(|err| JsValue::from_str(&format!("Không đọc được form: {err}")))?,
        None => JsProfileForm::default(),
    };

    let request = CustomProfileForm::try_from(form)
        .and_then(|form| form.to_request())
        .map_err(|err| JsValue::from_str(&format_match_error(err)))?;

    to_value(&request).map_err(|err| JsValue::from_str(&format!("Không serialize payload: {err}")))
}

fn format_match_error(err: MatchError) -> String {
    format!("Match error: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_form_merges_over_defaults() {
        let form = JsProfileForm {
            age: Some(60),
            gender: Some("Female".into()),
            ..JsProfileForm::default()
        };
        let request = CustomProfileForm::try_from(form)
            .and_then(|form| form.to_request())
            .unwrap();

        assert_eq!(request.age, 60);
        assert_eq!(request.gender, Gender::Female);
        assert_eq!(request.conditions, vec!["Type 2 Diabetes", "Hypertension"]);
    }

    #[test]
    fn unknown_gender_is_rejected() {
        let form = JsProfileForm {
            gender: Some("other".into()),
            ..JsProfileForm::default()
        };
        assert!(matches!(
            CustomProfileForm::try_from(form),
            Err(MatchError::InvalidProfile(_))
        ));
    }

    #[test]
    fn score_helpers_agree() {
        assert_eq!(score_tier(70.0), "Excellent");
        assert_eq!(score_color_class(50.0), "score-bg-good score-text-good");
    }
}
