//! Kiểu dữ liệu trao đổi với backend ghép thử nghiệm.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::list_field;
use crate::presenter::{self, DecodedReason, ScoreTier};
use crate::MatchError;

/// Giới tính được backend chấp nhận.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    /// Giá trị gửi lên API.
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    /// Nhãn hiển thị (viết hoa chữ cái đầu).
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Gender {
    type Err = MatchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(MatchError::InvalidProfile(format!(
                "Giới tính không hợp lệ: {other}"
            ))),
        }
    }
}

/// Bệnh nhân tổng hợp. `conditions`/`medications` được chuẩn hóa ngay khi đọc.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub id: String,
    pub age: u32,
    pub gender: Gender,
    #[serde(default, deserialize_with = "list_field::deserialize")]
    pub conditions: Vec<String>,
    #[serde(default, deserialize_with = "list_field::deserialize")]
    pub medications: Vec<String>,
}

/// Một thử nghiệm được backend chấm điểm cho bệnh nhân.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrialMatch {
    pub nct_id: String,
    pub title: String,
    #[serde(default)]
    pub condition: String,
    pub score: f64,
    #[serde(default)]
    pub reasons: Vec<String>,
}

impl TrialMatch {
    pub fn tier(&self) -> ScoreTier {
        ScoreTier::from_score(self.score)
    }

    pub fn url(&self) -> String {
        presenter::trial_url(&self.nct_id)
    }

    pub fn decoded_reasons(&self) -> impl Iterator<Item = DecodedReason> + '_ {
        self.reasons.iter().map(|reason| presenter::decode_reason(reason))
    }
}

/// Chi tiết một bệnh nhân kèm danh sách thử nghiệm đã xếp hạng.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientDetail {
    pub patient: Patient,
    pub matches: Vec<TrialMatch>,
}

/// Số liệu tổng hợp. Mọi trường đều có thể vắng mặt.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Stats {
    #[serde(default)]
    pub total_patients: Option<f64>,
    #[serde(default)]
    pub total_trials: Option<f64>,
    #[serde(default)]
    pub total_matches: Option<f64>,
    #[serde(default)]
    pub avg_matches_per_patient: Option<f64>,
    #[serde(default)]
    pub avg_time_seconds: Option<f64>,
    #[serde(default)]
    pub speedup: Option<f64>,
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default)]
    pub coverage: Option<f64>,
}

/// Hồ sơ gửi lên `/api/match-custom`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomMatchRequest {
    pub age: u32,
    pub gender: Gender,
    pub conditions: Vec<String>,
    pub medications: Vec<String>,
}

/// Thông tin thử nghiệm từ `/api/trials/{nct_id}`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Trial {
    pub nct_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub age_min: Option<u32>,
    #[serde(default)]
    pub age_max: Option<u32>,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub eligibility_text: String,
}

impl Trial {
    pub fn url(&self) -> String {
        presenter::trial_url(&self.nct_id)
    }

    /// Tiêu chí tuyển chọn rút gọn cho thẻ kết quả.
    pub fn criteria_excerpt(&self) -> Cow<'_, str> {
        presenter::excerpt(&self.eligibility_text, presenter::CRITERIA_EXCERPT_CHARS)
    }

    /// Khoảng tuổi dạng "18-65 years", `None` khi thiếu cả hai đầu.
    pub fn age_range(&self) -> Option<String> {
        match (self.age_min, self.age_max) {
            (None, None) => None,
            (min, max) => Some(format!(
                "{}-{} years",
                min.map(|v| v.to_string()).unwrap_or_else(|| "?".into()),
                max.map(|v| v.to_string()).unwrap_or_else(|| "?".into())
            )),
        }
    }
}

/// Báo cáo kiểm định chất lượng ghép từ `/api/validation`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ValidationReport {
    #[serde(default)]
    pub strict_heuristic: Option<StrictHeuristic>,
    #[serde(default)]
    pub score_distribution: Option<ScoreDistribution>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StrictHeuristic {
    #[serde(default)]
    pub accuracy_percent: Option<f64>,
    #[serde(default)]
    pub total_evaluated: Option<u64>,
    #[serde(default)]
    pub valid_matches: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ScoreDistribution {
    #[serde(default)]
    pub avg_score: Option<f64>,
    #[serde(default)]
    pub avg_top_score: Option<f64>,
    #[serde(default)]
    pub excellent_matches_percent: Option<f64>,
}
