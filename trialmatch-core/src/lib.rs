//! Logic lõi cho dashboard ghép bệnh nhân với thử nghiệm lâm sàng.
//!
//! Crate này không thực hiện I/O: nó chuẩn hóa dữ liệu backend trả về, ánh xạ điểm số sang
//! cách trình bày và giữ máy trạng thái của từng màn hình. Việc gọi HTTP nằm ở `trialmatch-api`.

pub mod app;
pub mod list_field;
pub mod model;
pub mod presenter;
pub mod tracker;
pub mod views;

pub use app::{AppState, View};
pub use list_field::{parse_list_field, split_comma_list, ListField};
pub use model::{
    CustomMatchRequest, Gender, Patient, PatientDetail, ScoreDistribution, Stats,
    StrictHeuristic, Trial, TrialMatch, ValidationReport,
};
pub use presenter::{
    color_class, decode_reason, excerpt, format_metric, tier, trial_url, truncate_list,
    ColorClass, DecodedReason, ScoreTier, Truncated,
};
pub use tracker::{RequestTicket, RequestTracker};
pub use views::{
    filter_roster, CustomMatchView, CustomProfileForm, DetailDisplay, DetailView, LoadState,
    MatchOutcome, RosterView, TrialDetailView, TrialPanel,
};

/// Lỗi chung của luồng lấy và hiển thị kết quả ghép.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatchError {
    #[error("Không kết nối được backend: {0}")]
    Network(String),
    #[error("Backend trả lỗi HTTP {status}{}", detail_suffix(.detail))]
    Backend { status: u16, detail: Option<String> },
    #[error("Phản hồi thiếu dữ liệu: {0}")]
    MalformedResponse(String),
    /// Phản hồi thành công nhưng không có bản ghi bệnh nhân.
    #[error("Phản hồi không có bệnh nhân {0}")]
    MissingPatient(String),
    #[error("Hồ sơ bệnh nhân không hợp lệ: {0}")]
    InvalidProfile(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|detail| format!(": {detail}"))
        .unwrap_or_default()
}

impl MatchError {
    /// Thông điệp cho người dùng: ưu tiên mô tả từ backend, nếu không có thì dùng `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            MatchError::Backend {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => detail.clone(),
            MatchError::InvalidProfile(reason) => reason.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, MatchError::Backend { status: 404, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_backend_detail() {
        let err = MatchError::Backend {
            status: 404,
            detail: Some("Patient not found".into()),
        };
        assert_eq!(err.user_message("Failed to load patient"), "Patient not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn user_message_falls_back_without_detail() {
        let err = MatchError::Backend {
            status: 500,
            detail: None,
        };
        assert_eq!(err.user_message("Failed to load patient"), "Failed to load patient");
        assert!(!err.is_not_found());

        let err = MatchError::Network("connection refused".into());
        assert_eq!(err.user_message("Failed to load patient"), "Failed to load patient");
    }

    #[test]
    fn backend_error_display_includes_detail() {
        let err = MatchError::Backend {
            status: 500,
            detail: Some("Data not loaded".into()),
        };
        assert_eq!(err.to_string(), "Backend trả lỗi HTTP 500: Data not loaded");
    }
}
