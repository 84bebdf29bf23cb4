//! Trạng thái gốc của ứng dụng: màn hình hiện tại, số liệu tổng hợp, bệnh nhân đang chọn.

use serde::{Deserialize, Serialize};

use crate::model::{Stats, ValidationReport};
use crate::tracker::{RequestTicket, RequestTracker};
use crate::views::LoadState;
use crate::MatchError;

pub const STATS_ERROR_FALLBACK: &str = "Failed to load statistics";
pub const VALIDATION_ERROR_FALLBACK: &str = "Failed to load validation report";

/// Các màn hình của dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Dashboard,
    Patients,
    PatientDetail,
    CustomMatch,
}

impl View {
    /// Mục trên thanh điều hướng. Trang chi tiết chỉ mở được qua danh sách bệnh nhân.
    pub const NAV: [View; 3] = [View::Dashboard, View::Patients, View::CustomMatch];

    pub fn label(self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Patients => "Patients",
            View::PatientDetail => "Patient Detail",
            View::CustomMatch => "Custom Match",
        }
    }

    /// Mục điều hướng được tô sáng khi đang ở màn hình này.
    pub fn nav_group(self) -> View {
        match self {
            View::PatientDetail => View::Patients,
            other => other,
        }
    }
}

#[derive(Debug, Default)]
pub struct AppState {
    view: View,
    stats: LoadState<Stats>,
    selected_patient: Option<String>,
    stats_tracker: RequestTracker<()>,
    /// `Loaded(None)`: backend chưa sinh báo cáo kiểm định.
    validation: LoadState<Option<ValidationReport>>,
    validation_tracker: RequestTracker<()>,
}

impl AppState {
    pub fn view(&self) -> View {
        self.view
    }

    /// Chuyển màn hình; trang chi tiết khi chưa chọn bệnh nhân sẽ quay về danh sách.
    pub fn navigate(&mut self, view: View) {
        self.view = match view {
            View::PatientDetail if self.selected_patient.is_none() => View::Patients,
            other => other,
        };
    }

    pub fn select_patient(&mut self, patient_id: impl Into<String>) {
        self.selected_patient = Some(patient_id.into());
        self.view = View::PatientDetail;
    }

    pub fn selected_patient(&self) -> Option<&str> {
        self.selected_patient.as_deref()
    }

    pub fn stats(&self) -> &LoadState<Stats> {
        &self.stats
    }

    pub fn stats_error(&self) -> Option<String> {
        self.stats
            .error()
            .map(|err| err.user_message(STATS_ERROR_FALLBACK))
    }

    pub fn begin_stats(&mut self) -> RequestTicket<()> {
        self.stats = LoadState::Loading;
        self.stats_tracker.begin(())
    }

    pub fn apply_stats(
        &mut self,
        ticket: &RequestTicket<()>,
        result: Result<Stats, MatchError>,
    ) -> bool {
        if !self.stats_tracker.finish(ticket) {
            return false;
        }
        self.stats = match result {
            Ok(stats) => LoadState::Loaded(stats),
            Err(err) => {
                log::warn!("Không tải được số liệu tổng hợp: {err}");
                LoadState::Failed(err)
            }
        };
        true
    }

    pub fn validation(&self) -> &LoadState<Option<ValidationReport>> {
        &self.validation
    }

    pub fn validation_error(&self) -> Option<String> {
        self.validation
            .error()
            .map(|err| err.user_message(VALIDATION_ERROR_FALLBACK))
    }

    pub fn begin_validation(&mut self) -> RequestTicket<()> {
        self.validation = LoadState::Loading;
        self.validation_tracker.begin(())
    }

    pub fn apply_validation(
        &mut self,
        ticket: &RequestTicket<()>,
        result: Result<Option<ValidationReport>, MatchError>,
    ) -> bool {
        if !self.validation_tracker.finish(ticket) {
            return false;
        }
        self.validation = match result {
            Ok(report) => {
                if report.is_none() {
                    log::info!("Backend chưa có báo cáo kiểm định");
                }
                LoadState::Loaded(report)
            }
            Err(err) => {
                log::warn!("Không tải được báo cáo kiểm định: {err}");
                LoadState::Failed(err)
            }
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_dashboard_without_selection() {
        let state = AppState::default();
        assert_eq!(state.view(), View::Dashboard);
        assert_eq!(state.selected_patient(), None);
        assert_eq!(state.stats(), &LoadState::Idle);
    }

    #[test]
    fn selecting_patient_routes_to_detail() {
        let mut state = AppState::default();
        state.navigate(View::Patients);
        state.select_patient("P007");
        assert_eq!(state.view(), View::PatientDetail);
        assert_eq!(state.selected_patient(), Some("P007"));
        assert_eq!(state.view().nav_group(), View::Patients);
    }

    #[test]
    fn detail_without_selection_falls_back_to_roster() {
        let mut state = AppState::default();
        state.navigate(View::PatientDetail);
        assert_eq!(state.view(), View::Patients);
    }

    #[test]
    fn stats_fetch_settles_once() {
        let mut state = AppState::default();
        let ticket = state.begin_stats();
        assert!(state.stats().is_loading());
        assert!(state.apply_stats(&ticket, Ok(Stats::default())));
        assert!(!state.apply_stats(&ticket, Ok(Stats::default())));
        assert!(state.stats().loaded().is_some());
    }

    #[test]
    fn stats_failure_is_reported() {
        let mut state = AppState::default();
        let ticket = state.begin_stats();
        state.apply_stats(&ticket, Err(MatchError::Network("refused".into())));
        assert_eq!(state.stats_error().as_deref(), Some(STATS_ERROR_FALLBACK));
    }

    #[test]
    fn missing_validation_report_is_loaded_as_none() {
        let mut state = AppState::default();
        let ticket = state.begin_validation();
        assert!(state.validation().is_loading());
        assert!(state.apply_validation(&ticket, Ok(None)));
        assert_eq!(state.validation(), &LoadState::Loaded(None));
        assert_eq!(state.validation_error(), None);
    }

    #[test]
    fn validation_reload_drops_older_response() {
        let mut state = AppState::default();
        let first = state.begin_validation();
        let second = state.begin_validation();
        assert!(!state.apply_validation(&first, Err(MatchError::Network("refused".into()))));
        assert!(state.apply_validation(&second, Ok(Some(ValidationReport::default()))));
        assert_eq!(
            state.validation().loaded(),
            Some(&Some(ValidationReport::default()))
        );

        let third = state.begin_validation();
        state.apply_validation(
            &third,
            Err(MatchError::Backend {
                status: 500,
                detail: None,
            }),
        );
        assert_eq!(
            state.validation_error().as_deref(),
            Some(VALIDATION_ERROR_FALLBACK)
        );
    }
}
