//! Máy trạng thái của từng màn hình, tách khỏi I/O.
//!
//! Mỗi màn hình phát một [`RequestTicket`] khi bắt đầu tải và chỉ chấp nhận phản hồi mang thẻ
//! còn hiệu lực. Lớp giao diện tự gọi API rồi trả kết quả về qua `apply`.

use std::ops::RangeInclusive;

use crate::list_field::split_comma_list;
use crate::model::{CustomMatchRequest, Gender, Patient, PatientDetail, Trial, TrialMatch};
use crate::tracker::{RequestTicket, RequestTracker};
use crate::MatchError;

/// Giới hạn tuổi của form hồ sơ tùy chỉnh.
pub const AGE_RANGE: RangeInclusive<u32> = 18..=100;

pub const DETAIL_ERROR_FALLBACK: &str = "Failed to load patient details";
pub const ROSTER_ERROR_FALLBACK: &str = "Failed to load patients";
pub const MATCH_ERROR_FALLBACK: &str = "Failed to find matching trials";
pub const TRIAL_ERROR_FALLBACK: &str = "Failed to load trial details";

/// `idle → loading → {loaded | failed}`.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Idle,
    Loading,
    Loaded(T),
    Failed(MatchError),
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState::Idle
    }
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&MatchError> {
        match self {
            LoadState::Failed(err) => Some(err),
            _ => None,
        }
    }

    fn settle(&mut self, result: Result<T, MatchError>) {
        *self = match result {
            Ok(value) => LoadState::Loaded(value),
            Err(err) => {
                log::warn!("Yêu cầu thất bại: {err}");
                LoadState::Failed(err)
            }
        };
    }
}

/// Lọc danh sách theo mã bệnh nhân, không phân biệt hoa thường.
pub fn filter_roster<'a>(patients: &'a [Patient], query: &str) -> Vec<&'a Patient> {
    let query = query.trim().to_lowercase();
    patients
        .iter()
        .filter(|patient| query.is_empty() || patient.id.to_lowercase().contains(&query))
        .collect()
}

/// Danh sách bệnh nhân cùng ô tìm kiếm.
#[derive(Debug, Default)]
pub struct RosterView {
    state: LoadState<Vec<Patient>>,
    query: String,
    tracker: RequestTracker<()>,
}

impl RosterView {
    pub fn state(&self) -> &LoadState<Vec<Patient>> {
        &self.state
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn begin(&mut self) -> RequestTicket<()> {
        self.state = LoadState::Loading;
        self.tracker.begin(())
    }

    pub fn apply(
        &mut self,
        ticket: &RequestTicket<()>,
        result: Result<Vec<Patient>, MatchError>,
    ) -> bool {
        if !self.tracker.finish(ticket) {
            log::debug!("Bỏ phản hồi danh sách bệnh nhân đã lỗi thời");
            return false;
        }
        self.state.settle(result);
        true
    }

    /// Chỉ tính lại trên dữ liệu đã tải, không phát yêu cầu mới.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn visible(&self) -> Vec<&Patient> {
        self.state
            .loaded()
            .map(|patients| filter_roster(patients, &self.query))
            .unwrap_or_default()
    }

    pub fn total(&self) -> usize {
        self.state.loaded().map(Vec::len).unwrap_or(0)
    }

    pub fn error_message(&self) -> Option<String> {
        self.state
            .error()
            .map(|err| err.user_message(ROSTER_ERROR_FALLBACK))
    }

    pub fn requests_issued(&self) -> u64 {
        self.tracker.issued()
    }
}

/// Trạng thái hiển thị của trang chi tiết.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailDisplay<'a> {
    Idle,
    Loading,
    Ready(&'a PatientDetail),
    /// Phản hồi thành công nhưng thiếu `patient`.
    NotFound,
    /// Lỗi mạng, lỗi backend hoặc phản hồi hỏng; có thể thử lại.
    Error(String),
}

#[derive(Debug, Default)]
pub struct DetailView {
    patient_id: Option<String>,
    state: LoadState<PatientDetail>,
    tracker: RequestTracker<String>,
}

impl DetailView {
    pub fn patient_id(&self) -> Option<&str> {
        self.patient_id.as_deref()
    }

    pub fn begin(&mut self, patient_id: &str) -> RequestTicket<String> {
        self.patient_id = Some(patient_id.to_string());
        self.state = LoadState::Loading;
        self.tracker.begin(patient_id.to_string())
    }

    /// Phát lại yêu cầu cho bệnh nhân đang chọn.
    pub fn retry(&mut self) -> Option<RequestTicket<String>> {
        let patient_id = self.patient_id.clone()?;
        Some(self.begin(&patient_id))
    }

    pub fn apply(
        &mut self,
        ticket: &RequestTicket<String>,
        result: Result<PatientDetail, MatchError>,
    ) -> bool {
        if self.patient_id.as_ref() != Some(ticket.key()) || !self.tracker.finish(ticket) {
            log::debug!("Bỏ phản hồi chi tiết lỗi thời cho {}", ticket.key());
            return false;
        }
        self.state.settle(result);
        true
    }

    pub fn state(&self) -> &LoadState<PatientDetail> {
        &self.state
    }

    pub fn display(&self) -> DetailDisplay<'_> {
        match &self.state {
            LoadState::Idle => DetailDisplay::Idle,
            LoadState::Loading => DetailDisplay::Loading,
            LoadState::Loaded(detail) => DetailDisplay::Ready(detail),
            LoadState::Failed(MatchError::MissingPatient(_)) => DetailDisplay::NotFound,
            LoadState::Failed(err) => {
                DetailDisplay::Error(err.user_message(DETAIL_ERROR_FALLBACK))
            }
        }
    }
}

/// Phần mở rộng của một thẻ kết quả.
#[derive(Debug, Clone, PartialEq)]
pub enum TrialPanel<'a> {
    Collapsed,
    Loading,
    Ready(&'a Trial),
    Error(String),
}

/// Chi tiết thử nghiệm của một thẻ kết quả, chỉ tải khi người dùng mở thẻ lần đầu.
/// Lần mở sau dùng lại dữ liệu đã tải; nếu lần trước lỗi thì tải lại.
#[derive(Debug, Default)]
pub struct TrialDetailView {
    expanded: bool,
    state: LoadState<Trial>,
    tracker: RequestTracker<String>,
}

impl TrialDetailView {
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Đóng/mở thẻ. Trả về thẻ yêu cầu khi cần gọi `/api/trials/{nct_id}`.
    pub fn toggle(&mut self, nct_id: &str) -> Option<RequestTicket<String>> {
        self.expanded = !self.expanded;
        if !self.expanded {
            return None;
        }
        match self.state {
            LoadState::Idle | LoadState::Failed(_) => {
                self.state = LoadState::Loading;
                Some(self.tracker.begin(nct_id.to_string()))
            }
            LoadState::Loading | LoadState::Loaded(_) => None,
        }
    }

    pub fn apply(&mut self, ticket: &RequestTicket<String>, result: Result<Trial, MatchError>) -> bool {
        if !self.tracker.finish(ticket) {
            log::debug!("Bỏ phản hồi thử nghiệm lỗi thời cho {}", ticket.key());
            return false;
        }
        self.state.settle(result);
        true
    }

    pub fn requests_issued(&self) -> u64 {
        self.tracker.issued()
    }

    pub fn panel(&self) -> TrialPanel<'_> {
        if !self.expanded {
            return TrialPanel::Collapsed;
        }
        match &self.state {
            LoadState::Idle | LoadState::Loading => TrialPanel::Loading,
            LoadState::Loaded(trial) => TrialPanel::Ready(trial),
            LoadState::Failed(err) => TrialPanel::Error(err.user_message(TRIAL_ERROR_FALLBACK)),
        }
    }
}

/// Form hồ sơ tự nhập. Tuổi giữ nguyên văn bản người dùng gõ và chỉ được kiểm tra khi gửi;
/// bệnh lý và thuốc nhập dạng chuỗi phân tách bằng dấu phẩy.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomProfileForm {
    pub age: String,
    pub gender: Gender,
    pub conditions: String,
    pub medications: String,
}

impl Default for CustomProfileForm {
    fn default() -> Self {
        Self {
            age: "45".to_string(),
            gender: Gender::Male,
            conditions: "Type 2 Diabetes, Hypertension".to_string(),
            medications: "Metformin, Lisinopril".to_string(),
        }
    }
}

impl CustomProfileForm {
    pub fn to_request(&self) -> Result<CustomMatchRequest, MatchError> {
        let age = self
            .age
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|age| AGE_RANGE.contains(age))
            .ok_or_else(|| {
                MatchError::InvalidProfile(format!(
                    "Age must be a whole number between {} and {}",
                    AGE_RANGE.start(),
                    AGE_RANGE.end()
                ))
            })?;

        Ok(CustomMatchRequest {
            age,
            gender: self.gender,
            conditions: split_comma_list(&self.conditions),
            medications: split_comma_list(&self.medications),
        })
    }
}

/// Kết quả hiển thị của màn hình ghép tùy chỉnh.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome<'a> {
    Idle,
    Searching,
    NoMatches,
    Matches(&'a [TrialMatch]),
    Failed(String),
}

#[derive(Debug, Default)]
pub struct CustomMatchView {
    pub form: CustomProfileForm,
    state: LoadState<Vec<TrialMatch>>,
    submitted: Option<CustomMatchRequest>,
    tracker: RequestTracker<()>,
}

impl CustomMatchView {
    /// Tạo payload và chuyển sang trạng thái tìm kiếm. Lần gửi sau thay thế lần trước.
    pub fn submit(&mut self) -> Result<(RequestTicket<()>, CustomMatchRequest), MatchError> {
        let request = match self.form.to_request() {
            Ok(request) => request,
            Err(err) => {
                self.tracker.cancel();
                self.state = LoadState::Failed(err.clone());
                return Err(err);
            }
        };

        self.state = LoadState::Loading;
        self.submitted = Some(request.clone());
        Ok((self.tracker.begin(()), request))
    }

    pub fn apply(
        &mut self,
        ticket: &RequestTicket<()>,
        result: Result<Vec<TrialMatch>, MatchError>,
    ) -> bool {
        if !self.tracker.finish(ticket) {
            log::debug!("Bỏ phản hồi ghép tùy chỉnh đã lỗi thời");
            return false;
        }
        self.state.settle(result);
        true
    }

    pub fn is_searching(&self) -> bool {
        self.state.is_loading()
    }

    /// Hồ sơ của lần gửi gần nhất.
    pub fn submitted(&self) -> Option<&CustomMatchRequest> {
        self.submitted.as_ref()
    }

    pub fn requests_issued(&self) -> u64 {
        self.tracker.issued()
    }

    pub fn outcome(&self) -> MatchOutcome<'_> {
        match &self.state {
            LoadState::Idle => MatchOutcome::Idle,
            LoadState::Loading => MatchOutcome::Searching,
            LoadState::Loaded(matches) if matches.is_empty() => MatchOutcome::NoMatches,
            LoadState::Loaded(matches) => MatchOutcome::Matches(matches),
            LoadState::Failed(err) => MatchOutcome::Failed(err.user_message(MATCH_ERROR_FALLBACK)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(id: &str) -> Patient {
        Patient {
            id: id.to_string(),
            age: 50,
            gender: Gender::Female,
            conditions: vec![],
            medications: vec![],
        }
    }

    fn trial(nct_id: &str, score: f64) -> TrialMatch {
        TrialMatch {
            nct_id: nct_id.to_string(),
            title: format!("Trial {nct_id}"),
            condition: "Type 2 Diabetes".to_string(),
            score,
            reasons: vec!["✓ Age 45 within range (18-75)".to_string()],
        }
    }

    fn full_trial(nct_id: &str) -> Trial {
        Trial {
            nct_id: nct_id.to_string(),
            title: "Metformin XR in Adults".into(),
            condition: "Type 2 Diabetes".into(),
            age_min: Some(18),
            age_max: Some(75),
            gender: "ALL".into(),
            status: "RECRUITING".into(),
            eligibility_text: "x".repeat(450),
        }
    }

    fn detail(id: &str) -> PatientDetail {
        PatientDetail {
            patient: patient(id),
            matches: vec![trial("NCT001", 80.0)],
        }
    }

    #[test]
    fn roster_filter_is_case_insensitive_and_offline() {
        let mut view = RosterView::default();
        let ticket = view.begin();
        assert!(view.state().is_loading());
        assert!(view.apply(
            &ticket,
            Ok(vec![patient("P001"), patient("P002"), patient("P010"), patient("X100")])
        ));

        view.set_query("p00");
        let ids: Vec<&str> = view.visible().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["P001", "P002"]);
        assert_eq!(view.requests_issued(), 1);

        view.set_query("");
        assert_eq!(view.visible().len(), 4);
        assert_eq!(view.total(), 4);
    }

    #[test]
    fn roster_failure_is_surfaced() {
        let mut view = RosterView::default();
        let ticket = view.begin();
        view.apply(&ticket, Err(MatchError::Network("offline".into())));
        assert_eq!(view.error_message().as_deref(), Some(ROSTER_ERROR_FALLBACK));
        assert!(view.visible().is_empty());
    }

    #[test]
    fn stale_detail_response_is_discarded() {
        let mut view = DetailView::default();
        let first = view.begin("P001");
        let second = view.begin("P002");

        assert!(view.apply(&second, Ok(detail("P002"))));
        assert!(!view.apply(&first, Ok(detail("P001"))));

        match view.display() {
            DetailDisplay::Ready(detail) => assert_eq!(detail.patient.id, "P002"),
            other => panic!("unexpected display state: {other:?}"),
        }
    }

    #[test]
    fn earlier_request_arriving_first_is_ignored_until_current_arrives() {
        let mut view = DetailView::default();
        let first = view.begin("P001");
        let second = view.begin("P002");

        assert!(!view.apply(&first, Ok(detail("P001"))));
        assert_eq!(view.display(), DetailDisplay::Loading);
        assert!(view.apply(&second, Ok(detail("P002"))));
    }

    #[test]
    fn detail_error_prefers_backend_detail_and_retries() {
        let mut view = DetailView::default();
        let ticket = view.begin("P999");
        view.apply(
            &ticket,
            Err(MatchError::Backend {
                status: 404,
                detail: Some("Patient not found".into()),
            }),
        );
        assert_eq!(
            view.display(),
            DetailDisplay::Error("Patient not found".into())
        );

        let retry = view.retry().expect("retry ticket");
        assert_eq!(retry.key(), "P999");
        assert_eq!(view.display(), DetailDisplay::Loading);
    }

    #[test]
    fn missing_patient_payload_is_not_found() {
        let mut view = DetailView::default();
        let ticket = view.begin("P003");
        view.apply(
            &ticket,
            Err(MatchError::MissingPatient("P003".into())),
        );
        assert_eq!(view.display(), DetailDisplay::NotFound);
    }

    #[test]
    fn malformed_detail_is_retryable_error() {
        let mut view = DetailView::default();
        let ticket = view.begin("P001");
        view.apply(
            &ticket,
            Err(MatchError::MalformedResponse("matches[0].score: invalid type: null".into())),
        );
        assert_eq!(
            view.display(),
            DetailDisplay::Error(DETAIL_ERROR_FALLBACK.into())
        );
        assert!(view.retry().is_some());
    }

    #[test]
    fn trial_details_load_once_on_first_expand() {
        let mut view = TrialDetailView::default();
        assert_eq!(view.panel(), TrialPanel::Collapsed);

        let ticket = view.toggle("NCT001").expect("first expand fetches");
        assert_eq!(ticket.key(), "NCT001");
        assert_eq!(view.panel(), TrialPanel::Loading);
        assert!(view.apply(&ticket, Ok(full_trial("NCT001"))));

        match view.panel() {
            TrialPanel::Ready(trial) => {
                assert_eq!(trial.age_range().as_deref(), Some("18-75 years"));
                let criteria = trial.criteria_excerpt();
                assert_eq!(criteria.chars().count(), 403);
                assert!(criteria.ends_with("..."));
            }
            other => panic!("unexpected panel: {other:?}"),
        }

        assert!(view.toggle("NCT001").is_none());
        assert_eq!(view.panel(), TrialPanel::Collapsed);
        assert!(view.toggle("NCT001").is_none());
        assert!(matches!(view.panel(), TrialPanel::Ready(_)));
        assert_eq!(view.requests_issued(), 1);
    }

    #[test]
    fn failed_trial_details_refetch_on_reopen() {
        let mut view = TrialDetailView::default();
        let ticket = view.toggle("NCT002").unwrap();
        view.apply(
            &ticket,
            Err(MatchError::Backend {
                status: 404,
                detail: Some("Trial not found".into()),
            }),
        );
        assert_eq!(view.panel(), TrialPanel::Error("Trial not found".into()));

        assert!(view.toggle("NCT002").is_none());
        let retry = view.toggle("NCT002").expect("reopen after failure refetches");
        assert!(!view.apply(&ticket, Ok(full_trial("NCT002"))));
        assert!(view.apply(&retry, Ok(full_trial("NCT002"))));
        assert_eq!(view.requests_issued(), 2);
    }

    #[test]
    fn retry_without_selection_is_none() {
        let mut view = DetailView::default();
        assert!(view.retry().is_none());
        assert_eq!(view.display(), DetailDisplay::Idle);
    }

    #[test]
    fn custom_submission_builds_single_request() {
        let mut view = CustomMatchView::default();
        let (ticket, request) = view.submit().expect("valid default form");

        assert_eq!(request.age, 45);
        assert_eq!(request.gender, Gender::Male);
        assert_eq!(request.conditions, vec!["Type 2 Diabetes", "Hypertension"]);
        assert_eq!(request.medications, vec!["Metformin", "Lisinopril"]);
        assert_eq!(view.requests_issued(), 1);
        assert_eq!(view.outcome(), MatchOutcome::Searching);

        assert!(view.apply(&ticket, Ok(vec![])));
        assert_eq!(view.outcome(), MatchOutcome::NoMatches);
        assert_eq!(view.submitted(), Some(&request));
    }

    #[test]
    fn custom_resubmission_supersedes_pending_request() {
        let mut view = CustomMatchView::default();
        let (first, _) = view.submit().unwrap();
        view.form.conditions = "Asthma".into();
        let (second, request) = view.submit().unwrap();
        assert_eq!(request.conditions, vec!["Asthma"]);

        assert!(!view.apply(&first, Ok(vec![trial("NCT001", 90.0)])));
        assert!(view.apply(&second, Ok(vec![trial("NCT002", 55.0)])));
        match view.outcome() {
            MatchOutcome::Matches(matches) => assert_eq!(matches[0].nct_id, "NCT002"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn custom_failure_is_visible() {
        let mut view = CustomMatchView::default();
        let (ticket, _) = view.submit().unwrap();
        view.apply(&ticket, Err(MatchError::Network("timeout".into())));
        assert_eq!(
            view.outcome(),
            MatchOutcome::Failed(MATCH_ERROR_FALLBACK.into())
        );
        assert!(!view.is_searching());
    }

    #[test]
    fn out_of_range_age_is_rejected_without_request() {
        let mut view = CustomMatchView::default();
        view.form.age = "12".into();
        assert!(matches!(view.submit(), Err(MatchError::InvalidProfile(_))));
        assert_eq!(view.requests_issued(), 0);
        assert!(matches!(view.outcome(), MatchOutcome::Failed(_)));
    }

    #[test]
    fn cleared_or_garbled_age_blocks_submission() {
        for text in ["", "   ", "4a", "-5", "45.5"] {
            let mut view = CustomMatchView::default();
            view.form.age = text.into();
            assert!(
                matches!(view.submit(), Err(MatchError::InvalidProfile(_))),
                "age {text:?} should be rejected"
            );
            assert_eq!(view.requests_issued(), 0);
            assert_eq!(view.submitted(), None);
        }

        let mut view = CustomMatchView::default();
        view.form.age = " 67 ".into();
        let (_, request) = view.submit().expect("trimmed age is valid");
        assert_eq!(request.age, 67);
    }
}
