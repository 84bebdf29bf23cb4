//! Các màn hình của dashboard.

use std::ops::Deref;
use std::rc::Rc;

use trialmatch_api::MatchClient;
use trialmatch_core::MatchError;
use wasm_bindgen::JsValue;
use web_sys::console;

mod custom_matcher;
mod dashboard;
mod match_card;
mod navbar;
mod patient_detail;
mod patient_list;

pub use custom_matcher::CustomMatcher;
pub use dashboard::Dashboard;
pub use match_card::MatchList;
pub use navbar::Navbar;
pub use patient_detail::PatientDetail;
use patient_detail::render_history;
pub use patient_list::PatientList;

/// Client API dùng chung giữa các màn hình; so sánh theo con trỏ để làm props.
///
/// Máy trạng thái của mỗi màn hình nằm trong `Rc<RefCell<_>>` (`use_mut_ref`) thay vì
/// `use_state`: future của `spawn_local` cần đọc đúng tracker hiện tại khi phản hồi về để bỏ
/// vé lỗi thời, còn bản chụp của `use_state` thì cố định tại lúc gửi yêu cầu.
#[derive(Clone)]
pub struct Gateway(Rc<MatchClient>);

impl Gateway {
    pub fn new(client: MatchClient) -> Self {
        Self(Rc::new(client))
    }
}

impl PartialEq for Gateway {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for Gateway {
    type Target = MatchClient;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub fn report_error(context: &str, err: &MatchError) {
    console::error_1(&JsValue::from_str(&format!("{context}: {err}")));
}
