//! Giao diện dashboard ghép thử nghiệm lâm sàng cho môi trường WebAssembly.

#[cfg(target_arch = "wasm32")]
mod components;
#[cfg(target_arch = "wasm32")]
mod styles;

use serde::Deserialize;
use trialmatch_api::ApiConfig;

/// Cấu hình truyền từ JavaScript khi mount; trường vắng mặt giữ giá trị mặc định.
#[derive(Debug, Default, Deserialize)]
pub struct JsApiConfig {
    #[serde(default)]
    pub base_url: Option<String>,
}

impl From<JsApiConfig> for ApiConfig {
    fn from(cfg: JsApiConfig) -> Self {
        match cfg.base_url {
            Some(base_url) if !base_url.trim().is_empty() => ApiConfig::new(base_url),
            _ => ApiConfig::default(),
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod wasm_ui {
    use serde_wasm_bindgen::from_value;
    use trialmatch_api::{ApiConfig, MatchClient};
    use trialmatch_core::{AppState, View};
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::{console, Document, Element, Window};
    use yew::prelude::*;

    use crate::components::{
        report_error, CustomMatcher, Dashboard, Gateway, Navbar, PatientDetail, PatientList,
    };
    use crate::styles;
    use crate::JsApiConfig;

    #[derive(Properties, PartialEq)]
    pub struct AppProps {
        pub gateway: Gateway,
    }

    #[function_component(App)]
    fn app(props: &AppProps) -> Html {
        let state = use_mut_ref(AppState::default);
        let trigger = use_force_update();

        let load_stats = {
            let state = state.clone();
            let gateway = props.gateway.clone();
            let trigger = trigger.clone();
            Callback::from(move |_: ()| {
                let ticket = state.borrow_mut().begin_stats();
                trigger.force_update();

                let state = state.clone();
                let gateway = gateway.clone();
                let trigger = trigger.clone();
                spawn_local(async move {
                    let result = gateway.fetch_stats().await;
                    if let Err(err) = &result {
                        report_error("Stats", err);
                    }
                    if state.borrow_mut().apply_stats(&ticket, result) {
                        trigger.force_update();
                    }
                });
            })
        };

        let load_validation = {
            let state = state.clone();
            let gateway = props.gateway.clone();
            let trigger = trigger.clone();
            Callback::from(move |_: ()| {
                let ticket = state.borrow_mut().begin_validation();
                trigger.force_update();

                let state = state.clone();
                let gateway = gateway.clone();
                let trigger = trigger.clone();
                spawn_local(async move {
                    let result = gateway.fetch_validation().await;
                    if let Err(err) = &result {
                        report_error("Validation", err);
                    }
                    if state.borrow_mut().apply_validation(&ticket, result) {
                        trigger.force_update();
                    }
                });
            })
        };

        {
            let load_stats = load_stats.clone();
            let load_validation = load_validation.clone();
            use_effect_with((), move |_| {
                if let Some(document) = web_sys::window().and_then(|window| window.document()) {
                    if let Err(err) = styles::ensure_styles(&document) {
                        console::error_1(&err);
                    }
                }
                load_stats.emit(());
                load_validation.emit(());
                || ()
            });
        }

        let on_navigate = {
            let state = state.clone();
            let trigger = trigger.clone();
            Callback::from(move |view: View| {
                state.borrow_mut().navigate(view);
                trigger.force_update();
            })
        };

        let on_select = {
            let state = state.clone();
            let trigger = trigger.clone();
            Callback::from(move |patient_id: String| {
                state.borrow_mut().select_patient(patient_id);
                trigger.force_update();
            })
        };

        let on_back = {
            let on_navigate = on_navigate.clone();
            Callback::from(move |_: ()| on_navigate.emit(View::Patients))
        };

        let snapshot = state.borrow();
        let current = snapshot.view();
        let gateway = props.gateway.clone();

        let body = match current {
            View::Dashboard => html! {
                <Dashboard
                    stats={snapshot.stats().clone()}
                    validation={snapshot.validation().clone()}
                    on_retry={load_stats}
                    on_retry_validation={load_validation}
                />
            },
            View::Patients => html! { <PatientList {gateway} {on_select} /> },
            View::PatientDetail => match snapshot.selected_patient() {
                Some(patient_id) => html! {
                    <PatientDetail {gateway} patient_id={patient_id.to_string()} {on_back} />
                },
                None => html! { <p class="tm-placeholder">{"No patient selected."}</p> },
            },
            View::CustomMatch => html! { <CustomMatcher {gateway} /> },
        };

        html! {
            <div class="tm-root">
                <Navbar {current} {on_navigate} />
                <main class="tm-main">{ body }</main>
            </div>
        }
    }

    #[wasm_bindgen]
    pub fn mount_app(selector: &str, config: Option<JsValue>) -> Result<(), JsValue> {
        let window: Window =
            web_sys::window().ok_or_else(|| JsValue::from_str("Không có window"))?;
        let document: Document = window
            .document()
            .ok_or_else(|| JsValue::from_str("Không truy cập được document"))?;

        let target: Element = document
            .query_selector(selector)
            .map_err(|err| JsValue::from_str(&format!("Selector lỗi: {err:?}")))?
            .ok_or_else(|| JsValue::from_str("Không tìm thấy element theo selector"))?;

        let config = match config {
            Some(js_cfg) => ApiConfig::from(from_value::<JsApiConfig>(js_cfg)?),
            None => ApiConfig::default(),
        };
        let gateway = Gateway::new(MatchClient::new(&config));

        yew::Renderer::<App>::with_root_and_props(target, AppProps { gateway }).render();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_ui::mount_app;

#[cfg(not(target_arch = "wasm32"))]
pub fn mount_app(
    _: &str,
    _: Option<wasm_bindgen::JsValue>,
) -> Result<(), wasm_bindgen::JsValue> {
    Err(wasm_bindgen::JsValue::from_str(
        "trialmatch-ui chỉ hỗ trợ biên dịch target wasm32",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_config_overrides_base_url() {
        let cfg = JsApiConfig {
            base_url: Some("https://matcher.example.org/".into()),
        };
        assert_eq!(
            ApiConfig::from(cfg).base_url,
            "https://matcher.example.org"
        );
    }

    #[test]
    fn blank_js_config_keeps_default() {
        assert_eq!(ApiConfig::from(JsApiConfig::default()), ApiConfig::default());
        let blank = JsApiConfig {
            base_url: Some("   ".into()),
        };
        assert_eq!(ApiConfig::from(blank).base_url, "http://localhost:8000");
    }
}
