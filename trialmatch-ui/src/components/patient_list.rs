use std::cell::RefCell;
use std::rc::Rc;

use trialmatch_core::{LoadState, Patient, RosterView};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use super::{report_error, Gateway};

#[derive(Properties, PartialEq)]
pub struct PatientListProps {
    pub gateway: Gateway,
    pub on_select: Callback<String>,
}

fn load_roster(view: Rc<RefCell<RosterView>>, gateway: Gateway, trigger: UseForceUpdateHandle) {
    let ticket = view.borrow_mut().begin();
    trigger.force_update();

    spawn_local(async move {
        let result = gateway.fetch_patients().await;
        if let Err(err) = &result {
            report_error("Patients", err);
        }
        if view.borrow_mut().apply(&ticket, result) {
            trigger.force_update();
        }
    });
}

#[function_component(PatientList)]
pub fn patient_list(props: &PatientListProps) -> Html {
    let view = use_mut_ref(RosterView::default);
    let trigger = use_force_update();

    {
        let view = view.clone();
        let gateway = props.gateway.clone();
        let trigger = trigger.clone();
        use_effect_with((), move |_| {
            load_roster(view, gateway, trigger);
            || ()
        });
    }

    let on_search = {
        let view = view.clone();
        let trigger = trigger.clone();
        Callback::from(move |event: InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            view.borrow_mut().set_query(input.value());
            trigger.force_update();
        })
    };

    let on_retry = {
        let view = view.clone();
        let gateway = props.gateway.clone();
        let trigger = trigger.clone();
        Callback::from(move |_: MouseEvent| {
            load_roster(view.clone(), gateway.clone(), trigger.clone())
        })
    };

    let snapshot = view.borrow();
    let content = match snapshot.state() {
        LoadState::Idle | LoadState::Loading => {
            html! { <p class="tm-placeholder">{"Loading patients..."}</p> }
        }
        LoadState::Failed(_) => html! {
            <div class="tm-error" role="alert">
                <span>{ snapshot.error_message().unwrap_or_default() }</span>
                <button class="tm-button" type="button" onclick={on_retry}>{"Retry"}</button>
            </div>
        },
        LoadState::Loaded(_) => {
            let visible = snapshot.visible();
            if visible.is_empty() {
                html! { <p class="tm-placeholder">{"No patients match this search."}</p> }
            } else {
                html! {
                    <table class="tm-table">
                        <thead>
                            <tr>
                                <th>{"Patient ID"}</th>
                                <th>{"Age"}</th>
                                <th>{"Gender"}</th>
                                <th>{"Conditions"}</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            { for visible.into_iter().map(|patient| render_row(patient, &props.on_select)) }
                        </tbody>
                    </table>
                }
            }
        }
    };

    let heading = format!("Patients ({})", snapshot.total());
    let query = snapshot.query().to_string();

    html! {
        <section class="tm-card">
            <h2>{ heading }</h2>
            <input
                class="tm-search"
                type="search"
                placeholder="Search by patient ID (e.g. P001)"
                value={query}
                oninput={on_search}
                aria-label="Search patients by ID"
            />
            { content }
        </section>
    }
}

fn render_row(patient: &Patient, on_select: &Callback<String>) -> Html {
    let onclick = {
        let on_select = on_select.clone();
        let patient_id = patient.id.clone();
        Callback::from(move |_: MouseEvent| on_select.emit(patient_id.clone()))
    };

    html! {
        <tr>
            <td>{ patient.id.clone() }</td>
            <td>{ patient.age }</td>
            <td>{ patient.gender.label() }</td>
            <td>{ patient.conditions.len() }</td>
            <td>
                <button class="tm-button is-secondary" type="button" {onclick}>{"View Matches"}</button>
            </td>
        </tr>
    }
}
