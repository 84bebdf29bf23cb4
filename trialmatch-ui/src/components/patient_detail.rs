use std::cell::RefCell;
use std::rc::Rc;

use trialmatch_core::presenter::DETAIL_LIST_LIMIT;
use trialmatch_core::{truncate_list, DetailDisplay, DetailView, Patient, RequestTicket};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use super::{report_error, Gateway, MatchList};

#[derive(Properties, PartialEq)]
pub struct PatientDetailProps {
    pub gateway: Gateway,
    pub patient_id: String,
    pub on_back: Callback<()>,
}

fn load_detail(
    view: Rc<RefCell<DetailView>>,
    gateway: Gateway,
    trigger: UseForceUpdateHandle,
    ticket: RequestTicket<String>,
) {
    trigger.force_update();

    spawn_local(async move {
        let result = gateway.fetch_patient_detail(ticket.key()).await;
        if let Err(err) = &result {
            report_error("Patient detail", err);
        }
        if view.borrow_mut().apply(&ticket, result) {
            trigger.force_update();
        }
    });
}

#[function_component(PatientDetail)]
pub fn patient_detail(props: &PatientDetailProps) -> Html {
    let view = use_mut_ref(DetailView::default);
    let trigger = use_force_update();

    {
        let view = view.clone();
        let gateway = props.gateway.clone();
        let trigger = trigger.clone();
        use_effect_with(props.patient_id.clone(), move |patient_id| {
            let ticket = view.borrow_mut().begin(patient_id);
            load_detail(view, gateway, trigger, ticket);
            || ()
        });
    }

    let on_retry = {
        let view = view.clone();
        let gateway = props.gateway.clone();
        let trigger = trigger.clone();
        Callback::from(move |_: MouseEvent| {
            let ticket = view.borrow_mut().retry();
            if let Some(ticket) = ticket {
                load_detail(view.clone(), gateway.clone(), trigger.clone(), ticket);
            }
        })
    };

    let on_back = {
        let on_back = props.on_back.clone();
        Callback::from(move |_: MouseEvent| on_back.emit(()))
    };

    let snapshot = view.borrow();
    let content = match snapshot.display() {
        DetailDisplay::Idle | DetailDisplay::Loading => html! {
            <section class="tm-card">
                <p class="tm-placeholder">{"Loading patient details..."}</p>
            </section>
        },
        DetailDisplay::NotFound => html! {
            <section class="tm-card">
                <p class="tm-placeholder">{"Patient not found."}</p>
            </section>
        },
        DetailDisplay::Error(message) => html! {
            <div class="tm-error" role="alert">
                <span>{ message }</span>
                <button class="tm-button" type="button" onclick={on_retry}>{"Retry"}</button>
            </div>
        },
        DetailDisplay::Ready(detail) => html! {
            <>
                { render_patient(&detail.patient) }
                <section class="tm-card">
                    <h2>{"Matched Clinical Trials"}</h2>
                    {
                        if detail.matches.is_empty() {
                            html! { <p class="tm-placeholder">{"No suitable trials found."}</p> }
                        } else {
                            html! {
                                <>
                                    <p>{ format!("Found {} matching trials", detail.matches.len()) }</p>
                                    <MatchList gateway={props.gateway.clone()} matches={detail.matches.clone()} />
                                </>
                            }
                        }
                    }
                </section>
            </>
        },
    };

    html! {
        <>
            <div>
                <button class="tm-button is-secondary" type="button" onclick={on_back}>{"← Back to patients"}</button>
            </div>
            { content }
        </>
    }
}

fn render_patient(patient: &Patient) -> Html {
    html! {
        <section class="tm-card">
            <h2>{"Patient Information"}</h2>
            <div class="tm-info-grid">
                <div class="tm-metric">
                    <span class="tm-metric-label">{"Patient ID"}</span>
                    <span class="tm-metric-value">{ patient.id.clone() }</span>
                </div>
                <div class="tm-metric">
                    <span class="tm-metric-label">{"Age"}</span>
                    <span class="tm-metric-value">{ format!("{} years", patient.age) }</span>
                </div>
                <div class="tm-metric">
                    <span class="tm-metric-label">{"Gender"}</span>
                    <span class="tm-metric-value">{ patient.gender.label() }</span>
                </div>
            </div>
            <div class="tm-history">
                { render_history("Conditions", &patient.conditions, "No conditions recorded") }
                { render_history("Medications", &patient.medications, "No medications recorded") }
            </div>
        </section>
    }
}

pub(super) fn render_history(title: &str, items: &[String], empty_label: &str) -> Html {
    let truncated = truncate_list(items, DETAIL_LIST_LIMIT);

    html! {
        <div>
            <h3>{ title }</h3>
            <ul>
                {
                    if items.is_empty() {
                        html! { <li class="tm-more">{ empty_label }</li> }
                    } else {
                        html! {
                            <>
                                { for truncated.shown.iter().map(|item| html! { <li>{ item.clone() }</li> }) }
                                {
                                    truncated
                                        .more_label()
                                        .map(|label| html! { <li class="tm-more">{ label }</li> })
                                        .unwrap_or_default()
                                }
                            </>
                        }
                    }
                }
            </ul>
        </div>
    }
}
