use std::cell::RefCell;
use std::rc::Rc;

use trialmatch_core::views::AGE_RANGE;
use trialmatch_core::{CustomMatchRequest, CustomMatchView, Gender, MatchOutcome};
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::prelude::*;

use super::{render_history, report_error, Gateway, MatchList};

#[derive(Properties, PartialEq)]
pub struct CustomMatcherProps {
    pub gateway: Gateway,
}

fn submit(view: Rc<RefCell<CustomMatchView>>, gateway: Gateway, trigger: UseForceUpdateHandle) {
    let submission = view.borrow_mut().submit();
    trigger.force_update();

    let (ticket, request) = match submission {
        Ok(submission) => submission,
        Err(err) => {
            report_error("Custom match", &err);
            return;
        }
    };

    spawn_local(async move {
        let result = gateway.submit_custom_match(&request).await;
        if let Err(err) = &result {
            report_error("Custom match", err);
        }
        if view.borrow_mut().apply(&ticket, result) {
            trigger.force_update();
        }
    });
}

#[function_component(CustomMatcher)]
pub fn custom_matcher(props: &CustomMatcherProps) -> Html {
    let view = use_mut_ref(CustomMatchView::default);
    let trigger = use_force_update();

    let on_submit = {
        let view = view.clone();
        let gateway = props.gateway.clone();
        let trigger = trigger.clone();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            submit(view.clone(), gateway.clone(), trigger.clone());
        })
    };

    let on_age = {
        let view = view.clone();
        let trigger = trigger.clone();
        Callback::from(move |event: InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            view.borrow_mut().form.age = input.value();
            trigger.force_update();
        })
    };

    let on_gender = {
        let view = view.clone();
        let trigger = trigger.clone();
        Callback::from(move |event: Event| {
            let select: HtmlSelectElement = event.target_unchecked_into();
            if let Ok(gender) = select.value().parse::<Gender>() {
                view.borrow_mut().form.gender = gender;
            }
            trigger.force_update();
        })
    };

    let on_conditions = {
        let view = view.clone();
        let trigger = trigger.clone();
        Callback::from(move |event: InputEvent| {
            let area: HtmlTextAreaElement = event.target_unchecked_into();
            view.borrow_mut().form.conditions = area.value();
            trigger.force_update();
        })
    };

    let on_medications = {
        let view = view.clone();
        let trigger = trigger.clone();
        Callback::from(move |event: InputEvent| {
            let area: HtmlTextAreaElement = event.target_unchecked_into();
            view.borrow_mut().form.medications = area.value();
            trigger.force_update();
        })
    };

    let snapshot = view.borrow();
    let form = snapshot.form.clone();
    let searching = snapshot.is_searching();
    let profile = snapshot
        .submitted()
        .map(render_profile)
        .unwrap_or_default();
    let results = match snapshot.outcome() {
        MatchOutcome::Idle => Html::default(),
        MatchOutcome::Searching => html! {
            <section class="tm-card"><p class="tm-placeholder">{"Finding matches..."}</p></section>
        },
        MatchOutcome::NoMatches => html! {
            <section class="tm-card">
                <p class="tm-placeholder">{"No matching trials found for this profile."}</p>
            </section>
        },
        MatchOutcome::Matches(matches) => html! {
            <section class="tm-card">
                <h2>{ format!("Found {} matching trials", matches.len()) }</h2>
                <MatchList gateway={props.gateway.clone()} matches={matches.to_vec()} />
            </section>
        },
        MatchOutcome::Failed(message) => html! {
            <div class="tm-error" role="alert"><span>{ message }</span></div>
        },
    };

    html! {
        <>
            <section class="tm-card">
                <h2>{"Custom Patient Match"}</h2>
                <form class="tm-form" onsubmit={on_submit}>
                    <label class="tm-field">
                        <span>{"Age"}</span>
                        <input
                            type="number"
                            min={AGE_RANGE.start().to_string()}
                            max={AGE_RANGE.end().to_string()}
                            value={form.age.clone()}
                            oninput={on_age}
                        />
                    </label>
                    <label class="tm-field">
                        <span>{"Gender"}</span>
                        <select onchange={on_gender}>
                            {
                                for Gender::ALL.into_iter().map(|gender| html! {
                                    <option value={gender.as_str()} selected={gender == form.gender}>
                                        { gender.label() }
                                    </option>
                                })
                            }
                        </select>
                    </label>
                    <label class="tm-field">
                        <span>{"Conditions (comma-separated)"}</span>
                        <textarea rows="3" value={form.conditions.clone()} oninput={on_conditions} />
                    </label>
                    <label class="tm-field">
                        <span>{"Medications (comma-separated)"}</span>
                        <textarea rows="3" value={form.medications.clone()} oninput={on_medications} />
                    </label>
                    <div class="tm-form-actions">
                        <button class="tm-button" type="submit" disabled={searching}>
                            { if searching { "Finding Matches..." } else { "Find Matching Trials" } }
                        </button>
                    </div>
                </form>
            </section>
            { profile }
            { results }
        </>
    }
}

fn render_profile(profile: &CustomMatchRequest) -> Html {
    html! {
        <section class="tm-card">
            <h2>{"Submitted Profile"}</h2>
            <div class="tm-info-grid">
                <div class="tm-metric">
                    <span class="tm-metric-label">{"Age"}</span>
                    <span class="tm-metric-value">{ format!("{} years", profile.age) }</span>
                </div>
                <div class="tm-metric">
                    <span class="tm-metric-label">{"Gender"}</span>
                    <span class="tm-metric-value">{ profile.gender.label() }</span>
                </div>
            </div>
            <div class="tm-history">
                { render_history("Conditions", &profile.conditions, "No conditions entered") }
                { render_history("Medications", &profile.medications, "No medications entered") }
            </div>
        </section>
    }
}
