use std::cell::RefCell;
use std::rc::Rc;

use trialmatch_core::presenter::TITLE_EXCERPT_CHARS;
use trialmatch_core::{
    decode_reason, excerpt, format_metric, RequestTicket, Trial, TrialDetailView, TrialMatch,
    TrialPanel,
};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use super::{report_error, Gateway};

#[derive(Properties, PartialEq)]
pub struct MatchListProps {
    pub gateway: Gateway,
    pub matches: Vec<TrialMatch>,
}

/// Thứ tự do backend xếp hạng sẵn, không sắp xếp lại.
#[function_component(MatchList)]
pub fn match_list(props: &MatchListProps) -> Html {
    html! {
        <ol class="tm-match-list">
            {
                for props.matches.iter().enumerate().map(|(index, item)| html! {
                    <MatchCard
                        key={format!("{}-{}", index, item.nct_id)}
                        gateway={props.gateway.clone()}
                        rank={index + 1}
                        item={item.clone()}
                    />
                })
            }
        </ol>
    }
}

#[derive(Properties, PartialEq)]
struct MatchCardProps {
    gateway: Gateway,
    rank: usize,
    item: TrialMatch,
}

fn load_trial(
    view: Rc<RefCell<TrialDetailView>>,
    gateway: Gateway,
    trigger: UseForceUpdateHandle,
    ticket: RequestTicket<String>,
) {
    spawn_local(async move {
        let result = gateway.fetch_trial(ticket.key()).await;
        if let Err(err) = &result {
            report_error("Trial", err);
        }
        if view.borrow_mut().apply(&ticket, result) {
            trigger.force_update();
        }
    });
}

#[function_component(MatchCard)]
fn match_card(props: &MatchCardProps) -> Html {
    let view = use_mut_ref(TrialDetailView::default);
    let trigger = use_force_update();

    let on_toggle = {
        let view = view.clone();
        let gateway = props.gateway.clone();
        let trigger = trigger.clone();
        let nct_id = props.item.nct_id.clone();
        Callback::from(move |_: MouseEvent| {
            let ticket = view.borrow_mut().toggle(&nct_id);
            trigger.force_update();
            if let Some(ticket) = ticket {
                load_trial(view.clone(), gateway.clone(), trigger.clone(), ticket);
            }
        })
    };

    let item = &props.item;
    let tier = item.tier();
    let colors = tier.color_class();
    let snapshot = view.borrow();
    let toggle_label = if snapshot.is_expanded() {
        "Hide trial details"
    } else {
        "Show trial details"
    };
    let panel = render_panel(snapshot.panel());

    html! {
        <li class="tm-card tm-match">
            <div class="tm-match-header">
                <div>
                    <h3>
                        <span class="tm-match-rank">{ format!("#{}", props.rank) }</span>
                        <span title={item.title.clone()}>{ excerpt(&item.title, TITLE_EXCERPT_CHARS).into_owned() }</span>
                    </h3>
                    <div class="tm-match-meta">
                        <a href={item.url()} target="_blank" rel="noopener noreferrer">{ item.nct_id.clone() }</a>
                        <span>{ item.condition.clone() }</span>
                    </div>
                </div>
                <div class={classes!("tm-score", colors.background, colors.text)}>
                    <span class="tm-score-value">{ format!("{}/100", format_metric(Some(item.score))) }</span>
                    <span class="tm-score-tier">{ tier.label() }</span>
                </div>
            </div>
            <ul class="tm-reasons">
                { for item.reasons.iter().map(|reason| render_reason(reason)) }
            </ul>
            <button class="tm-link-button" type="button" onclick={on_toggle}>{ toggle_label }</button>
            { panel }
        </li>
    }
}

fn render_panel(panel: TrialPanel<'_>) -> Html {
    match panel {
        TrialPanel::Collapsed => Html::default(),
        TrialPanel::Loading => html! { <p class="tm-placeholder">{"Loading trial details..."}</p> },
        TrialPanel::Error(message) => html! {
            <div class="tm-error" role="alert"><span>{ message }</span></div>
        },
        TrialPanel::Ready(trial) => render_trial(trial),
    }
}

fn render_trial(trial: &Trial) -> Html {
    let age = trial.age_range().unwrap_or_else(|| "Not specified".to_string());

    html! {
        <div class="tm-trial-details">
            <dl class="tm-trial-facts">
                <dt>{"Age"}</dt><dd>{ age }</dd>
                <dt>{"Gender"}</dt><dd>{ trial.gender.clone() }</dd>
                <dt>{"Status"}</dt><dd>{ trial.status.clone() }</dd>
            </dl>
            <h4>{"Eligibility Criteria"}</h4>
            <pre class="tm-criteria">{ trial.criteria_excerpt().into_owned() }</pre>
        </div>
    }
}

fn render_reason(reason: &str) -> Html {
    let decoded = decode_reason(reason);
    let (polarity, icon) = if decoded.is_positive {
        ("positive", "✔")
    } else {
        ("negative", "✘")
    };

    html! {
        <li class="tm-reason" data-polarity={polarity}>
            <span class="tm-reason-icon" aria-hidden="true">{ icon }</span>
            <span>{ decoded.text }</span>
        </li>
    }
}
