use trialmatch_core::app::{STATS_ERROR_FALLBACK, VALIDATION_ERROR_FALLBACK};
use trialmatch_core::{format_metric, LoadState, Stats, ValidationReport};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct DashboardProps {
    pub stats: LoadState<Stats>,
    pub validation: LoadState<Option<ValidationReport>>,
    pub on_retry: Callback<()>,
    pub on_retry_validation: Callback<()>,
}

/// Số liệu do App tải một lần lúc khởi động; màn hình này không tự gọi API.
#[function_component(Dashboard)]
pub fn dashboard(props: &DashboardProps) -> Html {
    html! {
        <>
            { render_overview(props) }
            { render_validation(&props.validation, &props.on_retry_validation) }
        </>
    }
}

fn render_overview(props: &DashboardProps) -> Html {
    match &props.stats {
        LoadState::Idle | LoadState::Loading => html! {
            <section class="tm-card">
                <p class="tm-placeholder">{"Loading statistics..."}</p>
            </section>
        },
        LoadState::Failed(err) => {
            let on_retry = props.on_retry.clone();
            html! {
                <div class="tm-error" role="alert">
                    <span>{ err.user_message(STATS_ERROR_FALLBACK) }</span>
                    <button class="tm-button" type="button" onclick={move |_: MouseEvent| on_retry.emit(())}>
                        {"Retry"}
                    </button>
                </div>
            }
        }
        LoadState::Loaded(stats) => render_stats(stats),
    }
}

fn render_stats(stats: &Stats) -> Html {
    let speedup = format!("{}×", format_metric(stats.speedup));
    let time = format!("{}s", format_metric(stats.avg_time_seconds));
    let accuracy = format!("{}%", format_metric(stats.accuracy));
    let coverage = format!("{}%", format_metric(stats.coverage));

    html! {
        <>
            <section class="tm-card">
                <h2>{"Key Metrics"}</h2>
                <div class="tm-metric-grid">
                    { metric("Patients", format_metric(stats.total_patients)) }
                    { metric("Trials", format_metric(stats.total_trials)) }
                    { metric("Matches", format_metric(stats.total_matches)) }
                    { metric("Avg / Patient", format_metric(stats.avg_matches_per_patient)) }
                </div>
            </section>
            <section class="tm-card">
                <h2>{"Performance"}</h2>
                <div class="tm-metric-grid">
                    { metric("Time / Patient", time) }
                    { metric("Speedup", speedup) }
                    { metric("Accuracy", accuracy) }
                    { metric("Coverage", coverage) }
                </div>
            </section>
            <div class="tm-panels">
                <section class="tm-card">
                    <h3>{"How Matching Works"}</h3>
                    <p>
                        {"Each patient is scored against every trial on age range (20 points), \
                          gender (10 points), condition keyword overlap (up to 50 points) and \
                          primary condition similarity (20 points)."}
                    </p>
                </section>
                <section class="tm-card">
                    <h3>{"Validation Criteria"}</h3>
                    <ul>
                        <li>{"Score ≥ 60"}</li>
                        <li>{"At least 2 matching keywords"}</li>
                        <li>{"Age and gender eligibility satisfied"}</li>
                        <li>{"Baseline: 30 minutes of manual screening per patient"}</li>
                    </ul>
                </section>
            </div>
        </>
    }
}

fn metric(label: &'static str, value: String) -> Html {
    html! {
        <div class="tm-metric">
            <span class="tm-metric-label">{ label }</span>
            <span class="tm-metric-value">{ value }</span>
        </div>
    }
}

fn render_validation(
    validation: &LoadState<Option<ValidationReport>>,
    on_retry: &Callback<()>,
) -> Html {
    let body = match validation {
        LoadState::Idle | LoadState::Loading => {
            html! { <p class="tm-placeholder">{"Loading validation report..."}</p> }
        }
        LoadState::Failed(err) => {
            let on_retry = on_retry.clone();
            html! {
                <div class="tm-error" role="alert">
                    <span>{ err.user_message(VALIDATION_ERROR_FALLBACK) }</span>
                    <button class="tm-button" type="button" onclick={move |_: MouseEvent| on_retry.emit(())}>
                        {"Retry"}
                    </button>
                </div>
            }
        }
        LoadState::Loaded(None) => html! {
            <p class="tm-placeholder">{"Validation report has not been generated yet."}</p>
        },
        LoadState::Loaded(Some(report)) => render_report(report),
    };

    html! {
        <section class="tm-card">
            <h2>{"Validation Details"}</h2>
            { body }
        </section>
    }
}

fn render_report(report: &ValidationReport) -> Html {
    let results = match &report.strict_heuristic {
        Some(strict) => html! {
            <div class="tm-metric">
                <span class="tm-metric-label">{"Validation Accuracy"}</span>
                <span class="tm-metric-value">{ format!("{}%", format_metric(strict.accuracy_percent)) }</span>
                <span>
                    { format!(
                        "Valid: {}/{}",
                        strict.valid_matches.unwrap_or(0),
                        strict.total_evaluated.unwrap_or(0)
                    ) }
                </span>
            </div>
        },
        None => html! { <p class="tm-placeholder">{"No validation results."}</p> },
    };

    let distribution = match &report.score_distribution {
        Some(dist) => html! {
            <div class="tm-metric-grid">
                { metric("Avg Score", format!("{}/100", format_metric(dist.avg_score))) }
                { metric("Avg Top Match", format!("{}/100", format_metric(dist.avg_top_score))) }
                { metric("Excellent (≥70)", format!("{}%", format_metric(dist.excellent_matches_percent))) }
            </div>
        },
        None => Html::default(),
    };

    html! {
        <div class="tm-panels">
            <div>
                <h3>{"Validation Results"}</h3>
                { results }
            </div>
            <div>
                <h3>{"Score Distribution"}</h3>
                { distribution }
            </div>
        </div>
    }
}
