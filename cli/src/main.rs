use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::{debug, info};
use trialmatch_api::{ApiConfig, MatchClient, DEFAULT_BASE_URL};
use trialmatch_core::presenter::{DETAIL_LIST_LIMIT, TITLE_EXCERPT_CHARS};
use trialmatch_core::{
    excerpt, format_metric, truncate_list, CustomMatchView, DetailDisplay, DetailView, Gender,
    MatchOutcome, Patient, RosterView, TrialMatch,
};

#[derive(Parser, Debug)]
#[command(
    name = "trialmatch-cli",
    about = "Tra cứu kết quả ghép bệnh nhân với thử nghiệm lâm sàng từ backend."
)]
struct Args {
    /// Địa chỉ gốc của backend.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    api_base: String,

    /// In log chi tiết.
    #[arg(short, long)]
    verbose: bool,

    /// In kết quả dạng JSON.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Số liệu tổng hợp.
    Stats,
    /// Danh sách bệnh nhân, lọc theo mã.
    Patients {
        #[arg(short, long, default_value = "")]
        filter: String,
    },
    /// Chi tiết bệnh nhân và các thử nghiệm phù hợp.
    Patient { id: String },
    /// Ghép một hồ sơ tự nhập.
    Match {
        #[arg(long, default_value_t = 45)]
        age: u32,
        #[arg(long, default_value = "male")]
        gender: Gender,
        /// Danh sách bệnh lý, phân tách bằng dấu phẩy.
        #[arg(long, default_value = "Type 2 Diabetes, Hypertension")]
        conditions: String,
        /// Danh sách thuốc, phân tách bằng dấu phẩy.
        #[arg(long, default_value = "Metformin, Lisinopril")]
        medications: String,
    },
    /// Thông tin một thử nghiệm.
    Trial { nct_id: String },
    /// Báo cáo kiểm định chất lượng ghép.
    Validation,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let config = ApiConfig::new(&args.api_base);
    let client = MatchClient::new(&config);
    debug!("Using backend at {}", client.base_url());

    match args.command {
        Command::Stats => {
            let stats = client
                .fetch_stats()
                .await
                .context("Không tải được số liệu tổng hợp")?;
            if args.json {
                return print_json(&stats);
            }
            println!("Patients:        {}", format_metric(stats.total_patients));
            println!("Trials:          {}", format_metric(stats.total_trials));
            println!("Matches:         {}", format_metric(stats.total_matches));
            println!(
                "Avg / patient:   {}",
                format_metric(stats.avg_matches_per_patient)
            );
            println!("Time / patient:  {}s", format_metric(stats.avg_time_seconds));
            println!("Speedup:         {}×", format_metric(stats.speedup));
            println!("Accuracy:        {}%", format_metric(stats.accuracy));
            println!("Coverage:        {}%", format_metric(stats.coverage));
        }
        Command::Patients { filter } => {
            let mut view = RosterView::default();
            let ticket = view.begin();
            view.apply(&ticket, client.fetch_patients().await);
            if let Some(message) = view.error_message() {
                bail!(message);
            }

            view.set_query(filter);
            let visible = view.visible();
            info!("{} of {} patients shown", visible.len(), view.total());
            if args.json {
                return print_json(&visible);
            }
            for patient in visible {
                println!(
                    "{:<8} {:>3}  {:<6}  {} conditions",
                    patient.id,
                    patient.age,
                    patient.gender.label(),
                    patient.conditions.len()
                );
            }
        }
        Command::Patient { id } => {
            let mut view = DetailView::default();
            let ticket = view.begin(&id);
            view.apply(&ticket, client.fetch_patient_detail(&id).await);

            let display = view.display();
            match display {
                DetailDisplay::Ready(detail) if args.json => return print_json(detail),
                DetailDisplay::Ready(detail) => {
                    print_patient(&detail.patient);
                    println!();
                    if detail.matches.is_empty() {
                        println!("No suitable trials found.");
                    } else {
                        print_matches(&detail.matches);
                    }
                }
                DetailDisplay::NotFound => bail!("Patient {id} not found"),
                DetailDisplay::Error(message) => bail!(message),
                DetailDisplay::Idle | DetailDisplay::Loading => {
                    bail!("Không nhận được phản hồi cho bệnh nhân {id}")
                }
            }
        }
        Command::Match {
            age,
            gender,
            conditions,
            medications,
        } => {
            let mut view = CustomMatchView::default();
            view.form.age = age.to_string();
            view.form.gender = gender;
            view.form.conditions = conditions;
            view.form.medications = medications;

            let (ticket, request) = view.submit()?;
            view.apply(&ticket, client.submit_custom_match(&request).await);

            if !args.json {
                if let Some(profile) = view.submitted() {
                    println!(
                        "Profile: {} years, {}, conditions: [{}], medications: [{}]",
                        profile.age,
                        profile.gender,
                        profile.conditions.join(", "),
                        profile.medications.join(", ")
                    );
                    println!();
                }
            }

            let outcome = view.outcome();
            match outcome {
                MatchOutcome::Matches(matches) if args.json => return print_json(&matches),
                MatchOutcome::Matches(matches) => print_matches(matches),
                MatchOutcome::NoMatches if args.json => return print_json(&Vec::<TrialMatch>::new()),
                MatchOutcome::NoMatches => println!("No matching trials found for this profile."),
                MatchOutcome::Failed(message) => bail!(message),
                MatchOutcome::Idle | MatchOutcome::Searching => {
                    bail!("Không nhận được phản hồi ghép")
                }
            }
        }
        Command::Trial { nct_id } => {
            let trial = client
                .fetch_trial(&nct_id)
                .await
                .with_context(|| format!("Không tải được thử nghiệm {nct_id}"))?;
            if args.json {
                return print_json(&trial);
            }
            println!("{} - {}", trial.nct_id, trial.title);
            println!("Link:       {}", trial.url());
            println!("Condition:  {}", trial.condition);
            if let Some(range) = trial.age_range() {
                println!("Age:        {range}");
            }
            println!("Gender:     {}", trial.gender);
            println!("Status:     {}", trial.status);
            println!();
            println!("{}", trial.criteria_excerpt());
        }
        Command::Validation => {
            let Some(report) = client
                .fetch_validation()
                .await
                .context("Không tải được báo cáo kiểm định")?
            else {
                println!("Validation report has not been generated yet.");
                return Ok(());
            };
            if args.json {
                return print_json(&report);
            }
            if let Some(strict) = &report.strict_heuristic {
                println!("Accuracy:        {}%", format_metric(strict.accuracy_percent));
                println!(
                    "Valid matches:   {}/{}",
                    strict.valid_matches.unwrap_or(0),
                    strict.total_evaluated.unwrap_or(0)
                );
            }
            if let Some(dist) = &report.score_distribution {
                println!("Avg score:       {}/100", format_metric(dist.avg_score));
                println!("Avg top match:   {}/100", format_metric(dist.avg_top_score));
                println!(
                    "Excellent (≥70): {}%",
                    format_metric(dist.excellent_matches_percent)
                );
            }
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Không serialize kết quả")?;
    println!("{rendered}");
    Ok(())
}

fn print_patient(patient: &Patient) {
    println!(
        "Patient {} | {} years | {}",
        patient.id,
        patient.age,
        patient.gender.label()
    );
    print_history("Conditions", &patient.conditions, "No conditions recorded");
    print_history("Medications", &patient.medications, "No medications recorded");
}

fn print_history(title: &str, items: &[String], empty_label: &str) {
    println!("{title}:");
    if items.is_empty() {
        println!("  {empty_label}");
        return;
    }
    let truncated = truncate_list(items, DETAIL_LIST_LIMIT);
    for item in truncated.shown {
        println!("  - {item}");
    }
    if let Some(more) = truncated.more_label() {
        println!("  ... {more}");
    }
}

fn print_matches(matches: &[TrialMatch]) {
    println!("Found {} matching trials", matches.len());
    for (index, item) in matches.iter().enumerate() {
        println!(
            "#{} [{} {}/100] {} {}",
            index + 1,
            item.tier().label(),
            format_metric(Some(item.score)),
            item.nct_id,
            excerpt(&item.title, TITLE_EXCERPT_CHARS)
        );
        println!("    {} | {}", item.condition, item.url());
        for reason in item.decoded_reasons() {
            let marker = if reason.is_positive { "✓" } else { "✗" };
            println!("    {marker} {}", reason.text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use trialmatch_core::Stats;

    #[test]
    fn arguments_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn match_defaults_mirror_the_form() {
        let args = Args::try_parse_from(["trialmatch-cli", "--json", "match", "--gender", "Female"])
            .expect("valid arguments");
        assert!(args.json);
        match args.command {
            Command::Match { age, gender, .. } => {
                assert_eq!(age, 45);
                assert_eq!(gender, Gender::Female);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn json_output_serializes_sized_and_unsized_values() {
        assert!(print_json(&Stats::default()).is_ok());
        let matches: &[TrialMatch] = &[];
        assert!(print_json(matches).is_ok());
    }
}
