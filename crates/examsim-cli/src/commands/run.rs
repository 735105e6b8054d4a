//! The `examsim run` command.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use tokio::sync::mpsc;

use examsim_core::config::load_config_from;
use examsim_core::engine::{Command, ExamEngine, ExamObserver};
use examsim_core::parser::{self, FileSource};
use examsim_core::report::ExamReport;
use examsim_core::review::ReviewItem;
use examsim_core::scoring::ScoreResult;
use examsim_core::session::QuestionView;
use examsim_core::timer::TimeDisplay;
use examsim_core::{Direction, ExamError, Phase, Session};
use examsim_report::write_html_report;

pub struct RunArgs {
    pub questions: PathBuf,
    pub duration: Option<u64>,
    pub seed: Option<u64>,
    pub no_shuffle: bool,
    pub title: Option<String>,
    pub report_dir: Option<PathBuf>,
    pub format: String,
    pub config: Option<PathBuf>,
}

const HELP: &str = "Commands: <number> choose option, n next, p previous, s submit, \
r review, t time, restart, q quit";

/// Terminal presentation layer.
struct ConsoleRenderer {
    last_time: Mutex<TimeDisplay>,
}

impl ConsoleRenderer {
    fn new(start: TimeDisplay) -> Self {
        Self {
            last_time: Mutex::new(start),
        }
    }

    fn time_left(&self) -> TimeDisplay {
        *self.last_time.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Whether a countdown value is worth printing on its own line.
fn should_announce(remaining_secs: u64) -> bool {
    remaining_secs == 0
        || remaining_secs % 1800 == 0
        || (remaining_secs <= 300 && remaining_secs % 60 == 0)
        || remaining_secs <= 10
}

fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round()) as usize;
    format!(
        "[{}{}] {:.0}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        fraction * 100.0
    )
}

impl ExamObserver for ConsoleRenderer {
    fn render_question(&self, view: &QuestionView<'_>) {
        println!();
        println!(
            "Question {}/{}  (time left {})",
            view.position + 1,
            view.total,
            self.time_left()
        );
        println!("{}", view.question.question);
        for (i, option) in view.question.options.iter().enumerate() {
            let mark = if view.selected == Some(i) { "*" } else { " " };
            println!(" {mark} {}) {option}", i + 1);
        }

        let mut controls = Vec::new();
        if view.navigation.can_go_previous {
            controls.push("p previous");
        }
        if view.navigation.can_go_next {
            controls.push("n next");
        }
        if view.navigation.is_last {
            controls.push("s submit");
        }
        println!("[{}]", controls.join(" | "));
    }

    fn render_progress(&self, fraction: f64) {
        println!("{}", progress_bar(fraction, 20));
    }

    fn render_timer(&self, remaining: TimeDisplay) {
        *self.last_time.lock().unwrap_or_else(|e| e.into_inner()) = remaining;
        let secs = remaining.total_secs();
        if secs == 0 {
            println!("\nTime is up! Your answers have been submitted.");
        } else if should_announce(secs) {
            println!("Time left: {remaining}");
        }
    }

    fn render_results(&self, score: &ScoreResult) {
        let mut table = Table::new();
        table.set_header(vec!["Score", "Percentage", "Result"]);
        table.add_row(vec![
            Cell::new(format!("{} / {}", score.correct_count, score.total_count)),
            Cell::new(format!("{:.0}%", score.percentage)),
            Cell::new(score.tier.css_class()),
        ]);

        println!("\nResults: {score}");
        println!("{table}");
        println!("{}", score.tier.message());
        println!("Type r to review your answers, restart to try again, q to quit.");
    }

    fn render_review(&self, review: &[ReviewItem]) {
        println!("\nReview");
        for item in review {
            let status = if item.is_correct {
                "correct"
            } else if item.unanswered {
                "not answered"
            } else {
                "incorrect"
            };
            println!("\n{}. {} [{status}]", item.position + 1, item.question);
            for (i, option) in item.options.iter().enumerate() {
                let mark = if option.is_correct_option {
                    "+"
                } else if option.is_user_selected_incorrect_option {
                    "x"
                } else {
                    " "
                };
                println!(" {mark} {}) {}", i + 1, option.text);
            }
            if !item.explanation.trim().is_empty() {
                println!("   {}", item.explanation);
            }
        }
    }

    fn render_error(&self, error: &ExamError) {
        eprintln!("  ! {error}");
    }
}

/// A parsed line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Command(Command),
    Help,
    Empty,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }

    if let Ok(n) = line.parse::<usize>() {
        return match n.checked_sub(1) {
            Some(option) => Input::Command(Command::Stage(option)),
            None => Input::Unknown(line.to_string()),
        };
    }

    let command = match line.to_lowercase().as_str() {
        "n" | "next" => Command::Navigate(Direction::Next),
        "p" | "prev" | "previous" => Command::Navigate(Direction::Previous),
        "s" | "submit" => Command::Submit,
        "r" | "review" => Command::Review,
        "t" | "time" | "show" => Command::Refresh,
        "restart" => Command::Restart,
        "q" | "quit" | "exit" => Command::Quit,
        "h" | "help" | "?" => return Input::Help,
        _ => return Input::Unknown(line.to_string()),
    };
    Input::Command(command)
}

/// Read stdin on a plain thread so an unfinished read never blocks shutdown.
fn spawn_input_reader(tx: mpsc::Sender<Command>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match parse_input(&line) {
                Input::Command(command) => {
                    if tx.blocking_send(command).is_err() {
                        break;
                    }
                }
                Input::Help => println!("{HELP}"),
                Input::Empty => {}
                Input::Unknown(text) => eprintln!("  ? unknown command '{text}' (h for help)"),
            }
        }
    });
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let mut config = load_config_from(args.config.as_deref())?;
    if let Some(duration) = args.duration {
        config.duration_secs = duration;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if args.no_shuffle {
        config.shuffle = false;
    }
    if let Some(title) = args.title {
        config.title = title;
    }
    config.validate()?;

    let formats: Vec<&str> = if args.format == "all" {
        vec!["json", "html"]
    } else {
        args.format.split(',').map(|s| s.trim()).collect()
    };
    if let Some(bad) = formats.iter().find(|f| !matches!(**f, "json" | "html")) {
        anyhow::bail!("unknown report format: {bad}");
    }

    let source = Arc::new(FileSource::new(&args.questions));
    let store = parser::load(source.as_ref())
        .await
        .with_context(|| format!("could not load questions from {}", args.questions.display()))?;

    let session = Session::new(store, &config);
    let renderer = Arc::new(ConsoleRenderer::new(session.time_display()));
    let mut engine = ExamEngine::new(session, renderer).with_source(source);

    println!(
        "{} - {} questions, {} allowed",
        config.title,
        engine.session().order().len(),
        TimeDisplay::from_secs(config.duration_secs)
    );
    println!("{HELP}");

    engine.begin()?;

    let (tx, rx) = mpsc::channel(32);
    spawn_input_reader(tx);
    let outcome = engine.run(rx).await;

    if outcome.phase != Phase::Finished {
        println!(
            "\nExam closed before submission ({} of {} answered).",
            outcome.answered,
            engine.session().order().len()
        );
        return Ok(());
    }

    if let Some(dir) = &args.report_dir {
        let report = ExamReport::from_session(engine.session(), config.title.clone())?;
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

        for fmt in &formats {
            match *fmt {
                "json" => {
                    let path = dir.join(format!("exam-{timestamp}.json"));
                    report.save_json(&path)?;
                    eprintln!("Results saved to: {}", path.display());
                }
                "html" => {
                    let path = dir.join(format!("exam-{timestamp}.html"));
                    write_html_report(&report, &path)?;
                    eprintln!("HTML report: {}", path.display());
                }
                _ => unreachable!("formats are validated before the exam"),
            }
        }
        tracing::debug!(attempts = outcome.attempts, "reports written");
    }

    Ok(())
}
