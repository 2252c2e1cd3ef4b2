use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use quizroom_core::{
    Config, CountdownSettings, Event, QuestionId, QuestionView, QuizError, QuizReport, QuizRunner,
    QuizSession, Renderer, UserInput,
};
use serde::Serialize;
use tokio::sync::mpsc;

use super::bank::resolve_bank;

#[derive(Args)]
pub struct PlayArgs {
    /// Question bank file (.toml or .json); defaults to quiz.bank_path or the built-in sample
    #[arg(long)]
    bank: Option<PathBuf>,
    /// Time allowed per question in milliseconds
    #[arg(long)]
    time_ms: Option<u64>,
    /// Seed for a reproducible question order
    #[arg(long)]
    seed: Option<u64>,
    /// Keep options in bank order
    #[arg(long)]
    no_shuffle: bool,
    /// Emit events and the final report as JSON lines
    #[arg(long)]
    json: bool,
}

const PROGRESS_WIDTH: usize = 20;

/// Countdown quarters reported so far for the current question. Only the
/// 25%, 50% and 75% marks are reported, each once.
#[derive(Debug, Default)]
struct QuarterMarks {
    shown: usize,
}

impl QuarterMarks {
    fn reset(&mut self) {
        self.shown = 0;
    }

    /// The quarter `fraction` newly reaches, if any.
    fn cross(&mut self, fraction: f64) -> Option<usize> {
        let quarter = (fraction * 4.0).floor() as usize;
        if quarter == 0 || quarter >= 4 || quarter <= self.shown {
            return None;
        }
        self.shown = quarter;
        Some(quarter)
    }
}

/// Plain-text renderer: prints each question and a coarse countdown bar.
#[derive(Default)]
struct TerminalRenderer {
    marks: QuarterMarks,
}

impl Renderer for TerminalRenderer {
    fn present(&mut self, view: &QuestionView) {
        self.marks.reset();
        println!();
        println!("Question {} / {}", view.number, view.total);
        println!("{}", view.prompt);
        for (i, option) in view.options.iter().enumerate() {
            println!("  {}. {}", i + 1, option);
        }
        if view.can_skip {
            println!("[1-{}] answer, s skip, q quit", view.options.len());
        } else {
            println!("[1-{}] answer, q quit", view.options.len());
        }
        let _ = std::io::stdout().flush();
    }

    fn progress(&mut self, _question: QuestionId, fraction: f64) {
        let Some(quarter) = self.marks.cross(fraction) else {
            return;
        };
        let filled = PROGRESS_WIDTH * quarter / 4;
        println!(
            "  [{}{}] {}%",
            "#".repeat(filled),
            " ".repeat(PROGRESS_WIDTH - filled),
            quarter * 25
        );
    }

    fn event(&mut self, event: &Event) {
        match event {
            Event::QuestionTimedOut { .. } => println!("Time's up!"),
            Event::QuestionSkipped { .. } => println!("Skipped."),
            Event::SessionAbandoned { resolved, total, .. } => {
                println!("Quit after {resolved} of {total} questions.")
            }
            _ => {}
        }
    }

    fn rejected(&mut self, error: &QuizError) {
        eprintln!("{error}");
    }

    fn finish(&mut self, report: &QuizReport) {
        println!();
        println!("{report}");
    }
}

/// Output lines that are not session events.
#[derive(Serialize)]
#[serde(tag = "type")]
enum JsonLine {
    Progress {
        question_id: QuestionId,
        fraction: f64,
    },
}

/// Machine-readable renderer: one JSON object per line.
///
/// The question itself arrives as a `QuestionPresented` event; progress is
/// reported at the same quarter marks as the terminal bar.
#[derive(Default)]
struct JsonRenderer {
    marks: QuarterMarks,
}

impl JsonRenderer {
    fn emit<T: Serialize>(value: &T) {
        match serde_json::to_string(value) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::error!(error = %e, "failed to serialize output"),
        }
    }
}

impl Renderer for JsonRenderer {
    fn present(&mut self, _view: &QuestionView) {
        self.marks.reset();
    }

    fn progress(&mut self, question: QuestionId, fraction: f64) {
        if self.marks.cross(fraction).is_some() {
            Self::emit(&JsonLine::Progress {
                question_id: question,
                fraction,
            });
        }
    }

    fn event(&mut self, event: &Event) {
        Self::emit(event);
    }

    fn rejected(&mut self, error: &QuizError) {
        eprintln!("{error}");
    }

    fn finish(&mut self, report: &QuizReport) {
        Self::emit(report);
    }
}

/// Map one line of user input; `None` means the line was not understood.
fn parse_input(line: &str) -> Option<UserInput> {
    match line.trim().to_ascii_lowercase().as_str() {
        "s" | "skip" => Some(UserInput::Skip),
        "q" | "quit" => Some(UserInput::Quit),
        other => match other.parse::<usize>() {
            Ok(n) if n >= 1 => Some(UserInput::Choose(n - 1)),
            _ => None,
        },
    }
}

/// Read stdin on a plain thread; the session loop only sees the channel.
/// EOF drops the sender, which ends the session.
fn spawn_stdin_reader(tx: mpsc::Sender<UserInput>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match parse_input(&line) {
                Some(input) => {
                    if tx.blocking_send(input).is_err() {
                        break;
                    }
                }
                None => eprintln!("enter an option number, 's' to skip or 'q' to quit"),
            }
        }
    });
}

fn play<R: Renderer>(
    runner: QuizRunner,
    renderer: &mut R,
) -> Result<QuizReport, Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let (tx, rx) = mpsc::channel(16);
    spawn_stdin_reader(tx);
    Ok(runtime.block_on(runner.run(rx, renderer)))
}

pub fn run(args: PlayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let bank = resolve_bank(args.bank.as_deref(), &config)?;

    let mut options = config.sequencer_options();
    if args.seed.is_some() {
        options.seed = args.seed;
    }
    if args.no_shuffle {
        options.shuffle_options = false;
    }

    let mut settings = config.countdown_settings();
    if let Some(ms) = args.time_ms {
        settings = CountdownSettings::new(Duration::from_millis(ms), settings.tick_interval);
    }

    let runner = QuizRunner::new(QuizSession::new(bank, options), settings);
    let report = if args.json {
        play(runner, &mut JsonRenderer::default())?
    } else {
        play(runner, &mut TerminalRenderer::default())?
    };

    tracing::info!(
        correct = report.correct,
        total = report.total,
        finished = report.finished,
        "session ended"
    );
    Ok(())
}
