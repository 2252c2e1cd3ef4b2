use std::path::{Path, PathBuf};

use clap::Subcommand;
use quizroom_core::{Config, QuestionBank};

#[derive(Subcommand)]
pub enum BankAction {
    /// Check that a bank file can be played
    Validate {
        /// Bank file (.toml or .json)
        path: PathBuf,
    },
    /// Print a bank as JSON (configured bank or built-in sample when omitted)
    Show {
        path: Option<PathBuf>,
    },
    /// Print the built-in sample bank as TOML, ready to edit
    Sample,
}

/// Bank from an explicit path, the configured default, or the built-in sample.
pub fn resolve_bank(
    explicit: Option<&Path>,
    config: &Config,
) -> Result<QuestionBank, Box<dyn std::error::Error>> {
    match explicit.or(config.quiz.bank_path.as_deref()) {
        Some(path) => Ok(QuestionBank::load(path)?),
        None => {
            tracing::info!("no bank file given, using built-in sample");
            Ok(QuestionBank::sample())
        }
    }
}

pub fn run(action: BankAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        BankAction::Validate { path } => {
            let bank = QuestionBank::load(&path)?;
            println!("ok: {} questions", bank.len());
        }
        BankAction::Show { path } => {
            let config = Config::load()?;
            let bank = resolve_bank(path.as_deref(), &config)?;
            println!("{}", serde_json::to_string_pretty(&bank)?);
        }
        BankAction::Sample => {
            let toml = toml::to_string_pretty(&QuestionBank::sample())?;
            print!("{toml}");
        }
    }
    Ok(())
}
