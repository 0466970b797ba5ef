use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::metadata::{PKG_DESCRIPTION, PKG_NAME, PKG_VERSION};
use crate::types::{ChallengeGoal, QuestionKind};

#[derive(Parser, Debug)]
#[command(name = PKG_NAME)]
#[command(version = PKG_VERSION)]
#[command(about = PKG_DESCRIPTION, long_about = None)]
pub struct Cli {
    /// Directory holding the journal's data files
    #[arg(long, env = "EOD_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Answer the day's questions
    Checkin(CheckinArgs),
    /// Show rolling-window statistics per question
    Trends(TrendsArgs),
    /// Track monthly challenges
    Challenge {
        #[command(subcommand)]
        command: ChallengeCommand,
    },
    /// Manage the question set
    Question {
        #[command(subcommand)]
        command: QuestionCommand,
    },
    /// Show or set the daily reminder time
    Notify {
        #[command(subcommand)]
        command: NotifyCommand,
    },
    /// Show subscription and trial status
    Status,
}

#[derive(Args, Debug)]
pub struct CheckinArgs {
    /// Calendar day to record (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct TrendsArgs {
    /// Rolling window in days
    #[arg(long, default_value_t = crate::stats::DEFAULT_WINDOW_DAYS)]
    pub days: u32,
}

#[derive(Subcommand, Debug)]
pub enum ChallengeCommand {
    /// List active challenges with progress
    List,
    /// Create a challenge for the current month
    Create(CreateChallengeArgs),
    /// End (deactivate) a challenge
    End { id: String },
}

#[derive(Args, Debug)]
pub struct CreateChallengeArgs {
    /// Id of the question the challenge tracks
    #[arg(long)]
    pub question: String,

    #[arg(long, default_value = "Monthly Challenge")]
    pub title: String,

    /// Defaults to the first goal type valid for the question
    #[arg(long, value_enum)]
    pub goal_type: Option<GoalTypeArg>,

    #[arg(long, default_value_t = 10.0)]
    pub goal: f64,
}

#[derive(Subcommand, Debug)]
pub enum QuestionCommand {
    /// List all questions, paused included
    List,
    /// Add a question
    Add(AddQuestionArgs),
    /// Pause a question (kept, with history, but not asked)
    Pause { id: String },
    /// Resume a paused question
    Resume { id: String },
    /// Delete a question; its recorded responses are kept
    Delete { id: String },
}

#[derive(Args, Debug)]
pub struct AddQuestionArgs {
    #[arg(long)]
    pub text: String,

    #[arg(long, value_enum)]
    pub kind: KindArg,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub topic: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum NotifyCommand {
    /// Print the configured reminder time
    Show,
    /// Set the reminder time (HH:MM, 24-hour)
    Set { time: String },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum KindArg {
    YesNo,
    Number,
    Text,
}

impl From<KindArg> for QuestionKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::YesNo => QuestionKind::YesNo,
            KindArg::Number => QuestionKind::Number,
            KindArg::Text => QuestionKind::Text,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum GoalTypeArg {
    /// Count of "yes" answers
    YesCount,
    /// Sum of numeric answers
    Sum,
    /// Count of recorded answers, whatever their value
    CountEntries,
}

impl From<GoalTypeArg> for ChallengeGoal {
    fn from(goal: GoalTypeArg) -> Self {
        match goal {
            GoalTypeArg::YesCount => ChallengeGoal::YesCount,
            GoalTypeArg::Sum => ChallengeGoal::Sum,
            GoalTypeArg::CountEntries => ChallengeGoal::CountEntries,
        }
    }
}
