//! Command bodies: the thin presentation layer over the journal core.

use std::collections::{BTreeMap, HashMap};
use std::error::Error;

use chrono::{Local, NaiveDate};
use colored::Colorize;
use dialoguer::{Confirm, Input};
use tracing::warn;

use crate::cli::{
    AddQuestionArgs, ChallengeCommand, CheckinArgs, CreateChallengeArgs, NotifyCommand,
    QuestionCommand, TrendsArgs,
};
use crate::journal::Journal;
use crate::notify::{self, NotificationScheduler};
use crate::stats::{self, TrendStat};
use crate::store::KeyValueStore;
use crate::subscription::{EntitlementProvider, EntitlementService};
use crate::types::{
    ChallengeGoal, DailyResponse, MonthlyChallenge, Question, QuestionKind, ResponseValue,
    format_scalar,
};

type CommandResult = Result<(), Box<dyn Error>>;

pub async fn checkin<S: KeyValueStore>(journal: &Journal<S>, args: CheckinArgs) -> CommandResult {
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let questions = journal.active_questions().await;
    if questions.is_empty() {
        println!("No active questions. Add one with `question add`.");
        return Ok(());
    }

    let existing: HashMap<String, DailyResponse> = journal
        .responses_for(date)
        .await
        .into_iter()
        .map(|r| (r.question_id.clone(), r))
        .collect();

    println!("{}", format!("Check-in for {date}").bold());
    let mut saved = 0usize;
    let mut failed = 0usize;
    for question in &questions {
        let Some(value) = prompt_for(question, existing.get(&question.id))? else {
            continue;
        };
        match journal.record(date, &question.id, value).await {
            Ok(_) => saved += 1,
            Err(err) => {
                // Earlier answers stay committed; there is no rollback.
                failed += 1;
                eprintln!("{}", format!("  failed to save: {err}").red());
            }
        }
    }

    if failed > 0 {
        println!(
            "{}",
            format!("Saved {saved} of {} answers; {failed} failed.", saved + failed).yellow()
        );
    } else {
        println!("{}", format!("Saved {saved} answers.").green());
    }
    Ok(())
}

/// One prompt per question kind; the stored answer for the day, if any, is
/// offered as the default. An empty text answer skips the question.
fn prompt_for(
    question: &Question,
    existing: Option<&DailyResponse>,
) -> Result<Option<ResponseValue>, Box<dyn Error>> {
    match question.kind {
        QuestionKind::YesNo => {
            let default = existing
                .and_then(|r| r.response.as_yes())
                .unwrap_or(false);
            let answer = Confirm::new()
                .with_prompt(&question.text)
                .default(default)
                .interact()?;
            Ok(Some(ResponseValue::YesNo(answer)))
        }
        QuestionKind::Number => {
            let mut input = Input::<f64>::new().with_prompt(&question.text);
            if let Some(default) = existing.and_then(|r| r.response.as_number()) {
                input = input.default(default);
            }
            Ok(Some(ResponseValue::Number(input.interact_text()?)))
        }
        QuestionKind::Text => {
            let mut input = Input::<String>::new()
                .with_prompt(&question.text)
                .allow_empty(true);
            if let Some(ResponseValue::Text(default)) = existing.map(|r| &r.response) {
                input = input.default(default.clone());
            }
            let answer = input.interact_text()?;
            if answer.trim().is_empty() {
                Ok(None)
            } else {
                Ok(Some(ResponseValue::Text(answer)))
            }
        }
    }
}

pub async fn trends<S: KeyValueStore>(journal: &Journal<S>, args: TrendsArgs) -> CommandResult {
    let questions = journal.active_questions().await;
    if questions.is_empty() {
        println!("No data yet");
        return Ok(());
    }

    let all = journal.all_responses().await;
    let today = Local::now().date_naive();
    println!("{}", format!("Last {} days", args.days).dimmed());

    for question in &questions {
        let responses = stats::responses_in_window(&all, &question.id, today, args.days);
        let summary = stats::trend_summary(question, &responses, args.days);

        println!();
        if let Some(topic) = &question.topic {
            println!("{}", topic.to_uppercase().magenta().bold());
        }
        println!("{}", question.text.bold());
        println!(
            "  {} entries, response rate {}%",
            summary.entries, summary.response_rate
        );
        match summary.stat {
            Some(TrendStat::YesNo {
                yes_count,
                total,
                percentage,
            }) => println!("  {yes_count}/{total} times (yes), {percentage}%"),
            Some(TrendStat::Number { total, average }) => println!(
                "  total {}, avg: {average}",
                format_scalar(total)
            ),
            None => {}
        }

        let series = stats::chart_series(question, &responses);
        if !series.is_empty() {
            let rendered: Vec<String> = series
                .iter()
                .map(|p| format!("{}:{}", p.label, format_scalar(p.value)))
                .collect();
            println!("  {}", rendered.join("  ").dimmed());
        }
    }
    Ok(())
}

pub async fn challenge<S: KeyValueStore>(
    journal: &Journal<S>,
    command: ChallengeCommand,
) -> CommandResult {
    match command {
        ChallengeCommand::List => {
            let challenges = journal.active_challenges().await;
            if challenges.is_empty() {
                println!("No active challenge yet. Create one with `challenge create`.");
                return Ok(());
            }
            // Paused questions drop out of the challenge view too.
            let questions = journal.active_questions().await;
            let all = journal.all_responses().await;
            for challenge in &challenges {
                render_challenge(challenge, &questions, &all);
            }
        }
        ChallengeCommand::Create(args) => create_challenge(journal, args).await?,
        ChallengeCommand::End { id } => {
            journal.deactivate_challenge(&id).await?;
            match journal.challenge(&id).await {
                Some(challenge) => println!("Ended '{}'.", challenge.title),
                None => println!("Challenge {id} ended."),
            }
        }
    }
    Ok(())
}

fn render_challenge(
    challenge: &MonthlyChallenge,
    questions: &[Question],
    all: &BTreeMap<NaiveDate, Vec<DailyResponse>>,
) {
    let progress = stats::challenge_progress(challenge, all, questions);
    let subtitle = questions
        .iter()
        .find(|q| q.id == challenge.question_id)
        .map(|q| q.topic.clone().unwrap_or_else(|| q.text.clone()))
        .unwrap_or_else(|| challenge.question_id.clone());

    const BAR_WIDTH: u32 = 20;
    let filled = (progress.percent * BAR_WIDTH / 100) as usize;
    let bar = format!(
        "{}{}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH as usize - filled)
    );

    println!();
    println!("{}  {}", challenge.title.bold(), subtitle.dimmed());
    println!("  [{}] {} / {} ({}%)",
        bar.cyan(),
        progress.label,
        format_scalar(progress.goal),
        progress.percent
    );
    println!(
        "  {}",
        format!("{} to {} ({})", challenge.start_date, challenge.end_date, challenge.id).dimmed()
    );
}

async fn create_challenge<S: KeyValueStore>(
    journal: &Journal<S>,
    args: CreateChallengeArgs,
) -> CommandResult {
    let Some(question) = journal.question(&args.question).await else {
        println!("{}", format!("No question with id {}", args.question).red());
        return Ok(());
    };
    if question.paused {
        println!("{}", "That question is paused; resume it first.".red());
        return Ok(());
    }

    let allowed = stats::goal_types_for(question.kind);
    let goal_type: ChallengeGoal = match args.goal_type {
        Some(goal_type) => {
            let goal_type = goal_type.into();
            if !allowed.contains(&goal_type) {
                println!(
                    "{}",
                    format!(
                        "Goal type {goal_type:?} does not fit a {} question (allowed: {allowed:?})",
                        question.kind.as_str()
                    )
                    .red()
                );
                return Ok(());
            }
            goal_type
        }
        None => allowed[0],
    };

    let challenge = journal
        .add_challenge(args.title, question.id, goal_type, args.goal)
        .await?;
    println!(
        "Created challenge {} ({} to {}).",
        challenge.id.bold(),
        challenge.start_date,
        challenge.end_date
    );
    Ok(())
}

pub async fn question<S: KeyValueStore>(
    journal: &Journal<S>,
    command: QuestionCommand,
) -> CommandResult {
    match command {
        QuestionCommand::List => {
            for question in journal.questions().await {
                let marker = if question.paused {
                    "paused".yellow()
                } else {
                    "active".green()
                };
                println!(
                    "{}  [{}] ({}) {}",
                    question.id.bold(),
                    marker,
                    question.kind.as_str(),
                    question.text
                );
            }
        }
        QuestionCommand::Add(args) => add_question(journal, args).await?,
        QuestionCommand::Pause { id } => {
            journal.set_question_paused(&id, true).await?;
            println!("Question {id} paused.");
        }
        QuestionCommand::Resume { id } => {
            journal.set_question_paused(&id, false).await?;
            println!("Question {id} resumed.");
        }
        QuestionCommand::Delete { id } => {
            journal.delete_question(&id).await?;
            println!("Question {id} deleted. Its recorded answers are kept.");
        }
    }
    Ok(())
}

async fn add_question<S: KeyValueStore>(
    journal: &Journal<S>,
    args: AddQuestionArgs,
) -> CommandResult {
    let question = journal
        .add_question(args.text, args.kind.into(), args.category, args.topic)
        .await?;
    println!("Added question {}.", question.id.bold());
    Ok(())
}

pub async fn notify<S: KeyValueStore>(
    journal: &Journal<S>,
    scheduler: &impl NotificationScheduler,
    command: NotifyCommand,
) -> CommandResult {
    match command {
        NotifyCommand::Show => match journal.notification_time().await {
            Some(time) => println!("Daily reminder at {}", time.format("%H:%M")),
            None => println!("No reminder configured."),
        },
        NotifyCommand::Set { time } => {
            let at = notify::parse_time(time.trim())?;
            journal.set_notification_time(at).await?;
            scheduler.schedule_daily(at);
            println!("Daily reminder set for {}.", at.format("%H:%M"));
        }
    }
    Ok(())
}

pub async fn status<S: KeyValueStore, P: EntitlementProvider>(
    service: &EntitlementService<'_, S, P>,
) -> CommandResult {
    let status = service.status().await;
    if status.is_lifetime {
        println!("{}", "Lifetime access".green().bold());
    } else if status.is_monthly {
        match &status.expiration_date {
            Some(expires) => println!(
                "{} (renews/expires {expires})",
                "Monthly subscription".green().bold()
            ),
            None => println!("{}", "Monthly subscription".green().bold()),
        }
    } else if status.is_in_trial {
        println!(
            "{} ({} days remaining)",
            "Free trial".cyan().bold(),
            status.trial_days_remaining
        );
    } else {
        println!("{}", "Trial ended. Subscribe to keep journaling.".red());
    }
    Ok(())
}

/// Gate for everything except `status`: no entitlement, no journaling.
pub async fn ensure_access<S: KeyValueStore, P: EntitlementProvider>(
    service: &EntitlementService<'_, S, P>,
) -> bool {
    if service.has_access().await {
        true
    } else {
        warn!("entitlement check failed, blocking command");
        println!(
            "{}",
            "Your free trial has ended. Subscribe to keep journaling.".red()
        );
        false
    }
}
