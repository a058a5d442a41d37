use anyhow::{anyhow, bail, Context, Result};
use clap::Subcommand;
use interview_portal::question::QuestionOptions;
use interview_portal::time::format_elapsed;
use interview_portal::{
    ApiClient, AssessmentSession, CandidateIdentity, FileHandoff, HandoffStore, QuestionStatus,
    View,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Subcommand)]
pub enum CandidateCommand {
    /// Check the test code and remember who is taking it.
    Enter {
        test_code: String,
        #[clap(long)]
        name: String,
        #[clap(long)]
        email: String,
    },
    /// Take a test entered earlier with `candidate enter`.
    Take { test_code: String },
}

const HELP: &str = "commands: <option key> select | s skip | n next | p previous | g N go to | r review | submit | q quit";

pub async fn candidate(
    client: &ApiClient,
    handoff: &FileHandoff,
    command: CandidateCommand,
) -> Result<()> {
    match command {
        CandidateCommand::Enter {
            test_code,
            name,
            email,
        } => {
            let identity = CandidateIdentity::new(&name, &email)?;
            let test = client
                .public_test(&test_code)
                .await
                .with_context(|| format!("invalid test code {test_code:?}"))?;

            handoff.save(&test_code, &identity)?;
            info!(%test_code, "candidate entered");
            println!(
                "Welcome {}. {:?} has {} questions; run `candidate take {test_code}` to start.",
                identity.name,
                test.name,
                test.questions.len()
            );

            Ok(())
        }
        CandidateCommand::Take { test_code } => take(client, handoff, &test_code).await,
    }
}

async fn take(client: &ApiClient, handoff: &FileHandoff, test_code: &str) -> Result<()> {
    let identity = handoff.load(test_code)?.ok_or_else(|| {
        anyhow!("no candidate details for {test_code:?}; run `candidate enter {test_code}` first")
    })?;

    let test = match client.public_test(test_code).await {
        Ok(test) => test,
        Err(err) => {
            warn!(%test_code, %err, "failed to load test");
            bail!("failed to load test: {err}; run `candidate enter {test_code}` again");
        }
    };

    let mut session = AssessmentSession::start(test_code, identity, test)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    render(&session);
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();

        if input == "q" {
            println!("Quit without submitting.");
            return Ok(());
        }

        if let Err(err) = apply(client, handoff, &mut session, input).await {
            println!("! {err:#}");
        }

        if session.view() == View::Success {
            println!(
                "Thank you {}, your answers were submitted in {}.",
                session.identity().name,
                format_elapsed(session.elapsed_seconds())
            );
            return Ok(());
        }

        render(&session);
    }

    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Action {
    Select(String),
    Skip,
    Next,
    Previous,
    GoTo(usize),
    Review,
    Submit,
    Help,
}

/// Option keys offered by the current question take precedence over commands.
fn parse_action(options: &QuestionOptions, input: &str) -> Result<Action> {
    let action = match input.split_whitespace().collect::<Vec<_>>().as_slice() {
        [key] if options.contains_key(*key) => Action::Select((*key).to_owned()),
        ["s"] => Action::Skip,
        ["n"] => Action::Next,
        ["p"] => Action::Previous,
        ["g", number] => {
            let number: usize = number
                .parse()
                .with_context(|| format!("not a question number: {number}"))?;
            if number == 0 {
                bail!("questions are numbered from 1");
            }
            Action::GoTo(number - 1)
        }
        ["r"] => Action::Review,
        ["submit"] => Action::Submit,
        _ => Action::Help,
    };

    Ok(action)
}

async fn apply(
    client: &ApiClient,
    handoff: &FileHandoff,
    session: &mut AssessmentSession,
    input: &str,
) -> Result<()> {
    match parse_action(&session.current_question().options, input)? {
        Action::Select(key) => session.select(&key)?,
        Action::Skip => {
            session.skip()?;
        }
        Action::Next => {
            session.next()?;
        }
        Action::Previous => session.previous()?,
        Action::GoTo(index) => session.go_to(index)?,
        Action::Review => session.review()?,
        Action::Submit => {
            client
                .submit_session(session, handoff)
                .await
                .context("submission failed, try again")?;
        }
        Action::Help => println!("{HELP}"),
    }

    Ok(())
}

fn render(session: &AssessmentSession) {
    println!();
    println!(
        "{}  [{}]  answered {}  skipped {}  not visited {}",
        session.test_name(),
        format_elapsed(session.elapsed_seconds()),
        session.answered_count(),
        session.skipped_count(),
        session.not_visited_count()
    );

    match session.view() {
        View::Testing => render_question(session),
        View::Preview => render_preview(session),
        View::Success => {}
    }
}

fn render_question(session: &AssessmentSession) {
    let index = session.current_index();
    let question = session.current_question();
    let selected = session.answer(question.id);

    println!("{}", navigator(session));
    println!(
        "Question {} of {} ({}, {})",
        index + 1,
        session.questions().len(),
        question.category_name,
        question.difficulty
    );
    println!("{}", question.text);

    for (key, text) in &question.options {
        let marker = if selected == Some(key.as_str()) { "*" } else { " " };
        println!(" {marker} {key}) {text}");
    }
    println!("{HELP}");
}

fn render_preview(session: &AssessmentSession) {
    println!("Review your answers");

    for (index, question) in session.questions().iter().enumerate() {
        let answer = session.answer(question.id).unwrap_or("-");
        println!("  {:>3}. {}  => {answer}", index + 1, question.text);
    }
    println!("submit | r review | q quit");
}

fn navigator(session: &AssessmentSession) -> String {
    (0..session.questions().len())
        .map(|index| {
            let mark = match session.status(index) {
                _ if index == session.current_index() => '>',
                Some(QuestionStatus::Answered) => '#',
                Some(QuestionStatus::Skipped) => 's',
                Some(QuestionStatus::NotVisited) => '!',
                None => '.',
            };
            format!("{}{mark}", index + 1)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(keys: &[&str]) -> QuestionOptions {
        keys.iter()
            .map(|key| ((*key).to_owned(), format!("option {key}")))
            .collect()
    }

    #[test]
    fn any_offered_option_key_is_selectable() {
        let offered = options(&["a", "b", "e", "f"]);

        assert_eq!(
            parse_action(&offered, "e").unwrap(),
            Action::Select("e".to_owned())
        );
        assert_eq!(
            parse_action(&offered, " f ").unwrap(),
            Action::Select("f".to_owned())
        );
        assert_eq!(parse_action(&offered, "c").unwrap(), Action::Help);
    }

    #[test]
    fn commands_are_parsed() {
        let offered = options(&["a", "b"]);

        assert_eq!(parse_action(&offered, "s").unwrap(), Action::Skip);
        assert_eq!(parse_action(&offered, "g 3").unwrap(), Action::GoTo(2));
        assert_eq!(parse_action(&offered, "submit").unwrap(), Action::Submit);
        assert!(parse_action(&offered, "g 0").is_err());
        assert!(parse_action(&offered, "g x").is_err());
    }
}
