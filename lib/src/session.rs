//! Candidate-side state for one attempt at a test, from load to submission.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::handoff::CandidateIdentity;
use crate::question::{Difficulty, QuestionId, QuestionOptions};
use crate::raw_data::RawPublicTest;
use crate::time::{Clock, Stopwatch};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SessionQuestion {
    pub id: QuestionId,

    pub text: String,
    pub options: QuestionOptions,
    pub difficulty: Difficulty,
    pub category_name: String,
}

/// A test as the candidate sees it: a name and a fixed question order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicTest {
    pub name: String,
    pub questions: Vec<SessionQuestion>,
}

impl From<RawPublicTest> for PublicTest {
    fn from(raw: RawPublicTest) -> Self {
        Self {
            name: raw.test_name,
            questions: raw.questions.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Testing,
    Preview,
    Success,
}

impl View {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            View::Testing => "testing",
            View::Preview => "preview",
            View::Success => "success",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuestionStatus {
    Answered,
    Skipped,
    NotVisited,
}

/// Everything the backend needs to score an attempt. `answers` follows the
/// test's question order and has one entry per question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    pub test_code: String,
    pub identity: CandidateIdentity,
    pub time_taken: u64,
    pub answers: Vec<(QuestionId, String)>,
}

#[derive(Debug, Clone)]
pub struct AssessmentSession {
    test_code: String,
    identity: CandidateIdentity,
    test: PublicTest,

    answers: HashMap<QuestionId, String>,
    statuses: BTreeMap<usize, QuestionStatus>,
    current: usize,
    view: View,
    submitting: bool,

    clock: Clock,
    stopwatch: Stopwatch,
}

impl AssessmentSession {
    /// Starts a session in the testing view with the stopwatch running.
    pub fn start(
        test_code: impl Into<String>,
        identity: CandidateIdentity,
        test: PublicTest,
    ) -> Result<Self, SessionError> {
        Self::start_with_clock(test_code, identity, test, Clock::default())
    }

    pub fn start_with_clock(
        test_code: impl Into<String>,
        identity: CandidateIdentity,
        test: PublicTest,
        clock: Clock,
    ) -> Result<Self, SessionError> {
        if test.questions.is_empty() {
            return Err(SessionError::Empty);
        }

        let mut stopwatch = Stopwatch::default();
        stopwatch.resume(clock.now());

        Ok(Self {
            test_code: test_code.into(),
            identity,
            test,
            answers: HashMap::new(),
            statuses: BTreeMap::new(),
            current: 0,
            view: View::Testing,
            submitting: false,
            clock,
            stopwatch,
        })
    }

    #[must_use]
    pub fn test_code(&self) -> &str {
        &self.test_code
    }

    #[must_use]
    pub fn test_name(&self) -> &str {
        &self.test.name
    }

    #[must_use]
    pub fn identity(&self) -> &CandidateIdentity {
        &self.identity
    }

    #[must_use]
    pub fn questions(&self) -> &[SessionQuestion] {
        &self.test.questions
    }

    #[must_use]
    pub fn view(&self) -> View {
        self.view
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &SessionQuestion {
        &self.test.questions[self.current]
    }

    #[must_use]
    pub fn answer(&self, question_id: QuestionId) -> Option<&str> {
        self.answers.get(&question_id).map(String::as_str)
    }

    #[must_use]
    pub fn status(&self, index: usize) -> Option<QuestionStatus> {
        self.statuses.get(&index).copied()
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count_status(QuestionStatus::Skipped)
    }

    #[must_use]
    pub fn not_visited_count(&self) -> usize {
        self.count_status(QuestionStatus::NotVisited)
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.stopwatch.elapsed_seconds(self.clock.now())
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// Records `option` as the answer to the current question.
    pub fn select(&mut self, option: &str) -> Result<(), SessionError> {
        self.require(View::Testing)?;

        let question = self.current_question();
        if !question.options.is_empty() && !question.options.contains_key(option) {
            return Err(SessionError::UnknownOption(option.to_owned()));
        }

        let question_id = question.id;
        self.answers.insert(question_id, option.to_owned());
        self.statuses.insert(self.current, QuestionStatus::Answered);

        Ok(())
    }

    /// Marks the current question skipped unless it already has a status, then advances.
    pub fn skip(&mut self) -> Result<View, SessionError> {
        self.require(View::Testing)?;

        self.statuses
            .entry(self.current)
            .or_insert(QuestionStatus::Skipped);

        Ok(self.advance())
    }

    pub fn next(&mut self) -> Result<View, SessionError> {
        self.require(View::Testing)?;

        Ok(self.advance())
    }

    pub fn previous(&mut self) -> Result<(), SessionError> {
        self.require(View::Testing)?;

        self.current = self.current.saturating_sub(1);
        Ok(())
    }

    /// Jumps to `index` from the navigator. Leaving a question nobody touched
    /// marks it not-visited.
    pub fn go_to(&mut self, index: usize) -> Result<(), SessionError> {
        self.require(View::Testing)?;

        if index >= self.test.questions.len() {
            return Err(SessionError::OutOfRange(index));
        }

        let leaving_id = self.current_question().id;
        if !self.statuses.contains_key(&self.current) && !self.answers.contains_key(&leaving_id) {
            self.statuses.insert(self.current, QuestionStatus::NotVisited);
        }

        self.current = index;
        Ok(())
    }

    /// Leaves the preview to review answers from the first question.
    pub fn review(&mut self) -> Result<(), SessionError> {
        self.require(View::Preview)?;
        if self.submitting {
            return Err(SessionError::SubmissionInFlight);
        }

        self.current = 0;
        self.view = View::Testing;
        self.stopwatch.resume(self.clock.now());

        Ok(())
    }

    /// Claims the single submission slot and builds the payload.
    pub fn begin_submit(&mut self) -> Result<Submission, SessionError> {
        self.require(View::Preview)?;
        if self.submitting {
            return Err(SessionError::SubmissionInFlight);
        }

        self.submitting = true;

        Ok(self.submission())
    }

    /// Releases the submission slot; on success the session is finished.
    pub fn finish_submit(&mut self, succeeded: bool) -> Result<View, SessionError> {
        if !self.submitting {
            return Err(SessionError::NoSubmission);
        }

        self.submitting = false;
        if succeeded {
            self.view = View::Success;
        }

        Ok(self.view)
    }

    /// Payload for the current answers: one entry per question, in test
    /// order, with an empty selection for anything unanswered.
    #[must_use]
    pub fn submission(&self) -> Submission {
        let answers = self
            .test
            .questions
            .iter()
            .map(|question| {
                let selected = self.answers.get(&question.id).cloned().unwrap_or_default();
                (question.id, selected)
            })
            .collect();

        Submission {
            test_code: self.test_code.clone(),
            identity: self.identity.clone(),
            time_taken: self.elapsed_seconds(),
            answers,
        }
    }

    fn advance(&mut self) -> View {
        if self.current + 1 < self.test.questions.len() {
            self.current += 1;
        } else {
            self.view = View::Preview;
            self.stopwatch.pause(self.clock.now());
        }

        self.view
    }

    fn require(&self, view: View) -> Result<(), SessionError> {
        if self.view == view {
            Ok(())
        } else {
            Err(SessionError::WrongView(self.view.as_str()))
        }
    }

    fn count_status(&self, status: QuestionStatus) -> usize {
        self.statuses.values().filter(|s| **s == status).count()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn question(id: QuestionId) -> SessionQuestion {
        let options = ["a", "b", "c", "d"]
            .into_iter()
            .map(|key| (key.to_owned(), format!("option {key}")))
            .collect();

        SessionQuestion {
            id,
            text: format!("question {id}"),
            options,
            difficulty: Difficulty::Medium,
            category_name: "Database".to_owned(),
        }
    }

    fn session(count: i64) -> AssessmentSession {
        let test = PublicTest {
            name: "Backend screening".to_owned(),
            questions: (1..=count).map(question).collect(),
        };
        let identity = CandidateIdentity::new("Ada", "ada@example.com").unwrap();

        AssessmentSession::start_with_clock("abc123", identity, test, Clock::fixed())
            .unwrap()
    }

    fn tick(session: &mut AssessmentSession, seconds: u64) {
        session.clock_mut().advance(Duration::from_secs(seconds));
    }

    #[test]
    fn empty_test_never_starts() {
        let test = PublicTest {
            name: "Empty".to_owned(),
            questions: vec![],
        };
        let identity = CandidateIdentity::new("Ada", "ada@example.com").unwrap();

        assert_eq!(
            AssessmentSession::start("abc", identity, test).unwrap_err(),
            SessionError::Empty
        );
    }

    #[test]
    fn selecting_marks_answered() {
        let mut session = session(3);

        session.select("c").unwrap();
        session.select("b").unwrap();

        assert_eq!(session.answer(1), Some("b"));
        assert_eq!(session.status(0), Some(QuestionStatus::Answered));
        assert_eq!(session.answered_count(), 1);
        assert_eq!(
            session.select("z").unwrap_err(),
            SessionError::UnknownOption("z".into())
        );
    }

    #[test]
    fn submission_is_index_aligned_with_blank_gaps() {
        let mut session = session(3);

        session.next().unwrap();
        session.select("b").unwrap();
        session.next().unwrap();
        assert_eq!(session.next().unwrap(), View::Preview);

        let submission = session.begin_submit().unwrap();
        assert_eq!(
            submission.answers,
            vec![(1, String::new()), (2, "b".to_owned()), (3, String::new())]
        );
        assert_eq!(submission.test_code, "abc123");
        assert_eq!(submission.identity.email, "ada@example.com");
    }

    #[test]
    fn skip_marks_and_advances() {
        let mut session = session(2);

        assert_eq!(session.skip().unwrap(), View::Testing);
        assert_eq!(session.status(0), Some(QuestionStatus::Skipped));
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.skipped_count(), 1);
    }

    #[test]
    fn skipping_last_answered_question_keeps_its_status() {
        let mut session = session(2);

        session.next().unwrap();
        session.select("a").unwrap();

        assert_eq!(session.skip().unwrap(), View::Preview);
        assert_eq!(session.status(1), Some(QuestionStatus::Answered));
        assert_eq!(session.skipped_count(), 0);
    }

    #[test]
    fn navigator_marks_untouched_questions_not_visited() {
        let mut session = session(4);

        session.go_to(2).unwrap();
        assert_eq!(session.status(0), Some(QuestionStatus::NotVisited));
        assert_eq!(session.current_index(), 2);

        session.select("d").unwrap();
        session.go_to(3).unwrap();
        assert_eq!(session.status(2), Some(QuestionStatus::Answered));

        assert_eq!(session.not_visited_count(), 1);
        assert_eq!(session.answered_count(), 1);
        assert_eq!(session.skipped_count(), 0);
        assert_eq!(session.go_to(9).unwrap_err(), SessionError::OutOfRange(9));
    }

    #[test]
    fn previous_stops_at_first_question() {
        let mut session = session(2);

        session.previous().unwrap();
        assert_eq!(session.current_index(), 0);
        session.next().unwrap();
        session.previous().unwrap();
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn timer_freezes_outside_testing() {
        let mut session = session(1);

        tick(&mut session, 42);
        assert_eq!(session.elapsed_seconds(), 42);

        session.next().unwrap();
        assert_eq!(session.view(), View::Preview);
        tick(&mut session, 600);
        assert_eq!(session.elapsed_seconds(), 42);

        session.review().unwrap();
        assert_eq!(session.current_index(), 0);
        tick(&mut session, 8);
        assert_eq!(session.elapsed_seconds(), 50);
    }

    #[test]
    fn submission_is_single_flight() {
        let mut session = session(1);
        session.next().unwrap();

        session.begin_submit().unwrap();
        assert_eq!(
            session.begin_submit().unwrap_err(),
            SessionError::SubmissionInFlight
        );
        assert_eq!(session.review().unwrap_err(), SessionError::SubmissionInFlight);

        assert_eq!(session.finish_submit(false).unwrap(), View::Preview);
        session.begin_submit().unwrap();
        assert_eq!(session.finish_submit(true).unwrap(), View::Success);
        assert_eq!(session.finish_submit(true).unwrap_err(), SessionError::NoSubmission);
    }

    #[test]
    fn success_is_terminal() {
        let mut session = session(1);
        session.next().unwrap();
        session.begin_submit().unwrap();
        session.finish_submit(true).unwrap();

        assert_eq!(
            session.select("a").unwrap_err(),
            SessionError::WrongView("success")
        );
        assert!(session.review().is_err());
        assert!(session.begin_submit().is_err());
    }

    #[test]
    fn actions_are_rejected_in_preview() {
        let mut session = session(1);
        session.skip().unwrap();

        assert_eq!(
            session.next().unwrap_err(),
            SessionError::WrongView("preview")
        );
    }
}
