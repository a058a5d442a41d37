//! Test assembly on the admin side and the links handed to candidates.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::category::CategoryId;
use crate::error::ValidationError;
use crate::question::{Difficulty, Question, QuestionId, QuestionOptions};
use crate::tree::RootGroup;

pub type TestId = i64;

/// A test as listed by `GET /tests/my-tests`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Test {
    pub id: TestId,

    #[serde(default)]
    pub test_name: Option<String>,
    pub test_code: String,
    #[serde(default)]
    pub questions_data: Vec<serde_json::Value>,
    #[serde(default)]
    pub candidate_count: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Test {
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.test_name.as_deref().unwrap_or(&self.test_code)
    }
}

/// Body of `POST /tests/create`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NewTest {
    pub test_name: String,
    pub questions: Vec<TestQuestion>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TestQuestion {
    pub question_id: QuestionId,
    pub answer: String,
    pub options: QuestionOptions,
    pub category: CategoryRef,
    pub question: String,
    pub difficulty: Difficulty,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
}

impl From<&Question> for TestQuestion {
    fn from(question: &Question) -> Self {
        Self {
            question_id: question.id,
            answer: question.correct_option.clone(),
            options: question.options.clone(),
            category: CategoryRef {
                id: question.category_id,
                name: question.category_name.clone(),
            },
            question: question.question_text.clone(),
            difficulty: question.difficulty,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DifficultyFilter {
    #[default]
    All,
    Only(Difficulty),
}

impl DifficultyFilter {
    #[must_use]
    pub fn matches(self, difficulty: Difficulty) -> bool {
        match self {
            DifficultyFilter::All => true,
            DifficultyFilter::Only(only) => only == difficulty,
        }
    }
}

/// Selection state of the test builder.
#[derive(Clone, Debug, Default)]
pub struct TestBuilder {
    selected: Vec<Question>,
    filters: HashMap<String, DifficultyFilter>,
}

impl TestBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or removes `question`; returns whether it is selected afterwards.
    pub fn toggle(&mut self, question: &Question) -> bool {
        if let Some(position) = self.position(question.id) {
            self.selected.remove(position);
            return false;
        }

        self.selected.push(question.clone());
        true
    }

    #[must_use]
    pub fn is_selected(&self, id: QuestionId) -> bool {
        self.position(id).is_some()
    }

    #[must_use]
    pub fn selected(&self) -> &[Question] {
        &self.selected
    }

    pub fn set_filter(&mut self, root: &str, filter: DifficultyFilter) {
        self.filters.insert(root.to_owned(), filter);
    }

    #[must_use]
    pub fn filter(&self, root: &str) -> DifficultyFilter {
        self.filters.get(root).copied().unwrap_or_default()
    }

    /// Questions of a root group that pass the root's difficulty filter.
    #[must_use]
    pub fn visible<'q>(&self, group: &RootGroup<'q>) -> Vec<&'q Question> {
        let filter = self.filter(&group.root);

        group
            .subcategories
            .iter()
            .flat_map(|(_, questions)| questions.iter())
            .chain(group.direct.iter())
            .copied()
            .filter(|question| filter.matches(question.difficulty))
            .collect()
    }

    pub fn build(&self, test_name: &str) -> Result<NewTest, ValidationError> {
        let test_name = test_name.trim();

        if test_name.is_empty() {
            return Err(ValidationError::MissingField("test name"));
        }
        if self.selected.is_empty() {
            return Err(ValidationError::EmptySelection);
        }

        Ok(NewTest {
            test_name: test_name.to_owned(),
            questions: self.selected.iter().map(Into::into).collect(),
        })
    }

    fn position(&self, id: QuestionId) -> Option<usize> {
        self.selected.iter().position(|question| question.id == id)
    }
}

/// Public link a candidate opens to take the test.
pub fn candidate_link(origin: &Url, test_code: &str) -> Result<Url, url::ParseError> {
    origin.join(&format!("/candidate/{test_code}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::category;
    use crate::tree::CategoryTree;

    fn question(id: QuestionId, category_name: &str, difficulty: Difficulty) -> Question {
        Question {
            id,
            question_text: format!("question {id}"),
            category_id: id * 10,
            category_name: category_name.to_owned(),
            difficulty,
            options: [("a".to_owned(), "yes".to_owned())].into_iter().collect(),
            correct_option: "a".to_owned(),
        }
    }

    #[test]
    fn toggle_adds_and_removes_in_order() {
        let mut builder = TestBuilder::new();
        let first = question(1, "SQL", Difficulty::Easy);
        let second = question(2, "SQL", Difficulty::Hard);

        assert!(builder.toggle(&first));
        assert!(builder.toggle(&second));
        assert!(!builder.toggle(&first));
        assert!(builder.toggle(&first));

        let ids: Vec<_> = builder.selected().iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn build_validates_name_and_selection() {
        let mut builder = TestBuilder::new();
        assert_eq!(
            builder.build("Screening").unwrap_err(),
            ValidationError::EmptySelection
        );

        builder.toggle(&question(7, "SQL", Difficulty::Medium));
        assert_eq!(
            builder.build("   ").unwrap_err(),
            ValidationError::MissingField("test name")
        );

        let test = builder.build(" Screening ").unwrap();
        assert_eq!(test.test_name, "Screening");
        assert_eq!(test.questions[0].answer, "a");
        assert_eq!(test.questions[0].category.id, 70);
    }

    #[test]
    fn difficulty_filter_applies_per_root() {
        let categories = vec![
            category(1, "Database", None),
            category(2, "SQL", Some("Database")),
        ];
        let questions = vec![
            question(1, "SQL", Difficulty::Easy),
            question(2, "Database", Difficulty::Hard),
            question(3, "SQL", Difficulty::Hard),
        ];
        let tree = CategoryTree::new(&categories);
        let groups = tree.group_questions(&questions);
        let database = groups.get("Database").unwrap();

        let mut builder = TestBuilder::new();
        assert_eq!(builder.visible(database).len(), 3);

        builder.set_filter("Database", DifficultyFilter::Only(Difficulty::Hard));
        let ids: Vec<_> = builder.visible(database).iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn candidate_link_is_rooted_at_origin() {
        let origin = Url::parse("https://portal.example.com/tests").unwrap();

        assert_eq!(
            candidate_link(&origin, "XK29").unwrap().as_str(),
            "https://portal.example.com/candidate/XK29"
        );
    }
}
