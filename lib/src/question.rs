use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::category::CategoryId;
use crate::error::{CategoryError, ValidationError};
use crate::tree::CategoryTree;

pub type QuestionId = i64;

/// Option key to option text, conventionally `a` through `d`.
pub type QuestionOptions = BTreeMap<String, String>;

pub const OPTION_KEYS: [&str; 4] = ["a", "b", "c", "d"];

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|difficulty| difficulty.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownDifficulty(s.to_owned()))
    }
}

/// A question as returned by the admin question endpoints.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,

    pub question_text: String,
    pub category_id: CategoryId,
    pub category_name: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub options: QuestionOptions,
    pub correct_option: String,
}

/// Body of `POST /questions/` and `PUT /questions/{id}`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct QuestionPayload {
    pub category_id: CategoryId,
    pub question_text: String,
    pub options: QuestionOptions,
    pub correct_option: String,
    pub difficulty: Difficulty,
}

/// Query parameters of `GET /questions/`.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct QuestionFilter {
    pub page: u32,
    pub per_page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl Default for QuestionFilter {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
            category_id: None,
            parent_category: None,
            difficulty: None,
            search: None,
        }
    }
}

impl QuestionFilter {
    /// Large pages for loading the whole bank; see `ApiClient::all_questions`.
    #[must_use]
    pub fn everything() -> Self {
        Self {
            per_page: 1000,
            ..Self::default()
        }
    }

    /// Narrows the listing to a picked category. A subcategory narrows to its
    /// own id. A root narrows to its root row when one exists, otherwise to
    /// every category naming it as parent.
    pub fn scoped(
        mut self,
        tree: &CategoryTree<'_>,
        root: Option<&str>,
        subcategory: Option<&str>,
    ) -> Result<Self, CategoryError> {
        self.category_id = None;
        self.parent_category = None;

        match (root, subcategory) {
            (_, Some(name)) => {
                let found = match root {
                    Some(root) => tree
                        .children_of(root)
                        .into_iter()
                        .find(|category| category.name == name),
                    None => tree.find_by_name(name),
                };
                let category = found.ok_or_else(|| CategoryError::NotFound {
                    root: root.unwrap_or_default().to_owned(),
                    subcategory: Some(name.to_owned()),
                })?;

                self.category_id = Some(category.id);
            }
            (Some(root), None) => match tree.root_row(root) {
                Some(row) => self.category_id = Some(row.id),
                None => self.parent_category = Some(root.to_owned()),
            },
            (None, None) => {}
        }

        Ok(self)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct QuestionPage {
    pub items: Vec<Question>,
    pub total: u64,
}

impl QuestionPage {
    #[must_use]
    pub fn total_pages(&self, per_page: u32) -> u64 {
        if per_page == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(per_page))
    }
}

/// Raw input of the question editor.
#[derive(Clone, Debug)]
pub struct QuestionForm {
    pub root: String,
    pub subcategory_id: Option<CategoryId>,
    pub difficulty: Difficulty,
    pub question_text: String,
    pub options: [String; 4],
    pub correct_option: String,
}

impl Default for QuestionForm {
    fn default() -> Self {
        Self {
            root: String::new(),
            subcategory_id: None,
            difficulty: Difficulty::Medium,
            question_text: String::new(),
            options: Default::default(),
            correct_option: "a".to_owned(),
        }
    }
}

impl QuestionForm {
    /// Prefills the editor from an existing question.
    #[must_use]
    pub fn from_question(question: &Question, tree: &CategoryTree<'_>) -> Self {
        let (root, subcategory_id) = tree
            .selection_for(&question.category_name)
            .unwrap_or_default();
        let options =
            OPTION_KEYS.map(|key| question.options.get(key).cloned().unwrap_or_default());

        Self {
            root,
            subcategory_id,
            difficulty: question.difficulty,
            question_text: question.question_text.clone(),
            options,
            correct_option: question.correct_option.clone(),
        }
    }

    pub fn into_payload(self, tree: &CategoryTree<'_>) -> Result<QuestionPayload, ValidationError> {
        if self.root.trim().is_empty() {
            return Err(ValidationError::MissingField("category"));
        }
        if self.question_text.trim().is_empty() {
            return Err(ValidationError::MissingField("question text"));
        }
        if self.options[0].trim().is_empty() {
            return Err(ValidationError::MissingField("option a"));
        }
        if self.options[1].trim().is_empty() {
            return Err(ValidationError::MissingField("option b"));
        }

        let category_id = tree.resolve_category_id(&self.root, self.subcategory_id)?;
        let options = OPTION_KEYS
            .iter()
            .map(|key| (*key).to_owned())
            .zip(self.options)
            .collect();

        Ok(QuestionPayload {
            category_id,
            question_text: self.question_text,
            options,
            correct_option: self.correct_option,
            difficulty: self.difficulty,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::category;

    fn form(root: &str, subcategory_id: Option<CategoryId>) -> QuestionForm {
        QuestionForm {
            root: root.into(),
            subcategory_id,
            question_text: "What is SQL?".into(),
            options: [
                "Structured Query Language".into(),
                "Strong Question Language".into(),
                String::new(),
                String::new(),
            ],
            ..QuestionForm::default()
        }
    }

    #[test]
    fn payload_uses_subcategory_when_selected() {
        let categories = vec![
            category(1, "Database", None),
            category(2, "SQL", Some("Database")),
        ];
        let tree = CategoryTree::new(&categories);

        let payload = form("Database", Some(2)).into_payload(&tree).unwrap();
        assert_eq!(payload.category_id, 2);
        assert_eq!(payload.options.len(), 4);
        assert_eq!(payload.options["c"], "");
        assert_eq!(payload.correct_option, "a");
        assert_eq!(payload.difficulty, Difficulty::Medium);

        let payload = form("Database", None).into_payload(&tree).unwrap();
        assert_eq!(payload.category_id, 1);
    }

    #[test]
    fn payload_rejects_unresolved_root() {
        let categories = vec![category(2, "SQL", Some("Database"))];
        let tree = CategoryTree::new(&categories);

        let err = form("Database", None).into_payload(&tree).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Category(CategoryError::NotFound { .. })
        ));
    }

    #[test]
    fn payload_requires_core_fields() {
        let categories = vec![category(1, "Database", None)];
        let tree = CategoryTree::new(&categories);

        let mut missing_b = form("Database", None);
        missing_b.options[1].clear();
        assert_eq!(
            missing_b.into_payload(&tree).unwrap_err(),
            ValidationError::MissingField("option b")
        );
        assert_eq!(
            form("", None).into_payload(&tree).unwrap_err(),
            ValidationError::MissingField("category")
        );
    }

    #[test]
    fn difficulty_parses_loosely() {
        assert_eq!("hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!(" Easy ".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert!("extreme".parse::<Difficulty>().is_err());
    }

    #[test]
    fn filter_scope_follows_the_category_tree() {
        let categories = vec![
            category(1, "Database", None),
            category(2, "SQL", Some("Database")),
            category(3, "AWS", Some("Cloud")),
        ];
        let tree = CategoryTree::new(&categories);

        let root_row = QuestionFilter::default()
            .scoped(&tree, Some("Database"), None)
            .unwrap();
        assert_eq!(root_row.category_id, Some(1));
        assert_eq!(root_row.parent_category, None);

        let parent_only = QuestionFilter::default()
            .scoped(&tree, Some("Cloud"), None)
            .unwrap();
        assert_eq!(parent_only.category_id, None);
        assert_eq!(parent_only.parent_category.as_deref(), Some("Cloud"));

        let subcategory = QuestionFilter::default()
            .scoped(&tree, Some("Database"), Some("SQL"))
            .unwrap();
        assert_eq!(subcategory.category_id, Some(2));

        assert_eq!(
            QuestionFilter::default()
                .scoped(&tree, Some("Cloud"), Some("SQL"))
                .unwrap_err(),
            CategoryError::NotFound {
                root: "Cloud".into(),
                subcategory: Some("SQL".into()),
            }
        );
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = QuestionPage {
            items: vec![],
            total: 21,
        };
        assert_eq!(page.total_pages(10), 3);
        assert_eq!(page.total_pages(0), 0);
    }
}
