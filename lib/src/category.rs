use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Marker some rows carry in `parent_category` instead of `null` to flag a root.
pub const MAIN_CATEGORY: &str = "Main Category";

pub type CategoryId = i64;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,

    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_category: Option<String>,

    #[serde(default)]
    pub question_count: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Category {
    /// A category is a root when it has no parent or carries the main-category marker.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_name().is_none()
    }

    /// The name of the parent category, if this row is a subcategory.
    #[must_use]
    pub fn parent_name(&self) -> Option<&str> {
        parent_reference(self.parent_category.as_deref())
    }

    fn matches_search(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(query)
            || self
                .description
                .as_deref()
                .map_or(false, |description| description.to_lowercase().contains(query))
    }
}

/// Normalizes a raw `parent_category` value into a parent name.
#[must_use]
pub fn parent_reference(raw: Option<&str>) -> Option<&str> {
    match raw {
        None | Some("") | Some(MAIN_CATEGORY) => None,
        Some(name) => Some(name),
    }
}

/// Case-insensitive substring search over name and description.
#[must_use]
pub fn search<'a>(categories: &'a [Category], query: &str) -> Vec<&'a Category> {
    let query = query.trim().to_lowercase();

    if query.is_empty() {
        return categories.iter().collect();
    }

    categories
        .iter()
        .filter(|category| category.matches_search(&query))
        .collect()
}

/// Body of `POST /categories/` and `PUT /categories/{id}`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CategoryPayload {
    pub name: String,
    pub description: Option<String>,
    pub parent_category: Option<String>,
}

/// Raw input of the category editor.
#[derive(Clone, Debug, Default)]
pub struct CategoryForm {
    pub name: String,
    pub description: String,
    pub parent: Option<String>,
}

impl CategoryForm {
    pub fn into_payload(self) -> Result<CategoryPayload, ValidationError> {
        let name = self.name.trim().to_owned();

        if name.is_empty() {
            return Err(ValidationError::MissingField("name"));
        }

        let description = Some(self.description.trim().to_owned()).filter(|d| !d.is_empty());
        let parent_category = self
            .parent
            .as_deref()
            .map(str::trim)
            .filter(|parent| !parent.eq_ignore_ascii_case("none"))
            .and_then(|parent| parent_reference(Some(parent)))
            .map(ToOwned::to_owned);

        Ok(CategoryPayload {
            name,
            description,
            parent_category,
        })
    }
}

#[cfg(test)]
pub(crate) fn category(id: CategoryId, name: &str, parent: Option<&str>) -> Category {
    Category {
        id,
        name: name.to_owned(),
        description: None,
        parent_category: parent.map(ToOwned::to_owned),
        question_count: None,
        created_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_category_marker_is_a_root() {
        assert!(category(1, "Database", None).is_root());
        assert!(category(2, "Cloud", Some(MAIN_CATEGORY)).is_root());
        assert!(!category(3, "SQL", Some("Database")).is_root());
    }

    #[test]
    fn form_normalizes_blank_fields() {
        let payload = CategoryForm {
            name: "  SQL ".into(),
            description: "   ".into(),
            parent: Some("Database".into()),
        }
        .into_payload()
        .unwrap();

        assert_eq!(payload.name, "SQL");
        assert_eq!(payload.description, None);
        assert_eq!(payload.parent_category.as_deref(), Some("Database"));

        let root = CategoryForm {
            name: "Cloud".into(),
            parent: Some("none".into()),
            ..Default::default()
        }
        .into_payload()
        .unwrap();
        assert_eq!(root.parent_category, None);
    }

    #[test]
    fn form_requires_a_name() {
        let err = CategoryForm::default().into_payload().unwrap_err();
        assert_eq!(err, ValidationError::MissingField("name"));
    }

    #[test]
    fn search_matches_name_or_description() {
        let mut described = category(2, "Cloud", None);
        described.description = Some("AWS and friends".into());
        let categories = vec![category(1, "Database", None), described];

        let hits = search(&categories, "aws");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Cloud");
        assert_eq!(search(&categories, "  ").len(), 2);
    }
}
