//! Two-level category hierarchy derived from the flat category list.
//!
//! The backend links subcategories to their parent by *name*, so every lookup
//! here is an exact, case-sensitive name match against the list. When two rows
//! share a name the first one wins; use [`CategoryTree::validated`] to reject
//! such lists up front.

use std::collections::{BTreeMap, BTreeSet};

use crate::category::{Category, CategoryId};
use crate::error::CategoryError;
use crate::question::Question;

#[derive(Clone, Copy, Debug)]
pub struct CategoryTree<'a> {
    categories: &'a [Category],
}

impl<'a> CategoryTree<'a> {
    #[must_use]
    pub fn new(categories: &'a [Category]) -> Self {
        Self { categories }
    }

    /// Builds the tree, refusing lists in which a name is used twice.
    pub fn validated(categories: &'a [Category]) -> Result<Self, CategoryError> {
        match duplicate_names(categories).into_iter().next() {
            Some(name) => Err(CategoryError::DuplicateName(name)),
            None => Ok(Self::new(categories)),
        }
    }

    #[must_use]
    pub fn categories(&self) -> &'a [Category] {
        self.categories
    }

    /// Names offered as roots: every root row plus every name referenced as a
    /// parent, even when no row for it exists. Sorted ascending.
    #[must_use]
    pub fn derived_roots(&self) -> Vec<String> {
        let mut roots = BTreeSet::new();

        for category in self.categories {
            match category.parent_name() {
                None => roots.insert(category.name.as_str()),
                Some(parent) => roots.insert(parent),
            };
        }

        roots.into_iter().map(ToOwned::to_owned).collect()
    }

    /// Categories assignable under `root`: its subcategories and, when it
    /// exists as a root row, the root itself. Keeps list order.
    #[must_use]
    pub fn children_of(&self, root: &str) -> Vec<&'a Category> {
        self.categories
            .iter()
            .filter(|category| match category.parent_name() {
                Some(parent) => parent == root,
                None => category.name == root,
            })
            .collect()
    }

    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&'a Category> {
        self.categories.iter().find(|category| category.name == name)
    }

    #[must_use]
    pub fn find_by_id(&self, id: CategoryId) -> Option<&'a Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    #[must_use]
    pub fn root_row(&self, name: &str) -> Option<&'a Category> {
        self.categories
            .iter()
            .find(|category| category.name == name && category.is_root())
    }

    /// Maps a picker selection to the category id a write should use.
    ///
    /// A subcategory selection wins when it names a known category; otherwise
    /// the root must exist as a root row.
    pub fn resolve_category_id(
        &self,
        root: &str,
        subcategory: Option<CategoryId>,
    ) -> Result<CategoryId, CategoryError> {
        if let Some(category) = subcategory.and_then(|id| self.find_by_id(id)) {
            return Ok(category.id);
        }

        self.root_row(root)
            .map(|category| category.id)
            .ok_or_else(|| CategoryError::NotFound {
                root: root.to_owned(),
                subcategory: subcategory.map(|id| id.to_string()),
            })
    }

    /// Same as [`resolve_category_id`](Self::resolve_category_id) with the
    /// subcategory given by name, as in import rows.
    pub fn resolve_by_names(
        &self,
        root: &str,
        subcategory: Option<&str>,
    ) -> Result<CategoryId, CategoryError> {
        let subcategory_id = subcategory.and_then(|name| {
            self.children_of(root)
                .into_iter()
                .find(|category| category.name == name && !category.is_root())
                .map(|category| category.id)
        });

        self.resolve_category_id(root, subcategory_id)
            .map_err(|_| CategoryError::NotFound {
                root: root.to_owned(),
                subcategory: subcategory.map(ToOwned::to_owned),
            })
    }

    /// The root a question belongs to, or `None` when its category row is missing.
    #[must_use]
    pub fn effective_root(&self, category_name: &str) -> Option<&'a str> {
        let category = self.find_by_name(category_name)?;

        Some(category.parent_name().unwrap_or(category.name.as_str()))
    }

    /// Root name and optional subcategory id for an existing category, as the
    /// question editor preselects them.
    #[must_use]
    pub fn selection_for(&self, category_name: &str) -> Option<(String, Option<CategoryId>)> {
        let category = self.find_by_name(category_name)?;

        Some(match category.parent_name() {
            Some(parent) => (parent.to_owned(), Some(category.id)),
            None => (category.name.clone(), None),
        })
    }

    /// Groups questions by effective root, then by subcategory.
    #[must_use]
    pub fn group_questions<'q>(&self, questions: &'q [Question]) -> QuestionGroups<'q> {
        let mut groups: BTreeMap<String, RootGroup<'q>> = self
            .derived_roots()
            .into_iter()
            .map(|root| (root.clone(), RootGroup::new(root)))
            .collect();
        let mut orphans = Vec::new();

        for question in questions {
            let Some(root) = self.effective_root(&question.category_name) else {
                orphans.push(question);
                continue;
            };
            let group = groups
                .entry(root.to_owned())
                .or_insert_with(|| RootGroup::new(root.to_owned()));

            group.push(question);
        }

        QuestionGroups {
            groups: groups.into_values().collect(),
            orphans,
        }
    }
}

/// Names used by more than one category, sorted.
#[must_use]
pub fn duplicate_names(categories: &[Category]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();

    for category in categories {
        if !seen.insert(category.name.as_str()) {
            duplicates.insert(category.name.clone());
        }
    }

    duplicates.into_iter().collect()
}

#[derive(Debug, Default)]
pub struct QuestionGroups<'q> {
    pub groups: Vec<RootGroup<'q>>,
    /// Questions whose category row no longer exists.
    pub orphans: Vec<&'q Question>,
}

impl<'q> QuestionGroups<'q> {
    #[must_use]
    pub fn get(&self, root: &str) -> Option<&RootGroup<'q>> {
        self.groups.iter().find(|group| group.root == root)
    }
}

#[derive(Debug)]
pub struct RootGroup<'q> {
    pub root: String,
    pub total: usize,
    pub direct: Vec<&'q Question>,
    pub subcategories: Vec<(String, Vec<&'q Question>)>,
}

impl<'q> RootGroup<'q> {
    fn new(root: String) -> Self {
        Self {
            root,
            total: 0,
            direct: Vec::new(),
            subcategories: Vec::new(),
        }
    }

    fn push(&mut self, question: &'q Question) {
        self.total += 1;

        if question.category_name == self.root {
            self.direct.push(question);
            return;
        }

        match self
            .subcategories
            .iter()
            .position(|(name, _)| *name == question.category_name)
        {
            Some(index) => self.subcategories[index].1.push(question),
            None => self
                .subcategories
                .push((question.category_name.clone(), vec![question])),
        }
    }
}
