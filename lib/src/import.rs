//! Bulk question import from CSV.
//!
//! Every row is mapped and uploaded on its own. A bad row is counted and
//! skipped; rows that already went through stay created.

use std::fmt;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::{ImportError, ValidationError};
use crate::question::{Difficulty, QuestionPayload, OPTION_KEYS};
use crate::tree::CategoryTree;

pub const TEMPLATE_HEADERS: [&str; 9] = [
    "question_text",
    "category_name",
    "subcategory_name",
    "difficulty_level",
    "option_a",
    "option_b",
    "option_c",
    "option_d",
    "correct_answer",
];

const TEMPLATE_SAMPLE: [&str; 9] = [
    "What is SQL?",
    "Database",
    "SQL",
    "Easy",
    "Structured Query Language",
    "Strong Question Language",
    "Structured Question List",
    "None",
    "a",
];

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ImportRow {
    pub question_text: String,
    pub category_name: String,
    pub subcategory_name: String,
    pub difficulty_level: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: String,
}

impl ImportRow {
    /// Maps the row to a create payload. The subcategory wins when it is a
    /// child of the row's category; otherwise the category row itself is used.
    pub fn to_payload(&self, tree: &CategoryTree<'_>) -> Result<QuestionPayload, ValidationError> {
        if self.question_text.is_empty() {
            return Err(ValidationError::MissingField("question_text"));
        }
        if self.category_name.is_empty() {
            return Err(ValidationError::MissingField("category_name"));
        }

        let subcategory = Some(self.subcategory_name.as_str()).filter(|name| !name.is_empty());
        let category_id = tree.resolve_by_names(&self.category_name, subcategory)?;
        let difficulty = if self.difficulty_level.is_empty() {
            Difficulty::Medium
        } else {
            self.difficulty_level.parse()?
        };
        let options = OPTION_KEYS
            .iter()
            .map(|key| (*key).to_owned())
            .zip([
                self.option_a.clone(),
                self.option_b.clone(),
                self.option_c.clone(),
                self.option_d.clone(),
            ])
            .collect();

        Ok(QuestionPayload {
            category_id,
            question_text: self.question_text.clone(),
            options,
            correct_option: self.correct_answer.to_lowercase(),
            difficulty,
        })
    }
}

/// Reads rows by header name. Fields are trimmed and blank lines skipped.
pub fn parse_rows(reader: impl Read) -> Result<Vec<ImportRow>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let rows = reader
        .deserialize()
        .collect::<Result<Vec<ImportRow>, _>>()?;

    if rows.is_empty() {
        return Err(ImportError::NoRows);
    }

    Ok(rows)
}

pub fn write_template(writer: impl Write) -> Result<(), ImportError> {
    let mut writer = csv::Writer::from_writer(writer);

    writer.write_record(TEMPLATE_HEADERS)?;
    writer.write_record(TEMPLATE_SAMPLE)?;
    writer.flush()?;

    Ok(())
}

/// Outcome of a bulk import.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl ImportReport {
    pub fn record(&mut self, succeeded: bool) {
        self.total += 1;

        if succeeded {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    #[must_use]
    pub fn is_complete_success(&self) -> bool {
        self.total > 0 && self.succeeded == self.total
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.succeeded == 0 {
            return write!(f, "Failed to upload questions. All {} failed.", self.failed);
        }

        write!(f, "Uploaded {}/{} questions.", self.succeeded, self.total)?;
        if self.failed > 0 {
            write!(f, " ({} failed)", self.failed)?;
        }

        Ok(())
    }
}
