pub mod assessment;
pub mod auth;
pub mod category;
pub mod client;
pub mod error;
pub mod handoff;
pub mod import;
pub mod question;
pub mod raw_data;
pub mod results;
pub mod session;
pub mod time;
pub mod tree;

mod helpers;

pub use assessment::{candidate_link, NewTest, Test, TestBuilder};
pub use auth::AuthSession;
pub use category::{Category, CategoryForm, CategoryPayload, MAIN_CATEGORY};
pub use client::ApiClient;
pub use handoff::{CandidateIdentity, FileHandoff, HandoffStore, MemoryHandoff};
pub use import::{ImportReport, ImportRow};
pub use question::{Difficulty, Question, QuestionFilter, QuestionForm, QuestionPayload};
pub use session::{AssessmentSession, PublicTest, QuestionStatus, Submission, View};
pub use tree::CategoryTree;
