pub mod issue_tracker;
pub mod language_model;

pub use issue_tracker::{HelpdeskRecord, IssueTrackerService, SessionUid};
pub use language_model::LanguageModelService;
