mod conversion;
mod developer_repository;
mod submission_repository;
mod translation_repository;

pub use developer_repository::DeveloperRepository;
pub use submission_repository::{SubmissionRepository, SubmissionStoreEvent};
pub use translation_repository::TranslationRepository;
