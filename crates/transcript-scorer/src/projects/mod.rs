//! Local project history: persistence, ordering, and text export.

pub mod domain;
pub mod export;
pub mod sort;
pub mod store;

pub use domain::{Project, ProjectId, TranscriptEntry};
pub use export::{entry_file_name, project_file_name, render_entry, render_project};
pub use sort::{sorted_entries, SortKey, SortOrder, UnknownSortOption};
pub use store::{JsonFileProjectStore, ProjectRepository, StoreError};
