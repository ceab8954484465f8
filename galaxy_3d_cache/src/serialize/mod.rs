//! XML serialization sessions
//!
//! Saving walks a document and hands aggregate work to singleton save jobs
//! that a `SaveQueue` drains at the end. Loading runs registered load jobs,
//! in prerequisite order, over the matching elements of a document.

pub mod collectors;
pub mod load_tasks;
pub mod loaders;
pub mod save_queue;

pub use collectors::{collect, collect_all, Collected, Collector};
pub use load_tasks::{load_document, LoadJob, LoadReport, LoadSession, LoadTaskRegistry};
pub use loaders::{builtin_load_jobs, DocumentLoader, ReferenceLoader};
pub use save_queue::{
    find_or_create, save_document, SaveJob, SaveQueue, SaveSession, SessionState, SharedJob,
    SingletonJob,
};
