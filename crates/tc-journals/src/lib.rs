//! # tc-journals
//!
//! Audit journal for TaskCenter RS.
//!
//! Every assignment-role change and progress recomputation appends an audit
//! entry; the timeline view on the task detail page is fed from here.

pub mod journal;
pub mod service;

pub use journal::{Journal, JournalAction, JournalType};
pub use service::{InMemoryJournalStore, JournalService, JournalStore};
