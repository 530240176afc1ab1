//! Tally Audit: the single write path for audit entries and the
//! tenant-scoped, paginated read path over them.

pub mod query;
pub mod recorder;

pub use query::{AuditPage, AuditQueryEngine, FilterOptions, PageInfo, PageRequest};
pub use recorder::AuditRecorder;
