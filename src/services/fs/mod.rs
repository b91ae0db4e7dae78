pub mod breadcrumbs;
pub mod mime;
pub mod resolve;
pub mod store;

pub use store::PathScopedFileStore;
