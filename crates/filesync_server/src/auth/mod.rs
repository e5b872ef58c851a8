mod middleware;

pub use middleware::{AuthExtractor, FolderAuth, RequireAdmin};
