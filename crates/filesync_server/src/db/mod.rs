mod repo;
mod schema;

pub use repo::{
    ClientInfo, FileCommit, FileRecord, FileRemoval, FolderInfo, FolderResolver, FolderSummary,
    NewFile, SyncRepo,
};
pub use schema::init_database;
