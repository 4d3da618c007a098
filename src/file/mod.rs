//! Folder and file persistence for pixelgate.
//!
//! The admission engine only queries these tables (folder ownership and
//! per-user upload counts); writes are exposed so that request handlers
//! can record uploads once they are admitted.

mod folder;
mod metadata;

pub use folder::{Folder, FolderRepository, NewFolder};
pub use metadata::{FileRecord, FileRepository, NewFileRecord};
