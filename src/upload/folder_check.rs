//! Folder ownership check.

use tracing::debug;

use crate::file::Folder;
use crate::{GateError, Result};

/// Lookup of a folder by ID restricted to its owner.
#[allow(async_fn_in_trait)]
pub trait FolderLookup {
    /// Return the folder if it exists and belongs to `user_id`.
    async fn find_owned(&self, folder_id: &str, user_id: i64) -> Result<Option<Folder>>;
}

impl<T: FolderLookup + ?Sized> FolderLookup for &T {
    async fn find_owned(&self, folder_id: &str, user_id: i64) -> Result<Option<Folder>> {
        (**self).find_owned(folder_id, user_id).await
    }
}

/// Confirms that an upload targets a folder the uploader owns.
#[derive(Debug, Clone, Copy)]
pub struct FolderOwnershipChecker<'a, F> {
    lookup: &'a F,
}

impl<'a, F: FolderLookup> FolderOwnershipChecker<'a, F> {
    pub fn new(lookup: &'a F) -> Self {
        Self { lookup }
    }

    /// An empty `folder_id` always passes.
    pub async fn check(&self, folder_id: &str, user_id: i64) -> Result<()> {
        if folder_id.is_empty() {
            return Ok(());
        }
        match self.lookup.find_owned(folder_id, user_id).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => {
                debug!(folder_id, user_id, "folder missing or not owned");
                Err(GateError::FolderNotFound(format!(
                    "folder {folder_id} does not exist"
                )))
            }
            Err(e) => Err(GateError::query_failed("failed to look up folder", e)),
        }
    }
}
