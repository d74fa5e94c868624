//! Script tag types and reconciliation.
//!
//! Apps declare the script tags they need; [`ScriptTagReconciler::ensure`]
//! makes the shop's remote state agree, leaving exactly one tag per
//! `(src, display_scope)` and removing stale duplicates.
//!
//! The remote side is abstracted by [`ScriptTagApi`], implemented by
//! [`AdminClient`](crate::clients::AdminClient).

mod reconcile;
mod types;

pub use reconcile::{normalize_script_tag, ReconcileError, ScriptTagReconciler};
pub use types::{FieldSelection, Pagination, ScriptTag, ScriptTagDisplayScope, ScriptTagEvent};

use async_trait::async_trait;

use crate::auth::AuthenticatedShop;
use crate::clients::HttpError;

/// Remote script tag operations for one shop session.
#[async_trait]
pub trait ScriptTagApi: Send + Sync {
    /// Lists one page of script tags.
    async fn list_script_tags(
        &self,
        session: &AuthenticatedShop,
        pagination: &Pagination,
        fields: &FieldSelection,
    ) -> Result<Vec<ScriptTag>, HttpError>;

    /// Returns the total number of script tags.
    async fn count_script_tags(&self, session: &AuthenticatedShop) -> Result<u64, HttpError>;

    /// Fetches a script tag by id; a missing tag is `Ok(None)`.
    async fn get_script_tag(
        &self,
        session: &AuthenticatedShop,
        id: u64,
        fields: &FieldSelection,
    ) -> Result<Option<ScriptTag>, HttpError>;

    /// Creates the tag (no id) or updates it in place (id set).
    async fn create_or_update_script_tag(
        &self,
        session: &AuthenticatedShop,
        tag: &ScriptTag,
    ) -> Result<ScriptTag, HttpError>;

    /// Deletes a script tag.
    async fn delete_script_tag(&self, session: &AuthenticatedShop, id: u64) -> Result<(), HttpError>;
}
