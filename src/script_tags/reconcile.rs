//! Script tag reconciliation.
//!
//! Duplicates of a desired tag collapse onto the lowest remote id; the rest
//! are deleted concurrently and deletion failures are only logged.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

use super::{FieldSelection, Pagination, ScriptTag, ScriptTagApi, ScriptTagEvent};
use crate::auth::AuthenticatedShop;
use crate::clients::HttpError;
use crate::config::ShopDomain;
use crate::error::ConfigError;

/// Default number of duplicate deletions allowed in flight at once.
pub const DEFAULT_MAX_CONCURRENT_DELETIONS: usize = 8;

/// Errors returned by [`ScriptTagReconciler::ensure`].
///
/// Failed duplicate deletions are not errors; they are logged and skipped.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The desired tag has no `src`.
    #[error("Script tag has no src")]
    MissingSource,

    /// The desired tag's `src` cannot be turned into an absolute URL.
    #[error("Invalid script tag src '{src}': {reason}")]
    InvalidSource {
        /// The offending source.
        src: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A remote call failed.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Pagination could not be built.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Fills in the defaults a script tag is compared and created with.
///
/// - `event` defaults to `onload`
/// - `display_scope` defaults to `all`
/// - a `src` without scheme gets `https`
/// - a `src` without host is resolved against the shop's own domain
///
/// Absolute sources are kept byte-for-byte so they compare equal to what
/// the Admin API returns.
///
/// # Errors
///
/// Returns [`ReconcileError::MissingSource`] for an empty `src` and
/// [`ReconcileError::InvalidSource`] when it cannot be resolved.
///
/// # Example
///
/// ```rust
/// use shopify_app_auth::script_tags::{normalize_script_tag, ScriptTag, ScriptTagDisplayScope};
/// use shopify_app_auth::ShopDomain;
///
/// let shop = ShopDomain::new("some-shop").unwrap();
/// let tag = normalize_script_tag(&shop, ScriptTag::new("/apps/widget.js")).unwrap();
///
/// assert_eq!(
///     tag.src.as_deref(),
///     Some("https://some-shop.myshopify.com/apps/widget.js")
/// );
/// assert_eq!(tag.display_scope, Some(ScriptTagDisplayScope::All));
/// ```
pub fn normalize_script_tag(
    shop: &ShopDomain,
    mut tag: ScriptTag,
) -> Result<ScriptTag, ReconcileError> {
    tag.event.get_or_insert(ScriptTagEvent::Onload);
    tag.display_scope = Some(tag.effective_display_scope());

    let src = tag
        .src
        .as_deref()
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .ok_or(ReconcileError::MissingSource)?;

    let invalid = |reason: String| ReconcileError::InvalidSource {
        src: src.to_string(),
        reason,
    };

    let resolved = match Url::parse(src) {
        Ok(url) if url.has_host() => src.to_string(),
        Ok(url) => return Err(invalid(format!("unsupported '{}' URL", url.scheme()))),
        Err(url::ParseError::RelativeUrlWithoutBase) if src.starts_with("//") => {
            Url::parse(&format!("https:{src}"))
                .map_err(|e| invalid(e.to_string()))?
                .to_string()
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => shop
            .origin()?
            .join(src)
            .map_err(|e| invalid(e.to_string()))?
            .to_string(),
        Err(e) => return Err(invalid(e.to_string())),
    };

    tag.src = Some(resolved);
    Ok(tag)
}

/// Brings a shop's remote script tags in line with a desired tag.
///
/// Generic over the remote API so tests can substitute an in-memory fake.
#[derive(Debug)]
pub struct ScriptTagReconciler<A: ?Sized> {
    api: Arc<A>,
    max_concurrent_deletions: usize,
}

impl<A: ?Sized> Clone for ScriptTagReconciler<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            max_concurrent_deletions: self.max_concurrent_deletions,
        }
    }
}

impl<A> ScriptTagReconciler<A>
where
    A: ScriptTagApi + ?Sized + 'static,
{
    /// Creates a reconciler over `api`.
    #[must_use]
    pub const fn new(api: Arc<A>) -> Self {
        Self {
            api,
            max_concurrent_deletions: DEFAULT_MAX_CONCURRENT_DELETIONS,
        }
    }

    /// Sets how many duplicate deletions may run at once (at least one).
    #[must_use]
    pub fn with_max_concurrent_deletions(mut self, limit: usize) -> Self {
        self.max_concurrent_deletions = limit.max(1);
        self
    }

    /// Ensures exactly one remote tag matches `desired` and returns it.
    ///
    /// 1. The tag is normalized with [`normalize_script_tag`].
    /// 2. If it carries an id that still exists remotely, that tag is
    ///    returned unchanged. An id that no longer exists is dropped.
    /// 3. Otherwise all remote tags are listed. Among those with the same
    ///    `src`, the one with the lowest id whose display scope also matches
    ///    is kept; every other tag with that `src` is deleted concurrently.
    ///    Deletion failures are logged and do not fail the call.
    /// 4. If nothing was kept, the tag is created.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] if normalization, listing, or creation
    /// fails.
    pub async fn ensure(
        &self,
        session: &AuthenticatedShop,
        desired: ScriptTag,
    ) -> Result<ScriptTag, ReconcileError> {
        let mut desired = normalize_script_tag(&session.shop, desired)?;

        if let Some(id) = desired.id {
            if let Some(existing) = self
                .api
                .get_script_tag(session, id, &FieldSelection::all())
                .await?
            {
                return Ok(existing);
            }
            tracing::debug!(shop = %session.shop, id, "script tag id no longer exists");
            desired.id = None;
        }

        let remote = self.fetch_all(session).await?;
        let (kept, stale) = select_duplicates(&desired, remote);

        self.delete_all(session, stale).await;

        match kept {
            Some(tag) => Ok(tag),
            None => Ok(self
                .api
                .create_or_update_script_tag(session, &desired)
                .await?),
        }
    }

    /// Reads every script tag of the shop, page by page, in remote order.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::Http`] if counting or any page fails.
    pub async fn fetch_all(
        &self,
        session: &AuthenticatedShop,
    ) -> Result<Vec<ScriptTag>, ReconcileError> {
        let count = self.api.count_script_tags(session).await?;
        let mut tags = Vec::with_capacity(usize::try_from(count).unwrap_or_default());

        for page in 1..=Pagination::pages_for(count) {
            let pagination = Pagination::full_page(u32::try_from(page).unwrap_or(u32::MAX))?;
            let batch = self
                .api
                .list_script_tags(session, &pagination, &FieldSelection::all())
                .await?;
            tags.extend(batch);
        }

        Ok(tags)
    }

    async fn delete_all(&self, session: &AuthenticatedShop, ids: Vec<u64>) {
        if ids.is_empty() {
            return;
        }

        let permits = Arc::new(Semaphore::new(self.max_concurrent_deletions));
        let mut tasks = JoinSet::new();

        for id in ids {
            let api = Arc::clone(&self.api);
            let session = session.clone();
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await;
                (id, api.delete_script_tag(&session, id).await)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(()))) => {}
                Ok((id, Err(error))) => {
                    tracing::warn!(
                        shop = %session.shop,
                        id,
                        %error,
                        "failed to delete duplicate script tag"
                    );
                }
                Err(error) => {
                    tracing::warn!(shop = %session.shop, %error, "script tag deletion task aborted");
                }
            }
        }
    }
}

/// Splits the remote tags sharing `desired.src` into the one to keep and
/// the ids to delete.
fn select_duplicates(desired: &ScriptTag, remote: Vec<ScriptTag>) -> (Option<ScriptTag>, Vec<u64>) {
    let scope = desired.effective_display_scope();
    let mut kept: Option<ScriptTag> = None;
    let mut stale = Vec::new();

    for tag in remote.into_iter().filter(|tag| tag.src == desired.src) {
        let exact = tag.effective_display_scope() == scope;
        let lower_id = kept
            .as_ref()
            .map_or(true, |k| tag.id.unwrap_or(u64::MAX) < k.id.unwrap_or(u64::MAX));

        let evicted = if exact && lower_id {
            kept.replace(tag)
        } else {
            Some(tag)
        };

        stale.extend(evicted.and_then(|tag| tag.id));
    }

    (kept, stale)
}
