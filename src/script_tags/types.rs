//! Script tag resources and listing parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The event that triggers the script tag to load.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScriptTagEvent {
    /// The script loads when the DOM is ready.
    #[default]
    Onload,
}

/// Where the script tag is displayed.
///
/// A tag without a display scope is treated as [`All`](Self::All), which is
/// what the Admin API assumes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScriptTagDisplayScope {
    /// Only the online store.
    OnlineStore,
    /// Only the order status page.
    OrderStatus,
    /// Both the online store and the order status page.
    #[default]
    All,
}

/// A script tag registered on a shop.
///
/// `id`, `created_at` and `updated_at` are assigned remotely. A tag with no
/// `id` has not been created yet.
///
/// ```rust
/// use shopify_app_auth::script_tags::{ScriptTag, ScriptTagDisplayScope};
///
/// let tag = ScriptTag::new("https://cdn.example.com/widget.js")
///     .with_display_scope(ScriptTagDisplayScope::OnlineStore);
/// assert!(tag.id.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ScriptTag {
    /// The remote identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    /// The event that triggers the script to load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<ScriptTagEvent>,

    /// The URL of the JavaScript file to load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,

    /// Where the script tag is displayed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_scope: Option<ScriptTagDisplayScope>,

    /// Whether the storefront may cache the script.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<bool>,

    /// When the script tag was created.
    #[serde(skip_serializing)]
    pub created_at: Option<DateTime<Utc>>,

    /// When the script tag was last updated.
    #[serde(skip_serializing)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ScriptTag {
    /// Creates an unsaved tag for `src`.
    #[must_use]
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            ..Self::default()
        }
    }

    /// Sets the display scope.
    #[must_use]
    pub const fn with_display_scope(mut self, scope: ScriptTagDisplayScope) -> Self {
        self.display_scope = Some(scope);
        self
    }

    /// Sets a known remote id, enabling the fetch-by-id fast path of
    /// [`ScriptTagReconciler::ensure`](super::ScriptTagReconciler::ensure).
    #[must_use]
    pub const fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// Returns the display scope, defaulting to `All`.
    #[must_use]
    pub fn effective_display_scope(&self) -> ScriptTagDisplayScope {
        self.display_scope.unwrap_or_default()
    }
}

/// Page selection for listing script tags.
///
/// `limit` is between 1 and [`Pagination::MAX_LIMIT`], `page` starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    limit: u32,
    page: u32,
    since_id: Option<u64>,
}

impl Pagination {
    /// Largest page size accepted by the Admin API.
    pub const MAX_LIMIT: u32 = 250;

    /// Creates a page selection.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPagination`] when `limit` is 0 or above
    /// [`Self::MAX_LIMIT`], or when `page` is 0.
    pub fn new(limit: u32, page: u32) -> Result<Self, ConfigError> {
        if limit == 0 || limit > Self::MAX_LIMIT {
            return Err(ConfigError::InvalidPagination {
                reason: format!("limit must be between 1 and {}, got {limit}", Self::MAX_LIMIT),
            });
        }
        if page == 0 {
            return Err(ConfigError::InvalidPagination {
                reason: "page numbers start at 1".to_string(),
            });
        }
        Ok(Self {
            limit,
            page,
            since_id: None,
        })
    }

    /// Selects page `page` with the largest page size.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPagination`] when `page` is 0.
    pub fn full_page(page: u32) -> Result<Self, ConfigError> {
        Self::new(Self::MAX_LIMIT, page)
    }

    /// Restricts results to ids greater than `since_id`.
    #[must_use]
    pub const fn with_since_id(mut self, since_id: u64) -> Self {
        self.since_id = Some(since_id);
        self
    }

    /// Returns the page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns the 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Returns the `since_id` filter.
    #[must_use]
    pub const fn since_id(&self) -> Option<u64> {
        self.since_id
    }

    /// Returns how many full pages are needed to read `count` items.
    #[must_use]
    pub fn pages_for(count: u64) -> u64 {
        count.div_ceil(u64::from(Self::MAX_LIMIT))
    }
}

/// The set of fields requested from the Admin API.
///
/// An empty selection requests every field and sends no `fields` parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSelection(Vec<String>);

impl FieldSelection {
    /// Requests every field.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Requests only the named fields.
    #[must_use]
    pub fn only<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(fields.into_iter().map(Into::into).collect())
    }

    /// Returns the comma-joined `fields` value, or `None` for all fields.
    #[must_use]
    pub fn to_query_value(&self) -> Option<String> {
        if self.0.is_empty() {
            None
        } else {
            Some(self.0.join(","))
        }
    }
}
