//! Browse request: filters, sort key, and pagination.

use serde::{Deserialize, Serialize};

use crate::error::AnirouteError;
use crate::model::{AiringStatus, MediaFormat};

/// Sort key for browse results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortKey {
    /// Source listing order of the trending feed.
    #[default]
    Popularity,
    /// Score.
    Rating,
    /// First-air year.
    Year,
    /// Title, alphabetical.
    Title,
    /// Episode count.
    Episodes,
    /// Recently updated feed order.
    Recent,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    #[default]
    Desc,
}

/// Filtered, sorted, paginated browse request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseRequest {
    page: u32,
    per_page: u32,
    genres: Vec<String>,
    format: Option<MediaFormat>,
    status: Option<AiringStatus>,
    year: Option<u16>,
    sort: SortKey,
    order: SortOrder,
    source: Option<String>,
}

impl Default for BrowseRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 24,
            genres: Vec::new(),
            format: None,
            status: None,
            year: None,
            sort: SortKey::default(),
            order: SortOrder::default(),
            source: None,
        }
    }
}

impl BrowseRequest {
    /// Start building a request with default pagination (page 1, 24 per page).
    #[must_use]
    pub fn builder() -> BrowseRequestBuilder {
        BrowseRequestBuilder {
            inner: Self::default(),
        }
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }
    /// Page size.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }
    /// Genres every result must carry.
    #[must_use]
    pub fn genres(&self) -> &[String] {
        &self.genres
    }
    /// Format filter.
    #[must_use]
    pub const fn format(&self) -> Option<MediaFormat> {
        self.format
    }
    /// Status filter.
    #[must_use]
    pub const fn status(&self) -> Option<AiringStatus> {
        self.status
    }
    /// Year filter.
    #[must_use]
    pub const fn year(&self) -> Option<u16> {
        self.year
    }
    /// Sort key.
    #[must_use]
    pub const fn sort(&self) -> SortKey {
        self.sort
    }
    /// Sort direction.
    #[must_use]
    pub const fn order(&self) -> SortOrder {
        self.order
    }
    /// Preferred source, if any.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

/// Builder for [`BrowseRequest`].
#[derive(Debug, Clone)]
pub struct BrowseRequestBuilder {
    inner: BrowseRequest,
}

impl BrowseRequestBuilder {
    /// Set the page number (1-based).
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.inner.page = page;
        self
    }
    /// Set the page size.
    #[must_use]
    pub const fn per_page(mut self, per_page: u32) -> Self {
        self.inner.per_page = per_page;
        self
    }
    /// Require a genre; may be called repeatedly.
    #[must_use]
    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.inner.genres.push(genre.into());
        self
    }
    /// Restrict to a format.
    #[must_use]
    pub const fn format(mut self, format: MediaFormat) -> Self {
        self.inner.format = Some(format);
        self
    }
    /// Restrict to an airing status.
    #[must_use]
    pub const fn status(mut self, status: AiringStatus) -> Self {
        self.inner.status = Some(status);
        self
    }
    /// Restrict to a first-air year.
    #[must_use]
    pub const fn year(mut self, year: u16) -> Self {
        self.inner.year = Some(year);
        self
    }
    /// Sort by `key` in direction `order`.
    #[must_use]
    pub const fn sort(mut self, key: SortKey, order: SortOrder) -> Self {
        self.inner.sort = key;
        self.inner.order = order;
        self
    }
    /// Prefer a source for the underlying listing calls.
    #[must_use]
    pub fn source(mut self, name: impl Into<String>) -> Self {
        self.inner.source = Some(name.into());
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `page` or `per_page` is zero.
    pub fn build(self) -> Result<BrowseRequest, AnirouteError> {
        if self.inner.page == 0 {
            return Err(AnirouteError::InvalidArg("page must be >= 1".into()));
        }
        if self.inner.per_page == 0 {
            return Err(AnirouteError::InvalidArg("per_page must be >= 1".into()));
        }
        Ok(self.inner)
    }
}
