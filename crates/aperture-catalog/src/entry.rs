//! Catalog data model
//!
//! Records mirror the rows of the portfolio's JSON manifest: photographs
//! with optional category metadata, plus categories derived by folding the
//! photo list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category slug surfaced as featured in gallery navigation.
pub const FEATURED_CATEGORY_SLUG: &str = "portrait";

/// One photograph in the catalog.
///
/// Immutable once received from the source; owned by the cache for the
/// lifetime of one cache entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoEntry {
    /// Stable unique identifier.
    pub id: String,
    /// Canonical fetch URL for the full asset.
    pub image_url: String,
    /// Display title.
    #[serde(default)]
    pub title: Option<String>,
    /// Longer caption shown in the lightbox.
    #[serde(default)]
    pub description: Option<String>,
    /// Human-readable category name.
    #[serde(default)]
    pub category: Option<String>,
    /// URL-safe category slug.
    #[serde(default)]
    pub category_slug: Option<String>,
    /// Whether the photo is pinned to the featured rail.
    #[serde(default)]
    pub is_featured: bool,
    /// Upload timestamp, when the source provides one.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl PhotoEntry {
    /// Create a minimal entry.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            image_url: image_url.into(),
            title: None,
            description: None,
            category: None,
            category_slug: None,
            is_featured: false,
            created_at: None,
        }
    }

    /// With a display title.
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// With a category name and slug.
    #[inline]
    #[must_use]
    pub fn with_category(mut self, name: impl Into<String>, slug: impl Into<String>) -> Self {
        self.category = Some(name.into());
        self.category_slug = Some(slug.into());
        self
    }

    /// Mark as featured.
    #[inline]
    #[must_use]
    pub fn featured(mut self) -> Self {
        self.is_featured = true;
        self
    }

    /// Whether this photo belongs to the given category slug.
    #[inline]
    #[must_use]
    pub fn in_category(&self, slug: &str) -> bool {
        self.category_slug.as_deref() == Some(slug)
    }
}

/// One gallery category, derived from the photo list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Identifier (the slug).
    pub id: String,
    /// Display name.
    pub name: String,
    /// URL-safe slug.
    pub slug: String,
    /// Cover image (first photo seen in the category).
    pub image_url: String,
    /// Number of photos in the category.
    pub photo_count: usize,
    /// Whether the category appears in navigation.
    pub is_visible: bool,
    /// Whether the category is highlighted on the landing page.
    pub is_featured: bool,
}

/// Fold the photo list into its distinct categories.
///
/// Categories appear in first-seen order; photos without a slug are skipped.
/// The first photo of a category supplies its cover image and display name.
#[must_use]
pub fn derive_categories(photos: &[PhotoEntry]) -> Vec<Category> {
    let mut categories: Vec<Category> = Vec::new();

    for photo in photos {
        let Some(slug) = photo.category_slug.as_deref() else {
            continue;
        };

        if let Some(existing) = categories.iter_mut().find(|c| c.slug == slug) {
            existing.photo_count += 1;
        } else {
            categories.push(Category {
                id: slug.to_string(),
                name: photo
                    .category
                    .clone()
                    .unwrap_or_else(|| slug.to_string()),
                slug: slug.to_string(),
                image_url: photo.image_url.clone(),
                photo_count: 1,
                is_visible: true,
                is_featured: slug == FEATURED_CATEGORY_SLUG,
            });
        }
    }

    categories
}
