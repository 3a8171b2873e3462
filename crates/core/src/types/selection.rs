//! Product selection by tag or title.
//!
//! Shopify REST returns a product's tags as one comma-separated string
//! (`"Sale, Summer,Bundle"`). Tags are compared case-sensitively after
//! trimming, which is what the admin page tells merchants.

use thiserror::Error;

/// Tag marking bundle products, excluded from the "all products" runs.
pub const BUNDLE_TAG: &str = "Bundle";

/// Errors that can occur when building a [`Selection`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// A tag-based selection was given no tags.
    #[error("Please enter at least one tag")]
    NoTags,
    /// A title selection was given an empty title.
    #[error("Name cant be empty")]
    EmptyTitle,
}

/// A normalized list of tags: split on commas, trimmed, empty entries dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(Vec<String>);

impl TagSet {
    /// Parse a comma-separated tag string.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }

    /// Whether `tag` is present (exact, case-sensitive).
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    /// Whether the set has no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the tags.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// How many of a filter's tags a product must carry to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagMatch {
    /// At least one tag.
    Any,
    /// Every tag.
    All,
}

impl TagMatch {
    /// Map the wire `includeAll` flag.
    #[must_use]
    pub const fn from_match_all(match_all: bool) -> Self {
        if match_all { Self::All } else { Self::Any }
    }
}

/// A non-empty tag filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilter {
    tags: TagSet,
    mode: TagMatch,
}

impl TagFilter {
    /// Build a filter from a comma-separated tag string.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::NoTags`] if the string holds no tags.
    pub fn parse(raw: &str, mode: TagMatch) -> Result<Self, SelectionError> {
        let tags = TagSet::parse(raw);
        if tags.is_empty() {
            return Err(SelectionError::NoTags);
        }
        Ok(Self { tags, mode })
    }

    /// Any-of or all-of matching.
    #[must_use]
    pub const fn mode(&self) -> TagMatch {
        self.mode
    }

    /// Whether a product with `product_tags` satisfies the filter.
    #[must_use]
    pub fn matches(&self, product_tags: &TagSet) -> bool {
        match self.mode {
            TagMatch::Any => self.tags.iter().any(|tag| product_tags.contains(tag)),
            TagMatch::All => self.tags.iter().all(|tag| product_tags.contains(tag)),
        }
    }
}

/// Which products a run touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every product not tagged [`BUNDLE_TAG`].
    AllExceptBundles,
    /// Only products tagged [`BUNDLE_TAG`].
    Bundles,
    /// Products that do NOT match the filter.
    ExcludeTags(TagFilter),
    /// Products that match the filter.
    IncludeTags(TagFilter),
    /// Products whose trimmed title equals this (already trimmed) title.
    ExactTitle(String),
}

impl Selection {
    /// Build a title selection, trimming the input.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::EmptyTitle`] if nothing is left after trimming.
    pub fn exact_title(raw: &str) -> Result<Self, SelectionError> {
        let title = raw.trim();
        if title.is_empty() {
            return Err(SelectionError::EmptyTitle);
        }
        Ok(Self::ExactTitle(title.to_owned()))
    }

    /// Whether a product is selected.
    #[must_use]
    pub fn selects(&self, title: &str, tags: &TagSet) -> bool {
        match self {
            Self::AllExceptBundles => !tags.contains(BUNDLE_TAG),
            Self::Bundles => tags.contains(BUNDLE_TAG),
            Self::ExcludeTags(filter) => !filter.matches(tags),
            Self::IncludeTags(filter) => filter.matches(tags),
            Self::ExactTitle(target) => title.trim() == target,
        }
    }

    /// Title runs update variant by variant; every other run saves whole
    /// products.
    #[must_use]
    pub const fn updates_variants_individually(&self) -> bool {
        matches!(self, Self::ExactTitle(_))
    }

    /// Short label for logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::AllExceptBundles => "all_except_bundles",
            Self::Bundles => "bundles",
            Self::ExcludeTags(_) => "exclude_tags",
            Self::IncludeTags(_) => "include_tags",
            Self::ExactTitle(_) => "exact_title",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tags(raw: &str) -> TagSet {
        TagSet::parse(raw)
    }

    #[test]
    fn test_tag_set_trims_and_drops_empty() {
        let set = tags(" Sale ,Summer,, Bundle");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["Sale", "Summer", "Bundle"]);
        assert!(tags("").is_empty());
        assert!(tags(" , ").is_empty());
    }

    #[test]
    fn test_tags_are_case_sensitive() {
        assert!(tags("Sale").contains("Sale"));
        assert!(!tags("sale").contains("Sale"));
    }

    #[test]
    fn test_filter_requires_a_tag() {
        assert_eq!(
            TagFilter::parse(" , ", TagMatch::Any),
            Err(SelectionError::NoTags)
        );
    }

    #[test]
    fn test_exclude_any_skips_partial_match() {
        let selection = Selection::ExcludeTags(TagFilter::parse("A, B", TagMatch::Any).unwrap());
        assert!(!selection.selects("p", &tags("A")));
        assert!(!selection.selects("p", &tags("A, B")));
        assert!(selection.selects("p", &tags("C")));
        assert!(selection.selects("p", &tags("")));
    }

    #[test]
    fn test_exclude_all_only_skips_full_match() {
        let selection = Selection::ExcludeTags(TagFilter::parse("A, B", TagMatch::All).unwrap());
        assert!(selection.selects("p", &tags("A")));
        assert!(!selection.selects("p", &tags("B, A, C")));
    }

    #[test]
    fn test_include_all_requires_every_tag() {
        let selection = Selection::IncludeTags(TagFilter::parse("A,B", TagMatch::All).unwrap());
        assert!(selection.selects("p", &tags("A, B")));
        assert!(selection.selects("p", &tags("C, B, A")));
        assert!(!selection.selects("p", &tags("A")));
        assert!(!selection.selects("p", &tags("B")));
    }

    #[test]
    fn test_include_any() {
        let selection = Selection::IncludeTags(TagFilter::parse("A,B", TagMatch::Any).unwrap());
        assert!(selection.selects("p", &tags("B")));
        assert!(!selection.selects("p", &tags("C")));
    }

    #[test]
    fn test_bundle_selections() {
        assert!(Selection::AllExceptBundles.selects("p", &tags("Sale")));
        assert!(!Selection::AllExceptBundles.selects("p", &tags("Sale, Bundle")));
        assert!(Selection::Bundles.selects("p", &tags("Bundle ")));
        assert!(!Selection::Bundles.selects("p", &tags("bundle")));
    }

    #[test]
    fn test_exact_title_trims_both_sides() {
        let selection = Selection::exact_title("  Blue Shirt ").unwrap();
        assert!(selection.selects(" Blue Shirt  ", &TagSet::default()));
        assert!(!selection.selects("blue shirt", &TagSet::default()));
        assert!(!selection.selects("Blue Shirt XL", &TagSet::default()));
    }

    #[test]
    fn test_exact_title_rejects_blank() {
        assert_eq!(Selection::exact_title("   "), Err(SelectionError::EmptyTitle));
    }

    #[test]
    fn test_match_all_flag() {
        assert_eq!(TagMatch::from_match_all(true), TagMatch::All);
        assert_eq!(TagMatch::from_match_all(false), TagMatch::Any);
    }
}
