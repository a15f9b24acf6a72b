//! Plugin listing filters
//!
//! The API does the filtering and sorting; this module only turns the
//! selected filters into query parameters.

use std::fmt;
use std::str::FromStr;

use crate::error::BazaarError;

/// Categories offered by the listing filters
pub const PLUGIN_CATEGORIES: &[&str] = &[
    "Admin Tools",
    "Gameplay",
    "Magic",
    "Economy",
    "Roleplay",
    "Moderation",
    "World Management",
    "Cosmetics",
    "Utilities",
    "Mini-Games",
];

/// Minecraft versions offered by the listing filters and the upload form
pub const MINECRAFT_VERSIONS: &[&str] = &[
    "1.20", "1.19", "1.18", "1.17", "1.16", "1.15", "1.14", "1.13", "1.12", "1.11", "1.10", "1.9",
    "1.8", "1.7",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriceFilter {
    #[default]
    All,
    Free,
    Paid,
}

impl PriceFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Free => "free",
            Self::Paid => "paid",
        }
    }
}

impl FromStr for PriceFilter {
    type Err = BazaarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "free" => Ok(Self::Free),
            "paid" => Ok(Self::Paid),
            other => Err(BazaarError::validation(format!(
                "Unknown price filter '{}' (expected all, free or paid)",
                other
            ))),
        }
    }
}

impl fmt::Display for PriceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Newest,
    Popular,
    PriceLow,
    PriceHigh,
    Rating,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Popular => "popular",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Rating => "rating",
        }
    }
}

impl FromStr for SortKey {
    type Err = BazaarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" => Ok(Self::Newest),
            "popular" => Ok(Self::Popular),
            "price-low" => Ok(Self::PriceLow),
            "price-high" => Ok(Self::PriceHigh),
            "rating" => Ok(Self::Rating),
            other => Err(BazaarError::validation(format!(
                "Unknown sort key '{}' (expected newest, popular, price-low, price-high or rating)",
                other
            ))),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current filter selection of the plugin listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginFilters {
    pub search: String,
    pub category: Option<String>,
    pub minecraft_version: Option<String>,
    pub price: PriceFilter,
    pub sort: SortKey,
}

/// A single filter toggle from the listing sidebar
#[derive(Debug, Clone, PartialEq)]
pub enum FilterChange {
    Category(Option<String>),
    MinecraftVersion(Option<String>),
    Price(PriceFilter),
    Sort(SortKey),
}

impl PluginFilters {
    pub fn apply(&mut self, change: FilterChange) {
        match change {
            FilterChange::Category(category) => self.category = non_blank(category),
            FilterChange::MinecraftVersion(version) => self.minecraft_version = non_blank(version),
            FilterChange::Price(price) => self.price = price,
            FilterChange::Sort(sort) => self.sort = sort,
        }
    }

    /// Query parameters for `GET /api/plugins`.
    ///
    /// Unset filters are omitted; `sortBy` is always sent.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();

        let search = self.search.trim();
        if !search.is_empty() {
            params.push(("search", search.to_string()));
        }
        if let Some(category) = &self.category {
            params.push(("category", category.clone()));
        }
        if let Some(version) = &self.minecraft_version {
            params.push(("minecraftVersion", version.clone()));
        }
        if self.price != PriceFilter::All {
            params.push(("price", self.price.as_str().to_string()));
        }
        params.push(("sortBy", self.sort.as_str().to_string()));

        params
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query_only_sorts() {
        let filters = PluginFilters::default();
        assert_eq!(filters.to_query(), vec![("sortBy", "newest".to_string())]);
    }

    #[test]
    fn test_full_query() {
        let mut filters = PluginFilters {
            search: "  worldedit ".into(),
            ..Default::default()
        };
        filters.apply(FilterChange::Category(Some("Admin Tools".into())));
        filters.apply(FilterChange::MinecraftVersion(Some("1.20".into())));
        filters.apply(FilterChange::Price(PriceFilter::Free));
        filters.apply(FilterChange::Sort(SortKey::PriceHigh));

        assert_eq!(
            filters.to_query(),
            vec![
                ("search", "worldedit".to_string()),
                ("category", "Admin Tools".to_string()),
                ("minecraftVersion", "1.20".to_string()),
                ("price", "free".to_string()),
                ("sortBy", "price-high".to_string()),
            ]
        );
    }

    #[test]
    fn test_blank_category_clears() {
        let mut filters = PluginFilters::default();
        filters.apply(FilterChange::Category(Some("Magic".into())));
        filters.apply(FilterChange::Category(Some("".into())));
        assert!(filters.category.is_none());
    }

    #[test]
    fn test_parse_keys() {
        assert_eq!("price-low".parse::<SortKey>().unwrap(), SortKey::PriceLow);
        assert_eq!("Paid".parse::<PriceFilter>().unwrap(), PriceFilter::Paid);
        assert!("cheapest".parse::<SortKey>().is_err());
    }
}
