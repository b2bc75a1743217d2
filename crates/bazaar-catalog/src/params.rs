//! Catalog query parameters, their validation, and their query-string form.
//!
//! The query-string form is the wire contract of
//! `GET /marketplace/{kind}`: `search`, `category`, `tag`, `style`,
//! `sellerId`, `minPrice`, `maxPrice`, `tags` (comma-joined),
//! `attr.<code>` (comma-joined), `page`, `pageSize`.

use std::collections::BTreeMap;
use std::str::FromStr;

use bazaar_core::{CatalogKind, PriceRange};
use rust_decimal::Decimal;

use crate::error::CatalogError;

pub const DEFAULT_PAGE_SIZE: u32 = 24;
pub const MAX_PAGE_SIZE: u32 = 100;

const ATTR_PREFIX: &str = "attr.";
const LIST_SEPARATOR: &str = ",";

/// Filter, facet and pagination input for one catalog query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pub kind: CatalogKind,
    /// Case-insensitive substring of title, description, vendor or keywords.
    pub search: Option<String>,
    /// `None` or `"All"` matches every category.
    pub category: Option<String>,
    pub tag: Option<String>,
    pub style: Option<String>,
    /// Matches an offer's seller id or seller name.
    pub seller: Option<String>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    /// Every listed tag must be present.
    pub tags: Vec<String>,
    /// Dimension code to the values that must all be options of it.
    pub attributes: BTreeMap<String, Vec<String>>,
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
}

impl QueryParams {
    #[must_use]
    pub fn new(kind: CatalogKind) -> Self {
        Self {
            kind,
            search: None,
            category: None,
            tag: None,
            style: None,
            seller: None,
            price_min: None,
            price_max: None,
            tags: Vec::new(),
            attributes: BTreeMap::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    #[must_use]
    pub fn with_seller(mut self, seller: impl Into<String>) -> Self {
        self.seller = Some(seller.into());
        self
    }

    #[must_use]
    pub fn with_price(mut self, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.price_min = min;
        self.price_max = max;
        self
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_attribute<I, S>(mut self, code: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes
            .insert(code.into(), values.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_page(mut self, page: u32, page_size: u32) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    /// The requested price window, or `None` when no price filter is active.
    /// A missing bound is open-ended.
    #[must_use]
    pub fn price_window(&self) -> Option<PriceRange> {
        if self.price_min.is_none() && self.price_max.is_none() {
            return None;
        }
        Some(PriceRange {
            min: self.price_min.unwrap_or(Decimal::MIN),
            max: self.price_max.unwrap_or(Decimal::MAX),
        })
    }

    /// Checks the parameters without touching any backend.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidParams`] if `page` is 0, `page_size`
    /// is 0 or above [`MAX_PAGE_SIZE`], a price bound is negative, the
    /// minimum exceeds the maximum, an attribute code is blank, an attribute
    /// has no non-blank value, or a `tags`/attribute value contains the
    /// list separator `,` (it could not survive the comma-joined wire form).
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.page == 0 {
            return Err(CatalogError::InvalidParams("page must be at least 1".into()));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(CatalogError::InvalidParams(format!(
                "pageSize must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.page_size
            )));
        }
        for (name, bound) in [("minPrice", self.price_min), ("maxPrice", self.price_max)] {
            if bound.is_some_and(|b| b.is_sign_negative() && !b.is_zero()) {
                return Err(CatalogError::InvalidParams(format!(
                    "{name} must not be negative"
                )));
            }
        }
        if let (Some(min), Some(max)) = (self.price_min, self.price_max) {
            if min > max {
                return Err(CatalogError::InvalidParams(format!(
                    "minPrice {min} exceeds maxPrice {max}"
                )));
            }
        }
        for (code, values) in &self.attributes {
            if code.trim().is_empty() {
                return Err(CatalogError::InvalidParams(
                    "attribute code must be non-empty".into(),
                ));
            }
            if values.iter().all(|v| v.trim().is_empty()) {
                return Err(CatalogError::InvalidParams(format!(
                    "attribute \"{code}\" needs at least one value"
                )));
            }
        }
        let mut list_values = self.tags.iter().chain(self.attributes.values().flatten());
        if let Some(value) = list_values.find(|v| v.contains(LIST_SEPARATOR)) {
            return Err(CatalogError::InvalidParams(format!(
                "list value \"{value}\" must not contain \"{LIST_SEPARATOR}\""
            )));
        }
        Ok(())
    }

    /// Serializes the parameters as query-string pairs. Unset filters are
    /// omitted; `page` and `pageSize` are always present.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        let mut push = |key: &str, value: Option<String>| {
            if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
                pairs.push((key.to_owned(), v));
            }
        };
        push("search", self.search.clone());
        push("category", self.category.clone());
        push("tag", self.tag.clone());
        push("style", self.style.clone());
        push("sellerId", self.seller.clone());
        push("minPrice", self.price_min.map(|p| p.normalize().to_string()));
        push("maxPrice", self.price_max.map(|p| p.normalize().to_string()));
        push("tags", Some(join_list(&self.tags)));
        for (code, values) in &self.attributes {
            push(&format!("{ATTR_PREFIX}{code}"), Some(join_list(values)));
        }
        pairs.push(("page".to_owned(), self.page.to_string()));
        pairs.push(("pageSize".to_owned(), self.page_size.to_string()));
        pairs
    }

    /// Parses query-string pairs produced by [`Self::to_query_pairs`].
    /// Unknown keys and blank values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidParams`] if a numeric field does not
    /// parse. The result is not validated; call [`Self::validate`].
    pub fn from_query_pairs<K, V>(
        kind: CatalogKind,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, CatalogError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::new(kind);
        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref().trim());
            if value.is_empty() {
                continue;
            }
            match key {
                "search" => params.search = Some(value.to_owned()),
                "category" => params.category = Some(value.to_owned()),
                "tag" => params.tag = Some(value.to_owned()),
                "style" => params.style = Some(value.to_owned()),
                "sellerId" => params.seller = Some(value.to_owned()),
                "minPrice" => params.price_min = Some(parse_field(key, value)?),
                "maxPrice" => params.price_max = Some(parse_field(key, value)?),
                "tags" => params.tags = split_list(value),
                "page" => params.page = parse_field(key, value)?,
                "pageSize" => params.page_size = parse_field(key, value)?,
                _ => {
                    if let Some(code) = key.strip_prefix(ATTR_PREFIX) {
                        params.attributes.insert(code.to_owned(), split_list(value));
                    }
                }
            }
        }
        Ok(params)
    }
}

fn parse_field<T: FromStr>(key: &str, value: &str) -> Result<T, CatalogError> {
    value
        .parse()
        .map_err(|_| CatalogError::InvalidParams(format!("{key} has invalid value \"{value}\"")))
}

fn join_list(values: &[String]) -> String {
    values.join(LIST_SEPARATOR)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}
