//! Query-string construction and query keys.
//!
//! The query string doubles as the request identity: two requests are the
//! same request iff they target the same resource with byte-identical query
//! strings. Filters are serialized in lexicographic key order so the order in
//! which a caller assembled them never leaks into the key.

use std::collections::BTreeMap;
use std::fmt;
use url::form_urlencoded;

/// Names the backend uses for the page index and page size parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageParams {
    pub page: String,
    pub limit: String,
}

impl PageParams {
    pub fn new(page: impl Into<String>, limit: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            limit: limit.into(),
        }
    }

    /// `_page` / `_limit`, as spoken by json-server style backends.
    pub fn json_server() -> Self {
        Self::new("_page", "_limit")
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self::new("page", "limit")
    }
}

/// Static query parameters supplied by the page that owns the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BaseQuery {
    pairs: Vec<(String, String)>,
}

impl BaseQuery {
    /// Parse an `a=1&b=2` string. A leading `?` is ignored.
    pub fn parse(query: &str) -> Self {
        let query = query.trim().trim_start_matches('?');
        Self {
            pairs: form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.pairs.retain(|(k, _)| *k != key);
        self.pairs.push((key, value.into()));
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Identity of one `(resource, page, page size, filters)` combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    resource: String,
    query: String,
}

impl QueryKey {
    pub fn new(resource: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            query: query.into(),
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.query.is_empty() {
            write!(f, "{}", self.resource)
        } else {
            write!(f, "{}?{}", self.resource, self.query)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryBuilder {
    base: BaseQuery,
    params: PageParams,
}

impl QueryBuilder {
    pub fn new(base: BaseQuery, params: PageParams) -> Self {
        Self { base, params }
    }

    pub fn base(&self) -> &BaseQuery {
        &self.base
    }

    pub fn params(&self) -> &PageParams {
        &self.params
    }

    /// Serialize one page request.
    ///
    /// Base entries come first, minus any that collide with the page params or
    /// with a filter field (filters always win, and an empty filter removes the
    /// base entry). Then page and limit, then non-empty filters sorted by key.
    pub fn build<I, K, V>(&self, page: u32, page_size: u32, filters: I) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let filters: BTreeMap<String, String> = filters
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_owned(), v.as_ref().to_owned()))
            .collect();

        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.base.pairs() {
            if *key == self.params.page || *key == self.params.limit || filters.contains_key(key) {
                continue;
            }
            serializer.append_pair(key, value);
        }
        serializer.append_pair(&self.params.page, &page.to_string());
        serializer.append_pair(&self.params.limit, &page_size.to_string());
        for (key, value) in &filters {
            if !value.is_empty() {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }

    pub fn key<I, K, V>(&self, resource: &str, page: u32, page_size: u32, filters: I) -> QueryKey
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        QueryKey::new(resource, self.build(page, page_size, filters))
    }
}
