//! Cursor pagination over id-ordered collections
//!
//! `before` and `after` are exclusive bounds on a resource's numeric id.
//! Unset fields are left out of the query entirely so the exchange applies its
//! own default; `Some(0)` is a real bound and is always sent.

/// `{count, before, after}` window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub count: Option<u64>,
    pub before: Option<u64>,
    pub after: Option<u64>,
}

impl Pagination {
    /// No constraints
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    /// Only ids strictly less than `id`
    pub fn with_before(mut self, id: u64) -> Self {
        self.before = Some(id);
        self
    }

    /// Only ids strictly greater than `id`
    pub fn with_after(mut self, id: u64) -> Self {
        self.after = Some(id);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.count.is_none() && self.before.is_none() && self.after.is_none()
    }

    /// Query parameters for the set fields, in `count, before, after` order
    pub fn render(&self) -> Vec<(&'static str, String)> {
        [("count", self.count), ("before", self.before), ("after", self.after)]
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v.to_string())))
            .collect()
    }
}
