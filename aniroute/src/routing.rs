//! Identifier-prefix routing.

use aniroute_core::SourceKey;

/// One prefix rule: ids starting with `prefix` belong to `primary`, with an
/// optional designated `backup`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    /// Identifier prefix, matched case-sensitively.
    pub prefix: String,
    /// Source that owns the identifier space.
    pub primary: SourceKey,
    /// Source to use when the primary is unavailable.
    pub backup: Option<SourceKey>,
}

/// Fixed prefix table consulted for id-keyed operations. The longest
/// matching prefix wins.
#[derive(Debug, Clone, Default)]
pub struct IdRoutingTable {
    rules: Vec<RouteRule>,
}

impl IdRoutingTable {
    /// Add a rule, replacing any previous rule for the same prefix.
    pub fn insert(&mut self, rule: RouteRule) {
        self.rules.retain(|r| r.prefix != rule.prefix);
        self.rules.push(rule);
        self.rules
            .sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
    }

    /// Rule for `id`, if any prefix matches.
    #[must_use]
    pub fn resolve(&self, id: &str) -> Option<&RouteRule> {
        self.rules.iter().find(|r| id.starts_with(r.prefix.as_str()))
    }

    /// All rules, longest prefix first.
    #[must_use]
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }
}
