//! Qnode disambiguation selectors and their per-string cache
//!
//! One selector exists per unique event text and one per unique refvar.
//! Options are fetched once; a selector holding at least one option is never
//! fetched again.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Raw name of the synthetic option that declines every candidate
pub const NONE_OF_THE_ABOVE: &str = "None of the above";

/// A knowledge-base candidate for a query string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QnodeOption {
    pub qnode: String,
    #[serde(rename = "rawName")]
    pub raw_name: String,
    #[serde(default)]
    pub definition: String,
}

impl QnodeOption {
    pub fn new(qnode: impl Into<String>, raw_name: impl Into<String>) -> Self {
        Self {
            qnode: qnode.into(),
            raw_name: raw_name.into(),
            definition: String::new(),
        }
    }

    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = definition.into();
        self
    }

    pub fn none_of_the_above() -> Self {
        Self::new("", NONE_OF_THE_ABOVE)
    }

    /// The synthetic option carries no qnode
    pub fn is_none_option(&self) -> bool {
        self.qnode.is_empty()
    }
}

/// Disambiguation state for one query string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QnodeSelector {
    /// The event text or refvar being disambiguated
    pub query: String,
    #[serde(default)]
    pub options: Vec<QnodeOption>,
    /// Committed choice
    #[serde(default)]
    pub qnode: Option<String>,
    /// Pending choice, committed or discarded in bulk
    #[serde(default, rename = "selectedQnode")]
    pub selected_qnode: Option<String>,
}

impl QnodeSelector {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            options: Vec::new(),
            qnode: None,
            selected_qnode: None,
        }
    }

    /// Selector for a reference loaded from a saved schema: no options yet,
    /// the reference is both committed and pending
    pub fn seeded(query: impl Into<String>, reference: impl Into<String>) -> Self {
        let reference = reference.into();
        Self {
            query: query.into(),
            options: Vec::new(),
            qnode: Some(reference.clone()),
            selected_qnode: Some(reference),
        }
    }

    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    /// Set the pending choice.
    ///
    /// `None` or the empty qnode declines every candidate. Returns false and
    /// leaves the selector unchanged when `qnode` is not among the options.
    pub fn select(&mut self, qnode: Option<&str>) -> bool {
        match qnode.filter(|q| !q.is_empty()) {
            None => {
                self.selected_qnode = None;
                true
            }
            Some(q) if self.options.iter().any(|o| o.qnode == q) => {
                self.selected_qnode = Some(q.to_string());
                true
            }
            Some(_) => false,
        }
    }

    /// Promote the pending choice
    pub fn commit(&mut self) {
        self.qnode = self.selected_qnode.clone();
    }

    /// Revert the pending choice to the committed one
    pub fn discard(&mut self) {
        self.selected_qnode = self.qnode.clone();
    }

    /// The option matching the committed qnode
    pub fn committed_option(&self) -> Option<&QnodeOption> {
        let qnode = self.qnode.as_deref()?;
        self.options.iter().find(|o| o.qnode == qnode)
    }
}

/// Which cache a selector belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorKind {
    Event,
    Refvar,
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorKind::Event => write!(f, "event"),
            SelectorKind::Refvar => write!(f, "refvar"),
        }
    }
}

/// A disambiguation fetch the cache decided is needed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Lookup {
    pub kind: SelectorKind,
    pub query: String,
}

impl Lookup {
    pub fn event(query: impl Into<String>) -> Self {
        Self {
            kind: SelectorKind::Event,
            query: query.into(),
        }
    }

    pub fn refvar(query: impl Into<String>) -> Self {
        Self {
            kind: SelectorKind::Refvar,
            query: query.into(),
        }
    }
}

/// Insertion-ordered map of selectors keyed by query string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<QnodeSelector>", into = "Vec<QnodeSelector>")]
pub struct SelectorCache {
    order: Vec<String>,
    entries: HashMap<String, QnodeSelector>,
}

impl SelectorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, query: &str) -> bool {
        self.entries.contains_key(query)
    }

    pub fn get(&self, query: &str) -> Option<&QnodeSelector> {
        self.entries.get(query)
    }

    pub fn get_mut(&mut self, query: &str) -> Option<&mut QnodeSelector> {
        self.entries.get_mut(query)
    }

    /// Selectors in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &QnodeSelector> {
        self.order.iter().filter_map(|q| self.entries.get(q))
    }

    /// Query strings in insertion order
    pub fn queries(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Whether `query` has to be fetched: true unless a selector with at
    /// least one option is cached
    pub fn needs_fetch(&self, query: &str) -> bool {
        !self.entries.get(query).is_some_and(QnodeSelector::has_options)
    }

    /// Store fetched candidates for `query`.
    ///
    /// A non-empty candidate list gets the "None of the above" option appended
    /// and replaces the selector's options. The committed and pending choices
    /// are cleared when nothing was found or nothing was committed. The query
    /// joins the insertion order only if it is new.
    pub fn apply(&mut self, query: &str, mut options: Vec<QnodeOption>) -> &QnodeSelector {
        let found = !options.is_empty();
        if !self.entries.contains_key(query) {
            self.order.push(query.to_string());
        }
        let selector = self
            .entries
            .entry(query.to_string())
            .or_insert_with(|| QnodeSelector::new(query));
        if found {
            options.push(QnodeOption::none_of_the_above());
            selector.options = options;
        }
        if selector.qnode.as_deref().map_or(true, str::is_empty) || !found {
            selector.qnode = None;
            selector.selected_qnode = None;
        }
        selector
    }

    /// Insert `selector` unless its query is already cached
    pub fn insert_if_absent(&mut self, selector: QnodeSelector) -> bool {
        if self.entries.contains_key(&selector.query) {
            return false;
        }
        self.order.push(selector.query.clone());
        self.entries.insert(selector.query.clone(), selector);
        true
    }

    /// Remove the selector for `query` from both the map and the order
    pub fn remove(&mut self, query: &str) -> Option<QnodeSelector> {
        let removed = self.entries.remove(query)?;
        self.order.retain(|q| q != query);
        Some(removed)
    }

    /// New cache holding the existing selectors for `used` queries, in the
    /// order they are first named there. Unused selectors are left behind and
    /// nothing is fetched.
    pub fn retain_used<'a>(&self, used: impl IntoIterator<Item = &'a str>) -> SelectorCache {
        let mut kept = SelectorCache::new();
        for query in used {
            if let Some(selector) = self.entries.get(query) {
                kept.insert_if_absent(selector.clone());
            }
        }
        kept
    }

    /// Commit every pending choice
    pub fn commit_all(&mut self) {
        self.entries.values_mut().for_each(QnodeSelector::commit);
    }

    /// Discard every pending choice
    pub fn discard_all(&mut self) {
        self.entries.values_mut().for_each(QnodeSelector::discard);
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
    }
}

impl From<Vec<QnodeSelector>> for SelectorCache {
    fn from(selectors: Vec<QnodeSelector>) -> Self {
        let mut cache = SelectorCache::new();
        for selector in selectors {
            cache.insert_if_absent(selector);
        }
        cache
    }
}

impl From<SelectorCache> for Vec<QnodeSelector> {
    fn from(mut cache: SelectorCache) -> Self {
        cache
            .order
            .iter()
            .filter_map(|q| cache.entries.remove(q))
            .collect()
    }
}

/// The event and refvar caches of one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selectors {
    #[serde(default)]
    pub events: SelectorCache,
    #[serde(default)]
    pub refvars: SelectorCache,
}

impl Selectors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self, kind: SelectorKind) -> &SelectorCache {
        match kind {
            SelectorKind::Event => &self.events,
            SelectorKind::Refvar => &self.refvars,
        }
    }

    pub fn cache_mut(&mut self, kind: SelectorKind) -> &mut SelectorCache {
        match kind {
            SelectorKind::Event => &mut self.events,
            SelectorKind::Refvar => &mut self.refvars,
        }
    }

    /// The lookup needed for `query`, if it is not cached with options
    pub fn lookup_for(&self, kind: SelectorKind, query: &str) -> Option<Lookup> {
        self.cache(kind).needs_fetch(query).then(|| Lookup {
            kind,
            query: query.to_string(),
        })
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.refvars.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<QnodeOption> {
        vec![
            QnodeOption::new("Q1", "purchase").with_definition("to buy"),
            QnodeOption::new("Q2", "acquire"),
        ]
    }

    #[test]
    fn apply_appends_none_option() {
        let mut cache = SelectorCache::new();
        let selector = cache.apply("buy", candidates());
        assert_eq!(selector.options.len(), 3);
        assert!(selector.options[2].is_none_option());
        assert_eq!(selector.options[2].raw_name, NONE_OF_THE_ABOVE);
        assert!(!cache.needs_fetch("buy"));
    }

    #[test]
    fn apply_without_candidates_stays_fetchable() {
        let mut cache = SelectorCache::new();
        let selector = cache.apply("buy", vec![]);
        assert!(selector.options.is_empty());
        assert_eq!(cache.len(), 1);
        assert!(cache.needs_fetch("buy"));
    }

    #[test]
    fn apply_keeps_seeded_choice_when_candidates_found() {
        let mut cache = SelectorCache::new();
        cache.insert_if_absent(QnodeSelector::seeded("buy", "Q1"));
        let selector = cache.apply("buy", candidates());
        assert_eq!(selector.qnode.as_deref(), Some("Q1"));
        assert_eq!(selector.selected_qnode.as_deref(), Some("Q1"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn apply_clears_seeded_choice_when_nothing_found() {
        let mut cache = SelectorCache::new();
        cache.insert_if_absent(QnodeSelector::seeded("buy", "Q1"));
        let selector = cache.apply("buy", vec![]);
        assert_eq!(selector.qnode, None);
        assert_eq!(selector.selected_qnode, None);
    }

    #[test]
    fn apply_clears_uncommitted_pending_choice() {
        let mut cache = SelectorCache::new();
        let mut selector = QnodeSelector::new("buy");
        selector.selected_qnode = Some("Q2".into());
        cache.insert_if_absent(selector);
        let selector = cache.apply("buy", candidates());
        assert_eq!(selector.selected_qnode, None);
    }

    #[test]
    fn select_commit_and_discard() {
        let mut cache = SelectorCache::new();
        cache.apply("buy", candidates());
        let selector = cache.get_mut("buy").unwrap();

        assert!(selector.select(Some("Q2")));
        assert!(!selector.select(Some("Q9")));
        assert_eq!(selector.selected_qnode.as_deref(), Some("Q2"));
        selector.commit();
        assert_eq!(selector.committed_option().unwrap().raw_name, "acquire");

        selector.select(Some(""));
        assert_eq!(selector.selected_qnode, None);
        selector.discard();
        assert_eq!(selector.selected_qnode.as_deref(), Some("Q2"));
    }

    #[test]
    fn remove_drops_from_map_and_order() {
        let mut cache = SelectorCache::new();
        cache.apply("buy", candidates());
        cache.apply("sell", candidates());
        assert!(cache.remove("buy").is_some());
        assert!(cache.remove("buy").is_none());
        assert_eq!(cache.queries().collect::<Vec<_>>(), vec!["sell"]);
        assert!(!cache.contains("buy"));
    }

    #[test]
    fn retain_used_keeps_existing_objects_in_use_order() {
        let mut cache = SelectorCache::new();
        cache.apply("buy", candidates());
        cache.apply("sell", candidates());
        cache.apply("ship", vec![]);
        cache.get_mut("sell").unwrap().qnode = Some("Q1".into());

        let kept = cache.retain_used(["sell", "missing", "buy", "sell"]);
        assert_eq!(kept.queries().collect::<Vec<_>>(), vec!["sell", "buy"]);
        assert_eq!(kept.get("sell"), cache.get("sell"));
        assert!(!kept.contains("missing"));
    }

    #[test]
    fn serializes_as_ordered_list() {
        let mut cache = SelectorCache::new();
        cache.apply("sell", vec![]);
        cache.apply("buy", vec![]);
        let value = serde_json::to_value(&cache).unwrap();
        assert_eq!(value[0]["query"], "sell");
        assert_eq!(value[1]["query"], "buy");
        let back: SelectorCache = serde_json::from_value(value).unwrap();
        assert_eq!(back, cache);
    }
}
