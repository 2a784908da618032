//! Items being ranked (peers and ideas) and the ordered catalog holding them

use crate::rating::Rating;
use std::fmt;

/// Stable slug identifying an item
///
/// Derived from the display name: lowercased, every run of characters outside
/// `[a-z0-9]` collapsed to a single `-`, and one trailing `-` dropped.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(String);

impl ItemId {
    /// Derive the id for a display name
    ///
    /// # Examples
    ///
    /// ```
    /// use tiermatch_domain::ItemId;
    ///
    /// assert_eq!(ItemId::from_name("Supermarket 60:40").as_str(), "supermarket-60-40");
    /// assert_eq!(ItemId::from_name("WASH").as_str(), "wash");
    /// ```
    pub fn from_name(name: &str) -> Self {
        let lowered = name.to_lowercase();
        let mut slug = String::with_capacity(lowered.len());
        let mut in_gap = false;
        for ch in lowered.chars() {
            if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
                slug.push(ch);
                in_gap = false;
            } else if !in_gap {
                slug.push('-');
                in_gap = true;
            }
        }
        if slug.ends_with('-') {
            slug.pop();
        }
        Self(slug)
    }

    /// Wrap an id that is already a slug (e.g. read back from storage)
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the slug
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An entity being ranked: a co-founder candidate or an idea
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Slug id
    pub id: ItemId,
    /// Display name
    pub name: String,
    /// Externally sourced rating, if any
    pub baseline: Option<Rating>,
}

impl Item {
    /// Create an item, deriving its id from the name
    pub fn new(name: impl Into<String>, baseline: Option<Rating>) -> Self {
        let name = name.into();
        Self {
            id: ItemId::from_name(&name),
            name,
            baseline,
        }
    }
}

/// The fixed, ordered item universe of one ranking domain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    items: Vec<Item>,
}

impl Catalog {
    /// Build a catalog; later items whose id repeats an earlier one are dropped
    pub fn new(items: impl IntoIterator<Item = Item>) -> Self {
        let mut kept: Vec<Item> = Vec::new();
        for item in items {
            if !kept.iter().any(|k| k.id == item.id) {
                kept.push(item);
            }
        }
        Self { items: kept }
    }

    /// Items in catalog order
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Look up an item by id
    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// True when the id belongs to this catalog
    pub fn contains(&self, id: &ItemId) -> bool {
        self.get(id).is_some()
    }

    /// Resolve user input (an id or a display name) to a catalog id
    pub fn resolve(&self, reference: &str) -> Option<&ItemId> {
        let wanted = ItemId::from_name(reference);
        self.items
            .iter()
            .find(|i| i.id == wanted || i.id.as_str() == reference)
            .map(|i| &i.id)
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the catalog holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
