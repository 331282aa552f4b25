//! List algebra: typed-enum sets over author-declared `LIST` enumerations.
//!
//! Styled after the crate's own `Value` type: a closed, derive-heavy value
//! type with explicit arithmetic and comparison methods that return
//! `Result` rather than panicking.
//!
//! A [`ListValue`] is a multi-typed set: a mapping from list name to the set
//! of its items that are currently "on". Most stories only ever touch a
//! single list's worth of items at a time, but Ink allows mixing items from
//! different `LIST` declarations in one variable, so every operation here is
//! defined across the full multi-list value rather than a single named list.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

use crate::model::ListDecl;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
/// A set of active items, possibly spanning more than one `LIST`
/// declaration.
///
/// # Examples
/// ```
/// # use fabled::ListValue;
/// let colors = ListValue::single("colors", "red");
/// let more_colors = ListValue::single("colors", "blue");
/// let both = colors.union(&more_colors);
/// assert!(both.contains(&colors));
/// assert!(both.contains(&more_colors));
/// ```
pub struct ListValue {
    sets: BTreeMap<String, BTreeSet<String>>,
}

impl ListValue {
    /// The empty list value, belonging to no list.
    pub fn empty() -> Self {
        ListValue {
            sets: BTreeMap::new(),
        }
    }

    /// A value with a single active item in a single list.
    pub fn single(list: impl Into<String>, item: impl Into<String>) -> Self {
        let mut sets = BTreeMap::new();
        let mut set = BTreeSet::new();
        set.insert(item.into());
        sets.insert(list.into(), set);

        ListValue { sets }
    }

    /// A value with every item of `list` in `decl` active (`LIST_ALL`).
    pub fn all(list: impl Into<String>, decl: &ListDecl) -> Self {
        let mut sets = BTreeMap::new();
        sets.insert(list.into(), decl.items.iter().cloned().collect());

        ListValue { sets }
    }

    /// A value with every item of `list` *not* present in `self` active
    /// (`LIST_INVERT`). Only meaningful for a value naming a single list.
    pub fn invert(&self, list: &str, decl: &ListDecl) -> ListValue {
        let active = self.sets.get(list);
        let inverted = decl
            .items
            .iter()
            .filter(|item| active.map_or(true, |set| !set.contains(*item)))
            .cloned()
            .collect();

        let mut sets = BTreeMap::new();
        sets.insert(list.to_string(), inverted);

        ListValue { sets }
    }

    /// All items between `min` and `max` (inclusive, by raw ordinal) of
    /// `list` (`LIST_RANGE`).
    pub fn range(list: &str, decl: &ListDecl, min: u32, max: u32) -> ListValue {
        let items = decl
            .items
            .iter()
            .enumerate()
            .filter(|(index, _)| {
                let ordinal = (*index + 1) as u32;
                ordinal >= min && ordinal <= max
            })
            .map(|(_, item)| item.clone())
            .collect();

        let mut sets = BTreeMap::new();
        sets.insert(list.to_string(), items);

        ListValue { sets }
    }

    pub fn is_empty(&self) -> bool {
        self.sets.values().all(BTreeSet::is_empty)
    }

    /// Names of every `LIST` this value mentions, whether or not any of
    /// their items are currently active. Used by the `LIST_ALL`/
    /// `LIST_INVERT`/`LIST_RANDOM`/`LIST_RANGE` host functions to find which
    /// declaration an argument belongs to.
    pub fn list_names(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    /// Total number of active items across every list (`LIST_COUNT`).
    pub fn count(&self) -> u32 {
        self.sets.values().map(BTreeSet::len).sum::<usize>() as u32
    }

    /// Union, `a + b`: every item active in either operand.
    pub fn union(&self, other: &ListValue) -> ListValue {
        let mut sets = self.sets.clone();

        for (list, items) in &other.sets {
            sets.entry(list.clone())
                .or_insert_with(BTreeSet::new)
                .extend(items.iter().cloned());
        }

        ListValue { sets }
    }

    /// Difference, `a - b`: items active in `self` and not in `other`.
    pub fn difference(&self, other: &ListValue) -> ListValue {
        let mut sets = BTreeMap::new();

        for (list, items) in &self.sets {
            let removed = match other.sets.get(list) {
                Some(other_items) => items.difference(other_items).cloned().collect(),
                None => items.clone(),
            };
            sets.insert(list.clone(), removed);
        }

        ListValue { sets }
    }

    /// Intersection, `a ∩ b`: items active in both operands.
    pub fn intersect(&self, other: &ListValue) -> ListValue {
        let mut sets = BTreeMap::new();

        for (list, items) in &self.sets {
            if let Some(other_items) = other.sets.get(list) {
                sets.insert(list.clone(), items.intersection(other_items).cloned().collect());
            }
        }

        ListValue { sets }
    }

    /// `self has other`: every item of `other` is present in `self`.
    pub fn contains(&self, other: &ListValue) -> bool {
        other.sets.iter().all(|(list, items)| {
            self.sets
                .get(list)
                .map_or(items.is_empty(), |mine| items.is_subset(mine))
        })
    }

    /// Same set contents across every list name.
    pub fn value_equal(&self, other: &ListValue) -> bool {
        let non_empty = |sets: &BTreeMap<String, BTreeSet<String>>| {
            sets.iter()
                .filter(|(_, items)| !items.is_empty())
                .map(|(list, items)| (list.clone(), items.clone()))
                .collect::<BTreeMap<_, _>>()
        };

        non_empty(&self.sets) == non_empty(&other.sets)
    }

    /// Raw ordinal of the single item carried by a single-element,
    /// single-list value (`LIST_VALUE`).
    pub fn single_value(&self, decls: &HashMap<String, ListDecl>) -> Option<u32> {
        if self.sets.len() != 1 {
            return None;
        }

        let (list, items) = self.sets.iter().next()?;
        if items.len() != 1 {
            return None;
        }

        let item = items.iter().next()?;
        decls.get(list)?.ordinal(item)
    }

    /// Smallest raw ordinal across every active item, alongside the
    /// declaration it was found in. `None` for an empty value.
    fn extreme_ordinal(
        &self,
        decls: &HashMap<String, ListDecl>,
        pick_min: bool,
    ) -> Option<(String, u32)> {
        self.sets
            .iter()
            .filter_map(|(list, items)| {
                let decl = decls.get(list)?;
                items.iter().filter_map(|item| decl.ordinal(item)).reduce(
                    if pick_min {
                        std::cmp::min
                    } else {
                        std::cmp::max
                    },
                )
                .map(|ordinal| (list.clone(), ordinal))
            })
            .reduce(|a, b| {
                if pick_min == (a.1 <= b.1) {
                    a
                } else {
                    b
                }
            })
    }

    pub fn min(&self, decls: &HashMap<String, ListDecl>) -> Option<(String, u32)> {
        self.extreme_ordinal(decls, true)
    }

    pub fn max(&self, decls: &HashMap<String, ListDecl>) -> Option<(String, u32)> {
        self.extreme_ordinal(decls, false)
    }

    /// The item of smallest raw ordinal, as a single-item `ListValue`
    /// (`LIST_MIN`).
    pub fn min_item(&self, decls: &HashMap<String, ListDecl>) -> ListValue {
        self.pick_extreme(decls, true)
    }

    /// The item of largest raw ordinal, as a single-item `ListValue`
    /// (`LIST_MAX`).
    pub fn max_item(&self, decls: &HashMap<String, ListDecl>) -> ListValue {
        self.pick_extreme(decls, false)
    }

    fn pick_extreme(&self, decls: &HashMap<String, ListDecl>, pick_min: bool) -> ListValue {
        match self.extreme_ordinal(decls, pick_min) {
            Some((list, ordinal)) => {
                let decl = &decls[&list];
                let item = decl.item_at(ordinal).unwrap().to_string();
                ListValue::single(list, item)
            }
            None => ListValue::empty(),
        }
    }

    /// `self < other`: the largest item of `self` precedes the smallest item
    /// of `other`. Mirrors the relational operators of the `Ink` list
    /// runtime (see DESIGN.md): comparisons straddle the *other* operand's
    /// opposite extreme, not its matching one, so that e.g. `a > b` really
    /// does mean "everything in `a` outranks everything in `b`".
    pub fn less_than(&self, other: &ListValue, decls: &HashMap<String, ListDecl>) -> bool {
        match (self.max(decls), other.min(decls)) {
            (Some((_, max_self)), Some((_, min_other))) => max_self < min_other,
            _ => false,
        }
    }

    /// `self > other`: the smallest item of `self` follows the largest item
    /// of `other`.
    pub fn greater_than(&self, other: &ListValue, decls: &HashMap<String, ListDecl>) -> bool {
        match (self.min(decls), other.max(decls)) {
            (Some((_, min_self)), Some((_, max_other))) => min_self > max_other,
            _ => false,
        }
    }

    /// `self <= other`: the largest item of `self` does not exceed the
    /// largest item of `other`.
    pub fn less_than_or_equal(&self, other: &ListValue, decls: &HashMap<String, ListDecl>) -> bool {
        match (self.max(decls), other.max(decls)) {
            (Some((_, max_self)), Some((_, max_other))) => max_self <= max_other,
            _ => false,
        }
    }

    /// `self >= other`: the smallest item of `self` is at least the smallest
    /// item of `other`.
    pub fn greater_than_or_equal(
        &self,
        other: &ListValue,
        decls: &HashMap<String, ListDecl>,
    ) -> bool {
        match (self.min(decls), other.min(decls)) {
            (Some((_, min_self)), Some((_, min_other))) => min_self >= min_other,
            _ => false,
        }
    }

    /// Render as a comma-separated list of item names in declaration order.
    pub fn render(&self, decls: &HashMap<String, ListDecl>, order: &[String]) -> String {
        let mut parts = Vec::new();

        for list in order {
            if let (Some(decl), Some(active)) = (decls.get(list), self.sets.get(list)) {
                for item in &decl.items {
                    if active.contains(item) {
                        parts.push(item.clone());
                    }
                }
            }
        }

        parts.join(", ")
    }
}

impl fmt::Display for ListValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut parts = Vec::new();
        for items in self.sets.values() {
            parts.extend(items.iter().cloned());
        }
        write!(f, "{}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors() -> ListDecl {
        ListDecl {
            items: vec!["red".into(), "green".into(), "blue".into()],
            initially_on: vec!["green".into()],
        }
    }

    fn decls() -> HashMap<String, ListDecl> {
        let mut map = HashMap::new();
        map.insert("colors".to_string(), colors());
        map
    }

    #[test]
    fn union_keeps_items_from_both_operands() {
        let a = ListValue::single("colors", "red");
        let b = ListValue::single("colors", "blue");
        let both = a.union(&b);

        assert!(both.contains(&a));
        assert!(both.contains(&b));
        assert_eq!(both.count(), 2);
    }

    #[test]
    fn difference_removes_only_named_items() {
        let colors = ListValue::single("colors", "red").union(&ListValue::single("colors", "green"));
        let without_green = colors.difference(&ListValue::single("colors", "green"));

        assert!(without_green.contains(&ListValue::single("colors", "red")));
        assert!(!without_green.contains(&ListValue::single("colors", "green")));
    }

    #[test]
    fn has_checks_subset_membership() {
        let colors = ListValue::single("colors", "red").union(&ListValue::single("colors", "green"));
        assert!(colors.contains(&ListValue::single("colors", "green")));
        assert!(!colors.contains(&ListValue::single("colors", "blue")));
    }

    #[test]
    fn min_and_max_use_raw_declaration_ordinal() {
        let decls = decls();
        let value = ListValue::single("colors", "red").union(&ListValue::single("colors", "blue"));

        assert_eq!(value.min(&decls), Some(("colors".to_string(), 1)));
        assert_eq!(value.max(&decls), Some(("colors".to_string(), 3)));
    }

    #[test]
    fn ordering_compares_opposite_extremes() {
        let decls = decls();
        let low = ListValue::single("colors", "red");
        let high = ListValue::single("colors", "blue");

        assert!(low.less_than(&high, &decls));
        assert!(high.greater_than(&low, &decls));
        assert!(!low.greater_than(&high, &decls));
    }

    #[test]
    fn invert_yields_every_other_declared_item() {
        let decls = colors();
        let value = ListValue::single("colors", "green");
        let inverted = value.invert("colors", &decls);

        assert!(inverted.contains(&ListValue::single("colors", "red")));
        assert!(inverted.contains(&ListValue::single("colors", "blue")));
        assert!(!inverted.contains(&ListValue::single("colors", "green")));
    }

    #[test]
    fn render_lists_items_in_declaration_order_not_insertion_order() {
        let decls = decls();
        let order = vec!["colors".to_string()];
        let value = ListValue::single("colors", "blue").union(&ListValue::single("colors", "red"));

        assert_eq!(value.render(&decls, &order), "red, blue");
    }
}
