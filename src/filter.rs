use std::collections::BTreeSet;

use crate::loader::LookupKind;
use crate::query::MonsterRow;

/// Selected values per category.
///
/// A monster passes when, for every category with a selection, it carries at
/// least one selected value. Empty categories impose no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonsterFilter {
    types: BTreeSet<String>,
    tags: BTreeSet<String>,
    terrains: BTreeSet<String>,
}

impl MonsterFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a filter from optional per-category lists (CLI style)
    pub fn from_lists(
        types: Option<Vec<String>>,
        tags: Option<Vec<String>>,
        terrains: Option<Vec<String>>,
    ) -> Self {
        let mut filter = Self::new();
        for (kind, values) in [
            (LookupKind::Type, types),
            (LookupKind::Tag, tags),
            (LookupKind::Terrain, terrains),
        ] {
            for value in values.into_iter().flatten() {
                filter.select(kind, value);
            }
        }
        filter
    }

    fn set(&self, kind: LookupKind) -> &BTreeSet<String> {
        match kind {
            LookupKind::Type => &self.types,
            LookupKind::Tag => &self.tags,
            LookupKind::Terrain => &self.terrains,
        }
    }

    fn set_mut(&mut self, kind: LookupKind) -> &mut BTreeSet<String> {
        match kind {
            LookupKind::Type => &mut self.types,
            LookupKind::Tag => &mut self.tags,
            LookupKind::Terrain => &mut self.terrains,
        }
    }

    pub fn select(&mut self, kind: LookupKind, value: impl Into<String>) {
        self.set_mut(kind).insert(value.into());
    }

    /// Flip a value's selection. Returns whether it is now selected.
    pub fn toggle(&mut self, kind: LookupKind, value: &str) -> bool {
        let set = self.set_mut(kind);
        if set.remove(value) {
            false
        } else {
            set.insert(value.to_string());
            true
        }
    }

    pub fn is_selected(&self, kind: LookupKind, value: &str) -> bool {
        self.set(kind).contains(value)
    }

    pub fn clear(&mut self) {
        self.types.clear();
        self.tags.clear();
        self.terrains.clear();
    }

    pub fn is_empty(&self) -> bool {
        LookupKind::ALL.iter().all(|&kind| self.set(kind).is_empty())
    }

    pub fn matches(&self, row: &MonsterRow) -> bool {
        LookupKind::ALL.iter().all(|&kind| {
            let selected = self.set(kind);
            selected.is_empty() || row.values(kind).iter().any(|v| selected.contains(v))
        })
    }

    /// Rows passing the filter, in their original order
    pub fn apply<'a>(&self, rows: &'a [MonsterRow]) -> Vec<&'a MonsterRow> {
        rows.iter().filter(|row| self.matches(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(slug: &str, types: &[&str], tags: &[&str], terrains: &[&str]) -> MonsterRow {
        let owned = |v: &[&str]| -> Vec<String> { v.iter().map(|s| s.to_string()).collect() };
        MonsterRow {
            id: 0,
            slug: slug.to_string(),
            category: String::new(),
            shape: String::new(),
            stage: String::new(),
            height: 0.0,
            weight: 0.0,
            catch_rate: 0.0,
            lower_catch_resistance: 0.0,
            upper_catch_resistance: 0.0,
            types: owned(types),
            tags: owned(tags),
            terrains: owned(terrains),
        }
    }

    fn slugs(rows: Vec<&MonsterRow>) -> Vec<&str> {
        rows.into_iter().map(|r| r.slug.as_str()).collect()
    }

    fn sample() -> Vec<MonsterRow> {
        vec![
            row("aardart", &["wood"], &["sharp"], &["forest"]),
            row("bigfin", &["water"], &[], &["ocean"]),
            row("budaye", &["wood", "water"], &["sharp"], &[]),
            row("nut", &[], &[], &[]),
        ]
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let rows = sample();
        assert_eq!(MonsterFilter::new().apply(&rows).len(), rows.len());
    }

    #[test]
    fn test_or_within_category() {
        let rows = sample();
        let mut filter = MonsterFilter::new();
        filter.select(LookupKind::Type, "wood");
        filter.select(LookupKind::Type, "water");
        assert_eq!(slugs(filter.apply(&rows)), vec!["aardart", "bigfin", "budaye"]);
    }

    #[test]
    fn test_and_across_categories() {
        let rows = sample();
        let mut filter = MonsterFilter::new();
        filter.select(LookupKind::Type, "water");
        filter.select(LookupKind::Tag, "sharp");
        assert_eq!(slugs(filter.apply(&rows)), vec!["budaye"]);
    }

    #[test]
    fn test_unique_value_selects_single_monster() {
        let rows = sample();
        let filter = MonsterFilter::from_lists(None, None, Some(vec!["ocean".to_string()]));
        assert_eq!(slugs(filter.apply(&rows)), vec!["bigfin"]);
    }

    #[test]
    fn test_toggle() {
        let mut filter = MonsterFilter::new();
        assert!(filter.toggle(LookupKind::Tag, "sharp"));
        assert!(filter.is_selected(LookupKind::Tag, "sharp"));
        assert!(!filter.toggle(LookupKind::Tag, "sharp"));
        assert!(filter.is_empty());
    }
}
