//! Registry Module: ordered selectable items of a menu container.
//!
//! Responsibilities:
//! - Filter container rows down to selectable items (container order)
//! - First/last item
//! - Parallel first-character table for typeahead

use crate::error::{MenuError, Result};
use crate::text_utils::first_char_key;
use crate::types::{ItemRef, RowSpec};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    /// Index of the backing row in the container.
    pub row: usize,
    pub text: String,
}

/// Built once from the container; never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct ItemRegistry {
    items: Vec<MenuItem>,
    /// Same length and index alignment as `items`.
    first_chars: Vec<String>,
}

impl ItemRegistry {
    /// Build from the container's children. A container with no children at
    /// all is a configuration error; one with no selectable children yields
    /// an empty registry.
    pub fn build(rows: &[RowSpec]) -> Result<Self> {
        if rows.is_empty() {
            return Err(MenuError::Configuration(
                "menu container has no child rows".to_string(),
            ));
        }

        let mut registry = Self::default();
        for (row, spec) in rows.iter().enumerate() {
            if !spec.is_selectable() {
                continue;
            }
            registry.first_chars.push(first_char_key(&spec.text));
            registry.items.push(MenuItem {
                row,
                text: spec.text.trim().to_string(),
            });
        }

        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<ItemRef> {
        self.items.get(index).map(|item| ItemRef {
            index,
            row: item.row,
        })
    }

    pub fn item(&self, index: usize) -> Option<&MenuItem> {
        self.items.get(index)
    }

    pub fn first(&self) -> Option<ItemRef> {
        self.get(0)
    }

    pub fn last(&self) -> Option<ItemRef> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Position of `item` in the registry, or `None` when it is not a member.
    pub fn index_of(&self, item: ItemRef) -> Option<usize> {
        self.items
            .iter()
            .position(|m| m.row == item.row)
            .filter(|&i| i == item.index)
    }

    pub fn contains(&self, item: ItemRef) -> bool {
        self.index_of(item).is_some()
    }

    pub fn first_char(&self, index: usize) -> Option<&str> {
        self.first_chars.get(index).map(String::as_str)
    }

    /// First index in `start..len` whose key equals `key`.
    pub(crate) fn find_first_char(&self, start: usize, key: &str) -> Option<usize> {
        self.first_chars
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, k)| !k.is_empty() && k.as_str() == key)
            .map(|(i, _)| i)
    }

    pub fn iter(&self) -> impl Iterator<Item = ItemRef> + '_ {
        (0..self.len()).filter_map(|i| self.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RowFlags;

    fn fruit_rows() -> Vec<RowSpec> {
        vec![
            RowSpec::item("Apple"),
            RowSpec::separator(),
            RowSpec::item("  Banana"),
            RowSpec::item("Docs").with_flags(RowFlags::HAS_INTERACTIVE_CHILD),
            RowSpec::item("Cherry"),
        ]
    }

    #[test]
    fn test_build_filters_rows_in_order() {
        let reg = ItemRegistry::build(&fruit_rows()).unwrap();
        assert_eq!(reg.len(), 3);
        assert_eq!(reg.item(0).unwrap().text, "Apple");
        assert_eq!(reg.item(1).unwrap().text, "Banana");
        assert_eq!(reg.item(1).unwrap().row, 2);
        assert_eq!(reg.item(2).unwrap().row, 4);
        assert_eq!(reg.first_char(1), Some("b"));

        let rows: Vec<usize> = reg.iter().map(|i| i.row).collect();
        assert_eq!(rows, vec![0, 2, 4]);
    }

    #[test]
    fn test_first_and_last() {
        let reg = ItemRegistry::build(&fruit_rows()).unwrap();
        assert_eq!(reg.first(), Some(ItemRef { index: 0, row: 0 }));
        assert_eq!(reg.last(), Some(ItemRef { index: 2, row: 4 }));
    }

    #[test]
    fn test_zero_children_is_configuration_error() {
        let err = ItemRegistry::build(&[]).unwrap_err();
        assert!(matches!(err, MenuError::Configuration(_)));
    }

    #[test]
    fn test_zero_selectable_children_is_valid_and_empty() {
        let reg = ItemRegistry::build(&[RowSpec::separator(), RowSpec::separator()]).unwrap();
        assert!(reg.is_empty());
        assert_eq!(reg.first(), None);
        assert_eq!(reg.last(), None);
    }

    #[test]
    fn test_index_of_non_member() {
        let reg = ItemRegistry::build(&fruit_rows()).unwrap();
        assert_eq!(reg.index_of(ItemRef { index: 1, row: 2 }), Some(1));
        // Separator row is not an item
        assert_eq!(reg.index_of(ItemRef { index: 1, row: 1 }), None);
        assert_eq!(reg.index_of(ItemRef { index: 9, row: 9 }), None);
    }

    #[test]
    fn test_first_char_table_aligned_with_items() {
        let rows = vec![RowSpec::item(""), RowSpec::item("beta")];
        let reg = ItemRegistry::build(&rows).unwrap();
        assert_eq!(reg.first_char(0), Some(""));
        assert_eq!(reg.first_char(1), Some("b"));
        assert_eq!(reg.find_first_char(0, "b"), Some(1));
        assert_eq!(reg.find_first_char(0, ""), None);
    }
}
