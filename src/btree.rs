//! Leaf insertion and splitting.
//!
//! Only a root leaf can be split. Splitting it turns the root into an
//! internal node whose body (separator keys, child pointers) is never
//! written, so once that happens the tree can no longer be searched.

use tracing::{debug, warn};

use crate::cursor::Cursor;
use crate::error::{DbError, Result};
use crate::node::{
    self, LEAF_NODE_CELL_SIZE, LEAF_NODE_HEADER_SIZE, LEAF_NODE_LEFT_SPLIT_COUNT,
    LEAF_NODE_MAX_CELLS, LEAF_NODE_RIGHT_SPLIT_COUNT, NodeType, Page,
};
use crate::row::Row;
use crate::table::Table;

impl Cursor<'_> {
    /// Inserts `key` and `value` at the cursor, shifting later cells right.
    /// A full leaf is split first.
    pub fn insert(&mut self, key: u32, value: &Row) -> Result<()> {
        let cell_num = self.cell_num;
        let page_num = self.page_num;
        let node = self.table.pager_mut().get_page(page_num)?;
        let num_cells = node::leaf_node_num_cells(node, page_num)?;

        if num_cells as usize >= LEAF_NODE_MAX_CELLS {
            return self.split_and_insert(key, value);
        }

        if cell_num < num_cells {
            let start = node::leaf_node_cell_offset(cell_num);
            let end = LEAF_NODE_HEADER_SIZE + num_cells as usize * LEAF_NODE_CELL_SIZE;
            node.copy_within(start..end, start + LEAF_NODE_CELL_SIZE);
        }

        node::set_leaf_node_num_cells(node, num_cells + 1);
        node::set_leaf_node_key(node, cell_num, key);
        value.serialize(node::leaf_node_value_mut(node, cell_num));
        Ok(())
    }

    fn split_and_insert(&mut self, key: u32, value: &Row) -> Result<()> {
        let old_page_num = self.page_num;
        let cell_num = self.cell_num;
        let pager = self.table.pager_mut();

        let old_node: Page = *pager.get_page(old_page_num)?;
        if !node::is_node_root(&old_node) {
            return Err(DbError::SplitNonRootLeaf {
                page_num: old_page_num,
            });
        }

        let new_page_num = pager.unused_page_num();
        node::initialize_leaf_node(pager.get_page(new_page_num)?);

        // Cells at or past the cursor move one slot right to make room.
        for i in (0..=LEAF_NODE_MAX_CELLS as u32).rev() {
            let destination_page_num = if i as usize >= LEAF_NODE_LEFT_SPLIT_COUNT {
                new_page_num
            } else {
                old_page_num
            };
            let index_within_node = i % LEAF_NODE_LEFT_SPLIT_COUNT as u32;
            let destination = pager.get_page(destination_page_num)?;

            if i == cell_num {
                node::set_leaf_node_key(destination, index_within_node, key);
                value.serialize(node::leaf_node_value_mut(destination, index_within_node));
            } else {
                let source = if i > cell_num { i - 1 } else { i };
                node::leaf_node_cell_mut(destination, index_within_node)
                    .copy_from_slice(node::leaf_node_cell(&old_node, source));
            }
        }

        node::set_leaf_node_num_cells(
            pager.get_page(old_page_num)?,
            LEAF_NODE_LEFT_SPLIT_COUNT as u32,
        );
        node::set_leaf_node_num_cells(
            pager.get_page(new_page_num)?,
            LEAF_NODE_RIGHT_SPLIT_COUNT as u32,
        );
        debug!(old_page_num, new_page_num, key, "split leaf");

        create_new_root(self.table, new_page_num)
    }
}

/// Moves the old root's contents into a fresh left child and flags the root
/// page as an internal node.
pub(crate) fn create_new_root(table: &mut Table, right_child_page_num: u32) -> Result<()> {
    let root_page_num = table.root_page_num();
    let pager = table.pager_mut();

    let root: Page = *pager.get_page(root_page_num)?;
    let left_child_page_num = pager.unused_page_num();
    let left_child = pager.get_page(left_child_page_num)?;
    *left_child = root;
    node::set_node_root(left_child, false);
    node::set_node_parent(left_child, root_page_num);
    node::set_node_parent(pager.get_page(right_child_page_num)?, root_page_num);

    let root = pager.get_page(root_page_num)?;
    node::set_node_type(root, NodeType::Internal);
    node::set_node_root(root, true);

    warn!(
        root_page_num,
        left_child_page_num,
        right_child_page_num,
        "root is now internal but its keys and child pointers are not written"
    );
    Ok(())
}

/// Renders the root node for the `.btree` meta-command.
pub fn format_tree(table: &mut Table) -> Result<String> {
    let root_page_num = table.root_page_num();
    let root = table.pager_mut().get_page(root_page_num)?;

    let mut out = String::from("Tree:\n");
    match node::get_node_type(root, root_page_num)? {
        NodeType::Leaf => {
            let num_cells = node::leaf_node_num_cells(root, root_page_num)?;
            out.push_str(&format!("leaf (size {num_cells})\n"));
            for i in 0..num_cells {
                out.push_str(&format!("  - {} : {}\n", i, node::leaf_node_key(root, i)));
            }
        }
        NodeType::Internal => out.push_str("internal (body not built)\n"),
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn row(id: u32) -> Row {
        Row::new(id, format!("user{id}"), format!("person{id}@example.com"))
    }

    fn insert(table: &mut Table, id: u32) {
        table.find(id).unwrap().insert(id, &row(id)).unwrap();
    }

    fn keys_of(table: &mut Table, page_num: u32) -> Vec<u32> {
        let page = table.pager_mut().get_page(page_num).unwrap();
        (0..node::leaf_node_num_cells(page, page_num).unwrap())
            .map(|i| node::leaf_node_key(page, i))
            .collect()
    }

    #[test]
    fn it_keeps_cells_sorted_for_any_insert_order() {
        let file = NamedTempFile::new().unwrap();
        let mut table = Table::open(file.path()).unwrap();
        for id in [7, 3, 11, 1, 9, 5] {
            insert(&mut table, id);
        }

        assert_eq!(keys_of(&mut table, 0), vec![1, 3, 5, 7, 9, 11]);
        let mut cursor = table.find(9).unwrap();
        assert_eq!(cursor.value().unwrap(), row(9));
    }

    #[test]
    fn it_fills_the_root_leaf_without_splitting() {
        let file = NamedTempFile::new().unwrap();
        let mut table = Table::open(file.path()).unwrap();
        for id in 1..=LEAF_NODE_MAX_CELLS as u32 {
            insert(&mut table, id);
        }

        assert_eq!(table.pager().num_pages(), 1);
        assert_eq!(keys_of(&mut table, 0).len(), LEAF_NODE_MAX_CELLS);
    }

    #[test]
    fn it_splits_a_full_root_into_two_leaves() {
        let file = NamedTempFile::new().unwrap();
        let mut table = Table::open(file.path()).unwrap();
        for id in 1..=LEAF_NODE_MAX_CELLS as u32 + 1 {
            insert(&mut table, id);
        }

        let pager = table.pager_mut();
        assert_eq!(pager.num_pages(), 3);
        let root = pager.get_page(0).unwrap();
        assert_eq!(node::get_node_type(root, 0).unwrap(), NodeType::Internal);
        assert!(node::is_node_root(root));

        let left = keys_of(&mut table, 2);
        let right = keys_of(&mut table, 1);
        assert_eq!(left, (1..=7).collect::<Vec<_>>());
        assert_eq!(right, (8..=14).collect::<Vec<_>>());
        assert_eq!(left.len(), LEAF_NODE_LEFT_SPLIT_COUNT);
        assert_eq!(right.len(), LEAF_NODE_RIGHT_SPLIT_COUNT);
        assert_eq!(left.len() + right.len(), LEAF_NODE_MAX_CELLS + 1);

        let left_page = table.pager_mut().get_page(2).unwrap();
        assert_eq!(node::get_node_type(left_page, 2).unwrap(), NodeType::Leaf);
        assert!(!node::is_node_root(left_page));
        assert_eq!(node::node_parent(left_page), 0);
        assert_eq!(node::node_parent(table.pager_mut().get_page(1).unwrap()), 0);
    }

    #[test]
    fn it_places_a_middle_key_during_a_split() {
        let file = NamedTempFile::new().unwrap();
        let mut table = Table::open(file.path()).unwrap();
        for id in (0..LEAF_NODE_MAX_CELLS as u32).map(|i| i * 10) {
            insert(&mut table, id);
        }
        insert(&mut table, 65);

        assert_eq!(keys_of(&mut table, 2), vec![0, 10, 20, 30, 40, 50, 60]);
        assert_eq!(keys_of(&mut table, 1), vec![65, 70, 80, 90, 100, 110, 120]);

        let page = table.pager_mut().get_page(1).unwrap();
        assert_eq!(Row::deserialize(node::leaf_node_value(page, 0)), row(65));
    }

    #[test]
    fn it_refuses_to_search_after_the_root_split() {
        let file = NamedTempFile::new().unwrap();
        let mut table = Table::open(file.path()).unwrap();
        for id in 1..=LEAF_NODE_MAX_CELLS as u32 + 1 {
            insert(&mut table, id);
        }

        assert!(matches!(
            table.find(100),
            Err(DbError::InternalNodeSearch { page_num: 0 })
        ));
    }

    #[test]
    fn it_refuses_to_split_a_non_root_leaf() {
        let file = NamedTempFile::new().unwrap();
        let mut table = Table::open(file.path()).unwrap();
        for id in 1..=LEAF_NODE_MAX_CELLS as u32 + 1 {
            insert(&mut table, id);
        }
        // Page 1 is the right leaf; top it up until it is full.
        for id in 15..=20 {
            Cursor::leaf_find(&mut table, 1, id)
                .unwrap()
                .insert(id, &row(id))
                .unwrap();
        }
        let before = *table.pager_mut().get_page(1).unwrap();

        let mut cursor = Cursor::leaf_find(&mut table, 1, 21).unwrap();
        assert!(matches!(
            cursor.insert(21, &row(21)),
            Err(DbError::SplitNonRootLeaf { page_num: 1 })
        ));
        assert_eq!(table.pager().num_pages(), 3);
        assert_eq!(*table.pager_mut().get_page(1).unwrap(), before);
    }

    #[test]
    fn it_scans_only_the_root_page_after_a_split() {
        let file = NamedTempFile::new().unwrap();
        let mut table = Table::open(file.path()).unwrap();
        for id in 1..=LEAF_NODE_MAX_CELLS as u32 + 1 {
            insert(&mut table, id);
        }

        let mut cursor = table.start().unwrap();
        let mut ids = Vec::new();
        while !cursor.end_of_table() {
            ids.push(cursor.value().unwrap().id);
            cursor.advance().unwrap();
        }
        assert_eq!(ids, (1..=7).collect::<Vec<_>>());
    }

    #[test]
    fn it_formats_the_root_leaf() {
        let file = NamedTempFile::new().unwrap();
        let mut table = Table::open(file.path()).unwrap();
        for id in [3, 1, 2] {
            insert(&mut table, id);
        }

        assert_eq!(
            format_tree(&mut table).unwrap(),
            "Tree:\nleaf (size 3)\n  - 0 : 1\n  - 1 : 2\n  - 2 : 3\n"
        );
    }
}
