use tracing::trace;

use crate::error::Result;
use crate::node;
use crate::row::Row;
use crate::table::Table;

/// A position inside one leaf of the table.
///
/// The cursor borrows the table for as long as it lives, so it cannot
/// outlast the statement that created it.
pub struct Cursor<'a> {
    pub(crate) table: &'a mut Table,
    pub(crate) page_num: u32,
    pub(crate) cell_num: u32,
    end_of_table: bool,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(table: &'a mut Table, page_num: u32, cell_num: u32, end_of_table: bool) -> Self {
        Self {
            table,
            page_num,
            cell_num,
            end_of_table,
        }
    }

    /// Binary search for `key` in the leaf at `page_num`.
    ///
    /// Lands on the matching cell, or on the first cell with a larger key
    /// (`num_cells` when `key` is larger than every key present).
    pub fn leaf_find(table: &'a mut Table, page_num: u32, key: u32) -> Result<Self> {
        let node = table.pager_mut().get_page(page_num)?;
        let num_cells = node::leaf_node_num_cells(node, page_num)?;

        let mut min_index = 0;
        let mut one_past_max_index = num_cells;
        while one_past_max_index != min_index {
            let index = min_index + (one_past_max_index - min_index) / 2;
            let key_at_index = node::leaf_node_key(node, index);
            if key == key_at_index {
                min_index = index;
                break;
            }
            if key < key_at_index {
                one_past_max_index = index;
            } else {
                min_index = index + 1;
            }
        }
        trace!(page_num, key, cell_num = min_index, "leaf search");

        Ok(Self::new(table, page_num, min_index, false))
    }

    pub fn page_num(&self) -> u32 {
        self.page_num
    }

    pub fn cell_num(&self) -> u32 {
        self.cell_num
    }

    pub fn end_of_table(&self) -> bool {
        self.end_of_table
    }

    /// Cell count of the leaf under the cursor.
    pub fn num_cells(&mut self) -> Result<u32> {
        let node = self.table.pager_mut().get_page(self.page_num)?;
        node::leaf_node_num_cells(node, self.page_num)
    }

    pub fn key(&mut self) -> Result<u32> {
        let node = self.table.pager_mut().get_page(self.page_num)?;
        Ok(node::leaf_node_key(node, self.cell_num))
    }

    pub fn value(&mut self) -> Result<Row> {
        let node = self.table.pager_mut().get_page(self.page_num)?;
        Ok(Row::deserialize(node::leaf_node_value(node, self.cell_num)))
    }

    /// Moves to the next cell. Stops at the end of the current leaf; there
    /// is no hop to a sibling.
    pub fn advance(&mut self) -> Result<()> {
        self.cell_num += 1;
        if self.cell_num >= self.num_cells()? {
            self.end_of_table = true;
        }
        Ok(())
    }
}
