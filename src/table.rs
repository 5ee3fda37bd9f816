use std::path::Path;

use tracing::{debug, trace};

use crate::cursor::Cursor;
use crate::error::{DbError, Result};
use crate::node::{self, NodeType};
use crate::pager::Pager;

/// The single table of a database file.
///
/// Nothing is persisted until [`Table::close`]. The file is not locked:
/// two processes opening the same file will overwrite each other's pages.
pub struct Table {
    pager: Pager,
    root_page_num: u32,
}

impl Table {
    /// Opens the table stored in `path`, creating an empty root leaf for a
    /// new file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut pager = Pager::open(path)?;
        let root_page_num = 0;

        if pager.file_length() == 0 {
            let root = pager.get_page(root_page_num)?;
            node::initialize_leaf_node(root);
            node::set_node_root(root, true);
            debug!("initialized empty root leaf");
        }

        Ok(Self {
            pager,
            root_page_num,
        })
    }

    /// Flushes every cached page. This is the only persistence point.
    pub fn close(self) -> Result<()> {
        self.pager.close()
    }

    pub fn root_page_num(&self) -> u32 {
        self.root_page_num
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn pager_mut(&mut self) -> &mut Pager {
        &mut self.pager
    }

    /// Cursor at the first cell of the root.
    ///
    /// The root is read as a leaf whatever its type flag says, and the scan
    /// never leaves the root page.
    pub fn start(&mut self) -> Result<Cursor<'_>> {
        let page_num = self.root_page_num;
        let num_cells = node::leaf_node_num_cells(self.pager.get_page(page_num)?, page_num)?;
        Ok(Cursor::new(self, page_num, 0, num_cells == 0))
    }

    /// Cursor at `key`, or at the position where `key` would be inserted.
    pub fn find(&mut self, key: u32) -> Result<Cursor<'_>> {
        let page_num = self.root_page_num;
        let root = self.pager.get_page(page_num)?;

        match node::get_node_type(root, page_num)? {
            NodeType::Leaf => Cursor::leaf_find(self, page_num, key),
            NodeType::Internal => {
                trace!(page_num, key, "search reached an internal root");
                Err(DbError::InternalNodeSearch { page_num })
            }
        }
    }
}
