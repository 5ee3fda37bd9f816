//! Byte layout of a B-tree node inside one page.
//!
//! Every node starts with a common header (type, root flag, parent pointer).
//! Leaf nodes add a cell count followed by an array of `(key, row)` cells
//! kept sorted by key. Internal nodes only exist as a type flag.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{DbError, Result};
use crate::{PAGE_SIZE, ROW_SIZE};

pub type Page = [u8; PAGE_SIZE];

/*
 * Common Node Header Layout
 */
pub const NODE_TYPE_SIZE: usize = size_of::<u8>();
pub const NODE_TYPE_OFFSET: usize = 0;
pub const IS_ROOT_SIZE: usize = size_of::<u8>();
pub const IS_ROOT_OFFSET: usize = NODE_TYPE_OFFSET + NODE_TYPE_SIZE;
pub const PARENT_POINTER_SIZE: usize = size_of::<u32>();
pub const PARENT_POINTER_OFFSET: usize = IS_ROOT_OFFSET + IS_ROOT_SIZE;
pub const COMMON_NODE_HEADER_SIZE: usize = NODE_TYPE_SIZE + IS_ROOT_SIZE + PARENT_POINTER_SIZE;

/*
 * Leaf Node Header Layout
 */
pub const LEAF_NODE_NUM_CELLS_SIZE: usize = size_of::<u32>();
pub const LEAF_NODE_NUM_CELLS_OFFSET: usize = COMMON_NODE_HEADER_SIZE;
pub const LEAF_NODE_HEADER_SIZE: usize = COMMON_NODE_HEADER_SIZE + LEAF_NODE_NUM_CELLS_SIZE;

/*
 * Leaf Node Body Layout
 */
pub const LEAF_NODE_KEY_SIZE: usize = size_of::<u32>();
pub const LEAF_NODE_KEY_OFFSET: usize = 0;
pub const LEAF_NODE_VALUE_SIZE: usize = ROW_SIZE;
pub const LEAF_NODE_VALUE_OFFSET: usize = LEAF_NODE_KEY_OFFSET + LEAF_NODE_KEY_SIZE;
pub const LEAF_NODE_CELL_SIZE: usize = LEAF_NODE_KEY_SIZE + LEAF_NODE_VALUE_SIZE;
pub const LEAF_NODE_SPACE_FOR_CELLS: usize = PAGE_SIZE - LEAF_NODE_HEADER_SIZE;
pub const LEAF_NODE_MAX_CELLS: usize = LEAF_NODE_SPACE_FOR_CELLS / LEAF_NODE_CELL_SIZE;

// A split distributes the full node plus the incoming cell; the left node
// takes the larger half.
pub const LEAF_NODE_RIGHT_SPLIT_COUNT: usize = (LEAF_NODE_MAX_CELLS + 1) / 2;
pub const LEAF_NODE_LEFT_SPLIT_COUNT: usize =
    (LEAF_NODE_MAX_CELLS + 1) - LEAF_NODE_RIGHT_SPLIT_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NodeType {
    Internal = 0,
    Leaf = 1,
}

impl NodeType {
    fn from_byte(byte: u8) -> Option<NodeType> {
        match byte {
            0 => Some(NodeType::Internal),
            1 => Some(NodeType::Leaf),
            _ => None,
        }
    }
}

/// Reads the type flag. `page_num` is only used to report a corrupt byte.
pub fn get_node_type(node: &Page, page_num: u32) -> Result<NodeType> {
    let byte = node[NODE_TYPE_OFFSET];
    NodeType::from_byte(byte).ok_or(DbError::CorruptNode { page_num, byte })
}

pub fn set_node_type(node: &mut Page, node_type: NodeType) {
    node[NODE_TYPE_OFFSET] = node_type as u8;
}

pub fn is_node_root(node: &Page) -> bool {
    node[IS_ROOT_OFFSET] != 0
}

pub fn set_node_root(node: &mut Page, is_root: bool) {
    node[IS_ROOT_OFFSET] = u8::from(is_root);
}

/// Page number of the parent. Only set on the children of a split root.
pub fn node_parent(node: &Page) -> u32 {
    LittleEndian::read_u32(&node[PARENT_POINTER_OFFSET..PARENT_POINTER_OFFSET + PARENT_POINTER_SIZE])
}

pub fn set_node_parent(node: &mut Page, parent_page_num: u32) {
    LittleEndian::write_u32(
        &mut node[PARENT_POINTER_OFFSET..PARENT_POINTER_OFFSET + PARENT_POINTER_SIZE],
        parent_page_num,
    );
}

/// Reads the cell count, rejecting counts that cannot fit in a page.
pub fn leaf_node_num_cells(node: &Page, page_num: u32) -> Result<u32> {
    let num_cells = LittleEndian::read_u32(
        &node[LEAF_NODE_NUM_CELLS_OFFSET..LEAF_NODE_NUM_CELLS_OFFSET + LEAF_NODE_NUM_CELLS_SIZE],
    );
    if num_cells as usize > LEAF_NODE_MAX_CELLS {
        return Err(DbError::CorruptCellCount {
            page_num,
            num_cells,
        });
    }
    Ok(num_cells)
}

pub fn set_leaf_node_num_cells(node: &mut Page, num_cells: u32) {
    debug_assert!(num_cells as usize <= LEAF_NODE_MAX_CELLS);
    LittleEndian::write_u32(
        &mut node[LEAF_NODE_NUM_CELLS_OFFSET..LEAF_NODE_NUM_CELLS_OFFSET + LEAF_NODE_NUM_CELLS_SIZE],
        num_cells,
    );
}

pub fn leaf_node_cell_offset(cell_num: u32) -> usize {
    debug_assert!((cell_num as usize) < LEAF_NODE_MAX_CELLS);
    LEAF_NODE_HEADER_SIZE + cell_num as usize * LEAF_NODE_CELL_SIZE
}

pub fn leaf_node_cell(node: &Page, cell_num: u32) -> &[u8] {
    let offset = leaf_node_cell_offset(cell_num);
    &node[offset..offset + LEAF_NODE_CELL_SIZE]
}

pub fn leaf_node_cell_mut(node: &mut Page, cell_num: u32) -> &mut [u8] {
    let offset = leaf_node_cell_offset(cell_num);
    &mut node[offset..offset + LEAF_NODE_CELL_SIZE]
}

pub fn leaf_node_key(node: &Page, cell_num: u32) -> u32 {
    let cell = leaf_node_cell(node, cell_num);
    LittleEndian::read_u32(&cell[LEAF_NODE_KEY_OFFSET..LEAF_NODE_KEY_OFFSET + LEAF_NODE_KEY_SIZE])
}

pub fn set_leaf_node_key(node: &mut Page, cell_num: u32, key: u32) {
    let cell = leaf_node_cell_mut(node, cell_num);
    LittleEndian::write_u32(
        &mut cell[LEAF_NODE_KEY_OFFSET..LEAF_NODE_KEY_OFFSET + LEAF_NODE_KEY_SIZE],
        key,
    );
}

pub fn leaf_node_value(node: &Page, cell_num: u32) -> &[u8] {
    &leaf_node_cell(node, cell_num)[LEAF_NODE_VALUE_OFFSET..]
}

pub fn leaf_node_value_mut(node: &mut Page, cell_num: u32) -> &mut [u8] {
    &mut leaf_node_cell_mut(node, cell_num)[LEAF_NODE_VALUE_OFFSET..]
}

pub fn initialize_leaf_node(node: &mut Page) {
    set_node_type(node, NodeType::Leaf);
    set_node_root(node, false);
    set_leaf_node_num_cells(node, 0);
}
