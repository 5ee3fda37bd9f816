use thiserror::Error;

/// Engine faults. None of these are retryable: the caller is expected to
/// abandon the session without flushing.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Db file is not a whole number of pages ({length} bytes). Corrupt file.")]
    CorruptFile { length: u64 },

    #[error("Tried to fetch page number out of bounds. {page_num} >= {max}")]
    PageOutOfBounds { page_num: u32, max: usize },

    #[error("Tried to flush null page {0}")]
    FlushEmptyPage(u32),

    #[error("Unknown node type {byte} on page {page_num}")]
    CorruptNode { page_num: u32, byte: u8 },

    #[error("Leaf on page {page_num} claims {num_cells} cells. Corrupt file.")]
    CorruptCellCount { page_num: u32, num_cells: u32 },

    #[error("Need to implement updating parent after split (page {page_num})")]
    SplitNonRootLeaf { page_num: u32 },

    #[error("Need to implement searching an internal node (page {page_num})")]
    InternalNodeSearch { page_num: u32 },
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Problems with a statement line. The session continues after reporting one.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PrepareError {
    #[error("ID must be positive.")]
    NegativeId,

    #[error("String is too long.")]
    StringTooLong,

    #[error("Syntax error. Could not parse statement.")]
    SyntaxError,

    #[error("Unrecognized keyword at start of '{0}'.")]
    Unrecognized(String),
}
