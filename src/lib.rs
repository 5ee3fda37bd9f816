//! A single-table embedded row store.
//!
//! Rows live in the leaves of an on-disk B-tree. Pages are cached by the
//! [`Pager`] and only written back when the [`Table`] is closed.

pub mod btree;
pub mod cursor;
pub mod error;
pub mod node;
pub mod pager;
pub mod row;
pub mod statement;
pub mod table;

pub use cursor::Cursor;
pub use error::{DbError, PrepareError, Result};
pub use pager::Pager;
pub use row::Row;
pub use statement::{ExecuteResult, Statement, execute};
pub use table::Table;

pub const COLUMN_USERNAME_SIZE: usize = 32;
pub const COLUMN_EMAIL_SIZE: usize = 255;
pub const ID_SIZE: usize = size_of::<u32>();
pub const USERNAME_SIZE: usize = COLUMN_USERNAME_SIZE;
pub const EMAIL_SIZE: usize = COLUMN_EMAIL_SIZE;

pub const ID_OFFSET: usize = 0;
pub const USERNAME_OFFSET: usize = ID_OFFSET + ID_SIZE;
pub const EMAIL_OFFSET: usize = USERNAME_OFFSET + USERNAME_SIZE;
pub const ROW_SIZE: usize = ID_SIZE + USERNAME_SIZE + EMAIL_SIZE;

pub const PAGE_SIZE: usize = 4096;
pub const TABLE_MAX_PAGES: usize = 100;
