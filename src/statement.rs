use tracing::debug;

use crate::error::{PrepareError, Result};
use crate::node::{self, LEAF_NODE_MAX_CELLS};
use crate::row::Row;
use crate::table::Table;
use crate::{COLUMN_EMAIL_SIZE, COLUMN_USERNAME_SIZE, TABLE_MAX_PAGES};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Insert(Row),
    Select,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ExecuteResult {
    /// Rows produced by the statement, in key order. Empty for inserts.
    Success(Vec<Row>),
    TableFull,
    DuplicateKey,
}

impl Statement {
    pub fn prepare(input: &str) -> std::result::Result<Statement, PrepareError> {
        let mut tokens = input.split_whitespace();
        match tokens.next() {
            Some("insert") => Self::prepare_insert(tokens),
            Some("select") if tokens.next().is_none() => Ok(Statement::Select),
            _ => Err(PrepareError::Unrecognized(input.to_string())),
        }
    }

    fn prepare_insert<'a>(
        mut tokens: impl Iterator<Item = &'a str>,
    ) -> std::result::Result<Statement, PrepareError> {
        let (Some(id), Some(username), Some(email)) = (tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(PrepareError::SyntaxError);
        };

        let id: i64 = id.parse().map_err(|_| PrepareError::SyntaxError)?;
        if id < 0 {
            return Err(PrepareError::NegativeId);
        }
        let id = u32::try_from(id).map_err(|_| PrepareError::SyntaxError)?;

        if username.len() > COLUMN_USERNAME_SIZE || email.len() > COLUMN_EMAIL_SIZE {
            return Err(PrepareError::StringTooLong);
        }

        Ok(Statement::Insert(Row::new(id, username, email)))
    }
}

pub fn execute(statement: &Statement, table: &mut Table) -> Result<ExecuteResult> {
    match statement {
        Statement::Insert(row) => execute_insert(row, table),
        Statement::Select => execute_select(table),
    }
}

fn execute_insert(row: &Row, table: &mut Table) -> Result<ExecuteResult> {
    let key = row.id;
    let mut cursor = table.find(key)?;

    let num_cells = cursor.num_cells()?;
    if cursor.cell_num() < num_cells && cursor.key()? == key {
        return Ok(ExecuteResult::DuplicateKey);
    }

    // Splitting the root takes two fresh pages.
    if num_cells as usize >= LEAF_NODE_MAX_CELLS {
        let root_page = cursor.page_num();
        let free_pages = TABLE_MAX_PAGES as u32 - cursor.table.pager().num_pages();
        let needed = if node::is_node_root(cursor.table.pager_mut().get_page(root_page)?) {
            2
        } else {
            1
        };
        if free_pages < needed {
            debug!(free_pages, "no room for a split");
            return Ok(ExecuteResult::TableFull);
        }
    }

    cursor.insert(key, row)?;
    Ok(ExecuteResult::Success(Vec::new()))
}

fn execute_select(table: &mut Table) -> Result<ExecuteResult> {
    let mut cursor = table.start()?;
    let mut rows = Vec::new();
    while !cursor.end_of_table() {
        rows.push(cursor.value()?);
        cursor.advance()?;
    }
    Ok(ExecuteResult::Success(rows))
}
