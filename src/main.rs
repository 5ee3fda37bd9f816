use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use eyre::{Result, bail};
use leafdb::node::{
    COMMON_NODE_HEADER_SIZE, LEAF_NODE_CELL_SIZE, LEAF_NODE_HEADER_SIZE, LEAF_NODE_MAX_CELLS,
    LEAF_NODE_SPACE_FOR_CELLS,
};
use leafdb::{ExecuteResult, PrepareError, ROW_SIZE, Statement, Table, btree, execute};
use tracing_subscriber::EnvFilter;

/// A single-table database with a SQL-like prompt.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Database file, created if it does not exist.
    filename: Option<PathBuf>,

    /// Filter for diagnostics written to stderr (e.g. `debug`, `leafdb=trace`).
    #[arg(long, env = "LEAFDB_LOG", default_value = "warn")]
    log_level: String,
}

struct InputBuffer {
    buffer: String,
}

impl InputBuffer {
    fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    /// Returns `false` once stdin is exhausted.
    fn read_input(&mut self) -> io::Result<bool> {
        self.buffer.clear();
        let read = io::stdin().read_line(&mut self.buffer)?;
        self.buffer = self.buffer.trim().to_string();
        Ok(read > 0)
    }
}

// Non-SQL statements like .exit are called “meta-commands”.
enum MetaCommands {
    Exit,
    Help,
    BTree,
    Constants,
    Unrecognized,
}

impl MetaCommands {
    fn parse(input: &str) -> Option<MetaCommands> {
        match input {
            ".exit" => Some(MetaCommands::Exit),
            ".help" => Some(MetaCommands::Help),
            ".btree" => Some(MetaCommands::BTree),
            ".constants" => Some(MetaCommands::Constants),
            _ => {
                if input.starts_with(".") {
                    Some(MetaCommands::Unrecognized)
                } else {
                    None
                }
            }
        }
    }
}

enum InputType {
    Meta(MetaCommands),
    Statement(std::result::Result<Statement, PrepareError>),
}

impl InputType {
    fn parse(input: &str) -> InputType {
        if let Some(meta) = MetaCommands::parse(input) {
            InputType::Meta(meta)
        } else {
            InputType::Statement(Statement::prepare(input))
        }
    }
}

fn print_prompt() -> io::Result<()> {
    print!("db > ");
    io::stdout().flush()
}

fn print_help() {
    println!("Available commands:");
    println!(" .exit      - Save and exit the database");
    println!(" .help      - Show this help message");
    println!(" .btree     - Print the root node of the tree");
    println!(" .constants - Print the page layout constants");
    println!(" insert     - Insert a row (insert <id> <username> <email>)");
    println!(" select     - Print every row");
}

fn print_constants() {
    println!("Constants:");
    println!("ROW_SIZE: {ROW_SIZE}");
    println!("COMMON_NODE_HEADER_SIZE: {COMMON_NODE_HEADER_SIZE}");
    println!("LEAF_NODE_HEADER_SIZE: {LEAF_NODE_HEADER_SIZE}");
    println!("LEAF_NODE_CELL_SIZE: {LEAF_NODE_CELL_SIZE}");
    println!("LEAF_NODE_SPACE_FOR_CELLS: {LEAF_NODE_SPACE_FOR_CELLS}");
    println!("LEAF_NODE_MAX_CELLS: {LEAF_NODE_MAX_CELLS}");
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let Some(filename) = args.filename else {
        bail!("Must supply a database filename.");
    };

    let mut table = Table::open(&filename)?;
    let mut input_buffer = InputBuffer::new();

    loop {
        print_prompt()?;
        if !input_buffer.read_input()? {
            break;
        }

        match InputType::parse(&input_buffer.buffer) {
            InputType::Meta(MetaCommands::Exit) => break,
            InputType::Meta(MetaCommands::Help) => print_help(),
            InputType::Meta(MetaCommands::BTree) => print!("{}", btree::format_tree(&mut table)?),
            InputType::Meta(MetaCommands::Constants) => print_constants(),
            InputType::Meta(MetaCommands::Unrecognized) => {
                println!("Unrecognized command: '{}'.", input_buffer.buffer);
            }
            InputType::Statement(Err(e)) => println!("{e}"),
            InputType::Statement(Ok(statement)) => match execute(&statement, &mut table)? {
                ExecuteResult::Success(rows) => {
                    for row in rows {
                        println!("{row}");
                    }
                    println!("Executed.");
                }
                ExecuteResult::TableFull => println!("Error: Table full."),
                ExecuteResult::DuplicateKey => println!("Error: Duplicate key."),
            },
        }
    }

    table.close()?;
    Ok(())
}
