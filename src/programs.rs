use crate::parser::parse;
use crate::table::TransitionTable;

// Embedded sample tables, as (name, source) pairs
const TABLE_TEXTS: [(&str, &str); 4] = [
    ("unary-ones", include_str!("../tables/unary-ones.tt")),
    ("binary-increment", include_str!("../tables/binary-increment.tt")),
    ("two-tape-copy", include_str!("../tables/two-tape-copy.tt")),
    ("even-zeros", include_str!("../tables/even-zeros.tt")),
];

/// A sample table shipped with the crate.
#[derive(Debug, Clone)]
pub struct BundledTable {
    pub name: &'static str,
    /// The definition text the table was parsed from.
    pub source: &'static str,
    pub table: TransitionTable,
}

lazy_static::lazy_static! {
    pub static ref TABLES: Vec<BundledTable> = load_bundled();
}

fn load_bundled() -> Vec<BundledTable> {
    TABLE_TEXTS
        .iter()
        .filter_map(|&(name, source)| match parse(source) {
            Ok(table) => Some(BundledTable {
                name,
                source,
                table,
            }),
            Err(e) => {
                tracing::error!(name, error = %e, "Failed to parse bundled table");
                None
            }
        })
        .collect()
}

/// Read-only access to the bundled tables.
pub struct TableManager;

impl TableManager {
    /// Get the number of available tables
    pub fn count() -> usize {
        TABLES.len()
    }

    /// List all table names, in registry order
    pub fn names() -> Vec<&'static str> {
        TABLES.iter().map(|bundled| bundled.name).collect()
    }

    /// Get a table by its index
    pub fn by_index(index: usize) -> Option<&'static BundledTable> {
        TABLES.get(index)
    }

    /// Get a table by its name. Names are matched exactly.
    pub fn by_name(name: &str) -> Option<&'static BundledTable> {
        TABLES.iter().find(|bundled| bundled.name == name)
    }
}
