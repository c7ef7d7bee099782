pub mod delimited;
pub mod keyed_table;

pub use delimited::RawTable;
pub use keyed_table::KeyedTable;
