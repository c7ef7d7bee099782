use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::{
    edge_key::EdgeKey,
    error::Result,
    naming::{ColumnNaming, DEFAULT_FROM_COL, DEFAULT_TO_COL},
    readers::{EdgeIndexColumns, into_edge_keyed_table, read_text},
    table::{KeyedTable, RawTable},
};

/// Flow measurements keyed like the edges they belong to.
pub type FlowTable = KeyedTable<EdgeKey>;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct FlowReaderOptions {
    pub from_col: String,
    pub to_col: String,
    pub key_col: Option<String>,
    pub naming: ColumnNaming,
}

impl Default for FlowReaderOptions {
    fn default() -> Self {
        FlowReaderOptions {
            from_col: String::from(DEFAULT_FROM_COL),
            to_col: String::from(DEFAULT_TO_COL),
            key_col: None,
            naming: ColumnNaming::default(),
        }
    }
}

pub fn read_flow_file<P: AsRef<Path>>(path: P, options: &FlowReaderOptions) -> Result<FlowTable> {
    let path = path.as_ref();
    let text = read_text(path)?;
    let flows = parse_flows(path, &text, options)?;

    debug!("Read {} flow records from {:?}", flows.len(), path);

    Ok(flows)
}

pub(crate) fn parse_flows(path: &Path, text: &str, options: &FlowReaderOptions) -> Result<FlowTable> {
    let raw = RawTable::parse(path, text, 0, options.naming)?;

    into_edge_keyed_table(
        raw,
        options.naming,
        EdgeIndexColumns {
            from: &options.from_col,
            to: &options.to_col,
            key: options.key_col.as_deref(),
        },
    )
}
