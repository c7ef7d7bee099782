use std::path::Path;

use geo_types::LineString;
use serde::Deserialize;
use tracing::debug;

use crate::{
    edge_key::EdgeKey,
    error::Result,
    naming::{ColumnNaming, DEFAULT_FROM_COL, DEFAULT_TO_COL, MARKER_SENTINEL, TERMINATOR_SENTINEL},
    readers::{EdgeIndexColumns, into_edge_keyed_table, read_text},
    table::{KeyedTable, RawTable},
};

/// Metadata lines (`<NUMBER OF ZONES>` ... `<END OF METADATA>` and padding)
/// preceding the header of every net file.
pub const NET_METADATA_LINES: usize = 8;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EdgeReaderOptions {
    pub from_col: String,
    pub to_col: String,
    /// Parallel-key column. When absent every edge gets key 0.
    pub key_col: Option<String>,
    pub crs: Option<String>,
    pub naming: ColumnNaming,
}

impl Default for EdgeReaderOptions {
    fn default() -> Self {
        EdgeReaderOptions {
            from_col: String::from(DEFAULT_FROM_COL),
            to_col: String::from(DEFAULT_TO_COL),
            key_col: None,
            crs: None,
            naming: ColumnNaming::default(),
        }
    }
}

/// Directed edges indexed by `(from, to, key)`.
///
/// Edges carry no geometry of their own in net files, so every geometry slot
/// is `None` here. The network assembler derives straight-line geometries
/// from the node coordinates.
#[derive(Debug, Clone)]
pub struct EdgeTable {
    table: KeyedTable<EdgeKey>,
    geometry: Vec<Option<LineString<f64>>>,
    crs: Option<String>,
}

impl EdgeTable {
    pub(crate) fn new(table: KeyedTable<EdgeKey>, crs: Option<String>) -> Self {
        let geometry = vec![None; table.len()];
        EdgeTable {
            table,
            geometry,
            crs,
        }
    }

    pub fn table(&self) -> &KeyedTable<EdgeKey> {
        &self.table
    }

    pub(crate) fn table_mut(&mut self) -> &mut KeyedTable<EdgeKey> {
        &mut self.table
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn keys(&self) -> &[EdgeKey] {
        self.table.index()
    }

    pub fn geometry(&self) -> &[Option<LineString<f64>>] {
        &self.geometry
    }

    pub fn crs(&self) -> Option<&str> {
        self.crs.as_deref()
    }
}

pub fn read_net_file<P: AsRef<Path>>(path: P, options: &EdgeReaderOptions) -> Result<EdgeTable> {
    let path = path.as_ref();
    let text = read_text(path)?;
    let edges = parse_net(path, &text, options)?;

    debug!("Read {} edges from {:?}", edges.len(), path);

    Ok(edges)
}

pub(crate) fn parse_net(path: &Path, text: &str, options: &EdgeReaderOptions) -> Result<EdgeTable> {
    let mut raw = RawTable::parse(path, text, NET_METADATA_LINES, options.naming)?;
    raw.drop_column(MARKER_SENTINEL)?;
    raw.drop_column(TERMINATOR_SENTINEL)?;

    let table = into_edge_keyed_table(
        raw,
        options.naming,
        EdgeIndexColumns {
            from: &options.from_col,
            to: &options.to_col,
            key: options.key_col.as_deref(),
        },
    )?;

    Ok(EdgeTable::new(table, options.crs.clone()))
}
