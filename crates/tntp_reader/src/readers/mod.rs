pub mod demand_reader;
pub mod edge_reader;
pub mod flow_reader;
pub mod node_reader;

use std::path::Path;

use crate::{
    edge_key::EdgeKey,
    error::{Result, TntpError},
    naming::{ColumnNaming, SYNTHETIC_KEY_COL},
    table::{KeyedTable, RawTable},
    value::{NodeId, Value},
};

pub(crate) fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|error| {
        if error.kind() == std::io::ErrorKind::InvalidData {
            TntpError::malformed(path, 0, "file is not valid UTF-8")
        } else {
            TntpError::Io {
                path: path.to_path_buf(),
                source: error,
            }
        }
    })
}

pub(crate) fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| TntpError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Column names used to build the `(from, to, key)` index of net and flow
/// tables, as given by the caller (not yet normalized).
pub(crate) struct EdgeIndexColumns<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub key: Option<&'a str>,
}

pub(crate) fn node_id(path: &Path, line: usize, column: &str, value: &Value) -> Result<NodeId> {
    NodeId::from_value(value).ok_or_else(|| {
        TntpError::malformed(
            path,
            line,
            format!("invalid node id '{value}' in column '{column}'"),
        )
    })
}

fn parallel_key(path: &Path, line: usize, column: &str, value: &Value) -> Result<u32> {
    value
        .as_i64()
        .and_then(|key| u32::try_from(key).ok())
        .ok_or_else(|| {
            TntpError::malformed(
                path,
                line,
                format!("invalid parallel key '{value}' in column '{column}'"),
            )
        })
}

/// Moves the endpoint (and optional parallel key) columns out of `raw` into
/// an [`EdgeKey`] index. Without a key column every row gets key 0.
pub(crate) fn into_edge_keyed_table(
    mut raw: RawTable,
    naming: ColumnNaming,
    columns: EdgeIndexColumns<'_>,
) -> Result<KeyedTable<EdgeKey>> {
    let from_col = naming.normalize(columns.from);
    let to_col = naming.normalize(columns.to);
    let key_col = columns.key.map(|key| naming.normalize(key));

    let from_values = raw.take_column(&from_col)?;
    let to_values = raw.take_column(&to_col)?;
    let key_values = match &key_col {
        Some(key_col) => Some(raw.take_column(key_col)?),
        None => None,
    };

    let path = raw.path().to_path_buf();
    let (attribute_columns, rows) = raw.into_parts();

    let mut index = Vec::with_capacity(rows.len());
    let mut cells = Vec::with_capacity(rows.len());

    for (position, row) in rows.into_iter().enumerate() {
        let from = node_id(&path, row.line, &from_col, &from_values[position])?;
        let to = node_id(&path, row.line, &to_col, &to_values[position])?;
        let key = match (&key_col, &key_values) {
            (Some(key_col), Some(key_values)) => {
                parallel_key(&path, row.line, key_col, &key_values[position])?
            }
            _ => 0,
        };

        index.push(EdgeKey { from, to, key });
        cells.push(row.cells);
    }

    let index_names = vec![
        from_col,
        to_col,
        key_col.unwrap_or_else(|| String::from(SYNTHETIC_KEY_COL)),
    ];

    KeyedTable::new(&path, index_names, index, attribute_columns, cells)
}

#[cfg(test)]
mod tests {
    use super::{
        demand_reader::{DemandReaderOptions, ReadMode, TextEncoding, read_demand_file},
        flow_reader::{FlowReaderOptions, read_flow_file},
        node_reader::{NodeReaderOptions, read_node_file},
    };
    use crate::{error::TntpError, test_utils::write_temp_file, value::NodeId};

    #[test]
    fn test_missing_file() {
        let result = read_node_file("does/not/exist_node.tntp", &NodeReaderOptions::default());

        assert!(matches!(result, Err(TntpError::Io { .. })));
    }

    #[test]
    fn test_read_node_file() {
        let file = write_temp_file(b"Node\tX\tY\t;\r\n1\t0.5\t1.5\t;\r\n");

        let nodes = read_node_file(file.path(), &NodeReaderOptions::default()).unwrap();
        assert_eq!(nodes.point(&NodeId::Int(1)).unwrap().y(), 1.5);
    }

    #[test]
    fn test_tabular_file_must_be_utf8() {
        let file = write_temp_file(b"From\tTo\tVolume\n1\t2\t\xff\n");

        let result = read_flow_file(file.path(), &FlowReaderOptions::default());
        assert!(matches!(result, Err(TntpError::MalformedFile { .. })));
    }

    #[test]
    fn test_read_demand_file_modes() {
        let file = write_temp_file(b"<COMMENT> Z\xfcrich\nOrigin 1\n 2 : 3.0;\n");

        let text_mode = read_demand_file(file.path(), &DemandReaderOptions::default());
        assert!(matches!(text_mode, Err(TntpError::MalformedFile { .. })));

        let options = DemandReaderOptions {
            mode: ReadMode::Binary,
            encoding: TextEncoding::Latin1,
        };
        let matrix = read_demand_file(file.path(), &options).unwrap();
        assert_eq!(matrix.get(&NodeId::Int(1), &NodeId::Int(2)), Some(3.0));
        assert_eq!(matrix.metadata_value("COMMENT"), Some("Zürich"));
    }
}
