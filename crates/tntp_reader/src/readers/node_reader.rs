use std::path::Path;

use geo_types::Point;
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::{Result, TntpError},
    naming::{ColumnNaming, DEFAULT_NODE_COL, DEFAULT_X_COL, DEFAULT_Y_COL, TERMINATOR_SENTINEL},
    readers::{node_id, read_text},
    table::{KeyedTable, RawTable},
    value::NodeId,
};

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct NodeReaderOptions {
    pub index_col: String,
    pub x_col: String,
    pub y_col: String,
    /// Coordinate reference tag, passed through untouched.
    pub crs: Option<String>,
    pub naming: ColumnNaming,
}

impl Default for NodeReaderOptions {
    fn default() -> Self {
        NodeReaderOptions {
            index_col: String::from(DEFAULT_NODE_COL),
            x_col: String::from(DEFAULT_X_COL),
            y_col: String::from(DEFAULT_Y_COL),
            crs: None,
            naming: ColumnNaming::default(),
        }
    }
}

/// Nodes indexed by id, with a point geometry per node built from the x/y
/// columns. The x/y columns stay in the table.
#[derive(Debug, Clone)]
pub struct NodeTable {
    table: KeyedTable<NodeId>,
    geometry: Vec<Point<f64>>,
    x_col: String,
    y_col: String,
    crs: Option<String>,
}

impl NodeTable {
    pub fn table(&self) -> &KeyedTable<NodeId> {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn ids(&self) -> &[NodeId] {
        self.table.index()
    }

    pub fn point(&self, id: &NodeId) -> Option<Point<f64>> {
        self.table
            .position(id)
            .map(|position| self.geometry[position])
    }

    pub fn geometry(&self) -> &[Point<f64>] {
        &self.geometry
    }

    pub fn x_col(&self) -> &str {
        &self.x_col
    }

    pub fn y_col(&self) -> &str {
        &self.y_col
    }

    pub fn crs(&self) -> Option<&str> {
        self.crs.as_deref()
    }
}

pub fn read_node_file<P: AsRef<Path>>(path: P, options: &NodeReaderOptions) -> Result<NodeTable> {
    let path = path.as_ref();
    let text = read_text(path)?;
    let nodes = parse_nodes(path, &text, options)?;

    debug!("Read {} nodes from {:?}", nodes.len(), path);

    Ok(nodes)
}

pub(crate) fn parse_nodes(path: &Path, text: &str, options: &NodeReaderOptions) -> Result<NodeTable> {
    let naming = options.naming;
    let mut raw = RawTable::parse(path, text, 0, naming)?;
    raw.drop_column(TERMINATOR_SENTINEL)?;

    let index_col = naming.normalize(&options.index_col);
    let x_col = naming.normalize(&options.x_col);
    let y_col = naming.normalize(&options.y_col);

    let ids = raw.take_column(&index_col)?;
    let x_position = raw.position(&x_col)?;
    let y_position = raw.position(&y_col)?;

    let (columns, rows) = raw.into_parts();

    let mut index = Vec::with_capacity(rows.len());
    let mut geometry = Vec::with_capacity(rows.len());
    let mut cells = Vec::with_capacity(rows.len());

    for (row, id) in rows.into_iter().zip(ids.iter()) {
        index.push(node_id(path, row.line, &index_col, id)?);

        let x = row.cells[x_position].as_f64().ok_or_else(|| {
            TntpError::malformed(path, row.line, format!("invalid x coordinate in '{x_col}'"))
        })?;
        let y = row.cells[y_position].as_f64().ok_or_else(|| {
            TntpError::malformed(path, row.line, format!("invalid y coordinate in '{y_col}'"))
        })?;

        geometry.push(Point::new(x, y));
        cells.push(row.cells);
    }

    let table = KeyedTable::new(path, vec![index_col], index, columns, cells)?;

    Ok(NodeTable {
        table,
        geometry,
        x_col,
        y_col,
        crs: options.crs.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    const NODES: &str = "Node\tX\tY\t;
1\t-96.77041974\t43.61282792\t;
2\t-96.71125063\t43.60581298\t;
3\t-96.77430341\t43.5729616\t;
";

    fn path() -> &'static Path {
        Path::new("SiouxFalls_node.tntp")
    }

    #[test]
    fn test_parse_nodes() {
        let nodes = parse_nodes(path(), NODES, &NodeReaderOptions::default()).unwrap();

        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes.table().index_names(), &["node"]);
        assert_eq!(nodes.table().columns(), &["x", "y"]);
        assert_eq!(
            nodes.ids(),
            &[NodeId::Int(1), NodeId::Int(2), NodeId::Int(3)]
        );

        let point = nodes.point(&NodeId::Int(2)).unwrap();
        assert_eq!(point.x(), -96.71125063);
        assert_eq!(point.y(), 43.60581298);
        assert_eq!(
            nodes.table().get(&NodeId::Int(3), "y"),
            Some(&Value::Float(43.5729616))
        );
    }

    #[test]
    fn test_caller_names_follow_naming_mode() {
        let options = NodeReaderOptions {
            index_col: String::from("Node"),
            x_col: String::from("X"),
            y_col: String::from("Y"),
            crs: Some(String::from("wgs84")),
            naming: ColumnNaming::Lowercase,
        };
        let nodes = parse_nodes(path(), NODES, &options).unwrap();
        assert_eq!(nodes.x_col(), "x");
        assert_eq!(nodes.crs(), Some("wgs84"));

        let raw = NodeReaderOptions {
            naming: ColumnNaming::Raw,
            ..options
        };
        let nodes = parse_nodes(path(), NODES, &raw).unwrap();
        assert_eq!(nodes.table().columns(), &["X", "Y"]);
    }

    #[test]
    fn test_raw_naming_with_lowercase_names_fails() {
        let options = NodeReaderOptions {
            naming: ColumnNaming::Raw,
            ..NodeReaderOptions::default()
        };

        let result = parse_nodes(path(), NODES, &options);
        assert!(matches!(result, Err(TntpError::MalformedFile { .. })));
    }

    #[test]
    fn test_duplicate_node_id() {
        let text = format!("{NODES}2\t0.0\t0.0\t;\n");
        let result = parse_nodes(path(), &text, &NodeReaderOptions::default());

        match result {
            Err(TntpError::DuplicateKey { key, .. }) => assert_eq!(key, "2"),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_missing_terminator_column() {
        let text = "Node\tX\tY\n1\t0\t0\n";
        let result = parse_nodes(path(), text, &NodeReaderOptions::default());

        assert!(matches!(result, Err(TntpError::MalformedFile { .. })));
    }

    #[test]
    fn test_invalid_coordinate() {
        let text = "Node\tX\tY\t;\n1\tnorth\t0\t;\n";
        let result = parse_nodes(path(), text, &NodeReaderOptions::default());

        match result {
            Err(TntpError::MalformedFile { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_label_ids() {
        let text = "Node\tX\tY\t;\nA\t0\t1\t;\nB\t2\t3\t;\n";
        let nodes = parse_nodes(path(), text, &NodeReaderOptions::default()).unwrap();

        assert_eq!(nodes.ids(), &[NodeId::from("A"), NodeId::from("B")]);
        assert_eq!(nodes.point(&NodeId::from("B")).unwrap().x(), 2.0);
    }
}
