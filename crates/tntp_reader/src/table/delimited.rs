use std::path::{Path, PathBuf};

use crate::{
    error::{Result, TntpError},
    naming::ColumnNaming,
    value::Value,
};

const DELIMITER: char = '\t';

#[derive(Debug, Clone)]
pub struct RawRow {
    /// 1-based line number in the source file
    pub line: usize,
    pub cells: Vec<Value>,
}

/// A tab-delimited table as read from disk, before any index is set.
#[derive(Debug)]
pub struct RawTable {
    path: PathBuf,
    header_line: usize,
    columns: Vec<String>,
    rows: Vec<RawRow>,
}

impl RawTable {
    /// Parses `text` skipping `skip_lines` raw lines, then any blank lines,
    /// before the header row. Blank data lines are ignored. Rows shorter than
    /// the header are padded with missing values, rows carrying extra
    /// non-empty cells are rejected.
    pub fn parse(path: &Path, text: &str, skip_lines: usize, naming: ColumnNaming) -> Result<Self> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim_end_matches('\r')));

        let mut skipped = 0;
        while skipped < skip_lines {
            if lines.next().is_none() {
                return Err(TntpError::malformed(
                    path,
                    skipped,
                    format!("expected {skip_lines} metadata lines, found {skipped}"),
                ));
            }
            skipped += 1;
        }

        let (header_line, header) = lines
            .by_ref()
            .find(|(_, line)| !line.trim().is_empty())
            .ok_or_else(|| TntpError::malformed(path, skipped, "missing header row"))?;

        let columns = header
            .split(DELIMITER)
            .map(|name| naming.normalize(name))
            .collect::<Vec<_>>();

        for (position, column) in columns.iter().enumerate() {
            if columns[..position].contains(column) {
                return Err(TntpError::malformed(
                    path,
                    header_line,
                    format!("duplicate column '{column}'"),
                ));
            }
        }

        let mut rows = Vec::new();
        for (line_number, line) in lines {
            if line.trim().is_empty() {
                continue;
            }

            let mut cells = line.split(DELIMITER).map(Value::parse).collect::<Vec<_>>();

            if cells.len() > columns.len() {
                if cells[columns.len()..].iter().any(|cell| !cell.is_missing()) {
                    return Err(TntpError::malformed(
                        path,
                        line_number,
                        format!(
                            "expected {} fields, found {}",
                            columns.len(),
                            cells.len()
                        ),
                    ));
                }
                cells.truncate(columns.len());
            }
            cells.resize(columns.len(), Value::Missing);

            rows.push(RawRow {
                line: line_number,
                cells,
            });
        }

        Ok(RawTable {
            path: path.to_path_buf(),
            header_line,
            columns,
            rows,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn position(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|name| name == column)
            .ok_or_else(|| {
                TntpError::malformed(
                    &self.path,
                    self.header_line,
                    format!("column '{column}' not found in {:?}", self.columns),
                )
            })
    }

    pub fn drop_column(&mut self, column: &str) -> Result<()> {
        self.take_column(column).map(|_| ())
    }

    /// Removes a column and returns its values, one per row.
    pub fn take_column(&mut self, column: &str) -> Result<Vec<Value>> {
        let position = self.position(column)?;
        self.columns.remove(position);

        Ok(self
            .rows
            .iter_mut()
            .map(|row| row.cells.remove(position))
            .collect())
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<RawRow>) {
        (self.columns, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NET: &str = "<NUMBER OF ZONES> 2
<NUMBER OF NODES> 3
<FIRST THRU NODE> 1
<NUMBER OF LINKS> 2
<ORIGINAL HEADER>~ \tInit node \tTerm node \tCapacity \t;
<END OF METADATA>


~ \tinit_node\tterm_node\tcapacity\t;
\t1\t2\t25900.2\t;

\t2\t3\t4958.18\t;
";

    fn path() -> &'static Path {
        Path::new("net.tntp")
    }

    #[test]
    fn test_parse_after_metadata() {
        let table = RawTable::parse(path(), NET, 8, ColumnNaming::Lowercase).unwrap();

        assert_eq!(table.columns(), &["~", "init_node", "term_node", "capacity", ";"]);
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[0].line, 10);
        assert_eq!(table.rows()[1].line, 12);
        assert_eq!(table.rows()[0].cells[0], Value::Missing);
        assert_eq!(table.rows()[0].cells[1], Value::Int(1));
        assert_eq!(table.rows()[1].cells[3], Value::Float(4958.18));
    }

    #[test]
    fn test_too_few_metadata_lines() {
        let result = RawTable::parse(path(), "a\nb\n", 8, ColumnNaming::Lowercase);

        assert!(matches!(result, Err(TntpError::MalformedFile { .. })));
    }

    #[test]
    fn test_missing_header() {
        let result = RawTable::parse(path(), "\n\n  \n", 0, ColumnNaming::Lowercase);

        assert!(matches!(result, Err(TntpError::MalformedFile { .. })));
    }

    #[test]
    fn test_row_wider_than_header() {
        let text = "Node\tX\tY\t;\n1\t2\t3\t;\t99\n";
        let result = RawTable::parse(path(), text, 0, ColumnNaming::Lowercase);

        match result {
            Err(TntpError::MalformedFile { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_trailing_empty_cells_and_short_rows() {
        let text = "Node\tX\tY\t;\n1\t2\t3\t;\t\n2\t4\n";
        let table = RawTable::parse(path(), text, 0, ColumnNaming::Raw).unwrap();

        assert_eq!(table.rows()[0].cells.len(), 4);
        assert_eq!(
            table.rows()[1].cells,
            vec![Value::Int(2), Value::Int(4), Value::Missing, Value::Missing]
        );
    }

    #[test]
    fn test_take_column() {
        let text = "Node\tX\tY\t;\n1\t2\t3\t;\n";
        let mut table = RawTable::parse(path(), text, 0, ColumnNaming::Raw).unwrap();

        assert_eq!(table.take_column("X").unwrap(), vec![Value::Int(2)]);
        assert_eq!(table.columns(), &["Node", "Y", ";"]);
        assert!(table.drop_column("X").is_err());
    }

    #[test]
    fn test_duplicate_columns_after_normalization() {
        let text = "B\tb\n1\t2\n";

        assert!(RawTable::parse(path(), text, 0, ColumnNaming::Raw).is_ok());
        assert!(RawTable::parse(path(), text, 0, ColumnNaming::Lowercase).is_err());
    }
}
