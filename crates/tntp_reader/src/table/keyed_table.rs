use std::{fmt::Display, hash::Hash, path::Path};

use fxhash::FxHashMap;

use crate::{
    error::{Result, TntpError},
    value::Value,
};

/// Rows of typed cells addressed by a unique index. Index uniqueness is
/// checked on construction and a collision is an error, rows are never
/// deduplicated.
#[derive(Debug, Clone)]
pub struct KeyedTable<K> {
    index_names: Vec<String>,
    index: Vec<K>,
    positions: FxHashMap<K, usize>,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl<K> KeyedTable<K>
where
    K: Eq + Hash + Clone + Display,
{
    pub(crate) fn new(
        path: &Path,
        index_names: Vec<String>,
        index: Vec<K>,
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self> {
        debug_assert_eq!(index.len(), rows.len());

        let mut positions = FxHashMap::default();
        positions.reserve(index.len());

        for (position, key) in index.iter().enumerate() {
            if positions.insert(key.clone(), position).is_some() {
                return Err(TntpError::duplicate_key(path, key));
            }
        }

        Ok(KeyedTable {
            index_names,
            index,
            positions,
            columns,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index_names(&self) -> &[String] {
        &self.index_names
    }

    pub fn index(&self) -> &[K] {
        &self.index
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.positions.contains_key(key)
    }

    pub fn position(&self, key: &K) -> Option<usize> {
        self.positions.get(key).copied()
    }

    pub fn row(&self, key: &K) -> Option<&[Value]> {
        self.position(key).map(|position| self.rows[position].as_slice())
    }

    pub fn row_at(&self, position: usize) -> &[Value] {
        &self.rows[position]
    }

    pub fn column_position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| name == column)
    }

    pub fn get(&self, key: &K, column: &str) -> Option<&Value> {
        let column = self.column_position(column)?;
        self.row(key).map(|row| &row[column])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &[Value])> {
        self.index
            .iter()
            .zip(self.rows.iter().map(|row| row.as_slice()))
    }

    pub(crate) fn set_index_names(&mut self, names: Vec<String>) {
        debug_assert_eq!(names.len(), self.index_names.len());
        self.index_names = names;
    }

    /// Appends columns, `cells` yields the new values of the row with the
    /// given key.
    pub(crate) fn extend_columns<F>(&mut self, columns: &[String], mut cells: F)
    where
        F: FnMut(&K) -> Vec<Value>,
    {
        for (key, row) in self.index.iter().zip(self.rows.iter_mut()) {
            let values = cells(key);
            debug_assert_eq!(values.len(), columns.len());
            row.extend(values);
        }
        self.columns.extend_from_slice(columns);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(index: Vec<i64>) -> Result<KeyedTable<i64>> {
        let rows = index.iter().map(|i| vec![Value::Int(i * 10)]).collect();
        KeyedTable::new(
            Path::new("table.tntp"),
            vec![String::from("id")],
            index,
            vec![String::from("value")],
            rows,
        )
    }

    #[test]
    fn test_lookup() {
        let table = table(vec![3, 1, 2]).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.position(&1), Some(1));
        assert_eq!(table.get(&2, "value"), Some(&Value::Int(20)));
        assert_eq!(table.get(&4, "value"), None);
        assert_eq!(table.get(&2, "other"), None);
    }

    #[test]
    fn test_extend_columns() {
        let mut table = table(vec![1, 2]).unwrap();
        table.extend_columns(&[String::from("double")], |key| vec![Value::Int(key * 2)]);

        assert_eq!(table.columns(), &["value", "double"]);
        assert_eq!(table.get(&2, "double"), Some(&Value::Int(4)));
    }

    #[test]
    fn test_duplicate_index() {
        match table(vec![1, 2, 1]) {
            Err(TntpError::DuplicateKey { key, .. }) => assert_eq!(key, "1"),
            other => panic!("unexpected result {other:?}"),
        }
    }
}
