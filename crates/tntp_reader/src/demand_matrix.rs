use std::path::Path;

use fxhash::FxHashMap;

use crate::{
    error::{Result, TntpError},
    value::NodeId,
};

/// Dense origin-destination matrix. Rows are origins, columns destinations,
/// cells are `None` where the source had no entry for the pair.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandMatrix {
    origins: Vec<NodeId>,
    destinations: Vec<NodeId>,
    origin_positions: FxHashMap<NodeId, usize>,
    destination_positions: FxHashMap<NodeId, usize>,
    // row-major, origins.len() * destinations.len()
    values: Vec<Option<f64>>,
    metadata: Vec<(String, String)>,
}

fn positions(ids: &[NodeId]) -> FxHashMap<NodeId, usize> {
    let mut positions = FxHashMap::default();
    for (position, id) in ids.iter().enumerate() {
        // first occurrence wins when a reindex list repeats an id
        positions.entry(id.clone()).or_insert(position);
    }
    positions
}

impl DemandMatrix {
    fn new(
        origins: Vec<NodeId>,
        destinations: Vec<NodeId>,
        values: Vec<Option<f64>>,
        metadata: Vec<(String, String)>,
    ) -> Self {
        debug_assert_eq!(values.len(), origins.len() * destinations.len());

        DemandMatrix {
            origin_positions: positions(&origins),
            destination_positions: positions(&destinations),
            origins,
            destinations,
            values,
            metadata,
        }
    }

    /// Pivots long-form `(origin, destination, demand)` triples. Origins and
    /// destinations are sorted ascending. Two triples for the same pair are a
    /// duplicate key.
    pub(crate) fn from_triples(
        path: &Path,
        triples: &[(i64, i64, f64)],
        metadata: Vec<(String, String)>,
    ) -> Result<Self> {
        let mut origins = triples.iter().map(|t| t.0).collect::<Vec<_>>();
        origins.sort_unstable();
        origins.dedup();

        let mut destinations = triples.iter().map(|t| t.1).collect::<Vec<_>>();
        destinations.sort_unstable();
        destinations.dedup();

        let mut values = vec![None; origins.len() * destinations.len()];

        for &(origin, destination, demand) in triples {
            // both searches succeed, the ids come from the triples themselves
            let (Ok(row) | Err(row)) = origins.binary_search(&origin);
            let (Ok(column) | Err(column)) = destinations.binary_search(&destination);
            let cell = &mut values[row * destinations.len() + column];

            if cell.is_some() {
                return Err(TntpError::duplicate_key(
                    path,
                    format!("({origin}, {destination})"),
                ));
            }
            *cell = Some(demand);
        }

        Ok(DemandMatrix::new(
            origins.into_iter().map(NodeId::Int).collect(),
            destinations.into_iter().map(NodeId::Int).collect(),
            values,
            metadata,
        ))
    }

    pub fn origins(&self) -> &[NodeId] {
        &self.origins
    }

    pub fn destinations(&self) -> &[NodeId] {
        &self.destinations
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.origins.len(), self.destinations.len())
    }

    pub fn get(&self, origin: &NodeId, destination: &NodeId) -> Option<f64> {
        let row = *self.origin_positions.get(origin)?;
        let column = *self.destination_positions.get(destination)?;
        self.values[row * self.destinations.len() + column]
    }

    pub fn row(&self, origin: &NodeId) -> Option<&[Option<f64>]> {
        let row = *self.origin_positions.get(origin)?;
        let width = self.destinations.len();
        Some(&self.values[row * width..(row + 1) * width])
    }

    /// Present cells as `(origin, destination, demand)`, row by row.
    pub fn entries(&self) -> impl Iterator<Item = (&NodeId, &NodeId, f64)> + '_ {
        let width = self.destinations.len();
        self.values
            .iter()
            .enumerate()
            .filter_map(move |(index, value)| {
                value.map(|demand| {
                    (
                        &self.origins[index / width],
                        &self.destinations[index % width],
                        demand,
                    )
                })
            })
    }

    pub fn total(&self) -> f64 {
        self.values.iter().flatten().sum()
    }

    /// Header entries found before the first origin block, e.g.
    /// `("NUMBER OF ZONES", "24")`.
    pub fn metadata(&self) -> &[(String, String)] {
        &self.metadata
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Aligns the matrix on the given id lists. Ids missing from the matrix
    /// get empty rows/columns, matrix ids missing from the lists are dropped.
    pub fn reindex(&self, origins: &[NodeId], destinations: &[NodeId]) -> DemandMatrix {
        let mut values = Vec::with_capacity(origins.len() * destinations.len());

        for origin in origins {
            let row = self.origin_positions.get(origin);
            for destination in destinations {
                let column = self.destination_positions.get(destination);
                let value = match (row, column) {
                    (Some(row), Some(column)) => {
                        self.values[row * self.destinations.len() + column]
                    }
                    _ => None,
                };
                values.push(value);
            }
        }

        DemandMatrix::new(
            origins.to_vec(),
            destinations.to_vec(),
            values,
            self.metadata.clone(),
        )
    }

    pub fn fill_missing(mut self, value: f64) -> DemandMatrix {
        for cell in self.values.iter_mut() {
            cell.get_or_insert(value);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> DemandMatrix {
        DemandMatrix::from_triples(
            Path::new("trips.tntp"),
            &[(2, 1, 3.0), (1, 2, 5.0), (1, 3, 10.0)],
            vec![],
        )
        .unwrap()
    }

    fn ids(ids: &[i64]) -> Vec<NodeId> {
        ids.iter().copied().map(NodeId::Int).collect()
    }

    #[test]
    fn test_pivot_sorts_axes() {
        let matrix = matrix();

        assert_eq!(matrix.origins(), ids(&[1, 2]).as_slice());
        assert_eq!(matrix.destinations(), ids(&[1, 2, 3]).as_slice());
        assert_eq!(matrix.get(&NodeId::Int(1), &NodeId::Int(3)), Some(10.0));
        assert_eq!(matrix.get(&NodeId::Int(2), &NodeId::Int(2)), None);
        assert_eq!(
            matrix.row(&NodeId::Int(2)).unwrap(),
            &[Some(3.0), None, None]
        );
        assert_eq!(matrix.total(), 18.0);
        assert_eq!(matrix.entries().count(), 3);
    }

    #[test]
    fn test_duplicate_pair() {
        let result = DemandMatrix::from_triples(
            Path::new("trips.tntp"),
            &[(1, 2, 5.0), (1, 2, 6.0)],
            vec![],
        );

        match result {
            Err(TntpError::DuplicateKey { key, .. }) => assert_eq!(key, "(1, 2)"),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_reindex_trims_and_extends() {
        let nodes = ids(&[1, 3, 4]);
        let aligned = matrix().reindex(&nodes, &nodes);

        assert_eq!(aligned.shape(), (3, 3));
        assert_eq!(aligned.get(&NodeId::Int(1), &NodeId::Int(3)), Some(10.0));
        assert_eq!(aligned.get(&NodeId::Int(4), &NodeId::Int(1)), None);
        // origin 2 is not in the node list
        assert!(aligned.row(&NodeId::Int(2)).is_none());
        assert_eq!(aligned.total(), 10.0);
    }

    #[test]
    fn test_fill_missing() {
        let nodes = ids(&[1, 2, 3]);
        let filled = matrix().reindex(&nodes, &nodes).fill_missing(0.0);

        assert_eq!(filled.get(&NodeId::Int(3), &NodeId::Int(3)), Some(0.0));
        assert_eq!(filled.get(&NodeId::Int(1), &NodeId::Int(2)), Some(5.0));
        assert_eq!(filled.entries().count(), 9);
    }
}
