use std::collections::BTreeMap;

use super::network::NeuralNetwork;
use crate::error::BuilderError;

/// All networks held by the server, keyed by auto-incrementing id.
///
/// Ids are never reused, even after a network is removed.
#[derive(Debug, Default)]
pub struct NetworkStore {
    networks: BTreeMap<u64, NeuralNetwork>,
    next_id: u64,
}

impl NetworkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.networks.insert(id, NeuralNetwork::new(id));
        id
    }

    pub fn get(&self, id: u64) -> Result<&NeuralNetwork, BuilderError> {
        self.networks.get(&id).ok_or(BuilderError::NetworkNotFound(id))
    }

    pub fn get_mut(&mut self, id: u64) -> Result<&mut NeuralNetwork, BuilderError> {
        self.networks.get_mut(&id).ok_or(BuilderError::NetworkNotFound(id))
    }

    pub fn remove(&mut self, id: u64) -> Result<NeuralNetwork, BuilderError> {
        self.networks.remove(&id).ok_or(BuilderError::NetworkNotFound(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &NeuralNetwork> {
        self.networks.values()
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::activations::TanhFunction;

    #[test]
    fn ids_start_at_zero_and_increment() {
        let mut store = NetworkStore::new();
        assert_eq!(store.create(), 0);
        assert_eq!(store.create(), 1);
        assert_eq!(store.create(), 2);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn removed_ids_are_not_reused() {
        let mut store = NetworkStore::new();
        let first = store.create();
        store.remove(first).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.create(), 1);
        assert!(matches!(store.get(first), Err(BuilderError::NetworkNotFound(0))));
    }

    #[test]
    fn networks_are_isolated() {
        let mut store = NetworkStore::new();
        let a = store.create();
        let b = store.create();
        store.get_mut(a).unwrap().add_layer(Box::new(TanhFunction));
        assert_eq!(store.get(a).unwrap().layers().len(), 1);
        assert!(store.get(b).unwrap().layers().is_empty());
    }

    #[test]
    fn unknown_network_is_an_error() {
        let mut store = NetworkStore::new();
        assert!(matches!(store.get_mut(42), Err(BuilderError::NetworkNotFound(42))));
        assert!(store.remove(42).is_err());
    }

    #[test]
    fn iter_is_ordered_by_id() {
        let mut store = NetworkStore::new();
        for _ in 0..3 {
            store.create();
        }
        let ids: Vec<u64> = store.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
