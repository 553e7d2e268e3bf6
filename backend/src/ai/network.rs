use serde_json::{json, Value};

use super::layers::Layer;
use crate::error::BuilderError;

// A layer instance placed in a network, with the ids of the layers it feeds
#[derive(Debug)]
pub struct LayerNode {
    pub id: usize,
    pub layer: Box<dyn Layer>,
    pub outgoing: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub id: usize,
    pub source: usize,
    pub target: usize,
}

/// One client session's graph.
///
/// Layers and connections are append-only, so their ids are simply their positions.
/// No structural checks are made: disconnected, cyclic and self-connected graphs are
/// all accepted.
#[derive(Debug)]
pub struct NeuralNetwork {
    pub id: u64,
    layers: Vec<LayerNode>,
    connections: Vec<Connection>,
}

impl NeuralNetwork {
    pub fn new(id: u64) -> Self {
        NeuralNetwork { id, layers: Vec::new(), connections: Vec::new() }
    }

    pub fn add_layer(&mut self, layer: Box<dyn Layer>) -> usize {
        let id = self.layers.len();
        self.layers.push(LayerNode { id, layer, outgoing: Vec::new() });
        id
    }

    pub fn find_layer(&self, id: usize) -> Option<&LayerNode> {
        self.layers.get(id)
    }

    pub fn connect(&mut self, source: usize, target: usize) -> Result<usize, BuilderError> {
        for layer_id in [source, target] {
            if self.find_layer(layer_id).is_none() {
                return Err(BuilderError::LayerNotFound { network_id: self.id, layer_id });
            }
        }
        self.layers[source].outgoing.push(target);

        let id = self.connections.len();
        self.connections.push(Connection { id, source, target });
        Ok(id)
    }

    pub fn layers(&self) -> &[LayerNode] {
        &self.layers
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn summary(&self) -> Value {
        json!({
            "id": self.id,
            "layer_count": self.layers.len(),
            "connection_count": self.connections.len(),
        })
    }

    pub fn to_value(&self) -> Value {
        let layers: Vec<Value> = self
            .layers
            .iter()
            .map(|node| {
                json!({
                    "id": node.id,
                    "type": node.layer.kind().name(),
                    "config": node.layer.config(),
                    "outgoing": node.outgoing,
                })
            })
            .collect();
        let connections: Vec<Value> = self
            .connections
            .iter()
            .map(|c| json!({ "id": c.id, "source": c.source, "target": c.target }))
            .collect();
        json!({ "id": self.id, "layers": layers, "connections": connections })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::activations::ReLUFunction;
    use crate::ai::layers::{ConvolutionalLayer, ConvolutionType, LayerKind, PoolingLayer, PoolingType};

    fn conv() -> Box<dyn Layer> {
        Box::new(ConvolutionalLayer {
            conv_type: ConvolutionType::Standard,
            filters: 16,
            stride: 1,
            kernel_size: 3,
        })
    }

    #[test]
    fn layer_ids_follow_insertion_order() {
        let mut network = NeuralNetwork::new(7);
        assert_eq!(network.add_layer(conv()), 0);
        assert_eq!(network.add_layer(Box::new(ReLUFunction)), 1);
        assert_eq!(network.find_layer(1).unwrap().layer.kind(), LayerKind::ReLUFunction);
        assert!(network.find_layer(2).is_none());
    }

    #[test]
    fn connect_records_edge_on_both_sides() {
        let mut network = NeuralNetwork::new(0);
        let a = network.add_layer(conv());
        let b = network.add_layer(Box::new(PoolingLayer { pooling_type: PoolingType::Avg }));

        assert_eq!(network.connect(a, b).unwrap(), 0);
        assert_eq!(network.find_layer(a).unwrap().outgoing, vec![b]);
        assert_eq!(network.connections(), &[Connection { id: 0, source: a, target: b }]);
    }

    #[test]
    fn connect_rejects_unknown_endpoints() {
        let mut network = NeuralNetwork::new(4);
        let a = network.add_layer(conv());
        let err = network.connect(a, 9).unwrap_err();
        assert!(matches!(err, BuilderError::LayerNotFound { network_id: 4, layer_id: 9 }));
        assert!(network.connections().is_empty());
        assert!(network.find_layer(a).unwrap().outgoing.is_empty());
    }

    #[test]
    fn cycles_self_loops_and_duplicates_are_accepted() {
        let mut network = NeuralNetwork::new(0);
        let a = network.add_layer(conv());
        let b = network.add_layer(Box::new(ReLUFunction));
        network.connect(a, b).unwrap();
        network.connect(b, a).unwrap();
        network.connect(a, a).unwrap();
        assert_eq!(network.connect(a, b).unwrap(), 3);
        assert_eq!(network.find_layer(a).unwrap().outgoing, vec![b, a, b]);
    }

    #[test]
    fn to_value_describes_layers_and_connections() {
        let mut network = NeuralNetwork::new(2);
        let a = network.add_layer(conv());
        let b = network.add_layer(Box::new(ReLUFunction));
        network.connect(a, b).unwrap();

        let value = network.to_value();
        assert_eq!(value["id"], 2);
        assert_eq!(value["layers"][0]["type"], "ConvolutionalLayer");
        assert_eq!(value["layers"][0]["config"]["filters"], 16);
        assert_eq!(value["layers"][0]["outgoing"], json!([1]));
        assert_eq!(value["layers"][1]["config"], json!({}));
        assert_eq!(value["connections"], json!([{ "id": 0, "source": 0, "target": 1 }]));
        assert_eq!(network.summary(), json!({ "id": 2, "layer_count": 2, "connection_count": 1 }));
    }
}
