use std::collections::BTreeMap;

use crate::graph::{
    function::FunctionNode, node::SourceNode, noise::NoiseNode, oscillator::OscillatorNode,
};

/// Builds a fresh, unscheduled node.
pub type NodeConstructor = Box<dyn Fn() -> Box<dyn SourceNode> + Send + Sync>;

/// Name-to-constructor table for source nodes.
///
/// Owned by whoever assembles graphs; there is no process-wide instance.
/// Names are case-sensitive and listed in sorted order.
#[derive(Default)]
pub struct NodeRegistry {
    constructors: BTreeMap<String, NodeConstructor>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with `Noise`, `Oscillator` and `Function`.
    pub fn with_builtin_sources() -> Self {
        let mut registry = Self::new();
        registry.register("Noise", || Box::new(NoiseNode::white()));
        registry.register("Oscillator", || Box::new(OscillatorNode::sine()));
        registry.register("Function", || Box::new(FunctionNode::with_channels(1)));
        registry
    }

    /// Add a constructor under `name`. Returns false (and keeps the existing
    /// entry) if the name is taken.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F) -> bool
    where
        F: Fn() -> Box<dyn SourceNode> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.constructors.contains_key(&name) {
            return false;
        }
        self.constructors.insert(name, Box::new(constructor));
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    pub fn create(&self, name: &str) -> Option<Box<dyn SourceNode>> {
        self.constructors.get(name).map(|constructor| constructor())
    }
}
