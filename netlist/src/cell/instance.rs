use std::collections::BTreeMap;

use crate::{ParamValue, SigSpec};

/// An instantiation of another module (or of a black box), with one connection per port name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instance {
    pub module: String,
    pub parameters: BTreeMap<String, ParamValue>,
    pub connections: BTreeMap<String, SigSpec>,
}

impl Instance {
    pub fn new(module: impl Into<String>) -> Self {
        Instance { module: module.into(), parameters: Default::default(), connections: Default::default() }
    }

    pub fn add_param(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.parameters.insert(name.into(), value.into());
    }

    pub fn connect(&mut self, port: impl Into<String>, value: impl Into<SigSpec>) {
        self.connections.insert(port.into(), value.into());
    }

    pub fn connection(&self, port: &str) -> Option<&SigSpec> {
        self.connections.get(port)
    }
}
