//! Compiled-artifact manifest.
//!
//! `manifest.json` describes one compiled subgraph: its external tensor
//! signature, the constant tensors shipped alongside it, and the node list
//! the execution backend interprets.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::VaiRtError;
use crate::tensor::{DataType, TensorDesc};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    Identity,
    Relu,
    Add,
    Mul,
    Matmul,
    Scale,
}

/// Declared shape and dtype of one external tensor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TensorInfo {
    pub name: String,
    pub dims: Vec<i64>,
    pub dtype: DataType,
}

impl TensorInfo {
    pub fn desc(&self) -> TensorDesc {
        TensorDesc::new(self.dims.clone(), self.dtype)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub op: Op,
    #[serde(default)]
    pub inputs: Vec<String>,
    pub output: String,
    /// Scalar attribute, used by `scale` only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub inputs: Vec<TensorInfo>,
    pub outputs: Vec<TensorInfo>,
    #[serde(default)]
    pub constants: Vec<String>,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl Manifest {
    pub fn from_json_str(json: &str) -> Result<Self, VaiRtError> {
        serde_json::from_str(json)
            .map_err(|e| VaiRtError::model_load(format!("invalid manifest: {}", e)))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, VaiRtError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            VaiRtError::model_load(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    pub fn to_json(&self) -> String {
        // Serialization of these plain structs cannot fail
        serde_json::to_string_pretty(self).expect("manifest serialization")
    }

    pub fn input_names(&self) -> Vec<String> {
        self.inputs.iter().map(|t| t.name.clone()).collect()
    }

    pub fn output_names(&self) -> Vec<String> {
        self.outputs.iter().map(|t| t.name.clone()).collect()
    }

    /// Structural validation: every tensor a node consumes must be a graph
    /// input, a constant, or the output of an earlier node, and every
    /// declared graph output must be produced. Runs at load time so a bad
    /// artifact is rejected before any backend sees it.
    pub fn validate(&self) -> Result<(), VaiRtError> {
        if self.name.is_empty() {
            return Err(VaiRtError::model_load("manifest has an empty graph name"));
        }
        if self.outputs.is_empty() {
            return Err(VaiRtError::model_load(format!(
                "graph '{}' declares no outputs",
                self.name
            )));
        }

        let mut known: HashSet<&str> = HashSet::new();
        for t in &self.inputs {
            if !known.insert(&t.name) {
                return Err(VaiRtError::model_load(format!(
                    "duplicate input tensor '{}'",
                    t.name
                )));
            }
        }
        for c in &self.constants {
            if !known.insert(c) {
                return Err(VaiRtError::model_load(format!(
                    "constant '{}' collides with another tensor name",
                    c
                )));
            }
        }

        for node in &self.nodes {
            for input in &node.inputs {
                if !known.contains(input.as_str()) {
                    return Err(VaiRtError::model_load(format!(
                        "node '{}' consumes undeclared tensor '{}'",
                        node.output, input
                    )));
                }
            }
            if !known.insert(&node.output) {
                return Err(VaiRtError::model_load(format!(
                    "tensor '{}' is produced twice",
                    node.output
                )));
            }
        }

        for out in &self.outputs {
            if !known.contains(out.name.as_str()) {
                return Err(VaiRtError::model_load(format!(
                    "graph output '{}' is never produced",
                    out.name
                )));
            }
        }

        Ok(())
    }
}
