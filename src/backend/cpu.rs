use std::collections::HashMap;

use crate::VaiRtError;
use crate::artifact::{Artifact, Node, Op, TensorInfo};
use crate::tensor::{DataType, Tensor, TensorDesc};

use super::f32_cpu;
use super::target::Target;
use super::{Backend, GraphRunner};

/// Reference execution backend: interprets the artifact's node list on the
/// host. Every supported target runs identically here; per-device behavior
/// belongs to a real vendor integration behind the same [`Backend`] trait.
pub struct CpuBackend;

impl Backend for CpuBackend {
    fn name(&self) -> &str {
        "cpu"
    }

    fn supports(&self, _target: Target) -> bool {
        true
    }

    fn load(
        &self,
        artifact: &Artifact,
        target: Target,
    ) -> Result<Box<dyn GraphRunner>, VaiRtError> {
        let manifest = artifact.manifest();
        tracing::debug!(
            graph = %manifest.name,
            target = %target,
            nodes = manifest.nodes.len(),
            "loading graph onto cpu backend"
        );

        Ok(Box::new(CpuRunner {
            graph_name: manifest.name.clone(),
            inputs: manifest.inputs.clone(),
            outputs: manifest.outputs.clone(),
            input_names: manifest.input_names(),
            output_names: manifest.output_names(),
            nodes: manifest.nodes.clone(),
            constants: artifact.constants().clone(),
        }))
    }
}

pub struct CpuRunner {
    graph_name: String,
    inputs: Vec<TensorInfo>,
    outputs: Vec<TensorInfo>,
    input_names: Vec<String>,
    output_names: Vec<String>,
    nodes: Vec<Node>,
    constants: HashMap<String, Tensor>,
}

impl GraphRunner for CpuRunner {
    fn input_names(&self) -> &[String] {
        &self.input_names
    }

    fn output_names(&self) -> &[String] {
        &self.output_names
    }

    fn run(&mut self, inputs: &[Tensor]) -> Result<Vec<Tensor>, VaiRtError> {
        self.check_inputs(inputs)?;

        // Value environment: constants first, then the bound inputs.
        let mut env: HashMap<String, Tensor> = self.constants.clone();
        for (info, tensor) in self.inputs.iter().zip(inputs) {
            env.insert(info.name.clone(), tensor.clone());
        }

        for node in &self.nodes {
            let out = eval_node(&self.graph_name, node, &env)?;
            env.insert(node.output.clone(), out);
        }

        let mut results = Vec::with_capacity(self.outputs.len());
        for info in &self.outputs {
            let tensor = env.remove(&info.name).ok_or_else(|| {
                VaiRtError::backend(format!(
                    "graph '{}' produced no tensor '{}'",
                    self.graph_name, info.name
                ))
            })?;
            results.push(tensor);
        }

        tracing::debug!(graph = %self.graph_name, outputs = results.len(), "graph executed");
        Ok(results)
    }
}

impl CpuRunner {
    fn check_inputs(&self, inputs: &[Tensor]) -> Result<(), VaiRtError> {
        if inputs.len() != self.inputs.len() {
            return Err(VaiRtError::input_mismatch(format!(
                "graph '{}' expects {} inputs, got {}",
                self.graph_name,
                self.inputs.len(),
                inputs.len()
            )));
        }
        for (info, tensor) in self.inputs.iter().zip(inputs) {
            if tensor.desc().dims() != info.dims.as_slice()
                || tensor.desc().data_type() != info.dtype
            {
                return Err(VaiRtError::input_mismatch(format!(
                    "input '{}' expects shape {:?} ({:?}), got {:?} ({:?})",
                    info.name,
                    info.dims,
                    info.dtype,
                    tensor.desc().dims(),
                    tensor.desc().data_type()
                )));
            }
        }
        Ok(())
    }
}

fn fetch<'a>(
    graph: &str,
    env: &'a HashMap<String, Tensor>,
    name: &str,
) -> Result<&'a Tensor, VaiRtError> {
    env.get(name).ok_or_else(|| {
        VaiRtError::backend(format!("graph '{}' references unbound tensor '{}'", graph, name))
    })
}

fn want_arity(graph: &str, node: &Node, arity: usize) -> Result<(), VaiRtError> {
    if node.inputs.len() != arity {
        return Err(VaiRtError::backend(format!(
            "graph '{}': {:?} node '{}' takes {} inputs, got {}",
            graph,
            node.op,
            node.output,
            arity,
            node.inputs.len()
        )));
    }
    Ok(())
}

fn eval_node(
    graph: &str,
    node: &Node,
    env: &HashMap<String, Tensor>,
) -> Result<Tensor, VaiRtError> {
    match node.op {
        Op::Identity => {
            want_arity(graph, node, 1)?;
            Ok(fetch(graph, env, &node.inputs[0])?.clone())
        }
        Op::Relu => {
            want_arity(graph, node, 1)?;
            let src = fetch(graph, env, &node.inputs[0])?;
            let mut dst = Tensor::zeros(src.desc().clone());
            f32_cpu::relu(src.as_f32()?, dst.as_f32_mut()?);
            Ok(dst)
        }
        Op::Scale => {
            want_arity(graph, node, 1)?;
            let factor = node.scale.ok_or_else(|| {
                VaiRtError::backend(format!(
                    "graph '{}': scale node '{}' has no scale attribute",
                    graph, node.output
                ))
            })?;
            let src = fetch(graph, env, &node.inputs[0])?;
            let mut dst = Tensor::zeros(src.desc().clone());
            f32_cpu::scale(src.as_f32()?, factor, dst.as_f32_mut()?);
            Ok(dst)
        }
        Op::Add | Op::Mul => {
            want_arity(graph, node, 2)?;
            let src1 = fetch(graph, env, &node.inputs[0])?;
            let src2 = fetch(graph, env, &node.inputs[1])?;
            if src1.desc() != src2.desc() {
                return Err(VaiRtError::backend(format!(
                    "graph '{}': {:?} node '{}' has mismatched operand shapes {:?} vs {:?}",
                    graph,
                    node.op,
                    node.output,
                    src1.desc().dims(),
                    src2.desc().dims()
                )));
            }
            let mut dst = Tensor::zeros(src1.desc().clone());
            match node.op {
                Op::Add => f32_cpu::add(src1.as_f32()?, src2.as_f32()?, dst.as_f32_mut()?),
                _ => f32_cpu::mul(src1.as_f32()?, src2.as_f32()?, dst.as_f32_mut()?),
            }
            Ok(dst)
        }
        Op::Matmul => {
            want_arity(graph, node, 2)?;
            let src1 = fetch(graph, env, &node.inputs[0])?;
            let src2 = fetch(graph, env, &node.inputs[1])?;
            let d1 = src1.desc().dims();
            let d2 = src2.desc().dims();
            if d1.len() != 2 || d2.len() != 2 || d1[1] != d2[0] {
                return Err(VaiRtError::backend(format!(
                    "graph '{}': matmul node '{}' has incompatible shapes {:?} x {:?}",
                    graph, node.output, d1, d2
                )));
            }
            let (m, k, n) = (d1[0] as usize, d1[1] as usize, d2[1] as usize);
            let mut dst = Tensor::zeros(TensorDesc::new(vec![d1[0], d2[1]], DataType::F32));
            f32_cpu::matmul(m, k, n, src1.as_f32()?, src2.as_f32()?, dst.as_f32_mut()?);
            Ok(dst)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::Manifest;

    fn runner_for(manifest: Manifest, constants: Vec<(String, Tensor)>) -> Box<dyn GraphRunner> {
        let dir = tempfile::tempdir().unwrap();
        Artifact::write(dir.path(), &manifest, &constants).unwrap();
        let artifact = Artifact::open(dir.path()).unwrap();
        CpuBackend.load(&artifact, Target::DpuV2).unwrap()
    }

    fn linear_manifest() -> Manifest {
        // out = relu(data x w0 + b0)
        Manifest::from_json_str(
            r#"{
                "name": "subgraph_0",
                "inputs": [{"name": "data", "dims": [1, 2], "dtype": "f32"}],
                "outputs": [{"name": "out", "dims": [1, 2], "dtype": "f32"}],
                "constants": ["w0", "b0"],
                "nodes": [
                    {"op": "matmul", "inputs": ["data", "w0"], "output": "mm"},
                    {"op": "add", "inputs": ["mm", "b0"], "output": "pre"},
                    {"op": "relu", "inputs": ["pre"], "output": "out"}
                ]
            }"#,
        )
        .unwrap()
    }

    fn linear_constants() -> Vec<(String, Tensor)> {
        vec![
            (
                "w0".to_string(),
                Tensor::from_f32(vec![2, 2], &[1.0, 0.0, 0.0, 1.0]).unwrap(),
            ),
            (
                "b0".to_string(),
                Tensor::from_f32(vec![1, 2], &[1.0, -10.0]).unwrap(),
            ),
        ]
    }

    #[test]
    fn test_linear_graph_executes() {
        let mut runner = runner_for(linear_manifest(), linear_constants());

        let data = Tensor::from_f32(vec![1, 2], &[2.0, 3.0]).unwrap();
        let outputs = runner.run(&[data]).unwrap();
        assert_eq!(outputs.len(), 1);
        // identity weights, +1/-10 bias, relu clamps the negative lane
        assert_eq!(outputs[0].as_f32().unwrap(), &[3.0, 0.0]);
    }

    #[test]
    fn test_deterministic_across_runs() {
        let mut runner = runner_for(linear_manifest(), linear_constants());
        let data = Tensor::from_f32(vec![1, 2], &[0.5, 0.25]).unwrap();
        let first = runner.run(&[data.clone()]).unwrap();
        let second = runner.run(&[data]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_wrong_shape_rejected() {
        let mut runner = runner_for(linear_manifest(), linear_constants());
        let bad = Tensor::from_f32(vec![2, 2], &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let err = runner.run(&[bad]).unwrap_err();
        assert!(matches!(err, VaiRtError::InputMismatch(_)));
    }

    #[test]
    fn test_wrong_arity_rejected() {
        let mut runner = runner_for(linear_manifest(), linear_constants());
        let err = runner.run(&[]).unwrap_err();
        assert!(matches!(err, VaiRtError::InputMismatch(_)));
    }
}
