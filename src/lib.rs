//! vai-rt - Delegate runtime for compiled accelerator subgraphs
//!
//! A host graph executor hands this crate a compiled subgraph artifact on
//! disk; the crate wraps it in a runtime module that can be probed for named
//! capabilities, initialized against a device target, invoked with host
//! tensors, and persisted to a binary stream for later reconstruction.

mod artifact;

mod backend;

mod module;

mod tensor;

mod utils;

pub use artifact::{Artifact, Manifest, Node, Op, TensorInfo};
pub use backend::{Backend, CpuBackend, GraphRunner, Target, default_backend};
pub use module::{Capability, InitOptions, RuntimeModule};
pub use tensor::{DataType, Tensor, TensorDesc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaiRtError {
    #[error("Model load error: {0}")]
    ModelLoad(String),

    #[error("Unsupported target: {0}")]
    UnsupportedTarget(String),

    #[error("Module '{0}' is not initialized")]
    NotInitialized(String),

    #[error("Module '{0}' is already initialized")]
    AlreadyInitialized(String),

    #[error("Input mismatch: {0}")]
    InputMismatch(String),

    #[error("Backend execution error: {0}")]
    BackendExecution(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VaiRtError {
    pub fn model_load(msg: impl Into<String>) -> Self {
        Self::ModelLoad(msg.into())
    }

    pub fn input_mismatch(msg: impl Into<String>) -> Self {
        Self::InputMismatch(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::BackendExecution(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}
