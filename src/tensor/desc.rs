use serde::{Deserialize, Serialize};

use super::data_type::DataType;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorDesc {
    dims: Vec<i64>,
    data_type: DataType,
}

impl TensorDesc {
    pub fn new(dims: Vec<i64>, data_type: DataType) -> Self {
        assert!(!dims.is_empty(), "Tensor dimensions cannot be empty");
        assert!(
            dims.iter().all(|d| *d > 0),
            "Tensor dimensions must be positive, got {:?}",
            dims
        );
        Self { dims, data_type }
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn num_elements(&self) -> usize {
        self.dims.iter().map(|d| *d as usize).product()
    }

    // Size in bytes for the tensor given its DataType
    pub fn size_in_bytes(&self) -> usize {
        self.num_elements() * self.data_type.bytes_per_element()
    }

    // Get dimensions
    pub fn dims(&self) -> &[i64] {
        &self.dims
    }

    // Get number of dimensions
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }
}
