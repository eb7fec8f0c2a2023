use bytemuck::{try_cast_slice, try_cast_slice_mut};

use crate::VaiRtError;

use super::{data_type::DataType, desc::TensorDesc};

/// Host-resident tensor: a shape descriptor plus an owned little-endian
/// byte buffer. Device placement and layout belong to the execution
/// backend, not to this type.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    desc: TensorDesc,
    data: Vec<u8>,
}

impl Tensor {
    pub fn new(desc: TensorDesc, data: Vec<u8>) -> Result<Self, VaiRtError> {
        if data.len() != desc.size_in_bytes() {
            return Err(VaiRtError::input_mismatch(format!(
                "buffer holds {} bytes but shape {:?} ({:?}) requires {}",
                data.len(),
                desc.dims(),
                desc.data_type(),
                desc.size_in_bytes()
            )));
        }
        Ok(Self { desc, data })
    }

    pub fn zeros(desc: TensorDesc) -> Self {
        let data = vec![0u8; desc.size_in_bytes()];
        Self { desc, data }
    }

    pub fn from_f32(dims: Vec<i64>, values: &[f32]) -> Result<Self, VaiRtError> {
        let desc = TensorDesc::new(dims, DataType::F32);
        if values.len() != desc.num_elements() {
            return Err(VaiRtError::input_mismatch(format!(
                "{} values supplied but shape {:?} requires {}",
                values.len(),
                desc.dims(),
                desc.num_elements()
            )));
        }
        let mut data = Vec::with_capacity(desc.size_in_bytes());
        for v in values {
            data.extend_from_slice(&v.to_le_bytes());
        }
        Ok(Self { desc, data })
    }

    pub fn desc(&self) -> &TensorDesc {
        &self.desc
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// View the buffer as f32 elements. Fails for non-f32 tensors.
    pub fn as_f32(&self) -> Result<&[f32], VaiRtError> {
        if self.desc.data_type() != DataType::F32 {
            return Err(VaiRtError::input_mismatch(format!(
                "expected f32 tensor, got {:?}",
                self.desc.data_type()
            )));
        }
        try_cast_slice(&self.data)
            .map_err(|e| VaiRtError::input_mismatch(format!("f32 view failed: {}", e)))
    }

    pub fn as_f32_mut(&mut self) -> Result<&mut [f32], VaiRtError> {
        if self.desc.data_type() != DataType::F32 {
            return Err(VaiRtError::input_mismatch(format!(
                "expected f32 tensor, got {:?}",
                self.desc.data_type()
            )));
        }
        try_cast_slice_mut(&mut self.data)
            .map_err(|e| VaiRtError::input_mismatch(format!("f32 view failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_f32_round_trip() {
        let t = Tensor::from_f32(vec![2, 2], &[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(t.desc().dims(), &[2, 2]);
        assert_eq!(t.as_f32().unwrap(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_length_checked() {
        let desc = TensorDesc::new(vec![4], DataType::F32);
        assert!(Tensor::new(desc, vec![0u8; 3]).is_err());
        assert!(Tensor::from_f32(vec![4], &[1.0]).is_err());
    }
}
