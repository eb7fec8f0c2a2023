use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    U8,
    I8,
    I32,
    F32,
}

impl DataType {
    pub fn bytes_per_element(&self) -> usize {
        match self {
            DataType::U8 => 1,
            DataType::I8 => 1,
            DataType::I32 => 4,
            DataType::F32 => 4,
        }
    }

    /// Stable single-byte code used in the binary persistence format.
    pub fn wire_code(&self) -> u8 {
        match self {
            DataType::U8 => 0,
            DataType::I8 => 1,
            DataType::I32 => 2,
            DataType::F32 => 3,
        }
    }

    pub fn from_wire_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(DataType::U8),
            1 => Some(DataType::I8),
            2 => Some(DataType::I32),
            3 => Some(DataType::F32),
            _ => None,
        }
    }
}
