mod data_type;
pub use data_type::DataType;
mod desc;
pub use desc::TensorDesc;
mod tensor;
pub use tensor::Tensor;
