mod capability;
pub use capability::Capability;
mod options;
pub use options::InitOptions;
mod runtime_module;
pub use runtime_module::RuntimeModule;
