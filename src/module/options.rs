use crate::backend::Backend;

/// Initialization options.
///
/// `out_tensor_names` overrides the output bindings derived from the loaded
/// graph (the graph-description module flavor supplies these); every name
/// must exist among the artifact's declared outputs, and the override order
/// becomes the invocation output order. `backend` substitutes a vendor
/// integration or a test double for the built-in reference backend.
#[derive(Default)]
pub struct InitOptions<'a> {
    pub out_tensor_names: Option<Vec<String>>,
    pub backend: Option<&'a dyn Backend>,
}
