mod cpu;
pub use cpu::{CpuBackend, CpuRunner};
mod f32_cpu;
mod target;
pub use target::Target;

use crate::VaiRtError;
use crate::artifact::Artifact;
use crate::tensor::Tensor;

/// A graph loaded onto an execution backend, ready to run. Exclusively
/// owned by the module that loaded it; dropping the runner releases
/// whatever the backend allocated.
pub trait GraphRunner {
    fn input_names(&self) -> &[String];

    fn output_names(&self) -> &[String];

    /// Execute the graph. Inputs bind positionally to `input_names`;
    /// outputs come back in `output_names` order. Blocks until the
    /// backend finishes.
    fn run(&mut self, inputs: &[Tensor]) -> Result<Vec<Tensor>, VaiRtError>;
}

/// The seam to an accelerator inference engine. A real vendor integration
/// implements this; the built-in [`CpuBackend`] interprets artifacts on the
/// host and is what [`default_backend`] returns.
pub trait Backend {
    fn name(&self) -> &str;

    fn supports(&self, target: Target) -> bool;

    fn load(
        &self,
        artifact: &Artifact,
        target: Target,
    ) -> Result<Box<dyn GraphRunner>, VaiRtError>;
}

pub fn default_backend() -> Box<dyn Backend> {
    Box::new(CpuBackend)
}
