use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::VaiRtError;
use crate::artifact::{Artifact, pack_dir, unpack_dir};
use crate::backend::{Backend, GraphRunner, Target, default_backend};
use crate::tensor::Tensor;
use crate::utils::bytes;

use super::capability::Capability;
use super::options::InitOptions;

/// Version tag leading the binary persistence format.
const FORMAT_VERSION: u32 = 1;

/// One compiled subgraph bound to an accelerator backend.
///
/// A module is constructed uninitialized from its symbol name and required
/// constant names, optionally carrying a textual graph description. It
/// becomes usable once `initialize` has loaded the compiled artifact for a
/// device target, and it stays initialized for the rest of its life;
/// dropping the module releases the backend runner.
pub struct RuntimeModule {
    symbol_name: String,
    const_names: Vec<String>,
    graph_desc: Option<String>,
    model_path: Option<PathBuf>,
    target: Option<Target>,
    in_tensor_names: Vec<String>,
    out_tensor_names: Vec<String>,
    runner: Option<Box<dyn GraphRunner>>,
    initialized: bool,
}

impl std::fmt::Debug for RuntimeModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeModule")
            .field("symbol_name", &self.symbol_name)
            .field("const_names", &self.const_names)
            .field("graph_desc", &self.graph_desc)
            .field("model_path", &self.model_path)
            .field("target", &self.target)
            .field("in_tensor_names", &self.in_tensor_names)
            .field("out_tensor_names", &self.out_tensor_names)
            .field("runner", &self.runner.as_ref().map(|_| "<runner>"))
            .field("initialized", &self.initialized)
            .finish()
    }
}

impl RuntimeModule {
    pub fn new(symbol_name: impl Into<String>, const_names: Vec<String>) -> Self {
        let symbol_name = symbol_name.into();
        assert!(!symbol_name.is_empty(), "Symbol name cannot be empty");
        Self {
            symbol_name,
            const_names,
            graph_desc: None,
            model_path: None,
            target: None,
            in_tensor_names: Vec::new(),
            out_tensor_names: Vec::new(),
            runner: None,
            initialized: false,
        }
    }

    /// Flavor that additionally carries a textual graph description. The
    /// description is stored and persisted verbatim; this crate never
    /// interprets it. The caller-supplied constant list is kept as given.
    pub fn with_graph_desc(
        symbol_name: impl Into<String>,
        graph_desc: impl Into<String>,
        const_names: Vec<String>,
    ) -> Self {
        let mut module = Self::new(symbol_name, const_names);
        module.graph_desc = Some(graph_desc.into());
        module
    }

    pub fn symbol(&self) -> &str {
        &self.symbol_name
    }

    pub fn const_vars(&self) -> &[String] {
        &self.const_names
    }

    pub fn graph_desc(&self) -> Option<&str> {
        self.graph_desc.as_deref()
    }

    pub fn target(&self) -> Option<Target> {
        self.target
    }

    pub fn model_path(&self) -> Option<&Path> {
        self.model_path.as_deref()
    }

    pub fn in_tensor_names(&self) -> &[String] {
        &self.in_tensor_names
    }

    pub fn out_tensor_names(&self) -> &[String] {
        &self.out_tensor_names
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Map a host-probed function name onto this module's capability
    /// surface. Unknown names are an expected probe outcome: `None`.
    pub fn lookup(&self, name: &str) -> Option<Capability> {
        Capability::resolve(name, &self.symbol_name)
    }

    /// Load the compiled artifact at `model_path` for `target` using the
    /// default backend.
    pub fn initialize(&mut self, model_path: &Path, target: &str) -> Result<(), VaiRtError> {
        self.initialize_with(model_path, target, InitOptions::default())
    }

    /// Full initialization entry point. The module commits no state until
    /// every step has succeeded: a failed initialization leaves it exactly
    /// as constructed, with nothing allocated.
    pub fn initialize_with(
        &mut self,
        model_path: &Path,
        target: &str,
        opts: InitOptions<'_>,
    ) -> Result<(), VaiRtError> {
        if self.initialized {
            return Err(VaiRtError::AlreadyInitialized(self.symbol_name.clone()));
        }

        let target: Target = target.parse()?;

        let default_backend_holder;
        let backend: &dyn Backend = match opts.backend {
            Some(backend) => backend,
            None => {
                default_backend_holder = default_backend();
                default_backend_holder.as_ref()
            }
        };
        if !backend.supports(target) {
            return Err(VaiRtError::UnsupportedTarget(format!(
                "{} (backend '{}')",
                target,
                backend.name()
            )));
        }

        let artifact = Artifact::open(model_path)?;
        let runner = backend.load(&artifact, target)?;

        let out_tensor_names = match opts.out_tensor_names {
            Some(names) => {
                if names.is_empty() {
                    return Err(VaiRtError::model_load(format!(
                        "module '{}' was given an empty output-name list",
                        self.symbol_name
                    )));
                }
                let declared = artifact.manifest().output_names();
                for name in &names {
                    if !declared.contains(name) {
                        return Err(VaiRtError::model_load(format!(
                            "output '{}' is not declared by graph '{}'",
                            name,
                            artifact.manifest().name
                        )));
                    }
                }
                names
            }
            None => runner.output_names().to_vec(),
        };

        self.in_tensor_names = runner.input_names().to_vec();
        self.out_tensor_names = out_tensor_names;
        self.model_path = Some(model_path.to_path_buf());
        self.target = Some(target);
        self.runner = Some(runner);
        self.initialized = true;

        tracing::info!(
            module = %self.symbol_name,
            target = %target,
            path = %model_path.display(),
            "module initialized"
        );
        Ok(())
    }

    /// Execute the bound graph. Inputs bind positionally to
    /// `in_tensor_names`; outputs come back in `out_tensor_names` order.
    /// A failed invocation leaves the bound signature intact, so a later
    /// well-formed call may still succeed.
    pub fn invoke(&mut self, inputs: &[Tensor]) -> Result<Vec<Tensor>, VaiRtError> {
        let Some(runner) = self.runner.as_mut() else {
            return Err(VaiRtError::NotInitialized(self.symbol_name.clone()));
        };

        let mut outputs = runner.run(inputs)?;

        // An output-name override narrows/reorders what the caller sees.
        if self.out_tensor_names != runner.output_names() {
            let full: Vec<String> = runner.output_names().to_vec();
            let mut selected = Vec::with_capacity(self.out_tensor_names.len());
            for name in &self.out_tensor_names {
                let idx = full.iter().position(|n| n == name).ok_or_else(|| {
                    VaiRtError::backend(format!(
                        "bound output '{}' disappeared from graph",
                        name
                    ))
                })?;
                selected.push(outputs[idx].clone());
            }
            outputs = selected;
        }

        Ok(outputs)
    }

    /// Serialize the module to a binary stream: format version, symbol
    /// name, constant names, graph description, target, tensor-name
    /// bindings, then the artifact directory byte-for-byte.
    /// `load_from_binary` is the exact inverse.
    pub fn save_to_binary<W: Write>(&self, w: &mut W) -> Result<(), VaiRtError> {
        if !self.initialized {
            return Err(VaiRtError::NotInitialized(self.symbol_name.clone()));
        }
        // initialized implies both are present
        let model_path = self.model_path.as_deref().ok_or_else(|| {
            VaiRtError::serialization("initialized module has no model path")
        })?;
        let target = self.target.ok_or_else(|| {
            VaiRtError::serialization("initialized module has no target")
        })?;

        let ser = |e: std::io::Error| VaiRtError::serialization(e.to_string());
        bytes::write_u32(w, FORMAT_VERSION).map_err(ser)?;
        bytes::write_string(w, &self.symbol_name).map_err(ser)?;
        bytes::write_string_list(w, &self.const_names).map_err(ser)?;
        match &self.graph_desc {
            Some(desc) => {
                bytes::write_u8(w, 1).map_err(ser)?;
                bytes::write_string(w, desc).map_err(ser)?;
            }
            None => bytes::write_u8(w, 0).map_err(ser)?,
        }
        bytes::write_string(w, target.as_str()).map_err(ser)?;
        bytes::write_string_list(w, &self.in_tensor_names).map_err(ser)?;
        bytes::write_string_list(w, &self.out_tensor_names).map_err(ser)?;
        pack_dir(model_path, w)?;

        tracing::debug!(module = %self.symbol_name, "module serialized");
        Ok(())
    }

    /// Reconstruct an initialized module from a stream produced by
    /// `save_to_binary`. The artifact is unpacked under `unpack_root`
    /// (which becomes a regular model directory owned by the caller) and
    /// reloaded through the default backend.
    pub fn load_from_binary<R: Read>(
        r: &mut R,
        unpack_root: &Path,
    ) -> Result<RuntimeModule, VaiRtError> {
        let ser = |e: std::io::Error| VaiRtError::serialization(e.to_string());

        let version = bytes::read_u32(r).map_err(ser)?;
        if version != FORMAT_VERSION {
            return Err(VaiRtError::serialization(format!(
                "unsupported format version {} (expected {})",
                version, FORMAT_VERSION
            )));
        }
        let symbol_name = bytes::read_string(r).map_err(ser)?;
        let const_names = bytes::read_string_list(r).map_err(ser)?;
        let graph_desc = match bytes::read_u8(r).map_err(ser)? {
            0 => None,
            1 => Some(bytes::read_string(r).map_err(ser)?),
            flag => {
                return Err(VaiRtError::serialization(format!(
                    "invalid graph-description flag {}",
                    flag
                )));
            }
        };
        let target = bytes::read_string(r).map_err(ser)?;
        let in_tensor_names = bytes::read_string_list(r).map_err(ser)?;
        let out_tensor_names = bytes::read_string_list(r).map_err(ser)?;
        unpack_dir(r, unpack_root)?;

        let mut module = match graph_desc {
            Some(desc) => RuntimeModule::with_graph_desc(symbol_name, desc, const_names),
            None => RuntimeModule::new(symbol_name, const_names),
        };
        module.initialize_with(
            unpack_root,
            &target,
            InitOptions {
                out_tensor_names: Some(out_tensor_names),
                backend: None,
            },
        )?;

        if module.in_tensor_names != in_tensor_names {
            return Err(VaiRtError::serialization(format!(
                "reloaded graph binds inputs {:?}, stream recorded {:?}",
                module.in_tensor_names, in_tensor_names
            )));
        }

        tracing::info!(module = %module.symbol_name, "module restored from stream");
        Ok(module)
    }
}
