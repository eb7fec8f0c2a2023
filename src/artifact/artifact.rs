use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::VaiRtError;
use crate::tensor::{DataType, Tensor, TensorDesc};
use crate::utils::bytes;

use super::manifest::Manifest;

/// A compiled subgraph artifact on disk: `manifest.json` plus the constant
/// tensors packed in `constants.bin`. The runtime only consumes artifacts;
/// `write` exists for the compile side and for test fixtures.
#[derive(Debug)]
pub struct Artifact {
    root: PathBuf,
    manifest: Manifest,
    constants: HashMap<String, Tensor>,
}

pub const MANIFEST_FILE: &str = "manifest.json";
pub const CONSTANTS_FILE: &str = "constants.bin";

impl Artifact {
    pub fn open(path: &Path) -> Result<Self, VaiRtError> {
        if !path.is_dir() {
            return Err(VaiRtError::model_load(format!(
                "model path '{}' is not a directory",
                path.display()
            )));
        }

        let manifest = Manifest::from_json_file(&path.join(MANIFEST_FILE))?;
        manifest.validate()?;

        let constants_path = path.join(CONSTANTS_FILE);
        let constants = if constants_path.is_file() {
            read_constants(&constants_path)?
        } else {
            HashMap::new()
        };

        for name in &manifest.constants {
            if !constants.contains_key(name) {
                return Err(VaiRtError::model_load(format!(
                    "constant '{}' declared in manifest but missing from {}",
                    name, CONSTANTS_FILE
                )));
            }
        }
        for name in constants.keys() {
            if !manifest.constants.iter().any(|c| c == name) {
                return Err(VaiRtError::model_load(format!(
                    "constant '{}' present in {} but not declared in manifest",
                    name, CONSTANTS_FILE
                )));
            }
        }

        tracing::debug!(
            path = %path.display(),
            graph = %manifest.name,
            constants = constants.len(),
            "opened artifact"
        );

        Ok(Self {
            root: path.to_path_buf(),
            manifest,
            constants,
        })
    }

    /// Write a complete artifact directory. Compile-side counterpart of
    /// `open`; the runtime itself never creates artifacts.
    pub fn write(
        path: &Path,
        manifest: &Manifest,
        constants: &[(String, Tensor)],
    ) -> Result<(), VaiRtError> {
        manifest.validate()?;
        std::fs::create_dir_all(path)?;
        std::fs::write(path.join(MANIFEST_FILE), manifest.to_json())?;

        let file = File::create(path.join(CONSTANTS_FILE))?;
        let mut w = BufWriter::new(file);
        bytes::write_u32(&mut w, constants.len() as u32)?;
        for (name, tensor) in constants {
            bytes::write_string(&mut w, name)?;
            bytes::write_u8(&mut w, tensor.desc().data_type().wire_code())?;
            bytes::write_u32(&mut w, tensor.desc().ndim() as u32)?;
            for dim in tensor.desc().dims() {
                bytes::write_u64(&mut w, *dim as u64)?;
            }
            bytes::write_bytes(&mut w, tensor.data())?;
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn constant(&self, name: &str) -> Option<&Tensor> {
        self.constants.get(name)
    }

    pub fn constants(&self) -> &HashMap<String, Tensor> {
        &self.constants
    }
}

fn read_constants(path: &Path) -> Result<HashMap<String, Tensor>, VaiRtError> {
    let file = File::open(path)
        .map_err(|e| VaiRtError::model_load(format!("cannot open '{}': {}", path.display(), e)))?;
    let mut r = BufReader::new(file);

    let bad = |e: std::io::Error| {
        VaiRtError::model_load(format!("malformed '{}': {}", path.display(), e))
    };

    let count = bytes::read_u32(&mut r).map_err(bad)?;
    let mut constants = HashMap::with_capacity(count as usize);
    for _ in 0..count {
        let name = bytes::read_string(&mut r).map_err(bad)?;
        let code = bytes::read_u8(&mut r).map_err(bad)?;
        let dtype = DataType::from_wire_code(code).ok_or_else(|| {
            VaiRtError::model_load(format!("constant '{}' has unknown dtype code {}", name, code))
        })?;
        let ndim = bytes::read_u32(&mut r).map_err(bad)?;
        let mut dims = Vec::with_capacity(ndim as usize);
        for _ in 0..ndim {
            dims.push(bytes::read_u64(&mut r).map_err(bad)? as i64);
        }
        let data = bytes::read_bytes(&mut r).map_err(bad)?;
        if dims.is_empty() || dims.iter().any(|d| *d <= 0) {
            return Err(VaiRtError::model_load(format!(
                "constant '{}' has invalid shape {:?}",
                name, dims
            )));
        }
        let desc = TensorDesc::new(dims, dtype);
        let tensor = Tensor::new(desc, data).map_err(|e| {
            VaiRtError::model_load(format!("constant '{}' payload mismatch: {}", name, e))
        })?;
        constants.insert(name, tensor);
    }

    Ok(constants)
}
