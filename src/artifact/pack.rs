//! Byte-for-byte packing of an artifact directory into a binary stream.
//!
//! Files are walked recursively and emitted in sorted relative-path order so
//! the packed form of a given directory is deterministic. `unpack_dir` is
//! the exact inverse.

use std::io::{Read, Write};
use std::path::{Component, Path, PathBuf};

use crate::VaiRtError;
use crate::utils::bytes;

pub fn pack_dir<W: Write>(root: &Path, w: &mut W) -> Result<(), VaiRtError> {
    let mut files = Vec::new();
    collect_files(root, root, &mut files)?;
    files.sort();

    bytes::write_u32(w, files.len() as u32)
        .map_err(|e| VaiRtError::serialization(e.to_string()))?;
    for rel in &files {
        let contents = std::fs::read(root.join(rel)).map_err(|e| {
            VaiRtError::serialization(format!(
                "cannot read '{}' under '{}': {}",
                rel,
                root.display(),
                e
            ))
        })?;
        bytes::write_string(w, rel).map_err(|e| VaiRtError::serialization(e.to_string()))?;
        bytes::write_bytes(w, &contents).map_err(|e| VaiRtError::serialization(e.to_string()))?;
    }

    tracing::debug!(root = %root.display(), files = files.len(), "packed artifact directory");
    Ok(())
}

pub fn unpack_dir<R: Read>(r: &mut R, dest: &Path) -> Result<(), VaiRtError> {
    let count = bytes::read_u32(r).map_err(|e| VaiRtError::serialization(e.to_string()))?;
    for _ in 0..count {
        let rel = bytes::read_string(r).map_err(|e| VaiRtError::serialization(e.to_string()))?;
        let contents = bytes::read_bytes(r).map_err(|e| VaiRtError::serialization(e.to_string()))?;

        let rel_path = sanitize_rel_path(&rel)?;
        let full = dest.join(rel_path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| VaiRtError::serialization(e.to_string()))?;
        }
        std::fs::write(&full, contents).map_err(|e| {
            VaiRtError::serialization(format!("cannot write '{}': {}", full.display(), e))
        })?;
    }
    Ok(())
}

// Packed paths use '/' separators and must stay inside the destination.
fn sanitize_rel_path(rel: &str) -> Result<PathBuf, VaiRtError> {
    let path: PathBuf = rel.split('/').collect();
    let ok = !rel.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if !ok {
        return Err(VaiRtError::serialization(format!(
            "invalid path '{}' in packed stream",
            rel
        )));
    }
    Ok(path)
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<String>) -> Result<(), VaiRtError> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        VaiRtError::serialization(format!("cannot read '{}': {}", dir.display(), e))
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| VaiRtError::serialization(e.to_string()))?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(root, &path, out)?;
        } else {
            let rel = path
                .strip_prefix(root)
                .map_err(|e| VaiRtError::serialization(e.to_string()))?;
            let rel = rel
                .components()
                .filter_map(|c| match c {
                    Component::Normal(s) => s.to_str(),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("/");
            out.push(rel);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack_round_trip() {
        let src = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("manifest.json"), b"{}").unwrap();
        std::fs::create_dir(src.path().join("weights")).unwrap();
        std::fs::write(src.path().join("weights").join("w0.bin"), [1u8, 2, 3]).unwrap();

        let mut packed = Vec::new();
        pack_dir(src.path(), &mut packed).unwrap();

        let dest = tempfile::tempdir().unwrap();
        unpack_dir(&mut packed.as_slice(), dest.path()).unwrap();

        assert_eq!(
            std::fs::read(dest.path().join("manifest.json")).unwrap(),
            b"{}"
        );
        assert_eq!(
            std::fs::read(dest.path().join("weights").join("w0.bin")).unwrap(),
            vec![1u8, 2, 3]
        );
    }

    #[test]
    fn test_pack_is_deterministic() {
        let src = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("b.bin"), b"bb").unwrap();
        std::fs::write(src.path().join("a.bin"), b"aa").unwrap();

        let mut first = Vec::new();
        pack_dir(src.path(), &mut first).unwrap();
        let mut second = Vec::new();
        pack_dir(src.path(), &mut second).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_escaping_path_rejected() {
        let mut packed = Vec::new();
        bytes::write_u32(&mut packed, 1).unwrap();
        bytes::write_string(&mut packed, "../escape").unwrap();
        bytes::write_bytes(&mut packed, b"x").unwrap();

        let dest = tempfile::tempdir().unwrap();
        let err = unpack_dir(&mut packed.as_slice(), dest.path()).unwrap_err();
        assert!(matches!(err, VaiRtError::Serialization(_)));
    }
}
