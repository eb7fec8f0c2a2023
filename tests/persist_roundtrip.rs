// Binary persistence: save_to_binary / load_from_binary are inverses, the
// stream is versioned, and an unreadable artifact fails the save cleanly.

use vai_rt::{Artifact, Manifest, RuntimeModule, Target, Tensor, VaiRtError};

fn write_fixture_artifact(dir: &std::path::Path) {
    let manifest = Manifest::from_json_str(
        r#"{
            "name": "subgraph_0",
            "inputs": [{"name": "data", "dims": [1, 2], "dtype": "f32"}],
            "outputs": [{"name": "out", "dims": [1, 2], "dtype": "f32"}],
            "constants": ["w0", "b0"],
            "nodes": [
                {"op": "matmul", "inputs": ["data", "w0"], "output": "mm"},
                {"op": "add", "inputs": ["mm", "b0"], "output": "pre"},
                {"op": "relu", "inputs": ["pre"], "output": "out"}
            ]
        }"#,
    )
    .unwrap();
    let constants = vec![
        (
            "w0".to_string(),
            Tensor::from_f32(vec![2, 2], &[0.5, 0.0, 0.0, 2.0]).unwrap(),
        ),
        (
            "b0".to_string(),
            Tensor::from_f32(vec![1, 2], &[0.25, 0.25]).unwrap(),
        ),
    ];
    Artifact::write(dir, &manifest, &constants).unwrap();
}

#[test]
fn round_trip_preserves_bindings_and_results() {
    let model_dir = tempfile::tempdir().unwrap();
    write_fixture_artifact(model_dir.path());

    let mut original = RuntimeModule::with_graph_desc(
        "subgraph_0",
        "{\"layers\":[\"dense\"]}",
        vec!["w0".to_string(), "b0".to_string()],
    );
    original.initialize(model_dir.path(), "DPUCZDX8G").unwrap();

    let mut stream = Vec::new();
    original.save_to_binary(&mut stream).unwrap();

    let unpack_dir = tempfile::tempdir().unwrap();
    let mut restored =
        RuntimeModule::load_from_binary(&mut stream.as_slice(), unpack_dir.path()).unwrap();

    assert!(restored.is_initialized());
    assert_eq!(restored.symbol(), original.symbol());
    assert_eq!(restored.const_vars(), original.const_vars());
    assert_eq!(restored.graph_desc(), original.graph_desc());
    assert_eq!(restored.target(), Some(Target::DpuCzdx8g));
    assert_eq!(restored.in_tensor_names(), original.in_tensor_names());
    assert_eq!(restored.out_tensor_names(), original.out_tensor_names());

    let data = Tensor::from_f32(vec![1, 2], &[4.0, -1.0]).unwrap();
    let before = original.invoke(&[data.clone()]).unwrap();
    let after = restored.invoke(&[data]).unwrap();
    assert_eq!(before, after);
}

#[test]
fn save_does_not_change_module_state() {
    let model_dir = tempfile::tempdir().unwrap();
    write_fixture_artifact(model_dir.path());

    let mut module = RuntimeModule::new("subgraph_0", vec!["w0".to_string(), "b0".to_string()]);
    module.initialize(model_dir.path(), "DPUv2").unwrap();

    let mut stream = Vec::new();
    module.save_to_binary(&mut stream).unwrap();
    assert!(module.is_initialized());

    // the module is still invocable after serialization
    let data = Tensor::from_f32(vec![1, 2], &[1.0, 1.0]).unwrap();
    assert!(module.invoke(&[data]).is_ok());
}

#[test]
fn unknown_format_version_is_rejected() {
    let model_dir = tempfile::tempdir().unwrap();
    write_fixture_artifact(model_dir.path());

    let mut module = RuntimeModule::new("subgraph_0", vec!["w0".to_string(), "b0".to_string()]);
    module.initialize(model_dir.path(), "DPUv2").unwrap();

    let mut stream = Vec::new();
    module.save_to_binary(&mut stream).unwrap();
    // bump the leading version field
    stream[0] = 99;

    let unpack_dir = tempfile::tempdir().unwrap();
    let err =
        RuntimeModule::load_from_binary(&mut stream.as_slice(), unpack_dir.path()).unwrap_err();
    assert!(matches!(err, VaiRtError::Serialization(_)));
}

#[test]
fn truncated_stream_is_rejected() {
    let model_dir = tempfile::tempdir().unwrap();
    write_fixture_artifact(model_dir.path());

    let mut module = RuntimeModule::new("subgraph_0", vec!["w0".to_string(), "b0".to_string()]);
    module.initialize(model_dir.path(), "DPUv2").unwrap();

    let mut stream = Vec::new();
    module.save_to_binary(&mut stream).unwrap();
    stream.truncate(stream.len() / 2);

    let unpack_dir = tempfile::tempdir().unwrap();
    let err =
        RuntimeModule::load_from_binary(&mut stream.as_slice(), unpack_dir.path()).unwrap_err();
    assert!(matches!(err, VaiRtError::Serialization(_)));
}

#[test]
fn save_fails_when_artifact_was_deleted() {
    let model_dir = tempfile::tempdir().unwrap();
    write_fixture_artifact(model_dir.path());

    let mut module = RuntimeModule::new("subgraph_0", vec!["w0".to_string(), "b0".to_string()]);
    module.initialize(model_dir.path(), "DPUv2").unwrap();

    // the artifact disappears between initialization and export
    drop(model_dir);

    let mut stream = Vec::new();
    let err = module.save_to_binary(&mut stream).unwrap_err();
    assert!(matches!(err, VaiRtError::Serialization(_)));
}
