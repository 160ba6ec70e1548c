/// Tests for RenderPipelineManager

use super::*;
use crate::device::mock_graphics_device::MockGraphicsDevice;
use crate::error::Error;
use crate::test_support::{color_format, TestPass};

fn desc(name: &str) -> RenderPipelineDesc {
    RenderPipelineDesc {
        name: name.to_string(),
        passes: vec![TestPass::color_depth("opaque").boxed()],
        presentation_format: Some(color_format()),
    }
}

#[test]
fn test_create_and_lookup() {
    let device = MockGraphicsDevice::new();
    let config = CompositorConfig::default();
    let mut manager = RenderPipelineManager::new();

    let id = manager.create_pipeline(desc("forward"), &config, &device).unwrap().id();

    assert_eq!(manager.pipeline_count(), 1);
    assert_eq!(manager.pipeline("forward").map(|p| p.id()), Some(id));
    assert!(manager.pipeline_mut("forward").is_some());
    assert!(manager.pipeline("deferred").is_none());
}

#[test]
fn test_duplicate_name_is_rejected() {
    let device = MockGraphicsDevice::new();
    let config = CompositorConfig::default();
    let mut manager = RenderPipelineManager::new();
    let first = manager.create_pipeline(desc("forward"), &config, &device).unwrap().id();

    let result = manager.create_pipeline(desc("forward"), &config, &device);

    assert!(matches!(result, Err(Error::Configuration(_))));
    assert_eq!(manager.pipeline("forward").map(|p| p.id()), Some(first));
}

#[test]
fn test_failed_compile_stores_nothing() {
    let device = MockGraphicsDevice::new();
    let mut manager = RenderPipelineManager::new();
    let empty = RenderPipelineDesc {
        name: "broken".to_string(),
        passes: vec![],
        presentation_format: None,
    };

    assert!(manager.create_pipeline(empty, &CompositorConfig::default(), &device).is_err());
    assert_eq!(manager.pipeline_count(), 0);
}

#[test]
fn test_remove_and_clear() {
    let device = MockGraphicsDevice::new();
    let config = CompositorConfig::default();
    let mut manager = RenderPipelineManager::new();
    manager.create_pipeline(desc("forward"), &config, &device).unwrap();
    manager.create_pipeline(desc("editor"), &config, &device).unwrap();

    let mut names = manager.pipeline_names();
    names.sort_unstable();
    assert_eq!(names, vec!["editor", "forward"]);

    let removed = manager.remove_pipeline("editor").unwrap();
    assert_eq!(removed.name(), "editor");
    assert!(manager.remove_pipeline("editor").is_none());

    manager.clear();
    assert_eq!(manager.pipeline_count(), 0);
}
