/// Tests for ShaderData variant lookup

use super::*;
use slotmap::SlotMap;
use crate::resource::VertexSemantic;
use crate::resource::VertexFormat;

fn variant_desc(pass: &str) -> ShaderVariantDesc {
    ShaderVariantDesc {
        pass_name: pass.to_string(),
        vertex_inputs: VertexLayout::new()
            .with(VertexSemantic::Position, VertexFormat::R32G32B32_SFLOAT),
        uniforms: ShaderUniformLayout::empty(),
    }
}

fn handle() -> ShaderHandle {
    let mut map: SlotMap<ShaderHandle, ()> = SlotMap::with_key();
    map.insert(())
}

#[test]
fn test_variants_are_found_by_pass_name() {
    let h = handle();
    let desc = ShaderDesc {
        name: "lit".to_string(),
        variants: vec![variant_desc("opaque"), variant_desc("picking")],
    };
    ShaderData::validate(&desc).unwrap();
    let shader = ShaderData::from_desc(h, desc);

    assert_eq!(shader.variant_count(), 2);
    assert!(shader.has_variant("opaque"));
    assert!(!shader.has_variant("transparent"));

    let picking = shader.variant("picking").unwrap();
    assert_eq!(picking.pass_name(), "picking");
    assert_eq!(picking.id(), ShaderVariantId { shader: h, variant: 1 });
}

#[test]
fn test_variant_ids_are_distinct() {
    let desc = ShaderDesc {
        name: "lit".to_string(),
        variants: vec![variant_desc("a"), variant_desc("b"), variant_desc("c")],
    };
    let shader = ShaderData::from_desc(handle(), desc);
    let ids: Vec<_> = shader.variants().iter().map(|v| v.id()).collect();
    assert_ne!(ids[0], ids[1]);
    assert_ne!(ids[1], ids[2]);
}

#[test]
fn test_duplicate_pass_variant_rejected() {
    let desc = ShaderDesc {
        name: "lit".to_string(),
        variants: vec![variant_desc("opaque"), variant_desc("opaque")],
    };
    assert!(ShaderData::validate(&desc).is_err());
}

#[test]
fn test_shader_without_variants_is_valid() {
    let desc = ShaderDesc { name: "empty".to_string(), variants: vec![] };
    assert!(ShaderData::validate(&desc).is_ok());
    assert_eq!(ShaderData::from_desc(handle(), desc).variant_count(), 0);
}
