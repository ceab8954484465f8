/// Tests for the built-in load jobs

use super::*;
use crate::content::MemoryContentProvider;
use crate::error::Error;
use crate::parameter::builtin;
use crate::resource::{ResourceManager, ResourceManagerDesc};
use crate::serialize::load_tasks::{load_document, LoadTaskRegistry};

// ============================================================================
// Helpers
// ============================================================================

struct Fixture {
    manager: Arc<ResourceManager>,
    provider: Arc<MemoryContentProvider>,
}

fn fixture() -> Fixture {
    let provider = Arc::new(MemoryContentProvider::new());
    let manager = ResourceManager::new(ResourceManagerDesc {
        provider: provider.clone(),
        ..ResourceManagerDesc::default()
    });
    Fixture { manager, provider }
}

fn params_for(manager: &Arc<ResourceManager>) -> ParameterSet {
    ParameterSet::new().with(builtin::RESOURCE_MANAGER, manager.clone())
}

fn load(params: &ParameterSet, source: &str) -> Result<usize> {
    let registry = LoadTaskRegistry::with_builtin()?;
    let root = XmlNode::parse(source)?;
    Ok(load_document(&root, params, &registry)?.resources)
}

// ============================================================================
// Tests: DocumentLoader
// ============================================================================

#[test]
fn test_physics_materials_loaded() {
    let f = fixture();
    let params = params_for(&f.manager);
    let count = load(
        &params,
        r#"<scene><physicsmaterials>
             <m name="Red" static_friction="0.9" dynamic_friction="0.8" restitution="0.1"/>
             <m name="Ice" static_friction="0.05"/>
           </physicsmaterials></scene>"#,
    )
    .unwrap();

    assert_eq!(count, 2);
    let cache = f.manager.physics_materials().unwrap();
    let red = cache.get_by_name("Red", true).unwrap().unwrap();
    assert!((red.read().restitution() - 0.1).abs() < 1e-6);
    // Missing attributes keep defaults
    let ice = cache.get_by_name("Ice", true).unwrap().unwrap();
    assert_eq!(ice.read().dynamic_friction(), 0.5);
}

#[test]
fn test_entry_without_name() {
    let f = fixture();
    let params = params_for(&f.manager);
    let result = load(&params, r#"<physicsmaterials><m restitution="1"/></physicsmaterials>"#);
    assert!(matches!(result, Err(Error::MalformedDocument(_))));
}

#[test]
fn test_name_collision() {
    let f = fixture();
    let cache = f.manager.physics_materials().unwrap();
    let existing = cache.create(PhysicsMaterial::new(0.3, 0.3, 0.3), "Red").unwrap();
    let source = r#"<physicsmaterials><m name="Red" restitution="0.9"/><m name="Blue"/></physicsmaterials>"#;

    let params = params_for(&f.manager);
    assert!(matches!(load(&params, source), Err(Error::AlreadyExists(_))));

    let params = params_for(&f.manager).with(builtin::NO_OVERWRITE, true);
    assert_eq!(load(&params, source).unwrap(), 1);
    let red = cache.get_by_name("Red", true).unwrap().unwrap();
    assert!(Arc::ptr_eq(&red, &existing));
    assert_eq!(red.read().restitution(), 0.3);
    assert!(cache.get_by_name("Blue", false).unwrap().is_some());
}

#[test]
fn test_unknown_entry_tag_ignored() {
    let f = fixture();
    let params = params_for(&f.manager);
    let count = load(
        &params,
        r#"<physicsmaterials><note text="hi"/><m name="A"/></physicsmaterials>"#,
    )
    .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_kind_missing_from_manager() {
    let manager = ResourceManager::physics(ResourceManagerDesc::default());
    let params = params_for(&manager);
    let result = load(&params, r#"<materials><m name="wood"/></materials>"#);
    assert!(matches!(result, Err(Error::UnknownComponent(_))));
}

// ============================================================================
// Tests: ReferenceLoader
// ============================================================================

#[test]
fn test_references_loaded_and_named() {
    let f = fixture();
    f.provider.insert("/mem/wood.dds", vec![1u8, 2]);
    f.provider.insert("/mem/lit.fx", "lit".as_bytes());
    let params = params_for(&f.manager);

    let count = load(
        &params,
        r#"<scene>
             <textures><t name="wood_tex" file="/mem/wood.dds"/></textures>
             <effects><e file="/mem/lit.fx"/></effects>
           </scene>"#,
    )
    .unwrap();

    assert_eq!(count, 2);
    let texture = f.manager.textures().unwrap().get_by_name("wood_tex", true).unwrap().unwrap();
    assert_eq!(texture.read().pixels(), &[1u8, 2]);
    assert_eq!(f.manager.effects().unwrap().len(), 1);
}

#[test]
fn test_reference_already_loaded_is_shared() {
    let f = fixture();
    f.provider.insert("/mem/wood.dds", vec![1u8]);
    let textures = f.manager.textures().unwrap();
    let loaded = textures.get_by_file("/mem/wood.dds", true).unwrap().unwrap();
    textures.set_name(&loaded, "wood_tex").unwrap();

    let params = params_for(&f.manager);
    let count = load(&params, r#"<textures><t name="wood_tex" file="/mem/wood.dds"/></textures>"#).unwrap();

    assert_eq!(count, 0);
    assert_eq!(textures.len(), 1);
    assert!(Arc::ptr_eq(&textures.get_by_name("wood_tex", true).unwrap().unwrap(), &loaded));
}

#[test]
fn test_reference_name_taken_by_other_file() {
    let f = fixture();
    f.provider.insert("/mem/a.dds", vec![1u8]);
    f.provider.insert("/mem/b.dds", vec![2u8]);
    let textures = f.manager.textures().unwrap();
    let a = textures.get_by_file("/mem/a.dds", true).unwrap().unwrap();
    textures.set_name(&a, "tex").unwrap();
    let source = r#"<textures><t name="tex" file="/mem/b.dds"/></textures>"#;

    let params = params_for(&f.manager);
    assert!(matches!(load(&params, source), Err(Error::AlreadyExists(_))));

    let params = params_for(&f.manager).with(builtin::NO_OVERWRITE, true);
    assert_eq!(load(&params, source).unwrap(), 0);
    assert!(Arc::ptr_eq(&textures.get_by_name("tex", true).unwrap().unwrap(), &a));
}

#[test]
fn test_reference_missing_file() {
    let f = fixture();
    let params = params_for(&f.manager);
    let result = load(&params, r#"<effects><e name="x" file="/mem/none.fx"/></effects>"#);
    assert!(matches!(result, Err(Error::NotFound(_))));

    let result = load(&params, r#"<effects><e name="x"/></effects>"#);
    assert!(matches!(result, Err(Error::MalformedDocument(_))));
}

// ============================================================================
// Tests: Cross-kind ordering
// ============================================================================

#[test]
fn test_materials_resolve_after_references() {
    let f = fixture();
    f.provider.insert("/mem/wood.dds", vec![1u8]);
    f.provider.insert("/mem/lit.fx", "lit".as_bytes());
    let params = params_for(&f.manager);

    // Materials come first in the document but load last
    load(
        &params,
        r#"<scene>
             <materials><m name="wood" effect="/mem/lit.fx" diffuse_texture="wood_tex" specular_power="8"/></materials>
             <effects><e file="/mem/lit.fx"/></effects>
             <textures><t name="wood_tex" file="/mem/wood.dds"/></textures>
           </scene>"#,
    )
    .unwrap();

    let wood = f.manager.materials().unwrap().get_by_name("wood", true).unwrap().unwrap();
    let wood = wood.read();
    assert_eq!(wood.specular_power(), 8.0);
    assert!(wood.effect().is_some());
    let texture = f.manager.textures().unwrap().get_by_name("wood_tex", true).unwrap().unwrap();
    assert!(Arc::ptr_eq(wood.diffuse_texture().unwrap(), &texture));
}
