/// Tests for CacheReflector
///
/// Every call goes through the `ComponentReflector` trait object with a
/// ParameterSet carrying the resource manager, the way tools drive it.

use super::*;
use glam::Vec3;
use crate::cache::Resource;
use crate::content::MemoryContentProvider;
use crate::error::Error;
use crate::parameter::builtin;
use crate::resource::{ResourceManagerDesc, SubMesh};

// ============================================================================
// Helpers
// ============================================================================

fn manager() -> Arc<ResourceManager> {
    ResourceManager::new(ResourceManagerDesc::default())
}

fn params_for(manager: &Arc<ResourceManager>) -> ParameterSet {
    ParameterSet::new().with(builtin::RESOURCE_MANAGER, manager.clone())
}

fn reflector<T: ReflectedComponent>() -> Arc<dyn ComponentReflector> {
    Arc::new(CacheReflector::<T>::new())
}

// ============================================================================
// Tests: Flags and type
// ============================================================================

#[test]
fn test_flags_per_kind() {
    assert_eq!(reflector::<Material>().flags(), ComponentFlags::all());
    assert_eq!(reflector::<PhysicsMaterial>().flags(), ComponentFlags::all());

    let texture = reflector::<Texture>().flags();
    assert!(texture.contains(ComponentFlags::CLONEABLE | ComponentFlags::NAME_MUTABLE));
    assert!(!texture.contains(ComponentFlags::CREATABLE));
    assert!(!texture.contains(ComponentFlags::FILE_MUTABLE));
}

#[test]
fn test_file_extension() {
    assert_eq!(reflector::<Material>().file_extension(), "material");
    assert_eq!(reflector::<Shape>().file_extension(), "shape");
    assert_eq!(reflector::<Mesh>().component_type(), ComponentType::MESH);
}

// ============================================================================
// Tests: Creation
// ============================================================================

#[test]
fn test_create_with_properties() {
    let manager = manager();
    let params = params_for(&manager);
    let reflector = reflector::<PhysicsMaterial>();

    let component = reflector
        .create_component("Red", &[("restitution", PropertyValue::Float(0.1))], &params, None, None)
        .unwrap();

    let found = reflector.component_by_name("Red", &params, true).unwrap().unwrap();
    assert!(found.ptr_eq(&component));
    let material = component.downcast::<PhysicsMaterial>().unwrap();
    assert!((material.read().restitution() - 0.1).abs() < 1e-6);
    assert_eq!(reflector.component_state(&component, &params).unwrap(), ComponentState::Named);
}

#[test]
fn test_create_rejects_unknown_property() {
    let manager = manager();
    let params = params_for(&manager);
    let result = reflector::<Material>().create_component(
        "x", &[("shininess", PropertyValue::Float(1.0))], &params, None, None,
    );
    assert!(matches!(result, Err(Error::InvalidParameter(_))));
    assert!(manager.materials().unwrap().is_empty());
}

#[test]
fn test_create_from_prototype() {
    let manager = manager();
    let params = params_for(&manager);
    let reflector = reflector::<Material>();
    let prototype = reflector
        .create_component(
            "base",
            &[("specular_power", PropertyValue::Float(48.0)), ("two_sided", PropertyValue::Bool(true))],
            &params,
            None,
            None,
        )
        .unwrap();

    let copy = reflector
        .create_component("copy", &[("two_sided", PropertyValue::Bool(false))], &params, Some(&prototype), None)
        .unwrap();

    let copy = copy.downcast::<Material>().unwrap();
    assert_eq!(copy.read().specular_power(), 48.0);
    assert!(!copy.read().two_sided());
}

#[test]
fn test_mesh_prototype_copies_submeshes() {
    let manager = manager();
    let params = params_for(&manager);
    let mut data = Mesh::new();
    data.add_submesh(SubMesh::new("body", "wood", 0, 36));
    data.set_bounds(Vec3::NEG_ONE, Vec3::ONE);
    let original = manager.meshes().unwrap().create(data, "crate").unwrap();

    let copy = reflector::<Mesh>()
        .create_component("crate2", &[], &params, Some(&Component::new(original)), None)
        .unwrap()
        .downcast::<Mesh>()
        .unwrap();

    assert_eq!(copy.read().submeshes().len(), 1);
    assert_eq!(copy.read().bounds().0, Vec3::NEG_ONE);
}

#[test]
fn test_create_resolves_references() {
    let manager = manager();
    let params = params_for(&manager);
    let effect = manager.effects().unwrap().create(Effect::new("lit", "fx".as_bytes(), None), "lit").unwrap();

    let material = reflector::<Material>()
        .create_component("red", &[("effect", PropertyValue::String("lit".into()))], &params, None, None)
        .unwrap()
        .downcast::<Material>()
        .unwrap();

    assert!(Arc::ptr_eq(material.read().effect().unwrap(), &effect));
    assert!(effect.dependencies().contains(&crate::cache::as_node(&material)));
}

#[test]
fn test_create_replacing() {
    let manager = manager();
    let params = params_for(&manager);
    let reflector = reflector::<PhysicsMaterial>();
    let old = reflector.create_component("Ice", &[], &params, None, None).unwrap();

    let new = reflector
        .create_component("", &[("static_friction", PropertyValue::Float(0.05))], &params, None, Some(&old))
        .unwrap();

    let found = reflector.component_by_name("Ice", &params, true).unwrap().unwrap();
    assert!(found.ptr_eq(&new));
    assert_eq!(reflector.component_state(&old, &params).unwrap(), ComponentState::Unknown);
    assert_eq!(manager.physics_materials().unwrap().len(), 1);
}

#[test]
fn test_create_replacing_with_taken_name_rejected() {
    let manager = manager();
    let params = params_for(&manager);
    let cache = manager.physics_materials().unwrap();
    cache.set_binding_policy(BindingPolicy::Reject);
    let reflector = reflector::<PhysicsMaterial>();
    let old = reflector.create_component("Ice", &[], &params, None, None).unwrap();
    reflector.create_component("Red", &[], &params, None, None).unwrap();

    let result = reflector.create_component("Red", &[], &params, None, Some(&old));
    assert!(matches!(result, Err(Error::AlreadyExists(_))));

    // Nothing was replaced
    let found = reflector.component_by_name("Ice", &params, true).unwrap().unwrap();
    assert!(found.ptr_eq(&old));
    assert_eq!(reflector.component_state(&old, &params).unwrap(), ComponentState::Named);
    assert_eq!(cache.len(), 2);

    // Keeping its own name is not a collision
    let new = reflector.create_component("Ice", &[], &params, None, Some(&old)).unwrap();
    assert!(reflector.component_by_name("Ice", &params, true).unwrap().unwrap().ptr_eq(&new));
}

#[test]
fn test_binary_kind_requires_prototype() {
    let manager = manager();
    let params = params_for(&manager);
    let result = reflector::<Texture>().create_component("t", &[], &params, None, None);
    assert!(matches!(result, Err(Error::InvalidParameter(_))));
}

#[test]
fn test_binary_kind_clone() {
    let manager = manager();
    let params = params_for(&manager);
    let original = manager.textures().unwrap()
        .create(Texture::new("wood", vec![3u8; 8], None), "wood").unwrap();

    let clone = reflector::<Texture>()
        .create_component("wood2", &[], &params, Some(&Component::new(original)), None)
        .unwrap()
        .downcast::<Texture>()
        .unwrap();

    assert_eq!(clone.read().pixels(), &[3u8; 8]);
    // The clone is attached to the manager's device
    assert_eq!(manager.textures().unwrap().pending_commits(), 1);
    manager.commit().unwrap();
    assert!(clone.read().image().is_some());
}

#[test]
fn test_prototype_of_wrong_kind() {
    let manager = manager();
    let params = params_for(&manager);
    let texture = manager.textures().unwrap().create(Texture::new("t", vec![0u8], None), "").unwrap();

    let result = reflector::<Material>()
        .create_component("m", &[], &params, Some(&Component::new(texture)), None);
    assert!(matches!(result, Err(Error::UnknownComponent(_))));
}

#[test]
fn test_missing_manager_slot() {
    let params = ParameterSet::new();
    assert!(matches!(
        reflector::<Material>().component_info(&params),
        Err(Error::InvalidParameter(_))
    ));
}

#[test]
fn test_kind_missing_from_manager() {
    let manager = ResourceManager::physics(ResourceManagerDesc::default());
    let params = params_for(&manager);
    assert!(matches!(
        reflector::<Material>().component_by_name("x", &params, false),
        Err(Error::UnknownComponent(_))
    ));
}

// ============================================================================
// Tests: Lookup, naming and listing
// ============================================================================

#[test]
fn test_component_by_file() {
    let provider = Arc::new(MemoryContentProvider::new());
    provider.insert("/mem/grass.physicsmaterial", "<physicsmaterial dynamic_friction=\"0.7\"/>".as_bytes());
    let manager = ResourceManager::new(ResourceManagerDesc {
        provider: provider.clone(),
        ..ResourceManagerDesc::default()
    });
    let params = params_for(&manager);
    let reflector = reflector::<PhysicsMaterial>();

    let first = reflector.component_by_file("/mem/grass.physicsmaterial", &params, true).unwrap().unwrap();
    let second = reflector.component_by_file("/mem/grass.physicsmaterial", &params, true).unwrap().unwrap();
    assert!(first.ptr_eq(&second));
    assert_eq!(reflector.component_state(&first, &params).unwrap(), ComponentState::Filed);
    assert!(reflector.component_by_file("/mem/none", &params, false).unwrap().is_none());
}

#[test]
fn test_set_name_unowned_component() {
    let manager = manager();
    let params = params_for(&manager);
    let loose = Component::new(Resource::new(Material::default()));

    let reflector = reflector::<Material>();
    assert!(matches!(reflector.set_name(&loose, "x", &params), Err(Error::UnknownComponent(_))));
    assert_eq!(reflector.component_state(&loose, &params).unwrap(), ComponentState::Unknown);
}

#[test]
fn test_set_name_renames() {
    let manager = manager();
    let params = params_for(&manager);
    let reflector = reflector::<Effect>();
    let effect = manager.effects().unwrap().create(Effect::new("fx", "x".as_bytes(), None), "old").unwrap();
    let component = Component::new(effect);

    reflector.set_name(&component, "new", &params).unwrap();
    assert!(reflector.component_by_name("old", &params, false).unwrap().is_none());
    assert!(reflector.component_by_name("new", &params, true).unwrap().unwrap().ptr_eq(&component));
}

#[test]
fn test_set_file_requires_capability() {
    let manager = manager();
    let params = params_for(&manager);
    let shape = manager.shapes().unwrap().create(Shape::new("s", vec![1u8], None), "s").unwrap();
    let result = reflector::<Shape>().set_file(&Component::new(shape), Path::new("/tmp/s.shape"), &params);
    assert!(matches!(result, Err(Error::InvalidParameter(_))));
}

#[test]
fn test_component_info_in_insertion_order() {
    let manager = manager();
    let params = params_for(&manager);
    let reflector = reflector::<Material>();
    reflector.create_component("b", &[], &params, None, None).unwrap();
    reflector.create_component("", &[], &params, None, None).unwrap();
    reflector.create_component("a", &[], &params, None, None).unwrap();

    let info = reflector.component_info(&params).unwrap();
    let names: Vec<&str> = info.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["b", "", "a"]);
    assert_eq!(info[1].state, ComponentState::Unknown);
    assert_eq!(info[0].component.component_type(), ComponentType::MATERIAL);
}

// ============================================================================
// Tests: Saving
// ============================================================================

#[test]
fn test_save_component() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager();
    let params = params_for(&manager);
    let reflector = reflector::<PhysicsMaterial>();
    let component = reflector
        .create_component("Red", &[("static_friction", PropertyValue::Float(0.9))], &params, None, None)
        .unwrap();

    let path = reflector
        .save_component(&component, &dir.path().join("red.physicsmaterial"), &params)
        .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("<physicsmaterial"));
    assert!(text.contains("name=\"Red\""));
    assert_eq!(reflector.component_state(&component, &params).unwrap(), ComponentState::Filed);

    let reloaded = reflector
        .component_by_file(path.to_str().unwrap(), &params, true)
        .unwrap()
        .unwrap();
    assert!(reloaded.ptr_eq(&component));
}

#[test]
fn test_save_binary_kind_rejected() {
    let manager = manager();
    let params = params_for(&manager);
    let effect = manager.effects().unwrap().create(Effect::new("fx", "x".as_bytes(), None), "fx").unwrap();
    let result = reflector::<Effect>().save_component(&Component::new(effect), Path::new("/tmp/fx.fx"), &params);
    assert!(matches!(result, Err(Error::InvalidParameter(_))));
}
