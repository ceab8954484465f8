//! Integration tests for the Engine registries and parameter passing
//!
//! Tools reach every resource kind through the component registry, with a
//! ParameterSet carrying the manager they work on.

use std::sync::Arc;
use galaxy_3d_cache::galaxy3d::component::{ComponentFlags, ComponentType, PropertyValue};
use galaxy_3d_cache::galaxy3d::cache::ComponentState;
use galaxy_3d_cache::galaxy3d::parameter::{builtin, ParameterLayout, ParameterSet};
use galaxy_3d_cache::galaxy3d::path::{FileSystemPathResolver, PathResolver};
use galaxy_3d_cache::galaxy3d::resource::{Material, ResourceManager, ResourceManagerDesc};
use galaxy_3d_cache::galaxy3d::{Engine, Error};
use serial_test::serial;

// ============================================================================
// PARAMETERS
// ============================================================================

#[test]
fn test_integration_parameter_round_trip() {
    let layout = ParameterLayout::global();
    let lod_bias = layout.register("Test::LodBias");
    assert_eq!(layout.register("Test::LodBias"), lod_bias);
    assert_eq!(layout.id("NoOverwrite"), Some(builtin::NO_OVERWRITE));

    let mut params = ParameterSet::new()
        .with(lod_bias, 1.5f32)
        .with(builtin::NO_OVERWRITE, true);

    assert_eq!(params.get::<f32>(lod_bias), Some(&1.5));
    assert!(params.no_overwrite());
    // Wrong type and missing slot both fail checked reads
    assert!(matches!(params.value_checked::<u32>(lod_bias), Err(Error::InvalidParameter(_))));
    assert!(matches!(params.resource_manager(), Err(Error::InvalidParameter(_))));

    params.remove(builtin::NO_OVERWRITE);
    assert!(!params.no_overwrite());
}

// ============================================================================
// REGISTRY
// ============================================================================

#[test]
#[serial]
fn test_integration_every_kind_reflected() {
    Engine::initialize().unwrap();
    let registry = Engine::component_registry().unwrap();

    for component_type in ComponentType::BUILTIN {
        let reflector = registry.reflector_for(&component_type).unwrap();
        assert_eq!(reflector.component_type(), component_type);
        assert_eq!(reflector.file_extension(), component_type.file_extension());
    }
    let material = registry.reflector("Material").unwrap();
    assert!(material.flags().contains(ComponentFlags::CREATABLE | ComponentFlags::FILE_MUTABLE));
}

#[test]
#[serial]
fn test_integration_two_managers_one_reflector() {
    Engine::initialize().unwrap();
    let reflector = Engine::component_registry().unwrap().reflector("Material").unwrap();

    let editor = ResourceManager::new(ResourceManagerDesc::default());
    let game = ResourceManager::scene(ResourceManagerDesc::default());
    let editor_params = ParameterSet::new().with(builtin::RESOURCE_MANAGER, editor.clone());
    let game_params = ParameterSet::new().with(builtin::RESOURCE_MANAGER, game.clone());

    reflector
        .create_component("wood", &[("specular_power", PropertyValue::Float(4.0))], &editor_params, None, None)
        .unwrap();

    assert_eq!(reflector.component_info(&editor_params).unwrap().len(), 1);
    assert!(reflector.component_info(&game_params).unwrap().is_empty());
    assert!(game.materials().unwrap().get_by_name("wood", false).unwrap().is_none());
}

#[test]
#[serial]
fn test_integration_save_component_through_file_system() {
    Engine::initialize().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file_system = Engine::file_system().unwrap();
    file_system.add_search_root(dir.path());

    let resolver = FileSystemPathResolver::new(dir.path(), file_system.clone());
    let manager = ResourceManager::new(ResourceManagerDesc {
        resolver: Box::new(resolver.clone()),
        ..ResourceManagerDesc::default()
    });
    let params = ParameterSet::new().with(builtin::RESOURCE_MANAGER, manager.clone());
    let reflector = Engine::component_registry().unwrap().reflector("Material").unwrap();
    let wood = reflector
        .create_component("wood", &[("two_sided", PropertyValue::Bool(true))], &params, None, None)
        .unwrap();

    let saved = reflector
        .save_component(&wood, &dir.path().join("wood.material"), &params)
        .unwrap();
    assert_eq!(resolver.resolve("wood.material", true).unwrap(), saved);
    assert_eq!(reflector.component_state(&wood, &params).unwrap(), ComponentState::Filed);

    // A fresh manager loads it back by relative name
    let other = ResourceManager::new(ResourceManagerDesc {
        resolver: Box::new(resolver),
        ..ResourceManagerDesc::default()
    });
    let loaded = other.materials().unwrap().get_by_file("wood.material", true).unwrap().unwrap();
    assert!(loaded.read().two_sided());
    assert!(!Arc::ptr_eq(&loaded, &wood.downcast::<Material>().unwrap()));

    file_system.remove_search_root(dir.path());
}
