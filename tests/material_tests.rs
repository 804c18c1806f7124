//! Material and uniform refresh tests
//!
//! Tests for:
//! - Settings versioning and declared-state pass-through
//! - Uniform write-through with change detection (idempotence)
//! - Closed-variant dispatch (kind, shader name, features)
//! - Once-per-frame refresh tracking
//! - Morph influence selection (8-slot rule)

use aether::renderer::{MaterialStateTracker, MorphTracker, Viewport, MAX_MORPH_TARGETS};
use aether::resources::material::{
    Blending, MaterialFeatures, PointsMaterial, ShaderMaterial, StandardMaterial,
};
use aether::resources::{Material, MaterialData, MaterialKind, Side};
use aether::AssetServer;
use glam::Vec3;
use slotmap::Key;

// ============================================================================
// Settings
// ============================================================================

#[test]
fn settings_mutation_bumps_version_once_per_change() {
    let mut material = Material::new_basic(Vec3::ONE);
    let v0 = material.version();

    material.set_transparent(true);
    let v1 = material.version();
    assert!(v1 > v0);

    // Same value again: no bump.
    material.set_transparent(true);
    assert_eq!(material.version(), v1);

    material.set_depth_write(false);
    material.set_side(Side::Double);
    material.set_blending(Blending::Additive);
    assert!(material.version() > v1);
}

#[test]
fn declared_depth_flags_are_respected_not_overridden() {
    // Transparent materials conventionally disable depth writes, but
    // the declaration is the application's call; nothing flips it
    // silently.
    let mut material = Material::new_basic(Vec3::ONE);
    material.set_transparent(true);
    assert!(material.depth_write());

    material.set_depth_write(false);
    assert!(material.transparent());
    assert!(!material.depth_write());
    assert!(material.depth_test());
}

#[test]
fn side_maps_to_cull_mode() {
    assert_eq!(Side::Front.cull_mode(), Some(wgpu::Face::Back));
    assert_eq!(Side::Back.cull_mode(), Some(wgpu::Face::Front));
    assert_eq!(Side::Double.cull_mode(), None);
}

// ============================================================================
// Uniform write-through
// ============================================================================

#[test]
fn uniform_writes_are_idempotent() {
    let mut standard = StandardMaterial::new(Vec3::ONE);
    standard.set_roughness(0.25);
    let mut material = Material::from(standard);
    let v0 = material.uniform_version();

    // Re-writing the same value must not move the version.
    if let MaterialData::Standard(s) = &mut material.data {
        s.set_roughness(0.25);
        assert_eq!(s.roughness(), 0.25);
    }
    assert_eq!(material.uniform_version(), v0);

    // An actual change does.
    if let MaterialData::Standard(s) = &mut material.data {
        s.set_roughness(0.5);
    }
    assert!(material.uniform_version() > v0);
}

// ============================================================================
// Variant dispatch
// ============================================================================

#[test]
fn kinds_and_shader_names_are_stable() {
    let material = Material::new_phong(Vec3::ONE);
    assert_eq!(material.kind(), MaterialKind::Phong);
    assert_eq!(material.shader_name(), "mesh_phong");

    let custom = Material::new(MaterialData::Shader(ShaderMaterial::new("my_effect")));
    assert_eq!(custom.kind(), MaterialKind::Shader);
    assert_eq!(custom.shader_name(), "my_effect");
}

#[test]
fn features_follow_texture_slots() {
    let mut assets = AssetServer::new();
    let texture = assets.add_texture(aether::assets::Texture::default());

    let plain = Material::new_standard(Vec3::ONE);
    assert!(plain.features().is_empty());

    let mut standard = StandardMaterial::new(Vec3::ONE);
    standard.normal_map = Some(texture);
    standard.roughness_map = Some(texture);
    let material = Material::from(standard);
    assert!(material.features().contains(MaterialFeatures::USE_NORMAL_MAP));
    assert!(material
        .features()
        .contains(MaterialFeatures::USE_ROUGHNESS_MAP));
    assert!(!material.features().contains(MaterialFeatures::USE_MAP));
}

#[test]
fn material_ids_are_monotonic() {
    let a = Material::new_basic(Vec3::ONE);
    let b = Material::new_basic(Vec3::ONE);
    assert!(a.id() < b.id());
}

#[test]
fn custom_shader_uniform_bytes_roundtrip() {
    let mut custom = ShaderMaterial::new("my_effect");
    custom.set_uniform_bytes(&[1, 2, 3, 4]);
    let material = Material::new(MaterialData::Shader(custom));

    assert_eq!(material.data.uniform_bytes(), &[1u8, 2, 3, 4][..]);
    let v = material.uniform_version();

    // Identical payload: no version movement.
    if let MaterialData::Shader(m) = &material.data {
        assert_eq!(m.shader_name(), "my_effect");
    }
    assert_eq!(material.uniform_version(), v);
}

// ============================================================================
// Once-per-frame refresh
// ============================================================================

#[test]
fn refresh_runs_once_per_material_per_frame() {
    let mut assets = AssetServer::new();
    let handle = assets.add_material(Material::new_basic(Vec3::ONE));
    let mut tracker = MaterialStateTracker::new();
    let viewport = Viewport::default();

    let material = assets.get_material_mut(handle).unwrap();
    // First sighting uploads.
    assert!(tracker.refresh(1, handle, material, &viewport));
    // Same frame, shared by another mesh: no second refresh.
    assert!(!tracker.refresh(1, handle, material, &viewport));
    // Next frame, unchanged: seen, but nothing to upload.
    assert!(!tracker.refresh(2, handle, material, &viewport));

    if let MaterialData::Basic(basic) = &mut material.data {
        basic.set_opacity(0.5);
    }
    assert!(tracker.refresh(3, handle, material, &viewport));
}

#[test]
fn points_refresh_derives_viewport_scale() {
    let mut assets = AssetServer::new();
    let handle = assets.add_material(Material::from(PointsMaterial::new(Vec3::ONE, 4.0)));
    let mut tracker = MaterialStateTracker::new();
    let viewport = Viewport {
        width: 800,
        height: 600,
        pixel_ratio: 2.0,
    };

    let material = assets.get_material_mut(handle).unwrap();
    tracker.refresh(1, handle, material, &viewport);

    if let MaterialData::Points(points) = &material.data {
        // height * pixel_ratio * 0.5
        assert!((points.scale() - 600.0).abs() < 1e-5);
    } else {
        panic!("expected points material");
    }

    // Idempotent: a second frame with the same viewport changes nothing.
    let v = material.uniform_version();
    tracker.refresh(2, handle, material, &viewport);
    assert_eq!(material.uniform_version(), v);
}

// ============================================================================
// Morph influence selection
// ============================================================================

fn mesh_key(index: u64) -> aether::scene::MeshKey {
    // Fabricate distinct keys for tracker tests.
    slotmap::KeyData::from_ffi((index << 32) | index).into()
}

#[test]
fn only_nonzero_influences_are_selected() {
    let mut tracker = MorphTracker::new();
    let mut influences = vec![0.0f32; 10];
    influences[1] = 0.5;
    influences[3] = 0.2;
    influences[9] = 0.1;

    let uniforms = tracker.update(mesh_key(1), &influences, false).read();

    assert_eq!(uniforms.target_count, 3);
    // Active slots are re-sorted by target index.
    assert_eq!(&uniforms.indices[..3], &[1, 3, 9]);
    assert_eq!(&uniforms.influences[..3], &[0.5, 0.2, 0.1]);
    // Absolute morphs: base carries the remainder.
    assert!((uniforms.base_influence - 0.2).abs() < 1e-5);
}

#[test]
fn selection_caps_at_eight_strongest_by_magnitude() {
    let mut tracker = MorphTracker::new();
    // 12 targets, influence grows with the index; negative values count
    // by absolute magnitude.
    let influences: Vec<f32> = (0..12)
        .map(|i| if i == 11 { -0.95 } else { i as f32 * 0.05 })
        .collect();

    let uniforms = tracker.update(mesh_key(2), &influences, true).read();

    assert_eq!(uniforms.target_count as usize, MAX_MORPH_TARGETS);
    // The eight largest magnitudes are targets 4..=10 plus 11.
    assert_eq!(&uniforms.indices[..8], &[4, 5, 6, 7, 8, 9, 10, 11]);
    // Relative morphs keep a unit base influence.
    assert!((uniforms.base_influence - 1.0).abs() < 1e-5);
}

#[test]
fn unchanged_influences_reuse_the_selection() {
    let mut tracker = MorphTracker::new();
    let influences = [0.3f32, 0.0, 0.7];

    let v0 = tracker.update(mesh_key(3), &influences, false).version();
    let v1 = tracker.update(mesh_key(3), &influences, false).version();
    assert_eq!(v0, v1);

    let changed = [0.3f32, 0.1, 0.7];
    let v2 = tracker.update(mesh_key(3), &changed, false).version();
    assert!(v2 > v1);
}

#[test]
fn zero_influences_select_nothing() {
    let mut tracker = MorphTracker::new();
    let uniforms = tracker.update(mesh_key(4), &[0.0f32; 6], false).read();
    assert_eq!(uniforms.target_count, 0);
    assert!((uniforms.base_influence - 1.0).abs() < 1e-5);
}

#[test]
fn fabricated_mesh_keys_are_distinct() {
    assert_ne!(mesh_key(1), mesh_key(2));
    assert!(!mesh_key(1).is_null());
}
