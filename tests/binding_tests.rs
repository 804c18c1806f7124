//! Binding-state cache tests
//!
//! Tests for:
//! - Cache hits for unchanged (geometry, program, instancing) triples
//! - Rebuild on structural change, reuse on content-only change
//! - Missing program attributes (skip + disable, never misbind)
//! - Instancing step modes and interleaved slot sharing
//! - Invalidation on geometry/program disposal

use aether::renderer::{BindingKey, BindingStateCache, GeometryFeatures, ProgramKey, ProgramRegistry, ShaderProgram};
use aether::resources::material::MaterialFeatures;
use aether::resources::{Attribute, Geometry};
use aether::{AssetServer, MaterialKind};
use wgpu::{VertexFormat, VertexStepMode};

// ============================================================================
// Harness
// ============================================================================

fn mesh_geometry() -> Geometry {
    let mut geometry = Geometry::new();
    geometry.set_attribute(
        "position",
        Attribute::new_planar(
            &[[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            VertexFormat::Float32x3,
        ),
    );
    geometry.set_attribute(
        "normal",
        Attribute::new_planar(&[[0.0f32, 0.0, 1.0]; 3], VertexFormat::Float32x3),
    );
    geometry.set_indices(&[0, 1, 2]);
    geometry
}

fn register_program(
    programs: &mut ProgramRegistry,
    attributes: &[(&str, u32)],
) -> aether::ProgramId {
    programs.register(
        ProgramKey {
            kind: MaterialKind::Basic,
            material_features: MaterialFeatures::empty(),
            geometry_features: GeometryFeatures::empty(),
        },
        "mesh_basic",
        attributes
            .iter()
            .map(|&(name, location)| (name.to_string(), location)),
        [("material".to_string(), 0u32)],
    )
}

fn program<'a>(programs: &'a ProgramRegistry, id: aether::ProgramId) -> &'a ShaderProgram {
    programs.get(id).unwrap()
}

struct Setup {
    assets: AssetServer,
    programs: ProgramRegistry,
    cache: BindingStateCache,
    geometry: aether::GeometryHandle,
    program: aether::ProgramId,
}

fn setup(attributes: &[(&str, u32)]) -> Setup {
    let mut assets = AssetServer::new();
    let geometry = assets.add_geometry(mesh_geometry());
    let mut programs = ProgramRegistry::new();
    let program = register_program(&mut programs, attributes);
    Setup {
        assets,
        programs,
        cache: BindingStateCache::new(),
        geometry,
        program,
    }
}

// ============================================================================
// Hit/miss behavior
// ============================================================================

#[test]
fn repeated_binds_construct_once() {
    let mut s = setup(&[("position", 0), ("normal", 1)]);
    let key = BindingKey {
        geometry: s.geometry,
        program: s.program,
        instanced: false,
    };

    let geometry = s.assets.get_geometry(s.geometry).unwrap();
    let prog = program(&s.programs, s.program);

    let first_id = s.cache.get_or_create(key, geometry, prog).id;
    for _ in 0..999 {
        let state = s.cache.get_or_create(key, geometry, prog);
        assert_eq!(state.id, first_id);
    }

    let (hits, misses) = s.cache.stats();
    assert_eq!(misses, 1);
    assert_eq!(hits, 999);
    assert_eq!(s.cache.len(), 1);
}

#[test]
fn content_update_reuses_the_state() {
    let mut s = setup(&[("position", 0)]);
    let key = BindingKey {
        geometry: s.geometry,
        program: s.program,
        instanced: false,
    };

    let before = {
        let geometry = s.assets.get_geometry(s.geometry).unwrap();
        s.cache
            .get_or_create(key, geometry, program(&s.programs, s.program))
            .id
    };

    // Same shape, new content.
    s.assets
        .get_geometry_mut(s.geometry)
        .unwrap()
        .attribute_mut("position")
        .unwrap()
        .update_data(&[[5.0f32, 0.0, 0.0], [6.0, 0.0, 0.0], [5.0, 1.0, 0.0]]);

    let geometry = s.assets.get_geometry(s.geometry).unwrap();
    let after = s
        .cache
        .get_or_create(key, geometry, program(&s.programs, s.program))
        .id;

    assert_eq!(before, after);
    let (hits, misses) = s.cache.stats();
    assert_eq!((hits, misses), (1, 1));
}

#[test]
fn shape_change_rebuilds_the_state() {
    let mut s = setup(&[("position", 0), ("uv", 1)]);
    let key = BindingKey {
        geometry: s.geometry,
        program: s.program,
        instanced: false,
    };

    let (first_id, first_buffers) = {
        let geometry = s.assets.get_geometry(s.geometry).unwrap();
        let state = s
            .cache
            .get_or_create(key, geometry, program(&s.programs, s.program));
        (state.id, state.buffers.len())
    };
    // The uv channel does not exist yet.
    assert_eq!(first_buffers, 1);

    // Adding the attribute changes the shape signature.
    s.assets.get_geometry_mut(s.geometry).unwrap().set_attribute(
        "uv",
        Attribute::new_planar(&[[0.0f32, 0.0]; 3], VertexFormat::Float32x2),
    );

    let geometry = s.assets.get_geometry(s.geometry).unwrap();
    let state = s
        .cache
        .get_or_create(key, geometry, program(&s.programs, s.program));

    assert_ne!(state.id, first_id);
    assert_eq!(state.buffers.len(), 2);
    let (_, misses) = s.cache.stats();
    assert_eq!(misses, 2);
}

// ============================================================================
// Layout resolution
// ============================================================================

#[test]
fn missing_attribute_is_skipped_and_logged() {
    // Program wants a tangent channel the geometry cannot provide.
    let mut s = setup(&[("position", 0), ("normal", 1), ("tangent", 2)]);
    let key = BindingKey {
        geometry: s.geometry,
        program: s.program,
        instanced: false,
    };

    let geometry = s.assets.get_geometry(s.geometry).unwrap();
    let state = s
        .cache
        .get_or_create(key, geometry, program(&s.programs, s.program));

    assert_eq!(state.enabled_locations.as_slice(), &[0, 1]);
    assert_eq!(state.buffers.len(), 2);
}

#[test]
fn resolved_layout_carries_formats_and_index_binding() {
    let mut s = setup(&[("position", 0), ("normal", 1)]);
    let key = BindingKey {
        geometry: s.geometry,
        program: s.program,
        instanced: false,
    };

    let geometry = s.assets.get_geometry(s.geometry).unwrap();
    let state = s
        .cache
        .get_or_create(key, geometry, program(&s.programs, s.program));

    for binding in &state.buffers {
        assert_eq!(binding.step_mode, VertexStepMode::Vertex);
        assert_eq!(binding.stride, 12);
        assert_eq!(binding.attributes.len(), 1);
        assert_eq!(binding.attributes[0].format, VertexFormat::Float32x3);
    }
    // Locations appear in shader-location order.
    assert_eq!(state.buffers[0].attributes[0].shader_location, 0);
    assert_eq!(state.buffers[1].attributes[0].shader_location, 1);

    let (_, format, count) = state.index.as_ref().unwrap();
    assert_eq!(*format, wgpu::IndexFormat::Uint16);
    assert_eq!(*count, 3);
}

#[test]
fn instance_channels_bind_only_for_instanced_draws() {
    let mut s = setup(&[("position", 0), ("instance_offset", 1)]);
    s.assets.get_geometry_mut(s.geometry).unwrap().set_attribute(
        "instance_offset",
        Attribute::new_instanced(&[[0.0f32, 0.0, 0.0]; 8], VertexFormat::Float32x3),
    );

    let geometry = s.assets.get_geometry(s.geometry).unwrap();
    let prog = program(&s.programs, s.program);

    let plain = s.cache.get_or_create(
        BindingKey {
            geometry: s.geometry,
            program: s.program,
            instanced: false,
        },
        geometry,
        prog,
    );
    assert_eq!(plain.enabled_locations.as_slice(), &[0]);
    let plain_id = plain.id;

    let instanced = s.cache.get_or_create(
        BindingKey {
            geometry: s.geometry,
            program: s.program,
            instanced: true,
        },
        geometry,
        prog,
    );
    assert_eq!(instanced.enabled_locations.as_slice(), &[0, 1]);
    assert_ne!(instanced.id, plain_id);

    // The instance slot advances per instance, not per vertex.
    let instance_slot = instanced
        .buffers
        .iter()
        .find(|b| b.step_mode == VertexStepMode::Instance)
        .unwrap();
    assert_eq!(instance_slot.attributes[0].shader_location, 1);
}

#[test]
fn interleaved_attributes_share_one_slot() {
    let mut s = setup(&[("position", 0), ("normal", 1)]);

    // Rebuild the geometry around one interleaved buffer:
    // [position | normal] per vertex, stride 24.
    let interleaved: Vec<[f32; 6]> = vec![
        [0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
        [1.0, 0.0, 0.0, 0.0, 0.0, 1.0],
        [0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
    ];
    let buffer = aether::resources::BufferRef::new(
        &interleaved,
        wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        Some("Interleaved"),
    );
    let geometry = s.assets.get_geometry_mut(s.geometry).unwrap();
    geometry.set_attribute(
        "position",
        Attribute::new_interleaved(
            buffer.clone(),
            VertexFormat::Float32x3,
            0,
            3,
            24,
            VertexStepMode::Vertex,
        ),
    );
    geometry.set_attribute(
        "normal",
        Attribute::new_interleaved(
            buffer,
            VertexFormat::Float32x3,
            12,
            3,
            24,
            VertexStepMode::Vertex,
        ),
    );

    let geometry = s.assets.get_geometry(s.geometry).unwrap();
    let state = s.cache.get_or_create(
        BindingKey {
            geometry: s.geometry,
            program: s.program,
            instanced: false,
        },
        geometry,
        program(&s.programs, s.program),
    );

    assert_eq!(state.buffers.len(), 1);
    assert_eq!(state.buffers[0].stride, 24);
    assert_eq!(state.buffers[0].attributes.len(), 2);
    assert_eq!(state.buffers[0].attributes[1].offset, 12);
}

// ============================================================================
// Disposal
// ============================================================================

#[test]
fn removing_geometry_evicts_its_states() {
    let mut s = setup(&[("position", 0)]);
    let key = BindingKey {
        geometry: s.geometry,
        program: s.program,
        instanced: false,
    };

    {
        let geometry = s.assets.get_geometry(s.geometry).unwrap();
        s.cache
            .get_or_create(key, geometry, program(&s.programs, s.program));
    }
    assert_eq!(s.cache.len(), 1);

    s.cache.remove_geometry(s.geometry);
    assert!(s.cache.is_empty());
    assert!(s.cache.get(&key).is_none());
}

#[test]
fn removing_program_evicts_its_states() {
    let mut s = setup(&[("position", 0)]);
    let key = BindingKey {
        geometry: s.geometry,
        program: s.program,
        instanced: false,
    };

    {
        let geometry = s.assets.get_geometry(s.geometry).unwrap();
        s.cache
            .get_or_create(key, geometry, program(&s.programs, s.program));
    }

    s.cache.remove_program(s.program);
    assert!(s.cache.is_empty());
}

#[test]
fn clear_drops_everything() {
    let mut s = setup(&[("position", 0)]);
    {
        let geometry = s.assets.get_geometry(s.geometry).unwrap();
        s.cache.get_or_create(
            BindingKey {
                geometry: s.geometry,
                program: s.program,
                instanced: false,
            },
            geometry,
            program(&s.programs, s.program),
        );
    }
    s.cache.clear();
    assert!(s.cache.is_empty());
}
