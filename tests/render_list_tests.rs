//! Render list construction and sorting tests
//!
//! Tests for:
//! - Opaque/transparent partition
//! - Front-to-back and back-to-front depth ordering
//! - renderOrder and group-order precedence
//! - Stability on full key ties and the NaN depth rule
//! - Visibility pruning, frustum culling, multi-material groups
//! - Frame preparation (offsets, counters, once-per-frame refresh)

use aether::renderer::{build_render_list, GeometryFeatures, ProgramKey, ProgramRegistry, RenderInfo, RenderList};
use aether::resources::material::MaterialFeatures;
use aether::resources::{Attribute, Geometry, Material, Mesh};
use aether::scene::{Camera, Node};
use aether::{AssetServer, MaterialHandle, MaterialKind, NodeKey, Renderer, Scene};
use glam::Vec3;
use wgpu::VertexFormat;

// ============================================================================
// Harness
// ============================================================================

fn triangle_geometry() -> Geometry {
    let mut geometry = Geometry::new();
    geometry.set_attribute(
        "position",
        Attribute::new_planar(
            &[[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            VertexFormat::Float32x3,
        ),
    );
    geometry
}

fn register_basic_program(programs: &mut ProgramRegistry) {
    programs.register(
        ProgramKey {
            kind: MaterialKind::Basic,
            material_features: MaterialFeatures::empty(),
            geometry_features: GeometryFeatures::empty(),
        },
        "mesh_basic",
        [("position".to_string(), 0u32)],
        [("material".to_string(), 0u32)],
    );
}

fn test_camera() -> Camera {
    // At the origin, looking down -Z; view-space depth of a point at
    // world z = -d is d.
    Camera::new_perspective(60.0, 1.0, 0.1, 1000.0)
}

struct World {
    scene: Scene,
    assets: AssetServer,
    programs: ProgramRegistry,
    camera: Camera,
    list: RenderList,
    info: RenderInfo,
    /// One geometry shared by every `add_object` mesh, so depth tests
    /// exercise the z key instead of the geometry-identity key.
    geometry: aether::GeometryHandle,
}

impl World {
    fn new() -> Self {
        let mut programs = ProgramRegistry::new();
        register_basic_program(&mut programs);
        let mut assets = AssetServer::new();
        let geometry = assets.add_geometry(triangle_geometry());
        Self {
            scene: Scene::new(),
            assets,
            programs,
            camera: test_camera(),
            list: RenderList::new(),
            info: RenderInfo::default(),
            geometry,
        }
    }

    fn add_object(&mut self, material: MaterialHandle, position: Vec3) -> NodeKey {
        let key = self.scene.add_mesh(Mesh::new(self.geometry, material));
        self.scene.get_node_mut(key).unwrap().transform.position = position;
        key
    }

    fn build(&mut self) {
        self.scene.update_matrix_world();
        build_render_list(
            &self.scene,
            &self.camera,
            &self.assets,
            &self.programs,
            &mut self.list,
            &mut self.info,
        );
        self.list.sort();
    }
}

// ============================================================================
// Partition
// ============================================================================

#[test]
fn records_partition_by_material_transparency() {
    let mut world = World::new();
    let opaque = world.assets.add_material(Material::new_basic(Vec3::ONE));
    let transparent = world.assets.add_material({
        let mut m = Material::new_basic(Vec3::ONE);
        m.set_transparent(true);
        m
    });

    world.add_object(opaque, Vec3::new(0.0, 0.0, -3.0));
    world.add_object(transparent, Vec3::new(0.0, 0.0, -4.0));
    world.add_object(opaque, Vec3::new(0.0, 0.0, -5.0));
    world.build();

    assert_eq!(world.list.opaque.len(), 2);
    assert_eq!(world.list.transparent.len(), 1);
    assert_eq!(world.info.opaque_records, 2);
    assert_eq!(world.info.transparent_records, 1);
}

// ============================================================================
// Depth ordering
// ============================================================================

#[test]
fn opaque_records_sort_front_to_back() {
    let mut world = World::new();
    let material = world.assets.add_material(Material::new_basic(Vec3::ONE));

    // Insertion order z = 5, 1, 3.
    world.add_object(material, Vec3::new(0.0, 0.0, -5.0));
    world.add_object(material, Vec3::new(0.0, 0.0, -1.0));
    world.add_object(material, Vec3::new(0.0, 0.0, -3.0));
    world.build();

    let depths: Vec<f32> = world.list.opaque.iter().map(|r| r.z.round()).collect();
    assert_eq!(depths, vec![1.0, 3.0, 5.0]);
}

#[test]
fn transparent_records_sort_back_to_front() {
    let mut world = World::new();
    let material = world.assets.add_material({
        let mut m = Material::new_basic(Vec3::ONE);
        m.set_transparent(true);
        m
    });

    world.add_object(material, Vec3::new(0.0, 0.0, -1.0));
    world.add_object(material, Vec3::new(0.0, 0.0, -5.0));
    world.build();

    let depths: Vec<f32> = world.list.transparent.iter().map(|r| r.z.round()).collect();
    assert_eq!(depths, vec![5.0, 1.0]);
}

#[test]
fn render_order_beats_depth() {
    let mut world = World::new();
    let material = world.assets.add_material(Material::new_basic(Vec3::ONE));

    let near = world.add_object(material, Vec3::new(0.0, 0.0, -1.0));
    let far = world.add_object(material, Vec3::new(0.0, 0.0, -100.0));
    world.scene.get_node_mut(near).unwrap().render_order = -1;
    world.build();

    // The renderOrder = -1 object draws first despite depth grouping.
    assert_eq!(world.list.opaque[0].node, near);
    assert_eq!(world.list.opaque[1].node, far);
}

#[test]
fn opaque_sort_groups_by_material_before_depth() {
    let mut world = World::new();
    let material_a = world.assets.add_material(Material::new_basic(Vec3::ONE));
    let material_b = world.assets.add_material(Material::new_basic(Vec3::ONE));

    world.add_object(material_b, Vec3::new(0.0, 0.0, -1.0));
    world.add_object(material_a, Vec3::new(0.0, 0.0, -2.0));
    world.add_object(material_b, Vec3::new(0.0, 0.0, -3.0));
    world.add_object(material_a, Vec3::new(0.0, 0.0, -4.0));
    world.build();

    let ids: Vec<u32> = world.list.opaque.iter().map(|r| r.material_id).collect();
    assert_eq!(ids[0], ids[1]);
    assert_eq!(ids[2], ids[3]);
    assert!(ids[0] < ids[2]);

    // Front-to-back within each material run.
    let depths: Vec<f32> = world.list.opaque.iter().map(|r| r.z.round()).collect();
    assert_eq!(depths, vec![2.0, 4.0, 1.0, 3.0]);
}

#[test]
fn group_order_from_plain_ancestor_wins_over_depth() {
    let mut world = World::new();
    let material = world.assets.add_material(Material::new_basic(Vec3::ONE));

    // A plain node with a render order acts as a group bucket.
    let mut group = Node::new();
    group.render_order = 5;
    let group_key = world.scene.add_node(group);

    let geometry = world.assets.add_geometry(triangle_geometry());
    let grouped = world
        .scene
        .add_mesh_to_parent(Mesh::new(geometry, material), group_key);
    world.scene.get_node_mut(grouped).unwrap().transform.position = Vec3::new(0.0, 0.0, -1.0);

    let plain = world.add_object(material, Vec3::new(0.0, 0.0, -50.0));
    world.build();

    // Despite being nearest, the grouped mesh draws last.
    assert_eq!(world.list.opaque[0].node, plain);
    assert_eq!(world.list.opaque[1].node, grouped);
    assert_eq!(world.list.opaque[1].group_order, 5);
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn full_key_ties_keep_insertion_order() {
    let mut world = World::new();
    let material = world.assets.add_material(Material::new_basic(Vec3::ONE));

    // One node, two groups mapping to the same material slot: every
    // sort key matches, including the object id.
    let mut geometry = triangle_geometry();
    geometry.set_indices(&[0, 1, 2, 0, 1, 2]);
    geometry.add_group(0, 3, 0);
    geometry.add_group(3, 3, 0);
    let geometry = world.assets.add_geometry(geometry);

    let key = world
        .scene
        .add_mesh(Mesh::with_materials(geometry, &[material, material]));
    world.scene.get_node_mut(key).unwrap().transform.position = Vec3::new(0.0, 0.0, -2.0);
    world.build();

    assert_eq!(world.list.opaque.len(), 2);
    assert_eq!(world.list.opaque[0].group.unwrap().start, 0);
    assert_eq!(world.list.opaque[1].group.unwrap().start, 3);
    // Groups inherit their object's depth.
    assert_eq!(world.list.opaque[0].z, world.list.opaque[1].z);
}

#[test]
fn nan_depth_draws_last_in_opaque_pass() {
    let mut world = World::new();
    let material = world.assets.add_material(Material::new_basic(Vec3::ONE));

    // A NaN world position poisons the view-space depth. Same geometry
    // and material as the healthy objects, so only the z key differs.
    let nan_key = world.add_object(material, Vec3::new(f32::NAN, 0.0, -2.0));
    world
        .scene
        .mesh_of(nan_key)
        .unwrap()
        .frustum_culled = false;
    world.add_object(material, Vec3::new(0.0, 0.0, -5.0));
    world.add_object(material, Vec3::new(0.0, 0.0, -1.0));
    world.build();

    assert_eq!(world.list.opaque.len(), 3);
    let last = world.list.opaque.last().unwrap();
    assert_eq!(last.node, nan_key);
    assert!(last.z.is_nan());
    // The finite records are still ordered front-to-back.
    assert!(world.list.opaque[0].z < world.list.opaque[1].z);
}

// ============================================================================
// Visibility and culling
// ============================================================================

#[test]
fn invisible_node_prunes_its_subtree() {
    let mut world = World::new();
    let material = world.assets.add_material(Material::new_basic(Vec3::ONE));

    let parent = world.add_object(material, Vec3::new(0.0, 0.0, -2.0));
    let geometry = world.assets.add_geometry(triangle_geometry());
    world
        .scene
        .add_mesh_to_parent(Mesh::new(geometry, material), parent);

    world.scene.get_node_mut(parent).unwrap().visible = false;
    world.build();

    assert!(world.list.is_empty());
}

#[test]
fn culled_mesh_still_traverses_children() {
    let mut world = World::new();
    let material = world.assets.add_material(Material::new_basic(Vec3::ONE));

    // Parent far outside the frustum, child back in view.
    let parent = world.add_object(material, Vec3::new(10_000.0, 0.0, -5.0));
    let geometry = world.assets.add_geometry(triangle_geometry());
    let child = world
        .scene
        .add_mesh_to_parent(Mesh::new(geometry, material), parent);
    world.scene.get_node_mut(child).unwrap().transform.position =
        Vec3::new(-10_000.0, 0.0, 0.0);
    world.build();

    assert_eq!(world.list.opaque.len(), 1);
    assert_eq!(world.list.opaque[0].node, child);
}

#[test]
fn mesh_without_materials_emits_nothing() {
    let mut world = World::new();
    let geometry = world.assets.add_geometry(triangle_geometry());
    world.scene.add_mesh(Mesh::with_materials(geometry, &[]));
    world.build();

    assert!(world.list.is_empty());
}

#[test]
fn missing_program_skips_the_draw_not_the_frame() {
    let mut world = World::new();
    // No phong program is registered.
    let phong = world.assets.add_material(Material::new_phong(Vec3::ONE));
    let basic = world.assets.add_material(Material::new_basic(Vec3::ONE));

    world.add_object(phong, Vec3::new(0.0, 0.0, -2.0));
    world.add_object(basic, Vec3::new(0.0, 0.0, -3.0));
    world.build();

    assert_eq!(world.list.opaque.len(), 1);
    assert_eq!(world.info.skipped_records, 1);
}

#[test]
fn multi_material_mesh_emits_one_record_per_group() {
    let mut world = World::new();
    let material_a = world.assets.add_material(Material::new_basic(Vec3::ONE));
    let material_b = world.assets.add_material({
        let mut m = Material::new_basic(Vec3::ONE);
        m.set_transparent(true);
        m
    });

    let mut geometry = triangle_geometry();
    geometry.set_indices(&[0, 1, 2, 0, 1, 2]);
    geometry.add_group(0, 3, 0);
    geometry.add_group(3, 3, 1);
    let geometry = world.assets.add_geometry(geometry);

    let key = world
        .scene
        .add_mesh(Mesh::with_materials(geometry, &[material_a, material_b]));
    world.scene.get_node_mut(key).unwrap().transform.position = Vec3::new(0.0, 0.0, -2.0);
    world.build();

    // One slot per bucket, split by each slot material's transparency.
    assert_eq!(world.list.opaque.len(), 1);
    assert_eq!(world.list.transparent.len(), 1);
    assert_eq!(world.list.opaque[0].draw_range, 0..3);
    assert_eq!(world.list.transparent[0].draw_range, 3..6);
}

// ============================================================================
// Frame preparation
// ============================================================================

fn frame_world() -> (Scene, AssetServer, Renderer, NodeKey) {
    let mut scene = Scene::new();
    let mut renderer = Renderer::new();
    register_basic_program(&mut renderer.programs);
    let camera = scene.add_camera(test_camera());
    (scene, AssetServer::new(), renderer, camera)
}

#[test]
fn prepare_frame_assigns_sequential_dynamic_offsets() {
    let (mut scene, mut assets, mut renderer, camera) = frame_world();
    let material = assets.add_material(Material::new_basic(Vec3::ONE));
    let geometry = assets.add_geometry(triangle_geometry());

    for i in 0..3 {
        let key = scene.add_mesh(Mesh::new(geometry, material));
        scene.get_node_mut(key).unwrap().transform.position =
            Vec3::new(0.0, 0.0, -1.0 - i as f32);
    }

    renderer.prepare_frame(&mut scene, camera, &mut assets).unwrap();

    let offsets: Vec<u32> = renderer
        .render_list()
        .opaque
        .iter()
        .map(|r| r.dynamic_offset)
        .collect();
    assert_eq!(offsets, vec![0, 256, 512]);
    assert_eq!(renderer.model_buffer().len(), 3 * 256);
}

#[test]
fn prepare_frame_refreshes_shared_material_once() {
    let (mut scene, mut assets, mut renderer, camera) = frame_world();
    let material = assets.add_material(Material::new_basic(Vec3::ONE));
    let geometry = assets.add_geometry(triangle_geometry());

    for i in 0..4 {
        let key = scene.add_mesh(Mesh::new(geometry, material));
        scene.get_node_mut(key).unwrap().transform.position =
            Vec3::new(0.0, 0.0, -1.0 - i as f32);
    }

    renderer.prepare_frame(&mut scene, camera, &mut assets).unwrap();
    assert_eq!(renderer.info().materials_refreshed, 1);

    // Unchanged material: the next frame uploads nothing.
    renderer.prepare_frame(&mut scene, camera, &mut assets).unwrap();
    assert_eq!(renderer.info().materials_refreshed, 0);

    // A mutation makes exactly one refresh happen again.
    if let aether::resources::MaterialData::Basic(basic) =
        &mut assets.get_material_mut(material).unwrap().data
    {
        basic.set_color(Vec3::new(1.0, 0.0, 0.0));
    }
    renderer.prepare_frame(&mut scene, camera, &mut assets).unwrap();
    assert_eq!(renderer.info().materials_refreshed, 1);
}

#[test]
fn prepare_frame_reports_binding_cache_traffic() {
    let (mut scene, mut assets, mut renderer, camera) = frame_world();
    let material = assets.add_material(Material::new_basic(Vec3::ONE));
    let geometry = assets.add_geometry(triangle_geometry());

    for i in 0..5 {
        let key = scene.add_mesh(Mesh::new(geometry, material));
        scene.get_node_mut(key).unwrap().transform.position =
            Vec3::new(0.0, 0.0, -1.0 - i as f32);
    }

    renderer.prepare_frame(&mut scene, camera, &mut assets).unwrap();
    // One shared (geometry, program) signature: one build, four hits.
    assert_eq!(renderer.info().binding_misses, 1);
    assert_eq!(renderer.info().binding_hits, 4);

    renderer.prepare_frame(&mut scene, camera, &mut assets).unwrap();
    assert_eq!(renderer.info().binding_misses, 0);
    assert_eq!(renderer.info().binding_hits, 5);
}

#[test]
fn prepare_frame_requires_a_camera() {
    let (mut scene, mut assets, mut renderer, _camera) = frame_world();
    let not_a_camera = scene.add_node(Node::new());
    assert!(matches!(
        renderer.prepare_frame(&mut scene, not_a_camera, &mut assets),
        Err(aether::AetherError::CameraNotFound(_))
    ));
}
