//! Render-list construction.
//!
//! Walks the visible scene graph once per frame and emits one sortable
//! [`RenderRecord`] per (node, material slot) pair. Reads world
//! matrices, geometry and materials; mutates nothing but the output
//! list and counters.

use glam::{Mat4, Vec3};

use crate::assets::AssetServer;
use crate::renderer::info::RenderInfo;
use crate::renderer::program::{GeometryFeatures, ProgramKey, ProgramRegistry};
use crate::renderer::render_list::{RenderList, RenderRecord};
use crate::resources::geometry::Geometry;
use crate::resources::mesh::Mesh;
use crate::scene::camera::Camera;
use crate::scene::node::Node;
use crate::scene::scene::Scene;
use crate::scene::NodeKey;

/// Shader-variant flags contributed by the geometry and the mesh/node
/// state (skinning, morphing, instancing).
#[must_use]
pub fn geometry_features(geometry: &Geometry, mesh: &Mesh, node: &Node) -> GeometryFeatures {
    let mut features = GeometryFeatures::empty();
    if geometry.attribute("normal").is_some() {
        features |= GeometryFeatures::USE_NORMAL;
    }
    if geometry.attribute("uv").is_some() {
        features |= GeometryFeatures::USE_UV;
    }
    if geometry.attribute("color").is_some() {
        features |= GeometryFeatures::USE_VERTEX_COLOR;
    }
    if node.skin.is_some() {
        features |= GeometryFeatures::USE_SKINNING;
    }
    if geometry.morph_target_count() > 0 && !mesh.morph_influences.is_empty() {
        features |= GeometryFeatures::USE_MORPH_TARGETS;
    }
    if mesh.instance_count.is_some() {
        features |= GeometryFeatures::USE_INSTANCING;
    }
    features
}

/// Builds the opaque/transparent buckets for one camera view.
///
/// Traversal rules, in order:
/// - an invisible node prunes its whole subtree;
/// - a node without a mesh but with a non-zero `render_order` becomes
///   the group-order bucket for its descendants;
/// - a mesh outside the frustum emits no records, but its children are
///   still traversed;
/// - one record per material slot: the whole geometry for
///   single-material meshes, one per geometry group otherwise.
///
/// Depth is the signed distance of the object's reference point (its
/// bounding-sphere center, or the node origin without bounds) along the
/// camera's view direction. Groups inherit their object's depth.
pub fn build_render_list(
    scene: &Scene,
    camera: &Camera,
    assets: &AssetServer,
    programs: &ProgramRegistry,
    list: &mut RenderList,
    info: &mut RenderInfo,
) {
    list.clear();

    let camera_position = camera.world_position();
    let view_direction = camera.view_direction();

    // (node, inherited group order)
    let mut stack: Vec<(NodeKey, i32)> = Vec::with_capacity(64);
    for &root in scene.root_nodes.iter().rev() {
        stack.push((root, 0));
    }

    while let Some((node_key, inherited_group)) = stack.pop() {
        let Some(node) = scene.nodes.get(node_key) else {
            continue;
        };

        if !node.visible {
            continue;
        }

        let mut group_order = inherited_group;

        match node.mesh.and_then(|key| scene.meshes.get(key).map(|m| (key, m))) {
            None => {
                if node.render_order != 0 {
                    group_order = node.render_order;
                }
            }
            Some((mesh_key, mesh)) => {
                if mesh.visible {
                    project_mesh(ProjectMesh {
                        camera,
                        assets,
                        programs,
                        list,
                        info,
                        node_key,
                        node,
                        mesh_key,
                        mesh,
                        group_order,
                        camera_position,
                        view_direction,
                    });
                }
            }
        }

        for &child in node.children.iter().rev() {
            stack.push((child, group_order));
        }
    }

    info.opaque_records = list.opaque.len() as u32;
    info.transparent_records = list.transparent.len() as u32;
}

struct ProjectMesh<'a> {
    camera: &'a Camera,
    assets: &'a AssetServer,
    programs: &'a ProgramRegistry,
    list: &'a mut RenderList,
    info: &'a mut RenderInfo,
    node_key: NodeKey,
    node: &'a Node,
    mesh_key: crate::scene::MeshKey,
    mesh: &'a Mesh,
    group_order: i32,
    camera_position: Vec3,
    view_direction: Vec3,
}

fn project_mesh(ctx: ProjectMesh<'_>) {
    let ProjectMesh {
        camera,
        assets,
        programs,
        list,
        info,
        node_key,
        node,
        mesh_key,
        mesh,
        group_order,
        camera_position,
        view_direction,
    } = ctx;

    if mesh.materials.is_empty() {
        return;
    }

    let Some(geometry) = assets.get_geometry(mesh.geometry) else {
        log::warn!("Node {node_key:?} references missing geometry {:?}", mesh.geometry);
        return;
    };

    let world = node.transform.world_matrix;
    let sphere = geometry.bounding_sphere();

    // Frustum test against the world-space bounding sphere. Radius is
    // scaled by the largest axis scale; no bounds means no culling.
    if mesh.frustum_culled
        && let Some(sphere) = sphere
    {
        let center = world.transform_point3(sphere.center);
        let max_scale = world
            .matrix3
            .x_axis
            .length()
            .max(world.matrix3.y_axis.length())
            .max(world.matrix3.z_axis.length());
        if !camera
            .frustum()
            .intersects_sphere(center, sphere.radius * max_scale)
        {
            return;
        }
    }

    // Reference point for depth: bounding-sphere center, else origin.
    let reference = match sphere {
        Some(sphere) => world.transform_point3(sphere.center),
        None => world.translation.into(),
    };
    let z = view_direction.dot(reference - camera_position);

    let world_matrix = Mat4::from(world);
    let geo_features = geometry_features(geometry, mesh, node);
    let skeleton = node.skin.as_ref().map(|s| s.skeleton);

    let mut emit = |material_index: u32, group: Option<crate::resources::geometry::GeometryGroup>| {
        let Some(&material_handle) = mesh.materials.get(material_index as usize) else {
            log::warn!(
                "Node {node_key:?}: group material index {material_index} out of range ({} slots)",
                mesh.materials.len()
            );
            return;
        };
        let Some(material) = assets.get_material(material_handle) else {
            log::warn!("Node {node_key:?} references missing material {material_handle:?}");
            return;
        };

        let key = ProgramKey {
            kind: material.kind(),
            material_features: material.features(),
            geometry_features: geo_features,
        };
        let Some(program) = programs.select(&key) else {
            // A missing program kills this draw, not the frame.
            log::warn!(
                "No program registered for shader '{}' (features {:?}/{:?}); skipping draw",
                material.shader_name(),
                key.material_features,
                key.geometry_features,
            );
            info.skipped_records += 1;
            return;
        };

        list.push(
            RenderRecord {
                id: node.id(),
                node: node_key,
                mesh: mesh_key,
                geometry: mesh.geometry,
                material: material_handle,
                geometry_id: geometry.id(),
                material_id: material.id(),
                program: program.id,
                group_order,
                render_order: node.render_order,
                z,
                group,
                world_matrix,
                instance_count: mesh.instance_count,
                skeleton,
                draw_range: geometry.draw_count(group.as_ref()),
                indexed: geometry.index().is_some(),
                topology: geometry.topology,
                dynamic_offset: 0,
            },
            material.transparent(),
        );
    };

    if mesh.materials.len() > 1 && !geometry.groups().is_empty() {
        for group in geometry.groups() {
            emit(group.material_index, Some(*group));
        }
    } else {
        emit(0, None);
    }
}
