//! Shared visualization utilities for the EasyMesh viewers.

use easymesh::{CsgOperation, CsgResult, EasyMesh};
use macroquad::models::{draw_mesh, Mesh, Vertex};
use macroquad::prelude::*;
use nalgebra::{Vector3, Vector4};

pub mod picker;
pub use picker::OperationPicker;

/// Triangles per macroquad mesh; keeps vertex indices within `u16`.
const TRIANGLES_PER_BATCH: usize = 21_000;

/// Fraction of the color kept on faces turned away from the light.
const AMBIENT: f32 = 0.25;

/// Converts a mesh into flat-shaded macroquad meshes lit from `light`.
///
/// Every triangle gets its own three vertices so each batch stays under the
/// `u16` index limit regardless of how vertices are shared.
pub fn to_render_meshes(mesh: &EasyMesh, light: Vec3) -> Vec<Mesh> {
    let light = light.normalize_or_zero();
    let vertices = mesh.vertices();

    mesh.indices()
        .chunks(TRIANGLES_PER_BATCH * 3)
        .map(|batch| {
            let render_vertices: Vec<Vertex> = batch
                .iter()
                .map(|i| {
                    let vertex = &vertices[*i as usize];
                    let p = vertex.position;
                    let n = vertex.normal;
                    let lambert = vec3(n.x, n.y, n.z).dot(light).max(0.0);
                    let shade = AMBIENT + (1.0 - AMBIENT) * lambert;
                    let c = vertex.color;
                    Vertex::new2(
                        vec3(p.x, p.y, p.z),
                        vec2(0.0, 0.0),
                        Color::new(c.x * shade, c.y * shade, c.z * shade, c.w),
                    )
                })
                .collect();

            Mesh {
                indices: (0..render_vertices.len() as u16).collect(),
                vertices: render_vertices,
                texture: None,
            }
        })
        .collect()
}

/// Draws every triangle edge of `mesh`.
pub fn draw_edges(mesh: &EasyMesh, color: Color) {
    let vertices = mesh.vertices();
    let point = |i: u32| {
        let p = vertices[i as usize].position;
        vec3(p.x, p.y, p.z)
    };
    for triangle in mesh.indices().chunks_exact(3) {
        let (a, b, c) = (point(triangle[0]), point(triangle[1]), point(triangle[2]));
        draw_line_3d(a, b, color);
        draw_line_3d(b, c, color);
        draw_line_3d(c, a, color);
    }
}

pub fn draw_meshes(meshes: &[Mesh]) {
    for mesh in meshes {
        draw_mesh(mesh);
    }
}

/// Placement of the second operand in the demo scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub offset: Vector3<f32>,
    /// Degrees around the Y axis.
    pub yaw: f32,
    pub size: f32,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            offset: Vector3::new(2.0, 1.5, 1.0),
            yaw: 30.0,
            size: 4.0,
        }
    }
}

/// Builds the demo scene: a red cube and a blue cube placed by `placement`,
/// combined with `operation` (or left as two shapes when `None`).
pub fn demo_scene(operation: Option<CsgOperation>, placement: Placement) -> CsgResult<EasyMesh> {
    let mut mesh = EasyMesh::new();

    mesh.open_brace();
    mesh.set_color(Vector4::new(0.85, 0.3, 0.25, 1.0));
    mesh.append_box(Vector3::repeat(6.0));

    mesh.open_brace();
    mesh.set_color(Vector4::new(0.25, 0.45, 0.9, 1.0));
    mesh.append_box(Vector3::repeat(placement.size));
    mesh.rotate_y(placement.yaw);
    mesh.translate(placement.offset);

    if let Some(operation) = operation {
        mesh.mesh_csg(operation)?;
    }

    mesh.close_brace();
    mesh.close_brace();
    Ok(mesh)
}

/// Simple orbit camera for 3D scene navigation.
pub struct OrbitCamera {
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub target: Vec3,
    /// Multiplier for scroll wheel zoom
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl OrbitCamera {
    pub fn new(distance: f32, yaw: f32, pitch: f32) -> Self {
        Self {
            distance,
            yaw,
            pitch,
            target: vec3(0.0, 0.0, 0.0),
            zoom_speed: 2.0,
            min_distance: 5.0,
            max_distance: 100.0,
        }
    }

    pub fn with_zoom(mut self, speed: f32, min: f32, max: f32) -> Self {
        self.zoom_speed = speed;
        self.min_distance = min;
        self.max_distance = max;
        self
    }

    /// Updates from mouse drag, scroll wheel and arrow keys.
    pub fn update(&mut self) {
        if is_mouse_button_down(MouseButton::Left) {
            let delta = mouse_delta_position();
            self.yaw -= delta.x * 2.0;
            self.pitch -= delta.y * 2.0;
        }

        let scroll = mouse_wheel().1;
        self.distance = (self.distance - scroll * self.zoom_speed)
            .clamp(self.min_distance, self.max_distance);

        if is_key_down(KeyCode::Left) {
            self.yaw += 0.02;
        }
        if is_key_down(KeyCode::Right) {
            self.yaw -= 0.02;
        }
        if is_key_down(KeyCode::Up) {
            self.pitch += 0.02;
        }
        if is_key_down(KeyCode::Down) {
            self.pitch -= 0.02;
        }

        // Stay clear of the poles.
        self.pitch = self.pitch.clamp(-1.5, 1.5);
    }

    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + vec3(x, y, z)
    }

    pub fn to_camera3d(&self) -> Camera3D {
        Camera3D {
            position: self.position(),
            up: vec3(0.0, 1.0, 0.0),
            target: self.target,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_meshes_flatten_triangles() {
        let mut mesh = EasyMesh::new();
        mesh.append_box(Vector3::repeat(1.0));

        let meshes = to_render_meshes(&mesh, vec3(0.0, 1.0, 0.0));
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].vertices.len(), 36);
        assert_eq!(meshes[0].indices.len(), 36);
        assert_eq!(meshes[0].indices[35], 35);
    }

    #[test]
    fn demo_scene_operations() {
        let inputs = demo_scene(None, Placement::default()).unwrap();
        assert_eq!(inputs.triangle_count(), 24);

        for operation in OperationPicker::OPERATIONS.into_iter().flatten() {
            let mesh = demo_scene(Some(operation), Placement::default()).unwrap();
            assert!(mesh.cursors().is_empty());
            assert!(mesh.triangle_count() > 0, "{operation:?} left nothing");
        }
    }
}
