use easymesh::{CsgResult, EasyMesh};
use easymesh_viz::{draw_edges, draw_meshes, to_render_meshes, OrbitCamera};
use macroquad::prelude::*;
use nalgebra::{Vector3, Vector4};
use tracing::{error, info};

const NUM_CUTTERS: usize = 8;
const BLOCK_SIZE: f32 = 10.0;
const MIN_CUTTER_SIZE: f32 = 1.5;
const MAX_CUTTER_SIZE: f32 = 4.0;

/// Simple seeded random number generator (LCG).
struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_f32(&mut self) -> f32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((self.state >> 33) as f32) / (u32::MAX as f32 / 2.0)
    }

    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }
}

/// Carves randomly rotated boxes out of a block, one subtraction at a time.
fn carve_block(seed: u64) -> CsgResult<EasyMesh> {
    let mut rng = Rng::new(seed);
    let mut mesh = EasyMesh::new();

    mesh.open_brace();
    mesh.set_color(Vector4::new(0.8, 0.75, 0.6, 1.0));
    mesh.append_box(Vector3::repeat(BLOCK_SIZE));

    for cut in 0..NUM_CUTTERS {
        mesh.open_brace();
        mesh.set_color(Vector4::new(rng.range(0.3, 1.0), rng.range(0.3, 1.0), rng.range(0.3, 1.0), 1.0));
        mesh.append_box(Vector3::new(
            rng.range(MIN_CUTTER_SIZE, MAX_CUTTER_SIZE),
            rng.range(MIN_CUTTER_SIZE, MAX_CUTTER_SIZE),
            rng.range(MIN_CUTTER_SIZE, MAX_CUTTER_SIZE),
        ));

        let axis = Vector3::new(rng.next_f32() - 0.5, rng.next_f32() - 0.5, rng.next_f32() - 0.5);
        mesh.rotate(rng.range(0.0, 360.0), axis);

        // Centers on the block's surface so every cutter bites.
        let mut center = Vector3::new(rng.next_f32() - 0.5, rng.next_f32() - 0.5, rng.next_f32() - 0.5) * BLOCK_SIZE;
        let face = (rng.next_f32() * 3.0) as usize % 3;
        center[face] = center[face].signum() * BLOCK_SIZE * 0.5;
        mesh.translate(center);

        mesh.csg_substract()?;
        mesh.close_brace();
        info!(cut, triangles = mesh.triangle_count(), "cutter applied");
    }

    mesh.close_brace();
    Ok(mesh)
}

#[macroquad::main("EasyMesh Carved Block")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "easymesh=debug,carve=info".into()),
        )
        .init();

    let mesh = match carve_block(42) {
        Ok(mesh) => mesh,
        Err(err) => {
            error!(%err, "carving failed");
            return;
        }
    };
    let render = to_render_meshes(&mesh, vec3(0.4, 0.8, 0.5));

    let mut camera = OrbitCamera::new(30.0, 0.6, 0.4).with_zoom(2.0, 10.0, 80.0);
    let mut show_edges = false;

    loop {
        camera.update();
        if is_key_pressed(KeyCode::Space) {
            show_edges = !show_edges;
        }

        clear_background(Color::from_rgba(15, 15, 25, 255));
        set_camera(&camera.to_camera3d());

        draw_meshes(&render);
        if show_edges {
            draw_edges(&mesh, Color::from_rgba(255, 255, 255, 90));
        }

        set_default_camera();

        draw_text(
            &format!("Carved block - {} cutters", NUM_CUTTERS),
            10.0,
            25.0,
            20.0,
            WHITE,
        );
        draw_text(
            &format!("{} triangles | {} vertices", mesh.triangle_count(), mesh.vertex_count()),
            10.0,
            45.0,
            18.0,
            GRAY,
        );
        draw_text("Space edges | drag to rotate, scroll to zoom", 10.0, 65.0, 16.0, DARKGRAY);
        draw_text(&format!("FPS: {}", get_fps()), 10.0, 85.0, 16.0, DARKGRAY);

        next_frame().await
    }
}
