use easymesh::EasyMesh;
use easymesh_viz::{demo_scene, draw_edges, draw_meshes, to_render_meshes, OperationPicker, OrbitCamera, Placement};
use macroquad::models::Mesh;
use macroquad::prelude::*;
use tracing::{error, info};

const LIGHT: Vec3 = vec3(0.4, 0.8, 0.5);
const STEP: f32 = 0.1;

/// Moves the second operand with WASD / QE and spins it with Z / X.
/// Returns true if the placement changed.
fn update_placement(placement: &mut Placement) -> bool {
    let before = *placement;
    let bindings = [
        (KeyCode::A, 0, -STEP),
        (KeyCode::D, 0, STEP),
        (KeyCode::Q, 1, -STEP),
        (KeyCode::E, 1, STEP),
        (KeyCode::W, 2, -STEP),
        (KeyCode::S, 2, STEP),
    ];
    for (key, axis, delta) in bindings {
        if is_key_down(key) {
            placement.offset[axis] += delta;
        }
    }
    if is_key_down(KeyCode::Z) {
        placement.yaw -= 1.0;
    }
    if is_key_down(KeyCode::X) {
        placement.yaw += 1.0;
    }
    *placement != before
}

fn rebuild(picker: &OperationPicker, placement: Placement) -> Option<(EasyMesh, Vec<Mesh>)> {
    match demo_scene(picker.selected(), placement) {
        Ok(mesh) => {
            info!(
                operation = picker.label(),
                triangles = mesh.triangle_count(),
                vertices = mesh.vertex_count(),
                "scene rebuilt"
            );
            let render = to_render_meshes(&mesh, LIGHT);
            Some((mesh, render))
        }
        Err(err) => {
            error!(%err, "scene rebuild failed");
            None
        }
    }
}

#[macroquad::main("EasyMesh CSG")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "easymesh=debug,easymesh_viz=info".into()),
        )
        .init();

    let mut camera = OrbitCamera::new(20.0, 0.6, 0.4).with_zoom(1.0, 5.0, 60.0);
    let mut picker = OperationPicker::new();
    let mut placement = Placement::default();
    let mut show_edges = false;
    let mut scene = rebuild(&picker, placement);

    loop {
        camera.update();
        let picked = picker.update();
        let moved = update_placement(&mut placement);
        if picked || moved {
            // Keep showing the last good mesh if the new one fails.
            if let Some(rebuilt) = rebuild(&picker, placement) {
                scene = Some(rebuilt);
            }
        }
        if is_key_pressed(KeyCode::Space) {
            show_edges = !show_edges;
        }

        clear_background(Color::from_rgba(15, 15, 25, 255));
        set_camera(&camera.to_camera3d());

        if let Some((mesh, render)) = &scene {
            draw_meshes(render);
            if show_edges {
                draw_edges(mesh, Color::from_rgba(255, 255, 255, 90));
            }
        }

        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(8.0, 0.0, 0.0), RED);
        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(0.0, 8.0, 0.0), GREEN);
        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(0.0, 0.0, 8.0), BLUE);

        set_default_camera();

        let (triangles, vertices) = scene
            .as_ref()
            .map_or((0, 0), |(mesh, _)| (mesh.triangle_count(), mesh.vertex_count()));
        draw_text("EasyMesh CSG", 10.0, 25.0, 20.0, WHITE);
        draw_text(
            &format!("{triangles} triangles | {vertices} vertices"),
            10.0,
            45.0,
            18.0,
            GRAY,
        );

        picker.draw_ui(70.0);

        draw_text(
            "WASD/QE move | Z/X spin | Space edges | drag to rotate, scroll to zoom",
            10.0,
            115.0,
            16.0,
            DARKGRAY,
        );
        draw_text(&format!("FPS: {}", get_fps()), 10.0, 135.0, 16.0, DARKGRAY);

        next_frame().await
    }
}
