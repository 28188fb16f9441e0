use easymesh::{
    CommandRecorder, CsgOperation, EasyMesh, MasterRef, MeshConfig, Triangle, VertexAdjacency,
};
use nalgebra::{Point3, Vector3};

/// Two 2×2×2 boxes, the first centered on the origin and the second moved by
/// `offset`, each in its own brace.
fn two_boxes(offset: Vector3<f32>) -> EasyMesh {
    let mut mesh = EasyMesh::new();
    mesh.open_brace();
    mesh.append_box(Vector3::new(2.0, 2.0, 2.0));
    mesh.open_brace();
    mesh.append_box(Vector3::new(2.0, 2.0, 2.0));
    mesh.translate(offset);
    mesh
}

fn triangles(mesh: &EasyMesh) -> Vec<Triangle> {
    mesh.indices()
        .chunks_exact(3)
        .map(|t| {
            Triangle::new(
                mesh.vertices()[t[0] as usize].position,
                mesh.vertices()[t[1] as usize].position,
                mesh.vertices()[t[2] as usize].position,
            )
        })
        .collect()
}

fn area(mesh: &EasyMesh) -> f32 {
    triangles(mesh).iter().map(Triangle::area).sum()
}

/// Volume enclosed by the surface, positive when it winds outward.
fn signed_volume(mesh: &EasyMesh) -> f32 {
    triangles(mesh)
        .iter()
        .map(|t| {
            let [a, b, c] = t.vertices();
            a.coords.dot(&b.coords.cross(&c.coords)) / 6.0
        })
        .sum()
}

fn strictly_inside(point: Point3<f32>, center: Vector3<f32>) -> bool {
    (point.coords - center).iter().all(|c| c.abs() < 1.0 - 1e-3)
}

fn assert_near(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-3,
        "expected {expected}, got {actual}"
    );
}

// The second box overlaps the first on [0,1]×[-0.5,1]×[-0.75,1], a
// 1 × 1.5 × 1.75 block: volume 2.625, surface 11.75, half of which comes
// from each box.
fn skewed() -> Vector3<f32> {
    Vector3::new(1.0, 0.5, 0.25)
}

#[test]
fn union_with_empty_region_is_unchanged() {
    let mut mesh = EasyMesh::new();
    mesh.open_brace();
    mesh.append_box(Vector3::new(1.0, 2.0, 3.0));
    let vertices = mesh.vertices().to_vec();
    let indices = mesh.indices().to_vec();

    mesh.open_brace();
    mesh.csg_union().unwrap();
    assert_eq!(mesh.vertices(), vertices.as_slice());
    assert_eq!(mesh.indices(), indices.as_slice());

    // Empty first region: the second is entirely outside it.
    let mut mesh = EasyMesh::new();
    mesh.open_brace();
    mesh.open_brace();
    mesh.append_box(Vector3::new(1.0, 2.0, 3.0));
    mesh.csg_union().unwrap();
    assert_eq!(mesh.vertices(), vertices.as_slice());
    assert_eq!(mesh.indices(), indices.as_slice());
}

#[test]
fn union_of_overlapping_boxes() {
    let mut mesh = two_boxes(skewed());
    mesh.csg_union().unwrap();

    assert!(mesh.triangle_count() > 24);
    for triangle in triangles(&mesh) {
        let centroid = triangle.centroid();
        assert!(!strictly_inside(centroid, Vector3::zeros()), "{centroid} buried in first box");
        assert!(!strictly_inside(centroid, skewed()), "{centroid} buried in second box");
    }

    let (min, max) = mesh.vertices().iter().fold(
        (Point3::from(Vector3::repeat(f32::MAX)), Point3::from(Vector3::repeat(f32::MIN))),
        |(min, max), v| (min.inf(&v.position), max.sup(&v.position)),
    );
    assert!((min - Point3::new(-1.0, -1.0, -1.0)).norm() < 1e-5);
    assert!((max - Point3::new(2.0, 1.5, 1.25)).norm() < 1e-5);

    assert_near(area(&mesh), 48.0 - 11.75);
    assert_near(signed_volume(&mesh), 16.0 - 2.625);
}

#[test]
fn substract_closes_the_hole() {
    let mut mesh = two_boxes(skewed());
    mesh.csg_substract().unwrap();

    assert_near(area(&mesh), 24.0);
    assert_near(signed_volume(&mesh), 8.0 - 2.625);
    for triangle in triangles(&mesh) {
        assert!(!strictly_inside(triangle.centroid(), skewed()));
    }
}

#[test]
fn substract_loss_leaves_the_hole_open() {
    let mut mesh = two_boxes(skewed());
    mesh.csg_substract_loss().unwrap();

    assert_near(area(&mesh), 24.0 - 5.875);
}

#[test]
fn and_keeps_the_overlap() {
    let mut mesh = two_boxes(skewed());
    mesh.csg_and().unwrap();

    assert_near(area(&mesh), 11.75);
    assert_near(signed_volume(&mesh), 2.625);
}

#[test]
fn xor_turns_the_overlap_inward() {
    let mut mesh = two_boxes(skewed());
    mesh.csg_xor().unwrap();

    assert_near(area(&mesh), 48.0);
    assert_near(signed_volume(&mesh), 16.0 - 2.625 - 2.625);
}

/// Combines the two skewed boxes with `operation` inside a brace that stays
/// open, so consecutive calls leave sibling regions behind.
fn push_combined_boxes(mesh: &mut EasyMesh, operation: CsgOperation) {
    mesh.open_brace();
    mesh.open_brace();
    mesh.append_box(Vector3::new(2.0, 2.0, 2.0));
    mesh.open_brace();
    mesh.append_box(Vector3::new(2.0, 2.0, 2.0));
    mesh.translate(skewed());
    mesh.mesh_csg(operation).unwrap();
    mesh.close_brace();
    mesh.close_brace();
}

#[test]
fn union_of_and_with_xor_rebuilds_union() {
    let mut rebuilt = EasyMesh::new();
    push_combined_boxes(&mut rebuilt, CsgOperation::And);
    push_combined_boxes(&mut rebuilt, CsgOperation::Xor);
    assert_eq!(rebuilt.cursors().len(), 2);
    rebuilt.csg_union().unwrap();

    let mut direct = two_boxes(skewed());
    direct.csg_union().unwrap();

    assert_near(area(&rebuilt), area(&direct));
    assert_near(signed_volume(&rebuilt), signed_volume(&direct));
    assert_near(signed_volume(&rebuilt), 16.0 - 2.625);
    assert_eq!(rebuilt.triangle_count(), direct.triangle_count());
}

#[test]
fn and_of_disjoint_boxes_is_empty() {
    let mut mesh = two_boxes(Vector3::new(5.0, 0.0, 0.0));
    mesh.csg_and().unwrap();

    assert_eq!(mesh.vertex_count(), 0);
    assert!(mesh.indices().is_empty());
}

#[test]
fn union_keeps_shared_faces_once() {
    // Side faces of both boxes overlap on x in [0, 1].
    let mut mesh = two_boxes(Vector3::new(1.0, 0.0, 0.0));
    mesh.csg_union().unwrap();

    assert_near(area(&mesh), 32.0);
    assert_near(signed_volume(&mesh), 12.0);
}

#[test]
fn substract_with_shared_faces() {
    let mut mesh = two_boxes(Vector3::new(1.0, 0.0, 0.0));
    mesh.csg_substract().unwrap();

    assert_near(area(&mesh), 16.0);
    assert_near(signed_volume(&mesh), 4.0);
}

#[test]
fn csg_collapses_the_top_cursor() {
    let mut mesh = two_boxes(skewed());
    mesh.csg_union().unwrap();

    let cursors = mesh.cursors();
    assert_eq!(cursors.len(), 2);
    assert_eq!(cursors[0].index_count, 0);
    assert_eq!(cursors[1].index_count, mesh.indices().len());
    assert_eq!(cursors[1].vertex_count, mesh.vertex_count());

    mesh.close_brace();
    mesh.close_brace();
    assert!(mesh.cursors().is_empty());
}

#[test]
fn cleanup_can_be_disabled() {
    let config = MeshConfig::default().with_vertex_cleanup(false);
    let mut kept = EasyMesh::with_config(config);
    kept.open_brace();
    kept.append_box(Vector3::new(2.0, 2.0, 2.0));
    kept.open_brace();
    kept.append_box(Vector3::new(2.0, 2.0, 2.0));
    kept.translate(Vector3::new(5.0, 0.0, 0.0));
    kept.csg_and().unwrap();

    // Every triangle is gone but the vertices stay.
    assert!(kept.indices().is_empty());
    assert_eq!(kept.vertex_count(), 48);
}

#[test]
fn split_vertices_interpolate_attributes() {
    let mut mesh = two_boxes(skewed());
    mesh.csg_union().unwrap();

    for vertex in mesh.vertices() {
        let length = vertex.normal.norm();
        assert!((length - 1.0).abs() < 1e-4, "normal of length {length}");
        assert_eq!(vertex.color, nalgebra::Vector4::repeat(1.0));
    }
}

#[test]
fn coincident_vertices_share_a_master() {
    let mut dictionary = VertexAdjacency::new();
    let spot = Point3::new(0.5, -0.5, 2.0);
    for id in [10, 3, 7] {
        dictionary.register_vertex(id, spot);
    }
    dictionary.register_vertex(1, Point3::origin());

    assert_eq!(dictionary.find_vertex_master(10), MasterRef::Master);
    assert_eq!(dictionary.find_vertex_master(3), MasterRef::Follower(10));
    assert_eq!(dictionary.find_vertex_master(7), MasterRef::Follower(10));
    assert_eq!(dictionary.find_vertex_master(1), MasterRef::Alone);
    assert_eq!(dictionary.find_matching_vertices(7), Some(vec![10, 3]));
}

#[test]
fn recorded_script_replays() {
    let script = r#"[
        {"op": "open_brace"},
        {"op": "append_box", "size": [2.0, 2.0, 2.0]},
        {"op": "open_brace"},
        {"op": "append_box", "size": [2.0, 2.0, 2.0]},
        {"op": "translate", "offset": [1.0, 0.5, 0.25]},
        {"op": "csg", "operation": "substract"},
        {"op": "close_brace"},
        {"op": "close_brace"}
    ]"#;

    let recorder = CommandRecorder::from_json(script).unwrap();
    assert_eq!(recorder.len(), 8);

    let mut mesh = EasyMesh::new();
    recorder.replay(&mut mesh).unwrap();
    assert_near(signed_volume(&mesh), 8.0 - 2.625);

    let mut direct = two_boxes(skewed());
    direct.mesh_csg(CsgOperation::Substract).unwrap();
    assert_eq!(mesh.indices(), direct.indices());
}
