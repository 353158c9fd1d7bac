use mesh_ccd::{BodyId, CollisionError, CollisionWorld, MeshSubmission, Vec3};

#[test]
fn flat_arrays_convert_to_vectors() {
    let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    let previous: [f32; 9] = [0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 1.0, 1.0];
    let submission = MeshSubmission::from_flat(BodyId(3), &positions, Some(&previous[..]), &[0, 1, 2]).unwrap();

    assert_eq!(submission.vertices, vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
    assert_eq!(submission.previous_vertices.as_ref().unwrap()[2], Vec3::new(0.0, 1.0, 1.0));
    assert_eq!(submission.indices, Some(vec![[0, 1, 2]]));
}

#[test]
fn flat_arrays_with_stray_components_are_rejected() {
    let err = MeshSubmission::from_flat(BodyId(0), &[0.0, 1.0], None, &[]).unwrap_err();
    assert!(matches!(err, CollisionError::InvalidTopology { body: BodyId(0), .. }));

    let err = MeshSubmission::from_flat(BodyId(1), &[0.0; 9], None, &[0, 1]).unwrap_err();
    assert!(err.to_string().contains("multiple of 3"));
}

#[test]
fn empty_index_array_keeps_registered_topology() {
    let mut world = CollisionWorld::new();
    world
        .register_or_update(
            BodyId(0),
            MeshSubmission::from_flat(BodyId(0), &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], None, &[0, 1, 2])
                .unwrap(),
        )
        .unwrap();

    let moved = MeshSubmission::from_flat(BodyId(0), &[0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 1.0, 1.0], None, &[]).unwrap();
    assert!(moved.indices.is_none());
    world.register_or_update(BodyId(0), moved).unwrap();

    let mesh = world.registry().mesh(BodyId(0)).unwrap();
    assert_eq!(mesh.indices(), &[[0, 1, 2]]);
    assert_eq!(mesh.previous_vertices()[0], Vec3::ZERO);
    assert_eq!(mesh.vertices()[0], Vec3::Z);
}

#[test]
fn out_of_range_index_is_rejected() {
    let mut world = CollisionWorld::new();
    let bad = MeshSubmission::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y]).with_indices(vec![[0, 1, 7]]);
    let err = world.register_or_update(BodyId(0), bad).unwrap_err();
    assert!(err.to_string().contains("invalid topology for body#0"));
    assert!(world.registry().is_empty());
}

#[test]
fn mismatched_previous_positions_are_rejected() {
    let mut world = CollisionWorld::new();
    let bad = MeshSubmission::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y])
        .with_previous(vec![Vec3::ZERO])
        .with_indices(vec![[0, 1, 2]]);
    assert!(world.register_or_update(BodyId(0), bad).is_err());
}

#[test]
fn first_submission_starts_at_rest() {
    let mut world = CollisionWorld::new();
    let vertices = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
    world
        .register_or_update(
            BodyId(4),
            MeshSubmission::new(vertices.clone()).with_indices(vec![[0, 1, 2]]),
        )
        .unwrap();

    let mesh = world.registry().mesh(BodyId(4)).unwrap();
    assert_eq!(mesh.previous_vertices(), vertices.as_slice());
    assert_eq!(mesh.vertices(), vertices.as_slice());
}

#[test]
fn topology_change_resets_motion() {
    let mut world = CollisionWorld::new();
    world
        .register_or_update(
            BodyId(0),
            MeshSubmission::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y]).with_indices(vec![[0, 1, 2]]),
        )
        .unwrap();

    let quad = vec![Vec3::Z, Vec3::X + Vec3::Z, Vec3::Y + Vec3::Z, Vec3::ONE];
    world
        .register_or_update(
            BodyId(0),
            MeshSubmission::new(quad.clone()).with_indices(vec![[0, 1, 2], [1, 3, 2]]),
        )
        .unwrap();

    let mesh = world.registry().mesh(BodyId(0)).unwrap();
    assert_eq!(mesh.triangle_count(), 2);
    assert_eq!(mesh.previous_vertices(), quad.as_slice());
}

#[test]
fn self_collision_flag_follows_latest_submission() {
    let mut world = CollisionWorld::new();
    let tri = || MeshSubmission::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y]).with_indices(vec![[0, 1, 2]]);
    world
        .register_or_update(BodyId(0), tri().self_collision(true))
        .unwrap();
    assert!(world.registry().get(BodyId(0)).unwrap().self_collision());

    world
        .register_or_update(BodyId(0), MeshSubmission::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y]))
        .unwrap();
    assert!(!world.registry().get(BodyId(0)).unwrap().self_collision());
}
