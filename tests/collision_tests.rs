use mesh_ccd::{BodyId, CollisionWorld, ContactKind, MeshPair, MeshSubmission, Vec3};

fn triangle_at(offset: Vec3) -> MeshSubmission {
    MeshSubmission::new(vec![offset, offset + Vec3::X, offset + Vec3::Y]).with_indices(vec![[0, 1, 2]])
}

#[test]
fn static_separated_triangles_produce_no_impacts() {
    let mut world = CollisionWorld::new();
    world
        .register_or_update(BodyId(0), triangle_at(Vec3::ZERO))
        .unwrap();
    world
        .register_or_update(BodyId(1), triangle_at(Vec3::new(0.0, 0.0, 1.0)))
        .unwrap();
    world.collide(0.01);

    assert!(world.impact_info().is_empty());
    assert_eq!(world.num_contacts(), 0);
    assert_eq!(world.stats().candidate_count, 0);
}

#[test]
fn disjoint_swept_boxes_never_reach_narrow_phase() {
    let mut world = CollisionWorld::new();
    world
        .register_or_update(BodyId(0), triangle_at(Vec3::ZERO))
        .unwrap();
    // Moves sideways far from the first body.
    world
        .register_or_update(
            BodyId(1),
            triangle_at(Vec3::new(5.0, 0.0, 0.0)).with_previous(vec![
                Vec3::new(5.0, 3.0, 0.0),
                Vec3::new(6.0, 3.0, 0.0),
                Vec3::new(5.0, 4.0, 0.0),
            ]),
        )
        .unwrap();
    world.collide(0.1);

    assert_eq!(world.stats().candidate_count, 0);
    assert!(world.impact_info().is_empty());
    assert!(!world.ccd_resolution());
}

#[test]
fn contact_pairs_follow_derived_mesh_pairs() {
    let mut world = CollisionWorld::new();
    for (id, z) in [(2, 0.0), (0, 0.005), (1, 10.0)] {
        world
            .register_or_update(BodyId(id), triangle_at(Vec3::new(0.0, 0.0, z)))
            .unwrap();
    }
    world.collide(0.01);

    let order: Vec<MeshPair> = world
        .contact_pairs()
        .iter()
        .map(|pairs| pairs.mesh_pair)
        .collect();
    assert_eq!(order, world.registry().derive_pairs());
    assert_eq!(order.len(), 3);

    let touching = world
        .contact_pairs()
        .iter()
        .find(|pairs| pairs.mesh_pair == MeshPair::new(BodyId(0), BodyId(2)))
        .unwrap();
    assert_eq!(touching.triangle_pairs.len(), 1);
    assert_eq!(world.num_contacts(), 1);

    let empty: usize = world
        .contact_pairs()
        .iter()
        .filter(|pairs| pairs.mesh_pair != touching.mesh_pair)
        .map(|pairs| pairs.triangle_pairs.len())
        .sum();
    assert_eq!(empty, 0);
}

#[test]
fn removed_body_drops_out_of_the_next_cycle() {
    let mut world = CollisionWorld::new();
    world
        .register_or_update(BodyId(0), triangle_at(Vec3::ZERO))
        .unwrap();
    world
        .register_or_update(BodyId(1), triangle_at(Vec3::new(0.0, 0.0, 0.005)))
        .unwrap();
    world.collide(0.01);
    assert_eq!(world.num_contacts(), 1);

    assert!(world.remove_body(BodyId(1)));
    world.collide(0.01);
    assert!(world.contact_pairs().is_empty());
    assert!(world.impact_info().is_empty());
    assert_eq!(world.stats().body_count, 1);
}

#[test]
fn thickness_widens_proximity_contacts() {
    let mut world = CollisionWorld::new();
    world
        .register_or_update(BodyId(0), triangle_at(Vec3::ZERO))
        .unwrap();
    world
        .register_or_update(BodyId(1), triangle_at(Vec3::new(0.0, 0.0, 0.05)))
        .unwrap();

    world.collide(0.01);
    assert_eq!(world.num_contacts(), 0);

    world.collide(0.1);
    assert_eq!(world.num_contacts(), 1);
    assert!(world
        .impact_info()
        .iter()
        .all(|impact| impact.distance <= 0.1 && !impact.ccd_resolved));
}

#[test]
fn degenerate_triangles_are_skipped_and_counted() {
    let mut world = CollisionWorld::new();
    world
        .register_or_update(BodyId(0), triangle_at(Vec3::ZERO))
        .unwrap();
    let sliver = MeshSubmission::new(vec![
        Vec3::new(0.2, 0.2, 0.001),
        Vec3::new(0.4, 0.2, 0.001),
        Vec3::new(0.6, 0.2, 0.001),
    ])
    .with_indices(vec![[0, 1, 2]]);
    world.register_or_update(BodyId(1), sliver).unwrap();

    world.collide(0.01);
    assert_eq!(world.stats().candidate_count, 1);
    assert_eq!(world.stats().degenerate_pairs, 1);
    assert!(world.impact_info().is_empty());
}

/// Triangle translated along x from `from` to `to` over the step.
fn sliding(vertices: [Vec3; 3], from: f32, to: f32) -> MeshSubmission {
    MeshSubmission::new(vertices.iter().map(|v| *v + Vec3::X * to).collect())
        .with_previous(vertices.iter().map(|v| *v + Vec3::X * from).collect())
        .with_indices(vec![[0, 1, 2]])
}

#[test]
fn glide_within_thickness_is_reported() {
    // Parallel to the floor the whole step, so the two never become coplanar.
    let mut world = CollisionWorld::new();
    world
        .register_or_update(BodyId(0), triangle_at(Vec3::ZERO))
        .unwrap();
    let hovering = [Vec3::ZERO, Vec3::X, Vec3::Y].map(|v| v + Vec3::Z * 0.005);
    world
        .register_or_update(BodyId(1), sliding(hovering, -2.0, 2.0))
        .unwrap();
    world.collide(0.01);

    assert_eq!(world.stats().candidate_count, 1);
    assert_eq!(world.num_contacts(), 1);
    assert!(!world.ccd_resolution());

    let impacts = world.impact_info();
    assert!(impacts.iter().all(|impact| impact.distance <= 0.01 && !impact.ccd_resolved));
    // Leading corner reaches the floor's corner at x + 1 = -sqrt(0.01² - 0.005²).
    let earliest = impacts.iter().map(|impact| impact.time).fold(f32::MAX, f32::min);
    assert!((earliest - 0.2478).abs() < 1e-3, "earliest = {earliest}");
}

#[test]
fn vertex_passing_beside_an_edge_is_reported() {
    // Upright triangle whose lowest corner skims past the floor's x-axis edge
    // at a distance of 0.004 * sqrt(2), never over the face itself.
    let mut world = CollisionWorld::new();
    world
        .register_or_update(BodyId(0), triangle_at(Vec3::ZERO))
        .unwrap();
    let upright = [
        Vec3::new(0.0, -0.004, 0.004),
        Vec3::new(0.0, -0.5, 0.004),
        Vec3::new(0.0, -0.3, 0.5),
    ];
    world
        .register_or_update(BodyId(1), sliding(upright, -1.0, 2.0))
        .unwrap();
    world.collide(0.01);

    assert_eq!(world.num_contacts(), 1);
    let impacts = world.impact_info();
    assert!(impacts.iter().any(|impact| {
        impact.kind == ContactKind::VertexFace && impact.triangles[0].body == BodyId(1) && impact.vertices[0] == 0
    }));
    let earliest = impacts.iter().map(|impact| impact.time).fold(f32::MAX, f32::min);
    assert!((earliest - 0.3306).abs() < 1e-3, "earliest = {earliest}");

    // Same pass a little wider stays outside thickness.
    let wide = upright.map(|v| v - Vec3::Y * 0.02);
    world.register_or_update(BodyId(1), sliding(wide, -1.0, 2.0)).unwrap();
    world.collide(0.01);
    assert!(world.impact_info().is_empty());
}
