use std::sync::Arc;

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use impulse_phys::collision::SolverState;
use impulse_phys::core::{BodyHandle, BodyStorage, GravityType, SimulationConfig, Storage, TargetStorage};
use impulse_phys::math::Transform;
use impulse_phys::shapes::TriangleMesh;
use impulse_phys::{Material, PhysicsWorld, ResolutionStrategy, RigidBody, Solver, Target, Vector3};

const QUANTUM: f32 = 1.0 / 60.0;

fn world_with(strategy: ResolutionStrategy, gravity: GravityType) -> PhysicsWorld {
    let mut config = SimulationConfig::default();
    config.gravity = gravity;
    config.solver.strategy = strategy;
    let mut world = PhysicsWorld::with_config(config).unwrap();

    let plane = world.add_target(Target::landscape(
        Transform::identity(),
        Arc::new(TriangleMesh::plane(50.0)),
    ));
    world.add_landscape(plane).unwrap();
    world
}

fn earth() -> GravityType {
    GravityType::Constant(Vector3::new(0.0, -9.8, 0.0))
}

#[test]
fn test_spheres_stack_without_sinking() {
    for strategy in [ResolutionStrategy::Iterative, ResolutionStrategy::Coarse] {
        let mut world = world_with(strategy, earth());

        let lower = world.add_target(Target::sphere(Vector3::new(0.0, 1.0, 0.0), 1.0));
        let lower = world.add_sphere(lower, 1.0).unwrap();
        let upper = world.add_target(Target::sphere(Vector3::new(0.0, 3.0, 0.0), 1.0));
        let upper = world.add_sphere(upper, 1.0).unwrap();

        for _ in 0..600 {
            world.step(QUANTUM).unwrap();
        }

        let lower_y = world.get_body_target(lower).unwrap().translation().y;
        let upper_y = world.get_body_target(upper).unwrap().translation().y;

        assert!(lower_y > 0.95, "{:?}: lower sphere sank to {}", strategy, lower_y);
        assert!(upper_y - lower_y > 1.95, "{:?}: spheres overlap by {}", strategy, 2.0 - (upper_y - lower_y));
        assert!(upper_y < 3.1, "{:?}: upper sphere rose to {}", strategy, upper_y);
    }
}

#[test]
fn test_inelastic_impact_stops_the_body() {
    for strategy in [ResolutionStrategy::Iterative, ResolutionStrategy::Coarse] {
        let mut world = world_with(strategy, GravityType::None);
        let target = world.add_target(Target::sphere(Vector3::new(0.0, 1.0, 0.0), 1.0));
        let sphere = world.add_sphere(target, 1.0).unwrap();

        let body = world.get_body_mut(sphere).unwrap();
        body.set_material(Material::inelastic(0.0));
        body.set_linear_velocity(Vector3::new(0.0, -3.0, 0.0));
        let energy_before = body.get_linear_velocity().length_squared();

        assert_eq!(world.step(QUANTUM).unwrap(), 1);

        let velocity = world.get_body(sphere).unwrap().get_linear_velocity();
        assert!(velocity.y.abs() < 1e-4, "{:?}: bounced with {}", strategy, velocity.y);
        assert!(velocity.length_squared() <= energy_before);
    }
}

#[test]
fn test_restitution_above_threshold() {
    let mut world = world_with(ResolutionStrategy::Iterative, GravityType::None);
    let target = world.add_target(Target::sphere(Vector3::new(0.0, 1.0, 0.0), 1.0));
    let sphere = world.add_sphere(target, 1.0).unwrap();

    let body = world.get_body_mut(sphere).unwrap();
    body.set_damping(1.0);
    body.set_material(Material::new(0.0, 0.5));
    body.set_linear_velocity(Vector3::new(0.0, -4.0, 0.0));

    world.step(QUANTUM).unwrap();

    let velocity = world.get_body(sphere).unwrap().get_linear_velocity();
    assert_relative_eq!(velocity.y, 2.0, epsilon = 1e-4);
}

#[test]
fn test_slow_impacts_do_not_bounce() {
    let mut world = world_with(ResolutionStrategy::Iterative, GravityType::None);
    let target = world.add_target(Target::sphere(Vector3::new(0.0, 0.99, 0.0), 1.0));
    let sphere = world.add_sphere(target, 1.0).unwrap();

    let body = world.get_body_mut(sphere).unwrap();
    body.set_material(Material::new(0.0, 1.0));
    body.set_linear_velocity(Vector3::new(0.0, -0.2, 0.0));

    world.step(QUANTUM).unwrap();

    let velocity = world.get_body(sphere).unwrap().get_linear_velocity();
    assert!(velocity.y.abs() < 1e-4);
}

#[test]
fn test_friction_stays_inside_the_cone() {
    let mut world = world_with(ResolutionStrategy::Iterative, earth());
    let target = world.add_target(Target::cuboid(Transform::from_position(Vector3::new(0.0, 0.49, 0.0)), Vector3::new(0.5, 0.5, 0.5)));
    let cube = world.add_box(target, 1.0).unwrap();

    let body = world.get_body_mut(cube).unwrap();
    body.set_use_friction(true);
    body.set_material(Material::inelastic(0.2));
    body.set_linear_velocity(Vector3::new(5.0, -1.0, 0.0));

    world.step(QUANTUM).unwrap();

    let contacts = world.solver().contacts();
    assert_eq!(contacts.len(), 1);
    let contact = &contacts[0];
    assert!(contact.uses_friction());
    assert_relative_eq!(contact.friction(), 0.2);

    let impulse = contact.last_impulse();
    let tangential = (impulse.y * impulse.y + impulse.z * impulse.z).sqrt();
    assert!(impulse.x > 0.0);
    assert!(tangential > 0.0);
    assert!(tangential <= contact.friction() * impulse.x + 1e-4);

    // Sliding slowed down but did not reverse
    let velocity = world.get_body(cube).unwrap().get_linear_velocity();
    assert!(velocity.x < 5.0 && velocity.x > 0.0);
}

#[test]
fn test_frictionless_contacts_keep_sliding() {
    let mut world = world_with(ResolutionStrategy::Iterative, GravityType::None);
    let target = world.add_target(Target::sphere(Vector3::new(0.0, 0.99, 0.0), 1.0));
    let sphere = world.add_sphere(target, 1.0).unwrap();

    let body = world.get_body_mut(sphere).unwrap();
    body.set_damping(1.0);
    body.set_linear_velocity(Vector3::new(2.0, -1.0, 0.0));

    world.step(QUANTUM).unwrap();

    let contact = &world.solver().contacts()[0];
    assert_eq!(contact.last_impulse().y, 0.0);
    assert_eq!(contact.last_impulse().z, 0.0);
    assert_relative_eq!(world.get_body(sphere).unwrap().get_linear_velocity().x, 2.0, epsilon = 1e-5);
}

#[test]
fn test_overflow_is_not_fatal() {
    let mut config = SimulationConfig::default();
    config.gravity = GravityType::None;
    config.solver.contact_capacity = 4;
    let mut world = PhysicsWorld::with_config(config).unwrap();

    for i in 0..6 {
        let target = world.add_target(Target::sphere(Vector3::new(i as f32 * 0.5, 0.0, 0.0), 1.0));
        world.add_sphere(target, 1.0).unwrap();
    }

    assert_eq!(world.step(QUANTUM).unwrap(), 4);
    assert_eq!(world.solver().len(), 4);
    assert!(world.solver().overflowed());
    assert_eq!(world.solver().overflow_count(), 1);
    assert_eq!(world.solver().capacity(), 4);
}

#[test]
fn test_detection_is_repeatable() {
    let mut targets = TargetStorage::new();
    let mut bodies = BodyStorage::new();

    let mut active = Vec::new();
    for position in [Vector3::zero(), Vector3::new(1.5, 0.0, 0.0), Vector3::new(0.0, 1.2, 0.0)] {
        let target = targets.add(Target::sphere(position, 1.0));
        let body = RigidBody::new_sphere(target, targets.get(target).unwrap(), 1.0).unwrap();
        active.push(bodies.add(body));
    }

    let mut solver = Solver::default();
    let first = solver.detect_contacts(&active, &bodies, &targets, QUANTUM);
    assert_eq!(solver.state(), SolverState::DetectContacts);
    let snapshot: Vec<_> = solver
        .contacts()
        .iter()
        .map(|contact| (contact.bodies(), contact.point(), contact.normal(), contact.penetration()))
        .collect();

    let second = solver.detect_contacts(&active, &bodies, &targets, QUANTUM);
    let again: Vec<_> = solver
        .contacts()
        .iter()
        .map(|contact| (contact.bodies(), contact.point(), contact.normal(), contact.penetration()))
        .collect();

    assert_eq!(first, 3);
    assert_eq!(first, second);
    assert_eq!(snapshot, again);

    solver.resolve_contacts(&mut bodies, &mut targets, QUANTUM);
    assert_eq!(solver.state(), SolverState::Idle);
}

#[test]
fn test_pairs_are_tested_once() {
    let mut targets = TargetStorage::new();
    let mut bodies = BodyStorage::new();

    let a = targets.add(Target::sphere(Vector3::zero(), 1.0));
    let a = bodies.add(RigidBody::new_sphere(a, targets.get(a).unwrap(), 1.0).unwrap());
    let b = targets.add(Target::sphere(Vector3::new(1.0, 0.0, 0.0), 1.0));
    let b = bodies.add(RigidBody::new_sphere(b, targets.get(b).unwrap(), 1.0).unwrap());

    let mut solver = Solver::default();
    assert_eq!(solver.detect_contacts(&[a, b, a, b], &bodies, &targets, QUANTUM), 1);

    let contact = &solver.contacts()[0];
    assert_eq!(contact.first(), Some(a));
    assert_eq!(contact.second(), Some(b));
}

#[test]
fn test_sleeping_pairs_are_skipped() {
    let mut targets = TargetStorage::new();
    let mut bodies = BodyStorage::new();

    let mut active = Vec::new();
    for x in [0.0, 1.0] {
        let target = targets.add(Target::sphere(Vector3::new(x, 0.0, 0.0), 1.0));
        let mut body = RigidBody::new_sphere(target, targets.get(target).unwrap(), 1.0).unwrap();
        body.put_to_sleep();
        active.push(bodies.add(body));
    }

    let mut solver = Solver::default();
    assert_eq!(solver.detect_contacts(&active, &bodies, &targets, QUANTUM), 0);
    assert!(solver.is_empty());

    // One awake body is enough, and resolving the contact wakes the other
    bodies.get_mut(active[0]).unwrap().wake_up();
    assert_eq!(solver.detect_contacts(&active, &bodies, &targets, QUANTUM), 1);
    solver.resolve_contacts(&mut bodies, &mut targets, QUANTUM);
    assert!(bodies.get(active[1]).unwrap().is_awake());
}

#[test]
fn test_world_contacts_point_away_from_ground() {
    let mut world = world_with(ResolutionStrategy::Coarse, earth());
    let target = world.add_target(Target::sphere(Vector3::new(0.0, 0.9, 0.0), 1.0));
    let sphere = world.add_sphere(target, 1.0).unwrap();

    world.step(QUANTUM).unwrap();

    let contact = &world.solver().contacts()[0];
    assert_eq!(contact.first(), Some(sphere));
    assert_eq!(contact.second(), None);
    assert_relative_eq!(contact.normal(), Vector3::unit_y(), epsilon = 1e-6);

    // Pushed back out of the ground
    let y = world.get_body_target(sphere).unwrap().translation().y;
    assert!(y > 0.99, "sphere left at {}", y);
}

#[test]
fn test_strategy_can_be_switched() {
    let mut world = world_with(ResolutionStrategy::Iterative, earth());
    world.solver_mut().set_strategy(ResolutionStrategy::Coarse);
    assert_eq!(world.solver().config().strategy, ResolutionStrategy::Coarse);
}

#[test]
fn test_random_pile_stays_finite_and_above_ground() {
    let mut rng = StdRng::seed_from_u64(42);

    for strategy in [ResolutionStrategy::Iterative, ResolutionStrategy::Coarse] {
        let mut world = world_with(strategy, earth());
        let mut spheres = Vec::new();

        for _ in 0..20 {
            let position = Vector3::new(
                rng.gen_range(-3.0..3.0),
                rng.gen_range(1.0..6.0),
                rng.gen_range(-3.0..3.0),
            );
            let target = world.add_target(Target::sphere(position, 0.5));
            spheres.push(world.add_sphere(target, rng.gen_range(0.5..2.0)).unwrap());
        }

        for _ in 0..300 {
            world.step(QUANTUM).unwrap();
        }

        for &sphere in &spheres {
            let position = world.get_body_target(sphere).unwrap().translation();
            let velocity = world.get_body(sphere).unwrap().get_linear_velocity();
            assert!(position.x.is_finite() && position.y.is_finite() && position.z.is_finite());
            assert!(velocity.length().is_finite());
            assert!(position.y > 0.3, "{:?}: sphere sank to {}", strategy, position.y);
        }
    }
}

#[test]
fn test_coarse_resolves_each_contact_before_the_next() {
    let mut world = world_with(ResolutionStrategy::Coarse, GravityType::None);

    // A sinks into the ground and B overlaps it from the side, clear of the ground
    let a = world.add_target(Target::sphere(Vector3::new(0.0, 0.95, 0.0), 1.0));
    let a = world.add_sphere(a, 1.0).unwrap();
    let b = world.add_target(Target::sphere(Vector3::new(1.4, 0.95, 0.0), 0.5));
    let b = world.add_sphere(b, 1.0).unwrap();

    for handle in [a, b] {
        let body = world.get_body_mut(handle).unwrap();
        body.set_material(Material::inelastic(0.0));
        body.set_linear_velocity(Vector3::new(0.0, -1.0, 0.0));
    }

    assert_eq!(world.step(QUANTUM).unwrap(), 2);
    assert_eq!(world.solver().contacts()[0].first(), Some(a));
    assert_eq!(world.solver().contacts()[0].second(), None);

    // The ground impulse is computed before B shoves A aside, so it passes
    // through A's center and cannot spin it
    let body = world.get_body(a).unwrap();
    assert!(body.get_angular_velocity().length() < 1e-6, "spun to {:?}", body.get_angular_velocity());
    assert!(body.get_linear_velocity().y.abs() < 1e-4);
    assert!(world.get_body_target(a).unwrap().translation().x < 0.0);

    let stats = world.solver().last_resolution();
    assert_eq!(stats.position_iterations, 2);
    assert_eq!(stats.velocity_iterations, 2);
}

#[test]
fn test_iterative_reports_iterations() {
    let mut world = world_with(ResolutionStrategy::Iterative, earth());
    let target = world.add_target(Target::sphere(Vector3::new(0.0, 0.9, 0.0), 1.0));
    world.add_sphere(target, 1.0).unwrap();

    assert_eq!(world.step(QUANTUM).unwrap(), 1);

    let stats = world.solver().last_resolution();
    let limit = world.solver().config().iteration_factor;
    assert!(stats.position_iterations >= 1 && stats.position_iterations <= limit);
    assert!(stats.velocity_iterations >= 1 && stats.velocity_iterations <= limit);
}

fn add_resting_box(world: &mut PhysicsWorld, height: f32) -> BodyHandle {
    let target = world.add_target(Target::cuboid(
        Transform::from_position(Vector3::new(0.0, height, 0.0)),
        Vector3::new(0.5, 0.5, 0.5),
    ));
    let handle = world.add_box(target, 1.0).unwrap();
    world.get_body_mut(handle).unwrap().set_use_friction(true);
    handle
}

fn assert_upright(world: &PhysicsWorld, handle: BodyHandle) {
    let transform = world.get_body_target(handle).unwrap().transform();
    let rotation = transform.rotation;
    assert!(
        rotation.w.is_finite() && rotation.x.is_finite() && rotation.y.is_finite() && rotation.z.is_finite(),
        "orientation went non-finite: {:?}",
        rotation
    );
    let up = transform.axis(1);
    assert!(up.y > 0.98, "box tipped, up axis {:?}", up);
}

#[test]
fn test_box_settles_on_landscape() {
    let mut world = world_with(ResolutionStrategy::Iterative, earth());
    let cube = add_resting_box(&mut world, 0.5);

    for _ in 0..1000 {
        world.step(QUANTUM).unwrap();
        let y = world.get_body_target(cube).unwrap().translation().y;
        assert!((y - 0.5).abs() < 0.05, "box left its resting height: {}", y);
    }

    assert_upright(&world, cube);

    let body = world.get_body(cube).unwrap();
    let linear = body.get_linear_velocity().length();
    let angular = body.get_angular_velocity().length();
    assert!(
        body.is_sleeping() || (linear < 0.01 && angular < 0.01),
        "box still moving: linear {} angular {}",
        linear,
        angular
    );
}

#[test]
fn test_box_stack_stays_upright() {
    let mut world = world_with(ResolutionStrategy::Iterative, earth());
    let lower = add_resting_box(&mut world, 0.5);
    let upper = add_resting_box(&mut world, 1.5);

    for _ in 0..1000 {
        world.step(QUANTUM).unwrap();
    }

    let lower_position = world.get_body_target(lower).unwrap().translation();
    let upper_position = world.get_body_target(upper).unwrap().translation();
    let offset = upper_position - lower_position;

    assert!((lower_position.y - 0.5).abs() < 0.05, "lower box at {}", lower_position.y);
    assert!((offset.y - 1.0).abs() < 0.1, "boxes {} apart", offset.y);
    assert!(offset.x.abs() < 0.25 && offset.z.abs() < 0.25, "upper box slid to {:?}", offset);
    assert_upright(&world, lower);
    assert_upright(&world, upper);
}
