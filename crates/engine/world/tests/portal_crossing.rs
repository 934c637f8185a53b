//! End-to-end crossing tests
//!
//! Two chunks joined by a single doorway: walking through it must switch the
//! active chunk without any visible jump in world space.

use escher_core::{CameraConfig, Mesh, OrientedFrame, Triangle};
use escher_physics::{CharacterControllerConfig, ControlInput};
use escher_world::{portal_transform, Chunk, ChunkId, CrossingConfig, Portal, PortalGraph, World};
use glam::{Mat4, Vec3};

const A: ChunkId = ChunkId(0);
const B: ChunkId = ChunkId(1);

fn floor() -> Mesh {
    Mesh::from_triangles([Triangle::new(
        Vec3::new(-10.0, 0.0, 10.0),
        Vec3::new(10.0, 0.0, 10.0),
        Vec3::new(0.0, 0.0, -20.0),
    )])
}

fn local_frame() -> OrientedFrame {
    OrientedFrame::new(Vec3::new(0.0, 0.0, 1.0), Vec3::Z, Vec3::Y)
}

fn remote_frame() -> OrientedFrame {
    OrientedFrame::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y)
}

/// Chunk A has a doorway at z = 1 facing +Z that opens into chunk B
fn doorway_world() -> World {
    let doorway = Mesh::quad(
        Vec3::new(-1.0, 0.0, 1.0),
        Vec3::new(1.0, 0.0, 1.0),
        Vec3::new(1.0, 2.0, 1.0),
        Vec3::new(-1.0, 2.0, 1.0),
    );
    let forward = Portal::new(Some(B), 1, doorway, local_frame(), remote_frame()).unwrap();
    let back = forward.mirrored(A);

    let graph = PortalGraph::new(vec![
        Chunk::new("a", floor()).with_portal(forward),
        Chunk::new("b", floor()).with_portal(back),
    ])
    .unwrap();

    let mut world = World::new(
        graph,
        A,
        Vec3::new(0.0, 1.5, 3.0),
        CharacterControllerConfig::default(),
        CrossingConfig::default(),
    )
    .unwrap();
    world.controller_mut().look_towards(Vec3::NEG_Z);
    world
}

/// Walk forward until a crossing happens, returning the tick it happened on
fn walk_until_crossing(world: &mut World, limit: usize) -> Option<usize> {
    (0..limit).find(|_| world.update(&ControlInput::walk()).crossing.is_some())
}

#[test]
fn test_walking_through_doorway_switches_chunk() {
    let mut world = doorway_world();

    let tick = walk_until_crossing(&mut world, 200);
    assert!(tick.is_some(), "controller never reached the doorway");

    assert_eq!(world.state().active_chunk, B);
    let expected = portal_transform(&local_frame(), &remote_frame());
    assert!(
        world.state().orientation.abs_diff_eq(expected, 1e-5),
        "orientation should be the portal transform, got {:?}",
        world.state().orientation
    );
}

#[test]
fn test_world_velocity_is_continuous_across_crossing() {
    let mut world = doorway_world();
    let camera = CameraConfig::default();

    let mut crossed = false;
    for _ in 0..200 {
        let view_before = world.camera_view(&camera, 1.0);
        let report = world.update(&ControlInput::walk());
        let view_after = world.camera_view(&camera, 1.0);

        let direction = report.world_motion.normalize_or_zero();
        assert!(
            direction.abs_diff_eq(Vec3::NEG_Z, 1e-4),
            "world-space motion turned to {direction:?}"
        );
        assert!(
            view_after.direction.abs_diff_eq(view_before.direction, 1e-4),
            "view direction jumped from {:?} to {:?}",
            view_before.direction,
            view_after.direction
        );
        assert!(
            (view_before.eye + report.world_motion).abs_diff_eq(view_after.eye, 1e-4),
            "eye jumped from {:?} to {:?}",
            view_before.eye,
            view_after.eye
        );

        if report.crossing.is_some() {
            crossed = true;
            // Keep walking a few ticks on the far side
            for _ in 0..10 {
                let report = world.update(&ControlInput::walk());
                assert!(report.crossing.is_none(), "crossed straight back");
                assert!(report.world_motion.normalize_or_zero().abs_diff_eq(Vec3::NEG_Z, 1e-4));
            }
            break;
        }
    }
    assert!(crossed);
}

#[test]
fn test_walking_back_restores_orientation() {
    let mut world = doorway_world();
    assert!(walk_until_crossing(&mut world, 200).is_some());

    for _ in 0..20 {
        world.update(&ControlInput::walk());
    }
    assert_eq!(world.state().active_chunk, B);

    // In B's frame the doorway faces +Z, so turn around to walk back through it
    world.controller_mut().look_towards(Vec3::NEG_Z);
    assert!(walk_until_crossing(&mut world, 200).is_some(), "never found the way back");

    assert_eq!(world.state().active_chunk, A);
    assert!(
        world.state().orientation.abs_diff_eq(Mat4::IDENTITY, 1e-4),
        "round trip should cancel out, got {:?}",
        world.state().orientation
    );
}

#[test]
fn test_crossing_happens_once_per_doorway() {
    let mut world = doorway_world();
    let crossings = (0..200)
        .filter(|_| world.update(&ControlInput::walk()).crossing.is_some())
        .count();
    assert_eq!(crossings, 1);
}
