//! Headless runs over the generated room ring

use escher_world::ChunkId;
use testbed::{room_ring, Simulation, TestbedConfig};

fn simulation(walk: bool) -> Simulation {
    let mut config = TestbedConfig::default();
    config.simulation.walk = walk;
    Simulation::from_description(&room_ring(4).unwrap(), config).unwrap()
}

#[test]
fn test_view_down_the_ring_reaches_max_depth() {
    let mut simulation = simulation(false);
    let frame = simulation.step();

    assert_eq!(frame.active_chunk, ChunkId(0));
    assert!(frame.crossing.is_none());
    assert_eq!(frame.metrics.chunks, 4);
    assert_eq!(frame.metrics.depth, 4);
    assert_eq!(frame.metrics.breadth, 1);
    assert_eq!(
        simulation.recorder().chunks_drawn(),
        vec![ChunkId(0), ChunkId(1), ChunkId(2), ChunkId(3)]
    );
}

#[test]
fn test_standing_still_never_crosses() {
    let mut simulation = simulation(false);
    let summary = simulation.run(120);
    assert_eq!(summary.ticks, 120);
    assert_eq!(summary.crossings(), 0);
    assert_eq!(simulation.world().state().active_chunk, ChunkId(0));
}

#[test]
fn test_walking_north_cycles_rooms() {
    let mut simulation = simulation(true);
    let summary = simulation.run(800);

    assert!(summary.crossings() >= 2, "{summary}");
    let expected = [ChunkId(1), ChunkId(2), ChunkId(3), ChunkId(0)];
    assert_eq!(summary.route[..], expected[..summary.route.len().min(4)]);
    assert_eq!(summary.peak_depth, 4);
    assert_eq!(summary.stencil_reuses, 0);
    assert_eq!(simulation.world().state().active_chunk, *summary.route.last().unwrap());
}
