//! Fixed-step headless run: update the world, then render it into a recorder

use std::fmt;

use escher_physics::ControlInput;
use escher_renderer::{render_world, CommandRecorder, RenderMetrics};
use escher_world::{ChunkId, Crossing, World, WorldDescription, WorldError};
use tracing::{debug, info};

use crate::config::TestbedConfig;

/// One simulated and rendered tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub tick: u64,
    pub active_chunk: ChunkId,
    pub crossing: Option<Crossing>,
    pub metrics: RenderMetrics,
    /// Commands submitted to the recorder
    pub commands: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    /// Chunks entered, in order
    pub route: Vec<ChunkId>,
    pub peak_chunks: usize,
    pub peak_depth: usize,
    pub peak_queue: usize,
    pub stencil_reuses: usize,
}

impl RunSummary {
    pub fn crossings(&self) -> usize {
        self.route.len()
    }

    fn record(&mut self, frame: &FrameReport) {
        self.ticks += 1;
        if let Some(crossing) = &frame.crossing {
            self.route.push(crossing.to);
        }
        self.peak_chunks = self.peak_chunks.max(frame.metrics.chunks);
        self.peak_depth = self.peak_depth.max(frame.metrics.depth);
        self.peak_queue = self.peak_queue.max(frame.metrics.peak_queue);
        self.stencil_reuses += frame.metrics.stencil_reuses;
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ticks, {} crossings, peak chunks: {} depth: {} queue: {}, stencil reuses: {}",
            self.ticks,
            self.crossings(),
            self.peak_chunks,
            self.peak_depth,
            self.peak_queue,
            self.stencil_reuses
        )
    }
}

pub struct Simulation {
    world: World,
    config: TestbedConfig,
    recorder: CommandRecorder,
    tick: u64,
}

impl Simulation {
    pub fn new(world: World, config: TestbedConfig) -> Self {
        Self {
            world,
            config,
            recorder: CommandRecorder::new(),
            tick: 0,
        }
    }

    pub fn from_description(
        description: &WorldDescription,
        config: TestbedConfig,
    ) -> Result<Self, WorldError> {
        let world = World::from_description(description, config.controller, config.crossing)?;
        Ok(Self::new(world, config))
    }

    fn input(&self) -> ControlInput {
        if self.config.simulation.walk {
            ControlInput::walk()
        } else {
            ControlInput::default()
        }
    }

    /// Advance one tick and render the result
    pub fn step(&mut self) -> FrameReport {
        let input = self.input();
        let update = self.world.update(&input);
        if let Some(crossing) = &update.crossing {
            info!(
                "Tick {}: entered chunk {} through portal {}",
                self.tick, crossing.to, crossing.portal_id
            );
        }

        let camera = self
            .world
            .camera_view(&self.config.camera, self.config.simulation.aspect);
        let metrics = render_world(
            self.world.graph(),
            self.world.state(),
            &camera,
            &self.config.traversal,
            &mut self.recorder,
        );
        debug!("Tick {}: {}", self.tick, metrics);

        let report = FrameReport {
            tick: self.tick,
            active_chunk: self.world.state().active_chunk,
            crossing: update.crossing,
            metrics,
            commands: self.recorder.commands().len(),
        };
        self.tick += 1;
        report
    }

    pub fn run(&mut self, ticks: u64) -> RunSummary {
        let mut summary = RunSummary::default();
        for _ in 0..ticks {
            let frame = self.step();
            summary.record(&frame);
        }
        summary
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn recorder(&self) -> &CommandRecorder {
        &self.recorder
    }

    pub fn config(&self) -> &TestbedConfig {
        &self.config
    }
}
