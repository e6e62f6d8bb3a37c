//! Headless exploration loop.
//!
//! Each step grows the explored region by one cell horizontally, then
//! re-observes every explored cell against the (slowly drifting) world noise,
//! and finally lets memory pick up anything seen for the first time. Memory
//! keeps the first element it saw at a cell even when later observations
//! disagree.

use alchemy_discovery::{BitGridExtender, CopyDiscoveryExtender, DiscoveryExtender, find_blocks};
use alchemy_grid::{BitGrid, Coord, Extent, PersistentTreeGrid, VisitStatus};
use fastnoise_lite::{FastNoiseLite, NoiseType};

use crate::scenario::{NoiseConfig, Scenario};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u16);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepReport {
    pub step: usize,
    pub explored: u64,
    pub observed_writes: usize,
    pub remembered_writes: usize,
}

pub struct ElementSampler {
    noise: FastNoiseLite,
    count: u16,
    drift: f32,
    void_below: f32,
}

impl ElementSampler {
    pub fn new(cfg: &NoiseConfig, count: u16) -> Self {
        let mut noise = FastNoiseLite::with_seed(cfg.seed);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(cfg.frequency));
        Self {
            noise,
            count: count.max(1),
            drift: cfg.drift,
            void_below: cfg.void_below,
        }
    }

    /// Element visible at `c` during `step`, or `None` for empty space.
    pub fn sample(&self, c: Coord, step: usize) -> Option<ElementId> {
        let t = step as f32 * self.drift;
        let n = self
            .noise
            .get_noise_3d(c.x as f32, c.y as f32, c.z as f32 + t);
        if n < self.void_below {
            return None;
        }
        let u = ((n + 1.0) * 0.5).clamp(0.0, 1.0);
        let idx = ((u * f32::from(self.count)) as u16).min(self.count - 1);
        Some(ElementId(idx))
    }
}

pub struct Simulation {
    explored: BitGrid,
    observed: PersistentTreeGrid<ElementId>,
    memory: PersistentTreeGrid<ElementId>,
    sampler: ElementSampler,
    elements: Vec<String>,
    step: usize,
}

impl Simulation {
    pub fn from_scenario(scenario: &Scenario) -> Self {
        let mut explored = BitGrid::new();
        for seed in &scenario.seeds {
            explored.set_extent(seed.extent(), true);
        }
        let count = u16::try_from(scenario.elements.len()).unwrap_or(u16::MAX);
        log::info!(
            "scenario: {} seed cell(s), {} element(s), noise seed {}",
            explored.count(),
            count,
            scenario.noise.seed
        );
        Self {
            explored,
            observed: PersistentTreeGrid::new(),
            memory: PersistentTreeGrid::new(),
            sampler: ElementSampler::new(&scenario.noise, count),
            elements: scenario.elements.clone(),
            step: 0,
        }
    }

    pub fn step(&mut self) -> StepReport {
        self.step += 1;
        let step = self.step;
        let grown = BitGridExtender::new(&self.explored).run();

        let sampler = &self.sampler;
        let mut observe = DiscoveryExtender::new(&grown, self.observed.clone(), |c: Coord| {
            sampler.sample(c, step)
        });
        grown.visit_blocks(&mut observe);
        let observed_writes = observe.writes();
        self.observed = observe.into_grid();

        let mut remember = CopyDiscoveryExtender::new(&grown, self.memory.clone(), &self.observed);
        grown.visit_blocks(&mut remember);
        let remembered_writes = remember.writes();
        self.memory = remember.into_grid();

        self.explored = grown;
        let report = StepReport {
            step,
            explored: self.explored.count(),
            observed_writes,
            remembered_writes,
        };
        log::debug!("{:?}", report);
        report
    }

    pub fn run(&mut self, steps: usize) -> Vec<StepReport> {
        (0..steps).map(|_| self.step()).collect()
    }

    #[inline]
    pub fn steps_taken(&self) -> usize {
        self.step
    }

    #[inline]
    pub fn explored(&self) -> &BitGrid {
        &self.explored
    }

    #[inline]
    pub fn observed(&self) -> &PersistentTreeGrid<ElementId> {
        &self.observed
    }

    #[inline]
    pub fn memory(&self) -> &PersistentTreeGrid<ElementId> {
        &self.memory
    }

    pub fn element_name(&self, id: ElementId) -> &str {
        self.elements
            .get(usize::from(id.0))
            .map_or("?", String::as_str)
    }

    /// Remembered cells whose current observation differs.
    pub fn stale_cells(&self) -> u64 {
        let mut stale = 0u64;
        self.memory.visit_blocks(&mut |e: Extent, v: &ElementId| {
            stale += e
                .cells()
                .filter(|c| self.observed.get(c.x, c.y, c.z) != Some(v))
                .count() as u64;
            VisitStatus::Continue
        });
        stale
    }

    /// Remembered cell count per element, in element order.
    pub fn memory_histogram(&self) -> Vec<(String, u64)> {
        let mut counts = vec![0u64; self.elements.len()];
        self.memory.visit_blocks(&mut |e: Extent, v: &ElementId| {
            if let Some(n) = counts.get_mut(usize::from(v.0)) {
                *n += e.volume();
            }
            VisitStatus::Continue
        });
        self.elements.iter().cloned().zip(counts).collect()
    }

    /// Remembered cells inside `extent` per element name, in element order,
    /// followed by the count of cells with nothing remembered (`"-"`).
    pub fn remembered_in(&self, extent: Extent) -> Vec<(&str, u64)> {
        let mut counts = vec![0u64; self.elements.len()];
        let mut unseen = 0u64;
        for c in extent.cells() {
            match self.memory.get(c.x, c.y, c.z) {
                Some(id) => {
                    if let Some(n) = counts.get_mut(usize::from(id.0)) {
                        *n += 1;
                    }
                }
                None => unseen += 1,
            }
        }
        let mut out: Vec<(&str, u64)> = self
            .elements
            .iter()
            .map(String::as_str)
            .zip(counts)
            .filter(|&(_, n)| n > 0)
            .collect();
        if unseen > 0 {
            out.push(("-", unseen));
        }
        out
    }

    /// Every block of the explored grid as the traversal reports it.
    pub fn explored_blocks(&self) -> Vec<(Extent, bool)> {
        find_blocks(&self.explored)
    }
}
