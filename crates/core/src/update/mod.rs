//! Gauge field update engine
//!
//! Single-link updates (Metropolis or heatbath) combined into sweeps:
//!
//! - [`Lattice::update`] visits every link once, in site-index order, from the
//!   lattice's own random stream.
//! - [`Lattice::schwarz_update`] splits the lattice into parity-coloured blocks and
//!   updates all blocks of one colour in parallel on the rayon pool, one colour
//!   class after another. Each block task draws from its own stream seeded by
//!   [`stream_seed`], so the result does not depend on the number of threads.
//!
//! Every sweep call adds one to the lattice's update counter.

mod heatbath;
mod metropolis;
mod schwarz;

pub use metropolis::ProposalPool;
pub use schwarz::{Block, BlockDecomposition, BlockView, Colour};

use crate::action::{GaugeAction, LocalAction};
use crate::algebra::ColourMatrix;
use crate::config::UpdateMethod;
use crate::error::Result;
use crate::lattice::{Lattice, LinksMut, Site, N_DIMS};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Sweeps per block during thermalization
const THERMALIZATION_BLOCK_SWEEPS: usize = 10;

/// Sweeps per block when advancing to the next configuration
const DECORRELATION_BLOCK_SWEEPS: usize = 1;

/// Acceptance counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStats {
    /// Link updates attempted
    pub proposed: u64,
    /// Link updates that changed the link
    pub accepted: u64,
}

impl UpdateStats {
    /// Fraction of accepted proposals, 0 before any update
    pub fn acceptance_rate(&self) -> f64 {
        if self.proposed == 0 {
            0.0
        } else {
            self.accepted as f64 / self.proposed as f64
        }
    }

    /// Add another set of counters
    pub fn merge(&mut self, other: &Self) {
        self.proposed += other.proposed;
        self.accepted += other.accepted;
    }
}

/// Seed of the random stream for one block of one sweep
///
/// Mixes the master seed, the sweep counter and the block index with splitmix64
/// finalizers, so neighbouring blocks and sweeps get unrelated streams.
pub fn stream_seed(master: u64, sweep: u64, block: u64) -> u64 {
    [sweep, block]
        .iter()
        .fold(mix(master), |state, &word| mix(state ^ mix(word)))
}

fn mix(seed: u64) -> u64 {
    let mut x = seed.wrapping_add(0x9E3779B97F4A7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D049BB133111EB);
    x ^ (x >> 31)
}

/// Single-link update rule bound to one action
struct LinkUpdater<'a, A> {
    action: &'a A,
    method: UpdateMethod,
    proposals: &'a ProposalPool,
}

impl<'a, A: LocalAction> LinkUpdater<'a, A> {
    fn new(action: &'a A, method: UpdateMethod, proposals: &'a ProposalPool) -> Self {
        Self {
            action,
            method,
            proposals,
        }
    }

    fn update_link<L, R>(&self, links: &mut L, site: &Site, direction: usize, rng: &mut R) -> bool
    where
        L: LinksMut + ?Sized,
        R: Rng + ?Sized,
    {
        match self.method {
            UpdateMethod::Metropolis => metropolis::metropolis_step(
                links,
                self.action,
                self.proposals,
                site,
                direction,
                rng,
            ),
            UpdateMethod::Heatbath => {
                heatbath::heatbath_step(links, self.action, site, direction, rng)
            }
        }
    }

    /// Update every link based at `sites`, all four directions per site
    fn sweep<L, R>(
        &self,
        links: &mut L,
        sites: impl Iterator<Item = Site>,
        rng: &mut R,
        stats: &mut UpdateStats,
    ) where
        L: LinksMut + ?Sized,
        R: Rng + ?Sized,
    {
        for site in sites {
            for direction in 0..N_DIMS {
                stats.proposed += 1;
                if self.update_link(links, &site, direction, rng) {
                    stats.accepted += 1;
                }
            }
        }
    }
}

/// Run `$body` with `$action` bound to the concrete action type
macro_rules! with_action {
    ($gauge_action:expr, $action:ident => $body:expr) => {
        match $gauge_action {
            GaugeAction::Wilson($action) => $body,
            GaugeAction::Rectangle($action) => $body,
            GaugeAction::TwistedRectangle($action) => $body,
        }
    };
}

impl Lattice {
    /// One sequential sweep over every link
    pub fn update(&mut self) {
        let shape = self.field.shape();
        let method = self.config.update_method;
        let mut stats = UpdateStats::default();

        with_action!(self.action, action => {
            LinkUpdater::new(&action, method, &self.proposals).sweep(
                &mut self.field,
                shape.sites(),
                &mut self.rng,
                &mut stats,
            );
        });

        self.finish_sweep(&stats, "sequential");
    }

    /// One domain-decomposed sweep
    ///
    /// Each block of edge `block_size` receives `n_updates_per_block` sweeps of its
    /// own links. Blocks of one colour run concurrently; the colour classes run one
    /// after another.
    ///
    /// # Errors
    ///
    /// [`LatticeError::InvalidBlockSize`](crate::LatticeError::InvalidBlockSize) if the
    /// blocks cannot tile the lattice. The field is left untouched in that case.
    pub fn schwarz_update(&mut self, block_size: usize, n_updates_per_block: usize) -> Result<()> {
        let decomposition = BlockDecomposition::new(self.field.shape(), block_size)?;
        let master = self.config.seed;
        let sweep = self.n_updates as u64;
        let method = self.config.update_method;
        let mut stats = UpdateStats::default();

        with_action!(self.action, action => {
            let updater = LinkUpdater::new(&action, method, &self.proposals);
            for colour in Colour::all() {
                let field = &self.field;
                let results: Vec<(Block, Vec<ColourMatrix>, UpdateStats)> = decomposition
                    .blocks(colour)
                    .par_iter()
                    .map(|block| {
                        let mut rng =
                            StdRng::seed_from_u64(stream_seed(master, sweep, block.index as u64));
                        let mut view = BlockView::new(field, *block);
                        let mut block_stats = UpdateStats::default();
                        for _ in 0..n_updates_per_block {
                            updater.sweep(&mut view, block.sites(), &mut rng, &mut block_stats);
                        }
                        (*block, view.into_links(), block_stats)
                    })
                    .collect();

                for (block, links, block_stats) in results {
                    schwarz::write_back(&mut self.field, &block, &links);
                    stats.merge(&block_stats);
                }
            }
        });

        self.finish_sweep(&stats, "schwarz");
        Ok(())
    }

    fn finish_sweep(&mut self, stats: &UpdateStats, kind: &str) {
        self.n_updates += 1;
        self.stats.merge(stats);
        debug!(
            kind,
            sweep = self.n_updates,
            acceptance = stats.acceptance_rate(),
            "Sweep complete"
        );
    }

    /// Bring the field to equilibrium
    ///
    /// Sweeps until the update counter reaches five correlation lengths, using the
    /// domain-decomposed sweep (ten sweeps per block) when `parallel` is set.
    ///
    /// # Errors
    ///
    /// [`LatticeError::InvalidBlockSize`](crate::LatticeError::InvalidBlockSize) if the
    /// configured block size cannot tile the lattice.
    pub fn thermalize(&mut self) -> Result<()> {
        let target = 5 * self.config.n_correlations;
        info!(
            from = self.n_updates,
            to = target,
            parallel = self.config.parallel,
            "Thermalizing"
        );
        while self.n_updates < target {
            self.sweep_once(THERMALIZATION_BLOCK_SWEEPS)?;
        }
        info!(
            sweeps = self.n_updates,
            plaquette = self.compute_average_plaquette(),
            acceptance = self.stats.acceptance_rate(),
            "Thermalization complete"
        );
        Ok(())
    }

    /// Advance by one correlation length of sweeps
    ///
    /// # Errors
    ///
    /// [`LatticeError::InvalidBlockSize`](crate::LatticeError::InvalidBlockSize) if the
    /// configured block size cannot tile the lattice.
    pub fn next_configuration(&mut self) -> Result<()> {
        for _ in 0..self.config.n_correlations {
            self.sweep_once(DECORRELATION_BLOCK_SWEEPS)?;
        }
        Ok(())
    }

    fn sweep_once(&mut self, block_sweeps: usize) -> Result<()> {
        if self.config.parallel {
            self.schwarz_update(self.config.block_size, block_sweeps)
        } else {
            self.update();
            Ok(())
        }
    }
}
