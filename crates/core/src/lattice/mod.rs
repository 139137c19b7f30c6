//! Lattice aggregate
//!
//! [`Lattice`] owns the gauge field together with the parameters, the selected
//! action, the Metropolis proposal pool and the master random stream. The field is
//! only reachable through the checked link accessors or as a whole.
//!
//! Observables, smearing, updates and the Dirac operator extend `Lattice` from their
//! own modules.

mod field;

pub use field::{shifted, GaugeField, Links, LinksMut, Shape, Site, N_DIMS, TIME};

use crate::action::{GaugeAction, LocalAction};
use crate::algebra::su3::reunitarize;
use crate::algebra::ColourMatrix;
use crate::config::{ActionKind, LatticeConfig};
use crate::error::{LatticeError, Result};
use crate::update::{ProposalPool, UpdateStats};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

/// Link address: four coordinates plus direction
pub type LinkIndex = [isize; 5];

/// Gauge configuration with its simulation state
#[derive(Debug, Clone)]
pub struct Lattice {
    pub(crate) config: LatticeConfig,
    pub(crate) field: GaugeField,
    pub(crate) action: GaugeAction,
    pub(crate) proposals: ProposalPool,
    pub(crate) rng: StdRng,
    pub(crate) n_updates: usize,
    pub(crate) stats: UpdateStats,
}

impl Lattice {
    /// Hot start: every link an independent random SU(3) matrix
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::InvalidParameter`] if the configuration fails validation.
    pub fn new(config: LatticeConfig) -> Result<Self> {
        config.validate()?;
        let shape = Shape::from_extents(config.extents());
        let mut rng = StdRng::seed_from_u64(config.seed);
        let proposals = ProposalPool::generate(&mut rng, config.proposal_pool_size, config.epsilon);
        let field = GaugeField::random(shape, &mut rng, config.epsilon);
        Ok(Self::assemble(config, field, proposals, rng, "hot"))
    }

    /// Cold start: every link the identity
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::InvalidParameter`] if the configuration fails validation.
    pub fn cold(config: LatticeConfig) -> Result<Self> {
        config.validate()?;
        let shape = Shape::from_extents(config.extents());
        let mut rng = StdRng::seed_from_u64(config.seed);
        let proposals = ProposalPool::generate(&mut rng, config.proposal_pool_size, config.epsilon);
        Ok(Self::assemble(
            config,
            GaugeField::identity(shape),
            proposals,
            rng,
            "cold",
        ))
    }

    /// Start from an existing field
    ///
    /// # Errors
    ///
    /// [`LatticeError::InvalidParameter`] for an invalid configuration,
    /// [`LatticeError::LayoutMismatch`] if the field shape disagrees with it.
    pub fn with_field(config: LatticeConfig, field: GaugeField) -> Result<Self> {
        config.validate()?;
        check_layout(Shape::from_extents(config.extents()), field.shape())?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let proposals = ProposalPool::generate(&mut rng, config.proposal_pool_size, config.epsilon);
        Ok(Self::assemble(config, field, proposals, rng, "supplied"))
    }

    fn assemble(
        config: LatticeConfig,
        field: GaugeField,
        proposals: ProposalPool,
        rng: StdRng,
        start: &str,
    ) -> Self {
        let action = GaugeAction::new(config.action, config.beta, config.u0);
        info!(
            shape = %field.shape(),
            beta = config.beta,
            u0 = config.u0,
            action = ?config.action,
            update_method = ?config.update_method,
            start,
            "Lattice created"
        );
        Self {
            config,
            field,
            action,
            proposals,
            rng,
            n_updates: 0,
            stats: UpdateStats::default(),
        }
    }

    /// Construction parameters
    pub fn config(&self) -> &LatticeConfig {
        &self.config
    }

    /// Lattice geometry
    pub fn shape(&self) -> Shape {
        self.field.shape()
    }

    /// Selected action discretization
    pub fn action_kind(&self) -> ActionKind {
        self.action.kind()
    }

    /// Current gauge field
    pub fn field(&self) -> &GaugeField {
        &self.field
    }

    /// Metropolis proposal pool
    pub fn proposals(&self) -> &ProposalPool {
        &self.proposals
    }

    /// Number of completed sweeps (sequential or domain-decomposed)
    pub fn n_updates(&self) -> usize {
        self.n_updates
    }

    /// Accumulated acceptance statistics
    pub fn stats(&self) -> UpdateStats {
        self.stats
    }

    /// Read one link; coordinates wrap, the direction must lie in `[0, 4)`
    ///
    /// # Errors
    ///
    /// [`LatticeError::InvalidDirection`] for a direction outside `[0, 4)`.
    pub fn get_link(&self, link: LinkIndex) -> Result<ColourMatrix> {
        let (site, direction) = split_link(link)?;
        Ok(self.field.link(&site, direction))
    }

    /// Overwrite one link without any group check
    ///
    /// # Errors
    ///
    /// [`LatticeError::InvalidDirection`] for a direction outside `[0, 4)`.
    pub fn set_link(&mut self, link: LinkIndex, value: ColourMatrix) -> Result<()> {
        let (site, direction) = split_link(link)?;
        self.field.set_link(&site, direction, value);
        Ok(())
    }

    /// Swap in a whole new field of the same shape
    ///
    /// # Errors
    ///
    /// [`LatticeError::LayoutMismatch`] if the shapes differ.
    pub fn replace_field(&mut self, field: GaugeField) -> Result<GaugeField> {
        check_layout(self.field.shape(), field.shape())?;
        Ok(std::mem::replace(&mut self.field, field))
    }

    /// Project every link back onto SU(3)
    pub fn reunitarize(&mut self) {
        self.field.map_in_place(reunitarize);
    }

    /// Action terms containing one link
    ///
    /// # Errors
    ///
    /// [`LatticeError::InvalidDirection`] for a direction outside `[0, 4)`.
    pub fn local_action(&self, link: LinkIndex) -> Result<f64> {
        let (site, direction) = split_link(link)?;
        Ok(self.action.local_action(&self.field, &site, direction))
    }

    /// Weighted staple sum of one link, `None` for the twisted-rectangle action
    ///
    /// # Errors
    ///
    /// [`LatticeError::InvalidDirection`] for a direction outside `[0, 4)`.
    pub fn staples(&self, link: LinkIndex) -> Result<Option<ColourMatrix>> {
        let (site, direction) = split_link(link)?;
        Ok(self.action.staples(&self.field, &site, direction))
    }
}

/// Split a link address into site and validated direction
pub(crate) fn split_link(link: LinkIndex) -> Result<(Site, usize)> {
    let direction = link[4];
    let site = [link[0], link[1], link[2], link[3]];
    check_direction(direction)?;
    Ok((site, direction as usize))
}

/// Reject directions outside `[0, 4)`
pub(crate) fn check_direction(direction: isize) -> Result<()> {
    if (0..N_DIMS as isize).contains(&direction) {
        Ok(())
    } else {
        warn!(direction, "invalid link direction");
        Err(LatticeError::InvalidDirection { direction })
    }
}

fn check_layout(expected: Shape, found: Shape) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(LatticeError::LayoutMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        })
    }
}
