//! Simulation parameters
//!
//! `LatticeConfig` carries everything needed to build a [`Lattice`](crate::Lattice):
//! geometry, couplings, Monte Carlo controls and the master seed. Defaults follow the
//! usual quenched setup at β = 5.5 on an 8⁴ lattice.

use crate::error::{LatticeError, Result};
use serde::{Deserialize, Serialize};

/// Gauge action discretization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ActionKind {
    /// Plain Wilson plaquette action
    #[default]
    Wilson,
    /// Tree-level rectangle-improved action
    Rectangle,
    /// Twisted-rectangle improved action
    TwistedRectangle,
}

impl ActionKind {
    /// External integer tag (0 = Wilson, 1 = rectangle, 2 = twisted rectangle)
    #[must_use]
    pub const fn tag(&self) -> i32 {
        match self {
            Self::Wilson => 0,
            Self::Rectangle => 1,
            Self::TwistedRectangle => 2,
        }
    }

    /// Whether the action is linear in every link, so a staple sum exists
    #[must_use]
    pub const fn has_staples(&self) -> bool {
        !matches!(self, Self::TwistedRectangle)
    }
}

impl TryFrom<i32> for ActionKind {
    type Error = LatticeError;

    fn try_from(tag: i32) -> Result<Self> {
        match tag {
            0 => Ok(Self::Wilson),
            1 => Ok(Self::Rectangle),
            2 => Ok(Self::TwistedRectangle),
            other => Err(LatticeError::InvalidParameter(format!(
                "unknown action tag {other}"
            ))),
        }
    }
}

/// Single-link update algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UpdateMethod {
    /// Cabibbo-Marinari pseudo-heatbath over the SU(2) subgroups
    Heatbath,
    /// Metropolis with a symmetric pool of SU(3) proposals
    #[default]
    Metropolis,
}

impl TryFrom<i32> for UpdateMethod {
    type Error = LatticeError;

    fn try_from(tag: i32) -> Result<Self> {
        match tag {
            0 => Ok(Self::Heatbath),
            1 => Ok(Self::Metropolis),
            other => Err(LatticeError::InvalidParameter(format!(
                "unknown update method {other}"
            ))),
        }
    }
}

/// Lattice construction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeConfig {
    /// Spatial edge length (sites per spatial dimension)
    pub edge_length: usize,
    /// Temporal extent, `None` for a hypercubic lattice
    pub temporal_extent: Option<usize>,
    /// Gauge coupling β
    pub beta: f64,
    /// Sweeps between saved configurations
    pub n_correlations: usize,
    /// Number of configurations a driver should produce
    pub n_configurations: usize,
    /// Spread of the Metropolis proposal matrices around the identity
    pub epsilon: f64,
    /// Lattice spacing a
    pub spacing: f64,
    /// Stout smearing weight ρ
    pub rho: f64,
    /// Tadpole improvement factor u0
    pub u0: f64,
    /// Gauge action
    pub action: ActionKind,
    /// Link update algorithm
    pub update_method: UpdateMethod,
    /// Use the domain-decomposed sweep for thermalization and decorrelation
    pub parallel: bool,
    /// Edge length of the blocks in the domain-decomposed sweep
    pub block_size: usize,
    /// Master seed for every random stream
    pub seed: u64,
    /// Number of drawn proposal matrices (each stored with its adjoint)
    pub proposal_pool_size: usize,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            edge_length: 8,
            temporal_extent: None,
            beta: 5.5,
            n_correlations: 50,
            n_configurations: 1000,
            epsilon: 0.24,
            spacing: 0.25,
            rho: 0.3,
            u0: 1.0,
            action: ActionKind::Wilson,
            update_method: UpdateMethod::Metropolis,
            parallel: true,
            block_size: 2,
            seed: 42,
            proposal_pool_size: 200,
        }
    }
}

impl LatticeConfig {
    /// Set the spatial edge length
    pub fn with_edge_length(mut self, edge_length: usize) -> Self {
        self.edge_length = edge_length;
        self
    }

    /// Set a temporal extent different from the spatial edge length
    pub fn with_temporal_extent(mut self, temporal_extent: usize) -> Self {
        self.temporal_extent = Some(temporal_extent);
        self
    }

    /// Set the gauge coupling β
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    /// Set the number of sweeps between configurations
    pub fn with_n_correlations(mut self, n_correlations: usize) -> Self {
        self.n_correlations = n_correlations;
        self
    }

    /// Set the number of configurations to generate
    pub fn with_n_configurations(mut self, n_configurations: usize) -> Self {
        self.n_configurations = n_configurations;
        self
    }

    /// Set the proposal spread
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the lattice spacing
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    /// Set the smearing weight
    pub fn with_rho(mut self, rho: f64) -> Self {
        self.rho = rho;
        self
    }

    /// Set the tadpole factor
    pub fn with_u0(mut self, u0: f64) -> Self {
        self.u0 = u0;
        self
    }

    /// Select the gauge action
    pub fn with_action(mut self, action: ActionKind) -> Self {
        self.action = action;
        self
    }

    /// Select the link update algorithm
    pub fn with_update_method(mut self, update_method: UpdateMethod) -> Self {
        self.update_method = update_method;
        self
    }

    /// Toggle the domain-decomposed sweep
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the block edge length of the domain-decomposed sweep
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Set the master seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of drawn proposal matrices
    pub fn with_proposal_pool_size(mut self, proposal_pool_size: usize) -> Self {
        self.proposal_pool_size = proposal_pool_size;
        self
    }

    /// Extents in (t, x, y, z) order
    #[must_use]
    pub fn extents(&self) -> [usize; 4] {
        let l = self.edge_length;
        [self.temporal_extent.unwrap_or(l), l, l, l]
    }

    /// Check parameters for consistency
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::InvalidParameter`] for non-positive extents or couplings,
    /// an empty proposal pool, or heatbath combined with an action that has no staple.
    pub fn validate(&self) -> Result<()> {
        if self.extents().contains(&0) {
            return Err(LatticeError::InvalidParameter(format!(
                "lattice extents must be positive, got {:?}",
                self.extents()
            )));
        }
        for (name, value) in [
            ("beta", self.beta),
            ("spacing", self.spacing),
            ("u0", self.u0),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(LatticeError::InvalidParameter(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        if !(self.epsilon.is_finite() && self.epsilon >= 0.0) {
            return Err(LatticeError::InvalidParameter(format!(
                "epsilon must be non-negative, got {}",
                self.epsilon
            )));
        }
        if !self.rho.is_finite() {
            return Err(LatticeError::InvalidParameter(format!(
                "rho must be finite, got {}",
                self.rho
            )));
        }
        if self.proposal_pool_size == 0 {
            return Err(LatticeError::InvalidParameter(
                "proposal pool must hold at least one matrix".to_string(),
            ));
        }
        if self.block_size == 0 {
            return Err(LatticeError::InvalidParameter(
                "block size must be positive".to_string(),
            ));
        }
        if self.update_method == UpdateMethod::Heatbath && !self.action.has_staples() {
            return Err(LatticeError::InvalidParameter(format!(
                "heatbath needs a staple sum, which {:?} does not provide",
                self.action
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = LatticeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.extents(), [8, 8, 8, 8]);
        assert_eq!(config.proposal_pool_size, 200);
    }

    #[test]
    fn test_action_tags() {
        for kind in [
            ActionKind::Wilson,
            ActionKind::Rectangle,
            ActionKind::TwistedRectangle,
        ] {
            assert_eq!(ActionKind::try_from(kind.tag()), Ok(kind));
        }
        assert!(matches!(
            ActionKind::try_from(3),
            Err(LatticeError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_anisotropic_extents() {
        let config = LatticeConfig::default()
            .with_edge_length(4)
            .with_temporal_extent(8);
        assert_eq!(config.extents(), [8, 4, 4, 4]);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(LatticeConfig::default().with_beta(0.0).validate().is_err());
        assert!(LatticeConfig::default().with_u0(-1.0).validate().is_err());
        assert!(LatticeConfig::default()
            .with_edge_length(0)
            .validate()
            .is_err());
        assert!(LatticeConfig::default()
            .with_proposal_pool_size(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_heatbath_requires_staples() {
        let config = LatticeConfig::default()
            .with_action(ActionKind::TwistedRectangle)
            .with_update_method(UpdateMethod::Heatbath);
        assert!(config.validate().is_err());

        let config = config.with_action(ActionKind::Rectangle);
        assert!(config.validate().is_ok());
    }
}
