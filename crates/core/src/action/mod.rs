//! Local gauge actions
//!
//! The updater only ever needs the part of the action that depends on one link.
//! Each discretization implements [`LocalAction`]; the lattice picks one at
//! construction as a [`GaugeAction`] and dispatches on it once per sweep, so the
//! per-link loop runs against a concrete type.

mod rectangle;
mod twisted;
mod wilson;

pub use rectangle::RectangleAction;
pub use twisted::TwistedRectangleAction;
pub use wilson::WilsonAction;

use crate::algebra::ColourMatrix;
use crate::config::ActionKind;
use crate::lattice::{Links, Site, N_DIMS};

/// Action contribution of a single link
pub trait LocalAction: Send + Sync {
    /// Terms of the action containing `U_direction(site)`
    fn local_action<L: Links + ?Sized>(&self, links: &L, site: &Site, direction: usize) -> f64;

    /// Weighted staple sum `A` with `local_action = −Re Tr(U A) / 3`
    ///
    /// `None` when the action is not linear in the link.
    fn staples<L: Links + ?Sized>(
        &self,
        _links: &L,
        _site: &Site,
        _direction: usize,
    ) -> Option<ColourMatrix> {
        None
    }
}

/// Directions orthogonal to `direction`
pub(crate) fn orthogonal(direction: usize) -> impl Iterator<Item = usize> {
    (0..N_DIMS).filter(move |&nu| nu != direction)
}

/// Action selected for a lattice
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GaugeAction {
    /// Wilson plaquette action
    Wilson(WilsonAction),
    /// Rectangle-improved action
    Rectangle(RectangleAction),
    /// Twisted-rectangle improved action
    TwistedRectangle(TwistedRectangleAction),
}

impl GaugeAction {
    /// Build the action for `kind` with coupling `beta` and tadpole factor `u0`
    pub fn new(kind: ActionKind, beta: f64, u0: f64) -> Self {
        match kind {
            ActionKind::Wilson => Self::Wilson(WilsonAction::new(beta, u0)),
            ActionKind::Rectangle => Self::Rectangle(RectangleAction::new(beta, u0)),
            ActionKind::TwistedRectangle => {
                Self::TwistedRectangle(TwistedRectangleAction::new(beta, u0))
            }
        }
    }

    /// Discretization tag
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Wilson(_) => ActionKind::Wilson,
            Self::Rectangle(_) => ActionKind::Rectangle,
            Self::TwistedRectangle(_) => ActionKind::TwistedRectangle,
        }
    }
}

impl LocalAction for GaugeAction {
    fn local_action<L: Links + ?Sized>(&self, links: &L, site: &Site, direction: usize) -> f64 {
        match self {
            Self::Wilson(action) => action.local_action(links, site, direction),
            Self::Rectangle(action) => action.local_action(links, site, direction),
            Self::TwistedRectangle(action) => action.local_action(links, site, direction),
        }
    }

    fn staples<L: Links + ?Sized>(
        &self,
        links: &L,
        site: &Site,
        direction: usize,
    ) -> Option<ColourMatrix> {
        match self {
            Self::Wilson(action) => action.staples(links, site, direction),
            Self::Rectangle(action) => action.staples(links, site, direction),
            Self::TwistedRectangle(action) => action.staples(links, site, direction),
        }
    }
}
