//! Explicit transaction scope over [`SimulationState`].
//!
//! [`UnitOfWork::begin`] clones the live state into a private working
//! copy. All mutation happens on the copy. [`UnitOfWork::commit`] swaps it
//! into place; dropping the unit of work (or calling
//! [`UnitOfWork::rollback`]) discards it. Readers holding `&SimulationState`
//! therefore only ever see committed states.

use tracing::debug;

use crate::state::SimulationState;

/// An open transaction.
#[derive(Debug)]
pub struct UnitOfWork<'a> {
    live: &'a mut SimulationState,
    working: SimulationState,
}

impl<'a> UnitOfWork<'a> {
    /// Open a transaction over `live`.
    pub fn begin(live: &'a mut SimulationState) -> Self {
        let working = live.clone();
        Self { live, working }
    }

    /// The committed state as it was when the transaction began.
    pub fn committed(&self) -> &SimulationState {
        &*self.live
    }

    /// The working copy.
    pub const fn state(&self) -> &SimulationState {
        &self.working
    }

    /// The working copy, mutably.
    pub const fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.working
    }

    /// Replace the live state with the working copy.
    pub fn commit(self) {
        debug!(day = self.working.day(), "transaction committed");
        *self.live = self.working;
    }

    /// Discard the working copy.
    pub fn rollback(self) {
        debug!(day = self.live.day(), "transaction rolled back");
    }
}

#[cfg(test)]
mod tests {
    use logisim_types::{LocationId, ProductId};

    use super::*;

    #[test]
    fn commit_publishes_changes() {
        let mut live = SimulationState::empty();
        let here = LocationId::new();
        let product = ProductId::new();

        let mut uow = UnitOfWork::begin(&mut live);
        uow.state_mut().add_stock(here, product, 9);
        assert_eq!(uow.committed().stock(here), 0);
        assert_eq!(uow.state().stock(here), 9);
        uow.commit();

        assert_eq!(live.stock(here), 9);
    }

    #[test]
    fn drop_discards_changes() {
        let mut live = SimulationState::empty();
        {
            let mut uow = UnitOfWork::begin(&mut live);
            let _ = uow.state_mut().clock.advance();
        }
        assert_eq!(live.day(), 0);

        let mut uow = UnitOfWork::begin(&mut live);
        let _ = uow.state_mut().clock.advance();
        uow.rollback();
        assert_eq!(live.day(), 0);
    }
}
