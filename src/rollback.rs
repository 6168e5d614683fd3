use std::ops::{Deref, DerefMut};

use crate::{
    history::{HistoryEntry, INVALID_TIME},
    integrator::IntegratorType,
    FmiStatus, Fmu, ModelExchange, ModelWrapper,
};

/// An [`Fmu`] that can be integrated to a stop time before its current time.
///
/// One snapshot of time and continuous states is kept. [`Self::integrate`] with a stop time in
/// the past first rolls back to that snapshot and then integrates forward again. The first saved
/// snapshot is kept until it is released with [`Self::release_rollback_state`].
#[derive(Debug)]
pub struct RollbackFmu<M: ModelExchange> {
    fmu: Fmu<M>,
    rollback_state: HistoryEntry,
    rollback_state_saved: bool,
}

impl<M: ModelExchange> RollbackFmu<M> {
    pub fn new(model: M) -> Self {
        Self::from_fmu(Fmu::new(model))
    }

    pub fn with_integrator(model: M, integrator: IntegratorType) -> Self {
        Self::from_fmu(Fmu::with_integrator(model, integrator))
    }

    pub fn from_fmu(fmu: Fmu<M>) -> Self {
        let n_states = fmu.n_states();
        Self {
            fmu,
            rollback_state: HistoryEntry::with_sizes(0.0, n_states, 0),
            rollback_state_saved: false,
        }
    }

    pub fn into_inner(self) -> Fmu<M> {
        self.fmu
    }

    /// The saved snapshot, if any.
    pub fn rollback_state(&self) -> Option<&HistoryEntry> {
        self.rollback_state_saved.then_some(&self.rollback_state)
    }

    /// Save time and continuous states, unless a snapshot is already held.
    pub fn save_current_state_for_rollback(&mut self) {
        if self.rollback_state_saved {
            return;
        }
        self.rollback_state.time = self.fmu.time();
        self.rollback_state.state.resize(self.fmu.n_states(), 0.0);
        self.fmu
            .get_continuous_states(&mut self.rollback_state.state);
        self.rollback_state_saved = true;
        log::trace!(
            "{}: saved rollback state at t = {}",
            self.fmu.instance_name(),
            self.rollback_state.time
        );
    }

    /// Drop the snapshot, so the next save captures the state of that moment.
    pub fn release_rollback_state(&mut self) {
        self.rollback_state_saved = false;
    }

    /// Restore the snapshot. `time` must not lie before the snapshot time, otherwise nothing is
    /// changed and `Fatal` is returned.
    pub fn rollback(&mut self, time: f64) -> FmiStatus {
        if !self.rollback_state_saved || time < self.rollback_state.time {
            log::error!(
                "{}: cannot roll back to t = {time}, rollback state is at t = {}",
                self.fmu.instance_name(),
                if self.rollback_state_saved {
                    self.rollback_state.time
                } else {
                    f64::NAN
                },
            );
            return FmiStatus::Fatal;
        }

        let snapshot_time = self.rollback_state.time;
        self.fmu.reset_event_flags();
        self.fmu.rewind_time(self.fmu.time() - snapshot_time);

        self.fmu.raise_event();
        self.fmu.handle_events(time, false);

        self.fmu
            .set_continuous_states(&self.rollback_state.state);
        self.fmu.refresh_event_indicators();

        self.fmu.raise_event();
        self.fmu.handle_events(time, true);

        FmiStatus::Ok
    }

    /// Integrate up to `tstop`, rolling back first if `tstop` lies in the past.
    ///
    /// A failed rollback leaves the instance untouched and returns [`INVALID_TIME`].
    pub fn integrate(&mut self, tstop: f64, delta_t: f64) -> f64 {
        if tstop < self.fmu.time() {
            if self.rollback(tstop) != FmiStatus::Ok {
                return INVALID_TIME;
            }
        } else if !self.rollback_state_saved {
            self.save_current_state_for_rollback();
        }
        self.fmu.integrate(tstop, delta_t)
    }
}

impl<M: ModelExchange> Deref for RollbackFmu<M> {
    type Target = Fmu<M>;

    fn deref(&self) -> &Self::Target {
        &self.fmu
    }
}

impl<M: ModelExchange> DerefMut for RollbackFmu<M> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.fmu
    }
}

impl<M: ModelExchange> ModelWrapper for RollbackFmu<M> {
    type Model = M;

    fn fmu(&self) -> &Fmu<M> {
        &self.fmu
    }

    fn fmu_mut(&mut self) -> &mut Fmu<M> {
        &mut self.fmu
    }

    fn integrate(&mut self, tend: f64, delta_t: f64) -> f64 {
        RollbackFmu::integrate(self, tend, delta_t)
    }
}
