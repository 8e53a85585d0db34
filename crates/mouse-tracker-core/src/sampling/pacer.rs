use crate::{Clock, CoreResult, OneShotTimer, TimingBase};

use std::hint;

/// Waits out the remainder of a cadence step.
///
/// Both strategies share one contract: on return, at least one step
/// budget has elapsed since `step_start` (busy-poll), or the timer was
/// programmed for the remaining budget (programmed timer).
pub(crate) enum Pacer<T: OneShotTimer> {
    BusyPoll,
    Timer {
        timer: T,
        /// Measured cost of one sample plus timer wake-up, in ticks.
        overhead_ticks: u64,
    },
}

impl<T: OneShotTimer> Pacer<T> {
    #[inline]
    pub(crate) fn finish_step<K: Clock>(
        &mut self,
        clock: &K,
        base: &TimingBase,
        step_start: u64,
    ) -> CoreResult<()> {
        let budget = base.step_ticks();

        match self {
            Pacer::BusyPoll => {
                while clock.now().saturating_sub(step_start) < budget {
                    hint::spin_loop();
                }
            }
            Pacer::Timer {
                timer,
                overhead_ticks,
            } => {
                let elapsed = clock.now().saturating_sub(step_start);

                if budget > elapsed {
                    let due = (budget - elapsed).saturating_sub(*overhead_ticks);

                    if due > 0 {
                        timer.wait(base.ticks_to_duration(due))?;
                    }
                }
            }
        }

        Ok(())
    }

    pub(crate) fn overhead_ticks(&self) -> u64 {
        match self {
            Pacer::BusyPoll => 0,
            Pacer::Timer { overhead_ticks, .. } => *overhead_ticks,
        }
    }
}
