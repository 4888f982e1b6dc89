//! In-process advisory locks keyed by plan id.
//!
//! A backup, DR test or prune holds its plan's lock for the whole pipeline
//! run. A second run for the same plan is rejected with
//! [`DrError::PlanBusy`] instead of interleaving its writes. Locks are not
//! shared across processes.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use uuid::Uuid;

use crate::error::{DrError, Result};

/// Registry of plans with a pipeline in flight.
#[derive(Debug, Clone, Default)]
pub struct PlanLocks {
    held: Arc<Mutex<HashSet<Uuid>>>,
}

impl PlanLocks {
    fn held(&self) -> MutexGuard<'_, HashSet<Uuid>> {
        // The set stays consistent even if a holder panicked
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes the lock for `plan_id`, or fails with `PlanBusy`.
    pub fn try_acquire(&self, plan_id: Uuid) -> Result<PlanGuard> {
        if !self.held().insert(plan_id) {
            return Err(DrError::PlanBusy { id: plan_id });
        }
        Ok(PlanGuard {
            locks: self.clone(),
            plan_id,
        })
    }

    pub fn is_held(&self, plan_id: Uuid) -> bool {
        self.held().contains(&plan_id)
    }
}

/// Releases its plan's lock on drop.
#[derive(Debug)]
pub struct PlanGuard {
    locks: PlanLocks,
    plan_id: Uuid,
}

impl PlanGuard {
    pub fn plan_id(&self) -> Uuid {
        self.plan_id
    }
}

impl Drop for PlanGuard {
    fn drop(&mut self) {
        self.locks.held().remove(&self.plan_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_is_rejected_until_release() {
        let locks = PlanLocks::default();
        let plan_id = Uuid::new_v4();

        let guard = locks.try_acquire(plan_id).unwrap();
        assert!(locks.is_held(plan_id));
        assert!(matches!(
            locks.try_acquire(plan_id),
            Err(DrError::PlanBusy { id }) if id == plan_id
        ));

        drop(guard);
        assert!(!locks.is_held(plan_id));
        assert!(locks.try_acquire(plan_id).is_ok());
    }

    #[test]
    fn test_locks_are_per_plan_and_shared_by_clones() {
        let locks = PlanLocks::default();
        let other = locks.clone();

        let _a = locks.try_acquire(Uuid::new_v4()).unwrap();
        let b_id = Uuid::new_v4();
        let _b = other.try_acquire(b_id).unwrap();

        assert!(locks.is_held(b_id));
    }
}
