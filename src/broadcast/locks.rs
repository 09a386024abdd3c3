use std::sync::Arc;
use derive_more::Display;
use flurry::HashSet;
use crate::domain::SubmissionId;

/// Tracks the references whose broadcast is currently in flight, so a second
/// press of the same approval button can't start a duplicate fan-out while the
/// first one is still running.
#[derive(Clone, Debug, Default)]
pub struct ApprovalLocks {
    inner_set: Arc<HashSet<i64>>,
}

impl ApprovalLocks {
    pub fn try_acquire(&self, id: SubmissionId) -> Option<ApprovalGuard> {
        if self.inner_set.insert(id.0, &self.inner_set.guard()) {
            Some(ApprovalGuard::new(&self.inner_set, id.0))
        } else {
            log::debug!("a duplicate in-flight approval of {id}");
            None
        }
    }
}

#[derive(Debug, Display)]
#[display("ApprovalGuard({key})")]
pub struct ApprovalGuard {
    set_ref: Arc<HashSet<i64>>,
    key: i64,
}

impl ApprovalGuard {
    fn new(set_ref: &Arc<HashSet<i64>>, key: i64) -> Self {
        let set_ref = Arc::clone(set_ref);
        let guard = Self { set_ref, key };
        log::debug!("taking an approval guard: {guard}");
        guard
    }
}

impl Drop for ApprovalGuard {
    fn drop(&mut self) {
        log::debug!("releasing the approval guard: {self}");
        self.set_ref.remove(&self.key, &self.set_ref.guard());
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::SubmissionId;
    use super::ApprovalLocks;

    #[test]
    fn the_same_reference_cannot_be_acquired_twice() {
        let locks = ApprovalLocks::default();
        let guard = locks.try_acquire(SubmissionId(1));
        assert!(guard.is_some());
        assert!(locks.try_acquire(SubmissionId(1)).is_none());
    }

    #[test]
    fn different_references_are_independent() {
        let locks = ApprovalLocks::default();
        let _first = locks.try_acquire(SubmissionId(1)).expect("the first reference must lock");
        assert!(locks.try_acquire(SubmissionId(2)).is_some());
    }

    #[test]
    fn dropping_the_guard_releases_the_reference() {
        let locks = ApprovalLocks::default();
        drop(locks.try_acquire(SubmissionId(1)).expect("the first acquisition must succeed"));
        assert!(locks.try_acquire(SubmissionId(1)).is_some());
    }
}
