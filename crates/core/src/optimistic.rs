//! Optimistic local mutation with server-authoritative rollback.

use crate::errors::DomainError;

/// Where state was restored from after a failed mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RollbackSource {
    Server,
    Snapshot,
}

/// A change already applied to local state, awaiting confirmation.
///
/// On failure the caller re-reads the authoritative state and hands it to
/// [`Optimistic::rollback`]. The snapshot taken before the change is used
/// only when that re-read fails too.
#[derive(Clone, Debug)]
#[must_use = "an optimistic change must be committed or rolled back"]
pub struct Optimistic<T> {
    snapshot: T,
}

impl<T: Clone> Optimistic<T> {
    pub fn apply(state: &mut T, change: impl FnOnce(&mut T)) -> Self {
        let snapshot = state.clone();
        change(state);
        Self { snapshot }
    }

    /// Like [`Optimistic::apply`], but a change that fails leaves `state`
    /// as it was.
    pub fn try_apply<E>(
        state: &mut T,
        change: impl FnOnce(&mut T) -> Result<(), E>,
    ) -> Result<Self, E> {
        let snapshot = state.clone();
        if let Err(error) = change(state) {
            *state = snapshot;
            return Err(error);
        }
        Ok(Self { snapshot })
    }

    pub fn snapshot(&self) -> &T {
        &self.snapshot
    }

    pub fn commit(self) {}

    pub fn rollback(self, state: &mut T, authoritative: Option<T>) -> RollbackSource {
        match authoritative {
            Some(fresh) => {
                *state = fresh;
                RollbackSource::Server
            }
            None => {
                *state = self.snapshot;
                RollbackSource::Snapshot
            }
        }
    }
}

/// Moves the element at `from` so that it ends up at index `to`.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<(), DomainError> {
    let len = items.len();
    if from >= len || to >= len {
        return Err(DomainError::InvariantViolation(format!(
            "cannot move item {from} to {to} in a list of {len}"
        )));
    }
    let item = items.remove(from);
    items.insert(to, item);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{move_item, Optimistic, RollbackSource};

    #[test]
    fn move_last_to_front() {
        let mut items = vec!["A", "B", "C"];
        move_item(&mut items, 2, 0).expect("in range");
        assert_eq!(items, vec!["C", "A", "B"]);
    }

    #[test]
    fn move_front_to_back() {
        let mut items = vec!["A", "B", "C"];
        move_item(&mut items, 0, 2).expect("in range");
        assert_eq!(items, vec!["B", "C", "A"]);
    }

    #[test]
    fn out_of_range_move_leaves_list_untouched() {
        let mut items = vec!["A", "B"];
        assert!(move_item(&mut items, 0, 2).is_err());
        assert_eq!(items, vec!["A", "B"]);
    }

    #[test]
    fn rollback_prefers_authoritative_state_over_snapshot() {
        let mut state = vec!["A", "B", "C"];
        let change = Optimistic::apply(&mut state, |items| {
            move_item(items, 2, 0).expect("in range");
        });
        assert_eq!(state, vec!["C", "A", "B"]);

        let source = change.rollback(&mut state, Some(vec!["B", "A", "C"]));
        assert_eq!(source, RollbackSource::Server);
        assert_eq!(state, vec!["B", "A", "C"]);
    }

    #[test]
    fn rollback_falls_back_to_snapshot_without_server_state() {
        let mut state = vec![1, 2, 3];
        let change = Optimistic::apply(&mut state, |items| items.reverse());
        assert_eq!(change.snapshot(), &vec![1, 2, 3]);

        assert_eq!(change.rollback(&mut state, None), RollbackSource::Snapshot);
        assert_eq!(state, vec![1, 2, 3]);
    }
}
