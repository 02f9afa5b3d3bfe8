//! Navigation epochs.
//!
//! Every effective navigation (and every unmount) advances the epoch. Work
//! started on behalf of a render pass carries an [`EpochToken`]; once the epoch
//! moves on, the token is dead and its late results are discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared, monotonically increasing navigation counter.
#[derive(Debug, Clone, Default)]
pub struct NavigationEpoch {
    current: Arc<AtomicU64>,
}

impl NavigationEpoch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to the next epoch, invalidating every outstanding token.
    pub fn advance(&self) -> u64 {
        self.current.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }

    /// Snapshot the current epoch.
    pub fn token(&self) -> EpochToken {
        EpochToken {
            value: self.current(),
            current: Arc::clone(&self.current),
        }
    }
}

/// A snapshot of a [`NavigationEpoch`] taken at render time.
#[derive(Debug, Clone)]
pub struct EpochToken {
    value: u64,
    current: Arc<AtomicU64>,
}

impl EpochToken {
    pub fn value(&self) -> u64 {
        self.value
    }

    /// True while no navigation or unmount has happened since the snapshot.
    pub fn is_live(&self) -> bool {
        self.current.load(Ordering::Acquire) == self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_dies_on_advance() {
        let epoch = NavigationEpoch::new();
        let first = epoch.token();
        assert!(first.is_live());

        assert_eq!(epoch.advance(), 1);
        let second = epoch.token();
        assert!(!first.is_live());
        assert!(second.is_live());
        assert_eq!(second.value(), 1);
    }

    #[test]
    fn test_clones_share_counter() {
        let epoch = NavigationEpoch::new();
        let token = epoch.token();
        epoch.clone().advance();
        assert!(!token.is_live());
    }
}
