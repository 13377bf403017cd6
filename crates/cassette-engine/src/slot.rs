//! Latest-wins parameter handoff between the control and audio threads.
//!
//! [`ParamSlot`] wraps an `ArcSwap<ParameterSnapshot>`. The control thread
//! replaces the whole snapshot with [`store`](ParamSlot::store); the audio
//! thread copies the current one out with [`load`](ParamSlot::load), which is
//! wait-free. There are no field-level atomics, so a block never sees half of
//! an update.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::ParameterSnapshot;

/// Single-slot, latest-wins parameter mailbox.
///
/// Cloning is cheap and every clone refers to the same slot.
#[derive(Clone)]
pub struct ParamSlot {
    inner: Arc<ArcSwap<ParameterSnapshot>>,
}

impl ParamSlot {
    /// Creates a slot holding `initial` (sanitized).
    pub fn new(initial: ParameterSnapshot) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(initial.sanitized())),
        }
    }

    /// Publishes a complete snapshot. Replaces whatever was there.
    ///
    /// Allocates; call from the control thread.
    pub fn store(&self, snapshot: ParameterSnapshot) {
        self.inner.store(Arc::new(snapshot.sanitized()));
    }

    /// Copies out the most recent snapshot. Wait-free.
    pub fn load(&self) -> ParameterSnapshot {
        **self.inner.load()
    }
}

impl Default for ParamSlot {
    fn default() -> Self {
        Self::new(ParameterSnapshot::default())
    }
}

impl fmt::Debug for ParamSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamSlot")
            .field("latest", &self.load())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn latest_store_wins() {
        let slot = ParamSlot::default();
        slot.store(ParameterSnapshot {
            wow_depth: 0.1,
            ..ParameterSnapshot::default()
        });
        slot.store(ParameterSnapshot {
            wow_depth: 0.2,
            ..ParameterSnapshot::default()
        });
        assert_eq!(slot.load().wow_depth, 0.2);
    }

    #[test]
    fn store_sanitizes() {
        let slot = ParamSlot::default();
        slot.store(ParameterSnapshot {
            hiss_level_dbfs: f32::NAN,
            ..ParameterSnapshot::default()
        });
        assert_eq!(slot.load(), ParameterSnapshot::default());
    }

    #[test]
    fn clones_share_the_slot() {
        let slot = ParamSlot::default();
        let writer = slot.clone();
        writer.store(ParameterSnapshot::tape_default());
        assert_eq!(slot.load(), ParameterSnapshot::tape_default());
    }

    #[test]
    fn concurrent_readers_never_see_torn_snapshots() {
        let slot = ParamSlot::default();
        let a = ParameterSnapshot {
            wow_depth: 0.25,
            flutter_depth: 0.25,
            ..ParameterSnapshot::default()
        };
        let b = ParameterSnapshot {
            wow_depth: 0.75,
            flutter_depth: 0.75,
            ..ParameterSnapshot::default()
        };

        let writer = slot.clone();
        let handle = thread::spawn(move || {
            for i in 0..2000 {
                writer.store(if i % 2 == 0 { a } else { b });
            }
        });
        for _ in 0..2000 {
            let seen = slot.load();
            assert_eq!(seen.wow_depth, seen.flutter_depth);
        }
        handle.join().unwrap();
    }
}
