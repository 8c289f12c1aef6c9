use crossbeam_channel::{Receiver, Sender};

/// Counting gate limiting how many recognizer calls may run at once.
///
/// Permits are owned values, so one can be taken on a worker thread and
/// moved into the thread that actually runs inference. Dropping the permit
/// (including during unwinding) frees the slot.
pub struct CallGate {
    release: Sender<()>,
    tokens: Receiver<()>,
    slots: usize,
}

impl CallGate {
    pub fn new(slots: usize) -> Self {
        let slots = slots.max(1);
        let (release, tokens) = crossbeam_channel::bounded(slots);
        for _ in 0..slots {
            // Capacity equals slots; cannot be full.
            let _ = release.try_send(());
        }
        Self {
            release,
            tokens,
            slots,
        }
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Block until a slot is free.
    pub fn acquire(&self) -> CallPermit {
        // The gate holds a sender, so the channel never disconnects.
        let _ = self.tokens.recv();
        CallPermit {
            release: self.release.clone(),
        }
    }

    /// Take a slot only if one is free right now.
    pub fn try_acquire(&self) -> Option<CallPermit> {
        self.tokens.try_recv().ok().map(|()| CallPermit {
            release: self.release.clone(),
        })
    }
}

/// One admitted call. The slot is returned on drop.
pub struct CallPermit {
    release: Sender<()>,
}

impl Drop for CallPermit {
    fn drop(&mut self) {
        let _ = self.release.try_send(());
    }
}
