use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use courier_common::Submission;
use courier_relay::{DeliveryError, Relay, TemporaryError};
use courier_store::MessageStore;

/// A relay that records what it was asked to deliver.
///
/// When given a store it also records how many submissions that store held
/// at the moment of each delivery.
#[derive(Debug, Default)]
pub struct RecordingRelay {
    failing: AtomicBool,
    delivered: Mutex<Vec<Submission>>,
    store: Option<Arc<dyn MessageStore>>,
    stored_at_delivery: Mutex<Vec<usize>>,
}

impl RecordingRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let relay = Self::default();
        relay.failing.store(true, Ordering::SeqCst);
        relay
    }

    pub fn observing(store: Arc<dyn MessageStore>) -> Self {
        Self {
            store: Some(store),
            ..Self::default()
        }
    }

    pub fn deliveries(&self) -> Vec<Submission> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn stored_at_delivery(&self) -> Vec<usize> {
        self.stored_at_delivery.lock().unwrap().clone()
    }
}

#[async_trait]
impl Relay for RecordingRelay {
    async fn deliver(&self, submission: &Submission) -> Result<(), DeliveryError> {
        if let Some(store) = &self.store {
            let stored = store.list().await.map_or(0, |list| list.len());
            self.stored_at_delivery.lock().unwrap().push(stored);
        }

        self.delivered.lock().unwrap().push(submission.clone());

        if self.failing.load(Ordering::SeqCst) {
            return Err(TemporaryError::ConnectionFailed("relay unreachable".to_string()).into());
        }

        Ok(())
    }
}
