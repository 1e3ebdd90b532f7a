use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// Shared interrupt flag, tripped by Ctrl+C or by tests
#[derive(Debug, Clone)]
pub struct CancelFlag {
    sender: Arc<watch::Sender<bool>>,
}

impl CancelFlag {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Trip the flag on SIGINT/SIGTERM
    pub fn install_ctrlc_handler(&self) -> Result<(), ctrlc::Error> {
        let flag = self.clone();
        ctrlc::set_handler(move || flag.cancel())
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolve once the flag is tripped (immediately if it already is)
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives as long as `self`, so this only returns once tripped
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }

    /// Run `call` unless the flag trips first; `None` means interrupted
    pub async fn guard<F: Future>(&self, call: F) -> Option<F::Output> {
        if self.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => None,
            output = call => Some(output),
        }
    }
}

impl Default for CancelFlag {
    fn default() -> Self {
        Self::new()
    }
}
