// Countdown Cancellation Token

use tokio::sync::watch;

/// Cancellation signal observed by the tick loop
#[derive(Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// Check if cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait for cancellation
    ///
    /// Also returns once the sender is dropped, so a schedule never outlives
    /// the timer handle that owns it.
    pub async fn cancelled(&mut self) {
        while !*self.rx.borrow_and_update() {
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

/// Cancellation sender held by the timer handle
pub struct CancelSender {
    tx: watch::Sender<bool>,
}

impl CancelSender {
    /// Request cancellation; repeated calls are no-ops
    pub fn cancel(&self) {
        self.tx.send_if_modified(|cancelled| !std::mem::replace(cancelled, true));
    }
}

/// Create a cancellation channel
pub fn cancel_channel() -> (CancelSender, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelSender { tx }, CancelToken { rx })
}
