//! Process-wide shutdown notification: the signal handler feeds a broadcast
//! channel and the accept loop holds a subscription on it for its whole
//! lifetime, so an event fired while a dispatch is in flight is buffered and
//! observed on the loop's next iteration.

use once_cell::sync::Lazy;
use tokio::sync::broadcast;

static APPLICATION_EXIT_SENDER: Lazy<broadcast::Sender<()>> = Lazy::new(|| broadcast::channel(2).0);

/// Notify subscribers that the statusd process should terminate. An event
/// with no subscriber yet is dropped on purpose: nothing is serving, so
/// there is nothing to wind down.
pub fn send_exit() {
    let _ = APPLICATION_EXIT_SENDER.send(());
}

/// Subscribe to termination events. The subscription must be taken before
/// the first event that matters; events arriving while the subscriber is
/// busy elsewhere are buffered until its next `recv()`.
pub fn subscribe_exit() -> broadcast::Receiver<()> {
    APPLICATION_EXIT_SENDER.subscribe()
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn exit_event_without_subscriber_is_harmless() {
        send_exit();
        let mut exit_recv = subscribe_exit();
        send_exit();
        assert!(exit_recv.recv().await.is_ok());
    }

    #[tokio::test]
    async fn exit_event_sent_while_busy_is_buffered() {
        let mut exit_recv = subscribe_exit();
        // Nothing awaits the receiver at send time, as when a signal lands
        // mid-dispatch.
        send_exit();
        assert!(exit_recv.recv().await.is_ok());
    }
}
