//! Heartbeat timer task.
//!
//! The timer runs on its own task so a tick is produced on schedule no
//! matter what the session is doing; the session consumes ticks alongside
//! tail events and turns each into a ping.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::domain::HeartbeatTick;

/// Handle on a running heartbeat task. Dropping it stops the task.
pub(crate) struct Heartbeat {
    handle: JoinHandle<()>,
}

impl Heartbeat {
    /// Start ticking every `interval`, first tick one interval from now.
    pub(crate) fn spawn(interval: Duration) -> (Self, mpsc::Receiver<HeartbeatTick>) {
        // Capacity 1: a session stuck on a slow write holds at most one
        // pending tick.
        let (tx, rx) = mpsc::channel(1);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let mut seq = 0;
            loop {
                ticker.tick().await;
                seq += 1;
                if tx.send(HeartbeatTick::new(seq)).await.is_err() {
                    break;
                }
            }
        });

        (Self { handle }, rx)
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_follow_interval() {
        let (_heartbeat, mut ticks) = Heartbeat::spawn(Duration::from_secs(30));
        let start = Instant::now();

        let first = ticks.recv().await.unwrap();
        assert_eq!(first.seq, 1);
        assert!(start.elapsed() >= Duration::from_secs(30));

        let second = ticks.recv().await.unwrap();
        assert_eq!(second.seq, 2);
        assert!(start.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_task() {
        let (heartbeat, mut ticks) = Heartbeat::spawn(Duration::from_secs(1));
        drop(heartbeat);
        assert!(ticks.recv().await.is_none());
    }
}
