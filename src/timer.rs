use crate::models::SessionEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Per-question countdown driver. Holds at most one live task; arming a new
/// epoch aborts the previous task first.
#[derive(Debug)]
pub struct QuestionTimer {
    events: mpsc::UnboundedSender<SessionEvent>,
    period: Duration,
    task: Option<(u64, JoinHandle<()>)>,
}

impl QuestionTimer {
    pub fn new(events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self::with_period(events, TICK_PERIOD)
    }

    pub fn with_period(events: mpsc::UnboundedSender<SessionEvent>, period: Duration) -> Self {
        Self {
            events,
            period,
            task: None,
        }
    }

    /// Start ticking for `epoch`, replacing whatever was running.
    pub fn arm(&mut self, epoch: u64) {
        self.cancel();

        let events = self.events.clone();
        let period = self.period;
        let handle = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if events.send(SessionEvent::Tick { epoch }).is_err() {
                    break;
                }
            }
        });

        log::debug!("timer armed for epoch {}", epoch);
        self.task = Some((epoch, handle));
    }

    pub fn cancel(&mut self) {
        if let Some((epoch, handle)) = self.task.take() {
            handle.abort();
            log::debug!("timer for epoch {} cancelled", epoch);
        }
    }

    pub fn armed_epoch(&self) -> Option<u64> {
        self.task.as_ref().map(|(epoch, _)| *epoch)
    }

    pub fn is_armed(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for QuestionTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick_epoch(event: SessionEvent) -> u64 {
        match event {
            SessionEvent::Tick { epoch } => epoch,
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_once_per_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = QuestionTimer::new(tx);
        let start = Instant::now();
        timer.arm(7);

        assert_eq!(tick_epoch(rx.recv().await.unwrap()), 7);
        assert_eq!(tick_epoch(rx.recv().await.unwrap()), 7);
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_replaces_previous_task() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = QuestionTimer::new(tx);
        timer.arm(1);
        assert_eq!(tick_epoch(rx.recv().await.unwrap()), 1);

        timer.arm(2);
        assert_eq!(timer.armed_epoch(), Some(2));
        for _ in 0..5 {
            assert_eq!(tick_epoch(rx.recv().await.unwrap()), 2);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = QuestionTimer::new(tx);
        timer.arm(3);
        rx.recv().await.unwrap();
        timer.cancel();
        assert!(!timer.is_armed());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        {
            let mut timer = QuestionTimer::new(tx);
            timer.arm(9);
        }
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }
}
