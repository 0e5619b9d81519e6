//=========================================================================
// Presentation Feed
//=========================================================================
//
// Receiving side of a ChannelObserver, polled by the presentation thread
// once per frame.
//
// Architecture:
//   Receiver<HubEvent> → collect_frame() / wait_frame() → events → FeedControl
//
// Bounded draining keeps one frame from starving on an event burst.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use log::warn;

//=== Internal Dependencies ===============================================

use super::HubEvent;

/// Upper bound on events drained per frame.
pub const MAX_EVENTS_PER_FRAME: usize = 256;

//=== FeedControl =========================================================

/// Whether the hub side of the feed is still connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedControl {
    Continue,
    /// The observer was dropped and every event has been drained.
    Closed,
}

//=== PresentationFeed ====================================================

/// Collects [`HubEvent`]s sent by a [`ChannelObserver`].
///
/// [`ChannelObserver`]: super::ChannelObserver
pub struct PresentationFeed {
    receiver: Receiver<HubEvent>,
    events: Vec<HubEvent>,
}

impl PresentationFeed {
    pub(crate) fn new(receiver: Receiver<HubEvent>) -> Self {
        Self {
            receiver,
            events: Vec::with_capacity(16),
        }
    }

    /// Collects pending events without blocking.
    ///
    /// Replaces the previous frame's batch.
    pub fn collect_frame(&mut self) -> FeedControl {
        self.events.clear();
        self.drain()
    }

    /// Waits up to `timeout` for the first event, then collects whatever
    /// else is pending.
    pub fn wait_frame(&mut self, timeout: Duration) -> FeedControl {
        self.events.clear();

        match self.receiver.recv_timeout(timeout) {
            Ok(event) => self.events.push(event),
            Err(RecvTimeoutError::Disconnected) => return FeedControl::Closed,
            Err(RecvTimeoutError::Timeout) => return FeedControl::Continue,
        }

        self.drain()
    }

    /// Returns the events collected this frame.
    pub fn events(&self) -> &[HubEvent] {
        &self.events
    }

    /// Takes ownership of the collected events, leaving an empty batch.
    pub fn take_events(&mut self) -> Vec<HubEvent> {
        std::mem::take(&mut self.events)
    }

    fn drain(&mut self) -> FeedControl {
        while self.events.len() < MAX_EVENTS_PER_FRAME {
            match self.receiver.try_recv() {
                Ok(event) => self.events.push(event),
                Err(TryRecvError::Empty) => return FeedControl::Continue,
                Err(TryRecvError::Disconnected) => return FeedControl::Closed,
            }
        }

        warn!("Presentation backlog: drained {} events this frame", self.events.len());
        FeedControl::Continue
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn collect_handles_empty_queue() {
        let (_tx, rx) = unbounded::<HubEvent>();
        let mut feed = PresentationFeed::new(rx);

        assert_eq!(feed.collect_frame(), FeedControl::Continue);
        assert!(feed.events().is_empty());
    }

    #[test]
    fn collect_clears_previous_batch() {
        let (tx, rx) = unbounded();
        let mut feed = PresentationFeed::new(rx);

        tx.send(HubEvent::CheatsUsed).unwrap();
        feed.collect_frame();
        assert_eq!(feed.events().len(), 1);

        feed.collect_frame();
        assert!(feed.events().is_empty());
    }

    #[test]
    fn collect_is_bounded_per_frame() {
        let (tx, rx) = unbounded();
        let mut feed = PresentationFeed::new(rx);

        for score in 0..(MAX_EVENTS_PER_FRAME as u64 + 10) {
            tx.send(HubEvent::ScorePosted(score)).unwrap();
        }

        assert_eq!(feed.collect_frame(), FeedControl::Continue);
        assert_eq!(feed.events().len(), MAX_EVENTS_PER_FRAME);

        feed.collect_frame();
        assert_eq!(feed.events().len(), 10);
        assert_eq!(feed.events()[0], HubEvent::ScorePosted(MAX_EVENTS_PER_FRAME as u64));
    }

    #[test]
    fn pending_events_are_delivered_before_close() {
        let (tx, rx) = unbounded();
        let mut feed = PresentationFeed::new(rx);

        tx.send(HubEvent::BallCountUpdated(1)).unwrap();
        drop(tx);

        assert_eq!(feed.collect_frame(), FeedControl::Closed);
        assert_eq!(feed.events(), &[HubEvent::BallCountUpdated(1)]);

        assert_eq!(feed.collect_frame(), FeedControl::Closed);
        assert!(feed.events().is_empty());
    }

    #[test]
    fn wait_frame_times_out_quietly() {
        let (_tx, rx) = unbounded::<HubEvent>();
        let mut feed = PresentationFeed::new(rx);

        assert_eq!(feed.wait_frame(Duration::from_millis(5)), FeedControl::Continue);
        assert!(feed.events().is_empty());
    }

    #[test]
    fn wait_frame_reports_closed_feed() {
        let (tx, rx) = unbounded::<HubEvent>();
        let mut feed = PresentationFeed::new(rx);
        drop(tx);

        assert_eq!(feed.wait_frame(Duration::from_millis(50)), FeedControl::Closed);
        assert!(feed.events().is_empty());
    }

    #[test]
    fn wait_frame_drains_remaining_events_then_closes() {
        let (tx, rx) = unbounded();
        let mut feed = PresentationFeed::new(rx);
        tx.send(HubEvent::CheatsUsed).unwrap();
        drop(tx);

        assert_eq!(feed.wait_frame(Duration::from_millis(50)), FeedControl::Closed);
        assert_eq!(feed.events(), &[HubEvent::CheatsUsed]);
    }

    #[test]
    fn take_events_leaves_empty_batch() {
        let (tx, rx) = unbounded();
        let mut feed = PresentationFeed::new(rx);

        tx.send(HubEvent::ScorePosted(10)).unwrap();
        tx.send(HubEvent::ScorePosted(20)).unwrap();
        feed.wait_frame(Duration::from_millis(50));

        let taken = feed.take_events();
        assert_eq!(taken, vec![HubEvent::ScorePosted(10), HubEvent::ScorePosted(20)]);
        assert!(feed.events().is_empty());
    }
}
