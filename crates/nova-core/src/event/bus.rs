// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A typed channel wrapper built on `flume`.

/// A thread-safe multi-producer event channel.
///
/// Generic over the event type so higher-level crates can carry their own
/// events without `nova-core` knowing about them.
#[derive(Debug)]
pub struct EventBus<T: Send + 'static> {
    sender: flume::Sender<T>,
    receiver: flume::Receiver<T>,
}

impl<T: Send + 'static> EventBus<T> {
    /// Creates a bus over an unbounded channel.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        log::debug!("EventBus<{}> initialized.", std::any::type_name::<T>());
        Self { sender, receiver }
    }

    /// Sends an event. Failure only happens once every receiver is gone and is logged.
    pub fn publish(&self, event: T) {
        if let Err(e) = self.sender.send(event) {
            log::error!("Failed to publish event: {e}. Receiver likely disconnected.");
        }
    }

    /// A sender handle for other parts of the engine.
    pub fn sender(&self) -> flume::Sender<T> {
        self.sender.clone()
    }

    /// The receiving end, for the owner of the bus.
    pub fn receiver(&self) -> &flume::Receiver<T> {
        &self.receiver
    }

    /// Number of events waiting.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Takes every event currently queued without blocking.
    pub fn drain(&self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }
}

impl<T: Send + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EngineEvent;
    use std::{thread, time::Duration};

    #[test]
    fn test_drain_returns_events_in_order() {
        let bus = EventBus::<EngineEvent>::new();
        bus.publish(EngineEvent::WindowResized {
            width: 640,
            height: 480,
        });
        bus.publish(EngineEvent::ShutdownRequested);
        assert_eq!(bus.pending(), 2);

        let events = bus.drain();
        assert_eq!(
            events,
            vec![
                EngineEvent::WindowResized {
                    width: 640,
                    height: 480
                },
                EngineEvent::ShutdownRequested
            ]
        );
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn test_senders_work_across_threads() {
        let bus = EventBus::<u32>::new();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let tx = bus.sender();
                thread::spawn(move || tx.send(i).expect("receiver alive"))
            })
            .collect();
        for h in handles {
            h.join().expect("sender thread panicked");
        }
        let mut got = bus.drain();
        got.sort_unstable();
        assert_eq!(got, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_receiver_blocks_until_event() {
        let bus = EventBus::<&'static str>::new();
        let tx = bus.sender();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            tx.send("late").expect("receiver alive");
        });
        let got = bus
            .receiver()
            .recv_timeout(Duration::from_secs(1))
            .expect("event within timeout");
        assert_eq!(got, "late");
        handle.join().expect("sender thread panicked");
    }

    #[test]
    fn test_sending_after_drop_fails() {
        let bus = EventBus::<u8>::new();
        let tx = bus.sender();
        drop(bus);
        assert!(tx.send(1).is_err());
    }
}
