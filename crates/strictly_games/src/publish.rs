//! Change notification for connected players.

use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, instrument};

use strictly_codenames::{GameEvent, GameId};

/// A committed change to one game.
///
/// `events` is empty for changes that are not rule actions, such as seating
/// or starting a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
#[serde(rename_all = "camelCase")]
pub struct GameChange {
    game_id: GameId,
    events: Vec<GameEvent>,
}

/// Outbound notification channel.
///
/// Called only after the change is durable. Delivery is fire-and-forget and
/// must never fail the action that produced the change.
pub trait Publisher {
    /// Announces a committed change.
    fn publish(&self, change: &GameChange);
}

/// Fans changes out to every subscriber over a broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastPublisher {
    sender: broadcast::Sender<GameChange>,
}

impl BroadcastPublisher {
    /// Creates a publisher buffering up to `capacity` changes per subscriber.
    #[instrument]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to changes published from now on.
    #[instrument(skip(self))]
    pub fn subscribe(&self) -> broadcast::Receiver<GameChange> {
        self.sender.subscribe()
    }
}

impl Publisher for BroadcastPublisher {
    #[instrument(skip(self, change), fields(game_id = change.game_id(), events = change.events().len()))]
    fn publish(&self, change: &GameChange) {
        match self.sender.send(change.clone()) {
            Ok(receivers) => debug!(receivers, "Change published"),
            Err(_) => debug!("No subscribers for change"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let publisher = BroadcastPublisher::new(4);
        publisher.publish(&GameChange::new(1, Vec::new()));
    }

    #[test]
    fn test_subscriber_receives_change() {
        let publisher = BroadcastPublisher::new(4);
        let mut rx = publisher.subscribe();
        let change = GameChange::new(7, vec![GameEvent::Pass { turn_num: 2 }]);
        publisher.publish(&change);
        assert_eq!(rx.try_recv().expect("change delivered"), change);
    }

    #[test]
    fn test_change_json_shape() {
        let change = GameChange::new(3, vec![GameEvent::Pass { turn_num: 1 }]);
        let json = serde_json::to_value(&change).expect("serialize");
        assert_eq!(json["gameId"], 3);
        assert_eq!(json["events"][0]["type"], "pass");
    }
}
