//! MQTT subscriber for the cornhole board.
//!
//! One poll loop drives everything: subscriptions go out when the broker
//! acknowledges the connection, publishes are folded through the reducer,
//! and tweetable events go straight to the poster. Ctrl-C breaks the loop
//! and disconnects cleanly.

use std::time::Duration;

use rumqttc::v5::mqttbytes::v5::Packet;
use rumqttc::v5::mqttbytes::QoS;
use rumqttc::v5::{AsyncClient, Event, MqttOptions};
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{TweeterError, TweeterResult};
use crate::poster::Poster;
use crate::template::END_GAME_TEMPLATE;

use super::reducer::{GameEvent, GameReducer, HOLE_COUNT};

/// Subscribes to the board's topics and tweets on scoring plays.
pub struct CornholeSubscriber {
    poster: Poster,
    reducer: GameReducer,
    options: MqttOptions,
}

impl CornholeSubscriber {
    pub fn new(host: &str, port: u16, poster: Poster) -> Self {
        // Unique client id so a stale session on the broker never collides.
        let client_id = format!("cornhole-tweeter-{}", Uuid::new_v4());
        let mut options = MqttOptions::new(client_id, host, port);
        options.set_keep_alive(Duration::from_secs(60));

        Self {
            poster,
            reducer: GameReducer::new(),
            options,
        }
    }

    /// Every topic the board publishes on.
    fn subscription_topics() -> Vec<String> {
        let mut topics = Vec::new();
        for id in 0..HOLE_COUNT {
            topics.push(format!("holes/{id}/state"));
            topics.push(format!("holes/{id}/colour"));
            topics.push(format!("holes/{id}/hit"));
        }
        topics.push("game/username".to_string());
        topics.push("game/current_score".to_string());
        topics.push("game/end_score".to_string());
        topics.push("$SYS/broker/uptime".to_string());
        topics
    }

    /// Connect to twitter and the broker, then process events until Ctrl-C.
    pub async fn run(&mut self) -> TweeterResult<()> {
        self.poster.connect().await?;

        // Capacity covers the full subscription burst queued on ConnAck.
        let (client, mut event_loop) = AsyncClient::new(self.options.clone(), 32);
        info!("listening for cornhole events");

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("shutting down");
                    if let Err(e) = client.disconnect().await {
                        warn!(%e, "mqtt disconnect failed");
                    }
                    break;
                }
                event = event_loop.poll() => match event {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        info!("connected to mqtt broker");
                        for topic in Self::subscription_topics() {
                            client
                                .subscribe(&topic, QoS::AtLeastOnce)
                                .await
                                .map_err(|e| TweeterError::Mqtt(e.to_string()))?;
                            debug!(topic, "subscribed");
                        }
                    }
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        let topic = String::from_utf8_lossy(&publish.topic).into_owned();
                        match std::str::from_utf8(&publish.payload) {
                            Ok(payload) => self.handle_message(&topic, payload).await?,
                            Err(_) => error!(topic, "dropping non-utf8 payload"),
                        }
                    }
                    Ok(_) => {}
                    Err(e) => return Err(TweeterError::Mqtt(e.to_string())),
                }
            }
        }

        self.poster.disconnect();
        Ok(())
    }

    /// Fold one broker message and tweet if it completed a play.
    async fn handle_message(&mut self, topic: &str, payload: &str) -> TweeterResult<()> {
        debug!(topic, payload, "broker message");
        let Some(event) = self.reducer.apply(topic, payload) else {
            return Ok(());
        };

        match event {
            GameEvent::Hit { colour, score } => {
                info!(%colour, score, "valid hit scored");
                let context = self.tweet_context(score);
                self.poster
                    .post_colour(&json!(colour.name()), Some(&context))
                    .await?;
            }
            GameEvent::GameOver { score } => {
                info!(score, "game over");
                let context = self.tweet_context(score);
                self.poster
                    .post_template(END_GAME_TEMPLATE, Some(&context))
                    .await?;
            }
        }
        Ok(())
    }

    fn tweet_context(&self, score: i64) -> Map<String, Value> {
        let mut context = Map::new();
        context.insert("current_score".to_string(), json!(score));
        context.insert("user_name".to_string(), json!(self.reducer.username()));
        context
    }
}
