//! Pure event reducer for cornhole broker messages.
//!
//! The reducer owns the whole game state and is driven from a single
//! subscriber loop; it is not reentrant. Broker messages are untrusted:
//! anything malformed is logged and dropped so one bad sensor payload cannot
//! take the subscriber down.

use regex::Regex;
use tracing::{debug, error};

use crate::colour::Colour;

/// Number of holes on the board.
pub const HOLE_COUNT: usize = 6;

/// Per-hole lighting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoleState {
    pub lit: bool,
    pub colour: Colour,
}

impl Default for HoleState {
    fn default() -> Self {
        Self {
            lit: false,
            colour: Colour::Red,
        }
    }
}

/// Where a broker message slots into the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicRoute {
    HoleState(usize),
    HoleColour(usize),
    HoleHit(usize),
    Username,
    CurrentScore,
    EndScore,
    BrokerUptime,
    Unknown,
}

impl TopicRoute {
    /// Classify a topic. Hole ids are parsed but not range checked here;
    /// the reducer rejects out-of-range ids so they get logged.
    pub fn parse(topic: &str) -> TopicRoute {
        let parts: Vec<&str> = topic.split('/').collect();
        match parts.as_slice() {
            ["holes", id, leaf] => match id.parse::<usize>() {
                Ok(id) => match *leaf {
                    "state" => TopicRoute::HoleState(id),
                    "colour" => TopicRoute::HoleColour(id),
                    "hit" => TopicRoute::HoleHit(id),
                    _ => TopicRoute::Unknown,
                },
                Err(_) => TopicRoute::Unknown,
            },
            ["game", "username"] => TopicRoute::Username,
            ["game", "current_score"] => TopicRoute::CurrentScore,
            ["game", "end_score"] => TopicRoute::EndScore,
            ["$SYS", "broker", "uptime"] => TopicRoute::BrokerUptime,
            _ => TopicRoute::Unknown,
        }
    }
}

/// A scoring play worth tweeting about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// A valid hit followed by a score update.
    Hit { colour: Colour, score: i64 },
    /// The game ended with a final score.
    GameOver { score: i64 },
}

/// Folds broker messages into game state and emits tweetable events.
pub struct GameReducer {
    holes: [HoleState; HOLE_COUNT],
    pending_colour: Option<Colour>,
    username: String,
    uptime_pattern: Regex,
}

impl Default for GameReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl GameReducer {
    pub fn new() -> Self {
        Self {
            holes: [HoleState::default(); HOLE_COUNT],
            pending_colour: None,
            username: String::new(),
            // The pattern is a literal and always compiles.
            uptime_pattern: Regex::new(r"(\d+) seconds").unwrap(),
        }
    }

    /// Player name for tweet context. Empty until the broker announces one.
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn hole(&self, id: usize) -> Option<&HoleState> {
        self.holes.get(id)
    }

    /// Fold one broker message into the game state.
    ///
    /// Returns an event only when the message completes a tweetable play.
    pub fn apply(&mut self, topic: &str, payload: &str) -> Option<GameEvent> {
        match TopicRoute::parse(topic) {
            TopicRoute::HoleState(id) => {
                let Some(hole) = self.holes.get_mut(id) else {
                    error!(topic, id, "hole id out of range");
                    return None;
                };
                match payload {
                    "on" => hole.lit = true,
                    "off" => hole.lit = false,
                    other => error!(topic, payload = other, "unrecognized hole state"),
                }
                None
            }
            TopicRoute::HoleColour(id) => {
                let Some(hole) = self.holes.get_mut(id) else {
                    error!(topic, id, "hole id out of range");
                    return None;
                };
                match payload.parse::<Colour>() {
                    Ok(colour) => hole.colour = colour,
                    Err(e) => error!(topic, %e, "unrecognized hole colour"),
                }
                None
            }
            TopicRoute::HoleHit(id) => {
                let Some(hole) = self.holes.get(id) else {
                    error!(topic, id, "hole id out of range");
                    return None;
                };
                match payload {
                    // Last valid hit before the score update wins.
                    "valid" => self.pending_colour = Some(hole.colour),
                    "invalid" => {}
                    other => error!(topic, payload = other, "unrecognized hit payload"),
                }
                None
            }
            TopicRoute::Username => {
                self.username = payload.to_string();
                None
            }
            TopicRoute::CurrentScore => match payload.parse::<i64>() {
                Ok(score) => self
                    .pending_colour
                    .take()
                    .map(|colour| GameEvent::Hit { colour, score }),
                Err(_) => {
                    error!(topic, payload, "unparseable score");
                    None
                }
            },
            TopicRoute::EndScore => match payload.parse::<i64>() {
                Ok(score) => Some(GameEvent::GameOver { score }),
                Err(_) => {
                    error!(topic, payload, "unparseable end score");
                    None
                }
            },
            TopicRoute::BrokerUptime => {
                if let Some(captures) = self.uptime_pattern.captures(payload) {
                    debug!(uptime_seconds = &captures[1], "broker uptime");
                } else {
                    debug!(topic, payload, "unrecognized uptime payload");
                }
                None
            }
            TopicRoute::Unknown => {
                debug!(topic, "ignoring message on unknown topic");
                None
            }
        }
    }
}
