//! The AI companion: a local chat/TTS service reached through [`CompanionApi`].
//!
//! The game never depends on the service being up. [`Companion`] tracks
//! connectivity and answers with canned text whenever a call fails.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::CompanionError;
use crate::game::GameState;

/// Header every request to the companion service must carry.
pub const GAME_KEY_HEADER: &str = "player2-game-key";
pub const GAME_KEY: &str = "ai-rpg-adventure";

/// Reply used while the service is known to be unreachable.
pub const OFFLINE_REPLY: &str =
    "I'm having trouble connecting to my knowledge base right now, but I'm still here to help you!";
/// Reply used when a chat call fails.
pub const FAILED_REPLY: &str =
    "I'm experiencing some difficulties with my connection. Let me try to help you with what I know.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionCharacter {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHealth {
    #[serde(default)]
    pub client_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub gender: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakOptions {
    #[serde(default)]
    pub voice_ids: Vec<String>,
    pub speed: f32,
    pub audio_format: String,
}

impl Default for SpeakOptions {
    fn default() -> Self {
        Self {
            voice_ids: Vec::new(),
            speed: 1.0,
            audio_format: "mp3".to_string(),
        }
    }
}

/// Base64 audio returned by the speech endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechAudio {
    pub audio_base64: Option<String>,
}

/// Operations the companion service offers. Implementations send
/// [`GAME_KEY_HEADER`]: [`GAME_KEY`] with every request.
#[async_trait]
pub trait CompanionApi: Send + Sync {
    async fn characters(&self) -> Result<Vec<CompanionCharacter>, CompanionError>;

    async fn health(&self) -> Result<ServiceHealth, CompanionError>;

    async fn voices(&self) -> Result<Vec<Voice>, CompanionError>;

    /// One chat completion. `context` describes the current game.
    async fn chat(&self, message: &str, context: &str) -> Result<String, CompanionError>;

    async fn speak(&self, text: &str, options: &SpeakOptions) -> Result<SpeechAudio, CompanionError>;

    async fn stop_speaking(&self) -> Result<(), CompanionError>;
}

/// A service that is never there.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineCompanion;

impl OfflineCompanion {
    fn unavailable<T>() -> Result<T, CompanionError> {
        Err(CompanionError::Unavailable(
            "no companion service configured".to_string(),
        ))
    }
}

#[async_trait]
impl CompanionApi for OfflineCompanion {
    async fn characters(&self) -> Result<Vec<CompanionCharacter>, CompanionError> {
        Self::unavailable()
    }

    async fn health(&self) -> Result<ServiceHealth, CompanionError> {
        Self::unavailable()
    }

    async fn voices(&self) -> Result<Vec<Voice>, CompanionError> {
        Self::unavailable()
    }

    async fn chat(&self, _message: &str, _context: &str) -> Result<String, CompanionError> {
        Self::unavailable()
    }

    async fn speak(&self, _text: &str, _options: &SpeakOptions) -> Result<SpeechAudio, CompanionError> {
        Self::unavailable()
    }

    async fn stop_speaking(&self) -> Result<(), CompanionError> {
        Self::unavailable()
    }
}

/// Free-form description of the game handed to the chat endpoint.
pub fn game_context(state: &GameState) -> String {
    let c = &state.character;
    let active = state.active_quests().count();
    format!(
        "You are {companion}, a mystical AI companion in a fantasy RPG.\n\
         Current location: {location} - {description}\n\
         Player character: Level {level} {class}\n\
         Player stats: Health {health}, Stamina {stamina}, Hunger: {hunger}\n\
         Available activities: {activities}\n\
         Active quests: {active}\n\
         Respond as {companion} would, being helpful and knowledgeable about the world.",
        companion = state.companion.name,
        location = state.location.name,
        description = state.location.description,
        level = c.level,
        class = c.class,
        health = c.health,
        stamina = c.stamina,
        hunger = c.hunger,
        activities = state.location.activities.join(", "),
        active = active,
    )
}

/// An API plus what we currently believe about its reachability.
pub struct Companion<A> {
    api: A,
    connected: bool,
    tts_enabled: bool,
}

impl<A: CompanionApi> Companion<A> {
    pub fn new(api: A, tts_enabled: bool) -> Self {
        Self {
            api,
            connected: false,
            tts_enabled,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn tts_enabled(&self) -> bool {
        self.tts_enabled
    }

    pub fn set_tts_enabled(&mut self, enabled: bool) {
        self.tts_enabled = enabled;
    }

    /// Probe the service by listing characters. Returns the event line to log.
    pub async fn check_connection(&mut self) -> String {
        match self.api.characters().await {
            Ok(chars) => {
                self.connected = true;
                info!(characters = chars.len(), "companion service connected");
                "Connected to Player2 API successfully!".to_string()
            }
            Err(e) => {
                self.connected = false;
                warn!("companion service unavailable: {e}");
                "⚠️ Player2 API not available. AI companion responses will be limited.".to_string()
            }
        }
    }

    /// Voice count for the startup event, when speech is usable.
    pub async fn init_tts(&mut self) -> Option<String> {
        if !self.connected {
            return None;
        }
        match self.api.voices().await {
            Ok(voices) => Some(format!(
                "TTS initialized with {} available voices",
                voices.len()
            )),
            Err(e) => {
                warn!("TTS voices unavailable: {e}");
                Some("TTS voices not available".to_string())
            }
        }
    }

    /// Ask the companion something. Never fails; a failed call marks the
    /// service disconnected and yields fallback text.
    pub async fn reply(&mut self, message: &str, state: &GameState) -> String {
        if !self.connected {
            return OFFLINE_REPLY.to_string();
        }

        match self.api.chat(message, &game_context(state)).await {
            Ok(text) => text,
            Err(e) => {
                warn!("companion chat failed, going offline: {e}");
                self.connected = false;
                FAILED_REPLY.to_string()
            }
        }
    }

    /// Speak `text` if speech is enabled and the service is up. Errors are
    /// logged and otherwise ignored.
    pub async fn speak(&self, text: &str) -> Option<SpeechAudio> {
        if !self.tts_enabled || !self.connected {
            return None;
        }
        match self.api.speak(text, &SpeakOptions::default()).await {
            Ok(audio) => Some(audio),
            Err(e) => {
                debug!("TTS error: {e}");
                None
            }
        }
    }

    pub async fn stop_speaking(&self) {
        if let Err(e) = self.api.stop_speaking().await {
            debug!("stop speaking failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::BaseContent;
    use std::sync::Mutex;

    /// Answers chats from a script; `None` entries fail.
    struct Scripted {
        replies: Mutex<Vec<Option<String>>>,
        up: bool,
    }

    impl Scripted {
        fn new(up: bool, replies: Vec<Option<&str>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().rev().map(|r| r.map(String::from)).collect()),
                up,
            }
        }
    }

    #[async_trait]
    impl CompanionApi for Scripted {
        async fn characters(&self) -> Result<Vec<CompanionCharacter>, CompanionError> {
            if self.up {
                Ok(vec![CompanionCharacter {
                    id: "aria".into(),
                    name: "Aria".into(),
                    description: String::new(),
                }])
            } else {
                Err(CompanionError::Unavailable("down".into()))
            }
        }

        async fn health(&self) -> Result<ServiceHealth, CompanionError> {
            Ok(ServiceHealth {
                client_version: "test".into(),
            })
        }

        async fn voices(&self) -> Result<Vec<Voice>, CompanionError> {
            Ok(Vec::new())
        }

        async fn chat(&self, _message: &str, context: &str) -> Result<String, CompanionError> {
            assert!(context.contains("Current location: Village of Eldoria"));
            match self.replies.lock().unwrap().pop().flatten() {
                Some(text) => Ok(text),
                None => Err(CompanionError::Request("boom".into())),
            }
        }

        async fn speak(&self, _text: &str, _options: &SpeakOptions) -> Result<SpeechAudio, CompanionError> {
            Ok(SpeechAudio {
                audio_base64: Some("AAAA".into()),
            })
        }

        async fn stop_speaking(&self) -> Result<(), CompanionError> {
            Ok(())
        }
    }

    fn state() -> GameState {
        let base = BaseContent::builtin().unwrap();
        GameState::fresh(&base, &base.locations)
    }

    #[tokio::test]
    async fn offline_service_gets_canned_replies() {
        let mut companion = Companion::new(OfflineCompanion, true);
        let event = companion.check_connection().await;
        assert!(event.contains("not available"));
        assert!(!companion.is_connected());
        assert_eq!(companion.reply("hello", &state()).await, OFFLINE_REPLY);
        assert!(companion.speak("hello").await.is_none());
    }

    #[tokio::test]
    async fn failed_chat_flips_to_disconnected() {
        let mut companion = Companion::new(Scripted::new(true, vec![Some("Greetings!"), None]), true);
        companion.check_connection().await;
        assert!(companion.is_connected());

        assert_eq!(companion.reply("hi", &state()).await, "Greetings!");
        assert_eq!(companion.reply("hi again", &state()).await, FAILED_REPLY);
        assert!(!companion.is_connected());
        assert_eq!(companion.reply("still there?", &state()).await, OFFLINE_REPLY);
    }

    #[tokio::test]
    async fn speech_respects_the_toggle() {
        let mut companion = Companion::new(Scripted::new(true, vec![]), false);
        companion.check_connection().await;
        assert!(companion.speak("hi").await.is_none());
        companion.set_tts_enabled(true);
        assert!(companion.speak("hi").await.is_some());
        assert_eq!(
            companion.init_tts().await.as_deref(),
            Some("TTS initialized with 0 available voices")
        );
    }

    #[test]
    fn context_mentions_the_essentials() {
        let ctx = game_context(&state());
        assert!(ctx.starts_with("You are Aria"));
        assert!(ctx.contains("Player character: Level 1 Wanderer"));
        assert!(ctx.contains("Health 100/100"));
        assert!(ctx.contains("Active quests: 2"));
    }
}
