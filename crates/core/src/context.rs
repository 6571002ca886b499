//! Context prefix: the fixed leading turns sent ahead of every conversation.
//!
//! A prefix is configuration, not state: it is built once per deployment
//! (from a named [`ContextPreset`] or custom turns) and handed to the
//! assembler on every call. Typically the first turn is a `system`
//! instruction, optionally followed by a priming `assistant` reply.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::message::Turn;

/// An ordered, immutable sequence of turns placed before all conversation turns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextPrefix {
    turns: Vec<Turn>,
}

impl ContextPrefix {
    pub fn new(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    /// A prefix with no turns; requests carry only the conversation.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl From<ContextPreset> for ContextPrefix {
    fn from(preset: ContextPreset) -> Self {
        preset.prefix()
    }
}

/// Built-in context prefixes selectable by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContextPreset {
    /// Answers everything with a joke.
    #[default]
    PunGenerator,
    /// A plain general-purpose assistant.
    HelpfulAssistant,
    /// Helps the user find people, places and services.
    DirectoryAssistant,
}

impl ContextPreset {
    pub const ALL: [ContextPreset; 3] = [
        ContextPreset::PunGenerator,
        ContextPreset::HelpfulAssistant,
        ContextPreset::DirectoryAssistant,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ContextPreset::PunGenerator => "pun-generator",
            ContextPreset::HelpfulAssistant => "helpful-assistant",
            ContextPreset::DirectoryAssistant => "directory-assistant",
        }
    }

    /// Build the turns for this preset.
    pub fn prefix(&self) -> ContextPrefix {
        let turns = match self {
            ContextPreset::PunGenerator => vec![
                Turn::system(
                    "You are a pun generator. The user will ask you to provide jokes and you \
                     will do so. Even if the user asks something not related to jokes, you can \
                     only respond with a joke. Do you understand?",
                ),
                Turn::assistant("Got it, I'll try to be punny!"),
            ],
            ContextPreset::HelpfulAssistant => {
                vec![Turn::system("You are a helpful assistant.")]
            }
            ContextPreset::DirectoryAssistant => vec![
                Turn::system(
                    "You are a directory assistant. Help the user find people, places, \
                     businesses and services. Keep answers short and factual, and say so \
                     when you do not know a listing.",
                ),
                Turn::assistant("Understood. Who or what are you looking for?"),
            ],
        };
        ContextPrefix::new(turns)
    }
}

impl std::fmt::Display for ContextPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContextPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s.trim())
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|p| p.name()).collect();
                format!("unknown context preset '{s}' (known: {})", known.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;

    #[test]
    fn preset_names_roundtrip() {
        for preset in ContextPreset::ALL {
            assert_eq!(preset.name().parse::<ContextPreset>().unwrap(), preset);
        }
    }

    #[test]
    fn unknown_preset_rejected() {
        let err = "pirate".parse::<ContextPreset>().unwrap_err();
        assert!(err.contains("pirate"));
        assert!(err.contains("helpful-assistant"));
    }

    #[test]
    fn every_preset_starts_with_system() {
        for preset in ContextPreset::ALL {
            let prefix = preset.prefix();
            assert!(!prefix.is_empty());
            assert_eq!(prefix.turns()[0].role(), Role::System);
        }
    }

    #[test]
    fn pun_generator_primes_an_assistant_reply() {
        let prefix = ContextPreset::PunGenerator.prefix();
        assert_eq!(prefix.len(), 2);
        assert_eq!(prefix.turns()[1].role(), Role::Assistant);
        assert!(prefix.turns()[1].content().contains("punny"));
    }

    #[test]
    fn preset_serde_uses_kebab_case() {
        let json = serde_json::to_string(&ContextPreset::DirectoryAssistant).unwrap();
        assert_eq!(json, "\"directory-assistant\"");
    }
}
