//! Draft composition state

use super::Attachment;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Species tag sent with every turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Species {
    #[default]
    General,
    Dog,
    Cat,
    Cow,
    Goat,
}

impl Species {
    pub const ALL: [Species; 5] = [
        Species::General,
        Species::Dog,
        Species::Cat,
        Species::Cow,
        Species::Goat,
    ];

    /// Name used on the wire
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Species::General => "general",
            Species::Dog => "dog",
            Species::Cat => "cat",
            Species::Cow => "cow",
            Species::Goat => "goat",
        }
    }

    /// Human-readable label for pickers
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Species::General => "General",
            Species::Dog => "Dog",
            Species::Cat => "Cat",
            Species::Cow => "Cow",
            Species::Goat => "Goat",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown species: {0:?}")]
pub struct UnknownSpecies(pub String);

impl FromStr for Species {
    type Err = UnknownSpecies;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Species::ALL
            .into_iter()
            .find(|species| species.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownSpecies(s.to_string()))
    }
}

/// Not-yet-submitted composition state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    pub text: String,
    pub species: Species,
    pub attachment: Option<Attachment>,
}

impl Draft {
    /// True when there is nothing worth sending
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.attachment.is_none()
    }

    /// The draft after submission: text and attachment gone, species kept
    #[must_use]
    pub fn cleared(&self) -> Self {
        Self {
            species: self.species,
            ..Self::default()
        }
    }
}
