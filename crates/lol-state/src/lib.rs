use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Number of champions on one team
pub const ROSTER_SIZE: usize = 5;

/// Number of champions offered on the ARAM bench tray
pub const BENCH_SIZE: usize = 10;

/// Which team a screen region or pick belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Own,
    Opposing,
}

/// Five distinct champions forming one team.
///
/// Slot order is kept for display and for swap targets, but every consumer
/// treats the roster as a set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    champions: Vec<String>,
}

impl Roster {
    pub fn new(champions: Vec<String>) -> Result<Self> {
        if champions.len() != ROSTER_SIZE {
            bail!(
                "a roster needs exactly {} champions, got {}",
                ROSTER_SIZE,
                champions.len()
            );
        }
        let mut seen = HashSet::new();
        for champ in &champions {
            if champ.trim().is_empty() {
                bail!("roster contains an empty champion name");
            }
            if !seen.insert(champ.as_str()) {
                bail!("champion '{}' appears twice in the roster", champ);
            }
        }
        Ok(Self { champions })
    }

    pub fn champions(&self) -> &[String] {
        &self.champions
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.champions.iter().map(String::as_str)
    }

    pub fn contains(&self, champion: &str) -> bool {
        self.champions.iter().any(|c| c == champion)
    }

    pub fn position(&self, champion: &str) -> Option<usize> {
        self.champions.iter().position(|c| c == champion)
    }

    /// Copy of this roster with `slot` replaced. Does not re-validate:
    /// replacing a slot with its own champion is a legal no-op, anything else
    /// is the caller's responsibility.
    pub fn with_swap(&self, slot: usize, replacement: &str) -> Roster {
        let mut champions = self.champions.clone();
        if let Some(c) = champions.get_mut(slot) {
            *c = replacement.to_string();
        }
        Roster { champions }
    }
}

/// Own and opposing rosters evaluated together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchContext {
    pub own: Roster,
    pub opposing: Roster,
}

impl MatchContext {
    pub fn new(own: Roster, opposing: Roster) -> Result<Self> {
        if let Some(shared) = own.iter().find(|c| opposing.contains(c)) {
            bail!("champion '{}' is on both teams", shared);
        }
        Ok(Self { own, opposing })
    }
}

/// Output of one screen region after remote recognition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub label: Option<String>,
    /// Percent, 0-100
    pub confidence: f64,
    /// Second recognition pass attribute (the rune picked with the champion)
    pub secondary: Option<String>,
    /// Set when the remote call failed after all retries
    pub error: Option<String>,
}

impl RecognitionResult {
    pub fn detected(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: Some(label.into()),
            confidence,
            ..Self::default()
        }
    }

    pub fn undetected() -> Self {
        Self::default()
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn is_detected(&self) -> bool {
        self.label.is_some()
    }
}

/// (champion, rune, role) as read from the loading screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickTriple {
    pub champion: String,
    pub rune: Option<String>,
    pub role: String,
}

/// Role names used by the rune-role table and the build table
pub mod roles {
    pub const AD: &str = "AD";
    pub const AP: &str = "AP";
    pub const TANK: &str = "Tank";
    pub const SUPPORT: &str = "Support";
    pub const UNKNOWN: &str = "unknown";

    pub fn is_ad(role: &str) -> bool {
        role.contains(AD)
    }

    pub fn is_ap(role: &str) -> bool {
        role.contains(AP)
    }

    pub fn is_tank(role: &str) -> bool {
        role.contains(TANK)
    }

    pub fn is_support(role: &str) -> bool {
        role.contains(SUPPORT)
    }
}

/// Draft picks extracted from a pick-screen capture
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraftState {
    pub current: Vec<String>,
    pub bench: Vec<String>,
    /// False when no classification service is configured
    pub detection_available: bool,
}

impl DraftState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Roster pre-filled from detection, only when all five picks were found
    pub fn detected_roster(&self) -> Option<Roster> {
        if self.current.len() == ROSTER_SIZE {
            Roster::new(self.current.clone()).ok()
        } else {
            None
        }
    }
}
