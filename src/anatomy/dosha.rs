use crate::anatomy::error::AnatomyError;
use crate::anatomy::normalize::Highlight;
use crate::anatomy::organs::OrganId;
use crate::anatomy::{HIGHLIGHT_INTENSITY, KAPHA_HEX, PITTA_HEX, VATA_HEX, hex_color};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dosha {
    #[default]
    None,
    Vata,
    Pitta,
    Kapha,
}

pub const DOSHA_ORDER: [Dosha; 3] = [Dosha::Vata, Dosha::Pitta, Dosha::Kapha];

impl Dosha {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Vata => "vata",
            Self::Pitta => "pitta",
            Self::Kapha => "kapha",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Vata => "Vata (air)",
            Self::Pitta => "Pitta (fire)",
            Self::Kapha => "Kapha (earth)",
        }
    }

    /// Organs lit up while this dosha is active.
    pub fn targets(self) -> &'static [OrganId] {
        match self {
            Self::None => &[],
            Self::Vata => &[OrganId::KidneyL, OrganId::KidneyR],
            Self::Pitta => &[OrganId::Heart],
            Self::Kapha => &[OrganId::Brain],
        }
    }

    pub fn highlight(self) -> Option<Highlight> {
        let hex = match self {
            Self::None => return None,
            Self::Vata => VATA_HEX,
            Self::Pitta => PITTA_HEX,
            Self::Kapha => KAPHA_HEX,
        };
        Some(Highlight {
            color: hex_color(hex),
            intensity: HIGHLIGHT_INTENSITY,
        })
    }

    /// Organ whose scale beats while this dosha is active.
    pub fn pulse_target(self) -> Option<OrganId> {
        match self {
            Self::Pitta => Some(OrganId::Heart),
            _ => None,
        }
    }

    pub fn highlights(self, organ: OrganId) -> bool {
        self.targets().contains(&organ)
    }
}

impl fmt::Display for Dosha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a caller asks the state machine for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoshaSelection {
    Reset,
    Dosha(Dosha),
}

impl fmt::Display for DoshaSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reset => f.write_str("reset"),
            Self::Dosha(dosha) => dosha.fmt(f),
        }
    }
}

impl From<Dosha> for DoshaSelection {
    fn from(dosha: Dosha) -> Self {
        Self::Dosha(dosha)
    }
}

impl FromStr for DoshaSelection {
    type Err = AnatomyError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "reset" => Ok(Self::Reset),
            "none" => Ok(Self::Dosha(Dosha::None)),
            "vata" => Ok(Self::Dosha(Dosha::Vata)),
            "pitta" => Ok(Self::Dosha(Dosha::Pitta)),
            "kapha" => Ok(Self::Dosha(Dosha::Kapha)),
            _ => Err(AnatomyError::UnknownDosha(raw.to_string())),
        }
    }
}
