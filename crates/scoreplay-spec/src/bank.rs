//! MIDI bank selector.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SpecError;

/// Instrument-mapping convention the synthesizer uses when interpreting
/// MIDI bank-select and program-change messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MidiBank {
    /// Roland GS.
    #[default]
    Gs,
    /// General MIDI.
    Gm,
    /// Yamaha XG.
    Xg,
    /// MMA (MIDI Manufacturers Association) bank select.
    Mma,
}

impl MidiBank {
    /// Every accepted bank, in the order they are listed to users.
    pub const ALL: [MidiBank; 4] = [MidiBank::Gs, MidiBank::Gm, MidiBank::Xg, MidiBank::Mma];

    /// Returns the label passed to the synthesizer.
    pub fn as_str(&self) -> &'static str {
        match self {
            MidiBank::Gs => "gs",
            MidiBank::Gm => "gm",
            MidiBank::Xg => "xg",
            MidiBank::Mma => "mma",
        }
    }

    /// Comma-separated list of accepted labels.
    pub fn allowed_labels() -> String {
        Self::ALL
            .iter()
            .map(|b| b.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for MidiBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MidiBank {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Labels are matched exactly; "GS" is not accepted.
        match s {
            "gs" => Ok(MidiBank::Gs),
            "gm" => Ok(MidiBank::Gm),
            "xg" => Ok(MidiBank::Xg),
            "mma" => Ok(MidiBank::Mma),
            _ => Err(SpecError::UnknownMidiBank {
                label: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_labels() {
        for bank in MidiBank::ALL {
            assert_eq!(bank.as_str().parse::<MidiBank>().unwrap(), bank);
        }
    }

    #[test]
    fn test_parse_rejects_unknown_and_case_variants() {
        assert!("invalid-bank".parse::<MidiBank>().is_err());
        assert!("GS".parse::<MidiBank>().is_err());
        assert!("".parse::<MidiBank>().is_err());
    }

    #[test]
    fn test_default_is_gs() {
        assert_eq!(MidiBank::default(), MidiBank::Gs);
    }

    #[test]
    fn test_serde_uses_lowercase_labels() {
        let json = serde_json::to_string(&MidiBank::Mma).unwrap();
        assert_eq!(json, "\"mma\"");
        let parsed: MidiBank = serde_json::from_str("\"xg\"").unwrap();
        assert_eq!(parsed, MidiBank::Xg);
    }

    #[test]
    fn test_allowed_labels() {
        assert_eq!(MidiBank::allowed_labels(), "gs, gm, xg, mma");
    }
}
