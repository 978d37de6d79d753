use crate::error::ModelError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which player technology renders the chapter video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PlaybackSourceKind {
    /// Third-party iframe player driven through its script API.
    Embedded,
    /// Media element playing a direct video URL.
    Native,
}

impl std::fmt::Display for PlaybackSourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackSourceKind::Embedded => f.write_str("embedded"),
            PlaybackSourceKind::Native => f.write_str("native"),
        }
    }
}

/// State codes delivered by the embedded player's state-change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EmbeddedPlayerState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl EmbeddedPlayerState {
    pub fn code(&self) -> i32 {
        match self {
            EmbeddedPlayerState::Unstarted => -1,
            EmbeddedPlayerState::Ended => 0,
            EmbeddedPlayerState::Playing => 1,
            EmbeddedPlayerState::Paused => 2,
            EmbeddedPlayerState::Buffering => 3,
            EmbeddedPlayerState::Cued => 5,
        }
    }
}

impl TryFrom<i32> for EmbeddedPlayerState {
    type Error = ModelError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            -1 => Ok(EmbeddedPlayerState::Unstarted),
            0 => Ok(EmbeddedPlayerState::Ended),
            1 => Ok(EmbeddedPlayerState::Playing),
            2 => Ok(EmbeddedPlayerState::Paused),
            3 => Ok(EmbeddedPlayerState::Buffering),
            5 => Ok(EmbeddedPlayerState::Cued),
            other => Err(ModelError::UnknownPlayerState(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_codes_round_trip_through_known_values() {
        for code in [-1, 0, 1, 2, 3, 5] {
            let state = EmbeddedPlayerState::try_from(code).unwrap();
            assert_eq!(state.code(), code);
        }
        assert!(EmbeddedPlayerState::try_from(4).is_err());
    }
}
