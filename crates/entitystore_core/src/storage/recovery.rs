//! Policy for backing documents that no longer decode.
//!
//! # Invariants
//! - Only decode failures are ever recovered; encode failures always propagate.
//! - The decision is pure; the repository performs the reset itself.

use super::codec::CodecError;
use serde::{Deserialize, Serialize};

/// How a repository treats a backing document that fails to decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptionPolicy {
    /// Delete the corrupt file, recreate it empty and carry on.
    #[default]
    ResetOnCorruption,
    /// Surface the failure to the caller and leave the file untouched.
    Strict,
}

/// Action chosen for one codec failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    ResetToEmpty,
    Propagate,
}

impl CorruptionPolicy {
    pub fn action_for(&self, error: &CodecError) -> RecoveryAction {
        match (self, error.is_decode()) {
            (Self::ResetOnCorruption, true) => RecoveryAction::ResetToEmpty,
            _ => RecoveryAction::Propagate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CorruptionPolicy, RecoveryAction};
    use crate::storage::codec::CodecError;

    fn decode_error() -> CodecError {
        CodecError::Decode("unexpected end of input".into())
    }

    #[test]
    fn reset_policy_resets_decode_failures() {
        assert_eq!(
            CorruptionPolicy::ResetOnCorruption.action_for(&decode_error()),
            RecoveryAction::ResetToEmpty
        );
    }

    #[test]
    fn strict_policy_propagates() {
        assert_eq!(
            CorruptionPolicy::Strict.action_for(&decode_error()),
            RecoveryAction::Propagate
        );
    }

    #[test]
    fn encode_failures_are_never_recovered() {
        let err = CodecError::Encode("map key must be a string".into());
        assert_eq!(
            CorruptionPolicy::ResetOnCorruption.action_for(&err),
            RecoveryAction::Propagate
        );
    }
}
