use resistaid_common::ResistaidError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("empty sequence")]
    Empty,

    #[error("unexpected residue '{residue}' at position {position}")]
    InvalidResidue { residue: char, position: usize },
}

#[derive(Debug, Error)]
pub enum DesignError {
    /// Neither retrieved templates nor the framework pool can yield a candidate.
    #[error("no antibody templates available")]
    NoTemplates,
}

impl From<ProfileError> for ResistaidError {
    fn from(e: ProfileError) -> Self {
        ResistaidError::InvalidSequence(e.to_string())
    }
}

impl From<DesignError> for ResistaidError {
    fn from(e: DesignError) -> Self {
        match e {
            DesignError::NoTemplates => ResistaidError::NoTemplates,
        }
    }
}
