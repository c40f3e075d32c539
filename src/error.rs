use std::{
    fmt::{self, Formatter},
    sync::Arc,
};

use crate::{
    chain::FluentId, expression::CallEvent, matcher::Mismatch, setup::SetupId,
    substitute::SubstituteId, verify::VerificationFailure,
};

/// The error type for every fallible `standin` operation.
///
/// A call that no setup handles is *not* an error of the engine; see
/// [`UnhandledCall`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    MalformedChain(#[from] MalformedChain),

    #[error(transparent)]
    Verification(#[from] VerificationFailure),

    #[error("substitute {0} does not belong to this repository")]
    UnknownSubstitute(SubstituteId),

    #[error("setup {0} does not belong to this repository")]
    UnknownSetup(SetupId),

    #[error("fluent setup {0} does not belong to this repository")]
    UnknownFluent(FluentId),
}

impl Error {
    /// The verification failure carried by this error, if any.
    pub fn as_verification(&self) -> Option<&VerificationFailure> {
        match self {
            Error::Verification(failure) => Some(failure),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A fluent chain that cannot be decomposed into member accesses.
///
/// Reported when the chain is declared; nothing gets registered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedChain {
    #[error("a fluent chain needs at least one member access")]
    Empty,

    #[error("step {position} of the fluent chain is not a member access: {step}")]
    NotAMemberAccess { position: usize, step: String },
}

/// No setup of a substitute handled a call.
///
/// Whether this ends up as a default value or a hard failure is up to
/// the caller. It carries why each candidate setup did not match, most
/// recent first.
#[derive(Debug, Clone, thiserror::Error)]
pub struct UnhandledCall {
    pub(crate) owner: SubstituteId,
    pub(crate) owner_name: Arc<str>,
    pub(crate) call: CallEvent,
    pub(crate) mismatches: Vec<(SetupId, Mismatch)>,
}

impl UnhandledCall {
    pub fn owner(&self) -> SubstituteId {
        self.owner
    }

    pub fn call(&self) -> &CallEvent {
        &self.call
    }

    pub fn mismatches(&self) -> &[(SetupId, Mismatch)] {
        &self.mismatches
    }
}

impl fmt::Display for UnhandledCall {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "✗ {}.{} was not handled", self.owner_name, self.call)?;

        if self.mismatches.is_empty() {
            return f.write_str(": no setups were declared for it");
        }

        self.mismatches
            .iter()
            .try_for_each(|(setup, mismatch)| write!(f, "\n\n✗ setup {}: {}", setup, mismatch))
    }
}
