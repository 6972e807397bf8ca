//! The flat error taxonomy shared by every arbiter operation.

use thiserror::Error;

/// The [ArbiterError] enum enumerates every way an arbiter operation can fail. An
/// operation that returns an error aborts atomically: no state change, no payouts,
/// no events. Recovery is the caller's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArbiterError {
    /// The caller or a recovered signer is not registered in the target game.
    #[error("caller or signer is not a member of the game")]
    NotAMember,
    /// The game is not in the lifecycle state the operation requires.
    #[error("game is not in the required lifecycle state")]
    WrongLifecycleState,
    /// The value supplied differs from the required stake or bond.
    #[error("supplied value does not match the required stake")]
    StakeMismatch,
    /// An opaque payload failed to decode.
    #[error("malformed payload")]
    MalformedPayload,
    /// A signature is unparseable or does not recover to the claimed mover.
    #[error("signature does not recover to the claimed mover")]
    BadSignature,
    /// A pair of signed moves does not satisfy the chaining contract.
    #[error("signed moves do not form a chain")]
    ChainBroken,
    /// The rules module rejected the move, or the asserted successor state does not
    /// match the rules module's transition.
    #[error("move rejected by the rules module")]
    IllegalMove,
    /// The position supplied to finish a game is not terminal.
    #[error("position is not terminal")]
    NotFinal,
    /// The timeout sub-machine is not in the state the operation requires.
    #[error("timeout state conflicts with the requested operation")]
    TimeoutConflict,
}
