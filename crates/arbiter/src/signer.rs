//! EIP-712 typed-data hashing and signature recovery for [GameMove]s.

use alloy_primitives::{address, b256, keccak256, Address, Signature, B256, U256};
use alloy_sol_types::{sol, SolType};
use gamejutsu_primitives::{ArbiterError, GameMove};

/// EIP-712 domain name.
pub const DOMAIN_NAME: &str = "GameJutsu";

/// EIP-712 domain version.
pub const DOMAIN_VERSION: &str = "0.1";

/// Chain id baked into the production domain separator (Polygon).
pub const CHAIN_ID: u64 = 137;

/// Verifying contract address baked into the production domain separator.
pub const VERIFYING_CONTRACT: Address = address!("CcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC");

/// Domain salt baked into the production domain separator.
pub const SALT: B256 = b256!("920dfa98b3727bbfe860dd7341801f2e2a55cd7f637dea958edfc5df56c35e4d");

const EIP712_DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract,bytes32 salt)";

const GAME_MOVE_TYPE: &str =
    "GameMove(uint256 gameId,uint256 nonce,address player,bytes oldState,bytes newState,bytes move)";

type DomainConstruction = sol! { tuple(bytes32, bytes32, bytes32, uint256, address, bytes32) };
type GameMoveConstruction =
    sol! { tuple(bytes32, uint256, uint256, address, bytes32, bytes32, bytes32) };

/// The [MoveSigner] computes the EIP-712 digest of [GameMove]s and recovers their
/// signers. The domain separator is fixed at construction; two signers built from
/// the same domain literals are wire compatible.
#[derive(Debug, Clone)]
pub struct MoveSigner {
    domain_separator: B256,
}

impl MoveSigner {
    /// A signer over the production domain ([CHAIN_ID], [VERIFYING_CONTRACT], [SALT]).
    pub fn new() -> Self {
        Self::with_domain(CHAIN_ID, VERIFYING_CONTRACT, SALT)
    }

    /// A signer over a custom domain. The name and version literals stay fixed.
    pub fn with_domain(chain_id: u64, verifying_contract: Address, salt: B256) -> Self {
        let domain_separator = keccak256(DomainConstruction::abi_encode(&(
            keccak256(EIP712_DOMAIN_TYPE.as_bytes()),
            keccak256(DOMAIN_NAME.as_bytes()),
            keccak256(DOMAIN_VERSION.as_bytes()),
            U256::from(chain_id),
            verifying_contract,
            salt,
        )));
        Self { domain_separator }
    }

    pub fn domain_separator(&self) -> B256 {
        self.domain_separator
    }

    /// The `0x1901`-prefixed digest a player signs to assert `game_move`.
    pub fn digest(&self, game_move: &GameMove) -> B256 {
        let struct_hash = keccak256(GameMoveConstruction::abi_encode(&(
            keccak256(GAME_MOVE_TYPE.as_bytes()),
            U256::from(game_move.game_id),
            U256::from(game_move.nonce),
            game_move.player,
            keccak256(&game_move.old_state),
            keccak256(&game_move.new_state),
            keccak256(&game_move.mv),
        )));

        let mut preimage = Vec::with_capacity(66);
        preimage.extend_from_slice(&[0x19, 0x01]);
        preimage.extend_from_slice(self.domain_separator.as_slice());
        preimage.extend_from_slice(struct_hash.as_slice());
        keccak256(preimage)
    }

    /// Recovers the address that signed `sig` over the digest of `game_move`.
    ///
    /// `sig` is the 65-byte `r ‖ s ‖ v` encoding with `v ∈ {27, 28}` (the 0/1
    /// parity forms are accepted too). Pure and idempotent.
    pub fn recover(&self, game_move: &GameMove, sig: &[u8]) -> Result<Address, ArbiterError> {
        let signature = Signature::try_from(sig).map_err(|_| ArbiterError::BadSignature)?;
        signature
            .recover_address_from_prehash(&self.digest(game_move))
            .map_err(|_| ArbiterError::BadSignature)
    }
}

impl Default for MoveSigner {
    fn default() -> Self {
        Self::new()
    }
}
