use crate::PoolId;

/// Why a paymaster context blob was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
	#[error("context must be exactly {expected} bytes, got {actual}")]
	Length { expected: usize, actual: usize },
	#[error("unsupported context version {0}")]
	UnsupportedVersion(u8),
	#[error("unknown spending mode flag {0:#04x}")]
	UnknownMode(u8),
	#[error("reserved context bytes must be zero")]
	ReservedBytesSet,
	#[error("context does not reference a pool")]
	ZeroPoolId,
	#[error("context references pool {actual} but snapshot is of pool {expected}")]
	PoolMismatch { expected: PoolId, actual: PoolId },
}

/// Why a paymaster data blob could not be read back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
	#[error("paymaster data must be exactly {expected} bytes, got {actual}")]
	Length { expected: usize, actual: usize },
	#[error("unsupported paymaster data version {0}")]
	UnsupportedVersion(u8),
	#[error("invalid spending mode in paymaster data: {0}")]
	Mode(#[from] ContextError),
	#[error("reserved paymaster data bytes must be zero")]
	ReservedBytesSet,
	#[error("merkle tree depth word out of range")]
	InvalidDepth,
	#[error("nullifier is not a canonical field element")]
	NonCanonicalNullifier,
}

/// Inconsistent pool state, usually a malformed index response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
	#[error("root history capacity must be non-zero")]
	ZeroCapacity,
	#[error("root history slot {index} out of range for capacity {capacity}")]
	SlotOutOfRange { index: u32, capacity: u32 },
	#[error("merkle tree depth {0} outside supported range")]
	InvalidDepth(u8),
}
