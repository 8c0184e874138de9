use anon_paymaster_primitives::Field;

/// Everything that can go wrong between an identity and a finished membership proof.
#[derive(Debug, thiserror::Error)]
pub enum ProverError {
	#[error("no proving key for merkle tree depth {0}")]
	MissingProvingKey(u8),
	#[error("proving key for depth {depth} is unreadable: {reason}")]
	KeyEncoding { depth: u8, reason: String },
	#[error("merkle tree depth {0} outside supported range")]
	InvalidDepth(u8),
	#[error("membership tree of depth {0} is full")]
	TreeFull(u8),
	#[error("witness has {actual} siblings, tree depth is {expected}")]
	WitnessDepth { expected: usize, actual: usize },
	#[error("witness leads to root {computed}, expected {expected}")]
	RootMismatch { expected: Field, computed: Field },
	#[error("identity is not a member of the tree at the requested root")]
	NotAMember,
	#[error("no prefix of the member list reproduces root {0}")]
	RootNotReproducible(Field),
	#[error("identity secret must be a non-zero canonical field element")]
	InvalidSecret,
	#[error("proof synthesis failed: {0}")]
	Synthesis(String),
	#[error("proof generation worker failed: {0}")]
	Worker(String),
	#[error("i/o error reading proving key: {0}")]
	Io(#[from] std::io::Error),
}
