//! Cryptographic collaborators: key decoding, signers bound to a hash
//! algorithm, and signature verification.

pub mod algorithms;
pub mod keys;
pub mod signer;

pub use algorithms::{HashAlgorithm, SignatureAlgorithm};
pub use keys::{PrivateKey, PublicKey, PRIVATE_KEY_ENV_VAR};
pub use signer::Signer;
