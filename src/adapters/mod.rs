// Adapters layer: concrete implementations for external systems (remote
// endpoint, request signing, mutations).

pub mod mutation;
pub mod remote;
pub mod signer;
