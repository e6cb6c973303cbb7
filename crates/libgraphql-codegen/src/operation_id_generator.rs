use crate::OperationDescriptor;
use inherent::inherent;
use sha2::Digest;

/// Computes persisted-query ids locally, without any round-trip to an
/// external system.
///
/// Implementations must be deterministic: the id may only depend on the
/// descriptor's normalized `source`, never on its position in the batch or on
/// anything else about the compilation.
pub trait OperationIdGenerator: Send + Sync {
    /// Identifies the generator in logs and configuration errors.
    fn name(&self) -> &str;

    fn generate(&self, descriptor: &OperationDescriptor) -> String;
}

/// The default [`OperationIdGenerator`]: the lowercase hex sha256 digest of
/// the descriptor's normalized source.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sha256OperationIdGenerator;

#[inherent]
impl OperationIdGenerator for Sha256OperationIdGenerator {
    pub fn name(&self) -> &str {
        "sha256"
    }

    pub fn generate(&self, descriptor: &OperationDescriptor) -> String {
        format!("{:x}", sha2::Sha256::digest(descriptor.source().as_bytes()))
    }
}
