//! Invariant checking hooks shared by the element store and the view tree.

use crate::mesh_error::MeshError;

/// Structures whose internal consistency can be verified after mutation.
pub trait DebugInvariants {
    /// Panic on the first broken invariant, in debug builds or with an invariant feature enabled.
    fn debug_assert_invariants(&self);

    /// Walk every invariant and return the first one that does not hold.
    fn validate_invariants(&self) -> Result<(), MeshError>;

    /// `true` when [`validate_invariants`](Self::validate_invariants) succeeds.
    fn invariants_hold(&self) -> bool {
        self.validate_invariants().is_ok()
    }
}

/// Evaluate a `Result`-returning check and panic with context when it fails.
///
/// Compiled out of release builds unless `strict-invariants` or
/// `check-invariants` is enabled.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}
