//! Host native-function catalog seen by analysis.

/// The set of native function names a host provides.
///
/// Analysis only needs to know which names exist; the callable side lives in
/// the evaluator's registry, which implements this trait.
pub trait NativeCatalog {
    fn has_native(&self, name: &str) -> bool;
}

/// A catalog with no natives.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoNatives;

impl NativeCatalog for NoNatives {
    fn has_native(&self, _name: &str) -> bool {
        false
    }
}

