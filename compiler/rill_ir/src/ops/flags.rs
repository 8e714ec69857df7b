use bitflags::bitflags;

bitflags! {
    /// Static properties of a lowered function.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct FunctionFlags: u8 {
        /// The body is a host function.
        const NATIVE = 1 << 0;
        /// The body (or a nested function) reads library variables, so it
        /// can only run against the runtime it was compiled into.
        const USES_LIBRARIES = 1 << 1;
        /// At least one parameter has a default value.
        const HAS_DEFAULTS = 1 << 2;
        /// The function captures outer values or let groups.
        const CAPTURES = 1 << 3;
    }
}
