//! Builtin procedures.
//!
//! Builtins are visible at the source level without a declaration. They
//! are not part of the analyzer's signature tables; the analyzer checks
//! their arguments itself and the generator lowers each call to the Go
//! callee named here, requesting the Go package import it needs.

/// Metadata about a single builtin procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinDescriptor {
    /// Name at the source level (matched case-insensitively).
    pub name: &'static str,

    /// Fully qualified Go function the call is lowered to.
    pub go_callee: &'static str,

    /// Go package that must be imported for `go_callee`.
    pub import: &'static str,
}

/// The complete list of builtins known to the translator.
pub const BUILTINS: &[BuiltinDescriptor] = &[BuiltinDescriptor {
    name: "writeln",
    go_callee: "fmt.Println",
    import: "fmt",
}];

/// Look up a builtin by its source-level name.
pub fn find_builtin(name: &str) -> Option<&'static BuiltinDescriptor> {
    BUILTINS.iter().find(|b| b.name.eq_ignore_ascii_case(name))
}
