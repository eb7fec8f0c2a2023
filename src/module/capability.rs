/// Lookup name for the symbol accessor.
pub const GET_SYMBOL: &str = "get_symbol";
/// Lookup name for the constant-name-list accessor.
pub const GET_CONST_VARS: &str = "get_const_vars";
/// Lookup name for the initializer entry point.
pub const INIT: &str = "__init__";

/// The fixed set of operations a module exposes to the host executor.
///
/// Hosts resolve subgraphs by probing candidate names, so an unrecognized
/// name is an expected outcome, not an error: `resolve` returns `None` and
/// never panics. The invocation entry point is addressed by the module's
/// own symbol name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    GetSymbol,
    GetConstVars,
    Init,
    Invoke,
}

impl Capability {
    pub fn resolve(name: &str, symbol_name: &str) -> Option<Capability> {
        match name {
            GET_SYMBOL => Some(Capability::GetSymbol),
            GET_CONST_VARS => Some(Capability::GetConstVars),
            INIT => Some(Capability::Init),
            _ if name == symbol_name => Some(Capability::Invoke),
            _ => None,
        }
    }
}
