//! Construction errors for IR nodes

use thiserror::Error;

/// Structural invariant violated while building an IR node.
///
/// These are programming errors in the producer of the tree (the AST adapter
/// or a corrupt `.ir` payload), never analysis findings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    /// Parameter flagged both named and positional
    #[error("parameter '{name}' cannot be both named and positional")]
    NamedAndPositional { name: String },

    /// Parameter flagged neither named nor positional
    #[error("parameter '{name}' must be either named or positional")]
    NeitherNamedNorPositional { name: String },

    /// `required` used on a positional parameter
    #[error("positional parameter '{name}' cannot be marked required")]
    RequiredPositional { name: String },

    /// `const` combined with `async`, `async*` or `sync*`
    #[error("function '{name}' cannot be both const and {modifier}")]
    ConstWithAsync { name: String, modifier: &'static str },

    /// Abstract function with statements in its body
    #[error("abstract function '{name}' cannot have a body")]
    AbstractWithBody { name: String },

    /// Getter declared with parameters
    #[error("getter '{name}' cannot declare parameters (found {count})")]
    GetterWithParameters { name: String, count: usize },

    /// Setter without exactly one parameter
    #[error("setter '{name}' must declare exactly one parameter (found {count})")]
    SetterArity { name: String, count: usize },

    /// `Nullable` wrapping a type that already admits null
    #[error("nullable type cannot wrap '{base}'")]
    NestedNullable { base: String },

    /// Constructor both redirecting and carrying an initializer list or body
    #[error("redirecting constructor '{name}' cannot have initializers or a body")]
    RedirectWithInitializers { name: String },
}
