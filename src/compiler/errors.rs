//! Error types for model compilation and validation

use thiserror::Error;

use crate::compiler::expr::EvalError;

/// Errors that abort model compilation
///
/// Every variant is fatal; nothing in this layer is recovered locally. The
/// messages name the offending variable(s), symbol(s) or counts since they
/// are the primary feedback loop for model authors iterating on equation
/// text.
#[derive(Debug, Error)]
pub enum CompileError {
    // ─────────────────────────────────────────────────────────────────────────
    // Specification Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to deserialize the model specification
    #[error("Failed to parse model specification: {0}")]
    SpecError(#[from] serde_json::Error),

    /// Missing required field
    #[error("Missing required field `{field}` for {context}")]
    MissingField { field: String, context: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Expression Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Invalid expression syntax
    #[error("Invalid expression in {context}: {message}")]
    InvalidExpression { context: String, message: String },

    /// Empty expression
    #[error("Empty expression in {context}")]
    EmptyExpression { context: String },

    /// A name used in an expression resolves to no binding
    #[error("Unknown symbol `{name}` referenced in {context}")]
    UndefinedSymbol { name: String, context: String },

    /// Two declared names map to the same binding
    #[error("Symbol `{name}` is bound more than once; variables, parameters, shocks, timing-suffixed names and declared inputs must be distinct")]
    SymbolCollision { name: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Structural Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// A declared variable never appears at time t in any equation
    #[error("Variable `{name}` is not defined for time t")]
    UndefinedVariable { name: String },

    /// Duplicate variable name (fatal only under a strict validator)
    #[error("Duplicate variable name: `{name}`")]
    DuplicateVariable { name: String },

    /// Canonical variable count does not match the equation count
    #[error("Model has {variables} variables but {equations} equations{}", duplicates_note(.duplicates))]
    DeterminacyMismatch {
        variables: usize,
        equations: usize,
        duplicates: Vec<String>,
    },

    /// A value-function input is missing the required timing suffix
    #[error("Value-function input `{name}` must carry the `Prime` suffix")]
    InvalidDecisionInput { name: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Distribution Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// More than one distribution block declared
    #[error("More than one distribution is not supported (found {0})")]
    MultipleDistributions(usize),

    /// Wrong number of exogenous state dimensions
    #[error("Distributions require exactly one exogenous dimension (found {0})")]
    ExogenousDimensions(usize),

    /// Too many endogenous state dimensions
    #[error("Distributions with more than two endogenous dimensions are not supported (found {0})")]
    EndogenousDimensions(usize),

    /// Unrecognized state-type tag in a distribution block
    #[error("Grid of type `{0}` is not implemented")]
    UnknownStateType(String),

    /// A grid, transition matrix or routine referenced by name is absent
    #[error("Object `{name}` was not found in the execution context")]
    MissingContextObject { name: String },

    /// An endogenous dimension has no matching decision output
    #[error("Distribution dimension `{name}` does not match any declared decision output")]
    NotInDecisionOutputs { name: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Numerical Sanity Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// The smoke-test residual evaluation produced NaN entries
    #[error("Initial values are NaN")]
    InitialValuesNaN,

    /// The smoke-test residual evaluation produced infinite entries
    #[error("Initial values are not finite")]
    InitialValuesNotFinite,

    /// A compiled function failed during the smoke test
    #[error(transparent)]
    Eval(#[from] EvalError),
}

fn duplicates_note(duplicates: &[String]) -> String {
    if duplicates.is_empty() {
        String::new()
    } else {
        format!(
            ", variables list contains duplicate(s): {}",
            duplicates.join(", ")
        )
    }
}

impl CompileError {
    /// Create an invalid expression error
    pub fn invalid_expr(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidExpression {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create an undefined symbol error
    pub fn undefined_symbol(name: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UndefinedSymbol {
            name: name.into(),
            context: context.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            context: context.into(),
        }
    }
}
