//! Prerequisite expression language for the Fabula ground-truth core.
//!
//! Operators in the catalog gate themselves on small boolean expressions
//! over world state (`actor.stats.wealth > target.stats.wealth * 10`,
//! `actor.offices includes 'powers.SUBPOENA'`). This crate compiles and
//! evaluates those expressions against an explicit evaluation context,
//! without ever panicking or throwing past its public boundary.
//!
//! # Modules
//!
//! - [`token`] -- Tokenizer: comparators, arithmetic, literals, PATH tokens.
//! - [`parse`] -- Recursive-descent parser into a small AST with a flat
//!   left-associative arithmetic fold.
//! - [`path`] -- The [`EvalContext`] and dotted path resolution, including
//!   the derived `offices`/`knowledge`/`location` paths.
//! - [`eval`] -- Evaluation with safe arithmetic (division by zero is 0)
//!   and the batch prerequisite report.
//! - [`error`] -- [`ExprError`], folded into result reports at the
//!   public surface.
//!
//! # Usage
//!
//! ```
//! use fabula_expr::{evaluate_expression, EvalContext};
//! use serde_json::json;
//!
//! let actor = json!({ "id": "char_varo", "stats": { "wealth": 800.0 } });
//! let target = json!({ "id": "char_milo", "stats": { "wealth": 60.0 } });
//! let ctx = EvalContext::new().with_actor(&actor).with_target(&target);
//!
//! let result = evaluate_expression("actor.stats.wealth > target.stats.wealth * 10", &ctx);
//! assert!(result.passed);
//! ```

pub mod error;
pub mod eval;
pub mod parse;
pub mod path;
pub mod token;

// Re-export primary types at crate root.
pub use error::ExprError;
pub use eval::{
    evaluate_expression, evaluate_prereqs, truthy, values_equal, Evaluation, PrereqReport,
    PrereqResult,
};
pub use path::{parse_segment, resolve_path, walk, Accessor, EvalContext};
pub use token::{tokenize, Token};
