//! Expression evaluation and batch prerequisite checking.
//!
//! The public surface never panics and never propagates errors as `Err`:
//! [`evaluate_expression`] folds every tokenizer, parser, resolution, and
//! arithmetic failure into an [`Evaluation`] report, and
//! [`evaluate_prereqs`] evaluates each expression independently so one
//! malformed operator definition cannot mask the results of the rest.
//!
//! Arithmetic follows the "safe arithmetic" policy: division by zero
//! evaluates to `0`, not an error or infinity.

use serde::Serialize;
use serde_json::Value;

use fabula_types::Prereq;

use crate::error::ExprError;
use crate::parse::{parse, Arith, ArithOp, Cmp, Expr, Operand};
use crate::path::{resolve_path, EvalContext};
use crate::token::tokenize;

/// The outcome of evaluating one expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// Whether the expression evaluated truthily.
    pub passed: bool,
    /// The evaluated value, when evaluation succeeded.
    pub value: Option<Value>,
    /// The failure reason, when it did not.
    pub error: Option<String>,
}

/// Per-expression entry in a batch prerequisite report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrereqResult {
    /// The expression source text.
    pub expr: String,
    /// Whether this expression parsed and evaluated truthily.
    pub passed: bool,
    /// The failure reason, if any.
    pub error: Option<String>,
}

/// Aggregate result of a batch prerequisite check.
///
/// `all_passed` holds iff every expression both parsed and evaluated to
/// `true`; the per-expression results explain *why* an operator was
/// rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrereqReport {
    /// Whether every prerequisite passed.
    pub all_passed: bool,
    /// One entry per prerequisite, in input order.
    pub results: Vec<PrereqResult>,
}

/// Compile and evaluate a single expression against a context.
pub fn evaluate_expression(expr: &str, ctx: &EvalContext<'_>) -> Evaluation {
    match compile_and_eval(expr, ctx) {
        Ok(value) => Evaluation {
            passed: truthy(&value),
            value: Some(value),
            error: None,
        },
        Err(error) => {
            tracing::trace!(expr, %error, "expression evaluation failed");
            Evaluation {
                passed: false,
                value: None,
                error: Some(error.to_string()),
            }
        }
    }
}

/// Evaluate a list of prerequisite expressions independently.
pub fn evaluate_prereqs(prereqs: &[Prereq], ctx: &EvalContext<'_>) -> PrereqReport {
    let mut results = Vec::with_capacity(prereqs.len());
    let mut all_passed = true;

    for prereq in prereqs {
        let evaluation = evaluate_expression(&prereq.expr, ctx);
        if !evaluation.passed {
            all_passed = false;
        }
        results.push(PrereqResult {
            expr: prereq.expr.clone(),
            passed: evaluation.passed,
            error: evaluation.error,
        });
    }

    PrereqReport {
        all_passed,
        results,
    }
}

/// JavaScript-style truthiness over JSON values: `false`, `0`, `""`, and
/// `null` are falsy; arrays and objects (even empty) are truthy.
#[allow(clippy::float_cmp)] // exact zero check is the defined semantics
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|x| x != 0.0 && !x.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Numeric-aware deep equality: two numbers compare by value regardless of
/// integer/float representation; everything else compares structurally.
#[allow(clippy::float_cmp)] // exact equality is the defined semantics
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn compile_and_eval(expr: &str, ctx: &EvalContext<'_>) -> Result<Value, ExprError> {
    let tokens = tokenize(expr)?;
    let ast = parse(&tokens)?;
    eval_expr(&ast, ctx)
}

fn eval_expr(expr: &Expr, ctx: &EvalContext<'_>) -> Result<Value, ExprError> {
    match expr {
        Expr::Exists { path } => {
            let resolved = resolve_path(ctx, path)?;
            Ok(Value::Bool(!matches!(
                resolved,
                None | Some(Value::Null)
            )))
        }
        Expr::Includes { haystack, needle } => {
            let haystack = eval_arith_lenient(haystack, ctx)?;
            let needle = eval_arith(needle, ctx)?;
            Ok(Value::Bool(includes(haystack.as_ref(), &needle)))
        }
        Expr::Compare { lhs, cmp, rhs } => {
            let lhs = eval_arith(lhs, ctx)?;
            let rhs = eval_arith(rhs, ctx)?;
            Ok(Value::Bool(compare(&lhs, *cmp, &rhs)?))
        }
        // A bare chain: a single unresolvable path reads as undefined
        // (falsy), matching Boolean(value) semantics.
        Expr::Truthy { value } => {
            Ok(eval_arith_lenient(value, ctx)?.unwrap_or(Value::Null))
        }
    }
}

fn compare(lhs: &Value, cmp: Cmp, rhs: &Value) -> Result<bool, ExprError> {
    match cmp {
        Cmp::Eq => Ok(values_equal(lhs, rhs)),
        Cmp::Ne => Ok(!values_equal(lhs, rhs)),
        Cmp::Gt | Cmp::Ge | Cmp::Lt | Cmp::Le => {
            let l = as_number(lhs)?;
            let r = as_number(rhs)?;
            Ok(match cmp {
                Cmp::Gt => l > r,
                Cmp::Ge => l >= r,
                Cmp::Lt => l < r,
                Cmp::Le => l <= r,
                Cmp::Eq | Cmp::Ne => false,
            })
        }
    }
}

/// Membership per the expression language: arrays match by exact element
/// equality, strings by substring over the string-coerced needle, and any
/// other haystack (including an unresolved path) yields `false`.
fn includes(haystack: Option<&Value>, needle: &Value) -> bool {
    match haystack {
        Some(Value::Array(items)) => items.iter().any(|item| values_equal(item, needle)),
        Some(Value::String(s)) => s.contains(&coerce_string(needle)),
        _ => false,
    }
}

fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.as_f64().map_or_else(|| n.to_string(), |x| x.to_string()),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Evaluate an arithmetic chain strictly: every operand must resolve, and
/// chains with operators must be numeric throughout.
fn eval_arith(arith: &Arith, ctx: &EvalContext<'_>) -> Result<Value, ExprError> {
    if let Some(operand) = arith.single() {
        return eval_operand(operand, ctx);
    }

    let mut acc = as_number(&eval_operand(&arith.first, ctx)?)?;
    for (op, operand) in &arith.rest {
        let rhs = as_number(&eval_operand(operand, ctx)?)?;
        acc = apply_arith(acc, *op, rhs);
    }

    serde_json::Number::from_f64(acc)
        .map(Value::Number)
        .ok_or(ExprError::NonFinite)
}

// Float arithmetic here cannot overflow; non-finite results are caught by
// the caller's `Number::from_f64` check.
#[allow(clippy::float_cmp, clippy::arithmetic_side_effects)]
const fn apply_arith(lhs: f64, op: ArithOp, rhs: f64) -> f64 {
    match op {
        ArithOp::Add => lhs + rhs,
        ArithOp::Sub => lhs - rhs,
        ArithOp::Mul => lhs * rhs,
        // Safe arithmetic: division by zero yields 0 so one malformed
        // operator definition cannot crash a batch prerequisite check.
        ArithOp::Div => {
            if rhs == 0.0 {
                0.0
            } else {
                lhs / rhs
            }
        }
    }
}

/// Like [`eval_arith`], but a single bare path that fails to resolve reads
/// as undefined (`Ok(None)`) instead of an error.
fn eval_arith_lenient(
    arith: &Arith,
    ctx: &EvalContext<'_>,
) -> Result<Option<Value>, ExprError> {
    match arith.single() {
        Some(Operand::Path(path)) => resolve_path(ctx, path),
        Some(_) | None => eval_arith(arith, ctx).map(Some),
    }
}

fn eval_operand(operand: &Operand, ctx: &EvalContext<'_>) -> Result<Value, ExprError> {
    match operand {
        Operand::Number(n) => serde_json::Number::from_f64(*n)
            .map(Value::Number)
            .ok_or(ExprError::NonFinite),
        Operand::Str(s) => Ok(Value::String(s.clone())),
        Operand::Bool(b) => Ok(Value::Bool(*b)),
        Operand::Path(path) => resolve_path(ctx, path)?
            .ok_or_else(|| ExprError::UnresolvablePath(path.clone())),
        Operand::Group(inner) => eval_arith(inner, ctx),
    }
}

fn as_number(value: &Value) -> Result<f64, ExprError> {
    value
        .as_f64()
        .ok_or_else(|| ExprError::ExpectedNumber(type_name(value).to_owned()))
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn actor() -> Value {
        json!({
            "id": "char_varo",
            "stats": { "wealth": 800.0, "dignitas": 35.0 },
            "status": { "alive": true, "wanted": false, "location_id": "loc_forum" },
            "bdi": { "beliefs": ["grain_is_short"] }
        })
    }

    fn target() -> Value {
        json!({
            "id": "char_milo",
            "stats": { "wealth": 60.0 },
            "status": { "alive": true, "location_id": "loc_subura" }
        })
    }

    fn assets() -> Value {
        json!({
            "offices": [
                { "id": "office_praetor", "name": "Praetor", "owner": "char_varo",
                  "powers": ["SUBPOENA"] }
            ]
        })
    }

    #[test]
    fn comparison_with_scaled_target_wealth() {
        let actor = actor();
        let target = target();
        let ctx = EvalContext::new().with_actor(&actor).with_target(&target);

        let result = evaluate_expression("actor.stats.wealth > target.stats.wealth * 10", &ctx);
        assert!(result.passed);

        let result = evaluate_expression("actor.stats.wealth > target.stats.wealth * 100", &ctx);
        assert!(!result.passed);
        assert!(result.error.is_none());
    }

    #[test]
    fn membership_over_derived_offices() {
        let actor = actor();
        let assets = assets();
        let ctx = EvalContext::new().with_actor(&actor).with_assets(&assets);

        assert!(evaluate_expression("actor.offices includes 'powers.SUBPOENA'", &ctx).passed);
        assert!(!evaluate_expression("actor.offices includes 'powers.EDICT'", &ctx).passed);
    }

    #[test]
    fn membership_over_string_is_substring() {
        let world = json!({ "time": { "season": "late_summer" } });
        let ctx = EvalContext::new().with_world(&world);
        assert!(evaluate_expression("world.time.season includes 'summer'", &ctx).passed);
    }

    #[test]
    fn membership_on_wrong_type_is_false_not_error() {
        let actor = actor();
        let ctx = EvalContext::new().with_actor(&actor);
        let result = evaluate_expression("actor.stats.wealth includes 'x'", &ctx);
        assert!(!result.passed);
        assert!(result.error.is_none());
    }

    #[test]
    fn exists_distinguishes_null_and_missing() {
        let relationship = json!({ "weights": { "trust": 40.0, "fear": null } });
        let ctx = EvalContext::new().with_relationship(&relationship);

        assert!(evaluate_expression("relationship.weights.trust exists", &ctx).passed);
        assert!(!evaluate_expression("relationship.weights.fear exists", &ctx).passed);
        assert!(!evaluate_expression("relationship.weights.loyalty exists", &ctx).passed);
    }

    #[test]
    fn division_by_zero_is_zero() {
        let ctx = EvalContext::new();
        let result = evaluate_expression("10 / 0 == 0", &ctx);
        assert!(result.passed);
    }

    #[test]
    fn bare_value_is_truthy_check() {
        let actor = actor();
        let ctx = EvalContext::new().with_actor(&actor);

        assert!(evaluate_expression("actor.status.alive", &ctx).passed);
        assert!(!evaluate_expression("actor.status.wanted", &ctx).passed);
        // Unresolvable bare path reads as undefined, which is falsy.
        let result = evaluate_expression("actor.stats.piety", &ctx);
        assert!(!result.passed);
        assert!(result.error.is_none());
    }

    #[test]
    fn unresolvable_path_in_arithmetic_is_error() {
        let actor = actor();
        let ctx = EvalContext::new().with_actor(&actor);
        let result = evaluate_expression("actor.stats.piety + 10 > 5", &ctx);
        assert!(!result.passed);
        assert_eq!(
            result.error.as_deref(),
            Some("could not resolve path: actor.stats.piety"),
        );
    }

    #[test]
    fn missing_context_is_reported() {
        let ctx = EvalContext::new();
        let result = evaluate_expression("target.stats.wealth > 10", &ctx);
        assert_eq!(
            result.error.as_deref(),
            Some("context not available: target"),
        );
    }

    #[test]
    fn equality_is_numeric_aware() {
        let world = json!({ "global": { "unrest": 40 } });
        let ctx = EvalContext::new().with_world(&world);
        assert!(evaluate_expression("world.global.unrest == 40.0", &ctx).passed);
        assert!(evaluate_expression("world.global.unrest != 41", &ctx).passed);
    }

    #[test]
    fn ordered_comparison_on_string_is_error() {
        let actor = actor();
        let ctx = EvalContext::new().with_actor(&actor);
        let result = evaluate_expression("actor.status.location_id > 5", &ctx);
        assert!(!result.passed);
        assert_eq!(result.error.as_deref(), Some("expected number, got string"));
    }

    #[test]
    fn flat_fold_has_no_precedence() {
        let ctx = EvalContext::new();
        // 1 + 2 * 3 folds as (1 + 2) * 3 = 9, not 7.
        assert!(evaluate_expression("1 + 2 * 3 == 9", &ctx).passed);
    }

    #[test]
    fn parenthesized_groups_evaluate_first() {
        let ctx = EvalContext::new();
        assert!(evaluate_expression("(2 + 3) * (1 + 1) == 10", &ctx).passed);
    }

    #[test]
    fn batch_report_isolates_failures() {
        let actor = actor();
        let target = target();
        let ctx = EvalContext::new().with_actor(&actor).with_target(&target);

        let prereqs = vec![
            Prereq::new("actor.stats.wealth > 100"),
            Prereq::new("actor.stats.wealth >>> 5"),
            Prereq::new("target.stats.wealth < 100"),
        ];
        let report = evaluate_prereqs(&prereqs, &ctx);

        assert!(!report.all_passed);
        assert_eq!(report.results.len(), 3);
        assert!(report.results.first().unwrap().passed);
        assert!(report.results.get(1).unwrap().error.is_some());
        // The malformed middle expression did not stop the third.
        assert!(report.results.get(2).unwrap().passed);
    }

    #[test]
    fn batch_all_passed_requires_every_expression() {
        let actor = actor();
        let ctx = EvalContext::new().with_actor(&actor);
        let report = evaluate_prereqs(
            &[Prereq::new("actor.stats.wealth > 100"), Prereq::new("actor.status.wanted")],
            &ctx,
        );
        assert!(!report.all_passed);

        let report = evaluate_prereqs(
            &[Prereq::new("actor.stats.wealth > 100"), Prereq::new("actor.status.alive")],
            &ctx,
        );
        assert!(report.all_passed);
    }
}
