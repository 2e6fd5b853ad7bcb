//! Predicate compilation and evaluation.
//!
//! A predicate compares one snapshot value against a literal or a second
//! snapshot value. Missing keys and non-finite values evaluate to false,
//! so NaN warmup output can never gate a trade open or closed.

use crate::config::{ConfigError, Operator, PredicateConfig};
use crate::metrics::Snapshot;

/// Right-hand side of a compiled predicate.
#[derive(Debug, Clone)]
enum Operand {
    Literal(f64),
    Key(String),
}

/// A predicate with its operands resolved at construction.
#[derive(Debug, Clone)]
pub struct CompiledPredicate {
    key: String,
    operator: Operator,
    use_abs: bool,
    rhs: Operand,
}

impl CompiledPredicate {
    pub fn compile(config: &PredicateConfig) -> Result<Self, ConfigError> {
        let fail = |message: &str| {
            Err(ConfigError::InvalidPredicate {
                metric: config.metric.clone(),
                message: message.to_string(),
            })
        };
        if config.metric.is_empty() {
            return fail("metric key must be non-empty");
        }
        let rhs = match (&config.value, &config.other_metric) {
            (Some(value), None) => {
                if !value.is_finite() {
                    return fail("literal value must be finite");
                }
                Operand::Literal(*value)
            }
            (None, Some(other)) => {
                if other.is_empty() {
                    return fail("other_metric key must be non-empty");
                }
                Operand::Key(other.clone())
            }
            (Some(_), Some(_)) => return fail("cannot define both value and other_metric"),
            (None, None) => return fail("must define either value or other_metric"),
        };
        Ok(Self {
            key: config.metric.clone(),
            operator: config.operator,
            use_abs: config.use_abs,
            rhs,
        })
    }

    pub fn eval(&self, snapshot: &Snapshot) -> bool {
        let mut lhs = snapshot.num(&self.key);
        if !lhs.is_finite() {
            return false;
        }
        if self.use_abs {
            lhs = lhs.abs();
        }
        let rhs = match &self.rhs {
            Operand::Literal(value) => *value,
            Operand::Key(key) => snapshot.num(key),
        };
        if !rhs.is_finite() {
            return false;
        }
        self.operator.apply(lhs, rhs)
    }
}

/// AND over a predicate list; the empty list is vacuously true.
pub fn eval_all(predicates: &[CompiledPredicate], snapshot: &Snapshot) -> bool {
    predicates.iter().all(|predicate| predicate.eval(snapshot))
}

/// Compile a whole predicate list, failing on the first invalid entry.
pub fn compile_all(configs: &[PredicateConfig]) -> Result<Vec<CompiledPredicate>, ConfigError> {
    configs.iter().map(CompiledPredicate::compile).collect()
}
