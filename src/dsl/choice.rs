use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::dsl::Target;
use crate::error::{GraphError, Result};

/// Kind of operand a comparison operator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    Boolean,
    Numeric,
    String,
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonType {
    BooleanEquals,

    NumericEquals,
    NumericLessThan,
    NumericLessThanEquals,
    NumericGreaterThan,
    NumericGreaterThanEquals,

    StringEquals,
    StringLessThan,
    StringGreaterThan,
    StringLessThanEquals,
    StringGreaterThanEquals,

    TimestampEquals,
    TimestampLessThan,
    TimestampGreaterThan,
    TimestampLessThanEquals,
    TimestampGreaterThanEquals,
}

impl ComparisonType {
    pub const ALL: [ComparisonType; 16] = [
        ComparisonType::BooleanEquals,
        ComparisonType::NumericEquals,
        ComparisonType::NumericLessThan,
        ComparisonType::NumericLessThanEquals,
        ComparisonType::NumericGreaterThan,
        ComparisonType::NumericGreaterThanEquals,
        ComparisonType::StringEquals,
        ComparisonType::StringLessThan,
        ComparisonType::StringGreaterThan,
        ComparisonType::StringLessThanEquals,
        ComparisonType::StringGreaterThanEquals,
        ComparisonType::TimestampEquals,
        ComparisonType::TimestampLessThan,
        ComparisonType::TimestampGreaterThan,
        ComparisonType::TimestampLessThanEquals,
        ComparisonType::TimestampGreaterThanEquals,
    ];

    /// Operator name as it appears in the document, e.g. `NumericLessThan`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonType::BooleanEquals => "BooleanEquals",
            ComparisonType::NumericEquals => "NumericEquals",
            ComparisonType::NumericLessThan => "NumericLessThan",
            ComparisonType::NumericLessThanEquals => "NumericLessThanEquals",
            ComparisonType::NumericGreaterThan => "NumericGreaterThan",
            ComparisonType::NumericGreaterThanEquals => "NumericGreaterThanEquals",
            ComparisonType::StringEquals => "StringEquals",
            ComparisonType::StringLessThan => "StringLessThan",
            ComparisonType::StringGreaterThan => "StringGreaterThan",
            ComparisonType::StringLessThanEquals => "StringLessThanEquals",
            ComparisonType::StringGreaterThanEquals => "StringGreaterThanEquals",
            ComparisonType::TimestampEquals => "TimestampEquals",
            ComparisonType::TimestampLessThan => "TimestampLessThan",
            ComparisonType::TimestampGreaterThan => "TimestampGreaterThan",
            ComparisonType::TimestampLessThanEquals => "TimestampLessThanEquals",
            ComparisonType::TimestampGreaterThanEquals => "TimestampGreaterThanEquals",
        }
    }

    pub fn operand_kind(&self) -> OperandKind {
        match self {
            ComparisonType::BooleanEquals => OperandKind::Boolean,
            ComparisonType::NumericEquals
            | ComparisonType::NumericLessThan
            | ComparisonType::NumericLessThanEquals
            | ComparisonType::NumericGreaterThan
            | ComparisonType::NumericGreaterThanEquals => OperandKind::Numeric,
            ComparisonType::StringEquals
            | ComparisonType::StringLessThan
            | ComparisonType::StringGreaterThan
            | ComparisonType::StringLessThanEquals
            | ComparisonType::StringGreaterThanEquals => OperandKind::String,
            ComparisonType::TimestampEquals
            | ComparisonType::TimestampLessThan
            | ComparisonType::TimestampGreaterThan
            | ComparisonType::TimestampLessThanEquals
            | ComparisonType::TimestampGreaterThanEquals => OperandKind::Timestamp,
        }
    }
}

impl FromStr for ComparisonType {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        ComparisonType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| GraphError::InvalidArgument(format!("unknown comparison operator '{}'", s)))
    }
}

impl fmt::Display for ComparisonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operator together with the operand the runtime value is compared against.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    comparison_type: ComparisonType,
    value: Value,
}

impl Comparison {
    /// Fails when the operand does not fit the operator, e.g. a string for `NumericEquals`.
    pub fn new(comparison_type: ComparisonType, value: impl Into<Value>) -> Result<Self> {
        let value = value.into();
        let fits = match comparison_type.operand_kind() {
            OperandKind::Boolean => value.is_boolean(),
            OperandKind::Numeric => value.is_number(),
            OperandKind::String | OperandKind::Timestamp => value.is_string(),
        };
        if !fits {
            return Err(GraphError::InvalidArgument(format!(
                "{} cannot compare against {}",
                comparison_type, value
            )));
        }
        Ok(Self {
            comparison_type,
            value,
        })
    }

    pub fn boolean_equals(value: bool) -> Self {
        Self {
            comparison_type: ComparisonType::BooleanEquals,
            value: Value::Bool(value),
        }
    }

    pub fn string_equals(value: impl Into<String>) -> Self {
        Self {
            comparison_type: ComparisonType::StringEquals,
            value: Value::String(value.into()),
        }
    }

    pub fn numeric_equals(value: impl Into<serde_json::Number>) -> Self {
        Self {
            comparison_type: ComparisonType::NumericEquals,
            value: Value::Number(value.into()),
        }
    }

    pub fn comparison_type(&self) -> ComparisonType {
        self.comparison_type
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// 选择规则：单个比较，或者 And / Or / Not 组合
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        variable: String,
        comparison: Comparison,
    },
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    pub fn compare(variable: impl Into<String>, comparison: Comparison) -> Self {
        Condition::Compare {
            variable: variable.into(),
            comparison,
        }
    }

    pub fn and(conditions: Vec<Condition>) -> Result<Self> {
        if conditions.is_empty() {
            return Err(GraphError::InvalidArgument("And needs at least one operand".into()));
        }
        Ok(Condition::And(conditions))
    }

    pub fn or(conditions: Vec<Condition>) -> Result<Self> {
        if conditions.is_empty() {
            return Err(GraphError::InvalidArgument("Or needs at least one operand".into()));
        }
        Ok(Condition::Or(conditions))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(condition: Condition) -> Self {
        Condition::Not(Box::new(condition))
    }
}

/// One branch of a Choice state. Cases are evaluated in order, first match wins.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceCase {
    condition: Condition,
    next: Target,
}

impl ChoiceCase {
    pub fn new(variable: impl Into<String>, comparison: Comparison, next: impl Into<Target>) -> Self {
        Self::when(Condition::compare(variable, comparison), next)
    }

    pub fn when(condition: Condition, next: impl Into<Target>) -> Self {
        Self {
            condition,
            next: next.into(),
        }
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    pub fn next(&self) -> &str {
        self.next.name()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    choices: Vec<ChoiceCase>,
    default: Target,
}

impl Choice {
    pub fn new(choices: Vec<ChoiceCase>, default: impl Into<Target>) -> Result<Self> {
        if choices.is_empty() {
            return Err(GraphError::InvalidArgument(
                "a choice state needs at least one case".into(),
            ));
        }
        Ok(Self {
            choices,
            default: default.into(),
        })
    }

    pub fn choices(&self) -> &[ChoiceCase] {
        &self.choices
    }

    pub fn default_state(&self) -> &str {
        self.default.name()
    }
}
