//! Row filters shared by every [`RecordStore`](crate::RecordStore) backend.

use serde_json::Value;

/// Comparison applied to a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Gte,
    Lt,
}

impl Op {
    /// PostgREST operator keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Eq => "eq",
            Op::Gte => "gte",
            Op::Lt => "lt",
        }
    }
}

/// One column condition.
#[derive(Debug, Clone)]
pub struct Condition {
    pub field: String,
    pub op: Op,
    pub value: Value,
}

/// Conjunction of column conditions. An empty filter matches every row.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            field: field.into(),
            op: Op::Eq,
            value: value.into(),
        });
        self
    }

    pub fn gte(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            field: field.into(),
            op: Op::Gte,
            value: value.into(),
        });
        self
    }

    pub fn lt(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            field: field.into(),
            op: Op::Lt,
            value: value.into(),
        });
        self
    }

    /// Evaluate the filter against one row. Strings compare
    /// lexicographically, which is what RFC 3339 timestamps need; numbers
    /// compare numerically.
    pub fn matches(&self, row: &Value) -> bool {
        self.conditions.iter().all(|c| {
            let field_value = match row.get(&c.field) {
                Some(v) => v,
                None => return false,
            };
            match c.op {
                Op::Eq => field_value == &c.value,
                Op::Gte => compare(field_value, &c.value).is_some_and(|o| o.is_ge()),
                Op::Lt => compare(field_value, &c.value).is_some_and(|o| o.is_lt()),
            }
        })
    }
}

fn compare(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.as_str().cmp(y.as_str())),
        (Value::Number(x), Value::Number(y)) => {
            x.as_f64().and_then(|x| y.as_f64().and_then(|y| x.partial_cmp(&y)))
        }
        _ => None,
    }
}
