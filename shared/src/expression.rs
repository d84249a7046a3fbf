//! `SET` update expressions for partial item updates.

use std::collections::{HashMap, HashSet};

use aws_sdk_dynamodb::types::AttributeValue;

use crate::codec;
use crate::models::{CREATED_AT, ID, UPDATED_AT};
use crate::value::Fields;

/// One `#name = :value` pair of the expression, by placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateInstruction {
    pub id: String,
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, AttributeValue>,
    pub assignments: Vec<Assignment>,
}

impl UpdateInstruction {
    /// Builds the update for item `id`.
    ///
    /// `updatedAt` is always assigned first, then every changed field in
    /// input order. `id`, `createdAt` and `updatedAt` in `changes` are
    /// dropped without error.
    pub fn build(id: impl Into<String>, changes: &Fields, timestamp: &str) -> Self {
        let mut builder = Builder::default();
        builder.assign(UPDATED_AT, AttributeValue::S(timestamp.to_string()));

        for (key, value) in changes.iter() {
            if is_system_field(key) {
                continue;
            }
            builder.assign(key, codec::encode(value));
        }

        let expression = format!(
            "SET {}",
            builder
                .assignments
                .iter()
                .map(|a| format!("{} = {}", a.name, a.value))
                .collect::<Vec<_>>()
                .join(", ")
        );

        Self {
            id: id.into(),
            expression,
            names: builder.names,
            values: builder.values,
            assignments: builder.assignments,
        }
    }

    /// Real field names in assignment order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.assignments
            .iter()
            .filter_map(|a| self.names.get(&a.name).map(String::as_str))
    }
}

fn is_system_field(key: &str) -> bool {
    key == ID || key == CREATED_AT || key == UPDATED_AT
}

#[derive(Default)]
struct Builder {
    used: HashSet<String>,
    names: HashMap<String, String>,
    values: HashMap<String, AttributeValue>,
    assignments: Vec<Assignment>,
}

impl Builder {
    fn assign(&mut self, field: &str, value: AttributeValue) {
        let token = self.token_for(field);
        let name = format!("#{token}");
        let placeholder = format!(":{token}");
        self.names.insert(name.clone(), field.to_string());
        self.values.insert(placeholder.clone(), value);
        self.assignments.push(Assignment {
            name,
            value: placeholder,
        });
    }

    /// Placeholder tokens may only hold `[A-Za-z0-9_]`.
    fn token_for(&mut self, field: &str) -> String {
        let base: String = field
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        let base = if base.is_empty() { "_".to_string() } else { base };

        let mut token = base.clone();
        let mut suffix = 1;
        while self.used.contains(&token) {
            token = format!("{base}_{suffix}");
            suffix += 1;
        }
        self.used.insert(token.clone());
        token
    }
}
