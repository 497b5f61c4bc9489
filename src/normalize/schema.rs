use crate::models::ResearchResponse;
use serde_json::{json, Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    TextList,
}

impl FieldType {
    fn name(self) -> &'static str {
        match self {
            FieldType::Text => "string",
            FieldType::TextList => "array of strings",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldType,
    pub required: bool,
    pub description: &'static str,
}

/// Field table for [`ResearchResponse`]. Both HTTP and CLI answers are
/// checked against this one schema.
pub const RESEARCH_SCHEMA: &[FieldSpec] = &[
    FieldSpec {
        name: "topic",
        kind: FieldType::Text,
        required: true,
        description: "The topic of the research",
    },
    FieldSpec {
        name: "summary",
        kind: FieldType::Text,
        required: false,
        description: "A concise summary of the research",
    },
    FieldSpec {
        name: "sources",
        kind: FieldType::TextList,
        required: false,
        description: "List of sources used",
    },
    FieldSpec {
        name: "tools_used",
        kind: FieldType::TextList,
        required: true,
        description: "List of tools used during research",
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    Missing,
    WrongType { expected: FieldType, found: &'static str },
    WrongElementType { index: usize, found: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub violation: Violation,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.violation {
            Violation::Missing => write!(f, "{}: field required", self.field),
            Violation::WrongType { expected, found } => {
                write!(f, "{}: expected {}, found {}", self.field, expected.name(), found)
            }
            Violation::WrongElementType { index, found } => {
                write!(f, "{}[{}]: expected string, found {}", self.field, index, found)
            }
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A value that passed its field check.
enum Checked {
    Absent,
    Text(String),
    TextList(Vec<String>),
}

fn check_field(spec: &FieldSpec, value: Option<&Value>) -> Result<Checked, FieldViolation> {
    let violation = |violation| FieldViolation {
        field: spec.name,
        violation,
    };

    let value = match value {
        None | Some(Value::Null) if spec.required => return Err(violation(Violation::Missing)),
        None | Some(Value::Null) => return Ok(Checked::Absent),
        Some(value) => value,
    };

    match (spec.kind, value) {
        (FieldType::Text, Value::String(s)) => Ok(Checked::Text(s.clone())),
        (FieldType::TextList, Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(violation(Violation::WrongElementType {
                    index,
                    found: json_type_name(other),
                })),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Checked::TextList),
        (expected, other) => Err(violation(Violation::WrongType {
            expected,
            found: json_type_name(other),
        })),
    }
}

/// Checks a parsed object against [`RESEARCH_SCHEMA`] and builds the record.
///
/// Every violation is collected; unknown fields are ignored.
pub fn build_response(object: &Map<String, Value>) -> Result<ResearchResponse, Vec<FieldViolation>> {
    let mut violations = Vec::new();
    let mut topic = None;
    let mut summary = None;
    let mut sources = None;
    let mut tools_used = None;

    for spec in RESEARCH_SCHEMA {
        match check_field(spec, object.get(spec.name)) {
            Ok(Checked::Absent) => {}
            Ok(Checked::Text(text)) => match spec.name {
                "topic" => topic = Some(text),
                "summary" => summary = Some(text),
                _ => {}
            },
            Ok(Checked::TextList(list)) => match spec.name {
                "sources" => sources = Some(list),
                "tools_used" => tools_used = Some(list),
                _ => {}
            },
            Err(v) => violations.push(v),
        }
    }

    match (topic, tools_used) {
        (Some(topic), Some(tools_used)) if violations.is_empty() => Ok(ResearchResponse {
            topic,
            summary,
            sources,
            tools_used,
        }),
        _ => Err(violations),
    }
}

/// JSON-Schema text embedded in the agent's system prompt.
pub fn format_instructions() -> String {
    let properties: Map<String, Value> = RESEARCH_SCHEMA
        .iter()
        .map(|spec| {
            let schema = match spec.kind {
                FieldType::Text => json!({
                    "description": spec.description,
                    "type": "string",
                }),
                FieldType::TextList => json!({
                    "description": spec.description,
                    "type": "array",
                    "items": { "type": "string" },
                }),
            };
            (spec.name.to_string(), schema)
        })
        .collect();
    let required: Vec<&str> = RESEARCH_SCHEMA
        .iter()
        .filter(|spec| spec.required)
        .map(|spec| spec.name)
        .collect();
    let schema = json!({
        "properties": properties,
        "required": required,
    });

    format!(
        "The output should be formatted as a JSON instance that conforms to the JSON schema below.\n\n\
         Here is the output schema:\n```\n{}\n```",
        schema
    )
}
