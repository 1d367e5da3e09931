//! # Form schema inference
//!
//! Builds a flat form description from a sample of documents: one field per
//! top-level key, typed by the BSON values seen under it.

use mongodb::bson::{Bson, Document};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Integer,
    Double,
    Boolean,
    ObjectId,
    DateTime,
    Document,
    Array,
    Other,
    Mixed,
}

impl FieldKind {
    /// Kind of a single value, `None` for null.
    pub fn of(value: &Bson) -> Option<Self> {
        let kind = match value {
            Bson::Null | Bson::Undefined => return None,
            Bson::String(_) | Bson::Symbol(_) => FieldKind::String,
            Bson::Int32(_) | Bson::Int64(_) => FieldKind::Integer,
            Bson::Double(_) | Bson::Decimal128(_) => FieldKind::Double,
            Bson::Boolean(_) => FieldKind::Boolean,
            Bson::ObjectId(_) => FieldKind::ObjectId,
            Bson::DateTime(_) | Bson::Timestamp(_) => FieldKind::DateTime,
            Bson::Document(_) => FieldKind::Document,
            Bson::Array(_) => FieldKind::Array,
            _ => FieldKind::Other,
        };
        Some(kind)
    }

    pub fn input_type(self) -> &'static str {
        match self {
            FieldKind::Integer | FieldKind::Double => "number",
            FieldKind::Boolean => "checkbox",
            FieldKind::DateTime => "datetime-local",
            FieldKind::ObjectId => "hidden",
            _ => "text",
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(crate = "rocket::serde")]
pub struct FormField {
    pub kind: Option<FieldKind>,
    pub input_type: &'static str,
    pub seen: usize,
    pub nullable: bool,
    pub required: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq, Default)]
#[serde(crate = "rocket::serde")]
pub struct FormSchema {
    pub sampled: usize,
    pub fields: BTreeMap<String, FormField>,
}

pub fn infer_schema<'a, I>(documents: I) -> FormSchema
where
    I: IntoIterator<Item = &'a Document>,
{
    let mut schema = FormSchema::default();

    for doc in documents {
        schema.sampled += 1;

        for (key, value) in doc {
            let field = schema.fields.entry(key.clone()).or_insert(FormField {
                kind: None,
                input_type: "text",
                seen: 0,
                nullable: false,
                required: false,
            });
            field.seen += 1;

            match (field.kind, FieldKind::of(value)) {
                (_, None) => field.nullable = true,
                (None, Some(kind)) => field.kind = Some(kind),
                (Some(current), Some(kind)) if current != kind => {
                    field.kind = Some(FieldKind::Mixed)
                }
                _ => {}
            }
        }
    }

    for field in schema.fields.values_mut() {
        field.required = field.seen == schema.sampled && !field.nullable;
        field.input_type = field.kind.map_or("text", FieldKind::input_type);
    }

    schema
}
