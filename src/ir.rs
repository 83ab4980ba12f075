// Strongly-typed IR for codegen. No serde_json::Value here.

use crate::keyword::SchemaId;

#[derive(Debug, Clone, PartialEq)]
pub enum Ty {
    Any,                     // untyped: no type keyword, no type-specific keywords
    Null,                    // exactly null
    Bool,
    Integer { min: Option<i64>, max: Option<i64> },   // inclusive after exclusivity is applied
    Number  {
        min: Option<f64>,
        max: Option<f64>,
        exclusive_min: bool,
        exclusive_max: bool,
    },
    String  { enum_: Vec<String>, pattern: Option<String>, format: Option<String> },
    ArrayList {
        item: Box<Ty>,
        min_items: Option<u64>,
        max_items: Option<u64>,
        unique: bool,
    },
    ArrayTuple {
        elems: Vec<Ty>,      // positional schemas
        rest: Option<Box<Ty>>, // additionalItems schema; None when closed or unconstrained
        closed: bool,        // additionalItems: false
    },
    Object {
        fields: Vec<Field>,  // document order, stable for deterministic codegen
        additional: Option<Box<Ty>>,
        closed: bool,        // additionalProperties: false
    },
    OneOf(Vec<Ty>),          // keep small, or rewrite to Nullable where possible
    Nullable(Box<Ty>),       // null wrapper
    Ref(SchemaId),           // named link; codegen emits the target's type name
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: Ty,
    pub required: bool,      // listed in `required`
}
