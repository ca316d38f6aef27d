//! Common library module for integration tests
// See https://doc.rust-lang.org/book/ch11-03-test-organization.html#submodules-in-integration-tests
// Not every test crate uses every item
#![allow(dead_code)]

use std::collections::LinkedList;

use jsonbind::{
    json_schema,
    reader::{JsonReader, ReaderError, Token},
    writer::{JsonWriter, WriterError},
};

json_schema! {
    /// Primitive fields and their nullable counterparts
    #[derive(PartialEq, Clone, Debug)]
    pub struct BaseTypes {
        pub i1: i32,
        pub i2: Option<i32>,
        pub i3: Option<i32> = Some(-1),
        pub i4: Option<i32> = Some(-1),
        pub l1: i64,
        pub l2: Option<i64>,
        pub l3: Option<i64> = Some(-1),
        pub l4: Option<i64> = Some(-9223372036854775802),
        pub byte1: i8,
        pub byte2: Option<i8>,
        pub byte3: Option<i8> = Some(-1),
        pub byte4: Option<i8> = Some(-3),
        pub b1: bool,
        pub b2: Option<bool>,
        pub b3: Option<bool> = Some(true),
        pub b4: Option<bool> = Some(true),
    }
}

json_schema! {
    #[derive(PartialEq, Clone, Debug)]
    pub struct InnerRef {
        pub base_types: Option<BaseTypes> as "baseTypes",
    }
}

json_schema! {
    #[derive(PartialEq, Clone, Debug)]
    pub struct ReferencedTypes {
        pub base_types: Option<BaseTypes> as "baseTypes",
        pub inner_ref: Option<InnerRef> as "innerRef",
        pub name: Option<String>,
    }
}

json_schema! {
    #[derive(PartialEq, Clone, Debug)]
    pub struct UserData {
        pub user_name: String as "userName",
        pub password_hash: String as "password-hash",
        pub kind: i32 as "type",
        pub active: bool,
    }
}

json_schema! {
    #[derive(PartialEq, Clone, Debug)]
    pub struct UserAccount {
        pub id: i64,
        pub user_id: String as "userId",
    }
}

impl UserAccount {
    pub fn new(user_id: &str, id: i64) -> Self {
        UserAccount {
            id,
            user_id: user_id.to_owned(),
        }
    }
}

json_schema! {
    #[derive(PartialEq, Clone, Debug)]
    pub struct MultiObject {
        pub user_accounts_list: LinkedList<UserAccount> as "userAccountsList",
        pub tags: Vec<Option<String>>,
    }
}

json_schema! {
    #[derive(PartialEq, Clone, Debug)]
    pub struct ReadWriteTestModel {
        pub int_field1: i32 as "intField1" = -1,
        pub int_field2: i32 as "intField2" = -1,
        pub string_field: Option<String> as "stringField" = Some("a".to_owned()),
        pub boolean_field: bool as "booleanField",
        pub long_field: i64 as "longField",
        pub short_field: i16 as "shortField",
        pub unsigned_field: u16 as "unsignedField",
        pub double_field: f64 as "doubleField",
        pub byte_field: i8 as "byteField",
        pub unsigned_byte_field: u8 as "unsignedByteField",
        pub float_field: f32 as "floatField",
        pub nullable_byte: Option<i8> as "nullableByte" = Some(-1),
        pub nullable_float: Option<f32> as "nullableFloat",
        pub base_types: Option<BaseTypes> as "baseTypes",
    }
}

json_schema! {
    #[derive(PartialEq, Clone, Debug)]
    pub struct Entity {
        pub id: i64,
        pub version: Option<u8>,
    }
}

json_schema! {
    #[derive(PartialEq, Clone, Debug)]
    pub struct Document extends entity: Entity {
        pub title: String,
    }
}

json_schema! {
    #[derive(PartialEq, Clone, Debug)]
    pub struct SignedDocument extends document: Document {
        pub signature: Option<String>,
    }
}

json_schema! {
    /// Recursive schema
    #[derive(PartialEq, Clone, Debug)]
    pub struct TreeNode {
        pub value: i32,
        pub children: Vec<TreeNode>,
        pub parent_value: Option<Box<TreeNode>> as "parent",
    }
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum JsonEvent {
    ArrayStart,
    ArrayEnd,
    ObjectStart,
    ObjectEnd,
    MemberName(String),

    StringValue(String),
    // Contains string representation of number value
    NumberValue(String),
    BoolValue(bool),
    NullValue,
}

/// Reads the next top-level value and returns the events for it
pub fn read_events<R: JsonReader + ?Sized>(
    json_reader: &mut R,
) -> Result<Vec<JsonEvent>, ReaderError> {
    let mut events = Vec::new();
    let mut depth = 0_u32;
    loop {
        match json_reader.peek()? {
            Token::BeginArray => {
                json_reader.begin_array()?;
                depth += 1;
                events.push(JsonEvent::ArrayStart);
            }
            Token::EndArray => {
                json_reader.end_array()?;
                depth -= 1;
                events.push(JsonEvent::ArrayEnd);
            }
            Token::BeginObject => {
                json_reader.begin_object()?;
                depth += 1;
                events.push(JsonEvent::ObjectStart);
            }
            Token::EndObject => {
                json_reader.end_object()?;
                depth -= 1;
                events.push(JsonEvent::ObjectEnd);
            }
            Token::Name => {
                events.push(JsonEvent::MemberName(json_reader.next_name_owned()?));
                continue;
            }
            Token::String => events.push(JsonEvent::StringValue(json_reader.next_string()?)),
            Token::Number => events.push(JsonEvent::NumberValue(
                json_reader.next_number_as_str()?.to_owned(),
            )),
            Token::Boolean => events.push(JsonEvent::BoolValue(json_reader.next_bool()?)),
            Token::Null => {
                json_reader.next_null()?;
                events.push(JsonEvent::NullValue);
            }
            Token::EndDocument => panic!("Unexpected end of document after {events:?}"),
        }

        if depth == 0 {
            break;
        }
    }
    Ok(events)
}

/// Writes the events to the JSON writer
pub fn write_events<W: JsonWriter + ?Sized>(
    json_writer: &mut W,
    events: &[JsonEvent],
) -> Result<(), WriterError> {
    for event in events {
        match event {
            JsonEvent::ArrayStart => json_writer.begin_array()?,
            JsonEvent::ArrayEnd => json_writer.end_array()?,
            JsonEvent::ObjectStart => json_writer.begin_object()?,
            JsonEvent::ObjectEnd => json_writer.end_object()?,
            JsonEvent::MemberName(name) => json_writer.name(name)?,
            JsonEvent::StringValue(value) => json_writer.string_value(value)?,
            JsonEvent::NumberValue(value) => json_writer.json_value(value)?,
            JsonEvent::BoolValue(value) => json_writer.bool_value(*value)?,
            JsonEvent::NullValue => json_writer.null_value()?,
        }
    }
    Ok(())
}

/// Assertion slices for slices which provides more useful error messages than `assert_eq!`
pub fn assert_slice_eq<T: PartialEq + std::fmt::Debug>(left: &[T], right: &[T]) {
    let iter_len = left.len().min(right.len());

    for i in 0..iter_len {
        assert_eq!(left[i], right[i], "Elements at index {i} don't match");
    }

    // Only check length mismatch afterwards, to detect mismatching items (if any) first
    assert_eq!(left.len(), right.len(), "Slices have different lengths");
}
