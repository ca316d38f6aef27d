//! Integration test for a custom `JsonWriter` implementation
//!
//! The `JsonWriter` implementation here builds a serde_json `Value`. This ensures that
//! the `JsonWriter` trait can be implemented by users, and that schemas can be written
//! to writers other than the ones provided by this crate.
//!
//! **Important:** This code is only for integration test and demonstration purposes;
//! it is not intended to be used in production code.

use std::error::Error;

use custom_writer::JsonValueWriter;
use jsonbind::{writer::JsonWriter, JsonSchema};
use serde_json::json;

use crate::test_lib::*;

mod test_lib;

mod custom_writer {
    use jsonbind::writer::{JsonWriter, WriterError, WriterState};
    use serde_json::{Map, Number, Value};

    enum StackValue {
        Array(Vec<Value>),
        Object(Map<String, Value>),
    }

    pub struct JsonValueWriter {
        stack: Vec<StackValue>,
        pending_name: Option<String>,
        /// Holds the final value until `into_value` is called
        final_value: Option<Value>,
        lenient: bool,
    }

    impl JsonValueWriter {
        pub fn new() -> Self {
            JsonValueWriter {
                stack: Vec::new(),
                pending_name: None,
                final_value: None,
                lenient: false,
            }
        }

        pub fn into_value(self) -> Option<Value> {
            self.final_value
        }

        fn state(&self) -> WriterState {
            match self.stack.last() {
                None if self.final_value.is_some() => WriterState::DocumentComplete,
                None => WriterState::EmptyDocument,
                Some(StackValue::Array(_)) => WriterState::InArray,
                Some(StackValue::Object(_)) if self.pending_name.is_some() => {
                    WriterState::ExpectingMemberValue
                }
                Some(StackValue::Object(_)) => WriterState::ExpectingName,
            }
        }

        fn structural_error(&self, operation: &'static str) -> WriterError {
            WriterError::StructuralError {
                operation,
                state: self.state(),
            }
        }

        fn add_value(&mut self, operation: &'static str, value: Value) -> Result<(), WriterError> {
            match self.stack.last_mut() {
                Some(StackValue::Array(array)) => array.push(value),
                Some(StackValue::Object(object)) => match self.pending_name.take() {
                    Some(name) => {
                        object.insert(name, value);
                    }
                    None => return Err(self.structural_error(operation)),
                },
                None if self.final_value.is_none() => self.final_value = Some(value),
                None => return Err(self.structural_error(operation)),
            }
            Ok(())
        }

        fn check_before_container(&self, operation: &'static str) -> Result<(), WriterError> {
            match self.state() {
                WriterState::EmptyDocument
                | WriterState::InArray
                | WriterState::ExpectingMemberValue => Ok(()),
                _ => Err(self.structural_error(operation)),
            }
        }
    }

    impl JsonWriter for JsonValueWriter {
        fn begin_object(&mut self) -> Result<(), WriterError> {
            self.check_before_container("begin object")?;
            self.stack.push(StackValue::Object(Map::new()));
            Ok(())
        }

        fn end_object(&mut self) -> Result<(), WriterError> {
            if self.state() != WriterState::ExpectingName {
                return Err(self.structural_error("end object"));
            }
            match self.stack.pop() {
                Some(StackValue::Object(object)) => self.add_value("end object", Value::Object(object)),
                _ => Err(self.structural_error("end object")),
            }
        }

        fn begin_array(&mut self) -> Result<(), WriterError> {
            self.check_before_container("begin array")?;
            self.stack.push(StackValue::Array(Vec::new()));
            Ok(())
        }

        fn end_array(&mut self) -> Result<(), WriterError> {
            if self.state() != WriterState::InArray {
                return Err(self.structural_error("end array"));
            }
            match self.stack.pop() {
                Some(StackValue::Array(array)) => self.add_value("end array", Value::Array(array)),
                _ => Err(self.structural_error("end array")),
            }
        }

        fn name(&mut self, name: &str) -> Result<(), WriterError> {
            if self.state() != WriterState::ExpectingName {
                return Err(self.structural_error("write member name"));
            }
            self.pending_name = Some(name.to_owned());
            Ok(())
        }

        fn string_value(&mut self, value: &str) -> Result<(), WriterError> {
            self.add_value("write string", Value::String(value.to_owned()))
        }

        fn bool_value(&mut self, value: bool) -> Result<(), WriterError> {
            self.add_value("write boolean", Value::Bool(value))
        }

        fn long_value(&mut self, value: i64) -> Result<(), WriterError> {
            self.add_value("write number", Value::Number(value.into()))
        }

        fn double_value(&mut self, value: f64) -> Result<(), WriterError> {
            // serde_json cannot represent non-finite numbers, regardless of leniency
            let number = Number::from_f64(value).ok_or(WriterError::NonFiniteNumber(value))?;
            self.add_value("write number", Value::Number(number))
        }

        fn null_value(&mut self) -> Result<(), WriterError> {
            self.add_value("write null", Value::Null)
        }

        fn json_value(&mut self, value: &str) -> Result<(), WriterError> {
            let number = value
                .parse::<Number>()
                .map_err(|_| WriterError::InvalidNumber(value.to_owned()))?;
            self.add_value("write number", Value::Number(number))
        }

        fn flush(&mut self) -> Result<(), WriterError> {
            Ok(())
        }

        fn close(&mut self) -> Result<(), WriterError> {
            match self.state() {
                WriterState::DocumentComplete => Ok(()),
                WriterState::EmptyDocument => Err(self.structural_error("close")),
                _ => Err(WriterError::StructuralError {
                    operation: "close",
                    state: WriterState::Incomplete,
                }),
            }
        }

        fn is_lenient(&self) -> bool {
            self.lenient
        }

        fn set_lenient(&mut self, lenient: bool) {
            self.lenient = lenient;
        }
    }
}

#[test]
fn write_schema() -> Result<(), Box<dyn Error>> {
    let mut json_writer = JsonValueWriter::new();
    let value = SignedDocument {
        document: Document {
            entity: Entity {
                id: 4,
                version: None,
            },
            title: "report".to_owned(),
        },
        signature: Some("sig".to_owned()),
    };
    value.write_json(&mut json_writer)?;
    json_writer.close()?;

    assert_eq!(
        Some(json!({
            "id": 4,
            "version": null,
            "title": "report",
            "signature": "sig",
        })),
        json_writer.into_value()
    );
    Ok(())
}

#[test]
fn write_schema_through_support() -> Result<(), Box<dyn Error>> {
    let mut json_writer = JsonValueWriter::new();
    let accounts = vec![UserAccount::new("a", 1), UserAccount::new("b", 2)];
    UserAccount::support()?.write_collection(&mut json_writer, &accounts)?;

    assert_eq!(
        Some(json!([
            {"id": 1, "userId": "a"},
            {"id": 2, "userId": "b"},
        ])),
        json_writer.into_value()
    );
    Ok(())
}

#[test]
fn incorrect_usage() {
    let mut json_writer = JsonValueWriter::new();
    assert!(json_writer.close().is_err());
    assert!(json_writer.name("a").is_err());
    assert!(json_writer.begin_object().is_ok());
    assert!(json_writer.long_value(1).is_err());
    assert!(json_writer.end_array().is_err());
}
