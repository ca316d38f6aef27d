#![warn(missing_docs)]
#![forbid(unsafe_code)]
// Allow needless `return` because that makes it sometimes more obvious that
// an expression is the result of the function
#![allow(clippy::needless_return)]
// Allow `assert_eq!(true, ...)` because in some cases it is used to check a bool
// value and not a 'flag' / 'state', and `assert_eq!` makes that more explicit
#![allow(clippy::bool_assert_comparison)]
// Enable 'unused' warnings for doc tests (are disabled by default)
#![doc(test(no_crate_inject))]
#![doc(test(attr(warn(unused))))]
// Fail on warnings in doc tests
#![doc(test(attr(deny(warnings))))]

//! jsonbind binds Rust structs to [RFC 8259](https://www.rfc-editor.org/rfc/rfc8259.html) JSON
//! without any runtime reflection.
//!
//! A schema is declared with the [`json_schema!`] macro. The macro generates the struct, a
//! [`JsonSchema`] implementation dispatching on precomputed property indices, and the lazily
//! built [descriptor](descriptor::ObjectDescriptor) of the schema. Reading and writing is
//! performed with a pull-based token stream [reader] and a push-based token stream [writer].
//!
//! # Terminology
//!
//! - *schema*: struct bound to a JSON object, implementing [`JsonSchema`]
//! - *property*: field of a schema, bound to a JSON object *member*
//! - *descriptor*: the list of properties of a schema, together with the descriptor of the
//!   schema it extends
//! - *support*: descriptor, reader function and writer function of a schema, see [`JsonSupport`]
//!
//! # Usage examples
//!
//! ```
//! # use jsonbind::json_schema;
//! json_schema! {
//!     #[derive(PartialEq, Debug)]
//!     pub struct InnerRef {
//!         pub name: String,
//!     }
//! }
//!
//! json_schema! {
//!     #[derive(PartialEq, Debug)]
//!     pub struct ReferencedTypes {
//!         pub inner_ref: Option<InnerRef> as "innerRef",
//!         pub ids: Vec<i64>,
//!     }
//! }
//!
//! let json = r#"{"innerRef": {"name": "a"}, "ids": [1, 2], "unknown": true}"#;
//! let value: ReferencedTypes = jsonbind::from_str(json)?;
//! assert_eq!("a", value.inner_ref.as_ref().unwrap().name);
//! assert_eq!(vec![1, 2], value.ids);
//!
//! assert_eq!(
//!     r#"{"innerRef":{"name":"a"},"ids":[1,2]}"#,
//!     jsonbind::to_string(&value)?
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The reader and writer can also be used directly:
//! ```
//! # use jsonbind::{reader::*, writer::*};
//! let mut json_reader = JsonStreamReader::new(r#"{"a": [1, true]}"#.as_bytes());
//! json_reader.begin_object()?;
//! assert_eq!("a", json_reader.next_name()?);
//! json_reader.begin_array()?;
//! assert_eq!(1, json_reader.next_int()?);
//! assert_eq!(true, json_reader.next_bool()?);
//! json_reader.end_array()?;
//! json_reader.end_object()?;
//! json_reader.consume_trailing_whitespace()?;
//!
//! let mut json_writer = JsonStreamWriter::new(Vec::<u8>::new());
//! json_writer.begin_array()?;
//! json_writer.number_value(1)?;
//! json_writer.bool_value(true)?;
//! json_writer.end_array()?;
//! assert_eq!("[1,true]", String::from_utf8(json_writer.into_inner()?)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::io::{Read, Write};

pub mod descriptor;
pub mod error;
pub mod reader;
pub mod registry;
pub mod schema;
pub mod writer;

mod json_number;
mod macros;

pub use error::JsonError;
pub use schema::{read_collection, write_collection, JsonField, JsonSchema, JsonSupport};

use reader::JsonStreamReader;
use writer::{JsonStreamWriter, JsonWriter, WriterSettings};

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::OnceCell;

    /// JSON member name of a field declared without `as "name"`
    pub fn field_json_name(field: &'static str) -> &'static str {
        field.strip_prefix("r#").unwrap_or(field)
    }
}

/// Reads a value from JSON bytes
///
/// The bytes must contain exactly one JSON value, optionally surrounded by whitespace.
pub fn from_reader<T: JsonField, R: Read>(reader: R) -> Result<T, JsonError> {
    let mut json_reader = JsonStreamReader::new(reader);
    let value = T::read_field(&mut json_reader)?;
    json_reader.consume_trailing_whitespace()?;
    Ok(value)
}

/// Reads a value from a JSON byte slice
pub fn from_slice<T: JsonField>(json: &[u8]) -> Result<T, JsonError> {
    from_reader(json)
}

/// Reads a value from a JSON string
pub fn from_str<T: JsonField>(json: &str) -> Result<T, JsonError> {
    from_slice(json.as_bytes())
}

/// Writes a value as compact JSON
pub fn to_writer<T: JsonField, W: Write>(writer: W, value: &T) -> Result<(), JsonError> {
    to_writer_custom(writer, value, WriterSettings::default()).map(|_| ())
}

fn to_writer_custom<T: JsonField, W: Write>(
    writer: W,
    value: &T,
    settings: WriterSettings,
) -> Result<W, JsonError> {
    let mut json_writer = JsonStreamWriter::new_custom(writer, settings);
    value.write_field(&mut json_writer)?;
    json_writer.close()?;
    Ok(json_writer.into_inner()?)
}

fn to_string_custom<T: JsonField>(value: &T, settings: WriterSettings) -> Result<String, JsonError> {
    let bytes = to_writer_custom(Vec::new(), value, settings)?;
    // The writer only produces valid UTF-8
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Writes a value as compact JSON string
pub fn to_string<T: JsonField>(value: &T) -> Result<String, JsonError> {
    to_string_custom(value, WriterSettings::default())
}

/// Writes a value as pretty printed JSON string
pub fn to_string_pretty<T: JsonField>(value: &T) -> Result<String, JsonError> {
    to_string_custom(
        value,
        WriterSettings {
            pretty_print: true,
            ..Default::default()
        },
    )
}
