//! Module for writing JSON data
//!
//! [`JsonWriter`] is the general trait for JSON writers, [`JsonStreamWriter`] is an implementation
//! of it which writes a JSON document to a [`Write`](std::io::Write) in a streaming way.

use duplicate::duplicate_item;
use thiserror::Error;

mod stream_writer;
// Re-export streaming implementation under `writer` module
pub use stream_writer::*;

type IoError = std::io::Error;

/// Structural state of a JSON writer, used to describe why an operation was rejected
#[derive(PartialEq, Eq, Clone, Copy, strum::Display, Debug)]
pub enum WriterState {
    /// No value has been written yet
    #[strum(serialize = "no value has been written yet")]
    EmptyDocument,
    /// The top-level value has been written completely
    #[strum(serialize = "the top-level value is complete")]
    DocumentComplete,
    /// Inside a JSON array
    #[strum(serialize = "inside an array")]
    InArray,
    /// Inside a JSON object, a member name or the end of the object is expected
    #[strum(serialize = "a member name is expected")]
    ExpectingName,
    /// Inside a JSON object, after a member name
    #[strum(serialize = "a member value is expected")]
    ExpectingMemberValue,
    /// An array or object has been started but not ended yet
    #[strum(serialize = "the top-level value is incomplete")]
    Incomplete,
}

/// Error which occurred while writing to a JSON writer
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WriterError {
    /// An IO error occurred while writing to the underlying writer
    #[error("IO error: {0}")]
    IoError(#[from] IoError),
    /// The called method does not fit the current structure of the JSON document
    ///
    /// For example a member name was written inside an array, or a second member
    /// name was written without a value for the first one.
    #[error("cannot {operation}: {state}")]
    StructuralError {
        /// Description of the rejected operation
        operation: &'static str,
        /// State of the writer when the operation was attempted
        state: WriterState,
    },
    /// `NaN` or an infinite number was written while the writer is not lenient
    #[error("non-finite number {0} cannot be written by a strict writer")]
    NonFiniteNumber(f64),
    /// A raw number literal is not a valid JSON number
    #[error("'{0}' is not a valid JSON number")]
    InvalidNumber(String),
    /// The writer has already been closed
    #[error("writer has already been closed")]
    Closed,
}

/// A trait for JSON writers
///
/// The methods of this writer can be divided into the following categories:
///
/// - Writing values
///     - [`begin_array`](Self::begin_array), [`end_array`](Self::end_array): Starting and ending a JSON array
///     - [`begin_object`](Self::begin_object), [`end_object`](Self::end_object): Starting and ending a JSON object
///     - [`name`](Self::name): Writing a JSON object member name
///     - [`string_value`](Self::string_value): Writing a JSON string value
///     - [`long_value`](Self::long_value), [`double_value`](Self::double_value), [`number_value`](Self::number_value),
///       [`json_value`](Self::json_value): Writing a JSON number value
///     - [`bool_value`](Self::bool_value): Writing a JSON boolean value
///     - [`null_value`](Self::null_value): Writing a JSON null value
/// - Other
///     - [`flush`](Self::flush): Flushing buffered data to the underlying writer
///     - [`close`](Self::close): Ensuring that the JSON document is complete and flushing it
///
/// Calls which would produce malformed JSON are rejected with [`WriterError::StructuralError`];
/// the writer is still usable afterwards. The trait is object safe, generated schema writers
/// accept both concrete writers and `&mut dyn JsonWriter`.
///
/// # Examples
/// ```
/// # use jsonbind::writer::*;
/// let mut writer = Vec::<u8>::new();
/// let mut json_writer = JsonStreamWriter::new(&mut writer);
///
/// json_writer.begin_object()?;
/// json_writer.name("a")?;
///
/// json_writer.begin_array()?;
/// json_writer.long_value(1)?;
/// json_writer.bool_value(true)?;
/// json_writer.end_array()?;
///
/// json_writer.end_object()?;
/// json_writer.close()?;
///
/// let json = String::from_utf8(writer)?;
/// assert_eq!(json, r#"{"a":[1,true]}"#);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait JsonWriter {
    /// Begins writing a JSON object
    fn begin_object(&mut self) -> Result<(), WriterError>;

    /// Writes the closing bracket of the current JSON object
    ///
    /// Fails if not inside an object, or if a member name has been written without value.
    fn end_object(&mut self) -> Result<(), WriterError>;

    /// Begins writing a JSON array
    fn begin_array(&mut self) -> Result<(), WriterError>;

    /// Writes the closing bracket of the current JSON array
    fn end_array(&mut self) -> Result<(), WriterError>;

    /// Writes the name of the next JSON object member
    ///
    /// Duplicate member names are not detected.
    fn name(&mut self, name: &str) -> Result<(), WriterError>;

    /// Writes a JSON string value, escaping characters where necessary
    fn string_value(&mut self, value: &str) -> Result<(), WriterError>;

    /// Writes a JSON boolean value
    fn bool_value(&mut self, value: bool) -> Result<(), WriterError>;

    /// Writes an integral JSON number value
    fn long_value(&mut self, value: i64) -> Result<(), WriterError>;

    /// Writes a floating point JSON number value
    ///
    /// `NaN` and infinite values are only written if the writer [is lenient](Self::is_lenient),
    /// otherwise [`WriterError::NonFiniteNumber`] is returned and nothing is written.
    fn double_value(&mut self, value: f64) -> Result<(), WriterError>;

    /// Writes a JSON `null`
    fn null_value(&mut self) -> Result<(), WriterError>;

    /// Writes a raw JSON number literal, for example `1.5e10`
    ///
    /// The literal is written unchanged; it is rejected with [`WriterError::InvalidNumber`]
    /// if it is not a valid JSON number.
    fn json_value(&mut self, value: &str) -> Result<(), WriterError>;

    /// Writes a number value of any supported Rust number type
    ///
    /// Integers are widened to `i64` and written with [`long_value`](Self::long_value),
    /// floating point numbers are widened to `f64` and written with [`double_value`](Self::double_value).
    fn number_value<N: JsonNumber>(&mut self, value: N) -> Result<(), WriterError>
    where
        Self: Sized,
    {
        value.write_to(self)
    }

    /// Flushes buffered data to the underlying writer
    fn flush(&mut self) -> Result<(), WriterError>;

    /// Verifies that the JSON document is complete and flushes it
    ///
    /// Afterwards all writing methods fail with [`WriterError::Closed`]; closing
    /// again has no effect.
    fn close(&mut self) -> Result<(), WriterError>;

    /// Whether this writer writes non-finite numbers instead of rejecting them
    fn is_lenient(&self) -> bool;

    /// Enables or disables writing of non-finite numbers
    fn set_lenient(&mut self, lenient: bool);
}

/// Rust number type which can be written as JSON number
///
/// This trait is sealed and cannot be implemented outside of this crate.
pub trait JsonNumber: private::Sealed + Copy {
    /// Writes this number, widened to `i64` or `f64`, to the JSON writer
    fn write_to<W: JsonWriter + ?Sized>(self, json_writer: &mut W) -> Result<(), WriterError>;
}

mod private {
    pub trait Sealed {}

    // Use `duplicate` crate to avoid repeating code for all supported types, see https://stackoverflow.com/a/61467564
    #[duplicate::duplicate_item(type_template; [i8]; [i16]; [i32]; [i64]; [u8]; [u16]; [u32]; [f32]; [f64])]
    impl Sealed for type_template {}
}

#[duplicate_item(type_template; [i8]; [i16]; [i32]; [i64]; [u8]; [u16]; [u32])]
impl JsonNumber for type_template {
    fn write_to<W: JsonWriter + ?Sized>(self, json_writer: &mut W) -> Result<(), WriterError> {
        json_writer.long_value(i64::from(self))
    }
}

#[duplicate_item(type_template; [f32]; [f64])]
impl JsonNumber for type_template {
    fn write_to<W: JsonWriter + ?Sized>(self, json_writer: &mut W) -> Result<(), WriterError> {
        json_writer.double_value(f64::from(self))
    }
}
