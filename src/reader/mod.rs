//! Module for reading JSON data
//!
//! [`JsonReader`] is the pull-parser contract used by the generated schema readers.
//! [`JsonStreamReader`] is the implementation of it which reads JSON text from a [`Read`](std::io::Read).

use std::fmt::{Debug, Display, Formatter};

use thiserror::Error;

use crate::json_number::{parse_double, parse_long, NumberConversionError};

mod stream_reader;
// Re-export streaming implementation under `reader` module
pub use stream_reader::*;

type IoError = std::io::Error;

/// Kind of the next lexical unit in the JSON document
///
/// Unlike value reading methods, [`JsonReader::peek`] reports structural tokens as well,
/// so the end of an array or object can be detected without calling [`JsonReader::has_next`].
#[derive(PartialEq, Eq, Clone, Copy, Hash, strum::Display, strum::IntoStaticStr, Debug)]
pub enum Token {
    /// Start of a JSON object: `{`
    BeginObject,
    /// End of a JSON object: `}`
    EndObject,
    /// Start of a JSON array: `[`
    BeginArray,
    /// End of a JSON array: `]`
    EndArray,
    /// Name of a JSON object member
    Name,
    /// JSON string value, for example `"text in \"quotes\""`
    String,
    /// JSON number value, for example `123.4e+10`
    Number,
    /// JSON boolean value, `true` or `false`
    Boolean,
    /// JSON `null`
    Null,
    /// End of the JSON document, after the top-level value
    EndDocument,
}

/// A piece of a JSON path
///
/// A piece can either represent the index of a JSON array item or the name of a JSON object member.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum JsonPathPiece {
    /// Index (starting at 0) of a JSON array item
    ArrayItem(u32),
    /// Name of a JSON object member
    ObjectMember(String),
}

/// Formats a JSON path in dot-notation, for example `$.users[2].name`
pub fn format_json_path(path: &[JsonPathPiece]) -> String {
    let mut formatted = String::from("$");
    for piece in path {
        match piece {
            JsonPathPiece::ArrayItem(index) => {
                formatted.push('[');
                formatted.push_str(&index.to_string());
                formatted.push(']');
            }
            JsonPathPiece::ObjectMember(name) => {
                formatted.push('.');
                formatted.push_str(name);
            }
        }
    }
    formatted
}

/// Line and column position
///
/// Line and column numbering both start at 0. Every Unicode character counts as one column.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct LinePosition {
    /// Line number, starting at 0
    pub line: u64,
    /// Character column within the current line, starting at 0
    pub column: u64,
}

impl Display for LinePosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Position of the JSON reader in the JSON document
///
/// Used for error messages; which parts are available depends on the reader
/// implementation and its settings.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct JsonReaderPosition {
    /// JSON path of the position
    ///
    /// The last piece is either the name of the previously read member (or `<?>` if no member
    /// name has been read yet in the current object), or the index of the current array item.
    ///
    /// `None` if path tracking is [disabled](ReaderSettings::track_path).
    pub path: Option<Vec<JsonPathPiece>>,
    /// Line and column number
    pub line_pos: Option<LinePosition>,
    /// Byte position in the underlying data, starting at 0
    pub data_pos: Option<u64>,
}

impl Display for JsonReaderPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (&self.path, &self.line_pos) {
            (Some(path), Some(line_pos)) => write!(f, "path '{}', {line_pos}", format_json_path(path))?,
            (Some(path), None) => write!(f, "path '{}'", format_json_path(path))?,
            (None, Some(line_pos)) => write!(f, "{line_pos}")?,
            (None, None) => write!(f, "<location unavailable>")?,
        }
        if let Some(data_pos) = self.data_pos {
            write!(f, " (data pos {data_pos})")?;
        }
        Ok(())
    }
}

/// JSON syntax error
#[derive(Error, PartialEq, Eq, Clone, Debug)]
#[error("JSON syntax error {kind} at {location}")]
pub struct JsonSyntaxError {
    /// Kind of the error
    pub kind: SyntaxErrorKind,
    /// Location where the error occurred in the JSON document
    pub location: JsonReaderPosition,
}

/// Describes why a syntax error occurred
#[non_exhaustive]
#[derive(PartialEq, Eq, Clone, Copy, strum::Display, Debug)]
pub enum SyntaxErrorKind {
    /// A comment was encountered, but the reader is not lenient
    CommentsNotEnabled,
    /// A comment is incomplete, for example a single `/`
    IncompleteComment,
    /// A block comment is missing the closing `*/`
    BlockCommentNotClosed,
    /// A literal value is incomplete or invalid, for example `tru` instead of `true`
    InvalidLiteral,
    /// A closing bracket (`]` or `}`) was encountered where it was not expected
    UnexpectedClosingBracket,
    /// A comma (`,`) was encountered where it was not expected
    UnexpectedComma,
    /// A comma (`,`) is missing between array elements or object members
    MissingComma,
    /// A trailing comma (for example in `[1,]`) was used, but the reader is not lenient
    TrailingCommaNotEnabled,
    /// A colon (`:`) was encountered where it was not expected
    UnexpectedColon,
    /// A colon (`:`) is missing between member name and member value
    MissingColon,
    /// A JSON number is malformed, for example `01` (leading 0 is not allowed)
    MalformedNumber,
    /// A member name or the end of an object (`}`) was expected but something else was encountered
    ExpectingMemberNameOrObjectEnd,
    /// The JSON data is malformed for a reason other than any of the other kinds
    MalformedJson,
    /// A control character was encountered in the raw JSON data of a member name or string value
    NotEscapedControlCharacter,
    /// An unknown escape sequence (`\...`) was encountered
    UnknownEscapeSequence,
    /// A malformed escape sequence was encountered, for example `\u00` instead of `\u0000`
    MalformedEscapeSequence,
    /// An unpaired UTF-16 surrogate was encountered in an escape sequence
    UnpairedSurrogatePairEscapeSequence,
    /// The JSON document is incomplete, for example a closing `]` is missing
    IncompleteDocument,
    /// Unexpected trailing data was detected after the top-level value
    TrailingData,
    /// Arrays and objects are nested deeper than [`ReaderSettings::max_nesting_depth`]
    MaxNestingDepthExceeded,
}

/// Error which occurred while reading from a JSON reader
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ReaderError {
    /// A syntax error was encountered
    #[error("syntax error: {0}")]
    SyntaxError(#[from] JsonSyntaxError),
    /// The next token does not match the requested operation
    ///
    /// For example [`JsonReader::end_object`] was called while the next token is a
    /// member name, or [`JsonReader::next_int`] was called for a JSON boolean.
    #[error("expected {expected} but was {actual} at {location}")]
    StructuralError {
        /// Description of what the called method requires, usually the name of a [`Token`]
        expected: &'static str,
        /// The token actually present
        actual: Token,
        /// Location where the error occurred in the JSON document
        location: JsonReaderPosition,
    },
    /// A JSON number does not fit losslessly into the requested integer type
    #[error("value {value} is out of range for {target} at {location}")]
    RangeError {
        /// The offending value
        value: String,
        /// Name of the requested type, for example `i8`
        target: &'static str,
        /// Location of the value within the JSON document
        location: JsonReaderPosition,
    },
    /// A JSON number (or a string used as number) cannot be converted to the requested type
    #[error("value '{value}' is not a valid {target} at {location}")]
    NumberFormatError {
        /// The offending value
        value: String,
        /// Name of the requested type, for example `i64`
        target: &'static str,
        /// Location of the value within the JSON document
        location: JsonReaderPosition,
    },
    /// An IO error occurred while trying to read from the underlying reader, or
    /// malformed UTF-8 data was encountered
    #[error("IO error '{error}' at (roughly) {location}")]
    IoError {
        /// The IO error which occurred
        #[source]
        error: IoError,
        /// Rough location where the error occurred within the JSON document
        location: JsonReaderPosition,
    },
}

fn conversion_error(
    error: NumberConversionError,
    target: &'static str,
    location: JsonReaderPosition,
) -> ReaderError {
    match error {
        NumberConversionError::Format(value) => ReaderError::NumberFormatError {
            value,
            target,
            location,
        },
        NumberConversionError::Range(value) => ReaderError::RangeError {
            value,
            target,
            location,
        },
    }
}

fn read_integer<R: JsonReader + ?Sized>(
    reader: &mut R,
    target: &'static str,
) -> Result<i64, ReaderError> {
    let parsed = parse_long(reader.next_number_as_str()?);
    parsed.map_err(|e| conversion_error(e, target, reader.current_position()))
}

fn narrow_integer<R: JsonReader + ?Sized, T: TryFrom<i64>>(
    reader: &mut R,
    target: &'static str,
) -> Result<T, ReaderError> {
    let value = read_integer(reader, target)?;
    T::try_from(value).map_err(|_| ReaderError::RangeError {
        value: value.to_string(),
        target,
        location: reader.current_position(),
    })
}

/// A trait for JSON readers
///
/// A JSON reader is a sequential, forward-only cursor over one JSON document. Its methods
/// can be divided into the following categories:
///
/// - Peeking, without consuming anything
///     - [`peek`](Self::peek): Kind of the next token, including structural tokens
///     - [`has_next`](Self::has_next): Whether the current array or object has more elements
/// - Structure
///     - [`begin_array`](Self::begin_array), [`end_array`](Self::end_array)
///     - [`begin_object`](Self::begin_object), [`end_object`](Self::end_object)
///     - [`next_name`](Self::next_name), [`next_name_owned`](Self::next_name_owned)
/// - Values
///     - [`next_str`](Self::next_str), [`next_string`](Self::next_string), [`next_bool`](Self::next_bool),
///       [`next_null`](Self::next_null), [`next_number_as_str`](Self::next_number_as_str)
///     - typed numbers: [`next_long`](Self::next_long), [`next_int`](Self::next_int), [`next_short`](Self::next_short),
///       [`next_byte`](Self::next_byte), [`next_double`](Self::next_double), [`next_float`](Self::next_float), ...
///     - nullable ("boxed") variants such as [`next_boxed_int`](Self::next_boxed_int), which return
///       `None` for a JSON `null` instead of failing
/// - Skipping: [`skip_value`](Self::skip_value)
///
/// The trait is object safe; generated schema readers accept both concrete readers and
/// `&mut dyn JsonReader`.
///
/// # Examples
/// ```
/// # use jsonbind::reader::*;
/// let json = r#"{"a": [1, true, null]}"#;
/// let mut json_reader = JsonStreamReader::new(json.as_bytes());
///
/// json_reader.begin_object()?;
/// assert_eq!("a", json_reader.next_name()?);
///
/// json_reader.begin_array()?;
/// assert_eq!(1, json_reader.next_int()?);
/// assert_eq!(true, json_reader.next_bool()?);
/// assert_eq!(None, json_reader.next_boxed_long()?);
/// json_reader.end_array()?;
///
/// json_reader.end_object()?;
/// assert_eq!(Token::EndDocument, json_reader.peek()?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Error handling
/// Calling a method which does not match the next token results in a
/// [`ReaderError::StructuralError`]; this includes calls which violate the JSON grammar,
/// such as [`end_array`](Self::end_array) inside an object. Once an error other than a
/// structural or number conversion error occurred, processing the document must be aborted.
pub trait JsonReader {
    /// Peeks at the kind of the next token, without consuming it
    fn peek(&mut self) -> Result<Token, ReaderError>;

    /// Checks if there is a next element in the current JSON array or object
    ///
    /// Returns `false` if the next token is the end of the enclosing array or object,
    /// or the end of the document.
    fn has_next(&mut self) -> Result<bool, ReaderError>;

    /// Begins consuming a JSON object
    fn begin_object(&mut self) -> Result<(), ReaderError>;

    /// Consumes the closing bracket of the current JSON object
    fn end_object(&mut self) -> Result<(), ReaderError>;

    /// Begins consuming a JSON array
    fn begin_array(&mut self) -> Result<(), ReaderError>;

    /// Consumes the closing bracket of the current JSON array
    fn end_array(&mut self) -> Result<(), ReaderError>;

    /// Consumes the name of the next JSON object member
    fn next_name(&mut self) -> Result<&str, ReaderError>;

    /// Consumes the name of the next JSON object member as owned `String`
    fn next_name_owned(&mut self) -> Result<String, ReaderError> {
        self.next_name().map(str::to_owned)
    }

    /// Consumes a JSON string value
    ///
    /// A JSON number value is accepted as well and returned as its literal text.
    fn next_str(&mut self) -> Result<&str, ReaderError>;

    /// Consumes a JSON string value as owned `String`
    fn next_string(&mut self) -> Result<String, ReaderError> {
        self.next_str().map(str::to_owned)
    }

    /// Consumes a JSON number value and returns its literal text
    ///
    /// A JSON string value is accepted as well, its content is then returned unchanged;
    /// the typed number methods report a [`ReaderError::NumberFormatError`] if it is not
    /// a number.
    fn next_number_as_str(&mut self) -> Result<&str, ReaderError>;

    /// Consumes a JSON boolean value
    fn next_bool(&mut self) -> Result<bool, ReaderError>;

    /// Consumes a JSON `null`
    fn next_null(&mut self) -> Result<(), ReaderError>;

    /// Skips the next value
    ///
    /// Arrays and objects are skipped recursively. If the next token is a member name,
    /// the name and the member value are skipped.
    fn skip_value(&mut self) -> Result<(), ReaderError>;

    /// Whether this reader accepts malformed but recoverable JSON data
    fn is_lenient(&self) -> bool;

    /// Enables or disables lenient parsing
    fn set_lenient(&mut self, lenient: bool);

    /// Gets the current position of this reader within the JSON document
    fn current_position(&self) -> JsonReaderPosition;

    /// Gets the JSON path of the current position in dot-notation, for example `$.a[1]`
    ///
    /// Returns `$` if the reader does not track the path.
    fn path(&self) -> String {
        self.current_position()
            .path
            .map_or_else(|| "$".to_owned(), |path| format_json_path(&path))
    }

    /// Consumes a JSON number as `i64`
    ///
    /// Numbers with fraction or exponent are accepted if their value is integral,
    /// for example `1.0` or `2e3`.
    fn next_long(&mut self) -> Result<i64, ReaderError> {
        read_integer(self, "i64")
    }

    /// Consumes a JSON number as `i32`, failing with [`ReaderError::RangeError`] if it does not fit
    fn next_int(&mut self) -> Result<i32, ReaderError> {
        narrow_integer(self, "i32")
    }

    /// Consumes a JSON number as `i16`, failing with [`ReaderError::RangeError`] if it does not fit
    fn next_short(&mut self) -> Result<i16, ReaderError> {
        narrow_integer(self, "i16")
    }

    /// Consumes a JSON number as `i8`, failing with [`ReaderError::RangeError`] if it does not fit
    ///
    /// ```
    /// # use jsonbind::reader::*;
    /// let mut json_reader = JsonStreamReader::new("[-128, 256]".as_bytes());
    /// json_reader.begin_array()?;
    /// assert_eq!(-128, json_reader.next_byte()?);
    /// assert!(matches!(json_reader.next_byte(), Err(ReaderError::RangeError { .. })));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    fn next_byte(&mut self) -> Result<i8, ReaderError> {
        narrow_integer(self, "i8")
    }

    /// Consumes a JSON number as `u8`, failing with [`ReaderError::RangeError`] if it does not fit
    fn next_unsigned_byte(&mut self) -> Result<u8, ReaderError> {
        narrow_integer(self, "u8")
    }

    /// Consumes a JSON number as `u16`, failing with [`ReaderError::RangeError`] if it does not fit
    fn next_unsigned_short(&mut self) -> Result<u16, ReaderError> {
        narrow_integer(self, "u16")
    }

    /// Consumes a JSON number as `f64`
    fn next_double(&mut self) -> Result<f64, ReaderError> {
        let lenient = self.is_lenient();
        let parsed = parse_double(self.next_number_as_str()?, lenient);
        parsed.map_err(|e| conversion_error(e, "f64", self.current_position()))
    }

    /// Consumes a JSON number as `f32`
    ///
    /// The number is read as `f64` and then narrowed; precision loss is accepted.
    fn next_float(&mut self) -> Result<f32, ReaderError> {
        self.next_double().map(|value| value as f32)
    }

    /// Consumes a JSON string value or `null`
    fn next_boxed_string(&mut self) -> Result<Option<String>, ReaderError> {
        if self.peek()? == Token::Null {
            self.next_null()?;
            return Ok(None);
        }
        self.next_string().map(Some)
    }

    /// Consumes a JSON boolean value or `null`
    fn next_boxed_bool(&mut self) -> Result<Option<bool>, ReaderError> {
        if self.peek()? == Token::Null {
            self.next_null()?;
            return Ok(None);
        }
        self.next_bool().map(Some)
    }

    /// Consumes a JSON number as `i64`, or `null`
    fn next_boxed_long(&mut self) -> Result<Option<i64>, ReaderError> {
        if self.peek()? == Token::Null {
            self.next_null()?;
            return Ok(None);
        }
        self.next_long().map(Some)
    }

    /// Consumes a JSON number as `i32`, or `null`
    fn next_boxed_int(&mut self) -> Result<Option<i32>, ReaderError> {
        if self.peek()? == Token::Null {
            self.next_null()?;
            return Ok(None);
        }
        self.next_int().map(Some)
    }

    /// Consumes a JSON number as `i16`, or `null`
    fn next_boxed_short(&mut self) -> Result<Option<i16>, ReaderError> {
        if self.peek()? == Token::Null {
            self.next_null()?;
            return Ok(None);
        }
        self.next_short().map(Some)
    }

    /// Consumes a JSON number as `i8`, or `null`
    fn next_boxed_byte(&mut self) -> Result<Option<i8>, ReaderError> {
        if self.peek()? == Token::Null {
            self.next_null()?;
            return Ok(None);
        }
        self.next_byte().map(Some)
    }

    /// Consumes a JSON number as `u8`, or `null`
    fn next_boxed_unsigned_byte(&mut self) -> Result<Option<u8>, ReaderError> {
        if self.peek()? == Token::Null {
            self.next_null()?;
            return Ok(None);
        }
        self.next_unsigned_byte().map(Some)
    }

    /// Consumes a JSON number as `u16`, or `null`
    fn next_boxed_unsigned_short(&mut self) -> Result<Option<u16>, ReaderError> {
        if self.peek()? == Token::Null {
            self.next_null()?;
            return Ok(None);
        }
        self.next_unsigned_short().map(Some)
    }

    /// Consumes a JSON number as `f64`, or `null`
    fn next_boxed_double(&mut self) -> Result<Option<f64>, ReaderError> {
        if self.peek()? == Token::Null {
            self.next_null()?;
            return Ok(None);
        }
        self.next_double().map(Some)
    }

    /// Consumes a JSON number as `f32`, or `null`
    fn next_boxed_float(&mut self) -> Result<Option<f32>, ReaderError> {
        if self.peek()? == Token::Null {
            self.next_null()?;
            return Ok(None);
        }
        self.next_float().map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_path_format() {
        assert_eq!("$", format_json_path(&[]));
        assert_eq!(
            "$.users[2].name",
            format_json_path(&[
                JsonPathPiece::ObjectMember("users".to_owned()),
                JsonPathPiece::ArrayItem(2),
                JsonPathPiece::ObjectMember("name".to_owned()),
            ])
        );
    }

    #[test]
    fn json_reader_position_display() {
        assert_eq!(
            "path '$.a[1]', line 2, column 3 (data pos 4)",
            JsonReaderPosition {
                path: Some(vec![
                    JsonPathPiece::ObjectMember("a".to_owned()),
                    JsonPathPiece::ArrayItem(1)
                ]),
                line_pos: Some(LinePosition { line: 2, column: 3 }),
                data_pos: Some(4),
            }
            .to_string()
        );
        assert_eq!(
            "line 0, column 1",
            JsonReaderPosition {
                path: None,
                line_pos: Some(LinePosition { line: 0, column: 1 }),
                data_pos: None,
            }
            .to_string()
        );
        assert_eq!(
            "<location unavailable>",
            JsonReaderPosition {
                path: None,
                line_pos: None,
                data_pos: None,
            }
            .to_string()
        );
    }

    #[test]
    fn range_error_message_contains_value() {
        let error = conversion_error(
            NumberConversionError::Range("256".to_owned()),
            "i8",
            JsonReaderPosition {
                path: None,
                line_pos: None,
                data_pos: None,
            },
        );
        assert_eq!(
            "value 256 is out of range for i8 at <location unavailable>",
            error.to_string()
        );
    }
}
