//! Streaming implementation of [`JsonWriter`]

use std::{
    fmt::{Debug, Formatter},
    io::Write,
};

use super::*;
use crate::json_number::is_valid_json_number;

/// Settings to customize the JSON writer behavior
///
/// These settings are used by [`JsonStreamWriter::new_custom`]. To avoid repeating the
/// default values for unchanged settings `..Default::default()` can be used:
/// ```
/// # use jsonbind::writer::WriterSettings;
/// WriterSettings {
///     pretty_print: true,
///     // For all other settings use the default
///     ..Default::default()
/// }
/// # ;
/// ```
#[derive(Clone, Debug)]
pub struct WriterSettings {
    /// Whether to pretty print the JSON output
    ///
    /// When enabled the JSON output will have spaces and line breaks to make it easier
    /// for humans to read, using two spaces per indentation level:
    /// ```json
    /// {
    ///   "a": [
    ///     1,
    ///     2
    ///   ]
    /// }
    /// ```
    /// Whereas compact JSON output would look like this:
    /// ```json
    /// {"a":[1,2]}
    /// ```
    pub pretty_print: bool,

    /// Whether to write non-finite numbers (`NaN`, `Infinity`, `-Infinity`)
    ///
    /// Such literals are not valid JSON; a strict writer rejects them with
    /// [`WriterError::NonFiniteNumber`]. Can be changed later with [`JsonWriter::set_lenient`].
    pub lenient: bool,

    /// Whether to escape all non-ASCII characters
    ///
    /// When enabled all Unicode characters in member names and string values whose code point
    /// is >= `0x80` are written as escape sequence. This can be useful when interacting with
    /// legacy systems which do not properly support non-ASCII input.
    pub escape_all_non_ascii: bool,

    /// Whether to escape characters which are special in HTML (`<`, `>`, `&`, `=` and `'`)
    ///
    /// This makes it safe to embed the JSON output in an HTML document.
    pub html_safe: bool,
}

impl Default for WriterSettings {
    /// Creates the default JSON writer settings
    ///
    /// - pretty print: false (compact output)
    /// - lenient: false
    /// - escape all non-ASCII: false
    /// - HTML safe: false
    fn default() -> Self {
        WriterSettings {
            pretty_print: false,
            lenient: false,
            escape_all_non_ascii: false,
            html_safe: false,
        }
    }
}

#[derive(PartialEq, Debug)]
enum StackValue {
    Array,
    Object,
}

const WRITER_BUF_SIZE: usize = 1024;

/// A JSON writer implementation which writes data to a [`Write`]
///
/// This writer internally buffers data so it is normally not necessary to wrap the provided
/// writer in a [`std::io::BufWriter`]. The buffered data is written to the underlying writer
/// by [`flush`](JsonWriter::flush), [`close`](JsonWriter::close) and [`into_inner`](Self::into_inner).
pub struct JsonStreamWriter<W: Write> {
    writer: W,
    buf: [u8; WRITER_BUF_SIZE],
    /// Index (starting at 0) within [`buf`](Self::buf) where to write next
    buf_write_pos: usize,
    /// Whether the current array or object is empty, or at top-level whether
    /// no value has been written yet
    is_empty: bool,
    expects_member_name: bool,
    stack: Vec<StackValue>,
    indentation_level: u32,
    closed: bool,

    settings: WriterSettings,
}

impl<W: Write> Debug for JsonStreamWriter<W> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonStreamWriter")
            .field("buf_count", &self.buf_write_pos)
            .field("is_empty", &self.is_empty)
            .field("expects_member_name", &self.expects_member_name)
            .field("stack", &self.stack)
            .field("indentation_level", &self.indentation_level)
            .field("closed", &self.closed)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

// Implementation with public constructor methods
impl<W: Write> JsonStreamWriter<W> {
    /// Creates a JSON writer with [default settings](WriterSettings::default)
    pub fn new(writer: W) -> Self {
        JsonStreamWriter::new_custom(writer, WriterSettings::default())
    }

    /// Creates a JSON writer with custom settings
    pub fn new_custom(writer: W, settings: WriterSettings) -> Self {
        Self {
            writer,
            buf: [0_u8; WRITER_BUF_SIZE],
            buf_write_pos: 0,
            is_empty: true,
            expects_member_name: false,
            stack: Vec::with_capacity(16),
            indentation_level: 0,
            closed: false,
            settings,
        }
    }

    /// Writes the buffered data and returns the underlying writer
    ///
    /// Unlike [`close`](JsonWriter::close) this does not verify that the document is complete.
    pub fn into_inner(mut self) -> Result<W, WriterError> {
        self.flush_buf()?;
        Ok(self.writer)
    }
}

// Implementation with low level byte writing methods
impl<W: Write> JsonStreamWriter<W> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), IoError> {
        let mut pos = 0;
        while pos < bytes.len() {
            let copied_count = (self.buf.len() - self.buf_write_pos).min(bytes.len() - pos);
            self.buf[self.buf_write_pos..(self.buf_write_pos + copied_count)]
                .copy_from_slice(&bytes[pos..(pos + copied_count)]);
            self.buf_write_pos += copied_count;
            pos += copied_count;

            if self.buf_write_pos >= self.buf.len() {
                // write_all retries on `ErrorKind::Interrupted`, as desired
                self.writer.write_all(&self.buf)?;
                self.buf_write_pos = 0;
            }
        }

        Ok(())
    }

    fn flush_buf(&mut self) -> Result<(), IoError> {
        self.writer.write_all(&self.buf[0..self.buf_write_pos])?;
        self.buf_write_pos = 0;
        self.writer.flush()
    }
}

// Implementation with JSON structure state inspection methods, and general value methods
impl<W: Write> JsonStreamWriter<W> {
    fn is_in_array(&self) -> bool {
        self.stack.last() == Some(&StackValue::Array)
    }

    fn is_in_object(&self) -> bool {
        self.stack.last() == Some(&StackValue::Object)
    }

    fn state(&self) -> WriterState {
        match self.stack.last() {
            None if self.is_empty => WriterState::EmptyDocument,
            None => WriterState::DocumentComplete,
            Some(StackValue::Array) => WriterState::InArray,
            Some(StackValue::Object) if self.expects_member_name => WriterState::ExpectingName,
            Some(StackValue::Object) => WriterState::ExpectingMemberValue,
        }
    }

    fn structural_error(&self, operation: &'static str) -> WriterError {
        WriterError::StructuralError {
            operation,
            state: self.state(),
        }
    }

    fn check_open(&self) -> Result<(), WriterError> {
        if self.closed {
            Err(WriterError::Closed)
        } else {
            Ok(())
        }
    }

    fn write_indentation(&mut self) -> Result<(), IoError> {
        for _ in 0..self.indentation_level {
            self.write_bytes(b"  ")?;
        }
        Ok(())
    }

    fn before_container_element(&mut self) -> Result<(), IoError> {
        if self.is_empty {
            if self.settings.pretty_print {
                // Convert "[" (respectively "{") to "[\n..."
                self.write_bytes(b"\n")?;
                self.indentation_level += 1;
                self.write_indentation()?;
            }
        } else if self.settings.pretty_print {
            self.write_bytes(b",\n")?;
            self.write_indentation()?;
        } else {
            self.write_bytes(b",")?;
        }
        Ok(())
    }

    fn before_value(&mut self, operation: &'static str) -> Result<(), WriterError> {
        self.check_open()?;
        let is_behind_top_level = !self.is_empty && self.stack.is_empty();
        if self.expects_member_name || is_behind_top_level {
            return Err(self.structural_error(operation));
        }

        if self.is_in_array() {
            self.before_container_element()?;
        }
        self.is_empty = false;

        if self.is_in_object() {
            // After this value a name will be expected
            self.expects_member_name = true;
        }
        Ok(())
    }

    fn on_container_end(&mut self) -> Result<(), IoError> {
        self.stack.pop();

        if !self.is_empty && self.settings.pretty_print {
            self.write_bytes(b"\n")?;
            self.indentation_level -= 1;
            self.write_indentation()?;
        }

        // Enclosing container is not empty since this method call here is processing its child
        self.is_empty = false;

        // If after pop() call above currently in object, then expecting a member name
        self.expects_member_name = self.is_in_object();
        Ok(())
    }
}

// Implementation with string writing methods
impl<W: Write> JsonStreamWriter<W> {
    fn should_escape(&self, c: char) -> bool {
        matches!(c, '"' | '\\')
            // Control characters which must be escaped per JSON specification
            || matches!(c, '\u{0}'..='\u{1F}')
            // Line and paragraph separator break JavaScript string literals
            || matches!(c, '\u{2028}' | '\u{2029}')
            || (self.settings.escape_all_non_ascii && !c.is_ascii())
            || (self.settings.html_safe && matches!(c, '<' | '>' | '&' | '=' | '\''))
    }

    fn write_escaped_char(&mut self, c: char) -> Result<(), IoError> {
        fn write_unicode_escape<W: Write>(
            json_writer: &mut JsonStreamWriter<W>,
            value: u16,
        ) -> Result<(), IoError> {
            json_writer.write_bytes(format!("\\u{value:04X}").as_bytes())
        }

        let escape = match c {
            '"' => "\\\"",
            '\\' => "\\\\",
            '\u{0008}' => "\\b",
            '\u{000C}' => "\\f",
            '\n' => "\\n",
            '\r' => "\\r",
            '\t' => "\\t",
            _ => {
                // Encodes as single escape, or as surrogate pair for supplementary characters
                let mut utf16 = [0_u16; 2];
                for unit in c.encode_utf16(&mut utf16) {
                    write_unicode_escape(self, *unit)?;
                }
                return Ok(());
            }
        };
        self.write_bytes(escape.as_bytes())
    }

    fn write_string_value(&mut self, value: &str) -> Result<(), IoError> {
        self.write_bytes(b"\"")?;

        let bytes = value.as_bytes();
        let mut next_to_write_index = 0;
        for (index, char) in value.char_indices() {
            if self.should_escape(char) {
                if index > next_to_write_index {
                    self.write_bytes(&bytes[next_to_write_index..index])?;
                }
                self.write_escaped_char(char)?;
                next_to_write_index = index + char.len_utf8();
            }
        }
        // Write remaining bytes
        if next_to_write_index < bytes.len() {
            self.write_bytes(&bytes[next_to_write_index..])?;
        }

        self.write_bytes(b"\"")
    }
}

impl<W: Write> JsonWriter for JsonStreamWriter<W> {
    fn begin_object(&mut self) -> Result<(), WriterError> {
        self.before_value("begin object")?;
        self.stack.push(StackValue::Object);
        self.is_empty = true;
        self.expects_member_name = true;
        self.write_bytes(b"{")?;
        Ok(())
    }

    fn end_object(&mut self) -> Result<(), WriterError> {
        self.check_open()?;
        if !self.is_in_object() || !self.expects_member_name {
            return Err(self.structural_error("end object"));
        }
        self.on_container_end()?;
        self.write_bytes(b"}")?;
        Ok(())
    }

    fn begin_array(&mut self) -> Result<(), WriterError> {
        self.before_value("begin array")?;
        self.stack.push(StackValue::Array);
        self.is_empty = true;

        // Clear this because it is only relevant for objects; will be restored when entering parent object (if any) again
        self.expects_member_name = false;

        self.write_bytes(b"[")?;
        Ok(())
    }

    fn end_array(&mut self) -> Result<(), WriterError> {
        self.check_open()?;
        if !self.is_in_array() {
            return Err(self.structural_error("end array"));
        }
        self.on_container_end()?;
        self.write_bytes(b"]")?;
        Ok(())
    }

    fn name(&mut self, name: &str) -> Result<(), WriterError> {
        self.check_open()?;
        if !self.expects_member_name {
            return Err(self.structural_error("write member name"));
        }
        self.before_container_element()?;
        self.write_string_value(name)?;
        self.write_bytes(if self.settings.pretty_print {
            b": "
        } else {
            b":"
        })?;
        self.expects_member_name = false;
        Ok(())
    }

    fn string_value(&mut self, value: &str) -> Result<(), WriterError> {
        self.before_value("write string")?;
        self.write_string_value(value)?;
        Ok(())
    }

    fn bool_value(&mut self, value: bool) -> Result<(), WriterError> {
        self.before_value("write boolean")?;
        self.write_bytes(if value { b"true" } else { b"false" })?;
        Ok(())
    }

    fn long_value(&mut self, value: i64) -> Result<(), WriterError> {
        self.before_value("write number")?;
        self.write_bytes(value.to_string().as_bytes())?;
        Ok(())
    }

    fn double_value(&mut self, value: f64) -> Result<(), WriterError> {
        self.check_open()?;
        if !value.is_finite() && !self.settings.lenient {
            return Err(WriterError::NonFiniteNumber(value));
        }
        self.before_value("write number")?;

        let literal = if value.is_nan() {
            "NaN".to_owned()
        } else if value.is_infinite() {
            if value.is_sign_positive() { "Infinity" } else { "-Infinity" }.to_owned()
        } else {
            // Debug representation keeps the fraction (`1.0`) and is the shortest one
            // which reads back to the same value
            format!("{value:?}")
        };
        self.write_bytes(literal.as_bytes())?;
        Ok(())
    }

    fn null_value(&mut self) -> Result<(), WriterError> {
        self.before_value("write null")?;
        self.write_bytes(b"null")?;
        Ok(())
    }

    fn json_value(&mut self, value: &str) -> Result<(), WriterError> {
        self.check_open()?;
        if !is_valid_json_number(value) {
            return Err(WriterError::InvalidNumber(value.to_owned()));
        }
        self.before_value("write number")?;
        self.write_bytes(value.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), WriterError> {
        self.check_open()?;
        self.flush_buf()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), WriterError> {
        if self.closed {
            return Ok(());
        }
        if !self.stack.is_empty() {
            return Err(WriterError::StructuralError {
                operation: "close",
                state: WriterState::Incomplete,
            });
        }
        if self.is_empty {
            return Err(self.structural_error("close"));
        }
        self.flush_buf()?;
        self.closed = true;
        Ok(())
    }

    fn is_lenient(&self) -> bool {
        self.settings.lenient
    }

    fn set_lenient(&mut self, lenient: bool) {
        self.settings.lenient = lenient;
    }
}
