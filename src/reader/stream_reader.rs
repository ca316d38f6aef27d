//! Streaming implementation of [`JsonReader`]

use std::{
    fmt::{Debug, Formatter},
    io::{ErrorKind, Read},
};

use super::*;
use crate::json_number::{is_valid_json_number, NON_FINITE_LITERALS};

/// Kind of the next value; names, strings and numbers have already been read into
/// [`JsonStreamReader::value`] when this is set
#[derive(PartialEq, Clone, Copy, Debug)]
enum PeekedValue {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    Name,
    String,
    Number,
    True,
    False,
    Null,
    EndDocument,
}

impl PeekedValue {
    fn token(self) -> Token {
        match self {
            PeekedValue::BeginObject => Token::BeginObject,
            PeekedValue::EndObject => Token::EndObject,
            PeekedValue::BeginArray => Token::BeginArray,
            PeekedValue::EndArray => Token::EndArray,
            PeekedValue::Name => Token::Name,
            PeekedValue::String => Token::String,
            PeekedValue::Number => Token::Number,
            PeekedValue::True | PeekedValue::False => Token::Boolean,
            PeekedValue::Null => Token::Null,
            PeekedValue::EndDocument => Token::EndDocument,
        }
    }
}

#[derive(PartialEq, Clone, Copy, Debug)]
enum Scope {
    /// Before the top-level value
    EmptyDocument,
    /// After the (first) top-level value
    NonEmptyDocument,
    EmptyArray,
    NonEmptyArray,
    EmptyObject,
    /// Member name was read, but not its value yet
    DanglingName,
    NonEmptyObject,
}

/// Placeholder member name used in the JSON path until the first member name of an object was read
const UNKNOWN_MEMBER_NAME: &str = "<?>";

const READER_BUF_SIZE: usize = 1024;

/// Settings to customize the JSON reader behavior
///
/// These settings are used by [`JsonStreamReader::new_custom`]. To avoid repeating the
/// default values for unchanged settings `..Default::default()` can be used:
/// ```
/// # use jsonbind::reader::ReaderSettings;
/// ReaderSettings {
///     lenient: true,
///     // For all other settings use the default
///     ..Default::default()
/// }
/// # ;
/// ```
#[derive(Clone, Debug)]
pub struct ReaderSettings {
    /// Whether to accept malformed but recoverable JSON data
    ///
    /// When enabled the reader additionally accepts:
    /// - end of line comments (`// ...` and `# ...`) and block comments (`/* ... */`)
    ///   where whitespace is allowed
    /// - a trailing comma after the last array item or object member, for example `[1,]`
    /// - strings and member names in single quotes, for example `'text'`
    /// - unquoted member names and string values, for example `{a: b}`
    /// - the non-finite number literals `NaN`, `Infinity` and `-Infinity`
    /// - multiple top-level values, for example `1 true []`
    ///
    /// Leniency can also be changed later with [`JsonReader::set_lenient`].
    pub lenient: bool,

    /// Whether to keep track of the current JSON path while reading the document
    ///
    /// The path is included in error locations and returned by [`JsonReader::path`].
    /// Disabling it avoids copying member names and can therefore improve performance.
    pub track_path: bool,

    /// Maximum nesting depth of arrays and objects
    ///
    /// Exceeding it results in [`SyntaxErrorKind::MaxNestingDepthExceeded`]. This protects
    /// against stack exhaustion when the read values are processed recursively.
    pub max_nesting_depth: u32,
}

impl Default for ReaderSettings {
    /// Creates the default reader settings
    ///
    /// - lenient: false (strict RFC 8259 parsing)
    /// - track path: true
    /// - max nesting depth: 128
    fn default() -> Self {
        ReaderSettings {
            lenient: false,
            track_path: true,
            max_nesting_depth: 128,
        }
    }
}

/// A JSON reader which consumes data from a [`Read`]
///
/// The reader buffers the data internally, so wrapping the underlying reader in a
/// `BufReader` is not necessary. Malformed UTF-8 data is reported as
/// [`ReaderError::IoError`] with kind [`ErrorKind::InvalidData`].
///
/// The reader does not check for trailing data after the top-level value unless it is
/// asked for the next token; use [`consume_trailing_whitespace`](Self::consume_trailing_whitespace)
/// to verify that the document is complete.
pub struct JsonStreamReader<R: Read> {
    reader: R,
    buf: [u8; READER_BUF_SIZE],
    buf_pos: usize,
    buf_end_pos: usize,
    reached_eof: bool,

    peeked: Option<PeekedValue>,
    /// Decoded content of the peeked name, string or number
    value: String,
    stack: Vec<Scope>,
    json_path: Option<Vec<JsonPathPiece>>,

    line: u64,
    column: u64,
    byte_pos: u64,
    /// Whether the last consumed byte was `\r`, so that `\r\n` counts as one line break
    after_cr: bool,

    settings: ReaderSettings,
}

impl<R: Read> Debug for JsonStreamReader<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonStreamReader")
            .field("peeked", &self.peeked)
            .field("stack", &self.stack)
            .field("json_path", &self.json_path)
            .field("line", &self.line)
            .field("column", &self.column)
            .field("byte_pos", &self.byte_pos)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

fn is_literal_byte(byte: u8) -> bool {
    !matches!(
        byte,
        b'/' | b'\\'
            | b';'
            | b'#'
            | b'='
            | b'{'
            | b'}'
            | b'['
            | b']'
            | b':'
            | b','
            | b' '
            | b'\t'
            | b'\x0C'
            | b'\r'
            | b'\n'
            | b'"'
            | b'\''
    )
}

impl<R: Read> JsonStreamReader<R> {
    /// Creates a JSON reader with [default settings](ReaderSettings::default)
    pub fn new(reader: R) -> Self {
        JsonStreamReader::new_custom(reader, ReaderSettings::default())
    }

    /// Creates a JSON reader with custom settings
    pub fn new_custom(reader: R, settings: ReaderSettings) -> Self {
        JsonStreamReader {
            reader,
            buf: [0; READER_BUF_SIZE],
            buf_pos: 0,
            buf_end_pos: 0,
            reached_eof: false,
            peeked: None,
            value: String::new(),
            stack: vec![Scope::EmptyDocument],
            json_path: if settings.track_path {
                Some(Vec::new())
            } else {
                None
            },
            line: 0,
            column: 0,
            byte_pos: 0,
            after_cr: false,
            settings,
        }
    }

    /// Consumes trailing whitespace and verifies that the end of the document was reached
    ///
    /// Fails if the top-level value has not been fully consumed yet, or if trailing data
    /// (for example a second top-level value) follows it. In lenient mode comments are
    /// allowed after the top-level value.
    pub fn consume_trailing_whitespace(mut self) -> Result<(), ReaderError> {
        let peeked = self.peek_internal()?;
        if peeked == PeekedValue::EndDocument {
            Ok(())
        } else {
            Err(self.structural_error(Token::EndDocument.into(), peeked.token()))
        }
    }

    fn syntax_error_value(&self, kind: SyntaxErrorKind) -> ReaderError {
        ReaderError::SyntaxError(JsonSyntaxError {
            kind,
            location: self.current_position(),
        })
    }

    fn syntax_error<T>(&self, kind: SyntaxErrorKind) -> Result<T, ReaderError> {
        Err(self.syntax_error_value(kind))
    }

    fn structural_error(&self, expected: &'static str, actual: Token) -> ReaderError {
        ReaderError::StructuralError {
            expected,
            actual,
            location: self.current_position(),
        }
    }

    fn io_error(&self, error: IoError) -> ReaderError {
        ReaderError::IoError {
            error,
            location: self.current_position(),
        }
    }

    fn invalid_utf8_error(&self) -> ReaderError {
        self.io_error(IoError::new(ErrorKind::InvalidData, "invalid UTF-8 data"))
    }

    /*
     * Byte level
     */

    /// Fills the buffer; returns `false` if the end of the data was reached
    fn fill_buffer(&mut self) -> Result<bool, ReaderError> {
        if self.reached_eof {
            return Ok(false);
        }
        loop {
            match self.reader.read(&mut self.buf) {
                Ok(0) => {
                    self.reached_eof = true;
                    return Ok(false);
                }
                Ok(read_count) => {
                    self.buf_pos = 0;
                    self.buf_end_pos = read_count;
                    return Ok(true);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.io_error(e)),
            }
        }
    }

    fn peek_byte(&mut self) -> Result<Option<u8>, ReaderError> {
        if self.buf_pos >= self.buf_end_pos && !self.fill_buffer()? {
            return Ok(None);
        }
        Ok(Some(self.buf[self.buf_pos]))
    }

    /// Consumes the byte previously returned by [`peek_byte`](Self::peek_byte)
    fn advance(&mut self, byte: u8) {
        self.buf_pos += 1;
        self.byte_pos += 1;
        match byte {
            b'\n' => {
                if !self.after_cr {
                    self.line += 1;
                }
                self.column = 0;
            }
            b'\r' => {
                self.line += 1;
                self.column = 0;
            }
            // UTF-8 continuation byte, belongs to the character which was already counted
            0x80..=0xBF => {}
            _ => self.column += 1,
        }
        self.after_cr = byte == b'\r';
    }

    fn read_byte(&mut self, eof_error_kind: SyntaxErrorKind) -> Result<u8, ReaderError> {
        match self.peek_byte()? {
            Some(byte) => {
                self.advance(byte);
                Ok(byte)
            }
            None => self.syntax_error(eof_error_kind),
        }
    }

    /// Skips whitespace and, in lenient mode, comments; returns the next byte without consuming it
    fn skip_whitespace(&mut self) -> Result<Option<u8>, ReaderError> {
        loop {
            let byte = match self.peek_byte()? {
                Some(byte) => byte,
                None => return Ok(None),
            };
            match byte {
                b' ' | b'\t' | b'\n' | b'\r' => self.advance(byte),
                b'/' => {
                    if !self.settings.lenient {
                        return self.syntax_error(SyntaxErrorKind::CommentsNotEnabled);
                    }
                    self.advance(byte);
                    match self.read_byte(SyntaxErrorKind::IncompleteComment)? {
                        b'/' => self.skip_to_line_end()?,
                        b'*' => self.skip_block_comment()?,
                        _ => return self.syntax_error(SyntaxErrorKind::IncompleteComment),
                    }
                }
                b'#' if self.settings.lenient => {
                    self.advance(byte);
                    self.skip_to_line_end()?;
                }
                _ => return Ok(Some(byte)),
            }
        }
    }

    fn skip_whitespace_no_eof(&mut self) -> Result<u8, ReaderError> {
        match self.skip_whitespace()? {
            Some(byte) => Ok(byte),
            None => self.syntax_error(SyntaxErrorKind::IncompleteDocument),
        }
    }

    fn skip_to_line_end(&mut self) -> Result<(), ReaderError> {
        while let Some(byte) = self.peek_byte()? {
            if byte == b'\n' || byte == b'\r' {
                break;
            }
            self.advance(byte);
        }
        Ok(())
    }

    fn skip_block_comment(&mut self) -> Result<(), ReaderError> {
        let mut previous_star = false;
        loop {
            let byte = self.read_byte(SyntaxErrorKind::BlockCommentNotClosed)?;
            if previous_star && byte == b'/' {
                return Ok(());
            }
            previous_star = byte == b'*';
        }
    }

    /// Reads one multibyte UTF-8 character, starting with the not yet consumed byte `first`,
    /// and appends it to [`value`](Self::value)
    fn read_utf8_char(&mut self, first: u8) -> Result<(), ReaderError> {
        let byte_count = match first {
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => return Err(self.invalid_utf8_error()),
        };
        let mut bytes = [0_u8; 4];
        for slot in bytes.iter_mut().take(byte_count) {
            match self.peek_byte()? {
                Some(byte) => {
                    self.advance(byte);
                    *slot = byte;
                }
                None => return Err(self.invalid_utf8_error()),
            }
        }
        match std::str::from_utf8(&bytes[..byte_count]) {
            Ok(c) => {
                self.value.push_str(c);
                Ok(())
            }
            Err(_) => Err(self.invalid_utf8_error()),
        }
    }

    /*
     * Lexing
     */

    /// Reads the content of a quoted name or string into [`value`](Self::value);
    /// the opening quote has already been consumed
    fn read_quoted(&mut self, quote: u8) -> Result<(), ReaderError> {
        self.value.clear();
        loop {
            let byte = match self.peek_byte()? {
                Some(byte) => byte,
                None => return self.syntax_error(SyntaxErrorKind::IncompleteDocument),
            };
            match byte {
                _ if byte == quote => {
                    self.advance(byte);
                    return Ok(());
                }
                b'\\' => {
                    self.advance(byte);
                    self.read_escape_sequence()?;
                }
                0x00..=0x1F => {
                    return self.syntax_error(SyntaxErrorKind::NotEscapedControlCharacter)
                }
                0x20..=0x7F => {
                    self.advance(byte);
                    self.value.push(char::from(byte));
                }
                _ => self.read_utf8_char(byte)?,
            }
        }
    }

    fn read_escape_sequence(&mut self) -> Result<(), ReaderError> {
        let byte = self.read_byte(SyntaxErrorKind::MalformedEscapeSequence)?;
        let c = match byte {
            b'"' | b'\\' | b'/' => char::from(byte),
            b'\'' if self.settings.lenient => '\'',
            b'b' => '\u{8}',
            b'f' => '\u{C}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => self.read_unicode_escape()?,
            _ => return self.syntax_error(SyntaxErrorKind::UnknownEscapeSequence),
        };
        self.value.push(c);
        Ok(())
    }

    /// Reads the 4 hex digits of a `\u` escape
    fn read_hex_escape(&mut self) -> Result<u32, ReaderError> {
        let mut value = 0;
        for _ in 0..4 {
            let byte = self.read_byte(SyntaxErrorKind::MalformedEscapeSequence)?;
            match char::from(byte).to_digit(16) {
                Some(digit) => value = (value << 4) | digit,
                None => return self.syntax_error(SyntaxErrorKind::MalformedEscapeSequence),
            }
        }
        Ok(value)
    }

    fn read_unicode_escape(&mut self) -> Result<char, ReaderError> {
        let unpaired = SyntaxErrorKind::UnpairedSurrogatePairEscapeSequence;
        let first = self.read_hex_escape()?;
        let code_point = match first {
            0xD800..=0xDBFF => {
                if self.read_byte(unpaired)? != b'\\' || self.read_byte(unpaired)? != b'u' {
                    return self.syntax_error(unpaired);
                }
                let second = self.read_hex_escape()?;
                if !(0xDC00..=0xDFFF).contains(&second) {
                    return self.syntax_error(unpaired);
                }
                0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00)
            }
            0xDC00..=0xDFFF => return self.syntax_error(unpaired),
            _ => first,
        };
        match char::from_u32(code_point) {
            Some(c) => Ok(c),
            None => self.syntax_error(SyntaxErrorKind::MalformedEscapeSequence),
        }
    }

    /// Reads consecutive literal characters into [`value`](Self::value)
    fn read_literal(&mut self) -> Result<(), ReaderError> {
        self.value.clear();
        while let Some(byte) = self.peek_byte()? {
            if !is_literal_byte(byte) {
                break;
            }
            if byte.is_ascii() {
                self.advance(byte);
                self.value.push(char::from(byte));
            } else {
                self.read_utf8_char(byte)?;
            }
        }
        Ok(())
    }

    fn lex_unquoted_value(&mut self) -> Result<PeekedValue, ReaderError> {
        self.read_literal()?;
        let lenient = self.settings.lenient;
        match self.value.as_str() {
            "true" => Ok(PeekedValue::True),
            "false" => Ok(PeekedValue::False),
            "null" => Ok(PeekedValue::Null),
            literal if is_valid_json_number(literal) => Ok(PeekedValue::Number),
            literal if lenient && NON_FINITE_LITERALS.contains(&literal) => Ok(PeekedValue::Number),
            _ if lenient => Ok(PeekedValue::String),
            literal => {
                let kind = if literal.starts_with(|c: char| c == '-' || c.is_ascii_digit()) {
                    SyntaxErrorKind::MalformedNumber
                } else if literal.starts_with(['t', 'f', 'n']) {
                    SyntaxErrorKind::InvalidLiteral
                } else {
                    SyntaxErrorKind::MalformedJson
                };
                self.syntax_error(kind)
            }
        }
    }

    fn lex_value(&mut self, byte: u8) -> Result<PeekedValue, ReaderError> {
        match byte {
            b'{' => {
                self.advance(byte);
                Ok(PeekedValue::BeginObject)
            }
            b'[' => {
                self.advance(byte);
                Ok(PeekedValue::BeginArray)
            }
            b'"' => {
                self.advance(byte);
                self.read_quoted(byte)?;
                Ok(PeekedValue::String)
            }
            b'\'' if self.settings.lenient => {
                self.advance(byte);
                self.read_quoted(byte)?;
                Ok(PeekedValue::String)
            }
            b']' | b'}' => self.syntax_error(SyntaxErrorKind::UnexpectedClosingBracket),
            b',' => self.syntax_error(SyntaxErrorKind::UnexpectedComma),
            b':' => self.syntax_error(SyntaxErrorKind::UnexpectedColon),
            _ if is_literal_byte(byte) => self.lex_unquoted_value(),
            _ => self.syntax_error(SyntaxErrorKind::MalformedJson),
        }
    }

    fn lex_name(&mut self, byte: u8) -> Result<PeekedValue, ReaderError> {
        match byte {
            b'"' => {
                self.advance(byte);
                self.read_quoted(byte)?;
            }
            b'\'' if self.settings.lenient => {
                self.advance(byte);
                self.read_quoted(byte)?;
            }
            _ if self.settings.lenient && is_literal_byte(byte) => self.read_literal()?,
            _ => return self.syntax_error(SyntaxErrorKind::ExpectingMemberNameOrObjectEnd),
        }
        Ok(PeekedValue::Name)
    }

    /*
     * Scope handling
     */

    fn top_scope(&self) -> Scope {
        // The document scope is never popped
        self.stack[self.stack.len() - 1]
    }

    fn replace_top_scope(&mut self, scope: Scope) {
        if let Some(top) = self.stack.last_mut() {
            *top = scope;
        }
    }

    fn push_scope(&mut self, scope: Scope) -> Result<(), ReaderError> {
        // Stack contains the document scope in addition to the nested arrays and objects
        if self.stack.len() > self.settings.max_nesting_depth as usize {
            return self.syntax_error(SyntaxErrorKind::MaxNestingDepthExceeded);
        }
        self.stack.push(scope);
        Ok(())
    }

    fn lex_next(&mut self) -> Result<PeekedValue, ReaderError> {
        let lenient = self.settings.lenient;
        match self.top_scope() {
            Scope::EmptyArray => {
                self.replace_top_scope(Scope::NonEmptyArray);
                let byte = self.skip_whitespace_no_eof()?;
                if byte == b']' {
                    self.advance(byte);
                    return Ok(PeekedValue::EndArray);
                }
                self.lex_value(byte)
            }
            Scope::NonEmptyArray => match self.skip_whitespace_no_eof()? {
                b']' => {
                    self.advance(b']');
                    Ok(PeekedValue::EndArray)
                }
                b',' => {
                    self.advance(b',');
                    let byte = self.skip_whitespace_no_eof()?;
                    if byte == b']' {
                        if !lenient {
                            return self.syntax_error(SyntaxErrorKind::TrailingCommaNotEnabled);
                        }
                        self.advance(byte);
                        return Ok(PeekedValue::EndArray);
                    }
                    self.lex_value(byte)
                }
                _ => self.syntax_error(SyntaxErrorKind::MissingComma),
            },
            scope @ (Scope::EmptyObject | Scope::NonEmptyObject) => {
                let mut byte = self.skip_whitespace_no_eof()?;
                if byte == b'}' {
                    self.advance(byte);
                    return Ok(PeekedValue::EndObject);
                }
                if scope == Scope::NonEmptyObject {
                    if byte != b',' {
                        return self.syntax_error(SyntaxErrorKind::MissingComma);
                    }
                    self.advance(byte);
                    byte = self.skip_whitespace_no_eof()?;
                    if byte == b'}' {
                        if !lenient {
                            return self.syntax_error(SyntaxErrorKind::TrailingCommaNotEnabled);
                        }
                        self.advance(byte);
                        return Ok(PeekedValue::EndObject);
                    }
                }
                self.replace_top_scope(Scope::DanglingName);
                self.lex_name(byte)
            }
            Scope::DanglingName => {
                self.replace_top_scope(Scope::NonEmptyObject);
                let byte = self.skip_whitespace_no_eof()?;
                if byte != b':' {
                    return self.syntax_error(SyntaxErrorKind::MissingColon);
                }
                self.advance(byte);
                let byte = self.skip_whitespace_no_eof()?;
                self.lex_value(byte)
            }
            Scope::EmptyDocument => {
                self.replace_top_scope(Scope::NonEmptyDocument);
                let byte = self.skip_whitespace_no_eof()?;
                self.lex_value(byte)
            }
            Scope::NonEmptyDocument => match self.skip_whitespace()? {
                None => Ok(PeekedValue::EndDocument),
                Some(byte) if lenient => self.lex_value(byte),
                Some(_) => self.syntax_error(SyntaxErrorKind::TrailingData),
            },
        }
    }

    fn peek_internal(&mut self) -> Result<PeekedValue, ReaderError> {
        if let Some(peeked) = self.peeked {
            return Ok(peeked);
        }
        let peeked = self.lex_next()?;
        self.peeked = Some(peeked);
        Ok(peeked)
    }

    /// Consumes the peeked value if it is `expected`
    fn expect_peeked(&mut self, expected: PeekedValue) -> Result<(), ReaderError> {
        let peeked = self.peek_internal()?;
        if peeked != expected {
            return Err(self.structural_error(expected.token().into(), peeked.token()));
        }
        self.peeked = None;
        Ok(())
    }

    /// Updates the JSON path after a complete value was consumed
    fn on_value_end(&mut self) {
        if let Some(json_path) = &mut self.json_path {
            if let Some(JsonPathPiece::ArrayItem(index)) = json_path.last_mut() {
                *index += 1;
            }
        }
    }

    fn consume_scalar(&mut self) {
        self.peeked = None;
        self.on_value_end();
    }

    fn push_path(&mut self, piece: JsonPathPiece) {
        if let Some(json_path) = &mut self.json_path {
            json_path.push(piece);
        }
    }

    fn end_scope(&mut self) {
        self.stack.pop();
        if let Some(json_path) = &mut self.json_path {
            json_path.pop();
        }
        self.on_value_end();
    }
}

impl<R: Read> JsonReader for JsonStreamReader<R> {
    fn peek(&mut self) -> Result<Token, ReaderError> {
        Ok(self.peek_internal()?.token())
    }

    fn has_next(&mut self) -> Result<bool, ReaderError> {
        Ok(!matches!(
            self.peek_internal()?,
            PeekedValue::EndObject | PeekedValue::EndArray | PeekedValue::EndDocument
        ))
    }

    fn begin_object(&mut self) -> Result<(), ReaderError> {
        self.expect_peeked(PeekedValue::BeginObject)?;
        self.push_scope(Scope::EmptyObject)?;
        self.push_path(JsonPathPiece::ObjectMember(UNKNOWN_MEMBER_NAME.to_owned()));
        Ok(())
    }

    fn end_object(&mut self) -> Result<(), ReaderError> {
        self.expect_peeked(PeekedValue::EndObject)?;
        self.end_scope();
        Ok(())
    }

    fn begin_array(&mut self) -> Result<(), ReaderError> {
        self.expect_peeked(PeekedValue::BeginArray)?;
        self.push_scope(Scope::EmptyArray)?;
        self.push_path(JsonPathPiece::ArrayItem(0));
        Ok(())
    }

    fn end_array(&mut self) -> Result<(), ReaderError> {
        self.expect_peeked(PeekedValue::EndArray)?;
        self.end_scope();
        Ok(())
    }

    fn next_name(&mut self) -> Result<&str, ReaderError> {
        self.expect_peeked(PeekedValue::Name)?;
        if let Some(json_path) = &mut self.json_path {
            if let Some(JsonPathPiece::ObjectMember(name)) = json_path.last_mut() {
                name.clone_from(&self.value);
            }
        }
        Ok(&self.value)
    }

    fn next_str(&mut self) -> Result<&str, ReaderError> {
        match self.peek_internal()? {
            PeekedValue::String | PeekedValue::Number => {
                self.consume_scalar();
                Ok(&self.value)
            }
            peeked => Err(self.structural_error(Token::String.into(), peeked.token())),
        }
    }

    fn next_number_as_str(&mut self) -> Result<&str, ReaderError> {
        match self.peek_internal()? {
            PeekedValue::Number | PeekedValue::String => {
                self.consume_scalar();
                Ok(&self.value)
            }
            peeked => Err(self.structural_error(Token::Number.into(), peeked.token())),
        }
    }

    fn next_bool(&mut self) -> Result<bool, ReaderError> {
        let value = match self.peek_internal()? {
            PeekedValue::True => true,
            PeekedValue::False => false,
            peeked => return Err(self.structural_error(Token::Boolean.into(), peeked.token())),
        };
        self.consume_scalar();
        Ok(value)
    }

    fn next_null(&mut self) -> Result<(), ReaderError> {
        self.expect_peeked(PeekedValue::Null)?;
        self.on_value_end();
        Ok(())
    }

    fn skip_value(&mut self) -> Result<(), ReaderError> {
        let mut depth: u32 = 0;
        loop {
            match self.peek_internal()? {
                PeekedValue::BeginObject => {
                    self.begin_object()?;
                    depth += 1;
                }
                PeekedValue::BeginArray => {
                    self.begin_array()?;
                    depth += 1;
                }
                PeekedValue::EndObject if depth > 0 => {
                    self.end_object()?;
                    depth -= 1;
                }
                PeekedValue::EndArray if depth > 0 => {
                    self.end_array()?;
                    depth -= 1;
                }
                // Skip the name together with its value
                PeekedValue::Name => {
                    self.next_name()?;
                    continue;
                }
                PeekedValue::String
                | PeekedValue::Number
                | PeekedValue::True
                | PeekedValue::False
                | PeekedValue::Null => self.consume_scalar(),
                peeked => return Err(self.structural_error("value", peeked.token())),
            }
            if depth == 0 {
                return Ok(());
            }
        }
    }

    fn is_lenient(&self) -> bool {
        self.settings.lenient
    }

    fn set_lenient(&mut self, lenient: bool) {
        self.settings.lenient = lenient;
    }

    fn current_position(&self) -> JsonReaderPosition {
        JsonReaderPosition {
            path: self.json_path.clone(),
            line_pos: Some(LinePosition {
                line: self.line,
                column: self.column,
            }),
            data_pos: Some(self.byte_pos),
        }
    }
}
