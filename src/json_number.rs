//! Internal module for validating JSON numbers and converting them to Rust numbers

/// Grammar states of a JSON number, see RFC 8259 section 6
#[derive(PartialEq, Clone, Copy, Debug)]
enum State {
    Start,
    Minus,
    IntZero,
    IntNonZero,
    DecimalPoint,
    DecimalDigit,
    ExpE,
    ExpSign,
    ExpDigit,
}

impl State {
    /// Returns the next state, or `None` if `byte` is not allowed in this state
    fn next(self, byte: u8) -> Option<State> {
        use State::*;
        Some(match (self, byte) {
            (Start, b'-') => Minus,
            (Start | Minus, b'0') => IntZero,
            (Start | Minus | IntNonZero, b'0'..=b'9') => IntNonZero,
            (IntZero | IntNonZero, b'.') => DecimalPoint,
            (DecimalPoint | DecimalDigit, b'0'..=b'9') => DecimalDigit,
            (IntZero | IntNonZero | DecimalDigit, b'e' | b'E') => ExpE,
            (ExpE, b'-' | b'+') => ExpSign,
            (ExpE | ExpSign | ExpDigit, b'0'..=b'9') => ExpDigit,
            _ => return None,
        })
    }

    fn is_final(self) -> bool {
        matches!(
            self,
            State::IntZero | State::IntNonZero | State::DecimalDigit | State::ExpDigit
        )
    }
}

/// Whether the string is a valid JSON number, without leading or trailing whitespace
pub(crate) fn is_valid_json_number(value: &str) -> bool {
    let mut state = State::Start;
    for byte in value.bytes() {
        match state.next(byte) {
            Some(next) => state = next,
            None => return false,
        }
    }
    state.is_final()
}

/// Whether the JSON number only consists of an integral part, that means it has
/// neither fraction nor exponent
fn is_integral_literal(value: &str) -> bool {
    !value.bytes().any(|b| matches!(b, b'.' | b'e' | b'E'))
}

/// Literals for non-finite numbers which are accepted in lenient mode
pub(crate) const NON_FINITE_LITERALS: [&str; 3] = ["NaN", "Infinity", "-Infinity"];

#[derive(PartialEq, Debug)]
pub(crate) enum NumberConversionError {
    /// The value is not a number, or not representable by the target type at all
    Format(String),
    /// The value is a number, but exceeds the range of the target type
    Range(String),
}

// -2^63 and 2^63 are exactly representable as f64
const I64_MIN_AS_F64: f64 = -9_223_372_036_854_775_808.0;
const I64_END_AS_F64: f64 = 9_223_372_036_854_775_808.0;

pub(crate) fn parse_long(value: &str) -> Result<i64, NumberConversionError> {
    if !is_valid_json_number(value) {
        return Err(NumberConversionError::Format(value.to_owned()));
    }
    if is_integral_literal(value) {
        // A valid integral literal can only fail to parse because of overflow
        return value
            .parse::<i64>()
            .map_err(|_| NumberConversionError::Range(value.to_owned()));
    }

    let double = value
        .parse::<f64>()
        .map_err(|_| NumberConversionError::Format(value.to_owned()))?;
    // Overflowed to infinity, `fract()` would be NaN
    if double.is_infinite() {
        return Err(NumberConversionError::Range(value.to_owned()));
    }
    if double.fract() != 0.0 {
        return Err(NumberConversionError::Format(value.to_owned()));
    }
    if !(I64_MIN_AS_F64..I64_END_AS_F64).contains(&double) {
        return Err(NumberConversionError::Range(value.to_owned()));
    }
    Ok(double as i64)
}

pub(crate) fn parse_double(value: &str, lenient: bool) -> Result<f64, NumberConversionError> {
    if lenient && NON_FINITE_LITERALS.contains(&value) {
        return Ok(match value {
            "NaN" => f64::NAN,
            "Infinity" => f64::INFINITY,
            _ => f64::NEG_INFINITY,
        });
    }
    if !is_valid_json_number(value) {
        return Err(NumberConversionError::Format(value.to_owned()));
    }
    let double = value
        .parse::<f64>()
        .map_err(|_| NumberConversionError::Format(value.to_owned()))?;
    if double.is_infinite() && !lenient {
        return Err(NumberConversionError::Range(value.to_owned()));
    }
    Ok(double)
}
