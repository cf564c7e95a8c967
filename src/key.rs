//! Key: the dynamic, hashable key stored in a `CleverMap`.
//!
//! Keys follow a small numeric tower: `Bool(false)`, `Int(0)` and
//! `Float(0.0)` are the same key, as are `Bool(true)`, `Int(1)` and
//! `Float(1.0)`. Integral floats equal the matching integer. Everything
//! else compares by value within its own variant.
//!
//! `Display` renders the plain text form (`None`, `True`, `1234.0`, `abc`)
//! that normalization starts from; `Debug` renders the literal form, which
//! differs only in quoting strings.

use core::fmt;
use core::hash::{Hash, Hasher};

#[derive(Clone)]
pub enum Key {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// Equality class of a key. Equal keys share the same `Canon`.
#[derive(PartialEq, Eq, Hash)]
enum Canon<'a> {
    None,
    Int(i64),
    Float(u64),
    Str(&'a str),
}

// 2^63: the first float past the `i64` range.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn integral(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&f) {
        Some(f as i64)
    } else {
        None
    }
}

fn float_bits(f: f64) -> u64 {
    // All NaNs collapse so that `Eq` stays reflexive.
    if f.is_nan() {
        f64::NAN.to_bits()
    } else {
        f.to_bits()
    }
}

impl Key {
    fn canon(&self) -> Canon<'_> {
        match self {
            Key::None => Canon::None,
            Key::Bool(b) => Canon::Int(i64::from(*b)),
            Key::Int(i) => Canon::Int(*i),
            Key::Float(f) => match integral(*f) {
                Some(i) => Canon::Int(i),
                None => Canon::Float(float_bits(*f)),
            },
            Key::Str(s) => Canon::Str(s),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Str(s) => Some(s),
            _ => None,
        }
    }

    /// True for keys equal to `0` or `1`, the two values shared with booleans.
    pub fn is_bool_like(&self) -> bool {
        matches!(self.canon(), Canon::Int(0) | Canon::Int(1))
    }

    /// Structural identity: same variant and same value. Unlike `==`,
    /// `Int(1)` and `Bool(true)` are different spellings.
    pub fn same_spelling(&self, other: &Key) -> bool {
        match (self, other) {
            (Key::None, Key::None) => true,
            (Key::Bool(a), Key::Bool(b)) => a == b,
            (Key::Int(a), Key::Int(b)) => a == b,
            (Key::Float(a), Key::Float(b)) => float_bits(*a) == float_bits(*b),
            (Key::Str(a), Key::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.canon() == other.canon()
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canon().hash(state);
    }
}

/// Shortest round-trip rendering with exponent form outside `[1e-4, 1e16)`,
/// written as `1e+20` / `1.5e-07`.
pub(crate) fn float_text(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_owned();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_owned();
    }
    // `{:?}` already switches to exponent form at the same thresholds.
    let s = format!("{x:?}");
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => s,
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::None => f.write_str("None"),
            Key::Bool(true) => f.write_str("True"),
            Key::Bool(false) => f.write_str("False"),
            Key::Int(i) => write!(f, "{i}"),
            Key::Float(x) => f.write_str(&float_text(*x)),
            Key::Str(s) => f.write_str(s),
        }
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(s) => write!(f, "{s:?}"),
            other => fmt::Display::fmt(other, f),
        }
    }
}

macro_rules! int_keys {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Key {
                fn from(v: $t) -> Self {
                    Key::Int(i64::from(v))
                }
            }
        )*
    };
}

int_keys!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Key {
    fn from(v: bool) -> Self {
        Key::Bool(v)
    }
}

impl From<f32> for Key {
    fn from(v: f32) -> Self {
        Key::Float(f64::from(v))
    }
}

impl From<f64> for Key {
    fn from(v: f64) -> Self {
        Key::Float(v)
    }
}

impl From<&str> for Key {
    fn from(v: &str) -> Self {
        Key::Str(v.to_owned())
    }
}

impl From<&String> for Key {
    fn from(v: &String) -> Self {
        Key::Str(v.clone())
    }
}

impl From<String> for Key {
    fn from(v: String) -> Self {
        Key::Str(v)
    }
}

impl From<()> for Key {
    fn from(_: ()) -> Self {
        Key::None
    }
}

impl From<&Key> for Key {
    fn from(v: &Key) -> Self {
        v.clone()
    }
}

impl<T: Into<Key>> From<Option<T>> for Key {
    fn from(v: Option<T>) -> Self {
        v.map_or(Key::None, Into::into)
    }
}
