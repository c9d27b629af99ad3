//! Compile-time constant values and folding.
//!
//! Untyped constants are arbitrary precision up to a practical bound:
//! integers are `i64` with transparent promotion to `BigInt`, floats are
//! exact `BigRational`s while their components stay reasonably sized and
//! decay to `f64` beyond that. Complex constants carry only the minimal
//! folding the front end needs (imaginary literals, negation, addition and
//! subtraction); everything further yields `Unknown`.
//!
//! `Unknown` is the error value: every operation is total and propagates
//! it instead of failing.

use std::fmt;

use mica_syntax::Op;
use num_bigint::{BigInt, Sign};
use num_rational::BigRational;
use num_traits::cast::ToPrimitive;
use num_traits::sign::Signed;
use num_traits::{Num, Zero};

use crate::kind::Kind;
use crate::target::Target;

/// Maximum bit size of rational components kept exact. Larger values decay
/// to `f64`.
const MAX_EXP: usize = 4 << 10;

/// A constant value.
#[derive(Clone, Debug)]
pub enum Value {
    /// No value (result of an error).
    Unknown,
    Bool(bool),
    Str(String),
    /// Integer that fits in i64.
    Int64(i64),
    /// Integer that does not fit in i64.
    IntBig(BigInt),
    /// Exact rational float.
    Rat(BigRational),
    /// Approximate float.
    Float(f64),
    /// Complex constant (approximate components).
    Complex(f64, f64),
}

impl Default for Value {
    fn default() -> Self {
        Value::Unknown
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        compare(self, Op::Eq, other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unknown => write!(f, "unknown"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Int64(i) => write!(f, "{}", i),
            Value::IntBig(i) => write!(f, "{}", i),
            Value::Rat(r) => {
                if r.is_integer() {
                    write!(f, "{}", r.numer())
                } else {
                    write!(f, "{}", r)
                }
            }
            Value::Float(v) => write!(f, "{}", v),
            Value::Complex(re, im) => write!(f, "({} + {}i)", re, im),
        }
    }
}

impl Value {
    #[inline]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    /// True for a usable (non-`Unknown`) value.
    #[inline]
    pub fn is_valid(&self) -> bool {
        !self.is_unknown()
    }

    #[inline]
    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int64(_) | Value::IntBig(_))
    }

    #[inline]
    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::Int64(_) | Value::IntBig(_) | Value::Rat(_) | Value::Float(_) | Value::Complex(..)
        )
    }

    /// The integer value as i64, if it is one and fits.
    pub fn int_val(&self) -> Option<i64> {
        match self {
            Value::Int64(i) => Some(*i),
            Value::IntBig(i) => i.to_i64(),
            _ => None,
        }
    }

    /// The untyped kind naturally carried by this value's representation.
    pub fn untyped_kind(&self) -> Kind {
        match self {
            Value::Unknown => Kind::Invalid,
            Value::Bool(_) => Kind::UntypedBool,
            Value::Str(_) => Kind::UntypedString,
            Value::Int64(_) | Value::IntBig(_) => Kind::UntypedInt,
            Value::Rat(_) | Value::Float(_) => Kind::UntypedFloat,
            Value::Complex(..) => Kind::UntypedComplex,
        }
    }
}

// ----------------------------------------------------------------------------
// Internal representation control

fn small_int(x: &BigInt) -> bool {
    x.bits() < MAX_EXP as u64
}

fn small_float(x: f64) -> bool {
    if x.is_infinite() {
        return false;
    }
    let exp = ((x.to_bits() >> 52) & 0x7ff) as i32 - 1023;
    -(MAX_EXP as i32) < exp && exp < MAX_EXP as i32
}

fn i64_to_big(x: i64) -> BigInt {
    BigInt::from(x)
}

fn i64_to_rat(x: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(x))
}

fn big_to_rat(x: &BigInt) -> BigRational {
    BigRational::from_integer(x.clone())
}

fn big_to_f64(x: &BigInt) -> f64 {
    x.to_f64().unwrap_or(f64::INFINITY)
}

fn rat_to_f64(x: &BigRational) -> f64 {
    let num = x.numer().to_f64().unwrap_or(f64::INFINITY);
    let den = x.denom().to_f64().unwrap_or(1.0);
    num / den
}

/// Demotes a BigInt result to Int64 when it fits.
fn make_int(x: BigInt) -> Value {
    match x.to_i64() {
        Some(i) => Value::Int64(i),
        None => Value::IntBig(x),
    }
}

/// Keeps a rational exact while its components are small, decays otherwise.
fn make_rat(x: BigRational) -> Value {
    if small_int(x.numer()) && small_int(x.denom()) {
        Value::Rat(x)
    } else {
        make_float(rat_to_f64(&x))
    }
}

fn make_float(x: f64) -> Value {
    if x.is_infinite() || x.is_nan() {
        return Value::Unknown;
    }
    // Normalize -0 to 0.
    Value::Float(if x == 0.0 { 0.0 } else { x })
}

// ----------------------------------------------------------------------------
// Factories

pub fn make_bool(b: bool) -> Value {
    Value::Bool(b)
}

pub fn make_string(s: impl Into<String>) -> Value {
    Value::Str(s.into())
}

pub fn make_int64(x: i64) -> Value {
    Value::Int64(x)
}

pub fn make_uint64(x: u64) -> Value {
    if x <= i64::MAX as u64 {
        Value::Int64(x as i64)
    } else {
        Value::IntBig(BigInt::from(x))
    }
}

pub fn make_float64(x: f64) -> Value {
    if x.is_infinite() || x.is_nan() {
        return Value::Unknown;
    }
    let x = if x == 0.0 { 0.0 } else { x };
    if small_float(x) {
        if let Some(r) = BigRational::from_float(x) {
            return Value::Rat(r);
        }
    }
    Value::Float(x)
}

pub fn make_complex(re: f64, im: f64) -> Value {
    if re.is_finite() && im.is_finite() {
        Value::Complex(re, im)
    } else {
        Value::Unknown
    }
}

/// The zero value of a basic kind.
pub fn zero_of(kind: Kind) -> Value {
    if kind.is_boolean() {
        Value::Bool(false)
    } else if kind.is_string() {
        Value::Str(String::new())
    } else if kind.is_integer() {
        Value::Int64(0)
    } else if kind.is_float() {
        Value::Rat(BigRational::zero())
    } else if kind.is_complex() {
        Value::Complex(0.0, 0.0)
    } else {
        Value::Unknown
    }
}

// ----------------------------------------------------------------------------
// Literal parsing

/// Parses a literal token into a constant value. `None` means the lexical
/// form is invalid for the token kind.
pub fn from_literal(lit: &str, op: Op) -> Option<Value> {
    match op {
        Op::IntLit => int_from_literal(lit),
        Op::FloatLit => float_from_literal(lit),
        Op::ImagLit => {
            let mantissa = lit.strip_suffix('i')?;
            let digits = mantissa.replace('_', "");
            let im = digits.parse::<f64>().ok()?;
            Some(make_complex(0.0, im))
        }
        Op::CharLit => unquote_char(lit).map(|c| Value::Int64(c as i64)),
        Op::StringLit => unquote_string(lit).map(Value::Str),
        _ => None,
    }
}

fn int_from_literal(lit: &str) -> Option<Value> {
    let lit = lit.replace('_', "");
    if lit.is_empty() {
        return None;
    }
    let (radix, digits) = match lit.get(..2) {
        Some("0x") | Some("0X") => (16, &lit[2..]),
        Some("0o") | Some("0O") => (8, &lit[2..]),
        Some("0b") | Some("0B") => (2, &lit[2..]),
        _ => (10, lit.as_str()),
    };
    if let Ok(x) = i64::from_str_radix(digits, radix) {
        return Some(Value::Int64(x));
    }
    BigInt::from_str_radix(digits, radix).ok().map(make_int)
}

fn float_from_literal(lit: &str) -> Option<Value> {
    let lit = lit.replace('_', "");
    let f = lit.parse::<f64>().ok()?;
    match make_float64(f) {
        Value::Unknown => None,
        v => Some(v),
    }
}

/// Decodes one escape sequence; `chars` is positioned after the backslash.
fn unescape(chars: &mut std::str::Chars<'_>) -> Option<char> {
    match chars.next()? {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '0' => Some('\0'),
        '\\' => Some('\\'),
        '\'' => Some('\''),
        '"' => Some('"'),
        'x' => {
            let hi = chars.next()?.to_digit(16)?;
            let lo = chars.next()?.to_digit(16)?;
            char::from_u32(hi * 16 + lo)
        }
        'u' => {
            let mut v = 0u32;
            for _ in 0..4 {
                v = v * 16 + chars.next()?.to_digit(16)?;
            }
            char::from_u32(v)
        }
        _ => None,
    }
}

/// Parses a quoted character literal (`'a'`, `'\n'`, `'é'`).
pub fn unquote_char(lit: &str) -> Option<char> {
    let inner = lit.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut chars = inner.chars();
    let c = match chars.next()? {
        '\\' => unescape(&mut chars)?,
        c => c,
    };
    if chars.next().is_some() {
        return None;
    }
    Some(c)
}

/// Parses a quoted string literal. Double quotes process escapes; backtick
/// raw strings are taken verbatim.
pub fn unquote_string(lit: &str) -> Option<String> {
    if let Some(inner) = lit.strip_prefix('`') {
        return inner.strip_suffix('`').map(str::to_string);
    }
    let inner = lit.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push(unescape(&mut chars)?),
            '"' => return None,
            c => out.push(c),
        }
    }
    Some(out)
}

// ----------------------------------------------------------------------------
// Representation matching

/// Ordering of representations for binary promotion.
fn ord(x: &Value) -> i32 {
    match x {
        Value::Unknown => 0,
        Value::Bool(_) | Value::Str(_) => 1,
        Value::Int64(_) => 2,
        Value::IntBig(_) => 3,
        Value::Rat(_) => 4,
        Value::Float(_) => 5,
        Value::Complex(..) => 6,
    }
}

/// Promotes x to the representation of target.
fn promote(x: Value, target: &Value) -> Value {
    match target {
        Value::IntBig(_) => match x {
            Value::Int64(i) => Value::IntBig(i64_to_big(i)),
            _ => x,
        },
        Value::Rat(_) => match x {
            Value::Int64(i) => Value::Rat(i64_to_rat(i)),
            Value::IntBig(i) => Value::Rat(big_to_rat(&i)),
            _ => x,
        },
        Value::Float(_) => match x {
            Value::Int64(i) => Value::Float(i as f64),
            Value::IntBig(i) => Value::Float(big_to_f64(&i)),
            Value::Rat(r) => Value::Float(rat_to_f64(&r)),
            _ => x,
        },
        Value::Complex(..) => match x {
            Value::Int64(i) => Value::Complex(i as f64, 0.0),
            Value::IntBig(i) => Value::Complex(big_to_f64(&i), 0.0),
            Value::Rat(r) => Value::Complex(rat_to_f64(&r), 0.0),
            Value::Float(f) => Value::Complex(f, 0.0),
            _ => x,
        },
        _ => x,
    }
}

/// Brings two values to a common representation (the more general one).
fn match_values(x: Value, y: Value) -> (Value, Value) {
    let (ox, oy) = (ord(&x), ord(&y));
    if ox < oy {
        let x = promote(x, &y);
        (x, y)
    } else if ox > oy {
        let y = promote(y, &x);
        (x, y)
    } else {
        (x, y)
    }
}

// ----------------------------------------------------------------------------
// Operations

/// Folds a unary expression `op y`. `prec`, when nonzero, bounds the result
/// of `^` (complement) to that many bits for unsigned operands.
pub fn unary_op(op: Op, y: &Value, prec: u32) -> Value {
    match op {
        Op::Add => y.clone(),
        Op::Sub => match y {
            Value::Int64(i) => match i.checked_neg() {
                Some(n) => Value::Int64(n),
                None => Value::IntBig(-i64_to_big(*i)),
            },
            Value::IntBig(i) => make_int(-i),
            Value::Rat(r) => make_rat(-r),
            Value::Float(f) => make_float(-f),
            Value::Complex(re, im) => Value::Complex(-re, -im),
            _ => Value::Unknown,
        },
        Op::Not => match y {
            Value::Bool(b) => Value::Bool(!b),
            _ => Value::Unknown,
        },
        Op::Xor => {
            let z = match y {
                Value::Int64(i) => !i64_to_big(*i),
                Value::IntBig(i) => !i.clone(),
                _ => return Value::Unknown,
            };
            let z = if prec > 0 {
                z & ((BigInt::from(1) << prec as usize) - 1)
            } else {
                z
            };
            make_int(z)
        }
        _ => Value::Unknown,
    }
}

/// Folds a binary expression `x op y`. Comparisons and shifts have their
/// own entry points.
pub fn binary_op(x: &Value, op: Op, y: &Value) -> Value {
    if x.is_unknown() || y.is_unknown() {
        return Value::Unknown;
    }
    let (x, y) = match_values(x.clone(), y.clone());
    match (&x, &y) {
        (Value::Bool(a), Value::Bool(b)) => match op {
            Op::LogAnd => Value::Bool(*a && *b),
            Op::LogOr => Value::Bool(*a || *b),
            _ => Value::Unknown,
        },

        (Value::Int64(a), Value::Int64(b)) => match op {
            Op::Add => a
                .checked_add(*b)
                .map(Value::Int64)
                .unwrap_or_else(|| make_int(i64_to_big(*a) + i64_to_big(*b))),
            Op::Sub => a
                .checked_sub(*b)
                .map(Value::Int64)
                .unwrap_or_else(|| make_int(i64_to_big(*a) - i64_to_big(*b))),
            Op::Mul => a
                .checked_mul(*b)
                .map(Value::Int64)
                .unwrap_or_else(|| make_int(i64_to_big(*a) * i64_to_big(*b))),
            Op::Quo => {
                if *b == 0 {
                    Value::Unknown
                } else {
                    // Division of untyped integers is exact.
                    make_rat(BigRational::new(i64_to_big(*a), i64_to_big(*b)))
                }
            }
            Op::Rem => {
                if *b == 0 {
                    Value::Unknown
                } else {
                    Value::Int64(a % b)
                }
            }
            Op::And => Value::Int64(a & b),
            Op::Or => Value::Int64(a | b),
            Op::Xor => Value::Int64(a ^ b),
            Op::AndNot => Value::Int64(a & !b),
            _ => Value::Unknown,
        },

        (Value::IntBig(a), Value::IntBig(b)) => match op {
            Op::Add => make_int(a + b),
            Op::Sub => make_int(a - b),
            Op::Mul => make_int(a * b),
            Op::Quo => {
                if b.is_zero() {
                    Value::Unknown
                } else {
                    make_rat(BigRational::new(a.clone(), b.clone()))
                }
            }
            Op::Rem => {
                if b.is_zero() {
                    Value::Unknown
                } else {
                    make_int(a % b)
                }
            }
            Op::And => make_int(a & b),
            Op::Or => make_int(a | b),
            Op::Xor => make_int(a ^ b),
            Op::AndNot => make_int(a & !b),
            _ => Value::Unknown,
        },

        (Value::Rat(a), Value::Rat(b)) => match op {
            Op::Add => make_rat(a + b),
            Op::Sub => make_rat(a - b),
            Op::Mul => make_rat(a * b),
            Op::Quo => {
                if b.is_zero() {
                    Value::Unknown
                } else {
                    make_rat(a / b)
                }
            }
            _ => Value::Unknown,
        },

        (Value::Float(a), Value::Float(b)) => match op {
            Op::Add => make_float(a + b),
            Op::Sub => make_float(a - b),
            Op::Mul => make_float(a * b),
            Op::Quo => make_float(a / b),
            _ => Value::Unknown,
        },

        (Value::Complex(ar, ai), Value::Complex(br, bi)) => match op {
            Op::Add => make_complex(ar + br, ai + bi),
            Op::Sub => make_complex(ar - br, ai - bi),
            _ => Value::Unknown,
        },

        (Value::Str(a), Value::Str(b)) => match op {
            Op::Add => Value::Str(format!("{}{}", a, b)),
            _ => Value::Unknown,
        },

        _ => Value::Unknown,
    }
}

/// Folds a shift `x op s`; `op` must be `Shl` or `Shr`.
pub fn shift(x: &Value, op: Op, s: u32) -> Value {
    if s == 0 {
        return x.clone();
    }
    match x {
        Value::Int64(i) => match op {
            Op::Shl => make_int(i64_to_big(*i) << s as usize),
            Op::Shr => Value::Int64(i >> s.min(63)),
            _ => Value::Unknown,
        },
        Value::IntBig(i) => match op {
            Op::Shl => make_int(i << s as usize),
            Op::Shr => make_int(i >> s as usize),
            _ => Value::Unknown,
        },
        _ => Value::Unknown,
    }
}

/// Evaluates a comparison `x op y`. False if either operand is `Unknown`.
pub fn compare(x: &Value, op: Op, y: &Value) -> bool {
    if x.is_unknown() || y.is_unknown() {
        return false;
    }
    let (x, y) = match_values(x.clone(), y.clone());
    match (&x, &y) {
        (Value::Bool(a), Value::Bool(b)) => match op {
            Op::Eq => a == b,
            Op::NotEq => a != b,
            _ => false,
        },
        (Value::Int64(a), Value::Int64(b)) => cmp_ord(a.cmp(b), op),
        (Value::IntBig(a), Value::IntBig(b)) => cmp_ord(a.cmp(b), op),
        (Value::Rat(a), Value::Rat(b)) => cmp_ord(a.cmp(b), op),
        (Value::Float(a), Value::Float(b)) => match a.partial_cmp(b) {
            Some(o) => cmp_ord(o, op),
            None => false,
        },
        (Value::Complex(ar, ai), Value::Complex(br, bi)) => match op {
            Op::Eq => ar == br && ai == bi,
            Op::NotEq => ar != br || ai != bi,
            _ => false,
        },
        (Value::Str(a), Value::Str(b)) => cmp_ord(a.cmp(b), op),
        _ => false,
    }
}

fn cmp_ord(o: std::cmp::Ordering, op: Op) -> bool {
    use std::cmp::Ordering;
    match op {
        Op::Eq => o == Ordering::Equal,
        Op::NotEq => o != Ordering::Equal,
        Op::Lt => o == Ordering::Less,
        Op::LtEq => o != Ordering::Greater,
        Op::Gt => o == Ordering::Greater,
        Op::GtEq => o != Ordering::Less,
        _ => false,
    }
}

/// -1, 0, or 1 by the sign of a numeric value; 1 for `Unknown` to avoid
/// spurious division-by-zero follow-ups.
pub fn sign(x: &Value) -> i32 {
    match x {
        Value::Int64(i) => (*i).signum() as i32,
        Value::IntBig(i) => match i.sign() {
            Sign::Minus => -1,
            Sign::NoSign => 0,
            Sign::Plus => 1,
        },
        Value::Rat(r) => {
            if r.is_negative() {
                -1
            } else if r.is_zero() {
                0
            } else {
                1
            }
        }
        Value::Float(f) => {
            if *f < 0.0 {
                -1
            } else if *f > 0.0 {
                1
            } else {
                0
            }
        }
        Value::Unknown => 1,
        _ => 0,
    }
}

// ----------------------------------------------------------------------------
// Conversions

/// Exact conversion to an integer representation; `Unknown` if the value is
/// not integral.
pub fn to_int(x: &Value) -> Value {
    match x {
        Value::Int64(_) | Value::IntBig(_) => x.clone(),
        Value::Rat(r) => {
            if r.is_integer() {
                make_int(r.numer().clone())
            } else {
                Value::Unknown
            }
        }
        Value::Float(f) => {
            if f.fract() == 0.0 && f.is_finite() {
                if let Some(i) = f.to_i64() {
                    return Value::Int64(i);
                }
                if let Some(r) = BigRational::from_float(*f) {
                    if r.is_integer() {
                        return make_int(r.numer().clone());
                    }
                }
            }
            Value::Unknown
        }
        _ => Value::Unknown,
    }
}

/// Conversion to a float representation; `Unknown` for non-numerics.
pub fn to_float(x: &Value) -> Value {
    match x {
        Value::Int64(i) => Value::Rat(i64_to_rat(*i)),
        Value::IntBig(i) => {
            if small_int(i) {
                Value::Rat(big_to_rat(i))
            } else {
                Value::Float(big_to_f64(i))
            }
        }
        Value::Rat(_) | Value::Float(_) => x.clone(),
        _ => Value::Unknown,
    }
}

/// Nearest f64 of a numeric value.
pub fn float64_val(x: &Value) -> f64 {
    match x {
        Value::Int64(i) => *i as f64,
        Value::IntBig(i) => big_to_f64(i),
        Value::Rat(r) => rat_to_f64(r),
        Value::Float(f) => *f,
        _ => 0.0,
    }
}

/// Why a constant conversion failed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ConstError {
    /// The value is of the right category but out of range (or would be
    /// truncated).
    Overflow,
    /// The value's category does not match the target kind at all.
    TypeMismatch,
}

impl fmt::Display for ConstError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstError::Overflow => write!(f, "constant overflows target type"),
            ConstError::TypeMismatch => write!(f, "constant type mismatch"),
        }
    }
}

impl Value {
    /// Whether the value can be represented by a basic kind on the given
    /// target. Writes the (possibly rounded) representation into `rounded`
    /// when provided. `Unknown` is representable everywhere to avoid
    /// follow-up errors.
    pub fn representable(&self, kind: Kind, target: Target, mut rounded: Option<&mut Value>) -> bool {
        if self.is_unknown() {
            return true;
        }
        if kind.is_boolean() {
            return self.is_bool();
        }
        if kind.is_string() {
            return self.is_string();
        }
        if kind.is_integer() {
            let iv = to_int(self);
            if let Some(r) = rounded.as_deref_mut() {
                if iv.is_valid() {
                    *r = iv.clone();
                }
            }
            return match &iv {
                Value::Int64(i) => int_fits(*i, kind, target),
                Value::IntBig(i) => big_fits(i, kind, target),
                _ => false,
            };
        }
        if kind.is_float() {
            if !matches!(
                self,
                Value::Int64(_) | Value::IntBig(_) | Value::Rat(_) | Value::Float(_)
            ) {
                return false;
            }
            let f = float64_val(self);
            return match kind {
                Kind::Float32 => {
                    let narrowed = f as f32;
                    let ok = narrowed.is_finite() || f.is_infinite();
                    if let Some(r) = rounded.as_deref_mut() {
                        *r = make_float64(narrowed as f64);
                    }
                    ok
                }
                _ => {
                    if let Some(r) = rounded.as_deref_mut() {
                        *r = to_float(self);
                    }
                    f.is_finite()
                }
            };
        }
        if kind.is_complex() {
            if !self.is_numeric() {
                return false;
            }
            if let Some(r) = rounded.as_deref_mut() {
                *r = match self {
                    Value::Complex(..) => self.clone(),
                    v => Value::Complex(float64_val(v), 0.0),
                };
            }
            return true;
        }
        false
    }

    /// Converts the value to the given basic kind, rounding integer and
    /// float representations as needed.
    pub fn convert_to(&self, kind: Kind, target: Target) -> Result<Value, ConstError> {
        if self.is_unknown() {
            return Ok(Value::Unknown);
        }
        // Category check first: a bool can never become an int, etc.
        let compatible = (kind.is_boolean() && self.is_bool())
            || (kind.is_string() && self.is_string())
            || (kind.is_numeric() && self.is_numeric() && !matches!(self, Value::Complex(..)))
            || (kind.is_complex() && self.is_numeric());
        if !compatible {
            return Err(ConstError::TypeMismatch);
        }
        let mut rounded = self.clone();
        if self.representable(kind, target, Some(&mut rounded)) {
            Ok(rounded)
        } else {
            Err(ConstError::Overflow)
        }
    }
}

fn int_fits(i: i64, kind: Kind, target: Target) -> bool {
    match kind {
        Kind::Int => target.is_64bit() || (i >= i32::MIN as i64 && i <= i32::MAX as i64),
        Kind::Int8 => i >= i8::MIN as i64 && i <= i8::MAX as i64,
        Kind::Int16 => i >= i16::MIN as i64 && i <= i16::MAX as i64,
        Kind::Int32 => i >= i32::MIN as i64 && i <= i32::MAX as i64,
        Kind::Int64 => true,
        Kind::Uint | Kind::Uintptr => i >= 0 && (target.is_64bit() || i <= u32::MAX as i64),
        Kind::Uint8 => i >= 0 && i <= u8::MAX as i64,
        Kind::Uint16 => i >= 0 && i <= u16::MAX as i64,
        Kind::Uint32 => i >= 0 && i <= u32::MAX as i64,
        Kind::Uint64 => i >= 0,
        Kind::UntypedInt | Kind::UntypedRune => true,
        _ => false,
    }
}

fn big_fits(i: &BigInt, kind: Kind, target: Target) -> bool {
    match kind {
        Kind::Int => {
            if target.is_64bit() {
                i.to_i64().is_some()
            } else {
                i.to_i32().is_some()
            }
        }
        Kind::Int8 => i.to_i8().is_some(),
        Kind::Int16 => i.to_i16().is_some(),
        Kind::Int32 => i.to_i32().is_some(),
        Kind::Int64 => i.to_i64().is_some(),
        Kind::Uint | Kind::Uintptr => {
            if target.is_64bit() {
                i.to_u64().is_some()
            } else {
                i.to_u32().is_some()
            }
        }
        Kind::Uint8 => i.to_u8().is_some(),
        Kind::Uint16 => i.to_u16().is_some(),
        Kind::Uint32 => i.to_u32().is_some(),
        Kind::Uint64 => i.to_u64().is_some(),
        Kind::UntypedInt | Kind::UntypedRune => true,
        _ => false,
    }
}
