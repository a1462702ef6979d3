//! Built-in operators.
//!
//! Integer arithmetic wraps on overflow. `Byte` and `Short` operands are
//! widened to `Int` first, and mixed operands widen to the larger of the two
//! types, like the source language's primitive operator overloads.

use std::cmp::Ordering;

use kiln_ir::{Constant, Intrinsic};

use crate::{ExecutionFailure, Value};

#[derive(Copy, Clone, Debug)]
enum Num {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl Num {
    fn of(c: &Constant) -> Option<Num> {
        Some(match c {
            Constant::Byte(v) => Num::I32(i32::from(*v)),
            Constant::Short(v) => Num::I32(i32::from(*v)),
            Constant::Int(v) => Num::I32(*v),
            Constant::Long(v) => Num::I64(*v),
            Constant::Float(bits) => Num::F32(f32::from_bits(*bits)),
            Constant::Double(bits) => Num::F64(f64::from_bits(*bits)),
            _ => return None,
        })
    }

    fn rank(self) -> u8 {
        match self {
            Num::I32(_) => 0,
            Num::I64(_) => 1,
            Num::F32(_) => 2,
            Num::F64(_) => 3,
        }
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "widening follows the source language's numeric conversions"
    )]
    fn widen_to(self, rank: u8) -> Num {
        match (self, rank) {
            (Num::I32(v), 1) => Num::I64(i64::from(v)),
            (Num::I32(v), 2) => Num::F32(v as f32),
            (Num::I32(v), 3) => Num::F64(f64::from(v)),
            (Num::I64(v), 2) => Num::F32(v as f32),
            (Num::I64(v), 3) => Num::F64(v as f64),
            (Num::F32(v), 3) => Num::F64(f64::from(v)),
            (same, _) => same,
        }
    }

    fn promote(a: Num, b: Num) -> (Num, Num) {
        let rank = a.rank().max(b.rank());
        (a.widen_to(rank), b.widen_to(rank))
    }
}

fn mismatch() -> ExecutionFailure {
    ExecutionFailure::TypeMismatch("operand types")
}

fn arity() -> ExecutionFailure {
    ExecutionFailure::TypeMismatch("operand count")
}

fn primitive(value: &Value) -> Result<&Constant, ExecutionFailure> {
    value.as_primitive().ok_or_else(mismatch)
}

fn number(value: &Value) -> Result<Num, ExecutionFailure> {
    Num::of(primitive(value)?).ok_or_else(mismatch)
}

fn boolean(value: &Value) -> Result<bool, ExecutionFailure> {
    value.as_bool().ok_or_else(mismatch)
}

/// Apply `op` to `operands` (receiver first).
///
/// `array` resolves a complex value to the elements of an array in the
/// evaluator's heap.
pub(super) fn apply<'h>(
    op: Intrinsic,
    operands: &[Value],
    array: impl Fn(&Value) -> Option<&'h [Value]>,
) -> Result<Value, ExecutionFailure> {
    match (op, operands) {
        (Intrinsic::UnaryMinus, [a]) => negate(number(a)?).map(Value::Primitive),
        (Intrinsic::Not, [a]) => Ok(Value::boolean(!boolean(a)?)),
        (Intrinsic::ToString, [a]) => Ok(Value::Primitive(Constant::string(&stringify(a)?))),
        (Intrinsic::ArraySize, [a]) => {
            let elements = array(a).ok_or_else(mismatch)?;
            let len = i32::try_from(elements.len()).map_err(|_| mismatch())?;
            Ok(Value::int(len))
        }
        (Intrinsic::ArrayGet, [a, index]) => {
            let elements = array(a).ok_or_else(mismatch)?;
            let Constant::Int(i) = primitive(index)? else {
                return Err(mismatch());
            };
            usize::try_from(*i)
                .ok()
                .and_then(|i| elements.get(i))
                .cloned()
                .ok_or_else(|| {
                    ExecutionFailure::Thrown(format!(
                        "java.lang.ArrayIndexOutOfBoundsException: Index {i} out of bounds for length {}",
                        elements.len()
                    ))
                })
        }
        (Intrinsic::And, [a, b]) => Ok(Value::boolean(boolean(a)? && boolean(b)?)),
        (Intrinsic::Or, [a, b]) => Ok(Value::boolean(boolean(a)? || boolean(b)?)),
        (Intrinsic::Equals, [a, b]) => Ok(Value::boolean(equals(a, b))),
        (Intrinsic::NotEquals, [a, b]) => Ok(Value::boolean(!equals(a, b))),
        (Intrinsic::Less, [a, b]) => compare(a, b).map(|o| Value::boolean(o == Some(Ordering::Less))),
        (Intrinsic::LessOrEqual, [a, b]) => compare(a, b).map(|o| {
            Value::boolean(matches!(o, Some(Ordering::Less | Ordering::Equal)))
        }),
        (Intrinsic::Greater, [a, b]) => {
            compare(a, b).map(|o| Value::boolean(o == Some(Ordering::Greater)))
        }
        (Intrinsic::GreaterOrEqual, [a, b]) => compare(a, b).map(|o| {
            Value::boolean(matches!(o, Some(Ordering::Greater | Ordering::Equal)))
        }),
        (Intrinsic::Plus, [a, b]) => {
            if let Some(Constant::String(lhs)) = a.as_primitive() {
                let joined = format!("{lhs}{}", stringify(b)?);
                return Ok(Value::Primitive(Constant::string(&joined)));
            }
            arithmetic(op, number(a)?, number(b)?).map(Value::Primitive)
        }
        (Intrinsic::Minus | Intrinsic::Times | Intrinsic::Div | Intrinsic::Rem, [a, b]) => {
            arithmetic(op, number(a)?, number(b)?).map(Value::Primitive)
        }
        _ => Err(arity()),
    }
}

fn negate(n: Num) -> Result<Constant, ExecutionFailure> {
    Ok(match n {
        Num::I32(v) => Constant::Int(v.wrapping_neg()),
        Num::I64(v) => Constant::Long(v.wrapping_neg()),
        Num::F32(v) => Constant::float(-v),
        Num::F64(v) => Constant::double(-v),
    })
}

fn arithmetic(op: Intrinsic, a: Num, b: Num) -> Result<Constant, ExecutionFailure> {
    match Num::promote(a, b) {
        (Num::I32(x), Num::I32(y)) => {
            if y == 0 && matches!(op, Intrinsic::Div | Intrinsic::Rem) {
                return Err(ExecutionFailure::division_by_zero());
            }
            Ok(Constant::Int(match op {
                Intrinsic::Plus => x.wrapping_add(y),
                Intrinsic::Minus => x.wrapping_sub(y),
                Intrinsic::Times => x.wrapping_mul(y),
                Intrinsic::Div => x.wrapping_div(y),
                Intrinsic::Rem => x.wrapping_rem(y),
                _ => return Err(mismatch()),
            }))
        }
        (Num::I64(x), Num::I64(y)) => {
            if y == 0 && matches!(op, Intrinsic::Div | Intrinsic::Rem) {
                return Err(ExecutionFailure::division_by_zero());
            }
            Ok(Constant::Long(match op {
                Intrinsic::Plus => x.wrapping_add(y),
                Intrinsic::Minus => x.wrapping_sub(y),
                Intrinsic::Times => x.wrapping_mul(y),
                Intrinsic::Div => x.wrapping_div(y),
                Intrinsic::Rem => x.wrapping_rem(y),
                _ => return Err(mismatch()),
            }))
        }
        (Num::F32(x), Num::F32(y)) => Ok(Constant::float(match op {
            Intrinsic::Plus => x + y,
            Intrinsic::Minus => x - y,
            Intrinsic::Times => x * y,
            Intrinsic::Div => x / y,
            Intrinsic::Rem => x % y,
            _ => return Err(mismatch()),
        })),
        (Num::F64(x), Num::F64(y)) => Ok(Constant::double(match op {
            Intrinsic::Plus => x + y,
            Intrinsic::Minus => x - y,
            Intrinsic::Times => x * y,
            Intrinsic::Div => x / y,
            Intrinsic::Rem => x % y,
            _ => return Err(mismatch()),
        })),
        _ => Err(mismatch()),
    }
}

fn compare(a: &Value, b: &Value) -> Result<Option<Ordering>, ExecutionFailure> {
    match (primitive(a)?, primitive(b)?) {
        (Constant::String(x), Constant::String(y)) => Ok(Some(x.cmp(y))),
        (Constant::Char(x), Constant::Char(y)) => Ok(Some(x.cmp(y))),
        (x, y) => {
            let (x, y) = Num::promote(
                Num::of(x).ok_or_else(mismatch)?,
                Num::of(y).ok_or_else(mismatch)?,
            );
            Ok(match (x, y) {
                (Num::I32(x), Num::I32(y)) => Some(x.cmp(&y)),
                (Num::I64(x), Num::I64(y)) => Some(x.cmp(&y)),
                (Num::F32(x), Num::F32(y)) => x.partial_cmp(&y),
                (Num::F64(x), Num::F64(y)) => x.partial_cmp(&y),
                _ => None,
            })
        }
    }
}

/// `==`: numeric equality across widths, structural for other literals,
/// identity for objects.
fn equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Primitive(x), Value::Primitive(y)) => match (Num::of(x), Num::of(y)) {
            (Some(x), Some(y)) => matches!(compare_nums(x, y), Some(Ordering::Equal)),
            _ => x == y,
        },
        (Value::Complex { handle: x, .. }, Value::Complex { handle: y, .. }) => x == y,
        _ => false,
    }
}

fn compare_nums(a: Num, b: Num) -> Option<Ordering> {
    match Num::promote(a, b) {
        (Num::I32(x), Num::I32(y)) => Some(x.cmp(&y)),
        (Num::I64(x), Num::I64(y)) => Some(x.cmp(&y)),
        (Num::F32(x), Num::F32(y)) => x.partial_cmp(&y),
        (Num::F64(x), Num::F64(y)) => x.partial_cmp(&y),
        _ => None,
    }
}

/// `toString()` of a primitive, as the runtime would print it.
fn stringify(value: &Value) -> Result<String, ExecutionFailure> {
    Ok(match primitive(value)? {
        Constant::Null => "null".to_owned(),
        Constant::Boolean(b) => b.to_string(),
        Constant::Char(c) => c.to_string(),
        Constant::Byte(v) => v.to_string(),
        Constant::Short(v) => v.to_string(),
        Constant::Int(v) => v.to_string(),
        Constant::Long(v) => v.to_string(),
        Constant::Float(bits) => floating(format!("{:?}", f32::from_bits(*bits))),
        Constant::Double(bits) => floating(format!("{:?}", f64::from_bits(*bits))),
        Constant::String(s) => s.to_string(),
    })
}

/// Rust's float `Debug` form, with the runtime's spelling of infinities
/// and exponents (`1e20` prints as `1.0E20`).
fn floating(debug: String) -> String {
    match debug.as_str() {
        "inf" => return "Infinity".to_owned(),
        "-inf" => return "-Infinity".to_owned(),
        _ => {}
    }
    match debug.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => format!("{mantissa}E{exponent}"),
        Some((mantissa, exponent)) => format!("{mantissa}.0E{exponent}"),
        None => debug,
    }
}
