// leaf conversions: untyped scalar -> typed scalar
use tracing::trace;

use crate::core::data::Data;
use crate::core::descriptor::{BaseKind, NumberKind, ScalarKind, TypeDescriptor};
use crate::core::value::Value;

/// Converts one untyped value to the target type, or reports no match with `None`.
///
/// Transformers must not guess: a value that does not fit exactly is no match.
pub trait Transformer: Send + Sync {
    fn transform(&self, target: &TypeDescriptor, value: &Value) -> Option<Data>;
}

impl<F> Transformer for F
where
    F: Fn(&TypeDescriptor, &Value) -> Option<Data> + Send + Sync,
{
    fn transform(&self, target: &TypeDescriptor, value: &Value) -> Option<Data> {
        self(target, value)
    }
}

fn scalar_kind(target: &TypeDescriptor) -> Option<&ScalarKind> {
    match target.kind() {
        BaseKind::Scalar(kind) => Some(kind),
        _ => None,
    }
}

/// Passes booleans and text through when the target already has that kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransformer;

impl Transformer for IdentityTransformer {
    fn transform(&self, target: &TypeDescriptor, value: &Value) -> Option<Data> {
        match (scalar_kind(target)?, value) {
            (ScalarKind::Bool, Value::Bool(b)) => Some(Data::Bool(*b)),
            (ScalarKind::Text, Value::Str(s)) => Some(Data::Text(s.clone())),
            _ => None,
        }
    }
}

/// Widens or narrows numbers into the target width. Out of range, fractional-to-integer
/// and inexact integer-to-float conversions are no match; an integer converts to a float
/// only if the cast loses nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberTransformer;

impl Transformer for NumberTransformer {
    fn transform(&self, target: &TypeDescriptor, value: &Value) -> Option<Data> {
        let ScalarKind::Number(kind) = scalar_kind(target)? else {
            return None;
        };
        let converted = match value {
            Value::Int(n) => from_int(*kind, *n),
            Value::UInt(n) => from_uint(*kind, *n),
            Value::Float(f) => from_float(*kind, *f),
            _ => None,
        };
        if converted.is_none() {
            trace!(ty = %target, ?value, "number does not fit");
        }
        converted
    }
}

fn from_int(kind: NumberKind, n: i64) -> Option<Data> {
    match kind {
        NumberKind::I8 => i8::try_from(n).ok().map(Data::I8),
        NumberKind::I16 => i16::try_from(n).ok().map(Data::I16),
        NumberKind::I32 => i32::try_from(n).ok().map(Data::I32),
        NumberKind::I64 => Some(Data::I64(n)),
        NumberKind::U8 => u8::try_from(n).ok().map(Data::U8),
        NumberKind::U16 => u16::try_from(n).ok().map(Data::U16),
        NumberKind::U32 => u32::try_from(n).ok().map(Data::U32),
        NumberKind::U64 => u64::try_from(n).ok().map(Data::U64),
        NumberKind::F32 => {
            let f = n as f32;
            (f as i128 == i128::from(n)).then_some(Data::F32(f))
        }
        NumberKind::F64 => {
            let f = n as f64;
            (f as i128 == i128::from(n)).then_some(Data::F64(f))
        }
    }
}

// readers only produce UInt above i64::MAX, anything smaller goes the signed way
fn from_uint(kind: NumberKind, n: u64) -> Option<Data> {
    if let Ok(signed) = i64::try_from(n) {
        return from_int(kind, signed);
    }
    match kind {
        NumberKind::U64 => Some(Data::U64(n)),
        NumberKind::F32 => {
            let f = n as f32;
            (f as u128 == u128::from(n)).then_some(Data::F32(f))
        }
        NumberKind::F64 => {
            let f = n as f64;
            (f as u128 == u128::from(n)).then_some(Data::F64(f))
        }
        _ => None,
    }
}

fn from_float(kind: NumberKind, f: f64) -> Option<Data> {
    match kind {
        NumberKind::F64 => Some(Data::F64(f)),
        NumberKind::F32 => {
            let narrowed = f as f32;
            (f.is_nan() || f64::from(narrowed) == f).then_some(Data::F32(narrowed))
        }
        NumberKind::U64 => {
            // anything integral in [0, 2^64) fits
            (f.fract() == 0.0 && f >= 0.0 && f < 18_446_744_073_709_551_616.0).then(|| Data::U64(f as u64))
        }
        _ => {
            if f.fract() != 0.0 || !(-9_223_372_036_854_775_808.0..9_223_372_036_854_775_808.0).contains(&f) {
                return None;
            }
            from_int(kind, f as i64)
        }
    }
}

/// Matches text against the exact, case-sensitive labels of an enum.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumTransformer;

impl Transformer for EnumTransformer {
    fn transform(&self, target: &TypeDescriptor, value: &Value) -> Option<Data> {
        match (scalar_kind(target)?, value) {
            (ScalarKind::Enum(enum_type), Value::Str(text)) => enum_type.label(text).map(Data::Enum),
            _ => None,
        }
    }
}

/// Identity, number and enum transformers, in that order.
pub fn default_transformers() -> Vec<Box<dyn Transformer>> {
    vec![
        Box::new(IdentityTransformer),
        Box::new(NumberTransformer),
        Box::new(EnumTransformer),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::descriptor::EnumType;

    fn number(kind: NumberKind) -> TypeDescriptor {
        TypeDescriptor::scalar(ScalarKind::Number(kind))
    }

    #[test]
    fn identity_only_passes_matching_kinds() {
        let text = TypeDescriptor::scalar(ScalarKind::Text);
        let flag = TypeDescriptor::scalar(ScalarKind::Bool);

        assert_eq!(IdentityTransformer.transform(&text, &Value::from("x")), Some(Data::Text("x".into())));
        assert_eq!(IdentityTransformer.transform(&flag, &Value::Bool(true)), Some(Data::Bool(true)));
        assert_eq!(IdentityTransformer.transform(&text, &Value::Int(3)), None);
        assert_eq!(IdentityTransformer.transform(&flag, &Value::from("true")), None);
    }

    #[test]
    fn numbers_narrow_only_when_in_range() {
        let t = NumberTransformer;

        assert_eq!(t.transform(&number(NumberKind::I8), &Value::Int(-128)), Some(Data::I8(-128)));
        assert_eq!(t.transform(&number(NumberKind::I8), &Value::Int(128)), None);
        assert_eq!(t.transform(&number(NumberKind::U16), &Value::Int(-1)), None);
        assert_eq!(t.transform(&number(NumberKind::U64), &Value::Int(i64::MAX)), Some(Data::U64(i64::MAX as u64)));
    }

    #[test]
    fn floats_convert_to_integers_only_without_fraction() {
        let t = NumberTransformer;

        assert_eq!(t.transform(&number(NumberKind::I32), &Value::Float(42.0)), Some(Data::I32(42)));
        assert_eq!(t.transform(&number(NumberKind::I32), &Value::Float(42.5)), None);
        assert_eq!(t.transform(&number(NumberKind::I64), &Value::Float(1e19)), None);
        assert_eq!(t.transform(&number(NumberKind::U64), &Value::Float(1e19)), Some(Data::U64(10_000_000_000_000_000_000)));
        assert_eq!(t.transform(&number(NumberKind::I16), &Value::Float(f64::NAN)), None);
    }

    #[test]
    fn widening_to_float_must_be_exact() {
        let t = NumberTransformer;

        assert_eq!(t.transform(&number(NumberKind::F64), &Value::Int(7)), Some(Data::F64(7.0)));
        assert_eq!(t.transform(&number(NumberKind::F32), &Value::Int(16_777_217)), None);
        assert_eq!(t.transform(&number(NumberKind::F32), &Value::Float(0.5)), Some(Data::F32(0.5)));
        assert_eq!(t.transform(&number(NumberKind::F32), &Value::Float(0.1)), None);
        //large but exactly representable
        assert_eq!(t.transform(&number(NumberKind::F64), &Value::Int(1 << 60)), Some(Data::F64(2f64.powi(60))));
        assert_eq!(t.transform(&number(NumberKind::F64), &Value::Int(i64::MAX)), None);
        assert_eq!(t.transform(&number(NumberKind::F64), &Value::Int((1 << 53) + 1)), None);
    }

    #[test]
    fn unsigned_values_above_i64_fit_only_u64_and_exact_floats() {
        let t = NumberTransformer;

        assert_eq!(t.transform(&number(NumberKind::U64), &Value::UInt(u64::MAX)), Some(Data::U64(u64::MAX)));
        assert_eq!(t.transform(&number(NumberKind::I64), &Value::UInt(u64::MAX)), None);
        assert_eq!(t.transform(&number(NumberKind::F64), &Value::UInt(1 << 63)), Some(Data::F64(2f64.powi(63))));
        assert_eq!(t.transform(&number(NumberKind::F64), &Value::UInt(u64::MAX)), None);
        assert_eq!(t.transform(&number(NumberKind::U8), &Value::UInt(200)), Some(Data::U8(200)));
    }

    #[test]
    fn enum_labels_match_exactly() {
        let modes = TypeDescriptor::scalar(ScalarKind::Enum(EnumType {
            name: "GameMode",
            labels: &["SURVIVAL", "CREATIVE"],
        }));

        assert_eq!(EnumTransformer.transform(&modes, &Value::from("CREATIVE")), Some(Data::Enum("CREATIVE")));
        assert_eq!(EnumTransformer.transform(&modes, &Value::from("creative")), None);
        assert_eq!(EnumTransformer.transform(&modes, &Value::from("ADVENTURE")), None);
    }

    #[test]
    fn closures_are_transformers() {
        let upper = |_: &TypeDescriptor, value: &Value| match value {
            Value::Str(s) => Some(Data::Text(s.to_uppercase())),
            _ => None,
        };
        let text = TypeDescriptor::scalar(ScalarKind::Text);

        assert_eq!(upper.transform(&text, &Value::from("ab")), Some(Data::Text("AB".into())));
    }
}
