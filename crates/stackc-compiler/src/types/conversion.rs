//! Conversions between value types.
//!
//! Integer kinds (enums included) convert to each other without an
//! instruction: the VM keeps every integer in one stack slot and the
//! logical width only matters for loads and stores. Crossing between the
//! integer and floating families needs an explicit instruction.

use stackc_core::Type;

/// What converting a value requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Same representation; nothing to emit.
    Identity,
    IntToFloat,
    FloatToInt,
}

/// Find the conversion from `from` to `to`.
///
/// `explicit` is set for casts. `null_constant` is set when the value is
/// the literal `0`, which converts implicitly to any pointer type.
pub fn find_conversion(
    from: &Type,
    to: &Type,
    explicit: bool,
    null_constant: bool,
) -> Option<Conversion> {
    if from == to {
        return Some(Conversion::Identity);
    }

    match (from, to) {
        (Type::Struct(_), _) | (_, Type::Struct(_)) => None,
        _ if from.is_void() || to.is_void() => None,

        _ if from.is_integer() && to.is_integer() => Some(Conversion::Identity),
        _ if from.is_floating() && to.is_floating() => Some(Conversion::Identity),
        _ if from.is_integer() && to.is_floating() => Some(Conversion::IntToFloat),
        _ if from.is_floating() && to.is_integer() => Some(Conversion::FloatToInt),

        (Type::Pointer(_), Type::Pointer(_)) => {
            (explicit || from.is_void_pointer() || to.is_void_pointer())
                .then_some(Conversion::Identity)
        }
        (_, Type::Pointer(_)) if from.is_integer() => {
            (explicit || null_constant).then_some(Conversion::Identity)
        }
        (Type::Pointer(_), _) if to.is_integer() => explicit.then_some(Conversion::Identity),

        _ => None,
    }
}

/// Whether a value of type `from` may be used where `to` is expected.
pub fn is_implicitly_convertible(from: &Type, to: &Type) -> bool {
    find_conversion(from, to, false, false).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackc_core::{EnumId, PrimitiveKind, StructId};

    #[test]
    fn integers_and_enums_are_identity() {
        let short = Type::Primitive(PrimitiveKind::Short);
        let color = Type::Enum(EnumId(0));
        assert_eq!(
            find_conversion(&short, &Type::LONG, false, false),
            Some(Conversion::Identity)
        );
        assert_eq!(
            find_conversion(&color, &Type::INT, false, false),
            Some(Conversion::Identity)
        );
        assert_eq!(
            find_conversion(&Type::INT, &color, false, false),
            Some(Conversion::Identity)
        );
    }

    #[test]
    fn crossing_families_needs_instruction() {
        assert_eq!(
            find_conversion(&Type::INT, &Type::DOUBLE, false, false),
            Some(Conversion::IntToFloat)
        );
        assert_eq!(
            find_conversion(&Type::DOUBLE, &Type::CHAR, false, false),
            Some(Conversion::FloatToInt)
        );
    }

    #[test]
    fn pointer_rules() {
        let int_ptr = Type::INT.pointer_to();
        let char_ptr = Type::CHAR.pointer_to();
        let void_ptr = Type::VOID.pointer_to();

        assert!(is_implicitly_convertible(&int_ptr, &void_ptr));
        assert!(is_implicitly_convertible(&void_ptr, &char_ptr));
        assert!(!is_implicitly_convertible(&int_ptr, &char_ptr));
        assert!(find_conversion(&int_ptr, &char_ptr, true, false).is_some());
    }

    #[test]
    fn integer_pointer_mixing_is_explicit_except_null() {
        let int_ptr = Type::INT.pointer_to();
        assert!(!is_implicitly_convertible(&Type::INT, &int_ptr));
        assert!(find_conversion(&Type::INT, &int_ptr, false, true).is_some());
        assert!(find_conversion(&Type::LONG, &int_ptr, true, false).is_some());
        assert!(!is_implicitly_convertible(&int_ptr, &Type::LONG));
        assert!(find_conversion(&int_ptr, &Type::LONG, true, false).is_some());
    }

    #[test]
    fn structs_and_void_never_convert() {
        let s = Type::Struct(StructId(0));
        assert!(find_conversion(&s, &Type::INT, true, false).is_none());
        assert!(find_conversion(&Type::VOID, &Type::INT, true, false).is_none());
        assert_eq!(
            find_conversion(&s, &s, false, false),
            Some(Conversion::Identity)
        );
    }

    #[test]
    fn float_to_pointer_is_rejected() {
        let ptr = Type::INT.pointer_to();
        assert!(find_conversion(&Type::DOUBLE, &ptr, true, false).is_none());
    }
}
