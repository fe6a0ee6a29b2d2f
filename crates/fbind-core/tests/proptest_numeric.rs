#![forbid(unsafe_code)]

//! Property tests for canonical numeric conversion.
//!
//! Integer fields must survive a trip through the canonical `f64` unchanged
//! whenever the value is exactly representable, and float → integer must
//! always truncate toward zero within the width's bounds.

use fbind_core::numeric::{FloatWidth, IntWidth, Numeric, NumericKind};
use proptest::prelude::*;

const F64_EXACT: i64 = 1 << 53;

proptest! {
    #[test]
    fn i32_round_trips(v in any::<i32>()) {
        let n = Numeric::new(v);
        let back = Numeric::from_canonical(n.to_canonical(), n.kind());
        prop_assert_eq!(back.get::<i32>(), Some(v));
    }

    #[test]
    fn u16_round_trips(v in any::<u16>()) {
        let n = Numeric::new(v);
        let back = Numeric::from_canonical(n.to_canonical(), n.kind());
        prop_assert_eq!(back, n);
    }

    #[test]
    fn i64_round_trips_when_exact(v in -F64_EXACT..=F64_EXACT) {
        let n = Numeric::new(v);
        let back = Numeric::from_canonical(n.to_canonical(), n.kind());
        prop_assert_eq!(back.get::<i64>(), Some(v));
    }

    #[test]
    fn f32_round_trips(v in any::<f32>().prop_filter("finite", |v| v.is_finite())) {
        let n = Numeric::new(v);
        let back = Numeric::from_canonical(n.to_canonical(), NumericKind::Float(FloatWidth::F32));
        prop_assert_eq!(back.get::<f32>(), Some(v));
    }

    #[test]
    fn float_to_i32_truncates_toward_zero(v in -1.0e6f64..1.0e6) {
        let n = Numeric::from_canonical(v, NumericKind::Signed(IntWidth::W32));
        let got = n.get::<i32>().expect("kind matches");
        prop_assert_eq!(f64::from(got), v.trunc());
    }

    #[test]
    fn float_to_u8_stays_in_bounds(v in any::<f64>()) {
        let n = Numeric::from_canonical(v, NumericKind::Unsigned(IntWidth::W8));
        let got = n.get::<u8>().expect("kind matches");
        if v.is_nan() || v <= 0.0 {
            prop_assert_eq!(got, 0);
        } else if v >= 255.0 {
            prop_assert_eq!(got, u8::MAX);
        } else {
            prop_assert_eq!(f64::from(got), v.trunc());
        }
    }
}
