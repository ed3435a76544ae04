//! Layout invariants of the fixed-point readouts for all inputs.

use lib::fixed::{signed_dec3, unsigned_bin8, SIGNED_OVERFLOW, UNSIGNED_OVERFLOW, WIDTH};

proptest::proptest! {
    #[test]
    fn signed_in_range_reads_back(value in -9999i32..=9999) {
        let out = signed_dec3(value);
        let text = out.as_str();
        assert_eq!(text.len(), WIDTH);
        assert_eq!(&text[2..3], ".");
        let sign = if value < 0 { "-" } else { " " };
        assert_eq!(&text[..1], sign);

        let digits: String = text[1..].chars().filter(|c| *c != '.').collect();
        assert_eq!(digits.parse::<i32>().unwrap(), value.abs());
    }

    #[test]
    fn signed_out_of_range_is_one_sentinel(value in proptest::prop_oneof![
        i32::MIN..=-10_000i32,
        10_000i32..=i32::MAX,
    ]) {
        let out = signed_dec3(value);
        assert!(out.is_overflow());
        assert_eq!(out.as_str(), SIGNED_OVERFLOW);
    }

    #[test]
    fn unsigned_is_within_half_a_hundredth_below(value in 0u32..256_000) {
        let out = unsigned_bin8(value);
        let text = out.as_str();
        assert_eq!(text.len(), WIDTH);
        assert_eq!(&text[3..4], ".");
        assert!(!out.is_overflow());

        let shown: f64 = text.trim_start().parse().unwrap();
        let exact = f64::from(value) / 256.0;
        // Rounded, except that the fraction saturates at .99
        assert!((shown - exact).abs() <= 0.005 + 1e-9 || (shown.fract() - 0.99).abs() < 1e-9);
        assert_eq!(shown.trunc() as u32, value >> 8);
    }

    #[test]
    fn unsigned_overflow_is_sentinel(value in 256_000u32..) {
        assert_eq!(unsigned_bin8(value).as_str(), UNSIGNED_OVERFLOW);
    }
}
