use serde::{ser::Error, Serialize, Serializer};

/// Whole floats below this magnitude are written with plain digits
const PLAIN_LIMIT: f64 = 1e21;

/// Float that serializes without a fraction when it has none
///
/// `65.0` is written as `65`, `1e20` as `100000000000000000000` and `65.5`
/// as `65.5`. From `1e21` up the exponent form is used. Non-finite values
/// are an error, JSON has no representation for them.
///
/// Negative zero is written as `0`, the sign is not kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Number(pub f64);

impl Serialize for Number {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let n = self.0;
        if !n.is_finite() {
            return Err(S::Error::custom(format_args!("unsupported value: {n}")));
        }
        if n.fract() == 0.0 && n.abs() < PLAIN_LIMIT {
            // whole floats below 1e21 fit an i128 exactly
            serializer.serialize_i128(n as i128)
        } else {
            serializer.serialize_f64(n)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(65.0 => "65")]
    #[test_case(65.5 => "65.5")]
    #[test_case(0.0 => "0")]
    #[test_case(-2.0 => "-2")]
    #[test_case(-0.0 => "0"; "negative zero loses sign")]
    #[test_case(1e20 => "100000000000000000000"; "large whole")]
    #[test_case(-1e20 => "-100000000000000000000"; "large negative whole")]
    #[test_case(1e21 => "1e+21"; "exponent from 1e21")]
    fn whole_numbers(n: f64) -> String {
        serde_json::to_string(&Number(n)).unwrap()
    }

    #[test_case(f64::NAN)]
    #[test_case(f64::INFINITY)]
    #[test_case(f64::NEG_INFINITY)]
    fn non_finite(n: f64) {
        assert!(serde_json::to_string(&Number(n)).is_err());
    }
}
