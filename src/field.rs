//! Static metadata of the [`MashStep`](crate::MashStep) fields.
//!
//! Every field has a markup tag and a JSON key. Both serialization paths
//! walk [`MASH_STEP_FIELDS`] so they can never disagree on names or order.

use std::num::{ParseFloatError, ParseIntError};
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::number::Number;

/// A field of a [`MashStep`](crate::MashStep)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    Name,
    Version,
    Type,
    InfuseAmount,
    StepTemp,
    StepTime,
    RampTime,
    EndTemp,
    Description,
    WaterGrainRatio,
    DecoctionAmt,
    InfuseTemp,
    DisplayStepTemp,
    DisplayInfuseAmt,
}

bitflags! {
    /// Serialization flags of a field
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FieldFlags: u8 {
        /// The field is left out of JSON output when it holds its empty
        /// value. See [`FieldValue::is_empty`].
        const OMIT_EMPTY = 1 << 0;
        /// The format requires the field in every mash step.
        const REQUIRED   = 1 << 1;
        /// Display or derived field from the format extensions appendix.
        ///
        /// These are informational, never authoritative.
        const EXTENSION  = 1 << 2;
    }
}

const OPTIONAL: FieldFlags = FieldFlags::OMIT_EMPTY;
const REQUIRED: FieldFlags = FieldFlags::OMIT_EMPTY.union(FieldFlags::REQUIRED);
const EXTENSION: FieldFlags = FieldFlags::OMIT_EMPTY.union(FieldFlags::EXTENSION);

/// Names and flags of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: Field,
    /// Element tag in BeerXML markup
    pub markup: &'static str,
    /// Object key in JSON
    pub json: &'static str,
    pub flags: FieldFlags,
}

const fn spec(
    field: Field,
    markup: &'static str,
    json: &'static str,
    flags: FieldFlags,
) -> FieldSpec {
    FieldSpec {
        field,
        markup,
        json,
        flags,
    }
}

/// All the fields of a mash step, in output order.
pub const MASH_STEP_FIELDS: [FieldSpec; 14] = [
    spec(Field::Name, "NAME", "name", OPTIONAL),
    spec(Field::Version, "VERSION", "version", OPTIONAL),
    spec(Field::Type, "TYPE", "type", OPTIONAL),
    spec(Field::InfuseAmount, "INFUSE_AMOUNT", "infuse_amount", OPTIONAL),
    spec(Field::StepTemp, "STEP_TEMP", "step_temp", REQUIRED),
    spec(Field::StepTime, "STEP_TIME", "step_time", REQUIRED),
    spec(Field::RampTime, "RAMP_TIME", "ramp_time", OPTIONAL),
    spec(Field::EndTemp, "END_TEMP", "end_temp", OPTIONAL),
    spec(Field::Description, "DESCRIPTION", "description", EXTENSION),
    spec(Field::WaterGrainRatio, "WATER_GRAIN_RATIO", "water_grain_ratio", EXTENSION),
    spec(Field::DecoctionAmt, "DECOCTION_AMT", "decoction_amt", EXTENSION),
    spec(Field::InfuseTemp, "INFUSE_TEMP", "infuse_temp", EXTENSION),
    spec(Field::DisplayStepTemp, "DISPLAY_STEP_TEMP", "display_step_temp", EXTENSION),
    spec(Field::DisplayInfuseAmt, "DISPLAY_INFUSE_AMT", "display_infuse_amt", EXTENSION),
];

impl Field {
    /// Get the names and flags of the field
    pub fn spec(self) -> &'static FieldSpec {
        // the table is in declaration order
        &MASH_STEP_FIELDS[self as usize]
    }

    /// Find the field for a markup tag
    pub fn from_markup(tag: &str) -> Option<Self> {
        MASH_STEP_FIELDS
            .iter()
            .find(|s| s.markup == tag)
            .map(|s| s.field)
    }

    /// Find the field for a JSON key
    ///
    /// Keys are matched ignoring ASCII case, so `STEP_TEMP` and `Step_Temp`
    /// are also `step_temp`.
    pub fn from_json(key: &str) -> Option<Self> {
        MASH_STEP_FIELDS
            .iter()
            .find(|s| s.json.eq_ignore_ascii_case(key))
            .map(|s| s.field)
    }
}

/// A borrowed view of the value of a field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Int(i64),
    Float(f64),
    OptInt(Option<i64>),
    OptFloat(Option<f64>),
}

impl FieldValue<'_> {
    /// Check if the value is the empty value of its type
    ///
    /// Empty text, zero for plain numbers and [`None`] for optional ones.
    /// A present zero (`OptFloat(Some(0.0))`) is *not* empty.
    pub fn is_empty(&self) -> bool {
        match *self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Int(n) => n == 0,
            FieldValue::Float(n) => n == 0.0,
            FieldValue::OptInt(n) => n.is_none(),
            FieldValue::OptFloat(n) => n.is_none(),
        }
    }

    /// Check if the value exists at all
    ///
    /// Only optional values can be absent.
    pub fn is_present(&self) -> bool {
        !matches!(self, FieldValue::OptInt(None) | FieldValue::OptFloat(None))
    }
}

impl Serialize for FieldValue<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match *self {
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Int(n) | FieldValue::OptInt(Some(n)) => serializer.serialize_i64(n),
            FieldValue::Float(n) | FieldValue::OptFloat(Some(n)) => Number(n).serialize(serializer),
            FieldValue::OptInt(None) | FieldValue::OptFloat(None) => serializer.serialize_none(),
        }
    }
}

/// Error generated when a field value can't be read from text
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseFieldError {
    #[error("invalid integer '{text}' for {field}")]
    Int {
        field: Field,
        text: String,
        #[source]
        source: ParseIntError,
    },
    #[error("invalid number '{text}' for {field}")]
    Float {
        field: Field,
        text: String,
        #[source]
        source: ParseFloatError,
    },
}

/// Parse an integer field. Surrounding whitespace is ignored and empty text
/// is zero.
pub(crate) fn parse_int<T>(field: Field, text: &str) -> Result<T, ParseFieldError>
where
    T: FromStr<Err = ParseIntError> + Default,
{
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(T::default());
    }
    trimmed.parse().map_err(|source| ParseFieldError::Int {
        field,
        text: text.to_string(),
        source,
    })
}

/// Parse a float field. Surrounding whitespace is ignored and empty text is
/// zero.
pub(crate) fn parse_float(field: Field, text: &str) -> Result<f64, ParseFieldError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    trimmed.parse().map_err(|source| ParseFieldError::Float {
        field,
        text: text.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn table_follows_declaration_order() {
        for (i, spec) in MASH_STEP_FIELDS.iter().enumerate() {
            assert_eq!(spec.field as usize, i);
            assert_eq!(spec.field.spec(), spec);
        }
    }

    #[test]
    fn names_are_unique() {
        for (i, a) in MASH_STEP_FIELDS.iter().enumerate() {
            for b in &MASH_STEP_FIELDS[i + 1..] {
                assert_ne!(a.markup, b.markup);
                assert_ne!(a.json, b.json);
            }
        }
    }

    #[test]
    fn markup_tag_is_upper_json_key() {
        for spec in &MASH_STEP_FIELDS {
            assert_eq!(spec.markup, spec.json.to_uppercase());
            assert_eq!(spec.field.as_ref(), spec.json);
        }
    }

    #[test_case("STEP_TEMP" => Some(Field::StepTemp))]
    #[test_case("TYPE" => Some(Field::Type))]
    #[test_case("DISPLAY_INFUSE_AMT" => Some(Field::DisplayInfuseAmt))]
    #[test_case("step_temp" => None; "markup is case sensitive")]
    #[test_case("MASH_STEP" => None)]
    fn lookup_markup(tag: &str) -> Option<Field> {
        Field::from_markup(tag)
    }

    #[test_case("step_temp" => Some(Field::StepTemp))]
    #[test_case("type" => Some(Field::Type))]
    #[test_case("STEP_TEMP" => Some(Field::StepTemp); "json ignores case")]
    #[test_case("Display_Infuse_Amt" => Some(Field::DisplayInfuseAmt); "json mixed case")]
    #[test_case("steptemp" => None)]
    fn lookup_json(key: &str) -> Option<Field> {
        Field::from_json(key)
    }

    #[test]
    fn flags() {
        let required: Vec<_> = MASH_STEP_FIELDS
            .iter()
            .filter(|s| s.flags.contains(FieldFlags::REQUIRED))
            .map(|s| s.field)
            .collect();
        assert_eq!(required, vec![Field::StepTemp, Field::StepTime]);

        let extensions = MASH_STEP_FIELDS
            .iter()
            .filter(|s| s.flags.contains(FieldFlags::EXTENSION))
            .count();
        assert_eq!(extensions, 6);

        assert!(MASH_STEP_FIELDS
            .iter()
            .all(|s| s.flags.contains(FieldFlags::OMIT_EMPTY)));
    }

    #[test]
    fn empty_values() {
        assert!(FieldValue::Text("").is_empty());
        assert!(!FieldValue::Text("Mash in").is_empty());
        assert!(FieldValue::Int(0).is_empty());
        assert!(FieldValue::Float(0.0).is_empty());
        assert!(FieldValue::Float(-0.0).is_empty());
        assert!(!FieldValue::Float(f64::NAN).is_empty());
        assert!(FieldValue::OptFloat(None).is_empty());
        assert!(!FieldValue::OptFloat(Some(0.0)).is_empty());
        assert!(!FieldValue::OptInt(Some(0)).is_empty());
    }

    #[test]
    fn presence() {
        assert!(FieldValue::Int(0).is_present());
        assert!(FieldValue::OptInt(Some(0)).is_present());
        assert!(!FieldValue::OptInt(None).is_present());
        assert!(!FieldValue::OptFloat(None).is_present());
    }

    #[test_case(" 60 " => Ok(60))]
    #[test_case("" => Ok(0); "empty")]
    #[test_case("   " => Ok(0); "blank")]
    #[test_case("-5" => Ok(-5))]
    fn int_text(text: &str) -> Result<i64, ParseFieldError> {
        parse_int(Field::StepTime, text)
    }

    #[test]
    fn bad_int_text() {
        let err = parse_int::<i64>(Field::StepTime, "60.5").unwrap_err();
        assert!(matches!(
            err,
            ParseFieldError::Int { field: Field::StepTime, ref text, .. } if text == "60.5"
        ));
        assert_eq!(err.to_string(), "invalid integer '60.5' for step_time");
    }

    #[test]
    fn float_text() {
        assert_eq!(parse_float(Field::StepTemp, "65.5"), Ok(65.5));
        assert_eq!(parse_float(Field::StepTemp, "\n  66\n"), Ok(66.0));
        assert_eq!(parse_float(Field::StepTemp, ""), Ok(0.0));
        assert!(matches!(
            parse_float(Field::StepTemp, "hot"),
            Err(ParseFieldError::Float {
                field: Field::StepTemp,
                ..
            })
        ));
    }
}
