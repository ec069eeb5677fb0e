//! Mash step record

use std::fmt;

use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};

use crate::field::{
    parse_float, parse_int, Field, FieldFlags, FieldValue, ParseFieldError, MASH_STEP_FIELDS,
};

/// One step in a multi-step mash
///
/// A mash step is only meaningful inside a mash profile. Units are fixed by
/// the format: liters, degrees Celsius and minutes.
///
/// Optional numbers are [`Option`]s, so a present zero is never confused
/// with an absent value. Text fields are absent when empty.
///
/// Serialization to JSON omits every field holding its empty value, see
/// [`FieldValue::is_empty`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MashStep {
    /// Name of the step, usually descriptive like "Dough In" or "Conversion"
    pub name: String,
    /// Version of the record, should be [`MashStep::VERSION`]
    pub version: i32,
    /// Type of the step
    ///
    /// By convention one of "Infusion", "Temperature" or "Decoction", but any
    /// text is kept. See [`MashStep::step_type`] for a typed view.
    pub step_type: String,
    /// Volume of water to infuse in this step, in liters
    ///
    /// Only for infusion steps, though temperature steps may add water too.
    /// Decoction steps should not have it.
    pub infuse_amount: Option<f64>,
    /// Target temperature of the step, in degrees Celsius
    pub step_temp: f64,
    /// Minutes to hold the step temperature
    pub step_time: i64,
    /// Minutes to reach the step temperature
    pub ramp_time: Option<i64>,
    /// Temperature the mash is expected to fall to after a long step, in
    /// degrees Celsius
    pub end_temp: Option<f64>,

    // Extensions. Display text generated by a program or entered by a user,
    // units included.
    /// Description like "Infuse 4.5 gal of water at 170 F"
    pub description: String,
    /// Total water to grain ratio after this step, like "1.5 qt/lb"
    pub water_grain_ratio: String,
    /// Calculated volume of mash to decoct, like "7.5 l"
    pub decoction_amt: String,
    /// Calculated infusion temperature, like "68 C"
    pub infuse_temp: String,
    /// Step temperature in user units, like "154 F"
    pub display_step_temp: String,
    /// Infusion amount in user units, like "13 qt"
    pub display_infuse_amt: String,
}

/// Known values of [`MashStep::step_type`]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
pub enum MashStepType {
    /// Adding hot water
    Infusion,
    /// Heating with an outside heat source
    Temperature,
    /// Drawing off some mash for boiling
    Decoction,
}

impl MashStep {
    /// The only version of the record defined by the format
    pub const VERSION: i32 = 1;

    /// Markup element of a single step
    pub const MARKUP_TAG: &'static str = "MASH_STEP";

    /// Creates a new step with [`Self::VERSION`]
    pub fn new(
        name: impl Into<String>,
        step_type: MashStepType,
        step_temp: f64,
        step_time: i64,
    ) -> Self {
        Self {
            name: name.into(),
            version: Self::VERSION,
            step_type: step_type.to_string(),
            step_temp,
            step_time,
            ..Default::default()
        }
    }

    /// Get the type of the step if it is one of the known ones
    ///
    /// The comparison is case sensitive, the same as the format.
    pub fn step_type(&self) -> Option<MashStepType> {
        self.step_type.parse().ok()
    }

    /// Get the value of a field
    pub fn get(&self, field: Field) -> FieldValue<'_> {
        match field {
            Field::Name => FieldValue::Text(&self.name),
            Field::Version => FieldValue::Int(self.version.into()),
            Field::Type => FieldValue::Text(&self.step_type),
            Field::InfuseAmount => FieldValue::OptFloat(self.infuse_amount),
            Field::StepTemp => FieldValue::Float(self.step_temp),
            Field::StepTime => FieldValue::Int(self.step_time),
            Field::RampTime => FieldValue::OptInt(self.ramp_time),
            Field::EndTemp => FieldValue::OptFloat(self.end_temp),
            Field::Description => FieldValue::Text(&self.description),
            Field::WaterGrainRatio => FieldValue::Text(&self.water_grain_ratio),
            Field::DecoctionAmt => FieldValue::Text(&self.decoction_amt),
            Field::InfuseTemp => FieldValue::Text(&self.infuse_temp),
            Field::DisplayStepTemp => FieldValue::Text(&self.display_step_temp),
            Field::DisplayInfuseAmt => FieldValue::Text(&self.display_infuse_amt),
        }
    }

    /// Set a field from its text representation
    ///
    /// Text fields are stored as is. Numbers ignore surrounding whitespace
    /// and empty text is zero. Setting an optional number always makes it
    /// present.
    pub fn set_text(&mut self, field: Field, text: &str) -> Result<(), ParseFieldError> {
        match field {
            Field::Name => self.name = text.to_string(),
            Field::Version => self.version = parse_int(field, text)?,
            Field::Type => self.step_type = text.to_string(),
            Field::InfuseAmount => self.infuse_amount = Some(parse_float(field, text)?),
            Field::StepTemp => self.step_temp = parse_float(field, text)?,
            Field::StepTime => self.step_time = parse_int(field, text)?,
            Field::RampTime => self.ramp_time = Some(parse_int(field, text)?),
            Field::EndTemp => self.end_temp = Some(parse_float(field, text)?),
            Field::Description => self.description = text.to_string(),
            Field::WaterGrainRatio => self.water_grain_ratio = text.to_string(),
            Field::DecoctionAmt => self.decoction_amt = text.to_string(),
            Field::InfuseTemp => self.infuse_temp = text.to_string(),
            Field::DisplayStepTemp => self.display_step_temp = text.to_string(),
            Field::DisplayInfuseAmt => self.display_infuse_amt = text.to_string(),
        }
        Ok(())
    }

    /// Iterate over the fields that would be written to JSON
    pub fn json_fields(&self) -> impl Iterator<Item = (&'static str, FieldValue<'_>)> {
        MASH_STEP_FIELDS.iter().filter_map(move |spec| {
            let value = self.get(spec.field);
            if spec.flags.contains(FieldFlags::OMIT_EMPTY) && value.is_empty() {
                None
            } else {
                Some((spec.json, value))
            }
        })
    }
}

impl Serialize for MashStep {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in self.json_fields() {
            map.serialize_entry(key, &value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MashStep {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(MashStepVisitor)
    }
}

struct MashStepVisitor;

impl<'de> Visitor<'de> for MashStepVisitor {
    type Value = MashStep;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a mash step object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        // null leaves plain fields as they are and clears optional ones
        fn plain<T>(slot: &mut T, value: Option<T>) {
            if let Some(v) = value {
                *slot = v;
            }
        }

        let mut step = MashStep::default();
        while let Some(key) = map.next_key::<String>()? {
            let Some(field) = Field::from_json(&key) else {
                map.next_value::<serde::de::IgnoredAny>()?;
                continue;
            };
            match field {
                Field::Name => plain(&mut step.name, map.next_value()?),
                Field::Version => plain(&mut step.version, map.next_value()?),
                Field::Type => plain(&mut step.step_type, map.next_value()?),
                Field::InfuseAmount => step.infuse_amount = map.next_value()?,
                Field::StepTemp => plain(&mut step.step_temp, map.next_value()?),
                Field::StepTime => plain(&mut step.step_time, map.next_value()?),
                Field::RampTime => step.ramp_time = map.next_value()?,
                Field::EndTemp => step.end_temp = map.next_value()?,
                Field::Description => plain(&mut step.description, map.next_value()?),
                Field::WaterGrainRatio => plain(&mut step.water_grain_ratio, map.next_value()?),
                Field::DecoctionAmt => plain(&mut step.decoction_amt, map.next_value()?),
                Field::InfuseTemp => plain(&mut step.infuse_temp, map.next_value()?),
                Field::DisplayStepTemp => plain(&mut step.display_step_temp, map.next_value()?),
                Field::DisplayInfuseAmt => plain(&mut step.display_infuse_amt, map.next_value()?),
            }
        }
        Ok(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn full() -> MashStep {
        MashStep {
            name: "Conversion".into(),
            version: 1,
            step_type: "Infusion".into(),
            infuse_amount: Some(12.5),
            step_temp: 66.0,
            step_time: 60,
            ramp_time: Some(2),
            end_temp: Some(64.5),
            description: "Infuse 12.5 l of water at 73 C".into(),
            water_grain_ratio: "2.8 l/kg".into(),
            decoction_amt: "0 l".into(),
            infuse_temp: "73 C".into(),
            display_step_temp: "151 F".into(),
            display_infuse_amt: "13.2 qt".into(),
        }
    }

    #[test]
    fn only_step_temp() {
        let step = MashStep {
            step_temp: 65.0,
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&step).unwrap(), r#"{"step_temp":65}"#);
    }

    #[test]
    fn default_is_empty_object() {
        assert_eq!(
            serde_json::to_string(&MashStep::default()).unwrap(),
            "{}"
        );
    }

    #[test]
    fn keys_follow_table() {
        let value = serde_json::to_value(full()).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        let mut expected: Vec<&str> = MASH_STEP_FIELDS.iter().map(|s| s.json).collect();
        // serde_json sorts keys without preserve_order
        expected.sort_unstable();
        assert_eq!(keys, expected);

        let text = serde_json::to_string(&full()).unwrap();
        let positions: Vec<usize> = MASH_STEP_FIELDS
            .iter()
            .map(|s| text.find(&format!("\"{}\":", s.json)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn full_values() {
        assert_eq!(
            serde_json::to_value(full()).unwrap(),
            json!({
                "name": "Conversion",
                "version": 1,
                "type": "Infusion",
                "infuse_amount": 12.5,
                "step_temp": 66,
                "step_time": 60,
                "ramp_time": 2,
                "end_temp": 64.5,
                "description": "Infuse 12.5 l of water at 73 C",
                "water_grain_ratio": "2.8 l/kg",
                "decoction_amt": "0 l",
                "infuse_temp": "73 C",
                "display_step_temp": "151 F",
                "display_infuse_amt": "13.2 qt",
            })
        );
    }

    #[test]
    fn present_zero_is_not_absent() {
        let zero = MashStep {
            infuse_amount: Some(0.0),
            ..Default::default()
        };
        let absent = MashStep::default();
        assert_ne!(zero, absent);
        assert_eq!(serde_json::to_string(&zero).unwrap(), r#"{"infuse_amount":0}"#);
        assert_eq!(serde_json::to_string(&absent).unwrap(), "{}");
    }

    #[test]
    fn non_finite_fails() {
        let step = MashStep {
            end_temp: Some(f64::NAN),
            ..Default::default()
        };
        assert!(serde_json::to_string(&step).is_err());
    }

    #[test]
    fn decode() {
        let step: MashStep = serde_json::from_value(serde_json::to_value(full()).unwrap()).unwrap();
        assert_eq!(step, full());
    }

    #[test]
    fn decode_null_and_unknown() {
        let step: MashStep = serde_json::from_str(
            r#"{"name":null,"ramp_time":null,"end_temp":60,"unknown":{"a":[1,2]},"step_time":45}"#,
        )
        .unwrap();
        assert_eq!(
            step,
            MashStep {
                end_temp: Some(60.0),
                step_time: 45,
                ..Default::default()
            }
        );
    }

    #[test]
    fn decode_ignores_key_case() {
        let step: MashStep =
            serde_json::from_str(r#"{"STEP_TEMP":65,"Step_Time":30,"TYPE":"Decoction"}"#).unwrap();
        assert_eq!(step.step_temp, 65.0);
        assert_eq!(step.step_time, 30);
        assert_eq!(step.step_type(), Some(MashStepType::Decoction));
    }

    #[test]
    fn large_whole_temperature() {
        let step = MashStep {
            end_temp: Some(1e20),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&step).unwrap(),
            r#"{"end_temp":100000000000000000000}"#
        );
    }

    #[test]
    fn decode_type_mismatch() {
        assert!(serde_json::from_str::<MashStep>(r#"{"step_time":45.5}"#).is_err());
        assert!(serde_json::from_str::<MashStep>(r#"{"name":3}"#).is_err());
        assert!(serde_json::from_str::<MashStep>("[]").is_err());
    }

    #[test_case("Infusion" => Some(MashStepType::Infusion))]
    #[test_case("Temperature" => Some(MashStepType::Temperature))]
    #[test_case("Decoction" => Some(MashStepType::Decoction))]
    #[test_case("infusion" => None; "case sensitive")]
    #[test_case("" => None; "empty")]
    #[test_case("Step" => None; "free text")]
    fn step_type(text: &str) -> Option<MashStepType> {
        MashStep {
            step_type: text.into(),
            ..Default::default()
        }
        .step_type()
    }

    #[test]
    fn new_step() {
        let step = MashStep::new("Mash Out", MashStepType::Temperature, 76.0, 10);
        assert_eq!(step.version, MashStep::VERSION);
        assert_eq!(step.step_type, "Temperature");
        assert_eq!(step.step_type(), Some(MashStepType::Temperature));
        assert_eq!(step.infuse_amount, None);
    }

    #[test]
    fn set_and_get() {
        let mut step = MashStep::default();
        for spec in &MASH_STEP_FIELDS {
            let previous = step.clone();
            step.set_text(spec.field, "").unwrap();
            let before = previous.get(spec.field);
            let after = step.get(spec.field);
            assert!(after.is_present());
            if before.is_present() {
                assert_eq!(before, after);
            }
        }
        assert_eq!(step.infuse_amount, Some(0.0));
        assert_eq!(step.ramp_time, Some(0));

        step.set_text(Field::StepTemp, " 67.5 ").unwrap();
        step.set_text(Field::Type, "Decoction").unwrap();
        step.set_text(Field::Description, "  kept as is ").unwrap();
        assert_eq!(step.get(Field::StepTemp), FieldValue::Float(67.5));
        assert_eq!(step.get(Field::Type), FieldValue::Text("Decoction"));
        assert_eq!(step.description, "  kept as is ");

        assert!(step.set_text(Field::Version, "one").is_err());
        assert!(step.set_text(Field::RampTime, "1.5").is_err());
        assert_eq!(step.ramp_time, Some(0));
    }
}
