//! Ordered collection of mash steps

use std::ops::{Deref, DerefMut};

use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize, Serializer};

use crate::{error::EncodeError, MashStep};

/// The steps of a mash profile, in order
///
/// In markup this is the [`Self::MARKUP_TAG`] element holding one
/// [`MashStep::MARKUP_TAG`] per step. In JSON it is an array of step objects.
///
/// Decoding from JSON is a no-op. See [`MashSteps::decode_json`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MashSteps {
    /// The steps
    pub mash_step: Vec<MashStep>,
}

impl MashSteps {
    /// Markup element wrapping the steps
    pub const MARKUP_TAG: &'static str = "MASH_STEPS";

    /// Key of the steps in a JSON document
    pub const JSON_KEY: &'static str = "mash_step";

    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode the steps as a JSON array
    ///
    /// The output is `[]` when there are no steps, otherwise every step
    /// object separated by a single comma. If any step fails to encode, the
    /// error is returned and nothing else.
    #[tracing::instrument(level = "debug", name = "encode", skip_all, fields(steps = self.mash_step.len()))]
    pub fn to_json(&self) -> Result<Vec<u8>, EncodeError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Same as [`Self::to_json`] but returns a [`String`]
    pub fn to_json_string(&self) -> Result<String, EncodeError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode the steps from JSON.
    ///
    /// **This does nothing.** The input is not parsed, the steps are left
    /// as they were and no error is ever reported, whatever the input is.
    /// Use the markup format to read steps.
    pub fn decode_json(&mut self, input: &[u8]) {
        tracing::debug!(
            len = input.len(),
            steps = self.mash_step.len(),
            "mash steps are not decoded from JSON, input ignored"
        );
    }
}

impl Deref for MashSteps {
    type Target = Vec<MashStep>;

    fn deref(&self) -> &Self::Target {
        &self.mash_step
    }
}

impl DerefMut for MashSteps {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.mash_step
    }
}

impl From<Vec<MashStep>> for MashSteps {
    fn from(mash_step: Vec<MashStep>) -> Self {
        Self { mash_step }
    }
}

impl FromIterator<MashStep> for MashSteps {
    fn from_iter<T: IntoIterator<Item = MashStep>>(iter: T) -> Self {
        Self {
            mash_step: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for MashSteps {
    type Item = MashStep;
    type IntoIter = std::vec::IntoIter<MashStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.mash_step.into_iter()
    }
}

impl<'a> IntoIterator for &'a MashSteps {
    type Item = &'a MashStep;
    type IntoIter = std::slice::Iter<'a, MashStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.mash_step.iter()
    }
}

impl Serialize for MashSteps {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(&self.mash_step)
    }
}

/// Same contract as [`MashSteps::decode_json`]: the value is read and
/// discarded, the result is always empty.
impl<'de> Deserialize<'de> for MashSteps {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_ignored_any(IgnoredAny)?;
        Ok(Self::default())
    }
}
