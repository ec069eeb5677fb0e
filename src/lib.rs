//! [BeerXML](http://www.beerxml.com/) mash step records.
//!
//! A mash step is a record used inside a mash profile to denote one step of
//! a multi-step mash. This crate holds the record, [`MashStep`], and the
//! ordered container a mash profile keeps them in, [`MashSteps`].
//!
//! Both map to two formats:
//! - JSON, through [`serde`]. Fields holding their empty value are omitted.
//! - BeerXML markup, through the [`xml`] module.
//!
//! The tag and key of every field come from a single table, see
//! [`field::MASH_STEP_FIELDS`].
//!
//! # Basic usage
//!
//! ```rust
//! # use beerxml::{MashStep, MashStepType, MashSteps};
//! let mut steps = MashSteps::new();
//! steps.push(MashStep::new("Conversion", MashStepType::Infusion, 66.0, 60));
//!
//! let json = steps.to_json_string()?;
//! assert_eq!(
//!     json,
//!     r#"[{"name":"Conversion","version":1,"type":"Infusion","step_temp":66,"step_time":60}]"#
//! );
//! # Ok::<(), beerxml::error::EncodeError>(())
//! ```
//!
//! Decoding a [`MashSteps`] from JSON is intentionally a no-op, see
//! [`MashSteps::decode_json`].

#![warn(rustdoc::broken_intra_doc_links, clippy::doc_markdown)]

#[cfg(doc)]
pub mod _features {
    //! This lib has 1 feature, enabled by default:
    //! - `xml`. Enables the [`xml`](crate::xml) module to read and write
    //!   BeerXML markup.
}

pub mod error;
pub mod field;
pub mod mash_step;
pub mod mash_steps;
#[cfg(feature = "xml")]
pub mod xml;

mod number;

pub use error::EncodeError;
pub use field::{Field, FieldFlags, FieldSpec, FieldValue};
pub use mash_step::{MashStep, MashStepType};
pub use mash_steps::MashSteps;
