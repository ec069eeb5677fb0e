//! BeerXML markup reader and writer
//!
//! This module is only available with the `xml` [feature](crate::_features).
//!
//! The element names come from the [field table](crate::field::MASH_STEP_FIELDS).
//! A collection is written as:
//!
//! ```xml
//! <MASH_STEPS>
//!   <MASH_STEP>
//!     <NAME>Conversion</NAME>
//!     <VERSION>1</VERSION>
//!     <TYPE>Infusion</TYPE>
//!     <STEP_TEMP>66</STEP_TEMP>
//!     <STEP_TIME>60</STEP_TIME>
//!     ...
//!   </MASH_STEP>
//! </MASH_STEPS>
//! ```
//!
//! Markup has no omit-empty rule: empty text and zero numbers are written.
//! Only absent optional numbers are left out.

use std::borrow::Cow;

use quick_xml::{
    events::{BytesEnd, BytesStart, BytesText, Event},
    Reader, Writer,
};
use thiserror::Error;

use crate::{
    field::{FieldFlags, FieldValue, ParseFieldError, MASH_STEP_FIELDS},
    Field, MashStep, MashSteps,
};

/// Options for [`to_writer`] and the other writing functions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Spaces to indent every level with. [`None`] writes everything in one
    /// line.
    pub indent: Option<usize>,
    /// Write the extension fields
    ///
    /// These are the display and derived fields, see
    /// [`FieldFlags::EXTENSION`].
    pub extensions: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            indent: None,
            extensions: true,
        }
    }
}

/// Error generated by the functions of this module
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("Error reading markup: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("Error writing markup: {0}")]
    Io(#[from] std::io::Error),
    #[error("Expected <{expected}> element, found <{found}>")]
    UnexpectedRoot {
        expected: &'static str,
        found: String,
    },
    #[error("Missing <{expected}> element")]
    MissingRoot { expected: &'static str },
    #[error("Unexpected end of input inside <{element}>")]
    UnexpectedEof { element: String },
    #[error("Invalid value in <{tag}>: {source}")]
    InvalidValue {
        tag: &'static str,
        #[source]
        source: ParseFieldError,
    },
}

/// Write a [`MashSteps`] as a [`MashSteps::MARKUP_TAG`] element
pub fn to_writer(
    steps: &MashSteps,
    writer: impl std::io::Write,
    options: &WriteOptions,
) -> Result<(), XmlError> {
    let mut w = new_writer(writer, options);
    w.write_event(Event::Start(BytesStart::new(MashSteps::MARKUP_TAG)))?;
    for step in steps {
        write_step(&mut w, step, options)?;
    }
    w.write_event(Event::End(BytesEnd::new(MashSteps::MARKUP_TAG)))?;
    Ok(())
}

/// Write a [`MashSteps`] to a [`String`]
pub fn to_string(steps: &MashSteps, options: &WriteOptions) -> Result<String, XmlError> {
    let mut buffer = Vec::new();
    to_writer(steps, &mut buffer, options)?;
    Ok(into_string(buffer))
}

/// Write a single [`MashStep`] as a [`MashStep::MARKUP_TAG`] element
pub fn step_to_writer(
    step: &MashStep,
    writer: impl std::io::Write,
    options: &WriteOptions,
) -> Result<(), XmlError> {
    let mut w = new_writer(writer, options);
    write_step(&mut w, step, options)
}

/// Write a single [`MashStep`] to a [`String`]
pub fn step_to_string(step: &MashStep, options: &WriteOptions) -> Result<String, XmlError> {
    let mut buffer = Vec::new();
    step_to_writer(step, &mut buffer, options)?;
    Ok(into_string(buffer))
}

fn into_string(buffer: Vec<u8>) -> String {
    // the writer only receives `&str`s
    String::from_utf8(buffer)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

fn new_writer<W: std::io::Write>(inner: W, options: &WriteOptions) -> Writer<W> {
    match options.indent {
        Some(n) => Writer::new_with_indent(inner, b' ', n),
        None => Writer::new(inner),
    }
}

fn write_step<W: std::io::Write>(
    w: &mut Writer<W>,
    step: &MashStep,
    options: &WriteOptions,
) -> Result<(), XmlError> {
    w.write_event(Event::Start(BytesStart::new(MashStep::MARKUP_TAG)))?;
    for spec in &MASH_STEP_FIELDS {
        if !options.extensions && spec.flags.contains(FieldFlags::EXTENSION) {
            continue;
        }
        let Some(text) = markup_text(step.get(spec.field)) else {
            continue;
        };
        w.write_event(Event::Start(BytesStart::new(spec.markup)))?;
        w.write_event(Event::Text(BytesText::new(&text)))?;
        w.write_event(Event::End(BytesEnd::new(spec.markup)))?;
    }
    w.write_event(Event::End(BytesEnd::new(MashStep::MARKUP_TAG)))?;
    Ok(())
}

fn markup_text(value: FieldValue) -> Option<Cow<str>> {
    match value {
        FieldValue::Text(s) => Some(Cow::from(s)),
        FieldValue::Int(n) | FieldValue::OptInt(Some(n)) => Some(n.to_string().into()),
        FieldValue::Float(n) | FieldValue::OptFloat(Some(n)) => Some(n.to_string().into()),
        FieldValue::OptInt(None) | FieldValue::OptFloat(None) => None,
    }
}

/// Parse a [`MashSteps`] from a [`MashSteps::MARKUP_TAG`] element
///
/// Every [`MashStep::MARKUP_TAG`] child is read in order, anything else is
/// skipped.
#[tracing::instrument(level = "debug", name = "xml", skip_all, fields(len = input.len()))]
pub fn from_str(input: &str) -> Result<MashSteps, XmlError> {
    let mut reader = new_reader(input);
    if !expect_root(&mut reader, MashSteps::MARKUP_TAG)? {
        return Ok(MashSteps::new());
    }

    let mut steps = MashSteps::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == MashStep::MARKUP_TAG.as_bytes() => {
                steps.push(read_step(&mut reader)?);
            }
            Event::Empty(e) if e.name().as_ref() == MashStep::MARKUP_TAG.as_bytes() => {
                steps.push(empty_step());
            }
            Event::Start(e) => {
                tracing::debug!("skipping <{}>", String::from_utf8_lossy(e.name().as_ref()));
                reader.read_to_end(e.name())?;
            }
            Event::End(_) => break,
            Event::Eof => {
                return Err(XmlError::UnexpectedEof {
                    element: MashSteps::MARKUP_TAG.to_string(),
                })
            }
            _ => {}
        }
    }
    Ok(steps)
}

/// Parse a single [`MashStep`] from a [`MashStep::MARKUP_TAG`] element
#[tracing::instrument(level = "debug", name = "xml_step", skip_all, fields(len = input.len()))]
pub fn step_from_str(input: &str) -> Result<MashStep, XmlError> {
    let mut reader = new_reader(input);
    if expect_root(&mut reader, MashStep::MARKUP_TAG)? {
        read_step(&mut reader)
    } else {
        Ok(empty_step())
    }
}

fn new_reader(input: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(input);
    // text is kept verbatim, numbers are trimmed when parsed
    reader.config_mut().trim_text(false);
    reader
}

/// Consume events until the root element. Returns `false` if the root is
/// an empty element.
fn expect_root(reader: &mut Reader<&[u8]>, expected: &'static str) -> Result<bool, XmlError> {
    loop {
        let (name, has_content) = match reader.read_event()? {
            Event::Start(e) => (e.name().as_ref().to_vec(), true),
            Event::Empty(e) => (e.name().as_ref().to_vec(), false),
            Event::Eof => return Err(XmlError::MissingRoot { expected }),
            // declaration, comments, doctype...
            _ => continue,
        };
        if name != expected.as_bytes() {
            return Err(XmlError::UnexpectedRoot {
                expected,
                found: String::from_utf8_lossy(&name).into_owned(),
            });
        }
        break Ok(has_content);
    }
}

fn empty_step() -> MashStep {
    log_missing(&[]);
    MashStep::default()
}

/// Read the children of a [`MashStep::MARKUP_TAG`] until its end
fn read_step(reader: &mut Reader<&[u8]>) -> Result<MashStep, XmlError> {
    let mut step = MashStep::default();
    let mut seen = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let Some(field) = Field::from_markup(&tag) else {
                    tracing::debug!("skipping unknown element <{tag}>");
                    reader.read_to_end(e.name())?;
                    continue;
                };
                let text = read_text(reader, &tag)?;
                set_field(&mut step, field, &text)?;
                seen.push(field);
            }
            Event::Empty(e) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match Field::from_markup(&tag) {
                    Some(field) => {
                        set_field(&mut step, field, "")?;
                        seen.push(field);
                    }
                    None => tracing::debug!("skipping unknown element <{tag}/>"),
                }
            }
            Event::End(_) => break,
            Event::Eof => {
                return Err(XmlError::UnexpectedEof {
                    element: MashStep::MARKUP_TAG.to_string(),
                })
            }
            _ => {}
        }
    }
    log_missing(&seen);
    Ok(step)
}

fn set_field(step: &mut MashStep, field: Field, text: &str) -> Result<(), XmlError> {
    step.set_text(field, text).map_err(|source| XmlError::InvalidValue {
        tag: field.spec().markup,
        source,
    })
}

fn log_missing(seen: &[Field]) {
    for spec in &MASH_STEP_FIELDS {
        if spec.flags.contains(FieldFlags::REQUIRED) && !seen.contains(&spec.field) {
            tracing::debug!("mash step without <{}>", spec.markup);
        }
    }
}

/// Read the text content of an element until its end
///
/// Child elements are skipped, CDATA sections are included.
fn read_text(reader: &mut Reader<&[u8]>, tag: &str) -> Result<String, XmlError> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
            Event::Start(e) => {
                tracing::debug!(
                    "skipping <{}> inside <{tag}>",
                    String::from_utf8_lossy(e.name().as_ref())
                );
                reader.read_to_end(e.name())?;
            }
            Event::End(_) => break,
            Event::Eof => {
                return Err(XmlError::UnexpectedEof {
                    element: tag.to_string(),
                })
            }
            _ => {}
        }
    }
    Ok(text)
}
