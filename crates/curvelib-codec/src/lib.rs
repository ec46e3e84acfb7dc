#![warn(missing_docs)]

//! Curve command codec for curvelib.
//!
//! Converts NURBS curves to and from the single-line `setAttr` command format
//! stored in `.crv` shape files. Encoding reads a host curve through
//! [`CurveSource`](curvelib_nurbs::CurveSource); decoding parses the text back
//! into a [`CurveRecord`] that callers replay through typed host primitives.
//!
//! # Example
//!
//! ```
//! use curvelib_codec::{decode, encode};
//! use curvelib_nurbs::{NurbsCurveData, Point3};
//!
//! let line = NurbsCurveData::polyline(vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)]);
//! let cmd = encode(&line).unwrap();
//! assert!(cmd.starts_with("setAttr \"%s.cc\" - type \"nurbsCurve\" 1 1 open no 3"));
//!
//! let record = decode(&cmd).unwrap();
//! assert_eq!(record.curve, line);
//! ```
//!
//! # Lossy fields
//!
//! Knots are written truncated to integers and the periodic flag is written
//! as `no` unless [`CodecOptions::emit_periodic_flag`] is set. Both match the
//! files existing libraries already hold.

mod error;
mod lexer;
mod parser;
mod record;
mod writer;

pub use error::CodecError;
pub use parser::CURVE_TYPE;
pub use record::{CurveRecord, CURVE_ATTRIBUTE, DIMENSION, NAME_PLACEHOLDER};
pub use writer::{encode, encode_with, serialize_curves, write_record, CodecOptions};

/// Parse one command into its structured form.
pub fn decode(command: &str) -> Result<CurveRecord, CodecError> {
    parser::Parser::parse(command)
}

/// Parse one command and validate the curve it describes.
///
/// On top of [`decode`], checks the control vertex count, knot ordering and
/// the wrap of closed and periodic curves.
pub fn decode_checked(command: &str) -> Result<CurveRecord, CodecError> {
    let record = decode(command)?;
    record.curve.check()?;
    Ok(record)
}
