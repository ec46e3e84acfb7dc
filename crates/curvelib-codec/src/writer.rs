//! Curve command writer: turns a host curve into one replayable command.

use crate::error::CodecError;
use crate::parser::CURVE_TYPE;
use crate::record::CurveRecord;
use curvelib_nurbs::{CurveForm, CurveSource, NurbsCurveData};

/// Knobs for the writer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodecOptions {
    /// Write `yes` as the periodic flag for periodic curves.
    ///
    /// Off by default: existing libraries always carry the literal `no`.
    pub emit_periodic_flag: bool,
}

/// Encode a curve with default options.
pub fn encode(curve: &dyn CurveSource) -> Result<String, CodecError> {
    encode_with(curve, &CodecOptions::default())
}

/// Encode a curve into a single command containing one name placeholder.
///
/// Knots are written truncated toward zero. Open curves write all
/// `degree + spans` control vertices; closed and periodic curves write
/// `spans` vertices followed by the first `degree` again.
pub fn encode_with(curve: &dyn CurveSource, options: &CodecOptions) -> Result<String, CodecError> {
    if curve.degree() == 0 {
        return Err(CodecError::InvalidCurve("degree must be positive".into()));
    }
    let data = NurbsCurveData::capture(curve).ok_or_else(|| {
        CodecError::InvalidCurve("control vertex could not be read from the curve".into())
    })?;
    if let Some(k) = data.knots.iter().find(|k| !k.is_finite()) {
        return Err(CodecError::InvalidCurve(format!("knot {k} is not finite")));
    }
    if let Some(cv) = data
        .control_vertices
        .iter()
        .find(|cv| cv.iter().any(|c| !c.is_finite()))
    {
        return Err(CodecError::InvalidCurve(format!(
            "control vertex ({}, {}, {}) is not finite",
            cv.x, cv.y, cv.z
        )));
    }
    let mut record = CurveRecord::new(data);
    record.periodic_flag = options.emit_periodic_flag && record.form() == CurveForm::Periodic;
    Ok(write_record(&record))
}

/// Encode every curve, in order. Any failure fails the whole batch.
pub fn serialize_curves(
    curves: &[&dyn CurveSource],
    options: &CodecOptions,
) -> Result<Vec<String>, CodecError> {
    curves
        .iter()
        .map(|curve| encode_with(*curve, options))
        .collect()
}

/// Render a record as command text.
pub fn write_record(record: &CurveRecord) -> String {
    let curve = &record.curve;
    let mut parts: Vec<String> = Vec::with_capacity(
        12 + curve.knots.len() + curve.control_vertices.len() * record.dimension,
    );

    parts.push(format!(
        "setAttr \"{}\" - type \"{CURVE_TYPE}\"",
        record.target
    ));
    parts.push(format!(
        "{} {} {} {} {}",
        curve.degree,
        curve.spans,
        curve.form.keyword(),
        if record.periodic_flag { "yes" } else { "no" },
        record.dimension
    ));

    parts.push(curve.knots.len().to_string());
    parts.extend(curve.knots.iter().map(|&k| knot_text(k)));

    parts.push(curve.num_cvs().to_string());
    for cv in &curve.control_vertices {
        parts.push(cv.x.to_string());
        parts.push(cv.y.to_string());
        if record.dimension >= 3 {
            parts.push(cv.z.to_string());
        }
    }

    parts.join(" ")
}

/// Knot truncated toward zero, written without a fraction and without `-0`.
fn knot_text(k: f64) -> String {
    let t = k.trunc();
    if t == 0.0 {
        "0".to_string()
    } else {
        t.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curvelib_nurbs::Point3;
    use pretty_assertions::assert_eq;

    fn linear_open() -> NurbsCurveData {
        NurbsCurveData::new(
            1,
            2,
            CurveForm::Open,
            vec![0.0, 0.0, 1.0, 2.0, 2.0],
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
            ],
        )
    }

    /// Host curve that only answers for the vertices it really stores.
    struct HostCircle {
        ring: Vec<Point3>,
    }

    impl CurveSource for HostCircle {
        fn degree(&self) -> usize {
            3
        }
        fn spans(&self) -> usize {
            self.ring.len()
        }
        fn form(&self) -> CurveForm {
            CurveForm::Periodic
        }
        fn knots(&self) -> Vec<f64> {
            (-2..=(self.ring.len() as i64 + 2)).map(|k| k as f64).collect()
        }
        fn control_vertex(&self, i: usize) -> Option<Point3> {
            self.ring.get(i).copied()
        }
    }

    fn circle() -> HostCircle {
        HostCircle {
            ring: vec![
                Point3::new(0.78, 0.0, -0.78),
                Point3::new(0.0, 0.0, -1.1),
                Point3::new(-0.78, 0.0, -0.78),
                Point3::new(-1.1, 0.0, 0.0),
                Point3::new(-0.78, 0.0, 0.78),
                Point3::new(0.0, 0.0, 1.1),
                Point3::new(0.78, 0.0, 0.78),
                Point3::new(1.1, 0.0, 0.0),
            ],
        }
    }

    #[test]
    fn test_linear_scenario() {
        let cmd = encode(&linear_open()).unwrap();
        assert_eq!(
            cmd,
            r#"setAttr "%s.cc" - type "nurbsCurve" 1 2 open no 3 5 0 0 1 2 2 3 0 0 0 1 0 0 2 0 0"#
        );
    }

    #[test]
    fn test_periodic_wrap_repeats_leading_vertices() {
        let cmd = encode(&circle()).unwrap();
        let record = crate::decode(&cmd).unwrap();
        let cvs = &record.curve.control_vertices;
        assert_eq!(cvs.len(), 3 + 8);
        assert_eq!(&cvs[8..], &cvs[..3]);
        assert!(cmd.contains(" 3 8 periodic no 3 13 "));
    }

    #[test]
    fn test_knots_are_truncated() {
        let mut crv = linear_open();
        crv.knots = vec![0.0, 0.0, 1.9, 2.5, 2.5];
        let cmd = encode(&crv).unwrap();
        assert!(cmd.contains(" 5 0 0 1 2 2 3 "), "{cmd}");
    }

    #[test]
    fn test_negative_knots_truncate_toward_zero() {
        let mut crv = linear_open();
        crv.knots = vec![-1.5, -0.5, 0.5];
        let cmd = encode(&crv).unwrap();
        assert!(cmd.contains(" 3 -1 0 0 3 "), "{cmd}");
    }

    #[test]
    fn test_periodic_flag_option() {
        let options = CodecOptions {
            emit_periodic_flag: true,
        };
        let cmd = encode_with(&circle(), &options).unwrap();
        assert!(cmd.contains(" periodic yes 3 "));

        // open curves stay "no" even with the option on
        let cmd = encode_with(&linear_open(), &options).unwrap();
        assert!(cmd.contains(" open no 3 "));
    }

    #[test]
    fn test_fractional_coordinates() {
        let mut crv = linear_open();
        crv.control_vertices[1] = Point3::new(0.5, -1.25, 3.0);
        let cmd = encode(&crv).unwrap();
        assert!(cmd.ends_with("3 0 0 0 0.5 -1.25 3 2 0 0"), "{cmd}");
    }

    #[test]
    fn test_large_values_decode_back() {
        let mut crv = linear_open();
        crv.knots = vec![0.0, 0.0, 1.0, 2.0, 1e19];
        crv.control_vertices[2] = Point3::new(1e19, -2.5e20, 0.0);
        let cmd = encode(&crv).unwrap();
        assert!(cmd.contains(" 10000000000000000000 3 "), "{cmd}");
        let record = crate::decode(&cmd).unwrap();
        assert_eq!(record.curve, crv);
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let mut crv = linear_open();
        crv.knots[2] = f64::NAN;
        assert!(matches!(encode(&crv), Err(CodecError::InvalidCurve(_))));

        let mut crv = linear_open();
        crv.control_vertices[1] = Point3::new(0.0, f64::INFINITY, 0.0);
        assert!(matches!(encode(&crv), Err(CodecError::InvalidCurve(_))));
    }

    #[test]
    fn test_zero_degree_rejected() {
        let mut crv = linear_open();
        crv.degree = 0;
        assert!(matches!(encode(&crv), Err(CodecError::InvalidCurve(_))));
    }

    #[test]
    fn test_missing_vertex_rejected() {
        let mut crv = linear_open();
        crv.control_vertices.truncate(2);
        assert!(matches!(encode(&crv), Err(CodecError::InvalidCurve(_))));
    }

    #[test]
    fn test_serialize_curves_one_command_each() {
        let a = linear_open();
        let b = circle();
        let cmds = serialize_curves(&[&a as &dyn CurveSource, &b], &CodecOptions::default()).unwrap();
        assert_eq!(cmds.len(), 2);
        assert!(cmds.iter().all(|c| c.starts_with("setAttr \"%s.cc\"")));
    }

    #[test]
    fn test_serialize_curves_fails_as_a_whole() {
        let good = linear_open();
        let mut bad = linear_open();
        bad.degree = 0;
        assert!(serialize_curves(&[&good as &dyn CurveSource, &bad], &CodecOptions::default()).is_err());
    }
}
