#![warn(missing_docs)]

//! NURBS curve data model for curvelib.
//!
//! Holds the exact definition of a host curve (degree, spans, form, knots and
//! control vertices) in a form that the codec can write out and read back,
//! plus a non-rational B-spline evaluator for sampling stored shapes.
//!
//! # Key types
//!
//! - [`CurveForm`] - open, closed or periodic
//! - [`NurbsCurveData`] - owned curve definition, as captured from a host
//! - [`CurveSource`] - read-only capability set a host curve must expose
//! - [`BSplineCurve`] - evaluable B-spline built from a [`NurbsCurveData`]
//!
//! # Knot conventions
//!
//! Hosts usually report `spans + 2 * degree - 1` knots (no end knots), while
//! De Boor evaluation wants the full `n + degree + 1` vector. Both layouts are
//! accepted by [`NurbsCurveData::to_bspline`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A point in 3D object space.
pub type Point3 = nalgebra::Point3<f64>;

// =============================================================================
// Curve form
// =============================================================================

/// Topological form of a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveForm {
    /// Start and end are independent.
    #[default]
    Open,
    /// Start and end meet, no tangent continuity.
    Closed,
    /// Start and end meet with full continuity.
    Periodic,
}

impl CurveForm {
    /// Lowercase keyword used in the command format.
    pub fn keyword(self) -> &'static str {
        match self {
            CurveForm::Open => "open",
            CurveForm::Closed => "closed",
            CurveForm::Periodic => "periodic",
        }
    }

    /// Parse a keyword (case-insensitive).
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "open" => Some(CurveForm::Open),
            "closed" => Some(CurveForm::Closed),
            "periodic" => Some(CurveForm::Periodic),
            _ => None,
        }
    }

    /// Integer form code as hosts store it (`0` open, `1` closed, `2` periodic).
    pub fn code(self) -> i64 {
        match self {
            CurveForm::Open => 0,
            CurveForm::Closed => 1,
            CurveForm::Periodic => 2,
        }
    }

    /// Inverse of [`CurveForm::code`].
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(CurveForm::Open),
            1 => Some(CurveForm::Closed),
            2 => Some(CurveForm::Periodic),
            _ => None,
        }
    }

    /// Whether the leading `degree` control vertices are repeated at the end.
    pub fn wraps(self) -> bool {
        !matches!(self, CurveForm::Open)
    }
}

impl fmt::Display for CurveForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

// =============================================================================
// Knot vector utilities
// =============================================================================

/// Knot count a host reports for a curve: `spans + 2 * degree - 1`.
pub fn host_knot_count(degree: usize, spans: usize) -> usize {
    (spans + 2 * degree).saturating_sub(1)
}

/// Check that a knot vector is non-decreasing.
pub fn is_non_decreasing(knots: &[f64]) -> bool {
    knots.windows(2).all(|w| w[0] <= w[1])
}

/// Find the knot span index for parameter `t`.
///
/// Returns `i` such that `knots[i] <= t < knots[i+1]`, clamped to valid range.
fn find_span(knots: &[f64], n: usize, degree: usize, t: f64) -> usize {
    // n = number of control points - 1
    if t >= knots[n + 1] {
        return n;
    }
    if t <= knots[degree] {
        return degree;
    }
    let mut low = degree;
    let mut high = n + 1;
    let mut mid = (low + high) / 2;
    while t < knots[mid] || t >= knots[mid + 1] {
        if t < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }
    mid
}

/// Non-zero basis function values `N[span-degree..=span]` at `t`.
fn basis_functions(knots: &[f64], span: usize, degree: usize, t: f64) -> Vec<f64> {
    let mut n = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];
    n[0] = 1.0;

    for j in 1..=degree {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            if denom.abs() < 1e-30 {
                // zero-length interval
                n[j] = saved;
                continue;
            }
            let temp = n[r] / denom;
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        n[j] = saved;
    }

    n
}

// =============================================================================
// Curve data
// =============================================================================

/// Problems found when checking a [`NurbsCurveData`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveDataError {
    /// Degree must be at least 1.
    #[error("degree must be positive")]
    ZeroDegree,

    /// Control vertex count differs from `degree + spans`.
    #[error("expected {expected} control vertices (degree + spans), got {actual}")]
    ControlVertexCount {
        /// `degree + spans`.
        expected: usize,
        /// Number actually present.
        actual: usize,
    },

    /// Knots decrease somewhere.
    #[error("knot vector is not non-decreasing")]
    DecreasingKnots,

    /// Wrapped control vertices do not repeat the leading ones.
    #[error("control vertex {index} should repeat control vertex {source_index} for a {form} curve")]
    BrokenWrap {
        /// Index of the trailing vertex.
        index: usize,
        /// Index of the leading vertex it should equal.
        source_index: usize,
        /// Curve form.
        form: CurveForm,
    },
}

/// The full definition of one curve.
///
/// `control_vertices` always holds `degree + spans` points; for closed and
/// periodic curves the last `degree` repeat the first `degree`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NurbsCurveData {
    /// Polynomial degree.
    pub degree: usize,
    /// Number of spans.
    pub spans: usize,
    /// Open, closed or periodic.
    pub form: CurveForm,
    /// Knot values in host layout.
    pub knots: Vec<f64>,
    /// Control vertices in object space.
    pub control_vertices: Vec<Point3>,
}

impl NurbsCurveData {
    /// Build curve data from raw parts. Call [`NurbsCurveData::check`] to validate.
    pub fn new(
        degree: usize,
        spans: usize,
        form: CurveForm,
        knots: Vec<f64>,
        control_vertices: Vec<Point3>,
    ) -> Self {
        Self {
            degree,
            spans,
            form,
            knots,
            control_vertices,
        }
    }

    /// Linear open polyline through `points` with integer knots `0..n-1`.
    pub fn polyline(points: Vec<Point3>) -> Self {
        let spans = points.len().saturating_sub(1);
        let knots = (0..points.len()).map(|i| i as f64).collect();
        Self::new(1, spans, CurveForm::Open, knots, points)
    }

    /// Capture a curve from any [`CurveSource`].
    ///
    /// Open curves read `degree + spans` vertices; closed and periodic curves
    /// read `spans` vertices and repeat them cyclically until there are
    /// `degree + spans`. Returns `None` if the source cannot produce one of
    /// the vertices it claims to have, or for a closed form with no spans.
    pub fn capture(source: &dyn CurveSource) -> Option<Self> {
        let degree = source.degree();
        let spans = source.spans();
        let form = source.form();
        Some(Self::new(
            degree,
            spans,
            form,
            source.knots(),
            wrapped_control_vertices(source)?,
        ))
    }

    /// Number of control vertices, `degree + spans`.
    pub fn num_cvs(&self) -> usize {
        self.degree + self.spans
    }

    /// Validate degree, control vertex count, knot order and wrap.
    pub fn check(&self) -> Result<(), CurveDataError> {
        if self.degree == 0 {
            return Err(CurveDataError::ZeroDegree);
        }
        if self.control_vertices.len() != self.num_cvs() {
            return Err(CurveDataError::ControlVertexCount {
                expected: self.num_cvs(),
                actual: self.control_vertices.len(),
            });
        }
        if !is_non_decreasing(&self.knots) {
            return Err(CurveDataError::DecreasingKnots);
        }
        if self.form.wraps() && self.spans > 0 {
            for i in 0..self.degree {
                let index = self.spans + i;
                let source_index = i % self.spans;
                if self.control_vertices[index] != self.control_vertices[source_index] {
                    return Err(CurveDataError::BrokenWrap {
                        index,
                        source_index,
                        form: self.form,
                    });
                }
            }
        }
        Ok(())
    }

    /// Copy of this curve with every knot truncated toward zero.
    pub fn with_truncated_knots(&self) -> Self {
        Self {
            knots: self.knots.iter().map(|k| k.trunc()).collect(),
            ..self.clone()
        }
    }

    /// Axis-aligned bounds of the control hull, or `None` if there are no vertices.
    pub fn bounds(&self) -> Option<(Point3, Point3)> {
        let first = *self.control_vertices.first()?;
        let (mut min, mut max) = (first, first);
        for p in &self.control_vertices[1..] {
            min = Point3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
            max = Point3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
        }
        Some((min, max))
    }

    /// Build an evaluable B-spline.
    ///
    /// Accepts knots in host layout (`n + degree - 1`, padded here) or full
    /// layout (`n + degree + 1`). Returns `None` for any other length or an
    /// invalid curve.
    pub fn to_bspline(&self) -> Option<BSplineCurve> {
        self.check().ok()?;
        let n = self.control_vertices.len();
        let knots = if self.knots.len() == n + self.degree + 1 {
            self.knots.clone()
        } else if self.knots.len() == n + self.degree - 1 && self.knots.len() >= 2 {
            pad_host_knots(&self.knots, self.form)
        } else {
            return None;
        };
        Some(BSplineCurve::new(
            self.control_vertices.clone(),
            knots,
            self.degree,
        ))
    }
}

/// Read the control vertices a curve stores, applying the wrap for closed forms.
fn wrapped_control_vertices(source: &dyn CurveSource) -> Option<Vec<Point3>> {
    let degree = source.degree();
    let spans = source.spans();
    let mut cvs = Vec::with_capacity(degree + spans);
    if source.form().wraps() {
        for i in 0..spans {
            cvs.push(source.control_vertex(i)?);
        }
        if spans == 0 {
            return None;
        }
        for i in 0..degree {
            cvs.push(cvs[i % spans]);
        }
    } else {
        for i in 0..degree + spans {
            cvs.push(source.control_vertex(i)?);
        }
    }
    Some(cvs)
}

/// Add the two end knots hosts leave out.
fn pad_host_knots(knots: &[f64], form: CurveForm) -> Vec<f64> {
    let first = knots[0];
    let last = knots[knots.len() - 1];
    let (head, tail) = if form.wraps() {
        (
            first - (knots[1] - first),
            last + (last - knots[knots.len() - 2]),
        )
    } else {
        (first, last)
    };
    let mut full = Vec::with_capacity(knots.len() + 2);
    full.push(head);
    full.extend_from_slice(knots);
    full.push(tail);
    full
}

// =============================================================================
// Host capability set
// =============================================================================

/// Read-only view of a host curve.
///
/// `control_vertex(i)` is queried for `i` in `0..spans` on closed/periodic
/// curves and `0..degree + spans` on open ones.
pub trait CurveSource {
    /// Polynomial degree.
    fn degree(&self) -> usize;
    /// Number of spans.
    fn spans(&self) -> usize;
    /// Curve form.
    fn form(&self) -> CurveForm;
    /// Knot values, derived on demand without side effects.
    fn knots(&self) -> Vec<f64>;
    /// Control vertex `i` in object space.
    fn control_vertex(&self, i: usize) -> Option<Point3>;
}

impl CurveSource for NurbsCurveData {
    fn degree(&self) -> usize {
        self.degree
    }

    fn spans(&self) -> usize {
        self.spans
    }

    fn form(&self) -> CurveForm {
        self.form
    }

    fn knots(&self) -> Vec<f64> {
        self.knots.clone()
    }

    fn control_vertex(&self, i: usize) -> Option<Point3> {
        self.control_vertices.get(i).copied()
    }
}

// =============================================================================
// B-spline evaluation
// =============================================================================

/// A non-rational B-spline curve in 3D, evaluated with De Boor's algorithm.
#[derive(Debug, Clone)]
pub struct BSplineCurve {
    /// Control points.
    pub control_points: Vec<Point3>,
    /// Full knot vector. Length = control_points.len() + degree + 1.
    pub knots: Vec<f64>,
    /// Polynomial degree.
    pub degree: usize,
}

impl BSplineCurve {
    fn new(control_points: Vec<Point3>, knots: Vec<f64>, degree: usize) -> Self {
        debug_assert_eq!(knots.len(), control_points.len() + degree + 1);
        Self {
            control_points,
            knots,
            degree,
        }
    }

    /// Evaluate the curve at parameter `t`.
    pub fn eval(&self, t: f64) -> Point3 {
        let n = self.control_points.len() - 1;
        let t = t.clamp(self.knots[self.degree], self.knots[n + 1]);
        let span = find_span(&self.knots, n, self.degree, t);
        let basis = basis_functions(&self.knots, span, self.degree, t);

        let mut point = Point3::origin();
        for (i, &b) in basis.iter().enumerate() {
            let cp = &self.control_points[span - self.degree + i];
            point.x += b * cp.x;
            point.y += b * cp.y;
            point.z += b * cp.z;
        }
        point
    }

    /// Parameter domain `(t_min, t_max)`.
    pub fn parameter_domain(&self) -> (f64, f64) {
        (
            self.knots[self.degree],
            self.knots[self.control_points.len()],
        )
    }

    /// `count` points evenly spaced in parameter space, ends included.
    pub fn sample(&self, count: usize) -> Vec<Point3> {
        let (t0, t1) = self.parameter_domain();
        match count {
            0 => Vec::new(),
            1 => vec![self.eval(t0)],
            _ => (0..count)
                .map(|i| self.eval(t0 + (t1 - t0) * i as f64 / (count - 1) as f64))
                .collect(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

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

    fn periodic_square() -> NurbsCurveData {
        let ring = [
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(-1.0, 0.0, 1.0),
            Point3::new(-1.0, 0.0, -1.0),
            Point3::new(1.0, 0.0, -1.0),
        ];
        let mut cvs = ring.to_vec();
        cvs.extend_from_slice(&ring[..3]);
        NurbsCurveData::new(
            3,
            4,
            CurveForm::Periodic,
            vec![-2.0, -1.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            cvs,
        )
    }

    #[test]
    fn test_form_keywords_and_codes() {
        for form in [CurveForm::Open, CurveForm::Closed, CurveForm::Periodic] {
            assert_eq!(CurveForm::from_keyword(form.keyword()), Some(form));
            assert_eq!(CurveForm::from_code(form.code()), Some(form));
        }
        assert_eq!(CurveForm::from_keyword("PERIODIC"), Some(CurveForm::Periodic));
        assert_eq!(CurveForm::from_keyword("spiral"), None);
        assert_eq!(CurveForm::from_code(7), None);
        assert!(!CurveForm::Open.wraps());
        assert!(CurveForm::Closed.wraps());
    }

    #[test]
    fn test_host_knot_count() {
        assert_eq!(host_knot_count(1, 2), 3);
        assert_eq!(host_knot_count(3, 4), 9);
    }

    #[test]
    fn test_knot_helpers() {
        let knots = [0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0];
        assert!(is_non_decreasing(&knots));
        assert!(!is_non_decreasing(&[0.0, 1.0, 0.5]));
    }

    #[test]
    fn test_check_accepts_valid_curves() {
        assert_eq!(linear_open().check(), Ok(()));
        assert_eq!(periodic_square().check(), Ok(()));
    }

    #[test]
    fn test_check_rejects_bad_counts() {
        let mut crv = linear_open();
        crv.control_vertices.pop();
        assert_eq!(
            crv.check(),
            Err(CurveDataError::ControlVertexCount {
                expected: 3,
                actual: 2
            })
        );

        let mut crv = linear_open();
        crv.degree = 0;
        assert_eq!(crv.check(), Err(CurveDataError::ZeroDegree));

        let mut crv = linear_open();
        crv.knots = vec![0.0, 2.0, 1.0];
        assert_eq!(crv.check(), Err(CurveDataError::DecreasingKnots));
    }

    #[test]
    fn test_check_rejects_broken_wrap() {
        let mut crv = periodic_square();
        crv.control_vertices[6] = Point3::new(9.0, 9.0, 9.0);
        assert!(matches!(
            crv.check(),
            Err(CurveDataError::BrokenWrap {
                index: 6,
                source_index: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_capture_open_reads_all_vertices() {
        let crv = linear_open();
        let captured = NurbsCurveData::capture(&crv).unwrap();
        assert_eq!(captured, crv);
    }

    #[test]
    fn test_capture_periodic_wraps_leading_vertices() {
        let crv = periodic_square();
        let captured = NurbsCurveData::capture(&crv).unwrap();
        assert_eq!(captured.control_vertices.len(), 7);
        assert_eq!(&captured.control_vertices[4..], &captured.control_vertices[..3]);
    }

    #[test]
    fn test_capture_wraps_fewer_spans_than_degree() {
        let a = Point3::new(1.0, 0.0, 0.0);
        let b = Point3::new(-1.0, 0.0, 0.0);
        let crv = NurbsCurveData::new(
            3,
            2,
            CurveForm::Periodic,
            vec![-2.0, -1.0, 0.0, 1.0, 2.0, 3.0, 4.0],
            vec![a, b],
        );
        let captured = NurbsCurveData::capture(&crv).unwrap();
        assert_eq!(captured.control_vertices, vec![a, b, a, b, a]);
        assert_eq!(captured.check(), Ok(()));

        let mut broken = captured.clone();
        broken.control_vertices[4] = b;
        assert!(matches!(
            broken.check(),
            Err(CurveDataError::BrokenWrap {
                index: 4,
                source_index: 0,
                ..
            })
        ));

        let single = NurbsCurveData::new(3, 1, CurveForm::Closed, Vec::new(), vec![a]);
        let captured = NurbsCurveData::capture(&single).unwrap();
        assert_eq!(captured.control_vertices, vec![a; 4]);
    }

    #[test]
    fn test_capture_closed_without_spans_fails() {
        let crv = NurbsCurveData::new(3, 0, CurveForm::Periodic, Vec::new(), Vec::new());
        assert_eq!(NurbsCurveData::capture(&crv), None);
    }

    #[test]
    fn test_truncated_knots() {
        let mut crv = linear_open();
        crv.knots = vec![0.0, 0.0, 1.75, 2.5, 2.5];
        let truncated = crv.with_truncated_knots();
        assert_eq!(truncated.knots, vec![0.0, 0.0, 1.0, 2.0, 2.0]);
        assert_eq!(truncated.control_vertices, crv.control_vertices);
    }

    #[test]
    fn test_bounds() {
        let (min, max) = periodic_square().bounds().unwrap();
        assert_eq!(min, Point3::new(-1.0, 0.0, -1.0));
        assert_eq!(max, Point3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn test_linear_eval_interpolates_cvs() {
        let spline = linear_open().to_bspline().unwrap();
        assert_eq!(spline.parameter_domain(), (0.0, 2.0));
        let mid = spline.eval(0.5);
        assert_relative_eq!(mid.x, 0.5, epsilon = 1e-10);
        let end = spline.eval(2.0);
        assert_relative_eq!(end.x, 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_host_layout_knots_are_padded() {
        // 3 cvs, degree 1: host layout has 3 knots
        let mut crv = linear_open();
        crv.knots = vec![0.0, 1.0, 2.0];
        let spline = crv.to_bspline().unwrap();
        assert_eq!(spline.knots, vec![0.0, 0.0, 1.0, 2.0, 2.0]);
    }

    #[test]
    fn test_periodic_padding_extrapolates() {
        let spline = periodic_square().to_bspline().unwrap();
        assert_eq!(spline.knots.first(), Some(&-3.0));
        assert_eq!(spline.knots.last(), Some(&7.0));
        assert_eq!(spline.parameter_domain(), (0.0, 4.0));

        // a closed loop starts where it ends
        let start = spline.eval(0.0);
        let end = spline.eval(4.0);
        assert!((start - end).norm() < 1e-9);
    }

    #[test]
    fn test_to_bspline_rejects_odd_knot_count() {
        let mut crv = linear_open();
        crv.knots = vec![0.0, 1.0];
        assert!(crv.to_bspline().is_none());
    }

    #[test]
    fn test_sample_counts() {
        let spline = linear_open().to_bspline().unwrap();
        assert!(spline.sample(0).is_empty());
        assert_eq!(spline.sample(1), vec![Point3::origin()]);
        let pts = spline.sample(5);
        assert_eq!(pts.len(), 5);
        assert_relative_eq!(pts[2].x, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_polyline() {
        let crv = NurbsCurveData::polyline(vec![Point3::origin(), Point3::new(0.0, 1.0, 0.0)]);
        assert_eq!(crv.degree, 1);
        assert_eq!(crv.spans, 1);
        assert_eq!(crv.check(), Ok(()));
    }

    #[test]
    fn test_serde_form_is_lowercase() {
        let json = serde_json::to_string(&CurveForm::Periodic).unwrap();
        assert_eq!(json, "\"periodic\"");
    }
}
