//! Structured form of one curve command.

use curvelib_nurbs::{CurveForm, NurbsCurveData};

/// Substitution token standing in for the target shape name.
pub const NAME_PLACEHOLDER: &str = "%s";

/// Attribute the command sets on its target node.
pub const CURVE_ATTRIBUTE: &str = "cc";

/// Coordinate dimension written for every control vertex.
pub const DIMENSION: usize = 3;

/// A decoded curve command.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveRecord {
    /// Attribute path, e.g. `%s.cc`.
    pub target: String,
    /// Periodic flag as stored. Writers emit `no` unless asked otherwise.
    pub periodic_flag: bool,
    /// Coordinates per control vertex (2 or 3).
    pub dimension: usize,
    /// The curve definition.
    pub curve: NurbsCurveData,
}

impl CurveRecord {
    /// Wrap curve data with an unresolved target and the literal `no` flag.
    pub fn new(curve: NurbsCurveData) -> Self {
        Self {
            target: format!("{NAME_PLACEHOLDER}.{CURVE_ATTRIBUTE}"),
            periodic_flag: false,
            dimension: DIMENSION,
            curve,
        }
    }

    /// Whether the target still contains the name placeholder.
    pub fn is_unresolved(&self) -> bool {
        self.target.contains(NAME_PLACEHOLDER)
    }

    /// Target with the placeholder replaced by `shape_name`.
    pub fn resolved_target(&self, shape_name: &str) -> String {
        self.target.replacen(NAME_PLACEHOLDER, shape_name, 1)
    }

    /// Form of the stored curve.
    pub fn form(&self) -> CurveForm {
        self.curve.form
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_target() {
        let record = CurveRecord::new(NurbsCurveData::polyline(Vec::new()));
        assert_eq!(record.target, "%s.cc");
        assert!(record.is_unresolved());
        assert_eq!(record.resolved_target("arrowShape1"), "arrowShape1.cc");
    }
}
