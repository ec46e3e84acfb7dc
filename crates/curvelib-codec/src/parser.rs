//! Curve command parser: builds a [`CurveRecord`] from one command line.
//!
//! Grammar (whitespace separated):
//!
//! ```text
//! setAttr "<target>" -type "nurbsCurve"
//!     <degree> <spans> <form> <periodic> <dimension>
//!     <knot_count> <knot>*
//!     <cv_count> <coord>*   (cv_count * dimension coordinates)
//!     [;]
//! ```
//!
//! `<form>` is a keyword (`open`, `closed`, `periodic`) or the host's integer
//! code. `<periodic>` is `yes` or `no`.

use crate::error::CodecError;
use crate::lexer::{Lexer, SpannedToken, Token};
use crate::record::CurveRecord;
use curvelib_nurbs::{CurveForm, NurbsCurveData, Point3};

/// Attribute type name the command must set.
pub const CURVE_TYPE: &str = "nurbsCurve";

/// Parser for curve commands.
pub struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl Parser {
    /// Parse one command into a record.
    pub fn parse(input: &str) -> Result<CurveRecord, CodecError> {
        let tokens = Lexer::new(input).tokenize()?;
        let mut parser = Parser { tokens, pos: 0 };
        parser.parse_command()
    }

    fn parse_command(&mut self) -> Result<CurveRecord, CodecError> {
        self.expect_word("setAttr")?;
        let target = self.expect_string("target")?;
        self.expect_token(&Token::Dash, "type flag")?;
        self.expect_word("type")?;
        let type_name = self.expect_string("type")?;
        if type_name != CURVE_TYPE {
            return Err(CodecError::type_mismatch(CURVE_TYPE, type_name));
        }

        let degree = self.count("degree")?;
        let spans = self.count("spans")?;
        let form = self.form()?;
        let periodic_flag = self.yes_no("periodic flag")?;
        let dimension = self.count("dimension")?;
        if !(2..=3).contains(&dimension) {
            return Err(CodecError::parser(
                Some("dimension"),
                format!("unsupported dimension {dimension}"),
            ));
        }

        let knot_count = self.count("knot count")?;
        let mut knots = Vec::with_capacity(knot_count.min(self.remaining()));
        for _ in 0..knot_count {
            knots.push(self.number("knots")?);
        }

        let cv_count = self.count("cv count")?;
        let expected = degree.checked_add(spans).ok_or_else(|| {
            CodecError::parser(Some("spans"), "degree plus spans overflows")
        })?;
        if cv_count != expected {
            return Err(CodecError::CountMismatch {
                what: "control vertices",
                expected,
                actual: cv_count,
            });
        }
        // counts come from the file; size by what is actually left
        let mut control_vertices = Vec::with_capacity(cv_count.min(self.remaining() / dimension));
        for _ in 0..cv_count {
            let x = self.number("control vertices")?;
            let y = self.number("control vertices")?;
            let z = if dimension == 3 {
                self.number("control vertices")?
            } else {
                0.0
            };
            control_vertices.push(Point3::new(x, y, z));
        }

        if self.check_token(&Token::Semicolon) {
            self.advance();
        }
        if let Some(extra) = self.peek() {
            return Err(CodecError::parser(
                None,
                format!(
                    "trailing data at column {}: {:?}",
                    extra.pos.col, extra.token
                ),
            ));
        }

        Ok(CurveRecord {
            target,
            periodic_flag,
            dimension,
            curve: NurbsCurveData::new(degree, spans, form, knots, control_vertices),
        })
    }

    fn count(&mut self, field: &str) -> Result<usize, CodecError> {
        match self.advance().map(|t| t.token.clone()) {
            Some(Token::Integer(v)) if v >= 0 => Ok(v as usize),
            other => Err(CodecError::parser(
                Some(field),
                format!("expected a non-negative integer, got {other:?}"),
            )),
        }
    }

    fn number(&mut self, field: &str) -> Result<f64, CodecError> {
        match self.advance().map(|t| t.token.clone()) {
            Some(Token::Integer(v)) => Ok(v as f64),
            Some(Token::Real(v)) => Ok(v),
            other => Err(CodecError::parser(
                Some(field),
                format!("expected a number, got {other:?}"),
            )),
        }
    }

    fn form(&mut self) -> Result<CurveForm, CodecError> {
        let parsed = match self.advance().map(|t| t.token.clone()) {
            Some(Token::Word(w)) => CurveForm::from_keyword(&w),
            Some(Token::Integer(code)) => CurveForm::from_code(code),
            other => {
                return Err(CodecError::parser(
                    Some("form"),
                    format!("expected a form, got {other:?}"),
                ))
            }
        };
        parsed.ok_or_else(|| CodecError::parser(Some("form"), "unknown curve form"))
    }

    fn yes_no(&mut self, field: &str) -> Result<bool, CodecError> {
        match self.advance().map(|t| t.token.clone()) {
            Some(Token::Word(w)) if w.eq_ignore_ascii_case("yes") => Ok(true),
            Some(Token::Word(w)) if w.eq_ignore_ascii_case("no") => Ok(false),
            other => Err(CodecError::parser(
                Some(field),
                format!("expected yes or no, got {other:?}"),
            )),
        }
    }

    fn remaining(&self) -> usize {
        self.tokens.len().saturating_sub(self.pos)
    }

    fn peek(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&SpannedToken> {
        let tok = self.tokens.get(self.pos);
        self.pos += 1;
        tok
    }

    fn check_token(&self, expected: &Token) -> bool {
        self.peek().map(|t| &t.token == expected).unwrap_or(false)
    }

    fn expect_token(&mut self, expected: &Token, field: &str) -> Result<(), CodecError> {
        if self.check_token(expected) {
            self.advance();
            Ok(())
        } else {
            let actual = self.peek().map(|t| t.token.clone());
            Err(CodecError::parser(
                Some(field),
                format!("expected {expected:?}, got {actual:?}"),
            ))
        }
    }

    fn expect_word(&mut self, word: &str) -> Result<(), CodecError> {
        match self.peek() {
            Some(SpannedToken {
                token: Token::Word(w),
                ..
            }) if w == word => {
                self.advance();
                Ok(())
            }
            other => {
                let actual = other.map(|t| t.token.clone());
                Err(CodecError::parser(
                    None,
                    format!("expected '{word}', got {actual:?}"),
                ))
            }
        }
    }

    fn expect_string(&mut self, field: &str) -> Result<String, CodecError> {
        match self.advance().map(|t| t.token.clone()) {
            Some(Token::Str(s)) => Ok(s),
            other => Err(CodecError::parser(
                Some(field),
                format!("expected a quoted string, got {other:?}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LINEAR: &str =
        r#"setAttr "%s.cc" - type "nurbsCurve" 1 2 open no 3 5 0 0 1 2 2 3 0 0 0 1 0 0 2 0 0"#;

    #[test]
    fn test_parse_linear() {
        let record = Parser::parse(LINEAR).unwrap();
        assert_eq!(record.target, "%s.cc");
        assert!(!record.periodic_flag);
        assert_eq!(record.dimension, 3);
        assert_eq!(record.curve.degree, 1);
        assert_eq!(record.curve.spans, 2);
        assert_eq!(record.curve.form, CurveForm::Open);
        assert_eq!(record.curve.knots, vec![0.0, 0.0, 1.0, 2.0, 2.0]);
        assert_eq!(
            record.curve.control_vertices,
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_parse_host_written_line() {
        // integer form code, python-style reals, trailing semicolon
        let input = r#"setAttr "ctrlShape1.cc" -type "nurbsCurve" 1 1 0 no 3 2 0 1 2 0.0 0.5 -1.0 1e-05 2.0 3.0;"#;
        let record = Parser::parse(input).unwrap();
        assert_eq!(record.curve.form, CurveForm::Open);
        assert_eq!(record.curve.control_vertices[0], Point3::new(0.0, 0.5, -1.0));
        assert_eq!(record.curve.control_vertices[1], Point3::new(1e-5, 2.0, 3.0));
    }

    #[test]
    fn test_parse_two_dimensional() {
        let input = r#"setAttr "%s.cc" -type "nurbsCurve" 1 1 open no 2 2 0 1 2 0 0 1 1"#;
        let record = Parser::parse(input).unwrap();
        assert_eq!(record.dimension, 2);
        assert_eq!(record.curve.control_vertices[1], Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_wrong_type_is_type_mismatch() {
        let input = r#"setAttr "%s.cc" -type "nurbsSurface" 1 1 open no 3 0 2 0 0 0 1 1 1"#;
        let err = Parser::parse(input).unwrap_err();
        assert_eq!(err, CodecError::type_mismatch("nurbsCurve", "nurbsSurface"));
    }

    #[test]
    fn test_cv_count_must_match_header() {
        let input = r#"setAttr "%s.cc" -type "nurbsCurve" 1 2 open no 3 0 2 0 0 0 1 1 1"#;
        let err = Parser::parse(input).unwrap_err();
        assert_eq!(
            err,
            CodecError::CountMismatch {
                what: "control vertices",
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_truncated_command() {
        let input = r#"setAttr "%s.cc" -type "nurbsCurve" 1 2 open no 3 5 0 0 1"#;
        let err = Parser::parse(input).unwrap_err();
        assert!(matches!(err, CodecError::Parser { field: Some(ref f), .. } if f == "knots"));
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let input = format!("{LINEAR} 7");
        assert!(matches!(
            Parser::parse(&input),
            Err(CodecError::Parser { field: None, .. })
        ));
    }

    #[test]
    fn test_bad_form_and_flag() {
        let input = r#"setAttr "%s.cc" -type "nurbsCurve" 1 2 wobbly no 3 0 3 0 0 0 1 0 0 2 0 0"#;
        assert!(matches!(
            Parser::parse(input),
            Err(CodecError::Parser { field: Some(ref f), .. }) if f == "form"
        ));

        let input = r#"setAttr "%s.cc" -type "nurbsCurve" 1 2 open maybe 3 0 3 0 0 0 1 0 0 2 0 0"#;
        assert!(matches!(
            Parser::parse(input),
            Err(CodecError::Parser { field: Some(ref f), .. }) if f == "periodic flag"
        ));
    }

    #[test]
    fn test_huge_knot_count_is_a_parse_error() {
        let input = r#"setAttr "%s.cc" - type "nurbsCurve" 1 1 open no 3 4000000000000000000 0"#;
        assert!(matches!(
            Parser::parse(input),
            Err(CodecError::Parser { field: Some(ref f), .. }) if f == "knots"
        ));
    }

    #[test]
    fn test_huge_cv_count_is_a_parse_error() {
        let input =
            r#"setAttr "%s.cc" - type "nurbsCurve" 1000000000000 0 open no 3 0 1000000000000 1 2 3"#;
        assert!(matches!(
            Parser::parse(input),
            Err(CodecError::Parser { field: Some(ref f), .. }) if f == "control vertices"
        ));
    }

    #[test]
    fn test_missing_prefix() {
        let err = Parser::parse("1 2 open no 3").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parser error: expected 'setAttr', got Some(Integer(1))"
        );
    }
}
