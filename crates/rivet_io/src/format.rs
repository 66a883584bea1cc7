//! The on-disk/wire persistence format, spec.md §6: header, grade vectors,
//! ξ-support list, one barcode-template line per arrangement face.
//!
//! Grounded on `bifiltration_input`'s line-oriented parsing style (itself
//! grounded on `spicy_parser::netlist_types`) — this module is the writer
//! side of the same convention, plus a reader for the round-trip property
//! spec.md §8 asks for.

use num_rational::BigRational;

use rivet_core::arrangement::{BarcodeTemplate, TemplatePoint};
use rivet_core::matrix::Bigrade;
use rivet_core::support::SupportMatrix;
use rivet_core::EngineOutput;

use crate::error::IoError;

const HEADER_TAG: &str = "RIVET_0";

/// Everything needed to write the persistence format for one completed
/// computation.
pub struct PersistenceDocument<'a> {
    pub hom_dim: usize,
    pub x_grades: &'a [BigRational],
    pub y_grades: &'a [BigRational],
    pub support: &'a SupportMatrix,
    pub output: &'a EngineOutput,
}

fn write_rational(r: &BigRational) -> String {
    format!("{}/{}", r.numer(), r.denom())
}

fn parse_rational(s: &str, line: usize) -> Result<BigRational, IoError> {
    let (num, den) = s.split_once('/').ok_or_else(|| IoError::Malformed {
        line,
        detail: format!("expected a rational, got {s:?}"),
    })?;
    let n = num.parse().map_err(|_| IoError::Malformed {
        line,
        detail: format!("bad numerator {num:?}"),
    })?;
    let d = den.parse().map_err(|_| IoError::Malformed {
        line,
        detail: format!("bad denominator {den:?}"),
    })?;
    Ok(BigRational::new(n, d))
}

fn write_template_line(template: &BarcodeTemplate) -> String {
    if template.is_empty() {
        return "-".to_string();
    }
    template
        .iter()
        .map(|pt| match pt.end {
            Some(end) => format!("{},{},{}", pt.begin, end, pt.multiplicity),
            None => format!("{},{},{}", pt.begin, pt.begin, pt.multiplicity),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_template_line(line: &str, line_no: usize) -> Result<BarcodeTemplate, IoError> {
    if line == "-" {
        return Ok(Vec::new());
    }
    line.split_whitespace()
        .map(|tok| {
            let mut parts = tok.split(',');
            let begin: usize = parts
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| IoError::Malformed {
                    line: line_no,
                    detail: format!("bad barcode token {tok:?}"),
                })?;
            let end_raw: usize = parts
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| IoError::Malformed {
                    line: line_no,
                    detail: format!("bad barcode token {tok:?}"),
                })?;
            let multiplicity: usize = parts
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| IoError::Malformed {
                    line: line_no,
                    detail: format!("bad barcode token {tok:?}"),
                })?;
            let end = if end_raw == begin { None } else { Some(end_raw) };
            Ok(TemplatePoint {
                begin,
                end,
                multiplicity,
            })
        })
        .collect()
}

/// Writes `doc` in the spec.md §6 textual format.
pub fn write(doc: &PersistenceDocument) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} {} {} {} x y\n",
        HEADER_TAG,
        doc.hom_dim,
        doc.x_grades.len(),
        doc.y_grades.len()
    ));
    for g in doc.x_grades {
        out.push_str(&write_rational(g));
        out.push('\n');
    }
    for g in doc.y_grades {
        out.push_str(&write_rational(g));
        out.push('\n');
    }
    for e in doc.support.entries() {
        out.push_str(&format!(
            "{} {} {} {} {}\n",
            e.bigrade.x, e.bigrade.y, e.xi.0, e.xi.1, e.xi.2
        ));
    }
    for t in &doc.output.templates {
        match t {
            Some(template) => out.push_str(&write_template_line(template)),
            None => out.push('-'),
        }
        out.push('\n');
    }
    out
}

/// What `parse` recovers: everything `write` emitted except the
/// arrangement/Betti structures, which the caller already had in hand when
/// writing (the format is a persisted *result*, not a resumable session).
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub hom_dim: usize,
    pub x_grades: Vec<BigRational>,
    pub y_grades: Vec<BigRational>,
    pub support_raw: Vec<(Bigrade, (usize, usize, usize))>,
    pub templates: Vec<BarcodeTemplate>,
}

pub fn parse(text: &str) -> Result<ParsedDocument, IoError> {
    let mut lines = text.lines().enumerate();
    let (header_line, header) = lines.next().ok_or(IoError::Malformed {
        line: 0,
        detail: "empty input".to_string(),
    })?;
    let mut tok = header.split_whitespace();
    let tag = tok.next().unwrap_or("");
    if tag != HEADER_TAG {
        return Err(IoError::BadHeader {
            expected: HEADER_TAG,
            found: tag.to_string(),
        });
    }
    let hom_dim: usize = tok
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| IoError::Malformed {
            line: header_line + 1,
            detail: "missing hom_dim".to_string(),
        })?;
    let nx: usize = tok.next().and_then(|s| s.parse().ok()).ok_or_else(|| IoError::Malformed {
        line: header_line + 1,
        detail: "missing nx".to_string(),
    })?;
    let ny: usize = tok.next().and_then(|s| s.parse().ok()).ok_or_else(|| IoError::Malformed {
        line: header_line + 1,
        detail: "missing ny".to_string(),
    })?;

    let mut x_grades = Vec::with_capacity(nx);
    for _ in 0..nx {
        let (ln, text) = lines.next().ok_or(IoError::Malformed {
            line: header_line + 1,
            detail: "missing x grade".to_string(),
        })?;
        x_grades.push(parse_rational(text, ln + 1)?);
    }
    let mut y_grades = Vec::with_capacity(ny);
    for _ in 0..ny {
        let (ln, text) = lines.next().ok_or(IoError::Malformed {
            line: header_line + 1,
            detail: "missing y grade".to_string(),
        })?;
        y_grades.push(parse_rational(text, ln + 1)?);
    }

    let mut support_raw = Vec::new();
    let mut rest: Vec<(usize, &str)> = lines.collect();
    let mut split_at = rest.len();
    for (i, (_, line)) in rest.iter().enumerate() {
        let is_support_line = line
            .split_whitespace()
            .count()
            == 5
            && !line.contains(',')
            && line != &"-";
        if !is_support_line {
            split_at = i;
            break;
        }
    }
    for (ln, line) in rest.drain(..split_at) {
        let mut tok = line.split_whitespace();
        let parse_field = |t: Option<&str>| -> Result<usize, IoError> {
            t.and_then(|s| s.parse().ok()).ok_or_else(|| IoError::Malformed {
                line: ln + 1,
                detail: "bad support field".to_string(),
            })
        };
        let x = parse_field(tok.next())?;
        let y = parse_field(tok.next())?;
        let xi0 = parse_field(tok.next())?;
        let xi1 = parse_field(tok.next())?;
        let xi2 = parse_field(tok.next())?;
        support_raw.push((Bigrade::new(x, y), (xi0, xi1, xi2)));
    }

    let mut templates = Vec::with_capacity(rest.len());
    for (ln, line) in rest {
        templates.push(parse_template_line(line, ln + 1)?);
    }

    Ok(ParsedDocument {
        hom_dim,
        x_grades,
        y_grades,
        support_raw,
        templates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use rivet_core::arrangement::{build_arrangement, Arrangement};
    use rivet_core::anchor::enumerate_anchors;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    #[test]
    fn template_line_round_trips_finite_and_essential_bars() {
        let template = vec![
            TemplatePoint {
                begin: 0,
                end: Some(2),
                multiplicity: 3,
            },
            TemplatePoint {
                begin: 1,
                end: None,
                multiplicity: 1,
            },
        ];
        let line = write_template_line(&template);
        let parsed = parse_template_line(&line, 0).unwrap();
        assert_eq!(parsed, template);
    }

    #[test]
    fn empty_template_round_trips_as_dash() {
        let line = write_template_line(&Vec::new());
        assert_eq!(line, "-");
        assert!(parse_template_line(&line, 0).unwrap().is_empty());
    }

    #[test]
    fn full_document_round_trips() {
        let support = SupportMatrix::build(vec![
            (Bigrade::new(0, 1), (1, 0, 0)),
            (Bigrade::new(1, 0), (1, 0, 0)),
        ]);
        let anchors = enumerate_anchors(&support);
        let arrangement: Arrangement = build_arrangement(&support, &anchors).unwrap();
        let output = EngineOutput {
            betti: Vec::new(),
            templates: vec![Some(Vec::new()), None],
            arrangement,
        };
        let x_grades = vec![rat(0), rat(1)];
        let y_grades = vec![rat(0), rat(1)];
        let doc = PersistenceDocument {
            hom_dim: 0,
            x_grades: &x_grades,
            y_grades: &y_grades,
            support: &support,
            output: &output,
        };
        let text = write(&doc);
        let parsed = parse(&text).unwrap();
        assert_eq!(parsed.hom_dim, 0);
        assert_eq!(parsed.x_grades, x_grades);
        assert_eq!(parsed.y_grades, y_grades);
        assert_eq!(parsed.support_raw.len(), 2);
        assert_eq!(parsed.templates.len(), 2);
    }
}
