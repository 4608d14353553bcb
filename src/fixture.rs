//! Reference data for checking transforms.
//!
//! A fixture is plain text with one value per row. It holds four arrays in
//! the order `x`, `f_hat`, `f`, `adjoint_f_hat`; each array is preceded by a
//! marker row whose real part, rounded, is the array's length. A value is written as a
//! numpy complex literal `(re+imj)`, a bare real, or a `re im` pair. Blank
//! rows and `#` comments are skipped. Rows are numbered from 1 in error
//! messages, counting every line of the file.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use log::debug;
use rustfft::num_complex::Complex64;

use crate::error::{NfftError, Result};
use crate::plan::Plan;

/// The four arrays of a fixture.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReferenceData {
    /// Node coordinates, `d * M_total`.
    pub x: Vec<f64>,
    /// Fourier coefficients, `N_total`.
    pub f_hat: Vec<Complex64>,
    /// Forward transform of `f_hat`, `M_total`.
    pub f: Vec<Complex64>,
    /// Adjoint transform of `f`, `N_total`.
    pub adjoint_f_hat: Vec<Complex64>,
}

const SECTIONS: [&str; 4] = ["x", "f_hat", "f", "adjoint_f_hat"];

fn corrupt(row: usize, reason: impl Into<String>) -> NfftError {
    NfftError::DataCorruption {
        row,
        reason: reason.into(),
    }
}

impl ReferenceData {
    /// Parse fixture text without checking lengths against a plan.
    pub fn parse(text: &str) -> Result<Self> {
        parse_sections(text, None)
    }

    /// Parse fixture text whose lengths must match `plan`.
    pub fn parse_for(text: &str, plan: &Plan) -> Result<Self> {
        parse_sections(text, Some(Self::expected_lengths(plan)?))
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("reading reference data from {}", path.display());
        Self::parse(&fs::read_to_string(path)?)
    }

    pub fn read_for(path: impl AsRef<Path>, plan: &Plan) -> Result<Self> {
        let path = path.as_ref();
        debug!("reading reference data from {}", path.display());
        Self::parse_for(&fs::read_to_string(path)?, plan)
    }

    /// Array lengths a fixture for `plan` must have, in file order.
    pub fn expected_lengths(plan: &Plan) -> Result<[usize; 4]> {
        let (n_total, m_total) = (plan.n_total()?, plan.m_total()?);
        Ok([plan.d()? * m_total, n_total, m_total, n_total])
    }

    /// Serialise in the fixture format, one numpy complex literal per row.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let x: Vec<Complex64> = self.x.iter().map(|&v| Complex64::new(v, 0.0)).collect();
        for values in [&x, &self.f_hat, &self.f, &self.adjoint_f_hat] {
            push_value(&mut out, Complex64::new(values.len() as f64, 0.0));
            for &v in values.iter() {
                push_value(&mut out, v);
            }
        }
        out
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_text())?;
        Ok(())
    }
}

fn push_value(out: &mut String, v: Complex64) {
    // Writing to a String cannot fail.
    let _ = writeln!(out, " ({:.18e}{:+.18e}j)", v.re, v.im);
}

/// Parse one value: `(re+imj)`, `re+imj`, `imj`, `re` or `re im`.
pub fn parse_complex(s: &str) -> Option<Complex64> {
    let s = s.trim();
    let s = s
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(s)
        .trim();
    if let Some(body) = s.strip_suffix(|c: char| c == 'j' || c == 'J') {
        let split = body
            .char_indices()
            .skip(1)
            .filter(|&(i, c)| {
                (c == '+' || c == '-') && !matches!(body.as_bytes()[i - 1], b'e' | b'E')
            })
            .map(|(i, _)| i)
            .last();
        return match split {
            Some(i) => Some(Complex64::new(
                body[..i].trim().parse().ok()?,
                body[i..].trim().parse().ok()?,
            )),
            None => Some(Complex64::new(0.0, body.trim().parse().ok()?)),
        };
    }
    let mut parts = s.split_whitespace();
    let re = parts.next()?.parse().ok()?;
    let im = match parts.next() {
        Some(p) => p.parse().ok()?,
        None => 0.0,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(Complex64::new(re, im))
}

fn parse_sections(text: &str, expected: Option<[usize; 4]>) -> Result<ReferenceData> {
    let mut rows = text.lines().enumerate().filter_map(|(i, line)| {
        let content = line.split('#').next().unwrap_or("").trim();
        (!content.is_empty()).then_some((i + 1, content))
    });
    let end_row = text.lines().count() + 1;

    let mut arrays: Vec<Vec<Complex64>> = Vec::with_capacity(4);
    for (s, name) in SECTIONS.iter().enumerate() {
        let (row, raw) = rows
            .next()
            .ok_or_else(|| corrupt(end_row, format!("missing length marker for {name}")))?;
        let len = parse_marker(row, raw, name)?;
        if let Some(expected) = expected {
            if len != expected[s] {
                return Err(corrupt(
                    row,
                    format!("{name} has {len} entries but the plan expects {}", expected[s]),
                ));
            }
        }
        let mut values = Vec::with_capacity(len.min(1 << 16));
        for k in 0..len {
            let (row, raw) = rows.next().ok_or_else(|| {
                corrupt(end_row, format!("{name} ends after {k} of {len} entries"))
            })?;
            let v = parse_complex(raw)
                .ok_or_else(|| corrupt(row, format!("`{raw}` is not a number")))?;
            values.push(v);
        }
        arrays.push(values);
    }
    if let Some((row, _)) = rows.next() {
        return Err(corrupt(row, "unexpected data after the last array"));
    }

    let adjoint_f_hat = arrays.pop().unwrap_or_default();
    let f = arrays.pop().unwrap_or_default();
    let f_hat = arrays.pop().unwrap_or_default();
    let x_values = arrays.pop().unwrap_or_default();
    let x = x_values.iter().map(|v| v.re).collect();
    if let Some(k) = x_values.iter().position(|v| v.im != 0.0) {
        // The x section starts right after its marker.
        let row = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.split('#').next().unwrap_or("").trim().is_empty())
            .nth(k + 1)
            .map(|(i, _)| i + 1)
            .unwrap_or(end_row);
        return Err(corrupt(row, "node coordinate has an imaginary part"));
    }
    Ok(ReferenceData {
        x,
        f_hat,
        f,
        adjoint_f_hat,
    })
}

fn parse_marker(row: usize, raw: &str, name: &str) -> Result<usize> {
    let v = parse_complex(raw)
        .ok_or_else(|| corrupt(row, format!("`{raw}` is not a length marker for {name}")))?;
    let rounded = v.re.round();
    if !rounded.is_finite() || rounded < 0.0 {
        return Err(corrupt(
            row,
            format!("length marker for {name} must be non-negative, got {v}"),
        ));
    }
    Ok(rounded as usize)
}
