//! Motion samples and their line-oriented text formats

use serde::{Deserialize, Serialize};
use std::io::BufRead;
use thiserror::Error;

/// Errors produced while reading motion samples
#[derive(Debug, Error)]
pub enum MotionError {
    #[error("invalid sample on line {line}: {reason}")]
    InvalidSample { line: usize, reason: String },

    #[error("failed to read samples")]
    Io(#[from] std::io::Error),
}

/// One acceleration-including-gravity reading
///
/// Axes are always finite: a missing or non-finite reading becomes 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl MotionSample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: finite_or_zero(x),
            y: finite_or_zero(y),
            z: finite_or_zero(z),
        }
    }

    /// Build a sample from axes the sensor may not have reported
    pub fn from_axes(x: Option<f64>, y: Option<f64>, z: Option<f64>) -> Self {
        Self::new(x.unwrap_or(0.0), y.unwrap_or(0.0), z.unwrap_or(0.0))
    }

    /// Sum of absolute axis values
    pub fn total_motion(&self) -> f64 {
        self.x.abs() + self.y.abs() + self.z.abs()
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[derive(Deserialize)]
struct RawSample {
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    z: Option<f64>,
}

/// Parse one line of a recording
///
/// Accepts a JSON object (`{"x": 1.0, "y": -2.5, "z": 9.8}`) or bare
/// comma-separated values (`1.0,-2.5,9.8`). Missing keys, `null` and empty
/// fields read as 0. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str, line_number: usize) -> Result<Option<MotionSample>, MotionError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let invalid = |reason: String| MotionError::InvalidSample {
        line: line_number,
        reason,
    };

    if trimmed.starts_with('{') {
        let raw: RawSample = serde_json::from_str(trimmed).map_err(|e| invalid(e.to_string()))?;
        return Ok(Some(MotionSample::from_axes(raw.x, raw.y, raw.z)));
    }

    let fields: Vec<&str> = trimmed.split(',').map(str::trim).collect();
    if fields.len() != 3 {
        return Err(invalid(format!("expected 3 fields, found {}", fields.len())));
    }

    let mut axes = [None; 3];
    for (axis, field) in axes.iter_mut().zip(&fields) {
        if !field.is_empty() {
            let value = field
                .parse::<f64>()
                .map_err(|e| invalid(format!("{:?}: {}", field, e)))?;
            *axis = Some(value);
        }
    }

    Ok(Some(MotionSample::from_axes(axes[0], axes[1], axes[2])))
}

/// Read a whole recording, failing on the first malformed line
pub fn read_samples<R: BufRead>(reader: R) -> Result<Vec<MotionSample>, MotionError> {
    let mut samples = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        if let Some(sample) = parse_line(&line?, index + 1)? {
            samples.push(sample);
        }
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_missing_axes_are_zero() {
        let sample = MotionSample::from_axes(Some(1.5), None, Some(-2.0));
        assert_eq!(sample, MotionSample::new(1.5, 0.0, -2.0));
    }

    #[test]
    fn test_non_finite_axes_are_zero() {
        let sample = MotionSample::new(f64::NAN, f64::INFINITY, f64::NEG_INFINITY);
        assert_eq!(sample, MotionSample::default());
    }

    #[test]
    fn test_total_motion() {
        assert_eq!(MotionSample::new(1.0, -2.0, 3.0).total_motion(), 6.0);
    }

    #[test]
    fn test_parse_json_line() {
        let sample = parse_line(r#"{"x": 0.5, "y": -10, "z": 9.81}"#, 1).unwrap();
        assert_eq!(sample, Some(MotionSample::new(0.5, -10.0, 9.81)));
    }

    #[test]
    fn test_parse_json_nulls_and_missing_keys() {
        let sample = parse_line(r#"{"x": null, "z": 4}"#, 1).unwrap();
        assert_eq!(sample, Some(MotionSample::new(0.0, 0.0, 4.0)));
    }

    #[test]
    fn test_parse_csv_line() {
        let sample = parse_line(" 1.0, -2.5 ,9.8", 1).unwrap();
        assert_eq!(sample, Some(MotionSample::new(1.0, -2.5, 9.8)));
    }

    #[test]
    fn test_parse_csv_empty_field() {
        let sample = parse_line("1.0,,3.0", 1).unwrap();
        assert_eq!(sample, Some(MotionSample::new(1.0, 0.0, 3.0)));
    }

    #[test]
    fn test_parse_csv_nan_is_zero() {
        let sample = parse_line("NaN,2,3", 1).unwrap();
        assert_eq!(sample, Some(MotionSample::new(0.0, 2.0, 3.0)));
    }

    #[test]
    fn test_parse_skips_blank_and_comments() {
        assert!(parse_line("", 1).unwrap().is_none());
        assert!(parse_line("   ", 1).unwrap().is_none());
        assert!(parse_line("# x,y,z", 1).unwrap().is_none());
    }

    #[test]
    fn test_parse_rejects_wrong_arity() {
        match parse_line("1,2", 7) {
            Err(MotionError::InvalidSample { line, .. }) => assert_eq!(line, 7),
            other => panic!("expected InvalidSample, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_line("a,b,c", 1).is_err());
        assert!(parse_line("{not json", 1).is_err());
    }

    #[test]
    fn test_read_samples() {
        let text = "# recording\n0,0,0\n{\"x\":1,\"y\":1,\"z\":1}\n\n0,-10,0\n";
        let samples = read_samples(Cursor::new(text)).unwrap();
        assert_eq!(
            samples,
            vec![
                MotionSample::new(0.0, 0.0, 0.0),
                MotionSample::new(1.0, 1.0, 1.0),
                MotionSample::new(0.0, -10.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_read_samples_reports_line_number() {
        let text = "0,0,0\n0,0\n";
        let err = read_samples(Cursor::new(text)).unwrap_err();
        assert!(err.to_string().contains("line 2"), "{}", err);
    }
}
