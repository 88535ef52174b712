//! Conversion of raw token values into typed values.
//!
//! Every per-type function returns a plain reason string on mismatch; [`cast`] wraps it
//! into a [`TypeCastingError`] naming the option or parameter.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use cliroute_metadata::DesignType;
use regex::Regex;
use serde::Serialize;

use crate::error::{ArgumentKind, TypeCastingError};
use crate::tokenizer::{RawValue, Scalar};

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(?:\.\d*)?$").expect("valid number regex"));
static INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+$").expect("valid integer regex"));

/// A bound value, typed or handed through.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Number(f64),
    String(String),
    Path(PathBuf),
    List(Vec<Value>),
}

impl From<&Scalar> for Value {
    fn from(scalar: &Scalar) -> Self {
        match scalar {
            Scalar::Text(s) => Self::String(s.clone()),
            Scalar::Flag => Self::Bool(true),
        }
    }
}

impl From<&RawValue> for Value {
    fn from(raw: &RawValue) -> Self {
        match raw {
            RawValue::One(scalar) => scalar.into(),
            RawValue::Many(values) => Self::List(values.iter().map(Value::from).collect()),
        }
    }
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Self::Path(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }
}

pub fn cast_string(value: &Scalar) -> Result<String, String> {
    match value {
        Scalar::Text(s) => Ok(s.clone()),
        Scalar::Flag => Err("expected a string value".to_string()),
    }
}

pub fn cast_number(value: &Scalar) -> Result<f64, String> {
    let Scalar::Text(s) = value else {
        return Err("expected a number".to_string());
    };
    if !NUMBER.is_match(s) {
        return Err("expected a number".to_string());
    }
    s.parse::<f64>().map_err(|e| format!("expected a number ({e})"))
}

pub fn cast_integer(value: &Scalar) -> Result<i64, String> {
    let Scalar::Text(s) = value else {
        return Err("expected an integer".to_string());
    };
    if !INTEGER.is_match(s) {
        return Err("expected an integer".to_string());
    }
    s.parse::<i64>().map_err(|e| format!("expected an integer ({e})"))
}

pub fn cast_boolean(value: &Scalar, kind: ArgumentKind) -> Result<bool, String> {
    let parsed = match value {
        Scalar::Flag => Some(true),
        Scalar::Text(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
    };
    parsed.ok_or_else(|| match kind {
        ArgumentKind::Option => {
            "boolean options are flags: pass them bare or with true, false, 1 or 0".to_string()
        }
        ArgumentKind::Parameter => "expected one of true, false, 1 or 0".to_string(),
    })
}

/// Resolve against the working directory; the result must exist.
pub fn cast_path(value: &Scalar) -> Result<PathBuf, String> {
    let Scalar::Text(s) = value else {
        return Err("expected a path".to_string());
    };
    let cwd = std::env::current_dir()
        .map_err(|e| format!("failed to get current directory: {e}"))?;
    let resolved = cwd.join(s);
    match resolved.try_exists() {
        Ok(true) => Ok(resolved),
        Ok(false) => Err(format!("path does not exist: {}", resolved.display())),
        Err(e) => Err(format!("cannot access {}: {e}", resolved.display())),
    }
}

fn cast_scalar(value: &Scalar, target: DesignType, kind: ArgumentKind) -> Result<Value, String> {
    match target {
        DesignType::String => cast_string(value).map(Value::String),
        DesignType::Number => cast_number(value).map(Value::Number),
        DesignType::Integer => cast_integer(value).map(Value::Integer),
        DesignType::Boolean => cast_boolean(value, kind).map(Value::Bool),
        DesignType::Path => cast_path(value).map(Value::Path),
        DesignType::Any => Ok(value.into()),
    }
}

/// Cast `value` to `target`. Repeated values are cast one by one into a list.
pub fn cast(
    value: &RawValue,
    target: DesignType,
    name: &str,
    kind: ArgumentKind,
) -> Result<Value, TypeCastingError> {
    let fail = |scalar: &Scalar, reason: String| TypeCastingError {
        name: name.to_string(),
        kind,
        expected: target,
        value: scalar.display().to_string(),
        reason,
    };

    match value {
        RawValue::One(scalar) => cast_scalar(scalar, target, kind).map_err(|r| fail(scalar, r)),
        RawValue::Many(values) => values
            .iter()
            .map(|scalar| cast_scalar(scalar, target, kind).map_err(|r| fail(scalar, r)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
    }
}
