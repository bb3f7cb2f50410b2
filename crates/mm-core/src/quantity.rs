//! Unit-tagged values.
//!
//! A `Quantity` is an immutable magnitude (scalar or array) with a `Unit` and an
//! optional citation tag recording where the number came from. A NaN anywhere in
//! the magnitude marks the value as "not yet known".

use core::fmt;
use std::sync::Arc;

use crate::error::{MmError, MmResult};
use crate::numeric::{Real, Tolerances, nearly_equal};
use crate::unit::Unit;

#[derive(Clone, Debug, PartialEq)]
pub enum Magnitude {
    Scalar(Real),
    Array(Vec<Real>),
}

impl Magnitude {
    pub fn as_slice(&self) -> &[Real] {
        match self {
            Magnitude::Scalar(v) => std::slice::from_ref(v),
            Magnitude::Array(vs) => vs,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn scalar(&self) -> Option<Real> {
        match self {
            Magnitude::Scalar(v) => Some(*v),
            Magnitude::Array(_) => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.as_slice().iter().any(|v| v.is_nan())
    }

    pub fn map(&self, f: impl Fn(Real) -> Real) -> Magnitude {
        match self {
            Magnitude::Scalar(v) => Magnitude::Scalar(f(*v)),
            Magnitude::Array(vs) => Magnitude::Array(vs.iter().map(|&v| f(v)).collect()),
        }
    }

    /// Elementwise combination; a scalar broadcasts against an array.
    pub fn zip_with(&self, other: &Magnitude, f: impl Fn(Real, Real) -> Real) -> MmResult<Magnitude> {
        Ok(match (self, other) {
            (Magnitude::Scalar(a), Magnitude::Scalar(b)) => Magnitude::Scalar(f(*a, *b)),
            (Magnitude::Scalar(a), Magnitude::Array(bs)) => {
                Magnitude::Array(bs.iter().map(|&b| f(*a, b)).collect())
            }
            (Magnitude::Array(as_), Magnitude::Scalar(b)) => {
                Magnitude::Array(as_.iter().map(|&a| f(a, *b)).collect())
            }
            (Magnitude::Array(as_), Magnitude::Array(bs)) => {
                if as_.len() != bs.len() {
                    return Err(MmError::ShapeMismatch {
                        left: as_.len(),
                        right: bs.len(),
                    });
                }
                Magnitude::Array(as_.iter().zip(bs).map(|(&a, &b)| f(a, b)).collect())
            }
        })
    }

    pub fn approx_eq(&self, other: &Magnitude, tol: Tolerances) -> bool {
        let (a, b) = (self.as_slice(), other.as_slice());
        matches!(
            (self, other),
            (Magnitude::Scalar(_), Magnitude::Scalar(_)) | (Magnitude::Array(_), Magnitude::Array(_))
        ) && a.len() == b.len()
            && a.iter().zip(b).all(|(&x, &y)| nearly_equal(x, y, tol))
    }
}

impl From<Real> for Magnitude {
    fn from(v: Real) -> Self {
        Magnitude::Scalar(v)
    }
}

impl From<Vec<Real>> for Magnitude {
    fn from(vs: Vec<Real>) -> Self {
        Magnitude::Array(vs)
    }
}

impl fmt::Display for Magnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Magnitude::Scalar(v) => write!(f, "{v}"),
            Magnitude::Array(vs) => {
                write!(f, "[")?;
                for (i, v) in vs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Quantity {
    magnitude: Magnitude,
    unit: Unit,
    citation: Option<Arc<str>>,
}

impl Quantity {
    pub fn new(magnitude: impl Into<Magnitude>, unit: Unit) -> Self {
        Self {
            magnitude: magnitude.into(),
            unit,
            citation: None,
        }
    }

    pub fn dimensionless(magnitude: impl Into<Magnitude>) -> Self {
        Self::new(magnitude, Unit::dimensionless())
    }

    /// Shorthand for `Quantity::new(v, Unit::parse(unit)?)`.
    pub fn with_unit(magnitude: impl Into<Magnitude>, unit: &str) -> MmResult<Self> {
        Ok(Self::new(magnitude, Unit::parse(unit)?))
    }

    /// An "unknown" value in `unit`.
    pub fn unknown(unit: Unit) -> Self {
        Self::new(Real::NAN, unit)
    }

    /// Parse `"<number> <unit>"`, e.g. `"2 m"`, `"1000 kg/m^3"`, `"25degC"`.
    pub fn parse(text: &str) -> MmResult<Self> {
        let trimmed = text.trim();
        let split_idx = numeric_prefix_len(trimmed);
        let (num_part, unit_part) = trimmed.split_at(split_idx);
        let value: Real = num_part.trim().parse().map_err(|_| MmError::Parse {
            what: format!("could not parse numeric value from '{text}'"),
        })?;
        Ok(Self::new(value, Unit::parse(unit_part)?))
    }

    /// Attach a provenance tag (e.g. a bibliography key).
    pub fn with_citation(mut self, tag: impl Into<Arc<str>>) -> Self {
        self.citation = Some(tag.into());
        self
    }

    pub fn citation(&self) -> Option<&str> {
        self.citation.as_deref()
    }

    pub fn magnitude(&self) -> &Magnitude {
        &self.magnitude
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    /// The scalar magnitude, if this is not an array.
    pub fn value(&self) -> Option<Real> {
        self.magnitude.scalar()
    }

    pub fn is_unknown(&self) -> bool {
        self.magnitude.is_unknown()
    }

    /// Express the same quantity in `unit`.
    pub fn to(&self, unit: &Unit) -> MmResult<Quantity> {
        let (factor, shift) = self.unit.conversion_to(unit)?;
        Ok(Quantity {
            magnitude: self.magnitude.map(|v| v * factor + shift),
            unit: unit.clone(),
            citation: self.citation.clone(),
        })
    }

    /// Express the quantity in the coherent SI unit of its dimension.
    pub fn to_si(&self) -> Quantity {
        let unit = Unit::si(self.unit.dimension());
        Quantity {
            magnitude: self.magnitude.map(|v| self.unit.to_base(v)),
            unit,
            citation: self.citation.clone(),
        }
    }

    /// Magnitude of `self` in `unit`, as a scalar.
    pub fn value_in(&self, unit: &Unit) -> MmResult<Real> {
        self.to(unit)?.value().ok_or(MmError::InvalidArg {
            what: "expected a scalar quantity",
        })
    }

    /// Whether `self` and `other` describe the same amount, within `tol`.
    /// Incompatible dimensions compare unequal.
    pub fn approx_eq(&self, other: &Quantity, tol: Tolerances) -> bool {
        match other.to(&self.unit) {
            Ok(other) => self.magnitude.approx_eq(&other.magnitude, tol),
            Err(_) => false,
        }
    }

    /// Every element lies in `[low, high]`. NaN elements are skipped.
    pub fn within(&self, low: &Quantity, high: &Quantity) -> MmResult<bool> {
        let low = low.to(&self.unit)?;
        let high = high.to(&self.unit)?;
        let values = self.magnitude.as_slice();
        let ok = values.iter().enumerate().all(|(i, &v)| {
            let lo = pick(&low.magnitude, i);
            let hi = pick(&high.magnitude, i);
            v.is_nan() || (lo <= v && v <= hi)
        });
        Ok(ok)
    }

    pub fn times(&self, other: &Quantity) -> MmResult<Quantity> {
        let (a, b) = (self.plain(), other.plain());
        Ok(Quantity::new(
            a.magnitude.zip_with(&b.magnitude, |x, y| x * y)?,
            a.unit.mul(&b.unit)?,
        ))
    }

    pub fn over(&self, other: &Quantity) -> MmResult<Quantity> {
        let (a, b) = (self.plain(), other.plain());
        Ok(Quantity::new(
            a.magnitude.zip_with(&b.magnitude, |x, y| x / y)?,
            a.unit.div(&b.unit)?,
        ))
    }

    pub fn plus(&self, other: &Quantity) -> MmResult<Quantity> {
        self.additive(other, |x, y| x + y)
    }

    pub fn minus(&self, other: &Quantity) -> MmResult<Quantity> {
        self.additive(other, |x, y| x - y)
    }

    pub fn powi(&self, n: i32) -> Quantity {
        let a = self.plain();
        match a.unit.powi(n) {
            Ok(unit) => Quantity::new(a.magnitude.map(|v| v.powi(n)), unit),
            // `plain` already stripped any offset, so this cannot fail.
            Err(_) => Quantity::unknown(Unit::si(a.unit.dimension().powi(n))),
        }
    }

    pub fn recip(&self) -> Quantity {
        self.powi(-1)
    }

    /// Real power; only defined for dimensionless quantities.
    pub fn powf(&self, x: Real) -> MmResult<Quantity> {
        if !self.unit.is_dimensionless() {
            return Err(MmError::InvalidArg {
                what: "real exponent of a dimensioned quantity",
            });
        }
        let a = self.to(&Unit::dimensionless())?;
        Ok(Quantity::dimensionless(a.magnitude.map(|v| v.powf(x))))
    }

    pub fn sqrt(&self) -> MmResult<Quantity> {
        let a = self.plain();
        let unit = a.unit.root(2)?;
        Ok(Quantity::new(a.magnitude.map(Real::sqrt), unit))
    }

    /// Multiply by a plain number, keeping the unit.
    pub fn scaled(&self, k: Real) -> Quantity {
        let a = self.plain();
        Quantity::new(a.magnitude.map(|v| v * k), a.unit)
    }

    /// Offset units cannot be multiplied; fall back to their absolute SI form.
    fn plain(&self) -> Quantity {
        if self.unit.has_offset() {
            self.to_si()
        } else {
            self.clone()
        }
    }

    fn additive(&self, other: &Quantity, f: impl Fn(Real, Real) -> Real) -> MmResult<Quantity> {
        let (a, b) = if self.unit.has_offset() || other.unit.has_offset() {
            (self.to_si(), other.to_si())
        } else {
            (self.clone(), other.to(&self.unit)?)
        };
        Ok(Quantity::new(a.magnitude.zip_with(&b.magnitude, f)?, a.unit))
    }
}

fn pick(m: &Magnitude, i: usize) -> Real {
    match m {
        Magnitude::Scalar(v) => *v,
        Magnitude::Array(vs) => vs.get(i).copied().unwrap_or(Real::NAN),
    }
}

fn numeric_prefix_len(s: &str) -> usize {
    let mut seen_digit = false;
    for (i, c) in s.char_indices() {
        let numeric = c.is_ascii_digit()
            || c == '.'
            || ((c == '-' || c == '+') && (i == 0 || s[..i].ends_with(['e', 'E'])))
            || ((c == 'e' || c == 'E')
                && seen_digit
                && s[i + 1..].starts_with(|n: char| n.is_ascii_digit() || n == '-' || n == '+'));
        if !numeric {
            return i;
        }
        seen_digit |= c.is_ascii_digit();
    }
    s.len()
}

impl From<Real> for Quantity {
    fn from(v: Real) -> Self {
        Quantity::dimensionless(v)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.symbol().is_empty() {
            write!(f, "{}", self.magnitude)
        } else {
            write!(f, "{} {}", self.magnitude, self.unit.symbol())
        }
    }
}
