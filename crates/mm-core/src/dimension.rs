//! Physical dimension as integer exponents over the SI base dimensions.

use core::fmt;

const BASE_NAMES: [&str; 7] = [
    "length",
    "mass",
    "time",
    "current",
    "temperature",
    "substance",
    "luminosity",
];

/// Exponents over `[length, mass, time, current, temperature, substance, luminosity]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Dimension([i8; 7]);

impl Dimension {
    pub const NONE: Self = Self([0; 7]);
    pub const LENGTH: Self = Self([1, 0, 0, 0, 0, 0, 0]);
    pub const MASS: Self = Self([0, 1, 0, 0, 0, 0, 0]);
    pub const TIME: Self = Self([0, 0, 1, 0, 0, 0, 0]);
    pub const CURRENT: Self = Self([0, 0, 0, 1, 0, 0, 0]);
    pub const TEMPERATURE: Self = Self([0, 0, 0, 0, 1, 0, 0]);
    pub const SUBSTANCE: Self = Self([0, 0, 0, 0, 0, 1, 0]);
    pub const LUMINOSITY: Self = Self([0, 0, 0, 0, 0, 0, 1]);

    pub const fn new(exponents: [i8; 7]) -> Self {
        Self(exponents)
    }

    pub fn exponents(&self) -> [i8; 7] {
        self.0
    }

    pub fn is_dimensionless(&self) -> bool {
        self.0 == [0; 7]
    }

    pub fn mul(self, other: Self) -> Self {
        let mut out = self.0;
        for (o, e) in out.iter_mut().zip(other.0) {
            *o += e;
        }
        Self(out)
    }

    pub fn div(self, other: Self) -> Self {
        let mut out = self.0;
        for (o, e) in out.iter_mut().zip(other.0) {
            *o -= e;
        }
        Self(out)
    }

    pub fn powi(self, n: i32) -> Self {
        // Exponents beyond i8 are not physical; saturate rather than wrap.
        let mut out = self.0;
        for o in out.iter_mut() {
            *o = (i32::from(*o) * n).clamp(i8::MIN.into(), i8::MAX.into()) as i8;
        }
        Self(out)
    }

    /// Integer root, if every exponent is divisible by `n`.
    pub fn root(self, n: i32) -> Option<Self> {
        if n == 0 {
            return None;
        }
        let mut out = self.0;
        for o in out.iter_mut() {
            let e = i32::from(*o);
            if e % n != 0 {
                return None;
            }
            *o = (e / n) as i8;
        }
        Some(Self(out))
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "dimensionless");
        }
        let term = |name: &str, e: i8| {
            if e.abs() == 1 {
                format!("[{name}]")
            } else {
                format!("[{name}]^{}", e.abs())
            }
        };
        let num: Vec<String> = BASE_NAMES
            .iter()
            .zip(self.0)
            .filter(|(_, e)| *e > 0)
            .map(|(n, e)| term(n, e))
            .collect();
        let den: Vec<String> = BASE_NAMES
            .iter()
            .zip(self.0)
            .filter(|(_, e)| *e < 0)
            .map(|(n, e)| term(n, e))
            .collect();
        let num = if num.is_empty() {
            "1".to_string()
        } else {
            num.join("*")
        };
        if den.is_empty() {
            write!(f, "{num}")
        } else {
            write!(f, "{num}/{}", den.join("*"))
        }
    }
}
