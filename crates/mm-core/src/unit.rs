//! Runtime units.
//!
//! A `Unit` maps a magnitude onto the coherent SI unit of its dimension:
//! `base = value * scale + offset`. Only temperature scales such as `degC`
//! carry an offset, and those may not be composed with anything else.
//!
//! Units are parsed from text such as `"kg/m^3"`, `"m**-1"`, `"J/(kg*K)"`,
//! `"Pa s"`, `"1/s"` or `"degC"`.

use core::fmt;
use core::str::FromStr;

use crate::dimension::Dimension;
use crate::error::{MmError, MmResult};
use crate::numeric::{Real, ensure_finite};

#[derive(Clone, Debug, PartialEq)]
pub struct Unit {
    symbol: String,
    dim: Dimension,
    scale: Real,
    offset: Real,
}

impl Unit {
    pub fn new(symbol: impl Into<String>, dim: Dimension, scale: Real, offset: Real) -> Self {
        Self {
            symbol: symbol.into(),
            dim,
            scale,
            offset,
        }
    }

    pub fn dimensionless() -> Self {
        Self::new("", Dimension::NONE, 1.0, 0.0)
    }

    /// The coherent SI unit of `dim` (scale 1, no offset).
    pub fn si(dim: Dimension) -> Self {
        Self::new(si_symbol(dim), dim, 1.0, 0.0)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn dimension(&self) -> Dimension {
        self.dim
    }

    pub fn scale(&self) -> Real {
        self.scale
    }

    pub fn offset(&self) -> Real {
        self.offset
    }

    pub fn has_offset(&self) -> bool {
        self.offset != 0.0
    }

    pub fn is_dimensionless(&self) -> bool {
        self.dim.is_dimensionless()
    }

    /// Same dimension, scale and offset, whatever the symbol says.
    pub fn same_as(&self, other: &Unit) -> bool {
        self.dim == other.dim && self.scale == other.scale && self.offset == other.offset
    }

    pub fn is_compatible(&self, other: &Unit) -> bool {
        self.dim == other.dim
    }

    #[inline]
    pub fn to_base(&self, v: Real) -> Real {
        v * self.scale + self.offset
    }

    #[inline]
    pub fn from_base(&self, v: Real) -> Real {
        (v - self.offset) / self.scale
    }

    /// Factor and shift taking a magnitude in `self` to one in `target`.
    pub fn conversion_to(&self, target: &Unit) -> MmResult<(Real, Real)> {
        if self.dim != target.dim {
            return Err(MmError::Dimensionality {
                from: self.to_string(),
                to: target.to_string(),
                from_dim: self.dim.to_string(),
                to_dim: target.dim.to_string(),
            });
        }
        let factor = self.scale / target.scale;
        let shift = (self.offset - target.offset) / target.scale;
        Ok((factor, shift))
    }

    pub fn mul(&self, other: &Unit) -> MmResult<Unit> {
        self.reject_offset()?;
        other.reject_offset()?;
        Ok(Unit::new(
            join(&self.symbol, '*', &other.symbol),
            self.dim.mul(other.dim),
            self.scale * other.scale,
            0.0,
        ))
    }

    pub fn div(&self, other: &Unit) -> MmResult<Unit> {
        self.reject_offset()?;
        other.reject_offset()?;
        Ok(Unit::new(
            join(&self.symbol, '/', &other.symbol),
            self.dim.div(other.dim),
            self.scale / other.scale,
            0.0,
        ))
    }

    pub fn powi(&self, n: i32) -> MmResult<Unit> {
        if n == 1 {
            return Ok(self.clone());
        }
        self.reject_offset()?;
        let symbol = match (n, self.symbol.as_str()) {
            (0, _) | (_, "") => String::new(),
            (_, s) => format!("{}^{n}", group(s)),
        };
        Ok(Unit::new(symbol, self.dim.powi(n), self.scale.powi(n), 0.0))
    }

    pub fn recip(&self) -> MmResult<Unit> {
        self.powi(-1)
    }

    /// `n`-th root; every dimension exponent must be divisible by `n`.
    pub fn root(&self, n: i32) -> MmResult<Unit> {
        self.reject_offset()?;
        let dim = self.dim.root(n).ok_or(MmError::InvalidArg {
            what: "root of a unit whose exponents are not divisible",
        })?;
        let scale = self.scale.powf(1.0 / Real::from(n));
        let symbol = if self.scale == 1.0 {
            si_symbol(dim)
        } else {
            format!("{}^(1/{n})", group(&self.symbol))
        };
        Ok(Unit::new(symbol, dim, scale, 0.0))
    }

    pub fn parse(text: &str) -> MmResult<Unit> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Unit::dimensionless());
        }
        let tokens = tokenize(trimmed)?;
        let mut parser = Parser { tokens, pos: 0 };
        let mut unit = parser.expr()?;
        if parser.pos != parser.tokens.len() {
            return Err(MmError::Parse {
                what: format!("trailing input in unit '{trimmed}'"),
            });
        }
        unit.symbol = trimmed.to_string();
        Ok(unit)
    }

    fn reject_offset(&self) -> MmResult<()> {
        if self.has_offset() {
            Err(MmError::OffsetUnit {
                unit: self.symbol.clone(),
            })
        } else {
            Ok(())
        }
    }
}

impl FromStr for Unit {
    type Err = MmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::parse(s)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.symbol.is_empty() {
            write!(f, "dimensionless")
        } else {
            write!(f, "{}", self.symbol)
        }
    }
}

fn group(s: &str) -> String {
    if s.contains(['*', '/', '^', ' ']) {
        format!("({s})")
    } else {
        s.to_string()
    }
}

fn join(a: &str, op: char, b: &str) -> String {
    match (a.is_empty(), b.is_empty(), op) {
        (true, true, _) => String::new(),
        (false, true, _) => a.to_string(),
        (true, false, '*') => b.to_string(),
        (true, false, _) => format!("1/{}", group(b)),
        (false, false, '*') => format!("{a}*{}", group(b)),
        (false, false, _) => format!("{}/{}", group(a), group(b)),
    }
}

fn si_symbol(dim: Dimension) -> String {
    const SYMBOLS: [&str; 7] = ["m", "kg", "s", "A", "K", "mol", "cd"];
    // kg reads better first, as in kg/m^3 or kg*m^2/s^2.
    const ORDER: [usize; 7] = [1, 0, 2, 3, 4, 5, 6];
    let exps = dim.exponents();
    let term = |i: usize| {
        let e = exps[i].abs();
        if e == 1 {
            SYMBOLS[i].to_string()
        } else {
            format!("{}^{e}", SYMBOLS[i])
        }
    };
    let num: Vec<String> = ORDER.iter().filter(|&&i| exps[i] > 0).map(|&i| term(i)).collect();
    let den: Vec<String> = ORDER.iter().filter(|&&i| exps[i] < 0).map(|&i| term(i)).collect();
    match (num.is_empty(), den.len()) {
        (true, 0) => String::new(),
        (false, 0) => num.join("*"),
        (true, 1) => format!("1/{}", den[0]),
        (true, _) => format!("1/({})", den.join("*")),
        (false, 1) => format!("{}/{}", num.join("*"), den[0]),
        (false, _) => format!("{}/({})", num.join("*"), den.join("*")),
    }
}

/// Named units: (symbol, dimension exponents, scale to SI, offset to SI, takes SI prefixes).
const NAMED: &[(&str, [i8; 7], Real, Real, bool)] = &[
    ("m", [1, 0, 0, 0, 0, 0, 0], 1.0, 0.0, true),
    ("g", [0, 1, 0, 0, 0, 0, 0], 1e-3, 0.0, true),
    ("s", [0, 0, 1, 0, 0, 0, 0], 1.0, 0.0, true),
    ("A", [0, 0, 0, 1, 0, 0, 0], 1.0, 0.0, true),
    ("K", [0, 0, 0, 0, 1, 0, 0], 1.0, 0.0, true),
    ("mol", [0, 0, 0, 0, 0, 1, 0], 1.0, 0.0, true),
    ("cd", [0, 0, 0, 0, 0, 0, 1], 1.0, 0.0, true),
    ("N", [1, 1, -2, 0, 0, 0, 0], 1.0, 0.0, true),
    ("Pa", [-1, 1, -2, 0, 0, 0, 0], 1.0, 0.0, true),
    ("J", [2, 1, -2, 0, 0, 0, 0], 1.0, 0.0, true),
    ("W", [2, 1, -3, 0, 0, 0, 0], 1.0, 0.0, true),
    ("Hz", [0, 0, -1, 0, 0, 0, 0], 1.0, 0.0, true),
    ("L", [3, 0, 0, 0, 0, 0, 0], 1e-3, 0.0, true),
    ("l", [3, 0, 0, 0, 0, 0, 0], 1e-3, 0.0, true),
    ("bar", [-1, 1, -2, 0, 0, 0, 0], 1e5, 0.0, true),
    ("P", [-1, 1, -1, 0, 0, 0, 0], 0.1, 0.0, true),
    ("min", [0, 0, 1, 0, 0, 0, 0], 60.0, 0.0, false),
    ("h", [0, 0, 1, 0, 0, 0, 0], 3600.0, 0.0, false),
    ("hr", [0, 0, 1, 0, 0, 0, 0], 3600.0, 0.0, false),
    ("day", [0, 0, 1, 0, 0, 0, 0], 86_400.0, 0.0, false),
    ("in", [1, 0, 0, 0, 0, 0, 0], 0.0254, 0.0, false),
    ("ft", [1, 0, 0, 0, 0, 0, 0], 0.3048, 0.0, false),
    ("lb", [0, 1, 0, 0, 0, 0, 0], 0.453_592_37, 0.0, false),
    ("lbm", [0, 1, 0, 0, 0, 0, 0], 0.453_592_37, 0.0, false),
    ("lbf", [1, 1, -2, 0, 0, 0, 0], 4.448_221_615_260_5, 0.0, false),
    ("psi", [-1, 1, -2, 0, 0, 0, 0], 6_894.757_293_168, 0.0, false),
    ("atm", [-1, 1, -2, 0, 0, 0, 0], 101_325.0, 0.0, false),
    ("degC", [0, 0, 0, 0, 1, 0, 0], 1.0, 273.15, false),
    ("°C", [0, 0, 0, 0, 1, 0, 0], 1.0, 273.15, false),
    ("degF", [0, 0, 0, 0, 1, 0, 0], 5.0 / 9.0, 273.15 - 32.0 * 5.0 / 9.0, false),
    ("°F", [0, 0, 0, 0, 1, 0, 0], 5.0 / 9.0, 273.15 - 32.0 * 5.0 / 9.0, false),
    ("degR", [0, 0, 0, 0, 1, 0, 0], 5.0 / 9.0, 0.0, false),
    ("delta_degC", [0, 0, 0, 0, 1, 0, 0], 1.0, 0.0, false),
    ("percent", [0; 7], 0.01, 0.0, false),
    ("%", [0; 7], 0.01, 0.0, false),
    ("rad", [0; 7], 1.0, 0.0, false),
    ("dimensionless", [0; 7], 1.0, 0.0, false),
];

const PREFIXES: &[(&str, Real)] = &[
    ("G", 1e9),
    ("M", 1e6),
    ("k", 1e3),
    ("h", 1e2),
    ("da", 1e1),
    ("d", 1e-1),
    ("c", 1e-2),
    ("m", 1e-3),
    ("u", 1e-6),
    ("µ", 1e-6),
    ("n", 1e-9),
];

fn lookup(name: &str) -> MmResult<Unit> {
    let named = |sym: &str| NAMED.iter().find(|(s, ..)| *s == sym);
    if let Some(&(s, dim, scale, offset, _)) = named(name) {
        return Ok(Unit::new(s, Dimension::new(dim), scale, offset));
    }
    for &(prefix, factor) in PREFIXES {
        if let Some(rest) = name.strip_prefix(prefix)
            && let Some(&(_, dim, scale, _, true)) = named(rest)
        {
            return Ok(Unit::new(name, Dimension::new(dim), scale * factor, 0.0));
        }
    }
    Err(MmError::UnknownUnit {
        unit: name.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Number(Real),
    Mul,
    Div,
    Pow,
    Open,
    Close,
}

fn tokenize(text: &str) -> MmResult<Vec<Token>> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' => i += 1,
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::Pow);
                i += 2;
            }
            '*' | '·' => {
                tokens.push(Token::Mul);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Div);
                i += 1;
            }
            '^' => {
                tokens.push(Token::Pow);
                i += 1;
            }
            '(' => {
                tokens.push(Token::Open);
                i += 1;
            }
            ')' => {
                tokens.push(Token::Close);
                i += 1;
            }
            '²' | '³' => {
                tokens.push(Token::Pow);
                tokens.push(Token::Number(if c == '²' { 2.0 } else { 3.0 }));
                i += 1;
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => {
                let start = i;
                i += 1;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let s: String = chars[start..i].iter().collect();
                let n = s.parse::<Real>().map_err(|_| MmError::Parse {
                    what: format!("bad number '{s}' in unit '{text}'"),
                })?;
                tokens.push(Token::Number(n));
            }
            c if c.is_alphabetic() || c == '_' || c == '%' || c == '°' => {
                let start = i;
                i += 1;
                while i < chars.len() && (chars[i].is_alphabetic() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
                // `m3` is shorthand for `m^3`.
                if i < chars.len() && chars[i].is_ascii_digit() {
                    tokens.push(Token::Pow);
                }
            }
            other => {
                return Err(MmError::Parse {
                    what: format!("unexpected '{other}' in unit '{text}'"),
                });
            }
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        t
    }

    fn expr(&mut self) -> MmResult<Unit> {
        let mut acc = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Mul) => {
                    self.pos += 1;
                    acc = acc.mul(&self.term()?)?;
                }
                Some(Token::Div) => {
                    self.pos += 1;
                    acc = acc.div(&self.term()?)?;
                }
                // Juxtaposition multiplies: "Pa s", "kg K".
                Some(Token::Ident(_)) | Some(Token::Open) => {
                    acc = acc.mul(&self.term()?)?;
                }
                _ => return Ok(acc),
            }
        }
    }

    fn term(&mut self) -> MmResult<Unit> {
        let base = self.factor()?;
        if self.peek() != Some(&Token::Pow) {
            return Ok(base);
        }
        self.pos += 1;
        let exp = match self.next() {
            Some(Token::Number(n)) => n,
            Some(Token::Open) => {
                let n = match self.next() {
                    Some(Token::Number(n)) => n,
                    _ => return Err(self.error("expected exponent")),
                };
                if self.next() != Some(Token::Close) {
                    return Err(self.error("expected ')' after exponent"));
                }
                n
            }
            _ => return Err(self.error("expected exponent")),
        };
        if exp.fract() != 0.0 {
            return Err(self.error("fractional exponents are not supported"));
        }
        base.powi(exp as i32)
    }

    fn factor(&mut self) -> MmResult<Unit> {
        match self.next() {
            Some(Token::Ident(name)) => lookup(&name),
            Some(Token::Number(n)) => {
                let n = ensure_finite(n, "unit factor")?;
                Ok(Unit::new("", Dimension::NONE, n, 0.0))
            }
            Some(Token::Open) => {
                let inner = self.expr()?;
                if self.next() != Some(Token::Close) {
                    return Err(self.error("unbalanced parentheses"));
                }
                Ok(inner)
            }
            _ => Err(self.error("expected a unit")),
        }
    }

    fn error(&self, what: &str) -> MmError {
        MmError::Parse {
            what: format!("{what} at token {}", self.pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(s: &str) -> Unit {
        Unit::parse(s).unwrap()
    }

    #[test]
    fn parse_simple_and_prefixed() {
        assert_eq!(u("m").dimension(), Dimension::LENGTH);
        assert_eq!(u("mm").scale(), 1e-3);
        assert_eq!(u("kg").scale(), 1.0);
        assert_eq!(u("kPa").scale(), 1e3);
        assert_eq!(u("ms").dimension(), Dimension::TIME);
        assert_eq!(u("min").scale(), 60.0);
    }

    #[test]
    fn parse_compound_forms() {
        let density = u("kg/m^3");
        assert_eq!(density.dimension(), u("g/cm**3").dimension());
        assert!((u("g/cm**3").scale() - 1000.0).abs() < 1e-9);
        assert_eq!(u("kg/m3").dimension(), density.dimension());
        assert_eq!(u("m**-1").dimension(), Dimension::NONE.div(Dimension::LENGTH));
        assert_eq!(u("1/m").dimension(), u("m^-1").dimension());
        assert_eq!(u("J/(kg*K)").dimension(), u("J/kg/K").dimension());
        assert_eq!(u("Pa s").dimension(), u("Pa*s").dimension());
        assert_eq!(u("m²").dimension(), Dimension::LENGTH.powi(2));
    }

    #[test]
    fn parsed_unit_keeps_its_text() {
        assert_eq!(u(" kg/m^3 ").symbol(), "kg/m^3");
        assert_eq!(u("").to_string(), "dimensionless");
    }

    #[test]
    fn unknown_and_malformed_units_fail() {
        assert!(matches!(
            Unit::parse("furlong"),
            Err(MmError::UnknownUnit { unit }) if unit == "furlong"
        ));
        assert!(matches!(Unit::parse("(m"), Err(MmError::Parse { .. })));
        assert!(matches!(Unit::parse("m^"), Err(MmError::Parse { .. })));
        assert!(matches!(Unit::parse("m^0.5"), Err(MmError::Parse { .. })));
        let huge = format!("1{}/m", "0".repeat(400));
        assert!(matches!(Unit::parse(&huge), Err(MmError::NonFinite { .. })));
    }

    #[test]
    fn offset_units_do_not_compose() {
        assert!(u("degC").has_offset());
        assert!(matches!(
            Unit::parse("degC/s"),
            Err(MmError::OffsetUnit { .. })
        ));
        assert!(u("K/s").mul(&u("s")).is_ok());
    }

    #[test]
    fn celsius_to_kelvin_conversion() {
        let (factor, shift) = u("degC").conversion_to(&u("K")).unwrap();
        assert!((25.0 * factor + shift - 298.15).abs() < 1e-9);
        let (factor, shift) = u("degF").conversion_to(&u("degC")).unwrap();
        assert!((212.0 * factor + shift - 100.0).abs() < 1e-9);
    }

    #[test]
    fn incompatible_conversion_reports_dimensions() {
        let err = u("m").conversion_to(&u("s")).unwrap_err();
        match err {
            MmError::Dimensionality { from_dim, to_dim, .. } => {
                assert_eq!(from_dim, "[length]");
                assert_eq!(to_dim, "[time]");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn si_symbols_are_generated() {
        assert_eq!(Unit::si(u("kg/m^3").dimension()).symbol(), "kg/m^3");
        assert_eq!(Unit::si(u("Pa*s").dimension()).symbol(), "kg/(m*s)");
        assert_eq!(Unit::si(u("1/s").dimension()).symbol(), "1/s");
        assert_eq!(u("m^2").root(2).unwrap().symbol(), "m");
    }
}
