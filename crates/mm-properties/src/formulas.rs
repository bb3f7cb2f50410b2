//! Elementary formulas shared by the bundles.
//!
//! The variadic helpers (`mul`, `div`, `add`, `sub`) fold their arguments in
//! declaration order, so `div` linked with `[("a", ..), ("b", ..)]` is `a / b`.

use mm_core::{MmResult, Quantity, units};
use mm_engine::{EngineError, EngineResult, Formula, FormulaArgs};

/// `value ** -1`.
pub fn reciprocal() -> Formula {
    Formula::new("reciprocal", |args| Ok(Some(args.get("value")?.recip())))
}

pub fn identity() -> Formula {
    Formula::new("identity", |args| Ok(Some(args.get("value")?.clone())))
}

pub fn square() -> Formula {
    Formula::new("square", |args| Ok(Some(args.get("value")?.powi(2))))
}

pub fn sqrt() -> Formula {
    Formula::new("sqrt", |args| Ok(Some(args.get("value")?.sqrt()?)))
}

pub fn mul() -> Formula {
    Formula::new("mul", |args| fold(args, Quantity::times))
}

pub fn div() -> Formula {
    Formula::new("div", |args| fold(args, Quantity::over))
}

pub fn add() -> Formula {
    Formula::new("add", |args| fold(args, Quantity::plus))
}

pub fn sub() -> Formula {
    Formula::new("sub", |args| fold(args, Quantity::minus))
}

/// Density from specific weight: `γ / g_n`.
pub fn from_specific_weight() -> Formula {
    Formula::new("from_specific_weight", |args| {
        let g_n = Quantity::from(units::constants::g0());
        Ok(Some(args.get("specific_weight")?.over(&g_n)?))
    })
}

/// Thermal diffusivity `α = k / (ρ c_p)`.
pub fn thermal_diffusivity() -> Formula {
    Formula::new("thermal_diffusivity", |args| {
        let k = args.get("thermal_conductivity")?;
        let rho = args.get("density")?;
        let cp = args.get("specific_heat_capacity")?;
        Ok(Some(k.over(&rho.times(cp)?)?))
    })
}

fn fold(
    args: &FormulaArgs,
    op: impl Fn(&Quantity, &Quantity) -> MmResult<Quantity>,
) -> EngineResult<Option<Quantity>> {
    let mut values = args.values();
    let first = values
        .next()
        .ok_or_else(|| EngineError::formula(args.formula(), "needs at least one argument"))?;
    let folded = values.try_fold(first.clone(), |acc, v| op(&acc, v))?;
    Ok(Some(folded))
}
