// mm-core/src/units.rs

//! Statically typed SI quantities (uom) and their bridge to runtime `Quantity`.
//!
//! Formulas and callers that know their dimensions at compile time can work in
//! uom types and convert at the engine boundary:
//!
//! ```
//! use mm_core::{Quantity, units::{self, Length}};
//!
//! let x: Quantity = units::m(2.0).into();
//! assert_eq!(x.unit().symbol(), "m");
//! let back = Length::try_from(&x).unwrap();
//! assert_eq!(back.value, 2.0);
//! ```

use uom::si::f64::{
    Acceleration as UomAcceleration, Area as UomArea, DynamicViscosity as UomDynamicViscosity,
    Energy as UomEnergy, Length as UomLength, Mass as UomMass, MassDensity as UomMassDensity,
    MassRate as UomMassRate, Power as UomPower, Pressure as UomPressure, Ratio as UomRatio,
    ThermodynamicTemperature as UomThermodynamicTemperature, Time as UomTime,
    Velocity as UomVelocity, Volume as UomVolume, VolumeRate as UomVolumeRate,
};

use crate::dimension::Dimension;
use crate::error::{MmError, MmResult};
use crate::quantity::Quantity;
use crate::unit::Unit;

// Public canonical unit types (SI, f64)
pub type Accel = UomAcceleration;
pub type Area = UomArea;
pub type DynVisc = UomDynamicViscosity;
pub type Energy = UomEnergy;
pub type Length = UomLength;
pub type Mass = UomMass;
pub type Density = UomMassDensity;
pub type MassRate = UomMassRate;
pub type Power = UomPower;
pub type Pressure = UomPressure;
pub type Ratio = UomRatio;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;
pub type Velocity = UomVelocity;
pub type Volume = UomVolume;
pub type VolumeRate = UomVolumeRate;

/// Typed constructors for the quantities material bundles use most.
#[inline]
pub fn m(v: f64) -> Length {
    Length::new::<uom::si::length::meter>(v)
}

#[inline]
pub fn m3(v: f64) -> Volume {
    Volume::new::<uom::si::volume::cubic_meter>(v)
}

#[inline]
pub fn kg(v: f64) -> Mass {
    Mass::new::<uom::si::mass::kilogram>(v)
}

#[inline]
pub fn kgpm3(v: f64) -> Density {
    Density::new::<uom::si::mass_density::kilogram_per_cubic_meter>(v)
}

#[inline]
pub fn kelvin(v: f64) -> Temperature {
    Temperature::new::<uom::si::thermodynamic_temperature::kelvin>(v)
}

#[inline]
pub fn pa_s(v: f64) -> DynVisc {
    DynVisc::new::<uom::si::dynamic_viscosity::pascal_second>(v)
}

pub mod constants {
    use super::*;

    /// Standard gravity, m/s^2.
    pub const G_N: f64 = 9.806_65;

    #[inline]
    pub fn g0() -> Accel {
        Accel::new::<uom::si::acceleration::meter_per_second_squared>(G_N)
    }
}

macro_rules! bridge {
    ($($ty:ident => $unit:ty, [$($e:expr),*];)*) => {
        $(
            impl From<$ty> for Quantity {
                fn from(q: $ty) -> Self {
                    Quantity::new(q.get::<$unit>(), Unit::si(Dimension::new([$($e),*])))
                }
            }

            impl TryFrom<&Quantity> for $ty {
                type Error = MmError;

                fn try_from(q: &Quantity) -> MmResult<Self> {
                    let v = q.value_in(&Unit::si(Dimension::new([$($e),*])))?;
                    Ok(<$ty>::new::<$unit>(v))
                }
            }
        )*
    };
}

bridge! {
    Accel => uom::si::acceleration::meter_per_second_squared, [1, 0, -2, 0, 0, 0, 0];
    Area => uom::si::area::square_meter, [2, 0, 0, 0, 0, 0, 0];
    DynVisc => uom::si::dynamic_viscosity::pascal_second, [-1, 1, -1, 0, 0, 0, 0];
    Energy => uom::si::energy::joule, [2, 1, -2, 0, 0, 0, 0];
    Length => uom::si::length::meter, [1, 0, 0, 0, 0, 0, 0];
    Mass => uom::si::mass::kilogram, [0, 1, 0, 0, 0, 0, 0];
    Density => uom::si::mass_density::kilogram_per_cubic_meter, [-3, 1, 0, 0, 0, 0, 0];
    MassRate => uom::si::mass_rate::kilogram_per_second, [0, 1, -1, 0, 0, 0, 0];
    Power => uom::si::power::watt, [2, 1, -3, 0, 0, 0, 0];
    Pressure => uom::si::pressure::pascal, [-1, 1, -2, 0, 0, 0, 0];
    Ratio => uom::si::ratio::ratio, [0, 0, 0, 0, 0, 0, 0];
    Temperature => uom::si::thermodynamic_temperature::kelvin, [0, 0, 0, 0, 1, 0, 0];
    Time => uom::si::time::second, [0, 0, 1, 0, 0, 0, 0];
    Velocity => uom::si::velocity::meter_per_second, [1, 0, -1, 0, 0, 0, 0];
    Volume => uom::si::volume::cubic_meter, [3, 0, 0, 0, 0, 0, 0];
    VolumeRate => uom::si::volume_rate::cubic_meter_per_second, [3, 0, -1, 0, 0, 0, 0];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::{Tolerances, nearly_equal};

    #[test]
    fn standard_gravity_is_an_acceleration() {
        let g: Quantity = constants::g0().into();
        assert_eq!(g.unit().symbol(), "m/s^2");
        assert_eq!(g.value(), Some(constants::G_N));
    }

    #[test]
    fn typed_values_enter_as_si() {
        let rho: Quantity = kgpm3(997.0).into();
        assert_eq!(rho.unit().symbol(), "kg/m^3");
        assert_eq!(rho.value(), Some(997.0));

        let t: Quantity = kelvin(300.0).into();
        assert_eq!(t.unit().symbol(), "K");

        let mu: Quantity = pa_s(1e-3).into();
        assert_eq!(mu.unit().dimension(), Unit::parse("Pa*s").unwrap().dimension());
    }

    #[test]
    fn runtime_values_leave_as_typed() {
        let p = Quantity::parse("2 bar").unwrap();
        let typed = Pressure::try_from(&p).unwrap();
        assert!(nearly_equal(typed.value, 2e5, Tolerances::default()));

        let t = Quantity::parse("25 degC").unwrap();
        let typed = Temperature::try_from(&t).unwrap();
        assert!(nearly_equal(typed.value, 298.15, Tolerances::default()));
    }

    #[test]
    fn wrong_dimension_is_rejected() {
        let t = Quantity::parse("2 s").unwrap();
        assert!(matches!(
            Length::try_from(&t),
            Err(MmError::Dimensionality { .. })
        ));
    }
}
