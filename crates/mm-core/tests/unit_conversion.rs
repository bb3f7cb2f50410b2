//! Property tests for runtime unit conversion.

use mm_core::{Quantity, Tolerances, Unit, nearly_equal};
use proptest::prelude::*;

const LENGTHS: [&str; 6] = ["m", "mm", "km", "in", "ft", "um"];
const PRESSURES: [&str; 5] = ["Pa", "kPa", "bar", "psi", "atm"];

proptest! {
    #[test]
    fn length_round_trip(v in -1e6_f64..1e6, a in 0usize..6, b in 0usize..6) {
        let from = Unit::parse(LENGTHS[a]).unwrap();
        let to = Unit::parse(LENGTHS[b]).unwrap();
        let q = Quantity::new(v, from.clone());
        let back = q.to(&to).unwrap().to(&from).unwrap();
        let tol = Tolerances { abs: 1e-9, rel: 1e-9 };
        prop_assert!(nearly_equal(back.value().unwrap(), v, tol));
    }

    #[test]
    fn pressure_conversion_preserves_amount(v in 0.0_f64..1e7, a in 0usize..5, b in 0usize..5) {
        let q = Quantity::new(v, Unit::parse(PRESSURES[a]).unwrap());
        let converted = q.to(&Unit::parse(PRESSURES[b]).unwrap()).unwrap();
        let tol = Tolerances { abs: 1e-9, rel: 1e-9 };
        prop_assert!(q.approx_eq(&converted, tol));
    }

    #[test]
    fn temperature_scales_agree_on_kelvin(c in -273.15_f64..2000.0) {
        let celsius = Quantity::new(c, Unit::parse("degC").unwrap());
        let fahrenheit = celsius.to(&Unit::parse("degF").unwrap()).unwrap();
        let kelvin = fahrenheit.to(&Unit::parse("K").unwrap()).unwrap();
        let tol = Tolerances { abs: 1e-9, rel: 1e-12 };
        prop_assert!(nearly_equal(kelvin.value().unwrap(), c + 273.15, tol));
    }
}

#[test]
fn mixed_dimensions_never_convert() {
    let rho = Quantity::parse("1000 kg/m^3").unwrap();
    for target in ["m^3/kg", "N/m^3", "Pa", "K"] {
        assert!(rho.to(&Unit::parse(target).unwrap()).is_err(), "{target}");
    }
}
