//! Property bundles: ready-made entity schemas.
//!
//! Bundles are composed from attribute groups the same way a material picks
//! up mass, flow or thermal behavior. Every bundle carries the `name` and
//! `category` logistic fields.

use mm_core::Real;
use mm_engine::{EngineResult, EntitySchema, SchemaBuilder};

use crate::error::{PropError, PropResult};
use crate::formulas;

/// Names accepted by [`by_name`].
pub const BUNDLE_NAMES: [&str; 6] = ["simple", "mass", "volume", "flow", "thermal", "viscosity"];

const ABSOLUTE_ZERO_C: Real = -273.15;

/// Build a bundle by its (case-insensitive) name.
pub fn by_name(name: &str) -> PropResult<EntitySchema> {
    let schema = match name.trim().to_ascii_lowercase().as_str() {
        "simple" => simple(),
        "mass" => mass(),
        "volume" => volume(),
        "flow" => flow(),
        "thermal" => thermal(),
        "viscosity" => viscosity(),
        _ => return Err(PropError::UnknownBundle(name.to_string())),
    };
    Ok(schema?)
}

/// `y = x²`, `x = √y`, `z = x / y`.
pub fn simple() -> EngineResult<EntitySchema> {
    logistics(SchemaBuilder::new("Simple"))
        .guard("x", "m")
        .guard("y", "m^2")
        .guard("z", "1/m")
        .link("x", formulas::sqrt(), [("value", "y")])
        .link("y", formulas::square(), [("value", "x")])
        .link("z", formulas::div(), [("x", "x"), ("y", "y")])
        .build()
}

pub fn mass() -> EngineResult<EntitySchema> {
    let b = density_group(logistics(SchemaBuilder::new("Mass")))
        .configure("mass", Some("kg"), None, Some("Mass of the body"))
        .configure("volume", Some("m^3"), None, Some("Volume of the body"))
        .link("mass", formulas::mul(), [("density", "density"), ("volume", "volume")]);
    b.build()
}

pub fn volume() -> EngineResult<EntitySchema> {
    logistics(SchemaBuilder::new("Volume"))
        .configure("volume", Some("m^3"), None, Some("Volume of the body"))
        .configure("distance", Some("m"), None, Some("Length of the segment"))
        .configure("cross_section", Some("m^2"), None, Some("Cross-sectional area"))
        .link(
            "volume",
            formulas::mul(),
            [("segment", "distance"), ("surface", "cross_section")],
        )
        .build()
}

/// Mass and volume flow, coupled through density.
pub fn flow() -> EngineResult<EntitySchema> {
    density_group(logistics(SchemaBuilder::new("Flow")))
        .configure("massflow", Some("kg/s"), None, Some("Mass flow rate"))
        .configure("volumeflow", Some("m^3/s"), None, Some("Volumetric flow rate"))
        .link(
            "massflow",
            formulas::mul(),
            [("density", "density"), ("volumeflow", "volumeflow")],
        )
        .link(
            "volumeflow",
            formulas::div(),
            [("massflow", "massflow"), ("density", "density")],
        )
        .build()
}

pub fn thermal() -> EngineResult<EntitySchema> {
    let b = logistics(SchemaBuilder::new("Thermal"))
        .configure(
            "temperature",
            Some("degC"),
            Some((ABSOLUTE_ZERO_C, Real::INFINITY)),
            Some("Temperature of the material"),
        )
        .configure(
            "temperature_melt",
            Some("degC"),
            Some((ABSOLUTE_ZERO_C, Real::INFINITY)),
            Some("Melting temperature of the material"),
        )
        .guard_in("temperature_vapor", "degC", ABSOLUTE_ZERO_C, Real::INFINITY)
        .guard("specific_heat_capacity", "J/(kg*K)");
    conductivity_group(density_group(b))
        .configure(
            "thermal_diffusivity",
            Some("m^2/s"),
            None,
            Some("Rate of heat transfer from the hot end to the cold end"),
        )
        .link(
            "thermal_diffusivity",
            formulas::thermal_diffusivity(),
            [
                ("thermal_conductivity", "thermal_conductivity"),
                ("density", "density"),
                ("specific_heat_capacity", "specific_heat_capacity"),
            ],
        )
        .build()
}

pub fn viscosity() -> EngineResult<EntitySchema> {
    density_group(logistics(SchemaBuilder::new("Viscosity")))
        .configure("viscosity_dynamic", Some("Pa*s"), None, Some("Dynamic viscosity"))
        .configure("viscosity_kinematic", Some("m^2/s"), None, Some("Kinematic viscosity"))
        .link(
            "viscosity_dynamic",
            formulas::mul(),
            [("viscosity_kinematic", "viscosity_kinematic"), ("density", "density")],
        )
        .link(
            "viscosity_kinematic",
            formulas::div(),
            [("viscosity_dynamic", "viscosity_dynamic"), ("density", "density")],
        )
        .build()
}

fn logistics(b: SchemaBuilder) -> SchemaBuilder {
    b.logistic("name").logistic("category")
}

/// Density, specific volume and specific weight.
fn density_group(b: SchemaBuilder) -> SchemaBuilder {
    b.configure("density", Some("kg/m^3"), None, Some("Mass per unit volume"))
        .configure("specific_volume", Some("m^3/kg"), None, Some("Volume per unit mass"))
        .configure("specific_weight", Some("N/m^3"), None, Some("Weight per unit volume"))
        .link("density", formulas::reciprocal(), [("value", "specific_volume")])
        .link(
            "density",
            formulas::from_specific_weight(),
            [("specific_weight", "specific_weight")],
        )
        .link("specific_volume", formulas::reciprocal(), [("value", "density")])
}

/// Conductivity and its reciprocal pairs.
fn conductivity_group(b: SchemaBuilder) -> SchemaBuilder {
    let pairs = [
        ("thermal_conductivity", "W/(m*K)", "thermal_resistivity", "m*K/W"),
        ("thermal_conductance", "W/K", "thermal_resistance", "K/W"),
        ("heat_transfer_coeff", "W/(m^2*K)", "thermal_insulance", "m^2*K/W"),
    ];
    let mut b = b;
    for (a, a_unit, r, r_unit) in pairs {
        b = b
            .guard(a, a_unit)
            .guard(r, r_unit)
            .link(a, formulas::reciprocal(), [("value", r)])
            .link(r, formulas::reciprocal(), [("value", a)]);
    }
    b.guard("thermal_transmittance_convection", "m^2*K/W")
        .guard("thermal_transmittance_radiation", "m^2*K/W")
}
