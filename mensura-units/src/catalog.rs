//! Standard unit catalog organized by category

use mensura_core::{Factor, ReciprocalConverter, UnitConverter, UnitError};
use tracing::warn;

use crate::registry::UnitRegistry;

/// Populate `registry` with the standard units. Definitions are static, so a
/// failure here is a bug in this table; it is logged and the rest of that
/// category skipped.
pub(crate) fn register_standard_units(registry: &mut UnitRegistry) {
    let groups: [(&str, fn(&mut UnitRegistry) -> Result<(), UnitError>); 8] = [
        ("base", register_base_units),
        ("derived", register_derived_units),
        ("mass", register_mass_units),
        ("length", register_length_units),
        ("time", register_time_units),
        ("volume", register_volume_units),
        ("pressure", register_pressure_units),
        ("temperature", register_temperature_units),
    ];

    for (category, register) in groups {
        if let Err(e) = register(registry) {
            warn!(category, error = %e, "failed to register standard units");
        }
    }
    if let Err(e) = register_miscellaneous_units(registry) {
        warn!(category = "miscellaneous", error = %e, "failed to register standard units");
    }
}

fn register_base_units(r: &mut UnitRegistry) -> Result<(), UnitError> {
    r.define_base("m", "metre")?;
    r.define_unprefixed_base("kg", "kilogram")?;
    r.define_base("s", "second")?;
    r.define_base("A", "ampere")?;
    r.define_base("K", "kelvin")?;
    r.define_base("mol", "mole")?;
    r.define_base("cd", "candela")?;

    r.alias("meter", "m")?;
    r.alias("kilogram", "kg")?;
    r.alias("sec", "s")?;
    Ok(())
}

fn register_derived_units(r: &mut UnitRegistry) -> Result<(), UnitError> {
    let id = || UnitConverter::Identity;
    r.define_si("N", "newton", "kg*m/s^2", id())?;
    r.define_si("Pa", "pascal", "N/m^2", id())?;
    r.define_si("J", "joule", "N*m", id())?;
    r.define_si("W", "watt", "J/s", id())?;
    r.define_si("Hz", "hertz", "1/s", id())?;
    r.define_si("C", "coulomb", "A*s", id())?;
    r.define_si("V", "volt", "W/A", id())?;
    r.define_si("Ω", "ohm", "V/A", id())?;
    r.define_si("S", "siemens", "A/V", id())?;
    r.define_si("F", "farad", "C/V", id())?;
    r.define_si("Wb", "weber", "V*s", id())?;
    r.define_si("T", "tesla", "Wb/m^2", id())?;
    r.define_si("H", "henry", "Wb/A", id())?;

    r.alias("Ohm", "Ω")?;
    Ok(())
}

fn register_mass_units(r: &mut UnitRegistry) -> Result<(), UnitError> {
    r.define_si("g", "gram", "kg", UnitConverter::scale(Factor::from_ratio(1, 1000))?)?;
    r.define_scaled("t", "tonne", "kg", "1000")?;
    r.define_scaled("lb", "pound", "kg", "0.45359237")?;
    r.define_scaled("oz", "ounce", "lb", "1/16")?;
    Ok(())
}

fn register_length_units(r: &mut UnitRegistry) -> Result<(), UnitError> {
    r.define_scaled("micron", "micron", "µm", "1")?;
    r.define_scaled("in", "inch", "m", "0.0254")?;
    r.define_scaled("ft", "foot", "in", "12")?;
    r.define_scaled("yd", "yard", "ft", "3")?;
    r.define_scaled("mi", "mile", "ft", "5280")?;
    r.define_scaled("nmi", "nautical mile", "m", "1852")?;
    Ok(())
}

fn register_time_units(r: &mut UnitRegistry) -> Result<(), UnitError> {
    r.define_scaled("min", "minute", "s", "60")?;
    r.define_scaled("h", "hour", "min", "60")?;
    r.define_scaled("d", "day", "h", "24")?;
    r.define_scaled("week", "week", "d", "7")?;
    Ok(())
}

fn register_volume_units(r: &mut UnitRegistry) -> Result<(), UnitError> {
    r.define_si("L", "litre", "m^3", UnitConverter::scale(Factor::from_ratio(1, 1000))?)?;
    r.define_scaled("cc", "cubic centimetre", "cm^3", "1")?;
    r.define_scaled("gal", "US gallon", "in^3", "231")?;
    r.define_scaled("bbl", "oil barrel", "gal", "42")?;

    r.alias("l", "L")?;
    Ok(())
}

fn register_pressure_units(r: &mut UnitRegistry) -> Result<(), UnitError> {
    r.define_si("bar", "bar", "Pa", UnitConverter::scale(Factor::from_i64(100_000))?)?;
    r.define_scaled("atm", "standard atmosphere", "Pa", "101325")?;
    r.define_scaled("lbf", "pound-force", "lb*m/s^2", "9.80665")?;
    r.define_scaled("psi", "pound per square inch", "lbf/in^2", "1")?;
    Ok(())
}

fn register_temperature_units(r: &mut UnitRegistry) -> Result<(), UnitError> {
    // °C: K = C + 273.15
    r.define("°C", "degree Celsius", "K", UnitConverter::offset("273.15".parse()?))?;
    // °F: K = (F + 459.67) * 5/9
    let five_ninths: Factor = "5/9".parse()?;
    let offset = five_ninths.mul(&"459.67".parse()?);
    r.define("°F", "degree Fahrenheit", "K", UnitConverter::affine(five_ninths, offset)?)?;

    r.alias("degC", "°C")?;
    r.alias("degF", "°F")?;
    Ok(())
}

/// Quantities that are "unitless" yet dimensionally distinct from each
/// other: specific gravity and parts-per notation never convert into each
/// other or into plain numbers.
fn register_miscellaneous_units(r: &mut UnitRegistry) -> Result<(), UnitError> {
    r.define_scaled("%", "percent", "1", "1/100")?;

    r.define_unprefixed_base("SG", "specific gravity")?;
    r.define(
        "API",
        "API gravity",
        "SG",
        UnitConverter::reciprocal(ReciprocalConverter::api_gravity()),
    )?;

    r.define_unprefixed_base("ppm", "parts per million")?;
    r.define_scaled("ppb", "parts per billion", "ppm", "1/1000")?;
    r.define_scaled("ppmv", "parts per million by volume", "ppm", "1")?;
    r.define_scaled("ppmw", "parts per million by weight", "ppm", "1")?;
    Ok(())
}
