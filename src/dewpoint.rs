//! Dew point from air temperature and relative humidity.
//!
//! Magnus formula with separate coefficient pairs above and below 0 °C:
//!
//! ```text
//! SDD = 6.1078 · 10^((a·T) / (b + T))     saturation vapor pressure (hPa)
//! DD  = r/100 · SDD                       actual vapor pressure (hPa)
//! v   = log10(DD / 6.1078)
//! TD  = b·v / (a − v)                     dew point (°C)
//! ```

use crate::error::DomainError;

/// Saturation vapor pressure at 0 °C in hPa.
const E0_HPA: f32 = 6.1078;

/// Coefficients over water (T ≥ 0).
const A_WATER: f32 = 7.5;
const B_WATER: f32 = 237.3;

/// Coefficients over ice (T < 0).
const A_ICE: f32 = 7.6;
const B_ICE: f32 = 240.7;

/// Dew point in °C for temperature `t` (°C) and relative humidity `r` (%).
///
/// Fails when the vapor pressure ratio is not positive (`r ≤ 0`) or when an
/// input or the result is not finite.  Callers treat both as a failed reading.
pub fn dew_point(t: f32, r: f32) -> Result<f32, DomainError> {
    if !t.is_finite() || !r.is_finite() {
        return Err(DomainError::NotFinite);
    }

    let (a, b) = if t >= 0.0 { (A_WATER, B_WATER) } else { (A_ICE, B_ICE) };

    let sdd = E0_HPA * 10f32.powf((a * t) / (b + t));
    let dd = (r / 100.0) * sdd;

    let ratio = dd / E0_HPA;
    if ratio <= 0.0 {
        return Err(DomainError::NonPositiveVaporPressure);
    }

    let v = ratio.log10();
    let td = b * v / (a - v);
    if !td.is_finite() {
        return Err(DomainError::NotFinite);
    }
    Ok(td)
}
