//! Closed-form 1-D elastic collision.
//!
//! Used to sanity-check the spring exchange: a stiff spring between two
//! bodies should end close to what a perfectly elastic impact gives.
//!
//! ```text
//! u1 = (m1 - m2) / (m1 + m2) * v1 + 2 m2 / (m1 + m2) * v2
//! u2 = (m2 - m1) / (m1 + m2) * v2 + 2 m1 / (m1 + m2) * v1
//! ```

use crate::error::{Error, Result};

/// Post-impact velocities `(u1, u2)`.
pub fn elastic_1d(m1: f64, m2: f64, v1: f64, v2: f64) -> Result<(f64, f64)> {
    if !(m1.is_finite() && m2.is_finite()) || m1 <= 0.0 || m2 <= 0.0 {
        return Err(Error::config(format!(
            "masses must be finite and > 0, got {} and {}",
            m1, m2
        )));
    }
    let total = m1 + m2;
    let u1 = (m1 - m2) / total * v1 + 2.0 * m2 / total * v2;
    let u2 = (m2 - m1) / total * v2 + 2.0 * m1 / total * v1;
    Ok((u1, u2))
}

pub fn momentum(mass: f64, velocity: f64) -> f64 {
    mass * velocity
}

pub fn kinetic_energy(mass: f64, velocity: f64) -> f64 {
    0.5 * mass * velocity * velocity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heavy_hits_light() {
        let (u1, u2) = elastic_1d(2.0, 1.0, 3.0, 0.0).unwrap();
        assert!((u1 - 1.0).abs() < 1e-12);
        assert!((u2 - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_equal_masses_swap() {
        let (u1, u2) = elastic_1d(1.0, 1.0, 2.5, -1.0).unwrap();
        assert!((u1 + 1.0).abs() < 1e-12);
        assert!((u2 - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_conserves_momentum_and_energy() {
        let (m1, m2, v1, v2) = (1.0, 2.0, 3.0, -0.5);
        let (u1, u2) = elastic_1d(m1, m2, v1, v2).unwrap();
        let p_before = momentum(m1, v1) + momentum(m2, v2);
        let p_after = momentum(m1, u1) + momentum(m2, u2);
        assert!((p_before - p_after).abs() < 1e-12);
        let e_before = kinetic_energy(m1, v1) + kinetic_energy(m2, v2);
        let e_after = kinetic_energy(m1, u1) + kinetic_energy(m2, u2);
        assert!((e_before - e_after).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_mass() {
        assert!(elastic_1d(0.0, 1.0, 1.0, 0.0).is_err());
        assert!(elastic_1d(1.0, f64::NAN, 1.0, 0.0).is_err());
    }
}
