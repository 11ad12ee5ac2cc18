//====================================================================
// Assorted helper functions.
//====================================================================

/// Single-precision copy of a double-precision buffer.
#[inline]
pub fn to_f32(values: &[f64]) -> Vec<f32> {
    values.iter().map(|&v| v as f32).collect()
}

/// Human-readable name for the common MT numbers.
pub fn reaction_name_from_mt(mt: u32) -> &'static str {
    match mt {
        1 => "total",
        2 => "elastic scattering",
        4 => "inelastic scattering",
        16 => "(n,2n)",
        17 => "(n,3n)",
        18 => "fission",
        102 => "radiative capture",
        103 => "(n,p)",
        107 => "(n,alpha)",
        51..=90 => "inelastic level scattering",
        _ => "reaction",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_f32() {
        assert_eq!(to_f32(&[1.0, 2.5]), vec![1.0f32, 2.5f32]);
    }

    #[test]
    fn test_reaction_names() {
        assert_eq!(reaction_name_from_mt(2), "elastic scattering");
        assert_eq!(reaction_name_from_mt(18), "fission");
        assert_eq!(reaction_name_from_mt(55), "inelastic level scattering");
        assert_eq!(reaction_name_from_mt(999), "reaction");
    }
}
