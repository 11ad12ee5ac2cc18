use strum_macros::Display;

//=====================================================================
// ENDF interpolation schemes
//
// The numeric values are the ENDF INT codes; they are packed verbatim
// into record fields, so the discriminants must not change.
//=====================================================================
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Eq, Display)]
pub enum InterpolationScheme {
    Histogram = 1,
    LinLin = 2,
    LinLog = 3,
    LogLin = 4,
    LogLog = 5,
    Gamow = 6,
}

impl From<u32> for InterpolationScheme {
    fn from(value: u32) -> Self {
        match value {
            1 => InterpolationScheme::Histogram,
            2 => InterpolationScheme::LinLin,
            3 => InterpolationScheme::LinLog,
            4 => InterpolationScheme::LogLin,
            5 => InterpolationScheme::LogLog,
            6 => InterpolationScheme::Gamow,
            _ => panic!("Invalid interpolation scheme code: {}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_codes_round_trip() {
        for code in 1..=6u32 {
            assert_eq!(InterpolationScheme::from(code) as u32, code);
        }
    }

    #[test]
    #[should_panic]
    fn test_invalid_scheme_code() {
        let _ = InterpolationScheme::from(7);
    }
}
