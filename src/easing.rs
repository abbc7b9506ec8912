/// Time-to-progress remapping used to decelerate the spin.
///
/// Every variant is monotonically non-decreasing on `[0, 1]` with
/// `apply(0) = 0` and `apply(1) = 1`, which is all the settle guarantee
/// depends on; the particular curve is a perceptual choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    /// Fast start, smooth deceleration to rest. The natural curve for a
    /// wheel coasting to a stop.
    #[default]
    CubicOut,
    CubicIn,
    CubicInOut,
}

impl Easing {
    /// Apply the curve to a normalized time value. Inputs outside `[0, 1]`
    /// are clamped.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::CubicOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Self::CubicIn => t * t * t,
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let inv = -2.0 * t + 2.0;
                    1.0 - inv * inv * inv / 2.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ALL: [Easing; 4] = [
        Easing::Linear,
        Easing::CubicOut,
        Easing::CubicIn,
        Easing::CubicInOut,
    ];

    #[test]
    fn endpoints_are_exact() {
        for easing in ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-12, "{easing:?} at 1");
        }
    }

    #[test]
    fn out_of_range_input_is_clamped() {
        for easing in ALL {
            assert_eq!(easing.apply(-0.5), 0.0);
            assert!((easing.apply(1.5) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn cubic_out_leads_linear() {
        assert!(Easing::CubicOut.apply(0.5) > Easing::Linear.apply(0.5));
    }

    #[test]
    fn cubic_in_trails_linear() {
        assert!(Easing::CubicIn.apply(0.5) < Easing::Linear.apply(0.5));
    }

    #[test]
    fn default_is_cubic_out() {
        assert_eq!(Easing::default(), Easing::CubicOut);
    }

    proptest! {
        #[test]
        fn monotone_on_unit_interval(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            for easing in ALL {
                prop_assert!(easing.apply(lo) <= easing.apply(hi) + 1e-12);
            }
        }

        #[test]
        fn output_stays_in_unit_interval(t in -2.0f64..=3.0) {
            for easing in ALL {
                let v = easing.apply(t);
                prop_assert!((0.0..=1.0 + 1e-12).contains(&v));
            }
        }
    }
}
