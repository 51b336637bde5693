//! The `Math` object available to every script.
//!
//! Block generators emit `Math.sqrt(x)`, `Math.abs(x)`, `Math.PI` and
//! friends for the arithmetic blocks; these are evaluated inside the
//! interpreter and never reach the task's host functions.

/// A callable `Math.<name>` member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathFn {
    Abs,
    Sqrt,
    Floor,
    Ceil,
    Round,
    Sign,
    Sin,
    Cos,
    Tan,
    Atan2,
    Exp,
    Log,
    Log10,
    Pow,
    Min,
    Max,
}

impl MathFn {
    pub const ALL: [MathFn; 16] = [
        Self::Abs,
        Self::Sqrt,
        Self::Floor,
        Self::Ceil,
        Self::Round,
        Self::Sign,
        Self::Sin,
        Self::Cos,
        Self::Tan,
        Self::Atan2,
        Self::Exp,
        Self::Log,
        Self::Log10,
        Self::Pow,
        Self::Min,
        Self::Max,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "abs" => Self::Abs,
            "sqrt" => Self::Sqrt,
            "floor" => Self::Floor,
            "ceil" => Self::Ceil,
            "round" => Self::Round,
            "sign" => Self::Sign,
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "atan2" => Self::Atan2,
            "exp" => Self::Exp,
            "log" => Self::Log,
            "log10" => Self::Log10,
            "pow" => Self::Pow,
            "min" => Self::Min,
            "max" => Self::Max,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Abs => "abs",
            Self::Sqrt => "sqrt",
            Self::Floor => "floor",
            Self::Ceil => "ceil",
            Self::Round => "round",
            Self::Sign => "sign",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Atan2 => "atan2",
            Self::Exp => "exp",
            Self::Log => "log",
            Self::Log10 => "log10",
            Self::Pow => "pow",
            Self::Min => "min",
            Self::Max => "max",
        }
    }

    /// Accepted argument count as an inclusive range.
    pub fn arity(self) -> (usize, usize) {
        match self {
            Self::Atan2 | Self::Pow => (2, 2),
            Self::Min | Self::Max => (0, usize::MAX),
            _ => (1, 1),
        }
    }

    /// Apply to already-coerced numeric arguments. The caller checks arity.
    pub fn apply(self, args: &[f64]) -> f64 {
        let a = args.first().copied().unwrap_or(f64::NAN);
        let b = args.get(1).copied().unwrap_or(f64::NAN);
        match self {
            Self::Abs => a.abs(),
            Self::Sqrt => a.sqrt(),
            Self::Floor => a.floor(),
            Self::Ceil => a.ceil(),
            // JS rounds halves toward +Infinity; `a + 0.5` can itself round up
            Self::Round => {
                let f = a.floor();
                if a - f >= 0.5 {
                    f + 1.0
                } else {
                    f
                }
            }
            Self::Sign => {
                if a.is_nan() || a == 0.0 {
                    a
                } else {
                    a.signum()
                }
            }
            Self::Sin => a.sin(),
            Self::Cos => a.cos(),
            Self::Tan => a.tan(),
            Self::Atan2 => a.atan2(b),
            Self::Exp => a.exp(),
            Self::Log => a.ln(),
            Self::Log10 => a.log10(),
            Self::Pow => a.powf(b),
            Self::Min => args.iter().copied().fold(f64::INFINITY, |acc, x| {
                if acc.is_nan() || x.is_nan() {
                    f64::NAN
                } else {
                    acc.min(x)
                }
            }),
            Self::Max => args.iter().copied().fold(f64::NEG_INFINITY, |acc, x| {
                if acc.is_nan() || x.is_nan() {
                    f64::NAN
                } else {
                    acc.max(x)
                }
            }),
        }
    }
}

/// A constant `Math.<NAME>` member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathConst {
    Pi,
    E,
    Sqrt2,
}

impl MathConst {
    pub const ALL: [MathConst; 3] = [Self::Pi, Self::E, Self::Sqrt2];

    pub fn name(self) -> &'static str {
        match self {
            Self::Pi => "PI",
            Self::E => "E",
            Self::Sqrt2 => "SQRT2",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "PI" => Some(Self::Pi),
            "E" => Some(Self::E),
            "SQRT2" => Some(Self::Sqrt2),
            _ => None,
        }
    }

    pub fn value(self) -> f64 {
        match self {
            Self::Pi => std::f64::consts::PI,
            Self::E => std::f64::consts::E,
            Self::Sqrt2 => std::f64::consts::SQRT_2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_half_goes_up() {
        assert_eq!(MathFn::Round.apply(&[2.5]), 3.0);
        assert_eq!(MathFn::Round.apply(&[-2.5]), -2.0);
        assert_eq!(MathFn::Round.apply(&[0.49999999999999994]), 0.0);
        assert_eq!(MathFn::Round.apply(&[-0.6]), -1.0);
        assert_eq!(MathFn::Round.apply(&[4_503_599_627_370_497.0]), 4_503_599_627_370_497.0);
    }

    #[test]
    fn min_max_are_variadic() {
        assert_eq!(MathFn::Min.apply(&[3.0, -1.0, 2.0]), -1.0);
        assert_eq!(MathFn::Max.apply(&[]), f64::NEG_INFINITY);
        assert!(MathFn::Max.apply(&[1.0, f64::NAN]).is_nan());
    }

    #[test]
    fn names_round_trip() {
        for f in MathFn::ALL {
            assert_eq!(MathFn::from_name(f.name()), Some(f));
        }
        for c in MathConst::ALL {
            assert_eq!(MathConst::from_name(c.name()), Some(c));
        }
        assert_eq!(MathFn::from_name("random"), None);
        assert_eq!(MathConst::from_name("PI").map(MathConst::value), Some(std::f64::consts::PI));
    }
}
