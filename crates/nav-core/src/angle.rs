//! Integer angles.
//!
//! One full turn is [`WAngle::FULL`] = 1024 units, counter-clockwise from the
//! +x axis.  `sin`/`cos` return values scaled by [`WAngle::SCALE`].
//!
//! All trig goes through a quarter-wave table, so every platform computes the
//! same bits.  [`WAngle::of`] searches the same table instead of calling
//! `atan2`.

use std::fmt;
use std::ops::{Add, Neg, Sub};

use crate::WVec;

/// `round(sin(k * 2π / 1024) * 1024)` for `k` in `0..=256`.
const SIN_TABLE: [i32; 257] = [
       0,    6,   13,   19,   25,   31,   38,   44,   50,   57,   63,   69,   75,   82,   88,   94,
     100,  107,  113,  119,  125,  132,  138,  144,  150,  156,  163,  169,  175,  181,  187,  194,
     200,  206,  212,  218,  224,  230,  237,  243,  249,  255,  261,  267,  273,  279,  285,  291,
     297,  303,  309,  315,  321,  327,  333,  339,  345,  351,  357,  363,  369,  374,  380,  386,
     392,  398,  403,  409,  415,  421,  426,  432,  438,  443,  449,  455,  460,  466,  472,  477,
     483,  488,  494,  499,  505,  510,  516,  521,  526,  532,  537,  543,  548,  553,  558,  564,
     569,  574,  579,  584,  590,  595,  600,  605,  610,  615,  620,  625,  630,  635,  640,  645,
     650,  654,  659,  664,  669,  674,  678,  683,  688,  692,  697,  702,  706,  711,  715,  720,
     724,  729,  733,  737,  742,  746,  750,  755,  759,  763,  767,  771,  775,  779,  784,  788,
     792,  796,  799,  803,  807,  811,  815,  819,  822,  826,  830,  834,  837,  841,  844,  848,
     851,  855,  858,  862,  865,  868,  872,  875,  878,  882,  885,  888,  891,  894,  897,  900,
     903,  906,  909,  912,  915,  917,  920,  923,  926,  928,  931,  934,  936,  939,  941,  944,
     946,  948,  951,  953,  955,  958,  960,  962,  964,  966,  968,  970,  972,  974,  976,  978,
     980,  982,  983,  985,  987,  989,  990,  992,  993,  995,  996,  998,  999, 1000, 1002, 1003,
    1004, 1006, 1007, 1008, 1009, 1010, 1011, 1012, 1013, 1014, 1015, 1016, 1016, 1017, 1018, 1018,
    1019, 1020, 1020, 1021, 1021, 1022, 1022, 1022, 1023, 1023, 1023, 1024, 1024, 1024, 1024, 1024,
    1024,
];

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WAngle(pub i32);

impl WAngle {
    /// Units per full turn.
    pub const FULL: i32 = 1024;
    /// Fixed-point scale of `sin`/`cos`.
    pub const SCALE: i32 = 1024;

    pub const ZERO: WAngle = WAngle(0);
    pub const QUARTER: WAngle = WAngle(256);
    pub const HALF: WAngle = WAngle(512);

    /// Construct and normalise into `[0, FULL)`.
    #[inline]
    pub fn new(units: i32) -> Self {
        WAngle(units.rem_euclid(Self::FULL))
    }

    pub fn from_degrees(degrees: i32) -> Self {
        WAngle::new(degrees * Self::FULL / 360)
    }

    #[inline]
    pub fn units(self) -> i32 {
        self.0
    }

    pub fn sin(self) -> i32 {
        let q = self.0.rem_euclid(Self::FULL);
        let r = (q % 256) as usize;
        match q / 256 {
            0 => SIN_TABLE[r],
            1 => SIN_TABLE[256 - r],
            2 => -SIN_TABLE[r],
            _ => -SIN_TABLE[256 - r],
        }
    }

    pub fn cos(self) -> i32 {
        WAngle::new(self.0.rem_euclid(Self::FULL) + Self::QUARTER.0).sin()
    }

    /// Direction of a horizontal vector, to the nearest unit.  The zero
    /// vector faces `ZERO`.
    pub fn of(v: WVec) -> WAngle {
        if v.x == 0 && v.y == 0 {
            return WAngle::ZERO;
        }
        let a = first_quadrant(v.x.unsigned_abs() as i64, v.y.unsigned_abs() as i64);
        let units = match (v.x >= 0, v.y >= 0) {
            (true, true) => a,
            (false, true) => Self::HALF.0 - a,
            (false, false) => Self::HALF.0 + a,
            (true, false) => Self::FULL - a,
        };
        WAngle::new(units)
    }

    /// Signed shortest rotation from `self` to `target`, in `(-512, 512]`.
    pub fn delta_to(self, target: WAngle) -> i32 {
        let d = (target.0 - self.0).rem_euclid(Self::FULL);
        if d > Self::FULL / 2 { d - Self::FULL } else { d }
    }

    /// Rotate towards `target` by at most `max_step` units.
    pub fn turn_towards(self, target: WAngle, max_step: i32) -> WAngle {
        let d = self.delta_to(target);
        if d.abs() <= max_step {
            target
        } else {
            WAngle::new(self.0 + max_step * d.signum())
        }
    }
}

/// Angle in `0..=256` of the vector `(ax, ay)` with both components
/// non-negative and not both zero.
fn first_quadrant(ax: i64, ay: i64) -> i32 {
    let (mut lo, mut hi) = (0usize, 256usize);
    // Smallest a with tan(a) >= ay / ax.
    while lo < hi {
        let mid = (lo + hi) / 2;
        if SIN_TABLE[mid] as i64 * ax >= SIN_TABLE[256 - mid] as i64 * ay {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    let a = lo;
    if a > 0 {
        let over = SIN_TABLE[a] as i64 * ax - SIN_TABLE[256 - a] as i64 * ay;
        let under = SIN_TABLE[257 - a] as i64 * ay - SIN_TABLE[a - 1] as i64 * ax;
        if under < over {
            return a as i32 - 1;
        }
    }
    a as i32
}

impl Add for WAngle {
    type Output = WAngle;
    #[inline]
    fn add(self, rhs: WAngle) -> WAngle {
        WAngle::new(self.0 + rhs.0)
    }
}

impl Sub for WAngle {
    type Output = WAngle;
    #[inline]
    fn sub(self, rhs: WAngle) -> WAngle {
        WAngle::new(self.0 - rhs.0)
    }
}

impl Neg for WAngle {
    type Output = WAngle;
    #[inline]
    fn neg(self) -> WAngle {
        WAngle::new(-self.0)
    }
}

impl fmt::Display for WAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}u", self.0)
    }
}
