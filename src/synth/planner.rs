//! Si5351 Frequency Planning
//!
//! Provides fractional-N PLL and integer multisynth divider calculations
//! for precise frequency synthesis. This module is testable on the host.
//!
//! # Theory of Operation
//!
//! The Si5351 uses a two-stage frequency synthesis:
//! 1. PLL stage: FVCO = FXTAL × (a + b/c) where 15 ≤ a ≤ 90
//! 2. Multisynth stage: FOUT = FVCO / (d + e/f) where 4 ≤ d ≤ 1800
//!
//! The planner keeps the multisynth an integer (best phase noise) and puts
//! all fine tuning into the PLL fraction, so small FSK shifts only touch the
//! PLL numerator. The crystal correction is applied to the reference before
//! any of this, in hundredths of a Hz.

use crate::config::SI5351_XTAL_FREQ;
use crate::error::BeaconError;
use crate::types::{CorrectionFactor, Frequency};

/// PLL parameters for frequency calculation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PllParams {
    /// Integer part (15-90)
    pub a: u32,
    /// Numerator (0 to c-1)
    pub b: u32,
    /// Denominator (1-1048575)
    pub c: u32,
}

impl PllParams {
    /// Minimum PLL multiplier
    pub const MIN_A: u32 = 15;
    /// Maximum PLL multiplier
    pub const MAX_A: u32 = 90;
    /// Maximum denominator (20 bits)
    pub const MAX_C: u32 = 1_048_575;

    /// Create integer PLL params (b=0, c=1)
    #[must_use]
    pub const fn integer(a: u32) -> Self {
        Self { a, b: 0, c: 1 }
    }

    /// Create fractional PLL params
    #[must_use]
    pub const fn fractional(a: u32, b: u32, c: u32) -> Self {
        Self { a, b, c }
    }

    /// Validate parameters are in range
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.a >= Self::MIN_A
            && self.a <= Self::MAX_A
            && self.c >= 1
            && self.c <= Self::MAX_C
            && self.b < self.c
    }

    /// Calculate P1, P2, P3 register values for Si5351
    #[must_use]
    pub fn to_registers(&self) -> (u32, u32, u32) {
        // From Si5351 datasheet:
        // P1 = 128 × a + floor(128 × b/c) - 512
        // P2 = 128 × b - c × floor(128 × b/c)
        // P3 = c
        let floor_128b_c = (128 * self.b) / self.c;
        let p1 = 128 * self.a + floor_128b_c - 512;
        let p2 = 128 * self.b - self.c * floor_128b_c;
        let p3 = self.c;
        (p1, p2, p3)
    }
}

/// Multisynth divider parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MsParams {
    /// Integer part (4, 6-1800)
    pub a: u32,
    /// Numerator
    pub b: u32,
    /// Denominator
    pub c: u32,
}

impl MsParams {
    /// Minimum integer divisor
    pub const MIN_A: u32 = 4;
    /// Maximum integer divisor
    pub const MAX_A: u32 = 1800;
    /// Maximum denominator (20 bits)
    pub const MAX_C: u32 = 1_048_575;

    /// Create integer multisynth params (b=0, c=1)
    #[must_use]
    pub const fn integer(a: u32) -> Self {
        Self { a, b: 0, c: 1 }
    }

    /// Create fractional multisynth params
    #[must_use]
    pub const fn fractional(a: u32, b: u32, c: u32) -> Self {
        Self { a, b, c }
    }

    /// Validate parameters are in range
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        // Note: a=5 is not allowed
        let a_valid = self.a == 4 || (self.a >= 6 && self.a <= Self::MAX_A);
        let c_valid = self.c >= 1 && self.c <= Self::MAX_C;
        let b_valid = self.b < self.c;
        a_valid && c_valid && b_valid
    }

    /// Check if this is an integer divisor (enables MS integer mode)
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        self.b == 0
    }

    /// Calculate P1, P2, P3 register values
    #[must_use]
    pub fn to_registers(&self) -> (u32, u32, u32) {
        let floor_128b_c = (128 * self.b) / self.c;
        let p1 = 128 * self.a + floor_128b_c - 512;
        let p2 = 128 * self.b - self.c * floor_128b_c;
        let p3 = self.c;
        (p1, p2, p3)
    }
}

/// Minimum VCO frequency (600 MHz)
pub const VCO_MIN_HZ: u64 = 600_000_000;
/// Maximum VCO frequency (900 MHz)
pub const VCO_MAX_HZ: u64 = 900_000_000;

/// Lowest output the planner accepts (500 kHz)
pub const MIN_OUTPUT_HZ: u32 = 500_000;
/// Highest output the planner accepts (150 MHz)
pub const MAX_OUTPUT_HZ: u32 = 150_000_000;

/// Synthesizer settings for one output frequency
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlannedFrequency {
    target: Frequency,
    pll: PllParams,
    ms: MsParams,
}

impl PlannedFrequency {
    /// Frequency this plan was made for
    #[must_use]
    pub const fn target(&self) -> Frequency {
        self.target
    }

    /// PLL settings
    #[must_use]
    pub const fn pll(&self) -> PllParams {
        self.pll
    }

    /// Multisynth settings
    #[must_use]
    pub const fn ms(&self) -> MsParams {
        self.ms
    }

    /// Output in millihertz if the crystal were `reference_centihz`
    #[must_use]
    pub fn output_millihz(&self, reference_centihz: u64) -> u64 {
        // FOUT = REF × (pa + pb/pc) / (ma + mb/mc), REF in cHz -> ×10 for mHz
        let pll_num = u128::from(self.pll.a) * u128::from(self.pll.c) + u128::from(self.pll.b);
        let ms_num = u128::from(self.ms.a) * u128::from(self.ms.c) + u128::from(self.ms.b);
        let num = u128::from(reference_centihz) * pll_num * u128::from(self.ms.c) * 10;
        let den = u128::from(self.pll.c) * ms_num;
        (num / den) as u64
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for PlannedFrequency {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "{} (PLL {}+{}/{}, MS {})",
            self.target,
            self.pll.a,
            self.pll.b,
            self.pll.c,
            self.ms.a
        );
    }
}

/// Converts output frequencies into synthesizer settings
///
/// Stateless apart from the corrected reference, which is fixed for the
/// life of the planner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrequencyPlanner {
    reference_centihz: u64,
}

impl FrequencyPlanner {
    /// Nominal crystal in centi-Hz
    pub const NOMINAL_REFERENCE_CENTIHZ: u64 = SI5351_XTAL_FREQ as u64 * 100;

    /// Planner for the board's 25 MHz crystal
    #[must_use]
    pub const fn new(correction: CorrectionFactor) -> Self {
        Self::with_crystal(SI5351_XTAL_FREQ, correction)
    }

    /// Planner for an arbitrary nominal crystal
    #[must_use]
    pub const fn with_crystal(xtal_hz: u32, correction: CorrectionFactor) -> Self {
        let nominal = xtal_hz as u64 * 100;
        Self {
            reference_centihz: nominal.saturating_add_signed(correction.as_centihz() as i64),
        }
    }

    /// Corrected reference in centi-Hz
    #[must_use]
    pub const fn reference_centihz(&self) -> u64 {
        self.reference_centihz
    }

    /// Plan an output frequency
    ///
    /// # Errors
    ///
    /// `FrequencyOutOfRange` if the frequency is outside 500 kHz - 150 MHz,
    /// or the correction pushes the PLL outside its multiplier range.
    pub fn plan(&self, freq: Frequency) -> Result<PlannedFrequency, BeaconError> {
        let hz = freq.as_hz();
        let out_of_range = BeaconError::FrequencyOutOfRange(hz);

        if !(MIN_OUTPUT_HZ..=MAX_OUTPUT_HZ).contains(&hz) {
            return Err(out_of_range);
        }

        // Highest VCO that an integer divider allows
        let target_hz = u64::from(hz);
        let ms_a = (VCO_MAX_HZ / target_hz).min(u64::from(MsParams::MAX_A));
        let vco_hz = target_hz * ms_a;
        let ms = MsParams::integer(ms_a as u32);

        if vco_hz < VCO_MIN_HZ || !ms.is_valid() {
            return Err(out_of_range);
        }

        let pll = calculate_pll_params(self.reference_centihz, vco_hz)
            .filter(PllParams::is_valid)
            .ok_or(out_of_range)?;

        Ok(PlannedFrequency {
            target: freq,
            pll,
            ms,
        })
    }
}

/// Calculate PLL parameters to achieve target VCO frequency
fn calculate_pll_params(reference_centihz: u64, vco_hz: u64) -> Option<PllParams> {
    if reference_centihz == 0 {
        return None;
    }

    // PLL multiplier = VCO / XTAL, both in centi-Hz
    let vco_centihz = vco_hz * 100;
    let a = u32::try_from(vco_centihz / reference_centihz).ok()?;
    let remainder = vco_centihz % reference_centihz;

    let (b, c) = rational_approximation(remainder, reference_centihz, PllParams::MAX_C);

    Some(if b == 0 {
        PllParams::integer(a)
    } else if b >= c {
        // Fraction rounded up to a whole step
        PllParams::integer(a + 1)
    } else {
        PllParams::fractional(a, b, c)
    })
}

/// Find best rational approximation b/c ≈ num/den with c ≤ `max_c`
///
/// Walks the continued fraction convergents and finishes with the best
/// semiconvergent that still fits the denominator.
fn rational_approximation(num: u64, den: u64, max_c: u32) -> (u32, u32) {
    if num == 0 || den == 0 {
        return (0, 1);
    }

    let max_c = u64::from(max_c);
    let (mut p_prev, mut q_prev) = (0u64, 1u64);
    let (mut p, mut q) = (1u64, 0u64);
    let (mut n, mut d) = (num, den);

    while d != 0 {
        let term = n / d;
        let q_next = term * q + q_prev;

        if q_next > max_c {
            // q >= 1 here: the first term never overflows the bound
            let t = (max_c - q_prev) / q;
            let (p_semi, q_semi) = (t * p + p_prev, t * q + q_prev);
            if is_closer(num, den, (p_semi, q_semi), (p, q)) {
                p = p_semi;
                q = q_semi;
            }
            break;
        }

        let p_next = term * p + p_prev;
        p_prev = p;
        q_prev = q;
        p = p_next;
        q = q_next;

        let r = n - term * d;
        n = d;
        d = r;
    }

    (p as u32, q as u32)
}

/// Check whether `x` approximates num/den strictly better than `y`
fn is_closer(num: u64, den: u64, x: (u64, u64), y: (u64, u64)) -> bool {
    let distance = |(p, q): (u64, u64)| {
        let lhs = u128::from(num) * u128::from(q);
        let rhs = u128::from(p) * u128::from(den);
        lhs.abs_diff(rhs)
    };
    // |num/den - p/q| = distance / (den × q); compare cross-multiplied
    distance(x) * u128::from(y.1) < distance(y) * u128::from(x.1)
}
