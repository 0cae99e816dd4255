//! Frequency Planner Tests
//!
//! Tests for range checks, accuracy and crystal correction behaviour.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test planner_tests

use qrss_beacon::error::BeaconError;
use qrss_beacon::synth::planner::{MAX_OUTPUT_HZ, MIN_OUTPUT_HZ, VCO_MAX_HZ, VCO_MIN_HZ};
use qrss_beacon::synth::{FrequencyPlanner, MsParams};
use qrss_beacon::types::{CorrectionFactor, Frequency};

/// Worst allowed error for HF targets, in mHz
const TOLERANCE_MHZ: u64 = 1_000;

fn planner() -> FrequencyPlanner {
    FrequencyPlanner::new(CorrectionFactor::from_centihz(11_219))
}

// =============================================================================
// Range Tests
// =============================================================================

#[test]
fn test_zero_rejected() {
    assert_eq!(
        planner().plan(Frequency::from_hz(0)),
        Err(BeaconError::FrequencyOutOfRange(0))
    );
}

#[test]
fn test_above_range_rejected() {
    assert_eq!(
        planner().plan(Frequency::from_hz(200_000_000)),
        Err(BeaconError::FrequencyOutOfRange(200_000_000))
    );
    assert!(planner().plan(Frequency::from_hz(MAX_OUTPUT_HZ + 1)).is_err());
}

#[test]
fn test_below_range_rejected() {
    assert!(planner().plan(Frequency::from_hz(MIN_OUTPUT_HZ - 1)).is_err());
}

#[test]
fn test_range_edges_accepted() {
    assert!(planner().plan(Frequency::from_hz(MIN_OUTPUT_HZ)).is_ok());
    assert!(planner().plan(Frequency::from_hz(MAX_OUTPUT_HZ)).is_ok());
}

#[test]
fn test_park_frequency_accepted() {
    let plan = planner().plan(Frequency::from_hz(108_000_000)).unwrap();
    assert_eq!(plan.ms(), MsParams::integer(8));
}

// =============================================================================
// Parameter Validity
// =============================================================================

#[test]
fn test_plans_are_valid() {
    let planner = planner();
    for hz in [
        500_000, 1_000_000, 7_039_810, 10_139_910, 10_139_914, 14_063_000, 28_000_710,
        50_000_000, 108_000_000, 150_000_000,
    ] {
        let plan = planner.plan(Frequency::from_hz(hz)).unwrap();
        assert_eq!(plan.target().as_hz(), hz);
        assert!(plan.pll().is_valid(), "PLL invalid for {hz} Hz");
        assert!(plan.ms().is_valid(), "MS invalid for {hz} Hz");
        assert!(plan.ms().is_integer());

        let vco = u64::from(hz) * u64::from(plan.ms().a);
        assert!((VCO_MIN_HZ..=VCO_MAX_HZ).contains(&vco));
    }
}

#[test]
fn test_divider_never_five() {
    let planner = planner();
    for hz in [120_000_000, 140_000_000, 149_999_999] {
        assert_ne!(planner.plan(Frequency::from_hz(hz)).unwrap().ms().a, 5);
    }
}

// =============================================================================
// Accuracy
// =============================================================================

#[test]
fn test_output_accuracy() {
    for correction in [0, 11_219, -40_000, 250_000] {
        let planner = FrequencyPlanner::new(CorrectionFactor::from_centihz(correction));
        for hz in [
            1_000_000, 3_560_000, 7_039_810, 10_139_910, 10_139_914, 14_063_000, 14_096_810,
            21_060_000, 28_000_714,
        ] {
            let plan = planner.plan(Frequency::from_hz(hz)).unwrap();
            let actual = plan.output_millihz(planner.reference_centihz());
            let wanted = u64::from(hz) * 1_000;
            assert!(
                actual.abs_diff(wanted) <= TOLERANCE_MHZ,
                "{hz} Hz at {correction} cHz came out as {actual} mHz"
            );
        }
    }
}

#[test]
fn test_fsk_shift_resolved() {
    let planner = planner();
    let reference = planner.reference_centihz();
    let low = planner.plan(Frequency::from_hz(10_139_910)).unwrap();
    let high = planner.plan(Frequency::from_hz(10_139_914)).unwrap();
    let shift = high.output_millihz(reference) - low.output_millihz(reference);
    assert!(shift.abs_diff(4_000) <= 10, "shift was {shift} mHz");
}

#[test]
fn test_plan_deterministic() {
    let f = Frequency::from_hz(14_063_000);
    assert_eq!(planner().plan(f), planner().plan(f));
}

// =============================================================================
// Crystal Correction
// =============================================================================

#[test]
fn test_reference_includes_correction() {
    assert_eq!(
        FrequencyPlanner::new(CorrectionFactor::NONE).reference_centihz(),
        FrequencyPlanner::NOMINAL_REFERENCE_CENTIHZ
    );
    assert_eq!(planner().reference_centihz(), 2_500_011_219);
    assert_eq!(
        FrequencyPlanner::with_crystal(27_000_000, CorrectionFactor::from_centihz(-100))
            .reference_centihz(),
        2_699_999_900
    );
}

#[test]
fn test_correction_monotonic() {
    // A faster crystal needs a smaller multiplier: at the nominal crystal the
    // programmed output drops as the correction grows.
    for hz in [7_039_810, 10_139_910, 14_063_000, 28_000_710] {
        let target = Frequency::from_hz(hz);
        let mut previous = None;
        for correction in (-50_000..=50_000).step_by(5_000) {
            let plan = FrequencyPlanner::new(CorrectionFactor::from_centihz(correction))
                .plan(target)
                .unwrap();
            let nominal = plan.output_millihz(FrequencyPlanner::NOMINAL_REFERENCE_CENTIHZ);
            if let Some(prev) = previous {
                assert!(nominal < prev, "{hz} Hz not monotonic at {correction} cHz");
            }
            previous = Some(nominal);
        }
    }
}

#[test]
fn test_correction_changes_plan() {
    let target = Frequency::from_hz(10_139_910);
    let none = FrequencyPlanner::new(CorrectionFactor::NONE).plan(target).unwrap();
    let corrected = planner().plan(target).unwrap();
    assert_eq!(none.ms(), corrected.ms());
    assert_ne!(none.pll(), corrected.pll());
}
