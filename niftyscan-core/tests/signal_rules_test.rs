//! Rule-level properties: inclusive bounds, side exclusivity, missing values.

use proptest::prelude::*;
use niftyscan_core::domain::{IndicatorSet, Side};
use niftyscan_core::signals::SignalRules;

/// Every CALL condition sitting exactly on its bound.
fn call_at_bounds() -> IndicatorSet {
    IndicatorSet {
        bb60: Some(35.0),
        bb105: None,
        bb150: None,
        rsi20: Some(65.0),
        willr28: Some(-20.0),
        plus_di6: Some(40.0),
        minus_di6: Some(12.0),
        plus_di20: Some(35.0),
        minus_di20: Some(15.0),
        ma8: None,
    }
}

fn put_at_bounds() -> IndicatorSet {
    IndicatorSet {
        bb60: Some(35.0),
        bb105: None,
        bb150: None,
        rsi20: Some(40.0),
        willr28: Some(-80.0),
        plus_di6: Some(15.0),
        minus_di6: Some(35.0),
        plus_di20: Some(15.0),
        minus_di20: Some(30.0),
        ma8: None,
    }
}

#[test]
fn call_entry_is_inclusive_at_every_bound() {
    let rules = SignalRules::default();
    assert!(rules.entry(Side::Call, &call_at_bounds()));

    let upper = IndicatorSet {
        rsi20: Some(100.0),
        willr28: Some(0.0),
        ..call_at_bounds()
    };
    assert!(rules.entry(Side::Call, &upper));
}

#[test]
fn band_width_just_over_limit_blocks_call() {
    let rules = SignalRules::default();
    let ind = IndicatorSet {
        bb60: Some(35.0001),
        ..call_at_bounds()
    };
    assert!(!rules.entry(Side::Call, &ind));
}

#[test]
fn put_entry_is_inclusive_at_every_bound() {
    let rules = SignalRules::default();
    assert!(rules.entry(Side::Put, &put_at_bounds()));

    let lower = IndicatorSet {
        rsi20: Some(1.0),
        willr28: Some(-100.0),
        ..put_at_bounds()
    };
    assert!(rules.entry(Side::Put, &lower));

    let below = IndicatorSet {
        rsi20: Some(0.99),
        ..put_at_bounds()
    };
    assert!(!rules.entry(Side::Put, &below));
}

#[test]
fn each_missing_field_blocks_call_entry() {
    let rules = SignalRules::default();
    let full = call_at_bounds();
    let variants = [
        IndicatorSet { bb60: None, ..full },
        IndicatorSet { rsi20: None, ..full },
        IndicatorSet { willr28: None, ..full },
        IndicatorSet { plus_di6: None, ..full },
        IndicatorSet { minus_di6: None, ..full },
        IndicatorSet { plus_di20: None, ..full },
        IndicatorSet { minus_di20: None, ..full },
    ];
    for ind in &variants {
        assert!(!rules.entry(Side::Call, ind), "{ind:?}");
    }
}

#[test]
fn default_momentum_and_williams_ranges_are_disjoint() {
    let rules = SignalRules::default();
    assert!(!rules.call.momentum.overlaps(&rules.put.momentum));
    assert!(!rules.call.williams.overlaps(&rules.put.williams));
    assert!(rules.entries_exclusive());
}

#[test]
fn exit_on_spread_or_average_cross() {
    let rules = SignalRules::default();
    let converging = IndicatorSet {
        plus_di20: Some(20.0),
        minus_di20: Some(10.5),
        ..IndicatorSet::default()
    };
    assert!(rules.exit(Side::Call, &converging, 100.0));
    assert!(rules.exit(Side::Put, &converging, 100.0));

    let with_average = IndicatorSet {
        ma8: Some(100.0),
        ..IndicatorSet::default()
    };
    assert!(rules.exit(Side::Call, &with_average, 99.5));
    assert!(!rules.exit(Side::Put, &with_average, 99.5));
    assert!(rules.exit(Side::Put, &with_average, 100.5));
    assert!(!rules.exit(Side::Call, &with_average, 100.0));
}

fn arb_value(min: f64, max: f64) -> impl Strategy<Value = Option<f64>> {
    prop_oneof![1 => Just(None), 9 => (min..=max).prop_map(Some)]
}

prop_compose! {
    fn arb_indicators()(
        bb60 in arb_value(0.0, 80.0),
        rsi20 in arb_value(0.0, 100.0),
        willr28 in arb_value(-100.0, 0.0),
        plus_di6 in arb_value(0.0, 100.0),
        minus_di6 in arb_value(0.0, 100.0),
        plus_di20 in arb_value(0.0, 100.0),
        minus_di20 in arb_value(0.0, 100.0),
        ma8 in arb_value(50.0, 150.0),
    ) -> IndicatorSet {
        IndicatorSet {
            bb60,
            bb105: None,
            bb150: None,
            rsi20,
            willr28,
            plus_di6,
            minus_di6,
            plus_di20,
            minus_di20,
            ma8,
        }
    }
}

proptest! {
    /// A bar can never be a call entry and a put entry at once.
    #[test]
    fn entries_never_both_fire(ind in arb_indicators(), close in 50.0..150.0_f64) {
        let flags = SignalRules::default().evaluate(&ind, close);
        prop_assert!(!(flags.call_entry && flags.put_entry));
    }

    /// Active means entry without the paired exit.
    #[test]
    fn active_is_entry_without_exit(ind in arb_indicators(), close in 50.0..150.0_f64) {
        let flags = SignalRules::default().evaluate(&ind, close);
        for side in Side::ALL {
            prop_assert_eq!(flags.is_active(side), flags.entry(side) && !flags.exit(side));
        }
    }

    /// Evaluating never panics, whatever mix of values is missing.
    #[test]
    fn evaluation_is_total(ind in arb_indicators(), close in prop::num::f64::ANY) {
        let _ = SignalRules::default().evaluate(&ind, close);
    }
}
