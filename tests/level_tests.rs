use intervox::audio::{sample_level, AnalyserSnapshot, LevelMeter};

/// A quiet-but-audible snapshot: low flat spectrum, centered time domain
fn quiet_snapshot() -> AnalyserSnapshot {
    AnalyserSnapshot {
        frequency_bins: vec![20; 1024],
        time_domain: vec![128; 2048],
        sample_rate: 16000,
    }
}

/// A loud snapshot with energy in the speech band and time-domain peaks
fn loud_snapshot() -> AnalyserSnapshot {
    let mut bins = vec![40u8; 1024];
    for bin in bins.iter_mut().take(440).skip(38) {
        *bin = 200;
    }
    let mut time = vec![128u8; 2048];
    for (i, v) in time.iter_mut().enumerate() {
        if i % 3 == 0 {
            *v = 220;
        }
    }
    AnalyserSnapshot {
        frequency_bins: bins,
        time_domain: time,
        sample_rate: 16000,
    }
}

#[test]
fn silence_is_exactly_zero() {
    let snapshot = AnalyserSnapshot::silence(2048, 16000);
    assert_eq!(sample_level(&snapshot, 100), 0.0);
    assert_eq!(sample_level(&snapshot, 500), 0.0);
}

#[test]
fn level_stays_in_unit_range() {
    for sensitivity in [10, 50, 100, 250, 500] {
        for snapshot in [quiet_snapshot(), loud_snapshot()] {
            let level = sample_level(&snapshot, sensitivity);
            assert!((0.0..=1.0).contains(&level), "level {} out of range", level);
        }
    }
}

#[test]
fn level_is_monotonic_in_sensitivity() {
    let snapshot = quiet_snapshot();
    let mut previous = 0.0;
    for sensitivity in [10, 25, 50, 100, 200, 350, 500] {
        let level = sample_level(&snapshot, sensitivity);
        assert!(
            level >= previous,
            "level dropped from {} to {} at sensitivity {}",
            previous,
            level,
            sensitivity
        );
        previous = level;
    }
}

#[test]
fn sensitivity_is_clamped() {
    let snapshot = quiet_snapshot();
    assert_eq!(sample_level(&snapshot, 1), sample_level(&snapshot, 10));
    assert_eq!(sample_level(&snapshot, 9999), sample_level(&snapshot, 500));
}

#[test]
fn louder_signal_reads_higher() {
    assert!(sample_level(&loud_snapshot(), 100) > sample_level(&quiet_snapshot(), 100));
}

#[test]
fn empty_snapshot_reads_zero() {
    let snapshot = AnalyserSnapshot {
        frequency_bins: Vec::new(),
        time_domain: Vec::new(),
        sample_rate: 16000,
    };
    assert_eq!(sample_level(&snapshot, 100), 0.0);
}

#[test]
fn meter_is_shared_between_clones() {
    let meter = LevelMeter::new();
    let reader = meter.clone();
    meter.set(0.75);
    assert_eq!(reader.level(), 0.75);
}
