use chrono::NaiveDate;
use velowatt::metrics::{MetricsCalculator, RideInput};
use velowatt::models::Ride;
use velowatt::pmc::PmcCalculator;
use velowatt::zones::ZoneCalculator;
use velowatt::{recalculate_all, FtpEstimateMethod, FtpEstimator};

/// Integration tests exercising complete workflows across the engine

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
}

fn hour_at_ftp_ride(date: NaiveDate, ftp: f64) -> Ride {
    let mut ride = Ride::manual("Threshold hour", date, 3600, ftp);
    ride.power_samples = Some(vec![ftp; 3600]);
    ride
}

fn training_block(start_day: u32, days: u32, watts: f64) -> Vec<Ride> {
    (0..days)
        .map(|i| Ride::manual("Block ride", day(start_day + i), 3600, watts))
        .collect()
}

#[test]
fn test_reference_workout_end_to_end() {
    // One hour at FTP is the calibration point for the whole engine:
    // IF = 1.0, TSS = 100, VI = 1.0
    let mut rides = vec![hour_at_ftp_ride(day(1), 250.0)];
    let outcome = recalculate_all(&mut rides, 250.0, &PmcCalculator::new(), Some(day(1))).unwrap();

    let m = rides[0].metrics.as_ref().unwrap();
    assert_eq!(m.normalized_power, 250.0);
    assert!((m.intensity_factor - 1.0).abs() < 1e-12);
    assert!((m.tss - 100.0).abs() < 1e-9);
    assert!((m.variability_index - 1.0).abs() < 1e-12);

    // Day one of training: CTL = 100/42, ATL = 100/7, TSB from the same day
    let point = outcome.fitness.history.last().unwrap();
    assert!((point.ctl - 100.0 / 42.0).abs() < 1e-9);
    assert!((point.atl - 100.0 / 7.0).abs() < 1e-9);
    assert!((point.tsb - (point.ctl - point.atl)).abs() < 1e-12);
}

#[test]
fn test_ftp_change_recalculates_everything() {
    let mut rides = training_block(1, 10, 200.0);
    let pmc = PmcCalculator::new();

    let before = recalculate_all(&mut rides, 250.0, &pmc, Some(day(10))).unwrap();
    let tss_before: Vec<f64> = rides.iter().map(|r| r.tss()).collect();

    // A raised FTP makes every past ride easier in relative terms
    let after = recalculate_all(&mut rides, 275.0, &pmc, Some(day(10))).unwrap();
    for (ride, old) in rides.iter().zip(&tss_before) {
        assert!(ride.tss() < *old);
        assert_eq!(ride.ftp_at_time, Some(275.0));
    }
    assert!(after.fitness.current_ctl < before.fitness.current_ctl);
}

#[test]
fn test_persistence_round_trip_is_lossless() {
    let mut rides = training_block(1, 5, 210.0);
    rides[2].power_samples = Some(
        (0..3600)
            .map(|i| if i % 60 < 30 { 260.0 } else { 160.0 })
            .collect(),
    );
    rides[3].avg_heart_rate = Some(142.0);
    let pmc = PmcCalculator::new();
    recalculate_all(&mut rides, 250.0, &pmc, Some(day(5))).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rides.json");
    std::fs::write(&path, serde_json::to_string_pretty(&rides).unwrap()).unwrap();

    let reloaded: Vec<Ride> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(reloaded, rides);

    // Recalculating the reloaded data at the same FTP changes nothing
    let mut reloaded = reloaded;
    recalculate_all(&mut reloaded, 250.0, &pmc, Some(day(5))).unwrap();
    assert_eq!(reloaded, rides);
}

#[test]
fn test_taper_raises_form() {
    // Two weeks of steady load, then ten days off: ATL decays faster than
    // CTL, so form swings positive by the end of the taper
    let rides = training_block(1, 14, 230.0);
    let mut rides = rides;
    let pmc = PmcCalculator::new();

    let loaded = recalculate_all(&mut rides, 250.0, &pmc, Some(day(14))).unwrap();
    assert!(loaded.fitness.current_tsb < 0.0);

    let tapered = pmc.fitness_summary(&rides, Some(day(24)));
    assert!(tapered.current_tsb > loaded.fitness.current_tsb);
    assert!(tapered.current_tsb > 0.0);
    assert!(tapered.current_ctl < loaded.fitness.current_ctl);

    // Peak fitness is remembered from the loaded period
    assert!((tapered.peak_ctl - loaded.fitness.current_ctl).abs() < 1e-9);
}

#[test]
fn test_estimate_ftp_then_derive_zones() {
    // A ride holding 280 W for 25 minutes estimates FTP at 266, and the
    // zones derived from it bracket that effort in zone 5 territory
    let mut ride = Ride::manual("Field test", day(1), 2400, 240.0);
    let mut samples = vec![180.0; 600];
    samples.extend(vec![280.0; 1500]);
    samples.extend(vec![150.0; 300]);
    ride.power_samples = Some(samples);

    let estimate = FtpEstimator::estimate(&[ride]).unwrap();
    assert_eq!(estimate.method, FtpEstimateMethod::TwentyMinutePower);
    assert!((estimate.watts - 266.0).abs() < 1e-9);

    let zones = ZoneCalculator::power_zones(estimate.watts).unwrap();
    assert_eq!(zones.len(), 7);
    assert_eq!(ZoneCalculator::zone_for_power(280.0, &zones), 5);
}

#[test]
fn test_streamless_history_still_produces_full_picture() {
    // Summary-only rides (no power streams) flow through the whole engine
    // on the average-power fallback
    let mut rides = vec![
        Ride::manual("Commute", day(1), 1800, 170.0),
        Ride::manual("Group ride", day(2), 7200, 195.0),
        Ride::manual("Recovery spin", day(4), 2700, 120.0),
    ];
    let outcome = recalculate_all(&mut rides, 250.0, &PmcCalculator::new(), Some(day(4))).unwrap();

    for ride in &rides {
        let m = ride.metrics.as_ref().unwrap();
        assert_eq!(m.normalized_power, ride.avg_power);
        assert_eq!(m.variability_index, 1.0);
    }

    // Rest day on the 3rd still appears in the series
    assert_eq!(outcome.fitness.history.len(), 4);
    assert!(outcome.fitness.current_ctl > 0.0);
    assert_eq!(outcome.fitness.forecast.len(), 30);
}

#[test]
fn test_variable_effort_scores_higher_than_steady() {
    // Same average power, but surges carry a higher physiological cost
    let steady: Vec<f64> = vec![200.0; 3600];
    let surging: Vec<f64> = (0..3600)
        .map(|i| if i % 120 < 60 { 300.0 } else { 100.0 })
        .collect();

    let steady_m = MetricsCalculator::calculate(
        &RideInput {
            duration_seconds: 3600,
            avg_power: 200.0,
            power_samples: Some(&steady),
            normalized_power: None,
            avg_heart_rate: None,
        },
        250.0,
    )
    .unwrap();
    let surging_m = MetricsCalculator::calculate(
        &RideInput {
            duration_seconds: 3600,
            avg_power: 200.0,
            power_samples: Some(&surging),
            normalized_power: None,
            avg_heart_rate: None,
        },
        250.0,
    )
    .unwrap();

    assert!(surging_m.normalized_power > steady_m.normalized_power);
    assert!(surging_m.tss > steady_m.tss);
    assert!(surging_m.variability_index > 1.0);
}
