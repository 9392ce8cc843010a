use crate::{
    FlickerDetector, FlickerEvent, Sample, SampleOutcome, SensorChannelState, SensorId, tests::at,
};

/// Feeds sensor-1 values 100 ms apart with sensor 2 held steady.
fn feed_sensor1(detector: &mut FlickerDetector, values: &[f64]) -> Vec<SampleOutcome> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| detector.on_sample(&Sample::new(at(100 * i as i64), v, 50.0)))
        .collect()
}

fn events(outcomes: &[SampleOutcome]) -> Vec<FlickerEvent> {
    outcomes.iter().flat_map(|o| o.events.clone()).collect()
}

fn active_detector() -> FlickerDetector {
    let mut detector = FlickerDetector::default();
    detector.begin_session();
    detector
}

/// WHAT: A 20% dip that recovers produces exactly one event
/// WHY: Core detection path, baseline from the sample before the dip
#[test]
fn given_dip_and_recovery_when_sampling_then_one_event_with_worst_values() {
    // Given: An active detector
    let mut detector = active_detector();

    // When: Sensor 1 reads 100, 100, 80, 100
    let outcomes = feed_sensor1(&mut detector, &[100.0, 100.0, 80.0, 100.0]);

    // Then: The run opened on the dip and closed on recovery
    assert!(outcomes[2].events.is_empty());
    assert!(detector.channel(SensorId::Sensor1).active_flicker.is_none());

    let events = events(&outcomes);
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.sensor, SensorId::Sensor1);
    assert_eq!(event.start_time, at(200));
    assert_eq!(event.end_time, at(300));
    assert!((event.initial_value - 100.0).abs() < 1e-9);
    assert!((event.minimum_value - 80.0).abs() < 1e-9);
    assert!((event.percent_change - 20.0).abs() < 1e-9);
    assert!((event.duration_seconds - 0.1).abs() < 1e-9);
    assert_eq!(detector.flicker_count(SensorId::Sensor1), 1);
    assert_eq!(detector.flicker_count(SensorId::Sensor2), 0);
}

/// WHAT: A change below the threshold never opens a run
/// WHY: 50 -> 50.3 is a 0.6% move, under the 1% default
#[test]
fn given_small_change_when_sampling_then_no_run_opens() {
    // Given: An active detector
    let mut detector = active_detector();

    // When: Sensor 1 reads 50, 50.3
    let outcomes = feed_sensor1(&mut detector, &[50.0, 50.3]);

    // Then: Nothing opened or closed
    assert!(events(&outcomes).is_empty());
    assert!(!detector.has_open_run(SensorId::Sensor1));
}

/// WHAT: The first sample after a reset only records a baseline
/// WHY: No percent change can be computed without a previous reading
#[test]
fn given_fresh_session_when_first_sample_arrives_then_only_baseline_recorded() {
    // Given: An active detector with no history
    let mut detector = active_detector();

    // When: A single sample arrives
    let outcomes = feed_sensor1(&mut detector, &[100.0]);

    // Then: The value is stored, nothing is open, a row is still produced
    let channel = detector.channel(SensorId::Sensor1);
    assert_eq!(channel.last_value, Some(100.0));
    assert!(channel.active_flicker.is_none());
    assert!(outcomes[0].row.is_some());
}

/// WHAT: A run stays open until a reading is back near its baseline
/// WHY: Closing compares against the run's initial value, not the last sample
#[test]
fn given_open_run_when_readings_creep_back_then_closes_only_within_threshold() {
    // Given: An active detector
    let mut detector = active_detector();

    // When: The reading dips and recovers in steps
    let outcomes = feed_sensor1(&mut detector, &[100.0, 100.0, 80.0, 90.0, 95.0, 99.5]);

    // Then: The run is open on every intermediate sample and closes at 99.5
    let open_flags: Vec<bool> = outcomes
        .iter()
        .filter_map(|o| o.row.map(|r| r.sensor1_has_open_run))
        .collect();
    assert_eq!(open_flags, vec![false, false, true, true, true, false]);

    let events = events(&outcomes);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].end_time, at(500));
    assert!((events[0].duration_seconds - 0.3).abs() < 1e-9);
}

/// WHAT: The event reports the deepest value and largest step of the run
/// WHY: Operators care about the worst excursion, not the opening one
#[test]
fn given_deepening_dip_when_run_closes_then_reports_worst_excursion() {
    // Given: An active detector
    let mut detector = active_detector();

    // When: 100 -> 90 (10%) -> 70 (22.2%) -> 100
    let outcomes = feed_sensor1(&mut detector, &[100.0, 100.0, 90.0, 70.0, 100.0]);

    // Then: Minimum is 70 and percent change the 90 -> 70 step
    let events = events(&outcomes);
    assert_eq!(events.len(), 1);
    assert!((events[0].minimum_value - 70.0).abs() < 1e-9);
    assert!((events[0].percent_change - 200.0 / 9.0).abs() < 1e-9);
    assert_eq!(events[0].to_csv_line().rsplit(',').next(), Some("22.22"));
}

/// WHAT: Upward spikes are detected like dips
/// WHY: The threshold test uses the absolute relative change
#[test]
fn given_upward_spike_when_sampling_then_run_opens_and_closes() {
    // Given: An active detector
    let mut detector = active_detector();

    // When: 100 -> 120 -> 100
    let outcomes = feed_sensor1(&mut detector, &[100.0, 120.0, 100.0]);

    // Then: One event with a 20% change; the recovery reading is not the minimum
    let events = events(&outcomes);
    assert_eq!(events.len(), 1);
    assert!((events[0].percent_change - 20.0).abs() < 1e-9);
    assert!((events[0].minimum_value - 120.0).abs() < 1e-9);
}

/// WHAT: A zero previous reading skips evaluation without panicking
/// WHY: Percent change is undefined when dividing by zero
#[test]
fn given_zero_previous_value_when_sampling_then_no_run_opens() {
    // Given: An active detector
    let mut detector = active_detector();

    // When: 0 -> 5 -> 5
    let outcomes = feed_sensor1(&mut detector, &[0.0, 5.0, 5.0]);

    // Then: Nothing opened, baseline tracks the latest value
    assert!(events(&outcomes).is_empty());
    assert!(!detector.has_open_run(SensorId::Sensor1));
    assert_eq!(detector.channel(SensorId::Sensor1).last_value, Some(5.0));
}

/// WHAT: An open run survives zero readings and closes on recovery
/// WHY: Min tracking and the return check still run when the step is undefined
#[test]
fn given_open_run_when_reading_drops_to_zero_then_closes_on_recovery() {
    // Given: An active detector
    let mut detector = active_detector();

    // When: 100 -> 0 -> 0 -> 100
    let outcomes = feed_sensor1(&mut detector, &[100.0, 0.0, 0.0, 100.0]);

    // Then: One event with minimum 0 and a 100% change
    let events = events(&outcomes);
    assert_eq!(events.len(), 1);
    assert!((events[0].minimum_value).abs() < 1e-9);
    assert!((events[0].percent_change - 100.0).abs() < 1e-9);
    assert_eq!(events[0].end_time, at(300));
}

/// WHAT: The two sensors are evaluated independently
/// WHY: A flicker on one channel must not touch the other's state
#[test]
fn given_flicker_on_sensor2_when_sensor1_steady_then_only_sensor2_counts() {
    // Given: An active detector
    let mut detector = active_detector();

    // When: Sensor 2 dips while sensor 1 holds
    let readings = [(10.0, 200.0), (10.0, 200.0), (10.0, 150.0), (10.0, 199.0)];
    let mut emitted = Vec::new();
    for (i, (s1, s2)) in readings.into_iter().enumerate() {
        let outcome = detector.on_sample(&Sample::new(at(100 * i as i64), s1, s2));
        if let Some(row) = outcome.row {
            assert!(!row.sensor1_has_open_run);
        }
        emitted.extend(outcome.events);
    }

    // Then: Only sensor 2 produced an event
    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0].sensor, SensorId::Sensor2);
    assert_eq!(detector.flicker_counts(), [0, 1]);
}

/// WHAT: Flicker count equals the number of closed runs
/// WHY: Counts are monotonic, one per closed run
#[test]
fn given_three_flickers_when_sampling_then_count_is_three() {
    // Given: An active detector
    let mut detector = active_detector();

    // When: Three separate dips, the last one left open
    let outcomes = feed_sensor1(
        &mut detector,
        &[100.0, 100.0, 80.0, 100.0, 100.0, 70.0, 100.0, 100.0, 90.0, 100.0, 50.0],
    );

    // Then: Three closed runs counted, a fourth still open
    assert_eq!(events(&outcomes).len(), 3);
    assert_eq!(detector.flicker_count(SensorId::Sensor1), 3);
    assert!(detector.has_open_run(SensorId::Sensor1));
}

/// WHAT: A higher threshold ignores moves below it
/// WHY: The threshold is configurable per detector
#[test]
fn given_five_percent_threshold_when_three_percent_dip_then_no_run() {
    // Given: A detector with a 5% threshold
    let mut detector = FlickerDetector::new(5.0);
    detector.begin_session();

    // When: A 3% dip
    let outcomes = feed_sensor1(&mut detector, &[100.0, 97.0, 100.0]);

    // Then: Nothing detected
    assert!(events(&outcomes).is_empty());
    assert!((detector.threshold_percent() - 5.0).abs() < f64::EPSILON);
}

/// WHAT: An inactive detector neither evaluates nor logs samples
/// WHY: Detection and logging only happen during a session
#[test]
fn given_inactive_detector_when_sampling_then_state_untouched() {
    // Given: A detector with no session
    let mut detector = FlickerDetector::default();

    // When: A dip arrives
    let outcomes = feed_sensor1(&mut detector, &[100.0, 100.0, 80.0, 100.0]);

    // Then: No rows, no events, channels still initial
    assert!(outcomes.iter().all(|o| o.row.is_none() && o.events.is_empty()));
    assert_eq!(
        *detector.channel(SensorId::Sensor1),
        SensorChannelState::default()
    );
    assert!(!detector.is_active());
}

/// WHAT: reset() restores both channels and zeroes counts
/// WHY: Every new session starts from a clean slate
#[test]
fn given_counts_and_open_run_when_reset_then_initial_state() {
    // Given: A detector with a closed and an open run
    let mut detector = active_detector();
    feed_sensor1(&mut detector, &[100.0, 100.0, 80.0, 100.0, 60.0]);
    assert_eq!(detector.flicker_count(SensorId::Sensor1), 1);
    assert!(detector.has_open_run(SensorId::Sensor1));

    // When: Resetting
    detector.reset();

    // Then: Everything is back to initial
    for sensor in SensorId::ALL {
        assert_eq!(*detector.channel(sensor), SensorChannelState::default());
        assert_eq!(detector.flicker_count(sensor), 0);
    }
}

/// WHAT: Ending a session discards the open run without emitting it
/// WHY: A run cut off by a stop is defined data loss, not an event
#[test]
fn given_open_run_when_session_ends_then_run_discarded() {
    // Given: An open run
    let mut detector = active_detector();
    feed_sensor1(&mut detector, &[100.0, 100.0, 80.0]);
    assert!(detector.has_open_run(SensorId::Sensor1));

    // When: The session ends and the reading recovers afterwards
    detector.end_session();
    let outcomes = feed_sensor1(&mut detector, &[100.0]);

    // Then: No event, no count, no open run
    assert!(events(&outcomes).is_empty());
    assert!(!detector.has_open_run(SensorId::Sensor1));
    assert_eq!(detector.flicker_count(SensorId::Sensor1), 0);
}

/// WHAT: Restarting a session clears counts from the previous one
/// WHY: begin_session() performs a full reset
#[test]
fn given_previous_session_counts_when_restarting_then_counts_zero() {
    // Given: A session that recorded one flicker
    let mut detector = active_detector();
    feed_sensor1(&mut detector, &[100.0, 100.0, 80.0, 100.0]);
    detector.end_session();
    assert_eq!(detector.flicker_count(SensorId::Sensor1), 1);

    // When: Starting a new session
    detector.begin_session();

    // Then: Counts are back to zero
    assert_eq!(detector.flicker_counts(), [0, 0]);
    assert!(detector.is_active());
}

/// WHAT: Never more than one run open per sensor
/// WHY: Further threshold crossings extend the open run instead of nesting
#[test]
fn given_repeated_crossings_while_open_when_closed_then_single_event() {
    // Given: An active detector
    let mut detector = active_detector();

    // When: The reading swings several times before returning
    let outcomes = feed_sensor1(&mut detector, &[100.0, 100.0, 80.0, 90.0, 75.0, 85.0, 100.0]);

    // Then: Exactly one event covering the whole excursion
    let events = events(&outcomes);
    assert_eq!(events.len(), 1);
    assert!((events[0].minimum_value - 75.0).abs() < 1e-9);
    assert_eq!(events[0].start_time, at(200));
}
