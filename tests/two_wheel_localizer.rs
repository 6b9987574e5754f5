use approx::assert_abs_diff_eq;
use prometheus_localization::common::Pose;
use prometheus_localization::config::TwoWheelConfig;
use prometheus_localization::perception::localization::{Localizer, TwoWheelLocalizer};
use prometheus_localization::perception::sensors::encoder::Direction;
use prometheus_localization::perception::sensors::sim::SimulatedRobot;
use prometheus_localization::LocalizationError;
use std::f64::consts::PI;
use std::thread;
use std::time::{Duration, Instant};

const CYCLE: Duration = Duration::from_millis(10);

fn localizer_with(config: TwoWheelConfig, start: Pose) -> (SimulatedRobot, TwoWheelLocalizer) {
    let (robot, hardware) = SimulatedRobot::new(&config, start);
    let localizer = TwoWheelLocalizer::with_start_pose(hardware, config, start).unwrap();
    (robot, localizer)
}

#[test]
fn idle_cycle_leaves_estimate_unchanged() {
    let (robot, mut localizer) = localizer_with(TwoWheelConfig::default(), Pose::default());

    robot.forward_handle().set(1200);
    robot.clock_handle().advance(CYCLE);
    localizer.update().unwrap();
    let displacement = localizer.displacement_pose();
    let total_heading = localizer.total_heading();

    robot.clock_handle().advance(CYCLE);
    localizer.update().unwrap();

    assert_eq!(localizer.displacement_pose(), displacement);
    assert_eq!(localizer.total_heading(), total_heading);
    assert_eq!(localizer.velocity(), Pose::default());
    assert_eq!(localizer.velocity_vector().magnitude(), 0.0);
}

#[test]
fn pure_translation_moves_one_inch() {
    let (robot, mut localizer) = localizer_with(TwoWheelConfig::default(), Pose::default());

    robot.forward_handle().set(500);
    robot.clock_handle().advance(CYCLE);
    localizer.update().unwrap();

    let displacement = localizer.displacement_pose();
    assert_abs_diff_eq!(displacement.x, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(displacement.y, 0.0, epsilon = 1e-12);
    assert_eq!(displacement.heading, 0.0);

    // one inch in 10ms
    assert_abs_diff_eq!(localizer.velocity().x, 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(localizer.velocity_vector().magnitude(), 100.0, epsilon = 1e-9);
}

#[test]
fn translation_is_rotated_into_global_frame() {
    let (robot, mut localizer) = localizer_with(TwoWheelConfig::default(), Pose::default());
    let quarter_turn = PI / 2.0;

    // turn in place, with the wheels seeing only the rotation artifact
    robot.forward_handle().set(0);
    robot.heading_handle().set_raw(quarter_turn);
    robot.clock_handle().advance(CYCLE);
    localizer.update().unwrap();
    let after_turn = localizer.pose();

    // then drive straight ahead, which is now +y
    robot.forward_handle().set(500);
    robot.clock_handle().advance(CYCLE);
    localizer.update().unwrap();

    let pose = localizer.pose();
    assert_abs_diff_eq!(pose.x - after_turn.x, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(pose.y - after_turn.y, 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(pose.heading, quarter_turn, epsilon = 1e-12);
}

#[test]
fn pure_rotation_cancels_wheel_offset_artifact() {
    let config = TwoWheelConfig {
        forward_encoder_y: 10.0,
        strafe_encoder_x: -20.0,
        ..TwoWheelConfig::default()
    };
    let (robot, mut localizer) = localizer_with(config, Pose::default());

    // ticks equal exactly the offset times the turn
    robot.forward_handle().set(1);
    robot.strafe_handle().set(-2);
    robot.heading_handle().set_raw(0.1);
    robot.clock_handle().advance(CYCLE);
    localizer.update().unwrap();

    let displacement = localizer.displacement_pose();
    assert_abs_diff_eq!(displacement.x, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(displacement.y, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(displacement.heading, 0.1, epsilon = 1e-12);
    assert_abs_diff_eq!(localizer.total_heading(), 0.1, epsilon = 1e-12);
}

#[test]
fn total_heading_does_not_wrap() {
    let (robot, mut localizer) = localizer_with(TwoWheelConfig::default(), Pose::default());
    let steps = 315;
    let step = 10.0 * PI / steps as f64;

    for i in 1..=steps {
        robot.heading_handle().set_raw(step * i as f64);
        robot.clock_handle().advance(CYCLE);
        localizer.update().unwrap();
    }

    assert_abs_diff_eq!(localizer.total_heading(), 10.0 * PI, epsilon = 1e-9);
    assert_abs_diff_eq!(localizer.pose().heading, 10.0 * PI, epsilon = 1e-9);
}

#[test]
fn clockwise_turns_accumulate_negative_heading() {
    let (robot, mut localizer) = localizer_with(TwoWheelConfig::default(), Pose::default());

    for i in 1..=40 {
        robot.heading_handle().set_raw(-0.2 * i as f64);
        robot.clock_handle().advance(CYCLE);
        localizer.update().unwrap();
    }

    assert_abs_diff_eq!(localizer.total_heading(), -8.0, epsilon = 1e-9);
}

#[test]
fn set_pose_round_trips() {
    let (mut robot, mut localizer) = localizer_with(TwoWheelConfig::default(), Pose::default());
    for _ in 0..50 {
        robot.step(20.0, 5.0, 0.3, CYCLE);
        localizer.update().unwrap();
    }

    // counters move without a poll; set_pose must absorb these ticks
    robot.forward_handle().add(700);
    robot.strafe_handle().add(-300);

    let requested = Pose::new(12.0, -4.5, 0.25);
    localizer.set_pose(requested).unwrap();
    assert_abs_diff_eq!(localizer.pose(), requested, epsilon = 1e-12);

    // nothing moved since the reset, so the next cycle sees zero deltas
    robot.clock_handle().advance(CYCLE);
    localizer.update().unwrap();
    assert_abs_diff_eq!(localizer.pose(), requested, epsilon = 1e-12);
    assert_eq!(localizer.velocity(), Pose::default());
}

#[test]
fn set_pose_reports_heading_relative_to_start() {
    let start = Pose::new(1.0, 2.0, 0.5);
    let (_robot, mut localizer) = localizer_with(TwoWheelConfig::default(), start);

    localizer.set_pose(Pose::new(3.0, 4.0, 1.0)).unwrap();

    assert_abs_diff_eq!(localizer.displacement_pose(), Pose::new(2.0, 2.0, 0.5), epsilon = 1e-12);
    // position is absolute, heading comes from the displacement alone
    assert_abs_diff_eq!(localizer.pose(), Pose::new(3.0, 4.0, 0.5), epsilon = 1e-12);
}

#[test]
fn set_start_pose_keeps_displacement() {
    let (robot, mut localizer) = localizer_with(TwoWheelConfig::default(), Pose::default());
    robot.forward_handle().set(1000);
    robot.clock_handle().advance(CYCLE);
    localizer.update().unwrap();
    let displacement = localizer.displacement_pose();

    localizer.set_start_pose(Pose::new(10.0, 20.0, 0.0));

    assert_eq!(localizer.displacement_pose(), displacement);
    assert_abs_diff_eq!(
        localizer.pose(),
        Pose::new(10.0 + displacement.x, 20.0 + displacement.y, 0.0),
        epsilon = 1e-12
    );
}

#[test]
fn tracks_ground_truth_through_an_arc() {
    let (mut robot, mut localizer) = localizer_with(TwoWheelConfig::default(), Pose::default());

    for _ in 0..300 {
        robot.step(20.0, 0.0, 1.0, CYCLE);
        localizer.update().unwrap();
    }

    let truth = robot.pose();
    let estimate = localizer.pose();
    assert!((estimate - truth).vector().magnitude() < 0.05);
    assert_abs_diff_eq!(estimate.heading, truth.heading, epsilon = 1e-9);
    assert_abs_diff_eq!(localizer.total_heading(), 3.0, epsilon = 1e-9);
    assert_abs_diff_eq!(localizer.velocity_vector().magnitude(), 20.0, epsilon = 0.5);
}

#[test]
fn reversed_encoders_are_corrected() {
    let config = TwoWheelConfig {
        forward_direction: Direction::Reverse,
        strafe_direction: Direction::Reverse,
        ..TwoWheelConfig::default()
    };
    let (mut robot, mut localizer) = localizer_with(config, Pose::default());

    for _ in 0..100 {
        robot.step(10.0, -6.0, -0.5, CYCLE);
        localizer.update().unwrap();
    }

    assert!(robot.forward_handle().get() < 0);
    let error = (localizer.pose() - robot.pose()).vector().magnitude();
    assert!(error < 0.05, "position error {}", error);
}

#[test]
fn sensor_failure_propagates() {
    let (robot, mut localizer) = localizer_with(TwoWheelConfig::default(), Pose::default());
    robot.forward_handle().set_failing(true);

    robot.clock_handle().advance(CYCLE);
    match localizer.update() {
        Err(LocalizationError::Sensor { name, .. }) => assert_eq!(name, "forward_encoder"),
        other => panic!("expected sensor error, got {:?}", other),
    }
    assert!(localizer.set_pose(Pose::default()).is_err());
}

#[test]
fn failed_cycle_keeps_ticks_for_next_cycle() {
    let (robot, mut localizer) = localizer_with(TwoWheelConfig::default(), Pose::default());

    robot.forward_handle().set(500);
    robot.strafe_handle().set_failing(true);
    robot.clock_handle().advance(CYCLE);
    assert!(localizer.update().is_err());
    assert_eq!(localizer.displacement_pose(), Pose::default());

    robot.strafe_handle().set_failing(false);
    robot.clock_handle().advance(CYCLE);
    localizer.update().unwrap();

    // the failed cycle's ticks and time are both carried into this one
    assert_eq!(localizer.delta_time_nanos(), 20_000_000);
    assert_abs_diff_eq!(localizer.displacement_pose(), Pose::new(1.0, 0.0, 0.0), epsilon = 1e-9);
    assert_abs_diff_eq!(localizer.velocity(), Pose::new(50.0, 0.0, 0.0), epsilon = 1e-6);
}

#[test]
fn failed_set_pose_leaves_estimate_untouched() {
    let (robot, mut localizer) = localizer_with(TwoWheelConfig::default(), Pose::default());

    robot.forward_handle().add(500);
    robot.clock_handle().advance(CYCLE);
    localizer.update().unwrap();
    let before = localizer.pose();

    robot.strafe_handle().set_failing(true);
    assert!(localizer.set_pose(Pose::new(5.0, 5.0, 0.0)).is_err());
    assert_eq!(localizer.pose(), before);

    robot.strafe_handle().set_failing(false);
    robot.forward_handle().add(500);
    robot.clock_handle().advance(CYCLE);
    localizer.update().unwrap();
    assert_abs_diff_eq!(localizer.pose(), before + Pose::new(1.0, 0.0, 0.0), epsilon = 1e-9);
}

#[test]
fn reset_imu_waits_for_settling() {
    let config = TwoWheelConfig {
        imu_settle_ms: 20,
        ..TwoWheelConfig::default()
    };
    let (robot, mut localizer) = localizer_with(config, Pose::default());
    assert_eq!(robot.heading_handle().resets(), 1);

    let started = Instant::now();
    localizer.reset_imu().unwrap();
    assert!(started.elapsed() >= Duration::from_millis(20));
    assert_eq!(robot.heading_handle().recalibrations(), 1);
}

#[test]
fn interrupted_reset_imu_is_fatal() {
    let config = TwoWheelConfig {
        imu_settle_ms: 30_000,
        ..TwoWheelConfig::default()
    };
    let (_robot, mut localizer) = localizer_with(config, Pose::default());
    let token = localizer.cancel_token();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        token.cancel();
    });

    let result = localizer.reset_imu();
    assert!(matches!(result, Err(LocalizationError::RecalibrationInterrupted)));
    canceller.join().unwrap();

    // stays interrupted until the token is cleared
    assert!(localizer.reset_imu().is_err());
}

#[test]
fn fault_hooks_are_inert() {
    let (_robot, mut localizer) = localizer_with(TwoWheelConfig::default(), Pose::default());
    localizer.set_guard_against_flying(true);
    assert!(!localizer.is_nan());
    assert_eq!(localizer.name(), "two_wheel");
}

#[test]
fn invalid_calibration_is_rejected() {
    let config = TwoWheelConfig {
        forward_ticks_to_inches: f64::NAN,
        ..TwoWheelConfig::default()
    };
    let (_robot, hardware) = SimulatedRobot::new(&config, Pose::default());
    let result = TwoWheelLocalizer::new(hardware, config);
    assert!(matches!(result, Err(LocalizationError::InvalidConfig(_))));
}
