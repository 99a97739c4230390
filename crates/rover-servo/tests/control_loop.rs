mod common;

use std::sync::atomic::AtomicBool;

use common::Scene;
use rover_servo::approach::{ActuatorChannel, ApproachState, Command, RecordingSink};
use rover_servo::{ControlLoop, FrameQueue, ImageSequence, ServoConfig, StopReason};

fn quiet_config() -> ServoConfig {
    let mut cfg = ServoConfig::default();
    cfg.approach.pulse_settle_ms = 0;
    cfg
}

#[test]
fn straight_approach_drives_in_and_engages() {
    let dir = tempfile::tempdir().expect("tempdir");
    for (i, d) in [340, 280, 200, 120].into_iter().enumerate() {
        Scene::new()
            .rover()
            .target_ahead(d)
            .save(dir.path(), &format!("frame_{i:03}.png"));
    }

    let mut cfg = quiet_config();
    let annotated = dir.path().join("annotated");
    cfg.annotate_dir = Some(annotated.clone());

    let frames = ImageSequence::open(dir.path()).expect("frames");
    let mut servo = ControlLoop::new(&cfg, frames, RecordingSink::default());
    let summary = servo.run(&AtomicBool::new(false)).expect("run");

    assert_eq!(summary.stopped_by, StopReason::FramesExhausted);
    assert_eq!(summary.cycles, 4);
    assert_eq!(summary.solved, 4);
    assert_eq!(
        summary.final_state,
        ApproachState {
            can_turn: false,
            approached: false,
            fork_override: false
        }
    );

    let sink = servo.into_sink();
    assert!(sink.closed);
    assert_eq!(
        sink.sent,
        vec![
            Command::Fork(120.0),
            // 340 px: drive, pre-position forks, disengage reset
            Command::Angular(0.0),
            Command::Linear(8.0),
            Command::Fork(120.0),
            // 280 px: final approach begins
            Command::Angular(0.0),
            Command::Linear(8.0),
            Command::Fork(120.0),
            // 200 px
            Command::Angular(0.0),
            Command::Linear(8.0),
            // 120 px: engage
            Command::Angular(0.0),
            Command::Fork(180.0),
            Command::Linear(0.0),
        ]
    );

    let written = std::fs::read_dir(&annotated).expect("annotated dir").count();
    assert_eq!(written, 4);
}

#[test]
fn losing_target_on_final_approach_raises_forks_and_holds() {
    let dir = tempfile::tempdir().expect("tempdir");
    Scene::new()
        .rover()
        .target_ahead(280)
        .save(dir.path(), "frame_0.png");
    Scene::new().rover().save(dir.path(), "frame_1.png");
    Scene::new()
        .rover()
        .target_ahead(200)
        .save(dir.path(), "frame_2.png");

    let frames = ImageSequence::open(dir.path()).expect("frames");
    let mut servo = ControlLoop::new(&quiet_config(), frames, RecordingSink::default());
    let summary = servo.run(&AtomicBool::new(false)).expect("run");

    assert_eq!(summary.solved, 2);
    assert!(summary.final_state.fork_override);

    let sink = servo.into_sink();
    assert_eq!(
        sink.sent,
        vec![
            Command::Fork(120.0),
            Command::Angular(0.0),
            Command::Linear(8.0),
            Command::Fork(120.0),
            Command::Fork(180.0),
            Command::Linear(0.0),
            Command::Angular(0.0),
        ]
    );
    assert_eq!(sink.on(ActuatorChannel::Fork).last(), Some(180.0));
}

#[test]
fn sideways_target_pulses_instead_of_driving() {
    let dir = tempfile::tempdir().expect("tempdir");
    Scene::new()
        .rover()
        .disc(340, 300, 23, common::DARK)
        .save(dir.path(), "frame_0.png");

    let frames = ImageSequence::open(dir.path()).expect("frames");
    let mut servo = ControlLoop::new(&quiet_config(), frames, RecordingSink::default());
    servo.run(&AtomicBool::new(false)).expect("run");

    let sink = servo.into_sink();
    assert_eq!(
        sink.on(ActuatorChannel::Angular).collect::<Vec<_>>(),
        vec![2.0, 0.0]
    );
    assert!(sink.on(ActuatorChannel::Linear).next().is_none());
}

#[test]
fn cycle_limit_stops_a_looping_source() {
    let dir = tempfile::tempdir().expect("tempdir");
    Scene::new()
        .rover()
        .target_ahead(200)
        .save(dir.path(), "only.png");

    let frames = ImageSequence::open(dir.path())
        .expect("frames")
        .looping(true);
    let mut servo = ControlLoop::new(&quiet_config(), frames, RecordingSink::default())
        .with_max_cycles(Some(3));
    let summary = servo.run(&AtomicBool::new(false)).expect("run");
    assert_eq!(summary.stopped_by, StopReason::CycleLimit);
    assert_eq!(summary.cycles, 3);
}

#[test]
fn unwritable_annotation_dir_does_not_stop_the_loop() {
    let dir = tempfile::tempdir().expect("tempdir");
    for (i, d) in [300, 250, 200].into_iter().enumerate() {
        Scene::new()
            .rover()
            .target_ahead(d)
            .save(dir.path(), &format!("frame_{i}.png"));
    }
    let blocker = tempfile::tempdir().expect("tempdir");
    let not_a_dir = blocker.path().join("annotated");
    std::fs::write(&not_a_dir, b"occupied").expect("write file");

    let mut cfg = quiet_config();
    cfg.annotate_dir = Some(not_a_dir.clone());

    let frame = rover_servo::load_frame(dir.path().join("frame_0.png")).expect("frame");
    let mut single = ControlLoop::new(&cfg, FrameQueue::default(), RecordingSink::default());
    let report = single.run_cycle(&frame).expect("cycle");
    assert!(report.estimate.observation.navigation().is_some());
    assert!(report.annotated.is_none());

    let frames = ImageSequence::open(dir.path()).expect("frames");
    let mut servo = ControlLoop::new(&cfg, frames, RecordingSink::default());
    let summary = servo.run(&AtomicBool::new(false)).expect("run");
    assert_eq!(summary.stopped_by, StopReason::FramesExhausted);
    assert_eq!(summary.cycles, 3);
    assert_eq!(summary.solved, 3);
    assert!(servo.sink().closed);
    assert!(not_a_dir.is_file());
}
