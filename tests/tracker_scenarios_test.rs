use fitness_assess::models::{ExercisePhase, FormIssue, TestType};
use fitness_assess::services::exercise_tracker::REPOSITION_FEEDBACK;
use fitness_assess::{EngineConfig, ExerciseTracker};
use pretty_assertions::assert_eq;

mod common;
use common::{MockPoseGenerator, FRAME_MS};

#[test]
fn test_single_squat_rep() {
    let mut tracker = ExerciseTracker::new(TestType::Squats);

    let mut last = None;
    for pose in MockPoseGenerator::squat_sequence(&[170.0, 170.0, 85.0, 85.0, 172.0], 200) {
        last = Some(tracker.process_pose(&pose));
    }
    let state = last.unwrap();

    assert_eq!(state.rep_count, 1);
    assert_eq!(state.phase, ExercisePhase::Up);
    assert_eq!(state.form_score, 100.0);
    assert_eq!(tracker.repetitions().len(), 1);

    let rep = &tracker.repetitions()[0];
    assert_eq!(rep.form_score, 100.0);
    assert!(rep.issues.is_empty());
    assert_eq!((rep.start_time_ms, rep.end_time_ms, rep.duration_ms), (200, 800, 600));
    assert_eq!(tracker.raw_score(), 1.0);
}

#[test]
fn test_phase_changes_are_debounced() {
    let mut tracker = ExerciseTracker::new(TestType::Squats);

    tracker.process_pose(&MockPoseGenerator::squat(170.0, 0));
    tracker.process_pose(&MockPoseGenerator::squat(170.0, 200));
    let state = tracker.process_pose(&MockPoseGenerator::squat(85.0, 400));
    assert_eq!(state.phase, ExercisePhase::Down);

    // Back to standing only 50ms later: must not register
    let state = tracker.process_pose(&MockPoseGenerator::squat(170.0, 450));
    assert_eq!(state.phase, ExercisePhase::Down);
    assert_eq!(state.rep_count, 0);

    let state = tracker.process_pose(&MockPoseGenerator::squat(170.0, 600));
    assert_eq!(state.phase, ExercisePhase::Up);
    assert_eq!(state.rep_count, 1);
}

#[test]
fn test_fast_bounce_counts_once() {
    let mut tracker = ExerciseTracker::new(TestType::Squats);
    let angles = [170.0, 170.0, 85.0, 170.0, 85.0, 170.0];
    let timestamps = [0, 200, 400, 650, 700, 750];

    for (angle, t) in angles.iter().zip(timestamps) {
        tracker.process_pose(&MockPoseGenerator::squat(*angle, t));
    }

    assert_eq!(tracker.state().rep_count, 1);
    assert_eq!(tracker.repetitions().len(), 1);
}

#[test]
fn test_calibration_enters_initial_position() {
    let mut tracker = ExerciseTracker::new(TestType::Squats);
    assert!(tracker.calibrate(&MockPoseGenerator::squat(175.0, 0)));
    assert_eq!(tracker.state().phase, ExercisePhase::Up);

    for (i, angle) in [85.0, 170.0, 88.0, 171.0].iter().enumerate() {
        tracker.process_pose(&MockPoseGenerator::squat(*angle, (i as u64 + 1) * 300));
    }
    assert_eq!(tracker.state().rep_count, 2);
    assert_eq!(tracker.repetitions()[0].duration_ms, 600);
}

#[test]
fn test_insufficient_keypoints_asks_to_reposition() {
    let mut tracker = ExerciseTracker::new(TestType::Squats);
    for pose in MockPoseGenerator::squat_sequence(&[170.0, 170.0, 85.0], 200) {
        tracker.process_pose(&pose);
    }
    let before = tracker.state().clone();

    let state = tracker.process_pose(&MockPoseGenerator::out_of_frame(800));
    assert_eq!(state.feedback, REPOSITION_FEEDBACK);
    assert_eq!(state.phase, before.phase);
    assert_eq!(state.rep_count, before.rep_count);
    assert_eq!(state.form_score, before.form_score);

    // Tracking resumes on the next complete frame
    let state = tracker.process_pose(&MockPoseGenerator::squat(170.0, 1_000));
    assert_eq!(state.rep_count, 1);
    assert_ne!(state.feedback, REPOSITION_FEEDBACK);
}

#[test]
fn test_pushup_rep_records_form_issue() {
    let mut tracker = ExerciseTracker::new(TestType::Pushups);
    let frames = [
        MockPoseGenerator::pushup(false, 0.0, 0),
        MockPoseGenerator::pushup(false, 0.0, 200),
        MockPoseGenerator::pushup(true, 0.0, 400),
        MockPoseGenerator::pushup(false, 80.0, 600),
    ];

    let mut state = None;
    for frame in &frames {
        state = Some(tracker.process_pose(frame));
    }
    let state = state.unwrap();

    assert_eq!(state.rep_count, 1);
    assert_eq!(state.form_score, 85.0);
    assert_eq!(state.feedback, FormIssue::HipSag.message());

    let rep = &tracker.repetitions()[0];
    assert_eq!(rep.form_score, 85.0);
    assert_eq!(rep.issues, vec![FormIssue::HipSag]);
}

#[test]
fn test_situp_rep_counts_on_return_down() {
    let mut tracker = ExerciseTracker::new(TestType::Situps);
    let frames = [
        MockPoseGenerator::situp(false, false, 0),
        MockPoseGenerator::situp(false, false, 200),
        MockPoseGenerator::situp(true, false, 400),
        MockPoseGenerator::situp(false, false, 600),
    ];

    let states: Vec<_> = frames.iter().map(|pose| tracker.process_pose(pose)).collect();
    assert_eq!(states[1].phase, ExercisePhase::Down);
    assert_eq!(states[2].phase, ExercisePhase::Up);
    assert_eq!(states[2].rep_count, 0);

    let state = &states[3];
    assert_eq!(state.phase, ExercisePhase::Down);
    assert_eq!(state.rep_count, 1);

    let rep = &tracker.repetitions()[0];
    assert_eq!(rep.form_score, 100.0);
    assert!(rep.issues.is_empty());
    assert_eq!(rep.duration_ms, 400);
}

#[test]
fn test_situp_with_knees_apart_records_issue() {
    let mut tracker = ExerciseTracker::new(TestType::Situps);
    for (i, curled) in [false, false, true, false].iter().enumerate() {
        tracker.process_pose(&MockPoseGenerator::situp(*curled, true, i as u64 * 200));
    }

    assert_eq!(tracker.state().rep_count, 1);
    assert_eq!(tracker.state().phase, ExercisePhase::Down);
    let rep = &tracker.repetitions()[0];
    assert_eq!(rep.form_score, 85.0);
    assert_eq!(rep.issues, vec![FormIssue::KneesSeparated]);
}

#[test]
fn test_pullup_rep_counts_on_return_to_hang() {
    let mut tracker = ExerciseTracker::new(TestType::Pullups);
    let frames = [
        MockPoseGenerator::pullup(230.0, false, 300.0, 0),
        MockPoseGenerator::pullup(230.0, false, 300.0, 200),
        MockPoseGenerator::pullup(40.0, true, 300.0, 400),
        MockPoseGenerator::pullup(230.0, false, 300.0, 600),
    ];

    let states: Vec<_> = frames.iter().map(|pose| tracker.process_pose(pose)).collect();
    assert_eq!(states[1].phase, ExercisePhase::Down);
    assert_eq!(states[2].phase, ExercisePhase::Up);

    let state = &states[3];
    assert_eq!(state.phase, ExercisePhase::Down);
    assert_eq!(state.rep_count, 1);
    assert_eq!(tracker.repetitions()[0].form_score, 100.0);
    assert!(tracker.repetitions()[0].issues.is_empty());
}

#[test]
fn test_half_pullup_is_not_counted() {
    let mut tracker = ExerciseTracker::new(TestType::Pullups);
    tracker.process_pose(&MockPoseGenerator::pullup(230.0, false, 300.0, 0));
    tracker.process_pose(&MockPoseGenerator::pullup(230.0, false, 300.0, 200));

    // Arms bent but the chin stays under the bar
    let state = tracker.process_pose(&MockPoseGenerator::pullup(90.0, true, 300.0, 400));
    assert_eq!(state.phase, ExercisePhase::Down);
    assert_eq!(state.form_score, 85.0);
    assert_eq!(state.feedback, FormIssue::InsufficientChinClearance.message());

    let state = tracker.process_pose(&MockPoseGenerator::pullup(230.0, false, 300.0, 600));
    assert_eq!(state.phase, ExercisePhase::Down);
    assert_eq!(state.rep_count, 0);
    assert!(tracker.repetitions().is_empty());
}

#[test]
fn test_pullup_swing_is_recorded_on_the_rep() {
    let mut tracker = ExerciseTracker::new(TestType::Pullups);
    let frames = [
        MockPoseGenerator::pullup(230.0, false, 300.0, 0),
        MockPoseGenerator::pullup(230.0, false, 300.0, 200),
        MockPoseGenerator::pullup(40.0, true, 300.0, 400),
        MockPoseGenerator::pullup(230.0, false, 360.0, 600),
    ];
    for frame in &frames {
        tracker.process_pose(frame);
    }

    assert_eq!(tracker.state().rep_count, 1);
    let rep = &tracker.repetitions()[0];
    assert_eq!(rep.form_score, 85.0);
    assert_eq!(rep.issues, vec![FormIssue::ExcessiveSwing]);
}

#[test]
fn test_jump_counts_landing_and_tracks_best_height() {
    let mut tracker = ExerciseTracker::new(TestType::Jump);
    assert!(tracker.calibrate(&MockPoseGenerator::jumper(700.0, 0)));
    assert_eq!(tracker.state().phase, ExercisePhase::Down);

    let heights = [700.0, 580.0, 560.0, 700.0, 700.0];
    let mut states = Vec::new();
    for (i, ankle_y) in heights.iter().enumerate() {
        states.push(tracker.process_pose(&MockPoseGenerator::jumper(*ankle_y, (i as u64 + 1) * 200)));
    }

    assert_eq!(states[1].phase, ExercisePhase::Up);
    assert!((states[1].jump_height_ratio.unwrap() - 0.2).abs() < 1e-4);
    assert_eq!(states[3].phase, ExercisePhase::Down);
    assert_eq!(states[4].rep_count, 1);

    let best = tracker.best_jump_height_ratio();
    assert!((best - 140.0 / 600.0).abs() < 1e-4);
    assert!((tracker.raw_score() - (best * 170.0) as f64).abs() < 1e-6);
}

#[test]
fn test_uncalibrated_jump_never_leaves_the_ground() {
    let mut tracker = ExerciseTracker::new(TestType::Jump);
    for (i, ankle_y) in [700.0, 700.0, 500.0, 700.0].iter().enumerate() {
        let state = tracker.process_pose(&MockPoseGenerator::jumper(*ankle_y, i as u64 * 200));
        assert_eq!(state.jump_height_ratio, Some(0.0));
    }
    assert_eq!(tracker.state().rep_count, 0);
    assert_eq!(tracker.raw_score(), 0.0);
}

#[test]
fn test_running_steps_and_cadence() {
    let mut tracker = ExerciseTracker::new(TestType::Running);

    // Left ankle lifts twice; each lift is confirmed two frames after its peak
    let left = [700.0, 700.0, 680.0, 700.0, 700.0, 700.0, 700.0, 700.0, 680.0, 700.0, 700.0];
    let mut state = None;
    for (i, y) in left.iter().enumerate() {
        state = Some(tracker.process_pose(&MockPoseGenerator::runner(*y, 700.0, i as u64 * FRAME_MS)));
    }
    let state = state.unwrap();

    assert_eq!(state.rep_count, 2);
    assert_eq!(state.phase, ExercisePhase::Up);
    assert!((state.cadence.unwrap() - 100.0).abs() < 1e-3);
    assert!((state.stride_length.unwrap() - 390.0).abs() < 1e-2);
    assert!((state.distance.unwrap() - 780.0).abs() < 1e-2);
    assert!(tracker.repetitions().is_empty());
    // Two steps 600ms apart
    assert_eq!(tracker.raw_score(), 100.0);
}

#[test]
fn test_running_raw_score_is_a_rate() {
    let mut short = ExerciseTracker::new(TestType::Running);
    for pose in MockPoseGenerator::running_sequence(60_000) {
        short.process_pose(&pose);
    }
    let mut long = ExerciseTracker::new(TestType::Running);
    for pose in MockPoseGenerator::running_sequence(120_000) {
        long.process_pose(&pose);
    }

    assert_eq!((short.state().rep_count, long.state().rep_count), (159, 319));
    assert_eq!(short.raw_score(), 160.0);
    assert_eq!(long.raw_score(), 160.0);
    assert!((long.cadence().unwrap() - 160.0).abs() < 1e-3);
}

#[test]
fn test_running_steps_are_debounced() {
    let mut tracker = ExerciseTracker::new(TestType::Running);

    // Both ankles peak in the same frame; only one step counts
    let ys = [700.0, 700.0, 680.0, 700.0, 700.0];
    for (i, y) in ys.iter().enumerate() {
        tracker.process_pose(&MockPoseGenerator::runner(*y, *y, i as u64 * FRAME_MS));
    }
    assert_eq!(tracker.state().rep_count, 1);
    assert_eq!(tracker.cadence(), None);
}

#[test]
fn test_finish_freezes_session() {
    let mut tracker = ExerciseTracker::new(TestType::Squats);
    for pose in MockPoseGenerator::squat_sequence(&[170.0, 170.0, 85.0, 170.0], 200) {
        tracker.process_pose(&pose);
    }
    let finished = tracker.finish();
    assert_eq!(finished.phase, ExercisePhase::Completed);
    assert_eq!(finished.rep_count, 1);

    let state = tracker.process_pose(&MockPoseGenerator::squat(85.0, 2_000));
    assert_eq!(state.phase, ExercisePhase::Completed);
    assert_eq!(state.rep_count, 1);
}

#[test]
fn test_reset_then_replay_is_identical() {
    let frames = MockPoseGenerator::squat_sequence(
        &[170.0, 170.0, 85.0, 90.0, 165.0, 100.0, 80.0, 170.0, 172.0],
        200,
    );
    let mut tracker = ExerciseTracker::new(TestType::Squats);

    let first: Vec<_> = frames.iter().map(|pose| tracker.process_pose(pose)).collect();
    let first_reps = tracker.repetitions().to_vec();
    assert_eq!(first_reps.len(), 2);

    tracker.reset();
    assert_eq!(tracker.state().phase, ExercisePhase::Idle);
    assert!(tracker.repetitions().is_empty());
    assert!(tracker.baseline().is_none());

    let second: Vec<_> = frames.iter().map(|pose| tracker.process_pose(pose)).collect();
    assert_eq!(first, second);
    assert_eq!(first_reps, tracker.repetitions().to_vec());
}

#[test]
fn test_configured_debounce_is_honoured() {
    let mut config = EngineConfig::default();
    config.tracking.min_phase_duration_ms = 500;
    let mut tracker = ExerciseTracker::with_config(TestType::Squats, &config);

    for pose in MockPoseGenerator::squat_sequence(&[170.0, 170.0, 85.0, 170.0, 85.0, 170.0], 300) {
        tracker.process_pose(&pose);
    }
    // 0: starting, 300: blocked, 600: not standing, 900: up, 1200/1500: blocked
    assert_eq!(tracker.state().phase, ExercisePhase::Up);
    assert_eq!(tracker.state().rep_count, 0);

    let mut default_tracker = ExerciseTracker::new(TestType::Squats);
    for pose in MockPoseGenerator::squat_sequence(&[170.0, 170.0, 85.0, 170.0, 85.0, 170.0], 300) {
        default_tracker.process_pose(&pose);
    }
    assert_eq!(default_tracker.state().rep_count, 2);
}

#[test]
fn test_rewound_clock_reanchors_phase_timing() {
    let mut tracker = ExerciseTracker::new(TestType::Squats);
    for pose in MockPoseGenerator::squat_sequence(&[170.0, 170.0, 85.0], 200) {
        tracker.process_pose(&pose);
    }
    assert_eq!(tracker.session().last_phase_change_ms, Some(400));

    // Producer clock restarts near zero
    let state = tracker.process_pose(&MockPoseGenerator::squat(170.0, 50));
    assert_eq!(state.phase, ExercisePhase::Down);
    assert_eq!(tracker.session().last_phase_change_ms, Some(50));

    let state = tracker.process_pose(&MockPoseGenerator::squat(170.0, 250));
    assert_eq!(state.phase, ExercisePhase::Up);
    assert_eq!(state.rep_count, 1);
    assert_eq!(tracker.session().last_phase_change_ms, Some(250));
    assert_eq!(tracker.repetitions()[0].duration_ms, 200);
}

#[test]
fn test_rep_count_never_decreases() {
    let mut tracker = ExerciseTracker::new(TestType::Squats);
    let angles = [170.0, 170.0, 85.0, 172.0, 84.0, 171.0, 150.0, 86.0, 175.0];
    let mut previous = 0;
    for (i, angle) in angles.iter().enumerate() {
        let state = tracker.process_pose(&MockPoseGenerator::squat(*angle, i as u64 * 250));
        assert!(state.rep_count >= previous);
        previous = state.rep_count;
    }
    assert_eq!(previous, 3);
}
