/// Exercise Tracker
///
/// Per-session repetition state machine driven one pose at a time:
/// - Keypoint gating with a reposition request when the body is out of frame
/// - Debounced phase transitions (`idle → starting → armed ⇄ engaged`)
/// - Repetition records counted on the return to the armed position
/// - Step counting and cadence for running, which has no phase cycle
///
/// A tracker is owned by exactly one test session; all mutation stays inside it.
use std::collections::VecDeque;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{EngineConfig, RunningConfig, TrackingConfig};
use crate::models::exercise::{
    form_score, ExercisePhase, ExerciseState, FormIssue, RepetitionData, TestType,
};
use crate::models::keypoint::Pose;
use crate::services::analyzers::{
    analyzer_for, AnalysisResult, Baseline, ExerciseAnalyzer, PhaseCycle,
};
use crate::services::geometry::has_required_groups;

pub const REPOSITION_FEEDBACK: &str = "Move into frame so your whole body is visible";
pub const COMPLETED_FEEDBACK: &str = "Test complete";

/// Mutable bookkeeping of one session's repetition cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub phase: ExercisePhase,
    pub rep_count: u32,
    pub last_phase_change_ms: Option<u64>,
    pub rep_start_ms: Option<u64>,
}

/// Result of a single phase transition step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseStep {
    pub phase: ExercisePhase,
    pub rep_completed: bool,
}

/// Whether enough time has passed since the last phase change
pub fn can_change_phase(last_change_ms: Option<u64>, now_ms: u64, min_phase_duration_ms: u64) -> bool {
    match last_change_ms {
        Some(last) => now_ms.saturating_sub(last) >= min_phase_duration_ms,
        None => true,
    }
}

/// Apply the transition table of a phase cycle to one analyzed frame.
///
/// Transitions only happen when `can_change` holds; a repetition completes on
/// the engaged → armed edge.
pub fn next_phase(
    phase: ExercisePhase,
    cycle: PhaseCycle,
    analysis: &AnalysisResult,
    can_change: bool,
) -> PhaseStep {
    let stay = PhaseStep {
        phase,
        rep_completed: false,
    };
    if !can_change {
        return stay;
    }

    match phase {
        ExercisePhase::Idle => PhaseStep {
            phase: ExercisePhase::Starting,
            rep_completed: false,
        },
        ExercisePhase::Starting if analysis.is_armed => PhaseStep {
            phase: cycle.armed,
            rep_completed: false,
        },
        p if p == cycle.armed && analysis.is_engaged => PhaseStep {
            phase: cycle.engaged,
            rep_completed: false,
        },
        p if p == cycle.engaged && analysis.is_armed => PhaseStep {
            phase: cycle.armed,
            rep_completed: true,
        },
        _ => stay,
    }
}

/// Foot-strike detection over rolling per-side ankle height histories
#[derive(Debug, Clone)]
pub struct StepDetector {
    config: RunningConfig,
    histories: [VecDeque<f32>; 2],
    step_times: VecDeque<u64>,
    last_step_ms: Option<u64>,
    step_count: u32,
    /// First step of the current timeline and the steps counted since it
    first_step_ms: Option<u64>,
    steps_since_first: u32,
}

impl StepDetector {
    pub fn new(config: RunningConfig) -> Self {
        Self {
            histories: [
                VecDeque::with_capacity(config.history_len),
                VecDeque::with_capacity(config.history_len),
            ],
            step_times: VecDeque::with_capacity(config.cadence_window + 1),
            last_step_ms: None,
            step_count: 0,
            first_step_ms: None,
            steps_since_first: 0,
            config,
        }
    }

    /// Feed one frame of (left, right) ankle y values; returns true on a new step
    pub fn observe(&mut self, now_ms: u64, ankle_heights: [Option<f32>; 2]) -> bool {
        if self.last_step_ms.is_some_and(|last| now_ms < last) {
            warn!(
                at_ms = now_ms,
                last_step_ms = self.last_step_ms,
                "Frame timestamps went backwards, restarting step timing"
            );
            self.step_times.clear();
            self.last_step_ms = None;
            self.first_step_ms = None;
            self.steps_since_first = 0;
        }

        let mut stepped = false;

        for (side, height) in ankle_heights.iter().enumerate() {
            let Some(y) = *height else {
                continue;
            };

            let history = &mut self.histories[side];
            history.push_back(y);
            while history.len() > self.config.history_len {
                history.pop_front();
            }

            if is_lift_peak(history, self.config.step_lift_px)
                && can_change_phase(self.last_step_ms, now_ms, self.config.min_step_interval_ms)
            {
                self.register_step(now_ms);
                stepped = true;
            }
        }

        stepped
    }

    fn register_step(&mut self, now_ms: u64) {
        self.step_count += 1;
        self.steps_since_first += 1;
        self.first_step_ms.get_or_insert(now_ms);
        self.last_step_ms = Some(now_ms);
        self.step_times.push_back(now_ms);
        while self.step_times.len() > self.config.cadence_window + 1 {
            self.step_times.pop_front();
        }
        debug!(step = self.step_count, at_ms = now_ms, "Step detected");
    }

    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    /// Steps per minute from the mean of the most recent inter-step intervals
    pub fn cadence(&self) -> Option<f32> {
        if self.step_times.len() < 2 {
            return None;
        }
        let intervals: Vec<u64> = self
            .step_times
            .iter()
            .zip(self.step_times.iter().skip(1))
            .map(|(a, b)| b.saturating_sub(*a))
            .collect();
        let mean = intervals.iter().sum::<u64>() as f32 / intervals.len() as f32;
        if mean <= 0.0 {
            return None;
        }
        Some(60_000.0 / mean)
    }

    /// Steps per minute from the first to the latest step, independent of
    /// how long the session ran
    pub fn session_rate(&self) -> Option<f64> {
        let span = self.last_step_ms?.saturating_sub(self.first_step_ms?);
        if self.steps_since_first < 2 || span == 0 {
            return None;
        }
        Some((self.steps_since_first - 1) as f64 * 60_000.0 / span as f64)
    }
}

/// The middle of the last five samples sits at least `lift_px` above (smaller
/// y than) both the first and the last sample of that window
fn is_lift_peak(history: &VecDeque<f32>, lift_px: f32) -> bool {
    if history.len() < 5 {
        return false;
    }
    let window: Vec<f32> = history.iter().skip(history.len() - 5).copied().collect();
    let mid = window[2];
    window[0] - mid >= lift_px && window[4] - mid >= lift_px
}

/// Repetition tracker for one test session
pub struct ExerciseTracker {
    session_id: Uuid,
    test_type: TestType,
    analyzer: Box<dyn ExerciseAnalyzer>,
    tracking: TrackingConfig,
    running: RunningConfig,
    reference_height_cm: f32,
    baseline: Option<Baseline>,
    session: SessionState,
    state: ExerciseState,
    repetitions: Vec<RepetitionData>,
    steps: StepDetector,
    flight_peak_ratio: f32,
    best_jump_ratio: f32,
    out_of_frame: bool,
    warned_uncalibrated: bool,
}

impl ExerciseTracker {
    /// Create a tracker with default configuration
    pub fn new(test_type: TestType) -> Self {
        Self::with_config(test_type, &EngineConfig::default())
    }

    /// Create a tracker, selecting the analyzer for the test type once
    pub fn with_config(test_type: TestType, config: &EngineConfig) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            test_type,
            analyzer: analyzer_for(test_type, config),
            tracking: config.tracking.clone(),
            running: config.running.clone(),
            reference_height_cm: config.thresholds.jump.reference_height_cm,
            baseline: None,
            session: SessionState::default(),
            state: ExerciseState::default(),
            repetitions: Vec::new(),
            steps: StepDetector::new(config.running.clone()),
            flight_peak_ratio: 0.0,
            best_jump_ratio: 0.0,
            out_of_frame: false,
            warned_uncalibrated: false,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn test_type(&self) -> TestType {
        self.test_type
    }

    pub fn state(&self) -> &ExerciseState {
        &self.state
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn repetitions(&self) -> &[RepetitionData] {
        &self.repetitions
    }

    pub fn baseline(&self) -> Option<&Baseline> {
        self.baseline.as_ref()
    }

    pub fn cadence(&self) -> Option<f32> {
        self.steps.cadence()
    }

    pub fn best_jump_height_ratio(&self) -> f32 {
        self.best_jump_ratio
    }

    /// Aggregate result: best jump height in cm, steps per minute for
    /// running, else reps
    pub fn raw_score(&self) -> f64 {
        match self.test_type {
            TestType::Jump => (self.best_jump_ratio * self.reference_height_cm) as f64,
            TestType::Running => self.steps.session_rate().unwrap_or(0.0),
            _ => self.session.rep_count as f64,
        }
    }

    /// Move an idle session to `starting`
    pub fn start(&mut self) {
        if self.session.phase == ExercisePhase::Idle {
            self.set_phase(ExercisePhase::Starting, None);
        }
    }

    /// Record the calibration baseline and move into the initial position.
    ///
    /// Returns false when the pose lacks the nose or both ankles; the phase
    /// still advances so angle-based tests can proceed.
    pub fn calibrate(&mut self, pose: &Pose) -> bool {
        self.baseline = Baseline::from_pose(pose, self.tracking.min_confidence);
        match &self.baseline {
            Some(baseline) => debug!(
                session_id = %self.session_id,
                ankle_y = baseline.ankle_y,
                body_height = baseline.body_height,
                "Calibrated baseline"
            ),
            None => warn!(session_id = %self.session_id, "Calibration pose lacks nose or ankles"),
        }

        if matches!(self.session.phase, ExercisePhase::Idle | ExercisePhase::Starting) {
            let initial = self
                .analyzer
                .cycle()
                .map_or(ExercisePhase::Starting, |cycle| cycle.armed);
            self.set_phase(initial, Some(pose.timestamp_ms));
            self.session.rep_start_ms = Some(pose.timestamp_ms);
        }
        self.state.feedback = self.encouragement().to_string();

        self.baseline.is_some()
    }

    /// Analyze one frame and return the updated snapshot
    pub fn process_pose(&mut self, pose: &Pose) -> ExerciseState {
        if self.session.phase == ExercisePhase::Completed {
            return self.state.clone();
        }

        if !has_required_groups(pose, self.analyzer.required_keypoints(), self.tracking.min_confidence) {
            if !self.out_of_frame {
                warn!(session_id = %self.session_id, test_type = %self.test_type, "Insufficient keypoints, asking athlete to reposition");
                self.out_of_frame = true;
            }
            self.state.feedback = REPOSITION_FEEDBACK.to_string();
            return self.state.clone();
        }
        self.out_of_frame = false;

        if self.test_type == TestType::Jump && self.baseline.is_none() && !self.warned_uncalibrated {
            warn!(session_id = %self.session_id, "Jump session is not calibrated, heights read as zero");
            self.warned_uncalibrated = true;
        }

        let now = pose.timestamp_ms;
        self.reanchor_if_rewound(now);
        let analysis = self.analyzer.analyze(pose, self.baseline.as_ref());
        let frame_form_score = form_score(analysis.issues.len(), self.tracking.form_penalty_per_issue);

        match self.analyzer.cycle() {
            Some(cycle) => self.advance_cycle(cycle, &analysis, frame_form_score, now),
            None => self.advance_steps(&analysis, now),
        }

        self.state.phase = self.session.phase;
        self.state.rep_count = self.session.rep_count;
        self.state.form_score = frame_form_score;
        self.state.current_angle = analysis.primary_angle;
        self.state.feedback = match FormIssue::most_severe(&analysis.issues) {
            Some(issue) => issue.message().to_string(),
            None => self.encouragement().to_string(),
        };

        self.state.clone()
    }

    /// End the session; later frames are ignored
    pub fn finish(&mut self) -> ExerciseState {
        self.set_phase(ExercisePhase::Completed, None);
        self.state.phase = ExercisePhase::Completed;
        self.state.feedback = COMPLETED_FEEDBACK.to_string();
        info!(
            session_id = %self.session_id,
            test_type = %self.test_type,
            reps = self.session.rep_count,
            raw_score = self.raw_score(),
            "Session finished"
        );
        self.state.clone()
    }

    /// Clear calibration, phase and repetitions
    pub fn reset(&mut self) {
        self.baseline = None;
        self.session = SessionState::default();
        self.state = ExerciseState::default();
        self.repetitions.clear();
        self.steps = StepDetector::new(self.running.clone());
        self.flight_peak_ratio = 0.0;
        self.best_jump_ratio = 0.0;
        self.out_of_frame = false;
        self.warned_uncalibrated = false;
        debug!(session_id = %self.session_id, "Session reset");
    }

    /// A producer clock reset would otherwise hold the phase until the clock
    /// caught up with the last transition
    fn reanchor_if_rewound(&mut self, now: u64) {
        let Some(last) = self.session.last_phase_change_ms else {
            return;
        };
        if now >= last {
            return;
        }
        warn!(
            session_id = %self.session_id,
            at_ms = now,
            last_phase_change_ms = last,
            "Frame timestamps went backwards, re-anchoring phase timing"
        );
        self.session.last_phase_change_ms = Some(now);
        if self.session.rep_start_ms.is_some_and(|start| start > now) {
            self.session.rep_start_ms = Some(now);
        }
    }

    fn advance_cycle(&mut self, cycle: PhaseCycle, analysis: &AnalysisResult, frame_form_score: f32, now: u64) {
        let can_change = can_change_phase(
            self.session.last_phase_change_ms,
            now,
            self.tracking.min_phase_duration_ms,
        );
        let previous = self.session.phase;
        let step = next_phase(previous, cycle, analysis, can_change);

        if step.phase != previous {
            self.set_phase(step.phase, Some(now));
            if previous == ExercisePhase::Starting {
                self.session.rep_start_ms = Some(now);
            }
            if step.phase == cycle.engaged {
                self.flight_peak_ratio = 0.0;
            }
        }

        if self.session.phase == cycle.engaged {
            if let Some(ratio) = analysis.jump_height_ratio {
                self.flight_peak_ratio = self.flight_peak_ratio.max(ratio);
            }
        }

        if step.rep_completed {
            let start = self.session.rep_start_ms.unwrap_or(now);
            let rep = RepetitionData::new(start, now, frame_form_score, analysis.issues.clone());
            self.session.rep_count += 1;
            self.session.rep_start_ms = Some(now);
            self.best_jump_ratio = self.best_jump_ratio.max(self.flight_peak_ratio);

            info!(
                session_id = %self.session_id,
                test_type = %self.test_type,
                rep = self.session.rep_count,
                duration_ms = rep.duration_ms,
                form_score = rep.form_score,
                "Repetition completed"
            );
            self.repetitions.push(rep);
        }

        if self.test_type == TestType::Jump {
            self.state.jump_height_ratio = analysis.jump_height_ratio;
        }
    }

    fn advance_steps(&mut self, analysis: &AnalysisResult, now: u64) {
        if self.session.phase == ExercisePhase::Idle {
            self.set_phase(ExercisePhase::Starting, Some(now));
        }

        if self.steps.observe(now, analysis.ankle_heights) && self.session.phase == ExercisePhase::Starting {
            self.set_phase(ExercisePhase::Up, Some(now));
        }

        self.session.rep_count = self.steps.step_count();
        self.state.cadence = self.steps.cadence();
        if analysis.stride_length.is_some() {
            self.state.stride_length = analysis.stride_length;
        }
        self.state.distance = self
            .state
            .stride_length
            .map(|stride| stride * self.steps.step_count() as f32);
    }

    fn set_phase(&mut self, phase: ExercisePhase, at_ms: Option<u64>) {
        if phase != self.session.phase {
            debug!(
                session_id = %self.session_id,
                from = %self.session.phase,
                to = %phase,
                at_ms,
                "Phase transition"
            );
        }
        self.session.phase = phase;
        self.state.phase = phase;
        if at_ms.is_some() {
            self.session.last_phase_change_ms = at_ms;
        }
    }

    fn encouragement(&self) -> &'static str {
        use ExercisePhase::*;

        match (self.test_type, self.session.phase) {
            (_, Idle) => "Get into position to begin",
            (_, Completed) => COMPLETED_FEEDBACK,
            (TestType::Squats, Starting) => "Stand tall with feet shoulder-width apart",
            (TestType::Squats, Up) => "Squat down, sit your hips back",
            (TestType::Squats, Down) => "Drive up through your heels",
            (TestType::Pushups, Starting) => "Get into a plank with arms extended",
            (TestType::Pushups, Up) => "Lower your chest towards the floor",
            (TestType::Pushups, Down) => "Push back up, keep your body straight",
            (TestType::Situps, Starting) => "Lie back with knees bent",
            (TestType::Situps, Down) => "Curl up towards your knees",
            (TestType::Situps, Up) => "Lower back down with control",
            (TestType::Pullups, Starting) => "Hang from the bar with arms extended",
            (TestType::Pullups, Down) => "Pull your chin over the bar",
            (TestType::Pullups, Up) => "Lower yourself with control",
            (TestType::Jump, Starting) => "Stand still on both feet",
            (TestType::Jump, Down) => "Jump as high as you can!",
            (TestType::Jump, Up) => "Land softly with bent knees",
            (TestType::Running, Starting) => "Start running at a steady pace",
            (TestType::Running, _) => "Great rhythm, keep it up!",
        }
    }
}

impl std::fmt::Debug for ExerciseTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExerciseTracker")
            .field("session_id", &self.session_id)
            .field("test_type", &self.test_type)
            .field("session", &self.session)
            .field("repetitions", &self.repetitions.len())
            .finish()
    }
}
