//! Hand tracking — both from LeapMotion hardware and a synthetic simulator.
//!
//! The public interface is the [`Tracker`] trait: a non-blocking "give me
//! the latest [`Frame`]" call.  Consumers don't need to know whether frames
//! came from real hardware or the simulated hands.

use std::sync::mpsc::Receiver;
#[cfg(feature = "leap")]
use std::sync::mpsc::{self, Sender};
#[cfg(feature = "leap")]
use std::thread;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("failed to open tracking device: {0}")]
    Connect(String),
    #[error("tracking thread exited before reporting")]
    Disconnected,
}

// ════════════════════════════════════════════════════════════════════════════
// Frame data
// ════════════════════════════════════════════════════════════════════════════

/// Tracker-side 3-vector, millimetres in device space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector {
    pub const fn new(x: f32, y: f32, z: f32) -> Self { Vector { x, y, z } }
}

/// Anatomical finger type, ordered thumb → pinky.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FingerType { Thumb, Index, Middle, Ring, Pinky }

impl FingerType {
    pub const ALL: [FingerType; 5] = [
        FingerType::Thumb, FingerType::Index, FingerType::Middle,
        FingerType::Ring,  FingerType::Pinky,
    ];

    /// Digit ordinal as reported per hand (0 = thumb).
    pub fn from_index(i: usize) -> Option<FingerType> {
        Self::ALL.get(i).copied()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Finger {
    finger_type:  FingerType,
    tip_position: Vector,
    extended:     bool,
}

impl Finger {
    pub fn new(finger_type: FingerType, tip_position: Vector, extended: bool) -> Self {
        Finger { finger_type, tip_position, extended }
    }

    pub fn finger_type(&self)  -> FingerType { self.finger_type }
    pub fn tip_position(&self) -> Vector     { self.tip_position }
    pub fn is_extended(&self)  -> bool       { self.extended }
}

/// One tracking sample. Immutable once built.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    id:      u64,
    fingers: Vec<Finger>,
}

impl Frame {
    pub fn new(id: u64, fingers: Vec<Finger>) -> Self { Frame { id, fingers } }

    /// What a tracker reports when no device or hand is present.
    pub fn empty() -> Self { Frame::default() }

    pub fn id(&self) -> u64 { self.id }

    pub fn fingers(&self) -> FingerList<'_> {
        FingerList { fingers: self.fingers.iter().collect() }
    }
}

/// Which fingers get drawn as spheres.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerFilter {
    #[default]
    Index,
    Extended,
    ExtendedIndex,
    All,
}

/// A borrowed, filterable selection of a frame's fingers.
#[derive(Clone, Debug)]
pub struct FingerList<'a> {
    fingers: Vec<&'a Finger>,
}

impl<'a> FingerList<'a> {
    pub fn count(&self) -> usize { self.fingers.len() }
    pub fn is_empty(&self) -> bool { self.fingers.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &'a Finger> + '_ {
        self.fingers.iter().copied()
    }

    pub fn finger_type(mut self, ty: FingerType) -> Self {
        self.fingers.retain(|f| f.finger_type == ty);
        self
    }

    pub fn extended(mut self) -> Self {
        self.fingers.retain(|f| f.extended);
        self
    }

    pub fn filter(self, filter: FingerFilter) -> Self {
        match filter {
            FingerFilter::Index         => self.finger_type(FingerType::Index),
            FingerFilter::Extended      => self.extended(),
            FingerFilter::ExtendedIndex => self.extended().finger_type(FingerType::Index),
            FingerFilter::All           => self,
        }
    }
}

impl<'a> IntoIterator for FingerList<'a> {
    type Item     = &'a Finger;
    type IntoIter = std::vec::IntoIter<&'a Finger>;

    fn into_iter(self) -> Self::IntoIter { self.fingers.into_iter() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tracker trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can hand over the most recent [`Frame`] without blocking.
pub trait Tracker {
    fn frame(&mut self) -> Frame;
}

/// Open the tracker selected at build time.
///
/// `sim_rx` carries keyboard input for the simulator; hardware mode drops it.
#[cfg(not(feature = "leap"))]
pub fn connect(sim_rx: Receiver<SimInput>) -> Result<Box<dyn Tracker>, TrackingError> {
    log::info!("tracking: simulated hands (build with --features leap for hardware)");
    Ok(Box::new(SimTracker::new(sim_rx)))
}

#[cfg(feature = "leap")]
pub fn connect(_sim_rx: Receiver<SimInput>) -> Result<Box<dyn Tracker>, TrackingError> {
    let tracker = LeapTracker::connect()?;
    log::info!("tracking: LeapMotion hardware");
    Ok(Box::new(tracker))
}

// ════════════════════════════════════════════════════════════════════════════
// LeapTracker — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Tip-to-base distance above which a finger counts as extended.
#[cfg_attr(not(feature = "leap"), allow(dead_code))]
const EXTENDED_RATIO: f32 = 0.75;

/// Ratio of (tip – metacarpal base) distance to a typical finger length.
/// 1.0 = fully extended, ~0.0 = fully curled.
#[cfg_attr(not(feature = "leap"), allow(dead_code))]
fn extension_ratio(base: [f32; 3], tip: [f32; 3]) -> f32 {
    let dx = tip[0] - base[0];
    let dy = tip[1] - base[1];
    let dz = tip[2] - base[2];
    let dist = (dx*dx + dy*dy + dz*dz).sqrt();
    // Normalise to ~0–1 using typical finger length ≈ 80 mm
    (dist / 80.0).clamp(0.0, 1.0)
}

/// Newest frame from a producer thread.
///
/// Empty until the first frame arrives; keeps the last frame once the
/// sender is gone.
#[derive(Debug)]
pub struct LatestFrame {
    rx:     Receiver<Frame>,
    latest: Frame,
}

impl LatestFrame {
    pub fn new(rx: Receiver<Frame>) -> Self {
        LatestFrame { rx, latest: Frame::empty() }
    }

    /// Drain everything queued and return the newest frame.
    pub fn latest(&mut self) -> Frame {
        while let Ok(f) = self.rx.try_recv() {
            self.latest = f;
        }
        self.latest.clone()
    }
}

/// Tracker backed by a real LeapMotion controller.
///
/// LeapC is polled on a background thread; frames arrive over a channel and
/// [`Tracker::frame`] keeps only the newest.
#[cfg(feature = "leap")]
pub struct LeapTracker {
    frames: LatestFrame,
}

#[cfg(feature = "leap")]
impl LeapTracker {
    /// Open the device, blocking until LeapC reports success or failure.
    pub fn connect() -> Result<Self, TrackingError> {
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();
        let (frame_tx, frame_rx) = mpsc::channel::<Frame>();
        thread::spawn(move || poll_leap(ready_tx, frame_tx));

        match ready_rx.recv() {
            Ok(Ok(()))   => Ok(LeapTracker { frames: LatestFrame::new(frame_rx) }),
            Ok(Err(msg)) => Err(TrackingError::Connect(msg)),
            Err(_)       => Err(TrackingError::Disconnected),
        }
    }
}

#[cfg(feature = "leap")]
impl Tracker for LeapTracker {
    fn frame(&mut self) -> Frame { self.frames.latest() }
}

#[cfg(feature = "leap")]
fn poll_leap(ready: Sender<Result<(), String>>, tx: Sender<Frame>) {
    use leaprs::{Connection, ConnectionConfig, Event};

    let mut connection = match Connection::create(ConnectionConfig::default()) {
        Ok(c)  => c,
        Err(e) => {
            let _ = ready.send(Err(format!("LeapC connection: {:?}", e)));
            return;
        }
    };
    if let Err(e) = connection.open() {
        let _ = ready.send(Err(format!("LeapMotion device: {:?}", e)));
        return;
    }
    log::debug!("LeapC connection open");
    let _ = ready.send(Ok(()));

    let mut id = 0u64;
    loop {
        let msg = match connection.poll(100) {
            Ok(m)  => m,
            Err(_) => continue,
        };

        if let Event::Tracking(frame) = msg.event() {
            id += 1;
            let mut fingers = Vec::new();
            for hand in frame.hands() {
                for (i, digit) in hand.digits().enumerate() {
                    let Some(ty) = FingerType::from_index(i) else { continue };
                    let tip  = digit.distal().next_joint();
                    let base = digit.metacarpal().prev_joint();
                    let ext  = extension_ratio([base.x, base.y, base.z], [tip.x, tip.y, tip.z]);
                    fingers.push(Finger::new(
                        ty,
                        Vector::new(tip.x, tip.y, tip.z),
                        ext > EXTENDED_RATIO,
                    ));
                }
            }
            if tx.send(Frame::new(id, fingers)).is_err() { return; }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimTracker — synthetic hands (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimInput {
    /// Show this many hands (clamped to 0–2).
    Hands(usize),
    /// Freeze / resume the animation.
    TogglePause,
}

/// Full reach (palm → tip) per finger, thumb → pinky, in mm.
const REACH: [f32; 5] = [60.0, 85.0, 90.0, 85.0, 70.0];
/// Lateral spacing between neighbouring fingertips, in mm.
const SPREAD: f32 = 22.0;
/// Palm height above the device, in mm.
const PALM_Y: f32 = 200.0;

/// Tracker that animates one or two procedurally generated hands.
///
/// The pose is a pure function of the internal tick counter, so a paused
/// simulator keeps returning an identical frame.
pub struct SimTracker {
    rx:     Receiver<SimInput>,
    tick:   u64,
    hands:  usize,
    paused: bool,
}

impl SimTracker {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        SimTracker { rx, tick: 0, hands: 1, paused: false }
    }

    pub fn hands(&self) -> usize { self.hands }

    fn apply(&mut self, input: SimInput) {
        match input {
            SimInput::Hands(n)    => self.hands = n.min(2),
            SimInput::TogglePause => self.paused = !self.paused,
        }
    }

    fn pose(&self) -> Frame {
        let t = self.tick as f32 / 60.0;
        let mut fingers = Vec::with_capacity(self.hands * 5);

        for h in 0..self.hands {
            // A lone hand is the right hand, centred. Two hands sit either side.
            let (centre, mirror) = match (self.hands, h) {
                (1, _) => (  0.0,  1.0),
                (_, 0) => (-90.0, -1.0),
                _      => ( 90.0,  1.0),
            };
            let phase = h as f32 * 1.3;
            let palm = Vector::new(
                centre + 40.0 * (t * 0.7 + phase).sin(),
                PALM_Y + 30.0 * (t * 1.1 + phase).sin(),
                20.0 * (t * 0.5 + phase).cos(),
            );

            for (i, &ty) in FingerType::ALL.iter().enumerate() {
                let curl = match ty {
                    FingerType::Thumb | FingerType::Index => 0.0,
                    _ => 0.5 + 0.5 * (t * 1.5 + i as f32 + phase).sin(),
                };
                let reach = REACH[i] * (1.0 - 0.6 * curl);
                let tip = Vector::new(
                    palm.x + mirror * (i as f32 - 2.0) * SPREAD,
                    palm.y + reach * 0.6,
                    palm.z - reach * 0.8,
                );
                fingers.push(Finger::new(ty, tip, curl < 0.5));
            }
        }
        Frame::new(self.tick, fingers)
    }
}

impl Tracker for SimTracker {
    fn frame(&mut self) -> Frame {
        while let Ok(input) = self.rx.try_recv() {
            self.apply(input);
        }
        if !self.paused {
            self.tick += 1;
        }
        log::trace!("sim frame {} ({} hands)", self.tick, self.hands);
        self.pose()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn finger(ty: FingerType, x: f32, extended: bool) -> Finger {
        Finger::new(ty, Vector::new(x, 0.0, 0.0), extended)
    }

    fn sample() -> Frame {
        Frame::new(7, vec![
            finger(FingerType::Thumb,  1.0, true),
            finger(FingerType::Index,  2.0, true),
            finger(FingerType::Middle, 3.0, false),
            finger(FingerType::Index,  4.0, false),
        ])
    }

    #[test]
    fn finger_type_from_digit_ordinal() {
        assert_eq!(FingerType::from_index(0), Some(FingerType::Thumb));
        assert_eq!(FingerType::from_index(1), Some(FingerType::Index));
        assert_eq!(FingerType::from_index(4), Some(FingerType::Pinky));
        assert_eq!(FingerType::from_index(5), None);
    }

    #[test]
    fn empty_frame_has_no_fingers() {
        let f = Frame::empty();
        assert_eq!(f.fingers().count(), 0);
        assert!(f.fingers().is_empty());
    }

    #[test]
    fn filter_by_type_preserves_order() {
        let f = sample();
        let xs: Vec<f32> = f.fingers()
            .finger_type(FingerType::Index)
            .iter()
            .map(|f| f.tip_position().x)
            .collect();
        assert_eq!(xs, vec![2.0, 4.0]);
    }

    #[test]
    fn filter_variants() {
        let f = sample();
        assert_eq!(f.fingers().filter(FingerFilter::Index).count(), 2);
        assert_eq!(f.fingers().filter(FingerFilter::Extended).count(), 2);
        assert_eq!(f.fingers().filter(FingerFilter::ExtendedIndex).count(), 1);
        assert_eq!(f.fingers().filter(FingerFilter::All).count(), 4);
    }

    #[test]
    fn extension_ratio_bounds() {
        assert_eq!(extension_ratio([0.0; 3], [0.0; 3]), 0.0);
        assert_eq!(extension_ratio([0.0; 3], [0.0, 0.0, 40.0]), 0.5);
        assert_eq!(extension_ratio([0.0; 3], [0.0, 300.0, 0.0]), 1.0);
    }

    #[test]
    fn sim_one_hand_default() {
        let (_tx, rx) = mpsc::channel();
        let mut sim = SimTracker::new(rx);
        let f = sim.frame();
        assert_eq!(f.fingers().count(), 5);
        assert_eq!(f.fingers().finger_type(FingerType::Index).count(), 1);
        // Index is always extended in the simulation.
        assert_eq!(f.fingers().filter(FingerFilter::ExtendedIndex).count(), 1);
    }

    #[test]
    fn sim_hand_count_follows_input() {
        let (tx, rx) = mpsc::channel();
        let mut sim = SimTracker::new(rx);

        tx.send(SimInput::Hands(2)).unwrap();
        assert_eq!(sim.frame().fingers().count(), 10);

        tx.send(SimInput::Hands(0)).unwrap();
        assert_eq!(sim.frame().fingers().count(), 0);

        tx.send(SimInput::Hands(9)).unwrap();
        sim.frame();
        assert_eq!(sim.hands(), 2);
    }

    #[test]
    fn sim_advances_unless_paused() {
        let (tx, rx) = mpsc::channel();
        let mut sim = SimTracker::new(rx);
        let a = sim.frame();
        let b = sim.frame();
        assert_ne!(a.id(), b.id());

        tx.send(SimInput::TogglePause).unwrap();
        let c = sim.frame();
        let d = sim.frame();
        assert_eq!(c, d);
        assert_eq!(c, b);
    }

    #[test]
    fn sim_two_hands_are_mirrored() {
        let (tx, rx) = mpsc::channel();
        let mut sim = SimTracker::new(rx);
        tx.send(SimInput::Hands(2)).unwrap();
        let f = sim.frame();
        let thumbs: Vec<Vector> = f.fingers()
            .finger_type(FingerType::Thumb)
            .iter()
            .map(|f| f.tip_position())
            .collect();
        let indexes: Vec<Vector> = f.fingers()
            .finger_type(FingerType::Index)
            .iter()
            .map(|f| f.tip_position())
            .collect();
        // Left hand: thumb right of index. Right hand: thumb left of index.
        assert!(thumbs[0].x > indexes[0].x);
        assert!(thumbs[1].x < indexes[1].x);
    }

    #[test]
    fn latest_frame_is_empty_before_data() {
        let (_tx, rx) = mpsc::channel::<Frame>();
        let mut frames = LatestFrame::new(rx);
        assert_eq!(frames.latest(), Frame::empty());
    }

    #[test]
    fn latest_frame_keeps_newest_of_queued() {
        let (tx, rx) = mpsc::channel();
        let mut frames = LatestFrame::new(rx);
        for id in 1..=3 {
            tx.send(Frame::new(id, vec![finger(FingerType::Index, id as f32, true)])).unwrap();
        }
        let f = frames.latest();
        assert_eq!(f.id(), 3);
        assert_eq!(f.fingers().count(), 1);
        // Nothing new queued: same frame again.
        assert_eq!(frames.latest().id(), 3);
    }

    #[test]
    fn latest_frame_survives_sender_drop() {
        let (tx, rx) = mpsc::channel();
        let mut frames = LatestFrame::new(rx);
        tx.send(sample()).unwrap();
        drop(tx);
        assert_eq!(frames.latest(), sample());
        assert_eq!(frames.latest(), sample());
    }
}
