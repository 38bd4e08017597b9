//! Typewriter reveal of assistant replies.
//!
//! Each assistant message moves through `NotStarted → Revealing → Done`.
//! Only the newest assistant message ever animates; everything else is shown
//! in full. The animator is a plain state machine advanced by [`tick`]; the
//! [`play_reveal`] driver pairs it with a [`FrameClock`] so tests can swap in
//! a paused clock.
//!
//! Lengths count `char`s, so a partial reveal never splits a code point.
//!
//! [`tick`]: RevealAnimator::tick

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::hint;
use crate::observability::{REVEAL_CANCELLED, REVEAL_COMPLETED, REVEAL_FRAMES};
use crate::types::{ChatMessage, MessageId, MessageRole};

/// Characters revealed per frame unless configured otherwise.
pub const DEFAULT_STEP: usize = 2;

/// Frame period of [`IntervalClock`] unless configured otherwise.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Where a message is in its reveal.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RevealPhase {
    /// Never observed.
    NotStarted,
    /// Partially visible.
    Revealing,
    /// Fully visible. Terminal.
    Done,
}

/// Reveal progress of one assistant message.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RevealState {
    revealed: usize,
    total: usize,
}

impl RevealState {
    fn seeded(total: usize) -> Self {
        Self {
            revealed: total.min(1),
            total,
        }
    }

    fn complete(total: usize) -> Self {
        Self {
            revealed: total,
            total,
        }
    }

    /// Characters currently visible.
    pub fn revealed(&self) -> usize {
        self.revealed
    }

    /// Characters in the full message.
    pub fn total(&self) -> usize {
        self.total
    }

    /// True once every character is visible.
    pub fn is_done(&self) -> bool {
        self.revealed >= self.total
    }
}

/// Progress report emitted whenever a reveal changes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RevealFrame {
    /// Message being revealed.
    pub id: MessageId,
    /// Characters now visible.
    pub revealed: usize,
    /// Characters in the full message.
    pub total: usize,
    /// True if this frame finished the reveal.
    pub done: bool,
}

/// Per-message reveal bookkeeping, keyed by message id.
///
/// The animator reads messages owned by the chat session and never writes
/// back into them.
#[derive(Debug, Clone)]
pub struct RevealAnimator {
    step: usize,
    states: HashMap<MessageId, RevealState>,
    active: Option<MessageId>,
}

impl Default for RevealAnimator {
    fn default() -> Self {
        Self::new(DEFAULT_STEP)
    }
}

impl RevealAnimator {
    /// Creates an animator advancing `step` characters per frame (at least 1).
    pub fn new(step: usize) -> Self {
        Self {
            step: step.max(1),
            states: HashMap::new(),
            active: None,
        }
    }

    /// Characters revealed per frame.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Marks every assistant message in `messages` as already revealed.
    ///
    /// Call this when a view first appears over existing history; there is
    /// nothing to gain from re-typing replies the visitor has already seen.
    pub fn mount(&mut self, messages: &[ChatMessage]) {
        for message in messages.iter().filter(|m| m.is_assistant()) {
            self.states
                .entry(message.id)
                .or_insert_with(|| RevealState::complete(char_len(&message.content)));
        }
        self.active = self.active.filter(|id| self.is_revealing(*id));
    }

    /// Registers assistant messages not seen before.
    ///
    /// A new message that is also the newest assistant message starts
    /// revealing with one character visible; any other new message is shown
    /// in full. An empty history drops all reveal state. Returns the seed
    /// frame when a reveal starts.
    pub fn observe(&mut self, messages: &[ChatMessage]) -> Option<RevealFrame> {
        if messages.is_empty() {
            self.reset();
            return None;
        }
        let present: HashSet<MessageId> = messages.iter().map(|m| m.id).collect();
        self.states.retain(|id, _| present.contains(id));
        if self.active.is_some_and(|id| !present.contains(&id)) {
            self.active = None;
        }

        let newest = messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant)
            .map(|m| m.id);
        let mut seed = None;
        for message in messages.iter().filter(|m| m.is_assistant()) {
            if self.states.contains_key(&message.id) {
                continue;
            }
            let total = char_len(&message.content);
            if Some(message.id) != newest {
                self.states.insert(message.id, RevealState::complete(total));
                continue;
            }
            if let Some(previous) = self.active.take() {
                self.finish(previous);
            }
            let state = RevealState::seeded(total);
            self.states.insert(message.id, state);
            if !state.is_done() {
                self.active = Some(message.id);
            }
            trace!(id = %message.id, total, "reveal started");
            seed = Some(RevealFrame {
                id: message.id,
                revealed: state.revealed,
                total,
                done: state.is_done(),
            });
        }
        seed
    }

    /// Advances the active reveal by one frame.
    ///
    /// Returns `None` when nothing is animating; a finished message never
    /// moves again.
    pub fn tick(&mut self) -> Option<RevealFrame> {
        let id = self.active?;
        let step = self.step;
        let state = self.states.get_mut(&id)?;
        if state.is_done() {
            self.active = None;
            return None;
        }
        state.revealed = (state.revealed + step).min(state.total);
        let frame = RevealFrame {
            id,
            revealed: state.revealed,
            total: state.total,
            done: state.is_done(),
        };
        REVEAL_FRAMES.click();
        if frame.done {
            REVEAL_COMPLETED.click();
            self.active = None;
        }
        Some(frame)
    }

    /// Jumps every reveal to its end.
    pub fn finish_all(&mut self) {
        for state in self.states.values_mut() {
            state.revealed = state.total;
        }
        self.active = None;
    }

    /// Forgets all reveal state.
    pub fn reset(&mut self) {
        self.states.clear();
        self.active = None;
    }

    /// Message currently revealing, if any.
    pub fn active(&self) -> Option<MessageId> {
        self.active
    }

    /// True while a reveal is in progress.
    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    /// Reveal progress for a message, if it has been observed.
    pub fn state(&self, id: MessageId) -> Option<RevealState> {
        self.states.get(&id).copied()
    }

    /// Phase of a message.
    pub fn phase(&self, id: MessageId) -> RevealPhase {
        match self.states.get(&id) {
            None => RevealPhase::NotStarted,
            Some(state) if state.is_done() => RevealPhase::Done,
            Some(_) => RevealPhase::Revealing,
        }
    }

    /// Text to render for `message` right now.
    ///
    /// User messages show in full with their hint block removed. Assistant
    /// messages show their revealed prefix, or everything if never observed.
    pub fn visible_text<'a>(&self, message: &'a ChatMessage) -> &'a str {
        match message.role {
            MessageRole::User => hint::decode(&message.content),
            MessageRole::Assistant => match self.states.get(&message.id) {
                Some(state) => char_prefix(&message.content, state.revealed),
                None => &message.content,
            },
        }
    }

    fn is_revealing(&self, id: MessageId) -> bool {
        self.phase(id) == RevealPhase::Revealing
    }

    fn finish(&mut self, id: MessageId) {
        if let Some(state) = self.states.get_mut(&id) {
            state.revealed = state.total;
        }
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn char_prefix(s: &str, chars: usize) -> &str {
    match s.char_indices().nth(chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

fn char_slice(s: &str, start: usize, end: usize) -> &str {
    let prefix = char_prefix(s, end);
    let skip = char_prefix(prefix, start).len();
    &prefix[skip..]
}

/////////////////////////////////////////// FrameClock ///////////////////////////////////////////

/// Source of animation frames.
#[async_trait::async_trait]
pub trait FrameClock: Send {
    /// Waits until the next frame.
    async fn next_frame(&mut self);
}

/// Frame clock backed by a tokio interval.
///
/// Must be created inside a tokio runtime. Late frames are skipped rather
/// than bunched up.
#[derive(Debug)]
pub struct IntervalClock {
    interval: Interval,
}

impl IntervalClock {
    /// Creates a clock ticking every `period` (at least 1 ms).
    ///
    /// The first frame arrives one full period after creation.
    pub fn new(period: Duration) -> Self {
        let period = period.max(Duration::from_millis(1));
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }
}

impl Default for IntervalClock {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}

#[async_trait::async_trait]
impl FrameClock for IntervalClock {
    async fn next_frame(&mut self) {
        self.interval.tick().await;
    }
}

/// How a [`play_reveal`] run ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RevealExit {
    /// `message` was not revealing; nothing was played.
    Idle,
    /// The message is fully revealed.
    Completed,
    /// `cancel` fired first; no further frames will run.
    Cancelled,
}

/// Plays the reveal of `message` frame by frame.
///
/// `on_frame` receives every frame together with the newly visible text,
/// starting with the seed frame, so a shell can append it and scroll to the
/// newest content. The clock is consumed and dropped when the run ends,
/// whether it completed or was cancelled.
pub async fn play_reveal<C, F>(
    animator: &mut RevealAnimator,
    message: &ChatMessage,
    mut clock: C,
    cancel: &CancellationToken,
    mut on_frame: F,
) -> RevealExit
where
    C: FrameClock,
    F: FnMut(&RevealFrame, &str),
{
    let Some(state) = animator.state(message.id) else {
        return RevealExit::Idle;
    };
    if animator.active() != Some(message.id) {
        return RevealExit::Idle;
    }

    let mut shown = state.revealed();
    let seed = RevealFrame {
        id: message.id,
        revealed: shown,
        total: state.total(),
        done: state.is_done(),
    };
    on_frame(&seed, char_prefix(&message.content, shown));

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                REVEAL_CANCELLED.click();
                trace!(id = %message.id, shown, "reveal cancelled");
                return RevealExit::Cancelled;
            }
            _ = clock.next_frame() => {}
        }
        let Some(frame) = animator.tick() else {
            return RevealExit::Completed;
        };
        if frame.id != message.id {
            return RevealExit::Idle;
        }
        on_frame(&frame, char_slice(&message.content, shown, frame.revealed));
        shown = frame.revealed;
        if frame.done {
            return RevealExit::Completed;
        }
    }
}
