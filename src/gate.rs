use rand::Rng;

use crate::store::AdSettings;

// ---------------------------------------------------------------------------
// Ad gate — the subscription + ad sequencing that stands between a submitted
// generation request and the backend call. Pure state; the controller wires
// the timers around it.
// ---------------------------------------------------------------------------

/// Added to the configured ad duration for the safety timeout that fires when
/// the playback surface never signals ready or finished.
pub const SAFETY_GRACE_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    AwaitingSubscription,
    AwaitingAd,
    Dispatching,
}

/// What a fresh submit has to go through next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    NeedSubscription,
    StartAd,
}

/// Outcome of entering the ad step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdStep {
    /// No usable clip configured; go straight to dispatch.
    Skip,
    Play {
        url: String,
        duration_secs: u64,
        seq: u64,
    },
}

#[derive(Debug)]
pub struct AdGate {
    state: GateState,
    /// Bumped on every entry into AwaitingAd. Countdown, safety timer and
    /// external finish signals all carry the seq they were armed for, so a
    /// late timer from an abandoned ad can never double-dispatch.
    seq: u64,
}

impl Default for AdGate {
    fn default() -> Self {
        Self::new()
    }
}

impl AdGate {
    pub fn new() -> Self {
        Self {
            state: GateState::Idle,
            seq: 0,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn current_seq(&self) -> u64 {
        self.seq
    }

    /// A generation submit arrived. Unsubscribed users go to the
    /// subscription prompt; everyone else proceeds to the ad step.
    pub fn request(&mut self, subscribed: bool) -> GateDecision {
        if subscribed {
            GateDecision::StartAd
        } else {
            self.state = GateState::AwaitingSubscription;
            GateDecision::NeedSubscription
        }
    }

    /// The subscription action completed. Returns true when a pending
    /// request was actually waiting on it.
    pub fn on_subscribed(&mut self) -> bool {
        self.state == GateState::AwaitingSubscription
    }

    /// Enter the ad step: pick one clip uniformly at random, or skip when the
    /// list is empty or its first entry is blank.
    pub fn begin_ad(&mut self, settings: &AdSettings) -> AdStep {
        self.seq += 1;
        let urls = &settings.video_urls;
        let unconfigured = urls.is_empty() || urls[0].trim().is_empty();
        if unconfigured {
            self.state = GateState::Dispatching;
            return AdStep::Skip;
        }
        let url = urls[rand::rng().random_range(0..urls.len())].clone();
        self.state = GateState::AwaitingAd;
        AdStep::Play {
            url,
            duration_secs: settings.duration,
            seq: self.seq,
        }
    }

    /// Finish the ad armed as `seq`. Only the first matching signal wins;
    /// everything else (late timers, duplicate finishes, stale ads) no-ops.
    pub fn try_finish(&mut self, seq: u64) -> bool {
        if self.state == GateState::AwaitingAd && self.seq == seq {
            self.state = GateState::Dispatching;
            true
        } else {
            false
        }
    }

    /// External "ad finished" signal from the playback surface.
    pub fn finish_current(&mut self) -> bool {
        self.try_finish(self.seq)
    }

    /// The backend call for the dispatched request resolved.
    pub fn complete_dispatch(&mut self) {
        if self.state == GateState::Dispatching {
            self.state = GateState::Idle;
        }
    }

    /// Abandon whatever was in flight (e.g. nothing pending after all).
    pub fn reset(&mut self) {
        self.state = GateState::Idle;
    }
}

/// The post-ad redirect accepts bare hosts; prefix a scheme when missing.
/// Blank input disables the redirect.
pub fn normalize_redirect_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lowered = trimmed.to_lowercase();
    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        Some(trimmed.to_string())
    } else {
        Some(format!("https://{trimmed}"))
    }
}
