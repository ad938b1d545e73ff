/// Seconds left below which the clock turns orange.
pub const WARNING_SECS: u32 = 600;
/// Seconds left below which the clock turns red.
pub const CRITICAL_SECS: u32 = 300;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Running(u32),
    /// Returned by exactly one tick: the one that reached zero.
    Expired,
    Inactive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Urgency {
    Calm,
    Warning,
    Critical,
}

/// One-second countdown owned by an exam session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Countdown {
    remaining_secs: u32,
    active: bool,
}

impl Countdown {
    pub fn start(minutes: u32) -> Self {
        Self {
            remaining_secs: minutes.saturating_mul(60),
            active: true,
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.active {
            return TickOutcome::Inactive;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.active = false;
            TickOutcome::Expired
        } else {
            TickOutcome::Running(self.remaining_secs)
        }
    }

    /// Stop the countdown. Returns whether it was still running.
    pub fn cancel(&mut self) -> bool {
        std::mem::replace(&mut self.active, false)
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn urgency(&self) -> Urgency {
        match self.remaining_secs {
            s if s < CRITICAL_SECS => Urgency::Critical,
            s if s < WARNING_SECS => Urgency::Warning,
            _ => Urgency::Calm,
        }
    }
}

/// `MM:SS`; minutes are not wrapped into hours.
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
