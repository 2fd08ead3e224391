//! Client-held session bookkeeping: running score, streak, the per-question countdown and
//! challenge runs. Nothing here touches storage; clients push the score to the reconciler.

use std::time::Duration;

/// How a single round ended from the player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    Correct,
    Incorrect,
    /// The countdown ran out before a guess was submitted.
    TimedOut,
}

impl RoundOutcome {
    pub fn from_guess(correct: bool) -> Self {
        if correct {
            RoundOutcome::Correct
        } else {
            RoundOutcome::Incorrect
        }
    }
}

/// Running tally for one player session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionScore {
    pub score: u32,
    pub streak: u32,
}

impl SessionScore {
    /// Fold a round into the tally. A miss or timeout resets the streak but keeps the score.
    pub fn record(&mut self, outcome: RoundOutcome) {
        match outcome {
            RoundOutcome::Correct => {
                self.score = self.score.saturating_add(1);
                self.streak = self.streak.saturating_add(1);
            }
            RoundOutcome::Incorrect | RoundOutcome::TimedOut => self.streak = 0,
        }
    }

    /// Adopt the persisted score when it is higher than the local one (page load).
    pub fn seed_from(&mut self, persisted: u32) {
        self.score = self.score.max(persisted);
    }
}

/// State of a [`RoundCountdown`] after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStatus {
    Running { remaining: Duration },
    /// Reported exactly once, on the tick that crosses zero.
    Expired,
    /// The countdown already fired or was stopped by a guess.
    Finished,
}

/// Cooperative per-question countdown driven by the caller's own ticks.
#[derive(Debug, Clone)]
pub struct RoundCountdown {
    limit: Duration,
    remaining: Duration,
    finished: bool,
}

impl RoundCountdown {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            remaining: limit,
            finished: false,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Remaining time as a percentage of the limit.
    pub fn progress(&self) -> f64 {
        if self.limit.is_zero() {
            return 0.0;
        }
        self.remaining.as_secs_f64() / self.limit.as_secs_f64() * 100.0
    }

    /// Advance by `elapsed`; on expiry the caller records [`RoundOutcome::TimedOut`].
    pub fn tick(&mut self, elapsed: Duration) -> CountdownStatus {
        if self.finished {
            return CountdownStatus::Finished;
        }
        self.remaining = self.remaining.saturating_sub(elapsed);
        if self.remaining.is_zero() {
            self.finished = true;
            CountdownStatus::Expired
        } else {
            CountdownStatus::Running {
                remaining: self.remaining,
            }
        }
    }

    /// Halt the countdown because a guess was submitted.
    pub fn stop(&mut self) {
        self.finished = true;
    }

    /// Restart for the next question.
    pub fn reset(&mut self) {
        self.remaining = self.limit;
        self.finished = false;
    }
}

/// A bounded session played against an inviter's frozen score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeRun {
    pub inviter_username: String,
    pub inviter_score: u32,
    pub target_score: u32,
    pub session: SessionScore,
}

impl ChallengeRun {
    /// Start a run; `margin` is the configured target policy (1 means ties lose).
    pub fn new(inviter_username: impl Into<String>, inviter_score: u32, margin: u32) -> Self {
        Self {
            inviter_username: inviter_username.into(),
            inviter_score,
            target_score: inviter_score.saturating_add(margin),
            session: SessionScore::default(),
        }
    }

    pub fn record(&mut self, outcome: RoundOutcome) {
        self.session.record(outcome);
    }

    /// Whether the challenger has reached the target.
    pub fn is_won(&self) -> bool {
        self.session.score >= self.target_score
    }

    /// Completion percentage for progress displays, capped at 100.
    pub fn progress_percent(&self) -> u32 {
        if self.target_score == 0 {
            return 100;
        }
        let percent = u64::from(self.session.score) * 100 / u64::from(self.target_score);
        percent.min(100) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streak_resets_on_miss_and_timeout() {
        let mut session = SessionScore::default();
        session.record(RoundOutcome::Correct);
        session.record(RoundOutcome::Correct);
        assert_eq!(session, SessionScore { score: 2, streak: 2 });

        session.record(RoundOutcome::Incorrect);
        assert_eq!(session, SessionScore { score: 2, streak: 0 });

        session.record(RoundOutcome::Correct);
        session.record(RoundOutcome::TimedOut);
        assert_eq!(session, SessionScore { score: 3, streak: 0 });
    }

    #[test]
    fn seeding_keeps_the_higher_score() {
        let mut session = SessionScore { score: 4, streak: 1 };
        session.seed_from(2);
        assert_eq!(session.score, 4);
        session.seed_from(9);
        assert_eq!(session.score, 9);
        assert_eq!(session.streak, 1);
    }

    #[test]
    fn countdown_expires_once() {
        let mut countdown = RoundCountdown::new(Duration::from_secs(3));
        assert_eq!(
            countdown.tick(Duration::from_secs(1)),
            CountdownStatus::Running {
                remaining: Duration::from_secs(2)
            }
        );
        assert_eq!(countdown.tick(Duration::from_secs(5)), CountdownStatus::Expired);
        assert_eq!(countdown.tick(Duration::from_secs(1)), CountdownStatus::Finished);

        countdown.reset();
        assert_eq!(countdown.remaining(), Duration::from_secs(3));
        assert!((countdown.progress() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stopped_countdown_never_expires() {
        let mut countdown = RoundCountdown::new(Duration::from_secs(1));
        countdown.stop();
        assert_eq!(countdown.tick(Duration::from_secs(2)), CountdownStatus::Finished);
    }

    #[test]
    fn timeout_counts_as_a_miss() {
        let mut countdown = RoundCountdown::new(Duration::from_secs(120));
        let mut session = SessionScore { score: 3, streak: 3 };
        if countdown.tick(Duration::from_secs(120)) == CountdownStatus::Expired {
            session.record(RoundOutcome::TimedOut);
        }
        assert_eq!(session, SessionScore { score: 3, streak: 0 });
    }

    #[test]
    fn challenge_requires_strict_beat_with_default_margin() {
        let mut run = ChallengeRun::new("alice", 2, 1);
        assert_eq!(run.target_score, 3);
        run.record(RoundOutcome::Correct);
        run.record(RoundOutcome::Correct);
        assert!(!run.is_won());
        assert_eq!(run.progress_percent(), 66);
        run.record(RoundOutcome::Correct);
        assert!(run.is_won());
        assert_eq!(run.progress_percent(), 100);
    }

    #[test]
    fn zero_margin_lets_a_tie_win() {
        let mut run = ChallengeRun::new("alice", 1, 0);
        run.record(RoundOutcome::from_guess(true));
        assert!(run.is_won());
    }
}
