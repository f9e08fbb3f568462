//! Boy/girl tallies derived from the full prediction set.
//!
//! Recomputed from scratch on every request; there is no running counter.
//! Each percentage is rounded on its own, so the two may sum to 99 or 101.

use super::models::Guess;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionStats {
    // ---
    pub boy_count: u64,
    pub girl_count: u64,
    pub total: u64,
    pub boy_percent: u8,
    pub girl_percent: u8,
}

/// Where a visitor's guess sits relative to everyone else's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    FirstVoter,
    Majority,
    Minority,
    Tie,
}

impl PredictionStats {
    // ---
    pub fn compute<I>(guesses: I) -> Self
    where
        I: IntoIterator<Item = Guess>,
    {
        // ---
        let (boy_count, girl_count) =
            guesses
                .into_iter()
                .fold((0u64, 0u64), |(boys, girls), guess| match guess {
                    Guess::Boy => (boys + 1, girls),
                    Guess::Girl => (boys, girls + 1),
                });

        let total = boy_count + girl_count;

        Self {
            boy_count,
            girl_count,
            total,
            boy_percent: percent(boy_count, total),
            girl_percent: percent(girl_count, total),
        }
    }

    pub fn percent_for(&self, guess: Guess) -> u8 {
        // ---
        match guess {
            Guess::Boy => self.boy_percent,
            Guess::Girl => self.girl_percent,
        }
    }

    pub fn standing(&self, guess: Guess) -> Standing {
        // ---
        if self.total == 1 {
            return Standing::FirstVoter;
        }

        let (mine, theirs) = match guess {
            Guess::Boy => (self.boy_count, self.girl_count),
            Guess::Girl => (self.girl_count, self.boy_count),
        };

        match mine.cmp(&theirs) {
            std::cmp::Ordering::Greater => Standing::Majority,
            std::cmp::Ordering::Less => Standing::Minority,
            std::cmp::Ordering::Equal => Standing::Tie,
        }
    }
}

/// Integer percentage rounded half away from zero; zero when `total` is zero.
fn percent(count: u64, total: u64) -> u8 {
    // ---
    if total == 0 {
        return 0;
    }
    ((count * 200 + total) / (total * 2)) as u8
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn empty_set_has_zero_percentages() {
        // ---
        let stats = PredictionStats::compute(Vec::new());

        assert_eq!(stats, PredictionStats::default());
        assert_eq!(stats.boy_percent, 0);
        assert_eq!(stats.girl_percent, 0);
    }

    #[test]
    fn counts_and_percentages() {
        // ---
        let stats = PredictionStats::compute([Guess::Boy, Guess::Girl, Guess::Girl, Guess::Girl]);

        assert_eq!(stats.boy_count, 1);
        assert_eq!(stats.girl_count, 3);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.boy_percent, 25);
        assert_eq!(stats.girl_percent, 75);
    }

    #[test]
    fn independent_rounding_may_exceed_one_hundred() {
        // ---
        // 1/8 = 12.5 -> 13, 7/8 = 87.5 -> 88
        let mut guesses = vec![Guess::Boy];
        guesses.extend(std::iter::repeat(Guess::Girl).take(7));
        let stats = PredictionStats::compute(guesses);

        assert_eq!(stats.boy_percent, 13);
        assert_eq!(stats.girl_percent, 88);
        assert_eq!(stats.boy_percent + stats.girl_percent, 101);
    }

    #[test]
    fn thirds_round_down_to_ninety_nine() {
        // ---
        let stats = PredictionStats::compute([Guess::Boy, Guess::Girl, Guess::Girl]);

        assert_eq!(stats.boy_percent, 33);
        assert_eq!(stats.girl_percent, 67);

        let stats = PredictionStats::compute([
            Guess::Boy,
            Guess::Boy,
            Guess::Boy,
            Guess::Girl,
            Guess::Girl,
            Guess::Girl,
        ]);
        assert_eq!(stats.boy_percent + stats.girl_percent, 100);
    }

    #[test]
    fn percentages_stay_in_range() {
        // ---
        for boys in 0..40u64 {
            for girls in 0..40u64 {
                let guesses = std::iter::repeat(Guess::Boy)
                    .take(boys as usize)
                    .chain(std::iter::repeat(Guess::Girl).take(girls as usize));
                let stats = PredictionStats::compute(guesses);

                assert!(stats.boy_percent <= 100);
                assert!(stats.girl_percent <= 100);
                assert_eq!(stats.total, boys + girls);
            }
        }
    }

    #[test]
    fn standing_reflects_majority_and_ties() {
        // ---
        let first = PredictionStats::compute([Guess::Girl]);
        assert_eq!(first.standing(Guess::Girl), Standing::FirstVoter);

        let stats = PredictionStats::compute([Guess::Boy, Guess::Girl, Guess::Girl]);
        assert_eq!(stats.standing(Guess::Girl), Standing::Majority);
        assert_eq!(stats.standing(Guess::Boy), Standing::Minority);

        let tied = PredictionStats::compute([Guess::Boy, Guess::Girl]);
        assert_eq!(tied.standing(Guess::Boy), Standing::Tie);
        assert_eq!(tied.percent_for(Guess::Boy), 50);
    }
}
