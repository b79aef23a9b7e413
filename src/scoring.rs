use serde::{Deserialize, Serialize};

/// Share of correct answers in percent. `None` for an empty quiz.
pub fn percentage(score: usize, total: usize) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(100.0 * score as f64 / total as f64)
    }
}

/// Qualitative feedback bucket for a finished quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Positive,
    Encouraging,
    Supportive,
}

impl Tier {
    pub fn message(self) -> &'static str {
        match self {
            Tier::Positive => "Amazing job! Keep it up!",
            Tier::Encouraging => "Good effort! A little more practice and you'll ace it!",
            Tier::Supportive => "Don't give up! Keep trying, you'll get the hang of it!",
        }
    }
}

/// Lower bounds (inclusive, in percent) of the two upper tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Banding {
    pub positive_at: f64,
    pub encouraging_at: f64,
}

impl Default for Banding {
    fn default() -> Self {
        Self {
            positive_at: 70.0,
            encouraging_at: 40.0,
        }
    }
}

impl Banding {
    pub fn tier(&self, percentage: f64) -> Tier {
        if percentage >= self.positive_at {
            Tier::Positive
        } else if percentage >= self.encouraging_at {
            Tier::Encouraging
        } else {
            Tier::Supportive
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_of_empty_quiz_is_none() {
        assert_eq!(percentage(0, 0), None);
    }

    #[test]
    fn test_percentage_one_of_three() {
        let p = percentage(1, 3).unwrap();
        assert!((p - 33.333).abs() < 0.01);
        assert_eq!(p.round() as u32, 33);
    }

    #[test]
    fn test_default_banding_boundaries() {
        let banding = Banding::default();
        assert_eq!(banding.tier(100.0), Tier::Positive);
        assert_eq!(banding.tier(70.0), Tier::Positive);
        assert_eq!(banding.tier(69.9), Tier::Encouraging);
        assert_eq!(banding.tier(40.0), Tier::Encouraging);
        assert_eq!(banding.tier(39.9), Tier::Supportive);
        assert_eq!(banding.tier(0.0), Tier::Supportive);
    }

    #[test]
    fn test_custom_banding() {
        let banding = Banding {
            positive_at: 90.0,
            encouraging_at: 50.0,
        };
        assert_eq!(banding.tier(80.0), Tier::Encouraging);
        assert_eq!(banding.tier(45.0), Tier::Supportive);
    }
}
