use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    #[default]
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CalorieEstimateRequest {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: f64,
    pub gender: Gender,
    #[serde(default)]
    pub activity_level: ActivityLevel,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CalorieEstimate {
    pub bmr: f64,
    pub daily_calories: f64,
    pub lose_weight_calories: f64,
    pub gain_weight_calories: f64,
}

/// Daily offset for the lose and gain targets, roughly 0.5 kg a week.
pub const WEIGHT_CHANGE_KCAL: f64 = 500.0;

/// Mifflin-St Jeor basal metabolic rate scaled by activity.
/// Returns `None` for non-finite or non-positive inputs.
pub fn estimate(req: &CalorieEstimateRequest) -> Option<CalorieEstimate> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if !(valid(req.weight_kg) && valid(req.height_cm) && valid(req.age)) {
        return None;
    }
    let base = 10.0 * req.weight_kg + 6.25 * req.height_cm - 5.0 * req.age;
    let bmr = match req.gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    };
    let daily_calories = bmr * req.activity_level.multiplier();
    Some(CalorieEstimate {
        bmr,
        daily_calories,
        lose_weight_calories: (daily_calories - WEIGHT_CHANGE_KCAL).max(0.0),
        gain_weight_calories: daily_calories + WEIGHT_CHANGE_KCAL,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(gender: Gender, activity_level: ActivityLevel) -> CalorieEstimateRequest {
        CalorieEstimateRequest {
            weight_kg: 80.0,
            height_cm: 180.0,
            age: 30.0,
            gender,
            activity_level,
        }
    }

    #[test]
    fn male_sedentary() {
        let est = estimate(&req(Gender::Male, ActivityLevel::Sedentary)).unwrap();
        assert_eq!(est.bmr, 1780.0);
        assert!((est.daily_calories - 2136.0).abs() < 1e-9);
        assert!((est.lose_weight_calories - 1636.0).abs() < 1e-9);
        assert!((est.gain_weight_calories - 2636.0).abs() < 1e-9);
    }

    #[test]
    fn female_very_active() {
        let est = estimate(&req(Gender::Female, ActivityLevel::VeryActive)).unwrap();
        assert_eq!(est.bmr, 1614.0);
        assert!((est.daily_calories - 3066.6).abs() < 1e-9);
    }

    #[test]
    fn lose_target_never_goes_negative() {
        let est = estimate(&CalorieEstimateRequest {
            weight_kg: 3.0,
            height_cm: 50.0,
            age: 1.0,
            gender: Gender::Female,
            activity_level: ActivityLevel::Sedentary,
        })
        .unwrap();
        assert_eq!(est.lose_weight_calories, 0.0);
        assert!(est.gain_weight_calories > WEIGHT_CHANGE_KCAL);
    }

    #[test]
    fn rejects_invalid_numbers() {
        let mut r = req(Gender::Male, ActivityLevel::Light);
        r.weight_kg = f64::NAN;
        assert!(estimate(&r).is_none());
        r.weight_kg = 80.0;
        r.age = 0.0;
        assert!(estimate(&r).is_none());
    }

    #[test]
    fn activity_defaults_to_sedentary() {
        let r: CalorieEstimateRequest = serde_json::from_str(
            r#"{"weight_kg": 60, "height_cm": 165, "age": 25, "gender": "female"}"#,
        )
        .unwrap();
        assert_eq!(r.activity_level, ActivityLevel::Sedentary);
    }
}
