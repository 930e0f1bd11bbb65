//! Fixed document text per language.
//!
//! Plan content (meal names, ingredients, exercise names, notes) is printed
//! as generated; only the text the renderer itself adds is looked up here.

use crate::model::Language;

pub(super) struct Labels {
    pub meal_title: &'static str,
    pub workout_title: &'static str,
    pub generated: &'static str,
    pub day: &'static str,
    pub target: &'static str,
    pub actual: &'static str,
    pub substitutions: &'static str,
    pub shopping_list: &'static str,
    pub focus: &'static str,
    pub estimated_duration: &'static str,
    pub minutes: &'static str,
    pub warm_up: &'static str,
    pub cool_down: &'static str,
    pub notes: &'static str,
    pub sets: &'static str,
    pub reps: &'static str,
    pub rest: &'static str,
    pub tempo: &'static str,
    pub intensity: &'static str,
    pub meals_per_day: &'static str,
    pub cooking: &'static str,
    pub budget: &'static str,
    pub days_per_week: &'static str,
    pub limitations: &'static str,
    pub budget_levels: [&'static str; 3],
    /// Qualifier word before its value ("طهي سريع") rather than after it
    /// ("Quick cooking").
    pub noun_first: bool,
}

static EN: Labels = Labels {
    meal_title: "Weekly Meal Plan",
    workout_title: "Workout Plan",
    generated: "Generated",
    day: "Day",
    target: "Target",
    actual: "Actual",
    substitutions: "Substitutions",
    shopping_list: "Shopping List",
    focus: "Focus",
    estimated_duration: "Estimated duration",
    minutes: "min",
    warm_up: "Warm-up:",
    cool_down: "Cool-down:",
    notes: "Notes:",
    sets: "Sets",
    reps: "Reps",
    rest: "Rest",
    tempo: "Tempo",
    intensity: "Intensity",
    meals_per_day: "meals/day",
    cooking: "cooking",
    budget: "budget",
    days_per_week: "days/week",
    limitations: "limitations",
    budget_levels: ["low", "medium", "high"],
    noun_first: false,
};

static AR: Labels = Labels {
    meal_title: "خطة الوجبات الأسبوعية",
    workout_title: "خطة التمارين",
    generated: "تاريخ الإنشاء",
    day: "اليوم",
    target: "الهدف",
    actual: "الفعلي",
    substitutions: "البدائل",
    shopping_list: "قائمة التسوق",
    focus: "التركيز",
    estimated_duration: "المدة المتوقعة",
    minutes: "دقيقة",
    warm_up: "الإحماء:",
    cool_down: "التهدئة:",
    notes: "ملاحظات:",
    sets: "المجموعات",
    reps: "التكرارات",
    rest: "الراحة",
    tempo: "الإيقاع",
    intensity: "الشدة",
    meals_per_day: "وجبات/يوم",
    cooking: "طهي",
    budget: "ميزانية",
    days_per_week: "أيام/أسبوع",
    limitations: "القيود",
    budget_levels: ["منخفضة", "متوسطة", "مرتفعة"],
    noun_first: true,
};

impl Labels {
    pub fn for_language(language: Language) -> &'static Labels {
        match language {
            Language::En => &EN,
            Language::Ar => &AR,
        }
    }

    /// `value` qualified by `noun` in this language's word order.
    pub fn qualify(&self, value: impl std::fmt::Display, noun: &str) -> String {
        if self.noun_first {
            format!("{noun} {value}")
        } else {
            format!("{value} {noun}")
        }
    }
}
