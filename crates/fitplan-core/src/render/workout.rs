use super::labels::Labels;
use super::layout::Layout;
use super::{LineStyle, joined};
use crate::model::{Exercise, WorkoutPlan};

pub(super) fn summary(plan: &WorkoutPlan, labels: &Labels) -> String {
    let prefs = &plan.preferences;
    let mut line = format!(
        "{} | {} | {} | {} | {}: {}",
        prefs.experience,
        labels.qualify(prefs.days_per_week, labels.days_per_week),
        prefs.split,
        prefs.equipment,
        labels.focus,
        prefs.focus
    );
    if let Some(injuries) = &prefs.injuries {
        line.push_str(&format!(" | {}: {injuries}", labels.limitations));
    }
    line
}

pub(super) fn days(layout: &mut Layout<'_>, plan: &WorkoutPlan, labels: &Labels) {
    for block in &plan.days {
        layout.gap();
        let heading = if block.label.trim().is_empty() {
            format!("{} {}", labels.day, block.day)
        } else {
            block.label.clone()
        };
        layout.line(LineStyle::Heading, 0, heading);
        if !block.focus.is_empty() {
            layout.line(LineStyle::Muted, 1, format!("{}: {}", labels.focus, block.focus));
        }
        if let Some(minutes) = block.estimated_duration_minutes {
            layout.line(
                LineStyle::Muted,
                1,
                format!("{}: {minutes} {}", labels.estimated_duration, labels.minutes),
            );
        }

        list(layout, labels.warm_up, &block.warm_up);
        for (i, exercise) in block.exercises.iter().enumerate() {
            exercise_block(layout, i + 1, exercise, labels);
        }
        list(layout, labels.cool_down, &block.cool_down);
        list(layout, labels.notes, &block.notes);
    }
}

fn exercise_block(layout: &mut Layout<'_>, number: usize, exercise: &Exercise, labels: &Labels) {
    layout.line(LineStyle::Subheading, 1, format!("{number}. {}", exercise.name));

    let mut prescription = format!(
        "{} {} | {} {} | {} {}",
        labels.sets, exercise.sets, labels.reps, exercise.reps, labels.rest, exercise.rest
    );
    if let Some(tempo) = &exercise.tempo {
        prescription.push_str(&format!(" | {} {tempo}", labels.tempo));
    }
    if let Some(intensity) = &exercise.intensity {
        prescription.push_str(&format!(" | {} {intensity}", labels.intensity));
    }
    layout.line(LineStyle::Body, 2, prescription);

    if let Some(notes) = &exercise.notes {
        layout.line(LineStyle::Muted, 2, notes);
    }
    if let Some(subs) = joined(&exercise.substitutions) {
        layout.line(LineStyle::Muted, 2, format!("{}: {subs}", labels.substitutions));
    }
}

fn list(layout: &mut Layout<'_>, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    layout.line(LineStyle::Subheading, 1, heading);
    for item in items {
        layout.line(LineStyle::Body, 2, format!("- {item}"));
    }
}
