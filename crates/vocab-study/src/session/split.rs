use super::{Half, Phase, StudyMode};

/// The items a Learn phase works on.
///
/// Mixed and quiz-only sessions split the set into a first half of
/// `ceil(n / 2)` items and a second half with the rest. Spell-only sessions
/// run a single phase over everything. `Completed` covers nothing.
pub fn split_for_phase<T>(items: &[T], phase: Phase, mode: StudyMode) -> &[T] {
    if mode == StudyMode::SpellOnly {
        return match phase {
            Phase::Spell1 => items,
            _ => &[],
        };
    }

    let first_len = items.len().div_ceil(2);
    match phase.half() {
        Some(Half::First) => &items[..first_len],
        Some(Half::Second) => &items[first_len..],
        None => &[],
    }
}
