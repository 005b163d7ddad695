//! Level completion scoring.
//!
//! Decides win/loss for a finished session, awards the remaining-moves
//! bonus, and grades the result with a 1-3 star rating.

use crate::types::{CompletionBreakdown, LevelTargets, ScoreResult, TargetsMet};

/// Bonus points awarded per unused move on a won level.
pub const POINTS_PER_REMAINING_MOVE: i64 = 50;

/// Compute per-category completion percentages.
///
/// Collection credit is clamped per item, so over-collecting one item never
/// compensates for a shortfall on another. An absent or empty category
/// counts as 100% complete.
pub fn calculate_completion(
    targets: &LevelTargets,
    met: &TargetsMet,
    score: i64,
) -> CompletionBreakdown {
    let collection_percent = if targets.collect.is_empty() {
        100.0
    } else {
        let required: u64 = targets.collect.values().map(|&n| n as u64).sum();
        let collected: u64 = targets
            .collect
            .iter()
            .map(|(item, &need)| met.collect.get(item).copied().unwrap_or(0).min(need) as u64)
            .sum();
        if required == 0 {
            100.0
        } else {
            (collected as f64 / required as f64 * 100.0).min(100.0)
        }
    };

    let min_score = targets.min_score.unwrap_or(0);
    let score_percent = if min_score > 0 {
        (score as f64 / min_score as f64 * 100.0).min(100.0)
    } else {
        100.0
    };

    let collection_complete = collection_percent >= 100.0;
    let score_complete = score_percent >= 100.0;

    CompletionBreakdown {
        collection_percent,
        score_percent,
        // Equal weighting regardless of which categories the level defines.
        overall_percent: 0.5 * collection_percent + 0.5 * score_percent,
        collection_complete,
        score_complete,
    }
}

/// Bonus for unused moves. Zero once the move budget is exhausted.
pub fn moves_bonus(max_moves: i32, moves_used: i32) -> i64 {
    i64::from((max_moves - moves_used).max(0)) * POINTS_PER_REMAINING_MOVE
}

/// Star rating for a won session.
///
/// With no score target every win rates three stars: any score clears a
/// zero threshold twice over.
pub fn calculate_stars(targets: &LevelTargets, score: i64) -> u8 {
    let min_score = targets.min_score.unwrap_or(0);
    if score as f64 >= min_score as f64 * 2.0 {
        3
    } else if score as f64 >= min_score as f64 * 1.5 {
        2
    } else {
        1
    }
}

/// Evaluate a finished session against its level targets.
///
/// A level is won when either goal category independently reaches 100%.
/// A vacuously-complete category still reads as 100% in the breakdown but
/// is not a winning path on its own; a level with no goals at all is
/// trivially won. The moves bonus applies only to wins and is added to
/// the reported score before stars are computed.
pub fn evaluate(
    targets: &LevelTargets,
    met: &TargetsMet,
    score: i64,
    moves_used: i32,
    max_moves: i32,
) -> ScoreResult {
    let completion = calculate_completion(targets, met, score);

    let collection_present = !targets.collect.is_empty();
    let score_present = targets.min_score.unwrap_or(0) > 0;
    let is_won = if !collection_present && !score_present {
        true
    } else {
        (collection_present && completion.collection_complete)
            || (score_present && completion.score_complete)
    };

    let bonus = if is_won {
        moves_bonus(max_moves, moves_used)
    } else {
        0
    };
    let final_score = score + bonus;
    let stars = if is_won {
        calculate_stars(targets, final_score)
    } else {
        0
    };

    ScoreResult {
        is_won,
        stars,
        final_score,
        moves_bonus: bonus,
        completion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn collect(items: &[(&str, u32)]) -> HashMap<String, u32> {
        items.iter().map(|&(k, v)| (k.to_string(), v)).collect()
    }

    fn targets(collect_items: &[(&str, u32)], min_score: Option<i64>) -> LevelTargets {
        LevelTargets {
            collect: collect(collect_items),
            combos: HashMap::new(),
            min_score,
        }
    }

    fn met(collect_items: &[(&str, u32)]) -> TargetsMet {
        TargetsMet {
            collect: collect(collect_items),
            combos: HashMap::new(),
        }
    }

    #[test]
    fn score_only_level_won_exactly_at_threshold() {
        let t = targets(&[], Some(100));
        assert!(evaluate(&t, &met(&[]), 100, 30, 30).is_won);
        assert!(!evaluate(&t, &met(&[]), 99, 30, 30).is_won);
    }

    #[test]
    fn collect_only_level_won_independent_of_score() {
        let t = targets(&[("drumstick", 5)], None);
        let result = evaluate(&t, &met(&[("drumstick", 5)]), 0, 30, 30);
        assert!(result.is_won);

        // The absent score category reads as 100% complete but is not a
        // winning path; an unmet collection still loses at any score.
        let result = evaluate(&t, &met(&[("drumstick", 4)]), 9999, 30, 30);
        assert!(result.completion.score_complete);
        assert!(!result.is_won);
    }

    #[test]
    fn either_category_alone_wins() {
        let t = targets(&[("drumstick", 5)], Some(100));

        // Collection done, score short.
        let result = evaluate(&t, &met(&[("drumstick", 5)]), 50, 30, 30);
        assert!(result.completion.collection_complete);
        assert!(!result.completion.score_complete);
        assert!(result.is_won);

        // Score done, collection short.
        let result = evaluate(&t, &met(&[("drumstick", 1)]), 150, 30, 30);
        assert!(!result.completion.collection_complete);
        assert!(result.completion.score_complete);
        assert!(result.is_won);
    }

    #[test]
    fn over_collection_does_not_compensate() {
        let t = targets(&[("drumstick", 5), ("burger", 5)], Some(1000));
        let breakdown = calculate_completion(&t, &met(&[("drumstick", 20)]), 0);
        assert_eq!(breakdown.collection_percent, 50.0);
        assert!(!breakdown.collection_complete);
    }

    #[test]
    fn overall_percent_weights_categories_equally() {
        let t = targets(&[("drumstick", 10)], Some(100));
        let breakdown = calculate_completion(&t, &met(&[("drumstick", 5)]), 50);
        assert_eq!(breakdown.collection_percent, 50.0);
        assert_eq!(breakdown.score_percent, 50.0);
        assert_eq!(breakdown.overall_percent, 50.0);
    }

    #[test]
    fn moves_bonus_zero_when_budget_exhausted() {
        assert_eq!(moves_bonus(30, 30), 0);
        assert_eq!(moves_bonus(30, 35), 0);
        assert_eq!(moves_bonus(30, 20), 500);
    }

    #[test]
    fn no_moves_bonus_on_loss() {
        let t = targets(&[("drumstick", 5)], Some(100));
        let result = evaluate(&t, &met(&[("drumstick", 2)]), 50, 10, 30);
        assert!(!result.is_won);
        assert_eq!(result.moves_bonus, 0);
        assert_eq!(result.final_score, 50);
    }

    #[test]
    fn star_thresholds() {
        let t = targets(&[], Some(100));
        assert_eq!(calculate_stars(&t, 200), 3);
        assert_eq!(calculate_stars(&t, 150), 2);
        assert_eq!(calculate_stars(&t, 100), 1);
    }

    #[test]
    fn zero_min_score_always_rates_three_stars() {
        // Documented quirk: a pure collection level has no score threshold,
        // so any winning score clears the 2x bar.
        let t = targets(&[("drumstick", 5)], None);
        let result = evaluate(&t, &met(&[("drumstick", 5)]), 0, 30, 30);
        assert!(result.is_won);
        assert_eq!(result.stars, 3);
    }

    #[test]
    fn win_with_bonus_end_to_end() {
        let t = targets(&[("drumstick", 5)], Some(100));
        let result = evaluate(&t, &met(&[("drumstick", 5)]), 50, 20, 30);

        assert!(result.is_won);
        assert!(result.completion.collection_complete);
        assert!(!result.completion.score_complete);
        assert_eq!(result.moves_bonus, 500);
        assert_eq!(result.final_score, 550);
        // 550 >= 2 * 100, so the bonus lifts this to three stars.
        assert_eq!(result.stars, 3);
    }

    #[test]
    fn loss_end_to_end() {
        let t = targets(&[("drumstick", 5)], Some(100));
        let result = evaluate(&t, &met(&[("drumstick", 2)]), 50, 20, 30);

        assert!(!result.is_won);
        assert_eq!(result.stars, 0);
        assert_eq!(result.final_score, 50);
        assert_eq!(result.completion.collection_percent, 40.0);
        assert_eq!(result.completion.score_percent, 50.0);
    }

    #[test]
    fn empty_targets_always_win() {
        let t = targets(&[], None);
        let result = evaluate(&t, &met(&[]), 0, 0, 30);
        assert!(result.is_won);
        assert_eq!(result.completion.overall_percent, 100.0);
    }
}
