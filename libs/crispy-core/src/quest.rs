//! Quest progression tracking.
//!
//! Quest pages form a strict linear sequence. A scan is accepted only for
//! the first page the user has not yet answered; everything else is
//! rejected with a typed error so the caller can redirect the player.

use std::collections::HashSet;

use crate::error::QuestError;
use crate::types::QuestStep;

/// First page in order with no recorded answer, or `None` when the quest
/// is complete.
pub fn current_step<'a>(pages: &'a [QuestStep], answered: &HashSet<i64>) -> Option<&'a QuestStep> {
    pages.iter().find(|p| !answered.contains(&p.id))
}

/// Page that becomes current once `page_id` is answered.
pub fn next_step<'a>(
    pages: &'a [QuestStep],
    answered: &HashSet<i64>,
    page_id: i64,
) -> Option<&'a QuestStep> {
    pages
        .iter()
        .find(|p| !answered.contains(&p.id) && p.id != page_id)
}

/// Validate a scan of `scanned_id` against the user's answered set.
///
/// Re-scans of answered pages are rejected before the order check, so a
/// duplicate submission is reported as such even after the quest is done.
pub fn validate_scan<'a>(
    pages: &'a [QuestStep],
    answered: &HashSet<i64>,
    scanned_id: i64,
) -> Result<&'a QuestStep, QuestError> {
    let scanned = pages
        .iter()
        .find(|p| p.id == scanned_id)
        .ok_or(QuestError::UnknownPage)?;

    if answered.contains(&scanned.id) {
        return Err(QuestError::AlreadyAnswered {
            slug: scanned.slug.clone(),
        });
    }

    let current = current_step(pages, answered).ok_or(QuestError::QuestComplete)?;

    if scanned.id != current.id {
        return Err(QuestError::OutOfOrder {
            expected_order: current.order,
            scanned_order: scanned.order,
        });
    }

    Ok(scanned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pages() -> Vec<QuestStep> {
        (1..=3)
            .map(|i| QuestStep {
                id: i,
                order: i as i32,
                slug: format!("exhibit-{}", i),
            })
            .collect()
    }

    #[test]
    fn current_step_is_first_unanswered() {
        let pages = pages();
        assert_eq!(current_step(&pages, &HashSet::new()).unwrap().id, 1);

        let answered: HashSet<i64> = [1].into_iter().collect();
        assert_eq!(current_step(&pages, &answered).unwrap().id, 2);

        let answered: HashSet<i64> = [1, 2, 3].into_iter().collect();
        assert!(current_step(&pages, &answered).is_none());
    }

    #[test]
    fn scan_in_order_succeeds() {
        let pages = pages();
        let step = validate_scan(&pages, &HashSet::new(), 1).unwrap();
        assert_eq!(step.slug, "exhibit-1");
    }

    #[test]
    fn out_of_order_scan_rejected_even_with_valid_token() {
        let pages = pages();
        let err = validate_scan(&pages, &HashSet::new(), 3).unwrap_err();
        assert_eq!(
            err,
            QuestError::OutOfOrder {
                expected_order: 1,
                scanned_order: 3,
            }
        );
    }

    #[test]
    fn duplicate_scan_rejected_without_reaward() {
        let pages = pages();
        let answered: HashSet<i64> = [1].into_iter().collect();
        let err = validate_scan(&pages, &answered, 1).unwrap_err();
        assert_eq!(
            err,
            QuestError::AlreadyAnswered {
                slug: "exhibit-1".to_string(),
            }
        );
    }

    #[test]
    fn skipped_page_cannot_be_scanned_later() {
        // A skip records the same answered entry as a scan, so the gate
        // moves on permanently.
        let pages = pages();
        let answered: HashSet<i64> = [1].into_iter().collect();
        let err = validate_scan(&pages, &answered, 1).unwrap_err();
        assert!(matches!(err, QuestError::AlreadyAnswered { .. }));
        assert_eq!(current_step(&pages, &answered).unwrap().id, 2);
    }

    #[test]
    fn unknown_page_rejected() {
        let pages = pages();
        assert_eq!(
            validate_scan(&pages, &HashSet::new(), 99).unwrap_err(),
            QuestError::UnknownPage
        );
    }

    #[test]
    fn next_step_after_final_page_signals_completion() {
        let pages = pages();
        let answered: HashSet<i64> = [1, 2].into_iter().collect();
        assert!(next_step(&pages, &answered, 3).is_none());
    }

    #[test]
    fn next_step_skips_just_answered_page() {
        let pages = pages();
        let answered: HashSet<i64> = [1].into_iter().collect();
        // Page 2 was just scanned but the progress row is not in the set yet.
        assert_eq!(next_step(&pages, &answered, 2).unwrap().id, 3);
    }
}
