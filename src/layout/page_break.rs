//! # Page Break Decisions
//!
//! Deciding how much of a run of indivisible items (table rows) goes on the
//! current page. The paginator asks this module, then acts on the answer.

/// Decide what to do when a run of items meets the bottom of the page.
#[derive(Debug, Clone, PartialEq)]
pub enum BreakDecision {
    /// Every item fits on the current page.
    Place,
    /// Nothing worth placing fits; move the whole run to the next page.
    MoveToNextPage,
    /// Place the first `items_on_current_page` items here, continue the rest.
    Split { items_on_current_page: usize },
}

/// Given the remaining space and the heights of the pending items, decide
/// how to break.
///
/// `min_leading_items` is how many items must fit for a split to be worth
/// it. A table uses it to refuse fragments that would hold only a header.
pub fn decide_break(
    remaining_height: f64,
    child_heights: &[f64],
    min_leading_items: usize,
) -> BreakDecision {
    let total: f64 = child_heights.iter().sum();
    if total <= remaining_height {
        return BreakDecision::Place;
    }

    let mut running = 0.0;
    let mut fit_count = 0;
    for &h in child_heights {
        if running + h > remaining_height {
            break;
        }
        running += h;
        fit_count += 1;
    }

    if fit_count == 0 || fit_count < min_leading_items {
        return BreakDecision::MoveToNextPage;
    }

    BreakDecision::Split {
        items_on_current_page: fit_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn everything_fits() {
        let decision = decide_break(100.0, &[20.0, 30.0, 40.0], 1);
        assert_eq!(decision, BreakDecision::Place);
    }

    #[test]
    fn exact_fit_places() {
        let decision = decide_break(90.0, &[20.0, 30.0, 40.0], 1);
        assert_eq!(decision, BreakDecision::Place);
    }

    #[test]
    fn split_at_right_point() {
        let decision = decide_break(55.0, &[20.0, 30.0, 40.0], 1);
        assert_eq!(
            decision,
            BreakDecision::Split {
                items_on_current_page: 2,
            }
        );
    }

    #[test]
    fn nothing_fits_moves() {
        let decision = decide_break(10.0, &[20.0, 30.0], 1);
        assert_eq!(decision, BreakDecision::MoveToNextPage);
    }

    #[test]
    fn leading_minimum_moves() {
        // Only the header would fit, but a data row must come with it.
        let decision = decide_break(25.0, &[20.0, 30.0, 40.0], 2);
        assert_eq!(decision, BreakDecision::MoveToNextPage);
    }
}
