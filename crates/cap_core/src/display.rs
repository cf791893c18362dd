//! Front-end neutral helpers shared by the terminal and web dashboards:
//! stepping through option lists and dividing a bar into coloured cells.

/// Next (or previous) index in a list of `len` items, wrapping at both ends.
/// An empty list always yields 0.
pub const fn cycle(index: usize, len: usize, forward: bool) -> usize {
    match (len, forward) {
        (0, _) => 0,
        (_, true) => (index + 1) % len,
        (_, false) if index == 0 || index > len => len - 1,
        (_, false) => index - 1,
    }
}

/// Steps a selector. With nothing chosen yet, forward picks the first option
/// and backward the last; an empty list has nothing to pick.
pub const fn step_selection(current: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    match (current, len) {
        (_, 0) => None,
        (Some(index), _) => Some(cycle(index, len, forward)),
        (None, _) if forward => Some(0),
        (None, _) => Some(len - 1),
    }
}

/// Splits `width` cells between percentage segments. Boundaries are rounded
/// from the running total, so the pieces of a full bar always add up to
/// `width` exactly.
pub fn segment_widths(percentages: &[f64], width: usize) -> Vec<usize> {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let boundary = |cumulative: f64| -> usize {
        let cells = (cumulative.clamp(0.0, 100.0) / 100.0 * width as f64).round();
        cells as usize
    };

    let mut cumulative = 0.0;
    let mut previous = 0;
    percentages
        .iter()
        .map(|percentage| {
            cumulative += percentage.max(0.0);
            let end = boundary(cumulative);
            let segment = end.saturating_sub(previous);
            previous = previous.max(end);
            segment
        })
        .collect()
}
