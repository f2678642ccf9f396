/// Describes the first defect found when `positions` is not a permutation of `1..=size`.
pub(crate) fn find_defect(positions: impl IntoIterator<Item = u32>, size: usize) -> Option<String> {
    let mut seen = vec![false; size];
    let mut count = 0usize;

    for position in positions {
        count += 1;
        let idx = position as usize;
        if position == 0 || idx > size {
            return Some(format!("position {position} is out of range"));
        }
        if std::mem::replace(&mut seen[idx - 1], true) {
            return Some(format!("position {position} is assigned more than once"));
        }
    }

    if count != size {
        return Some(format!("expected {size} positions, found {count}"));
    }

    seen.iter()
        .position(|taken| !taken)
        .map(|idx| format!("position {} is missing", idx + 1))
}
