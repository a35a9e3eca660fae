//! Keyboard navigation over a swatch grid whose rows may differ in length.

/// Movement keys understood by [`next_index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridKey {
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
}

/// Index reached from `current` after pressing `key` in a grid laid out
/// row-major with the given row lengths.
///
/// Left/Right wrap across row boundaries, Up/Down keep the column (clamped
/// to the shorter row) and stop at the edges. An out-of-range `current` is
/// clamped first; an empty grid always yields 0.
pub fn next_index(current: usize, rows: &[usize], key: GridKey) -> usize {
    let total: usize = rows.iter().sum();
    if total == 0 {
        return 0;
    }
    let current = current.min(total - 1);

    match key {
        GridKey::Left => current.saturating_sub(1),
        GridKey::Right => (current + 1).min(total - 1),
        GridKey::Home => 0,
        GridKey::End => total - 1,
        GridKey::Up | GridKey::Down => {
            let (row, col) = locate(current, rows);
            let target = match key {
                GridKey::Up => (0..row).rev().find(|&r| rows[r] > 0),
                _ => (row + 1..rows.len()).find(|&r| rows[r] > 0),
            };
            match target {
                Some(r) => {
                    let start: usize = rows[..r].iter().sum();
                    start + col.min(rows[r] - 1)
                }
                None => current,
            }
        }
    }
}

fn locate(index: usize, rows: &[usize]) -> (usize, usize) {
    let mut start = 0;
    for (row, &len) in rows.iter().enumerate() {
        if index < start + len {
            return (row, index - start);
        }
        start += len;
    }
    (rows.len().saturating_sub(1), 0)
}

/// Row lengths for `count` items wrapped at `columns` per row.
pub fn wrap_rows(count: usize, columns: usize) -> Vec<usize> {
    let columns = columns.max(1);
    let mut rows = vec![columns; count / columns];
    if count % columns != 0 {
        rows.push(count % columns);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_moves_wrap_rows() {
        let rows = [3, 3];
        assert_eq!(next_index(2, &rows, GridKey::Right), 3);
        assert_eq!(next_index(3, &rows, GridKey::Left), 2);
        assert_eq!(next_index(0, &rows, GridKey::Left), 0);
        assert_eq!(next_index(5, &rows, GridKey::Right), 5);
    }

    #[test]
    fn vertical_moves_keep_column() {
        let rows = [4, 4, 2];
        assert_eq!(next_index(1, &rows, GridKey::Down), 5);
        assert_eq!(next_index(5, &rows, GridKey::Up), 1);
        // ragged last row clamps the column
        assert_eq!(next_index(7, &rows, GridKey::Down), 9);
        assert_eq!(next_index(2, &rows, GridKey::Up), 2);
        assert_eq!(next_index(9, &rows, GridKey::Down), 9);
    }

    #[test]
    fn home_end() {
        let rows = [4, 2];
        assert_eq!(next_index(3, &rows, GridKey::Home), 0);
        assert_eq!(next_index(0, &rows, GridKey::End), 5);
    }

    #[test]
    fn empty_rows_are_skipped() {
        let rows = [2, 0, 2];
        assert_eq!(next_index(1, &rows, GridKey::Down), 3);
        assert_eq!(next_index(2, &rows, GridKey::Up), 0);
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(next_index(7, &[], GridKey::Right), 0);
        assert_eq!(next_index(99, &[3], GridKey::Left), 1);
    }

    #[test]
    fn wrap_rows_splits_remainder() {
        assert_eq!(wrap_rows(10, 4), vec![4, 4, 2]);
        assert_eq!(wrap_rows(8, 4), vec![4, 4]);
        assert_eq!(wrap_rows(0, 4), Vec::<usize>::new());
        assert_eq!(wrap_rows(3, 0), vec![1, 1, 1]);
    }
}
