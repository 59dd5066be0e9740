use serde::Serialize;
use voyage_core::{CoreError, CoreResult, Trip};

/// Display position of one seat under a trip's geometry.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct SeatPosition {
    pub seat_number: u32,
    /// 1-based row, seats are numbered row-major.
    pub row: u32,
    /// 1-based column within the row; aisles are not counted.
    pub column: u32,
    /// 0-based index of the block of adjacent seats this column belongs to.
    pub block: u32,
    pub aisle_adjacent: bool,
}

#[derive(Debug, Clone, Copy)]
struct ColumnInfo {
    block: u32,
    aisle_adjacent: bool,
}

/// Resolved seat geometry for a trip.
///
/// Pure and deterministic for a given (total seats, seats per row, pattern),
/// so it can be cached per trip id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatLayout {
    total_seats: u32,
    seats_per_row: u32,
    blocks: Vec<u32>,
    positions: Vec<SeatPosition>,
}

impl SeatLayout {
    pub fn for_trip(trip: &Trip) -> CoreResult<Self> {
        Self::resolve(trip.total_seats, trip.seats_per_row, &trip.seat_layout)
    }

    /// Builds the layout from a block pattern such as "2+1".
    ///
    /// A final partial row is truncated rather than rejected.
    pub fn resolve(total_seats: u32, seats_per_row: u32, pattern: &str) -> CoreResult<Self> {
        if total_seats == 0 {
            return Err(CoreError::InvalidGeometry("total seats must be positive".to_string()));
        }
        if seats_per_row == 0 {
            return Err(CoreError::InvalidGeometry("seats per row must be positive".to_string()));
        }

        let blocks = parse_pattern(pattern)?;
        let width: u32 = blocks.iter().sum();
        if width != seats_per_row {
            return Err(CoreError::InvalidGeometry(format!(
                "layout '{}' spans {} columns but rows hold {} seats",
                pattern.trim(),
                width,
                seats_per_row
            )));
        }

        let columns = column_info(&blocks);
        let positions = (1..=total_seats)
            .map(|seat_number| {
                let index = seat_number - 1;
                let column = index % seats_per_row;
                let info = columns[column as usize];
                SeatPosition {
                    seat_number,
                    row: index / seats_per_row + 1,
                    column: column + 1,
                    block: info.block,
                    aisle_adjacent: info.aisle_adjacent,
                }
            })
            .collect();

        Ok(Self {
            total_seats,
            seats_per_row,
            blocks,
            positions,
        })
    }

    pub fn total_seats(&self) -> u32 {
        self.total_seats
    }

    pub fn seats_per_row(&self) -> u32 {
        self.seats_per_row
    }

    pub fn blocks(&self) -> &[u32] {
        &self.blocks
    }

    pub fn rows(&self) -> u32 {
        self.total_seats.div_ceil(self.seats_per_row)
    }

    /// Positions in seat-number order.
    pub fn positions(&self) -> &[SeatPosition] {
        &self.positions
    }

    pub fn position(&self, seat_number: u32) -> Option<&SeatPosition> {
        seat_number
            .checked_sub(1)
            .and_then(|index| self.positions.get(index as usize))
    }

    /// Seats sharing a block and a row with `seat_number`, one column to
    /// either side. Seats across an aisle are not neighbors.
    pub fn neighbors(&self, seat_number: u32) -> Vec<u32> {
        let Some(origin) = self.position(seat_number) else {
            return Vec::new();
        };

        [seat_number.checked_sub(1), seat_number.checked_add(1)]
            .into_iter()
            .flatten()
            .filter_map(|candidate| self.position(candidate))
            .filter(|p| p.row == origin.row && p.block == origin.block)
            .map(|p| p.seat_number)
            .collect()
    }
}

/// Parses "2+1" style notation into block widths.
pub fn parse_pattern(pattern: &str) -> CoreResult<Vec<u32>> {
    if pattern.trim().is_empty() {
        return Err(CoreError::InvalidGeometry("layout pattern is empty".to_string()));
    }

    pattern
        .split('+')
        .map(|token| match token.trim().parse::<u32>() {
            Ok(0) => Err(CoreError::InvalidGeometry(format!(
                "layout '{}' contains an empty block",
                pattern.trim()
            ))),
            Ok(width) => Ok(width),
            Err(_) => Err(CoreError::InvalidGeometry(format!(
                "cannot parse layout '{}'",
                pattern.trim()
            ))),
        })
        .collect()
}

fn column_info(blocks: &[u32]) -> Vec<ColumnInfo> {
    let last_block = blocks.len() - 1;
    let mut columns = Vec::with_capacity(blocks.iter().sum::<u32>() as usize);

    for (block, &width) in blocks.iter().enumerate() {
        for offset in 0..width {
            let aisle_on_left = block > 0 && offset == 0;
            let aisle_on_right = block < last_block && offset == width - 1;
            columns.push(ColumnInfo {
                block: block as u32,
                aisle_adjacent: aisle_on_left || aisle_on_right,
            });
        }
    }

    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_two_plus_one_coach() {
        let layout = SeatLayout::resolve(29, 3, "2+1").unwrap();

        let first = layout.position(1).unwrap();
        assert_eq!((first.row, first.column, first.block), (1, 1, 0));
        assert!(!first.aisle_adjacent);

        let second = layout.position(2).unwrap();
        assert_eq!((second.row, second.column, second.block), (1, 2, 0));
        assert!(second.aisle_adjacent);

        let single = layout.position(3).unwrap();
        assert_eq!((single.row, single.column, single.block), (1, 3, 1));
        assert!(single.aisle_adjacent);

        let fourth = layout.position(4).unwrap();
        assert_eq!((fourth.row, fourth.column), (2, 1));
    }

    #[test]
    fn test_partial_last_row_is_truncated() {
        let layout = SeatLayout::resolve(29, 3, "2+1").unwrap();
        assert_eq!(layout.rows(), 10);
        assert_eq!(layout.positions().len(), 29);

        let last = layout.position(29).unwrap();
        assert_eq!((last.row, last.column), (10, 2));
        assert!(layout.position(30).is_none());
        assert!(layout.position(0).is_none());
    }

    #[test]
    fn test_invalid_geometry() {
        let cases = [
            (0, 3, "2+1"),
            (10, 0, "2+1"),
            (10, 4, "2+1"),
            (10, 3, ""),
            (10, 3, "2+x"),
            (10, 3, "3+0"),
            (10, 3, "2++1"),
        ];
        for (total, per_row, pattern) in cases {
            let result = SeatLayout::resolve(total, per_row, pattern);
            assert!(
                matches!(result, Err(CoreError::InvalidGeometry(_))),
                "expected InvalidGeometry for ({}, {}, {:?})",
                total,
                per_row,
                pattern
            );
        }
    }

    #[test]
    fn test_pattern_whitespace_is_ignored() {
        assert_eq!(parse_pattern(" 2 + 2 ").unwrap(), vec![2, 2]);
        assert_eq!(parse_pattern("4").unwrap(), vec![4]);
    }

    #[test]
    fn test_aisle_flags_two_plus_two() {
        let layout = SeatLayout::resolve(8, 4, "2+2").unwrap();
        let flags: Vec<bool> = layout.positions()[..4].iter().map(|p| p.aisle_adjacent).collect();
        assert_eq!(flags, vec![false, true, true, false]);
    }

    #[test]
    fn test_single_block_has_no_aisle() {
        let layout = SeatLayout::resolve(6, 3, "3").unwrap();
        assert!(layout.positions().iter().all(|p| !p.aisle_adjacent));
        assert_eq!(layout.neighbors(2), vec![1, 3]);
    }

    #[test]
    fn test_neighbors_stop_at_aisle_and_row_end() {
        let layout = SeatLayout::resolve(10, 3, "2+1").unwrap();
        // Row 2 holds seats 4, 5 | 6.
        assert_eq!(layout.neighbors(4), vec![5]);
        assert_eq!(layout.neighbors(5), vec![4]);
        assert!(layout.neighbors(6).is_empty());
        // Seat 10 is alone in the truncated last row.
        assert!(layout.neighbors(10).is_empty());
        assert!(layout.neighbors(11).is_empty());
    }

    fn blocks_strategy() -> impl Strategy<Value = Vec<u32>> {
        prop::collection::vec(1u32..4, 1..4)
    }

    proptest! {
        #[test]
        fn prop_resolution_is_total_and_deterministic(
            blocks in blocks_strategy(),
            total in 1u32..200,
        ) {
            let pattern = blocks.iter().map(|b| b.to_string()).collect::<Vec<_>>().join("+");
            let per_row: u32 = blocks.iter().sum();

            let layout = SeatLayout::resolve(total, per_row, &pattern).unwrap();
            let again = SeatLayout::resolve(total, per_row, &pattern).unwrap();
            prop_assert_eq!(&layout, &again);

            prop_assert_eq!(layout.positions().len() as u32, total);
            for (index, p) in layout.positions().iter().enumerate() {
                let index = index as u32;
                prop_assert_eq!(p.seat_number, index + 1);
                prop_assert_eq!(p.row, index / per_row + 1);
                prop_assert_eq!(p.column, index % per_row + 1);
                prop_assert!(p.column <= per_row);
                prop_assert!((p.block as usize) < blocks.len());
            }
        }

        #[test]
        fn prop_neighbors_are_symmetric(
            blocks in blocks_strategy(),
            total in 1u32..100,
        ) {
            let pattern = blocks.iter().map(|b| b.to_string()).collect::<Vec<_>>().join("+");
            let per_row: u32 = blocks.iter().sum();
            let layout = SeatLayout::resolve(total, per_row, &pattern).unwrap();

            for seat in 1..=total {
                for neighbor in layout.neighbors(seat) {
                    prop_assert!(layout.neighbors(neighbor).contains(&seat));
                }
            }
        }
    }
}
