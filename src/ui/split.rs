/// Partitions a span of terminal cells into successive breakpoints.
///
/// Points are consumed in call order: `fixed` takes an absolute number of
/// cells from the remaining space, `relative` takes a percentage of what is
/// left. Asking for more than what remains drives the remainder negative;
/// callers are expected not to do that.
#[derive(Debug, Clone)]
pub struct Split {
    size: i32,
    left: i32,
    points: Vec<i32>,
    index: usize,
}

impl Split {
    pub fn new(size: i32) -> Self {
        Self { size, left: size, points: vec![0], index: 0 }
    }

    pub fn fixed(mut self, points: &[i32]) -> Self {
        for &point in points {
            self.push(point);
        }
        self
    }

    pub fn relative(mut self, percents: &[i32]) -> Self {
        for &percent in percents {
            let share = f64::from(self.left) * f64::from(percent) / 100.0;
            self.push((0.5 + share).floor() as i32);
        }
        self
    }

    fn push(&mut self, point: i32) {
        self.points.push(point + (self.size - self.left));
        self.left -= point;
    }

    /// Advances to the next breakpoint. Once every point has been handed out
    /// this keeps returning `0`, which layouts use as the end-of-cycle marker.
    pub fn next(&mut self) -> i32 {
        if self.index + 1 == self.points.len() {
            return 0;
        }
        self.index += 1;
        self.points[self.index]
    }

    pub fn current(&self) -> i32 {
        self.points[self.index]
    }

    #[cfg(test)]
    pub fn remaining(&self) -> i32 {
        self.left
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_points() {
        // | 1 2 3 4 5 6 7 8 9 A |
        // | _ _ x _ _ x _ x _ _ |
        let mut split = Split::new(10).fixed(&[3, 3, 2]);
        assert_eq!(split.next(), 3);
        assert_eq!(split.next(), 6);
        assert_eq!(split.next(), 8);
        assert_eq!(split.next(), 0);
    }

    #[test]
    fn test_relative_points() {
        // | 1 2 3 4 5 6 7 8 9 A |
        // | x _ _ _ _ x _ _ x _ |
        let mut split = Split::new(10).relative(&[20, 50, 50]);
        assert_eq!(split.next(), 2);
        assert_eq!(split.next(), 6);
        assert_eq!(split.next(), 8);
        assert_eq!(split.next(), 0);
    }

    #[test]
    fn test_mixed_points() {
        // | 1 2 3 4 5 6 7 8 9 A |
        // | f f _ _ _ r f _ r _ |
        let mut split = Split::new(10)
            .fixed(&[1, 1])
            .relative(&[50])
            .fixed(&[1])
            .relative(&[50]);
        assert_eq!(split.next(), 1);
        assert_eq!(split.next(), 2);
        assert_eq!(split.next(), 6);
        assert_eq!(split.next(), 7);
        assert_eq!(split.next(), 9);
        assert_eq!(split.next(), 0);
    }

    #[test]
    fn test_current_does_not_advance() {
        let mut split = Split::new(80).relative(&[70]);
        assert_eq!(split.current(), 0);
        assert_eq!(split.next(), 56);
        assert_eq!(split.current(), 56);
        assert_eq!(split.current(), 56);
        assert_eq!(split.next(), 0);
        assert_eq!(split.current(), 56);
    }

    #[test]
    fn test_overdrawn_split_goes_negative() {
        let split = Split::new(4).fixed(&[3, 3]);
        assert_eq!(split.remaining(), -2);
    }
}
