#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    pub fn inner(&self, margin: u16) -> Self {
        if self.width < margin * 2 || self.height < margin * 2 {
            return Rect::default();
        }
        Rect {
            x: self.x + margin,
            y: self.y + margin,
            width: self.width - margin * 2,
            height: self.height - margin * 2,
        }
    }

    pub fn intersection(&self, other: Rect) -> Rect {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        Rect {
            x: x1,
            y: y1,
            width: x2.saturating_sub(x1),
            height: y2.saturating_sub(y1),
        }
    }

    /// Carve `n` rows off the bottom: returns (rest, bottom strip).
    pub fn split_bottom(&self, n: u16) -> (Rect, Rect) {
        let n = n.min(self.height);
        (
            Rect::new(self.x, self.y, self.width, self.height - n),
            Rect::new(self.x, self.y + self.height - n, self.width, n),
        )
    }

    /// A `width` x `height` rect centered in `self`, clamped to fit.
    pub fn centered(&self, width: u16, height: u16) -> Rect {
        let width = width.min(self.width);
        let height = height.min(self.height);
        Rect {
            x: self.x + (self.width - width) / 2,
            y: self.y + (self.height - height) / 2,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_clamps_to_the_containing_rect() {
        let outer = Rect::new(0, 0, 80, 24);
        assert_eq!(outer.centered(40, 10), Rect::new(20, 7, 40, 10));
        assert_eq!(outer.centered(200, 100), outer);
    }

    #[test]
    fn split_bottom_accounts_for_every_row() {
        let area = Rect::new(0, 0, 80, 24);
        let (rest, strip) = area.split_bottom(2);
        assert_eq!(rest, Rect::new(0, 0, 80, 22));
        assert_eq!(strip, Rect::new(0, 22, 80, 2));
        assert_eq!(rest.height + strip.height, area.height);
    }

    #[test]
    fn inner_collapses_when_the_margin_does_not_fit() {
        assert_eq!(Rect::new(0, 0, 3, 1).inner(1), Rect::default());
        assert_eq!(Rect::new(0, 0, 10, 10).inner(1), Rect::new(1, 1, 8, 8));
    }
}
