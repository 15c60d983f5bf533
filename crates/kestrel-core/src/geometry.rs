use std::ops::Mul;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect<T> {
    pub x: T,
    pub y: T,
    pub width: T,
    pub height: T,
}

impl<T> Rect<T> {
    pub fn new(x: T, y: T, width: T, height: T) -> Self {
        Rect { x, y, width, height }
    }
}

impl<T: Default> Rect<T> {
    /// Rectangle anchored at the origin covering `size`.
    pub fn from_size(size: Size<T>) -> Self {
        Rect {
            x: T::default(),
            y: T::default(),
            width: size.width,
            height: size.height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size<T> {
    pub width: T,
    pub height: T,
}

impl<T> Size<T> {
    pub fn new(width: T, height: T) -> Self {
        Size { width, height }
    }

    pub fn cast<U: From<T>>(self) -> Size<U> {
        Size {
            width: U::from(self.width),
            height: U::from(self.height),
        }
    }
}

impl Size<u32> {
    /// Whether either dimension is zero (minimized windows report this).
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl<T: Mul + Copy> Mul<T> for Size<T> {
    type Output = Size<<T as Mul>::Output>;

    fn mul(self, rhs: T) -> Self::Output {
        Size {
            width: self.width * rhs,
            height: self.height * rhs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pos<T> {
    pub x: T,
    pub y: T,
}

impl<T> Pos<T> {
    pub fn new(x: T, y: T) -> Self {
        Pos { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_from_size() {
        let rect = Rect::from_size(Size::new(640u32, 480));
        assert_eq!(rect, Rect::new(0, 0, 640, 480));
    }

    #[test]
    fn test_size_is_empty() {
        assert!(Size::new(0u32, 10).is_empty());
        assert!(!Size::new(1u32, 1).is_empty());
    }

    #[test]
    fn test_size_scale() {
        assert_eq!(Size::new(2u32, 3) * 2, Size::new(4, 6));
    }
}
