use dd_core::GridPoint;

/// Something a drone can fly to.
pub trait Waypoint {
    fn position(&self) -> GridPoint;
}

impl Waypoint for GridPoint {
    #[inline]
    fn position(&self) -> GridPoint {
        *self
    }
}

impl<W: Waypoint + ?Sized> Waypoint for &W {
    #[inline]
    fn position(&self) -> GridPoint {
        (**self).position()
    }
}
