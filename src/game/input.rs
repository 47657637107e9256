use super::math::{length, normalize};
use super::types::Point;

pub fn parse_target(value: Point) -> Option<Point> {
    if !value.is_finite() {
        return None;
    }
    Some(value)
}

/// Unit heading from `from` toward `target`, or `None` when there is no usable direction.
pub fn heading_toward(from: Point, target: Point) -> Option<Point> {
    let target = parse_target(target)?;
    let heading = normalize(target - from);
    if length(heading) == 0.0 {
        return None;
    }
    Some(heading)
}
