use planara_types::{Location, Position};

use super::label::Label;

const NULL_DEPTH: i32 = -1;

/// Number of input geometry interiors on each side of an edge.
///
/// Depths are accumulated while duplicate edges are merged and are used to detect areas that
/// collapsed to lines.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Depth {
    depth: [[i32; 3]; 2],
}

impl Default for Depth {
    fn default() -> Self {
        Self {
            depth: [[NULL_DEPTH; 3]; 2],
        }
    }
}

fn depth_at_location(location: Location) -> i32 {
    match location {
        Location::Exterior => 0,
        Location::Interior => 1,
        Location::Boundary => NULL_DEPTH,
    }
}

impl Depth {
    /// Raw depth value, `-1` if unknown.
    pub fn get(&self, geom_index: usize, position: Position) -> i32 {
        self.depth[geom_index][position.index()]
    }

    /// Location implied by the depth.
    pub fn location(&self, geom_index: usize, position: Position) -> Location {
        if self.get(geom_index, position) <= 0 {
            Location::Exterior
        } else {
            Location::Interior
        }
    }

    /// Adds the side locations of an area label.
    pub fn add(&mut self, label: &Label) {
        for i in 0..2 {
            for position in [Position::Left, Position::Right] {
                let Some(location) = label.location_at(i, position) else {
                    continue;
                };
                if location == Location::Boundary {
                    continue;
                }

                let value = &mut self.depth[i][position.index()];
                if *value == NULL_DEPTH {
                    *value = depth_at_location(location);
                } else {
                    *value += depth_at_location(location);
                }
            }
        }
    }

    /// Whether no depth is known.
    pub fn is_null(&self) -> bool {
        self.depth.iter().flatten().all(|d| *d == NULL_DEPTH)
    }

    /// Whether no depth is known for the given geometry.
    pub fn is_null_for(&self, geom_index: usize) -> bool {
        self.depth[geom_index][Position::Left.index()] == NULL_DEPTH
    }

    /// Whether the depth at the given position is unknown.
    pub fn is_null_at(&self, geom_index: usize, position: Position) -> bool {
        self.get(geom_index, position) == NULL_DEPTH
    }

    /// Difference between the right and the left depth.
    pub fn delta(&self, geom_index: usize) -> i32 {
        self.get(geom_index, Position::Right) - self.get(geom_index, Position::Left)
    }

    /// Normalizes the depths so that the minimum side depth is 0 and the other side is 0 or 1.
    pub fn normalize(&mut self) {
        for i in 0..2 {
            if self.is_null_for(i) {
                continue;
            }

            let sides = &mut self.depth[i][1..];
            let min_depth = sides[0].min(sides[1]).max(0);
            for value in sides {
                *value = i32::from(*value > min_depth);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_area_edges_collapse() {
        let a = Label::area(0, Location::Boundary, Location::Exterior, Location::Interior);
        // Same edge of the same geometry, traversed the other way.
        let b = Label::area(0, Location::Boundary, Location::Interior, Location::Exterior);

        let mut depth = Depth::default();
        assert!(depth.is_null());
        depth.add(&a);
        depth.add(&b);
        assert_eq!(depth.get(0, Position::Left), 1);
        assert_eq!(depth.get(0, Position::Right), 1);
        assert!(depth.is_null_for(1));

        depth.normalize();
        assert_eq!(depth.delta(0), 0);
        assert_eq!(depth.location(0, Position::Left), Location::Exterior);
    }

    #[test]
    fn normalize_keeps_sides_apart() {
        let mut depth = Depth::default();
        let label = Label::area(1, Location::Boundary, Location::Exterior, Location::Interior);
        depth.add(&label);
        depth.add(&label);
        assert_eq!(depth.get(1, Position::Right), 2);

        depth.normalize();
        assert_eq!(depth.get(1, Position::Left), 0);
        assert_eq!(depth.get(1, Position::Right), 1);
        assert_eq!(depth.delta(1), 1);
        assert_eq!(depth.location(1, Position::Right), Location::Interior);
    }
}
