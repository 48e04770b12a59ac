use std::fmt::{Display, Formatter};

use planara_types::{Location, Position};

/// Locations of a graph component relative to a single geometry.
///
/// Line locations only have the `On` position. Area locations also record the locations to the
/// left and to the right of the component.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TopologyLocation {
    locations: [Option<Location>; 3],
    is_area: bool,
}

impl TopologyLocation {
    /// Location of a line component.
    pub fn line(on: Option<Location>) -> Self {
        Self {
            locations: [on, None, None],
            is_area: false,
        }
    }

    /// Location of an area component.
    pub fn area(on: Option<Location>, left: Option<Location>, right: Option<Location>) -> Self {
        Self {
            locations: [on, left, right],
            is_area: true,
        }
    }

    /// Whether left and right locations are recorded.
    pub fn is_area(&self) -> bool {
        self.is_area
    }

    /// Whether only the `On` location is recorded.
    pub fn is_line(&self) -> bool {
        !self.is_area
    }

    /// Location at the given position. Side positions of a line location are always `None`.
    pub fn get(&self, position: Position) -> Option<Location> {
        self.positions().get(position.index()).copied().flatten()
    }

    /// Sets the location at the given position. Side positions of a line location are ignored.
    pub fn set(&mut self, position: Position, location: Option<Location>) {
        if self.is_area || position == Position::On {
            self.locations[position.index()] = location;
        }
    }

    /// Whether all locations are unknown.
    pub fn is_null(&self) -> bool {
        self.positions().iter().all(Option::is_none)
    }

    /// Whether any location is unknown.
    pub fn is_any_null(&self) -> bool {
        self.positions().iter().any(Option::is_none)
    }

    /// Whether all positions have the given location.
    pub fn all_positions_equal(&self, location: Location) -> bool {
        self.positions().iter().all(|loc| *loc == Some(location))
    }

    /// Swaps left and right locations.
    pub fn flip(&mut self) {
        if self.is_area {
            self.locations.swap(Position::Left.index(), Position::Right.index());
        }
    }

    /// Sets every position to the given location.
    pub fn set_all_locations(&mut self, location: Location) {
        let count = self.positions().len();
        self.locations[..count].fill(Some(location));
    }

    /// Sets every unknown position to the given location.
    pub fn set_all_locations_if_null(&mut self, location: Location) {
        let count = self.positions().len();
        for loc in &mut self.locations[..count] {
            loc.get_or_insert(location);
        }
    }

    /// Fills unknown positions from another location. A line location merged with an area
    /// location becomes an area location.
    pub fn merge(&mut self, other: &TopologyLocation) {
        if other.is_area && !self.is_area {
            self.is_area = true;
            self.locations[1] = None;
            self.locations[2] = None;
        }

        let count = self.positions().len().min(other.positions().len());
        for i in 0..count {
            if self.locations[i].is_none() {
                self.locations[i] = other.locations[i];
            }
        }
    }

    fn positions(&self) -> &[Option<Location>] {
        if self.is_area {
            &self.locations
        } else {
            &self.locations[..1]
        }
    }
}

impl Display for TopologyLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let symbol = |loc: Option<Location>| loc.map_or('-', Location::symbol);
        if self.is_area {
            write!(f, "{}", symbol(self.locations[1]))?;
        }
        write!(f, "{}", symbol(self.locations[0]))?;
        if self.is_area {
            write!(f, "{}", symbol(self.locations[2]))?;
        }
        Ok(())
    }
}

/// Topological relationship of a graph component to the two input geometries of an operation.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Label {
    elt: [TopologyLocation; 2],
}

impl Label {
    /// Line label with the `On` location set for one geometry.
    pub fn line(geom_index: usize, on: Location) -> Self {
        let mut label = Self::default();
        label.elt[geom_index] = TopologyLocation::line(Some(on));
        label
    }

    /// Area label with locations set for one geometry. The other geometry gets an unknown area
    /// location.
    pub fn area(geom_index: usize, on: Location, left: Location, right: Location) -> Self {
        let mut elt = [TopologyLocation::area(None, None, None); 2];
        elt[geom_index] = TopologyLocation::area(Some(on), Some(left), Some(right));
        Self { elt }
    }

    /// Line label with the `On` locations of this label.
    pub fn to_line_label(&self) -> Self {
        let mut label = Self::default();
        for i in 0..2 {
            label.elt[i] = TopologyLocation::line(self.location(i));
        }
        label
    }

    /// Locations relative to the given geometry.
    pub fn topology_location(&self, geom_index: usize) -> &TopologyLocation {
        &self.elt[geom_index]
    }

    /// Swaps left and right locations for both geometries.
    pub fn flip(&mut self) {
        self.elt[0].flip();
        self.elt[1].flip();
    }

    /// `On` location relative to the given geometry.
    pub fn location(&self, geom_index: usize) -> Option<Location> {
        self.elt[geom_index].get(Position::On)
    }

    /// Location at the given position relative to the given geometry.
    pub fn location_at(&self, geom_index: usize, position: Position) -> Option<Location> {
        self.elt[geom_index].get(position)
    }

    /// Sets the `On` location relative to the given geometry.
    pub fn set_location(&mut self, geom_index: usize, location: Location) {
        self.elt[geom_index].set(Position::On, Some(location));
    }

    /// Sets the location at the given position relative to the given geometry.
    pub fn set_location_at(&mut self, geom_index: usize, position: Position, location: Location) {
        self.elt[geom_index].set(position, Some(location));
    }

    /// Sets every position of the given geometry to the location.
    pub fn set_all_locations(&mut self, geom_index: usize, location: Location) {
        self.elt[geom_index].set_all_locations(location);
    }

    /// Sets every unknown position of the given geometry to the location.
    pub fn set_all_locations_if_null(&mut self, geom_index: usize, location: Location) {
        self.elt[geom_index].set_all_locations_if_null(location);
    }

    /// Fills unknown locations from another label.
    pub fn merge(&mut self, other: &Label) {
        self.elt[0].merge(&other.elt[0]);
        self.elt[1].merge(&other.elt[1]);
    }

    /// Number of geometries the label has any location for.
    pub fn geometry_count(&self) -> usize {
        self.elt.iter().filter(|elt| !elt.is_null()).count()
    }

    /// Whether no location is known for the given geometry.
    pub fn is_null(&self, geom_index: usize) -> bool {
        self.elt[geom_index].is_null()
    }

    /// Whether any location is unknown for the given geometry.
    pub fn is_any_null(&self, geom_index: usize) -> bool {
        self.elt[geom_index].is_any_null()
    }

    /// Whether the label is an area label for any of the geometries.
    pub fn is_area(&self) -> bool {
        self.elt[0].is_area() || self.elt[1].is_area()
    }

    /// Whether the label is an area label for the given geometry.
    pub fn is_area_for(&self, geom_index: usize) -> bool {
        self.elt[geom_index].is_area()
    }

    /// Whether the label is a line label for the given geometry.
    pub fn is_line(&self, geom_index: usize) -> bool {
        self.elt[geom_index].is_line()
    }

    /// Whether all positions of the given geometry have the location.
    pub fn all_positions_equal(&self, geom_index: usize, location: Location) -> bool {
        self.elt[geom_index].all_positions_equal(location)
    }

    /// Converts the locations of the given geometry to a line location, keeping `On`.
    pub fn to_line(&mut self, geom_index: usize) {
        if self.elt[geom_index].is_area() {
            self.elt[geom_index] = TopologyLocation::line(self.location(geom_index));
        }
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "A:{} B:{}", self.elt[0], self.elt[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_label_flip_and_display() {
        let mut label = Label::area(0, Location::Boundary, Location::Exterior, Location::Interior);
        assert_eq!(label.to_string(), "A:ebi B:---");
        label.flip();
        assert_eq!(label.location_at(0, Position::Left), Some(Location::Interior));
        assert_eq!(label.location_at(0, Position::Right), Some(Location::Exterior));
        assert!(label.is_area_for(1));
        assert!(label.is_null(1));
        assert_eq!(label.geometry_count(), 1);
    }

    #[test]
    fn merge_fills_unknown_locations() {
        let mut label = Label::line(0, Location::Interior);
        label.merge(&Label::area(
            1,
            Location::Boundary,
            Location::Interior,
            Location::Exterior,
        ));
        assert!(label.is_line(0));
        assert!(label.is_area_for(1));
        assert_eq!(label.location(1), Some(Location::Boundary));
        assert_eq!(label.geometry_count(), 2);

        let mut line = TopologyLocation::line(Some(Location::Boundary));
        line.merge(&TopologyLocation::area(
            Some(Location::Interior),
            Some(Location::Exterior),
            None,
        ));
        assert!(line.is_area());
        assert_eq!(line.get(Position::On), Some(Location::Boundary));
        assert_eq!(line.get(Position::Left), Some(Location::Exterior));
        assert_eq!(line.get(Position::Right), None);
    }

    #[test]
    fn line_conversion() {
        let mut label = Label::area(1, Location::Boundary, Location::Exterior, Location::Interior);
        label.to_line(1);
        assert!(label.is_line(1));
        assert_eq!(label.location(1), Some(Location::Boundary));
        assert_eq!(label.location_at(1, Position::Left), None);

        let line = Label::area(0, Location::Boundary, Location::Exterior, Location::Interior)
            .to_line_label();
        assert!(!line.is_area());
        assert_eq!(line.location(0), Some(Location::Boundary));
    }

    #[test]
    fn set_all_if_null() {
        let mut location = TopologyLocation::area(Some(Location::Boundary), None, None);
        location.set_all_locations_if_null(Location::Exterior);
        assert!(!location.all_positions_equal(Location::Exterior));
        assert_eq!(location.get(Position::Left), Some(Location::Exterior));
        assert!(!location.is_any_null());
    }
}
