use planara_types::{Coordinate, Envelope};

use crate::error::PlanaraError;
use crate::index::interval_size;

/// Largest level a quad cell can have before its size overflows.
const MAX_LEVEL: i32 = 1023;

/// A quadtree cell that contains a given envelope: the cell origin is aligned to a grid with the
/// cell size, and the size is a power of 2.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(super) struct Key {
    pub point: Coordinate,
    pub level: i32,
    pub env: Envelope,
}

impl Key {
    /// Computes the smallest aligned cell containing the envelope.
    pub fn new(item_env: &Envelope) -> Result<Self, PlanaraError> {
        let mut level = Self::compute_quad_level(item_env);
        loop {
            let key = Self::at_level(level, item_env);
            if key.env.contains(item_env) {
                return Ok(key);
            }
            if level >= MAX_LEVEL {
                return Err(PlanaraError::Assertion(format!(
                    "no quadtree cell can contain envelope {item_env:?}"
                )));
            }
            level += 1;
        }
    }

    fn compute_quad_level(env: &Envelope) -> i32 {
        let d_max = env.width().max(env.height());
        interval_size::exponent(d_max) + 1
    }

    fn at_level(level: i32, item_env: &Envelope) -> Self {
        let quad_size = interval_size::power_of_2(level);
        let x = (item_env.min_x() / quad_size).floor() * quad_size;
        let y = (item_env.min_y() / quad_size).floor() * quad_size;
        Self {
            point: Coordinate::new(x, y),
            level,
            env: Envelope::new(x, x + quad_size, y, y + quad_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_contains_envelope() {
        let env = Envelope::new(3.2, 3.7, 5.1, 5.4);
        let key = Key::new(&env).expect("key");
        assert!(key.env.contains(&env));
        assert_eq!(key.level, 0);
        assert_eq!(key.env, Envelope::new(3.0, 4.0, 5.0, 6.0));
    }

    #[test]
    fn key_grows_when_grid_line_is_crossed() {
        let env = Envelope::new(0.9, 1.1, 0.2, 0.3);
        let key = Key::new(&env).expect("key");
        assert!(key.env.contains(&env));
        assert_eq!(key.env, Envelope::new(0.0, 2.0, 0.0, 2.0));
    }
}
