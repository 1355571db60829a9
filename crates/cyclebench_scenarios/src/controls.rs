//! Button state to `ui_in` value.

use cyclebench_config::ControlMap;
use rand::Rng;

/// Which buttons are pressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlInputs {
    /// Move right.
    pub right: bool,
    /// Move left.
    pub left: bool,
    /// Fire.
    pub fire: bool,
}

impl ControlInputs {
    /// No button pressed.
    pub const IDLE: ControlInputs = ControlInputs {
        right: false,
        left: false,
        fire: false,
    };
    /// Only move-right pressed.
    pub const RIGHT: ControlInputs = ControlInputs {
        right: true,
        left: false,
        fire: false,
    };
    /// Only move-left pressed.
    pub const LEFT: ControlInputs = ControlInputs {
        right: false,
        left: true,
        fire: false,
    };
    /// Only fire pressed.
    pub const FIRE: ControlInputs = ControlInputs {
        right: false,
        left: false,
        fire: true,
    };

    /// A uniformly random combination of buttons.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            right: rng.gen(),
            left: rng.gen(),
            fire: rng.gen(),
        }
    }

    /// The control bus value under `map`. Unmapped bits are 0.
    pub fn to_ui_in(self, map: &ControlMap) -> u64 {
        [(self.right, map.right), (self.left, map.left), (self.fire, map.fire)]
            .into_iter()
            .filter(|(pressed, _)| *pressed)
            .fold(0, |acc, (_, bit)| acc | 1 << bit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn default_map_matches_canonical_bits() {
        let map = ControlMap::default();
        assert_eq!(ControlInputs::IDLE.to_ui_in(&map), 0b0000);
        assert_eq!(ControlInputs::RIGHT.to_ui_in(&map), 0b0001);
        assert_eq!(ControlInputs::LEFT.to_ui_in(&map), 0b0010);
        assert_eq!(ControlInputs::FIRE.to_ui_in(&map), 0b0100);
    }

    #[test]
    fn custom_map() {
        let map = ControlMap {
            width: 4,
            right: 3,
            left: 2,
            fire: 0,
        };
        let all = ControlInputs {
            right: true,
            left: true,
            fire: true,
        };
        assert_eq!(all.to_ui_in(&map), 0b1101);
        assert_eq!(ControlInputs::FIRE.to_ui_in(&map), 0b0001);
    }

    #[test]
    fn random_is_reproducible() {
        let a: Vec<_> = {
            let mut rng = StdRng::seed_from_u64(7);
            (0..16).map(|_| ControlInputs::random(&mut rng)).collect()
        };
        let b: Vec<_> = {
            let mut rng = StdRng::seed_from_u64(7);
            (0..16).map(|_| ControlInputs::random(&mut rng)).collect()
        };
        assert_eq!(a, b);
    }
}
