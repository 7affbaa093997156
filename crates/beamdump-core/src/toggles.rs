//! Component switches for a model build.

use serde::{Deserialize, Serialize};

/// Which parts of the beam dump to build. Each flag gates exactly one
/// component; the defaults build everything except the argon fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildToggles {
    pub world: bool,
    pub leading_cylinder: bool,
    pub second_cylinder: bool,
    pub pipe: bool,
    pub argon_pipe: bool,
    pub lead_glass_bars: bool,
    pub lead_cube_dump: bool,
}

impl Default for BuildToggles {
    fn default() -> Self {
        Self {
            world: true,
            leading_cylinder: true,
            second_cylinder: true,
            pipe: true,
            argon_pipe: false,
            lead_glass_bars: true,
            lead_cube_dump: true,
        }
    }
}

impl BuildToggles {
    /// Everything, including the argon fill.
    pub fn all() -> Self {
        Self {
            argon_pipe: true,
            ..Self::default()
        }
    }

    /// Only the world volume.
    pub fn world_only() -> Self {
        Self {
            world: true,
            leading_cylinder: false,
            second_cylinder: false,
            pipe: false,
            argon_pipe: false,
            lead_glass_bars: false,
            lead_cube_dump: false,
        }
    }

    /// Names of the enabled components that are placed inside the world.
    pub fn placed_components(&self) -> Vec<&'static str> {
        [
            ("leading_cylinder", self.leading_cylinder),
            ("second_cylinder", self.second_cylinder),
            ("pipe", self.pipe),
            ("argon_pipe", self.argon_pipe),
            ("lead_glass_bars", self.lead_glass_bars),
            ("lead_cube_dump", self.lead_cube_dump),
        ]
        .into_iter()
        .filter_map(|(name, on)| on.then_some(name))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_skip_argon() {
        let t = BuildToggles::default();
        assert!(t.world && t.pipe && t.lead_glass_bars);
        assert!(!t.argon_pipe);
        assert_eq!(t.placed_components().len(), 5);
    }

    #[test]
    fn test_world_only_places_nothing() {
        assert!(BuildToggles::world_only().placed_components().is_empty());
        assert_eq!(BuildToggles::all().placed_components().len(), 6);
    }
}
