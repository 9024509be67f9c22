//! Surface materials, collision groups and terrain tagging.
//!
//! Every collider carries a [`SurfaceMaterial`] tag.  The tag drives two
//! things only: contact classification in [`crate::contact`] and the
//! friction/restitution a collider gets at spawn.  Collision filtering is done
//! with [`CollisionGroups`] and never looks at the tag.
//!
//! Surface responses are held in an explicit [`SurfaceMaterials`] context that
//! is passed into skeleton construction; there is no process-wide registry.
//!
//! Collision groups:
//! - `GROUP_1`: terrain; collides with riders and other terrain
//! - `GROUP_2`: rider parts; collide with terrain only, never with each other

use crate::config::RiderConfig;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Terrain collision membership.
pub const TERRAIN_GROUP: Group = Group::GROUP_1;

/// Rider collision membership.
pub const RIDER_GROUP: Group = Group::GROUP_2;

/// Thickness of a terrain platform (m).
pub const PLATFORM_HEIGHT: f32 = 0.2;

/// Material tag attached to every collider entity.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceMaterial {
    /// Any part of the rider except the tyre.
    Player,
    /// The unicycle's tyre.
    PlayerTyre,
    /// Static or kinematic ground.
    Terrain,
}

impl SurfaceMaterial {
    /// Collision groups for a collider with this material.
    pub fn collision_groups(self) -> CollisionGroups {
        match self {
            SurfaceMaterial::Player | SurfaceMaterial::PlayerTyre => {
                CollisionGroups::new(RIDER_GROUP, TERRAIN_GROUP)
            }
            SurfaceMaterial::Terrain => {
                CollisionGroups::new(TERRAIN_GROUP, RIDER_GROUP | TERRAIN_GROUP)
            }
        }
    }
}

/// Friction and restitution for one material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceResponse {
    pub friction: Friction,
    pub restitution: Restitution,
}

/// Explicit material context handed to the skeleton builder and terrain helpers.
///
/// The tyre uses the `Max` combine rule so its grip and bounce win against
/// terrain, which is how a dedicated tyre/terrain contact material behaves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMaterials {
    pub player: SurfaceResponse,
    pub tyre: SurfaceResponse,
    pub terrain: SurfaceResponse,
}

impl SurfaceMaterials {
    pub fn from_config(config: &RiderConfig) -> Self {
        let plain = SurfaceResponse {
            friction: Friction {
                coefficient: config.default_friction,
                combine_rule: CoefficientCombineRule::Average,
            },
            restitution: Restitution {
                coefficient: 0.0,
                combine_rule: CoefficientCombineRule::Average,
            },
        };
        Self {
            player: plain,
            tyre: SurfaceResponse {
                friction: Friction {
                    coefficient: config.tyre_friction,
                    combine_rule: CoefficientCombineRule::Max,
                },
                restitution: Restitution {
                    coefficient: config.tyre_restitution,
                    combine_rule: CoefficientCombineRule::Max,
                },
            },
            terrain: plain,
        }
    }

    pub fn response(&self, material: SurfaceMaterial) -> SurfaceResponse {
        match material {
            SurfaceMaterial::Player => self.player,
            SurfaceMaterial::PlayerTyre => self.tyre,
            SurfaceMaterial::Terrain => self.terrain,
        }
    }
}

impl Default for SurfaceMaterials {
    fn default() -> Self {
        Self::from_config(&RiderConfig::default())
    }
}

/// Components for a fixed terrain platform of the given width, centred on `position`.
///
/// Terrain is consumed as already-placed bodies; this only tags a body so the
/// contact tracker and the rider's collision filter recognise it.
pub fn terrain_platform(
    position: Vec2,
    width: f32,
    materials: &SurfaceMaterials,
) -> impl Bundle {
    let response = materials.response(SurfaceMaterial::Terrain);
    (
        SurfaceMaterial::Terrain,
        RigidBody::Fixed,
        Collider::cuboid(width / 2.0, PLATFORM_HEIGHT / 2.0),
        SurfaceMaterial::Terrain.collision_groups(),
        response.friction,
        response.restitution,
        Transform::from_translation(position.extend(0.0)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rider_parts_never_collide_with_each_other() {
        let a = SurfaceMaterial::Player.collision_groups();
        let b = SurfaceMaterial::PlayerTyre.collision_groups();
        assert!(!a.memberships.intersects(b.filters));
    }

    #[test]
    fn rider_and_terrain_collide_both_ways() {
        let rider = SurfaceMaterial::PlayerTyre.collision_groups();
        let terrain = SurfaceMaterial::Terrain.collision_groups();
        assert!(rider.memberships.intersects(terrain.filters));
        assert!(terrain.memberships.intersects(rider.filters));
    }

    #[test]
    fn tyre_grip_comes_from_config() {
        let config = RiderConfig {
            tyre_friction: 2.0,
            ..Default::default()
        };
        let materials = SurfaceMaterials::from_config(&config);
        let tyre = materials.response(SurfaceMaterial::PlayerTyre);
        assert_eq!(tyre.friction.coefficient, 2.0);
        assert_eq!(tyre.friction.combine_rule, CoefficientCombineRule::Max);
        assert_eq!(tyre.restitution.coefficient, config.tyre_restitution);
    }
}
