//! Ground contact tracking for the wheel and the torso.
//!
//! Rapier reports `CollisionEvent::Started` / `Stopped` for every collider
//! pair that has `ActiveEvents::COLLISION_EVENTS`.  A pair counts as
//! "part X touching terrain" when one side is X and the other side carries
//! [`SurfaceMaterial::Terrain`].
//!
//! Each tracked part keeps a **counter** of active terrain contacts rather
//! than a single flag.  With a flag, leaving one platform while still resting
//! on another would clear contact that is still there.  Stops saturate at
//! zero so a stray `Stopped` without a matching `Started` cannot underflow.
//!
//! `contact_tracking_system` runs inside each physics tick, right after Rapier
//! writes its events back, so counters are current before the balance
//! controller reads them.

use crate::rider::{BodyRole, RiderPart};
use crate::surface::SurfaceMaterial;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// The two rider bodies whose terrain contact the controller cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackedPart {
    Wheel,
    Torso,
}

impl TrackedPart {
    pub fn from_role(role: BodyRole) -> Option<Self> {
        match role {
            BodyRole::Wheel => Some(TrackedPart::Wheel),
            BodyRole::Torso => Some(TrackedPart::Torso),
            _ => None,
        }
    }
}

/// Active terrain contacts of one rider, owned by the rider root.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContactState {
    pub wheel_contacts: u32,
    pub torso_contacts: u32,
}

impl ContactState {
    pub fn wheel_on_terrain(&self) -> bool {
        self.wheel_contacts > 0
    }

    pub fn torso_on_terrain(&self) -> bool {
        self.torso_contacts > 0
    }

    fn counter(&mut self, part: TrackedPart) -> &mut u32 {
        match part {
            TrackedPart::Wheel => &mut self.wheel_contacts,
            TrackedPart::Torso => &mut self.torso_contacts,
        }
    }

    pub fn begin(&mut self, part: TrackedPart) {
        let counter = self.counter(part);
        *counter = counter.saturating_add(1);
    }

    pub fn end(&mut self, part: TrackedPart) {
        let counter = self.counter(part);
        *counter = counter.saturating_sub(1);
    }
}

/// What the tracker knows about one side of a contact pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContactSide {
    pub part: Option<RiderPart>,
    pub material: Option<SurfaceMaterial>,
}

/// Resolve a contact pair to the rider and tracked part it concerns, if any.
///
/// Only one side can match: a tracked part never carries the terrain material.
pub fn classify_contact(a: ContactSide, b: ContactSide) -> Option<(Entity, TrackedPart)> {
    [(a, b), (b, a)].into_iter().find_map(|(this, other)| {
        let part = this.part?;
        let tracked = TrackedPart::from_role(part.role)?;
        (other.material == Some(SurfaceMaterial::Terrain)).then_some((part.rider, tracked))
    })
}

/// Apply Rapier collision events to every rider's [`ContactState`].
///
/// Sensor events are counted like any other contact.
pub fn contact_tracking_system(
    mut collision_events: MessageReader<CollisionEvent>,
    sides: Query<(Option<&RiderPart>, Option<&SurfaceMaterial>)>,
    mut riders: Query<&mut ContactState>,
) {
    let side = |entity: Entity| -> ContactSide {
        sides
            .get(entity)
            .map(|(part, material)| ContactSide {
                part: part.copied(),
                material: material.copied(),
            })
            .unwrap_or_default()
    };

    for event in collision_events.read() {
        let (e1, e2, started) = match event {
            CollisionEvent::Started(e1, e2, _) => (*e1, *e2, true),
            CollisionEvent::Stopped(e1, e2, _) => (*e1, *e2, false),
        };

        let Some((rider, part)) = classify_contact(side(e1), side(e2)) else {
            continue;
        };
        let Ok(mut contacts) = riders.get_mut(rider) else {
            continue;
        };

        if started {
            contacts.begin(part);
        } else {
            contacts.end(part);
        }
        debug!("contact {part:?} {} → {:?}", if started { "begin" } else { "end" }, *contacts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rider::{Rider, Side};
    use bevy_rapier2d::rapier::geometry::CollisionEventFlags;

    fn contact_test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_message::<CollisionEvent>();
        app.add_systems(Update, contact_tracking_system);
        app
    }

    /// Spawns a rider root plus one body with `role`, returns (root, body).
    fn spawn_part(app: &mut App, role: BodyRole) -> (Entity, Entity) {
        let root = app
            .world_mut()
            .spawn((Rider, ContactState::default()))
            .id();
        let body = app
            .world_mut()
            .spawn((
                RiderPart { rider: root, role },
                SurfaceMaterial::Player,
            ))
            .id();
        (root, body)
    }

    fn started(a: Entity, b: Entity) -> CollisionEvent {
        CollisionEvent::Started(a, b, CollisionEventFlags::empty())
    }

    fn stopped(a: Entity, b: Entity) -> CollisionEvent {
        CollisionEvent::Stopped(a, b, CollisionEventFlags::empty())
    }

    fn contacts(app: &App, root: Entity) -> ContactState {
        *app.world().get::<ContactState>(root).unwrap()
    }

    #[test]
    fn classify_requires_terrain_on_the_other_side() {
        let rider = World::new().spawn_empty().id();
        let wheel = ContactSide {
            part: Some(RiderPart {
                rider,
                role: BodyRole::Wheel,
            }),
            material: Some(SurfaceMaterial::PlayerTyre),
        };
        let terrain = ContactSide {
            part: None,
            material: Some(SurfaceMaterial::Terrain),
        };
        let unknown = ContactSide::default();

        assert_eq!(
            classify_contact(wheel, terrain),
            Some((rider, TrackedPart::Wheel))
        );
        assert_eq!(
            classify_contact(terrain, wheel),
            Some((rider, TrackedPart::Wheel))
        );
        assert_eq!(classify_contact(wheel, unknown), None);
        assert_eq!(classify_contact(terrain, terrain), None);
    }

    #[test]
    fn untracked_parts_are_ignored() {
        let rider = World::new().spawn_empty().id();
        let leg = ContactSide {
            part: Some(RiderPart {
                rider,
                role: BodyRole::LegBottom(Side::Front),
            }),
            material: Some(SurfaceMaterial::Player),
        };
        let terrain = ContactSide {
            part: None,
            material: Some(SurfaceMaterial::Terrain),
        };
        assert_eq!(classify_contact(leg, terrain), None);
    }

    #[test]
    fn begin_and_end_update_the_matching_counter() {
        let mut app = contact_test_app();
        let (root, wheel) = spawn_part(&mut app, BodyRole::Wheel);
        let ground = app.world_mut().spawn(SurfaceMaterial::Terrain).id();

        app.world_mut().write_message(started(wheel, ground));
        app.update();
        assert!(contacts(&app, root).wheel_on_terrain());
        assert!(!contacts(&app, root).torso_on_terrain());

        app.world_mut().write_message(stopped(ground, wheel));
        app.update();
        assert_eq!(contacts(&app, root), ContactState::default());
    }

    #[test]
    fn overlapping_platforms_keep_wheel_grounded() {
        let mut app = contact_test_app();
        let (root, wheel) = spawn_part(&mut app, BodyRole::Wheel);
        let first = app.world_mut().spawn(SurfaceMaterial::Terrain).id();
        let second = app.world_mut().spawn(SurfaceMaterial::Terrain).id();

        app.world_mut().write_message(started(wheel, first));
        app.world_mut().write_message(started(wheel, second));
        app.world_mut().write_message(stopped(wheel, first));
        app.update();

        let state = contacts(&app, root);
        assert_eq!(state.wheel_contacts, 1);
        assert!(state.wheel_on_terrain());
    }

    #[test]
    fn unmatched_stop_saturates_at_zero() {
        let mut app = contact_test_app();
        let (root, torso) = spawn_part(&mut app, BodyRole::Torso);
        let ground = app.world_mut().spawn(SurfaceMaterial::Terrain).id();

        app.world_mut().write_message(stopped(torso, ground));
        app.update();
        assert_eq!(contacts(&app, root).torso_contacts, 0);

        app.world_mut().write_message(started(torso, ground));
        app.update();
        assert!(contacts(&app, root).torso_on_terrain());
    }

    #[test]
    fn rider_against_rider_is_not_terrain() {
        let mut app = contact_test_app();
        let (root_a, wheel_a) = spawn_part(&mut app, BodyRole::Wheel);
        let (root_b, torso_b) = spawn_part(&mut app, BodyRole::Torso);

        app.world_mut().write_message(started(wheel_a, torso_b));
        app.update();

        assert_eq!(contacts(&app, root_a), ContactState::default());
        assert_eq!(contacts(&app, root_b), ContactState::default());
    }

    #[test]
    fn contacts_route_to_the_owning_rider() {
        let mut app = contact_test_app();
        let (root_a, wheel_a) = spawn_part(&mut app, BodyRole::Wheel);
        let (root_b, _wheel_b) = spawn_part(&mut app, BodyRole::Wheel);
        let ground = app.world_mut().spawn(SurfaceMaterial::Terrain).id();

        app.world_mut().write_message(started(ground, wheel_a));
        app.update();

        assert!(contacts(&app, root_a).wheel_on_terrain());
        assert!(!contacts(&app, root_b).wheel_on_terrain());
    }
}
