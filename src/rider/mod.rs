//! The rider: skeleton blueprint, spawning, and per-rider components.
//!
//! ## Bodies
//!
//! | Body | Mass share | Shapes |
//! |------|-----------|--------|
//! | wheel | ½ unicycle | tyre circle |
//! | shaft | ½ unicycle | fork, seat, pelvis |
//! | torso | 0.50 rider | belly, chest |
//! | legTop ×2 | 0.07 rider | thigh, knee |
//! | legBottom ×2 | 0.09 rider | shin, shoe, heel, pedal |
//! | armTop ×2 | 0.025 rider | upper arm |
//! | armBottom ×2 | 0.025 rider | elbow, hand, forearm |
//! | head | 0.07 rider | head, neck |
//! | hat | 0.01 rider | crown, brim |
//!
//! The joint table lives in [`blueprint`].

pub mod blueprint;
pub mod spawn;
pub mod state;

pub use blueprint::SkeletonBlueprint;
pub use spawn::{spawn_blueprint, spawn_rider};
pub use state::{
    BodyRole, Direction, JointRole, LimbBodies, Rider, RiderControl, RiderPart, Side, Skeleton,
    WheelMotor,
};
