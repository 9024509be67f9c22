//! Self-balancing unicycle rider library
//!
//! A ragdoll rider on a motorised unicycle, simulated with Rapier inside
//! Bevy.  A small control law keeps it upright, lets it fall and hoists it
//! back up, reacting to a directional intent and to ground contact.

pub mod balance;
pub mod config;
pub mod constants;
pub mod contact;
pub mod error;
pub mod history;
pub mod rider;
pub mod script;
pub mod step_loop;
pub mod surface;
