// SPDX-License-Identifier: MPL-2.0

//! Non-public internal modules.

mod arena;
mod core;
mod incompatibility;
mod partial_solution;

pub(crate) use self::arena::{Arena, Id};
pub(crate) use self::core::{CoreError, State};
pub(crate) use self::incompatibility::Incompatibility;
