//! UI module root: exposes drawing functions for individual panels.

pub mod chart;
pub mod header;
pub mod net;
pub mod server;
pub mod theme;
pub mod util;
pub mod vms;
