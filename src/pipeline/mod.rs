// Pipeline modes — train, pull, and the online/offline test modes.

pub mod classify;
pub mod pull;
pub mod train;
