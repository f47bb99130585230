//! Core primitives shared by the agreement engine

pub mod epoch;
