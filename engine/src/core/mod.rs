//! Core time math shared by the queue, predictor, and coordinator.

pub mod time;
