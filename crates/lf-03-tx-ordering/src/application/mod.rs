//! Application layer: the ordering service and the online learner.

pub mod learner;
pub mod service;

pub use learner::OnlineLearner;
pub use service::OrderingService;
