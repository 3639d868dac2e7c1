pub mod engine;

pub use engine::{DependencyResolver, DependencyTarget, Resolution, package_edges};
