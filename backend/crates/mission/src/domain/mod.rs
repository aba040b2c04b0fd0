//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Mission, Submission, Reward, Redemption)
//! - Value objects (GeoPoint, MissionGeofence, Points, SubmissionStatus)
//! - Domain services (haversine distance, geofence eligibility)
//! - The device location seam
//! - Repository traits (interfaces)

pub mod entities;
pub mod location;
pub mod repository;
pub mod services;
pub mod value_objects;
