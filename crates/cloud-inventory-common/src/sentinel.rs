//! Placeholder values for missing or failed data
//!
//! Collectors never leave a failed field blank: the cell carries one of
//! these so the report reader can tell "unknown" from "empty".

/// Field could not be retrieved, or the resource has no such setting
pub const NOT_AVAILABLE: &str = "N/A";

/// Explicitly nothing (e.g. a KMS key with no aliases)
pub const NONE: &str = "None";

/// Placeholder for an ECS cluster that runs no services
pub const NO_SERVICES: &str = "N/A (No services running)";

/// Task definition has no container definitions
pub const IMAGE_NOT_FOUND: &str = "Image not found";

/// Task definition lookup failed
pub const IMAGE_LOOKUP_FAILED: &str = "Error fetching image";

/// Serialized form of a bucket without a policy
pub const EMPTY_POLICY: &str = "{}";
