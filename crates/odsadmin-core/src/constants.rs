//! Shared constants

/// Largest bulk upload accepted, in bytes. A file of exactly this length is accepted.
pub const DEFAULT_BULK_UPLOAD_MAX_BYTES: u64 = 20_000_000;

/// API versions at or below this major version get serial bulk-load throttling.
pub const LEGACY_ODS_API_MAJOR_VERSION: u64 = 3;

/// Concurrent request budget for bulk loads against legacy ODS APIs.
pub const LEGACY_MAX_SIMULTANEOUS_REQUESTS: u32 = 1;

/// Concurrent request budget for bulk loads against current ODS APIs.
pub const DEFAULT_MAX_SIMULTANEOUS_REQUESTS: u32 = 20;

/// Name of the data model reported by the ODS API root document for the Ed-Fi standard.
pub const EDFI_DATA_MODEL_NAME: &str = "Ed-Fi";

/// User-facing messages. Clients match on these, keep them stable.
pub mod messages {
    pub const MULTIPLE_FILES_NOT_SUPPORTED: &str =
        "Currently, the bulk import process only supports a single file at a time";
    pub const UPLOAD_EXCEEDS_MAXIMUM_LIMIT: &str = "Upload exceeds maximum limit";
    pub const MISSING_BULK_LOAD_CREDENTIALS: &str = "Missing bulk load credentials";
    pub const NULL_SECRET_CONFIGURATION: &str = "ODS secret configuration can not be null";
    pub const CREDENTIALS_SAVED: &str = "Credentials successfully saved";
    pub const CREDENTIALS_RESET: &str = "Credentials successfully reset";
}
