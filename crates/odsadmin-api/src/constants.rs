//! API constants

/// Versioned prefix for every API route
pub const API_PREFIX: &str = "/api/v1";

/// Multipart field carrying the bulk load files
pub const BULK_FILES_FIELD: &str = "bulkFiles";

/// Room for multipart boundaries and headers on top of the file size limit
pub const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Body limit for the JSON endpoints
pub const JSON_BODY_LIMIT_BYTES: usize = 64 * 1024;
