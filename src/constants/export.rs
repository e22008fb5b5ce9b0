/// Record count at or above which exports leave the request path and run as
/// queued jobs. Overridable via `EXPORT_STREAM_THRESHOLD`.
pub const DEFAULT_EXPORT_THRESHOLD: usize = 1000;

/// Column headers of the applicant export, in output order.
pub const APPLICANT_EXPORT_HEADERS: [&str; 6] =
    ["Name", "Email", "RollNumber", "Status", "Notes", "AppliedAt"];
