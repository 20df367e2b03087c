// Path: crates/store/src/layout.rs
//! Blob key layout.
//!
//! Three prefixes share one flat namespace:
//!
//! - `investigators/<name>.json` — public record for `name`
//! - `investigations/<id>.<uploader>` — one copy per uploader
//! - `reports/<id>-<hostname>.<recipient>.zip.enc` and
//!   `reports/<id>-<hostname>.<recipient>.decrypt` — one pair per
//!   (investigation, host, recipient)
//!
//! A leading `_` on a basename marks the blob archived; list commands hide
//! archived blobs by default.

/// Prefix for investigation blobs.
pub const INVESTIGATIONS_PREFIX: &str = "investigations/";
/// Prefix for report blobs.
pub const REPORTS_PREFIX: &str = "reports/";
/// Prefix for investigator records.
pub const INVESTIGATORS_PREFIX: &str = "investigators/";

const ARCHIVE_MARKER: char = '_';
const ENCRYPTED_ZIP_SUFFIX: &str = ".zip.enc";
const DECRYPT_SUFFIX: &str = ".decrypt";

/// Key of the investigation copy uploaded by `uploader`.
pub fn investigation_key(id: &str, uploader: &str) -> String {
    format!("{INVESTIGATIONS_PREFIX}{id}.{uploader}")
}

/// Key of the public record for investigator `name`.
pub fn investigator_key(name: &str) -> String {
    format!("{INVESTIGATORS_PREFIX}{name}.json")
}

/// The basename of a key (everything after the last `/`).
pub fn basename(key: &str) -> &str {
    key.rsplit_once('/').map_or(key, |(_, base)| base)
}

/// True when the blob has been archived by prepending `_` to its basename.
pub fn is_archived(key: &str) -> bool {
    basename(key).starts_with(ARCHIVE_MARKER)
}

/// The archived form of a key: same prefix, `_` prepended to the basename.
pub fn archived_key(key: &str) -> String {
    match key.rsplit_once('/') {
        Some((dir, base)) => format!("{dir}/{ARCHIVE_MARKER}{base}"),
        None => format!("{ARCHIVE_MARKER}{key}"),
    }
}

/// Parse `investigations/<id>.<uploader>` into `(id, uploader)`, tolerating
/// the archive marker. Returns `None` for keys not shaped like an
/// investigation blob.
pub fn parse_investigation_key(key: &str) -> Option<(&str, &str)> {
    let base = basename(key.strip_prefix(INVESTIGATIONS_PREFIX)?);
    let base = base.strip_prefix(ARCHIVE_MARKER).unwrap_or(base);
    let (id, uploader) = base.split_once('.')?;
    if id.is_empty() || uploader.is_empty() {
        return None;
    }
    Some((id, uploader))
}

/// All the metadata contained in a report blob name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLocator {
    /// Investigation id.
    pub id: String,
    /// Host the report came from.
    pub hostname: String,
    /// Investigator the report is encrypted to.
    pub recipient: String,
}

impl ReportLocator {
    /// Key of the encrypted archive blob.
    pub fn encrypted_zip_key(&self) -> String {
        format!(
            "{REPORTS_PREFIX}{}-{}.{}{ENCRYPTED_ZIP_SUFFIX}",
            self.id, self.hostname, self.recipient
        )
    }

    /// Key of the decryption payload blob.
    pub fn decryption_payload_key(&self) -> String {
        format!(
            "{REPORTS_PREFIX}{}-{}.{}{DECRYPT_SUFFIX}",
            self.id, self.hostname, self.recipient
        )
    }

    /// Parse an encrypted-archive key back into its locator. The id never
    /// contains `-`, the recipient never contains `.`; the hostname may
    /// contain either, so it takes whatever is left in the middle.
    pub fn parse(key: &str) -> Option<Self> {
        let base = basename(key.strip_prefix(REPORTS_PREFIX)?);
        let base = base.strip_prefix(ARCHIVE_MARKER).unwrap_or(base);
        let stem = base.strip_suffix(ENCRYPTED_ZIP_SUFFIX)?;
        let (id, rest) = stem.split_once('-')?;
        let (hostname, recipient) = rest.rsplit_once('.')?;
        if id.is_empty() || hostname.is_empty() || recipient.is_empty() {
            return None;
        }
        Some(Self {
            id: id.to_string(),
            hostname: hostname.to_string(),
            recipient: recipient.to_string(),
        })
    }
}
