// Path: crates/engine/src/package.rs
//! Report packaging: zip, hybrid encryption, upload, retrieval.
//!
//! One zip per (investigation, host); one encryption per recipient. Every
//! recipient gets the same archive bytes under a fresh AES-128-GCM key and
//! nonce, with the key wrapped to their RSA public key. The pair of blobs
//! per recipient (`.zip.enc`, `.decrypt`) is everything retrieval needs.

use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use zip::write::FileOptions;

use dexter_api::ObjectStore;
use dexter_crypto::{bulk, wrap, RsaPrivateKey};
use dexter_store::layout::{self, ReportLocator};
use dexter_types::{DecryptionPayload, Investigation};

use crate::context::Daemon;
use crate::error::EngineError;

/// Build a zip of every file under `root`, paths relative to `root`.
pub fn zip_directory(root: &Path) -> Result<Vec<u8>, EngineError> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();

    let mut pending = vec![root.to_path_buf()];
    let mut files = Vec::new();
    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else {
                files.push(path);
            }
        }
    }
    files.sort();

    for path in files {
        let relative = path
            .strip_prefix(root)
            .map_err(|e| EngineError::Zip(e.to_string()))?
            .to_string_lossy()
            .into_owned();
        writer
            .start_file(relative, options)
            .map_err(|e| EngineError::Zip(e.to_string()))?;
        let contents = std::fs::read(&path)?;
        writer.write_all(&contents)?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| EngineError::Zip(e.to_string()))?;
    Ok(cursor.into_inner())
}

/// Unpack an archive under `dest`, skipping entries whose names escape it.
pub fn unzip_into(data: &[u8], dest: &Path) -> Result<(), EngineError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(data)).map_err(|e| EngineError::Zip(e.to_string()))?;
    for index in 0..archive.len() {
        let mut file = archive
            .by_index(index)
            .map_err(|e| EngineError::Zip(e.to_string()))?;
        if file.is_dir() {
            continue;
        }
        let Some(relative) = file.enclosed_name().map(Path::to_path_buf) else {
            tracing::error!(name = %file.name(), "skipping archive entry with unsafe path");
            continue;
        };
        let out = dest.join(relative);
        if let Some(dir) = out.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        std::fs::write(&out, contents)?;
    }
    Ok(())
}

/// Encrypt the report zip for one recipient: fresh key and nonce, wrapped
/// key in the returned payload, ciphertext written to the `.enc` path.
async fn encrypt_for_recipient(
    daemon: &Daemon,
    investigation: &Investigation,
    recipient: &str,
    zip_bytes: &[u8],
) -> Result<DecryptionPayload, EngineError> {
    let (key, nonce, ciphertext) = bulk::seal(zip_bytes)?;
    tokio::fs::write(investigation.report_zip_encrypted(), &ciphertext).await?;

    let recipient_key = daemon.registry.get_public_key(recipient).await?;
    let wrapped = wrap::wrap_key(&recipient_key, &key)?;

    Ok(DecryptionPayload {
        nonce,
        encrypted_data_encryption_key: wrapped,
    })
}

/// Package and publish the report: one blob pair per recipient. Failures
/// are per-recipient; the remaining recipients are still attempted.
pub async fn report(daemon: &Daemon, investigation: &Investigation) -> Result<(), EngineError> {
    tracing::info!(investigation = %investigation.id, "reporting investigation");

    let zip_bytes = zip_directory(&investigation.report_directory())?;
    tokio::fs::write(investigation.report_zip(), &zip_bytes).await?;

    let hostname = daemon.host.hostname().map_err(|e| {
        tracing::error!(error = %e, investigation = %investigation.id, "unable to retrieve hostname");
        EngineError::Io(std::io::Error::other(e.to_string()))
    })?;

    for recipient in &investigation.recipient_names {
        let payload =
            match encrypt_for_recipient(daemon, investigation, recipient, &zip_bytes).await {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::error!(
                        investigation = %investigation.id,
                        recipient = %recipient,
                        error = %e,
                        "unable to encrypt report for recipient"
                    );
                    continue;
                }
            };

        tracing::info!(
            investigation = %investigation.id,
            recipient = %recipient,
            "uploading report"
        );

        let locator = ReportLocator {
            id: investigation.id.clone(),
            hostname: hostname.clone(),
            recipient: recipient.clone(),
        };

        let ciphertext = match tokio::fs::read(investigation.report_zip_encrypted()).await {
            Ok(ciphertext) => ciphertext,
            Err(e) => {
                tracing::error!(
                    investigation = %investigation.id,
                    recipient = %recipient,
                    error = %e,
                    "error opening encrypted report for upload"
                );
                continue;
            }
        };
        if let Err(e) = daemon
            .store
            .put(&locator.encrypted_zip_key(), &ciphertext)
            .await
        {
            tracing::error!(
                investigation = %investigation.id,
                recipient = %recipient,
                error = %e,
                "unable to upload encrypted zip"
            );
            continue;
        }

        let payload_json = match serde_json::to_vec(&payload) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(
                    investigation = %investigation.id,
                    recipient = %recipient,
                    error = %e,
                    "unable to marshal decryption payload"
                );
                continue;
            }
        };
        if let Err(e) = daemon
            .store
            .put(&locator.decryption_payload_key(), &payload_json)
            .await
        {
            tracing::error!(
                investigation = %investigation.id,
                recipient = %recipient,
                error = %e,
                "unable to upload decryption payload"
            );
        }
    }
    Ok(())
}

/// Every report pair currently on the store, deduplicated by locator.
pub async fn report_files(
    store: &dyn ObjectStore,
    include_archived: bool,
) -> Result<Vec<ReportLocator>, EngineError> {
    let mut locators: Vec<ReportLocator> = Vec::new();
    for key in store.list(layout::REPORTS_PREFIX).await? {
        if !include_archived && layout::is_archived(&key) {
            continue;
        }
        let Some(locator) = ReportLocator::parse(&key) else {
            continue;
        };
        if !locators.contains(&locator) {
            locators.push(locator);
        }
    }
    Ok(locators)
}

/// Download and decrypt one report into
/// `<dest>/DexterReport-<id>/<hostname>/`, returning that directory.
pub async fn retrieve(
    store: &dyn ObjectStore,
    locator: &ReportLocator,
    private_key: &RsaPrivateKey,
    dest: &Path,
) -> Result<PathBuf, EngineError> {
    let payload_json = store.get(&locator.decryption_payload_key()).await?;
    let payload: DecryptionPayload = serde_json::from_slice(&payload_json)?;

    let ciphertext = store.get(&locator.encrypted_zip_key()).await?;
    let key = wrap::unwrap_key(private_key, &payload.encrypted_data_encryption_key)?;
    let zip_bytes = bulk::open(&key, &payload.nonce, &ciphertext)?;

    let out_dir = dest
        .join(format!("DexterReport-{}", locator.id))
        .join(&locator.hostname);
    tokio::fs::create_dir_all(&out_dir).await?;
    unzip_into(&zip_bytes, &out_dir)?;
    Ok(out_dir)
}
