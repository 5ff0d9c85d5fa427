//! Local content-addressed object storage for uploaded documents.
//!
//! Each object is stored under its SHA-256 hex digest, so uploading the same
//! bytes twice yields the same key and a single file. The media type lives
//! in a `<key>.type` sidecar next to the data; the first upload of an object
//! sets it and later uploads of the same bytes keep it.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::fs;
use uuid::Uuid;

use crate::error::{Error, Result};

const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// What an upload returns: where the object lives and how to fetch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
  pub key:          String,
  pub content_hash: String,
  pub url:          String,
  pub size:         u64,
  pub media_type:   String,
}

/// An object read back from storage.
#[derive(Debug, Clone)]
pub struct Blob {
  pub bytes:      Bytes,
  pub media_type: String,
}

#[derive(Debug, Clone)]
pub struct BlobStore {
  root:       PathBuf,
  public_url: String,
}

/// Hex SHA-256 of `bytes`.
pub fn key_for(bytes: &[u8]) -> String { hex::encode(Sha256::digest(bytes)) }

/// Keys are lowercase hex digests; anything else could escape the root.
fn check_key(key: &str) -> Result<()> {
  let ok = key.len() == 64
    && key
      .bytes()
      .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
  if ok {
    Ok(())
  } else {
    Err(Error::BadRequest(format!("malformed object key {key:?}")))
  }
}

impl BlobStore {
  /// Open (creating if needed) the storage directory.
  pub async fn open(root: impl AsRef<Path>, public_url: &str) -> Result<Self> {
    let root = root.as_ref().to_path_buf();
    fs::create_dir_all(&root).await?;
    Ok(Self {
      root,
      public_url: public_url.trim_end_matches('/').to_string(),
    })
  }

  fn data_path(&self, key: &str) -> PathBuf { self.root.join(key) }

  fn type_path(&self, key: &str) -> PathBuf { self.root.join(format!("{key}.type")) }

  pub fn url_for(&self, key: &str) -> String { format!("{}/files/{key}", self.public_url) }

  pub async fn upload(&self, bytes: Bytes, media_type: &str) -> Result<StoredObject> {
    let key = key_for(&bytes);
    let requested = match media_type.trim() {
      "" => DEFAULT_MEDIA_TYPE,
      m => m,
    };

    let path = self.data_path(&key);
    if fs::try_exists(&path).await? {
      tracing::debug!(%key, "object already stored");
    } else {
      self.claim_media_type(&key, requested).await?;
      // Write then rename so readers never see a partial object. Each upload
      // gets its own temp file; racing renames of identical bytes all land.
      let tmp = self.root.join(format!("{key}.{}.partial", Uuid::new_v4()));
      fs::write(&tmp, &bytes).await?;
      if let Err(e) = fs::rename(&tmp, &path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
      }
    }
    let media_type = self
      .media_type_of(&key)
      .await
      .unwrap_or_else(|| requested.to_string());

    tracing::info!(%key, size = bytes.len(), %media_type, "stored object");
    Ok(StoredObject {
      content_hash: format!("sha256:{key}"),
      url: self.url_for(&key),
      size: bytes.len() as u64,
      media_type,
      key,
    })
  }

  /// Write the media type sidecar unless another upload already has. The
  /// sidecar appears complete or not at all: it is linked into place from a
  /// private temp file.
  async fn claim_media_type(&self, key: &str, media_type: &str) -> Result<()> {
    let tmp = self.root.join(format!("{key}.{}.type.partial", Uuid::new_v4()));
    fs::write(&tmp, media_type).await?;
    let linked = fs::hard_link(&tmp, self.type_path(key)).await;
    let _ = fs::remove_file(&tmp).await;
    match linked {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
      Err(e) => Err(e.into()),
    }
  }

  async fn media_type_of(&self, key: &str) -> Option<String> {
    let raw = fs::read_to_string(self.type_path(key)).await.ok()?;
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
  }

  pub async fn read(&self, key: &str) -> Result<Option<Blob>> {
    check_key(key)?;
    let bytes = match fs::read(self.data_path(key)).await {
      Ok(b) => Bytes::from(b),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(e.into()),
    };
    let media_type = self
      .media_type_of(key)
      .await
      .unwrap_or_else(|| DEFAULT_MEDIA_TYPE.to_string());
    Ok(Some(Blob { bytes, media_type }))
  }

  /// Returns `false` if there was nothing to delete.
  pub async fn delete(&self, key: &str) -> Result<bool> {
    check_key(key)?;
    match fs::remove_file(self.data_path(key)).await {
      Ok(()) => {}
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
      Err(e) => return Err(e.into()),
    }
    if let Err(e) = fs::remove_file(self.type_path(key)).await {
      tracing::debug!(%key, error = %e, "no media type sidecar to remove");
    }
    tracing::info!(%key, "deleted object");
    Ok(true)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  async fn temp_store() -> BlobStore {
    let dir = std::env::temp_dir().join(format!("slfdesk-blobs-{}", uuid::Uuid::new_v4()));
    BlobStore::open(dir, "http://localhost:8080/").await.unwrap()
  }

  #[test]
  fn key_is_sha256_hex() {
    assert_eq!(
      key_for(b""),
      "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
  }

  #[test]
  fn path_like_keys_are_rejected() {
    assert!(check_key("../../etc/passwd").is_err());
    assert!(check_key(&"A".repeat(64)).is_err());
    assert!(check_key(&key_for(b"x")).is_ok());
  }

  #[tokio::test]
  async fn upload_read_delete() {
    let store = temp_store().await;
    let obj = store
      .upload(Bytes::from_static(b"%PDF-1.7 denah"), "application/pdf")
      .await
      .unwrap();
    assert_eq!(obj.size, 14);
    assert_eq!(obj.content_hash, format!("sha256:{}", obj.key));
    assert_eq!(obj.url, format!("http://localhost:8080/files/{}", obj.key));

    let blob = store.read(&obj.key).await.unwrap().unwrap();
    assert_eq!(&blob.bytes[..], b"%PDF-1.7 denah");
    assert_eq!(blob.media_type, "application/pdf");

    assert!(store.delete(&obj.key).await.unwrap());
    assert!(!store.delete(&obj.key).await.unwrap());
    assert!(store.read(&obj.key).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn same_bytes_same_key() {
    let store = temp_store().await;
    let a = store.upload(Bytes::from_static(b"foto"), "image/jpeg").await.unwrap();
    let b = store.upload(Bytes::from_static(b"foto"), "").await.unwrap();
    assert_eq!(a.key, b.key);
    assert_eq!(b.media_type, "image/jpeg");

    let c = store.upload(Bytes::from_static(b"foto"), "text/plain").await.unwrap();
    assert_eq!(c.media_type, "image/jpeg");
    let blob = store.read(&a.key).await.unwrap().unwrap();
    assert_eq!(blob.media_type, "image/jpeg");
  }

  #[tokio::test]
  async fn blank_media_type_defaults() {
    let store = temp_store().await;
    let obj = store.upload(Bytes::from_static(b"data"), "  ").await.unwrap();
    assert_eq!(obj.media_type, DEFAULT_MEDIA_TYPE);
  }

  #[tokio::test]
  async fn concurrent_uploads_of_same_bytes_both_succeed() {
    let store = temp_store().await;
    let payload = Bytes::from(vec![7u8; 64 * 1024]);

    let uploads = (0..8).map(|i| {
      let store = store.clone();
      let payload = payload.clone();
      let media_type = if i % 2 == 0 { "application/pdf" } else { "image/png" };
      tokio::spawn(async move { store.upload(payload, media_type).await })
    });
    let mut stored = Vec::new();
    for handle in uploads.collect::<Vec<_>>() {
      stored.push(handle.await.unwrap().unwrap());
    }

    let first = &stored[0];
    assert!(stored.iter().all(|o| o.key == first.key));
    assert!(stored.iter().all(|o| o.media_type == first.media_type));

    let blob = store.read(&first.key).await.unwrap().unwrap();
    assert_eq!(blob.bytes, payload);

    let mut entries = fs::read_dir(&store.root).await.unwrap();
    while let Some(entry) = entries.next_entry().await.unwrap() {
      let name = entry.file_name().to_string_lossy().into_owned();
      assert!(!name.ends_with(".partial"), "left behind {name}");
    }
  }
}
