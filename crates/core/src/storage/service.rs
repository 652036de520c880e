//! Upload storage backed by Apache OpenDAL.

use opendal::{ErrorKind, Operator, services};
use uuid::Uuid;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// Storage service for flow/chart uploads.
pub struct StorageService {
    operator: Operator,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator })
    }

    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
        }
    }

    /// Storage key for an upload.
    #[must_use]
    pub fn upload_key(user_id: Uuid, upload_id: Uuid, filename: &str) -> String {
        // filenames come from browsers; keep only a safe basename
        let safe: String = filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or("upload")
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("flow/{user_id}/{upload_id}/{safe}")
    }

    /// Writes upload bytes and returns the storage key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the write fails.
    pub async fn store_upload(
        &self,
        user_id: Uuid,
        upload_id: Uuid,
        filename: &str,
        data: Vec<u8>,
    ) -> Result<String, StorageError> {
        let key = Self::upload_key(user_id, upload_id, filename);
        self.operator
            .write(&key, data)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(key)
    }

    /// Reads an upload back by storage key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the key is absent.
    pub async fn fetch_upload(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        match self.operator.read(key).await {
            Ok(buffer) => Ok(buffer.to_vec()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_key_layout() {
        let user = Uuid::nil();
        let upload = Uuid::nil();
        let key = StorageService::upload_key(user, upload, "flow.csv");
        assert_eq!(
            key,
            format!("flow/{user}/{upload}/flow.csv")
        );
    }

    #[test]
    fn test_upload_key_sanitizes_filename() {
        let key = StorageService::upload_key(Uuid::nil(), Uuid::nil(), "../../etc/pass wd.csv");
        assert!(key.ends_with("/pass_wd.csv"));
        assert!(!key.contains(".."));
    }

    #[tokio::test]
    async fn test_local_fs_round_trip() {
        let dir = std::env::temp_dir().join(format!("tradelog-storage-{}", Uuid::new_v4()));
        let service = StorageService::from_config(&StorageConfig {
            provider: StorageProvider::local_fs(&dir),
        })
        .unwrap();

        let key = service
            .store_upload(Uuid::new_v4(), Uuid::new_v4(), "flow.csv", b"a,b\n1,2".to_vec())
            .await
            .unwrap();

        let bytes = service.fetch_upload(&key).await.unwrap();
        assert_eq!(bytes, b"a,b\n1,2");

        let missing = StorageService::upload_key(Uuid::new_v4(), Uuid::new_v4(), "gone.csv");
        assert!(matches!(
            service.fetch_upload(&missing).await,
            Err(StorageError::NotFound(_))
        ));
    }
}
