// src/services/storage.rs

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use uuid::Uuid;

use crate::common::error::AppError;

// Armazenamento de mídia em disco: store(bytes) -> url, read(url) -> bytes.
// Os arquivos ficam em MEDIA_ROOT/<categoria>/<uuid>.<ext> e são servidos
// de volta em /media pelo ServeDir.
#[derive(Clone)]
pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn store(
        &self,
        kind: &str,
        filename_hint: &str,
        bytes: &[u8],
    ) -> Result<String, AppError> {
        let ext = extension_of(filename_hint).unwrap_or("bin");
        let file_name = format!("{}.{}", Uuid::new_v4(), ext);

        let dir = self.root.join(kind);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| anyhow::anyhow!("No se pudo crear el directorio de medios: {e}"))?;
        tokio::fs::write(dir.join(&file_name), bytes)
            .await
            .map_err(|e| anyhow::anyhow!("No se pudo guardar el archivo: {e}"))?;

        Ok(format!("/media/{kind}/{file_name}"))
    }

    // Assinaturas e fotos de perfil chegam como "data:image/png;base64,..."
    pub async fn store_data_uri(&self, kind: &str, data_uri: &str) -> Result<String, AppError> {
        let (mime, bytes) = decode_data_uri(data_uri)?;
        let ext = mime.split('/').nth(1).unwrap_or("bin");
        self.store(kind, &format!("upload.{ext}"), &bytes).await
    }

    pub async fn read_url(&self, url: &str) -> Result<Vec<u8>, AppError> {
        let relative = url
            .strip_prefix("/media/")
            .ok_or_else(|| anyhow::anyhow!("URL de medios fuera del almacenamiento: {url}"))?;

        // Nada de escapar do diretório raiz
        if relative.split('/').any(|part| part == ".." || part.is_empty()) {
            return Err(anyhow::anyhow!("URL de medios inválida: {url}").into());
        }

        let bytes = tokio::fs::read(self.root.join(relative))
            .await
            .map_err(|e| anyhow::anyhow!("No se pudo leer el archivo '{url}': {e}"))?;

        Ok(bytes)
    }
}

fn extension_of(filename: &str) -> Option<&str> {
    Path::new(filename).extension().and_then(|ext| ext.to_str())
}

// Divide "data:<mime>;base64,<payload>" em (mime, bytes)
pub fn decode_data_uri(data_uri: &str) -> Result<(String, Vec<u8>), AppError> {
    let rest = data_uri
        .strip_prefix("data:")
        .ok_or_else(|| AppError::validation("La imagen adjunta no es un data-URI válido."))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| AppError::validation("La imagen adjunta no es un data-URI válido."))?;

    if !header.ends_with(";base64") {
        return Err(AppError::validation(
            "La imagen adjunta debe estar codificada en base64.",
        ));
    }
    let mime = header.trim_end_matches(";base64").to_string();

    let bytes = BASE64
        .decode(payload.trim())
        .map_err(|_| AppError::validation("La imagen adjunta tiene base64 inválido."))?;

    Ok((mime, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_data_uri_splits_mime_and_payload() {
        let (mime, bytes) = decode_data_uri("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn decode_data_uri_rejects_plain_strings() {
        assert!(decode_data_uri("hello").is_err());
        assert!(decode_data_uri("data:image/png,sin-base64").is_err());
        assert!(decode_data_uri("data:image/png;base64,%%%").is_err());
    }
}
