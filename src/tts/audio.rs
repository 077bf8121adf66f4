//! Audio assembly helpers

use std::io::Write;
use std::path::PathBuf;

use futures::{Stream, StreamExt};

use super::types::{SynthesizedAudio, TtsError};

/// Concatenate streamed audio chunks in arrival order
pub async fn collect_chunks<S, B, E>(stream: S) -> Result<Vec<u8>, TtsError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    futures::pin_mut!(stream);

    let mut audio = Vec::new();
    let mut chunks = 0usize;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| TtsError::Stream(e.to_string()))?;
        audio.extend_from_slice(chunk.as_ref());
        chunks += 1;
    }

    tracing::debug!(chunks, bytes = audio.len(), "Collected audio stream");
    Ok(audio)
}

/// Write `audio` to a fresh `tts_*.mp3` file in `dir` (system temp dir when `None`)
pub async fn write_temp_audio(
    audio: Vec<u8>,
    dir: Option<PathBuf>,
) -> Result<SynthesizedAudio, TtsError> {
    tokio::task::spawn_blocking(move || -> Result<SynthesizedAudio, TtsError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("tts_").suffix(".mp3");
        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| TtsError::TempFile(format!("Failed to create audio file: {}", e)))?;

        file.write_all(&audio)
            .and_then(|_| file.flush())
            .map_err(|e| TtsError::TempFile(format!("Failed to write audio file: {}", e)))?;

        Ok(SynthesizedAudio::new(file.into_temp_path(), audio.len() as u64))
    })
    .await
    .map_err(|e| TtsError::TempFile(format!("Audio writer task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_written_file_length_is_sum_of_chunks() {
        let chunks: Vec<Vec<u8>> = vec![vec![0xFF, 0xFB, 0x90], vec![], vec![7; 4096], vec![1, 2, 3, 4, 5]];
        let expected: Vec<u8> = chunks.concat();

        let audio = collect_chunks(stream::iter(
            chunks.into_iter().map(Ok::<_, std::io::Error>),
        ))
        .await
        .unwrap();
        assert_eq!(audio, expected);

        let dir = TempDir::new().unwrap();
        let synthesized = write_temp_audio(audio, Some(dir.path().to_path_buf()))
            .await
            .unwrap();

        let on_disk = std::fs::metadata(synthesized.path()).unwrap().len();
        assert_eq!(on_disk, expected.len() as u64);
        assert_eq!(synthesized.size(), expected.len() as u64);
        assert_eq!(synthesized.path().extension().unwrap(), "mp3");

        let bytes = synthesized.into_bytes().await.unwrap();
        assert_eq!(bytes, expected);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_stream_error_aborts_collection() {
        let items = vec![
            Ok(vec![1u8, 2]),
            Err("connection reset".to_string()),
            Ok(vec![3u8]),
        ];
        let result = collect_chunks(stream::iter(items)).await;
        assert!(matches!(result, Err(TtsError::Stream(msg)) if msg == "connection reset"));
    }

    #[tokio::test]
    async fn test_concurrent_files_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let a = write_temp_audio(vec![1], Some(dir.path().to_path_buf())).await.unwrap();
        let b = write_temp_audio(vec![2], Some(dir.path().to_path_buf())).await.unwrap();
        assert_ne!(a.path(), b.path());
    }
}
