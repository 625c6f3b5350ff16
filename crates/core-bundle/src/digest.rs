/*!
 * SHA-256 digests for manifests, upload files and XML documents
 */

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Hex-encoded SHA-256 of a file, streamed in 64KB blocks
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024]; // 64KB buffer

    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Hex-encoded SHA-256 of in-memory bytes
pub fn sha256_bytes(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_bytes_digest() {
        // SHA256 of "hello world"
        assert_eq!(
            sha256_bytes(b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_file_digest_matches_bytes_digest() {
        let mut temp = NamedTempFile::new().unwrap();
        let data = vec![b'A'; 200 * 1024];
        temp.write_all(&data).unwrap();
        temp.flush().unwrap();

        assert_eq!(sha256_file(temp.path()).unwrap(), sha256_bytes(&data));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(sha256_file(&dir.path().join("absent")).is_err());
    }
}
