use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Ciphertext blob is not valid base64: {0}")]
    BlobEncoding(#[from] base64::DecodeError),

    #[error("Ciphertext blob is shorter than the {0}-byte IV")]
    BlobTruncated(usize),

    #[error("Decryption failed: invalid padding (wrong key or corrupted ciphertext)")]
    InvalidPadding,

    #[error("Decrypted secret is not valid UTF-8")]
    InvalidPlaintext,
}
