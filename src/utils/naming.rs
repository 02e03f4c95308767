use chrono::Utc;
use rand::RngCore;

/// Length in bytes of the random token used for single-file uploads
pub const TOKEN_BYTES: usize = 12;

/// How a freshly stored file gets its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingScheme {
    /// `<24 hex chars>.<ext>`
    RandomToken { extension: String },
    /// `<unix nanos>.<ext>`
    Timestamp { extension: String },
}

impl NamingScheme {
    pub fn random_token(extension: impl Into<String>) -> Self {
        Self::RandomToken {
            extension: extension.into(),
        }
    }

    pub fn timestamp(extension: impl Into<String>) -> Self {
        Self::Timestamp {
            extension: extension.into(),
        }
    }

    /// Produces a candidate name. Every call yields a new candidate, so a
    /// caller that hits an existing file can simply ask again.
    pub fn next_name(&self) -> String {
        match self {
            Self::RandomToken { extension } => with_extension(random_token(TOKEN_BYTES), extension),
            Self::Timestamp { extension } => with_extension(timestamp_nanos().to_string(), extension),
        }
    }
}

/// `len` random bytes rendered as lowercase hex
pub fn random_token(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn timestamp_nanos() -> i64 {
    let now = Utc::now();
    // Out of range only after the year 2262
    now.timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1_000))
}

fn with_extension(stem: String, extension: &str) -> String {
    if extension.is_empty() {
        stem
    } else {
        format!("{}.{}", stem, extension.trim_start_matches('.'))
    }
}
