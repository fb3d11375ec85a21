//! SigV4 query presigning for S3-compatible storage.
//!
//! Issues time-limited PUT URLs so clients upload CVs directly to the
//! bucket; the server never proxies file bytes.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use super::UploadError;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";

#[derive(Debug, Clone)]
pub struct PresignedUpload {
    pub url: String,
    pub key: String,
    pub expires_in_secs: u64,
}

pub struct Presigner {
    cfg: configs::StorageConfig,
}

impl Presigner {
    pub fn new(cfg: configs::StorageConfig) -> Self { Self { cfg } }

    pub fn max_upload_bytes(&self) -> u64 { self.cfg.max_upload_bytes }

    /// Presign a PUT for `key`, valid from `now` for the configured expiry.
    pub fn presign_put(&self, key: &str, now: DateTime<Utc>) -> Result<PresignedUpload, UploadError> {
        if !self.cfg.is_configured() {
            return Err(UploadError::NotConfigured);
        }
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let datestamp = now.format("%Y%m%d").to_string();
        let scope = format!("{datestamp}/{}/{SERVICE}/aws4_request", self.cfg.region);
        let credential = format!("{}/{scope}", self.cfg.access_key_id);
        let expires = self.cfg.presign_expiry_secs;

        let host = self.cfg.endpoint
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        // Path-style addressing: works for MinIO and AWS alike.
        let canonical_uri = format!("/{}/{}", self.cfg.bucket, uri_encode(key, false));

        let mut query: Vec<(String, String)> = vec![
            ("X-Amz-Algorithm".into(), ALGORITHM.into()),
            ("X-Amz-Credential".into(), uri_encode(&credential, true)),
            ("X-Amz-Date".into(), amz_date.clone()),
            ("X-Amz-Expires".into(), expires.to_string()),
            ("X-Amz-SignedHeaders".into(), "host".into()),
        ];
        query.sort();
        let canonical_query = query
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let canonical_request = format!(
            "PUT\n{canonical_uri}\n{canonical_query}\nhost:{host}\n\nhost\nUNSIGNED-PAYLOAD"
        );
        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            to_hex(&Sha256::digest(canonical_request.as_bytes()))
        );

        let signing_key = self.signing_key(&datestamp);
        let signature = to_hex(&hmac(&signing_key, string_to_sign.as_bytes()));

        let scheme = if self.cfg.endpoint.starts_with("http://") { "http" } else { "https" };
        let url = format!(
            "{scheme}://{host}{canonical_uri}?{canonical_query}&X-Amz-Signature={signature}"
        );
        Ok(PresignedUpload { url, key: key.to_string(), expires_in_secs: expires })
    }

    fn signing_key(&self, datestamp: &str) -> Vec<u8> {
        let k_date = hmac(format!("AWS4{}", self.cfg.secret_access_key).as_bytes(), datestamp.as_bytes());
        let k_region = hmac(&k_date, self.cfg.region.as_bytes());
        let k_service = hmac(&k_region, SERVICE.as_bytes());
        hmac(&k_service, b"aws4_request")
    }
}

fn hmac(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("hmac accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// SigV4 URI encoding: unreserved characters pass through; `/` only when
/// encoding a path.
fn uri_encode(input: &str, encode_slash: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for b in input.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => out.push(b as char),
            b'/' if !encode_slash => out.push('/'),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}
