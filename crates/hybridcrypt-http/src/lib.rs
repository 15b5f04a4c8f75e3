#![forbid(unsafe_code)]

//! `reqwest`-backed implementation of the HybridCrypt gateway contracts.

use async_trait::async_trait;
use hybridcrypt_contract::envelope::Ack;
use hybridcrypt_contract::{
    decode_envelope, CryptoGateway, DecryptionReceipt, EncryptionMode, EncryptionReceipt,
    GatewayError, GatewayResult, KeyExchange, KeyGeneration, PerformanceSnapshot,
    TelemetryGateway, UploadFile,
};
use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

const GENERATE_KEYS: &str = "generate_keys";
const KEY_EXCHANGE: &str = "key_exchange";
const ENCRYPT_FILE: &str = "encrypt_file";
const DECRYPT_FILE: &str = "decrypt_file";
const DOWNLOAD_FILE: &str = "download_file";
const PERFORMANCE: &str = "performance";
const RESET: &str = "reset";

/// Gateway speaking the service's JSON/multipart HTTP interface.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    base: Url,
    client: Client,
}

impl HttpGateway {
    /// Build a gateway rooted at `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> GatewayResult<Self> {
        let base = Url::parse(base_url.trim()).map_err(|err| {
            GatewayError::Transport(format!("invalid service URL `{base_url}`: {err}"))
        })?;
        if base.cannot_be_a_base() {
            return Err(GatewayError::Transport(format!(
                "service URL `{base_url}` cannot carry request paths"
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport)?;
        Ok(Self { base, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> GatewayResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::Transport(format!("invalid service URL {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, segment: &str) -> GatewayResult<T> {
        let url = self.endpoint(&[segment])?;
        debug!("GET {url}");
        let response = self.client.get(url).send().await.map_err(transport)?;
        read_envelope(response).await
    }

    async fn post_upload<T: DeserializeOwned>(
        &self,
        segment: &str,
        file: &UploadFile,
        mode: Option<EncryptionMode>,
    ) -> GatewayResult<T> {
        let bytes = tokio::fs::read(&file.path)
            .await
            .map_err(|err| GatewayError::File {
                path: file.path.display().to_string(),
                message: err.to_string(),
            })?;
        let part = Part::bytes(bytes).file_name(file.file_name.clone());
        let mut form = Form::new().part("file", part);
        if let Some(mode) = mode {
            form = form.text("mode", mode.as_str());
        }

        let url = self.endpoint(&[segment])?;
        debug!("POST {url} ({} bytes from {})", file.size, file.file_name);
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        read_envelope(response).await
    }
}

fn transport(err: reqwest::Error) -> GatewayError {
    GatewayError::Transport(err.to_string())
}

async fn read_envelope<T: DeserializeOwned>(response: Response) -> GatewayResult<T> {
    let status = response.status();
    let body = response.bytes().await.map_err(transport)?;
    if status.is_success() {
        return decode_envelope(&body);
    }

    // Non-2xx replies still count as rejections when they carry the usual envelope.
    match decode_envelope::<Value>(&body) {
        Err(GatewayError::Rejected(message)) => Err(GatewayError::Rejected(message)),
        _ => Err(GatewayError::Transport(format!("service answered HTTP {status}"))),
    }
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.contains("application/json"))
        .unwrap_or(false)
}

#[async_trait]
impl CryptoGateway for HttpGateway {
    async fn generate_keys(&self) -> GatewayResult<KeyGeneration> {
        self.get_json(GENERATE_KEYS).await
    }

    async fn exchange_keys(&self) -> GatewayResult<KeyExchange> {
        self.get_json(KEY_EXCHANGE).await
    }

    async fn encrypt_file(
        &self,
        file: &UploadFile,
        mode: EncryptionMode,
    ) -> GatewayResult<EncryptionReceipt> {
        self.post_upload(ENCRYPT_FILE, file, Some(mode)).await
    }

    async fn decrypt_file(&self, file: &UploadFile) -> GatewayResult<DecryptionReceipt> {
        self.post_upload(DECRYPT_FILE, file, None).await
    }

    async fn download_artifact(&self, filename: &str) -> GatewayResult<Vec<u8>> {
        let url = self.endpoint(&[DOWNLOAD_FILE, filename])?;
        debug!("GET {url}");
        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        let json = is_json(&response);
        let body = response.bytes().await.map_err(transport)?;
        if !status.is_success() {
            return Err(GatewayError::Transport(format!("service answered HTTP {status}")));
        }

        // Encrypted packages are JSON themselves; only an explicit `success: false`
        // marks a failed download.
        if json {
            if let Err(GatewayError::Rejected(message)) = decode_envelope::<Value>(&body) {
                return Err(GatewayError::Rejected(message));
            }
        }
        Ok(body.to_vec())
    }

    async fn reset(&self) -> GatewayResult<()> {
        let ack: Ack = self.get_json(RESET).await?;
        if let Some(message) = ack.message {
            debug!("reset acknowledged: {message}");
        }
        Ok(())
    }
}

#[async_trait]
impl TelemetryGateway for HttpGateway {
    async fn performance(&self) -> GatewayResult<PerformanceSnapshot> {
        self.get_json(PERFORMANCE).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    struct Canned {
        status: &'static str,
        content_type: &'static str,
        body: Vec<u8>,
    }

    fn json(body: &str) -> Canned {
        Canned {
            status: "200 OK",
            content_type: "application/json",
            body: body.as_bytes().to_vec(),
        }
    }

    /// Serve the canned replies in order and hand back the raw requests received.
    async fn serve(replies: Vec<Canned>) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let mut seen = Vec::new();
            for reply in replies {
                let (mut stream, _) = listener.accept().await.unwrap();
                seen.push(read_request(&mut stream).await);
                let head = format!(
                    "HTTP/1.1 {}\r\ncontent-type: {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                    reply.status,
                    reply.content_type,
                    reply.body.len()
                );
                stream.write_all(head.as_bytes()).await.unwrap();
                stream.write_all(&reply.body).await.unwrap();
                stream.shutdown().await.ok();
            }
            seen
        });
        (format!("http://{addr}"), handle)
    }

    async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 4096];
        let header_end = loop {
            let read = stream.read(&mut chunk).await.unwrap();
            if read == 0 {
                return String::from_utf8_lossy(&buffer).into_owned();
            }
            buffer.extend_from_slice(&chunk[..read]);
            if let Some(pos) = find(&buffer, b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buffer[..header_end]).to_ascii_lowercase();
        let chunked = head.contains("transfer-encoding: chunked");
        let length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok());

        loop {
            let body = &buffer[header_end..];
            let complete = match (length, chunked) {
                (Some(len), _) => body.len() >= len,
                (None, true) => find(body, b"0\r\n\r\n").is_some(),
                (None, false) => true,
            };
            if complete {
                break;
            }
            let read = stream.read(&mut chunk).await.unwrap();
            if read == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..read]);
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack
            .windows(needle.len())
            .position(|window| window == needle)
    }

    fn gateway(base: &str) -> HttpGateway {
        HttpGateway::new(base, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn generate_keys_decodes_reply() {
        let (base, server) = serve(vec![json(
            r#"{"success": true, "alice_public_key": "A", "bob_public_key": "B",
                "total_generation_time": 0.0123}"#,
        )])
        .await;

        let keys = gateway(&base).generate_keys().await.unwrap();
        assert_eq!(keys.alice_public_key, "A");
        assert!((keys.total_generation_time - 0.0123).abs() < 1e-12);

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("GET /generate_keys HTTP/1.1"));
    }

    #[tokio::test]
    async fn reset_rejection_is_surfaced() {
        let (base, server) = serve(vec![json(r#"{"success": false, "error": "locked"}"#)]).await;

        let err = gateway(&base).reset().await.unwrap_err();
        assert_eq!(err, GatewayError::Rejected("locked".into()));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn encrypt_uploads_file_and_mode() {
        let (base, server) = serve(vec![json(
            r#"{"success": true, "original_filename": "notes.txt", "original_size": 5,
                "encrypted_filename": "notes.txt.enc", "encrypted_size": 60,
                "algorithm": "AES-192-CBC", "size_increase": 55, "encryption_time": 0.001}"#,
        )])
        .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"hello")
            .unwrap();
        let upload = UploadFile::from_path(&path).unwrap();

        let receipt = gateway(&base)
            .encrypt_file(&upload, EncryptionMode::Cbc)
            .await
            .unwrap();
        assert_eq!(receipt.encrypted_filename, "notes.txt.enc");

        let request = &server.await.unwrap()[0];
        assert!(request.starts_with("POST /encrypt_file HTTP/1.1"));
        assert!(request.contains("filename=\"notes.txt\""));
        assert!(request.contains("name=\"mode\""));
        assert!(request.contains("cbc"));
        assert!(request.contains("hello"));
    }

    #[tokio::test]
    async fn download_distinguishes_rejection_from_payload() {
        let (base, server) = serve(vec![
            json(r#"{"success": false, "error": "File not found"}"#),
            json(r#"{"algorithm": "AES-192-GCM", "ciphertext": "00"}"#),
            Canned {
                status: "200 OK",
                content_type: "application/octet-stream",
                body: vec![1, 2, 3],
            },
        ])
        .await;
        let gateway = gateway(&base);

        let err = gateway.download_artifact("missing.enc").await.unwrap_err();
        assert_eq!(err, GatewayError::Rejected("File not found".into()));

        let package = gateway.download_artifact("report.json").await.unwrap();
        assert!(String::from_utf8(package).unwrap().contains("ciphertext"));

        let bytes = gateway.download_artifact("my file.bin").await.unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);

        let requests = server.await.unwrap();
        assert!(requests[2].starts_with("GET /download_file/my%20file.bin HTTP/1.1"));
    }

    #[tokio::test]
    async fn http_errors_without_envelope_are_transport_failures() {
        let (base, server) = serve(vec![Canned {
            status: "500 Internal Server Error",
            content_type: "text/html",
            body: b"<h1>boom</h1>".to_vec(),
        }])
        .await;

        let err = gateway(&base).exchange_keys().await.unwrap_err();
        assert!(err.is_transport());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = gateway(&format!("http://{addr}"))
            .performance()
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }

    #[test]
    fn endpoints_respect_base_path() {
        let gateway = gateway("http://localhost:5002/demo/");
        let url = gateway.endpoint(&[PERFORMANCE]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5002/demo/performance");
    }

    #[test]
    fn invalid_base_urls_are_rejected() {
        assert!(HttpGateway::new("not a url", Duration::from_secs(1)).is_err());
        assert!(HttpGateway::new("mailto:ops@example.com", Duration::from_secs(1)).is_err());
    }
}
