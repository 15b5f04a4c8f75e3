//! Contract for the performance snapshot endpoint.
//!
//! Log entries are decoded into a tagged [`LogRecord`] once, at the contract
//! boundary. The service may tag entries explicitly through a `category` field;
//! entries without one are classified from their operation label.

use crate::GatewayResult;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Aggregate counters computed by the service.
///
/// The service answers `statistics: {}` before any operation ran, so every field
/// defaults to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceStatistics {
    pub total_operations: u64,
    pub key_generation_count: u64,
    pub key_exchange_count: u64,
    pub encryption_count: u64,
    pub decryption_count: u64,
    pub average_key_generation_time: f64,
    pub average_key_exchange_time: f64,
    pub average_encryption_time: f64,
    pub average_decryption_time: f64,
}

/// Operation family a log entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogCategory {
    KeyGeneration,
    KeyExchange,
    Encryption,
    Decryption,
    #[serde(other)]
    Unrecognized,
}

impl LogCategory {
    /// Classify an operation label such as `File Encryption (AES-192-GCM)`.
    pub fn from_label(label: &str) -> Self {
        if label.contains("Key Generation") {
            LogCategory::KeyGeneration
        } else if label.contains("Key Exchange") {
            LogCategory::KeyExchange
        } else if label.contains("Encryption") {
            LogCategory::Encryption
        } else if label.contains("Decryption") {
            LogCategory::Decryption
        } else {
            LogCategory::Unrecognized
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            LogCategory::KeyGeneration => "Key Generation",
            LogCategory::KeyExchange => "Key Exchange",
            LogCategory::Encryption => "Encryption",
            LogCategory::Decryption => "Decryption",
            LogCategory::Unrecognized => "Other",
        }
    }
}

/// Per-party timings recorded for key generation and key exchange.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyTiming {
    pub alice_time: f64,
    pub bob_time: f64,
    pub total_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncryptionTiming {
    pub encryption_time: f64,
    pub original_size: u64,
    #[serde(default)]
    pub encrypted_size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecryptionTiming {
    pub decryption_time: f64,
    #[serde(default)]
    pub original_encrypted_size: u64,
    pub decrypted_size: u64,
}

/// Category-specific payload of a log entry.
#[derive(Debug, Clone, PartialEq)]
pub enum LogRecord {
    KeyGeneration(KeyTiming),
    KeyExchange(KeyTiming),
    Encryption(EncryptionTiming),
    Decryption(DecryptionTiming),
    /// Raw fields of an entry whose category this client does not know.
    Unrecognized(Map<String, Value>),
}

impl LogRecord {
    pub fn category(&self) -> LogCategory {
        match self {
            LogRecord::KeyGeneration(_) => LogCategory::KeyGeneration,
            LogRecord::KeyExchange(_) => LogCategory::KeyExchange,
            LogRecord::Encryption(_) => LogCategory::Encryption,
            LogRecord::Decryption(_) => LogCategory::Decryption,
            LogRecord::Unrecognized(_) => LogCategory::Unrecognized,
        }
    }
}

/// Single performance log record, in the order the service returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLogEntry", into = "RawLogEntry")]
pub struct LogEntry {
    /// Human-readable operation label reported by the service.
    pub label: String,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
    pub record: LogRecord,
}

impl LogEntry {
    pub fn category(&self) -> LogCategory {
        self.record.category()
    }
}

#[derive(Serialize, Deserialize)]
struct RawLogEntry {
    operation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<LogCategory>,
    timestamp: f64,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

fn decode_fields<T: DeserializeOwned>(
    fields: Map<String, Value>,
    label: &str,
) -> Result<T, String> {
    serde_json::from_value(Value::Object(fields))
        .map_err(|err| format!("log entry `{label}`: {err}"))
}

fn encode_fields<T: Serialize>(payload: &T) -> Map<String, Value> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

impl TryFrom<RawLogEntry> for LogEntry {
    type Error = String;

    fn try_from(raw: RawLogEntry) -> Result<Self, Self::Error> {
        let RawLogEntry {
            operation,
            category,
            timestamp,
            fields,
        } = raw;
        let category = category.unwrap_or_else(|| LogCategory::from_label(&operation));

        let record = match category {
            LogCategory::KeyGeneration => {
                LogRecord::KeyGeneration(decode_fields(fields, &operation)?)
            }
            LogCategory::KeyExchange => LogRecord::KeyExchange(decode_fields(fields, &operation)?),
            LogCategory::Encryption => LogRecord::Encryption(decode_fields(fields, &operation)?),
            LogCategory::Decryption => LogRecord::Decryption(decode_fields(fields, &operation)?),
            LogCategory::Unrecognized => LogRecord::Unrecognized(fields),
        };

        Ok(LogEntry {
            label: operation,
            timestamp,
            record,
        })
    }
}

impl From<LogEntry> for RawLogEntry {
    fn from(entry: LogEntry) -> Self {
        let category = entry.record.category();
        let fields = match entry.record {
            LogRecord::KeyGeneration(timing) | LogRecord::KeyExchange(timing) => {
                encode_fields(&timing)
            }
            LogRecord::Encryption(timing) => encode_fields(&timing),
            LogRecord::Decryption(timing) => encode_fields(&timing),
            LogRecord::Unrecognized(fields) => fields,
        };

        RawLogEntry {
            operation: entry.label,
            category: Some(category),
            timestamp: entry.timestamp,
            fields,
        }
    }
}

/// Reply of `GET /performance`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    #[serde(default)]
    pub statistics: PerformanceStatistics,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
}

/// Source of aggregated performance statistics and the raw log list.
#[async_trait]
pub trait TelemetryGateway: Send + Sync {
    async fn performance(&self) -> GatewayResult<PerformanceSnapshot>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_map_to_categories() {
        assert_eq!(
            LogCategory::from_label("Key Generation"),
            LogCategory::KeyGeneration
        );
        assert_eq!(
            LogCategory::from_label("Key Exchange (ECDH + HKDF)"),
            LogCategory::KeyExchange
        );
        assert_eq!(
            LogCategory::from_label("File Encryption (AES-192-CBC)"),
            LogCategory::Encryption
        );
        assert_eq!(
            LogCategory::from_label("File Decryption"),
            LogCategory::Decryption
        );
        assert_eq!(
            LogCategory::from_label("Signature Check"),
            LogCategory::Unrecognized
        );
    }

    #[test]
    fn snapshot_decodes_service_payload_in_order() {
        let payload = r#"{
            "statistics": {"total_operations": 3, "key_generation_count": 1,
                           "key_exchange_count": 1, "encryption_count": 1, "decryption_count": 0},
            "logs": [
                {"operation": "Key Generation", "alice_time": 0.01, "bob_time": 0.02,
                 "total_time": 0.03, "timestamp": 1700000000.5},
                {"operation": "Key Exchange (ECDH + HKDF)", "alice_time": 0.1, "bob_time": 0.2,
                 "total_time": 0.3, "timestamp": 1700000001.0},
                {"operation": "File Encryption (AES-192-GCM)", "encryption_time": 0.004,
                 "original_size": 1024, "encrypted_size": 1100, "timestamp": 1700000002.0}
            ]
        }"#;

        let snapshot: PerformanceSnapshot = serde_json::from_str(payload).unwrap();
        assert_eq!(snapshot.statistics.total_operations, 3);
        let categories: Vec<_> = snapshot.logs.iter().map(LogEntry::category).collect();
        assert_eq!(
            categories,
            vec![
                LogCategory::KeyGeneration,
                LogCategory::KeyExchange,
                LogCategory::Encryption
            ]
        );
        match &snapshot.logs[2].record {
            LogRecord::Encryption(timing) => assert_eq!(timing.original_size, 1024),
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[test]
    fn explicit_category_overrides_label() {
        let entry: LogEntry = serde_json::from_str(
            r#"{"operation": "Bulk job", "category": "decryption", "decryption_time": 0.5,
                "decrypted_size": 12, "timestamp": 1.0}"#,
        )
        .unwrap();
        assert_eq!(entry.category(), LogCategory::Decryption);
    }

    #[test]
    fn unknown_entries_keep_their_fields() {
        let entry: LogEntry = serde_json::from_str(
            r#"{"operation": "Signature Check", "category": "signing", "elapsed": 2,
                "timestamp": 5.0}"#,
        )
        .unwrap();
        match &entry.record {
            LogRecord::Unrecognized(fields) => {
                assert_eq!(fields.get("elapsed"), Some(&Value::from(2)))
            }
            other => panic!("unexpected record {other:?}"),
        }

        let exported = serde_json::to_value(&entry).unwrap();
        assert_eq!(exported["operation"], "Signature Check");
        assert_eq!(exported["elapsed"], 2);
    }

    #[test]
    fn recognized_entries_require_their_fields() {
        let err = serde_json::from_str::<LogEntry>(
            r#"{"operation": "Key Generation", "timestamp": 1.0}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Key Generation"));
    }

    #[test]
    fn empty_statistics_default_to_zero() {
        let snapshot: PerformanceSnapshot =
            serde_json::from_str(r#"{"statistics": {}, "logs": []}"#).unwrap();
        assert_eq!(snapshot.statistics, PerformanceStatistics::default());
        assert!(snapshot.logs.is_empty());
    }
}
