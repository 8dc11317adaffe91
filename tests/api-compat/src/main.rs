fn main() {
    println!("Run `cargo test -p api-compat` to execute API payload shape tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    /// Normalizes JSON values so that integer-valued floats compare equal.
    fn normalize_value(v: &serde_json::Value) -> serde_json::Value {
        match v {
            serde_json::Value::Number(n) => {
                if let Some(f) = n.as_f64() {
                    serde_json::json!(f)
                } else {
                    v.clone()
                }
            }
            serde_json::Value::Object(map) => {
                let normalized: serde_json::Map<String, serde_json::Value> = map
                    .iter()
                    .map(|(k, v)| (k.clone(), normalize_value(v)))
                    .collect();
                serde_json::Value::Object(normalized)
            }
            serde_json::Value::Array(arr) => {
                serde_json::Value::Array(arr.iter().map(normalize_value).collect())
            }
            _ => v.clone(),
        }
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and compares
    /// the JSON values (order-independent, float-normalized comparison).
    ///
    /// A mismatch means the Rust types drifted from the payload shapes the
    /// storage front-end fixes.
    fn roundtrip_test<T>(name: &str)
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));

        let norm_fixture = normalize_value(&fixture);
        let norm_reserialized = normalize_value(&reserialized);
        assert_eq!(
            norm_fixture, norm_reserialized,
            "roundtrip mismatch for {name}:\n  fixture: {fixture}\n  rust:    {reserialized}"
        );
    }

    // --- Evidence API payloads ---

    #[test]
    fn fixture_init_evidence_request() {
        roundtrip_test::<auditorbit_protocol::InitEvidenceRequest>("init_evidence_request.json");
    }

    #[test]
    fn fixture_init_evidence_response() {
        roundtrip_test::<auditorbit_protocol::InitEvidenceResponse>("init_evidence_response.json");
    }

    #[test]
    fn fixture_confirm_evidence_request() {
        roundtrip_test::<auditorbit_protocol::ConfirmEvidenceRequest>(
            "confirm_evidence_request.json",
        );
    }

    #[test]
    fn fixture_evidence_record() {
        roundtrip_test::<auditorbit_protocol::EvidenceRecord>("evidence_record.json");
    }

    #[test]
    fn fixture_download_link() {
        roundtrip_test::<auditorbit_protocol::DownloadLink>("download_link.json");
    }

    // --- UI boundary snapshots ---

    #[test]
    fn fixture_file_meta() {
        roundtrip_test::<auditorbit_protocol::FileMeta>("file_meta.json");
    }

    #[test]
    fn fixture_destination() {
        roundtrip_test::<auditorbit_protocol::Destination>("destination.json");
    }

    #[test]
    fn fixture_upload_progress() {
        roundtrip_test::<auditorbit_protocol::UploadProgress>("upload_progress.json");
    }
}
