//! Tests for catalog module

use super::*;
use crate::types::SyncMode;
use serde_json::json;
use test_case::test_case;

fn messages_stream() -> CatalogStream {
    CatalogStream {
        name: "channel_messages".to_string(),
        json_schema: json!({"type": "object"}),
        supported_sync_modes: vec![SyncMode::FullRefresh, SyncMode::Incremental],
        source_defined_cursor: true,
        default_cursor_field: vec!["ts".to_string()],
        source_defined_primary_key: vec![vec!["channel_id".to_string()], vec!["ts".to_string()]],
    }
}

// ============================================================================
// Path Resolution Tests
// ============================================================================

#[test_case(&[], None ; "empty path")]
#[test_case(&["ts"], Some("ts") ; "top level")]
fn test_resolve_top_level(path: &[&str], expected: Option<&str>) {
    let path: Vec<String> = path.iter().map(ToString::to_string).collect();
    let resolved = resolve_top_level("s", "cursor field", &path).unwrap();
    assert_eq!(resolved, expected);
}

#[test]
fn test_resolve_nested_path_fails() {
    let path = vec!["data".to_string(), "updated_at".to_string()];
    let err = resolve_top_level("users", "cursor field", &path).unwrap_err();
    assert!(err.is_config());
    assert!(err.to_string().contains("users"));
    assert!(err.to_string().contains("cursor field"));
}

#[test]
fn test_configured_stream_inherits_defaults() {
    let configured = ConfiguredStream::new(messages_stream(), SyncMode::Incremental);
    assert_eq!(configured.name(), "channel_messages");
    assert_eq!(configured.cursor_field_name().unwrap(), Some("ts"));
    assert_eq!(
        configured.primary_key_fields().unwrap(),
        vec!["channel_id", "ts"]
    );
    assert!(configured.state_checkpoint_interval.is_none());
}

#[test]
fn test_configured_stream_nested_primary_key_fails() {
    let configured = ConfiguredStream::new(messages_stream(), SyncMode::FullRefresh)
        .with_primary_key(vec![vec!["user".to_string(), "id".to_string()]]);
    let err = configured.primary_key_fields().unwrap_err();
    assert!(matches!(err, crate::Error::NestedFieldPath { kind: "primary key", .. }));
}

// ============================================================================
// Catalog Helpers
// ============================================================================

#[test]
fn test_from_catalog_falls_back_to_full_refresh() {
    let catalog = Catalog {
        streams: vec![
            CatalogStream::new("channels", json!({})),
            messages_stream(),
        ],
    };

    let configured = ConfiguredCatalog::from_catalog(&catalog, SyncMode::Incremental);
    assert_eq!(configured.stream_names(), vec!["channels", "channel_messages"]);
    assert_eq!(configured.streams[0].sync_mode, SyncMode::FullRefresh);
    assert_eq!(configured.streams[1].sync_mode, SyncMode::Incremental);

    let incremental = configured.incremental_only();
    assert_eq!(incremental.stream_names(), vec!["channel_messages"]);
}

#[test]
fn test_catalog_get() {
    let catalog = Catalog {
        streams: vec![messages_stream()],
    };
    assert!(catalog.get("channel_messages").is_some());
    assert!(catalog.get("users").is_none());
}

#[test]
fn test_configured_catalog_deserialize() {
    let catalog: ConfiguredCatalog = serde_json::from_value(json!({
        "streams": [{
            "stream": {
                "name": "users",
                "json_schema": {},
                "supported_sync_modes": ["full_refresh", "incremental"]
            },
            "sync_mode": "incremental",
            "destination_sync_mode": "append",
            "cursor_field": ["updated"],
            "primary_key": [["id"]],
            "state_checkpoint_interval": 50
        }]
    }))
    .unwrap();

    let stream = &catalog.streams[0];
    assert_eq!(stream.sync_mode, SyncMode::Incremental);
    assert_eq!(stream.cursor_field_name().unwrap(), Some("updated"));
    assert_eq!(stream.state_checkpoint_interval, Some(50));
    assert!(!stream.stream.source_defined_cursor);
}
