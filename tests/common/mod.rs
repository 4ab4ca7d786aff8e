#![allow(dead_code)]

use std::collections::BTreeMap;

use serde_json::{json, Value};

use tabula::state::data_model::Row;

pub fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map.into_iter().collect(),
        _ => BTreeMap::new(),
    }
}

pub fn songs() -> Vec<Row> {
    vec![
        row(json!({
            "title": "Hello", "artist": "Sola", "status": "draft",
            "streams": 120, "genres": ["pop"], "released": "2024-01-10"
        })),
        row(json!({
            "title": "Afterglow", "artist": "The Lanterns", "status": "released",
            "streams": 9800, "genres": ["indie", "folk"], "released": "2023-06-01"
        })),
        row(json!({
            "title": "Night Drive", "artist": "Sola", "status": "scheduled",
            "streams": 450, "genres": ["electronic"], "released": "2024-05-20"
        })),
        row(json!({
            "title": "Paper Boats", "artist": "Kid Meridian", "status": "released",
            "streams": 3100, "genres": ["hip-hop", "pop"], "released": "2022-11-15"
        })),
        row(json!({"title": "Echoes", "artist": "The Lanterns", "status": "draft", "genres": []})),
    ]
}

pub fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}
