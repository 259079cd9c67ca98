//! Testing utilities for the egg pool workspace
//!
//! Shared fixtures, scripted providers, and in-process fake HTTP backends.

#![allow(missing_docs)]

mod contents_api;
mod pokeapi;
mod racing;
mod scripted;

pub use contents_api::FakeContentsApi;
pub use pokeapi::FakePokeApi;
pub use racing::RacingStore;
pub use scripted::{ScriptedLists, ScriptedLookup};

use chrono::{DateTime, TimeZone, Utc};
use pool_model::{Document, EntityMatch, Record, StoredRecord};
use serde_json::{json, Value};

pub fn pikachu() -> EntityMatch {
    EntityMatch::new(
        25,
        "pikachu",
        "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/25.png",
    )
}

pub fn eevee() -> EntityMatch {
    EntityMatch::new(
        133,
        "eevee",
        "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/133.png",
    )
}

/// Fixed timestamp `minutes` after 2024-01-01T00:00:00Z
pub fn at_minute(minutes: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::minutes(minutes.into())
}

pub fn sample_record(submitter: &str) -> Record {
    Record::builder(submitter, &pikachu())
        .nickname("Sparky")
        .ability("Static")
        .item("Light Ball")
        .moves(["Thunderbolt", "Quick Attack", "", ""])
        .message("Take care of it!")
        .build()
}

/// `count` records submitted one minute apart, oldest first
pub fn sample_document(count: u32) -> Document<Record> {
    Document::from_records(
        (0..count)
            .map(|i| {
                Record::builder(format!("trainer-{i}"), &eevee())
                    .submitted_at(at_minute(i))
                    .build()
            })
            .collect(),
    )
}

pub fn record_json(record: &Record) -> Value {
    serde_json::to_value(record).unwrap()
}

pub fn stored(record: &Record) -> StoredRecord {
    StoredRecord::encode(record).unwrap()
}

/// [`sample_document`] as it sits in the shared file
pub fn sample_stored_document(count: u32) -> Document<StoredRecord> {
    Document::from_records(sample_document(count).records().iter().map(stored).collect())
}

/// An element in the shape other clients write: millisecond id, `.000Z`
/// timestamp, explicit nulls, keys out of order and an unmodelled field
pub fn foreign_record_json(submitter: &str) -> Value {
    json!({
        "submittedAt": "2024-05-01T12:00:00.000Z",
        "id": 1714564800000_u64,
        "submitter": submitter,
        "pokemon": "staryu",
        "pokemonId": 120,
        "spriteUrl": "https://img/120.png",
        "nickname": null,
        "moves": ["Water Gun"],
        "message": "",
        "shiny": true
    })
}
