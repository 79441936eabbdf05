// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Test utilities shared across unit and integration tests.
//!
//! This module is always compiled but hidden from documentation.
//! It provides canonical record builders to avoid duplication.

#![doc(hidden)]

use crate::types::{DownloadLinks, Field, Mirror, RawRecord};

/// Create a record with an id and a title.
pub fn make_record(id: &str, title: &str) -> RawRecord {
    RawRecord::new().with(Field::Id, id).with(Field::Title, title)
}

/// Create a record with the fields a typical catalog row carries.
pub fn make_book(id: &str, title: &str, author: &str, year: &str) -> RawRecord {
    make_record(id, title)
        .with(Field::Author, author)
        .with(Field::Year, year)
        .with(Field::Publisher, "O'Reilly Media")
        .with(Field::Language, "English")
        .with(Field::Extension, "pdf")
        .with(Field::Size, 2.5 * 1024.0 * 1024.0)
}

/// Create a record with every display field and every download descriptor.
pub fn make_full_record(id: &str, title: &str) -> RawRecord {
    make_book(id, title, "Kleppmann, Martin", "2017").with_links(DownloadLinks {
        url: Some(format!("http://libgen.test/book/index.php?md5={}", id)),
        get: Some(format!("https://library.lol/main/{}", id)),
        mirrors: vec![Mirror {
            label: "ipfs_io".to_string(),
            url: format!("https://ipfs.io/ipfs/{}", id),
        }],
    })
}
