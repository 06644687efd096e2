// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::path::{Component, Path};

use picasa2shotwell::events::EventNamer;
use picasa2shotwell::sources::{windows_to_local, PicasaIni, SnapshotDb};

#[derive(Arbitrary, Debug)]
enum Input<'a> {
    Ini(&'a str),
    FolderName(&'a str),
    FolderPath(&'a str),
    LegacyPath(&'a str),
    Snapshot(&'a str),
}

fuzz_target!(|input: Input| {
    let home = Path::new("/home/fuzz");
    match input {
        Input::Ini(text) => {
            let _ = PicasaIni::parse(text, Path::new(".picasa.ini"));
        }
        Input::FolderName(name) => {
            let namer = EventNamer::default();
            let title = namer.normalize(name);
            assert_eq!(title, namer.normalize(name));
        }
        Input::FolderPath(dir) => {
            let namer = EventNamer::default();
            let file = Path::new(dir).join("a.jpg");
            assert_eq!(namer.event_title(&file), namer.event_title(&file));
        }
        Input::LegacyPath(path) => {
            if let Ok(local) = windows_to_local(path, home) {
                assert!(local.starts_with(home));
                assert!(!local.components().any(|c| matches!(c, Component::ParentDir)));
            }
        }
        Input::Snapshot(json) => {
            let _ = SnapshotDb::from_json(json, home);
        }
    }
});
