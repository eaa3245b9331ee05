use std::fs;

use entity_manifest::codec::{Codec, TagTable};
use entity_manifest::models::*;
use entity_manifest::{document, Error};
use speculate2::speculate;
use tempfile::TempDir;

const SAMPLE: &str = include_str!("../data.yaml");

fn write_sample(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("data.yaml");
    fs::write(&path, SAMPLE).expect("Failed to write sample");
    path
}

speculate! {
    before {
        let dir = TempDir::new().expect("Failed to create temp dir");
    }

    describe "load" {
        it "loads the sample document" {
            let path = write_sample(&dir);
            let collection = document::load(&path).expect("Failed to load");
            assert_eq!(collection.len(), 4);
            assert_eq!(collection.record_count(), 8);
        }

        it "reports a missing file as SourceUnavailable" {
            let path = dir.path().join("missing.yaml");
            let err = document::load(&path).unwrap_err();
            match err {
                Error::SourceUnavailable { path: reported, .. } => assert_eq!(reported, path),
                other => panic!("expected SourceUnavailable, got {other}"),
            }
        }

        it "reports invalid YAML as a parse error" {
            let path = dir.path().join("broken.yaml");
            fs::write(&path, "!EntityList\nRebels: [unclosed\n").unwrap();
            assert!(matches!(document::load(&path), Err(Error::Parse(_))));
        }

        it "loads with a custom tag table" {
            let path = dir.path().join("fleet.yaml");
            fs::write(&path, "!Fleet\nRogue: !Squadron\n  Red Five: !Ship {pilot: Luke}\n").unwrap();
            let codec = Codec::new(TagTable::new("Fleet", "Squadron", "Ship"));
            let collection = document::load_with(&codec, &path).expect("Failed to load");
            assert!(collection.group("Rogue").unwrap().contains("Red Five"));
        }
    }

    describe "save" {
        it "writes a document that loads back identically" {
            let source = write_sample(&dir);
            let output = dir.path().join("output.yaml");

            let collection = document::load(&source).expect("Failed to load");
            document::save(&output, &collection).expect("Failed to save");

            let back = document::load(&output).expect("Failed to reload");
            assert_eq!(back, collection);
            assert_eq!(
                back.names().collect::<Vec<_>>(),
                collection.names().collect::<Vec<_>>()
            );
        }

        it "overwrites an existing file" {
            let output = dir.path().join("output.yaml");
            fs::write(&output, "stale contents").unwrap();

            document::save(&output, &Collection::new()).expect("Failed to save");
            let back = document::load(&output).expect("Failed to reload");
            assert!(back.is_empty());
        }

        it "leaves no temporary files behind" {
            let output = dir.path().join("output.yaml");
            document::save(&output, &Collection::new()).expect("Failed to save");
            let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
            assert_eq!(entries.len(), 1);
        }

        it "keeps the destination intact when the save fails" {
            let output = dir.path().join("output.yaml");
            fs::create_dir(&output).unwrap();
            fs::write(output.join("keep"), "x").unwrap();

            let err = document::save(&output, &Collection::new()).unwrap_err();
            assert!(matches!(err, Error::SourceUnavailable { .. }));

            assert_eq!(fs::read_to_string(output.join("keep")).unwrap(), "x");
            let leftovers: Vec<_> = fs::read_dir(dir.path())
                .unwrap()
                .map(|entry| entry.unwrap().file_name())
                .filter(|name| name != "output.yaml")
                .collect();
            assert!(leftovers.is_empty(), "unexpected files: {leftovers:?}");
        }

        it "reports a missing directory as SourceUnavailable" {
            let output = dir.path().join("no-such-dir").join("output.yaml");
            let err = document::save(&output, &Collection::new()).unwrap_err();
            assert!(matches!(err, Error::SourceUnavailable { .. }));
        }
    }

    describe "tour" {
        it "saves the edited fleet" {
            let source = write_sample(&dir);
            let output = dir.path().join("output.yaml");

            let mut collection = document::load(&source).expect("Failed to load");
            entity_manifest::tour::apply_edits(&mut collection).expect("Edits failed");
            document::save(&output, &collection).expect("Failed to save");

            let text = fs::read_to_string(&output).unwrap();
            assert!(text.contains("YT-1300 Light Freighter: !EntityShip"));
            assert!(!text.contains("Galactic Empire"));
            assert!(!text.contains("C-9979 Landing Craft"));

            let back = document::load(&output).expect("Failed to reload");
            let freighter = back
                .group(entity_manifest::tour::REBELS)
                .and_then(|g| g.record(entity_manifest::tour::YT_1300))
                .expect("freighter saved");
            assert_eq!(freighter, &entity_manifest::tour::light_freighter());
        }
    }
}
