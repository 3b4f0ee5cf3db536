//! UID-indexed lookups over loaded world data.
//!
//! Files are kept in lexicographic name order, which makes every
//! "last-found wins" rule below deterministic across runs. A description
//! carrying a `File` reference is a forwarding stub, not authoritative
//! data; cross-file searches prefer the first authoritative match.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use world_format::{object_types, FileData, ObjectDescription, MODEL_FILE_SUFFIX};

/// A UID match: the owning file name and a copy of the description.
#[derive(Debug, Clone)]
pub struct FoundObject {
    pub file: String,
    pub desc: ObjectDescription,
}

/// A resolved location ancestor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationInfo {
    pub uid: String,
    /// Part of the query surface for private-location variants; the base
    /// resolver never sets it.
    pub private: bool,
}

#[derive(Default)]
pub struct ObjectIndex {
    files: BTreeMap<String, Arc<FileData>>,
}

impl ObjectIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-file scope for lookups restricted to a just-opened source.
    pub fn single(name: impl Into<String>, data: Arc<FileData>) -> Self {
        let mut index = Self::new();
        index.insert(name, data);
        index
    }

    pub fn insert(&mut self, name: impl Into<String>, data: Arc<FileData>) {
        self.files.insert(name.into(), data);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<FileData>> {
        self.files.get(name)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Cross-file UID search. The first authoritative match (no `File`
    /// reference) wins; with only forwarding stubs on offer, the last
    /// stub scanned is returned.
    pub fn find_by_uid(&self, uid: &str) -> Option<FoundObject> {
        let mut found: Option<FoundObject> = None;
        for (name, data) in &self.files {
            let Some(desc) = data.find(uid) else { continue };
            let authoritative = desc.file_ref().is_none();
            found = Some(FoundObject {
                file: name.clone(),
                desc: desc.clone(),
            });
            if authoritative {
                break;
            }
        }
        found
    }

    /// Same resolution restricted to one file; absent when the file was
    /// never loaded or the UID is undefined there.
    pub fn find_by_uid_in_file(&self, uid: &str, file_name: &str) -> Option<ObjectDescription> {
        self.files.get(file_name)?.find(uid).cloned()
    }

    /// Pure membership test against one file's locator table.
    pub fn is_defined(&self, uid: &str, file_name: &str) -> bool {
        self.files
            .get(file_name)
            .map(|data| data.object_ids.contains_key(uid))
            .unwrap_or(false)
    }

    /// The download/cache set for streaming a UID: every file defining
    /// it, plus every `Visual.Model` asset anywhere under the UID's
    /// subtree and on the owning files' top-level objects, suffixed with
    /// the model file extension. Scanning stops once an authoritative
    /// definition has contributed.
    pub fn files_for_uid(&self, uid: &str) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for (name, data) in &self.files {
            let Some(desc) = data.find(uid) else { continue };
            out.insert(name.clone());
            collect_model_assets(desc, &mut out);
            for top in data.objects.values() {
                for model in top.model_names() {
                    out.insert(format!("{model}{MODEL_FILE_SUFFIX}"));
                }
            }
            if desc.file_ref().is_none() {
                break;
            }
        }
        out
    }

    /// The nearest `Location` ancestor of a UID.
    ///
    /// If any loaded file resolves the UID to a `Location` description,
    /// the UID is its own answer. Otherwise the walk climbs to the
    /// top-level key of a file where the UID is nested and repeats;
    /// files where the UID is itself top-level cannot yield an ancestor.
    /// Fails on a UID no loaded file defines (a dangling reference), or
    /// when the chain runs out before reaching a location.
    pub fn location_uid_for(&self, uid: &str) -> Option<LocationInfo> {
        let mut current = uid.to_string();
        // well-formed data climbs one file per step, so any walk longer
        // than the loaded set is cyclic
        for _ in 0..=self.files.len() {
            let mut climb: Option<&Arc<FileData>> = None;
            let mut defined = false;
            for data in self.files.values() {
                if !data.object_ids.contains_key(&current) {
                    continue;
                }
                defined = true;
                if let Some(desc) = data.find(&current) {
                    if desc.object_type == object_types::LOCATION {
                        return Some(LocationInfo {
                            uid: current,
                            private: false,
                        });
                    }
                }
                if climb.is_none() && !data.objects.contains_key(&current) {
                    climb = Some(data);
                }
            }
            if !defined {
                return None;
            }
            let file = climb?;
            let (top_uid, top_desc) = file.objects.iter().next()?;
            if top_desc.object_type == object_types::LOCATION {
                return Some(LocationInfo {
                    uid: top_uid.clone(),
                    private: false,
                });
            }
            current = top_uid.clone();
        }
        None
    }
}

fn collect_model_assets(desc: &ObjectDescription, out: &mut BTreeSet<String>) {
    for model in desc.model_names() {
        out.insert(format!("{model}{MODEL_FILE_SUFFIX}"));
    }
    for child in desc.objects.values() {
        collect_model_assets(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn file(value: serde_json::Value) -> Arc<FileData> {
        let data: FileData = serde_json::from_value(value).unwrap();
        data.validate().unwrap();
        Arc::new(data)
    }

    /// Region file: A (Region) > B (stub to "b"), plus the standalone
    /// zone file "b": B (Location) > P1.
    fn hub_and_zone() -> ObjectIndex {
        let mut index = ObjectIndex::new();
        index.insert(
            "hub",
            file(json!({
                "Objects": {
                    "A": {
                        "Type": "Region",
                        "Objects": { "B": { "Type": "Location", "File": "b" } }
                    }
                },
                "ObjectIds": { "A": ["A"], "B": ["A", "B"] }
            })),
        );
        index.insert(
            "b",
            file(json!({
                "Objects": {
                    "B": {
                        "Type": "Location",
                        "Objects": { "P1": { "Type": "Building Interior" } }
                    }
                },
                "ObjectIds": { "B": ["B"], "P1": ["B", "P1"] }
            })),
        );
        index
    }

    #[test]
    fn find_by_uid_prefers_authoritative_over_stub() {
        let index = hub_and_zone();
        let found = index.find_by_uid("B").unwrap();
        assert_eq!(found.file, "b");
        assert!(found.desc.file_ref().is_none());
    }

    #[test]
    fn find_by_uid_returns_last_stub_when_nothing_authoritative() {
        let mut index = ObjectIndex::new();
        index.insert(
            "hub",
            file(json!({
                "Objects": { "X": { "Type": "Zone", "File": "real" } },
                "ObjectIds": { "X": ["X"] }
            })),
        );
        let found = index.find_by_uid("X").unwrap();
        assert_eq!(found.file, "hub");
        assert_eq!(found.desc.file_ref(), Some("real"));
    }

    #[test]
    fn find_by_uid_absent() {
        assert!(hub_and_zone().find_by_uid("ZZZ").is_none());
    }

    #[test]
    fn find_by_uid_in_file_fails_softly() {
        let index = hub_and_zone();
        assert!(index.find_by_uid_in_file("P1", "b").is_some());
        assert!(index.find_by_uid_in_file("P1", "hub").is_none());
        assert!(index.find_by_uid_in_file("P1", "never_loaded").is_none());
    }

    #[test]
    fn is_defined_checks_one_file_only() {
        let index = hub_and_zone();
        assert!(index.is_defined("B", "hub"));
        assert!(index.is_defined("B", "b"));
        assert!(!index.is_defined("P1", "hub"));
        assert!(!index.is_defined("B", "never_loaded"));
    }

    #[test]
    fn files_for_uid_collects_nested_models_both_forms() {
        let mut index = ObjectIndex::new();
        index.insert(
            "hub",
            file(json!({
                "Objects": {
                    "X": {
                        "Type": "Zone",
                        "Visual": { "Model": "m/own" },
                        "Objects": {
                            "Y": {
                                "Type": "Prop",
                                "Visual": { "Model": ["m/a", "m/b"] },
                                "Objects": {
                                    "Z": { "Type": "Prop", "Visual": { "Model": "m/deep" } }
                                }
                            }
                        }
                    },
                    "TOP": { "Type": "Prop", "Visual": { "Model": "m/top" } }
                },
                "ObjectIds": {
                    "X": ["X"], "Y": ["X", "Y"], "Z": ["X", "Y", "Z"], "TOP": ["TOP"]
                }
            })),
        );

        let set = index.files_for_uid("X");
        for expected in [
            "hub",
            "m/own.bam",
            "m/a.bam",
            "m/b.bam",
            "m/deep.bam",
            "m/top.bam",
        ] {
            assert!(set.contains(expected), "missing {}", expected);
        }
    }

    #[test]
    fn files_for_uid_stops_after_authoritative_file() {
        let mut index = ObjectIndex::new();
        // lexicographically before the authoritative file, so it is scanned
        index.insert(
            "astub",
            file(json!({
                "Objects": {
                    "X": { "Type": "Zone", "File": "hub", "Visual": { "Model": "m/stub" } }
                },
                "ObjectIds": { "X": ["X"] }
            })),
        );
        index.insert(
            "hub",
            file(json!({
                "Objects": { "X": { "Type": "Zone", "Visual": { "Model": "m/real" } } },
                "ObjectIds": { "X": ["X"] }
            })),
        );
        // scanned never: the authoritative match in "hub" ends the search
        index.insert(
            "zlate",
            file(json!({
                "Objects": { "X": { "Type": "Zone", "Visual": { "Model": "m/late" } } },
                "ObjectIds": { "X": ["X"] }
            })),
        );

        let set = index.files_for_uid("X");
        assert!(set.contains("astub"));
        assert!(set.contains("hub"));
        assert!(set.contains("m/stub.bam"));
        assert!(set.contains("m/real.bam"));
        assert!(!set.contains("zlate"));
        assert!(!set.contains("m/late.bam"));
    }

    #[test]
    fn single_file_region_scenario() {
        let mut index = ObjectIndex::new();
        index.insert(
            "hub",
            file(json!({
                "Objects": {
                    "A": { "Type": "Region", "Objects": { "B": { "Type": "Location" } } }
                },
                "ObjectIds": { "A": ["A"], "B": ["A", "B"] }
            })),
        );

        assert_eq!(index.find_by_uid("B").unwrap().desc.object_type, "Location");
        assert_eq!(index.location_uid_for("B").unwrap().uid, "B");
        // a region is not a location: the walk from the top fails
        assert!(index.location_uid_for("A").is_none());
    }

    #[test]
    fn location_of_nested_object_is_its_file_root() {
        let index = hub_and_zone();
        let info = index.location_uid_for("P1").unwrap();
        assert_eq!(info.uid, "B");
        assert!(!info.private);
    }

    #[test]
    fn location_of_a_location_is_itself() {
        let index = hub_and_zone();
        assert_eq!(index.location_uid_for("B").unwrap().uid, "B");
    }

    #[test]
    fn top_level_non_location_has_no_location() {
        let index = hub_and_zone();
        assert!(index.location_uid_for("A").is_none());
    }

    #[test]
    fn dangling_uid_has_no_location() {
        assert!(hub_and_zone().location_uid_for("ZZZ").is_none());
    }

    #[test]
    fn cyclic_files_terminate_without_a_location() {
        let mut index = ObjectIndex::new();
        index.insert(
            "cyc1",
            file(json!({
                "Objects": { "U1": { "Type": "Zone", "Objects": { "U2": { "Type": "Zone" } } } },
                "ObjectIds": { "U1": ["U1"], "U2": ["U1", "U2"] }
            })),
        );
        index.insert(
            "cyc2",
            file(json!({
                "Objects": { "U2": { "Type": "Zone", "Objects": { "U1": { "Type": "Zone" } } } },
                "ObjectIds": { "U2": ["U2"], "U1": ["U2", "U1"] }
            })),
        );
        assert!(index.location_uid_for("U1").is_none());
        assert!(index.location_uid_for("U2").is_none());
    }
}
