//! Splicing harvested manual bodies into a freshly generated skeleton.

use crate::error::SectionError;
use crate::rekey::RekeyMap;
use crate::sections::{self, Chunk, SectionMap};

/// Merge previously harvested manual sections into `skeleton`.
///
/// `old_sets` is ordered by precedence: when a key appears in more than one
/// set, the earliest set wins. Callers list the target file's own prior
/// sections first and legacy files after, so content travels with the file
/// it currently lives in.
///
/// For each section the skeleton declares, in order: a same-named harvested
/// body is spliced verbatim; failing that, `rekey` candidates are tried in
/// order; failing that, the skeleton's default body stands. Harvested
/// sections whose key the skeleton no longer declares are dropped.
///
/// The skeleton is scanned (and so validated) even when `old_sets` is
/// empty, so a generator emitting unbalanced placeholders fails here
/// rather than producing a file that can never be harvested again.
pub fn merge(
    skeleton: &str,
    old_sets: &[SectionMap],
    rekey: &RekeyMap,
) -> Result<String, SectionError> {
    let chunks = sections::scan(skeleton)?;
    let mut out = String::with_capacity(skeleton.len());
    for chunk in &chunks {
        match chunk {
            Chunk::Outside(line) => out.push_str(line),
            Chunk::Section {
                key,
                open_line,
                body,
                close_line,
            } => {
                out.push_str(open_line);
                out.push_str(resolve(key, body, old_sets, rekey));
                out.push_str(close_line);
            }
        }
    }
    Ok(out)
}

/// Body to splice for `key`: first set holding the key itself, else the
/// first set holding the first matching rekey candidate, else the
/// skeleton default.
fn resolve<'a>(
    key: &str,
    default: &'a str,
    old_sets: &'a [SectionMap],
    rekey: &RekeyMap,
) -> &'a str {
    if let Some(body) = lookup(old_sets, key) {
        return body;
    }
    for candidate in rekey.candidates(key) {
        if let Some(body) = lookup(old_sets, candidate) {
            return body;
        }
    }
    default
}

fn lookup<'a>(old_sets: &'a [SectionMap], key: &str) -> Option<&'a str> {
    old_sets.iter().find_map(|set| set.get(key).map(String::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::extract;

    fn sections_of(text: &str) -> SectionMap {
        extract(text).unwrap()
    }

    const SKELETON: &str = concat!(
        "generated header\n",
        "# graft-manual: config\n",
        "default config\n",
        "# graft-manual-end\n",
        "generated footer\n",
    );

    #[test]
    fn splices_harvested_body_over_default() {
        let old = sections_of(
            "# graft-manual: config\ntuned by hand\n# graft-manual-end\n",
        );
        let merged = merge(SKELETON, &[old], &RekeyMap::new()).unwrap();
        assert_eq!(
            merged,
            concat!(
                "generated header\n",
                "# graft-manual: config\n",
                "tuned by hand\n",
                "# graft-manual-end\n",
                "generated footer\n",
            )
        );
    }

    #[test]
    fn keeps_default_when_nothing_harvested() {
        let merged = merge(SKELETON, &[], &RekeyMap::new()).unwrap();
        assert_eq!(merged, SKELETON);
    }

    #[test]
    fn earliest_set_wins_on_shared_key() {
        let target = sections_of(
            "# graft-manual: config\nfrom target\n# graft-manual-end\n",
        );
        let legacy = sections_of(
            "# graft-manual: config\nfrom legacy\n# graft-manual-end\n",
        );
        let merged =
            merge(SKELETON, &[target, legacy], &RekeyMap::new()).unwrap();
        assert!(merged.contains("from target\n"));
        assert!(!merged.contains("from legacy\n"));
    }

    #[test]
    fn later_set_fills_keys_the_first_lacks() {
        let skeleton = concat!(
            "# graft-manual: a\nda\n# graft-manual-end\n",
            "# graft-manual: b\ndb\n# graft-manual-end\n",
        );
        let first = sections_of("# graft-manual: a\nA1\n# graft-manual-end\n");
        let second = sections_of("# graft-manual: b\nB2\n# graft-manual-end\n");
        let merged = merge(skeleton, &[first, second], &RekeyMap::new()).unwrap();
        assert!(merged.contains("A1\n"));
        assert!(merged.contains("B2\n"));
    }

    #[test]
    fn drops_sections_the_skeleton_no_longer_declares() {
        let old = sections_of(concat!(
            "# graft-manual: config\nkeep\n# graft-manual-end\n",
            "# graft-manual: retired\nlose\n# graft-manual-end\n",
        ));
        let merged = merge(SKELETON, &[old], &RekeyMap::new()).unwrap();
        assert!(merged.contains("keep\n"));
        assert!(!merged.contains("lose"));
        assert!(!merged.contains("retired"));
    }

    #[test]
    fn rekey_resolves_renamed_key() {
        let skeleton = "# graft-manual: new_name\ndefault\n# graft-manual-end\n";
        let old = sections_of(
            "# graft-manual: old_name\ncarried over\n# graft-manual-end\n",
        );
        let mut rekey = RekeyMap::new();
        rekey.insert("new_name", vec!["old_name".to_string()]);
        let merged = merge(skeleton, &[old], &rekey).unwrap();
        assert!(merged.contains("carried over\n"));
        assert!(!merged.contains("default"));
    }

    #[test]
    fn direct_key_beats_rekey_candidates() {
        let skeleton = "# graft-manual: name\nd\n# graft-manual-end\n";
        let old = sections_of(concat!(
            "# graft-manual: name\ndirect\n# graft-manual-end\n",
            "# graft-manual: aliased\nvia rekey\n# graft-manual-end\n",
        ));
        let mut rekey = RekeyMap::new();
        rekey.insert("name", vec!["aliased".to_string()]);
        let merged = merge(skeleton, &[old], &rekey).unwrap();
        assert!(merged.contains("direct\n"));
        assert!(!merged.contains("via rekey"));
    }

    #[test]
    fn rekey_candidates_tried_in_order() {
        let skeleton = "# graft-manual: k\nd\n# graft-manual-end\n";
        let old = sections_of(concat!(
            "# graft-manual: second\nlater candidate\n# graft-manual-end\n",
            "# graft-manual: first\nearlier candidate\n# graft-manual-end\n",
        ));
        let mut rekey = RekeyMap::new();
        rekey.insert("k", vec!["first".to_string(), "second".to_string()]);
        let merged = merge(skeleton, &[old], &rekey).unwrap();
        assert!(merged.contains("earlier candidate\n"));
    }

    #[test]
    fn rekey_candidate_order_beats_set_order() {
        // "first" only exists in the later set; it still wins because
        // candidate order outranks set order on a rekey lookup.
        let skeleton = "# graft-manual: k\nd\n# graft-manual-end\n";
        let set_a = sections_of("# graft-manual: second\nA\n# graft-manual-end\n");
        let set_b = sections_of("# graft-manual: first\nB\n# graft-manual-end\n");
        let mut rekey = RekeyMap::new();
        rekey.insert("k", vec!["first".to_string(), "second".to_string()]);
        let merged = merge(skeleton, &[set_a, set_b], &rekey).unwrap();
        assert!(merged.contains("B\n"));
    }

    #[test]
    fn malformed_skeleton_fails_even_with_no_old_sets() {
        let skeleton = "# graft-manual: open\nnever closed\n";
        assert!(matches!(
            merge(skeleton, &[], &RekeyMap::new()),
            Err(SectionError::Unterminated { .. })
        ));
    }

    #[test]
    fn skeleton_without_sections_passes_through() {
        let skeleton = "all generated\nno sections\n";
        let old = sections_of("# graft-manual: x\ny\n# graft-manual-end\n");
        assert_eq!(merge(skeleton, &[old], &RekeyMap::new()).unwrap(), skeleton);
    }
}
