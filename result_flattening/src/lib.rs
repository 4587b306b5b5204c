mod config;
pub mod builder;

use log::debug;

pub use crate::config::*;

// The documents published for each municipality look like:
//
// <VYSLEDKY_OBEC>
//   <OBEC KODZASTUP=.. NAZEVZAST=..>               municipality
//     <VYSLEDEK>                                   result block
//       <UCAST OKRSKY_CELKEM=.. ZAPSANI_VOLICI=../> participation
//       <VOLEBNI_STRANA VSTRANA=.. HLASY=..>       party
//         <ZASTUPITEL JMENO=.. HLASY=../>          candidate
//       </VOLEBNI_STRANA>
//       ...
//
// The walk is positional: the tag names are not checked.

/// The municipality node: the first child of the document root.
pub fn municipality_node(root: &Element) -> Result<&Element, FlattenErrors> {
    root.first_child().ok_or_else(|| FlattenErrors::MissingNode {
        node: ResultNode::Municipality,
        parent: root.name.clone(),
    })
}

fn result_block(root: &Element) -> Result<&Element, FlattenErrors> {
    let municipality = municipality_node(root)?;
    municipality
        .first_child()
        .ok_or_else(|| FlattenErrors::MissingNode {
            node: ResultNode::ResultBlock,
            parent: municipality.name.clone(),
        })
}

/// The participation node (turnout and ballot statistics): the first child of the result block.
pub fn participation_node(root: &Element) -> Result<&Element, FlattenErrors> {
    let block = result_block(root)?;
    block.first_child().ok_or_else(|| FlattenErrors::MissingNode {
        node: ResultNode::Participation,
        parent: block.name.clone(),
    })
}

/// The party nodes: all the siblings that follow the participation node.
pub fn party_nodes(root: &Element) -> Result<&[Element], FlattenErrors> {
    // Checks that the participation node is present.
    participation_node(root)?;
    let block = result_block(root)?;
    Ok(&block.children[1..])
}

/// Overlays the levels in increasing order of specificity.
pub fn merge_levels(levels: &[&AttrBag]) -> AttrBag {
    let mut res = AttrBag::new();
    for level in levels {
        res.overlay(level);
    }
    res
}

/// The rows of a single party: one per candidate, or a single one if the
/// party has no candidates.
pub fn flatten_party(
    municipality: &AttrBag,
    participation: &AttrBag,
    party: &Element,
) -> Vec<FlatRow> {
    let base = merge_levels(&[municipality, participation, &party.attributes]);
    if party.children.is_empty() {
        return vec![FlatRow { fields: base }];
    }
    party
        .children
        .iter()
        .map(|candidate| FlatRow {
            fields: merge_levels(&[&base, &candidate.attributes]),
        })
        .collect()
}

/// Flattens the result document of one municipality.
///
/// The rows follow the order of the parties in the document, and then the
/// order of the candidates within each party.
pub fn flatten(root: &Element) -> Result<Vec<FlatRow>, FlattenErrors> {
    let municipality = &municipality_node(root)?.attributes;
    let participation = &participation_node(root)?.attributes;
    let parties = party_nodes(root)?;
    debug!(
        "flatten: municipality {:?}: {} parties",
        municipality.get("KODZASTUP"),
        parties.len()
    );
    let rows: Vec<FlatRow> = parties
        .iter()
        .flat_map(|party| flatten_party(municipality, participation, party))
        .collect();
    debug!("flatten: {} rows", rows.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::builder::ElementBuilder;
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn candidate(num: &str, name: &str, votes: &str) -> Element {
        ElementBuilder::new("ZASTUPITEL")
            .attrs(&[
                ("PORADOVE_CISLO", num),
                ("JMENO", name),
                ("HLASY", votes),
            ])
            .build()
    }

    fn party(id: &str, votes: &str, candidates: Vec<Element>) -> Element {
        ElementBuilder::new("VOLEBNI_STRANA")
            .attrs(&[("VSTRANA", id), ("NAZEV_STRANY", "Strana"), ("HLASY", votes)])
            .children(candidates)
            .build()
    }

    fn document(parties: Vec<Element>) -> Element {
        let participation = ElementBuilder::new("UCAST")
            .attrs(&[("ZAPSANI_VOLICI", "120"), ("UCAST_PROC", "51.2")])
            .build();
        let block = ElementBuilder::new("VYSLEDEK")
            .child(participation)
            .children(parties)
            .build();
        let municipality = ElementBuilder::new("OBEC")
            .attrs(&[("KODZASTUP", "500001"), ("NAZEVZAST", "Obec")])
            .child(block)
            .build();
        ElementBuilder::new("VYSLEDKY_OBEC").child(municipality).build()
    }

    #[test]
    fn attr_bag_overwrite_keeps_position() {
        let mut bag: AttrBag = [("A", "1"), ("B", "2")].into_iter().collect();
        bag.insert("A", "3");
        let entries: Vec<(&str, &str)> = bag.iter().collect();
        assert_eq!(entries, vec![("A", "3"), ("B", "2")]);
    }

    #[test]
    fn merge_later_levels_win() {
        let a: AttrBag = [("X", "a"), ("Y", "a")].into_iter().collect();
        let b: AttrBag = [("Y", "b"), ("Z", "b")].into_iter().collect();
        let c: AttrBag = [("Z", "c")].into_iter().collect();
        let merged = merge_levels(&[&a, &b, &c]);
        assert_eq!(merged.get("X"), Some("a"));
        assert_eq!(merged.get("Y"), Some("b"));
        assert_eq!(merged.get("Z"), Some("c"));
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn party_without_candidates_gives_one_row() {
        init();
        let doc = document(vec![party("1", "40", vec![])]);
        let rows = flatten(&doc).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("VSTRANA"), Some("1"));
        assert_eq!(rows[0].get("HLASY"), Some("40"));
        assert_eq!(rows[0].get("JMENO"), None);
        let header = vec!["KODZASTUP".to_string(), "JMENO".to_string()];
        assert_eq!(rows[0].project(&header), vec!["500001", ""]);
    }

    #[test]
    fn party_with_candidates_gives_one_row_per_candidate() {
        init();
        let doc = document(vec![party(
            "2",
            "70",
            vec![
                candidate("1", "Jan", "30"),
                candidate("2", "Eva", "25"),
                candidate("3", "Petr", "15"),
            ],
        )]);
        let rows = flatten(&doc).unwrap();
        assert_eq!(rows.len(), 3);
        for row in rows.iter() {
            assert_eq!(row.get("KODZASTUP"), Some("500001"));
            assert_eq!(row.get("ZAPSANI_VOLICI"), Some("120"));
            assert_eq!(row.get("VSTRANA"), Some("2"));
        }
        let names: Vec<&str> = rows.iter().filter_map(|r| r.get("JMENO")).collect();
        assert_eq!(names, vec!["Jan", "Eva", "Petr"]);
    }

    #[test]
    fn candidate_votes_overwrite_party_votes() {
        let doc = document(vec![party("2", "70", vec![candidate("1", "Jan", "30")])]);
        let rows = flatten(&doc).unwrap();
        assert_eq!(rows[0].get("HLASY"), Some("30"));
    }

    #[test]
    fn rows_follow_party_then_candidate_order() {
        let doc = document(vec![
            party("1", "10", vec![candidate("1", "A", "4"), candidate("2", "B", "6")]),
            party("2", "5", vec![]),
            party("3", "8", vec![candidate("1", "C", "8")]),
        ]);
        let rows = flatten(&doc).unwrap();
        let keys: Vec<(Option<&str>, Option<&str>)> = rows
            .iter()
            .map(|r| (r.get("VSTRANA"), r.get("JMENO")))
            .collect();
        assert_eq!(
            keys,
            vec![
                (Some("1"), Some("A")),
                (Some("1"), Some("B")),
                (Some("2"), None),
                (Some("3"), Some("C")),
            ]
        );
    }

    #[test]
    fn flatten_is_repeatable() {
        let doc = document(vec![
            party("1", "10", vec![candidate("1", "A", "4")]),
            party("2", "5", vec![]),
        ]);
        assert_eq!(flatten(&doc).unwrap(), flatten(&doc).unwrap());
    }

    #[test]
    fn no_parties_gives_no_rows() {
        let doc = document(vec![]);
        assert!(flatten(&doc).unwrap().is_empty());
    }

    #[test]
    fn empty_document_is_an_error() {
        let doc = ElementBuilder::new("VYSLEDKY_OBEC").build();
        assert_eq!(
            flatten(&doc),
            Err(FlattenErrors::MissingNode {
                node: ResultNode::Municipality,
                parent: "VYSLEDKY_OBEC".to_string(),
            })
        );
    }

    #[test]
    fn missing_participation_is_an_error() {
        let doc = ElementBuilder::new("VYSLEDKY_OBEC")
            .child(
                ElementBuilder::new("OBEC")
                    .child(ElementBuilder::new("VYSLEDEK").build())
                    .build(),
            )
            .build();
        let err = flatten(&doc).unwrap_err();
        assert_eq!(err.to_string(), "missing participation node under <VYSLEDEK>");
    }

    #[test]
    fn unknown_fields_are_reported() {
        let doc = document(vec![party("1", "10", vec![])]);
        let rows = flatten(&doc).unwrap();
        let header: Vec<String> = [
            "KODZASTUP",
            "NAZEVZAST",
            "ZAPSANI_VOLICI",
            "UCAST_PROC",
            "VSTRANA",
            "HLASY",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(rows[0].unknown_fields(&header), vec!["NAZEV_STRANY"]);
    }
}
