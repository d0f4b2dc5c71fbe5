use pretty_assertions::assert_eq;
use serde_json::json;
use wikibase_model::{ActionIfExists, Claim, Claims, ModelError, Rank, Reference, Snak};

fn saved(property: &str, value: &str, id: &str) -> Claim {
    Claim::string(property, value).with_id(id)
}

// ── APPEND ───────────────────────────────────────────────────────

#[test]
fn append_adds_to_property_sequence() {
    let mut claims = Claims::new();
    claims
        .add(Claim::string("P1", "a"), ActionIfExists::Append)
        .unwrap()
        .add(Claim::string("P1", "b"), ActionIfExists::Append)
        .unwrap();

    let values: Vec<_> = claims.get("P1").iter().map(|c| c.mainsnak.clone()).collect();
    assert_eq!(values, vec![Snak::string("P1", "a"), Snak::string("P1", "b")]);
}

#[test]
fn append_never_deduplicates() {
    let mut claims = Claims::new();
    let claim = Claim::string("P1", "a");
    claims.add(claim.clone(), ActionIfExists::Append).unwrap();
    claims.add(claim, ActionIfExists::Append).unwrap();
    assert_eq!(claims.get("P1").len(), 2);
}

#[test]
fn add_accepts_slices_and_arrays() {
    let mut claims = Claims::new();
    let batch = vec![Claim::string("P1", "a"), Claim::string("P2", "b")];
    claims.add(batch.as_slice(), ActionIfExists::Append).unwrap();
    claims
        .add([Claim::string("P3", "c")], ActionIfExists::Append)
        .unwrap();
    assert_eq!(claims.len(), 3);
    assert_eq!(claims.properties().collect::<Vec<_>>(), vec!["P1", "P2", "P3"]);
}

#[test]
fn empty_batch_is_invalid_argument() {
    let mut claims = Claims::new();
    let err = claims.add(Vec::new(), ActionIfExists::Append).unwrap_err();
    assert!(matches!(err, ModelError::InvalidArgument(_)));
    assert!(claims.is_empty());
}

// ── KEEP ─────────────────────────────────────────────────────────

#[test]
fn keep_discards_when_property_has_claim() {
    let mut claims = Claims::new();
    claims.add(saved("P1", "a", "S1"), ActionIfExists::Append).unwrap();
    claims.add(Claim::string("P1", "b"), ActionIfExists::Keep).unwrap();

    assert_eq!(claims.get("P1").len(), 1);
    assert_eq!(claims.get("P1")[0].id.as_deref(), Some("S1"));
}

#[test]
fn keep_appends_when_property_is_empty() {
    let mut claims = Claims::new();
    claims.add(Claim::string("P1", "a"), ActionIfExists::Keep).unwrap();
    assert_eq!(claims.get("P1").len(), 1);
}

#[test]
fn keep_treats_removed_claims_as_absent() {
    let mut claims = Claims::new();
    let mut old = saved("P1", "a", "S1");
    old.remove().unwrap();
    claims.add(old, ActionIfExists::Append).unwrap();
    claims.add(Claim::string("P1", "b"), ActionIfExists::Keep).unwrap();
    assert_eq!(claims.get("P1").len(), 2);
}

// ── REPLACE ──────────────────────────────────────────────────────

#[test]
fn replace_matches_statement_id_and_updates_in_place() {
    let mut claims = Claims::new();
    claims
        .add(
            vec![saved("P1", "a", "S1"), saved("P1", "b", "S2")],
            ActionIfExists::Append,
        )
        .unwrap();

    claims
        .add(saved("P1", "changed", "S2"), ActionIfExists::Replace)
        .unwrap();

    let p1 = claims.get("P1");
    assert_eq!(p1.len(), 2);
    // S1 was not part of the batch and is saved, so it is retired, not dropped.
    assert_eq!(p1[0].id.as_deref(), Some("S1"));
    assert!(p1[0].is_removed());
    assert_eq!(p1[1].id.as_deref(), Some("S2"));
    assert_eq!(p1[1].mainsnak, Snak::string("P1", "changed"));
    assert!(!p1[1].is_removed());
}

#[test]
fn replace_keeps_equal_saved_statement() {
    let mut claims = Claims::new();
    claims.add(saved("P1", "a", "S1"), ActionIfExists::Append).unwrap();

    claims
        .add(Claim::string("P1", "a").with_rank(Rank::Preferred), ActionIfExists::Replace)
        .unwrap();

    let p1 = claims.get("P1");
    assert_eq!(p1.len(), 1);
    assert_eq!(p1[0].id.as_deref(), Some("S1"));
    assert_eq!(p1[0].rank, Some(Rank::Preferred));
    assert!(!p1[0].is_removed());
}

#[test]
fn replace_drops_unsaved_leftovers() {
    let mut claims = Claims::new();
    claims.add(Claim::string("P1", "old"), ActionIfExists::Append).unwrap();
    claims.add(Claim::string("P1", "new"), ActionIfExists::Replace).unwrap();

    let p1 = claims.get("P1");
    assert_eq!(p1.len(), 1);
    assert_eq!(p1[0].mainsnak, Snak::string("P1", "new"));
}

#[test]
fn replace_leaves_other_properties_alone() {
    let mut claims = Claims::new();
    claims.add(saved("P2", "x", "S9"), ActionIfExists::Append).unwrap();
    claims.add(Claim::string("P1", "a"), ActionIfExists::Replace).unwrap();
    assert!(!claims.get("P2")[0].is_removed());
}

#[test]
fn replace_twice_is_idempotent() {
    let mut claims = Claims::new();
    claims
        .add(
            vec![saved("P1", "a", "S1"), Claim::string("P1", "stale")],
            ActionIfExists::Append,
        )
        .unwrap();
    let batch = vec![
        Claim::string("P1", "b"),
        Claim::string("P1", "b"),
        saved("P1", "a2", "S1"),
    ];

    claims.add(batch.clone(), ActionIfExists::Replace).unwrap();
    let once = claims.clone();
    claims.add(batch, ActionIfExists::Replace).unwrap();

    assert_eq!(claims, once);
    assert_eq!(claims.get("P1").len(), 3);
}

#[test]
fn re_adding_a_retired_statement_revives_it() {
    let mut claims = Claims::new();
    claims.add(saved("P1", "a", "S1"), ActionIfExists::Append).unwrap();
    claims.add(Claim::string("P1", "b"), ActionIfExists::Replace).unwrap();
    assert!(claims.get("P1")[0].is_removed());

    claims
        .add(vec![Claim::string("P1", "a"), Claim::string("P1", "b")], ActionIfExists::Replace)
        .unwrap();
    assert!(claims.iter().all(|c| !c.is_removed()));
}

// ── Removal flag ─────────────────────────────────────────────────

#[test]
fn unsaved_claim_cannot_be_removed() {
    let mut claim = Claim::string("P1", "a");
    assert!(matches!(claim.remove(), Err(ModelError::InvalidArgument(_))));
    assert!(!claim.is_removed());
}

#[test]
fn removed_claim_serializes_remove_marker() {
    let mut claim = saved("P1", "a", "S1");
    claim.remove().unwrap();
    assert_eq!(claim.to_wire()["remove"], "");
}

#[test]
fn removal_without_id_is_rejected_on_hydration() {
    let data = json!({
        "P1": [{
            "mainsnak": {"snaktype": "value", "property": "P1",
                         "datavalue": {"type": "string", "value": "a"}},
            "type": "statement",
            "remove": ""
        }]
    });
    assert!(matches!(Claims::from_wire(&data), Err(ModelError::MalformedData(_))));
}

// ── Wire form ────────────────────────────────────────────────────

#[test]
fn to_wire_groups_by_property_and_keeps_order() {
    let mut claims = Claims::new();
    claims
        .add(
            vec![Claim::string("P1", "b"), Claim::string("P2", "x"), Claim::string("P1", "a")],
            ActionIfExists::Append,
        )
        .unwrap();

    let wire = claims.to_wire();
    assert_eq!(wire["P1"][0]["mainsnak"]["datavalue"]["value"], "b");
    assert_eq!(wire["P1"][1]["mainsnak"]["datavalue"]["value"], "a");
    assert_eq!(wire["P2"].as_array().unwrap().len(), 1);
}

#[test]
fn from_wire_rejects_claim_without_property() {
    let data = json!({"P1": [{"mainsnak": {"snaktype": "novalue"}, "type": "statement"}]});
    let err = Claims::from_wire(&data).unwrap_err();
    assert!(format!("{err}").contains("no property id"));
}

#[test]
fn from_wire_rejects_claim_under_wrong_property() {
    let data = json!({"P2": [{"mainsnak": {"snaktype": "novalue", "property": "P1"}, "type": "statement"}]});
    assert!(matches!(Claims::from_wire(&data), Err(ModelError::MalformedData(_))));
}

#[test]
fn from_wire_accepts_php_empty_array() {
    let claims = Claims::from_wire(&json!([])).unwrap();
    assert!(claims.is_empty());
}

#[test]
fn qualifiers_and_references_round_trip() {
    let claim = Claim::item("P31", "Q5")
        .unwrap()
        .with_id("Q42$1")
        .with_qualifier(Snak::string("P1545", "1"))
        .with_reference(Reference::new().with_snak(Snak::item("P248", "Q36578").unwrap()));

    let mut claims = Claims::new();
    claims.add(claim, ActionIfExists::Append).unwrap();
    let wire = claims.to_wire();
    assert_eq!(wire["P31"][0]["qualifiers-order"], json!(["P1545"]));

    let back = Claims::from_wire(&wire).unwrap();
    assert_eq!(back, claims);
}
