//! Resolution order and DRS validation on compiled fixtures.

use std::collections::BTreeMap;

use xtab_compile::{CompiledTable, NodeId, balance, compile};
use xtab_model::{
    Aspect, Axis, Cell, CellAddress, ConstraintSet, DefinitionNode, MemberValue, QName,
    RuleSets, TableDefinition,
};
use xtab_taxonomy::{
    Concept, Drs, DrsDimension, Hypercube, TaxonomyDocument, TaxonomyIndex,
};
use xtab_validate::{CellNodes, Verdict, resolve, resolve_and_validate};

fn qn(value: &str) -> QName {
    QName::new(value).unwrap()
}

fn dim(value: &str) -> Aspect {
    Aspect::Dimension(qn(value))
}

fn rule(set: ConstraintSet) -> DefinitionNode {
    DefinitionNode::rule(RuleSets::from_default(set))
}

fn first_leaf(table: &CompiledTable, axis: Axis) -> Option<NodeId> {
    table.axis(axis).leaves().first().copied()
}

fn cell_nodes(table: &CompiledTable) -> CellNodes<'_> {
    CellNodes::new(
        first_leaf(table, Axis::X),
        first_leaf(table, Axis::Y),
        first_leaf(table, Axis::Z),
    )
}

fn taxonomy() -> TaxonomyIndex {
    TaxonomyDocument::default()
        .with_concept(Concept::new(qn("m:A")))
        .with_concept(Concept::new(qn("m:B")))
        .with_drs(
            Drs::new("http://example.com/role/T_01", vec![qn("m:A")]).with_hypercube(
                Hypercube::new(
                    qn("h:1"),
                    vec![
                        DrsDimension::new(qn("d:BAS"), [qn("bas:x1"), qn("bas:x2")]),
                        DrsDimension::new(qn("d:CUR"), []),
                        DrsDimension::new(qn("d:TYP"), []),
                    ],
                ),
            ),
        )
        .with_default_member(qn("d:CUR"), qn("cur:ALL"))
        .build()
}

fn two_axis_table(x: DefinitionNode, y: DefinitionNode) -> TableDefinition {
    TableDefinition::new("t")
        .with_breakdown(DefinitionNode::breakdown(Axis::X).with_child(x))
        .with_breakdown(DefinitionNode::breakdown(Axis::Y).with_child(y))
}

fn compiled(table: &TableDefinition) -> CompiledTable {
    let mut compiled = compile(table, &taxonomy());
    balance(&mut compiled);
    compiled
}

fn fact() -> Cell {
    Cell::fact(CellAddress::new("0010", "0010"))
}

#[test]
fn column_concept_wins_over_row_concept() {
    let table = two_axis_table(
        rule(ConstraintSet::new().with(Aspect::Concept, qn("m:A"))),
        rule(ConstraintSet::new().with(Aspect::Concept, qn("m:B"))),
    );
    let compiled = compiled(&table);
    let mut cell = fact();
    let mut open = BTreeMap::new();
    resolve(&mut cell, &compiled, &cell_nodes(&compiled), &mut open);

    let concept = cell.constraint(&Aspect::Concept).unwrap();
    assert_eq!(concept.value, MemberValue::Fixed(qn("m:A")));
    assert_eq!(concept.axis, Axis::X);
}

#[test]
fn nearer_node_wins_over_ancestor() {
    let table = two_axis_table(
        rule(ConstraintSet::new().with(dim("d:BAS"), qn("bas:x1")))
            .with_child(rule(ConstraintSet::new().with(dim("d:BAS"), qn("bas:x2")))),
        rule(ConstraintSet::new()),
    );
    let compiled = compiled(&table);
    let mut cell = fact();
    resolve(&mut cell, &compiled, &cell_nodes(&compiled), &mut BTreeMap::new());
    assert_eq!(
        cell.constraint(&dim("d:BAS")).map(|c| &c.value),
        Some(&MemberValue::Fixed(qn("bas:x2")))
    );
}

#[test]
fn tagged_sets_from_x_and_z_both_apply() {
    let x = DefinitionNode::rule(
        RuleSets::from_default(ConstraintSet::new().with(Aspect::Concept, qn("m:A")))
            .with_tagged("total", ConstraintSet::new().with(dim("d:BAS"), qn("bas:x1"))),
    )
    .map_rule(|r| r.tag_selector = Some("total".to_string()));
    let z = DefinitionNode::rule(
        RuleSets::default()
            .with_tagged("total", ConstraintSet::new().with(dim("d:CUR"), qn("cur:EUR"))),
    );
    let table = two_axis_table(x, rule(ConstraintSet::new()))
        .with_breakdown(DefinitionNode::breakdown(Axis::Z).with_child(z));

    let compiled = compiled(&table);
    let mut cell = fact();
    resolve(&mut cell, &compiled, &cell_nodes(&compiled), &mut BTreeMap::new());

    let bas = cell.constraint(&dim("d:BAS")).unwrap();
    assert_eq!(bas.value, MemberValue::Fixed(qn("bas:x1")));
    assert_eq!(bas.axis, Axis::X);
    let cur = cell.constraint(&dim("d:CUR")).unwrap();
    assert_eq!(cur.value, MemberValue::Fixed(qn("cur:EUR")));
    assert_eq!(cur.axis, Axis::Z);
}

#[test]
fn tagged_value_beats_default_value() {
    let x = DefinitionNode::rule(
        RuleSets::from_default(ConstraintSet::new().with(dim("d:BAS"), qn("bas:x1")))
            .with_tagged("alt", ConstraintSet::new().with(dim("d:BAS"), qn("bas:x2"))),
    )
    .map_rule(|r| r.tag_selector = Some("alt".to_string()));
    let compiled = compiled(&two_axis_table(x, rule(ConstraintSet::new())));
    let mut cell = fact();
    resolve(&mut cell, &compiled, &cell_nodes(&compiled), &mut BTreeMap::new());
    assert_eq!(cell.constraint(&dim("d:BAS")).unwrap().value, MemberValue::Fixed(qn("bas:x2")));
}

#[test]
fn open_values_are_recorded_under_their_axis() {
    let table = two_axis_table(
        rule(ConstraintSet::new().with(Aspect::Concept, qn("m:A"))),
        rule(ConstraintSet::new().with(dim("d:TYP"), MemberValue::Open)),
    );
    let compiled = compiled(&table);
    let mut open = BTreeMap::new();
    resolve(&mut fact(), &compiled, &cell_nodes(&compiled), &mut open);
    assert_eq!(open.get(&dim("d:TYP")), Some(&Axis::Y));
    assert_eq!(open.len(), 1);
}

fn coded_table(code: Option<&str>, concept: &str) -> CompiledTable {
    let mut table = two_axis_table(
        rule(ConstraintSet::new().with(Aspect::Concept, qn(concept))),
        rule(
            ConstraintSet::new()
                .with(dim("d:BAS"), qn("bas:x1"))
                .with(dim("d:TYP"), MemberValue::Open),
        ),
    );
    table.code = code.map(str::to_string);
    compiled(&table)
}

#[test]
fn satisfied_cell_is_valid_through_member_default_and_open() {
    let compiled = coded_table(Some("T 01"), "m:A");
    let mut cell = fact();
    let verdict = resolve_and_validate(
        &mut cell,
        &compiled,
        &cell_nodes(&compiled),
        &taxonomy(),
        &mut BTreeMap::new(),
    );
    assert_eq!(verdict, Verdict::Valid);
    assert!(!cell.is_grayed);
}

#[test]
fn cell_without_matching_drs_is_grayed_only_when_table_has_code() {
    let compiled = coded_table(Some("T 01"), "m:B");
    let mut cell = fact();
    let verdict = resolve_and_validate(
        &mut cell,
        &compiled,
        &cell_nodes(&compiled),
        &taxonomy(),
        &mut BTreeMap::new(),
    );
    assert_eq!(verdict, Verdict::NoPrimaryItemDrs);
    assert!(cell.is_grayed);

    let uncoded = coded_table(None, "m:B");
    let mut cell = fact();
    let verdict = resolve_and_validate(
        &mut cell,
        &uncoded,
        &cell_nodes(&uncoded),
        &taxonomy(),
        &mut BTreeMap::new(),
    );
    assert!(verdict.is_valid());
    assert!(!cell.is_grayed);
}

#[test]
fn cell_without_concept_is_never_valid() {
    let compiled = {
        let mut table = two_axis_table(rule(ConstraintSet::new()), rule(ConstraintSet::new()));
        table.code = Some("T 01".to_string());
        compiled(&table)
    };
    let mut cell = fact();
    let verdict = resolve_and_validate(
        &mut cell,
        &compiled,
        &cell_nodes(&compiled),
        &taxonomy(),
        &mut BTreeMap::new(),
    );
    assert_eq!(verdict, Verdict::MissingConcept);
    assert!(cell.is_grayed);
}

#[test]
fn member_outside_the_domain_fails() {
    let mut table = two_axis_table(
        rule(ConstraintSet::new().with(Aspect::Concept, qn("m:A"))),
        rule(
            ConstraintSet::new()
                .with(dim("d:BAS"), qn("bas:x9"))
                .with(dim("d:TYP"), MemberValue::Open),
        ),
    );
    table.code = Some("T 01".to_string());
    let compiled = compiled(&table);
    let mut cell = fact();
    let verdict = resolve_and_validate(
        &mut cell,
        &compiled,
        &cell_nodes(&compiled),
        &taxonomy(),
        &mut BTreeMap::new(),
    );
    assert_eq!(verdict, Verdict::UnsatisfiedDimensions);
}
