//! End-to-end rendering of small tables.

use xtab_layout::{RenderOptions, export, render_table, render_tables, render_text};
use xtab_model::{
    Aspect, Axis, CellAddress, ConstraintSet, DefinitionNode, Layout, MemberValue,
    PARENT_CHILD_ARCROLE, PRESENTATION_ARC, ParentChildOrder, QName, RelationshipAxis,
    RelationshipSource, RuleSets, TableDefinition, TableError,
};
use xtab_taxonomy::{
    BaseSet, BaseSetKey, Concept, Drs, DrsDimension, Hypercube, PeriodType, TaxonomyDocument,
    TaxonomyIndex,
};

const T01_ROLE: &str = "http://example.com/role/T_01";

fn qn(value: &str) -> QName {
    QName::new(value).unwrap()
}

fn taxonomy() -> TaxonomyIndex {
    TaxonomyDocument::default()
        .with_concept(Concept::abstract_item(qn("m:R")).with_label("Root"))
        .with_concept(
            Concept::new(qn("m:A"))
                .with_label("Amount")
                .with_data_type("xbrli:monetaryItemType")
                .with_period_type(PeriodType::Instant),
        )
        .with_concept(Concept::new(qn("m:B")).with_label("Beta"))
        .with_concept(Concept::new(qn("m:C")).with_label("Gamma"))
        .with_concept(Concept::new(qn("d:TYP")).with_typed_domain_ref("dom:ID"))
        .with_base_set(
            BaseSet::new(BaseSetKey::new(PRESENTATION_ARC, PARENT_CHILD_ARCROLE, "r1"))
                .with_arc(qn("m:R"), qn("m:C"), Some(2.0))
                .with_arc(qn("m:R"), qn("m:B"), Some(1.0)),
        )
        .with_drs(
            Drs::new(T01_ROLE, vec![qn("m:A")]).with_hypercube(Hypercube::new(
                qn("h:1"),
                vec![DrsDimension::new(qn("d:BAS"), [qn("bas:x1"), qn("bas:x2")])],
            )),
        )
        .build()
}

fn amount_column() -> DefinitionNode {
    DefinitionNode::breakdown(Axis::X).with_child(
        DefinitionNode::rule(RuleSets::from_default(
            ConstraintSet::new().with(Aspect::Concept, qn("m:A")),
        ))
        .with_label("Amount"),
    )
}

fn concept_rows() -> DefinitionNode {
    DefinitionNode::breakdown(Axis::Y).with_child(DefinitionNode::concept_relationship(
        vec![RelationshipSource::Root],
        Some("r1"),
        RelationshipAxis::Child,
        Some(1),
    ))
}

fn simple_table() -> TableDefinition {
    TableDefinition::new("t1")
        .with_breakdown(amount_column())
        .with_breakdown(concept_rows())
}

fn render(table: &TableDefinition) -> Layout {
    render_table(table, &taxonomy(), &RenderOptions::default()).expect("render")
}

fn header_labels(row: &[xtab_model::Cell]) -> Vec<&str> {
    row.iter().map(|cell| cell.label.as_str()).collect()
}

#[test]
fn concept_rows_against_one_rule_column() {
    let layout = render(&simple_table());

    assert_eq!(layout.slices.len(), 1);
    assert_eq!(layout.fact_count(), 2);
    for cell in layout.fact_cells() {
        let concept = cell.constraint(&Aspect::Concept).unwrap();
        assert_eq!(concept.value, MemberValue::Fixed(qn("m:A")));
        assert_eq!(concept.axis, Axis::X);
        assert!(!cell.is_grayed);
    }

    insta::assert_snapshot!(render_text(&layout).trim_end(), @r"
    table t1
    == slice 1
    _:2c:2r | Amount
    0010
    Beta | 0010 | [0010.0010]
    Gamma | 0020 | [0020.0010]
    ");
}

#[test]
fn table_code_enables_validation() {
    let layout = render(&simple_table().with_code("X 99"));
    assert_eq!(layout.grayed_count(), 2);

    let layout = render(&simple_table());
    assert_eq!(layout.grayed_count(), 0);
}

#[test]
fn dimension_members_on_z_become_sheets() {
    let table = simple_table().with_code("T 01").with_breakdown(
        DefinitionNode::breakdown(Axis::Z)
            .with_child(DefinitionNode::dimension_relationship(qn("d:BAS"), Some(T01_ROLE))),
    );
    let layout = render(&table);

    assert_eq!(layout.slices.len(), 2);
    assert_eq!(layout.slices[0].code.as_deref(), Some("0010"));
    assert_eq!(layout.slices[1].label.as_deref(), Some("bas:x2"));
    assert_eq!(layout.fact_count(), 4);
    assert_eq!(layout.grayed_count(), 0);

    let dpm = export(&layout, &taxonomy());
    let keys: Vec<&str> = dpm.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["0010.0010.0010", "0010.0020.0010", "0020.0010.0010", "0020.0020.0010"]
    );
    let entry = &dpm["0020.0010.0010"];
    assert_eq!(entry.concept, Some(qn("m:A")));
    assert_eq!(entry.data_type.as_deref(), Some("xbrli:monetaryItemType"));
    assert_eq!(entry.period_type, Some(PeriodType::Instant));
    assert_eq!(entry.dimensions.get("d:BAS").map(String::as_str), Some("bas:x2"));
    assert!(!entry.is_grayed);
}

#[test]
fn generated_codes_skip_row_code_labels_of_the_same_axis() {
    let table = TableDefinition::new("labelled")
        .with_breakdown(
            DefinitionNode::breakdown(Axis::X)
                .with_child(
                    DefinitionNode::rule(RuleSets::from_default(
                        ConstraintSet::new().with(Aspect::Concept, qn("m:A")),
                    ))
                    .with_label("Amount")
                    .with_row_code("0010"),
                )
                .with_child(DefinitionNode::dimension_relationship(qn("d:BAS"), Some(T01_ROLE))),
        )
        .with_breakdown(
            DefinitionNode::breakdown(Axis::Y).with_child(
                DefinitionNode::rule(RuleSets::default())
                    .with_label("Total")
                    .with_row_code("0100"),
            ),
        );
    let layout = render(&table);

    let addresses: Vec<String> = layout
        .fact_cells()
        .filter_map(|cell| cell.address.as_ref().map(CellAddress::key))
        .collect();
    assert_eq!(addresses, vec!["0100.0010", "0100.0020", "0100.0030"]);

    let dpm = export(&layout, &taxonomy());
    assert_eq!(dpm.len(), layout.fact_count());
    assert_eq!(dpm["0100.0010"].concept, Some(qn("m:A")));
    assert_eq!(dpm["0100.0030"].dimensions.get("d:BAS").map(String::as_str), Some("bas:x2"));
}

#[test]
fn database_ids_address_cells_when_no_row_codes_are_used() {
    let table = TableDefinition::new("db")
        .with_breakdown(
            DefinitionNode::breakdown(Axis::X).with_child(
                DefinitionNode::rule(RuleSets::from_default(
                    ConstraintSet::new().with(Aspect::Concept, qn("m:A")),
                ))
                .with_label("Amount")
                .with_database_id("c010"),
            ),
        )
        .with_breakdown(
            DefinitionNode::breakdown(Axis::Y)
                .with_child(
                    DefinitionNode::rule(RuleSets::default())
                        .with_label("First")
                        .with_database_id("r010"),
                )
                .with_child(DefinitionNode::rule(RuleSets::default()).with_label("Second")),
        );
    let layout = render(&table);

    let dpm = export(&layout, &taxonomy());
    let keys: Vec<&str> = dpm.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["0010.c010", "r010.c010"]);
}

#[test]
fn abstract_sheet_entries_do_not_become_slices() {
    let table = simple_table().with_breakdown(
        DefinitionNode::breakdown(Axis::Z)
            .with_child(
                DefinitionNode::rule(RuleSets::default())
                    .with_label("Hidden")
                    .map_rule(|rule| rule.is_abstract = true),
            )
            .with_child(DefinitionNode::rule(RuleSets::default()).with_label("Sheet")),
    );
    let layout = render(&table);

    assert_eq!(layout.slices.len(), 1);
    assert_eq!(layout.slices[0].label.as_deref(), Some("Sheet"));
    assert_eq!(layout.slices[0].code.as_deref(), Some("0020"));
    assert_eq!(layout.fact_count(), 2);
    assert!(
        layout
            .fact_cells()
            .all(|cell| cell.address.as_ref().is_some_and(|address| address.sheet.is_none()))
    );
}

#[test]
fn open_row_aspect_adds_input_column_and_records_open_dimension() {
    let table = TableDefinition::new("open")
        .with_breakdown(amount_column())
        .with_breakdown(
            DefinitionNode::breakdown(Axis::Y)
                .with_child(DefinitionNode::aspect(Aspect::Dimension(qn("d:TYP")))),
        );
    let layout = render(&table);

    assert_eq!(layout.open_axes.iter().copied().collect::<Vec<_>>(), vec![Axis::Y]);
    assert_eq!(layout.open_dimensions.get(&Aspect::Dimension(qn("d:TYP"))), Some(&Axis::Y));

    insta::assert_snapshot!(render_text(&layout).trim_end(), @r"
    table open
    == slice 1
    _:3c:2r | Amount
    0010
    d:TYP# | _ | _ | .
    . | _ | 0010 | [0010.0010]
    ");

    let dpm = export(&layout, &taxonomy());
    let entry = &dpm["0010.0010"];
    assert_eq!(entry.open_dimensions, vec!["d:TYP".to_string()]);
    assert_eq!(entry.dimensions.get("d:TYP").map(String::as_str), Some("(open)"));
    assert_eq!(entry.typed_domains.get("d:TYP").map(String::as_str), Some("dom:ID"));
}

#[test]
fn order_override_moves_the_total_column() {
    let table = TableDefinition::new("totals").with_breakdown(amount_column()).with_breakdown(
        DefinitionNode::breakdown(Axis::X).with_order("2").with_child(
            DefinitionNode::rule(RuleSets::default())
                .with_label("Total")
                .with_children([
                    DefinitionNode::rule(RuleSets::default()).with_label("a"),
                    DefinitionNode::rule(RuleSets::default()).with_label("b"),
                ]),
        ),
    );
    let taxonomy = taxonomy();

    let parent_first = render_table(&table, &taxonomy, &RenderOptions::default()).unwrap();
    let rows = &parent_first.slices[0].rows;
    assert_eq!(header_labels(&rows[1]), vec!["Amount", "", "a", "b"]);

    let children_first = render_table(
        &table,
        &taxonomy,
        &RenderOptions::with_order(ParentChildOrder::ChildrenFirst),
    )
    .unwrap();
    let rows = &children_first.slices[0].rows;
    assert_eq!(header_labels(&rows[0])[1..], ["", "Total"]);
    assert_eq!(header_labels(&rows[1]), vec!["Amount", "a", "b", ""]);
    assert_eq!(rows[0][2].col_span, 3);
}

#[test]
fn missing_taxonomy_data_degrades_without_failing() {
    let table = TableDefinition::new("gaps")
        .with_breakdown(amount_column())
        .with_breakdown(
            DefinitionNode::breakdown(Axis::Y)
                .with_child(DefinitionNode::concept_relationship(
                    vec![RelationshipSource::Concept(qn("m:Unknown"))],
                    Some("missing-role"),
                    RelationshipAxis::DescendantOrSelf,
                    None,
                ))
                .with_child(
                    DefinitionNode::dimension_relationship(qn("d:NODRS"), None).with_order("1"),
                ),
        );
    let layout = render(&table);
    assert_eq!(layout.fact_count(), 1);
}

#[test]
fn table_without_headers_is_reported() {
    let table = TableDefinition::new("broken")
        .with_breakdown(DefinitionNode::breakdown(Axis::X))
        .with_breakdown(DefinitionNode::breakdown(Axis::Y));
    let err = render_table(&table, &taxonomy(), &RenderOptions::default()).unwrap_err();
    assert!(matches!(err, TableError::InvalidTableDefinition { ref table, .. } if table == "broken"));
}

#[test]
fn rendering_is_idempotent() {
    let table = simple_table().with_code("T 01");
    assert_eq!(render(&table), render(&table));
}

#[test]
fn tables_render_concurrently_over_one_index() {
    let taxonomy = taxonomy();
    let tables = vec![simple_table(), simple_table().with_code("X 99")];
    let sequential = render_tables(&tables, &taxonomy, &RenderOptions::default());

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| render_tables(&tables, &taxonomy, &RenderOptions::default())))
            .collect();
        for handle in handles {
            let results = handle.join().unwrap();
            for ((id, layout), (expected_id, expected)) in results.iter().zip(&sequential) {
                assert_eq!(id, expected_id);
                assert_eq!(layout.as_ref().unwrap(), expected.as_ref().unwrap());
            }
        }
    });
}
