//! Structure compiler and balancer behaviour on small fixtures.

use xtab_compile::{Origin, RenderOptions, balance, build_headers, compile};
use xtab_model::{
    Aspect, Axis, ConstraintSet, DefinitionNode, MemberValue, PARENT_CHILD_ARCROLE,
    PRESENTATION_ARC, QName, RelationshipAxis, RelationshipSource, RuleSets, TableDefinition,
};
use xtab_taxonomy::{
    BaseSet, BaseSetKey, Concept, Drs, DrsDimension, Hypercube, TaxonomyDocument, TaxonomyIndex,
};

fn qn(value: &str) -> QName {
    QName::new(value).unwrap()
}

fn rule(label: &str) -> DefinitionNode {
    DefinitionNode::rule(RuleSets::default()).with_label(label)
}

fn currency_taxonomy() -> TaxonomyIndex {
    TaxonomyDocument::default()
        .with_drs(
            Drs::new("http://example.com/role/T1", vec![qn("m:A")]).with_hypercube(
                Hypercube::new(
                    qn("h:CUR"),
                    vec![DrsDimension::new(
                        qn("d:CUR"),
                        [qn("cur:EUR"), qn("cur:USD"), qn("cur:USD"), qn("cur:GBP")],
                    )],
                ),
            ),
        )
        .build()
}

#[test]
fn dimension_relationship_yields_one_node_per_member() {
    let table = TableDefinition::new("t").with_breakdown(
        DefinitionNode::breakdown(Axis::Z).with_child(DefinitionNode::dimension_relationship(
            qn("d:CUR"),
            Some("http://example.com/role/T1"),
        )),
    );
    let compiled = compile(&table, &currency_taxonomy());

    let members: Vec<MemberValue> = compiled
        .z
        .walk()
        .into_iter()
        .filter(|&id| matches!(compiled.z.node(id).origin, Origin::DimensionMember { .. }))
        .filter_map(|id| {
            compiled
                .z
                .node(id)
                .rules
                .default
                .get(&Aspect::Dimension(qn("d:CUR")))
                .cloned()
        })
        .collect();
    assert_eq!(
        members,
        vec![
            MemberValue::Fixed(qn("cur:EUR")),
            MemberValue::Fixed(qn("cur:USD")),
            MemberValue::Fixed(qn("cur:GBP")),
        ]
    );
}

#[test]
fn missing_drs_degrades_to_one_placeholder() {
    let table = TableDefinition::new("t").with_breakdown(
        DefinitionNode::breakdown(Axis::Z)
            .with_child(DefinitionNode::dimension_relationship(qn("d:NONE"), None)),
    );
    let compiled = compile(&table, &currency_taxonomy());

    let generated: Vec<_> = compiled.z.walk().into_iter().skip(1).collect();
    assert_eq!(generated.len(), 1);
    let node = compiled.z.node(generated[0]);
    assert!(node.rules.is_empty());
    assert_eq!(node.caption.as_deref(), Some("d:NONE"));
}

#[test]
fn typed_dimension_without_members_degrades_to_one_placeholder() {
    let taxonomy = TaxonomyDocument::default()
        .with_drs(
            Drs::new("http://example.com/role/T1", vec![qn("m:A")]).with_hypercube(
                Hypercube::new(
                    qn("h:TYP"),
                    vec![DrsDimension::new(qn("d:TYP"), Vec::<QName>::new())],
                ),
            ),
        )
        .build();
    let table = TableDefinition::new("t").with_breakdown(
        DefinitionNode::breakdown(Axis::Z).with_child(DefinitionNode::dimension_relationship(
            qn("d:TYP"),
            Some("http://example.com/role/T1"),
        )),
    );
    let compiled = compile(&table, &taxonomy);

    let generated: Vec<_> = compiled.z.walk().into_iter().skip(1).collect();
    assert_eq!(generated.len(), 1);
    let node = compiled.z.node(generated[0]);
    assert!(matches!(
        &node.origin,
        Origin::DimensionMember { dimension, member: None } if *dimension == qn("d:TYP")
    ));
    assert!(node.rules.is_empty());
}

#[test]
fn declared_generation_limit_stops_the_descendant_walk() {
    let taxonomy = TaxonomyDocument::default()
        .with_concept(Concept::abstract_item(qn("m:R")))
        .with_concept(Concept::new(qn("m:A")))
        .with_concept(Concept::new(qn("m:B")))
        .with_concept(Concept::new(qn("m:C")))
        .with_base_set(
            BaseSet::new(BaseSetKey::new(PRESENTATION_ARC, PARENT_CHILD_ARCROLE, "chain"))
                .with_arc(qn("m:R"), qn("m:A"), None)
                .with_arc(qn("m:A"), qn("m:B"), None)
                .with_arc(qn("m:B"), qn("m:C"), None),
        )
        .build();
    let walk = |generations: Option<u32>| -> Vec<QName> {
        let table = TableDefinition::new("t").with_breakdown(
            DefinitionNode::breakdown(Axis::Y).with_child(DefinitionNode::concept_relationship(
                vec![RelationshipSource::Concept(qn("m:R"))],
                Some("chain"),
                RelationshipAxis::Descendant,
                generations,
            )),
        );
        let compiled = compile(&table, &taxonomy);
        compiled
            .y
            .walk()
            .into_iter()
            .filter_map(|id| match &compiled.y.node(id).origin {
                Origin::Concept { concept } => Some(concept.clone()),
                _ => None,
            })
            .collect()
    };

    assert_eq!(walk(Some(2)), vec![qn("m:A"), qn("m:B")]);
    assert_eq!(walk(None), vec![qn("m:A"), qn("m:B"), qn("m:C")]);
}

#[test]
fn missing_base_set_produces_no_nodes_but_keeps_siblings() {
    let table = TableDefinition::new("t").with_breakdown(
        DefinitionNode::breakdown(Axis::Y)
            .with_child(DefinitionNode::concept_relationship(
                vec![RelationshipSource::Root],
                Some("http://example.com/role/missing"),
                RelationshipAxis::Child,
                Some(1),
            ))
            .with_child(rule("Other").with_order("2")),
    );
    let mut compiled = compile(&table, &TaxonomyIndex::default());
    balance(&mut compiled);
    let headers = build_headers(&mut compiled, &RenderOptions::default()).expect("headers");
    assert_eq!(headers.y.deepest().len(), 1);
}

#[test]
fn sibling_breakdowns_are_balanced_with_minimum_fakes() {
    let short = DefinitionNode::breakdown(Axis::X)
        .with_order("1")
        .with_child(rule("a1").with_child(rule("a2")));
    let long = DefinitionNode::breakdown(Axis::X).with_order("2").with_child(
        rule("b1").with_child(rule("b2").with_child(rule("b3").with_child(rule("b4")))),
    );
    let table = TableDefinition::new("t")
        .with_breakdown(short)
        .with_breakdown(long);

    let mut compiled = compile(&table, &TaxonomyIndex::default());
    assert_eq!(compiled.x.roots().len(), 2);
    balance(&mut compiled);

    assert_eq!(compiled.x.depth(), 4);
    assert_eq!(compiled.x.fake_count(), 2);
    for root in compiled.x.roots() {
        assert_eq!(compiled.x.height(*root), 4);
    }
    for leaf in compiled.x.leaves() {
        assert_eq!(compiled.x.node(leaf).level, 4);
    }
}

#[test]
fn table_without_any_header_is_invalid() {
    let table = TableDefinition::new("empty").with_breakdown(DefinitionNode::breakdown(Axis::X));
    let mut compiled = compile(&table, &TaxonomyIndex::default());
    balance(&mut compiled);
    let err = build_headers(&mut compiled, &RenderOptions::default()).unwrap_err();
    assert!(err.to_string().contains("empty"), "{err}");
}

#[test]
fn rule_sets_are_carried_onto_structure_nodes() {
    let rules = RuleSets::from_default(ConstraintSet::new().with(Aspect::Concept, qn("m:A")))
        .with_tagged(
            "total",
            ConstraintSet::new().with(Aspect::Dimension(qn("d:X")), qn("x:1")),
        );
    let table = TableDefinition::new("t").with_breakdown(
        DefinitionNode::breakdown(Axis::X).with_child(
            DefinitionNode::rule(rules.clone()).map_rule(|r| r.tag_selector = Some("total".into())),
        ),
    );
    let compiled = compile(&table, &TaxonomyIndex::default());
    let node = compiled.x.node(compiled.x.node(compiled.x.roots()[0]).children[0]);
    assert_eq!(node.rules, rules);
    assert_eq!(node.tag_selector.as_deref(), Some("total"));
}
