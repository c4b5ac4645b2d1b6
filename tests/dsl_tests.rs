use patterngraph::{
    Direction, InputNode, NodeRole, PatternGraphError,
    chain::{BondStyle, RelationshipKind},
    parse_antecedent, parse_production, parse_query,
};

fn is_invalid_query(result: Result<impl std::fmt::Debug, PatternGraphError>) -> bool {
    matches!(result, Err(PatternGraphError::InvalidQuery(_)))
}

#[test]
fn test_parse_single_typed_node() {
    let chain = parse_query("?(T1 or t2)").expect("query");
    assert!(chain.is_single_node());
    assert_eq!(
        chain.head,
        InputNode::Typed {
            types: vec!["t1".into(), "t2".into()]
        }
    );
}

#[test]
fn test_parse_described_nodes() {
    let chain = parse_query("?('Mongo')->('db server':DB Or cache)").expect("query");
    assert_eq!(
        chain.head,
        InputNode::Described {
            search_term: "Mongo".into()
        }
    );
    assert_eq!(
        chain.hops[0].node,
        InputNode::DescribedTyped {
            search_term: "db server".into(),
            types: vec!["cache".into(), "db".into()],
        }
    );
}

#[test]
fn test_parse_bare_word_is_a_type() {
    let chain = parse_query("?(mongod)").expect("query");
    assert_eq!(chain.head.types(), ["mongod"]);
}

#[test]
fn test_parse_node_roles() {
    let chain = parse_query("?(a)->(*)->()").expect("query");
    let roles: Vec<NodeRole> = chain.nodes().map(InputNode::role).collect();
    assert_eq!(roles, vec![NodeRole::Typed, NodeRole::Group, NodeRole::NotDescribed]);
    assert!(!NodeRole::NotDescribed.should_be_returned());
    assert!(NodeRole::Group.should_be_returned());
}

#[test]
fn test_parse_relationship_directions() {
    let cases = [
        ("?(a)->(b)", Direction::Outbound, BondStyle::Bonded),
        ("?(a)<-(b)", Direction::Inbound, BondStyle::Bonded),
        ("?(a)-(b)", Direction::Both, BondStyle::Bonded),
        ("?(a)<->(b)", Direction::Both, BondStyle::Bonded),
        ("?(a)=>(b)", Direction::Outbound, BondStyle::Path),
        ("?(a)<=(b)", Direction::Inbound, BondStyle::Path),
        ("?(a)=(b)", Direction::Both, BondStyle::Path),
        ("?(a)<=>(b)", Direction::Both, BondStyle::Path),
        ("?(a)-[x]->(b)", Direction::Outbound, BondStyle::Bonded),
        ("?(a)<-[x]-(b)", Direction::Inbound, BondStyle::Bonded),
        ("?(a)-[x]-(b)", Direction::Both, BondStyle::Bonded),
        ("?(a)<-[x]->(b)", Direction::Both, BondStyle::Bonded),
        ("?(a)=[x]=>(b)", Direction::Outbound, BondStyle::Path),
        ("?(a)<=[x]=(b)", Direction::Inbound, BondStyle::Path),
        ("?(a)=[x]=(b)", Direction::Both, BondStyle::Path),
        ("?(a)<=[x]=>(b)", Direction::Both, BondStyle::Path),
    ];
    for (pattern, direction, style) in cases {
        let chain = parse_query(pattern).expect(pattern);
        let relationship = &chain.hops[0].relationship;
        assert_eq!(relationship.direction(), direction, "{pattern}");
        assert_eq!(relationship.style, style, "{pattern}");
    }
}

#[test]
fn test_parse_typed_relationship_list() {
    let chain = parse_query("?(a)-[E2 or e1]->(b)").expect("query");
    let relationship = &chain.hops[0].relationship;
    assert_eq!(relationship.kind, RelationshipKind::Typed);
    assert_eq!(relationship.types, vec!["e1", "e2"]);
}

#[test]
fn test_parse_tolerates_whitespace_between_tokens() {
    let chain = parse_query("  ? (a) -[x]-> (*) ").expect("query");
    assert_eq!(chain.node_count(), 2);
}

#[test]
fn test_parse_rejects_malformed_queries() {
    for pattern in [
        "(a)",
        "?",
        "?()",
        "?(*)",
        "?()->(a)",
        "?(*)->(a)",
        "?((a))",
        "?(a",
        "?(a))",
        "?(a)(b)",
        "?->(a)",
        "?(a)->",
        "?(a)-[]->(b)",
        "?(a)-[x]=>(b)",
        "?(a)~>(b)",
        "?(a or)",
        "?(a b)",
        "?('')",
        "?('open)",
        "?('x' t1)",
    ] {
        assert!(is_invalid_query(parse_query(pattern)), "{pattern}");
    }
}

#[test]
fn test_parse_antecedent_hops() {
    let chain = parse_antecedent("(a)[e1, E2]>()<[](c)").expect("antecedent");
    assert_eq!(chain.node_count(), 3);
    let first = &chain.hops[0].relationship;
    assert_eq!(first.direction(), Direction::Outbound);
    assert_eq!(first.types, vec!["e1", "e2"]);
    assert_eq!(first.style, BondStyle::Path);
    let second = &chain.hops[1].relationship;
    assert_eq!(second.direction(), Direction::Inbound);
    assert!(second.types.is_empty());
    assert_eq!(second.kind, RelationshipKind::Short);
}

#[test]
fn test_parse_antecedent_rejects_wrong_shapes() {
    for text in [
        "()[e]>()",
        "()[e]>()[e]>()[e]>()",
        "()->()->()",
        "()<[e]>()[e]>()",
        "()[e,]>()[e]>()",
        "?()[e]>()[e]>()",
    ] {
        assert!(is_invalid_query(parse_antecedent(text)), "{text}");
    }
}

#[test]
fn test_parse_production() {
    let production = parse_production("(3)[Linked, peer](1)").expect("production");
    assert_eq!(production.source.position(), 3);
    assert_eq!(production.target.position(), 1);
    assert_eq!(production.types, vec!["linked", "peer"]);
}

#[test]
fn test_parse_production_rejects_bad_slots_and_types() {
    for text in [
        "(0)[x](1)",
        "(4)[x](1)",
        "(a)[x](1)",
        "(1)[](2)",
        "(1)[x]>(2)",
        "(1)[x](2)[y](3)",
        "(1)",
    ] {
        assert!(is_invalid_query(parse_production(text)), "{text}");
    }
}
