//! Text front-ends for the pattern language.
//!
//! Queries look like `?(t1)-[et1 or et2]->(*)=>('mongo':db)`, rule antecedents like
//! `(a)[e1]>()<[e2,e3](c)` and rule productions like `(1)[linked](3)`. All three share one
//! splitter that turns the text into alternating node bodies and link spellings.

use tracing::debug;

use crate::{
    chain::{
        BondStyle, InputChain, InputHop, InputNode, InputRelationship, RelationshipKind,
        TypeMultiplicity, validate_antecedent_chain, validate_query_chain,
    },
    descriptor::{ProductionDescriptor, SlotRef},
    errors::PatternGraphError,
    graph::normalize_types,
};

/// Every user query starts with this sigil.
pub const QUERY_SIGIL: char = '?';

const SEARCH_TERM_QUOTE: char = '\'';
const OR_KEYWORD: &str = "or";

#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Node(&'a str),
    Link(&'a str),
}

/// Parses a user query into a validated chain.
pub fn parse_query(text: &str) -> Result<InputChain, PatternGraphError> {
    let trimmed = text.trim();
    let body = trimmed.strip_prefix(QUERY_SIGIL).ok_or_else(|| {
        PatternGraphError::invalid_query(format!("query must start with '{QUERY_SIGIL}'"))
    })?;
    let chain = build_chain(body, parse_query_link)?;
    validate_query_chain(&chain)?;
    debug!(pattern = trimmed, nodes = chain.node_count(), "parsed query");
    Ok(chain)
}

/// Parses a rule antecedent: three node slots joined by `[types]>` or `<[types]`.
pub fn parse_antecedent(text: &str) -> Result<InputChain, PatternGraphError> {
    let chain = build_chain(text.trim(), parse_rule_link)?;
    validate_antecedent_chain(&chain)?;
    Ok(chain)
}

/// Parses a rule production `(n)[types](m)` with `n` and `m` naming antecedent slots.
pub fn parse_production(text: &str) -> Result<ProductionDescriptor, PatternGraphError> {
    let trimmed = text.trim();
    let (head, hops) = assemble(split_tokens(trimmed)?)?;
    let [(link, target)] = hops.as_slice() else {
        return Err(PatternGraphError::invalid_query(format!(
            "production {trimmed:?} must have the form (n)[types](m)"
        )));
    };
    let inner = link
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| {
            PatternGraphError::invalid_query(format!(
                "production link {link:?} must be a bracketed type list"
            ))
        })?;
    let types = parse_comma_list(inner)?;
    if types.is_empty() {
        return Err(PatternGraphError::invalid_query(
            "production must name at least one edge type",
        ));
    }
    Ok(ProductionDescriptor {
        source: parse_slot(head)?,
        target: parse_slot(target)?,
        types,
    })
}

fn build_chain(
    body: &str,
    parse_link: fn(&str) -> Result<InputRelationship, PatternGraphError>,
) -> Result<InputChain, PatternGraphError> {
    let (head, links) = assemble(split_tokens(body)?)?;
    let mut hops = Vec::with_capacity(links.len());
    for (link, node) in links {
        hops.push(InputHop {
            relationship: parse_link(link)?,
            node: parse_node(node)?,
        });
    }
    Ok(InputChain {
        head: parse_node(head)?,
        hops,
    })
}

/// Splits pattern text into node bodies (the text between parentheses) and the link
/// text between them. Quoted search terms may contain parentheses.
fn split_tokens(body: &str) -> Result<Vec<Token<'_>>, PatternGraphError> {
    let mut tokens = Vec::new();
    let mut link_start = 0;
    let mut chars = body.char_indices();
    while let Some((index, ch)) = chars.next() {
        match ch {
            '(' => {
                push_link(&mut tokens, &body[link_start..index]);
                let mut close = None;
                let mut quoted = false;
                for (inner_index, inner) in chars.by_ref() {
                    match inner {
                        SEARCH_TERM_QUOTE => quoted = !quoted,
                        '(' if !quoted => {
                            return Err(PatternGraphError::invalid_query(
                                "node groups cannot be nested",
                            ));
                        }
                        ')' if !quoted => {
                            close = Some(inner_index);
                            break;
                        }
                        _ => {}
                    }
                }
                let close = close.ok_or_else(|| {
                    PatternGraphError::invalid_query("node group is missing its ')'")
                })?;
                tokens.push(Token::Node(&body[index + 1..close]));
                link_start = close + 1;
            }
            ')' => return Err(PatternGraphError::invalid_query("unbalanced ')'")),
            _ => {}
        }
    }
    push_link(&mut tokens, &body[link_start..]);
    Ok(tokens)
}

fn push_link<'a>(tokens: &mut Vec<Token<'a>>, text: &'a str) {
    let text = text.trim();
    if !text.is_empty() {
        tokens.push(Token::Link(text));
    }
}

type Assembled<'a> = (&'a str, Vec<(&'a str, &'a str)>);

/// Checks the node/link alternation and pairs every link with the node after it.
fn assemble(tokens: Vec<Token<'_>>) -> Result<Assembled<'_>, PatternGraphError> {
    let mut tokens = tokens.into_iter();
    let head = match tokens.next() {
        Some(Token::Node(body)) => body,
        Some(Token::Link(link)) => {
            return Err(PatternGraphError::invalid_query(format!(
                "pattern must start with a node, found {link:?}"
            )));
        }
        None => {
            return Err(PatternGraphError::invalid_query(
                "pattern must contain at least one node",
            ));
        }
    };
    let mut hops = Vec::new();
    while let Some(token) = tokens.next() {
        let link = match token {
            Token::Link(link) => link,
            Token::Node(_) => {
                return Err(PatternGraphError::invalid_query(
                    "adjacent nodes need a relationship between them",
                ));
            }
        };
        match tokens.next() {
            Some(Token::Node(node)) => hops.push((link, node)),
            _ => {
                return Err(PatternGraphError::invalid_query(format!(
                    "relationship {link:?} must be followed by a node"
                )));
            }
        }
    }
    Ok((head, hops))
}

fn parse_node(body: &str) -> Result<InputNode, PatternGraphError> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(InputNode::NotDescribed);
    }
    if body == "*" {
        return Ok(InputNode::Group);
    }
    let Some(rest) = body.strip_prefix(SEARCH_TERM_QUOTE) else {
        return Ok(InputNode::Typed {
            types: parse_or_list(body)?,
        });
    };
    let (term, remainder) = rest.split_once(SEARCH_TERM_QUOTE).ok_or_else(|| {
        PatternGraphError::invalid_query(format!("unterminated search term in ({body})"))
    })?;
    if term.trim().is_empty() {
        return Err(PatternGraphError::invalid_query(
            "search term must not be empty",
        ));
    }
    let remainder = remainder.trim();
    if remainder.is_empty() {
        return Ok(InputNode::Described {
            search_term: term.to_string(),
        });
    }
    let types = remainder.strip_prefix(':').ok_or_else(|| {
        PatternGraphError::invalid_query(format!(
            "expected ':' after search term, found {remainder:?}"
        ))
    })?;
    Ok(InputNode::DescribedTyped {
        search_term: term.to_string(),
        types: parse_or_list(types)?,
    })
}

/// `a or B or c`; the keyword is case-insensitive and types are lowercased.
fn parse_or_list(text: &str) -> Result<Vec<String>, PatternGraphError> {
    let mut types = Vec::new();
    let mut expect_type = true;
    for word in text.split_whitespace() {
        if expect_type {
            types.push(parse_type_tag(word)?);
        } else if !word.eq_ignore_ascii_case(OR_KEYWORD) {
            return Err(PatternGraphError::invalid_query(format!(
                "expected '{OR_KEYWORD}' between types, found {word:?}"
            )));
        }
        expect_type = !expect_type;
    }
    if types.is_empty() || expect_type {
        return Err(PatternGraphError::invalid_query(format!(
            "type list {text:?} is empty or ends with '{OR_KEYWORD}'"
        )));
    }
    Ok(normalize_types(types))
}

/// `a, b, c`; an empty list is allowed and means any type.
fn parse_comma_list(text: &str) -> Result<Vec<String>, PatternGraphError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let types = text
        .split(',')
        .map(|word| parse_type_tag(word.trim()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(normalize_types(types))
}

fn parse_type_tag(word: &str) -> Result<String, PatternGraphError> {
    let valid = !word.is_empty()
        && word
            .chars()
            .all(|ch| ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.'));
    if !valid {
        return Err(PatternGraphError::invalid_query(format!(
            "{word:?} is not a valid type name"
        )));
    }
    Ok(word.to_lowercase())
}

/// Style, left bond and right bond of a link spelling.
type Bonds = (BondStyle, bool, bool);

fn short_link(text: &str) -> Option<Bonds> {
    match text {
        "-" | "<->" => Some((BondStyle::Bonded, true, true)),
        "->" => Some((BondStyle::Bonded, false, true)),
        "<-" => Some((BondStyle::Bonded, true, false)),
        "=" | "<=>" => Some((BondStyle::Path, true, true)),
        "=>" => Some((BondStyle::Path, false, true)),
        "<=" => Some((BondStyle::Path, true, false)),
        _ => None,
    }
}

fn typed_link(prefix: &str, suffix: &str) -> Option<Bonds> {
    match (prefix, suffix) {
        ("-", "-") | ("<-", "->") => Some((BondStyle::Bonded, true, true)),
        ("-", "->") => Some((BondStyle::Bonded, false, true)),
        ("<-", "-") => Some((BondStyle::Bonded, true, false)),
        ("=", "=") | ("<=", "=>") => Some((BondStyle::Path, true, true)),
        ("=", "=>") => Some((BondStyle::Path, false, true)),
        ("<=", "=") => Some((BondStyle::Path, true, false)),
        _ => None,
    }
}

fn parse_query_link(link: &str) -> Result<InputRelationship, PatternGraphError> {
    let unknown =
        || PatternGraphError::invalid_query(format!("unknown relationship spelling {link:?}"));

    let Some(open) = link.find('[') else {
        let (style, left_bond, right_bond) = short_link(link).ok_or_else(unknown)?;
        return Ok(InputRelationship {
            kind: RelationshipKind::Short,
            style,
            left_bond,
            right_bond,
            types: Vec::new(),
            multiplicity: TypeMultiplicity::Disjunctive,
        });
    };
    let close = link.rfind(']').filter(|&close| close > open).ok_or_else(unknown)?;
    let inner = &link[open + 1..close];
    if inner.contains(['[', ']']) {
        return Err(unknown());
    }
    let (style, left_bond, right_bond) =
        typed_link(link[..open].trim(), link[close + 1..].trim()).ok_or_else(unknown)?;
    if inner.trim().is_empty() {
        return Err(PatternGraphError::invalid_query(format!(
            "relationship {link:?} has an empty type list"
        )));
    }
    Ok(InputRelationship {
        kind: RelationshipKind::Typed,
        style,
        left_bond,
        right_bond,
        types: parse_or_list(inner)?,
        multiplicity: TypeMultiplicity::Disjunctive,
    })
}

/// Rule hops always traverse derived edges too, so they use the path style.
fn parse_rule_link(link: &str) -> Result<InputRelationship, PatternGraphError> {
    let (inner, left_bond, right_bond) = if let Some(rest) = link.strip_prefix("<[") {
        (rest.strip_suffix(']'), true, false)
    } else if let Some(rest) = link.strip_suffix("]>") {
        (rest.strip_prefix('['), false, true)
    } else {
        (None, false, false)
    };
    let inner = inner.ok_or_else(|| {
        PatternGraphError::invalid_query(format!(
            "rule hop {link:?} must be written [types]> or <[types]"
        ))
    })?;
    let types = parse_comma_list(inner)?;
    Ok(InputRelationship {
        kind: if types.is_empty() {
            RelationshipKind::Short
        } else {
            RelationshipKind::Typed
        },
        style: BondStyle::Path,
        left_bond,
        right_bond,
        types,
        multiplicity: TypeMultiplicity::Disjunctive,
    })
}

fn parse_slot(body: &str) -> Result<SlotRef, PatternGraphError> {
    let position = body.trim().parse::<u8>().map_err(|_| {
        PatternGraphError::invalid_query(format!("production slot ({body}) must be 1, 2 or 3"))
    })?;
    SlotRef::new(position)
}
