//! Simplified font-size cascade resolution
//!
//! Given one element's inline style, directly-matched rules, and
//! inherited ancestor styles, this module picks the single declaration
//! that governs the element's effective `font-size`. Precedence is
//! inline, then matched rules ranked by selector specificity, then the
//! ancestor chain nearest-first with the same local precedence.
//!
//! Specificity is a lightweight token scan over selector text, not a
//! selector parser: per space-separated compound token it counts `#id`
//! and `.class` occurrences plus a bare leading lowercase identifier as
//! one type match, saturating each category at 9 before weighting.
//! `!important` and cascade layers are intentionally not modeled.

use crate::protocol::{
    CssStyle, MatchedStyles, RuleMatch, SourceRange, StyleRuleOrigin, StyleSheetId,
};
use serde::Serialize;

/// The single property this engine cascades
pub const FONT_SIZE_PROPERTY: &str = "font-size";

const SPECIFICITY_CATEGORY_CAP: u32 = 9;

/// Provenance of the governing font-size declaration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum SourceRule {
    /// Declared in the element's (or an ancestor's) style attribute
    Inline {
        #[serde(skip_serializing_if = "Option::is_none")]
        style_sheet_id: Option<StyleSheetId>,
        #[serde(skip_serializing_if = "Option::is_none")]
        range: Option<SourceRange>,
    },
    /// Declared by a matched stylesheet rule
    Regular {
        #[serde(skip_serializing_if = "Option::is_none")]
        style_sheet_id: Option<StyleSheetId>,
        #[serde(skip_serializing_if = "Option::is_none")]
        range: Option<SourceRange>,
        origin: StyleRuleOrigin,
        /// Every selector text that matched, not just the winning one
        selectors: Vec<String>,
    },
}

impl SourceRule {
    pub fn style_sheet_id(&self) -> Option<&StyleSheetId> {
        match self {
            SourceRule::Inline { style_sheet_id, .. } => style_sheet_id.as_ref(),
            SourceRule::Regular { style_sheet_id, .. } => style_sheet_id.as_ref(),
        }
    }

    fn inline(style: &CssStyle) -> Self {
        SourceRule::Inline {
            style_sheet_id: style.style_sheet_id.clone(),
            range: style.range,
        }
    }

    fn regular(matched: &RuleMatch) -> Self {
        let rule = &matched.rule;
        let selectors = matched
            .matching_selectors
            .iter()
            .filter_map(|&i| rule.selector_list.selectors.get(i))
            .map(|s| s.text.clone())
            .collect();
        SourceRule::Regular {
            style_sheet_id: rule.style_sheet_id.clone().or_else(|| rule.style.style_sheet_id.clone()),
            range: rule.style.range,
            origin: rule.origin,
            selectors,
        }
    }
}

/// Specificity score of one selector's text
///
/// `min(9, ids)*100 + min(9, classes)*10 + min(9, types)`. Tokens the
/// scan cannot make sense of contribute nothing.
pub fn compute_specificity(selector: &str) -> u32 {
    let mut ids = 0u32;
    let mut classes = 0u32;
    let mut types = 0u32;
    for token in selector.split_whitespace() {
        ids += count_marked(token, '#');
        classes += count_marked(token, '.');
        if token.starts_with(|c: char| c.is_ascii_lowercase()) {
            types += 1;
        }
    }
    ids.min(SPECIFICITY_CATEGORY_CAP) * 100
        + classes.min(SPECIFICITY_CATEGORY_CAP) * 10
        + types.min(SPECIFICITY_CATEGORY_CAP)
}

/// Occurrences of `marker` immediately followed by an identifier
/// character within one compound token
fn count_marked(token: &str, marker: char) -> u32 {
    let mut count = 0;
    let mut chars = token.chars().peekable();
    while let Some(c) = chars.next() {
        if c == marker
            && chars
                .peek()
                .is_some_and(|&n| n.is_ascii_alphanumeric() || n == '-' || n == '_')
        {
            count += 1;
        }
    }
    count
}

/// Resolve the governing font-size declaration, if any
///
/// Walks inline, then matched rules, then the inherited chain strictly
/// nearest-ancestor-first so the closest declaring ancestor governs.
/// `None` is a valid outcome: no reachable declaration exists.
pub fn resolve_governing_rule(styles: &MatchedStyles) -> Option<SourceRule> {
    if let Some(rule) = local_winner(styles.inline_style.as_ref(), styles.matched_css_rules.as_deref()) {
        return Some(rule);
    }
    for entry in styles.inherited.iter().flatten() {
        if let Some(rule) = local_winner(entry.inline_style.as_ref(), entry.matched_css_rules.as_deref()) {
            return Some(rule);
        }
    }
    None
}

/// Inline-then-matched precedence for a single element's rule set
fn local_winner(inline: Option<&CssStyle>, matched: Option<&[RuleMatch]>) -> Option<SourceRule> {
    if let Some(style) = inline {
        if style.declares(FONT_SIZE_PROPERTY) {
            return Some(SourceRule::inline(style));
        }
    }
    matched
        .and_then(most_specific_rule)
        .map(SourceRule::regular)
}

/// Highest-specificity rule declaring font-size. The comparison against
/// the running best is `>=`, so the later rule in matching order wins
/// ties (last rule in cascade order wins on equal specificity).
fn most_specific_rule(rules: &[RuleMatch]) -> Option<&RuleMatch> {
    let mut best: Option<(&RuleMatch, u32)> = None;
    for matched in rules {
        if !matched.rule.style.declares(FONT_SIZE_PROPERTY) {
            continue;
        }
        let specificity = rule_specificity(matched);
        match best {
            Some((_, current)) if specificity < current => {}
            _ => best = Some((matched, specificity)),
        }
    }
    best.map(|(matched, _)| matched)
}

/// Specificity of a rule is the max over the selectors that matched
fn rule_specificity(matched: &RuleMatch) -> u32 {
    matched
        .matching_selectors
        .iter()
        .filter_map(|&i| matched.rule.selector_list.selectors.get(i))
        .map(|s| compute_specificity(&s.text))
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{CssProperty, CssRule, InheritedStyleEntry, Selector, SelectorList};

    fn font_size_style(value: &str) -> CssStyle {
        CssStyle {
            css_properties: vec![CssProperty {
                name: FONT_SIZE_PROPERTY.to_string(),
                value: value.to_string(),
            }],
            style_sheet_id: None,
            range: None,
        }
    }

    fn rule_match(selectors: &[&str], style: CssStyle) -> RuleMatch {
        rule_match_on(selectors, (0..selectors.len()).collect(), style)
    }

    fn rule_match_on(selectors: &[&str], matching: Vec<usize>, style: CssStyle) -> RuleMatch {
        RuleMatch {
            rule: CssRule {
                style,
                origin: StyleRuleOrigin::Regular,
                selector_list: SelectorList {
                    selectors: selectors
                        .iter()
                        .map(|s| Selector { text: s.to_string() })
                        .collect(),
                    text: selectors.join(", "),
                },
                style_sheet_id: Some(StyleSheetId("sheet-1".to_string())),
            },
            matching_selectors: matching,
        }
    }

    #[test]
    fn specificity_weights_ids_classes_and_types() {
        assert_eq!(compute_specificity("div"), 1);
        assert_eq!(compute_specificity(".a.b"), 20);
        assert_eq!(compute_specificity("#nav"), 100);
        assert_eq!(compute_specificity("div .a #b"), 111);
        assert_eq!(compute_specificity("a.b#c"), 111);
    }

    #[test]
    fn specificity_saturates_at_nine_per_category() {
        let nine_ids = "#a#b#c#d#e#f#g#h#i";
        let ten_ids = "#a#b#c#d#e#f#g#h#i#j";
        assert_eq!(compute_specificity(nine_ids), 900);
        assert_eq!(compute_specificity(ten_ids), compute_specificity(nine_ids));

        let many_classes = ".a.b.c.d.e.f.g.h.i.j.k";
        assert_eq!(compute_specificity(many_classes), 90);
    }

    #[test]
    fn specificity_is_monotonic_in_ids() {
        let base = "div .a";
        let with_id = "div .a #x";
        assert!(compute_specificity(with_id) >= compute_specificity(base));
    }

    #[test]
    fn malformed_tokens_contribute_nothing() {
        assert_eq!(compute_specificity(""), 0);
        assert_eq!(compute_specificity("#"), 0);
        assert_eq!(compute_specificity("> + ~"), 0);
        assert_eq!(compute_specificity("#. .#"), 0);
        // combinators alongside real tokens
        assert_eq!(compute_specificity("ul > li"), 2);
    }

    #[test]
    fn inline_beats_matched_id_rule() {
        let styles = MatchedStyles {
            inline_style: Some(font_size_style("10px")),
            matched_css_rules: Some(vec![rule_match(&["#id"], font_size_style("20px"))]),
            inherited: None,
        };

        let rule = resolve_governing_rule(&styles).unwrap();
        assert!(matches!(rule, SourceRule::Inline { .. }));
    }

    #[test]
    fn higher_specificity_rule_wins() {
        let styles = MatchedStyles {
            inline_style: None,
            matched_css_rules: Some(vec![
                rule_match(&[".a.b"], font_size_style("10px")),
                rule_match(&["div"], font_size_style("12px")),
            ]),
            inherited: None,
        };

        let rule = resolve_governing_rule(&styles).unwrap();
        match rule {
            SourceRule::Regular { selectors, .. } => assert_eq!(selectors, vec![".a.b"]),
            other => panic!("expected regular rule, got {other:?}"),
        }
    }

    #[test]
    fn later_rule_wins_specificity_ties() {
        let styles = MatchedStyles {
            inline_style: None,
            matched_css_rules: Some(vec![
                rule_match(&[".first"], font_size_style("10px")),
                rule_match(&[".second"], font_size_style("11px")),
            ]),
            inherited: None,
        };

        let rule = resolve_governing_rule(&styles).unwrap();
        match rule {
            SourceRule::Regular { selectors, .. } => assert_eq!(selectors, vec![".second"]),
            other => panic!("expected regular rule, got {other:?}"),
        }
    }

    #[test]
    fn rules_without_font_size_are_skipped() {
        let empty = CssStyle::default();
        let styles = MatchedStyles {
            inline_style: None,
            matched_css_rules: Some(vec![
                rule_match(&["#very #specific"], empty),
                rule_match(&["p"], font_size_style("10px")),
            ]),
            inherited: None,
        };

        let rule = resolve_governing_rule(&styles).unwrap();
        match rule {
            SourceRule::Regular { selectors, .. } => assert_eq!(selectors, vec!["p"]),
            other => panic!("expected regular rule, got {other:?}"),
        }
    }

    #[test]
    fn rule_specificity_uses_only_matching_selectors() {
        // "#x" is in the list but did not match; "div" did.
        let weak = rule_match_on(&["#x", "div"], vec![1], font_size_style("10px"));
        let strong = rule_match(&[".a"], font_size_style("11px"));
        let styles = MatchedStyles {
            inline_style: None,
            matched_css_rules: Some(vec![weak, strong]),
            inherited: None,
        };

        let rule = resolve_governing_rule(&styles).unwrap();
        match rule {
            SourceRule::Regular { selectors, .. } => assert_eq!(selectors, vec![".a"]),
            other => panic!("expected regular rule, got {other:?}"),
        }
    }

    #[test]
    fn nearest_declaring_ancestor_governs() {
        let styles = MatchedStyles {
            inline_style: None,
            matched_css_rules: None,
            inherited: Some(vec![
                InheritedStyleEntry {
                    inline_style: None,
                    matched_css_rules: Some(vec![rule_match(&[".near"], font_size_style("10px"))]),
                },
                InheritedStyleEntry {
                    inline_style: None,
                    matched_css_rules: Some(vec![rule_match(&["#far"], font_size_style("30px"))]),
                },
            ]),
        };

        let rule = resolve_governing_rule(&styles).unwrap();
        match rule {
            SourceRule::Regular { selectors, .. } => assert_eq!(selectors, vec![".near"]),
            other => panic!("expected regular rule, got {other:?}"),
        }
    }

    #[test]
    fn ancestor_inline_beats_ancestor_matched() {
        let styles = MatchedStyles {
            inline_style: None,
            matched_css_rules: None,
            inherited: Some(vec![InheritedStyleEntry {
                inline_style: Some(font_size_style("10px")),
                matched_css_rules: Some(vec![rule_match(&["#id"], font_size_style("20px"))]),
            }]),
        };

        let rule = resolve_governing_rule(&styles).unwrap();
        assert!(matches!(rule, SourceRule::Inline { .. }));
    }

    #[test]
    fn ancestors_without_declarations_are_passed_over() {
        let styles = MatchedStyles {
            inline_style: None,
            matched_css_rules: None,
            inherited: Some(vec![
                InheritedStyleEntry::default(),
                InheritedStyleEntry {
                    inline_style: None,
                    matched_css_rules: Some(vec![rule_match(&["body"], font_size_style("10px"))]),
                },
            ]),
        };

        let rule = resolve_governing_rule(&styles).unwrap();
        match rule {
            SourceRule::Regular { selectors, .. } => assert_eq!(selectors, vec!["body"]),
            other => panic!("expected regular rule, got {other:?}"),
        }
    }

    #[test]
    fn no_declaration_anywhere_yields_none() {
        assert_eq!(resolve_governing_rule(&MatchedStyles::default()), None);

        let styles = MatchedStyles {
            inline_style: Some(CssStyle::default()),
            matched_css_rules: Some(vec![]),
            inherited: Some(vec![InheritedStyleEntry::default()]),
        };
        assert_eq!(resolve_governing_rule(&styles), None);
    }

    #[test]
    fn regular_provenance_carries_origin_and_all_matched_selectors() {
        let matched = rule_match(&["p", ".lead"], font_size_style("10px"));
        let styles = MatchedStyles {
            inline_style: None,
            matched_css_rules: Some(vec![matched]),
            inherited: None,
        };

        let rule = resolve_governing_rule(&styles).unwrap();
        match rule {
            SourceRule::Regular { origin, selectors, style_sheet_id, .. } => {
                assert_eq!(origin, StyleRuleOrigin::Regular);
                assert_eq!(selectors, vec!["p", ".lead"]);
                assert_eq!(style_sheet_id, Some(StyleSheetId("sheet-1".to_string())));
            }
            other => panic!("expected regular rule, got {other:?}"),
        }
    }
}
