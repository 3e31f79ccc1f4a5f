//! Acceptance tables and protected positions
//!
//! A structured token declares, per child kind, the positions where a child of
//! that kind may sit. Checked mutation validates the *resulting* child list
//! against this table, so a mutation is rejected before it happens rather than
//! leaving a half-valid layout behind. Generic containers and atoms declare no
//! table and accept anything.

use super::kind::{ChildKind, TokenKind};
use crate::wikitext::ranges::RangeSet;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

/// Map from child kind to the positions it may occupy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Acceptable {
    ranges: HashMap<ChildKind, RangeSet>,
}

impl Acceptable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `kinds` at the positions in `set`
    pub fn with(mut self, kinds: &[ChildKind], set: RangeSet) -> Self {
        for kind in kinds {
            self.ranges
                .entry(*kind)
                .and_modify(|existing| {
                    for item in set.items() {
                        existing.push(*item);
                    }
                })
                .or_insert_with(|| set.clone());
        }
        self
    }

    /// Whether a child of `kind` may sit at `index` among `len` children
    pub fn allows(&self, kind: ChildKind, index: usize, len: usize) -> bool {
        self.ranges
            .get(&kind)
            .is_some_and(|range| range.contains(index, len))
    }

    /// First position of `layout` that the table rejects
    pub fn first_violation(&self, layout: &[ChildKind]) -> Option<usize> {
        let len = layout.len();
        layout
            .iter()
            .enumerate()
            .position(|(i, kind)| !self.allows(*kind, i, len))
    }
}

fn tok(kind: TokenKind) -> ChildKind {
    ChildKind::Token(kind)
}

/// What may appear between rows and cells of a table, or between the
/// attributes of a tag: text plus anything recognized before tables are
const TABLE_JUNK: [ChildKind; 10] = [
    ChildKind::Text,
    ChildKind::Token(TokenKind::Comment),
    ChildKind::Token(TokenKind::Include),
    ChildKind::Token(TokenKind::Ext),
    ChildKind::Token(TokenKind::Template),
    ChildKind::Token(TokenKind::MagicWord),
    ChildKind::Token(TokenKind::Arg),
    ChildKind::Token(TokenKind::Escape),
    ChildKind::Token(TokenKind::Html),
    ChildKind::Token(TokenKind::Table),
];

static TABLES: Lazy<HashMap<TokenKind, Arc<Acceptable>>> = Lazy::new(|| {
    use TokenKind::*;
    let leaf = Acceptable::new().with(&[ChildKind::Text], RangeSet::all());
    let mut tables: HashMap<TokenKind, Acceptable> = HashMap::new();

    for kind in [
        Comment,
        Include,
        ExtRaw,
        Escape,
        Hr,
        DoubleUnderscore,
        Quote,
        MagicLink,
        ListMarker,
        Dd,
    ] {
        tables.insert(kind, leaf.clone());
    }

    tables.insert(
        Ext,
        Acceptable::new()
            .with(&[tok(Attributes)], RangeSet::at(&[0]))
            .with(&[tok(ExtInner), tok(ExtRaw)], RangeSet::at(&[1])),
    );
    tables.insert(
        Attributes,
        Acceptable::new()
            .with(&[tok(Attribute)], RangeSet::all())
            .with(&TABLE_JUNK, RangeSet::all()),
    );
    tables.insert(
        Attribute,
        Acceptable::new().with(&[tok(AttrValue)], RangeSet::at(&[0])),
    );
    tables.insert(
        Template,
        Acceptable::new()
            .with(&[tok(TemplateName)], RangeSet::at(&[0]))
            .with(&[tok(Parameter)], RangeSet::starting_at(1)),
    );
    tables.insert(
        MagicWord,
        Acceptable::new()
            .with(&[tok(MagicWordName)], RangeSet::at(&[0]))
            .with(&[tok(Parameter)], RangeSet::starting_at(1)),
    );
    tables.insert(
        Parameter,
        Acceptable::new()
            .with(&[tok(ParameterKey)], RangeSet::at(&[0]))
            .with(&[tok(ParameterValue)], RangeSet::at(&[1])),
    );
    tables.insert(
        Arg,
        Acceptable::new()
            .with(&[tok(ArgName)], RangeSet::at(&[0]))
            .with(&[tok(ArgDefault)], RangeSet::at(&[1]))
            .with(&[tok(ArgExtra)], RangeSet::starting_at(2)),
    );
    tables.insert(Html, Acceptable::new().with(&[tok(Attributes)], RangeSet::at(&[0])));
    tables.insert(
        Table,
        Acceptable::new()
            .with(&[tok(TableSyntax)], RangeSet::at(&[0, -1]))
            .with(&[tok(Attributes)], RangeSet::at(&[1]))
            .with(&[tok(Tr), tok(Td)], RangeSet::starting_at(2))
            .with(&TABLE_JUNK, RangeSet::starting_at(2)),
    );
    tables.insert(
        Tr,
        Acceptable::new()
            .with(&[tok(TableSyntax)], RangeSet::at(&[0]))
            .with(&[tok(Attributes)], RangeSet::at(&[1]))
            .with(&[tok(Td)], RangeSet::starting_at(2))
            .with(&TABLE_JUNK, RangeSet::starting_at(2)),
    );
    tables.insert(
        Td,
        Acceptable::new()
            .with(&[tok(TableSyntax)], RangeSet::at(&[0]))
            .with(&[tok(Attributes)], RangeSet::at(&[1]))
            .with(&[tok(TdInner)], RangeSet::at(&[2])),
    );
    tables.insert(
        Heading,
        Acceptable::new()
            .with(&[tok(HeadingTitle)], RangeSet::at(&[0]))
            .with(&[tok(HeadingTrail)], RangeSet::at(&[1])),
    );
    for kind in [Link, Category] {
        tables.insert(
            kind,
            Acceptable::new()
                .with(&[tok(LinkTarget)], RangeSet::at(&[0]))
                .with(&[tok(LinkText)], RangeSet::at(&[1])),
        );
    }
    tables.insert(
        FileLink,
        Acceptable::new()
            .with(&[tok(LinkTarget)], RangeSet::at(&[0]))
            .with(&[tok(ImageParameter)], RangeSet::starting_at(1)),
    );
    tables.insert(
        ExtLink,
        Acceptable::new()
            .with(&[tok(ExtLinkUrl)], RangeSet::at(&[0]))
            .with(&[tok(ExtLinkText)], RangeSet::at(&[1])),
    );
    tables.insert(
        Converter,
        Acceptable::new()
            .with(&[tok(ConverterFlags)], RangeSet::at(&[0]))
            .with(&[tok(ConverterRule)], RangeSet::starting_at(1)),
    );
    tables.insert(
        ConverterRule,
        Acceptable::new()
            .with(&[tok(ConverterRuleFrom)], RangeSet::at(&[0]))
            .with(&[tok(ConverterRuleVariant)], RangeSet::at(&[1]))
            .with(&[tok(ConverterRuleTo)], RangeSet::at(&[2])),
    );

    tables
        .into_iter()
        .map(|(kind, table)| (kind, Arc::new(table)))
        .collect()
});

/// Acceptance table declared by `kind`, if any
pub(crate) fn acceptable_for(kind: TokenKind) -> Option<Arc<Acceptable>> {
    TABLES.get(&kind).cloned()
}

/// Child positions of `kind` that can never be removed
pub(crate) fn protected_for(kind: TokenKind) -> RangeSet {
    use TokenKind::*;
    match kind {
        Ext | Html | Template | MagicWord | Arg | Link | Category | FileLink | Converter
        | Escape | Attribute => RangeSet::at(&[0]),
        Parameter | Heading | ExtLink | Table | Tr => RangeSet::at(&[0, 1]),
        Td | ConverterRule => RangeSet::at(&[0, 1, 2]),
        _ => RangeSet::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_accepts_name_then_parameters() {
        let table = acceptable_for(TokenKind::Template).unwrap();
        let layout = [
            tok(TokenKind::TemplateName),
            tok(TokenKind::Parameter),
            tok(TokenKind::Parameter),
        ];
        assert_eq!(table.first_violation(&layout), None);

        let bad = [tok(TokenKind::Parameter), tok(TokenKind::TemplateName)];
        assert_eq!(table.first_violation(&bad), Some(0));
    }

    #[test]
    fn arg_extras_need_a_default_before_them() {
        let table = acceptable_for(TokenKind::Arg).unwrap();
        let shifted = [tok(TokenKind::ArgName), tok(TokenKind::ArgExtra)];
        assert_eq!(table.first_violation(&shifted), Some(1));
    }

    #[test]
    fn table_syntax_may_close_the_table() {
        let table = acceptable_for(TokenKind::Table).unwrap();
        let layout = [
            tok(TokenKind::TableSyntax),
            tok(TokenKind::Attributes),
            ChildKind::Text,
            tok(TokenKind::Tr),
            tok(TokenKind::TableSyntax),
        ];
        assert_eq!(table.first_violation(&layout), None);
    }

    #[test]
    fn containers_declare_nothing() {
        assert!(acceptable_for(TokenKind::Root).is_none());
        assert!(acceptable_for(TokenKind::ParameterValue).is_none());
        assert!(protected_for(TokenKind::Root).is_empty());
    }

    #[test]
    fn protected_positions() {
        let protected = protected_for(TokenKind::Parameter);
        assert!(protected.contains(0, 2));
        assert!(protected.contains(1, 2));
        assert!(!protected_for(TokenKind::Template).contains(1, 3));
    }
}
