//! Closed vocabulary of token kinds
//!
//! Every token carries one [`TokenKind`]. The kind decides three things:
//! how the token serializes, which acceptance table it declares, and whether
//! it is a *generic container* that the staged parser keeps rewriting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a token node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TokenKind {
    Root,
    Plain,

    // stage 0
    Comment,
    Ext,
    ExtInner,
    ExtRaw,
    Include,
    Attributes,
    Attribute,
    AttrValue,

    // stage 1
    Template,
    TemplateName,
    Parameter,
    ParameterKey,
    ParameterValue,
    MagicWord,
    MagicWordName,
    Arg,
    ArgName,
    ArgDefault,
    ArgExtra,
    Escape,

    // stage 2
    Html,

    // stage 3
    Table,
    TableSyntax,
    Tr,
    Td,
    TdInner,

    // stage 4
    Hr,
    DoubleUnderscore,
    Heading,
    HeadingTitle,
    HeadingTrail,

    // stage 5
    Link,
    FileLink,
    Category,
    LinkTarget,
    LinkText,
    ImageParameter,

    // stage 6
    Quote,

    // stage 7 and 8
    ExtLink,
    ExtLinkUrl,
    ExtLinkText,
    MagicLink,

    // stage 9
    ListMarker,
    Dd,

    // stage 10
    Converter,
    ConverterFlags,
    ConverterRule,
    ConverterRuleFrom,
    ConverterRuleVariant,
    ConverterRuleTo,
}

impl TokenKind {
    /// The `type` tag exposed to users
    pub fn type_name(self) -> &'static str {
        match self {
            TokenKind::Root => "root",
            TokenKind::Plain => "plain",
            TokenKind::Comment => "comment",
            TokenKind::Ext => "ext",
            TokenKind::ExtInner => "ext-inner",
            TokenKind::ExtRaw => "ext-raw",
            TokenKind::Include => "include",
            TokenKind::Attributes => "attributes",
            TokenKind::Attribute => "attribute",
            TokenKind::AttrValue => "attr-value",
            TokenKind::Template => "template",
            TokenKind::TemplateName => "template-name",
            TokenKind::Parameter => "parameter",
            TokenKind::ParameterKey => "parameter-key",
            TokenKind::ParameterValue => "parameter-value",
            TokenKind::MagicWord => "magic-word",
            TokenKind::MagicWordName => "magic-word-name",
            TokenKind::Arg => "arg",
            TokenKind::ArgName => "arg-name",
            TokenKind::ArgDefault => "arg-default",
            TokenKind::ArgExtra => "hidden",
            TokenKind::Escape => "escape",
            TokenKind::Html => "html",
            TokenKind::Table => "table",
            TokenKind::TableSyntax => "table-syntax",
            TokenKind::Tr => "tr",
            TokenKind::Td => "td",
            TokenKind::TdInner => "td-inner",
            TokenKind::Hr => "hr",
            TokenKind::DoubleUnderscore => "double-underscore",
            TokenKind::Heading => "heading",
            TokenKind::HeadingTitle => "heading-title",
            TokenKind::HeadingTrail => "heading-trail",
            TokenKind::Link => "link",
            TokenKind::FileLink => "file",
            TokenKind::Category => "category",
            TokenKind::LinkTarget => "link-target",
            TokenKind::LinkText => "link-text",
            TokenKind::ImageParameter => "image-parameter",
            TokenKind::Quote => "quote",
            TokenKind::ExtLink => "ext-link",
            TokenKind::ExtLinkUrl => "ext-link-url",
            TokenKind::ExtLinkText => "ext-link-text",
            TokenKind::MagicLink => "magic-link",
            TokenKind::ListMarker => "list",
            TokenKind::Dd => "dd",
            TokenKind::Converter => "converter",
            TokenKind::ConverterFlags => "converter-flags",
            TokenKind::ConverterRule => "converter-rule",
            TokenKind::ConverterRuleFrom => "converter-rule-from",
            TokenKind::ConverterRuleVariant => "converter-rule-variant",
            TokenKind::ConverterRuleTo => "converter-rule-to",
        }
    }

    /// Generic containers: hold one pending Text child while mid-pipeline and
    /// are rewritten by every stage
    pub fn is_plain(self) -> bool {
        matches!(
            self,
            TokenKind::Root
                | TokenKind::Plain
                | TokenKind::ExtInner
                | TokenKind::ParameterValue
                | TokenKind::ArgDefault
                | TokenKind::HeadingTitle
                | TokenKind::TdInner
                | TokenKind::LinkText
                | TokenKind::ImageParameter
                | TokenKind::ExtLinkText
                | TokenKind::ConverterRuleTo
        )
    }

    /// Whether the first character of a container's text sits at the start of
    /// a line, which matters to line-anchored constructs
    pub fn starts_line(self) -> bool {
        matches!(
            self,
            TokenKind::Root | TokenKind::Plain | TokenKind::ExtInner
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Kind of a child position, the key of acceptance tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChildKind {
    Text,
    Token(TokenKind),
}

impl fmt::Display for ChildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildKind::Text => write!(f, "text"),
            ChildKind::Token(kind) => write!(f, "{}", kind),
        }
    }
}

impl From<TokenKind> for ChildKind {
    fn from(kind: TokenKind) -> Self {
        ChildKind::Token(kind)
    }
}
