//! Parsing and file-index remapping of compressed solc/vyper source maps.
//!
//! See also <https://docs.soliditylang.org/en/latest/internals/source_mappings.html#source-mappings>
//!
//! Unlike the compiler's own decompression rules, empty fields are *not* filled in from the
//! previous entry: every entry keeps exactly the fields it was written with, so that a parsed
//! map prints back to its input byte for byte.

use crate::{
    error::{ExtractError, Result},
    remap::FileRemapping,
};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{
    collections::BTreeSet,
    fmt,
    iter::Peekable,
    ops::Range,
    str::{CharIndices, FromStr},
};

type Spanned<Token, Loc, Error> = std::result::Result<(Token, Loc), Error>;

macro_rules! syntax_err {
    ($msg:expr) => {{
        Err(SyntaxError::new($msg))
    }};
    ($msg:expr, $($tt:tt)*) => {{
        Err(SyntaxError::new(format!($msg, $($tt)*)))
    }};
}

/// An error that can happen during source map entry parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct SyntaxError(String);

impl SyntaxError {
    pub fn new(s: impl Into<String>) -> Self {
        SyntaxError(s.into())
    }
}

/// Identifies a source file, either in the numbering of a whole compilation unit or in the
/// dense numbering of a single contract.
///
/// `-1` is the sentinel for code that is not associated with any source file, e.g. compiler
/// generated routines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(pub i64);

impl FileId {
    /// The "no source file" sentinel
    pub const NONE: FileId = FileId(-1);

    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for FileId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.parse().map(FileId)
    }
}

impl From<i64> for FileId {
    fn from(id: i64) -> Self {
        FileId(id)
    }
}

impl Serialize for FileId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.0)
    }
}

/// Accepts both `3` and `"3"`, compiler drivers use either.
impl<'de> Deserialize<'de> for FileId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FileIdVisitor;

        impl<'de> de::Visitor<'de> for FileIdVisitor {
            type Value = FileId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer file id or its decimal string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<FileId, E> {
                Ok(FileId(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<FileId, E> {
                i64::try_from(v).map(FileId).map_err(E::custom)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<FileId, E> {
                v.trim().parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(FileIdVisitor)
    }
}

#[derive(PartialEq, Eq)]
enum Token<'a> {
    Number(&'a str),
    Colon,
    /// `i` which represents an instruction that goes into a function
    In,
    /// `o` which represents an instruction that returns from a function
    Out,
    /// `-` regular jump
    Regular,
}

impl<'a> fmt::Debug for Token<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(s) => write!(f, "NUMBER({s:?})"),
            Token::Colon => write!(f, "COLON"),
            Token::In => write!(f, "JMP(i)"),
            Token::Out => write!(f, "JMP(o)"),
            Token::Regular => write!(f, "JMP(-)"),
        }
    }
}

struct TokenStream<'input> {
    input: &'input str,
    chars: Peekable<CharIndices<'input>>,
}

impl<'input> TokenStream<'input> {
    fn new(input: &'input str) -> TokenStream<'input> {
        TokenStream { chars: input.char_indices().peekable(), input }
    }

    fn number(
        &mut self,
        start: usize,
        mut end: usize,
    ) -> Option<Spanned<Token<'input>, usize, SyntaxError>> {
        loop {
            if let Some((_, ch)) = self.chars.peek().cloned() {
                if !ch.is_ascii_digit() {
                    break
                }
                self.chars.next();
                end += 1;
            } else {
                end = self.input.len();
                break
            }
        }
        Some(Ok((Token::Number(&self.input[start..end]), start)))
    }
}

impl<'input> Iterator for TokenStream<'input> {
    type Item = Spanned<Token<'input>, usize, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.chars.next()? {
            (i, ':') => Some(Ok((Token::Colon, i))),
            (i, 'i') => Some(Ok((Token::In, i))),
            (i, 'o') => Some(Ok((Token::Out, i))),
            (start, '-') => match self.chars.peek() {
                Some((_, ch)) if ch.is_ascii_digit() => {
                    self.chars.next();
                    self.number(start, start + 2)
                }
                _ => Some(Ok((Token::Regular, start))),
            },
            (start, ch) if ch.is_ascii_digit() => self.number(start, start + 1),
            (i, c) => Some(syntax_err!("Unexpected input {:?} at {}", c, i)),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Jump {
    /// A jump instruction that goes into a function
    In,
    /// A jump  represents an instruction that returns from a function
    Out,
    /// A regular jump instruction
    Regular,
}

impl AsRef<str> for Jump {
    fn as_ref(&self) -> &str {
        match self {
            Jump::In => "i",
            Jump::Out => "o",
            Jump::Regular => "-",
        }
    }
}

impl fmt::Display for Jump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Represents a single element in the source map
/// A solidity source map entry takes the following form
///
/// before 0.6.0
///   s:l:f:j
///
/// after 0.6.0
///   s:l:f:j:m
///
/// Any field may be empty and trailing fields may be left out entirely. Both cases are
/// represented as `None`, while [`SourceElement::fields`] remembers how many fields were written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SourceElement {
    /// The byte-offset to the start of the range in the source file
    pub offset: Option<i64>,
    /// The length of the source range in bytes
    pub length: Option<i64>,
    /// the source index, [`FileId::NONE`] for instructions without an associated file
    pub index: Option<FileId>,
    /// Jump instruction
    pub jump: Option<Jump>,
    /// “modifier depth”. This depth is increased whenever the placeholder statement (_) is entered
    /// in a modifier and decreased when it is left again.
    pub modifier_depth: Option<i64>,
    fields: usize,
}

impl SourceElement {
    /// Number of colon separated fields this element was written with, at least 1
    pub fn fields(&self) -> usize {
        self.fields.max(1)
    }
}

impl fmt::Display for SourceElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for field in 0..self.fields() {
            if field > 0 {
                f.write_str(":")?;
            }
            match field {
                0 => write_opt(f, self.offset)?,
                1 => write_opt(f, self.length)?,
                2 => write_opt(f, self.index)?,
                3 => write_opt(f, self.jump)?,
                _ => write_opt(f, self.modifier_depth)?,
            }
        }
        Ok(())
    }
}

fn write_opt<T: fmt::Display>(f: &mut fmt::Formatter<'_>, val: Option<T>) -> fmt::Result {
    match val {
        Some(val) => val.fmt(f),
        None => Ok(()),
    }
}

impl FromStr for SourceElement {
    type Err = SyntaxError;

    fn from_str(input: &str) -> std::result::Result<Self, Self::Err> {
        let mut state = State::Offset;
        let mut fields = 1;
        let mut builder = SourceElementBuilder::default();

        for token in TokenStream::new(input) {
            let (token, pos) = token?;
            match token {
                Token::Colon => {
                    state.advance(pos)?;
                    fields += 1;
                }
                Token::Number(num) => {
                    let num = parse_number(num, pos)?;
                    match state {
                        State::Offset => builder.set_offset(num, pos)?,
                        State::Length => builder.set_length(num, pos)?,
                        State::Index => builder.set_index(FileId(num), pos)?,
                        State::Modifier => builder.set_modifier(num, pos)?,
                        State::Jmp => return syntax_err!("Expected Jump found number at {}", pos),
                    }
                }
                Token::In => builder.set_jmp(Jump::In, state, pos)?,
                Token::Out => builder.set_jmp(Jump::Out, state, pos)?,
                Token::Regular => builder.set_jmp(Jump::Regular, state, pos)?,
            }
        }

        Ok(builder.finish(fields))
    }
}

/// Only the shortest decimal form is accepted, anything else would not print back identically.
fn parse_number(num: &str, pos: usize) -> std::result::Result<i64, SyntaxError> {
    let digits = num.strip_prefix('-').unwrap_or(num);
    if num.starts_with('-') && digits != "1" {
        return syntax_err!("Unexpected negative number `{}` at {}", num, pos)
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return syntax_err!("Unexpected leading zero in `{}` at {}", num, pos)
    }
    num.parse::<i64>()
        .or_else(|_| syntax_err!("Expected {} to be an `i64` at {}", num, pos))
}

#[derive(Default)]
struct SourceElementBuilder {
    offset: Option<i64>,
    length: Option<i64>,
    index: Option<FileId>,
    jump: Option<Jump>,
    modifier_depth: Option<i64>,
}

impl SourceElementBuilder {
    fn finish(self, fields: usize) -> SourceElement {
        let Self { offset, length, index, jump, modifier_depth } = self;
        SourceElement { offset, length, index, jump, modifier_depth, fields }
    }

    fn set_jmp(
        &mut self,
        jmp: Jump,
        state: State,
        i: usize,
    ) -> std::result::Result<(), SyntaxError> {
        if state != State::Jmp {
            return syntax_err!("Unexpected jump `{}` at {}", jmp, i)
        }
        if self.jump.is_some() {
            return syntax_err!("Jump already set: {}", i)
        }
        self.jump = Some(jmp);
        Ok(())
    }

    fn set_offset(&mut self, offset: i64, i: usize) -> std::result::Result<(), SyntaxError> {
        if self.offset.is_some() {
            return syntax_err!("Offset already set: {}", i)
        }
        self.offset = Some(offset);
        Ok(())
    }

    fn set_length(&mut self, length: i64, i: usize) -> std::result::Result<(), SyntaxError> {
        if self.length.is_some() {
            return syntax_err!("Length already set: {}", i)
        }
        self.length = Some(length);
        Ok(())
    }

    fn set_index(&mut self, index: FileId, i: usize) -> std::result::Result<(), SyntaxError> {
        if self.index.is_some() {
            return syntax_err!("Index already set: {}", i)
        }
        self.index = Some(index);
        Ok(())
    }

    fn set_modifier(
        &mut self,
        modifier_depth: i64,
        i: usize,
    ) -> std::result::Result<(), SyntaxError> {
        if self.modifier_depth.is_some() {
            return syntax_err!("Modifier depth already set: {}", i)
        }
        self.modifier_depth = Some(modifier_depth);
        Ok(())
    }
}

/// State machine to keep track of separating `:`
#[derive(Clone, PartialEq, Eq, Copy)]
enum State {
    // s
    Offset,
    // l
    Length,
    // f
    Index,
    // j
    Jmp,
    // m
    Modifier,
}

impl State {
    fn advance(&mut self, i: usize) -> std::result::Result<(), SyntaxError> {
        match self {
            State::Offset => *self = State::Length,
            State::Length => *self = State::Index,
            State::Index => *self = State::Jmp,
            State::Jmp => *self = State::Modifier,
            State::Modifier => return syntax_err!("unexpected colon at {}", i),
        }
        Ok(())
    }
}

/// One `;` separated entry of a source map
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceMapEntry {
    Element(SourceElement),
    /// Text that is not a valid element.
    ///
    /// It is kept as is, except that an integer in its third `:` separated field is still
    /// treated as a file id.
    Verbatim(String),
}

impl SourceMapEntry {
    /// Parses a single entry, falling back to [`SourceMapEntry::Verbatim`] for invalid input.
    pub fn parse(input: &str) -> Self {
        match input.parse() {
            Ok(element) => SourceMapEntry::Element(element),
            Err(err) => {
                tracing::trace!("keeping source map entry {:?} verbatim: {}", input, err);
                SourceMapEntry::Verbatim(input.to_string())
            }
        }
    }

    /// The file this entry points to, if it has a non-empty file field
    pub fn file_id(&self) -> Option<FileId> {
        match self {
            SourceMapEntry::Element(element) => element.index,
            SourceMapEntry::Verbatim(s) => verbatim_file_field(s).map(|(_, id)| id),
        }
    }

    /// Rewrites the file field through `remapping`, everything else is kept.
    ///
    /// # Errors
    ///
    /// [`ExtractError::UnmappedFileId`] if the remapping does not cover the entry's file.
    pub fn remap(&self, remapping: &FileRemapping) -> Result<SourceMapEntry> {
        let Some(global) = self.file_id() else { return Ok(self.clone()) };
        let local = remapping.get(global).ok_or(ExtractError::UnmappedFileId(global))?;
        Ok(match self {
            SourceMapEntry::Element(element) => {
                SourceMapEntry::Element(SourceElement { index: Some(local), ..element.clone() })
            }
            SourceMapEntry::Verbatim(s) => {
                let mut s = s.clone();
                if let Some((range, _)) = verbatim_file_field(&s) {
                    s.replace_range(range, &local.to_string());
                }
                SourceMapEntry::Verbatim(s)
            }
        })
    }
}

/// Locates the file id in the third `:` separated field of an invalid entry.
///
/// Surrounding whitespace is not part of the returned range. Entries with fewer than three
/// fields, or whose third field is empty or not an integer, have no file id.
fn verbatim_file_field(entry: &str) -> Option<(Range<usize>, FileId)> {
    let mut start = 0;
    for _ in 0..2 {
        start += entry[start..].find(':')? + 1;
    }
    let end = entry[start..].find(':').map_or(entry.len(), |pos| start + pos);
    let field = &entry[start..end];
    let id = field.trim();
    if id.is_empty() {
        return None
    }
    let id_start = start + (field.len() - field.trim_start().len());
    let range = id_start..id_start + id.len();
    match id.parse() {
        Ok(id) => Some((range, FileId(id))),
        Err(err) => {
            tracing::trace!("source map entry {:?} has no usable file id: {}", entry, err);
            None
        }
    }
}

impl fmt::Display for SourceMapEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceMapEntry::Element(element) => element.fmt(f),
            SourceMapEntry::Verbatim(s) => f.write_str(s),
        }
    }
}

/// Represents a whole source map as list of [`SourceMapEntry`]s
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SourceMap(Vec<SourceMapEntry>);

impl SourceMap {
    /// Parses a `;` separated source map.
    ///
    /// The result has one entry per `;` separated segment, the empty string included.
    pub fn parse(input: &str) -> Self {
        Self::from_entries(input.split(';'))
    }

    /// Parses an already split source map
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        SourceMap(entries.into_iter().map(|entry| SourceMapEntry::parse(entry.as_ref())).collect())
    }

    pub fn entries(&self) -> &[SourceMapEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns all distinct file ids this map references, sorted numerically.
    ///
    /// The order depends only on the set of ids, never on where they appear in the map.
    pub fn referenced_files(&self) -> Vec<FileId> {
        let ids = self.0.iter().filter_map(SourceMapEntry::file_id).collect::<BTreeSet<_>>();
        ids.into_iter().collect()
    }

    /// Rewrites the file field of every entry through `remapping`, all other fields are kept.
    ///
    /// # Errors
    ///
    /// [`ExtractError::UnmappedFileId`] if an entry references an id the remapping does not cover.
    pub fn remap(&self, remapping: &FileRemapping) -> Result<SourceMap> {
        self.0
            .iter()
            .map(|entry| entry.remap(remapping))
            .collect::<Result<Vec<_>>>()
            .map(SourceMap)
    }
}

impl fmt::Display for SourceMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, entry) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(";")?;
            }
            entry.fmt(f)?;
        }
        Ok(())
    }
}

/// A source map as handed over by the compiler driver: either the compressed string or a list
/// of already split entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSourceMap {
    Joined(String),
    Split(Vec<String>),
}

impl RawSourceMap {
    pub fn parse(&self) -> SourceMap {
        match self {
            RawSourceMap::Joined(s) => SourceMap::parse(s),
            RawSourceMap::Split(entries) => SourceMap::from_entries(entries),
        }
    }
}

impl Default for RawSourceMap {
    fn default() -> Self {
        RawSourceMap::Joined(String::new())
    }
}

impl From<&str> for RawSourceMap {
    fn from(s: &str) -> Self {
        RawSourceMap::Joined(s.to_string())
    }
}

/// Parses a source map
pub fn parse(input: &str) -> SourceMap {
    SourceMap::parse(input)
}
