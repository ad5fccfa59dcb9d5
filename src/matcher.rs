//! Fuzzy fragment matching.
//!
//! A fragment (bad word, marker word, domain stem or TLD) is walked left to
//! right against the scan buffer. Each target character may be satisfied by
//! itself or by a look-alike shape of one or two input characters. Repeats of
//! the previous target character are absorbed, and a limited amount of filler
//! may sit between matched characters.

use crate::unicode::{NUL, is_continuable, is_digit, is_symbol, is_word_break};
use phf::{Map, phf_map};

/// One look-alike spelling of a target character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    One(char),
    Two(char, char),
}

impl Shape {
    /// Input cells consumed when this shape sits at `current`, `next`.
    #[inline(always)]
    fn width(self, current: char, next: char) -> usize {
        match self {
            Shape::One(c) if c == current => 1,
            Shape::Two(a, b) if a == current && b == next => 2,
            _ => 0,
        }
    }
}

use Shape::{One, Two};

/// Substitutions tolerated inside chat text.
static CHAT_LOOKALIKES: Map<char, &'static [Shape]> = phf_map! {
    'a' => &[One('4'), One('@'), One('^'), Two('/', '\\')],
    'b' => &[One('6'), One('8'), Two('1', '3')],
    'c' => &[One('('), One('<'), One('{'), One('[')],
    'd' => &[Two('[', ')')],
    'e' => &[One('3'), One('€')],
    'f' => &[Two('p', 'h'), One('£')],
    'g' => &[One('9'), One('6')],
    'h' => &[One('#')],
    'i' => &[One('y'), One('l'), One('j'), One('1'), One('!'), One(':'), One(';'), One('|')],
    'l' => &[One('1'), One('|'), One('i')],
    'o' => &[One('0'), One('*'), Two('(', ')'), Two('[', ']'), Two('{', '}'), Two('<', '>')],
    's' => &[One('5'), One('z'), One('$'), One('2')],
    't' => &[One('7'), One('+')],
    'u' => &[One('v'), Two('\\', '/'), Two('\\', '|'), Two('|', '/')],
    'v' => &[Two('\\', '/'), Two('\\', '|'), Two('|', '/')],
    'w' => &[Two('v', 'v')],
    'x' => &[Two(')', '('), Two('}', '{'), Two(']', '['), Two('>', '<')],
    '0' => &[One('o'), One('O'), Two('(', ')'), Two('{', '}'), Two('[', ']')],
    '1' => &[One('l')],
    ',' => &[One('.')],
    '.' => &[One(',')],
    '!' => &[One('i')],
};

/// The narrower set used for domain stems and top-level domains.
static DOMAIN_LOOKALIKES: Map<char, &'static [Shape]> = phf_map! {
    'o' => &[One('0'), Two('(', ')')],
    'c' => &[One('('), One('<'), One('[')],
    'e' => &[One('€')],
    's' => &[One('$')],
    'l' => &[One('i')],
};

/// Which look-alike table a scan consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookalikes {
    Chat,
    Domain,
}

impl Lookalikes {
    #[inline(always)]
    fn table(self) -> &'static Map<char, &'static [Shape]> {
        match self {
            Lookalikes::Chat => &CHAT_LOOKALIKES,
            Lookalikes::Domain => &DOMAIN_LOOKALIKES,
        }
    }

    /// How many input cells spell `target` at `current` (followed by `next`);
    /// zero when they do not.
    #[inline]
    pub fn width(self, target: char, current: char, next: char) -> usize {
        if target == current {
            return 1;
        }
        self.table()
            .get(&target)
            .and_then(|shapes| {
                shapes
                    .iter()
                    .map(|s| s.width(current, next))
                    .find(|&w| w > 0)
            })
            .unwrap_or(0)
    }
}

#[inline(always)]
fn at(buf: &[char], index: usize) -> char {
    buf.get(index).copied().unwrap_or(NUL)
}

/// Outcome of [`match_fragment`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FragmentMatch {
    /// Exclusive end of the scanned span.
    pub end: usize,
    /// Number of fragment characters satisfied.
    pub consumed: usize,
    /// A punctuation filler sat between matched characters.
    pub symbol_filler: bool,
    /// A look-alike substitution involved a digit.
    pub emulated: bool,
    /// A digit was skipped as filler.
    pub numeral_filler: bool,
}

impl FragmentMatch {
    /// The whole fragment matched, and not through a mix of digit
    /// substitutions and digit filler (that reads as an ordinary number).
    #[inline]
    pub fn is_complete(&self, fragment_len: usize) -> bool {
        self.consumed >= fragment_len && !(self.emulated && self.numeral_filler)
    }
}

/// Filler may not exceed this share (in percent) of the scanned span.
const FILLER_LIMIT_PERCENT: usize = 90;

/// Match `fragment` against `buf` from `start` using the chat look-alikes.
pub fn match_fragment(buf: &[char], fragment: &[char], start: usize) -> FragmentMatch {
    let table = Lookalikes::Chat;
    let mut m = FragmentMatch {
        end: start,
        ..FragmentMatch::default()
    };
    let mut filler = 0usize;

    while m.end < buf.len() && !(m.emulated && m.numeral_filler) {
        let current = buf[m.end];
        let next = at(buf, m.end + 1);

        let width = fragment
            .get(m.consumed)
            .map_or(0, |&target| table.width(target, current, next));
        if width > 0 {
            if is_digit(current) || (width == 2 && is_digit(next)) {
                m.emulated = true;
            }
            m.end += width;
            m.consumed += 1;
            continue;
        }

        if m.consumed == 0 {
            break;
        }
        let repeat = table.width(fragment[m.consumed - 1], current, next);
        if repeat > 0 {
            m.end += repeat;
            continue;
        }

        if m.consumed >= fragment.len() || !is_continuable(current) {
            break;
        }
        if is_word_break(current) {
            m.symbol_filler = true;
        }
        if is_digit(current) {
            m.numeral_filler = true;
        }
        m.end += 1;
        filler += 1;
        if filler * 100 / (m.end - start) > FILLER_LIMIT_PERCENT {
            break;
        }
    }
    m
}

/// Match a domain stem from `start`, allowing only symbols as filler.
/// Returns the exclusive end when the whole stem matched.
pub fn match_domain(buf: &[char], domain: &[char], start: usize) -> Option<usize> {
    let table = Lookalikes::Domain;
    let mut end = start;
    let mut consumed = 0usize;

    while end < buf.len() && consumed < domain.len() {
        let current = buf[end];
        let next = at(buf, end + 1);

        let width = table.width(domain[consumed], current, next);
        if width > 0 {
            end += width;
            consumed += 1;
            continue;
        }
        if consumed == 0 {
            break;
        }
        let repeat = table.width(domain[consumed - 1], current, next);
        if repeat > 0 {
            end += repeat;
        } else if is_symbol(current) {
            end += 1;
        } else {
            break;
        }
    }

    (consumed >= domain.len()).then_some(end)
}

/// Match a top-level domain from `start`; returns the exclusive end when the
/// whole TLD matched.
pub fn match_tld(buf: &[char], tld: &[char], start: usize) -> Option<usize> {
    let table = Lookalikes::Domain;
    let mut end = start;
    let mut consumed = 0usize;

    while end < buf.len() && consumed < tld.len() {
        let current = buf[end];
        let next = at(buf, end + 1);

        let width = table.width(tld[consumed], current, next);
        if width > 0 {
            end += width;
            consumed += 1;
            continue;
        }
        if consumed == 0 {
            break;
        }
        let repeat = table.width(tld[consumed - 1], current, next);
        if repeat > 0 {
            end += repeat;
        } else if is_symbol(current) {
            end += 1;
        } else {
            break;
        }
    }

    (consumed >= tld.len()).then_some(end)
}
