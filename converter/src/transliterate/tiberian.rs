//! Built-in Tiberian transliterator.
//!
//! Works word by word on pointed text. Each consonant letter collects the
//! points that follow it into a [`Unit`]; a word is then rendered left to
//! right with a one-unit look-ahead for vowel letters (shureq, holam male,
//! hiriq/tsere/segol + yod).
//!
//! The reading follows what the pointing states. There is no stress or
//! syllable analysis, so qamats is always `ā` unless written as qamats
//! qatan (U+05C7).

use crate::error::{TransliterationError, TransliterationResult};
use super::{Schema, Transliterator};

const ALEF: char = 'א';
const BET: char = 'ב';
const GIMEL: char = 'ג';
const DALET: char = 'ד';
const HE: char = 'ה';
const VAV: char = 'ו';
const ZAYIN: char = 'ז';
const HET: char = 'ח';
const TET: char = 'ט';
const YOD: char = 'י';
const KAF: char = 'כ';
const LAMED: char = 'ל';
const MEM: char = 'מ';
const NUN: char = 'נ';
const SAMEKH: char = 'ס';
const AYIN: char = 'ע';
const PE: char = 'פ';
const TSADI: char = 'צ';
const QOF: char = 'ק';
const RESH: char = 'ר';
const SHIN: char = 'ש';
const TAV: char = 'ת';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vowel {
    Patah,
    Qamats,
    QamatsQatan,
    Tsere,
    Segol,
    Hiriq,
    Holam,
    /// Holam on a consonantal vav (U+05BA)
    HolamHaser,
    Qubuts,
    HatafPatah,
    HatafSegol,
    HatafQamats,
}

impl Vowel {
    fn as_str(self) -> &'static str {
        match self {
            Vowel::Patah => "a",
            Vowel::Qamats => "ā",
            Vowel::QamatsQatan => "o",
            Vowel::Tsere => "ē",
            Vowel::Segol => "ɛ",
            Vowel::Hiriq => "i",
            Vowel::Holam | Vowel::HolamHaser => "ō",
            Vowel::Qubuts => "u",
            Vowel::HatafPatah => "ă",
            Vowel::HatafSegol => "ɛ\u{0306}",
            Vowel::HatafQamats => "ŏ",
        }
    }

    /// Vowel written with a following bare yod.
    fn with_yod(self) -> Option<&'static str> {
        match self {
            Vowel::Hiriq => Some("ī"),
            Vowel::Tsere => Some("ē"),
            Vowel::Segol => Some("ɛ"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Mark {
    Vowel(Vowel),
    Sheva,
    Dagesh,
    Rafe,
    ShinDot,
    SinDot,
}

#[derive(Debug, Clone, Copy)]
enum Class {
    Letter(char),
    Mark(Mark),
    /// Accents and other signs that carry no sound
    Ignored,
    /// Ends a word and is copied to the output as this character
    Boundary(char),
    Unsupported,
}

fn classify(ch: char) -> Class {
    match ch {
        '\u{05D0}'..='\u{05EA}' => Class::Letter(base_letter(ch)),
        '\u{05B0}' => Class::Mark(Mark::Sheva),
        '\u{05B1}' => Class::Mark(Mark::Vowel(Vowel::HatafSegol)),
        '\u{05B2}' => Class::Mark(Mark::Vowel(Vowel::HatafPatah)),
        '\u{05B3}' => Class::Mark(Mark::Vowel(Vowel::HatafQamats)),
        '\u{05B4}' => Class::Mark(Mark::Vowel(Vowel::Hiriq)),
        '\u{05B5}' => Class::Mark(Mark::Vowel(Vowel::Tsere)),
        '\u{05B6}' => Class::Mark(Mark::Vowel(Vowel::Segol)),
        '\u{05B7}' => Class::Mark(Mark::Vowel(Vowel::Patah)),
        '\u{05B8}' => Class::Mark(Mark::Vowel(Vowel::Qamats)),
        '\u{05B9}' => Class::Mark(Mark::Vowel(Vowel::Holam)),
        '\u{05BA}' => Class::Mark(Mark::Vowel(Vowel::HolamHaser)),
        '\u{05BB}' => Class::Mark(Mark::Vowel(Vowel::Qubuts)),
        '\u{05BC}' => Class::Mark(Mark::Dagesh),
        '\u{05BF}' => Class::Mark(Mark::Rafe),
        '\u{05C1}' => Class::Mark(Mark::ShinDot),
        '\u{05C2}' => Class::Mark(Mark::SinDot),
        '\u{05C7}' => Class::Mark(Mark::Vowel(Vowel::QamatsQatan)),
        // cantillation, meteg, paseq, sof pasuq, upper/lower dots, nun
        // hafukha, geresh, gershayim, grapheme joiner, zero-width and
        // directional marks
        '\u{0591}'..='\u{05AF}'
        | '\u{05BD}'
        | '\u{05C0}'
        | '\u{05C3}'
        | '\u{05C4}'
        | '\u{05C5}'
        | '\u{05C6}'
        | '\u{05F3}'
        | '\u{05F4}'
        | '\u{034F}'
        | '\u{200C}'..='\u{200F}' => Class::Ignored,
        '\u{05BE}' => Class::Boundary('-'),
        c @ '\u{2010}'..='\u{2015}' => Class::Boundary(c),
        c if c.is_whitespace() || c.is_ascii_punctuation() || c.is_ascii_digit() => {
            Class::Boundary(c)
        }
        _ => Class::Unsupported,
    }
}

fn base_letter(ch: char) -> char {
    match ch {
        'ך' => KAF,
        'ם' => MEM,
        'ן' => NUN,
        'ף' => PE,
        'ץ' => TSADI,
        c => c,
    }
}

/// A consonant letter with the points attached to it.
#[derive(Debug, Clone, Copy)]
struct Unit {
    letter: char,
    vowel: Option<Vowel>,
    sheva: bool,
    dagesh: bool,
    rafe: bool,
    sin: bool,
}

impl Unit {
    fn new(letter: char) -> Self {
        Self {
            letter,
            vowel: None,
            sheva: false,
            dagesh: false,
            rafe: false,
            sin: false,
        }
    }

    fn apply(&mut self, mark: Mark) {
        match mark {
            Mark::Vowel(v) => self.vowel = Some(v),
            Mark::Sheva => self.sheva = true,
            Mark::Dagesh => self.dagesh = true,
            Mark::Rafe => self.rafe = true,
            Mark::ShinDot => self.sin = false,
            Mark::SinDot => self.sin = true,
        }
    }

    fn is_pointed(&self) -> bool {
        self.vowel.is_some() || self.sheva || self.dagesh
    }

    /// No vowel, sheva or dagesh.
    fn is_bare(&self) -> bool {
        !self.is_pointed()
    }

    /// Vav read as a vowel: shureq `ū` or holam male `ō`.
    fn as_vowel_letter(&self) -> Option<&'static str> {
        if self.letter != VAV || self.sheva {
            return None;
        }
        match (self.dagesh, self.vowel) {
            (true, None) => Some("ū"),
            (false, Some(Vowel::Holam)) => Some("ō"),
            _ => None,
        }
    }

    fn consonant(&self) -> &'static str {
        let hard = self.dagesh && !self.rafe;
        match self.letter {
            ALEF => "ʔ",
            BET => if hard { "b" } else { "v" },
            GIMEL => if hard { "g" } else { "ɣ" },
            DALET => if hard { "d" } else { "ð" },
            HE => "h",
            VAV => "w",
            ZAYIN => "z",
            HET => "ħ",
            TET => "ṭ",
            YOD => "y",
            KAF => if hard { "k" } else { "χ" },
            LAMED => "l",
            MEM => "m",
            NUN => "n",
            SAMEKH => "s",
            AYIN => "ʕ",
            PE => if hard { "p" } else { "f" },
            TSADI => "ṣ",
            QOF => "q",
            RESH => "r",
            SHIN => if self.sin { "ś" } else { "š" },
            TAV => if hard { "t" } else { "θ" },
            _ => "",
        }
    }
}

/// Phonological transliteration of pointed Hebrew.
#[derive(Debug, Clone, Copy, Default)]
pub struct TiberianTransliterator;

impl TiberianTransliterator {
    pub fn new() -> Self {
        Self
    }

    fn render(&self, text: &str) -> TransliterationResult<String> {
        let mut out = String::with_capacity(text.len());
        let mut units: Vec<Unit> = Vec::new();
        let mut raw_word = String::new();

        for (idx, ch) in text.char_indices() {
            match classify(ch) {
                Class::Letter(letter) => {
                    units.push(Unit::new(letter));
                    raw_word.push(ch);
                }
                Class::Mark(mark) => {
                    raw_word.push(ch);
                    match units.last_mut() {
                        Some(unit) => unit.apply(mark),
                        None => {
                            return Err(TransliterationError::DanglingMark {
                                code: ch as u32,
                                word: surrounding_token(text, idx).to_string(),
                            })
                        }
                    }
                }
                Class::Ignored => raw_word.push(ch),
                Class::Boundary(sep) => {
                    out.push_str(&render_word(&units, &raw_word)?);
                    units.clear();
                    raw_word.clear();
                    out.push(sep);
                }
                Class::Unsupported => {
                    return Err(TransliterationError::unsupported(
                        ch,
                        surrounding_token(text, idx),
                    ))
                }
            }
        }

        out.push_str(&render_word(&units, &raw_word)?);
        Ok(out)
    }
}

impl Transliterator for TiberianTransliterator {
    fn transliterate(&self, text: &str, schema: Schema) -> TransliterationResult<String> {
        match schema {
            Schema::Tiberian => self.render(text),
        }
    }
}

fn render_word(units: &[Unit], raw: &str) -> TransliterationResult<String> {
    if units.is_empty() {
        return Ok(String::new());
    }
    if !units.iter().any(Unit::is_pointed) {
        return Err(TransliterationError::Unvocalized(raw.to_string()));
    }

    let n = units.len();
    let mut out = String::new();
    // previous unit ended in a full vowel, so a dagesh here doubles
    let mut after_vowel = false;
    let mut prev_sheva = false;
    let mut i = 0;

    while i < n {
        let unit = &units[i];
        let is_last = i + 1 == n;

        if i == 0 && unit.letter == VAV && unit.dagesh && unit.vowel.is_none() && !unit.sheva {
            out.push('ū');
            after_vowel = true;
            i += 1;
            continue;
        }

        if unit.vowel.is_none() && !unit.sheva {
            if let Some(vowel) = units.get(i + 1).and_then(Unit::as_vowel_letter) {
                out.push_str(unit.consonant());
                out.push_str(vowel);
                after_vowel = true;
                prev_sheva = false;
                i += 2;
                continue;
            }

            let quiescent_alef = unit.letter == ALEF && i > 0;
            let final_he = unit.letter == HE && is_last && !unit.dagesh;
            if quiescent_alef || final_he {
                prev_sheva = false;
                i += 1;
                continue;
            }
        }

        let mapiq = unit.letter == HE && is_last && unit.dagesh;
        let geminate = unit.dagesh && after_vowel && !mapiq;

        let furtive = is_last
            && unit.vowel == Some(Vowel::Patah)
            && (unit.letter == HET || unit.letter == AYIN || mapiq);
        if furtive {
            out.push('a');
        }

        out.push_str(unit.consonant());
        if geminate {
            out.push_str(unit.consonant());
        }

        match unit.vowel {
            Some(_) if furtive => after_vowel = true,
            Some(vowel) => {
                let next_is_bare_yod = units
                    .get(i + 1)
                    .is_some_and(|next| next.letter == YOD && next.is_bare());
                match vowel.with_yod() {
                    Some(long) if next_is_bare_yod => {
                        out.push_str(long);
                        i += 1;
                    }
                    _ => {
                        out.push_str(vowel.as_str());
                        // qamats + yod + final vav: the yod is silent
                        let silent_yod = vowel == Vowel::Qamats
                            && next_is_bare_yod
                            && i + 3 == n
                            && units[i + 2].letter == VAV;
                        if silent_yod {
                            i += 1;
                        }
                    }
                }
                after_vowel = true;
            }
            None if unit.sheva => {
                let before_final_sheva = i + 2 == n && units[i + 1].sheva;
                let vocal = !is_last && !before_final_sheva && (i == 0 || geminate || prev_sheva);
                if vocal {
                    out.push('ə');
                }
                after_vowel = false;
            }
            None => after_vowel = false,
        }

        prev_sheva = unit.sheva;
        i += 1;
    }

    Ok(out)
}

/// Whitespace-delimited token of `text` containing the byte offset `idx`.
fn surrounding_token(text: &str, idx: usize) -> &str {
    let start = text[..idx]
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map(|(p, c)| p + c.len_utf8())
        .unwrap_or(0);
    let end = text[idx..]
        .find(char::is_whitespace)
        .map(|p| idx + p)
        .unwrap_or(text.len());
    &text[start..end]
}
