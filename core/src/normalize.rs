use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex");
    static ref ENGLISH_STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
    // Prepositions, conjunctions, particles and interjections.
    static ref RUSSIAN_STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "а","ах","без","бы","в","во","вот","да","для","до","же","за","и","из","или","к","ко","ли",
            "либо","на","над","не","ни","но","о","об","от","ой","перед","по","под","при","про","с","со",
            "то","у","ух","чем","что","чтобы","эй","ведь","даже","лишь","только","уж","хотя","через",
        ];
        words.iter().copied().collect()
    };
}

/// Output of normalizing one text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    /// Token occurrences in text order, repetitions kept.
    pub tokens: Vec<String>,
    /// Lemma -> token surface forms it covers.
    pub lemmas: BTreeMap<String, BTreeSet<String>>,
}

impl Normalized {
    pub fn lemma_set(&self) -> BTreeSet<String> {
        self.lemmas.keys().cloned().collect()
    }
}

/// Turns raw text into tokens and lemmas. The core only consumes this capability.
pub trait Normalizer: Send + Sync {
    fn normalize(&self, text: &str) -> Normalized;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    Russian,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "russian" | "ru" => Ok(Language::Russian),
            other => Err(format!("unsupported language `{other}` (expected english or russian)")),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => f.write_str("english"),
            Language::Russian => f.write_str("russian"),
        }
    }
}

/// NFKC + lowercase + stopword removal, with a Snowball stem standing in for the lemma.
pub struct StemmingNormalizer {
    language: Language,
    stemmer: Stemmer,
}

impl StemmingNormalizer {
    pub fn new(language: Language) -> Self {
        let algorithm = match language {
            Language::English => Algorithm::English,
            Language::Russian => Algorithm::Russian,
        };
        Self { language, stemmer: Stemmer::create(algorithm) }
    }

    pub fn language(&self) -> Language { self.language }

    fn is_stopword(&self, token: &str) -> bool {
        match self.language {
            Language::English => ENGLISH_STOPWORDS.contains(token),
            Language::Russian => RUSSIAN_STOPWORDS.contains(token),
        }
    }
}

impl Default for StemmingNormalizer {
    fn default() -> Self { Self::new(Language::default()) }
}

impl Normalizer for StemmingNormalizer {
    fn normalize(&self, text: &str) -> Normalized {
        let folded = text.nfkc().collect::<String>().to_lowercase();
        let mut out = Normalized::default();
        for mat in WORD.find_iter(&folded) {
            let token = mat.as_str();
            if self.is_stopword(token) { continue; }
            let lemma = self.stemmer.stem(token).to_string();
            out.lemmas.entry(lemma).or_default().insert(token.to_string());
            out.tokens.push(token.to_string());
        }
        out
    }
}

/// Deduplicated lemma set of a free-text query.
pub fn query_lemmas(normalizer: &dyn Normalizer, text: &str) -> BTreeSet<String> {
    normalizer.normalize(text).lemma_set()
}
