//! Static data. Kept apart so the lookup code stays readable.

pub(super) struct LanguageEntry {
    pub code_1: Option<&'static str>,
    pub code_3: &'static str,
    pub name: &'static str,
    pub alternates: &'static [&'static str],
    /// Has its own flair on the subreddit.
    pub supported: bool,
}

const fn lang(
    code_1: Option<&'static str>,
    code_3: &'static str,
    name: &'static str,
    alternates: &'static [&'static str],
    supported: bool,
) -> LanguageEntry {
    LanguageEntry {
        code_1,
        code_3,
        name,
        alternates,
        supported,
    }
}

pub(super) static LANGUAGES: &[LanguageEntry] = &[
    lang(Some("af"), "afr", "Afrikaans", &[], true),
    lang(Some("sq"), "sqi", "Albanian", &[], true),
    lang(Some("am"), "amh", "Amharic", &[], true),
    lang(Some("ar"), "ara", "Arabic", &[], true),
    lang(Some("hy"), "hye", "Armenian", &[], true),
    lang(Some("az"), "aze", "Azerbaijani", &["Azeri"], true),
    lang(Some("eu"), "eus", "Basque", &[], true),
    lang(Some("be"), "bel", "Belarusian", &[], true),
    lang(Some("bn"), "ben", "Bengali", &["Bangla"], true),
    lang(Some("bs"), "bos", "Bosnian", &[], true),
    lang(Some("bg"), "bul", "Bulgarian", &[], true),
    lang(Some("my"), "mya", "Burmese", &["Myanmar"], true),
    lang(Some("ca"), "cat", "Catalan", &[], true),
    lang(Some("zh"), "zho", "Chinese", &["Mandarin"], true),
    lang(Some("hr"), "hrv", "Croatian", &[], true),
    lang(Some("cs"), "ces", "Czech", &[], true),
    lang(Some("da"), "dan", "Danish", &[], true),
    lang(Some("nl"), "nld", "Dutch", &["Flemish"], true),
    lang(Some("en"), "eng", "English", &[], false),
    lang(Some("eo"), "epo", "Esperanto", &[], true),
    lang(Some("et"), "est", "Estonian", &[], true),
    lang(Some("fi"), "fin", "Finnish", &["Suomi"], true),
    lang(Some("fr"), "fra", "French", &["Francais"], true),
    lang(Some("ka"), "kat", "Georgian", &[], true),
    lang(Some("de"), "deu", "German", &["Deutsch"], true),
    lang(Some("el"), "ell", "Greek", &[], true),
    lang(Some("gu"), "guj", "Gujarati", &[], true),
    lang(Some("ht"), "hat", "Haitian Creole", &["Haitian", "Kreyol"], true),
    lang(Some("he"), "heb", "Hebrew", &[], true),
    lang(Some("hi"), "hin", "Hindi", &[], true),
    lang(Some("hu"), "hun", "Hungarian", &["Magyar"], true),
    lang(Some("is"), "isl", "Icelandic", &[], true),
    lang(Some("id"), "ind", "Indonesian", &["Bahasa"], true),
    lang(Some("ga"), "gle", "Irish", &["Gaelic"], true),
    lang(Some("it"), "ita", "Italian", &[], true),
    lang(Some("ja"), "jpn", "Japanese", &["Nihongo"], true),
    lang(Some("kn"), "kan", "Kannada", &[], true),
    lang(Some("kk"), "kaz", "Kazakh", &[], true),
    lang(Some("km"), "khm", "Khmer", &["Cambodian"], true),
    lang(Some("ko"), "kor", "Korean", &[], true),
    lang(Some("ku"), "kur", "Kurdish", &[], true),
    lang(Some("lo"), "lao", "Lao", &["Laotian"], true),
    lang(Some("la"), "lat", "Latin", &[], true),
    lang(Some("lv"), "lav", "Latvian", &[], true),
    lang(Some("lt"), "lit", "Lithuanian", &[], true),
    lang(Some("mk"), "mkd", "Macedonian", &[], true),
    lang(Some("ms"), "msa", "Malay", &[], true),
    lang(Some("ml"), "mal", "Malayalam", &[], true),
    lang(Some("mt"), "mlt", "Maltese", &[], true),
    lang(Some("mr"), "mar", "Marathi", &[], true),
    lang(Some("mn"), "mon", "Mongolian", &[], true),
    lang(Some("ne"), "nep", "Nepali", &[], true),
    lang(Some("no"), "nor", "Norwegian", &["Norsk", "Bokmal"], true),
    lang(Some("fa"), "fas", "Persian", &["Farsi"], true),
    lang(Some("pl"), "pol", "Polish", &[], true),
    lang(Some("pt"), "por", "Portuguese", &[], true),
    lang(Some("pa"), "pan", "Punjabi", &["Panjabi"], true),
    lang(Some("ro"), "ron", "Romanian", &["Moldovan"], true),
    lang(Some("ru"), "rus", "Russian", &[], true),
    lang(Some("sa"), "san", "Sanskrit", &[], true),
    lang(Some("sr"), "srp", "Serbian", &[], true),
    lang(Some("sk"), "slk", "Slovak", &[], true),
    lang(Some("sl"), "slv", "Slovene", &["Slovenian"], true),
    lang(Some("so"), "som", "Somali", &[], true),
    lang(Some("es"), "spa", "Spanish", &["Castilian", "Espanol"], true),
    lang(Some("sw"), "swa", "Swahili", &["Kiswahili"], true),
    lang(Some("sv"), "swe", "Swedish", &["Svenska"], true),
    lang(Some("tl"), "tgl", "Tagalog", &["Filipino"], true),
    lang(Some("ta"), "tam", "Tamil", &[], true),
    lang(Some("te"), "tel", "Telugu", &[], true),
    lang(Some("th"), "tha", "Thai", &[], true),
    lang(Some("bo"), "bod", "Tibetan", &[], true),
    lang(Some("tr"), "tur", "Turkish", &[], true),
    lang(Some("uk"), "ukr", "Ukrainian", &[], true),
    lang(Some("ur"), "urd", "Urdu", &[], true),
    lang(Some("uz"), "uzb", "Uzbek", &[], true),
    lang(Some("vi"), "vie", "Vietnamese", &[], true),
    lang(Some("cy"), "cym", "Welsh", &["Cymraeg"], true),
    lang(Some("yi"), "yid", "Yiddish", &[], true),
    lang(Some("yo"), "yor", "Yoruba", &[], true),
    lang(Some("zu"), "zul", "Zulu", &[], true),
    lang(None, "yue", "Cantonese", &[], true),
    lang(None, "nan", "Hokkien", &["Taiwanese"], true),
    lang(None, "lzh", "Classical Chinese", &["Wenyan"], true),
    lang(None, "grc", "Ancient Greek", &[], true),
    lang(None, "ang", "Old English", &["Anglo-Saxon"], false),
    lang(None, "non", "Old Norse", &[], false),
    lang(None, "got", "Gothic", &[], false),
    lang(None, "akk", "Akkadian", &[], false),
    lang(None, "egy", "Egyptian", &["Hieroglyphs"], false),
    lang(None, "tpi", "Tok Pisin", &[], false),
    lang(None, "haw", "Hawaiian", &[], false),
    lang(None, "chr", "Cherokee", &[], false),
    lang(None, "nci", "Classical Nahuatl", &["Nahuatl"], false),
    lang(None, "syc", "Classical Syriac", &["Syriac"], false),
    lang(None, "zxx", "Nonlanguage", &[], true),
    lang(None, "art", "Conlang", &["Constructed"], true),
];

/// Pseudo-languages: not real languages, but requests can be about them.
pub(super) static SPECIAL: &[LanguageEntry] = &[
    lang(None, "unknown", "Unknown", &["Unknown Language"], true),
    lang(None, "multiple", "Multiple Languages", &["Multiple", "Any", "All"], true),
    lang(None, "app", "App", &["Application"], true),
    lang(None, "generic", "Generic", &[], false),
];

/// ISO 639 codes that mean one of the pseudo-languages.
pub(super) static SPECIAL_CODES: &[(&str, &str)] = &[
    ("mis", "unknown"),
    ("und", "unknown"),
    ("qnp", "unknown"),
    ("mul", "multiple"),
];

/// Country codes people habitually use in place of a language code.
pub(super) static MISTAKEN_CODES: &[(&str, &str)] = &[
    ("jp", "ja"),
    ("cn", "zh"),
    ("kr", "ko"),
    ("gr", "el"),
    ("dk", "da"),
    ("ua", "uk"),
    ("vn", "vi"),
    ("cz", "cs"),
    ("ir", "fa"),
    ("se", "sv"),
];

/// ISO 639-2/B codes mapped to their 639-2/T twins.
pub(super) static BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("dut", "nld"),
    ("fre", "fra"),
    ("geo", "kat"),
    ("ger", "deu"),
    ("gre", "ell"),
    ("ice", "isl"),
    ("mac", "mkd"),
    ("may", "msa"),
    ("per", "fas"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("tib", "bod"),
    ("wel", "cym"),
];

/// ISO 15924 scripts.
pub(super) static SCRIPTS: &[(&str, &str)] = &[
    ("arab", "Arabic"),
    ("aran", "Nastaliq"),
    ("armn", "Armenian"),
    ("beng", "Bengali"),
    ("bopo", "Bopomofo"),
    ("brai", "Braille"),
    ("cyrl", "Cyrillic"),
    ("deva", "Devanagari"),
    ("ethi", "Ethiopic"),
    ("geor", "Georgian"),
    ("grek", "Greek"),
    ("hang", "Hangul"),
    ("hani", "Han Characters"),
    ("hebr", "Hebrew"),
    ("hira", "Hiragana"),
    ("kana", "Katakana"),
    ("khmr", "Khmer"),
    ("latn", "Latin"),
    ("mong", "Mongolian"),
    ("ogam", "Ogham"),
    ("runr", "Runic"),
    ("syrc", "Syriac"),
    ("taml", "Tamil"),
    ("thai", "Thai"),
    ("tibt", "Tibetan"),
];

/// ISO 3166-1 alpha-2 countries.
pub(super) static COUNTRIES: &[(&str, &str)] = &[
    ("AO", "Angola"),
    ("AR", "Argentina"),
    ("AT", "Austria"),
    ("AU", "Australia"),
    ("BE", "Belgium"),
    ("BR", "Brazil"),
    ("CA", "Canada"),
    ("CH", "Switzerland"),
    ("CL", "Chile"),
    ("CN", "China"),
    ("CO", "Colombia"),
    ("CU", "Cuba"),
    ("DE", "Germany"),
    ("EG", "Egypt"),
    ("ES", "Spain"),
    ("FR", "France"),
    ("GB", "United Kingdom"),
    ("HK", "Hong Kong"),
    ("IN", "India"),
    ("IQ", "Iraq"),
    ("IR", "Iran"),
    ("IT", "Italy"),
    ("JP", "Japan"),
    ("KR", "South Korea"),
    ("LB", "Lebanon"),
    ("MA", "Morocco"),
    ("MO", "Macau"),
    ("MX", "Mexico"),
    ("MY", "Malaysia"),
    ("NL", "Netherlands"),
    ("PE", "Peru"),
    ("PT", "Portugal"),
    ("RU", "Russia"),
    ("SA", "Saudi Arabia"),
    ("SG", "Singapore"),
    ("SY", "Syria"),
    ("TW", "Taiwan"),
    ("UA", "Ukraine"),
    ("US", "United States"),
    ("VE", "Venezuela"),
];

/// Regional tags where the region is just the language's home country.
pub(super) static DEFAULT_REGIONS: &[&str] = &[
    "cs-cz", "da-dk", "el-gr", "en-gb", "en-us", "es-es", "fa-ir", "ja-jp", "ko-kr", "pt-pt",
    "sv-se", "uk-ua", "vi-vn", "zh-cn",
];
