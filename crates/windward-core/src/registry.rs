//! Symbol registry: free-text identifiers to canonical entities.
//!
//! Upstream stock names are operator-entered free text, often decorated
//! with convertible-bond and footnote markers, abbreviated, or
//! misspelled. The registry maps them onto canonical (code, name, sector)
//! triples with a fixed resolution chain and never refuses input: an unknown
//! name resolves to itself with the `"Other"` sector so the rest of the
//! pipeline keeps moving.
//!
//! # Resolution order
//!
//! 1. Strip decoration markers (`(CB)`, whitespace).
//! 2. Alias substitution (aliases win over footnote stripping; a trailing
//!    `!` on an alias key marks a manual override and is ignored for lookup).
//! 3. Canonical-name lookup, then the same lookup with footnote markers
//!    (`*`) stripped.
//! 4. Purely numeric input matching a known code adopts that code.
//! 5. Sector override table, else registry sector, else `"Other"`.
//! 6. Canonical display name when a code was found, else the cleaned input.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{
    strip_markers, CanonicalSymbol, ResolvedIdentifier, StockCode, DEFAULT_DECORATION_MARKERS,
    DEFAULT_FOOTNOTE_MARKERS, SECTOR_OTHER,
};

/// Alias keys ending with this flag are operator-authored manual overrides.
/// The flag is documentation for the config author; lookup ignores it.
const MANUAL_OVERRIDE_FLAG: char = '!';

/// Immutable registry configuration, loaded once at startup and injected.
///
/// Deserializable from JSON so deployments can extend the built-in table;
/// absence of a config file means [`RegistryConfig::default`], not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub symbols: Vec<CanonicalSymbol>,
    /// Raw textual variant -> target display name.
    pub aliases: HashMap<String, String>,
    /// Display name -> forced sector; wins over the registry's own sector.
    pub sector_overrides: HashMap<String, String>,
    /// Suffix/decoration markers stripped before any lookup.
    pub decoration_markers: Vec<String>,
    /// Footnote markers stripped only for the secondary name lookup.
    pub footnote_markers: Vec<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            symbols: builtin_symbols(),
            aliases: builtin_aliases(),
            sector_overrides: builtin_sector_overrides(),
            decoration_markers: DEFAULT_DECORATION_MARKERS
                .iter()
                .map(|m| (*m).to_owned())
                .collect(),
            footnote_markers: DEFAULT_FOOTNOTE_MARKERS
                .iter()
                .map(|m| (*m).to_owned())
                .collect(),
        }
    }
}

/// Read-only symbol resolver built from a [`RegistryConfig`].
#[derive(Debug, Clone)]
pub struct SymbolRegistry {
    by_name: HashMap<String, CanonicalSymbol>,
    by_code: HashMap<String, CanonicalSymbol>,
    aliases: HashMap<String, String>,
    sector_overrides: HashMap<String, String>,
    decoration_markers: Vec<String>,
    footnote_markers: Vec<String>,
}

impl Default for SymbolRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl SymbolRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        let mut by_name = HashMap::with_capacity(config.symbols.len());
        let mut by_code = HashMap::with_capacity(config.symbols.len());
        for symbol in config.symbols {
            by_code.insert(symbol.code.as_str().to_owned(), symbol.clone());
            by_name.insert(symbol.display_name.clone(), symbol);
        }

        let aliases = config
            .aliases
            .into_iter()
            .map(|(key, target)| {
                let key = key.trim_end_matches(MANUAL_OVERRIDE_FLAG).to_owned();
                (key, target)
            })
            .collect();

        Self {
            by_name,
            by_code,
            aliases,
            sector_overrides: config.sector_overrides,
            decoration_markers: config.decoration_markers,
            footnote_markers: config.footnote_markers,
        }
    }

    /// Resolve a free-text identifier. Always succeeds (best effort).
    pub fn resolve(&self, raw: &str) -> ResolvedIdentifier {
        let mut clean = strip_markers(raw, &self.decoration_markers)
            .trim_end_matches(MANUAL_OVERRIDE_FLAG)
            .to_owned();

        // Alias substitution runs before any index lookup so a configured
        // variant cannot be shadowed by a footnote-stripped near-match.
        if let Some(target) = self.aliases.get(&clean) {
            clean = target.clone();
        }

        let mut entry = self.by_name.get(&clean);
        if entry.is_none() {
            let defooted = strip_markers(&clean, &self.footnote_markers);
            if defooted != clean {
                entry = self.by_name.get(&defooted);
            }
        }
        if entry.is_none() && StockCode::looks_like_code(&clean) {
            entry = self.by_code.get(clean.trim());
        }

        let (code, display_name, registry_sector) = match entry {
            Some(symbol) => (
                Some(symbol.code.clone()),
                symbol.display_name.clone(),
                Some(symbol.sector.clone()),
            ),
            None => (None, clean.clone(), None),
        };

        let sector = self
            .sector_overrides
            .get(&display_name)
            .cloned()
            .or(registry_sector)
            .unwrap_or_else(|| SECTOR_OTHER.to_owned());

        ResolvedIdentifier {
            raw_input: raw.to_owned(),
            code,
            display_name,
            sector,
        }
    }

    /// Sector for a display name, honoring overrides; `"Other"` if unknown.
    pub fn sector_of(&self, display_name: &str) -> String {
        self.resolve(display_name).sector
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

fn builtin_symbols() -> Vec<CanonicalSymbol> {
    const TABLE: &[(&str, &str, &str)] = &[
        ("2330", "台積電", "半導體"),
        ("2303", "聯電", "半導體"),
        ("2454", "聯發科", "IC設計"),
        ("3661", "世芯-KY", "IC設計"),
        ("3443", "創意", "IC設計"),
        ("3035", "智原", "IC設計"),
        ("3529", "力旺", "IC設計"),
        ("5274", "信驊", "IC設計"),
        ("5269", "祥碩", "IC設計"),
        ("4966", "譜瑞-KY", "IC設計"),
        ("3711", "日月光投控", "半導體封測"),
        ("2317", "鴻海", "電子代工"),
        ("2382", "廣達", "電子代工"),
        ("3231", "緯創", "電子代工"),
        ("6669", "緯穎", "電子代工"),
        ("2357", "華碩", "電腦週邊"),
        ("2376", "技嘉", "電腦週邊"),
        ("3008", "大立光", "光學"),
        ("3406", "玉晶光", "光學"),
        ("3017", "奇鋐", "散熱"),
        ("3324", "雙鴻", "散熱"),
        ("3653", "健策", "散熱"),
        ("2368", "金像電", "PCB"),
        ("3037", "欣興", "PCB"),
        ("8299", "群聯", "記憶體"),
        ("3260", "威剛", "記憶體"),
        ("2408", "南亞科", "記憶體"),
        ("2344", "華邦電", "記憶體"),
        ("2337", "旺宏", "記憶體"),
        ("4967", "十銓", "記憶體"),
        ("5289", "宜鼎", "工業電腦"),
        ("8271", "宇瞻", "記憶體"),
        ("8996", "高力", "散熱"),
        ("4760", "勤凱", "電子材料"),
        ("6683", "雍智科技", "半導體測試"),
        ("2603", "長榮", "航運"),
        ("2609", "陽明", "航運"),
        ("2615", "萬海", "航運"),
        ("2002", "中鋼", "鋼鐵"),
        ("1301", "台塑", "塑膠"),
        ("2049", "上銀", "機械"),
        ("1590", "亞德客-KY", "機械"),
        ("2359", "所羅門", "自動化"),
    ];

    TABLE
        .iter()
        .filter_map(|(code, name, sector)| {
            StockCode::parse(code)
                .ok()
                .map(|code| CanonicalSymbol::new(code, *name, *sector))
        })
        .collect()
}

fn builtin_aliases() -> HashMap<String, String> {
    [
        ("台積", "台積電"),
        ("鴻海精密", "鴻海"),
        ("大立光電", "大立光"),
        ("世芯", "世芯-KY"),
        ("亞德客", "亞德客-KY"),
        ("譜瑞", "譜瑞-KY"),
        ("雍智", "雍智科技"),
        ("日月光", "日月光投控"),
        // Manual override flag form; resolves identically to the plain key.
        ("欣興電子!", "欣興"),
    ]
    .into_iter()
    .map(|(key, target)| (key.to_owned(), target.to_owned()))
    .collect()
}

fn builtin_sector_overrides() -> HashMap<String, String> {
    [("緯穎", "AI伺服器"), ("廣達", "AI伺服器")]
        .into_iter()
        .map(|(name, sector)| (name.to_owned(), sector.to_owned()))
        .collect()
}
